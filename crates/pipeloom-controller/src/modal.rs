//! The single `modal` slot: one sum type wrapping every sub-editor plus
//! whatever context a session needs that the sub-editor itself doesn't
//! carry (which storage path a confirmation or content edit is actually
//! about — the modals in `pipeloom-modals` are storage-agnostic by design).

use pipeloom_modals::{
    CloneModal, ComponentCreatorModal, ConfirmModal, ContentEditorModal, NameEntryModal,
    RenameModal, TagEditorModal, UsagePanelModal,
};
use pipeloom_types::{ComponentPath, Kind};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum PendingConfirm {
    Exit,
    DeletePipeline,
    DeleteComponent { path: PathBuf, kind: Kind },
    ArchiveComponent {
        path: PathBuf,
        kind: Kind,
        currently_archived: bool,
    },
}

#[derive(Debug, Clone)]
pub struct ContentEditorTarget {
    pub path: PathBuf,
    pub kind: Kind,
}

#[derive(Debug, Clone)]
pub enum TagEditorTarget {
    Component { path: PathBuf },
    Pipeline,
}

pub enum ActiveModal {
    Confirm(ConfirmModal, PendingConfirm),
    NameEntry(NameEntryModal),
    Clone(CloneModal),
    Rename(RenameModal),
    UsagePanel(UsagePanelModal),
    Creator(ComponentCreatorModal),
    ContentEditor(ContentEditorModal, ContentEditorTarget),
    TagEditor(TagEditorModal, TagEditorTarget),
}

/// A pipeline ref's `ComponentPath` is always `"../components/"`-prefixed;
/// the component store wants the catalog-relative `PathBuf` underneath it.
/// Exact inverse of `ComponentPath::from_relative(format!("components/{}", ..))`.
pub fn component_path_to_store_path(path: &ComponentPath) -> PathBuf {
    let s = path.as_str();
    PathBuf::from(s.strip_prefix("../components/").unwrap_or(s))
}
