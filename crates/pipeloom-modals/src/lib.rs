//! Modal Sub-editors.
//!
//! Every sub-editor here exposes the same capability set the controller
//! dispatches through: `is_active`, `handle_input`, and a `view`-shaped
//! accessor (left to `pipeloom-tui` to render; this crate only holds state
//! and transition logic). Effects returned from `handle_input` are kept
//! deliberately small — the controller is the one with collaborator access,
//! so a modal only ever asks for a status message or a reload, never
//! performs the write itself.

mod clone;
mod confirm;
mod content_editor;
mod creator;
mod name_entry;
mod rename;
mod tag_editor;
mod usage_panel;

pub use clone::CloneModal;
pub use confirm::{ConfirmKind, ConfirmModal};
pub use content_editor::{ContentEditorModal, FileReferencePicker};
pub use creator::{ComponentCreatorModal, CreatorStep};
pub use name_entry::NameEntryModal;
pub use rename::RenameModal;
pub use tag_editor::{Pane as TagEditorPane, TagDeleteRequest, TagEditorModal};
pub use usage_panel::{UsageEntry, UsagePanelModal};

use pipeloom_status::StatusMessage;

/// The result of routing one input event into whichever modal is active.
#[derive(Debug, Clone)]
pub enum ModalEffect {
    None,
    Status(StatusMessage),
    Reload,
    /// The content editor's `^f` picker wants candidates only the controller
    /// can supply (it has the catalog; the modal doesn't).
    OpenFilePicker,
}

impl Default for ModalEffect {
    fn default() -> Self {
        ModalEffect::None
    }
}

/// Shared shape every sub-editor implements. `handle_input` returns whether
/// the event was consumed and any side-effect the controller should act on.
pub trait SubEditor {
    fn is_active(&self) -> bool;
    fn handle_input(&mut self, key: pipeloom_types::Key) -> (bool, ModalEffect);
    fn set_size(&mut self, _width: u16, _height: u16) {}
}
