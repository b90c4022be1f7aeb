//! Builder Controller.
//!
//! The top-level state machine: owns pane focus, every model/coordinator
//! crate below it, and the single `ActiveModal` slot. `handle_key` is the
//! one place the fixed five-step dispatch order lives; everything else is
//! support code that order calls into.

mod collaborators;
mod modal;

pub use collaborators::Collaborators;
pub use modal::{ActiveModal, ContentEditorTarget, PendingConfirm, TagEditorTarget};

use anyhow::Result;
use modal::component_path_to_store_path;
use pipeloom_available::{AvailableComponents, ItemsByKind};
use pipeloom_collab::{ComponentRefRecord, PipelineRecord, SearchableCatalog, SearchableItem};
use pipeloom_events::{Effect, Event};
use pipeloom_keymap::BuilderAction;
use pipeloom_modals::{
    CloneModal, ComponentCreatorModal, ConfirmKind, ConfirmModal, ContentEditorModal,
    NameEntryModal, RenameModal, SubEditor, TagEditorModal, UsageEntry, UsagePanelModal,
};
use pipeloom_preview::PreviewEngine;
use pipeloom_search::SearchCoordinator;
use pipeloom_selected::{ComponentRef, ReorderDirection, SelectedComponents};
use pipeloom_status::{StatusBus, StatusMessage};
use pipeloom_types::{Key, Kind, Pane, SectionOrder};
use std::path::{Path, PathBuf};

pub struct BuilderController {
    collab: Collaborators,
    section_order: SectionOrder,
    pane: Pane,
    pipeline_name: String,
    pipeline_path: Option<String>,
    pipeline_tags: Vec<String>,
    output_path: Option<PathBuf>,
    selected: SelectedComponents,
    available: AvailableComponents,
    search: SearchCoordinator,
    preview: PreviewEngine,
    preview_enabled: bool,
    include_archived: bool,
    status: StatusBus,
    modal: Option<ActiveModal>,
    error: Option<String>,
    preview_viewport_height: usize,
}

impl BuilderController {
    pub fn new(collab: Collaborators, section_order: SectionOrder, preview_width: usize) -> Self {
        Self {
            available: AvailableComponents::empty(section_order.clone()),
            selected: SelectedComponents::new(section_order.clone()),
            search: SearchCoordinator::new(),
            preview: PreviewEngine::new(preview_width),
            collab,
            section_order,
            pane: Pane::Available,
            pipeline_name: String::new(),
            pipeline_path: None,
            pipeline_tags: Vec::new(),
            output_path: None,
            preview_enabled: true,
            include_archived: false,
            status: StatusBus::default(),
            modal: None,
            error: None,
            preview_viewport_height: 20,
        }
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.current()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> &SelectedComponents {
        &self.selected
    }

    pub fn available(&self) -> &AvailableComponents {
        &self.available
    }

    pub fn preview(&self) -> &PreviewEngine {
        &self.preview
    }

    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    pub fn modal(&self) -> Option<&ActiveModal> {
        self.modal.as_ref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.selected.has_unsaved_changes()
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview_enabled
    }

    pub fn search_query(&self) -> &str {
        self.search.query()
    }

    /// Loads an existing pipeline by path, or opens the new-pipeline
    /// name prompt when none is given.
    pub fn init(&mut self, pipeline_path: Option<&str>) -> Result<()> {
        self.reload_available()?;
        self.apply_filter();
        match pipeline_path {
            Some(path) => {
                self.load_pipeline(path)?;
                let refs: Vec<_> = self.selected.refs().to_vec();
                for r in &refs {
                    self.available.predict_add(&component_path_to_store_path(&r.path));
                }
            }
            None => {
                self.modal = Some(ActiveModal::NameEntry(NameEntryModal::open()));
            }
        }
        self.refresh_preview();
        Ok(())
    }

    fn load_pipeline(&mut self, path: &str) -> Result<()> {
        let record = self.collab.pipelines.read(path)?;
        self.pipeline_name = record.name;
        self.pipeline_tags = record.tags;
        self.output_path = record.output_path;
        let refs = record
            .components
            .into_iter()
            .map(|r| ComponentRef {
                kind: r.kind,
                path: r.path,
                order: r.order,
            })
            .collect();
        self.selected = SelectedComponents::load(self.section_order.clone(), refs, record.path);
        Ok(())
    }

    pub fn handle_resize(&mut self, _width: u16, height: u16) {
        self.preview_viewport_height = height.max(1) as usize;
        self.reconcile_and_refresh();
    }

    /// Single dispatch entrypoint for every runtime-observed event.
    pub fn handle_event(&mut self, event: Event) -> Effect {
        match event {
            Event::Input(key) => self.handle_key(key),
            Event::Resize(w, h) => {
                self.handle_resize(w, h);
                Effect::None
            }
            Event::Tick => {
                self.status.tick(std::time::Instant::now());
                Effect::None
            }
            Event::ComponentSaveResult { path, result } => {
                self.handle_component_save_result(path, result);
                Effect::None
            }
            Event::ExternalEditResult { path, result } => self.handle_external_edit_result(path, result),
            Event::TagCleanupDone => Effect::None,
            Event::Shutdown => Effect::None,
        }
    }

    fn handle_component_save_result(&mut self, path: PathBuf, result: std::result::Result<(), String>) {
        match result {
            Ok(()) => {
                self.status.post(StatusMessage::success("Component saved"));
                if let Err(err) = self.reload_available() {
                    self.error = Some(err.to_string());
                }
                self.apply_filter();
                self.refresh_preview();
            }
            Err(err) => {
                self.status.post(StatusMessage::error(err));
            }
        }
        let _ = path;
    }

    fn handle_external_edit_result(&mut self, path: PathBuf, result: std::result::Result<(), String>) -> Effect {
        match result {
            Ok(()) => {
                if let Err(err) = self.reload_available() {
                    self.error = Some(err.to_string());
                }
                self.apply_filter();
                self.refresh_preview();
                let basename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.to_string_lossy().to_string());
                self.status.post(StatusMessage::success(format!("Edited: {basename}")));
            }
            Err(err) => {
                self.status.post(StatusMessage::error(err));
            }
        }
        Effect::None
    }

    /// The fixed five-step dispatch order for key input.
    fn handle_key(&mut self, key: Key) -> Effect {
        // Step 1 + 2: blocking confirmation and mode-owning sub-editors both
        // live behind the single `modal` slot (at most one active at a
        // time), so both steps reduce to "if a modal is active, route to it."
        if self.modal.is_some() {
            return self.dispatch_to_modal(key);
        }

        // Step 3: name-entry.
        // (handled inside dispatch_to_modal above since it also lives in
        // `self.modal`; this branch is unreachable but documents the order.)

        // Step 4: search pane routing.
        if self.pane == Pane::Search {
            return self.handle_search_key(key);
        }

        // Step 5: normal-mode bindings.
        self.handle_normal_mode_key(key)
    }

    fn dispatch_to_modal(&mut self, key: Key) -> Effect {
        let Some(modal) = self.modal.take() else {
            return Effect::None;
        };
        let (next_modal, effect) = self.route_modal_input(modal, key);
        self.modal = next_modal;
        effect
    }

    fn route_modal_input(&mut self, modal: ActiveModal, key: Key) -> (Option<ActiveModal>, Effect) {
        match modal {
            ActiveModal::Confirm(mut m, intent) => {
                let _ = m.handle_input(key);
                if let Some(decision) = m.take_result() {
                    let effect = self.resolve_confirm(intent, decision);
                    (None, effect)
                } else {
                    (Some(ActiveModal::Confirm(m, intent)), Effect::None)
                }
            }
            ActiveModal::NameEntry(mut m) => {
                let _ = m.handle_input(key);
                if let Some(name) = m.take_result() {
                    self.pipeline_name = name;
                    (None, Effect::None)
                } else if m.is_active() {
                    (Some(ActiveModal::NameEntry(m)), Effect::None)
                } else {
                    (None, Effect::None)
                }
            }
            ActiveModal::Clone(mut m) => {
                let _ = m.handle_input(key);
                if let Some(name) = m.take_result() {
                    let effect = self.finish_clone(name);
                    (None, effect)
                } else if m.is_active() {
                    (Some(ActiveModal::Clone(m)), Effect::None)
                } else {
                    (None, Effect::None)
                }
            }
            ActiveModal::Rename(mut m) => {
                let _ = m.handle_input(key);
                if let Some(name) = m.take_result() {
                    let effect = self.finish_rename(name);
                    (None, effect)
                } else if m.is_active() {
                    (Some(ActiveModal::Rename(m)), Effect::None)
                } else {
                    (None, Effect::None)
                }
            }
            ActiveModal::UsagePanel(mut m) => {
                let _ = m.handle_input(key);
                if m.is_active() {
                    (Some(ActiveModal::UsagePanel(m)), Effect::None)
                } else {
                    (None, Effect::None)
                }
            }
            ActiveModal::Creator(mut m) => {
                let (_, modal_effect) = m.handle_input(key);
                if let Some((kind, name, content)) = m.take_result() {
                    let effect = self.finish_creator(kind, name, content);
                    (None, effect)
                } else if m.is_active() {
                    (Some(ActiveModal::Creator(m)), self.translate_modal_effect(modal_effect))
                } else {
                    (None, Effect::None)
                }
            }
            ActiveModal::ContentEditor(mut m, target) => {
                let (_, modal_effect) = m.handle_input(key);
                if matches!(modal_effect, pipeloom_modals::ModalEffect::OpenFilePicker) {
                    m.open_picker(self.component_reference_candidates());
                }
                if let Some(pending) = m.take_pending_disk_write() {
                    let effect = self.stage_content_editor_disk_write(&target, pending);
                    return (Some(ActiveModal::ContentEditor(m, target)), effect);
                }
                if let Some(content) = m.take_save_result() {
                    let effect = self.finish_content_edit(&target, content);
                    (None, effect)
                } else if m.is_active() {
                    (Some(ActiveModal::ContentEditor(m, target)), Effect::None)
                } else {
                    (None, Effect::None)
                }
            }
            ActiveModal::TagEditor(mut m, target) => {
                let (_, modal_effect) = m.handle_input(key);
                if let Some(tags) = m.take_commit() {
                    let effect = self.finish_tag_edit(&target, tags);
                    (None, effect)
                } else if m.is_active() {
                    (Some(ActiveModal::TagEditor(m, target)), self.translate_modal_effect(modal_effect))
                } else {
                    (None, Effect::None)
                }
            }
        }
    }

    fn translate_modal_effect(&mut self, effect: pipeloom_modals::ModalEffect) -> Effect {
        match effect {
            pipeloom_modals::ModalEffect::None => Effect::None,
            pipeloom_modals::ModalEffect::Status(msg) => {
                self.status.post(msg);
                Effect::None
            }
            pipeloom_modals::ModalEffect::Reload => {
                if let Err(err) = self.reload_available() {
                    self.error = Some(err.to_string());
                }
                self.apply_filter();
                self.refresh_preview();
                Effect::None
            }
            // Only the content editor's `^f` key produces this, and that
            // path is handled directly in `route_modal_input` rather than
            // through this generic translator.
            pipeloom_modals::ModalEffect::OpenFilePicker => Effect::None,
        }
    }

    fn handle_search_key(&mut self, key: Key) -> Effect {
        use pipeloom_types::KeyCode;
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => self.handle_normal_mode_key(key),
            KeyCode::Char(c) => {
                let mut q = self.search.query().to_string();
                q.push(c);
                self.search.set_query(q);
                self.reapply_search_and_refresh();
                Effect::None
            }
            KeyCode::Backspace => {
                let mut q = self.search.query().to_string();
                q.pop();
                self.search.set_query(q);
                self.reapply_search_and_refresh();
                Effect::None
            }
            _ => Effect::None,
        }
    }

    fn reapply_search_and_refresh(&mut self) {
        if let Err(err) = self.sync_archive_policy_and_filter() {
            self.error = Some(err.to_string());
        }
        self.refresh_preview();
    }

    fn handle_normal_mode_key(&mut self, key: Key) -> Effect {
        let Some(action) = pipeloom_keymap::resolve(key, self.pane) else {
            return Effect::None;
        };
        self.execute_action(action)
    }

    fn execute_action(&mut self, action: BuilderAction) -> Effect {
        match action {
            BuilderAction::CyclePaneForward => {
                self.cycle_pane(true);
                Effect::None
            }
            BuilderAction::CyclePaneBackward => {
                self.cycle_pane(false);
                Effect::None
            }
            BuilderAction::MoveCursorUp => {
                self.move_cursor(-1);
                Effect::None
            }
            BuilderAction::MoveCursorDown => {
                self.move_cursor(1);
                Effect::None
            }
            BuilderAction::PageUp => {
                self.move_cursor(-10);
                Effect::None
            }
            BuilderAction::PageDown => {
                self.move_cursor(10);
                Effect::None
            }
            BuilderAction::JumpHome => {
                self.jump_cursor(true);
                Effect::None
            }
            BuilderAction::JumpEnd => {
                self.jump_cursor(false);
                Effect::None
            }
            BuilderAction::AddOrRemove => self.add_or_remove(),
            BuilderAction::TogglePreview => {
                self.preview_enabled = !self.preview_enabled;
                Effect::None
            }
            BuilderAction::EditTags => self.open_tag_editor(),
            BuilderAction::FocusSearch => {
                self.pane = Pane::Search;
                Effect::None
            }
            BuilderAction::Save => self.save_pipeline(),
            BuilderAction::Delete => self.start_delete(),
            BuilderAction::SaveAndWriteOutput => self.save_and_write_output(),
            BuilderAction::ReorderUp => {
                self.selected.reorder_within_kind(ReorderDirection::Up);
                self.refresh_preview();
                Effect::None
            }
            BuilderAction::ReorderDown => {
                self.selected.reorder_within_kind(ReorderDirection::Down);
                self.refresh_preview();
                Effect::None
            }
            BuilderAction::OpenComponentCreator => {
                let existing = self.all_display_names();
                self.modal = Some(ActiveModal::Creator(ComponentCreatorModal::open(existing)));
                Effect::None
            }
            BuilderAction::OpenExternalEditor => self.open_external_editor(),
            BuilderAction::OpenContentEditor => self.open_content_editor(),
            BuilderAction::OpenUsagePanel => self.open_usage_panel(),
            BuilderAction::StartRename => self.start_rename(),
            BuilderAction::StartClone => self.start_clone(),
            BuilderAction::StartArchive => self.start_archive(),
            BuilderAction::TriggerMermaid => self.trigger_mermaid(),
            BuilderAction::CopyToClipboard => self.copy_to_clipboard(),
            BuilderAction::EscapeOrExit => self.escape_or_exit(),
        }
    }

    fn cycle_pane(&mut self, forward: bool) {
        // Pane-focus cycling skips the search pane unless the user
        // explicitly activates it with `/`.
        loop {
            self.pane = if forward { self.pane.next() } else { self.pane.prev() };
            if self.pane != Pane::Search {
                break;
            }
        }
        self.refresh_preview();
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.pane {
            Pane::Available => {
                self.available.move_cursor(delta);
                self.refresh_preview();
            }
            Pane::Selected => {
                let len = self.selected.len();
                if len > 0 {
                    let next = (self.selected.cursor() as isize + delta).clamp(0, len as isize - 1);
                    self.selected.set_cursor(next as usize);
                }
                self.refresh_preview();
            }
            Pane::Preview => self.preview.scroll_by(delta),
            Pane::Search => {}
        }
    }

    fn jump_cursor(&mut self, to_start: bool) {
        match self.pane {
            Pane::Available => {
                let len = self.available.get_ordered().len();
                self.available.set_cursor(if to_start { 0 } else { len.saturating_sub(1) });
                self.refresh_preview();
            }
            Pane::Selected => {
                let len = self.selected.len();
                self.selected.set_cursor(if to_start { 0 } else { len.saturating_sub(1) });
                self.refresh_preview();
            }
            Pane::Preview => {
                if to_start {
                    self.preview.scroll_to_top();
                } else {
                    self.preview.scroll_to_bottom();
                }
            }
            Pane::Search => {}
        }
    }

    /// `enter`: adds in the available pane, removes in the selected pane.
    fn add_or_remove(&mut self) -> Effect {
        match self.pane {
            Pane::Available => {
                let Some(item) = self.available.current() else {
                    return Effect::None; // enter on an empty available list is a no-op.
                };
                let path = item.item.path.clone();
                let kind = item.item.kind;
                let component_path = pipeloom_types::ComponentPath::from_relative(format!(
                    "components/{}",
                    path.display()
                ));
                if self.selected.contains(&component_path) {
                    if let Some(index) = self.selected.index_of(&component_path) {
                        self.selected.remove(index);
                        self.available.predict_remove(&path);
                    }
                } else {
                    let _ = self
                        .selected
                        .insert(ComponentRef::new(kind, component_path));
                    self.available.predict_add(&path);
                }
                self.refresh_preview();
            }
            Pane::Selected => {
                if self.selected.is_empty() {
                    return Effect::None;
                }
                let cursor = self.selected.cursor();
                if let Some(removed) = self.selected.remove(cursor) {
                    let store_path = component_path_to_store_path(&removed.path);
                    self.available.predict_remove(&store_path);
                }
                self.refresh_preview();
            }
            _ => {}
        }
        Effect::None
    }

    fn all_display_names(&self) -> Vec<String> {
        let catalog = self.available.catalog();
        catalog
            .contexts
            .iter()
            .chain(catalog.prompts.iter())
            .chain(catalog.rules.iter())
            .map(|i| i.display_name.clone())
            .collect()
    }

    /// `../`-relative paths for every cataloged (non-archived) component, in
    /// the form the content editor's file-reference picker inserts verbatim.
    fn component_reference_candidates(&self) -> Vec<String> {
        let catalog = self.available.catalog();
        catalog
            .contexts
            .iter()
            .chain(catalog.prompts.iter())
            .chain(catalog.rules.iter())
            .filter(|i| !i.archived)
            .map(|i| format!("../components/{}", i.path.display()))
            .collect()
    }

    fn open_tag_editor(&mut self) -> Effect {
        let cloud = match self.collab.tags.list() {
            Ok(tags) => tags.into_iter().map(|t| t.name).collect::<Vec<_>>(),
            Err(err) => {
                self.status.post(StatusMessage::error(err.to_string()));
                return Effect::None;
            }
        };
        match self.pane {
            Pane::Available => {
                let Some(item) = self.available.current() else {
                    return Effect::None;
                };
                let path = item.item.path.clone();
                let selected = item.item.tags.clone();
                self.modal = Some(ActiveModal::TagEditor(
                    TagEditorModal::open(cloud, selected, Self::usages_lookup()),
                    TagEditorTarget::Component { path },
                ));
            }
            _ => {
                self.modal = Some(ActiveModal::TagEditor(
                    TagEditorModal::open(cloud, self.pipeline_tags.clone(), Self::usages_lookup()),
                    TagEditorTarget::Pipeline,
                ));
            }
        }
        Effect::None
    }

    fn usages_lookup() -> impl Fn(&str) -> Vec<String> + 'static {
        // The tag registry does not expose a per-tag usage listing; the
        // cloud-pane delete confirmation shows an empty usage list rather
        // than a guess.
        |_tag: &str| Vec::new()
    }

    fn finish_tag_edit(&mut self, target: &TagEditorTarget, tags: Vec<String>) -> Effect {
        match target {
            TagEditorTarget::Component { path } => match self.collab.components.update_tags(path, &tags) {
                Ok(()) => {
                    self.status.post(StatusMessage::success("Tags updated"));
                    if let Err(err) = self.reload_available() {
                        self.error = Some(err.to_string());
                    }
                    self.apply_filter();
                }
                Err(err) => self.status.post(StatusMessage::error(err.to_string())),
            },
            TagEditorTarget::Pipeline => {
                // Write-through only when the pipeline already has a path;
                // otherwise the tag list lives in memory until the first
                // save, and does not by itself mark the pipeline dirty.
                self.pipeline_tags = tags;
                if let Some(path) = self.pipeline_path.clone() {
                    let record = self.current_pipeline_record(path);
                    match self.collab.pipelines.write(&record) {
                        Ok(()) => self.status.post(StatusMessage::success("Tags updated")),
                        Err(err) => self.status.post(StatusMessage::error(err.to_string())),
                    };
                }
            }
        }
        self.refresh_preview();
        Effect::None
    }

    fn open_external_editor(&mut self) -> Effect {
        let Some(path) = self.highlighted_component_path() else {
            return Effect::None;
        };
        self.status.post(StatusMessage::persistent(
            "Editing in external editor \u{2014} save and close to continue",
        ));
        Effect::OpenExternalEditor { path }
    }

    fn highlighted_component_path(&self) -> Option<PathBuf> {
        match self.pane {
            Pane::Selected => self
                .selected
                .refs()
                .get(self.selected.cursor())
                .map(|r| component_path_to_store_path(&r.path)),
            _ => self.available.current().map(|d| d.item.path.clone()),
        }
    }

    fn open_content_editor(&mut self) -> Effect {
        let Some(item) = self.available.current() else {
            return Effect::None;
        };
        let path = item.item.path.clone();
        let kind = item.item.kind;
        let content = match self.collab.components.read(&path) {
            Ok(record) => record.content,
            Err(err) => {
                self.status.post(StatusMessage::error(err.to_string()));
                return Effect::None;
            }
        };
        self.modal = Some(ActiveModal::ContentEditor(
            ContentEditorModal::open(&content),
            ContentEditorTarget { path, kind },
        ));
        Effect::None
    }

    fn stage_content_editor_disk_write(&mut self, target: &ContentEditorTarget, content: String) -> Effect {
        match self.collab.components.write(&target.path, &content) {
            Ok(()) => Effect::OpenExternalEditor { path: target.path.clone() },
            Err(err) => {
                self.status.post(StatusMessage::error(err.to_string()));
                Effect::None
            }
        }
    }

    fn finish_content_edit(&mut self, target: &ContentEditorTarget, content: String) -> Effect {
        Effect::SaveComponentContent {
            path: target.path.clone(),
            content,
        }
    }

    fn open_usage_panel(&mut self) -> Effect {
        let Some(item) = self.available.current() else {
            return Effect::None;
        };
        let target_path = item.item.path.clone();
        let mut entries = Vec::new();
        let active = self.collab.pipelines.list().unwrap_or_default();
        let archived = self.collab.pipelines.list_archived().unwrap_or_default();
        for p in active {
            if let Some(name) = self.pipeline_references(&p, &target_path, false) {
                entries.push(UsageEntry { pipeline_name: name, archived: false });
            }
        }
        for p in archived {
            if let Some(name) = self.pipeline_references(&p, &target_path, true) {
                entries.push(UsageEntry { pipeline_name: name, archived: true });
            }
        }
        self.modal = Some(ActiveModal::UsagePanel(UsagePanelModal::open(entries)));
        Effect::None
    }

    fn pipeline_references(&self, pipeline_path: &Path, target: &Path, _archived: bool) -> Option<String> {
        let record = self.collab.pipelines.read(&pipeline_path.to_string_lossy()).ok()?;
        let referenced = record
            .components
            .iter()
            .any(|r| component_path_to_store_path(&r.path) == target);
        referenced.then_some(record.name)
    }

    fn start_rename(&mut self) -> Effect {
        if self.pane != Pane::Available {
            return Effect::None;
        }
        let Some(item) = self.available.current() else {
            return Effect::None;
        };
        let path = item.item.path.clone();
        let current_name = item.item.display_name.clone();
        let mut active = Vec::new();
        let mut archived_list = Vec::new();
        for p in self.collab.pipelines.list().unwrap_or_default() {
            if let Some(name) = self.pipeline_references(&p, &path, false) {
                active.push(name);
            }
        }
        for p in self.collab.pipelines.list_archived().unwrap_or_default() {
            if let Some(name) = self.pipeline_references(&p, &path, true) {
                archived_list.push(name);
            }
        }
        let slug_fn = {
            let path = path.clone();
            move |name: &str| {
                let _ = &path;
                name.to_lowercase().replace(' ', "-")
            }
        };
        self.modal = Some(ActiveModal::Rename(RenameModal::open(
            &current_name,
            active,
            archived_list,
            slug_fn,
        )));
        Effect::None
    }

    fn finish_rename(&mut self, new_name: String) -> Effect {
        let Some(item) = self.available.current() else {
            return Effect::None;
        };
        let path = item.item.path.clone();
        let slug = self.collab.components.sanitize_name(&new_name);
        let new_path = path.with_file_name(format!("{slug}.md"));
        match self.collab.components.read(&path) {
            Ok(mut record) => {
                record.display_name = new_name;
                if let Err(err) = self.collab.components.write(&new_path, &record.content) {
                    self.status.post(StatusMessage::error(err.to_string()));
                    return Effect::None;
                }
                self.status.post(StatusMessage::success("Component renamed"));
                if let Err(err) = self.reload_available() {
                    self.error = Some(err.to_string());
                }
                self.apply_filter();
            }
            Err(err) => self.status.post(StatusMessage::error(err.to_string())),
        }
        Effect::None
    }

    fn finish_creator(&mut self, kind: Kind, name: String, content: String) -> Effect {
        let slug = self.collab.components.sanitize_name(&name);
        let path = PathBuf::from(kind.dir_name()).join(format!("{slug}.md"));
        match self.collab.components.write(&path, &content) {
            Ok(()) => {
                self.status.post(StatusMessage::success("Component created"));
                if let Err(err) = self.reload_available() {
                    self.error = Some(err.to_string());
                }
                self.apply_filter();
            }
            Err(err) => self.status.post(StatusMessage::error(err.to_string())),
        }
        Effect::None
    }

    fn start_clone(&mut self) -> Effect {
        let Some(item) = self.available.current() else {
            return Effect::None;
        };
        let suggested = format!("{} copy", item.item.display_name);
        self.modal = Some(ActiveModal::Clone(CloneModal::open(&suggested)));
        Effect::None
    }

    fn finish_clone(&mut self, new_name: String) -> Effect {
        let Some(item) = self.available.current() else {
            return Effect::None;
        };
        let path = item.item.path.clone();
        let archived = item.item.archived;
        let record = if archived {
            self.collab.components.read_archived(&path)
        } else {
            self.collab.components.read(&path)
        };
        match record {
            Ok(record) => {
                let slug = self.collab.components.sanitize_name(&new_name);
                let new_path = path.with_file_name(format!("{slug}.md"));
                if let Err(err) = self.collab.components.write(&new_path, &record.content) {
                    self.status.post(StatusMessage::error(err.to_string()));
                    return Effect::None;
                }
                self.status.post(StatusMessage::success("Component cloned"));
                if let Err(err) = self.reload_available() {
                    self.error = Some(err.to_string());
                }
                self.apply_filter();
            }
            Err(err) => self.status.post(StatusMessage::error(err.to_string())),
        }
        Effect::None
    }

    fn start_archive(&mut self) -> Effect {
        if self.pane != Pane::Available {
            return Effect::None;
        }
        let Some(item) = self.available.current() else {
            return Effect::None;
        };
        let path = item.item.path.clone();
        let kind = item.item.kind;
        let currently_archived = item.item.archived;
        let verb = if currently_archived { "Unarchive" } else { "Archive" };
        self.modal = Some(ActiveModal::Confirm(
            ConfirmModal::open(ConfirmKind::Archive, format!("{verb} {}?", item.item.display_name)),
            PendingConfirm::ArchiveComponent { path, kind, currently_archived },
        ));
        Effect::None
    }

    /// `^d`: deletes the right-pane pipeline, or archives/deletes the
    /// left-pane component with confirmation.
    fn start_delete(&mut self) -> Effect {
        match self.pane {
            Pane::Selected => {
                // Delete-pipeline is only offered when the pipeline has a
                // saved path.
                if self.pipeline_path.is_none() {
                    return Effect::None;
                }
                self.modal = Some(ActiveModal::Confirm(
                    ConfirmModal::open(ConfirmKind::Delete, format!("Delete pipeline \"{}\"?", self.pipeline_name)),
                    PendingConfirm::DeletePipeline,
                ));
            }
            _ => {
                let Some(item) = self.available.current() else {
                    return Effect::None;
                };
                let path = item.item.path.clone();
                let kind = item.item.kind;
                self.modal = Some(ActiveModal::Confirm(
                    ConfirmModal::open(ConfirmKind::Delete, format!("Delete {}?", item.item.display_name)),
                    PendingConfirm::DeleteComponent { path, kind },
                ));
            }
        }
        Effect::None
    }

    fn escape_or_exit(&mut self) -> Effect {
        if self.selected.has_unsaved_changes() {
            self.modal = Some(ActiveModal::Confirm(
                ConfirmModal::open(ConfirmKind::Exit, "Discard unsaved changes?"),
                PendingConfirm::Exit,
            ));
            Effect::None
        } else {
            Effect::Quit
        }
    }

    fn resolve_confirm(&mut self, intent: PendingConfirm, decision: bool) -> Effect {
        if !decision {
            return Effect::None;
        }
        match intent {
            PendingConfirm::Exit => Effect::Quit,
            PendingConfirm::DeletePipeline => self.finish_delete_pipeline(),
            PendingConfirm::DeleteComponent { path, kind } => self.finish_delete_component(path, kind),
            PendingConfirm::ArchiveComponent { path, kind: _, currently_archived } => {
                let result = if currently_archived {
                    self.collab.components.unarchive(&path)
                } else {
                    self.collab.components.archive(&path)
                };
                match result {
                    Ok(()) => {
                        let verb = if currently_archived { "Unarchived" } else { "Archived" };
                        self.status.post(StatusMessage::success(format!("{verb} component")));
                        if let Err(err) = self.reload_available() {
                            self.error = Some(err.to_string());
                        }
                        self.apply_filter();
                    }
                    Err(err) => self.status.post(StatusMessage::error(err.to_string())),
                }
                Effect::None
            }
        }
    }

    fn finish_delete_pipeline(&mut self) -> Effect {
        let Some(path) = self.pipeline_path.clone() else {
            return Effect::None;
        };
        match self.collab.pipelines.delete(&path) {
            Ok(()) => {
                self.status.post(StatusMessage::success(format!("Deleted pipeline: {}", self.pipeline_name)));
                let candidates = std::mem::take(&mut self.pipeline_tags);
                self.pipeline_path = None;
                self.selected = SelectedComponents::new(self.section_order.clone());
                self.refresh_preview();
                Effect::CleanupOrphanedTags { candidates }
            }
            Err(err) => {
                self.status.post(StatusMessage::error(err.to_string()));
                Effect::None
            }
        }
    }

    fn finish_delete_component(&mut self, path: PathBuf, _kind: Kind) -> Effect {
        match self.collab.components.archive(&path) {
            Ok(()) => {
                self.status.post(StatusMessage::success("Deleted component"));
                let component_path = pipeloom_types::ComponentPath::from_relative(format!(
                    "components/{}",
                    path.display()
                ));
                if let Some(index) = self.selected.index_of(&component_path) {
                    self.selected.remove(index);
                }
                if let Err(err) = self.reload_available() {
                    self.error = Some(err.to_string());
                }
                self.apply_filter();
                self.refresh_preview();
            }
            Err(err) => self.status.post(StatusMessage::error(err.to_string())),
        }
        Effect::None
    }

    fn save_pipeline(&mut self) -> Effect {
        self.save_pipeline_inner();
        Effect::None
    }

    /// Returns whether the pipeline was actually persisted, so
    /// `save_and_write_output` can bail before composing on a failed save.
    fn save_pipeline_inner(&mut self) -> bool {
        if self.pipeline_name.trim().is_empty() {
            self.status.post(StatusMessage::warning("Pipeline needs a name before saving"));
            return false;
        }
        let slug = self.collab.components.sanitize_name(&self.pipeline_name);
        let path = self.pipeline_path.clone().unwrap_or_else(|| format!("{slug}.yaml"));
        let record = self.current_pipeline_record(path.clone());
        match self.collab.pipelines.write(&record) {
            Ok(()) => {
                self.selected.mark_saved(path.clone());
                self.pipeline_path = Some(path.clone());
                self.status.post(StatusMessage::success(format!("Pipeline saved: {path}")));
                self.available.clear_predictions();
                true
            }
            Err(err) => {
                self.status.post(StatusMessage::error(err.to_string()));
                false
            }
        }
    }

    fn save_and_write_output(&mut self) -> Effect {
        if !self.save_pipeline_inner() {
            return Effect::None;
        }
        let record = self.current_pipeline_record(self.pipeline_path.clone().unwrap_or_default());
        match self.collab.composer.compose(&record) {
            Ok(content) => {
                let output_path = self
                    .output_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(format!("{}.md", self.collab.components.sanitize_name(&self.pipeline_name))));
                Effect::WriteOutput { content, path: output_path }
            }
            Err(err) => {
                self.preview.show_empty(&err.to_string());
                Effect::None
            }
        }
    }

    fn trigger_mermaid(&mut self) -> Effect {
        if self.selected.is_empty() {
            return Effect::None;
        }
        let record = self.current_pipeline_record(self.pipeline_path.clone().unwrap_or_default());
        match self.collab.composer.compose(&record) {
            Ok(content) => Effect::GenerateMermaidDiagram { content },
            Err(err) => {
                self.status.post(StatusMessage::error(err.to_string()));
                Effect::None
            }
        }
    }

    /// `y`: copies the composed output to the clipboard, only if the
    /// pipeline has at least one component.
    fn copy_to_clipboard(&mut self) -> Effect {
        if self.selected.is_empty() {
            return Effect::None;
        }
        let record = self.current_pipeline_record(self.pipeline_path.clone().unwrap_or_default());
        match self.collab.composer.compose(&record) {
            Ok(content) => match self.collab.clipboard.write_all(&content) {
                Ok(()) => self.status.post(StatusMessage::success("Copied to clipboard")),
                Err(err) => self.status.post(StatusMessage::error(err.to_string())),
            },
            Err(err) => self.status.post(StatusMessage::error(err.to_string())),
        };
        Effect::None
    }

    fn current_pipeline_record(&self, path: String) -> PipelineRecord {
        PipelineRecord {
            name: self.pipeline_name.clone(),
            components: self
                .selected
                .refs()
                .iter()
                .map(|r| ComponentRefRecord {
                    kind: r.kind,
                    path: r.path.clone(),
                    order: r.order,
                })
                .collect(),
            tags: self.pipeline_tags.clone(),
            path,
            output_path: self.output_path.clone(),
        }
    }

    fn reload_available(&mut self) -> Result<()> {
        self.available = AvailableComponents::load(
            self.collab.components.as_ref(),
            self.collab.tokens.as_ref(),
            self.section_order.clone(),
            self.include_archived,
        )?;
        Ok(())
    }

    fn searchable_catalog(&self) -> SearchableCatalog {
        let to_items = |items: &[pipeloom_available::ComponentItem]| {
            items
                .iter()
                .map(|i| SearchableItem {
                    path: i.path.clone(),
                    display_name: i.display_name.clone(),
                    tags: i.tags.clone(),
                    archived: i.archived,
                })
                .collect()
        };
        let catalog = self.available.catalog();
        SearchableCatalog {
            contexts: to_items(&catalog.contexts),
            prompts: to_items(&catalog.prompts),
            rules: to_items(&catalog.rules),
        }
    }

    fn apply_filter(&mut self) {
        let catalog = self.searchable_catalog();
        let filtered = self.search.run(self.collab.search.as_mut(), &catalog);
        self.available.set_filtered(ItemsByKind {
            contexts: filtered.contexts,
            prompts: filtered.prompts,
            rules: filtered.rules,
        });
    }

    /// Archive policy: reload with/without archived items before filtering
    /// whenever the query's archive clause changes state.
    fn sync_archive_policy_and_filter(&mut self) -> Result<()> {
        let query = self.search.query().to_string();
        let wants_archived = !query.trim().is_empty() && self.collab.search.query_includes_archived(&query);
        if wants_archived != self.include_archived {
            self.include_archived = wants_archived;
            self.reload_available()?;
        }
        self.apply_filter();
        Ok(())
    }

    fn reconcile_and_refresh(&mut self) {
        self.refresh_preview();
    }

    /// Refreshes the preview: the highlighted component when the
    /// available pane is focused, the composed pipeline otherwise.
    fn refresh_preview(&mut self) {
        match self.pane {
            Pane::Available => match self.available.current() {
                Some(item) => match self.component_record_for(&item.item.path, item.item.archived) {
                    Ok(record) => self.preview.show_highlighted(&record.content, self.collab.tokens.as_ref()),
                    Err(err) => self.preview.show_empty(&err.to_string()),
                },
                None => self.preview.show_empty("No components to preview."),
            },
            _ => {
                if self.selected.is_empty() {
                    self.preview.show_empty("No components to preview.");
                    return;
                }
                let record = self.current_pipeline_record(self.pipeline_path.clone().unwrap_or_default());
                self.preview.show_composed(self.collab.composer.as_ref(), &record, self.collab.tokens.as_ref());
                if self.pane == Pane::Selected {
                    let contents: Vec<String> = self
                        .selected
                        .refs()
                        .iter()
                        .map(|r| {
                            self.component_record_for(&component_path_to_store_path(&r.path), false)
                                .map(|rec| rec.content)
                                .unwrap_or_default()
                        })
                        .collect();
                    self.preview
                        .sync_scroll_to_component(self.selected.cursor(), &contents, self.preview_viewport_height);
                }
            }
        }
    }

    fn component_record_for(&self, path: &Path, archived: bool) -> Result<pipeloom_collab::ComponentRecord> {
        if archived {
            self.collab.components.read_archived(path)
        } else {
            self.collab.components.read(path)
        }
    }
}
