use crate::content_editor::ContentEditorModal;
use crate::{ModalEffect, SubEditor};
use pipeloom_status::StatusMessage;
use pipeloom_types::{Key, KeyCode, Kind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatorStep {
    PickKind,
    Name,
    Content,
}

/// Three-step component creator: kind pick -> name input -> content edit.
pub struct ComponentCreatorModal {
    active: bool,
    step: CreatorStep,
    kind_cursor: usize,
    kind: Option<Kind>,
    name_input: String,
    existing_names: Vec<String>,
    editor: Option<ContentEditorModal>,
    result: Option<(Kind, String, String)>,
}

impl ComponentCreatorModal {
    /// `existing_names` is consulted case-insensitively for uniqueness once
    /// the user moves past the name step.
    pub fn open(existing_names: Vec<String>) -> Self {
        Self {
            active: true,
            step: CreatorStep::PickKind,
            kind_cursor: 0,
            kind: None,
            name_input: String::new(),
            existing_names,
            editor: None,
            result: None,
        }
    }

    pub fn step(&self) -> CreatorStep {
        self.step
    }

    pub fn kind_cursor(&self) -> usize {
        self.kind_cursor
    }

    pub fn name_input(&self) -> &str {
        &self.name_input
    }

    pub fn editor(&self) -> Option<&ContentEditorModal> {
        self.editor.as_ref()
    }

    pub fn take_result(&mut self) -> Option<(Kind, String, String)> {
        self.result.take()
    }

    fn name_is_duplicate(&self) -> bool {
        let candidate = self.name_input.trim().to_lowercase();
        self.existing_names
            .iter()
            .any(|n| n.to_lowercase() == candidate)
    }
}

impl SubEditor for ComponentCreatorModal {
    fn is_active(&self) -> bool {
        self.active
    }

    fn handle_input(&mut self, key: Key) -> (bool, ModalEffect) {
        if !self.active {
            return (false, ModalEffect::None);
        }

        match self.step {
            CreatorStep::PickKind => match key.code {
                KeyCode::Up => {
                    self.kind_cursor = self.kind_cursor.saturating_sub(1);
                    (true, ModalEffect::None)
                }
                KeyCode::Down => {
                    self.kind_cursor = (self.kind_cursor + 1).min(Kind::ALL.len() - 1);
                    (true, ModalEffect::None)
                }
                KeyCode::Enter => {
                    self.kind = Some(Kind::ALL[self.kind_cursor]);
                    self.step = CreatorStep::Name;
                    (true, ModalEffect::None)
                }
                KeyCode::Esc => {
                    self.active = false;
                    (true, ModalEffect::None)
                }
                _ => (false, ModalEffect::None),
            },
            CreatorStep::Name => match key.code {
                KeyCode::Char(c) => {
                    self.name_input.push(c);
                    (true, ModalEffect::None)
                }
                KeyCode::Backspace => {
                    self.name_input.pop();
                    (true, ModalEffect::None)
                }
                KeyCode::Enter => {
                    if self.name_input.trim().is_empty() {
                        return (true, ModalEffect::None);
                    }
                    if self.name_is_duplicate() {
                        return (
                            true,
                            ModalEffect::Status(StatusMessage::warning(
                                "A component with that name already exists",
                            )),
                        );
                    }
                    self.editor = Some(ContentEditorModal::open(""));
                    self.step = CreatorStep::Content;
                    (true, ModalEffect::None)
                }
                KeyCode::Esc => {
                    self.active = false;
                    (true, ModalEffect::None)
                }
                _ => (false, ModalEffect::None),
            },
            CreatorStep::Content => {
                let editor = self.editor.as_mut().expect("content step always has an editor");
                let (consumed, effect) = editor.handle_input(key);
                if let Some(content) = editor.take_save_result() {
                    self.result = Some((
                        self.kind.expect("content step always has a kind"),
                        self.name_input.trim().to_string(),
                        content,
                    ));
                    self.active = false;
                } else if !editor.is_active() {
                    // editor closed without saving (exit-confirm "y"): cancel the wizard.
                    self.active = false;
                }
                (consumed, effect)
            }
        }
    }

    fn set_size(&mut self, width: u16, height: u16) {
        if let Some(editor) = self.editor.as_mut() {
            editor.set_size(width, height);
        }
    }
}
