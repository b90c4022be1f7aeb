use crate::{ModalEffect, SubEditor};
use pipeloom_types::{Key, KeyCode};

/// Single-line pre-save name prompt.
#[derive(Debug, Default)]
pub struct NameEntryModal {
    active: bool,
    input: String,
    committed: Option<String>,
}

impl NameEntryModal {
    pub fn open() -> Self {
        Self {
            active: true,
            input: String::new(),
            committed: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Takes the committed name, if `enter` was pressed on non-empty
    /// trimmed text since the last call.
    pub fn take_result(&mut self) -> Option<String> {
        self.committed.take()
    }
}

impl SubEditor for NameEntryModal {
    fn is_active(&self) -> bool {
        self.active
    }

    fn handle_input(&mut self, key: Key) -> (bool, ModalEffect) {
        if !self.active {
            return (false, ModalEffect::None);
        }
        match key.code {
            KeyCode::Enter => {
                let trimmed = self.input.trim();
                if !trimmed.is_empty() {
                    self.committed = Some(trimmed.to_string());
                    self.active = false;
                }
                (true, ModalEffect::None)
            }
            KeyCode::Esc => {
                self.active = false;
                self.committed = None;
                (true, ModalEffect::None)
            }
            KeyCode::Backspace => {
                self.input.pop();
                (true, ModalEffect::None)
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                (true, ModalEffect::None)
            }
            _ => (false, ModalEffect::None),
        }
    }
}
