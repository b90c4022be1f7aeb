use crate::{ModalEffect, SubEditor};
use pipeloom_types::{Key, KeyCode};

/// Clone modal: prompts for a new display name. The controller preserves
/// archived-ness of the clone and reloads the catalog on success, since
/// both require storage access this modal doesn't have.
pub struct CloneModal {
    active: bool,
    input: String,
    committed: Option<String>,
}

impl CloneModal {
    pub fn open(suggested_name: &str) -> Self {
        Self {
            active: true,
            input: suggested_name.to_string(),
            committed: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn take_result(&mut self) -> Option<String> {
        self.committed.take()
    }
}

impl SubEditor for CloneModal {
    fn is_active(&self) -> bool {
        self.active
    }

    fn handle_input(&mut self, key: Key) -> (bool, ModalEffect) {
        if !self.active {
            return (false, ModalEffect::None);
        }
        match key.code {
            KeyCode::Char(c) => {
                self.input.push(c);
                (true, ModalEffect::None)
            }
            KeyCode::Backspace => {
                self.input.pop();
                (true, ModalEffect::None)
            }
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
            _ => (false, ModalEffect::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeloom_types::KeyModifiers;

    fn press(modal: &mut CloneModal, code: KeyCode) -> (bool, ModalEffect) {
        modal.handle_input(Key::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn opens_prefilled_with_suggested_name() {
        let modal = CloneModal::open("readme copy");
        assert_eq!(modal.input(), "readme copy");
    }

    #[test]
    fn enter_commits_the_edited_name() {
        let mut modal = CloneModal::open("readme");
        press(&mut modal, KeyCode::Char(' '));
        press(&mut modal, KeyCode::Char('2'));
        press(&mut modal, KeyCode::Enter);
        assert_eq!(modal.take_result(), Some("readme 2".to_string()));
        assert!(!modal.is_active());
    }
}
