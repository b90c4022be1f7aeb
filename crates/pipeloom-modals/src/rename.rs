use crate::{ModalEffect, SubEditor};
use pipeloom_types::{Key, KeyCode};

/// Rename modal. `affected_active`/`affected_archived` are
/// the pipelines that reference the component being renamed, supplied by
/// the controller so this modal never has to query storage itself.
pub struct RenameModal {
    active: bool,
    input: String,
    affected_active: Vec<String>,
    affected_archived: Vec<String>,
    slugify: Box<dyn Fn(&str) -> String>,
    committed: Option<String>,
}

impl RenameModal {
    pub fn open(
        current_name: &str,
        affected_active: Vec<String>,
        affected_archived: Vec<String>,
        slugify: impl Fn(&str) -> String + 'static,
    ) -> Self {
        Self {
            active: true,
            input: current_name.to_string(),
            affected_active,
            affected_archived,
            slugify: Box::new(slugify),
            committed: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn slug_preview(&self) -> String {
        (self.slugify)(self.input.trim())
    }

    pub fn affected_active(&self) -> &[String] {
        &self.affected_active
    }

    pub fn affected_archived(&self) -> &[String] {
        &self.affected_archived
    }

    pub fn take_result(&mut self) -> Option<String> {
        self.committed.take()
    }
}

impl SubEditor for RenameModal {
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

    fn press(modal: &mut RenameModal, code: KeyCode) -> (bool, ModalEffect) {
        modal.handle_input(Key::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn slug_preview_reflects_live_input() {
        let mut modal = RenameModal::open(
            "Old Name",
            vec![],
            vec![],
            |s| s.to_lowercase().replace(' ', "-"),
        );
        for c in " v2".chars() {
            press(&mut modal, KeyCode::Char(c));
        }
        assert_eq!(modal.slug_preview(), "old-name-v2");
    }

    #[test]
    fn enter_commits_trimmed_name() {
        let mut modal = RenameModal::open("a", vec![], vec![], |s| s.to_string());
        press(&mut modal, KeyCode::Char(' '));
        press(&mut modal, KeyCode::Char('b'));
        press(&mut modal, KeyCode::Enter);
        assert_eq!(modal.take_result(), Some("a b".to_string()));
    }

    #[test]
    fn lists_affected_pipelines_separately() {
        let modal = RenameModal::open(
            "a",
            vec!["active-pipe".into()],
            vec!["archived-pipe".into()],
            |s| s.to_string(),
        );
        assert_eq!(modal.affected_active(), ["active-pipe".to_string()]);
        assert_eq!(modal.affected_archived(), ["archived-pipe".to_string()]);
    }

    #[test]
    fn esc_cancels() {
        let mut modal = RenameModal::open("a", vec![], vec![], |s| s.to_string());
        press(&mut modal, KeyCode::Esc);
        assert!(!modal.is_active());
        assert!(modal.take_result().is_none());
    }
}
