use crate::{ModalEffect, SubEditor};
use pipeloom_types::{Key, KeyCode, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Input,
    Cloud,
}

/// Registry-wide delete confirmation raised from the cloud pane's `^d`.
#[derive(Debug, Clone)]
pub struct TagDeleteRequest {
    pub name: String,
    pub usages: Vec<String>,
}

/// Two-pane tag editor. `cloud` is the full registry, filtered
/// live by the input text; `selected` is the tag set on the item being
/// edited.
pub struct TagEditorModal {
    active: bool,
    pane: Pane,
    input: String,
    cloud: Vec<String>,
    selected: Vec<String>,
    cloud_cursor: usize,
    pending_delete: Option<TagDeleteRequest>,
    usages_lookup: Box<dyn Fn(&str) -> Vec<String>>,
    committed: Option<Vec<String>>,
}

impl TagEditorModal {
    pub fn open(
        cloud: Vec<String>,
        selected: Vec<String>,
        usages_lookup: impl Fn(&str) -> Vec<String> + 'static,
    ) -> Self {
        Self {
            active: true,
            pane: Pane::Input,
            input: String::new(),
            cloud,
            selected,
            cloud_cursor: 0,
            pending_delete: None,
            usages_lookup: Box::new(usages_lookup),
            committed: None,
        }
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Cloud tags matching the live input, case-insensitively.
    pub fn filtered_cloud(&self) -> Vec<&str> {
        if self.input.is_empty() {
            self.cloud.iter().map(String::as_str).collect()
        } else {
            let needle = self.input.to_lowercase();
            self.cloud
                .iter()
                .filter(|t| t.to_lowercase().contains(&needle))
                .map(String::as_str)
                .collect()
        }
    }

    pub fn pending_delete(&self) -> Option<&TagDeleteRequest> {
        self.pending_delete.as_ref()
    }

    pub fn take_commit(&mut self) -> Option<Vec<String>> {
        self.committed.take()
    }

    fn add_tag(&mut self, tag: &str) {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return;
        }
        let already = self
            .selected
            .iter()
            .any(|t| t.eq_ignore_ascii_case(trimmed));
        if !already {
            self.selected.push(trimmed.to_string());
        }
    }

    fn remove_selected_at_cursor(&mut self) {
        let filtered = self.filtered_cloud();
        if let Some(tag) = filtered.get(self.cloud_cursor).map(|s| s.to_string()) {
            self.selected.retain(|t| !t.eq_ignore_ascii_case(&tag));
        }
        let len = self.filtered_cloud().len();
        if len > 0 {
            self.cloud_cursor = self.cloud_cursor.min(len - 1);
        } else {
            self.cloud_cursor = 0;
        }
    }

    fn request_registry_delete(&mut self) {
        let filtered = self.filtered_cloud();
        if let Some(tag) = filtered.get(self.cloud_cursor).map(|s| s.to_string()) {
            let usages = (self.usages_lookup)(&tag);
            self.pending_delete = Some(TagDeleteRequest { name: tag, usages });
        }
    }
}

impl SubEditor for TagEditorModal {
    fn is_active(&self) -> bool {
        self.active
    }

    fn handle_input(&mut self, key: Key) -> (bool, ModalEffect) {
        if !self.active {
            return (false, ModalEffect::None);
        }

        if let Some(_pending) = &self.pending_delete {
            return match key.code {
                KeyCode::Char('y') => {
                    let removed = self.pending_delete.take().unwrap();
                    self.cloud.retain(|t| t != &removed.name);
                    self.selected.retain(|t| t != &removed.name);
                    (true, ModalEffect::Reload)
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.pending_delete = None;
                    (true, ModalEffect::None)
                }
                _ => (true, ModalEffect::None),
            };
        }

        if key.code == KeyCode::Tab {
            self.pane = match self.pane {
                Pane::Input => Pane::Cloud,
                Pane::Cloud => Pane::Input,
            };
            return (true, ModalEffect::None);
        }

        if key.modifiers.contains(KeyModifiers::CTRL) {
            return match (self.pane, key.code) {
                (Pane::Cloud, KeyCode::Char('d')) => {
                    self.request_registry_delete();
                    (true, ModalEffect::None)
                }
                (Pane::Input, KeyCode::Char('d')) => {
                    self.remove_selected_at_cursor();
                    (true, ModalEffect::None)
                }
                (_, KeyCode::Char('s')) => {
                    self.committed = Some(self.selected.clone());
                    self.active = false;
                    (true, ModalEffect::None)
                }
                _ => (false, ModalEffect::None),
            };
        }

        match (self.pane, key.code) {
            (Pane::Input, KeyCode::Char(c)) => {
                // h/j/k/l are ordinary text while the input pane is focused.
                self.input.push(c);
                (true, ModalEffect::None)
            }
            (Pane::Input, KeyCode::Backspace) => {
                self.input.pop();
                (true, ModalEffect::None)
            }
            (Pane::Input, KeyCode::Enter) => {
                let tag = self.input.clone();
                self.add_tag(&tag);
                self.input.clear();
                (true, ModalEffect::None)
            }
            (Pane::Cloud, KeyCode::Char('j')) | (Pane::Cloud, KeyCode::Down) => {
                let len = self.filtered_cloud().len();
                if len > 0 {
                    self.cloud_cursor = (self.cloud_cursor + 1).min(len - 1);
                }
                (true, ModalEffect::None)
            }
            (Pane::Cloud, KeyCode::Char('k')) | (Pane::Cloud, KeyCode::Up) => {
                self.cloud_cursor = self.cloud_cursor.saturating_sub(1);
                (true, ModalEffect::None)
            }
            (Pane::Cloud, KeyCode::Char('h')) | (Pane::Cloud, KeyCode::Char('l')) => {
                (true, ModalEffect::None)
            }
            (Pane::Cloud, KeyCode::Enter) => {
                let filtered = self.filtered_cloud();
                if let Some(tag) = filtered.get(self.cloud_cursor).map(|s| s.to_string()) {
                    self.add_tag(&tag);
                }
                (true, ModalEffect::None)
            }
            (_, KeyCode::Esc) => {
                self.active = false;
                (true, ModalEffect::None)
            }
            _ => (false, ModalEffect::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(modal: &mut TagEditorModal, code: KeyCode) -> (bool, ModalEffect) {
        modal.handle_input(Key::new(code, KeyModifiers::NONE))
    }

    fn press_ctrl(modal: &mut TagEditorModal, c: char) -> (bool, ModalEffect) {
        modal.handle_input(Key::new(KeyCode::Char(c), KeyModifiers::CTRL))
    }

    fn fixture() -> TagEditorModal {
        TagEditorModal::open(
            vec!["rust".into(), "testing".into()],
            vec!["rust".into()],
            |tag| vec![format!("pipeline-using-{tag}")],
        )
    }

    #[test]
    fn hjkl_are_literal_text_in_input_pane() {
        let mut modal = fixture();
        press(&mut modal, KeyCode::Char('j'));
        assert_eq!(modal.input(), "j");
    }

    #[test]
    fn tab_switches_pane_and_hjkl_navigate_cloud() {
        let mut modal = fixture();
        press(&mut modal, KeyCode::Tab);
        assert_eq!(modal.pane(), Pane::Cloud);
        press(&mut modal, KeyCode::Char('j'));
        assert_eq!(modal.cloud_cursor, 1);
    }

    #[test]
    fn enter_in_input_pane_adds_new_tag_once() {
        let mut modal = fixture();
        for c in "newtag".chars() {
            press(&mut modal, KeyCode::Char(c));
        }
        press(&mut modal, KeyCode::Enter);
        assert!(modal.selected().contains(&"newtag".to_string()));
        assert_eq!(modal.input(), "");

        for c in "RUST".chars() {
            press(&mut modal, KeyCode::Char(c));
        }
        press(&mut modal, KeyCode::Enter);
        assert_eq!(
            modal.selected().iter().filter(|t| t.eq_ignore_ascii_case("rust")).count(),
            1
        );
    }

    #[test]
    fn ctrl_d_in_cloud_pane_opens_registry_delete_confirmation() {
        let mut modal = fixture();
        press(&mut modal, KeyCode::Tab);
        press_ctrl(&mut modal, 'd');
        let pending = modal.pending_delete().unwrap();
        assert_eq!(pending.name, "rust");
        assert_eq!(pending.usages, vec!["pipeline-using-rust".to_string()]);
    }

    #[test]
    fn confirming_registry_delete_removes_from_cloud_and_selected() {
        let mut modal = fixture();
        press(&mut modal, KeyCode::Tab);
        press_ctrl(&mut modal, 'd');
        let (_, effect) = press(&mut modal, KeyCode::Char('y'));
        assert!(matches!(effect, ModalEffect::Reload));
        assert!(!modal.cloud.contains(&"rust".to_string()));
        assert!(!modal.selected().contains(&"rust".to_string()));
    }

    #[test]
    fn ctrl_d_in_input_pane_removes_tag_from_current_item_only() {
        let mut modal = fixture();
        press_ctrl(&mut modal, 'd');
        assert!(!modal.selected().contains(&"rust".to_string()));
        assert!(modal.cloud.contains(&"rust".to_string()));
    }

    #[test]
    fn ctrl_s_commits_selected_tags() {
        let mut modal = fixture();
        press_ctrl(&mut modal, 's');
        assert_eq!(modal.take_commit(), Some(vec!["rust".to_string()]));
        assert!(!modal.is_active());
    }
}
