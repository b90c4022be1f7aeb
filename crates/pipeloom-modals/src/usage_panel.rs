use crate::{ModalEffect, SubEditor};
use pipeloom_types::{Key, KeyCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    pub pipeline_name: String,
    pub archived: bool,
}

/// Component-usage overlay: lists every pipeline (active and
/// archived) that references the target component.
pub struct UsagePanelModal {
    active: bool,
    entries: Vec<UsageEntry>,
    sort_ascending: bool,
    cursor: usize,
    scroll: usize,
}

impl UsagePanelModal {
    pub fn open(entries: Vec<UsageEntry>) -> Self {
        let mut modal = Self {
            active: true,
            entries,
            sort_ascending: true,
            cursor: 0,
            scroll: 0,
        };
        modal.resort();
        modal
    }

    pub fn sorted_entries(&self) -> &[UsageEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    fn resort(&mut self) {
        if self.sort_ascending {
            self.entries.sort_by(|a, b| a.pipeline_name.cmp(&b.pipeline_name));
        } else {
            self.entries.sort_by(|a, b| b.pipeline_name.cmp(&a.pipeline_name));
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.entries.is_empty() {
            self.cursor = 0;
            return;
        }
        let max = self.entries.len() as isize - 1;
        let next = (self.cursor as isize + delta).clamp(0, max);
        self.cursor = next as usize;
    }
}

impl SubEditor for UsagePanelModal {
    fn is_active(&self) -> bool {
        self.active
    }

    fn handle_input(&mut self, key: Key) -> (bool, ModalEffect) {
        if !self.active {
            return (false, ModalEffect::None);
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1);
                (true, ModalEffect::None)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1);
                (true, ModalEffect::None)
            }
            KeyCode::PageUp => {
                self.move_cursor(-10);
                (true, ModalEffect::None)
            }
            KeyCode::PageDown => {
                self.move_cursor(10);
                (true, ModalEffect::None)
            }
            KeyCode::Char('s') => {
                self.sort_ascending = !self.sort_ascending;
                self.resort();
                (true, ModalEffect::None)
            }
            KeyCode::Esc => {
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
    use pipeloom_types::KeyModifiers;

    fn press(modal: &mut UsagePanelModal, code: KeyCode) -> (bool, ModalEffect) {
        modal.handle_input(Key::new(code, KeyModifiers::NONE))
    }

    fn fixture() -> UsagePanelModal {
        UsagePanelModal::open(vec![
            UsageEntry { pipeline_name: "zeta".into(), archived: false },
            UsageEntry { pipeline_name: "alpha".into(), archived: true },
        ])
    }

    #[test]
    fn opens_sorted_ascending_by_name() {
        let modal = fixture();
        let names: Vec<_> = modal.sorted_entries().iter().map(|e| e.pipeline_name.clone()).collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn s_toggles_sort_direction() {
        let mut modal = fixture();
        press(&mut modal, KeyCode::Char('s'));
        let names: Vec<_> = modal.sorted_entries().iter().map(|e| e.pipeline_name.clone()).collect();
        assert_eq!(names, vec!["zeta".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn cursor_clamps_to_entry_bounds() {
        let mut modal = fixture();
        press(&mut modal, KeyCode::Up);
        assert_eq!(modal.cursor(), 0);
        press(&mut modal, KeyCode::Down);
        press(&mut modal, KeyCode::Down);
        assert_eq!(modal.cursor(), 1);
    }

    #[test]
    fn esc_closes_panel() {
        let mut modal = fixture();
        press(&mut modal, KeyCode::Esc);
        assert!(!modal.is_active());
    }
}
