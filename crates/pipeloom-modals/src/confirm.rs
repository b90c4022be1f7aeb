use crate::{ModalEffect, SubEditor};
use pipeloom_types::{Key, KeyCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    Archive,
    Unarchive,
    Delete,
    Exit,
}

impl ConfirmKind {
    /// Only delete is destructive (y-only, no undo); archive/unarchive are
    /// reversible and the unsaved-changes exit prompt accepts either y or n.
    pub fn is_destructive(self) -> bool {
        matches!(self, ConfirmKind::Delete)
    }
}

/// Shared shape for the archive / delete / exit confirmation dialogs.
pub struct ConfirmModal {
    active: bool,
    kind: ConfirmKind,
    message: String,
    decision: Option<bool>,
}

impl ConfirmModal {
    pub fn open(kind: ConfirmKind, message: impl Into<String>) -> Self {
        Self {
            active: true,
            kind,
            message: message.into(),
            decision: None,
        }
    }

    pub fn kind(&self) -> ConfirmKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn take_result(&mut self) -> Option<bool> {
        self.decision.take()
    }
}

impl SubEditor for ConfirmModal {
    fn is_active(&self) -> bool {
        self.active
    }

    fn handle_input(&mut self, key: Key) -> (bool, ModalEffect) {
        if !self.active {
            return (false, ModalEffect::None);
        }
        match key.code {
            KeyCode::Char('y') => {
                self.decision = Some(true);
                self.active = false;
                (true, ModalEffect::None)
            }
            KeyCode::Char('n') if !self.kind.is_destructive() => {
                self.decision = Some(false);
                self.active = false;
                (true, ModalEffect::None)
            }
            KeyCode::Esc => {
                self.decision = Some(false);
                self.active = false;
                (true, ModalEffect::None)
            }
            _ => (true, ModalEffect::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeloom_types::KeyModifiers;

    fn press(modal: &mut ConfirmModal, c: char) -> (bool, ModalEffect) {
        modal.handle_input(Key::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn destructive_confirm_ignores_n() {
        let mut modal = ConfirmModal::open(ConfirmKind::Delete, "delete this?");
        press(&mut modal, 'n');
        assert!(modal.is_active());
        assert!(modal.take_result().is_none());
    }

    #[test]
    fn safe_confirm_accepts_n_as_cancel() {
        let mut modal = ConfirmModal::open(ConfirmKind::Exit, "discard unsaved changes?");
        press(&mut modal, 'n');
        assert!(!modal.is_active());
        assert_eq!(modal.take_result(), Some(false));
    }

    #[test]
    fn y_always_confirms() {
        let mut modal = ConfirmModal::open(ConfirmKind::Archive, "archive this?");
        press(&mut modal, 'y');
        assert_eq!(modal.take_result(), Some(true));
    }

    #[test]
    fn esc_always_cancels_even_destructive() {
        let mut modal = ConfirmModal::open(ConfirmKind::Delete, "delete this?");
        modal.handle_input(Key::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(modal.take_result(), Some(false));
    }
}
