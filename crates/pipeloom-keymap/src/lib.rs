//! Crossterm key translation and normal-mode bindings (ambient stack).
//!
//! Two responsibilities: turn crossterm's `KeyEvent` into the
//! backend-independent `pipeloom_types::Key`, and resolve a `Key` plus the
//! currently focused pane into the logical `BuilderAction` the exhaustive
//! binding table names. Several keys are pane-dependent (`enter`,
//! `t`, `^d`, `K`/`J`), so resolution always takes the focused pane.

use pipeloom_types::{Key, KeyCode, KeyModifiers, Pane};

pub fn from_crossterm(event: crossterm::event::KeyEvent) -> Option<Key> {
    use crossterm::event::KeyCode as CCode;
    let code = match event.code {
        CCode::Char(c) => KeyCode::Char(c),
        CCode::Enter => KeyCode::Enter,
        CCode::Esc => KeyCode::Esc,
        CCode::Tab => KeyCode::Tab,
        CCode::BackTab => KeyCode::BackTab,
        CCode::Backspace => KeyCode::Backspace,
        CCode::Delete => KeyCode::Delete,
        CCode::Up => KeyCode::Up,
        CCode::Down => KeyCode::Down,
        CCode::Left => KeyCode::Left,
        CCode::Right => KeyCode::Right,
        CCode::Home => KeyCode::Home,
        CCode::End => KeyCode::End,
        CCode::PageUp => KeyCode::PageUp,
        CCode::PageDown => KeyCode::PageDown,
        _ => return None,
    };

    let mut modifiers = KeyModifiers::NONE;
    let source = event.modifiers;
    if source.contains(crossterm::event::KeyModifiers::SHIFT) {
        modifiers |= KeyModifiers::SHIFT;
    }
    if source.contains(crossterm::event::KeyModifiers::CONTROL) {
        modifiers |= KeyModifiers::CTRL;
    }
    if source.contains(crossterm::event::KeyModifiers::ALT) {
        modifiers |= KeyModifiers::ALT;
    }
    Some(Key::new(code, modifiers))
}

/// Every normal-mode binding the builder names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderAction {
    CyclePaneForward,
    CyclePaneBackward,
    MoveCursorUp,
    MoveCursorDown,
    PageUp,
    PageDown,
    JumpHome,
    JumpEnd,
    /// `enter`: adds in the available pane, removes in the selected pane.
    AddOrRemove,
    TogglePreview,
    /// `t`: edits the left-pane component's tags, or the right-pane
    /// pipeline's tags, depending on focus.
    EditTags,
    FocusSearch,
    Save,
    /// `^d`: deletes the right-pane pipeline, or archives/deletes the
    /// left-pane component with confirmation.
    Delete,
    SaveAndWriteOutput,
    /// `K`/`J`: reorder within kind. Only bound when the selected pane has
    /// focus.
    ReorderUp,
    ReorderDown,
    OpenComponentCreator,
    OpenExternalEditor,
    OpenContentEditor,
    OpenUsagePanel,
    StartRename,
    StartClone,
    StartArchive,
    TriggerMermaid,
    CopyToClipboard,
    /// `esc`: dismiss, or open the exit-confirm modal if there are unsaved
    /// changes (the controller decides which, based on model state).
    EscapeOrExit,
}

/// Resolves a key press in normal mode (no modal active) to a
/// `BuilderAction`, or `None` if the key has no normal-mode binding. `pane`
/// disambiguates the handful of bindings that carry pane-dependent
/// meaning.
pub fn resolve(key: Key, pane: Pane) -> Option<BuilderAction> {
    use BuilderAction::*;

    if key.modifiers.contains(KeyModifiers::CTRL) {
        return match key.code {
            KeyCode::Char('s') => Some(Save),
            KeyCode::Char('d') => Some(Delete),
            KeyCode::Char('x') => Some(OpenExternalEditor),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Tab => Some(CyclePaneForward),
        KeyCode::BackTab => Some(CyclePaneBackward),
        KeyCode::Up => Some(MoveCursorUp),
        KeyCode::Down => Some(MoveCursorDown),
        KeyCode::PageUp => Some(PageUp),
        KeyCode::PageDown => Some(PageDown),
        KeyCode::Home => Some(JumpHome),
        KeyCode::End => Some(JumpEnd),
        KeyCode::Enter => Some(AddOrRemove),
        KeyCode::Esc => Some(EscapeOrExit),
        KeyCode::Char('j') => Some(MoveCursorDown),
        KeyCode::Char('k') => Some(MoveCursorUp),
        KeyCode::Char('p') => Some(TogglePreview),
        KeyCode::Char('t') => Some(EditTags),
        KeyCode::Char('/') => Some(FocusSearch),
        KeyCode::Char('S') => Some(SaveAndWriteOutput),
        KeyCode::Char('K') if pane == Pane::Selected => Some(ReorderUp),
        KeyCode::Char('J') if pane == Pane::Selected => Some(ReorderDown),
        KeyCode::Char('n') => Some(OpenComponentCreator),
        KeyCode::Char('e') => Some(OpenContentEditor),
        KeyCode::Char('u') => Some(OpenUsagePanel),
        KeyCode::Char('R') => Some(StartRename),
        KeyCode::Char('C') => Some(StartClone),
        KeyCode::Char('a') => Some(StartArchive),
        KeyCode::Char('M') => Some(TriggerMermaid),
        KeyCode::Char('y') => Some(CopyToClipboard),
        _ => None,
    }
}
