//! Shared vocabulary used across every Pipeline Builder crate.
//!
//! Kept deliberately tiny and dependency-free (beyond `serde`) so it sits at
//! the bottom of the workspace dependency graph: every other crate may
//! depend on it without risking a cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of component a pipeline can reference.
///
/// Ordering here is declaration order only; the *display* order used to
/// partition a selected list is a configured [`SectionOrder`], not this
/// enum's declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Context,
    Prompt,
    Rules,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Context, Kind::Prompt, Kind::Rules];

    /// Directory name this kind's components live under, relative to the
    /// component store root (e.g. `components/contexts/`).
    pub fn dir_name(self) -> &'static str {
        match self {
            Kind::Context => "contexts",
            Kind::Prompt => "prompts",
            Kind::Rules => "rules",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Context => "context",
            Kind::Prompt => "prompt",
            Kind::Rules => "rules",
        };
        f.write_str(s)
    }
}

/// The configured ordering of [`Kind`]s used to partition a selected list
/// into contiguous runs. Defaults to contexts -> prompts -> rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOrder(Vec<Kind>);

impl Default for SectionOrder {
    fn default() -> Self {
        Self(vec![Kind::Context, Kind::Prompt, Kind::Rules])
    }
}

impl SectionOrder {
    /// Construct from an explicit order. Panics in debug builds if any
    /// `Kind` is missing or duplicated — config validation should have
    /// caught this before the value reaches here.
    pub fn new(order: Vec<Kind>) -> Self {
        debug_assert_eq!(order.len(), Kind::ALL.len(), "section order must name every kind exactly once");
        for k in Kind::ALL {
            debug_assert!(order.contains(&k), "section order missing {k}");
        }
        Self(order)
    }

    pub fn as_slice(&self) -> &[Kind] {
        &self.0
    }

    /// Rank of `kind` within this order (0 = first section). Used to sort a
    /// selected list into kind-partitioned runs.
    pub fn rank(&self, kind: Kind) -> usize {
        self.0.iter().position(|k| *k == kind).unwrap_or(usize::MAX)
    }
}

/// A filesystem-relative path identifying a component, always stored with
/// the `../` prefix a pipeline file uses to reach into the sibling
/// `components/` tree from the `pipelines/` directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentPath(String);

impl ComponentPath {
    /// Build from a path that is already relative to the pipelines
    /// directory; ensures the required `../` prefix.
    pub fn from_relative(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.starts_with("../") {
            Self(path)
        } else {
            Self(format!("../{path}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Focus State: which pane currently owns cursor input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Search,
    Available,
    Selected,
    Preview,
}

impl Pane {
    pub const ORDER: [Pane; 4] = [Pane::Search, Pane::Available, Pane::Selected, Pane::Preview];

    pub fn next(self) -> Pane {
        let idx = Self::ORDER.iter().position(|p| *p == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Pane {
        let idx = Self::ORDER.iter().position(|p| *p == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

bitflags::bitflags! {
    /// Mirrors crossterm's modifier bits so every crate above the keymap
    /// layer can reason about input without depending on crossterm itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

/// A logical key, independent of the terminal backend. `pipeloom-keymap`
/// translates crossterm's `KeyEvent` into this; every pane and modal above
/// it only ever sees `Key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub fn is_ctrl(&self, c: char) -> bool {
        self.modifiers.contains(KeyModifiers::CTRL) && self.code == KeyCode::Char(c)
    }

    pub fn is_char(&self, c: char) -> bool {
        self.modifiers.intersection(KeyModifiers::CTRL | KeyModifiers::ALT).is_empty()
            && self.code == KeyCode::Char(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_order_defaults_to_context_prompt_rules() {
        let order = SectionOrder::default();
        assert_eq!(order.as_slice(), [Kind::Context, Kind::Prompt, Kind::Rules]);
        assert_eq!(order.rank(Kind::Context), 0);
        assert_eq!(order.rank(Kind::Prompt), 1);
        assert_eq!(order.rank(Kind::Rules), 2);
    }

    #[test]
    fn component_path_always_prefixed() {
        let a = ComponentPath::from_relative("components/contexts/readme.md");
        assert_eq!(a.as_str(), "../components/contexts/readme.md");
        let b = ComponentPath::from_relative("../components/rules/style.md");
        assert_eq!(b.as_str(), "../components/rules/style.md");
    }

    #[test]
    fn pane_cycles_forward_and_wraps() {
        assert_eq!(Pane::Search.next(), Pane::Available);
        assert_eq!(Pane::Preview.next(), Pane::Search);
        assert_eq!(Pane::Search.prev(), Pane::Preview);
    }

    #[test]
    fn ctrl_helper_only_matches_with_ctrl_held() {
        let key = Key::ctrl('s');
        assert!(key.is_ctrl('s'));
        assert!(!Key::char('s').is_ctrl('s'));
    }

    #[test]
    fn is_char_excludes_ctrl_and_alt_combinations() {
        assert!(Key::char('j').is_char('j'));
        assert!(!Key::ctrl('j').is_char('j'));
        assert!(!Key::new(KeyCode::Char('j'), KeyModifiers::ALT).is_char('j'));
    }
}
