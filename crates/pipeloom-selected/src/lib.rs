//! Selected-Components Model.
//!
//! Owns the working copy of a pipeline's `ComponentRef` sequence: insertion,
//! removal, intra-kind reorder, and the regrouping pass (`reorganize`) that
//! keeps the list kind-partitioned with dense, ascending `order` values.
//! Also tracks the "original" snapshot captured on load/save, used to answer
//! `has_unsaved_changes`.
//!
//! Invariants enforced after every public mutator:
//! * refs are partitioned into contiguous kind runs, ordered per the
//!   configured [`SectionOrder`];
//! * `order` is dense, ascending, and equals `index + 1`;
//! * no two refs share a path;
//! * cursor is in `[0, len)`, or `0` when empty.

use pipeloom_types::{ComponentPath, Kind, SectionOrder};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    pub kind: Kind,
    pub path: ComponentPath,
    pub order: u32,
}

impl ComponentRef {
    pub fn new(kind: Kind, path: ComponentPath) -> Self {
        Self { kind, path, order: 0 }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectedError {
    #[error("component already selected")]
    DuplicatePath,
}

/// Direction for `reorder_within_kind`: `Up` swaps the cursor item with its
/// predecessor (key `K`), `Down` with its successor (key `J`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

impl ReorderDirection {
    fn delta(self) -> isize {
        match self {
            ReorderDirection::Up => -1,
            ReorderDirection::Down => 1,
        }
    }
}

pub struct SelectedComponents {
    refs: Vec<ComponentRef>,
    order: SectionOrder,
    cursor: usize,
    original_snapshot: Vec<ComponentRef>,
    saved_path: Option<String>,
}

impl SelectedComponents {
    pub fn new(order: SectionOrder) -> Self {
        Self {
            refs: Vec::new(),
            order,
            cursor: 0,
            original_snapshot: Vec::new(),
            saved_path: None,
        }
    }

    /// Initialize from a freshly loaded pipeline. The loaded refs are
    /// reorganized defensively (storage is not trusted to have kept the
    /// invariant) and immediately snapshotted as "original" so
    /// `has_unsaved_changes` starts false.
    pub fn load(order: SectionOrder, refs: Vec<ComponentRef>, saved_path: String) -> Self {
        let mut me = Self {
            refs,
            order,
            cursor: 0,
            original_snapshot: Vec::new(),
            saved_path: Some(saved_path),
        };
        me.reorganize();
        me.original_snapshot = me.refs.clone();
        me
    }

    pub fn refs(&self) -> &[ComponentRef] {
        &self.refs
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = Self::clamp(index, self.refs.len());
    }

    pub fn index_of(&self, path: &ComponentPath) -> Option<usize> {
        self.refs.iter().position(|r| &r.path == path)
    }

    pub fn contains(&self, path: &ComponentPath) -> bool {
        self.index_of(path).is_some()
    }

    /// Append `r`, reorganize, and move the cursor to the inserted ref's
    /// final position.
    pub fn insert(&mut self, r: ComponentRef) -> Result<(), SelectedError> {
        if self.contains(&r.path) {
            return Err(SelectedError::DuplicatePath);
        }
        let path = r.path.clone();
        self.refs.push(r);
        self.reorganize();
        self.cursor = self.index_of(&path).unwrap_or(0);
        Ok(())
    }

    /// Remove the ref at `index`, reorganize, and clamp the cursor to the
    /// nearest surviving element of the same kind.
    pub fn remove(&mut self, index: usize) -> Option<ComponentRef> {
        if index >= self.refs.len() {
            return None;
        }
        let removed = self.refs.remove(index);
        self.reorganize();
        self.cursor = Self::nearest_of_kind(&self.refs, index, removed.kind);
        Some(removed)
    }

    /// Swap the cursor item with its same-kind neighbour. No-op (returns
    /// `false`) across kind boundaries or at a list edge.
    pub fn reorder_within_kind(&mut self, direction: ReorderDirection) -> bool {
        if self.refs.is_empty() {
            return false;
        }
        let i = self.cursor;
        let j = i as isize + direction.delta();
        if j < 0 || j as usize >= self.refs.len() {
            return false;
        }
        let j = j as usize;
        if self.refs[i].kind != self.refs[j].kind {
            return false;
        }
        self.refs.swap(i, j);
        self.reassign_order();
        self.cursor = j;
        true
    }

    /// Regroup by the configured section order, preserving intra-kind
    /// relative order (stable sort), then rewrite `order` to `index + 1`.
    /// Idempotent: calling twice in a row is a no-op the second time.
    pub fn reorganize(&mut self) {
        self.refs.sort_by_key(|r| self.order.rank(r.kind));
        self.reassign_order();
    }

    fn reassign_order(&mut self) {
        for (i, r) in self.refs.iter_mut().enumerate() {
            r.order = (i + 1) as u32;
        }
    }

    fn nearest_of_kind(refs: &[ComponentRef], around: usize, kind: Kind) -> usize {
        if refs.is_empty() {
            return 0;
        }
        let same_kind: Vec<usize> = refs
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == kind)
            .map(|(i, _)| i)
            .collect();
        if same_kind.is_empty() {
            return Self::clamp(around, refs.len());
        }
        *same_kind
            .iter()
            .min_by_key(|&&i| (i as isize - around as isize).abs())
            .unwrap()
    }

    fn clamp(index: usize, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            index.min(len - 1)
        }
    }

    /// True iff (no saved path and non-empty) or (length differs from the
    /// snapshot) or (any positional path differs). Tag edits on the
    /// pipeline never alone flip this.
    pub fn has_unsaved_changes(&self) -> bool {
        if self.saved_path.is_none() && !self.refs.is_empty() {
            return true;
        }
        if self.refs.len() != self.original_snapshot.len() {
            return true;
        }
        self.refs
            .iter()
            .zip(self.original_snapshot.iter())
            .any(|(a, b)| a.path != b.path)
    }

    pub fn saved_path(&self) -> Option<&str> {
        self.saved_path.as_deref()
    }

    /// Record that the current list was just persisted as `path`.
    pub fn mark_saved(&mut self, path: String) {
        self.saved_path = Some(path);
        self.original_snapshot = self.refs.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> ComponentPath {
        ComponentPath::from_relative(s)
    }

    fn refs_fixture() -> Vec<(Kind, &'static str)> {
        vec![
            (Kind::Context, "components/contexts/a.md"),
            (Kind::Prompt, "components/prompts/b.md"),
            (Kind::Prompt, "components/prompts/c.md"),
            (Kind::Prompt, "components/prompts/d.md"),
            (Kind::Rules, "components/rules/e.md"),
        ]
    }

    fn build() -> SelectedComponents {
        let mut sc = SelectedComponents::new(SectionOrder::default());
        for (kind, p) in refs_fixture() {
            sc.insert(ComponentRef::new(kind, path(p))).unwrap();
        }
        sc
    }

    #[test]
    fn insert_appends_reorganizes_and_moves_cursor() {
        let mut sc = SelectedComponents::new(SectionOrder::default());
        sc.insert(ComponentRef::new(Kind::Rules, path("components/rules/style.md")))
            .unwrap();
        sc.insert(ComponentRef::new(Kind::Context, path("components/contexts/readme.md")))
            .unwrap();
        // contexts sort ahead of rules even though rules was inserted first.
        assert_eq!(sc.refs()[0].kind, Kind::Context);
        assert_eq!(sc.refs()[1].kind, Kind::Rules);
        assert_eq!(sc.refs()[0].order, 1);
        assert_eq!(sc.refs()[1].order, 2);
        assert_eq!(sc.cursor(), 1); // cursor follows the just-inserted rules ref
    }

    #[test]
    fn insert_rejects_duplicate_path() {
        let mut sc = build();
        let err = sc
            .insert(ComponentRef::new(Kind::Context, path("components/contexts/a.md")))
            .unwrap_err();
        assert_eq!(err, SelectedError::DuplicatePath);
        assert_eq!(sc.len(), 5);
    }

    #[test]
    fn remove_clamps_cursor_to_nearest_same_kind() {
        let mut sc = build();
        // indices: 0=a(ctx) 1=b(prompt) 2=c(prompt) 3=d(prompt) 4=e(rules)
        sc.remove(2); // remove c
        // remaining prompts are b(idx1), d(idx2); nearest to original index 2 is idx2 (d).
        assert_eq!(sc.cursor(), 2);
        assert_eq!(sc.refs()[sc.cursor()].kind, Kind::Prompt);
    }

    #[test]
    fn remove_falls_back_to_clamp_when_kind_exhausted() {
        let mut sc = SelectedComponents::new(SectionOrder::default());
        sc.insert(ComponentRef::new(Kind::Context, path("components/contexts/a.md")))
            .unwrap();
        sc.insert(ComponentRef::new(Kind::Rules, path("components/rules/b.md")))
            .unwrap();
        sc.set_cursor(0);
        sc.remove(0); // only rules item remains
        assert_eq!(sc.len(), 1);
        assert_eq!(sc.cursor(), 0);
    }

    #[test]
    fn reorder_within_kind_swaps_and_rewrites_order() {
        let mut sc = build();
        sc.set_cursor(2); // c (prompt)
        assert!(sc.reorder_within_kind(ReorderDirection::Up)); // swap with b
        assert_eq!(sc.refs()[1].path, path("components/prompts/c.md"));
        assert_eq!(sc.refs()[2].path, path("components/prompts/b.md"));
        assert_eq!(sc.refs()[1].order, 2);
        assert_eq!(sc.refs()[2].order, 3);
        assert_eq!(sc.cursor(), 1);
    }

    #[test]
    fn reorder_across_kind_boundary_is_noop() {
        let mut sc = build();
        sc.set_cursor(0); // a (context), neighbour down is b (prompt)
        assert!(!sc.reorder_within_kind(ReorderDirection::Down));
        assert_eq!(sc.refs()[0].path, path("components/contexts/a.md"));
    }

    #[test]
    fn reorganize_is_idempotent() {
        let mut sc = build();
        let before = sc.refs().to_vec();
        sc.reorganize();
        assert_eq!(sc.refs(), before.as_slice());
    }

    #[test]
    fn unsaved_changes_true_when_no_path_and_nonempty() {
        let sc = build();
        assert!(sc.has_unsaved_changes());
    }

    #[test]
    fn save_then_load_round_trip_clears_unsaved() {
        let mut sc = build();
        sc.mark_saved("api-pipeline.yaml".to_string());
        assert!(!sc.has_unsaved_changes());

        let reloaded = SelectedComponents::load(
            SectionOrder::default(),
            sc.refs().to_vec(),
            "api-pipeline.yaml".to_string(),
        );
        assert_eq!(reloaded.refs(), sc.refs());
        assert!(!reloaded.has_unsaved_changes());
    }

    #[test]
    fn toggle_add_then_add_again_is_rejected_and_list_unchanged() {
        let mut sc = build();
        let snapshot = sc.refs().to_vec();
        let result = sc.insert(ComponentRef::new(Kind::Context, path("components/contexts/a.md")));
        assert!(result.is_err());
        assert_eq!(sc.refs(), snapshot.as_slice());
    }

    #[test]
    fn dense_order_holds_after_any_operation_sequence() {
        let mut sc = build();
        sc.remove(1);
        sc.insert(ComponentRef::new(Kind::Prompt, path("components/prompts/f.md")))
            .unwrap();
        sc.set_cursor(0);
        sc.reorder_within_kind(ReorderDirection::Down);
        for (i, r) in sc.refs().iter().enumerate() {
            assert_eq!(r.order, (i + 1) as u32);
        }
        // kind-partitioned: ranks never decrease as index increases.
        let order = SectionOrder::default();
        let mut last_rank = 0;
        for r in sc.refs() {
            let rank = order.rank(r.kind);
            assert!(rank >= last_rank);
            last_rank = rank;
        }
    }
}
