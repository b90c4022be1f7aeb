//! Available-Components Model.
//!
//! Holds the three on-disk catalogs (context / prompt / rules), a filtered
//! view of the same shape produced by the search coordinator, and a
//! predictive usage-count overlay that lets the UI update counts the instant
//! a component is added to or removed from the pipeline, without waiting for
//! a storage round trip.

use pipeloom_collab::{ComponentRecord, ComponentStore, Tokens};
use pipeloom_types::{Kind, SectionOrder};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One catalog entry, as shown in the available-components pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentItem {
    pub path: PathBuf,
    pub display_name: String,
    pub kind: Kind,
    pub modified: SystemTime,
    pub token_estimate: usize,
    /// Usage count as last read from storage. The predictive overlay is
    /// applied on top of this at read time, never folded back in here.
    pub base_usage_count: u32,
    pub tags: Vec<String>,
    pub archived: bool,
}

impl ComponentItem {
    fn from_record(
        path: PathBuf,
        record: ComponentRecord,
        base_usage_count: u32,
        tokens: &dyn Tokens,
    ) -> Self {
        let token_estimate = tokens.estimate(&record.content);
        Self {
            path,
            display_name: record.display_name,
            kind: record.kind,
            modified: record.modified,
            token_estimate,
            base_usage_count,
            tags: record.tags,
            archived: false,
        }
    }
}

/// A `ComponentItem` paired with its effective (base + predictive) usage
/// count, as handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct DisplayItem<'a> {
    pub item: &'a ComponentItem,
    pub effective_usage: u32,
}

/// The same three-kind shape used for both the full catalog and the
/// search-filtered view, just with a different element type.
#[derive(Debug, Clone, Default)]
pub struct ItemsByKind<T> {
    pub contexts: Vec<T>,
    pub prompts: Vec<T>,
    pub rules: Vec<T>,
}

impl<T> ItemsByKind<T> {
    fn by_kind(&self, kind: Kind) -> &Vec<T> {
        match kind {
            Kind::Context => &self.contexts,
            Kind::Prompt => &self.prompts,
            Kind::Rules => &self.rules,
        }
    }

    fn by_kind_mut(&mut self, kind: Kind) -> &mut Vec<T> {
        match kind {
            Kind::Context => &mut self.contexts,
            Kind::Prompt => &mut self.prompts,
            Kind::Rules => &mut self.rules,
        }
    }
}

pub struct AvailableComponents {
    catalog: ItemsByKind<ComponentItem>,
    filtered: ItemsByKind<PathBuf>,
    usage_overlay: HashMap<PathBuf, i64>,
    order: SectionOrder,
    cursor: usize,
    include_archived: bool,
}

impl AvailableComponents {
    /// An empty catalog, for construction before the first `load`.
    pub fn empty(order: SectionOrder) -> Self {
        Self {
            catalog: ItemsByKind::default(),
            filtered: ItemsByKind::default(),
            usage_overlay: HashMap::new(),
            order,
            cursor: 0,
            include_archived: false,
        }
    }

    /// Reads all three kinds from `store`, joins in the persisted usage
    /// counts, and resets the filtered view to mirror the full catalog
    /// (an empty query selects everything).
    pub fn load(
        store: &dyn ComponentStore,
        tokens: &dyn Tokens,
        order: SectionOrder,
        include_archived: bool,
    ) -> anyhow::Result<Self> {
        let usage = store.count_usage()?;
        let mut catalog = ItemsByKind::default();
        for kind in Kind::ALL {
            let mut items = Vec::new();
            for path in store.list(kind)? {
                let record = store.read(&path)?;
                let base = usage.get(&path).copied().unwrap_or(0);
                items.push(ComponentItem::from_record(path, record, base, tokens));
            }
            if include_archived {
                for path in store.list_archived(kind)? {
                    let record = store.read_archived(&path)?;
                    let base = usage.get(&path).copied().unwrap_or(0);
                    let mut item = ComponentItem::from_record(path, record, base, tokens);
                    item.archived = true;
                    items.push(item);
                }
            }
            *catalog.by_kind_mut(kind) = items;
        }
        let filtered = ItemsByKind {
            contexts: catalog.contexts.iter().map(|i| i.path.clone()).collect(),
            prompts: catalog.prompts.iter().map(|i| i.path.clone()).collect(),
            rules: catalog.rules.iter().map(|i| i.path.clone()).collect(),
        };
        Ok(Self {
            catalog,
            filtered,
            usage_overlay: HashMap::new(),
            order,
            cursor: 0,
            include_archived,
        })
    }

    /// The unfiltered catalog as last loaded from storage, e.g. to build a
    /// `SearchableCatalog` for the search engine.
    pub fn catalog(&self) -> &ItemsByKind<ComponentItem> {
        &self.catalog
    }

    pub fn include_archived(&self) -> bool {
        self.include_archived
    }

    pub fn set_include_archived(&mut self, include: bool) {
        self.include_archived = include;
    }

    pub fn section_order(&self) -> &SectionOrder {
        &self.order
    }

    pub fn set_section_order(&mut self, order: SectionOrder) {
        self.order = order;
    }

    /// Replaces the filtered view (e.g. with the output of
    /// `SearchEngine::filter`). Paths not present in the full catalog are
    /// dropped silently; they can only appear from a stale search result.
    pub fn set_filtered(&mut self, filtered: ItemsByKind<PathBuf>) {
        self.filtered = filtered;
        let len = self.ordered_len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, index: usize) {
        let len = self.ordered_len();
        self.cursor = if len == 0 { 0 } else { index.min(len - 1) };
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.ordered_len() as isize;
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len - 1);
        self.cursor = next as usize;
    }

    fn ordered_len(&self) -> usize {
        self.order
            .as_slice()
            .iter()
            .map(|k| self.filtered.by_kind(*k).len())
            .sum()
    }

    /// The filtered catalog flattened in the configured section order, each
    /// item paired with its effective (base + predictive) usage count. This
    /// is the sequence the left cursor walks.
    pub fn get_ordered(&self) -> Vec<DisplayItem<'_>> {
        let mut out = Vec::with_capacity(self.ordered_len());
        for kind in self.order.as_slice() {
            for path in self.filtered.by_kind(*kind) {
                if let Some(item) = self.find_in_catalog(*kind, path) {
                    out.push(DisplayItem {
                        item,
                        effective_usage: self.effective_usage(path, item.base_usage_count),
                    });
                }
            }
        }
        out
    }

    /// The item currently under the left cursor, if the filtered view is
    /// non-empty.
    pub fn current(&self) -> Option<DisplayItem<'_>> {
        self.get_ordered().into_iter().nth(self.cursor)
    }

    fn find_in_catalog(&self, kind: Kind, path: &Path) -> Option<&ComponentItem> {
        self.catalog.by_kind(kind).iter().find(|i| i.path == path)
    }

    fn effective_usage(&self, path: &Path, base: u32) -> u32 {
        let delta = self.usage_overlay.get(path).copied().unwrap_or(0);
        (base as i64 + delta).max(0) as u32
    }

    /// Records that `path` was just added to the pipeline, ahead of a
    /// storage round trip actually persisting the new count.
    pub fn predict_add(&mut self, path: &Path) {
        *self.usage_overlay.entry(path.to_path_buf()).or_insert(0) += 1;
    }

    /// Records that `path` was just removed from the pipeline.
    pub fn predict_remove(&mut self, path: &Path) {
        *self.usage_overlay.entry(path.to_path_buf()).or_insert(0) -= 1;
    }

    /// Clears the predictive overlay, e.g. after the backing store has been
    /// re-read and `base_usage_count` already reflects every change.
    pub fn clear_predictions(&mut self) {
        self.usage_overlay.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pipeloom_collab::ComponentStore;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex;

    struct FakeStore {
        by_kind: StdHashMap<Kind, Vec<(PathBuf, ComponentRecord)>>,
        usage: StdHashMap<PathBuf, u32>,
        writes: Mutex<Vec<PathBuf>>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                by_kind: StdHashMap::new(),
                usage: StdHashMap::new(),
                writes: Mutex::new(Vec::new()),
            }
        }

        fn with(mut self, kind: Kind, path: &str, name: &str, usage: u32) -> Self {
            let p = PathBuf::from(path);
            self.by_kind.entry(kind).or_default().push((
                p.clone(),
                ComponentRecord {
                    content: "hello world".into(),
                    tags: vec![],
                    display_name: name.into(),
                    modified: SystemTime::UNIX_EPOCH,
                    kind,
                },
            ));
            self.usage.insert(p, usage);
            self
        }
    }

    impl ComponentStore for FakeStore {
        fn list(&self, kind: Kind) -> Result<Vec<PathBuf>> {
            Ok(self
                .by_kind
                .get(&kind)
                .map(|v| v.iter().map(|(p, _)| p.clone()).collect())
                .unwrap_or_default())
        }
        fn list_archived(&self, _kind: Kind) -> Result<Vec<PathBuf>> {
            Ok(vec![])
        }
        fn read(&self, path: &Path) -> Result<ComponentRecord> {
            for items in self.by_kind.values() {
                if let Some((_, r)) = items.iter().find(|(p, _)| p == path) {
                    return Ok(r.clone());
                }
            }
            anyhow::bail!("not found")
        }
        fn read_archived(&self, path: &Path) -> Result<ComponentRecord> {
            self.read(path)
        }
        fn write(&self, path: &Path, _content: &str) -> Result<()> {
            self.writes.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
        fn update_tags(&self, _path: &Path, _tags: &[String]) -> Result<()> {
            Ok(())
        }
        fn archive(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
        fn unarchive(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
        fn stat(&self, _path: &Path) -> Result<SystemTime> {
            Ok(SystemTime::UNIX_EPOCH)
        }
        fn count_usage(&self) -> Result<StdHashMap<PathBuf, u32>> {
            Ok(self.usage.clone())
        }
        fn sanitize_name(&self, free_text: &str) -> String {
            free_text.to_lowercase().replace(' ', "-")
        }
    }

    struct FakeTokens;
    impl Tokens for FakeTokens {
        fn estimate(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
        fn limit_status(&self, _estimate: usize) -> pipeloom_collab::TokenStatus {
            pipeloom_collab::TokenStatus::Good
        }
    }

    fn load_fixture() -> AvailableComponents {
        let store = FakeStore::new()
            .with(Kind::Context, "context/a.md", "a", 2)
            .with(Kind::Prompt, "prompt/b.md", "b", 0)
            .with(Kind::Rules, "rules/c.md", "c", 5);
        AvailableComponents::load(&store, &FakeTokens, SectionOrder::default(), false).unwrap()
    }

    #[test]
    fn get_ordered_follows_section_order() {
        let available = load_fixture();
        let names: Vec<_> = available
            .get_ordered()
            .iter()
            .map(|d| d.item.display_name.clone())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn predictive_add_increments_effective_usage_without_touching_base() {
        let mut available = load_fixture();
        let path = PathBuf::from("prompt/b.md");
        available.predict_add(&path);
        let item = available
            .get_ordered()
            .into_iter()
            .find(|d| d.item.path == path)
            .unwrap();
        assert_eq!(item.effective_usage, 1);
        assert_eq!(item.item.base_usage_count, 0);
    }

    #[test]
    fn predictive_remove_is_floored_at_zero() {
        let mut available = load_fixture();
        let path = PathBuf::from("prompt/b.md");
        available.predict_remove(&path);
        available.predict_remove(&path);
        let item = available
            .get_ordered()
            .into_iter()
            .find(|d| d.item.path == path)
            .unwrap();
        assert_eq!(item.effective_usage, 0);
    }

    #[test]
    fn add_then_remove_round_trips_to_base() {
        let mut available = load_fixture();
        let path = PathBuf::from("context/a.md");
        available.predict_add(&path);
        available.predict_remove(&path);
        let item = available
            .get_ordered()
            .into_iter()
            .find(|d| d.item.path == path)
            .unwrap();
        assert_eq!(item.effective_usage, 2);
    }

    #[test]
    fn clear_predictions_resets_overlay() {
        let mut available = load_fixture();
        let path = PathBuf::from("context/a.md");
        available.predict_add(&path);
        available.clear_predictions();
        let item = available
            .get_ordered()
            .into_iter()
            .find(|d| d.item.path == path)
            .unwrap();
        assert_eq!(item.effective_usage, 2);
    }

    #[test]
    fn set_filtered_clamps_cursor() {
        let mut available = load_fixture();
        available.set_cursor(2);
        available.set_filtered(ItemsByKind {
            contexts: vec![PathBuf::from("context/a.md")],
            prompts: vec![],
            rules: vec![],
        });
        assert_eq!(available.cursor(), 0);
    }

    #[test]
    fn archived_items_excluded_unless_requested() {
        let store = FakeStore::new().with(Kind::Context, "context/a.md", "a", 0);
        let available =
            AvailableComponents::load(&store, &FakeTokens, SectionOrder::default(), false)
                .unwrap();
        assert_eq!(available.get_ordered().len(), 1);
        assert!(!available.include_archived());
    }

    #[test]
    fn move_cursor_clamps_to_bounds() {
        let mut available = load_fixture();
        available.move_cursor(-5);
        assert_eq!(available.cursor(), 0);
        available.move_cursor(100);
        assert_eq!(available.cursor(), 2);
    }
}
