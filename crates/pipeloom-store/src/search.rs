//! Filesystem-backed `SearchEngine`.
//!
//! Fuzzy-matches the query against each item's display name and tags, with
//! one special clause: `status:archived` (case-insensitive, anywhere in the
//! query) is stripped before matching and instead toggles archive
//! inclusion — the coordinator (`pipeloom-search`) relies on
//! `query_includes_archived` to decide whether to trigger a catalog reload.

use anyhow::Result;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use pipeloom_collab::{FilteredCatalog, SearchEngine, SearchableCatalog, SearchableItem};

const ARCHIVED_CLAUSE: &str = "status:archived";

pub struct FuzzySearchEngine {
    matcher: SkimMatcherV2,
    include_archived: bool,
}

impl Default for FuzzySearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzySearchEngine {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
            include_archived: false,
        }
    }

    fn strip_archived_clause(query: &str) -> String {
        let lowered = query.to_lowercase();
        if let Some(idx) = lowered.find(ARCHIVED_CLAUSE) {
            let mut out = String::with_capacity(query.len());
            out.push_str(query[..idx].trim_end());
            out.push(' ');
            out.push_str(query[idx + ARCHIVED_CLAUSE.len()..].trim_start());
            out.trim().to_string()
        } else {
            query.trim().to_string()
        }
    }

    fn matches(&self, needle: &str, item: &SearchableItem) -> bool {
        if needle.is_empty() {
            return true;
        }
        let haystack = format!("{} {}", item.display_name, item.tags.join(" "));
        self.matcher.fuzzy_match(&haystack, needle).is_some()
    }

    fn filter_items(&self, needle: &str, items: &[SearchableItem]) -> Vec<std::path::PathBuf> {
        items
            .iter()
            .filter(|item| (self.include_archived || !item.archived) && self.matches(needle, item))
            .map(|item| item.path.clone())
            .collect()
    }
}

impl SearchEngine for FuzzySearchEngine {
    fn set_include_archived(&mut self, include: bool) {
        self.include_archived = include;
    }

    fn filter(&self, query: &str, catalog: &SearchableCatalog) -> Result<FilteredCatalog> {
        let needle = Self::strip_archived_clause(query);
        Ok(FilteredCatalog {
            contexts: self.filter_items(&needle, &catalog.contexts),
            prompts: self.filter_items(&needle, &catalog.prompts),
            rules: self.filter_items(&needle, &catalog.rules),
        })
    }

    fn query_includes_archived(&self, query: &str) -> bool {
        query.to_lowercase().contains(ARCHIVED_CLAUSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(name: &str, tags: &[&str], archived: bool) -> SearchableItem {
        SearchableItem {
            path: PathBuf::from(format!("{name}.md")),
            display_name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            archived,
        }
    }

    #[test]
    fn empty_query_keeps_active_items_only_by_default() {
        let engine = FuzzySearchEngine::new();
        let catalog = SearchableCatalog {
            contexts: vec![item("readme", &[], false), item("old-readme", &[], true)],
            ..Default::default()
        };
        let filtered = engine.filter("", &catalog).unwrap();
        assert_eq!(filtered.contexts, vec![PathBuf::from("readme.md")]);
    }

    #[test]
    fn status_archived_clause_is_recognized_and_stripped() {
        let engine = FuzzySearchEngine::new();
        assert!(engine.query_includes_archived("status:archived readme"));
        assert!(!engine.query_includes_archived("readme"));
    }

    #[test]
    fn include_archived_toggle_widens_results() {
        let mut engine = FuzzySearchEngine::new();
        engine.set_include_archived(true);
        let catalog = SearchableCatalog {
            contexts: vec![item("readme", &[], false), item("old-readme", &[], true)],
            ..Default::default()
        };
        let filtered = engine.filter("status:archived readme", &catalog).unwrap();
        assert_eq!(filtered.contexts.len(), 2);
    }

    #[test]
    fn fuzzy_match_finds_subsequence_in_tags() {
        let engine = FuzzySearchEngine::new();
        let catalog = SearchableCatalog {
            rules: vec![item("misc", &["style-guide"], false)],
            ..Default::default()
        };
        let filtered = engine.filter("stygd", &catalog).unwrap();
        assert_eq!(filtered.rules, vec![PathBuf::from("misc.md")]);
    }
}
