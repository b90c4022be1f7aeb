//! Search Coordinator.
//!
//! Owns the live query string and drives the `SearchEngine` collaborator.
//! Two things live here that don't belong in the engine itself: the
//! archive-inclusion policy derived from the query text, and the
//! fall-back-to-everything behavior when the engine can't parse a query
//! (an unterminated `tag:"` clause, say) so a bad query never hides the
//! whole catalog.

use pipeloom_collab::{FilteredCatalog, SearchEngine, SearchableCatalog};

pub struct SearchCoordinator {
    query: String,
    last_error: Option<String>,
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCoordinator {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            last_error: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.last_error = None;
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Runs the current query through `engine` against `catalog`. On
    /// success, installs the archive-inclusion policy implied by the query
    /// and returns the filtered result. On a parse error, records the error
    /// and returns every item in `catalog`, unfiltered, so the available
    /// pane never goes blank because of a malformed query.
    pub fn run(
        &mut self,
        engine: &mut dyn SearchEngine,
        catalog: &SearchableCatalog,
    ) -> FilteredCatalog {
        if self.query.trim().is_empty() {
            self.last_error = None;
            engine.set_include_archived(false);
            return Self::unfiltered(catalog);
        }

        let include_archived = engine.query_includes_archived(&self.query);
        engine.set_include_archived(include_archived);

        match engine.filter(&self.query, catalog) {
            Ok(filtered) => {
                self.last_error = None;
                filtered
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Self::unfiltered(catalog)
            }
        }
    }

    fn unfiltered(catalog: &SearchableCatalog) -> FilteredCatalog {
        FilteredCatalog {
            contexts: catalog.contexts.iter().map(|i| i.path.clone()).collect(),
            prompts: catalog.prompts.iter().map(|i| i.path.clone()).collect(),
            rules: catalog.rules.iter().map(|i| i.path.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use pipeloom_collab::SearchableItem;
    use std::path::PathBuf;

    struct FakeEngine {
        include_archived: bool,
        fail_on: Option<&'static str>,
    }

    impl SearchEngine for FakeEngine {
        fn set_include_archived(&mut self, include: bool) {
            self.include_archived = include;
        }

        fn filter(&self, query: &str, catalog: &SearchableCatalog) -> Result<FilteredCatalog> {
            if self.fail_on == Some(query) {
                return Err(anyhow!("bad query: {query}"));
            }
            let matches = |item: &SearchableItem| item.display_name.contains(query);
            Ok(FilteredCatalog {
                contexts: catalog
                    .contexts
                    .iter()
                    .filter(|i| matches(i))
                    .map(|i| i.path.clone())
                    .collect(),
                prompts: catalog
                    .prompts
                    .iter()
                    .filter(|i| matches(i))
                    .map(|i| i.path.clone())
                    .collect(),
                rules: catalog
                    .rules
                    .iter()
                    .filter(|i| matches(i))
                    .map(|i| i.path.clone())
                    .collect(),
            })
        }

        fn query_includes_archived(&self, query: &str) -> bool {
            query.contains("status:archived")
        }
    }

    fn catalog_fixture() -> SearchableCatalog {
        SearchableCatalog {
            contexts: vec![SearchableItem {
                path: PathBuf::from("context/a.md"),
                display_name: "alpha".into(),
                tags: vec![],
                archived: false,
            }],
            prompts: vec![SearchableItem {
                path: PathBuf::from("prompt/b.md"),
                display_name: "beta".into(),
                tags: vec![],
                archived: false,
            }],
            rules: vec![],
        }
    }

    #[test]
    fn empty_query_selects_everything_without_touching_engine() {
        let mut coordinator = SearchCoordinator::new();
        let mut engine = FakeEngine {
            include_archived: true,
            fail_on: None,
        };
        let catalog = catalog_fixture();
        let result = coordinator.run(&mut engine, &catalog);
        assert_eq!(result.contexts.len(), 1);
        assert_eq!(result.prompts.len(), 1);
        assert!(!engine.include_archived);
        assert!(coordinator.last_error().is_none());
    }

    #[test]
    fn non_matching_query_narrows_the_catalog() {
        let mut coordinator = SearchCoordinator::new();
        coordinator.set_query("alpha".into());
        let mut engine = FakeEngine {
            include_archived: false,
            fail_on: None,
        };
        let result = coordinator.run(&mut engine, &catalog_fixture());
        assert_eq!(result.contexts.len(), 1);
        assert_eq!(result.prompts.len(), 0);
    }

    #[test]
    fn status_archived_clause_flips_engine_policy() {
        let mut coordinator = SearchCoordinator::new();
        coordinator.set_query("status:archived alpha".into());
        let mut engine = FakeEngine {
            include_archived: false,
            fail_on: None,
        };
        coordinator.run(&mut engine, &catalog_fixture());
        assert!(engine.include_archived);
    }

    #[test]
    fn parse_error_falls_back_to_unfiltered_and_records_error() {
        let mut coordinator = SearchCoordinator::new();
        coordinator.set_query("tag:\"unterminated".into());
        let mut engine = FakeEngine {
            include_archived: false,
            fail_on: Some("tag:\"unterminated"),
        };
        let catalog = catalog_fixture();
        let result = coordinator.run(&mut engine, &catalog);
        assert_eq!(result.contexts.len(), 1);
        assert_eq!(result.prompts.len(), 1);
        assert!(coordinator.last_error().is_some());
    }

    #[test]
    fn clear_resets_query_and_error() {
        let mut coordinator = SearchCoordinator::new();
        coordinator.set_query("tag:\"unterminated".into());
        let mut engine = FakeEngine {
            include_archived: false,
            fail_on: Some("tag:\"unterminated"),
        };
        coordinator.run(&mut engine, &catalog_fixture());
        assert!(coordinator.last_error().is_some());
        coordinator.clear();
        assert_eq!(coordinator.query(), "");
        assert!(coordinator.last_error().is_none());
    }
}
