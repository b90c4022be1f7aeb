//! External collaborator interfaces.
//!
//! The Pipeline Builder core does not define a wire format for components or
//! pipelines, does not implement search ranking, does not render styled
//! terminal output, and does not implement token counting. It consumes those
//! concerns through the traits below. `pipeloom-store` ships one concrete,
//! filesystem-backed implementation of each; the core crates only ever see
//! the trait objects.

use anyhow::Result;
use pipeloom_types::{ComponentPath, Kind};
use std::path::PathBuf;
use std::time::SystemTime;

/// A component as read from storage, independent of any in-memory catalog
/// representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub content: String,
    pub tags: Vec<String>,
    pub display_name: String,
    pub modified: SystemTime,
    pub kind: Kind,
}

pub trait ComponentStore: Send + Sync {
    fn list(&self, kind: Kind) -> Result<Vec<PathBuf>>;
    fn list_archived(&self, kind: Kind) -> Result<Vec<PathBuf>>;
    fn read(&self, path: &std::path::Path) -> Result<ComponentRecord>;
    fn read_archived(&self, path: &std::path::Path) -> Result<ComponentRecord>;
    fn write(&self, path: &std::path::Path, content: &str) -> Result<()>;
    fn update_tags(&self, path: &std::path::Path, tags: &[String]) -> Result<()>;
    fn archive(&self, path: &std::path::Path) -> Result<()>;
    fn unarchive(&self, path: &std::path::Path) -> Result<()>;
    fn stat(&self, path: &std::path::Path) -> Result<SystemTime>;
    /// path -> usage count, as currently persisted across all pipelines.
    fn count_usage(&self) -> Result<std::collections::HashMap<PathBuf, u32>>;
    fn sanitize_name(&self, free_text: &str) -> String;
}

/// A single reference inside a loaded pipeline, as read from storage (kind,
/// path, 1-based order). Distinct from `pipeloom_selected::ComponentRef`
/// because this one is a flat storage record, not a validated in-memory
/// invariant-holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRefRecord {
    pub kind: Kind,
    pub path: ComponentPath,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRecord {
    pub name: String,
    pub components: Vec<ComponentRefRecord>,
    pub tags: Vec<String>,
    pub path: String,
    pub output_path: Option<PathBuf>,
}

pub trait PipelineStore: Send + Sync {
    fn list(&self) -> Result<Vec<PathBuf>>;
    fn list_archived(&self) -> Result<Vec<PathBuf>>;
    fn read(&self, path: &str) -> Result<PipelineRecord>;
    fn write(&self, pipeline: &PipelineRecord) -> Result<()>;
    fn archive(&self, path: &str) -> Result<()>;
    fn delete(&self, path: &str) -> Result<()>;
}

pub trait Composer: Send + Sync {
    fn compose(&self, pipeline: &PipelineRecord) -> Result<String>;
    fn write_output(&self, content: &str, output_path: &std::path::Path) -> Result<()>;
}

/// Catalog snapshot handed to the search engine: one vector of
/// `(path, searchable text, tags, archived)` tuples per kind.
#[derive(Debug, Clone, Default)]
pub struct SearchableCatalog {
    pub contexts: Vec<SearchableItem>,
    pub prompts: Vec<SearchableItem>,
    pub rules: Vec<SearchableItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchableItem {
    pub path: PathBuf,
    pub display_name: String,
    pub tags: Vec<String>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FilteredCatalog {
    pub contexts: Vec<PathBuf>,
    pub prompts: Vec<PathBuf>,
    pub rules: Vec<PathBuf>,
}

pub trait SearchEngine: Send + Sync {
    fn set_include_archived(&mut self, include: bool);
    fn filter(&self, query: &str, catalog: &SearchableCatalog) -> Result<FilteredCatalog>;
    /// Whether any clause of `query` selects `status:archived`.
    fn query_includes_archived(&self, query: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub color: String,
}

pub trait TagRegistry: Send + Sync {
    fn list(&self) -> Result<Vec<TagInfo>>;
    fn color(&self, name: &str) -> String;
    fn remove_tag(&self, name: &str) -> Result<()>;
    /// Fire-and-forget orphan sweep: runs detached, does not feed events
    /// back into the builder.
    fn cleanup_orphaned(&self, candidate_tags: &[String]);
}

pub trait Clipboard: Send + Sync {
    fn write_all(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Good,
    Warning,
    Danger,
}

pub trait Tokens: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
    fn limit_status(&self, estimate: usize) -> TokenStatus;
}
