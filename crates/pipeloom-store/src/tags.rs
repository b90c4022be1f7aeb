//! Filesystem-backed `TagRegistry`.
//!
//! Tag colors persist in a small `tags.yaml` map at the library root;
//! colors are assigned from a fixed palette, keyed by a stable hash of the
//! tag name, the first time a tag is seen. Usage (for orphan sweeping) is
//! derived by re-scanning every active and archived component's
//! frontmatter rather than tracked incrementally — simple, and correct
//! after any out-of-band edit to the library.

use crate::front_matter;
use anyhow::{Context, Result};
use pipeloom_collab::{TagInfo, TagRegistry};
use pipeloom_types::Kind;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

const PALETTE: &[&str] = &[
    "#e06c75", "#98c379", "#e5c07b", "#61afef", "#c678dd", "#56b6c2", "#d19a66",
];

pub struct FilesystemTagRegistry {
    base: PathBuf,
    colors: Mutex<HashMap<String, String>>,
}

impl FilesystemTagRegistry {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let colors = load_colors(&base).unwrap_or_default();
        Self {
            base,
            colors: Mutex::new(colors),
        }
    }

    fn colors_path(&self) -> PathBuf {
        self.base.join("tags.yaml")
    }

    fn persist(&self, colors: &HashMap<String, String>) {
        if let Ok(yaml) = serde_yaml::to_string(colors) {
            let _ = fs::write(self.colors_path(), yaml);
        }
    }

    fn color_for(&self, name: &str) -> String {
        let mut colors = self.colors.lock().unwrap();
        if let Some(existing) = colors.get(name) {
            return existing.clone();
        }
        let idx = (name.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
            as usize)
            % PALETTE.len();
        let color = PALETTE[idx].to_string();
        colors.insert(name.to_string(), color.clone());
        self.persist(&colors);
        color
    }

    /// Walks every active and archived component file, counting how many
    /// reference each tag.
    fn usage_counts(&self) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for kind in Kind::ALL {
            for dir in [
                self.base.join("components").join(kind.dir_name()),
                self.base.join("components").join(kind.dir_name()).join("archived"),
            ] {
                let Ok(entries) = fs::read_dir(&dir) else { continue };
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|e| e == "md") {
                        if let Ok(raw) = fs::read_to_string(&path) {
                            let (fm, _) = front_matter::parse(&raw);
                            for tag in fm.tags {
                                *counts.entry(tag).or_insert(0) += 1;
                            }
                        }
                    }
                }
            }
        }
        counts
    }
}

fn load_colors(base: &std::path::Path) -> Option<HashMap<String, String>> {
    let raw = fs::read_to_string(base.join("tags.yaml")).ok()?;
    serde_yaml::from_str(&raw).ok()
}

impl TagRegistry for FilesystemTagRegistry {
    fn list(&self) -> Result<Vec<TagInfo>> {
        let usage = self.usage_counts();
        let mut names: Vec<String> = usage.keys().cloned().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| TagInfo {
                color: self.color_for(&name),
                name,
            })
            .collect())
    }

    fn color(&self, name: &str) -> String {
        self.color_for(name)
    }

    fn remove_tag(&self, name: &str) -> Result<()> {
        let mut colors = self.colors.lock().unwrap();
        colors.remove(name);
        self.persist(&colors);
        Ok(())
    }

    fn cleanup_orphaned(&self, candidate_tags: &[String]) {
        let usage = self.usage_counts();
        for tag in candidate_tags {
            if !usage.contains_key(tag) {
                if let Err(err) = self.remove_tag(tag) {
                    tracing::warn!(target: "store.tags", tag, error = %err, "orphan tag cleanup failed");
                } else {
                    tracing::debug!(target: "store.tags", tag, "removed orphaned tag");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_component(base: &std::path::Path, kind: Kind, name: &str, tags: &[&str]) {
        let dir = base.join("components").join(kind.dir_name());
        fs::create_dir_all(&dir).unwrap();
        let fm = front_matter::FrontMatter {
            display_name: Some(name.to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };
        fs::write(dir.join(format!("{name}.md")), front_matter::render(&fm, "body")).unwrap();
    }

    #[test]
    fn list_returns_tags_with_stable_colors() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), Kind::Context, "a", &["docs"]);
        let registry = FilesystemTagRegistry::new(dir.path());
        let first = registry.list().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "docs");
        let color = first[0].color.clone();
        let second = registry.color("docs");
        assert_eq!(second, color);
    }

    #[test]
    fn cleanup_orphaned_removes_only_unused_candidates() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), Kind::Context, "a", &["keep"]);
        let registry = FilesystemTagRegistry::new(dir.path());
        registry.color("keep");
        registry.color("gone");
        registry.cleanup_orphaned(&["keep".to_string(), "gone".to_string()]);
        let colors = registry.colors.lock().unwrap();
        assert!(colors.contains_key("keep"));
        assert!(!colors.contains_key("gone"));
    }
}
