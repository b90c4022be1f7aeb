//! Filesystem-backed `ComponentStore`.
//!
//! Layout, rooted at `base`:
//! ```text
//! base/components/<contexts|prompts|rules>/<slug>.md
//! base/components/<contexts|prompts|rules>/archived/<slug>.md
//! base/pipelines/*.yaml          (read here only to answer count_usage)
//! ```

use crate::front_matter::{self, FrontMatter};
use crate::pipeline_store::PipelineFile;
use anyhow::{Context, Result};
use pipeloom_collab::{ComponentRecord, ComponentStore};
use pipeloom_types::Kind;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FilesystemComponentStore {
    base: PathBuf,
}

impl FilesystemComponentStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn components_dir(&self) -> PathBuf {
        self.base.join("components")
    }

    fn pipelines_dir(&self) -> PathBuf {
        self.base.join("pipelines")
    }

    fn active_path(&self, path: &Path) -> PathBuf {
        self.components_dir().join(path)
    }

    /// `path` is relative to a kind directory (e.g. `contexts/readme.md`);
    /// the archived sibling lives under an `archived/` subdirectory of that
    /// same kind directory.
    fn archived_path(&self, path: &Path) -> PathBuf {
        let mut components = path.components();
        let kind_dir = components.next();
        let rest: PathBuf = components.collect();
        let mut archived = self.components_dir();
        if let Some(kind_dir) = kind_dir {
            archived.push(kind_dir);
        }
        archived.push("archived");
        archived.push(rest);
        archived
    }

    fn kind_of(&self, path: &Path) -> Kind {
        let dir = path
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .unwrap_or_default();
        Kind::ALL
            .into_iter()
            .find(|k| k.dir_name() == dir)
            .unwrap_or(Kind::Context)
    }

    fn read_file(&self, full_path: &Path, kind: Kind) -> Result<ComponentRecord> {
        let content = fs::read_to_string(full_path)
            .with_context(|| format!("reading component {}", full_path.display()))?;
        let modified = fs::metadata(full_path)
            .with_context(|| format!("statting component {}", full_path.display()))?
            .modified()?;
        let (fm, body) = front_matter::parse(&content);
        let display_name = fm.display_name.unwrap_or_else(|| default_display_name(full_path));
        Ok(ComponentRecord {
            content: body.to_string(),
            tags: fm.tags,
            display_name,
            modified,
            kind,
        })
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "md") {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }
}

fn default_display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['-', '_'], " "))
        .unwrap_or_else(|| path.display().to_string())
}

impl ComponentStore for FilesystemComponentStore {
    fn list(&self, kind: Kind) -> Result<Vec<PathBuf>> {
        let dir = self.components_dir().join(kind.dir_name());
        let full_paths = self.list_dir(&dir)?;
        Ok(full_paths
            .into_iter()
            .filter_map(|p| p.strip_prefix(&dir).ok().map(|p| Path::new(kind.dir_name()).join(p)))
            .collect())
    }

    fn list_archived(&self, kind: Kind) -> Result<Vec<PathBuf>> {
        let dir = self.components_dir().join(kind.dir_name()).join("archived");
        let full_paths = self.list_dir(&dir)?;
        Ok(full_paths
            .into_iter()
            .filter_map(|p| p.strip_prefix(&dir).ok().map(|p| Path::new(kind.dir_name()).join(p)))
            .collect())
    }

    fn read(&self, path: &Path) -> Result<ComponentRecord> {
        let kind = self.kind_of(path);
        self.read_file(&self.active_path(path), kind)
    }

    fn read_archived(&self, path: &Path) -> Result<ComponentRecord> {
        let kind = self.kind_of(path);
        self.read_file(&self.archived_path(path), kind)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let full_path = self.active_path(path);
        let existing_fm = fs::read_to_string(&full_path)
            .ok()
            .map(|raw| front_matter::parse(&raw).0)
            .unwrap_or_else(|| FrontMatter {
                display_name: Some(default_display_name(path)),
                tags: Vec::new(),
            });
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let rendered = front_matter::render(&existing_fm, content);
        fs::write(&full_path, rendered)
            .with_context(|| format!("writing component {}", full_path.display()))
    }

    fn update_tags(&self, path: &Path, tags: &[String]) -> Result<()> {
        let full_path = self.active_path(path);
        let raw = fs::read_to_string(&full_path)
            .with_context(|| format!("reading component {}", full_path.display()))?;
        let (mut fm, body) = front_matter::parse(&raw);
        fm.tags = tags.to_vec();
        let rendered = front_matter::render(&fm, body);
        fs::write(&full_path, rendered)
            .with_context(|| format!("writing component {}", full_path.display()))
    }

    fn archive(&self, path: &Path) -> Result<()> {
        let from = self.active_path(path);
        let to = self.archived_path(path);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)
            .with_context(|| format!("archiving {} -> {}", from.display(), to.display()))
    }

    fn unarchive(&self, path: &Path) -> Result<()> {
        let from = self.archived_path(path);
        let to = self.active_path(path);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)
            .with_context(|| format!("unarchiving {} -> {}", from.display(), to.display()))
    }

    fn stat(&self, path: &Path) -> Result<std::time::SystemTime> {
        fs::metadata(self.active_path(path))
            .with_context(|| format!("statting {}", path.display()))?
            .modified()
            .map_err(Into::into)
    }

    fn count_usage(&self) -> Result<HashMap<PathBuf, u32>> {
        let mut counts = HashMap::new();
        let dir = self.pipelines_dir();
        if !dir.exists() {
            return Ok(counts);
        }
        for entry in fs::read_dir(&dir).with_context(|| format!("listing {}", dir.display()))? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                let Ok(raw) = fs::read_to_string(&path) else {
                    continue;
                };
                let Ok(file) = serde_yaml::from_str::<PipelineFile>(&raw) else {
                    continue;
                };
                for component in file.components {
                    let store_path = component.store_relative_path();
                    *counts.entry(store_path).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }

    fn sanitize_name(&self, free_text: &str) -> String {
        let mut slug = String::new();
        let mut last_was_hyphen = true;
        for ch in free_text.trim().chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
                last_was_hyphen = false;
            } else if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        if slug.is_empty() {
            "untitled".to_string()
        } else {
            slug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_component(base: &Path, kind: Kind, name: &str, tags: &[&str]) {
        let dir = base.join("components").join(kind.dir_name());
        fs::create_dir_all(&dir).unwrap();
        let fm = FrontMatter {
            display_name: Some(name.to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };
        fs::write(dir.join(format!("{name}.md")), front_matter::render(&fm, "body\n")).unwrap();
    }

    #[test]
    fn list_and_read_round_trip() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), Kind::Context, "readme", &["docs"]);
        let store = FilesystemComponentStore::new(dir.path());
        let listed = store.list(Kind::Context).unwrap();
        assert_eq!(listed, vec![PathBuf::from("contexts/readme.md")]);
        let record = store.read(&listed[0]).unwrap();
        assert_eq!(record.display_name, "readme");
        assert_eq!(record.tags, vec!["docs".to_string()]);
        assert_eq!(record.content, "body\n");
    }

    #[test]
    fn archive_then_unarchive_moves_the_file_both_ways() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), Kind::Rules, "style", &[]);
        let store = FilesystemComponentStore::new(dir.path());
        let path = PathBuf::from("rules/style.md");
        store.archive(&path).unwrap();
        assert!(store.list(Kind::Rules).unwrap().is_empty());
        assert_eq!(store.list_archived(Kind::Rules).unwrap(), vec![path.clone()]);
        store.unarchive(&path).unwrap();
        assert_eq!(store.list(Kind::Rules).unwrap(), vec![path]);
    }

    #[test]
    fn update_tags_preserves_body() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), Kind::Prompt, "summarize", &["old"]);
        let store = FilesystemComponentStore::new(dir.path());
        let path = PathBuf::from("prompts/summarize.md");
        store.update_tags(&path, &["new".to_string()]).unwrap();
        let record = store.read(&path).unwrap();
        assert_eq!(record.tags, vec!["new".to_string()]);
        assert_eq!(record.content, "body\n");
    }

    #[test]
    fn sanitize_name_collapses_punctuation_and_case() {
        let store = FilesystemComponentStore::new(".");
        assert_eq!(store.sanitize_name("API Pipeline!"), "api-pipeline");
        assert_eq!(store.sanitize_name("  --Weird__Name--  "), "weird-name");
        assert_eq!(store.sanitize_name("!!!"), "untitled");
    }
}
