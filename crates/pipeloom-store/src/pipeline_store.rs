//! Filesystem-backed `PipelineStore`.
//!
//! Layout, rooted at `base`:
//! ```text
//! base/pipelines/<slug>.yaml
//! base/pipelines/archived/<slug>.yaml
//! ```
//! A `ComponentRef`'s on-disk path is `../components/<kind>/<name>.md`,
//! relative to `base/pipelines/` — the required `../` prefix falls
//! straight out of that layout.

use anyhow::{Context, Result};
use pipeloom_collab::{ComponentRefRecord, PipelineRecord, PipelineStore};
use pipeloom_types::{ComponentPath, Kind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRefFile {
    pub kind: Kind,
    pub path: ComponentPath,
    pub order: u32,
}

impl ComponentRefFile {
    /// Strips the `../` prefix and the leading `components/` segment so the
    /// result is the same store-relative path `ComponentStore` expects.
    pub fn store_relative_path(&self) -> PathBuf {
        let s = self.path.as_str();
        let stripped = s.strip_prefix("../components/").unwrap_or(s);
        PathBuf::from(stripped)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineFile {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub components: Vec<ComponentRefFile>,
}

pub struct FilesystemPipelineStore {
    base: PathBuf,
}

impl FilesystemPipelineStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn pipelines_dir(&self) -> PathBuf {
        self.base.join("pipelines")
    }

    fn active_path(&self, path: &str) -> PathBuf {
        self.pipelines_dir().join(path)
    }

    fn archived_path(&self, path: &str) -> PathBuf {
        self.pipelines_dir().join("archived").join(path)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                out.push(PathBuf::from(path.file_name().unwrap()));
            }
        }
        out.sort();
        Ok(out)
    }

    fn read_at(&self, full_path: &Path, path_field: &str) -> Result<PipelineRecord> {
        let raw = fs::read_to_string(full_path)
            .with_context(|| format!("reading pipeline {}", full_path.display()))?;
        let file: PipelineFile = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing pipeline {}", full_path.display()))?;
        Ok(PipelineRecord {
            name: file.name,
            components: file
                .components
                .into_iter()
                .map(|c| ComponentRefRecord {
                    kind: c.kind,
                    path: c.path,
                    order: c.order,
                })
                .collect(),
            tags: file.tags,
            path: path_field.to_string(),
            output_path: file.output_path,
        })
    }
}

impl PipelineStore for FilesystemPipelineStore {
    fn list(&self) -> Result<Vec<PathBuf>> {
        self.list_dir(&self.pipelines_dir())
    }

    fn list_archived(&self) -> Result<Vec<PathBuf>> {
        self.list_dir(&self.pipelines_dir().join("archived"))
    }

    fn read(&self, path: &str) -> Result<PipelineRecord> {
        self.read_at(&self.active_path(path), path)
    }

    fn write(&self, pipeline: &PipelineRecord) -> Result<()> {
        let file = PipelineFile {
            name: pipeline.name.clone(),
            tags: pipeline.tags.clone(),
            output_path: pipeline.output_path.clone(),
            components: pipeline
                .components
                .iter()
                .map(|c| ComponentRefFile {
                    kind: c.kind,
                    path: c.path.clone(),
                    order: c.order,
                })
                .collect(),
        };
        let full_path = self.active_path(&pipeline.path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(&file).context("serializing pipeline")?;
        fs::write(&full_path, yaml)
            .with_context(|| format!("writing pipeline {}", full_path.display()))
    }

    fn archive(&self, path: &str) -> Result<()> {
        let from = self.active_path(path);
        let to = self.archived_path(path);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)
            .with_context(|| format!("archiving {} -> {}", from.display(), to.display()))
    }

    fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.active_path(path);
        fs::remove_file(&full_path)
            .with_context(|| format!("deleting pipeline {}", full_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> PipelineRecord {
        PipelineRecord {
            name: "API Pipeline".to_string(),
            components: vec![
                ComponentRefRecord {
                    kind: Kind::Context,
                    path: ComponentPath::from_relative("components/contexts/readme.md"),
                    order: 1,
                },
                ComponentRefRecord {
                    kind: Kind::Rules,
                    path: ComponentPath::from_relative("components/rules/style.md"),
                    order: 2,
                },
            ],
            tags: vec!["api".to_string()],
            path: "api-pipeline.yaml".to_string(),
            output_path: None,
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let store = FilesystemPipelineStore::new(dir.path());
        let record = sample();
        store.write(&record).unwrap();
        let reread = store.read("api-pipeline.yaml").unwrap();
        assert_eq!(reread, record);
        assert_eq!(store.list().unwrap(), vec![PathBuf::from("api-pipeline.yaml")]);
    }

    #[test]
    fn component_ref_store_relative_path_strips_prefix() {
        let ref_file = ComponentRefFile {
            kind: Kind::Context,
            path: ComponentPath::from_relative("components/contexts/readme.md"),
            order: 1,
        };
        assert_eq!(ref_file.store_relative_path(), PathBuf::from("contexts/readme.md"));
    }

    #[test]
    fn archive_moves_file_into_archived_subdir() {
        let dir = tempdir().unwrap();
        let store = FilesystemPipelineStore::new(dir.path());
        store.write(&sample()).unwrap();
        store.archive("api-pipeline.yaml").unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.list_archived().unwrap(), vec![PathBuf::from("api-pipeline.yaml")]);
    }

    #[test]
    fn delete_removes_the_file() {
        let dir = tempdir().unwrap();
        let store = FilesystemPipelineStore::new(dir.path());
        store.write(&sample()).unwrap();
        store.delete("api-pipeline.yaml").unwrap();
        assert!(store.list().unwrap().is_empty());
    }
}
