//! Filesystem-backed `Composer`.
//!
//! Concatenates each referenced component's body, in `PipelineRecord`
//! order, separated by a blank line. Reads components straight from disk
//! rather than through `ComponentStore` — the composer is its own
//! collaborator, independent of whichever component store implementation
//! the controller was wired up with.

use crate::front_matter;
use anyhow::{Context, Result};
use pipeloom_collab::{Composer, PipelineRecord};
use std::fs;
use std::path::{Path, PathBuf};

pub struct PlainComposer {
    base: PathBuf,
}

impl PlainComposer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl Composer for PlainComposer {
    fn compose(&self, pipeline: &PipelineRecord) -> Result<String> {
        let mut sections = Vec::with_capacity(pipeline.components.len());
        for component in &pipeline.components {
            let rel = component.path.as_str().strip_prefix("../").unwrap_or(component.path.as_str());
            let full_path = self.base.join(rel);
            let raw = fs::read_to_string(&full_path)
                .with_context(|| format!("reading component {}", full_path.display()))?;
            let (_, body) = front_matter::parse(&raw);
            sections.push(body.trim_end().to_string());
        }
        Ok(sections.join("\n\n"))
    }

    fn write_output(&self, content: &str, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        fs::write(output_path, content)
            .with_context(|| format!("writing output {}", output_path.display()))
    }
}
