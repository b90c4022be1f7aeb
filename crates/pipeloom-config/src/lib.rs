//! Configuration loading (ambient stack — pipeloom.toml).
//!
//! Parses the on-disk config the way `core-config` does in the editor this
//! workspace is descended from: tolerant of missing files, tolerant of
//! unknown fields, falls back to defaults on a parse error rather than
//! refusing to start, and keeps the raw source around in case a future
//! caller wants to re-derive something from it.

use anyhow::Result;
use pipeloom_types::{Kind, SectionOrder};
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct SectionsConfig {
    #[serde(default = "SectionsConfig::default_order")]
    pub order: Vec<Kind>,
}

impl SectionsConfig {
    fn default_order() -> Vec<Kind> {
        vec![Kind::Context, Kind::Prompt, Kind::Rules]
    }
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            order: Self::default_order(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    #[serde(default = "StatusConfig::default_ttl_ms")]
    pub ephemeral_ttl_ms: u64,
}

impl StatusConfig {
    const fn default_ttl_ms() -> u64 {
        1500
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            ephemeral_ttl_ms: Self::default_ttl_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    /// Used only when `$EDITOR` is unset.
    #[serde(default = "EditorConfig::default_fallback")]
    pub fallback_command: String,
}

impl EditorConfig {
    fn default_fallback() -> String {
        "vi".to_string()
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            fallback_command: Self::default_fallback(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MermaidConfig {
    #[serde(default = "MermaidConfig::default_command")]
    pub command: String,
}

impl MermaidConfig {
    fn default_command() -> String {
        "mmdc".to_string()
    }
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self {
            command: Self::default_command(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: String,
}

impl OutputConfig {
    fn default_dir() -> String {
        "generated".to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub sections: SectionsConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub mermaid: MermaidConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

impl Config {
    pub fn section_order(&self) -> SectionOrder {
        SectionOrder::new(self.file.sections.order.clone())
    }

    pub fn ephemeral_ttl(&self) -> Duration {
        Duration::from_millis(self.file.status.ephemeral_ttl_ms)
    }

    pub fn editor_fallback(&self) -> &str {
        &self.file.editor.fallback_command
    }

    pub fn mermaid_command(&self) -> &str {
        &self.file.mermaid.command
    }

    pub fn output_dir(&self) -> &str {
        &self.file.output.dir
    }
}

/// Prefers `./pipeloom.toml` in the working directory, then
/// `$XDG_CONFIG_HOME/pipeloom/pipeloom.toml` (or the platform equivalent).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("pipeloom.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("pipeloom").join("pipeloom.toml");
    }
    PathBuf::from("pipeloom.toml")
}

/// Loads from `path`, or `discover()`'s result when `path` is `None`. A
/// missing file yields defaults silently; a present-but-unparseable file
/// yields defaults with a warning, so a typo in `pipeloom.toml` never
/// blocks startup.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(path = %path.display(), "loaded pipeloom config");
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to parse pipeloom config, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_context_prompt_rules_order() {
        let config = Config::default();
        assert_eq!(
            config.section_order().as_slice(),
            [Kind::Context, Kind::Prompt, Kind::Rules]
        );
        assert_eq!(config.ephemeral_ttl(), Duration::from_millis(1500));
        assert_eq!(config.editor_fallback(), "vi");
        assert_eq!(config.mermaid_command(), "mmdc");
        assert_eq!(config.output_dir(), "generated");
    }

    #[test]
    fn parses_a_full_config_file() {
        let toml_src = r#"
            [sections]
            order = ["rules", "context", "prompt"]

            [status]
            ephemeral_ttl_ms = 2000

            [editor]
            fallback_command = "nano"

            [mermaid]
            command = "npx mmdc"

            [output]
            dir = "out"
        "#;
        let file: ConfigFile = toml::from_str(toml_src).unwrap();
        let config = Config {
            raw: Some(toml_src.to_string()),
            file,
        };
        assert_eq!(
            config.section_order().as_slice(),
            [Kind::Rules, Kind::Context, Kind::Prompt]
        );
        assert_eq!(config.ephemeral_ttl(), Duration::from_millis(2000));
        assert_eq!(config.editor_fallback(), "nano");
        assert_eq!(config.mermaid_command(), "npx mmdc");
        assert_eq!(config.output_dir(), "out");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_from(Some(PathBuf::from("/nonexistent/pipeloom.toml"))).unwrap();
        assert_eq!(config.editor_fallback(), "vi");
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults_instead_of_erroring() {
        let dir = std::env::temp_dir().join(format!(
            "pipeloom-config-test-{:?}",
            std::thread::current().id()
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pipeloom.toml");
        fs::write(&path, "not valid toml {{{").unwrap();
        let config = load_from(Some(path.clone())).unwrap();
        assert_eq!(config.editor_fallback(), "vi");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let toml_src = r#"
            [sections]
            order = ["context", "prompt", "rules"]
            future_field = "ignored"

            [some_future_table]
            whatever = 1
        "#;
        let file: Result<ConfigFile, _> = toml::from_str(toml_src);
        assert!(file.is_ok());
    }
}
