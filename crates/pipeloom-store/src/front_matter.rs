//! YAML front-matter parsing for component markdown files.
//!
//! Mirrors the `---`-delimited frontmatter convention this workspace's
//! markdown-authoring tooling already uses elsewhere: a YAML block bounded
//! by two `---` lines, body is everything after the closing delimiter.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrontMatter {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Splits `content` into `(front_matter, body)`. A missing or malformed
/// frontmatter block yields `FrontMatter::default()` and the whole input as
/// body — component files without a frontmatter block are still valid.
pub fn parse(content: &str) -> (FrontMatter, &str) {
    let Some(rest) = content.strip_prefix("---\n") else {
        return (FrontMatter::default(), content);
    };
    let Some(end) = rest.find("\n---\n") else {
        return (FrontMatter::default(), content);
    };
    let yaml = &rest[..end];
    let body = &rest[end + 5..];
    match serde_yaml::from_str::<FrontMatter>(yaml) {
        Ok(fm) => (fm, body),
        Err(_) => (FrontMatter::default(), content),
    }
}

/// Renders `fm` followed by `body` back into a single markdown document.
pub fn render(fm: &FrontMatter, body: &str) -> String {
    let yaml = serde_yaml::to_string(fm).unwrap_or_default();
    format!("---\n{yaml}---\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_name_and_tags() {
        let content = "---\ndisplay_name: Readme\ntags:\n  - docs\n  - readme\n---\nBody text\n";
        let (fm, body) = parse(content);
        assert_eq!(fm.display_name.as_deref(), Some("Readme"));
        assert_eq!(fm.tags, vec!["docs".to_string(), "readme".to_string()]);
        assert_eq!(body, "Body text\n");
    }

    #[test]
    fn missing_frontmatter_is_treated_as_plain_body() {
        let content = "Just a body, no frontmatter.\n";
        let (fm, body) = parse(content);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn unterminated_frontmatter_falls_back_to_plain_body() {
        let content = "---\ndisplay_name: Oops\nBody without closing delimiter";
        let (fm, body) = parse(content);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn render_then_parse_round_trips() {
        let fm = FrontMatter {
            display_name: Some("Style Guide".to_string()),
            tags: vec!["style".to_string()],
        };
        let rendered = render(&fm, "# Heading\n");
        let (parsed, body) = parse(&rendered);
        assert_eq!(parsed, fm);
        assert_eq!(body, "# Heading\n");
    }
}
