//! Declarative TOC sources: structured documents and format detection.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::markup;

/// Placeholder for the site root inside structured TOC urls.
pub const TOROOT_PLACEHOLDER: &str = "{toroot}";

/// One entry of a declarative TOC: a page link, a section, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocEntry {
    pub url: String,
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn label(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.labels.insert(language.into(), text.into());
        self
    }

    pub fn child(mut self, child: TocEntry) -> Self {
        self.children.push(child);
        self
    }
}

/// A complete TOC: optional title and default language plus top-level entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocDocument {
    pub title: Option<String>,
    pub default_language: Option<String>,
    pub entries: Vec<TocEntry>,
}

/// Source encodings understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocFormat {
    /// HTML list with `<?cs ... ?>` template directives
    Markup,
    Toml,
    Json,
}

impl TocFormat {
    /// Pick a format from the file extension; anything unknown is markup.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => TocFormat::Toml,
            Some("json") => TocFormat::Json,
            _ => TocFormat::Markup,
        }
    }
}

/// Values available to template directives while loading a TOC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    /// Root-relative prefix substituted for `toroot`
    pub toroot: String,
    /// Additional `<?cs var:NAME ?>` values
    pub variables: BTreeMap<String, String>,
    /// Names treated as true by `<?cs if:NAME ?>`
    pub defines: Vec<String>,
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self {
            toroot: "/".to_string(),
            variables: BTreeMap::new(),
            defines: Vec::new(),
        }
    }
}

impl TemplateContext {
    pub fn var(&self, name: &str) -> Option<&str> {
        if name == "toroot" {
            return Some(&self.toroot);
        }
        self.variables.get(name).map(String::as_str)
    }

    /// Truthiness for conditionals: defined flag, or a non-empty, non-"0" variable.
    pub fn is_true(&self, name: &str) -> bool {
        if self.defines.iter().any(|d| d == name) {
            return true;
        }
        matches!(self.var(name), Some(v) if !v.is_empty() && v != "0")
    }
}

impl TocDocument {
    /// Parse TOC content in the given format.
    pub fn parse(
        content: &str,
        format: TocFormat,
        ctx: &TemplateContext,
        default_language: &str,
    ) -> Result<Self, DomainError> {
        match format {
            TocFormat::Markup => markup::parse(content, ctx, default_language),
            TocFormat::Toml => {
                let doc: TocDocument = toml::from_str(content)
                    .map_err(|e| DomainError::InvalidDocument(e.to_string()))?;
                Ok(doc.with_root(ctx))
            }
            TocFormat::Json => {
                let doc: TocDocument = serde_json::from_str(content)
                    .map_err(|e| DomainError::InvalidDocument(e.to_string()))?;
                Ok(doc.with_root(ctx))
            }
        }
    }

    fn with_root(mut self, ctx: &TemplateContext) -> Self {
        fn substitute(entries: &mut [TocEntry], toroot: &str) {
            for entry in entries {
                entry.url = entry.url.replace(TOROOT_PLACEHOLDER, toroot);
                substitute(&mut entry.children, toroot);
            }
        }
        substitute(&mut self.entries, &ctx.toroot);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        assert_eq!(TocFormat::from_path(&PathBuf::from("toc.TOML")), TocFormat::Toml);
        assert_eq!(TocFormat::from_path(&PathBuf::from("toc.json")), TocFormat::Json);
        assert_eq!(TocFormat::from_path(&PathBuf::from("guide_toc.cs")), TocFormat::Markup);
        assert_eq!(TocFormat::from_path(&PathBuf::from("toc")), TocFormat::Markup);
    }

    #[test]
    fn given_toml_with_toroot_when_parsing_then_placeholder_is_substituted() {
        let content = r#"
title = "Dev Guide"

[[entries]]
url = "{toroot}guide/components/index.html"
labels = { en = "App Components", zh-CN = "应用程序组件" }

[[entries.children]]
url = "{toroot}guide/components/fragments.html"
labels = { en = "Fragments" }
"#;
        let ctx = TemplateContext {
            toroot: "/docs/".to_string(),
            ..TemplateContext::default()
        };
        let doc = TocDocument::parse(content, TocFormat::Toml, &ctx, "en").unwrap();
        assert_eq!(doc.title.as_deref(), Some("Dev Guide"));
        assert_eq!(doc.entries[0].url, "/docs/guide/components/index.html");
        assert_eq!(doc.entries[0].labels["zh-CN"], "应用程序组件");
        assert_eq!(
            doc.entries[0].children[0].url,
            "/docs/guide/components/fragments.html"
        );
    }

    #[test]
    fn given_broken_json_when_parsing_then_reports_invalid_document() {
        let err = TocDocument::parse("{ entries: ", TocFormat::Json, &TemplateContext::default(), "en")
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDocument(_)));
    }

    #[test]
    fn given_flags_and_variables_when_checking_truthiness_then_follows_rules() {
        let mut ctx = TemplateContext::default();
        ctx.defines.push("beta".to_string());
        ctx.variables.insert("zero".to_string(), "0".to_string());
        ctx.variables.insert("lang".to_string(), "ja".to_string());
        assert!(ctx.is_true("beta"));
        assert!(ctx.is_true("lang"));
        assert!(ctx.is_true("toroot"));
        assert!(!ctx.is_true("zero"));
        assert!(!ctx.is_true("missing"));
    }
}
