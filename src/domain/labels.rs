//! Per-language display titles of a navigation entry.

use std::collections::BTreeMap;

use serde::Serialize;

/// Collapse runs of whitespace (including newlines from markup) into single spaces.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display titles keyed by language code.
///
/// Always holds a non-empty entry for its default language, so resolving a
/// label can never come back empty-handed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labels {
    default_language: String,
    entries: BTreeMap<String, String>,
}

impl Labels {
    /// Create labels from the default-language title.
    ///
    /// Returns `None` when the title is blank after whitespace normalization.
    pub fn new(default_language: &str, text: &str) -> Option<Self> {
        let text = normalize_text(text);
        if text.is_empty() {
            return None;
        }
        let mut entries = BTreeMap::new();
        entries.insert(default_language.to_string(), text);
        Some(Self {
            default_language: default_language.to_string(),
            entries,
        })
    }

    /// Build labels from a raw language → title map.
    ///
    /// Blank titles are discarded; `None` if the default language has none left.
    pub fn from_map(default_language: &str, raw: &BTreeMap<String, String>) -> Option<Self> {
        let default_text = raw
            .iter()
            .find(|(lang, _)| lang.eq_ignore_ascii_case(default_language))
            .map(|(_, text)| text.as_str())?;
        let mut labels = Self::new(default_language, default_text)?;
        for (lang, text) in raw {
            if lang.eq_ignore_ascii_case(default_language) {
                continue;
            }
            labels = labels.with(lang, text);
        }
        Some(labels)
    }

    /// Add a translated title; blank titles are ignored.
    pub fn with(mut self, language: &str, text: &str) -> Self {
        let text = normalize_text(text);
        let language = language.trim();
        if !text.is_empty() && !language.is_empty() {
            self.entries.insert(language.to_string(), text);
        }
        self
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn default_label(&self) -> &str {
        self.entries
            .get(&self.default_language)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Title for exactly this language (case-insensitive), without fallback.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.entries
            .get(language)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
                    .map(|(_, text)| text)
            })
            .map(String::as_str)
    }

    /// Title to display for `language`, falling back to the default language.
    ///
    /// Returns `(language actually used, title)`.
    pub fn resolve(&self, language: &str) -> (&str, &str) {
        if let Some((lang, text)) = self
            .entries
            .iter()
            .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
        {
            return (lang, text);
        }
        (&self.default_language, self.default_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_blank_default_title_when_creating_then_returns_none() {
        assert!(Labels::new("en", "  \n\t ").is_none());
    }

    #[test]
    fn given_missing_translation_when_resolving_then_falls_back_to_default() {
        let labels = Labels::new("en", "Fragments").unwrap().with("zh", "片段");
        assert_eq!(labels.resolve("zh"), ("zh", "片段"));
        assert_eq!(labels.resolve("fr"), ("en", "Fragments"));
    }

    #[test]
    fn given_markup_whitespace_when_creating_then_text_is_collapsed() {
        let labels = Labels::new("en", "\n   Best\n      Practices  ").unwrap();
        assert_eq!(labels.default_label(), "Best Practices");
    }

    #[test]
    fn given_raw_map_without_default_when_building_then_returns_none() {
        let mut raw = BTreeMap::new();
        raw.insert("de".to_string(), "Anhang".to_string());
        assert!(Labels::from_map("en", &raw).is_none());

        raw.insert("EN".to_string(), "Appendix".to_string());
        let labels = Labels::from_map("en", &raw).unwrap();
        assert_eq!(labels.default_label(), "Appendix");
        assert_eq!(labels.get("DE"), Some("Anhang"));
    }
}
