//! Language codes: built-in catalog and the configured allow-list.

use crate::domain::error::DomainError;

/// Language every entry must carry a label for, unless configured otherwise.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Metadata for a language the documentation site knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// Language tag as used in label spans (e.g. "en", "zh-CN")
    pub code: &'static str,
    /// English name of the language
    pub name: &'static str,
    /// Name of the language in the language itself
    pub native_name: &'static str,
}

/// Languages offered by the developer guide's language switcher.
pub const CATALOG: &[LanguageInfo] = &[
    LanguageInfo { code: "en", name: "English", native_name: "English" },
    LanguageInfo { code: "de", name: "German", native_name: "Deutsch" },
    LanguageInfo { code: "es", name: "Spanish", native_name: "Español" },
    LanguageInfo { code: "fr", name: "French", native_name: "Français" },
    LanguageInfo { code: "it", name: "Italian", native_name: "Italiano" },
    LanguageInfo { code: "ja", name: "Japanese", native_name: "日本語" },
    LanguageInfo { code: "ko", name: "Korean", native_name: "한국어" },
    LanguageInfo { code: "ru", name: "Russian", native_name: "Русский" },
    LanguageInfo { code: "zh", name: "Chinese", native_name: "中文" },
    LanguageInfo { code: "zh-CN", name: "Chinese (Simplified)", native_name: "简体中文" },
    LanguageInfo { code: "zh-TW", name: "Chinese (Traditional)", native_name: "繁體中文" },
];

/// Look up catalog metadata for a code (case-insensitive).
pub fn lookup(code: &str) -> Option<&'static LanguageInfo> {
    CATALOG
        .iter()
        .find(|info| info.code.eq_ignore_ascii_case(code.trim()))
}

/// All catalog codes, in catalog order.
pub fn catalog_codes() -> Vec<String> {
    CATALOG.iter().map(|info| info.code.to_string()).collect()
}

/// Allow-list of display languages plus the default language.
///
/// The default language is always a member, even if the configured list omits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    default: String,
    codes: Vec<String>,
}

impl LanguageSet {
    pub fn new<I, S>(default: impl Into<String>, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default = default.into().trim().to_string();
        let mut codes: Vec<String> = Vec::new();
        for code in supported {
            let code = code.into().trim().to_string();
            if code.is_empty() || codes.iter().any(|c| c.eq_ignore_ascii_case(&code)) {
                continue;
            }
            codes.push(code);
        }
        if !codes.iter().any(|c| c.eq_ignore_ascii_case(&default)) {
            codes.insert(0, default.clone());
        }
        Self { default, codes }
    }

    pub fn default_language(&self) -> &str {
        &self.default
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Resolve a requested code to its canonical allow-list spelling.
    ///
    /// Matching is case-insensitive: `zh-cn` resolves to `zh-CN` when the
    /// allow-list spells it that way.
    pub fn resolve(&self, code: &str) -> Result<&str, DomainError> {
        let wanted = code.trim();
        self.codes
            .iter()
            .find(|c| c.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
            .ok_or_else(|| DomainError::UnsupportedLanguage {
                code: wanted.to_string(),
                supported: self.codes.join(", "),
            })
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE, catalog_codes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_mixed_case_code_when_resolving_then_returns_canonical_spelling() {
        let set = LanguageSet::default();
        assert_eq!(set.resolve("zh-cn").unwrap(), "zh-CN");
        assert_eq!(set.resolve(" JA ").unwrap(), "ja");
    }

    #[test]
    fn given_unknown_code_when_resolving_then_reports_unsupported_language() {
        let set = LanguageSet::new("en", ["en", "zh"]);
        let err = set.resolve("fr").unwrap_err();
        assert_eq!(
            err,
            DomainError::UnsupportedLanguage {
                code: "fr".to_string(),
                supported: "en, zh".to_string(),
            }
        );
    }

    #[test]
    fn given_list_without_default_when_created_then_default_is_added_first() {
        let set = LanguageSet::new("en", ["ja", "ja", "ko"]);
        assert_eq!(set.codes(), &["en", "ja", "ko"]);
        assert_eq!(set.default_language(), "en");
    }

    #[test]
    fn test_lookup_catalog() {
        assert_eq!(lookup("ZH-tw").map(|l| l.native_name), Some("繁體中文"));
        assert!(lookup("xx").is_none());
    }
}
