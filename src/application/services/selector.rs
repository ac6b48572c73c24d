//! Language selector service
//!
//! Holds the active display language and persists explicit changes.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::LanguageSet;
use crate::infrastructure::traits::PreferenceStore;

/// Current display language, validated against an allow-list.
pub struct LanguageSelector {
    languages: LanguageSet,
    current: String,
    store: Arc<dyn PreferenceStore>,
}

impl LanguageSelector {
    /// Initialize from the stored preference.
    ///
    /// A missing, unreadable or unsupported stored value falls back to the
    /// default language.
    pub fn new(languages: LanguageSet, store: Arc<dyn PreferenceStore>) -> Self {
        let fallback = languages.default_language().to_string();
        let current = match store.load() {
            Ok(Some(code)) => match languages.resolve(&code) {
                Ok(canonical) => canonical.to_string(),
                Err(e) => {
                    warn!("ignoring stored language: {}", e);
                    fallback
                }
            },
            Ok(None) => fallback,
            Err(e) => {
                warn!("cannot read language preference, using {}: {}", fallback, e);
                fallback
            }
        };
        debug!("language selector starts with {}", current);
        Self {
            languages,
            current,
            store,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Canonical spelling of a supported code, without changing the preference.
    pub fn resolve(&self, code: &str) -> ApplicationResult<String> {
        Ok(self.languages.resolve(code)?.to_string())
    }

    /// Validate, persist and adopt a new language.
    ///
    /// Neither an unsupported code nor a failed write changes `current()`.
    #[instrument(level = "debug", skip(self))]
    pub fn set_current(&mut self, code: &str) -> ApplicationResult<&str> {
        let canonical = self.resolve(code)?;
        self.store
            .save(&canonical)
            .with_preference_context("save language")?;
        self.current = canonical;
        Ok(&self.current)
    }
}
