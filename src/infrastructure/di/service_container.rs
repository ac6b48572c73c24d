//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{LanguageSelector, NavigationSession, TocLoader};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::traits::{
    FilePreferenceStore, FileSystem, PreferenceStore, RealFileSystem,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Durable language preference
    pub preferences: Arc<dyn PreferenceStore>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    ///
    /// The preference store lives at `settings.preference_file`.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let preferences = Arc::new(FilePreferenceStore::new(
            fs.clone(),
            settings.preference_file.clone(),
        ));
        Self::with_deps(settings, fs, preferences)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            preferences,
        }
    }

    pub fn loader(&self) -> TocLoader {
        TocLoader::new(self.fs.clone(), self.settings.clone())
    }

    pub fn selector(&self) -> LanguageSelector {
        LanguageSelector::new(self.settings.language_set(), self.preferences.clone())
    }

    /// Load a TOC and open a session on it, optionally with an active page.
    pub fn session(&self, toc: &Path, active: Option<&str>) -> ApplicationResult<NavigationSession> {
        let tree = self.loader().load(toc)?;
        let mut session = NavigationSession::new(tree, self.selector(), self.settings.collapse_policy);
        if let Some(url) = active {
            session.activate(url);
        }
        Ok(session)
    }
}
