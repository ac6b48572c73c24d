//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Durable storage for the preferred display language.
pub trait PreferenceStore: Send + Sync {
    /// Stored language code, `None` if nothing was stored yet.
    fn load(&self) -> io::Result<Option<String>>;

    /// Persist a language code, replacing any previous value.
    fn save(&self, code: &str) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// On-disk layout of the preference file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreference {
    language: Option<String>,
}

/// Preference store backed by a small TOML file (`language = "zh-CN"`).
pub struct FilePreferenceStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> io::Result<Option<String>> {
        if !self.fs.exists(&self.path) {
            debug!("no preference file at {}", self.path.display());
            return Ok(None);
        }
        let content = self.fs.read_to_string(&self.path)?;
        let stored: StoredPreference = toml::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(stored
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()))
    }

    fn save(&self, code: &str) -> io::Result<()> {
        let stored = StoredPreference {
            language: Some(code.to_string()),
        };
        let content = toml::to_string(&stored)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        self.fs.ensure_parent(&self.path)?;
        self.fs.write(&self.path, &content)?;
        debug!("saved language {} to {}", code, self.path.display());
        Ok(())
    }
}
