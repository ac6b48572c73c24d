//! TOC loading service
//!
//! Reads a TOC source, expands its template directives and builds the tree.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{NavTree, TocDocument, TocFormat, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Service turning TOC files into navigation trees.
pub struct TocLoader {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl TocLoader {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Parse a TOC file into its declarative document.
    ///
    /// The format is picked from the extension (`.toml`, `.json`, else markup).
    pub fn read_document(&self, path: &Path) -> ApplicationResult<TocDocument> {
        if self.fs.exists(path) && !self.fs.is_file(path) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a file"))
                .with_path_context("read TOC", path);
        }
        let content = self.fs.read_to_string(path).with_path_context("read TOC", path)?;
        let format = TocFormat::from_path(path);
        debug!("read_document: {} as {:?}", path.display(), format);
        let doc = TocDocument::parse(
            &content,
            format,
            &self.settings.template_context(),
            &self.settings.default_language,
        )?;
        Ok(doc)
    }

    /// Load and build the navigation tree for a TOC file.
    pub fn load(&self, path: &Path) -> ApplicationResult<NavTree> {
        let doc = self.read_document(path)?;
        let builder = TreeBuilder::new(&self.settings.default_language, &self.settings.title);
        let tree = builder.build(&doc)?;
        if tree.is_empty() {
            warn!("{} has no navigation entries", path.display());
        }
        info!("loaded {} ({} entries)", path.display(), tree.len() - 1);
        Ok(tree)
    }
}
