//! Tree builder turning a declarative TOC document into a navigation tree.

use tracing::{debug, instrument};

use crate::domain::arena::{NavEntry, NavTree, NodeId};
use crate::domain::error::DomainError;
use crate::domain::labels::Labels;
use crate::domain::language::DEFAULT_LANGUAGE;
use crate::domain::source::{TocDocument, TocEntry};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Title of the synthetic root when the document has none.
pub const DEFAULT_TITLE: &str = "Contents";

/// Deepest nesting accepted, the root counting as level one.
pub const MAX_DEPTH: usize = 256;

/// Constructs navigation trees from TOC documents.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    default_language: String,
    title: String,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE, DEFAULT_TITLE)
    }
}

impl TreeBuilder {
    pub fn new(default_language: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            default_language: default_language.into(),
            title: title.into(),
        }
    }

    /// Build the tree, validating that every entry has a default-language label.
    ///
    /// Documents nested deeper than [`MAX_DEPTH`] are rejected.
    ///
    /// The document's own `default_language` and `title` take precedence
    /// over the builder's.
    #[instrument(level = "debug", skip(self, doc))]
    pub fn build(&self, doc: &TocDocument) -> TreeResult<NavTree> {
        let language = doc
            .default_language
            .as_deref()
            .unwrap_or(&self.default_language);
        let title = doc.title.as_deref().unwrap_or(&self.title);
        let root_labels =
            Labels::new(language, title).ok_or_else(|| DomainError::MissingDefaultLabel {
                url: "<root>".to_string(),
                language: language.to_string(),
            })?;

        let mut tree = NavTree::new(NavEntry {
            url: String::new(),
            labels: root_labels,
        });

        let mut stack: Vec<(&TocEntry, NodeId, usize)> = doc
            .entries
            .iter()
            .rev()
            .map(|entry| (entry, tree.root(), 2))
            .collect();

        while let Some((entry, parent, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(DomainError::InvalidDocument(format!(
                    "entries nested deeper than {} levels at {}",
                    MAX_DEPTH,
                    entry.url.trim()
                )));
            }
            let labels = Labels::from_map(language, &entry.labels).ok_or_else(|| {
                DomainError::MissingDefaultLabel {
                    url: entry.url.clone(),
                    language: language.to_string(),
                }
            })?;
            let idx = tree.insert_child(
                parent,
                NavEntry {
                    url: entry.url.trim().to_string(),
                    labels,
                },
            );
            // Reverse so children pop off the stack in document order
            for child in entry.children.iter().rev() {
                stack.push((child, idx, depth + 1));
            }
        }

        debug!("built tree with {} nodes, depth {}", tree.len(), tree.depth());
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_document_when_building_then_document_order_is_kept() {
        let doc = TocDocument {
            title: Some("Dev Guide".to_string()),
            default_language: None,
            entries: vec![
                TocEntry::new("/a/")
                    .label("en", "A")
                    .child(TocEntry::new("/a/1").label("en", "One"))
                    .child(TocEntry::new("/a/2").label("en", "Two")),
                TocEntry::new("/b").label("en", "B"),
            ],
        };
        let tree = TreeBuilder::default().build(&doc).unwrap();
        let urls: Vec<_> = tree.iter().map(|(_, n)| n.entry.url.clone()).collect();
        assert_eq!(urls, vec!["", "/a/", "/a/1", "/a/2", "/b"]);
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.entry.labels.default_label(), "Dev Guide");
    }

    #[test]
    fn given_entry_without_default_label_when_building_then_fails() {
        let doc = TocDocument {
            entries: vec![TocEntry::new("/ja-only").label("ja", "概要")],
            ..TocDocument::default()
        };
        let err = TreeBuilder::default().build(&doc).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingDefaultLabel {
                url: "/ja-only".to_string(),
                language: "en".to_string()
            }
        );
    }

    #[test]
    fn given_nesting_beyond_limit_when_building_then_rejects_document() {
        let nested = |levels: usize| {
            let mut entry = TocEntry::new("/leaf").label("en", "Leaf");
            for level in 0..levels {
                entry = TocEntry::new(format!("/l{level}/"))
                    .label("en", "Level")
                    .child(entry);
            }
            TocDocument {
                entries: vec![entry],
                ..TocDocument::default()
            }
        };

        let tree = TreeBuilder::default().build(&nested(MAX_DEPTH - 2)).unwrap();
        assert_eq!(tree.depth(), MAX_DEPTH);

        let err = TreeBuilder::default().build(&nested(MAX_DEPTH - 1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidDocument(_)));
    }

    #[test]
    fn given_document_language_when_building_then_it_overrides_builder_default() {
        let doc = TocDocument {
            default_language: Some("zh-CN".to_string()),
            entries: vec![TocEntry::new("/x").label("zh-CN", "片段")],
            ..TocDocument::default()
        };
        let tree = TreeBuilder::default().build(&doc).unwrap();
        assert_eq!(tree.default_language(), "zh-CN");
    }
}
