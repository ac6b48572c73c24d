//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of navigation tree rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported language: {code} (supported: {supported})")]
    UnsupportedLanguage { code: String, supported: String },

    #[error("no navigation entry for url: {0}")]
    NodeNotFound(String),

    #[error("not a section, nothing to expand: {0}")]
    NotASection(String),

    #[error("entry without '{language}' label: {url}")]
    MissingDefaultLabel { url: String, language: String },

    #[error("invalid toc at line {line}: {message}")]
    InvalidToc { line: usize, message: String },

    #[error("unbalanced template directive at line {line}: {directive}")]
    UnbalancedDirective { line: usize, directive: String },

    #[error("invalid toc document: {0}")]
    InvalidDocument(String),
}
