//! Domain layer: navigation tree, labels, languages and rendering
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod labels;
pub mod language;
pub mod markup;
pub mod render;
pub mod source;

pub use arena::{normalize_url, CollapsePolicy, NavEntry, NavNode, NavTree, NodeId};
pub use builder::TreeBuilder;
pub use error::DomainError;
pub use labels::Labels;
pub use language::{LanguageInfo, LanguageSet, CATALOG, DEFAULT_LANGUAGE};
pub use render::{render, render_tree, Affordance, HtmlList, RenderedNode};
pub use source::{TemplateContext, TocDocument, TocEntry, TocFormat};
