//! Navigation session
//!
//! Owns one loaded tree plus the language selector, and handles the
//! interaction events: activate a page, toggle a section, switch language.

use tracing::{debug, info, warn};

use crate::application::ApplicationResult;
use crate::domain::{
    render, render_tree, CollapsePolicy, DomainError, NavTree, NodeId, RenderedNode,
};

use super::LanguageSelector;

/// Interactive state for one page view.
pub struct NavigationSession {
    tree: NavTree,
    selector: LanguageSelector,
    policy: CollapsePolicy,
}

impl NavigationSession {
    pub fn new(tree: NavTree, selector: LanguageSelector, policy: CollapsePolicy) -> Self {
        Self {
            tree,
            selector,
            policy,
        }
    }

    pub fn tree(&self) -> &NavTree {
        &self.tree
    }

    pub fn selector(&self) -> &LanguageSelector {
        &self.selector
    }

    pub fn language(&self) -> &str {
        self.selector.current()
    }

    /// Node whose url matches, ignoring fragment and query.
    pub fn find(&self, url: &str) -> Option<NodeId> {
        self.tree.find(url)
    }

    /// Mark `url` as the page being viewed and expand its ancestors.
    ///
    /// An unknown url is not fatal: the tree is left collapsed and `None`
    /// is returned.
    pub fn activate(&mut self, url: &str) -> Option<NodeId> {
        match self.tree.activate(url) {
            Ok(idx) => Some(idx),
            Err(e) => {
                warn!("active page not in TOC, rendering collapsed: {}", e);
                None
            }
        }
    }

    /// Render the whole tree in the current language.
    pub fn render(&self) -> RenderedNode {
        render_tree(&self.tree, self.selector.current())
    }

    /// Render the whole tree in another supported language without
    /// changing the preference.
    pub fn render_with(&self, code: &str) -> ApplicationResult<RenderedNode> {
        let language = self.selector.resolve(code)?;
        Ok(render_tree(&self.tree, &language))
    }

    /// Render one subtree in the current language.
    pub fn render_node(&self, idx: NodeId) -> ApplicationResult<RenderedNode> {
        render(&self.tree, idx, self.selector.current())
            .ok_or_else(|| DomainError::NodeNotFound(format!("{:?}", idx)).into())
    }

    /// Flip a section and re-render its subtree.
    pub fn toggle(&mut self, idx: NodeId) -> ApplicationResult<RenderedNode> {
        let expanded = self.tree.toggle(idx, self.policy)?;
        debug!("toggle {:?}: expanded={}", idx, expanded);
        self.render_node(idx)
    }

    /// Flip the section at `url` and re-render its subtree.
    pub fn toggle_url(&mut self, url: &str) -> ApplicationResult<RenderedNode> {
        let idx = self
            .find(url)
            .ok_or_else(|| DomainError::NodeNotFound(url.to_string()))?;
        self.toggle(idx)
    }

    /// Switch and persist the display language, then re-render everything.
    pub fn set_language(&mut self, code: &str) -> ApplicationResult<RenderedNode> {
        let current = self.selector.set_current(code)?;
        info!("language set to {}", current);
        Ok(self.render())
    }

    /// Labels from the root down to `idx`, in the current language.
    pub fn breadcrumbs(&self, idx: NodeId) -> Vec<String> {
        let language = self.selector.current();
        let mut chain: Vec<NodeId> = self.tree.ancestors(idx);
        chain.reverse();
        chain.push(idx);
        chain
            .into_iter()
            .filter_map(|id| self.tree.get(id))
            .map(|node| node.entry.labels.resolve(language).1.to_string())
            .collect()
    }
}
