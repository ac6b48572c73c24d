use std::fmt;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::labels::Labels;

/// Handle of a node inside a [`NavTree`].
pub type NodeId = Index;

/// Static content of a navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Root-relative target path; empty for pure section headers
    pub url: String,
    /// Titles per language
    pub labels: Labels,
}

impl fmt::Display for NavEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.url.is_empty() {
            write!(f, "{}", self.labels.default_label())
        } else {
            write!(f, "{} ({})", self.labels.default_label(), self.url)
        }
    }
}

/// Node in the arena-based navigation tree.
#[derive(Debug)]
pub struct NavNode {
    pub entry: NavEntry,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<NodeId>,
    /// Child nodes in render order
    pub children: Vec<NodeId>,
    /// Whether the children are currently shown
    pub expanded: bool,
    /// Whether this node is the page being viewed
    pub active: bool,
}

impl NavNode {
    pub fn is_section(&self) -> bool {
        !self.children.is_empty()
    }
}

/// What a collapse does to expansion state further down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapsePolicy {
    /// Descendants keep their flags while hidden and reappear unchanged.
    #[default]
    Preserve,
    /// Collapsing resets every descendant to collapsed.
    Discard,
}

/// Strip `#fragment` and `?query` so page urls match their TOC entry.
pub fn normalize_url(url: &str) -> &str {
    let url = url.trim();
    let end = url.find(['#', '?']).unwrap_or(url.len());
    &url[..end]
}

/// Arena-backed navigation tree.
///
/// Structure is fixed once built; only `expanded` and `active` flags change.
#[derive(Debug)]
pub struct NavTree {
    arena: Arena<NavNode>,
    root: NodeId,
}

impl NavTree {
    /// Create a tree holding only the root. The root starts expanded since
    /// it is an ancestor of every page.
    pub fn new(root: NavEntry) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(NavNode {
            entry: root,
            parent: None,
            children: Vec::new(),
            expanded: true,
            active: false,
        });
        Self { arena, root }
    }

    #[instrument(level = "trace", skip(self, entry))]
    pub(crate) fn insert_child(&mut self, parent: NodeId, entry: NavEntry) -> NodeId {
        let node_idx = self.arena.insert(NavNode {
            entry,
            parent: Some(parent),
            children: Vec::new(),
            expanded: false,
            active: false,
        });
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        node_idx
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, idx: NodeId) -> Option<&NavNode> {
        self.arena.get(idx)
    }

    /// The root node; it is never removed, so lookup cannot miss.
    pub fn root_node(&self) -> &NavNode {
        &self.arena[self.root]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn children(&self, idx: NodeId) -> &[NodeId] {
        self.get(idx).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, idx: NodeId) -> Option<NodeId> {
        self.get(idx).and_then(|n| n.parent)
    }

    pub fn is_expanded(&self, idx: NodeId) -> bool {
        self.get(idx).map(|n| n.expanded).unwrap_or(false)
    }

    pub fn default_language(&self) -> &str {
        self.root_node().entry.labels.default_language()
    }

    /// Ancestors of a node, nearest first, ending with the root.
    pub fn ancestors(&self, idx: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parent(idx);
        while let Some(p) = current {
            chain.push(p);
            current = self.parent(p);
        }
        chain
    }

    /// Pre-order traversal, children in render order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Number of levels, the root counting as one.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.children(idx).iter().map(|&child| (child, depth + 1)));
        }
        max_depth
    }

    /// Find the first node (pre-order) whose url matches.
    ///
    /// Fragment and query suffixes of `url` are ignored. Section headers
    /// without a url never match.
    #[instrument(level = "debug", skip(self))]
    pub fn find(&self, url: &str) -> Option<NodeId> {
        let wanted = normalize_url(url);
        if wanted.is_empty() {
            return None;
        }
        self.iter()
            .find(|(_, node)| !node.entry.url.is_empty() && node.entry.url == wanted)
            .map(|(idx, _)| idx)
    }

    pub fn active(&self) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.active).map(|(idx, _)| idx)
    }

    /// Mark the page at `url` active and expand its ancestor chain.
    ///
    /// Only strict ancestors expand; an active section stays collapsed. All
    /// flags are reset first, so an unknown url leaves only the root expanded.
    #[instrument(level = "debug", skip(self))]
    pub fn activate(&mut self, url: &str) -> Result<NodeId, DomainError> {
        self.reset_expansion();
        let idx = self
            .find(url)
            .ok_or_else(|| DomainError::NodeNotFound(url.to_string()))?;
        for ancestor in self.ancestors(idx) {
            if let Some(node) = self.arena.get_mut(ancestor) {
                node.expanded = true;
            }
        }
        if let Some(node) = self.arena.get_mut(idx) {
            node.active = true;
        }
        debug!("activated {}", url);
        Ok(idx)
    }

    /// Collapse everything but the root and clear the active marker.
    pub fn reset_expansion(&mut self) {
        let root = self.root;
        for (idx, node) in self.arena.iter_mut() {
            node.expanded = idx == root;
            node.active = false;
        }
    }

    /// Flip the expanded flag of a section node; returns the new state.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, idx: NodeId, policy: CollapsePolicy) -> Result<bool, DomainError> {
        let node = self
            .arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::NodeNotFound(format!("{:?}", idx)))?;
        if !node.is_section() {
            return Err(DomainError::NotASection(node.entry.to_string()));
        }
        node.expanded = !node.expanded;
        let expanded = node.expanded;
        if !expanded && policy == CollapsePolicy::Discard {
            self.collapse_descendants(idx);
        }
        Ok(expanded)
    }

    fn collapse_descendants(&mut self, idx: NodeId) {
        let mut stack: Vec<NodeId> = self.children(idx).to_vec();
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.get_mut(current) {
                node.expanded = false;
                stack.extend(node.children.iter().copied());
            }
        }
    }
}

pub struct TreeIterator<'a> {
    tree: &'a NavTree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a NavTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root()],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a NavNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
