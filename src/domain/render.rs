//! Render pass: resolves labels for one language and prunes collapsed subtrees.

use std::fmt::{self, Write};

use serde::Serialize;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{NavNode, NavTree, NodeId};

/// Expand/collapse marker shown next to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Affordance {
    /// Leaf page, nothing to toggle
    None,
    Collapsed,
    Expanded,
}

impl Affordance {
    pub fn marker(&self) -> &'static str {
        match self {
            Affordance::None => " ",
            Affordance::Collapsed => "▸",
            Affordance::Expanded => "▾",
        }
    }
}

/// One visible node of a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNode {
    pub url: String,
    pub label: String,
    /// Language the label was taken from, after fallback
    pub language: String,
    pub active: bool,
    pub affordance: Affordance,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedNode>,
}

/// Render the subtree at `idx` for `language`.
///
/// Labels fall back to the tree's default language, so every rendered node
/// carries a non-empty label. Children appear only under expanded sections.
pub fn render(tree: &NavTree, idx: NodeId, language: &str) -> Option<RenderedNode> {
    tree.get(idx).map(|node| render_node(tree, node, language))
}

/// Render the whole tree starting at the root.
#[instrument(level = "debug", skip(tree))]
pub fn render_tree(tree: &NavTree, language: &str) -> RenderedNode {
    render_node(tree, tree.root_node(), language)
}

fn affordance(node: &NavNode) -> Affordance {
    match (node.is_section(), node.expanded) {
        (false, _) => Affordance::None,
        (true, false) => Affordance::Collapsed,
        (true, true) => Affordance::Expanded,
    }
}

fn visible_children<'a>(tree: &'a NavTree, node: &NavNode) -> Vec<&'a NavNode> {
    if affordance(node) != Affordance::Expanded {
        return Vec::new();
    }
    node.children.iter().filter_map(|&c| tree.get(c)).collect()
}

fn rendered(node: &NavNode, language: &str, children: Vec<RenderedNode>) -> RenderedNode {
    let (used, label) = node.entry.labels.resolve(language);
    RenderedNode {
        url: node.entry.url.clone(),
        label: label.to_string(),
        language: used.to_string(),
        active: node.active,
        affordance: affordance(node),
        children,
    }
}

/// Post-order walk with an explicit stack; finished subtrees collect on
/// `done` until their parent picks them up.
fn render_node(tree: &NavTree, top: &NavNode, language: &str) -> RenderedNode {
    let mut work: Vec<(&NavNode, bool)> = visible_children(tree, top)
        .into_iter()
        .rev()
        .map(|child| (child, false))
        .collect();
    let mut done: Vec<RenderedNode> = Vec::new();

    while let Some((node, entered)) = work.pop() {
        let children = visible_children(tree, node);
        if !entered && !children.is_empty() {
            work.push((node, true));
            work.extend(children.into_iter().rev().map(|child| (child, false)));
            continue;
        }
        let finished = done.split_off(done.len() - children.len());
        done.push(rendered(node, language, finished));
    }

    rendered(top, language, done)
}

impl RenderedNode {
    /// Labels of all visible nodes in pre-order.
    pub fn visible_labels(&self) -> Vec<&str> {
        self.iter().map(|n| n.label.as_str()).collect()
    }

    /// Visible node with the given url, if rendered.
    pub fn find(&self, url: &str) -> Option<&RenderedNode> {
        if url.is_empty() {
            return None;
        }
        self.iter().find(|n| n.url == url)
    }

    /// Visible nodes in pre-order, this node first.
    pub fn iter(&self) -> impl Iterator<Item = &RenderedNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    fn display_line(&self) -> String {
        let mut line = format!("{} {}", self.affordance.marker(), self.label);
        if self.active {
            line.push_str(" *");
        }
        line
    }

    pub fn to_tree(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree()).collect();
        Tree::new(self.display_line()).with_leaves(leaves)
    }

    /// Nested `<ul id="nav">` list of this node's visible children.
    pub fn to_html(&self) -> HtmlList<'_> {
        HtmlList(self)
    }

    fn write_html(&self, out: &mut impl Write, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let link = if self.url.is_empty() {
            format!("<span>{}</span>", escape_html(&self.label))
        } else {
            format!(
                "<a href=\"{}\">{}</a>",
                escape_html(&self.url),
                escape_html(&self.label)
            )
        };

        let mut classes = Vec::new();
        if self.affordance != Affordance::None {
            classes.push("nav-section");
        }
        if self.affordance == Affordance::Expanded {
            classes.push("expanded");
        }
        if self.active {
            classes.push("selected");
        }
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", classes.join(" "))
        };

        if self.affordance == Affordance::None {
            return writeln!(out, "{indent}<li{class_attr}>{link}</li>");
        }
        writeln!(out, "{indent}<li{class_attr}>")?;
        writeln!(out, "{indent}  <div class=\"nav-section-header\">{link}</div>")?;
        if !self.children.is_empty() {
            writeln!(out, "{indent}  <ul>")?;
            for child in &self.children {
                child.write_html(out, depth + 2)?;
            }
            writeln!(out, "{indent}  </ul>")?;
        }
        writeln!(out, "{indent}</li>")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// HTML rendering of a [`RenderedNode`], written on display.
pub struct HtmlList<'a>(&'a RenderedNode);

impl fmt::Display for HtmlList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<ul id=\"nav\">")?;
        for child in &self.0.children {
            child.write_html(f, 1)?;
        }
        writeln!(f, "</ul>")
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
