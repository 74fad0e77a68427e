//! Presentation node types

use serde::Serialize;

use crate::blocks::{ListFormat, Marks};

/// Output of the block renderer
///
/// Nodes are plain data; `to_html` and `text` give the two standard
/// presentations, hosts are free to walk the tree themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Blank paragraph, preserved as a line break
    LineBreak,
    Paragraph {
        children: Vec<Node>,
    },
    /// Rendered at a single fixed rank; `level` is informational
    Heading {
        level: Option<u8>,
        children: Vec<Node>,
    },
    List {
        format: ListFormat,
        items: Vec<Node>,
    },
    ListItem {
        children: Vec<Node>,
    },
    /// Generic block for unknown block types
    Container {
        children: Vec<Node>,
    },
    /// Styled text run
    Span {
        text: String,
        marks: Marks,
    },
    Link {
        href: String,
        children: Vec<Node>,
    },
}

impl Node {
    /// Child nodes (empty for leaves)
    pub fn children(&self) -> &[Node] {
        match self {
            Node::LineBreak | Node::Span { .. } => &[],
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::ListItem { children }
            | Node::Container { children }
            | Node::Link { children, .. } => children,
            Node::List { items, .. } => items,
        }
    }

    /// Visible text of this node
    ///
    /// List items are separated by newlines; everything else concatenates.
    pub fn text(&self) -> String {
        match self {
            Node::LineBreak => String::new(),
            Node::Span { text, .. } => text.clone(),
            Node::List { items, .. } => items
                .iter()
                .map(Node::text)
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.children().iter().map(Node::text).collect(),
        }
    }

    /// Serialize this node as HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        super::html::write_node(self, &mut out);
        out
    }
}
