//! Rich-text rendering
//!
//! Turns CMS block trees into presentation nodes. Every content field on the
//! site goes through `render`; the only other path is the opt-in trusted
//! embed mode in [`embed`].

use serde_json::Value;
use tracing::debug;

use crate::blocks::{parse_blocks, Block, BlockKind, Inline, ListFormat};

pub mod embed;
pub mod fields;
mod html;
mod nodes;

pub use embed::{render_embed, Embed, Script};
pub use fields::{render_fields, RenderSettings, RenderedField};
pub use html::{escape_html, is_safe_href, to_html, HEADING_TAG};
pub use nodes::Node;

/// Render blocks into presentation nodes, one node per block, in order
pub fn render(blocks: &[Block]) -> Vec<Node> {
    blocks.iter().map(render_block).collect()
}

/// Render raw CMS JSON. Anything that is not a block array renders as nothing.
pub fn render_value(value: &Value) -> Vec<Node> {
    render(&parse_blocks(value))
}

/// Render blocks straight to HTML
pub fn render_html(blocks: &[Block]) -> String {
    to_html(&render(blocks))
}

/// Visible text of the blocks, one line per block
///
/// Used for excerpts and previews; blank paragraphs become empty lines.
pub fn plain_text(blocks: &[Block]) -> String {
    render(blocks)
        .iter()
        .map(Node::text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &Block) -> Node {
    match &block.kind {
        BlockKind::Paragraph => {
            if block.is_blank() {
                Node::LineBreak
            } else {
                Node::Paragraph {
                    children: render_inlines(&block.inlines),
                }
            }
        }
        BlockKind::Heading => Node::Heading {
            level: block.level,
            children: render_inlines(&block.inlines),
        },
        BlockKind::List => Node::List {
            format: block.format,
            items: block.blocks.iter().map(render_list_child).collect(),
        },
        // A bare item still needs a list around it to stay valid markup
        BlockKind::ListItem => standalone_item(block, ListFormat::Unordered),
        BlockKind::OrderedListItem => standalone_item(block, ListFormat::Ordered),
        BlockKind::Unspecified(tag) => {
            if let Some(tag) = tag {
                debug!("Rendering unknown block type '{}' as container", tag);
            }
            Node::Container {
                children: render_inlines(&block.inlines),
            }
        }
    }
}

fn render_list_child(block: &Block) -> Node {
    match block.kind {
        BlockKind::ListItem | BlockKind::OrderedListItem => list_item(block),
        // Nested lists and stray blocks still sit inside an item
        _ => Node::ListItem {
            children: vec![render_block(block)],
        },
    }
}

fn list_item(block: &Block) -> Node {
    Node::ListItem {
        children: render_inlines(&block.inlines),
    }
}

fn standalone_item(block: &Block, format: ListFormat) -> Node {
    Node::List {
        format,
        items: vec![list_item(block)],
    }
}

fn render_inlines(inlines: &[Inline]) -> Vec<Node> {
    inlines.iter().map(render_inline).collect()
}

fn render_inline(inline: &Inline) -> Node {
    match inline {
        Inline::Text { text, marks } => Node::Span {
            text: text.clone(),
            marks: *marks,
        },
        Inline::Link {
            url: Some(url),
            children,
        } if is_safe_href(url) => Node::Link {
            href: url.clone(),
            children: render_inlines(children),
        },
        Inline::Link { url, children } => {
            if let Some(url) = url {
                debug!("Dropping link with unsafe target {:?}", url);
            }
            Node::Span {
                text: children.iter().map(Inline::raw_text).collect(),
                marks: Default::default(),
            }
        }
    }
}
