//! Rich-text block model
//!
//! The CMS stores rich text as a JSON tree of blocks. Parsing is lenient:
//! malformed nodes degrade to empty values instead of failing, so a single
//! badly authored block never takes down the page around it.

mod parse;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use parse::{parse_block, parse_blocks, parse_inline};

/// Block type tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    ListItem,
    OrderedListItem,
    /// Any other tag (kept for diagnostics), or a missing tag
    Unspecified(Option<String>),
}

impl BlockKind {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("paragraph") => BlockKind::Paragraph,
            Some("heading") => BlockKind::Heading,
            Some("list") => BlockKind::List,
            Some("list-item") => BlockKind::ListItem,
            Some("ordered-list-item") => BlockKind::OrderedListItem,
            Some("unspecified") | None => BlockKind::Unspecified(None),
            Some(other) => BlockKind::Unspecified(Some(other.to_string())),
        }
    }
}

/// List style selected by a list block's `format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    #[default]
    Unordered,
    Ordered,
}

impl ListFormat {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("ordered") => ListFormat::Ordered,
            _ => ListFormat::Unordered,
        }
    }
}

/// Inline marks. Any combination may be active at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
}

/// Leaf content of a text-bearing block
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// A run of text with its marks
    Text { text: String, marks: Marks },
    /// Hyperlink wrapping further inlines. A missing URL renders as plain children.
    Link {
        url: Option<String>,
        children: Vec<Inline>,
    },
}

impl Inline {
    /// Unmarked text run
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    /// Text run with marks
    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Inline::Text {
            text: text.into(),
            marks,
        }
    }

    /// Concatenated raw text of this inline and any nested inlines
    pub fn raw_text(&self) -> String {
        match self {
            Inline::Text { text, .. } => text.clone(),
            Inline::Link { children, .. } => children.iter().map(Inline::raw_text).collect(),
        }
    }

    /// True when the inline carries no visible text
    pub fn is_blank(&self) -> bool {
        match self {
            Inline::Text { text, .. } => text.trim().is_empty(),
            Inline::Link { children, .. } => children.iter().all(Inline::is_blank),
        }
    }
}

/// One node of the rich-text tree
///
/// `list` blocks carry their items in `blocks`; every other kind carries
/// text in `inlines`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Block {
    pub kind: BlockKind,
    /// Only meaningful for `list` blocks
    pub format: ListFormat,
    /// Heading rank as authored; not distinguished when rendering
    pub level: Option<u8>,
    pub inlines: Vec<Inline>,
    pub blocks: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            format: ListFormat::default(),
            level: None,
            inlines: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn with_inlines(mut self, inlines: Vec<Inline>) -> Self {
        self.inlines = inlines;
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_format(mut self, format: ListFormat) -> Self {
        self.format = format;
        self
    }

    /// True when every inline child is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.inlines.iter().all(Inline::is_blank)
    }
}

impl From<Value> for Block {
    fn from(value: Value) -> Self {
        parse_block(&value)
    }
}
