//! Lenient conversion from CMS JSON into blocks

use serde_json::Value;

use super::{Block, BlockKind, Inline, ListFormat, Marks};

/// Parse a block array. Anything that is not an array yields no blocks.
pub fn parse_blocks(value: &Value) -> Vec<Block> {
    match value.as_array() {
        Some(items) => items.iter().map(parse_block).collect(),
        None => Vec::new(),
    }
}

/// Parse a single block. Never fails; unknown shapes become `Unspecified`.
pub fn parse_block(value: &Value) -> Block {
    let kind = BlockKind::from_tag(value.get("type").and_then(Value::as_str));
    let children = children_of(value);

    let mut block = Block::new(kind);
    block.level = value
        .get("level")
        .and_then(Value::as_u64)
        .and_then(|lvl| u8::try_from(lvl).ok());

    if block.kind == BlockKind::List {
        block.format = ListFormat::from_tag(value.get("format").and_then(Value::as_str));
        block.blocks = children.iter().map(parse_block).collect();
    } else {
        block.inlines = children.iter().map(parse_inline).collect();
    }

    block
}

/// Parse an inline child
///
/// `link` nodes keep their nested children. A child that is itself shaped
/// like a block (no `text`, but `children`) is flattened to its text so the
/// content is not lost.
pub fn parse_inline(value: &Value) -> Inline {
    if value.get("type").and_then(Value::as_str) == Some("link") {
        return Inline::Link {
            url: value
                .get("url")
                .and_then(Value::as_str)
                .filter(|url| !url.trim().is_empty())
                .map(str::to_string),
            children: children_of(value).iter().map(parse_inline).collect(),
        };
    }

    let text = match value.get("text") {
        Some(text) => text.as_str().unwrap_or_default().to_string(),
        None => collect_text(value),
    };

    Inline::Text {
        text,
        marks: Marks {
            bold: flag(value, "bold"),
            italic: flag(value, "italic"),
            underline: flag(value, "underline"),
            strikethrough: flag(value, "strikethrough"),
            code: flag(value, "code"),
        },
    }
}

fn children_of(value: &Value) -> &[Value] {
    value
        .get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn flag(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn collect_text(value: &Value) -> String {
    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return text.to_string();
    }
    children_of(value).iter().map(collect_text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_non_array() {
        assert!(parse_blocks(&json!(null)).is_empty());
        assert!(parse_blocks(&json!({"type": "paragraph"})).is_empty());
        assert!(parse_blocks(&json!("text")).is_empty());
    }

    #[test]
    fn test_parse_paragraph_marks() {
        let block = parse_block(&json!({
            "type": "paragraph",
            "children": [{"type": "text", "text": "x", "bold": true, "italic": true}]
        }));

        assert_eq!(block.kind, BlockKind::Paragraph);
        match &block.inlines[0] {
            Inline::Text { text, marks } => {
                assert_eq!(text, "x");
                assert!(marks.bold && marks.italic);
                assert!(!marks.underline);
            }
            other => panic!("Expected Text, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_children_are_blocks() {
        let block = parse_block(&json!({
            "type": "list",
            "format": "ordered",
            "children": [
                {"type": "list-item", "children": [{"text": "a"}]},
                {"type": "list-item", "children": [{"text": "b"}]}
            ]
        }));

        assert_eq!(block.format, ListFormat::Ordered);
        assert!(block.inlines.is_empty());
        assert_eq!(block.blocks.len(), 2);
        assert_eq!(block.blocks[1].inlines[0].raw_text(), "b");
    }

    #[test]
    fn test_parse_malformed_inline_fields() {
        let inline = parse_inline(&json!({"text": 12, "bold": "yes"}));
        assert_eq!(inline, Inline::text(""));
    }

    #[test]
    fn test_parse_link() {
        let inline = parse_inline(&json!({
            "type": "link",
            "url": "https://example.com/tickets",
            "children": [{"type": "text", "text": "Tickets"}]
        }));

        match inline {
            Inline::Link { url, children } => {
                assert_eq!(url.as_deref(), Some("https://example.com/tickets"));
                assert_eq!(children.len(), 1);
            }
            other => panic!("Expected Link, got {:?}", other),
        }
    }

    #[test]
    fn test_block_shaped_inline_keeps_text() {
        let inline = parse_inline(&json!({
            "type": "paragraph",
            "children": [{"text": "nested "}, {"text": "copy"}]
        }));
        assert_eq!(inline.raw_text(), "nested copy");
    }
}
