//! HTML serialization of presentation nodes

use std::borrow::Cow;

use super::nodes::Node;
use crate::blocks::{ListFormat, Marks};

/// All headings share one rank
pub const HEADING_TAG: &str = "h2";

/// Serialize a node sequence as HTML
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

pub(crate) fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::LineBreak => out.push_str("<br>"),
        Node::Paragraph { children } => write_wrapped("p", children, out),
        Node::Heading { children, .. } => write_wrapped(HEADING_TAG, children, out),
        Node::List { format, items } => {
            let tag = match format {
                ListFormat::Unordered => "ul",
                ListFormat::Ordered => "ol",
            };
            write_wrapped(tag, items, out);
        }
        Node::ListItem { children } => write_wrapped("li", children, out),
        Node::Container { children } => write_wrapped("div", children, out),
        Node::Span { text, marks } => write_span(text, marks, out),
        Node::Link { href, children } => {
            out.push_str("<a href=\"");
            out.push_str(&escape_html(href));
            out.push_str("\">");
            for child in children {
                write_node(child, out);
            }
            out.push_str("</a>");
        }
    }
}

fn write_wrapped(tag: &str, children: &[Node], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    for child in children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Styled span with one nested element per active mark
fn write_span(text: &str, marks: &Marks, out: &mut String) {
    let tags: Vec<&str> = [
        (marks.bold, "strong"),
        (marks.italic, "em"),
        (marks.underline, "u"),
        (marks.strikethrough, "s"),
        (marks.code, "code"),
    ]
    .into_iter()
    .filter_map(|(active, tag)| active.then_some(tag))
    .collect();

    out.push_str("<span>");
    for tag in &tags {
        out.push('<');
        out.push_str(tag);
        out.push('>');
    }
    out.push_str(&escape_html(text));
    for tag in tags.iter().rev() {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out.push_str("</span>");
}

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Whether a link target is safe to emit as an `href`
///
/// Relative references pass. Absolute ones must use `http`, `https`,
/// `mailto` or `tel`; anything else (`javascript:`, `vbscript:`, `data:`)
/// is rejected. Browsers ignore whitespace and control characters inside a
/// scheme, so those are dropped before checking.
pub fn is_safe_href(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = normalized.find([':', '/', '?', '#']);
    match scheme_end {
        Some(idx) if normalized[idx..].starts_with(':') => {
            let scheme = &normalized[..idx];
            matches!(scheme, "http" | "https" | "mailto" | "tel")
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Hello"), Cow::Borrowed("Hello"));
        assert_eq!(escape_html("<div>"), "&lt;div&gt;");
        assert_eq!(escape_html("a & \"b\""), "a &amp; &quot;b&quot;");
    }

    #[test]
    fn test_is_safe_href() {
        assert!(is_safe_href("https://example.com/a"));
        assert!(is_safe_href("HTTP://example.com"));
        assert!(is_safe_href("mailto:bookings@example.com"));
        assert!(is_safe_href("/el/events/summer"));
        assert!(is_safe_href("#lineup"));
        assert!(is_safe_href("events/summer?at=10:00"));

        assert!(!is_safe_href("javascript:alert(1)"));
        assert!(!is_safe_href("  JAVASCRIPT:alert(1)"));
        assert!(!is_safe_href("java\nscript:alert(1)"));
        assert!(!is_safe_href("vbscript:msgbox(1)"));
        assert!(!is_safe_href("data:text/html;base64,PHNjcmlwdD4="));
    }

    #[test]
    fn test_span_marks_nest() {
        let marks = Marks {
            bold: true,
            underline: true,
            ..Marks::default()
        };
        let html = to_html(&[Node::Span {
            text: "x".to_string(),
            marks,
        }]);
        assert_eq!(html, "<span><strong><u>x</u></strong></span>");
    }

    #[test]
    fn test_ordered_list_and_link() {
        let html = to_html(&[Node::List {
            format: ListFormat::Ordered,
            items: vec![Node::ListItem {
                children: vec![Node::Link {
                    href: "/en/events?a=1&b=2".to_string(),
                    children: vec![Node::Span {
                        text: "Events".to_string(),
                        marks: Marks::default(),
                    }],
                }],
            }],
        }]);
        assert_eq!(
            html,
            "<ol><li><a href=\"/en/events?a=1&amp;b=2\"><span>Events</span></a></li></ol>"
        );
    }

    #[test]
    fn test_heading_uses_fixed_rank() {
        let html = to_html(&[Node::Heading {
            level: Some(4),
            children: Vec::new(),
        }]);
        assert_eq!(html, "<h2></h2>");
    }
}
