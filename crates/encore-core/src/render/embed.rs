//! Trusted embed rendering
//!
//! Mix widgets and social embeds are stored as raw HTML inside rich-text
//! fields and only work if their bundled scripts run. Scripts injected as
//! markup never execute, so they are pulled out here and handed back as
//! separate elements, each remembering where in the markup it stood, for the
//! host to re-create next to its widget.
//!
//! Only fields explicitly configured as embed fields may use this path.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::html::escape_html;
use crate::blocks::Block;

/// Matches a complete script element, capturing attributes and body
static SCRIPT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").unwrap());

/// Matches one attribute, with double-quoted, single-quoted, bare or no value
static ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .unwrap()
});

/// A script element extracted from embed markup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    /// Attributes in source order; `None` for boolean attributes like `async`
    pub attributes: Vec<(String, Option<String>)>,
    /// Inline script source (empty for external scripts)
    pub body: String,
    /// Byte offset in [`Embed::markup`] where the element stood
    pub offset: usize,
}

impl Script {
    /// Value of the `src` attribute, if any
    pub fn src(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("src"))
            .and_then(|(_, value)| value.as_deref())
    }

    /// A fresh script element
    pub fn to_html(&self) -> String {
        let mut out = String::from("<script");
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&escape_html(value));
                out.push('"');
            }
        }
        out.push('>');
        out.push_str(&self.body);
        out.push_str("</script>");
        out
    }
}

/// Embed markup with its scripts split out
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    /// Raw markup with every script element removed
    pub markup: String,
    /// Scripts to re-create, in document order
    pub scripts: Vec<Script>,
}

impl Embed {
    /// Parse raw embed HTML
    pub fn from_markup(raw: &str) -> Self {
        let mut markup = String::with_capacity(raw.len());
        let mut scripts = Vec::new();
        let mut last = 0;

        for caps in SCRIPT_REGEX.captures_iter(raw) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            markup.push_str(&raw[last..whole.start()]);
            scripts.push(Script {
                attributes: parse_attributes(caps.get(1).map_or("", |m| m.as_str())),
                body: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                offset: markup.len(),
            });
            last = whole.end();
        }
        markup.push_str(&raw[last..]);

        Self { markup, scripts }
    }

    /// Markup with each script re-created where it was extracted
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(self.markup.len());
        let mut last = 0;
        for script in &self.scripts {
            let at = script.offset.clamp(last, self.markup.len());
            out.push_str(self.markup.get(last..at).unwrap_or_default());
            out.push_str(&script.to_html());
            last = at;
        }
        out.push_str(self.markup.get(last..).unwrap_or_default());
        out
    }

    pub fn is_empty(&self) -> bool {
        self.markup.trim().is_empty() && self.scripts.is_empty()
    }
}

/// Render an embed field: concatenate all raw inline text, unescaped
pub fn render_embed(blocks: &[Block]) -> Embed {
    let mut raw = String::new();
    collect_raw(blocks, &mut raw);
    Embed::from_markup(&raw)
}

fn collect_raw(blocks: &[Block], out: &mut String) {
    for block in blocks {
        for inline in &block.inlines {
            out.push_str(&inline.raw_text());
        }
        collect_raw(&block.blocks, out);
    }
}

fn parse_attributes(source: &str) -> Vec<(String, Option<String>)> {
    ATTR_REGEX
        .captures_iter(source)
        .map(|caps| {
            let name = caps[1].to_string();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string());
            (name, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::parse_blocks;
    use serde_json::json;

    const MIXCLOUD: &str = r#"<iframe width="100%" height="120" src="https://player.example/widget"></iframe>"#;

    #[test]
    fn test_scripts_are_extracted() {
        let raw = format!(
            r#"<blockquote class="post">Set</blockquote><script async src="https://platform.example/embed.js" charset='utf-8'></script>{MIXCLOUD}"#
        );
        let embed = Embed::from_markup(&raw);

        assert!(!embed.markup.contains("<script"));
        assert!(embed.markup.contains("<blockquote"));
        assert!(embed.markup.contains("<iframe"));
        assert_eq!(embed.scripts.len(), 1);

        let script = &embed.scripts[0];
        assert_eq!(script.src(), Some("https://platform.example/embed.js"));
        assert_eq!(
            script.attributes,
            vec![
                ("async".to_string(), None),
                (
                    "src".to_string(),
                    Some("https://platform.example/embed.js".to_string())
                ),
                ("charset".to_string(), Some("utf-8".to_string())),
            ]
        );
    }

    #[test]
    fn test_scripts_are_reinserted_in_place() {
        let embed = Embed::from_markup(
            "<div id=\"w\"></div><SCRIPT>window.init('w');</SCRIPT><p>after</p>",
        );
        assert_eq!(embed.scripts[0].body, "window.init('w');");
        assert_eq!(embed.scripts[0].offset, "<div id=\"w\"></div>".len());
        assert_eq!(
            embed.to_html(),
            "<div id=\"w\"></div><script>window.init('w');</script><p>after</p>"
        );
    }

    #[test]
    fn test_each_widget_keeps_its_script() {
        let raw = "<div id=\"a\"></div><script src=\"a.js\"></script>\
                   <div id=\"b\"></div><script src=\"b.js\"></script>";
        let embed = Embed::from_markup(raw);

        assert_eq!(embed.markup, "<div id=\"a\"></div><div id=\"b\"></div>");
        assert_eq!(embed.scripts.len(), 2);
        assert_eq!(embed.to_html(), raw);
    }

    #[test]
    fn test_render_embed_concatenates_raw_text() {
        let blocks = parse_blocks(&json!([
            {"type": "paragraph", "children": [{"text": "<div class=\"a\">"}]},
            {"type": "paragraph", "children": [{"text": "</div><script src=\"x.js\"></script>"}]}
        ]));
        let embed = render_embed(&blocks);

        assert_eq!(embed.markup, "<div class=\"a\"></div>");
        assert_eq!(embed.scripts[0].src(), Some("x.js"));
    }

    #[test]
    fn test_empty_embed() {
        assert!(render_embed(&[]).is_empty());
        assert!(!Embed::from_markup(MIXCLOUD).is_empty());
    }
}
