//! Per-field rendering of a CMS document
//!
//! Pages hand a whole document's fields over and get every rich-text field
//! back rendered. Embed mode is opt-in by field name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::embed::{render_embed, Embed};
use super::nodes::Node;
use crate::blocks::parse_blocks;

fn default_embed_fields() -> Vec<String> {
    vec!["embed".to_string(), "mixEmbed".to_string(), "socialEmbed".to_string()]
}

/// Renderer settings (the `[render]` config section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Fields rendered as trusted embeds
    #[serde(default = "default_embed_fields")]
    pub embed_fields: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            embed_fields: default_embed_fields(),
        }
    }
}

impl RenderSettings {
    pub fn is_embed_field(&self, name: &str) -> bool {
        self.embed_fields.iter().any(|f| f == name)
    }
}

/// A rendered document field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderedField {
    Blocks { nodes: Vec<Node> },
    Embed { embed: Embed },
}

impl RenderedField {
    pub fn to_html(&self) -> String {
        match self {
            RenderedField::Blocks { nodes } => super::to_html(nodes),
            RenderedField::Embed { embed } => embed.to_html(),
        }
    }
}

/// Render every rich-text field of a document
///
/// Embed fields accept a block array or a raw HTML string. Other fields are
/// rendered only when they look like a block array; everything else is
/// skipped.
pub fn render_fields(
    fields: &Map<String, Value>,
    settings: &RenderSettings,
) -> BTreeMap<String, RenderedField> {
    let mut rendered = BTreeMap::new();

    for (name, value) in fields {
        if settings.is_embed_field(name) {
            let embed = match value {
                Value::String(raw) => Embed::from_markup(raw),
                Value::Array(_) => render_embed(&parse_blocks(value)),
                _ => continue,
            };
            debug!(
                "Field '{}' rendered as embed with {} script(s)",
                name,
                embed.scripts.len()
            );
            rendered.insert(name.clone(), RenderedField::Embed { embed });
        } else if is_block_array(value) {
            rendered.insert(
                name.clone(),
                RenderedField::Blocks {
                    nodes: super::render_value(value),
                },
            );
        }
    }

    rendered
}

/// Heuristic: an array holding at least one object with a string `type`
///
/// Malformed siblings still count; they degrade block by block in
/// `parse_blocks` instead of hiding the whole field.
fn is_block_array(value: &Value) -> bool {
    value.as_array().is_some_and(|items| {
        items
            .iter()
            .any(|item| item.get("type").is_some_and(Value::is_string))
    })
}
