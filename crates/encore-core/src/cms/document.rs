//! CMS document model
//!
//! Strapi v5 returns flat entries; v4 nests everything under `attributes`
//! and wraps relations in `{ data: ... }`. Both are normalized into the same
//! [`Document`].

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Numeric entry id or string document id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(u64),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Number(id) => write!(f, "{}", id),
            DocumentId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// A sibling translation listed on a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Localization {
    /// CMS locale code, e.g. `el-GR`
    pub locale: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub id: Option<DocumentId>,
}

impl Localization {
    /// Slug, falling back to the document id, then the entry id
    pub fn key(&self) -> Option<String> {
        content_key(&self.slug, &self.document_id, &self.id)
    }
}

/// One CMS entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub id: Option<DocumentId>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// CMS locale the entry was returned in
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub localizations: Vec<Localization>,
    /// Every other field, kept as raw JSON
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Normalize a raw entry from either API shape
    pub fn from_entry(entry: Value) -> Result<Self> {
        serde_json::from_value(normalize_entry(entry)).context("parsing CMS entry")
    }

    /// Slug, falling back to the document id, then the entry id
    pub fn key(&self) -> Option<String> {
        content_key(&self.slug, &self.document_id, &self.id)
    }

    /// A content field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

fn content_key(
    slug: &Option<String>,
    document_id: &Option<String>,
    id: &Option<DocumentId>,
) -> Option<String> {
    slug.clone()
        .filter(|s| !s.is_empty())
        .or_else(|| document_id.clone())
        .or_else(|| id.as_ref().map(DocumentId::to_string))
}

/// Flatten `{ id, attributes }` entries and `{ data }` relation wrappers
fn normalize_entry(entry: Value) -> Value {
    let Value::Object(mut object) = entry else {
        return entry;
    };

    if let Some(Value::Object(attributes)) = object.remove("attributes") {
        for (key, value) in attributes {
            object.entry(key).or_insert(value);
        }
    }

    if let Some(localizations) = object.remove("localizations") {
        let siblings: Vec<Value> = unwrap_data(localizations)
            .into_iter()
            .map(normalize_entry)
            .filter(|sibling| sibling.get("locale").is_some_and(Value::is_string))
            .map(keep_sibling_fields)
            .collect();
        object.insert("localizations".to_string(), Value::Array(siblings));
    }

    // Non-string slugs and locales would fail the typed fields
    for key in ["slug", "locale", "documentId"] {
        if object.get(key).is_some_and(|v| !v.is_string()) {
            object.remove(key);
        }
    }

    Value::Object(object)
}

fn unwrap_data(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn keep_sibling_fields(sibling: Value) -> Value {
    let mut kept = Map::new();
    if let Value::Object(object) = sibling {
        for (key, value) in object {
            let valid = match key.as_str() {
                "locale" | "slug" | "documentId" => value.is_string(),
                "id" => value.is_u64() || value.is_string(),
                _ => false,
            };
            if valid {
                kept.insert(key, value);
            }
        }
    }
    Value::Object(kept)
}
