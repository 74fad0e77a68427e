//! CMS access
//!
//! The resolver only ever talks to a [`ContentSource`]. [`StrapiClient`] is
//! the HTTP implementation; tests plug in their own.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

mod document;
mod strapi;

pub use document::{Document, DocumentId, Localization};
pub use strapi::StrapiClient;

/// How a document is looked up within its collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Slug(String),
    /// Numeric entry id or string document id
    Id(String),
}

/// A single-document query, independent of locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    /// Plural API name of the collection, e.g. `articles`
    pub collection: String,
    pub lookup: Lookup,
    /// Relations and components to populate
    pub populate: Vec<String>,
}

impl ContentQuery {
    pub fn by_slug(collection: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            lookup: Lookup::Slug(slug.into()),
            populate: Vec::new(),
        }
    }

    pub fn by_id(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            lookup: Lookup::Id(id.into()),
            populate: Vec::new(),
        }
    }

    pub fn with_populate<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.populate = fields.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for ContentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lookup {
            Lookup::Slug(slug) => write!(f, "{}/slug={}", self.collection, slug),
            Lookup::Id(id) => write!(f, "{}/id={}", self.collection, id),
        }
    }
}

/// Query interface to the CMS
///
/// Returns every entry matching the query in the given CMS locale; an empty
/// vector means no match.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, query: &ContentQuery, cms_locale: &str) -> Result<Vec<Document>>;
}
