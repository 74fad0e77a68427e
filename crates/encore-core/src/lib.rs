//! Encore core library
//!
//! Rich-text rendering and locale-aware content resolution for a
//! Strapi-backed events site.
//!
//! - [`render`] turns CMS block trees into presentation nodes and HTML
//! - [`locale`] resolves documents with locale fallback and builds
//!   translation links
//! - [`cms`] holds the document model and the Strapi client

pub mod blocks;
pub mod cms;
pub mod config;
pub mod locale;
pub mod render;

pub use blocks::{Block, BlockKind, Inline, ListFormat, Marks};
pub use cms::{ContentQuery, ContentSource, Document, Lookup, StrapiClient};
pub use config::Config;
pub use locale::{
    build_locale_map, LocaleConfig, LocaleMap, ResolveError, ResolvedDocument, Resolver,
};
pub use render::{render, render_embed, render_fields, render_html, render_value, Node};
