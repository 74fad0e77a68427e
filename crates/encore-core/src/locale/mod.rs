//! Locale handling
//!
//! Locales are always passed explicitly; nothing here reads ambient state.
//! Application codes (`en`, `el`) are what URLs use, CMS codes (`en`,
//! `el-GR`) are what Strapi stores.

mod config;
mod map;
mod resolver;

pub use config::LocaleConfig;
pub use map::{build_locale_map, LocaleMap};
pub use resolver::{ResolveError, ResolvedDocument, Resolver};
