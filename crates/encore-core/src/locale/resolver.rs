//! Locale-aware document resolution
//!
//! One fetch in the requested locale, at most one more in the fallback
//! locale. Transport failures, timeouts and cancellation all end up as
//! [`ResolveError::NotFound`]: a page has exactly one way to recover.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::map::{build_locale_map, LocaleMap};
use super::LocaleConfig;
use crate::cms::{ContentQuery, ContentSource, Document};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no document for {query} in locale '{locale}' or its fallback")]
    NotFound { query: String, locale: String },
}

/// A document plus the locale it was actually found in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDocument {
    pub content: Document,
    /// Application locale whose fetch returned the document
    pub resolved_locale: String,
    pub used_fallback: bool,
}

impl ResolvedDocument {
    /// Translation links for this document
    pub fn locale_map(&self, locales: &LocaleConfig) -> LocaleMap {
        build_locale_map(&self.content, &self.resolved_locale, locales)
    }
}

/// Resolves documents through a [`ContentSource`] with locale fallback
pub struct Resolver<S> {
    source: S,
    locales: LocaleConfig,
    timeout: Option<Duration>,
}

impl<S: ContentSource> Resolver<S> {
    pub fn new(source: S, locales: LocaleConfig) -> Self {
        Self {
            source,
            locales,
            timeout: None,
        }
    }

    /// Bound each individual fetch
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn locales(&self) -> &LocaleConfig {
        &self.locales
    }

    /// Resolve a document in `requested_locale`, falling back once
    pub async fn resolve(
        &self,
        query: &ContentQuery,
        requested_locale: &str,
    ) -> Result<ResolvedDocument, ResolveError> {
        self.resolve_with_cancel(query, requested_locale, &CancellationToken::new())
            .await
    }

    /// Like [`resolve`](Self::resolve), aborting the pending fetch when
    /// `cancel` fires
    pub async fn resolve_with_cancel(
        &self,
        query: &ContentQuery,
        requested_locale: &str,
        cancel: &CancellationToken,
    ) -> Result<ResolvedDocument, ResolveError> {
        let cms_locale = self.locales.to_cms(requested_locale);

        if let Some(content) = self.attempt(query, cms_locale, cancel).await {
            return Ok(ResolvedDocument {
                content,
                resolved_locale: requested_locale.to_string(),
                used_fallback: false,
            });
        }

        let fallback = self.locales.fallback.as_str();
        let fallback_cms = self.locales.to_cms(fallback);
        if fallback_cms == cms_locale || cancel.is_cancelled() {
            return Err(not_found(query, requested_locale));
        }

        debug!(
            "{} not found in '{}', retrying in '{}'",
            query, cms_locale, fallback_cms
        );
        if let Some(content) = self.attempt(query, fallback_cms, cancel).await {
            info!(
                "Serving {} in fallback locale '{}' instead of '{}'",
                query, fallback, requested_locale
            );
            return Ok(ResolvedDocument {
                content,
                resolved_locale: fallback.to_string(),
                used_fallback: true,
            });
        }

        Err(not_found(query, requested_locale))
    }

    /// One fetch; `None` on empty results, errors, timeout or cancellation
    async fn attempt(
        &self,
        query: &ContentQuery,
        cms_locale: &str,
        cancel: &CancellationToken,
    ) -> Option<Document> {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Fetch of {} in '{}' cancelled", query, cms_locale);
                return None;
            }
            result = self.fetch_bounded(query, cms_locale) => result,
        };

        match outcome {
            Ok(documents) => {
                let first = documents.into_iter().next();
                if first.is_none() {
                    debug!("No entries for {} in '{}'", query, cms_locale);
                }
                first
            }
            Err(e) => {
                warn!("Fetching {} in '{}' failed: {:#}", query, cms_locale, e);
                None
            }
        }
    }

    async fn fetch_bounded(
        &self,
        query: &ContentQuery,
        cms_locale: &str,
    ) -> Result<Vec<Document>> {
        let fetch = self.source.fetch(query, cms_locale);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| anyhow!("timed out after {:?}", limit))?,
            None => fetch.await,
        }
    }
}

fn not_found(query: &ContentQuery, locale: &str) -> ResolveError {
    ResolveError::NotFound {
        query: query.to_string(),
        locale: locale.to_string(),
    }
}
