//! `encore fetch`

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use encore_core::cms::{ContentQuery, StrapiClient};
use encore_core::config::Config;
use encore_core::locale::{LocaleMap, ResolveError, ResolvedDocument, Resolver};
use encore_core::render::{render_fields, RenderSettings};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Collection name, e.g. `events`
    pub collection: String,

    /// Slug of the document (or its id with `--id`)
    pub slug: String,

    /// Application locale or Accept-Language value (defaults to the fallback)
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Look the document up by id instead of slug
    #[arg(long)]
    pub id: bool,

    /// Relation or component to populate (repeatable, `*` for all)
    #[arg(short, long = "populate", value_name = "FIELD")]
    pub populate: Vec<String>,
}

impl FetchArgs {
    fn query(&self) -> ContentQuery {
        let query = if self.id {
            ContentQuery::by_id(&self.collection, &self.slug)
        } else {
            ContentQuery::by_slug(&self.collection, &self.slug)
        };
        query.with_populate(self.populate.iter().cloned())
    }
}

#[derive(Debug, Serialize)]
struct FetchOutput {
    key: Option<String>,
    resolved_locale: String,
    used_fallback: bool,
    locale_map: LocaleMap,
    fields: BTreeMap<String, String>,
}

impl FetchOutput {
    fn new(
        resolved: &ResolvedDocument,
        locale_map: LocaleMap,
        settings: &RenderSettings,
    ) -> Self {
        let fields = render_fields(&resolved.content.fields, settings)
            .into_iter()
            .map(|(name, field)| (name, field.to_html()))
            .collect();

        Self {
            key: resolved.content.key(),
            resolved_locale: resolved.resolved_locale.clone(),
            used_fallback: resolved.used_fallback,
            locale_map,
            fields,
        }
    }
}

pub async fn run(args: FetchArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let client = StrapiClient::new(&config.cms)?;
    let resolver =
        Resolver::new(client, config.locales.clone()).with_timeout(config.cms.timeout());

    let locale = resolver.locales().negotiate(args.locale.as_deref()).to_string();
    let query = args.query();
    debug!("Resolving {} for locale '{}'", query, locale);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling request");
                cancel.cancel();
            }
        })
    };

    let result = resolver.resolve_with_cancel(&query, &locale, &cancel).await;
    ctrl_c.abort();

    match result {
        Ok(resolved) => {
            let locale_map = resolved.locale_map(resolver.locales());
            let output = FetchOutput::new(&resolved, locale_map, &config.render);
            let json = serde_json::to_string_pretty(&output).context("serializing output")?;
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ ResolveError::NotFound { .. }) => {
            eprintln!("not found: {}", e);
            Ok(ExitCode::from(1))
        }
    }
}
