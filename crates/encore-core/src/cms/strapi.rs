//! Strapi REST client

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{ContentQuery, ContentSource, Document, Lookup};
use crate::config::CmsConfig;

const LOCALIZATIONS: &str = "localizations";

/// HTTP client for the Strapi content API
pub struct StrapiClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl StrapiClient {
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid CMS base URL '{}'", config.base_url))?;
        let http = reqwest::Client::builder()
            .user_agent("encore")
            .timeout(config.timeout())
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    /// Collection endpoint with filter, locale and populate parameters
    ///
    /// `localizations` is always populated so locale maps can be built.
    pub fn entries_url(&self, query: &ContentQuery, cms_locale: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("CMS base URL cannot have a path: {}", self.base_url))?
            .pop_if_empty()
            .push("api")
            .push(&query.collection);

        {
            let mut pairs = url.query_pairs_mut();
            match &query.lookup {
                Lookup::Slug(slug) => pairs.append_pair("filters[slug][$eq]", slug),
                Lookup::Id(id) if id.parse::<u64>().is_ok() => {
                    pairs.append_pair("filters[id][$eq]", id)
                }
                Lookup::Id(id) => pairs.append_pair("filters[documentId][$eq]", id),
            };
            pairs.append_pair("locale", cms_locale);

            // Sibling translations only come back when populated
            if query.populate.iter().any(|field| field == "*") {
                pairs.append_pair("populate", "*");
            } else {
                let missing = !query.populate.iter().any(|field| field == LOCALIZATIONS);
                let fields = query
                    .populate
                    .iter()
                    .map(String::as_str)
                    .chain(missing.then_some(LOCALIZATIONS));
                for (idx, field) in fields.enumerate() {
                    pairs.append_pair(&format!("populate[{idx}]"), field);
                }
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl ContentSource for StrapiClient {
    async fn fetch(&self, query: &ContentQuery, cms_locale: &str) -> Result<Vec<Document>> {
        let url = self.entries_url(query, cms_locale)?;
        debug!("CMS: fetching {} in '{}'", query, cms_locale);

        let mut request = self.http.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("fetching {}", query))?;

        let status = response.status();
        if !status.is_success() {
            bail!("CMS error for {}: {}", query, status);
        }

        let body: Value = response.json().await.context("parsing CMS response")?;
        let entries = parse_entries(body);
        debug!(
            "CMS: {} entries for {} in '{}'",
            entries.len(),
            query,
            cms_locale
        );

        Ok(entries)
    }
}

/// Extract entries from `{ data: [...] }`, `{ data: {...} }` or `{ data: null }`
fn parse_entries(body: Value) -> Vec<Document> {
    let data = match body {
        Value::Object(mut object) => object.remove("data").unwrap_or(Value::Null),
        other => other,
    };

    let items = match data {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    };

    items
        .into_iter()
        .filter_map(|entry| match Document::from_entry(entry) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Skipping malformed CMS entry: {:#}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str, api_token: Option<&str>) -> StrapiClient {
        StrapiClient::new(&CmsConfig {
            base_url: base_url.to_string(),
            api_token: api_token.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_entries_url() {
        let client = client("https://cms.example.com/", None);
        let query = ContentQuery::by_slug("articles", "opening").with_populate(["cover", "seo"]);
        let url = client.entries_url(&query, "el-GR").unwrap();

        assert_eq!(url.path(), "/api/articles");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("filters[slug][$eq]".to_string(), "opening".to_string()),
                ("locale".to_string(), "el-GR".to_string()),
                ("populate[0]".to_string(), "cover".to_string()),
                ("populate[1]".to_string(), "seo".to_string()),
                ("populate[2]".to_string(), "localizations".to_string()),
            ]
        );
    }

    #[test]
    fn test_entries_url_populates_localizations_once() {
        let client = client("https://cms.example.com", None);

        let url = client
            .entries_url(&ContentQuery::by_slug("articles", "x"), "en")
            .unwrap();
        let populate: Vec<(String, String)> = url
            .query_pairs()
            .into_owned()
            .filter(|(k, _)| k.starts_with("populate"))
            .collect();
        assert_eq!(
            populate,
            vec![("populate[0]".to_string(), "localizations".to_string())]
        );

        let query =
            ContentQuery::by_slug("articles", "x").with_populate(["localizations", "cover"]);
        let url = client.entries_url(&query, "en").unwrap();
        let populate: Vec<String> = url
            .query_pairs()
            .filter(|(k, _)| k.starts_with("populate"))
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(populate, vec!["localizations", "cover"]);
    }

    #[test]
    fn test_entries_url_id_lookups() {
        let client = client("https://cms.example.com/cms", None);

        let url = client
            .entries_url(&ContentQuery::by_id("events", "42").with_populate(["*"]), "en")
            .unwrap();
        assert_eq!(url.path(), "/cms/api/events");
        assert!(url.query_pairs().any(|(k, v)| k == "filters[id][$eq]" && v == "42"));
        assert!(url.query_pairs().any(|(k, v)| k == "populate" && v == "*"));

        let url = client
            .entries_url(&ContentQuery::by_id("events", "f8k2l"), "en")
            .unwrap();
        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "filters[documentId][$eq]" && v == "f8k2l"));
    }

    #[test]
    fn test_parse_entries_shapes() {
        assert!(parse_entries(json!({"data": null})).is_empty());
        assert_eq!(parse_entries(json!({"data": {"id": 1, "slug": "a"}})).len(), 1);
        assert_eq!(
            parse_entries(json!({"data": [{"slug": "a"}, "junk", {"slug": "b"}]})).len(),
            2
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_filters_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/artists"))
            .and(query_param("filters[slug][$eq]", "nina-k"))
            .and(query_param("locale", "el-GR"))
            .and(query_param("populate[0]", "localizations"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": 9,
                    "slug": "nina-k",
                    "locale": "el-GR",
                    "name": "Nina K",
                    "localizations": [{"id": 10, "locale": "en", "slug": "nina-k-en"}]
                }],
                "meta": {"pagination": {"total": 1}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri(), Some("secret"));
        let docs = client
            .fetch(&ContentQuery::by_slug("artists", "nina-k"), "el-GR")
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].slug.as_deref(), Some("nina-k"));
        assert_eq!(docs[0].localizations[0].locale, "en");
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/releases"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client(&server.uri(), None);
        let result = client
            .fetch(&ContentQuery::by_slug("releases", "ep-01"), "en")
            .await;
        assert!(result.is_err());
    }
}
