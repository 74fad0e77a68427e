//! Application/CMS locale mapping and negotiation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_fallback() -> String {
    "en".to_string()
}

fn default_mapping() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("en".to_string(), "en".to_string()),
        ("el".to_string(), "el-GR".to_string()),
    ])
}

/// Locale settings (the `[locales]` config section)
///
/// Keys of `mapping` are the application locales the site serves; values are
/// the codes the CMS knows them by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(default = "default_mapping")]
    pub mapping: BTreeMap<String, String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            mapping: default_mapping(),
        }
    }
}

impl LocaleConfig {
    /// CMS code for an application locale; unmapped codes pass through
    pub fn to_cms<'a>(&'a self, app_locale: &'a str) -> &'a str {
        self.mapping
            .get(app_locale)
            .map(String::as_str)
            .unwrap_or(app_locale)
    }

    /// Application locale for a CMS code, if one maps to it
    pub fn to_app(&self, cms_locale: &str) -> Option<&str> {
        self.mapping
            .iter()
            .find(|(_, cms)| cms.eq_ignore_ascii_case(cms_locale))
            .map(|(app, _)| app.as_str())
    }

    /// Application code for a CMS code: the configured one, else the
    /// primary language subtag (`pt-BR` -> `pt`)
    pub fn normalize(&self, cms_locale: &str) -> String {
        match self.to_app(cms_locale) {
            Some(app) => app.to_string(),
            None => primary_subtag(cms_locale).to_ascii_lowercase(),
        }
    }

    /// Pick a supported application locale
    ///
    /// `candidate` may be a bare code from the URL (`el`), a CMS code
    /// (`el-GR`) or an `Accept-Language` header. Entries are tried by
    /// descending quality; anything unmatched falls back.
    pub fn negotiate(&self, candidate: Option<&str>) -> &str {
        let Some(candidate) = candidate else {
            return &self.fallback;
        };

        let mut ranges: Vec<(&str, f32)> = candidate
            .split(',')
            .filter_map(parse_language_range)
            .collect();
        // Stable sort keeps header order among equal weights
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranges
            .into_iter()
            .filter(|(_, quality)| *quality > 0.0)
            .find_map(|(tag, _)| self.match_tag(tag))
            .unwrap_or(&self.fallback)
    }

    fn match_tag(&self, tag: &str) -> Option<&str> {
        if tag == "*" {
            return None;
        }
        if let Some(app) = self.supported().find(|app| app.eq_ignore_ascii_case(tag)) {
            return Some(app);
        }
        if let Some(app) = self.to_app(tag) {
            return Some(app);
        }
        let primary = primary_subtag(tag);
        self.supported().find(|app| app.eq_ignore_ascii_case(primary))
    }

    fn supported(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.fallback.as_str()).chain(self.mapping.keys().map(String::as_str))
    }
}

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// `el-GR;q=0.8` -> (`el-GR`, 0.8)
fn parse_language_range(range: &str) -> Option<(&str, f32)> {
    let mut parts = range.split(';');
    let tag = parts.next()?.trim();
    if tag.is_empty() {
        return None;
    }

    let quality = parts
        .filter_map(|param| param.trim().strip_prefix("q="))
        .find_map(|q| q.trim().parse::<f32>().ok())
        .unwrap_or(1.0);

    Some((tag, quality))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_both_ways() {
        let locales = LocaleConfig::default();
        assert_eq!(locales.to_cms("el"), "el-GR");
        assert_eq!(locales.to_cms("en"), "en");
        assert_eq!(locales.to_cms("fr"), "fr");
        assert_eq!(locales.to_app("el-GR"), Some("el"));
        assert_eq!(locales.to_app("el-gr"), Some("el"));
        assert_eq!(locales.to_app("fr-FR"), None);
    }

    #[test]
    fn test_normalize() {
        let locales = LocaleConfig::default();
        assert_eq!(locales.normalize("el-GR"), "el");
        assert_eq!(locales.normalize("pt-BR"), "pt");
        assert_eq!(locales.normalize("en"), "en");
    }

    #[test]
    fn test_negotiate_path_segment() {
        let locales = LocaleConfig::default();
        assert_eq!(locales.negotiate(Some("el")), "el");
        assert_eq!(locales.negotiate(Some("EL")), "el");
        assert_eq!(locales.negotiate(Some("el-GR")), "el");
        assert_eq!(locales.negotiate(Some("de")), "en");
        assert_eq!(locales.negotiate(None), "en");
    }

    #[test]
    fn test_negotiate_accept_language() {
        let locales = LocaleConfig::default();
        assert_eq!(
            locales.negotiate(Some("de-DE,de;q=0.9,el;q=0.8,en;q=0.7")),
            "el"
        );
        assert_eq!(locales.negotiate(Some("en-US;q=0.5, el-CY;q=0.6")), "el");
        assert_eq!(locales.negotiate(Some("el;q=0, fr")), "en");
        assert_eq!(locales.negotiate(Some("*")), "en");
    }
}
