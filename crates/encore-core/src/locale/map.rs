//! Cross-locale slug map for translation links

use std::collections::BTreeMap;

use serde::Serialize;

use super::LocaleConfig;
use crate::cms::Document;

/// Locale code -> slug (or id) of the same document in that locale
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocaleMap(BTreeMap<String, String>);

impl LocaleMap {
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Link target for the language switcher
    ///
    /// Points at the translated document when one exists, otherwise at the
    /// root of the target locale.
    pub fn alternate_path(&self, locale: &str, section: &str) -> String {
        match self.get(locale) {
            Some(slug) => {
                let section = section.trim_matches('/');
                if section.is_empty() {
                    format!("/{}/{}", locale, slug)
                } else {
                    format!("/{}/{}/{}", locale, section, slug)
                }
            }
            None => format!("/{}", locale),
        }
    }
}

/// Build the locale map for a document fetched under `current_locale`
///
/// Exact codes (the current locale, the sibling's own CMS code) are inserted
/// first and win; application codes derived from CMS codes only fill gaps.
pub fn build_locale_map(
    document: &Document,
    current_locale: &str,
    locales: &LocaleConfig,
) -> LocaleMap {
    let mut map = BTreeMap::new();

    if let Some(key) = document.key() {
        map.insert(current_locale.to_string(), key);
    }

    let siblings: Vec<(&str, String)> = document
        .localizations
        .iter()
        .filter_map(|sibling| sibling.key().map(|key| (sibling.locale.as_str(), key)))
        .collect();

    for (cms_locale, key) in &siblings {
        map.entry(cms_locale.to_string())
            .or_insert_with(|| key.clone());
    }

    for (cms_locale, key) in siblings {
        let app_locale = locales.normalize(cms_locale);
        if app_locale != cms_locale {
            map.entry(app_locale).or_insert(key);
        }
    }

    LocaleMap(map)
}
