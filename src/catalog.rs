//! In-memory locale messages, keyed by canonical locale tag.

use std::collections::{BTreeMap, HashMap};

use bevy::log::debug;
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::{I18nError, Result};
use crate::format::UiStrings;

/// File whose strings the report renderer consumes directly.
pub const RENDERER_STRINGS_FILE: &str = "report/renderer/report-utils.js";

/// One translated message template.
///
/// Matches the shape of a locale JSON entry:
/// ```json
/// "core/audits/metrics.js | title": { "message": "Metrics" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Message id -> translated template.
pub type LocaleMessages = HashMap<String, LocaleMessage>;

/// All loaded locales.
#[derive(Debug, Clone, Default)]
pub struct LocaleCatalog {
    locales: HashMap<String, LocaleMessages>,
}

impl LocaleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds messages for `locale`, replacing any existing entries with the same id.
    pub fn insert(&mut self, locale: &str, messages: LocaleMessages) {
        self.locales
            .entry(canonicalize_locale(locale))
            .or_default()
            .extend(messages);
    }

    /// Parses a locale JSON document (`{ "<id>": { "message": "..." } }`) and
    /// adds it under `locale`.
    pub fn insert_json(&mut self, locale: &str, json: &str) -> Result<()> {
        let messages: LocaleMessages =
            serde_json::from_str(json).map_err(|e| I18nError::InvalidLocaleMessages {
                locale: locale.to_string(),
                reason: e.to_string(),
            })?;
        debug!(locale, count = messages.len(), "loaded locale messages");
        self.insert(locale, messages);
        Ok(())
    }

    /// Adds a file's default strings as the messages of `locale`.
    pub fn insert_ui_strings(&mut self, locale: &str, strings: &UiStrings) {
        let messages = strings
            .iter()
            .map(|(key, message)| {
                (
                    strings.message_id(key),
                    LocaleMessage {
                        message: message.to_string(),
                        description: None,
                    },
                )
            })
            .collect();
        self.insert(locale, messages);
    }

    pub fn get(&self, locale: &str) -> Option<&LocaleMessages> {
        self.locales.get(&canonicalize_locale(locale))
    }

    /// Translated template for `id` in exactly `locale`.
    pub fn message(&self, locale: &str, id: &str) -> Option<&str> {
        self.get(locale)?.get(id).map(|entry| entry.message.as_str())
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.get(locale).is_some()
    }

    /// Sorted list of loaded locale tags.
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.locales.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    /// Picks the best loaded locale for a list of requested tags.
    ///
    /// Each tag is tried as-is, then by its language alone, then against any
    /// loaded locale of the same language. Falls back to `default`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use report_intl::catalog::LocaleCatalog;
    ///
    /// let mut catalog = LocaleCatalog::new();
    /// catalog.insert_json("es", "{}").unwrap();
    /// catalog.insert_json("pt-BR", "{}").unwrap();
    ///
    /// assert_eq!(catalog.lookup_locale(&["es-419"], "en-US"), "es");
    /// assert_eq!(catalog.lookup_locale(&["pt_PT"], "en-US"), "pt-BR");
    /// assert_eq!(catalog.lookup_locale(&["ja", "zz"], "en-US"), "en-US");
    /// ```
    pub fn lookup_locale(&self, requested: &[&str], default: &str) -> String {
        for tag in requested {
            let canonical = canonicalize_locale(tag);
            if self.locales.contains_key(&canonical) {
                return canonical;
            }

            let language = language_of(&canonical);
            if self.locales.contains_key(language) {
                return language.to_string();
            }

            let same_language = self
                .locales()
                .into_iter()
                .find(|available| language_of(available) == language);
            if let Some(available) = same_language {
                return available.to_string();
            }
        }

        debug!(?requested, default, "no requested locale is available");
        canonicalize_locale(default)
    }

    /// Raw templates of the report renderer's strings, keyed by their short key.
    pub fn renderer_strings(&self, locale: &str) -> Result<BTreeMap<String, String>> {
        let messages = self
            .get(locale)
            .ok_or_else(|| I18nError::UnsupportedLocale(locale.to_string()))?;

        let strings = messages
            .iter()
            .filter_map(|(id, entry)| {
                let (file, key) = id.split_once(" | ")?;
                file.ends_with(RENDERER_STRINGS_FILE)
                    .then(|| (key.to_string(), entry.message.clone()))
            })
            .collect();
        Ok(strings)
    }
}

/// Normalizes a locale tag (`en_us` -> `en-US`). Tags that do not parse are
/// returned unchanged.
pub fn canonicalize_locale(tag: &str) -> String {
    tag.replace('_', "-")
        .parse::<LanguageIdentifier>()
        .map(|langid| langid.to_string())
        .unwrap_or_else(|_| tag.to_string())
}

/// The language subtag of a locale (`pt-BR` -> `pt`).
pub fn language_of(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanish() -> LocaleCatalog {
        let mut catalog = LocaleCatalog::new();
        catalog
            .insert_json(
                "es",
                r#"{
                    "core/audits/metrics.js | title": { "message": "Métricas" },
                    "report/renderer/report-utils.js | passedAuditsGroupTitle": {
                        "message": "Auditorías aprobadas",
                        "description": "Section heading"
                    },
                    "report/renderer/report-utils.js | warningHeader": { "message": "Advertencias: " },
                    "malformed id": { "message": "ignored" }
                }"#,
            )
            .unwrap();
        catalog
    }

    #[test]
    fn canonicalizes_tags() {
        assert_eq!(canonicalize_locale("en_us"), "en-US");
        assert_eq!(canonicalize_locale("ZH-hant-tw"), "zh-Hant-TW");
        assert_eq!(canonicalize_locale("not a tag"), "not a tag");
    }

    #[test]
    fn messages_are_found_by_canonical_locale() {
        let catalog = spanish();
        assert_eq!(catalog.message("ES", "core/audits/metrics.js | title"), Some("Métricas"));
        assert_eq!(catalog.message("es", "missing"), None);
        assert_eq!(catalog.message("fr", "core/audits/metrics.js | title"), None);
    }

    #[test]
    fn insert_merges_into_existing_locale() {
        let mut catalog = spanish();
        catalog
            .insert_json("es", r#"{ "core/audits/metrics.js | title": { "message": "Métricas (nuevo)" } }"#)
            .unwrap();
        assert_eq!(catalog.get("es").map(HashMap::len), Some(4));
        assert_eq!(
            catalog.message("es", "core/audits/metrics.js | title"),
            Some("Métricas (nuevo)")
        );
    }

    #[test]
    fn invalid_json_is_reported_with_locale() {
        let mut catalog = LocaleCatalog::new();
        let err = catalog.insert_json("de", "{ not json").unwrap_err();
        assert!(matches!(err, I18nError::InvalidLocaleMessages { locale, .. } if locale == "de"));
        assert!(!catalog.contains("de"));
    }

    #[test]
    fn lookup_prefers_exact_then_language() {
        let mut catalog = spanish();
        catalog.insert_json("en-GB", "{}").unwrap();
        catalog.insert_json("en-US", "{}").unwrap();

        assert_eq!(catalog.lookup_locale(&["en-gb"], "en-US"), "en-GB");
        assert_eq!(catalog.lookup_locale(&["es-MX"], "en-US"), "es");
        assert_eq!(catalog.lookup_locale(&["en-AU"], "en-US"), "en-GB");
        assert_eq!(catalog.lookup_locale(&["xx", "es"], "en-US"), "es");
        assert_eq!(catalog.lookup_locale(&[], "en-us"), "en-US");
    }

    #[test]
    fn renderer_strings_keep_only_renderer_file() {
        let strings = spanish().renderer_strings("es").unwrap();
        assert_eq!(strings.len(), 2);
        assert_eq!(strings["passedAuditsGroupTitle"], "Auditorías aprobadas");
        assert_eq!(strings["warningHeader"], "Advertencias: ");
    }

    #[test]
    fn renderer_strings_reject_unknown_locale() {
        let err = spanish().renderer_strings("fr").unwrap_err();
        assert_eq!(err, I18nError::UnsupportedLocale("fr".into()));
    }

    #[test]
    fn ui_strings_become_locale_messages() {
        let strings = UiStrings::new("core/audits/metrics.js", &[("title", "Metrics")]);
        let mut catalog = LocaleCatalog::new();
        catalog.insert_ui_strings("en-US", &strings);
        assert_eq!(catalog.message("en-US", "core/audits/metrics.js | title"), Some("Metrics"));
        assert_eq!(catalog.locales(), vec!["en-US"]);
    }
}
