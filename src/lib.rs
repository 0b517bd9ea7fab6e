#![doc = include_str!("../README.md")]

//! # report-intl
//!
//! Locale-aware message formatting for audit reports:
//!
//! - **ICU Messages**: `{id}`, `number` styles, `plural`, `selectordinal` and `select`
//! - **Unit Coercion**: milliseconds rounding, bytes to KiB, `timeInMs` to seconds
//! - **Strict Values**: every placeholder needs a value and every value a placeholder
//! - **Report Walk**: localizes every message in a JSON report and records its path
//! - **Locale Lookup**: canonical tags with language and same-language fallback
//! - **Bevy Integration**: `I18nPlugin` and the `I18n` resource
//!
//! ## Quick Start
//!
//! ```rust
//! use bevy::prelude::*;
//! use report_intl::{I18n, I18nPlugin};
//!
//! let mut app = App::new();
//! app.add_plugins(I18nPlugin::default());
//!
//! let mut i18n = app.world_mut().resource_mut::<I18n>();
//! i18n.add_locale_json("es", r#"{ "core/audits/metrics.js | title": { "message": "Métricas" } }"#)
//!     .unwrap();
//! i18n.set_locale("es");
//!
//! let mut report = serde_json::json!({
//!     "title": { "i18nId": "core/audits/metrics.js | title", "formattedDefault": "Metrics" }
//! });
//! i18n.replace_icu_messages(&mut report).unwrap();
//! assert_eq!(report["title"], "Métricas");
//! ```

use std::collections::{BTreeMap, HashMap};

use bevy::log::warn;
use bevy::prelude::*;
use serde_json::Value;

pub mod catalog;
pub mod error;
pub mod format;
pub mod message;
pub mod number;
pub mod plural;
pub mod replace;

pub use catalog::{LocaleCatalog, LocaleMessage, LocaleMessages, canonicalize_locale};
pub use error::{I18nError, Result};
pub use format::{
    DEFAULT_LOCALE, IcuMessage, Localizer, MessageValue, MessageValues, NUMBER_LOCALE_OVERRIDES,
    UiStrings, format_message, is_icu_message,
};
pub use replace::{IcuMessagePath, IcuMessagePaths, format_path_as_string, replace_icu_messages};

/// Configuration for the I18n plugin.
///
/// # Example
///
/// ```rust
/// use report_intl::I18nConfig;
///
/// let config = I18nConfig {
///     default_locale: "fr".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.number_locale_overrides["en-XA"], "de-DE");
/// ```
#[derive(Debug, Clone, Resource)]
pub struct I18nConfig {
    /// Locale active when the resource is created.
    /// Default: "en-US"
    pub default_locale: String,
    /// Locales whose numbers and plurals are formatted with another locale's rules.
    /// Default: [`NUMBER_LOCALE_OVERRIDES`], so "en-XA" and "en-XL" use "de-DE".
    pub number_locale_overrides: HashMap<String, String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            number_locale_overrides: NUMBER_LOCALE_OVERRIDES
                .iter()
                .map(|(locale, number_locale)| (locale.to_string(), number_locale.to_string()))
                .collect(),
        }
    }
}

// ---------- Bevy Plugin ----------

/// Plugin that inserts [`I18nConfig`] and initializes the [`I18n`] resource.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use report_intl::{I18nConfig, I18nPlugin};
///
/// App::new().add_plugins(I18nPlugin::with_config(I18nConfig {
///     default_locale: "de".to_string(),
///     ..Default::default()
/// }));
/// ```
#[derive(Default)]
pub struct I18nPlugin {
    pub config: I18nConfig,
}

impl I18nPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: I18nConfig) -> Self {
        Self { config }
    }
}

impl Plugin for I18nPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone()).init_resource::<I18n>();
    }
}

/// Shared localization state: the loaded locales and the active locale.
#[derive(Debug, Resource)]
pub struct I18n {
    catalog: LocaleCatalog,
    current_locale: String,
    config: I18nConfig,
}

impl FromWorld for I18n {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<I18nConfig>().cloned().unwrap_or_default();
        Self::new(config)
    }
}

impl I18n {
    pub fn new(config: I18nConfig) -> Self {
        Self {
            current_locale: canonicalize_locale(&config.default_locale),
            catalog: LocaleCatalog::new(),
            config,
        }
    }

    pub fn catalog(&self) -> &LocaleCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut LocaleCatalog {
        &mut self.catalog
    }

    /// Adds a locale JSON document (`{ "<id>": { "message": "..." } }`).
    pub fn add_locale_json(&mut self, locale: &str, json: &str) -> Result<()> {
        self.catalog.insert_json(locale, json)
    }

    /// Sets the active locale.
    ///
    /// Ignored with a warning unless the locale is loaded or is the default.
    pub fn set_locale(&mut self, locale: &str) {
        let locale = canonicalize_locale(locale);
        if !self.catalog.contains(&locale) && locale != canonicalize_locale(&self.config.default_locale) {
            warn!("Locale '{}' not available", locale);
            return;
        }
        self.current_locale = locale;
    }

    pub fn locale(&self) -> &str {
        &self.current_locale
    }

    pub fn available_locales(&self) -> Vec<&str> {
        self.catalog.locales()
    }

    /// Best loaded locale for the requested tags, or the configured default.
    pub fn lookup_locale(&self, requested: &[&str]) -> String {
        self.catalog.lookup_locale(requested, &self.config.default_locale)
    }

    /// A [`Localizer`] for the active locale, honoring number-locale overrides.
    pub fn localizer(&self) -> Localizer<'_> {
        let localizer = Localizer::new(&self.catalog, &self.current_locale);
        match self.config.number_locale_overrides.get(&self.current_locale) {
            Some(number_locale) => localizer.with_format_locale(number_locale),
            None => localizer.with_format_locale(&self.current_locale),
        }
    }

    pub fn localize(&self, message: &IcuMessage) -> Result<String> {
        self.localizer().localize(message)
    }

    /// Formats an ICU message or passes a plain string through.
    pub fn get_formatted(&self, value: &Value) -> Result<String> {
        self.localizer().get_formatted(value)
    }

    /// Localizes every message in `document` in place. See [`replace_icu_messages`].
    pub fn replace_icu_messages(&self, document: &mut Value) -> Result<IcuMessagePaths> {
        replace_icu_messages(document, &self.localizer())
    }

    /// The report renderer's raw strings in the active locale.
    pub fn renderer_strings(&self) -> Result<BTreeMap<String, String>> {
        self.catalog.renderer_strings(&self.current_locale)
    }
}

/// Extension trait for `App` to switch the active locale.
pub trait LocaleAppExt {
    /// Sets the active locale of the [`I18n`] resource.
    ///
    /// Warns if the resource is missing or the locale is not loaded.
    fn set_i18n_locale(&mut self, locale: &str);
}

impl LocaleAppExt for App {
    fn set_i18n_locale(&mut self, locale: &str) {
        match self.world_mut().get_resource_mut::<I18n>() {
            Some(mut i18n) => i18n.set_locale(locale),
            None => warn!("I18n resource missing, cannot set locale '{}'", locale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::UiStrings;

    fn i18n_with(locales: &[(&str, &str)]) -> I18n {
        let mut i18n = I18n::new(I18nConfig::default());
        for (locale, json) in locales {
            i18n.add_locale_json(locale, json).unwrap();
        }
        i18n
    }

    #[test]
    fn starts_in_default_locale() {
        let i18n = I18n::new(I18nConfig {
            default_locale: "en_gb".to_string(),
            ..Default::default()
        });
        assert_eq!(i18n.locale(), "en-GB");
        assert!(i18n.available_locales().is_empty());
    }

    #[test]
    fn unknown_locale_is_ignored() {
        let mut i18n = i18n_with(&[("fr", "{}")]);
        i18n.set_locale("ja");
        assert_eq!(i18n.locale(), "en-US");
        i18n.set_locale("FR");
        assert_eq!(i18n.locale(), "fr");
        i18n.set_locale("en-US");
        assert_eq!(i18n.locale(), "en-US");
    }

    #[test]
    fn accented_locale_formats_numbers_with_override() {
        let strings = UiStrings::new("core/lib/i18n.js", &[("ms", "{timeInMs, number, milliseconds}\u{a0}ms")]);
        let mut i18n = I18n::new(I18nConfig::default());
        i18n.catalog_mut().insert_ui_strings("en-XA", &strings);
        i18n.set_locale("en-XA");

        let message = strings.message("ms", crate::values! { "timeInMs" => 4321 }).unwrap();
        assert_eq!(message.formatted_default, "4,320\u{a0}ms");
        assert_eq!(i18n.localize(&message).unwrap(), "4.320\u{a0}ms");
    }

    #[test]
    fn default_overrides_match_shared_table() {
        let config = I18nConfig::default();
        assert_eq!(config.number_locale_overrides.len(), NUMBER_LOCALE_OVERRIDES.len());
        for (locale, number_locale) in NUMBER_LOCALE_OVERRIDES {
            assert_eq!(config.number_locale_overrides[*locale], *number_locale);
            assert_eq!(format::formatting_locale(locale), *number_locale);
        }
    }

    #[test]
    fn custom_override_table() {
        let strings = UiStrings::new("a.js", &[("n", "{n, number}")]);
        let mut config = I18nConfig::default();
        config
            .number_locale_overrides
            .insert("de".to_string(), "en-US".to_string());
        let mut i18n = I18n::new(config);
        i18n.catalog_mut().insert_ui_strings("de", &strings);
        i18n.set_locale("de");

        let message = strings.message("n", crate::values! { "n" => 1234.5 }).unwrap();
        assert_eq!(i18n.localize(&message).unwrap(), "1,234.5");
    }

    #[test]
    fn lookup_uses_configured_default() {
        let i18n = i18n_with(&[("es", "{}")]);
        assert_eq!(i18n.lookup_locale(&["es-AR"]), "es");
        assert_eq!(i18n.lookup_locale(&["ko"]), "en-US");
    }

    #[test]
    fn renderer_strings_follow_active_locale() {
        let mut i18n = i18n_with(&[(
            "es",
            r#"{ "report/renderer/report-utils.js | warningHeader": { "message": "Advertencias: " } }"#,
        )]);
        assert_eq!(
            i18n.renderer_strings().unwrap_err(),
            I18nError::UnsupportedLocale("en-US".into())
        );
        i18n.set_locale("es");
        assert_eq!(i18n.renderer_strings().unwrap()["warningHeader"], "Advertencias: ");
    }
}
