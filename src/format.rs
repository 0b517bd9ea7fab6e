//! ICU message formatting and value coercion.
//!
//! Values are checked against the placeholders of the template before
//! rendering. Every placeholder needs a value and every value needs a
//! placeholder (`errorCode` is the one exception). Numeric placeholders with a
//! unit style have their value converted first:
//!
//! | style          | conversion                                  |
//! |----------------|---------------------------------------------|
//! | `milliseconds` | rounded to the nearest 10                   |
//! | `seconds`      | `timeInMs` only: ms to s, one decimal place |
//! | `bytes`        | divided by 1024 (KiB)                       |

use std::collections::BTreeMap;

use bevy::log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::catalog::LocaleCatalog;
use crate::error::{I18nError, Result};
use crate::message::{ArgumentFormat, Element, MessageTemplate, NumberStyle, PluralOption, PluralSelector};
use crate::number::{format_number, js_number_string};
use crate::plural::plural_category;

/// Locale whose messages are the English source strings.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Value id accepted even when no placeholder uses it.
const ERROR_CODE_VALUE: &str = "errorCode";

static MESSAGE_I18N_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" \| \S+$").unwrap());

/// A value substituted into a message: a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageValue {
    Number(Number),
    Text(String),
}

impl MessageValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(_) => None,
        }
    }

    /// The value as a plain `{id}` placeholder shows it.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Number(n) => n.as_f64().map_or_else(|| n.to_string(), js_number_string),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<f64> for MessageValue {
    /// Non-finite numbers have no JSON form and are kept as text.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or_else(|| Self::Text(js_number_string(value)), Self::Number)
    }
}

impl From<i64> for MessageValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for MessageValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for MessageValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for MessageValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<usize> for MessageValue {
    fn from(value: usize) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for MessageValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MessageValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Value id -> value.
pub type MessageValues = BTreeMap<String, MessageValue>;

/// Builds [`MessageValues`] from `id => value` pairs.
///
/// ```rust
/// use report_intl::values;
///
/// let values = values! { "wastedMs" => 1234.5, "url" => "https://example.com/" };
/// assert_eq!(values.len(), 2);
/// ```
#[macro_export]
macro_rules! values {
    () => { $crate::format::MessageValues::new() };
    ($($id:expr => $value:expr),+ $(,)?) => {{
        let mut values = $crate::format::MessageValues::new();
        $( values.insert(($id).to_string(), $crate::format::MessageValue::from($value)); )+
        values
    }};
}

/// A localizable message embedded in a report document.
///
/// Serialized as `{ "i18nId": ..., "values": ..., "formattedDefault": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcuMessage {
    /// `"<file> | <key>"`
    pub i18n_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<MessageValues>,
    /// The message rendered in [`DEFAULT_LOCALE`].
    pub formatted_default: String,
}

impl IcuMessage {
    /// Reads an ICU message out of a document value, if it is one.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !is_icu_message(value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Splits the id into its file and key parts.
    pub fn id_parts(&self) -> Result<(&str, &str)> {
        self.i18n_id
            .split_once(" | ")
            .ok_or_else(|| I18nError::MalformedId(self.i18n_id.clone()))
    }
}

/// Whether `value` has the shape of an [`IcuMessage`].
pub fn is_icu_message(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let Some(i18n_id) = object.get("i18nId").and_then(Value::as_str) else {
        return false;
    };
    if !object.get("formattedDefault").is_some_and(Value::is_string) {
        return false;
    }
    if let Some(values) = object.get("values") {
        let Some(values) = values.as_object() else {
            return false;
        };
        if !values.values().all(|v| v.is_string() || v.is_number()) {
            return false;
        }
    }

    MESSAGE_I18N_ID_RE.is_match(i18n_id)
}

/// Locales formatted with another locale's number and plural rules. The
/// accented pseudo-locales use German conventions so that separators stand out.
pub const NUMBER_LOCALE_OVERRIDES: &[(&str, &str)] = &[("en-XA", "de-DE"), ("en-XL", "de-DE")];

/// Locale used for number formatting and plural rules, after
/// [`NUMBER_LOCALE_OVERRIDES`].
pub fn formatting_locale(locale: &str) -> &str {
    NUMBER_LOCALE_OVERRIDES
        .iter()
        .find(|(overridden, _)| *overridden == locale)
        .map_or(locale, |&(_, number_locale)| number_locale)
}

/// Formats an ICU message for `locale`.
///
/// # Example
///
/// ```rust
/// use report_intl::format::format_message;
/// use report_intl::values;
///
/// let text = format_message(
///     "Potential savings of {wastedBytes, number, bytes}\u{a0}KiB",
///     &values! { "wastedBytes" => 52_000 },
///     "en-US",
/// )
/// .unwrap();
/// assert_eq!(text, "Potential savings of 51\u{a0}KiB");
/// ```
pub fn format_message(message: &str, values: &MessageValues, locale: &str) -> Result<String> {
    format_message_in(message, values, formatting_locale(locale))
}

/// Formats an ICU message using `format_locale` for numbers and plural rules
/// as-is, without the pseudo-locale substitution of [`format_message`].
pub fn format_message_in(message: &str, values: &MessageValues, format_locale: &str) -> Result<String> {
    let template = MessageTemplate::parse(message)?;
    let values = preformat_values(message, &template, values)?;

    let renderer = Renderer {
        message,
        values: &values,
        locale: format_locale,
    };
    let mut out = String::new();
    renderer.render(template.elements(), None, &mut out)?;
    Ok(out)
}

/// Matches `values` against the placeholders of `template` and applies unit
/// conversions to numeric ones.
pub fn preformat_values(
    message: &str,
    template: &MessageTemplate,
    values: &MessageValues,
) -> Result<MessageValues> {
    let mut formatted = MessageValues::new();

    for (id, format) in template.arguments() {
        let Some(value) = values.get(&id) else {
            return Err(I18nError::MissingValue { id });
        };

        let ArgumentFormat::Number(style) = format else {
            formatted.insert(id, value.clone());
            continue;
        };

        let Some(number) = value.as_f64() else {
            return Err(I18nError::NonNumericValue {
                message: message.to_string(),
                id,
            });
        };

        let converted = match style {
            NumberStyle::Milliseconds => js_round(number / 10.0) * 10.0,
            NumberStyle::Seconds if id == "timeInMs" => js_round(number / 100.0) / 10.0,
            NumberStyle::Bytes => number / 1024.0,
            _ => {
                formatted.insert(id, value.clone());
                continue;
            }
        };
        formatted.insert(id, converted.into());
    }

    for (id, value) in values {
        if formatted.contains_key(id) {
            continue;
        }
        if id == ERROR_CODE_VALUE {
            formatted.insert(id.clone(), value.clone());
            continue;
        }
        return Err(I18nError::UnusedValue {
            message: message.to_string(),
            id: id.clone(),
        });
    }

    Ok(formatted)
}

/// Rounds half up, toward positive infinity.
fn js_round(value: f64) -> f64 {
    (value + 0.5).floor()
}

struct Renderer<'a> {
    message: &'a str,
    values: &'a MessageValues,
    locale: &'a str,
}

impl Renderer<'_> {
    fn render(&self, elements: &[Element], pound: Option<f64>, out: &mut String) -> Result<()> {
        for element in elements {
            match element {
                Element::Literal(text) => out.push_str(text),
                Element::Argument { id } => out.push_str(&self.value(id)?.to_display_string()),
                Element::Number { id, style } => {
                    out.push_str(&format_number(self.number(id)?, style, self.locale));
                }
                Element::Plural {
                    id,
                    kind,
                    offset,
                    options,
                } => {
                    let value = self.number(id)?;
                    let adjusted = value - offset;
                    let category = plural_category(&js_number_string(adjusted), self.locale, *kind);
                    if let Some(option) = select_plural(options, value, category) {
                        self.render(&option.elements, Some(adjusted), out)?;
                    }
                }
                Element::Select { id, options } => {
                    let key = self.value(id)?.to_display_string();
                    let option = options
                        .iter()
                        .find(|option| option.key == key)
                        .or_else(|| options.iter().find(|option| option.key == "other"));
                    if let Some(option) = option {
                        self.render(&option.elements, pound, out)?;
                    }
                }
                Element::Pound => match pound {
                    Some(value) => out.push_str(&format_number(value, &NumberStyle::Default, self.locale)),
                    None => out.push('#'),
                },
            }
        }
        Ok(())
    }

    fn value(&self, id: &str) -> Result<&MessageValue> {
        self.values
            .get(id)
            .ok_or_else(|| I18nError::MissingValue { id: id.to_string() })
    }

    fn number(&self, id: &str) -> Result<f64> {
        self.value(id)?.as_f64().ok_or_else(|| I18nError::NonNumericValue {
            message: self.message.to_string(),
            id: id.to_string(),
        })
    }
}

fn select_plural<'o>(options: &'o [PluralOption], value: f64, category: &str) -> Option<&'o PluralOption> {
    let selected = |wanted: &str| {
        options
            .iter()
            .find(move |option| matches!(&option.selector, PluralSelector::Category(c) if c == wanted))
    };

    options
        .iter()
        .find(|option| matches!(option.selector, PluralSelector::Exact(exact) if exact == value))
        .or_else(|| selected(category))
        .or_else(|| selected("other"))
}

/// Resolves [`IcuMessage`]s against a catalog in one locale.
#[derive(Debug, Clone, Copy)]
pub struct Localizer<'a> {
    catalog: &'a LocaleCatalog,
    locale: &'a str,
    format_locale: &'a str,
}

impl<'a> Localizer<'a> {
    pub fn new(catalog: &'a LocaleCatalog, locale: &'a str) -> Self {
        Self {
            catalog,
            locale,
            format_locale: formatting_locale(locale),
        }
    }

    /// Overrides the locale used for numbers and plural rules.
    pub fn with_format_locale(mut self, format_locale: &'a str) -> Self {
        self.format_locale = format_locale;
        self
    }

    pub fn locale(&self) -> &str {
        self.locale
    }

    /// Formats the locale's translation of `message`. Falls back to the
    /// message's default rendering when the locale has no translation.
    pub fn localize(&self, message: &IcuMessage) -> Result<String> {
        let Some(template) = self.catalog.message(self.locale, &message.i18n_id) else {
            debug!(
                id = %message.i18n_id,
                locale = self.locale,
                "no localized message, using default"
            );
            return Ok(message.formatted_default.clone());
        };

        let no_values = MessageValues::new();
        let values = message.values.as_ref().unwrap_or(&no_values);
        format_message_in(template, values, self.format_locale)
    }

    /// Formats an ICU message, or passes a plain string through.
    pub fn get_formatted(&self, value: &Value) -> Result<String> {
        if let Some(message) = IcuMessage::from_value(value) {
            return self.localize(&message);
        }
        match value {
            Value::String(text) => Ok(text.clone()),
            _ => Err(I18nError::InvalidMessageType),
        }
    }
}

/// The default English strings of one source file.
///
/// # Example
///
/// ```rust
/// use report_intl::format::UiStrings;
/// use report_intl::values;
///
/// let strings = UiStrings::new(
///     "core/audits/byte-efficiency/uses-long-cache-ttl.js",
///     &[("displayValue", "{itemCount, plural, =1 {1 resource found} other {# resources found}}")],
/// );
/// let message = strings.message("displayValue", values! { "itemCount" => 3 }).unwrap();
/// assert_eq!(message.i18n_id, "core/audits/byte-efficiency/uses-long-cache-ttl.js | displayValue");
/// assert_eq!(message.formatted_default, "3 resources found");
/// ```
#[derive(Debug, Clone)]
pub struct UiStrings {
    file: String,
    strings: BTreeMap<String, String>,
}

impl UiStrings {
    pub fn new(file: impl Into<String>, strings: &[(&str, &str)]) -> Self {
        Self {
            file: file.into(),
            strings: strings
                .iter()
                .map(|(key, message)| ((*key).to_string(), (*message).to_string()))
                .collect(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// `"<file> | <key>"`
    pub fn message_id(&self, key: &str) -> String {
        format!("{} | {key}", self.file)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.strings.iter().map(|(key, message)| (key.as_str(), message.as_str()))
    }

    /// Builds the [`IcuMessage`] for `key`, rendering its default text in
    /// [`DEFAULT_LOCALE`]. The values are kept even when empty.
    pub fn message(&self, key: &str, values: MessageValues) -> Result<IcuMessage> {
        self.build(key, Some(values))
    }

    /// Builds the [`IcuMessage`] for a `key` that takes no values. The message
    /// carries no `values` at all.
    pub fn text(&self, key: &str) -> Result<IcuMessage> {
        self.build(key, None)
    }

    fn build(&self, key: &str, values: Option<MessageValues>) -> Result<IcuMessage> {
        let template = self
            .strings
            .get(key)
            .ok_or_else(|| I18nError::UnknownUiString(self.message_id(key)))?;

        let no_values = MessageValues::new();
        let formatted_default = format_message(template, values.as_ref().unwrap_or(&no_values), DEFAULT_LOCALE)?;
        Ok(IcuMessage {
            i18n_id: self.message_id(key),
            values,
            formatted_default,
        })
    }
}
