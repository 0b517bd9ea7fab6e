//! Localizing every ICU message inside a report document.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{I18nError, Result};
use crate::format::{IcuMessage, Localizer, MessageValues};

static PLAIN_PROPERTY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());
static UNSUPPORTED_PROPERTY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\]"'\s]"#).unwrap());

/// Where one message instance was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IcuMessagePath {
    /// Instance that carried values.
    WithValues { values: MessageValues, path: String },
    Path(String),
}

impl IcuMessagePath {
    pub fn path(&self) -> &str {
        match self {
            Self::WithValues { path, .. } | Self::Path(path) => path,
        }
    }
}

/// Message id -> every place it was found, in document order.
pub type IcuMessagePaths = BTreeMap<String, Vec<IcuMessagePath>>;

/// Replaces every ICU message in `document` with its localized string and
/// returns where each one was.
///
/// The walk covers object properties and array elements depth-first. The root
/// value itself is never replaced.
///
/// # Example
///
/// ```rust
/// use report_intl::catalog::LocaleCatalog;
/// use report_intl::format::Localizer;
/// use report_intl::replace::{replace_icu_messages, IcuMessagePath};
/// use serde_json::json;
///
/// let mut report = json!({
///     "audits": {
///         "first-contentful-paint": {
///             "title": { "i18nId": "core/audits/metrics/fcp.js | title", "formattedDefault": "First Contentful Paint" }
///         }
///     }
/// });
///
/// let catalog = LocaleCatalog::new();
/// let paths = replace_icu_messages(&mut report, &Localizer::new(&catalog, "en-US")).unwrap();
///
/// assert_eq!(report["audits"]["first-contentful-paint"]["title"], "First Contentful Paint");
/// assert_eq!(
///     paths["core/audits/metrics/fcp.js | title"],
///     vec![IcuMessagePath::Path("audits[first-contentful-paint].title".into())]
/// );
/// ```
pub fn replace_icu_messages(document: &mut Value, localizer: &Localizer<'_>) -> Result<IcuMessagePaths> {
    let mut paths = IcuMessagePaths::new();
    let mut path = Vec::new();
    replace_in_children(document, localizer, &mut path, &mut paths)?;
    Ok(paths)
}

fn replace_in_children(
    value: &mut Value,
    localizer: &Localizer<'_>,
    path: &mut Vec<String>,
    paths: &mut IcuMessagePaths,
) -> Result<()> {
    match value {
        Value::Object(object) => {
            for (property, child) in object.iter_mut() {
                path.push(property.clone());
                replace_in_value(child, localizer, path, paths)?;
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter_mut().enumerate() {
                path.push(index.to_string());
                replace_in_value(child, localizer, path, paths)?;
                path.pop();
            }
        }
        _ => {}
    }
    Ok(())
}

fn replace_in_value(
    value: &mut Value,
    localizer: &Localizer<'_>,
    path: &mut Vec<String>,
    paths: &mut IcuMessagePaths,
) -> Result<()> {
    let Some(message) = IcuMessage::from_value(value) else {
        return replace_in_children(value, localizer, path, paths);
    };

    let formatted = localizer.localize(&message)?;
    let path = format_path_as_string(path)?;
    let instance = match message.values {
        Some(values) => IcuMessagePath::WithValues { values, path },
        None => IcuMessagePath::Path(path),
    };

    paths.entry(message.i18n_id).or_default().push(instance);
    *value = Value::String(formatted);
    Ok(())
}

/// Joins document property names into a path string.
///
/// Purely alphabetic properties are joined with `.`; anything else is written
/// in brackets.
///
/// ```rust
/// use report_intl::replace::format_path_as_string;
///
/// let path = format_path_as_string(&["audits", "uses-long-cache-ttl", "details", "items", "0", "label"]).unwrap();
/// assert_eq!(path, "audits[uses-long-cache-ttl].details.items[0].label");
/// ```
pub fn format_path_as_string<S: AsRef<str>>(path: &[S]) -> Result<String> {
    let mut out = String::new();
    for property in path {
        let property = property.as_ref();
        if PLAIN_PROPERTY_RE.is_match(property) {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(property);
        } else {
            if UNSUPPORTED_PROPERTY_RE.is_match(property) {
                return Err(I18nError::UnsupportedPathProperty(property.to_string()));
            }
            out.push('[');
            out.push_str(property);
            out.push(']');
        }
    }
    Ok(out)
}
