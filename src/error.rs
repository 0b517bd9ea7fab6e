use thiserror::Error;

/// Errors raised while parsing, formatting or localizing messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum I18nError {
    /// The message template is not valid ICU syntax.
    #[error("Malformed ICU message \"{message}\": {reason} (at byte {offset})")]
    Syntax {
        message: String,
        reason: String,
        offset: usize,
    },

    /// A placeholder in the template has no matching value.
    #[error("ICU Message contains a value reference (\"{id}\") that wasn't provided")]
    MissingValue { id: String },

    /// A numeric placeholder received a non-numeric value.
    #[error(
        "ICU Message \"{message}\" contains a numeric reference (\"{id}\") but provided value was not a number"
    )]
    NonNumericValue { message: String, id: String },

    /// A value was provided that no placeholder consumes.
    #[error("Provided value \"{id}\" does not match any placeholder in ICU message \"{message}\"")]
    UnusedValue { message: String, id: String },

    /// Something other than an ICU message or a string was handed to the formatter.
    #[error("Attempted to format invalid icuMessage type")]
    InvalidMessageType,

    /// A document property cannot be expressed in a path string.
    #[error("Cannot handle \"{0}\" in i18n")]
    UnsupportedPathProperty(String),

    #[error("Unsupported locale '{0}'")]
    UnsupportedLocale(String),

    /// A message id does not follow the `<file> | <key>` shape.
    #[error("Unexpected message id: {0}")]
    MalformedId(String),

    #[error("Could not locate: {0}")]
    UnknownUiString(String),

    /// A locale messages document could not be decoded.
    #[error("Invalid locale messages for '{locale}': {reason}")]
    InvalidLocaleMessages { locale: String, reason: String },
}

/// Result alias used across the crate.
pub type Result<T, E = I18nError> = std::result::Result<T, E>;
