//! Locale-aware number rendering for ICU `number` arguments.
//!
//! Separators come from the CLDR tables in `num-format`. Rounding works on the
//! shortest decimal representation of the value and rounds half away from
//! zero.

use num_format::{Grouping, Locale as NumLocale};

use crate::catalog::language_of;
use crate::message::NumberStyle;

/// No-break space placed before the percent sign in spacing locales.
const NBSP: &str = "\u{a0}";
/// Narrow no-break space, used by French.
const NNBSP: &str = "\u{202f}";

/// Formats `value` with the precision and decoration of `style` in `locale`.
///
/// # Example
///
/// ```rust
/// use report_intl::message::NumberStyle;
/// use report_intl::number::format_number;
///
/// assert_eq!(format_number(1234.5678, &NumberStyle::Default, "en-US"), "1,234.568");
/// assert_eq!(format_number(1234.5678, &NumberStyle::Default, "de-DE"), "1.234,568");
/// assert_eq!(format_number(0.4567, &NumberStyle::ExtendedPercent, "en-US"), "45.67%");
/// ```
pub fn format_number(value: f64, style: &NumberStyle, locale: &str) -> String {
    let (value, min_fraction, max_fraction, percent) = match style {
        NumberStyle::Default | NumberStyle::Other(_) => (value, 0, 3, false),
        NumberStyle::Integer | NumberStyle::Milliseconds | NumberStyle::Bytes => (value, 0, 0, false),
        NumberStyle::Seconds => (value, 1, 1, false),
        NumberStyle::Percent => (value * 100.0, 0, 0, true),
        NumberStyle::ExtendedPercent => (value * 100.0, 0, 2, true),
    };

    let body = format_decimal(value, min_fraction, max_fraction, locale);
    if percent {
        with_percent_sign(body, locale)
    } else {
        body
    }
}

/// Renders a number the way a plain `{id}` placeholder shows it: shortest
/// round-trip digits, no grouping, no trailing `.0`. Magnitudes below 1e-6 or
/// from 1e21 up use exponent form (`1e-7`, `1.5e+21`).
pub fn js_number_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Covers -0.
        return "0".to_string();
    }

    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exponent_form = format!("{value:e}");
        return match exponent_form.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{mantissa}e+{exponent}"),
            _ => exponent_form,
        };
    }
    value.to_string()
}

fn format_decimal(value: f64, min_fraction: usize, max_fraction: usize, locale: &str) -> String {
    let symbols = NumberSymbols::for_locale(locale);
    if value.is_nan() {
        return symbols.nan.to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { symbols.minus } else { "" };
        return format!("{sign}{}", symbols.infinity);
    }

    let (int_digits, frac_digits) = round_decimal(&value.abs().to_string(), max_fraction);

    let mut fraction = frac_digits.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction {
        fraction.push('0');
    }

    let is_zero = int_digits.bytes().all(|b| b == b'0') && fraction.bytes().all(|b| b == b'0');
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push_str(symbols.minus);
    }
    out.push_str(&group_digits(&int_digits, &symbols));
    if !fraction.is_empty() {
        out.push_str(symbols.decimal);
        out.push_str(&fraction);
    }
    out
}

/// Rounds a plain positive decimal string to `max_fraction` digits, half away
/// from zero. Returns the integer and fraction digits separately.
fn round_decimal(plain: &str, max_fraction: usize) -> (String, String) {
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain, ""));
    if frac_part.len() <= max_fraction {
        return (int_part.to_string(), frac_part.to_string());
    }

    let round_up = frac_part.as_bytes()[max_fraction] >= b'5';
    let mut digits: Vec<u8> = int_part.bytes().chain(frac_part.bytes().take(max_fraction)).collect();

    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - max_fraction;
    let digits = String::from_utf8_lossy(&digits).into_owned();
    (digits[..split].to_string(), digits[split..].to_string())
}

fn group_digits(int_digits: &str, symbols: &NumberSymbols) -> String {
    let int_digits = int_digits.trim_start_matches('0');
    if int_digits.is_empty() {
        return "0".to_string();
    }
    if matches!(symbols.grouping, Grouping::Posix) || symbols.separator.is_empty() {
        return int_digits.to_string();
    }

    // Group sizes from the right: always 3 first, then 2 for Indian grouping.
    let rest_size = if matches!(symbols.grouping, Grouping::Indian) { 2 } else { 3 };
    let bytes = int_digits.as_bytes();
    let mut groups: Vec<&str> = Vec::new();
    let mut end = bytes.len();
    let mut size = 3;
    while end > size {
        groups.push(&int_digits[end - size..end]);
        end -= size;
        size = rest_size;
    }
    groups.push(&int_digits[..end]);
    groups.reverse();
    groups.join(symbols.separator)
}

fn with_percent_sign(body: String, locale: &str) -> String {
    match language_of(locale) {
        "fr" => format!("{body}{NNBSP}%"),
        "tr" => format!("%{body}"),
        "de" | "es" | "sv" | "nb" | "no" | "da" | "fi" | "cs" | "sk" | "ru" | "uk" | "pl" | "lt"
        | "lv" | "et" | "el" | "bg" | "hr" | "sl" | "sr" | "ro" | "hu" | "ca" | "pt" => {
            format!("{body}{NBSP}%")
        }
        _ => format!("{body}%"),
    }
}

struct NumberSymbols {
    decimal: &'static str,
    separator: &'static str,
    minus: &'static str,
    infinity: &'static str,
    nan: &'static str,
    grouping: Grouping,
}

impl NumberSymbols {
    fn for_locale(locale: &str) -> Self {
        let data = NumLocale::from_name(locale)
            .or_else(|_| NumLocale::from_name(language_of(locale)))
            .unwrap_or(NumLocale::en);
        // Digits are always ASCII, so separators of a non-Latin numbering
        // system would produce a mix no locale uses.
        let data = if has_non_latin_symbols(&data) { NumLocale::en } else { data };

        Self {
            decimal: data.decimal(),
            separator: data.separator(),
            minus: data.minus_sign(),
            infinity: data.infinity(),
            nan: data.nan(),
            grouping: data.grouping(),
        }
    }
}

/// Whether the locale's symbols belong to the Arabic-script numbering systems
/// (`arab`, `arabext`).
fn has_non_latin_symbols(data: &NumLocale) -> bool {
    [data.decimal(), data.separator(), data.minus_sign()]
        .into_iter()
        .flat_map(str::chars)
        .any(|c| ('\u{0600}'..='\u{06ff}').contains(&c))
}
