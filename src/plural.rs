//! CLDR plural categories, backed by `intl_pluralrules`.

use intl_pluralrules::{PluralCategory, PluralRuleType, PluralRules};
use unic_langid::LanguageIdentifier;

use crate::catalog::language_of;

/// Which CLDR rule set a plural argument uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralKind {
    /// `plural`
    Cardinal,
    /// `selectordinal`
    Ordinal,
}

/// Returns the CLDR category keyword (`zero`, `one`, `two`, `few`, `many` or
/// `other`) for a decimal operand such as `"1"` or `"2.5"`.
///
/// Locales without rule data fall back to their language, then to English.
pub fn plural_category(operand: &str, locale: &str, kind: PluralKind) -> &'static str {
    let Some(rules) = rules_for(locale, kind) else {
        return "other";
    };

    match rules.select(operand) {
        Ok(category) => category_name(category),
        Err(_) => "other",
    }
}

fn rules_for(locale: &str, kind: PluralKind) -> Option<PluralRules> {
    [locale, language_of(locale), "en"].into_iter().find_map(|tag| {
        let langid: LanguageIdentifier = tag.parse().ok()?;
        PluralRules::create(langid, rule_type(kind)).ok()
    })
}

fn rule_type(kind: PluralKind) -> PluralRuleType {
    match kind {
        PluralKind::Cardinal => PluralRuleType::CARDINAL,
        PluralKind::Ordinal => PluralRuleType::ORDINAL,
    }
}

fn category_name(category: PluralCategory) -> &'static str {
    match category {
        PluralCategory::ZERO => "zero",
        PluralCategory::ONE => "one",
        PluralCategory::TWO => "two",
        PluralCategory::FEW => "few",
        PluralCategory::MANY => "many",
        PluralCategory::OTHER => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_cardinal() {
        assert_eq!(plural_category("1", "en-US", PluralKind::Cardinal), "one");
        assert_eq!(plural_category("0", "en-US", PluralKind::Cardinal), "other");
        assert_eq!(plural_category("2", "en", PluralKind::Cardinal), "other");
        assert_eq!(plural_category("1.5", "en", PluralKind::Cardinal), "other");
    }

    #[test]
    fn english_ordinal() {
        assert_eq!(plural_category("1", "en", PluralKind::Ordinal), "one");
        assert_eq!(plural_category("2", "en", PluralKind::Ordinal), "two");
        assert_eq!(plural_category("3", "en", PluralKind::Ordinal), "few");
        assert_eq!(plural_category("11", "en", PluralKind::Ordinal), "other");
    }

    #[test]
    fn slavic_cardinal() {
        assert_eq!(plural_category("1", "ru", PluralKind::Cardinal), "one");
        assert_eq!(plural_category("3", "ru", PluralKind::Cardinal), "few");
        assert_eq!(plural_category("5", "ru", PluralKind::Cardinal), "many");
        assert_eq!(plural_category("22", "pl", PluralKind::Cardinal), "few");
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(plural_category("1", "xx-YY", PluralKind::Cardinal), "one");
        assert_eq!(plural_category("4", "not a tag", PluralKind::Cardinal), "other");
    }
}
