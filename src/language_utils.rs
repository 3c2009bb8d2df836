/*!
 * Language utilities for locale code handling.
 *
 * Locales are written as an ISO 639 language code optionally followed by a
 * region or script subtag (`ru`, `pt-BR`, `zh_Hant`). Only the primary
 * subtag is looked up in the ISO tables; the remainder is carried through
 * to the human-readable name used in translation prompts.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Split a locale into its lowercase primary subtag and optional remainder
pub fn split_locale(locale: &str) -> (String, Option<String>) {
    let trimmed = locale.trim();
    match trimmed.find(['-', '_']) {
        Some(idx) => {
            let rest = trimmed[idx + 1..].trim();
            (
                trimmed[..idx].to_lowercase(),
                if rest.is_empty() { None } else { Some(rest.to_string()) },
            )
        }
        None => (trimmed.to_lowercase(), None),
    }
}

/// Resolve the primary subtag of a locale to an ISO language
fn resolve_language(locale: &str) -> Option<Language> {
    let (primary, _) = split_locale(locale);
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => {
            let part2t = PART2B_TO_PART2T
                .iter()
                .find(|(b, _)| *b == primary)
                .map(|(_, t)| *t)
                .unwrap_or(primary.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate that a locale's primary subtag is a known ISO 639 code
pub fn validate_locale_code(locale: &str) -> Result<()> {
    resolve_language(locale)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid locale code: {}", locale))
}

/// Normalize a locale's language to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(locale: &str) -> Result<String> {
    resolve_language(locale)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid locale code: {}", locale))
}

/// Check if two locale codes are the same locale
///
/// The language parts are compared through ISO normalisation (`fr` and
/// `fre` match); region subtags are compared case-insensitively.
pub fn locales_match(a: &str, b: &str) -> bool {
    let (Ok(lang_a), Ok(lang_b)) = (normalize_to_part2t(a), normalize_to_part2t(b)) else {
        return false;
    };
    let region_a = split_locale(a).1.map(|r| r.to_lowercase());
    let region_b = split_locale(b).1.map(|r| r.to_lowercase());
    lang_a == lang_b && region_a == region_b
}

/// Get the English language name for a locale, e.g. `Portuguese (BR)`
pub fn get_language_name(locale: &str) -> Result<String> {
    let lang = resolve_language(locale)
        .ok_or_else(|| anyhow!("Failed to get language from locale: {}", locale))?;

    match split_locale(locale).1 {
        Some(region) => Ok(format!("{} ({})", lang.to_name(), region)),
        None => Ok(lang.to_name().to_string()),
    }
}
