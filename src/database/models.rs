/*!
 * Database models for translation entries and statistics.
 */

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// Split a `category.key` identifier at its first dot
///
/// Both parts must be non-empty; the key part may itself contain dots
/// (`errors.http.404` → `errors` / `http.404`).
pub fn split_identifier(identifier: &str) -> Result<(&str, &str), StoreError> {
    match identifier.split_once('.') {
        Some((category, key)) if !category.trim().is_empty() && !key.trim().is_empty() => {
            Ok((category, key))
        }
        _ => Err(StoreError::InvalidKey(identifier.to_string())),
    }
}

/// One persisted translation, unique on (locale, category, key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub locale: String,
    pub category: String,
    pub key: String,
    pub text: String,
}

impl TranslationEntry {
    /// Build an entry from a `category.key` identifier
    pub fn from_identifier(locale: &str, identifier: &str, text: &str) -> Result<Self, StoreError> {
        let (category, key) = split_identifier(identifier)?;
        Ok(Self {
            locale: locale.to_string(),
            category: category.to_string(),
            key: key.to_string(),
            text: text.to_string(),
        })
    }

    /// The `category.key` identifier of this entry
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.category, self.key)
    }
}

/// Completeness of one locale relative to the baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleStatistics {
    pub locale_code: String,
    pub translated_count: usize,
    pub total_count: usize,
}

impl LocaleStatistics {
    /// Share of baseline keys present, as a percentage
    pub fn percent(&self) -> f64 {
        if self.total_count == 0 {
            return 100.0;
        }
        (self.translated_count as f64 / self.total_count as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.translated_count >= self.total_count
    }
}

impl std::fmt::Display for LocaleStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}/{} ({:.1}%)",
            self.locale_code,
            self.translated_count,
            self.total_count,
            self.percent()
        )
    }
}
