/*!
 * Database module for persistent storage of translation entries.
 *
 * This module provides SQLite-based persistence for:
 * - Translation entries keyed by (locale, category, key)
 * - Service credentials consumed by the provider clients
 *
 * The reconciliation engine only talks to the `KeyStore` trait, so any
 * storage with upsert semantics on the composite key can stand in.
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::errors::StoreError;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{LocaleStatistics, TranslationEntry};
pub use repository::Repository;

/// Read/list/upsert access to persisted translation entries
///
/// Keys are `category.key` identifiers. Implementations must make `upsert`
/// idempotent and `bulk_import` all-or-nothing.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// All identifiers stored for a locale
    async fn list_keys(&self, locale: &str) -> Result<BTreeSet<String>, StoreError>;

    /// Text stored for one identifier
    async fn get_text(&self, locale: &str, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or update a single entry
    async fn upsert(&self, locale: &str, key: &str, text: &str) -> Result<(), StoreError>;

    /// Insert or update every entry, or none of them
    async fn bulk_import(
        &self,
        locale: &str,
        entries: &BTreeMap<String, String>,
    ) -> Result<(), StoreError>;

    /// Flat identifier → text map for a locale
    async fn export_locale(&self, locale: &str) -> Result<BTreeMap<String, String>, StoreError>;

    /// Locales that have at least one entry
    async fn list_locales(&self) -> Result<Vec<String>, StoreError>;

    /// Number of identifiers stored for a locale
    async fn count_keys(&self, locale: &str) -> Result<usize, StoreError> {
        Ok(self.list_keys(locale).await?.len())
    }
}

/// Build the read-only statistics view for a set of locales
///
/// `translated_count` counts only identifiers that also exist in the
/// baseline, so stale keys in a target locale never push it above 100%.
pub async fn get_statistics<S: KeyStore + ?Sized>(
    store: &S,
    baseline: &str,
    locales: &[String],
) -> Result<Vec<LocaleStatistics>, StoreError> {
    let baseline_keys = store.list_keys(baseline).await?;
    let mut stats = Vec::with_capacity(locales.len());

    for locale in locales {
        let translated_count = if locale == baseline {
            baseline_keys.len()
        } else {
            let keys = store.list_keys(locale).await?;
            keys.intersection(&baseline_keys).count()
        };

        stats.push(LocaleStatistics {
            locale_code: locale.clone(),
            translated_count,
            total_count: baseline_keys.len(),
        });
    }

    Ok(stats)
}
