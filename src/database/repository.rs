/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::connection::DatabaseConnection;
use super::models::{split_identifier, TranslationEntry};
use super::KeyStore;
use crate::errors::StoreError;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Translation Operations
    // =========================================================================

    /// Insert or update one entry (synchronous version for use within transactions)
    ///
    /// Re-writing identical text leaves the row untouched, `updated_at` included.
    fn upsert_sync(conn: &Connection, entry: &TranslationEntry, now: &str) -> Result<(), StoreError> {
        conn.execute(
            r#"
            INSERT INTO translations (locale, category, key, text, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(locale, category, key) DO UPDATE
                SET text = excluded.text, updated_at = excluded.updated_at
                WHERE translations.text <> excluded.text
            "#,
            params![entry.locale, entry.category, entry.key, entry.text, now],
        )?;
        Ok(())
    }

    /// Get all entries of a locale ordered by identifier
    pub async fn list_entries(&self, locale: &str) -> Result<Vec<TranslationEntry>> {
        let locale = locale.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT locale, category, key, text
                    FROM translations
                    WHERE locale = ?1
                    ORDER BY category, key
                    "#,
                )?;

                let entries = stmt
                    .query_map([&locale], |row| {
                        Ok(TranslationEntry {
                            locale: row.get(0)?,
                            category: row.get(1)?,
                            key: row.get(2)?,
                            text: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(entries)
            })
            .await
    }

    // =========================================================================
    // Credential Operations
    // =========================================================================

    /// Store a credential; it becomes the active one for its service
    pub async fn add_credential(&self, service: &str, secret: &str) -> Result<()> {
        let service = service.to_string();
        let secret = secret.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .transaction_async(move |tx| {
                tx.execute(
                    "UPDATE service_credentials SET is_active = 0 WHERE service = ?1",
                    [&service],
                )?;
                tx.execute(
                    "INSERT INTO service_credentials (service, secret, is_active, created_at)
                     VALUES (?1, ?2, 1, ?3)",
                    params![service, secret, now],
                )?;
                Ok(())
            })
            .await
    }

    /// Deactivate every credential of a service
    pub async fn deactivate_credentials(&self, service: &str) -> Result<usize> {
        let service = service.to_string();

        self.db
            .execute_async(move |conn| {
                let changed = conn.execute(
                    "UPDATE service_credentials SET is_active = 0 WHERE service = ?1",
                    [&service],
                )?;
                Ok(changed)
            })
            .await
    }

    /// Newest active credential for a service
    pub async fn active_credential(&self, service: &str) -> Result<Option<String>> {
        let service = service.to_string();

        self.db
            .execute_async(move |conn| {
                let secret = conn
                    .query_row(
                        r#"
                        SELECT secret FROM service_credentials
                        WHERE service = ?1 AND is_active = 1 AND secret <> ''
                        ORDER BY id DESC
                        LIMIT 1
                        "#,
                        [&service],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(secret)
            })
            .await
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.db.path())
            .finish()
    }
}

#[async_trait]
impl KeyStore for Repository {
    async fn list_keys(&self, locale: &str) -> Result<BTreeSet<String>, StoreError> {
        let locale = locale.to_string();

        let keys = self
            .db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT category || '.' || key FROM translations WHERE locale = ?1",
                )?;
                let keys = stmt
                    .query_map([&locale], |row| row.get::<_, String>(0))?
                    .collect::<Result<BTreeSet<_>, _>>()?;
                Ok(keys)
            })
            .await?;

        Ok(keys)
    }

    async fn get_text(&self, locale: &str, key: &str) -> Result<Option<String>, StoreError> {
        let (category, key) = split_identifier(key)?;
        let (locale, category, key) = (locale.to_string(), category.to_string(), key.to_string());

        let text = self
            .db
            .execute_async(move |conn| {
                let text = conn
                    .query_row(
                        "SELECT text FROM translations WHERE locale = ?1 AND category = ?2 AND key = ?3",
                        params![locale, category, key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(text)
            })
            .await?;

        Ok(text)
    }

    async fn upsert(&self, locale: &str, key: &str, text: &str) -> Result<(), StoreError> {
        let entry = TranslationEntry::from_identifier(locale, key, text)?;
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                Self::upsert_sync(conn, &entry, &now)?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    async fn bulk_import(
        &self,
        locale: &str,
        entries: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let locale_owned = locale.to_string();
        let entries = entries.clone();
        let now = chrono::Utc::now().to_rfc3339();
        let count = entries.len();

        self.db
            .transaction_async(move |tx| {
                for (identifier, text) in &entries {
                    let entry = TranslationEntry::from_identifier(&locale_owned, identifier, text)?;
                    Self::upsert_sync(tx, &entry, &now)?;
                }
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Import {
                locale: locale.to_string(),
                reason: StoreError::from(e).to_string(),
            })?;

        debug!("Imported {} entries into '{}'", count, locale);
        Ok(())
    }

    async fn export_locale(&self, locale: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let entries = self.list_entries(locale).await?;

        Ok(entries
            .into_iter()
            .map(|entry| (entry.identifier(), entry.text))
            .collect())
    }

    async fn list_locales(&self) -> Result<Vec<String>, StoreError> {
        let locales = self
            .db
            .execute_async(|conn| {
                let mut stmt =
                    conn.prepare("SELECT DISTINCT locale FROM translations ORDER BY locale")?;
                let locales = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(locales)
            })
            .await?;

        Ok(locales)
    }

    async fn count_keys(&self, locale: &str) -> Result<usize, StoreError> {
        let locale = locale.to_string();

        let count = self
            .db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM translations WHERE locale = ?1",
                    [&locale],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await?;

        Ok(count as usize)
    }
}
