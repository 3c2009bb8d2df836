/*!
 * Common test utilities for the locsync test suite
 */

use std::collections::BTreeMap;

use anyhow::Result;
use tempfile::TempDir;

use locsync::database::{DatabaseConnection, KeyStore, Repository};

// Fake chat-completions server
pub mod fake_server;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// In-memory repository filled with the given locale entries
pub async fn repository_with(entries: &[(&str, &str, &str)]) -> Repository {
    let repo = Repository::new_in_memory().expect("Failed to create repository");
    for (locale, key, text) in entries {
        repo.upsert(locale, key, text)
            .await
            .expect("Failed to seed repository");
    }
    repo
}

/// File-backed repository inside a temporary directory
pub fn file_repository(dir: &TempDir) -> Repository {
    let db = DatabaseConnection::new(dir.path().join("locsync.db")).expect("Failed to open database");
    Repository::new(db)
}

/// Baseline with five keys across two categories
pub fn english_baseline() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("en", "common.speed", "Speed"),
        ("en", "common.up", "Up"),
        ("en", "common.down", "Down"),
        ("en", "vpn.connect", "Connect"),
        ("en", "vpn.disconnect", "Disconnect"),
    ]
}

/// Build an owned identifier → text map
pub fn text_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Install a test logger; repeated calls are fine
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
