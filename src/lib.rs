/*!
 * # locsync - translation store reconciliation with AI fallback
 *
 * A Rust library that keeps every supported locale of a key→text translation
 * store in step with a baseline locale, filling missing keys through an AI
 * translation backend.
 *
 * ## Features
 *
 * - Key-set diffing between the baseline and each target locale
 * - Batch-first translation with a per-key fallback pass
 * - Ordered model fallback; echoed or empty output counts as failure
 * - Paced per-key calls with immediate persistence
 * - SQLite key store with idempotent upserts and atomic imports
 * - Pluggable credential suppliers (environment, database, static)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `credentials`: Credential suppliers for provider clients
 * - `database`: Key store trait and its SQLite implementation
 * - `providers`: Translation backends:
 *   - `providers::openai`: Chat-completions API client
 *   - `providers::mock`: Scripted provider for tests
 * - `translation`: Reconciliation engine:
 *   - `translation::reconciler`: Missing-key computation
 *   - `translation::fallback`: Ordered model fallback
 *   - `translation::batch`: Batch translator
 *   - `translation::individual`: Paced per-key translator
 *   - `translation::orchestrator`: Per-locale reconciliation flow
 * - `language_utils`: Locale code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod credentials;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{KeyStore, Repository};
pub use errors::{AllModelsFailed, ProviderError, ReconcileError, StoreError};
pub use language_utils::{get_language_name, locales_match, normalize_to_part2t};
pub use providers::TranslationProvider;
pub use translation::{PacingPolicy, ReconciliationService, ReconciliationStats};
