/*!
 * Error types for the locsync library.
 *
 * Provider-level failures are plain values consumed by the model fallback
 * chain; only exhaustion of the whole chain (`AllModelsFailed`) reaches the
 * translators. Store and import failures are reported per call.
 */

use std::fmt;

use thiserror::Error;

/// A single failed attempt against one translation backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// No credential is configured for the provider's service
    #[error("Provider unavailable: no credential configured for '{0}'")]
    Unavailable(String),

    /// Transport error, timeout or non-success status
    #[error("Provider call failed: {0}")]
    CallFailed(String),

    /// Response body could not be decoded or lacked the content field
    #[error("Malformed provider response: {0}")]
    ResponseMalformed(String),

    /// Output was empty or identical to the source text
    #[error("Provider returned no improvement over the source text")]
    NoImprovement,
}

impl ProviderError {
    /// Build a call failure from an HTTP status and the response body
    pub fn from_status(status_code: u16, body: &str) -> Self {
        Self::CallFailed(format!("status {} - {}", status_code, body.trim()))
    }

    /// Whether the failure happened before any network call
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::CallFailed(format!("request timed out: {}", error))
        } else if error.is_decode() {
            Self::ResponseMalformed(error.to_string())
        } else {
            Self::CallFailed(error.to_string())
        }
    }
}

/// One failed candidate in a fallback chain
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFailure {
    /// Model identifier that was tried
    pub model: String,
    /// Why it failed
    pub error: ProviderError,
}

/// Every candidate model failed
#[derive(Error, Debug, Clone, PartialEq, Default)]
pub struct AllModelsFailed {
    /// Per-model failure reasons, in attempt order
    pub attempts: Vec<ModelFailure>,
}

impl AllModelsFailed {
    /// Whether the chain had no candidates at all
    pub fn no_candidates(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Last recorded failure, if any
    pub fn last_error(&self) -> Option<&ProviderError> {
        self.attempts.last().map(|a| &a.error)
    }
}

impl fmt::Display for AllModelsFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return write!(f, "No candidate models configured");
        }
        write!(f, "All {} candidate models failed", self.attempts.len())?;
        for (i, attempt) in self.attempts.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} ({})", sep, attempt.model, attempt.error)?;
        }
        Ok(())
    }
}

/// Errors raised by the key store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A single read or write failed
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Identifier is not of the form `category.key`
    #[error("Invalid translation key '{0}': expected 'category.key'")]
    InvalidKey(String),

    /// A bulk import was rolled back
    #[error("Import into '{locale}' rolled back: {reason}")]
    Import {
        /// Locale the import targeted
        locale: String,
        /// Underlying failure
        reason: String,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Persistence(error.to_string())
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        // Keep typed store errors that were wrapped on the way out of a closure
        match error.downcast::<StoreError>() {
            Ok(store_error) => store_error,
            Err(other) => Self::Persistence(format!("{:#}", other)),
        }
    }
}

/// Errors that abort reconciliation of one locale
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Key store could not be read
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Locale code is not known to the configuration
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
}
