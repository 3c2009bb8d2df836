/*!
 * Provider implementations for translation backends.
 *
 * This module contains client implementations behind one trait:
 * - OpenAI: chat-completions compatible HTTP API
 * - Mock: scripted in-process provider used by tests and dry runs
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One `(key, sourceText)` pair of a batch request, also the shape of a
/// decoded batch response item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// `category.key` identifier
    pub key: String,
    /// Source text on the way out, translated text on the way back
    pub text: String,
}

impl BatchItem {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Partial mapping of requested keys to translated text
pub type TranslationResult = BTreeMap<String, String>;

/// Common trait for all translation backends
///
/// A provider issues exactly one network call per method invocation and
/// never retries; retry across models is the fallback chain's job.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate a single text with the given model
    ///
    /// # Arguments
    /// * `text` - Source text, possibly with parameter placeholders
    /// * `target_language` - Human-readable target language name
    /// * `model` - Model identifier
    async fn translate_one(
        &self,
        text: &str,
        target_language: &str,
        model: &str,
    ) -> Result<String, ProviderError>;

    /// Translate many items in one structured call
    ///
    /// Keys not present in `items` are dropped from the result.
    async fn translate_batch(
        &self,
        items: &[BatchItem],
        target_language: &str,
        model: &str,
    ) -> Result<TranslationResult, ProviderError>;

    /// Check that the provider can be called at all (credential present)
    async fn check_available(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

pub mod openai;
pub mod mock;
