/*!
 * Batch translation processing.
 *
 * One structured provider call over the whole missing set, routed through
 * the model fallback chain. Whatever subset comes back is returned; the
 * caller computes the remainder.
 */

use log::{debug, info, warn};

use crate::providers::{BatchItem, TranslationProvider, TranslationResult};

use super::fallback::{accept_batch, ModelChain};

/// Batch translator for resolving many keys in one call
pub struct BatchTranslator<'a> {
    /// Provider used for every candidate
    provider: &'a dyn TranslationProvider,
    /// Ordered candidate models
    chain: &'a ModelChain,
}

impl<'a> BatchTranslator<'a> {
    /// Create a new batch translator
    pub fn new(provider: &'a dyn TranslationProvider, chain: &'a ModelChain) -> Self {
        Self { provider, chain }
    }

    /// Translate all items with the first model that yields an improvement
    ///
    /// Returns an empty map when every candidate fails.
    pub async fn translate(&self, items: &[BatchItem], target_language: &str) -> TranslationResult {
        if items.is_empty() {
            return TranslationResult::new();
        }

        debug!("Batch translating {} items into {}", items.len(), target_language);

        let provider = self.provider;
        let outcome = self
            .chain
            .try_in_order(|model| async move {
                let result = provider.translate_batch(items, target_language, &model).await?;
                accept_batch(items, result)
            })
            .await;

        match outcome {
            Ok(success) => {
                info!(
                    "Batch resolved {}/{} keys with {}",
                    success.value.len(),
                    items.len(),
                    success.model
                );
                success.value
            }
            Err(e) => {
                warn!("Batch translation gave up: {}", e);
                TranslationResult::new()
            }
        }
    }
}
