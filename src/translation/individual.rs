/*!
 * Per-key translation with pacing.
 *
 * Keys are translated strictly one after another through the model fallback
 * chain. Every resolved key is written to the store immediately, so an
 * interrupted run keeps everything resolved before the interruption.
 */

use std::time::Duration;

use log::{debug, error, warn};

use crate::database::KeyStore;
use crate::providers::{BatchItem, TranslationProvider};

use super::fallback::{accept_translation, ModelChain};

/// Delays applied between consecutive per-key translations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Delay after a key was resolved
    pub success_delay: Duration,
    /// Delay after a key could not be resolved
    pub failure_delay: Duration,
}

impl PacingPolicy {
    pub fn new(success_delay: Duration, failure_delay: Duration) -> Self {
        Self {
            success_delay,
            failure_delay,
        }
    }

    /// No delay at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Delay to apply after a key with the given outcome
    pub fn delay_after(&self, resolved: bool) -> Duration {
        if resolved {
            self.success_delay
        } else {
            self.failure_delay
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000), Duration::from_millis(2000))
    }
}

/// Result of an individual translation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndividualOutcome {
    /// Keys translated and persisted, in processing order
    pub resolved: Vec<String>,
    /// Keys left unresolved, in processing order
    pub failed: Vec<String>,
}

/// Translator that resolves keys one by one
pub struct IndividualTranslator<'a> {
    provider: &'a dyn TranslationProvider,
    chain: &'a ModelChain,
    store: &'a dyn KeyStore,
    pacing: PacingPolicy,
}

impl<'a> IndividualTranslator<'a> {
    /// Create a new individual translator
    pub fn new(
        provider: &'a dyn TranslationProvider,
        chain: &'a ModelChain,
        store: &'a dyn KeyStore,
        pacing: PacingPolicy,
    ) -> Self {
        Self {
            provider,
            chain,
            store,
            pacing,
        }
    }

    /// Translate and persist each item into `locale`
    ///
    /// `progress` is called after every key with `(done, total)`.
    pub async fn translate_all(
        &self,
        items: &[BatchItem],
        locale: &str,
        target_language: &str,
        progress: impl Fn(usize, usize),
    ) -> IndividualOutcome {
        let mut outcome = IndividualOutcome::default();
        let total = items.len();

        for (index, item) in items.iter().enumerate() {
            let resolved = self.translate_item(item, locale, target_language).await;

            if resolved {
                outcome.resolved.push(item.key.clone());
            } else {
                outcome.failed.push(item.key.clone());
            }

            progress(index + 1, total);

            if index + 1 < total {
                let delay = self.pacing.delay_after(resolved);
                if !delay.is_zero() {
                    debug!("Pacing for {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        outcome
    }

    /// Translate one item and persist it; `true` when it is stored
    async fn translate_item(&self, item: &BatchItem, locale: &str, target_language: &str) -> bool {
        let provider = self.provider;
        let source = item.text.as_str();

        let outcome = self
            .chain
            .try_in_order(|model| async move {
                let translated = provider.translate_one(source, target_language, &model).await?;
                accept_translation(source, translated)
            })
            .await;

        let translated = match outcome {
            Ok(success) => success.value,
            Err(e) => {
                warn!("Could not translate '{}': {}", item.key, e);
                return false;
            }
        };

        match self.store.upsert(locale, &item.key, &translated).await {
            Ok(()) => {
                debug!("Stored {}:{}", locale, item.key);
                true
            }
            Err(e) => {
                error!("Failed to store {}:{}: {}", locale, item.key, e);
                false
            }
        }
    }
}
