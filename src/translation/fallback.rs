/*!
 * Ordered model fallback.
 *
 * Candidates are tried strictly in configured order, each at most once. The
 * first accepted outcome wins; exhausting the list yields `AllModelsFailed`
 * with one recorded reason per candidate.
 */

use std::future::Future;

use log::{debug, info, warn};

use crate::errors::{AllModelsFailed, ModelFailure, ProviderError};
use crate::providers::{BatchItem, TranslationResult};

/// Outcome of a chain run that found an accepted candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSuccess<T> {
    /// Accepted value
    pub value: T,
    /// Model that produced it
    pub model: String,
    /// Candidates that failed before it, in order
    pub failures: Vec<ModelFailure>,
}

impl<T> ChainSuccess<T> {
    /// Number of candidates invoked, the successful one included
    pub fn attempts(&self) -> usize {
        self.failures.len() + 1
    }
}

/// Ordered list of candidate models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChain {
    models: Vec<String>,
}

impl ModelChain {
    /// Build a chain; blank identifiers are ignored
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.trim().is_empty())
                .collect(),
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Invoke `attempt` per candidate until one succeeds
    ///
    /// There is no retry of the same candidate: a timeout or any other
    /// provider failure simply advances to the next model.
    pub async fn try_in_order<T, F, Fut>(
        &self,
        mut attempt: F,
    ) -> Result<ChainSuccess<T>, AllModelsFailed>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut failures = Vec::new();

        for model in &self.models {
            debug!("Trying model {}", model);

            match attempt(model.clone()).await {
                Ok(value) => {
                    if !failures.is_empty() {
                        info!(
                            "Model {} succeeded after {} failed candidate(s)",
                            model,
                            failures.len()
                        );
                    }
                    return Ok(ChainSuccess {
                        value,
                        model: model.clone(),
                        failures,
                    });
                }
                Err(error) => {
                    warn!("Model {} failed: {}", model, error);
                    let unavailable = error.is_unavailable();
                    failures.push(ModelFailure {
                        model: model.clone(),
                        error,
                    });
                    // Without a credential no later candidate can succeed either
                    if unavailable {
                        break;
                    }
                }
            }
        }

        Err(AllModelsFailed { attempts: failures })
    }
}

/// Accept a single translation only if it is non-empty and differs from the source
///
/// Whitespace is ignored for the comparison; the accepted text is kept as produced.
pub fn accept_translation(source: &str, output: String) -> Result<String, ProviderError> {
    let trimmed = output.trim();
    if trimmed.is_empty() || trimmed == source.trim() {
        return Err(ProviderError::NoImprovement);
    }
    Ok(output)
}

/// Apply the single-item acceptance rule to every item of a batch result
///
/// Items that are empty or echo their source are dropped. A batch left with
/// no accepted item is `NoImprovement`, which advances the chain.
pub fn accept_batch(
    requested: &[BatchItem],
    result: TranslationResult,
) -> Result<TranslationResult, ProviderError> {
    let accepted: TranslationResult = result
        .into_iter()
        .filter_map(|(key, text)| {
            let source = requested.iter().find(|i| i.key == key)?;
            match accept_translation(&source.text, text) {
                Ok(text) => Some((key, text)),
                Err(_) => {
                    debug!("Dropping unimproved batch item '{}'", key);
                    None
                }
            }
        })
        .collect();

    if accepted.is_empty() {
        return Err(ProviderError::NoImprovement);
    }

    Ok(accepted)
}
