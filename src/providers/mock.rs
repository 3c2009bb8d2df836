/*!
 * Mock provider implementations for testing.
 *
 * This module provides a scripted provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged translation
 * - `MockProvider::echo()` - Returns the source text unchanged
 * - `MockProvider::failing()` - Always fails with a call error
 * - `MockProvider::unavailable()` - Has no credential
 *
 * Behaviors can be overridden per model and for batch calls, and every call
 * is recorded so tests can assert on call counts and ordering.
 */

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BatchItem, TranslationProvider, TranslationResult};
use crate::errors::ProviderError;

/// Request seen by a custom response generator
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Target language name
    pub target_language: String,
    /// Model identifier
    pub model: String,
}

/// Kind of call recorded by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Single,
    Batch,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub kind: CallKind,
    pub model: String,
    /// Number of items requested (1 for single calls)
    pub size: usize,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Returns the source text unchanged
    Echo,
    /// Returns empty text
    Empty,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with a call error
    Failing,
    /// Fails as if the response could not be decoded
    Malformed,
    /// Fails as if no credential were configured
    Unavailable,
    /// Batch calls return only every other requested item; single calls work
    PartialBatch,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Default behavior mode
    behavior: MockBehavior,
    /// Per-model overrides, applied to both call kinds
    model_behaviors: HashMap<String, MockBehavior>,
    /// Override for every batch call
    batch_behavior: Option<MockBehavior>,
    /// Source texts that no model can translate
    failing_texts: HashSet<String>,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every call, in order
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            model_behaviors: HashMap::new(),
            batch_behavior: None,
            failing_texts: HashSet::new(),
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that echoes the source text
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock without a credential
    pub fn unavailable() -> Self {
        Self::new(MockBehavior::Unavailable)
    }

    /// Override the behavior for one model
    pub fn with_model_behavior(mut self, model: impl Into<String>, behavior: MockBehavior) -> Self {
        self.model_behaviors.insert(model.into(), behavior);
        self
    }

    /// Override the behavior of every batch call
    pub fn with_batch_behavior(mut self, behavior: MockBehavior) -> Self {
        self.batch_behavior = Some(behavior);
        self
    }

    /// Make a source text untranslatable by every model
    pub fn with_failing_text(mut self, text: impl Into<String>) -> Self {
        self.failing_texts.insert(text.into());
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Translation produced for a text by working behaviors
    pub fn translated_text(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Number of single-item calls made
    pub fn single_calls(&self) -> usize {
        self.calls.lock().iter().filter(|c| c.kind == CallKind::Single).count()
    }

    /// Number of batch calls made
    pub fn batch_calls(&self) -> usize {
        self.calls.lock().iter().filter(|c| c.kind == CallKind::Batch).count()
    }

    /// Models used by single-item calls, in order
    pub fn single_call_models(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.kind == CallKind::Single)
            .map(|c| c.model.clone())
            .collect()
    }

    fn record(&self, kind: CallKind, model: &str, size: usize) -> usize {
        self.calls.lock().push(MockCall {
            kind,
            model: model.to_string(),
            size,
        });
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    fn behavior_for(&self, kind: CallKind, model: &str) -> MockBehavior {
        if kind == CallKind::Batch {
            if let Some(behavior) = self.batch_behavior {
                return behavior;
            }
        }
        self.model_behaviors.get(model).copied().unwrap_or(self.behavior)
    }

    fn produce(&self, text: &str, target_language: &str, model: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(&MockRequest {
                text: text.to_string(),
                target_language: target_language.to_string(),
                model: model.to_string(),
            }),
            None => Self::translated_text(text, target_language),
        }
    }

    /// Shared failure modes; `None` means the call should produce output
    fn simulate(&self, behavior: MockBehavior, count: usize) -> Option<ProviderError> {
        match behavior {
            MockBehavior::Failing => Some(ProviderError::from_status(500, "Simulated provider failure")),
            MockBehavior::Malformed => Some(ProviderError::ResponseMalformed(
                "Simulated undecodable response".to_string(),
            )),
            MockBehavior::Unavailable => Some(ProviderError::Unavailable("mock".to_string())),
            MockBehavior::Intermittent { fail_every } if fail_every > 0 && count % fail_every == fail_every - 1 => {
                Some(ProviderError::from_status(
                    503,
                    &format!("Simulated intermittent failure (request #{})", count + 1),
                ))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    async fn translate_one(
        &self,
        text: &str,
        target_language: &str,
        model: &str,
    ) -> Result<String, ProviderError> {
        let count = self.record(CallKind::Single, model, 1);
        let behavior = self.behavior_for(CallKind::Single, model);

        if let Some(error) = self.simulate(behavior, count) {
            return Err(error);
        }
        if self.failing_texts.contains(text) {
            return Err(ProviderError::from_status(500, "Simulated untranslatable text"));
        }

        Ok(match behavior {
            MockBehavior::Echo => text.to_string(),
            MockBehavior::Empty => String::new(),
            _ => self.produce(text, target_language, model),
        })
    }

    async fn translate_batch(
        &self,
        items: &[BatchItem],
        target_language: &str,
        model: &str,
    ) -> Result<TranslationResult, ProviderError> {
        let count = self.record(CallKind::Batch, model, items.len());
        let behavior = self.behavior_for(CallKind::Batch, model);

        if let Some(error) = self.simulate(behavior, count) {
            return Err(error);
        }

        let result = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !self.failing_texts.contains(&item.text))
            .filter(|(i, _)| behavior != MockBehavior::PartialBatch || i % 2 == 0)
            .map(|(_, item)| {
                let text = match behavior {
                    MockBehavior::Echo => item.text.clone(),
                    MockBehavior::Empty => String::new(),
                    _ => self.produce(&item.text, target_language, model),
                };
                (item.key.clone(), text)
            })
            .collect();

        Ok(result)
    }

    async fn check_available(&self) -> Result<(), ProviderError> {
        if self.behavior == MockBehavior::Unavailable {
            return Err(ProviderError::Unavailable("mock".to_string()));
        }
        Ok(())
    }
}
