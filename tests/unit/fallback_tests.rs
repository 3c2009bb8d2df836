/*!
 * Tests for the model fallback chain over real provider calls
 */

use locsync::errors::ProviderError;
use locsync::providers::mock::{MockBehavior, MockProvider};
use locsync::providers::TranslationProvider;
use locsync::translation::fallback::{accept_translation, ModelChain};

fn chain() -> ModelChain {
    ModelChain::new(["m1", "m2", "m3"])
}

/// First two candidates fail, the third produces distinct text
#[tokio::test]
async fn test_tryInOrder_withTwoFailures_shouldReturnThirdOutput() {
    let provider = MockProvider::working()
        .with_model_behavior("m1", MockBehavior::Failing)
        .with_model_behavior("m2", MockBehavior::Malformed);

    let success = chain()
        .try_in_order(|model| {
            let provider = &provider;
            async move {
                let text = provider.translate_one("Connect", "German", &model).await?;
                accept_translation("Connect", text)
            }
        })
        .await
        .unwrap();

    assert_eq!(success.value, "[German] Connect");
    assert_eq!(success.model, "m3");
    assert_eq!(success.attempts(), 3);
    assert_eq!(success.failures.len(), 2);
    assert_eq!(provider.single_calls(), 3);
}

/// Identical-to-source output is a failure and the chain moves on
#[tokio::test]
async fn test_tryInOrder_withEchoingCandidate_shouldProceed() {
    let provider = MockProvider::working().with_model_behavior("m1", MockBehavior::Echo);

    let success = chain()
        .try_in_order(|model| {
            let provider = &provider;
            async move {
                let text = provider.translate_one("Speed", "Russian", &model).await?;
                accept_translation("Speed", text)
            }
        })
        .await
        .unwrap();

    assert_eq!(success.model, "m2");
    assert_eq!(success.failures[0].error, ProviderError::NoImprovement);
    assert_eq!(provider.single_call_models(), vec!["m1", "m2"]);
}

#[tokio::test]
async fn test_tryInOrder_withEveryCandidateEmpty_shouldExhaust() {
    let provider = MockProvider::new(MockBehavior::Empty);

    let err = chain()
        .try_in_order(|model| {
            let provider = &provider;
            async move {
                let text = provider.translate_one("Up", "French", &model).await?;
                accept_translation("Up", text)
            }
        })
        .await
        .unwrap_err();

    assert_eq!(err.attempts.len(), 3);
    assert!(err.attempts.iter().all(|a| a.error == ProviderError::NoImprovement));
}
