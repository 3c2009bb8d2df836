/*!
 * Tests for the error taxonomy and its conversions
 */

use locsync::errors::{ModelFailure, ProviderError, ReconcileError, StoreError};
use locsync::AllModelsFailed;

#[test]
fn test_providerError_display_shouldNameTheFailureKind() {
    assert!(ProviderError::Unavailable("openai".to_string()).to_string().contains("no credential"));
    assert!(ProviderError::ResponseMalformed("x".to_string()).to_string().contains("Malformed"));
    assert!(ProviderError::NoImprovement.to_string().contains("no improvement"));
}

#[test]
fn test_reconcileError_fromStoreError_shouldWrap() {
    let err: ReconcileError = StoreError::Persistence("locked".to_string()).into();
    assert!(matches!(err, ReconcileError::Store(StoreError::Persistence(_))));
    assert!(err.to_string().contains("locked"));
}

#[test]
fn test_storeError_import_shouldNameLocaleAndReason() {
    let err = StoreError::Import {
        locale: "de".to_string(),
        reason: "bad row".to_string(),
    };
    assert!(err.to_string().contains("Import into 'de' rolled back: bad row"));
}

#[test]
fn test_allModelsFailed_shouldListModelsInAttemptOrder() {
    let err = AllModelsFailed {
        attempts: vec![
            ModelFailure {
                model: "gpt-4o-mini".to_string(),
                error: ProviderError::CallFailed("status 500 - oops".to_string()),
            },
            ModelFailure {
                model: "gpt-4o".to_string(),
                error: ProviderError::NoImprovement,
            },
        ],
    };

    let text = err.to_string();
    let first = text.find("gpt-4o-mini").unwrap();
    let second = text.find("gpt-4o (").unwrap();
    assert!(first < second);
}
