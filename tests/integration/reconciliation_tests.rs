/*!
 * End-to-end reconciliation tests against the scripted provider
 */

use std::collections::BTreeSet;
use std::sync::Arc;

use locsync::database::{get_statistics, KeyStore, Repository};
use locsync::providers::mock::{CallKind, MockBehavior, MockProvider, MockRequest};
use locsync::translation::{PacingPolicy, ReconciliationService};

use crate::common;

fn service(provider: &MockProvider, repo: &Repository, models: &[&str]) -> ReconciliationService {
    ReconciliationService::new(
        "en",
        models.iter().map(|m| m.to_string()).collect(),
        Arc::new(provider.clone()),
        Arc::new(repo.clone()),
        PacingPolicy::none(),
    )
}

fn russian(request: &MockRequest) -> String {
    match request.text.as_str() {
        "Up" => "Вверх".to_string(),
        "Speed" => "Скорость".to_string(),
        other => format!("[{}] {}", request.target_language, other),
    }
}

/// en = {speed, up}, ru = {speed}; the batch resolves up → Вверх
#[tokio::test]
async fn test_reconcileLocale_workedExample_shouldCompleteRussian() {
    common::init_logger();
    let repo = common::repository_with(&[
        ("en", "common.speed", "Speed"),
        ("en", "common.up", "Up"),
        ("ru", "common.speed", "Скорость"),
    ])
    .await;
    let provider = MockProvider::working().with_custom_response(russian);
    let service = service(&provider, &repo, &["gpt-4o-mini"]);

    assert_eq!(
        service.missing_keys("ru").await.unwrap(),
        BTreeSet::from(["common.up".to_string()])
    );

    let stats = service.reconcile_locale("ru").await.unwrap();

    assert_eq!((stats.total, stats.translated, stats.failed), (2, 2, 0));
    assert_eq!(stats.batch_resolved, 1);
    assert_eq!(
        repo.export_locale("ru").await.unwrap(),
        common::text_map(&[("common.speed", "Скорость"), ("common.up", "Вверх")])
    );
}

#[tokio::test]
async fn test_reconcileLocale_withBaselineTarget_shouldBeNoOp() {
    let repo = common::repository_with(&common::english_baseline()).await;
    let provider = MockProvider::working();

    let stats = service(&provider, &repo, &["m1"]).reconcile_locale("en").await.unwrap();

    assert_eq!(stats.failed, 0);
    assert_eq!(stats.translated, 5);
    assert_eq!(stats.total, 5);
    assert!(provider.calls().is_empty());
    assert_eq!(repo.list_locales().await.unwrap(), vec!["en".to_string()]);
}

#[tokio::test]
async fn test_reconcileLocale_afterFullSuccess_targetKeysShouldEqualBaseline() {
    let mut entries = common::english_baseline();
    entries.push(("de", "vpn.connect", "Verbinden"));
    let repo = common::repository_with(&entries).await;
    let provider = MockProvider::working();

    let before = repo.list_keys("de").await.unwrap();
    let baseline = repo.list_keys("en").await.unwrap();
    let stats = service(&provider, &repo, &["m1"]).reconcile_locale("de").await.unwrap();

    assert_eq!(stats.total - (before.len()), 4);
    assert!(stats.is_complete());
    assert_eq!(repo.list_keys("de").await.unwrap(), baseline);
    // Existing text is never overwritten
    assert_eq!(repo.get_text("de", "vpn.connect").await.unwrap().as_deref(), Some("Verbinden"));
}

#[tokio::test]
async fn test_reconcileLocale_withStaleTargetKeys_shouldIgnoreThem() {
    let mut entries = common::english_baseline();
    entries.push(("fr", "legacy.removed", "Supprimé"));
    let repo = common::repository_with(&entries).await;
    let provider = MockProvider::working();

    let stats = service(&provider, &repo, &["m1"]).reconcile_locale("fr").await.unwrap();

    assert_eq!(stats.translated, 5);
    assert_eq!(stats.total, 5);
    assert_eq!(repo.count_keys("fr").await.unwrap(), 6);
}

/// A fully successful batch must not be followed by any single-item call
#[tokio::test]
async fn test_reconcileLocale_withCompleteBatch_shouldMakeNoSingleCalls() {
    let repo = common::repository_with(&common::english_baseline()).await;
    let provider = MockProvider::working();

    let stats = service(&provider, &repo, &["m1", "m2"]).reconcile_locale("es").await.unwrap();

    assert_eq!(stats.batch_resolved, 5);
    assert_eq!(stats.individually_resolved, 0);
    assert_eq!(provider.batch_calls(), 1);
    assert_eq!(provider.single_calls(), 0);
}

/// Batch exhausted on every model; each key then walks the chain to m3
#[tokio::test]
async fn test_reconcileLocale_withBatchDown_shouldFallBackPerKey() {
    let repo = common::repository_with(&common::english_baseline()).await;
    let provider = MockProvider::working()
        .with_batch_behavior(MockBehavior::Failing)
        .with_model_behavior("m1", MockBehavior::Failing)
        .with_model_behavior("m2", MockBehavior::Echo);

    let stats = service(&provider, &repo, &["m1", "m2", "m3"]).reconcile_locale("zh").await.unwrap();

    assert_eq!(stats.batch_resolved, 0);
    assert_eq!(stats.individually_resolved, 5);
    assert_eq!(stats.failed, 0);
    assert_eq!(provider.batch_calls(), 3);
    assert_eq!(provider.single_calls(), 15);
    assert_eq!(
        repo.get_text("zh", "common.up").await.unwrap().as_deref(),
        Some("[Chinese] Up")
    );
}

#[tokio::test]
async fn test_reconcileLocale_withUntranslatableKey_shouldReportItFailed() {
    let repo = common::repository_with(&common::english_baseline()).await;
    let provider = MockProvider::working().with_failing_text("Disconnect");

    let stats = service(&provider, &repo, &["m1", "m2"]).reconcile_locale("ru").await.unwrap();

    assert_eq!(stats.total, 5);
    assert_eq!(stats.translated, 4);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.failed_keys, vec!["vpn.disconnect".to_string()]);
    assert_eq!(provider.single_call_models(), vec!["m1", "m2"]);

    // A second run only retries what is still missing
    let again = service(&provider, &repo, &["m1", "m2"]).reconcile_locale("ru").await.unwrap();
    assert_eq!(again.failed_keys, vec!["vpn.disconnect".to_string()]);
    let last_batch = provider.calls().into_iter().filter(|c| c.kind == CallKind::Batch).last();
    assert_eq!(last_batch.map(|c| c.size), Some(1));
}

fn prefixed(request: &MockRequest) -> String {
    format!("X{}", request.text)
}

/// Trailing whitespace in a translation is stored as produced, on both paths
#[tokio::test]
async fn test_reconcileLocale_withTrailingSpace_shouldStoreItUnchanged() {
    let repo = common::repository_with(&[("en", "form.label", "Speed: "), ("en", "form.hint", " Up")]).await;
    let batch = MockProvider::working().with_custom_response(prefixed);
    let single = MockProvider::working()
        .with_batch_behavior(MockBehavior::Failing)
        .with_custom_response(prefixed);

    service(&batch, &repo, &["m1"]).reconcile_locale("ru").await.unwrap();
    service(&single, &repo, &["m1"]).reconcile_locale("de").await.unwrap();

    for locale in ["ru", "de"] {
        assert_eq!(
            repo.export_locale(locale).await.unwrap(),
            common::text_map(&[("form.hint", "X Up"), ("form.label", "XSpeed: ")])
        );
    }
    assert_eq!(single.single_calls(), 2);
}

#[tokio::test]
async fn test_reconcileLocale_withEchoEverywhere_shouldWriteNothing() {
    let repo = common::repository_with(&common::english_baseline()).await;
    let provider = MockProvider::echo();

    let stats = service(&provider, &repo, &["m1", "m2"]).reconcile_locale("de").await.unwrap();

    assert_eq!(stats.failed, 5);
    assert_eq!(stats.translated, 0);
    assert_eq!(repo.count_keys("de").await.unwrap(), 0);
}

#[tokio::test]
async fn test_reconcileAll_thenStatistics_shouldShowEveryLocaleComplete() {
    let repo = common::repository_with(&common::english_baseline()).await;
    let provider = MockProvider::working();
    let locales: Vec<String> = ["en", "ru", "de", "fr"].iter().map(|l| l.to_string()).collect();

    let results = service(&provider, &repo, &["m1"]).reconcile_all(&locales).await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|s| s.is_complete()));

    let stats = get_statistics(&repo, "en", &locales).await.unwrap();
    assert!(stats.iter().all(|s| s.is_complete()));
    assert_eq!(stats[1].to_string(), "ru: 5/5 (100.0%)");
}

/// An unreconcilable locale still appears in the summary with its missing keys failed
#[tokio::test]
async fn test_reconcileAllWithProgress_withBadLocale_shouldReportItFailed() {
    let mut entries = common::english_baseline();
    entries.push(("zz", "common.up", "Hoch"));
    let repo = common::repository_with(&entries).await;
    let provider = MockProvider::working().with_batch_behavior(MockBehavior::Failing);
    let locales: Vec<String> = ["en", "zz", "ru"].iter().map(|l| l.to_string()).collect();
    let seen = parking_lot::Mutex::new(Vec::new());

    let results = service(&provider, &repo, &["m1"])
        .reconcile_all_with_progress(&locales, |locale, done, total| {
            seen.lock().push((locale.to_string(), done, total));
        })
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].locale, "zz");
    assert_eq!((results[0].total, results[0].translated, results[0].failed), (5, 1, 4));
    assert!(!results[0].failed_keys.contains(&"common.up".to_string()));
    assert!(results[1].is_complete());

    let seen = seen.into_inner();
    assert!(seen.iter().all(|(locale, _, total)| locale == "ru" && *total == 5));
    assert_eq!(seen.last().map(|(_, done, _)| *done), Some(5));
}
