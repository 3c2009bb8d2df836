/*!
 * Reconciliation of target locales against the baseline locale.
 *
 * Per locale: diff the key sets, resolve the missing keys with one batch
 * call, then resolve what is left one key at a time. Each key ends up in
 * exactly one of three states: resolved by the batch, resolved individually,
 * or failed.
 */

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use log::{error, info, warn};

use crate::database::KeyStore;
use crate::errors::ReconcileError;
use crate::language_utils;
use crate::providers::{BatchItem, TranslationProvider};

use super::batch::BatchTranslator;
use super::fallback::ModelChain;
use super::individual::{IndividualTranslator, PacingPolicy};
use super::reconciler::{compute_missing, count_present};

/// Outcome of reconciling one locale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationStats {
    /// Target locale
    pub locale: String,
    /// Baseline key count
    pub total: usize,
    /// Baseline keys present in the target after the run
    pub translated: usize,
    /// Keys still missing after the run
    pub failed: usize,
    /// Keys resolved by the batch call
    pub batch_resolved: usize,
    /// Keys resolved one by one
    pub individually_resolved: usize,
    /// Identifiers still missing, in order
    pub failed_keys: Vec<String>,
}

impl ReconciliationStats {
    /// Stats for a locale that needed no work
    fn complete(locale: &str, total: usize) -> Self {
        Self {
            locale: locale.to_string(),
            total,
            translated: total,
            ..Default::default()
        }
    }

    /// Whether every baseline key is present
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for ReconciliationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} translated, {} failed (batch {}, individual {})",
            self.locale,
            self.translated,
            self.total,
            self.failed,
            self.batch_resolved,
            self.individually_resolved
        )
    }
}

/// Reconciliation service tying the store, the provider and the model chain together
pub struct ReconciliationService {
    baseline: String,
    chain: ModelChain,
    provider: Arc<dyn TranslationProvider>,
    store: Arc<dyn KeyStore>,
    pacing: PacingPolicy,
}

impl ReconciliationService {
    /// Create a new service
    pub fn new(
        baseline: impl Into<String>,
        models: Vec<String>,
        provider: Arc<dyn TranslationProvider>,
        store: Arc<dyn KeyStore>,
        pacing: PacingPolicy,
    ) -> Self {
        Self {
            baseline: baseline.into(),
            chain: ModelChain::new(models),
            provider,
            store,
            pacing,
        }
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    /// Dry run: identifiers the target lacks, without translating
    pub async fn missing_keys(&self, target: &str) -> Result<BTreeSet<String>, ReconcileError> {
        if target == self.baseline {
            return Ok(BTreeSet::new());
        }
        let baseline_keys = self.store.list_keys(&self.baseline).await?;
        let target_keys = self.store.list_keys(target).await?;
        Ok(compute_missing(&baseline_keys, &target_keys))
    }

    /// Reconcile one locale without progress reporting
    pub async fn reconcile_locale(&self, target: &str) -> Result<ReconciliationStats, ReconcileError> {
        self.reconcile_locale_with_progress(target, |_, _| {}).await
    }

    /// Reconcile one locale, reporting `(done, total)` for the per-key phase
    pub async fn reconcile_locale_with_progress(
        &self,
        target: &str,
        progress: impl Fn(usize, usize),
    ) -> Result<ReconciliationStats, ReconcileError> {
        let baseline_texts = self.store.export_locale(&self.baseline).await?;
        let total = baseline_texts.len();

        if target == self.baseline {
            return Ok(ReconciliationStats::complete(target, total));
        }

        let target_language = language_utils::get_language_name(target)
            .map_err(|_| ReconcileError::UnsupportedLocale(target.to_string()))?;

        let baseline_keys: BTreeSet<String> = baseline_texts.keys().cloned().collect();
        let target_keys = self.store.list_keys(target).await?;
        let missing = compute_missing(&baseline_keys, &target_keys);
        let present = count_present(&baseline_keys, &target_keys);

        if missing.is_empty() {
            info!("{} is up to date ({} keys)", target, total);
            return Ok(ReconciliationStats::complete(target, total));
        }

        info!("{} is missing {}/{} keys", target, missing.len(), total);

        let mut stats = ReconciliationStats {
            locale: target.to_string(),
            total,
            ..Default::default()
        };

        if let Err(e) = self.provider.check_available().await {
            warn!("Skipping {}: {}", target, e);
            stats.translated = present;
            stats.failed = missing.len();
            stats.failed_keys = missing.into_iter().collect();
            return Ok(stats);
        }

        let items = to_items(&missing, &baseline_texts);

        // Batch phase
        let batch_result = BatchTranslator::new(self.provider.as_ref(), &self.chain)
            .translate(&items, &target_language)
            .await;

        let mut remainder = Vec::new();
        for item in items {
            let Some(translated) = batch_result.get(&item.key) else {
                remainder.push(item);
                continue;
            };
            match self.store.upsert(target, &item.key, translated).await {
                Ok(()) => stats.batch_resolved += 1,
                Err(e) => {
                    error!("Failed to store {}:{}: {}", target, item.key, e);
                    remainder.push(item);
                }
            }
        }

        // Individual phase
        if !remainder.is_empty() {
            info!("Translating {} remaining keys for {} one by one", remainder.len(), target);

            let outcome = IndividualTranslator::new(
                self.provider.as_ref(),
                &self.chain,
                self.store.as_ref(),
                self.pacing,
            )
            .translate_all(&remainder, target, &target_language, progress)
            .await;

            stats.individually_resolved = outcome.resolved.len();
            stats.failed_keys = outcome.failed;
        }

        stats.failed = stats.failed_keys.len();
        stats.translated = present + stats.batch_resolved + stats.individually_resolved;

        info!("{}", stats);
        Ok(stats)
    }

    /// Reconcile each locale in turn, skipping the baseline
    ///
    /// A locale that cannot be reconciled is logged and reported with every
    /// missing key failed when that set can still be computed, otherwise it
    /// is left out. It never stops the remaining locales.
    pub async fn reconcile_all(&self, locales: &[String]) -> Vec<ReconciliationStats> {
        self.reconcile_all_with_progress(locales, |_, _, _| {}).await
    }

    /// Same as [`reconcile_all`](Self::reconcile_all), reporting
    /// `(locale, done, total)` for each per-key phase
    pub async fn reconcile_all_with_progress(
        &self,
        locales: &[String],
        progress: impl Fn(&str, usize, usize),
    ) -> Vec<ReconciliationStats> {
        let mut results = Vec::new();

        for locale in locales.iter().filter(|l| **l != self.baseline) {
            let outcome = self
                .reconcile_locale_with_progress(locale, |done, total| progress(locale, done, total))
                .await;

            match outcome {
                Ok(stats) => results.push(stats),
                Err(e) => {
                    error!("Failed to reconcile {}: {}", locale, e);
                    if let Ok(stats) = self.failed_stats(locale).await {
                        results.push(stats);
                    }
                }
            }
        }

        results
    }

    async fn failed_stats(&self, locale: &str) -> Result<ReconciliationStats, ReconcileError> {
        let baseline_keys = self.store.list_keys(&self.baseline).await?;
        let target_keys = self.store.list_keys(locale).await?;
        let missing = compute_missing(&baseline_keys, &target_keys);

        Ok(ReconciliationStats {
            locale: locale.to_string(),
            total: baseline_keys.len(),
            translated: count_present(&baseline_keys, &target_keys),
            failed: missing.len(),
            failed_keys: missing.into_iter().collect(),
            ..Default::default()
        })
    }
}

fn to_items(missing: &BTreeSet<String>, baseline_texts: &BTreeMap<String, String>) -> Vec<BatchItem> {
    missing
        .iter()
        .filter_map(|key| baseline_texts.get(key).map(|text| BatchItem::new(key.clone(), text.clone())))
        .collect()
}
