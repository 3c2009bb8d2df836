/*!
 * Key-set diffing between the baseline locale and a target locale.
 */

use std::collections::BTreeSet;

/// Identifiers present in the baseline but absent from the target, in order
pub fn compute_missing(baseline_keys: &BTreeSet<String>, target_keys: &BTreeSet<String>) -> BTreeSet<String> {
    baseline_keys.difference(target_keys).cloned().collect()
}

/// Number of target identifiers that the baseline also has
pub fn count_present(baseline_keys: &BTreeSet<String>, target_keys: &BTreeSet<String>) -> usize {
    baseline_keys.intersection(target_keys).count()
}
