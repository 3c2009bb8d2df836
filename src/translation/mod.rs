/*!
 * Translation reconciliation engine.
 *
 * This module keeps target locales in step with the baseline locale. It is
 * split into several submodules:
 *
 * - `reconciler`: key-set diffing
 * - `fallback`: ordered model fallback and output acceptance
 * - `prompts`: prompt building and batch payload encoding/decoding
 * - `batch`: one structured call over the whole missing set
 * - `individual`: paced per-key translation
 * - `orchestrator`: the per-locale flow tying the above together
 */

// Re-export main types for easier usage
pub use self::batch::BatchTranslator;
pub use self::fallback::{ChainSuccess, ModelChain};
pub use self::individual::{IndividualOutcome, IndividualTranslator, PacingPolicy};
pub use self::orchestrator::{ReconciliationService, ReconciliationStats};
pub use self::reconciler::compute_missing;

// Submodules
pub mod batch;
pub mod fallback;
pub mod individual;
pub mod orchestrator;
pub mod prompts;
pub mod reconciler;
