//! Error types for targeting evaluation.

use thiserror::Error;
use tokio::task::JoinError;

/// Errors that stop a targeting group from being evaluated.
///
/// Neither variant means "the group is not eligible"; that is a normal
/// `TargetingPredicateResult::False`.
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// A predicate's own evaluation failed
    #[error("Predicate {predicate} failed to evaluate: {source}")]
    Predicate {
        predicate: String,
        #[source]
        source: anyhow::Error,
    },

    /// An evaluation task panicked or was cancelled before it reported back
    #[error("Predicate evaluation task failed: {0}")]
    Task(#[from] JoinError),
}
