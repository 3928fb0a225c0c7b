//! Error types for advertisement selection.

use catalog::CatalogError;
use targeting::EvaluationError;
use thiserror::Error;

/// Reasons a selection could not complete.
///
/// "No eligible advertisement" is not an error; it is
/// `GeneratedAdvertisement::Empty`.
#[derive(Error, Debug)]
pub enum SelectionError {
    /// A content or targeting group lookup failed
    #[error("Catalog lookup failed: {0}")]
    Store(#[from] CatalogError),

    /// A targeting group could not be evaluated
    #[error("Targeting evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
}
