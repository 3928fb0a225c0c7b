//! Targeting evaluation for advertisement selection.
//!
//! This crate provides:
//! - RequestContext, the customer/marketplace pair a decision is made for
//! - TargetingPredicate trait and built-in predicate implementations
//! - TargetingGroup, a set of predicates plus a click-through rate
//! - TargetingEvaluator, which decides whether a whole group holds
//!
//! ## Architecture
//! A targeting group is eligible when every one of its predicates evaluates
//! to `True` for the request context. The evaluator fans the predicates out
//! onto the tokio blocking pool and stops at the first predicate that does
//! not hold.
//!
//! ## Example Usage
//! ```ignore
//! use targeting::{RequestContext, TargetingEvaluator, TargetingGroup};
//! use targeting::predicates::*;
//!
//! let group = TargetingGroup::new("tg-1", "content-1", 0.25)
//!     .with_predicate(MarketplacePredicate::new(["US", "CA"]))
//!     .with_predicate(RecognizedCustomerPredicate);
//!
//! let evaluator = TargetingEvaluator::new(RequestContext::new("customer-1", "US"))
//!     .with_max_concurrency(4);
//! let result = evaluator.evaluate(&group).await?;
//! assert!(result.is_true());
//! ```

pub mod context;
pub mod error;
pub mod evaluator;
pub mod group;
pub mod predicates;
pub mod traits;

// Re-export main types
pub use context::RequestContext;
pub use error::EvaluationError;
pub use evaluator::{DEFAULT_MAX_CONCURRENCY, TargetingEvaluator};
pub use group::TargetingGroup;
pub use traits::{TargetingPredicate, TargetingPredicateResult};
