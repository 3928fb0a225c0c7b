//! Core traits for targeting evaluation.
//!
//! This module defines the TargetingPredicate trait that lets arbitrary
//! business rules be plugged into a TargetingGroup, and the tri-state
//! result those rules produce.

use crate::context::RequestContext;
use anyhow::Result;
use std::fmt::Debug;

/// Outcome of evaluating a predicate (or a whole group) against a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetingPredicateResult {
    True,
    False,
    /// The predicate could not decide, e.g. missing customer information.
    Indeterminate,
}

impl TargetingPredicateResult {
    /// Only `True` counts as holding; `Indeterminate` does not.
    pub fn is_true(self) -> bool {
        matches!(self, TargetingPredicateResult::True)
    }

    /// Swap `True` and `False`. `Indeterminate` stays as it is.
    pub fn invert(self) -> Self {
        match self {
            TargetingPredicateResult::True => TargetingPredicateResult::False,
            TargetingPredicateResult::False => TargetingPredicateResult::True,
            TargetingPredicateResult::Indeterminate => TargetingPredicateResult::Indeterminate,
        }
    }
}

impl From<bool> for TargetingPredicateResult {
    fn from(value: bool) -> Self {
        if value {
            TargetingPredicateResult::True
        } else {
            TargetingPredicateResult::False
        }
    }
}

/// Core trait for targeting rules.
///
/// All predicates must implement this trait to be attached to a TargetingGroup.
///
/// ## Design Note
/// - `Send + Sync` lets the evaluator run predicates on worker threads
/// - `evaluate` may block (remote lookups, computation); it runs on the
///   tokio blocking pool, never on an async worker
/// - Returning `Err` means the rule itself failed. That is not the same
///   as the rule not holding, which is `Ok(TargetingPredicateResult::False)`
pub trait TargetingPredicate: Send + Sync + Debug {
    /// Returns the name of this predicate (for logging/debugging)
    fn name(&self) -> &str;

    /// Evaluate this predicate for a request context.
    ///
    /// # Arguments
    /// * `context` - Customer and marketplace the decision is made for
    ///
    /// # Returns
    /// * `Ok(TargetingPredicateResult)` - Whether the rule holds
    /// * `Err` - If the rule could not be evaluated
    fn evaluate(&self, context: &RequestContext) -> Result<TargetingPredicateResult>;
}
