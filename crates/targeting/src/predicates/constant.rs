//! Predicate with a fixed outcome.
//!
//! Used for groups that are switched on or off wholesale, e.g. a house ad
//! that always qualifies.

use crate::context::RequestContext;
use crate::traits::{TargetingPredicate, TargetingPredicateResult};
use anyhow::Result;

#[derive(Debug, Clone, Copy)]
pub struct ConstantPredicate {
    result: TargetingPredicateResult,
}

impl ConstantPredicate {
    pub fn new(result: TargetingPredicateResult) -> Self {
        Self { result }
    }

    pub fn always() -> Self {
        Self::new(TargetingPredicateResult::True)
    }

    pub fn never() -> Self {
        Self::new(TargetingPredicateResult::False)
    }
}

impl TargetingPredicate for ConstantPredicate {
    fn name(&self) -> &str {
        "ConstantPredicate"
    }

    fn evaluate(&self, _context: &RequestContext) -> Result<TargetingPredicateResult> {
        Ok(self.result)
    }
}
