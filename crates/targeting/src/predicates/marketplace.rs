//! Predicate restricting a group to a set of marketplaces.

use crate::context::RequestContext;
use crate::traits::{TargetingPredicate, TargetingPredicateResult};
use anyhow::Result;
use std::collections::HashSet;

/// Holds when the request marketplace is one of the allowed marketplaces.
///
/// ## Algorithm
/// Uses a HashSet of marketplace ids for O(1) lookups.
#[derive(Debug, Clone)]
pub struct MarketplacePredicate {
    allowed: HashSet<String>,
}

impl MarketplacePredicate {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl TargetingPredicate for MarketplacePredicate {
    fn name(&self) -> &str {
        "MarketplacePredicate"
    }

    fn evaluate(&self, context: &RequestContext) -> Result<TargetingPredicateResult> {
        Ok(self.allowed.contains(context.marketplace_id()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketplace_predicate() {
        let predicate = MarketplacePredicate::new(["US", "CA"]);

        let us = RequestContext::new("customer-1", "US");
        let jp = RequestContext::new("customer-1", "JP");

        assert!(predicate.evaluate(&us).unwrap().is_true());
        assert_eq!(predicate.evaluate(&jp).unwrap(), TargetingPredicateResult::False);
    }

    #[test]
    fn test_empty_allow_list_never_holds() {
        let predicate = MarketplacePredicate::new(Vec::<String>::new());
        let context = RequestContext::new("customer-1", "US");
        assert!(!predicate.evaluate(&context).unwrap().is_true());
    }
}
