//! Predicates over the customer in the request context.

use crate::context::RequestContext;
use crate::traits::{TargetingPredicate, TargetingPredicateResult};
use anyhow::Result;
use std::collections::HashSet;

/// Holds when the request customer is on an allow-list.
#[derive(Debug, Clone)]
pub struct CustomerPredicate {
    customers: HashSet<String>,
}

impl CustomerPredicate {
    pub fn new<I, S>(customers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            customers: customers.into_iter().map(Into::into).collect(),
        }
    }
}

impl TargetingPredicate for CustomerPredicate {
    fn name(&self) -> &str {
        "CustomerPredicate"
    }

    fn evaluate(&self, context: &RequestContext) -> Result<TargetingPredicateResult> {
        Ok(self.customers.contains(context.customer_id()).into())
    }
}

/// Holds when the request carries a customer id, i.e. the customer is signed in.
///
/// Without a customer id we cannot tell, so the result is `Indeterminate`.
#[derive(Debug, Clone, Copy)]
pub struct RecognizedCustomerPredicate;

impl TargetingPredicate for RecognizedCustomerPredicate {
    fn name(&self) -> &str {
        "RecognizedCustomerPredicate"
    }

    fn evaluate(&self, context: &RequestContext) -> Result<TargetingPredicateResult> {
        if context.customer_id().trim().is_empty() {
            Ok(TargetingPredicateResult::Indeterminate)
        } else {
            Ok(TargetingPredicateResult::True)
        }
    }
}
