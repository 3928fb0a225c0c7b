//! Negation of another predicate.
//!
//! Catalog records mark a predicate as inverse with a leading `!`; the
//! parser wraps those in an InvertedPredicate.

use crate::context::RequestContext;
use crate::traits::{TargetingPredicate, TargetingPredicateResult};
use anyhow::Result;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct InvertedPredicate {
    inner: Arc<dyn TargetingPredicate>,
    name: String,
}

impl InvertedPredicate {
    pub fn new(inner: impl TargetingPredicate + 'static) -> Self {
        Self::from_shared(Arc::new(inner))
    }

    pub fn from_shared(inner: Arc<dyn TargetingPredicate>) -> Self {
        let name = format!("Not({})", inner.name());
        Self { inner, name }
    }
}

impl TargetingPredicate for InvertedPredicate {
    fn name(&self) -> &str {
        &self.name
    }

    /// Errors from the wrapped predicate pass through untouched.
    fn evaluate(&self, context: &RequestContext) -> Result<TargetingPredicateResult> {
        Ok(self.inner.evaluate(context)?.invert())
    }
}
