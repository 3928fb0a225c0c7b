//! Targeting groups: the predicates and click-through rate attached to one
//! advertisement content item.

use crate::traits::TargetingPredicate;
use std::sync::Arc;

/// A set of targeting predicates plus the CTR used to rank the group.
///
/// A content item may own any number of groups. Cloning a group is cheap;
/// the predicates are shared behind `Arc` so evaluation tasks can hold them.
#[derive(Debug, Clone)]
pub struct TargetingGroup {
    pub targeting_group_id: String,
    /// Foreign key to the owning AdvertisementContent
    pub content_id: String,
    /// Relative ranking weight. Finite and non-negative.
    pub click_through_rate: f64,
    pub predicates: Vec<Arc<dyn TargetingPredicate>>,
}

impl TargetingGroup {
    /// Create a group with no predicates, which is trivially eligible.
    pub fn new(
        targeting_group_id: impl Into<String>,
        content_id: impl Into<String>,
        click_through_rate: f64,
    ) -> Self {
        Self {
            targeting_group_id: targeting_group_id.into(),
            content_id: content_id.into(),
            click_through_rate,
            predicates: Vec::new(),
        }
    }

    /// Add a predicate to the group (builder pattern).
    pub fn with_predicate(mut self, predicate: impl TargetingPredicate + 'static) -> Self {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Add an already shared predicate to the group.
    pub fn with_shared_predicate(mut self, predicate: Arc<dyn TargetingPredicate>) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Arc<dyn TargetingPredicate>] {
        &self.predicates
    }
}
