//! # Advertisement Selection
//!
//! This module coordinates a single selection request:
//! 1. Validate the marketplace id
//! 2. Fetch candidate content for the marketplace
//! 3. Fetch and flatten the targeting groups of every candidate
//! 4. Rank groups by click-through rate, highest first
//! 5. Evaluate groups in rank order until one is eligible
//! 6. Resolve the winning group back to its content
//!
//! Groups are evaluated one at a time; only the predicates inside a group
//! run concurrently. Every call builds its own TargetingEvaluator bound to
//! that call's RequestContext.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use catalog::{AdvertisementContent, ReadableDao};
use targeting::{DEFAULT_MAX_CONCURRENCY, RequestContext, TargetingEvaluator, TargetingGroup};

use crate::error::SelectionError;

type ContentStore = Arc<dyn ReadableDao<str, Vec<AdvertisementContent>>>;
type TargetingGroupStore = Arc<dyn ReadableDao<str, Vec<TargetingGroup>>>;

/// Result of a selection request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedAdvertisement {
    /// No advertisement is eligible for this customer and marketplace
    Empty,
    Selected { content: AdvertisementContent },
}

impl GeneratedAdvertisement {
    pub fn content(&self) -> Option<&AdvertisementContent> {
        match self {
            GeneratedAdvertisement::Empty => None,
            GeneratedAdvertisement::Selected { content } => Some(content),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GeneratedAdvertisement::Empty)
    }
}

/// Picks the advertisement to render for a customer and marketplace.
///
/// Cloning is cheap (the stores are shared), and clones may serve
/// concurrent requests for different customers.
#[derive(Clone)]
pub struct AdvertisementSelector {
    content_dao: ContentStore,
    targeting_group_dao: TargetingGroupStore,
    max_concurrent_predicates: usize,
}

impl AdvertisementSelector {
    /// Create a selector over the two read-only stores
    ///
    /// # Arguments
    /// * `content_dao` - Content lookup keyed by marketplace id
    /// * `targeting_group_dao` - Targeting group lookup keyed by content id
    pub fn new(content_dao: ContentStore, targeting_group_dao: TargetingGroupStore) -> Self {
        Self {
            content_dao,
            targeting_group_dao,
            max_concurrent_predicates: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Configure the per-group cap on concurrently evaluated predicates (default: 8)
    pub fn with_max_concurrent_predicates(mut self, max: usize) -> Self {
        self.max_concurrent_predicates = max.max(1);
        self
    }

    /// Main entry point: select the advertisement for a customer
    ///
    /// # Arguments
    /// * `customer_id` - The customer to select an advertisement for
    /// * `marketplace_id` - The marketplace the advertisement is rendered on
    ///
    /// # Returns
    /// * `Ok(Selected)` - Content of the highest-CTR eligible targeting group
    /// * `Ok(Empty)` - Empty marketplace id, no candidates, or nothing eligible
    /// * `Err` - A store lookup or predicate evaluation failed
    #[instrument(skip(self))]
    pub async fn select_advertisement(
        &self,
        customer_id: &str,
        marketplace_id: &str,
    ) -> Result<GeneratedAdvertisement, SelectionError> {
        let start_time = Instant::now();

        if marketplace_id.is_empty() {
            warn!("MarketplaceId cannot be empty, returning empty ad");
            return Ok(GeneratedAdvertisement::Empty);
        }

        let contents = self.content_dao.get(marketplace_id)?;
        debug!("Fetched {} candidate contents", contents.len());

        let groups = self.fetch_candidate_groups(&contents)?;
        let ranked = rank_groups(groups);
        debug!("Ranked {} targeting groups", ranked.len());

        let evaluator = TargetingEvaluator::new(RequestContext::new(customer_id, marketplace_id))
            .with_max_concurrency(self.max_concurrent_predicates);

        for group in &ranked {
            if !evaluator.evaluate(group).await?.is_true() {
                continue;
            }

            match contents.iter().find(|c| c.content_id == group.content_id) {
                Some(content) => {
                    info!(
                        "Selected content {} via targeting group {} (ctr {:.3}) in {:.2?}",
                        content.content_id,
                        group.targeting_group_id,
                        group.click_through_rate,
                        start_time.elapsed()
                    );
                    return Ok(GeneratedAdvertisement::Selected {
                        content: content.clone(),
                    });
                }
                None => warn!(
                    "Eligible targeting group {} references unknown content {}",
                    group.targeting_group_id, group.content_id
                ),
            }
        }

        info!(
            "No eligible advertisement among {} targeting groups ({:.2?})",
            ranked.len(),
            start_time.elapsed()
        );
        Ok(GeneratedAdvertisement::Empty)
    }

    /// Fetch the targeting groups of every candidate, in candidate order
    fn fetch_candidate_groups(
        &self,
        contents: &[AdvertisementContent],
    ) -> Result<Vec<TargetingGroup>, SelectionError> {
        let mut groups = Vec::new();
        for content in contents {
            groups.extend(self.targeting_group_dao.get(&content.content_id)?);
        }
        Ok(groups)
    }
}

/// Sort groups by click-through rate DESC.
///
/// The sort is stable, so equal rates keep their input order and the
/// first-seen content wins a tie.
fn rank_groups(mut groups: Vec<TargetingGroup>) -> Vec<TargetingGroup> {
    groups.sort_by(|a, b| {
        b.click_through_rate
            .partial_cmp(&a.click_through_rate)
            .unwrap_or(Ordering::Equal)
    });
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogIndex, ContentDao, TargetingGroupDao};

    fn build_selector(index: CatalogIndex) -> AdvertisementSelector {
        let index = Arc::new(index);
        AdvertisementSelector::new(
            Arc::new(ContentDao::new(index.clone())),
            Arc::new(TargetingGroupDao::new(index)),
        )
    }

    fn ids(groups: &[TargetingGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.targeting_group_id.as_str()).collect()
    }

    #[test]
    fn test_rank_groups_sorts_by_ctr_descending() {
        let groups = vec![
            TargetingGroup::new("a", "c-a", 0.10),
            TargetingGroup::new("b", "c-b", 0.30),
            TargetingGroup::new("c", "c-c", 0.20),
        ];

        let ranked = rank_groups(groups);
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_groups_keeps_input_order_on_ties() {
        let groups = vec![
            TargetingGroup::new("first", "c-1", 0.5),
            TargetingGroup::new("low", "c-2", 0.1),
            TargetingGroup::new("second", "c-3", 0.5),
            TargetingGroup::new("third", "c-1", 0.5),
        ];

        let ranked = rank_groups(groups);
        assert_eq!(ids(&ranked), vec!["first", "second", "third", "low"]);
    }

    #[test]
    fn test_rank_groups_handles_empty_input() {
        assert!(rank_groups(Vec::new()).is_empty());
    }

    #[test]
    fn test_fetch_candidate_groups_flattens_in_content_order() {
        let mut index = CatalogIndex::new();
        index.insert_content(AdvertisementContent::new("c-1", "US", "<div/>"));
        index.insert_content(AdvertisementContent::new("c-2", "US", "<div/>"));
        index.insert_content(AdvertisementContent::new("c-3", "US", "<div/>"));
        index.insert_targeting_group(TargetingGroup::new("tg-2a", "c-2", 0.1));
        index.insert_targeting_group(TargetingGroup::new("tg-1a", "c-1", 0.1));
        index.insert_targeting_group(TargetingGroup::new("tg-2b", "c-2", 0.1));

        let contents = index.get_contents("US").to_vec();
        let selector = build_selector(index);

        let groups = selector.fetch_candidate_groups(&contents).unwrap();
        assert_eq!(ids(&groups), vec!["tg-1a", "tg-2a", "tg-2b"]);
    }

    #[test]
    fn test_generated_advertisement_helpers() {
        let content = AdvertisementContent::new("c-1", "US", "<div/>");
        let selected = GeneratedAdvertisement::Selected {
            content: content.clone(),
        };

        assert!(GeneratedAdvertisement::Empty.is_empty());
        assert!(GeneratedAdvertisement::Empty.content().is_none());
        assert!(!selected.is_empty());
        assert_eq!(selected.content(), Some(&content));
    }

    #[test]
    fn test_max_concurrent_predicates_is_at_least_one() {
        let selector = build_selector(CatalogIndex::new()).with_max_concurrent_predicates(0);
        assert_eq!(selector.max_concurrent_predicates, 1);
    }
}
