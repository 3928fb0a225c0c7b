//! Core catalog types.
//!
//! AdvertisementContent is the creative that gets rendered; CatalogIndex is
//! the in-memory store holding content per marketplace and targeting groups
//! per content id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use targeting::TargetingGroup;

/// One advertisement creative.
///
/// The renderable data is opaque to selection; it is handed back to the
/// caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisementContent {
    pub content_id: String,
    pub marketplace_id: String,
    pub renderable_data: String,
}

impl AdvertisementContent {
    pub fn new(
        content_id: impl Into<String>,
        marketplace_id: impl Into<String>,
        renderable_data: impl Into<String>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            marketplace_id: marketplace_id.into(),
            renderable_data: renderable_data.into(),
        }
    }
}

// =============================================================================
// CatalogIndex - In-Memory Store
// =============================================================================

/// Holds every content item and targeting group, indexed for the two lookups
/// selection needs. Each list keeps insertion order, which is the order the
/// selector sees candidates in.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    /// Content items offered in each marketplace
    pub(crate) contents_by_marketplace: HashMap<String, Vec<AdvertisementContent>>,
    /// Targeting groups owned by each content item
    pub(crate) groups_by_content: HashMap<String, Vec<TargetingGroup>>,
    /// Marketplace of each content id (first registration wins)
    pub(crate) marketplace_by_content: HashMap<String, String>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all content for a marketplace. Empty if the marketplace is unknown.
    pub fn get_contents(&self, marketplace_id: &str) -> &[AdvertisementContent] {
        self.contents_by_marketplace
            .get(marketplace_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all targeting groups for a content item. Empty if it has none.
    pub fn get_targeting_groups(&self, content_id: &str) -> &[TargetingGroup] {
        self.groups_by_content
            .get(content_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get a content item by id
    pub fn get_content(&self, content_id: &str) -> Option<&AdvertisementContent> {
        let marketplace_id = self.marketplace_by_content.get(content_id)?;
        self.get_contents(marketplace_id)
            .iter()
            .find(|c| c.content_id == content_id)
    }

    /// Marketplaces with at least one content item, sorted
    pub fn marketplaces(&self) -> Vec<&str> {
        let mut marketplaces: Vec<&str> = self
            .contents_by_marketplace
            .keys()
            .map(|m| m.as_str())
            .collect();
        marketplaces.sort_unstable();
        marketplaces
    }

    pub fn insert_content(&mut self, content: AdvertisementContent) {
        self.marketplace_by_content
            .entry(content.content_id.clone())
            .or_insert_with(|| content.marketplace_id.clone());
        self.contents_by_marketplace
            .entry(content.marketplace_id.clone())
            .or_default()
            .push(content);
    }

    pub fn insert_targeting_group(&mut self, group: TargetingGroup) {
        self.groups_by_content
            .entry(group.content_id.clone())
            .or_default()
            .push(group);
    }

    /// (content items, targeting groups)
    pub fn counts(&self) -> (usize, usize) {
        let contents = self.contents_by_marketplace.values().map(|v| v.len()).sum();
        let groups = self.groups_by_content.values().map(|v| v.len()).sum();
        (contents, groups)
    }
}
