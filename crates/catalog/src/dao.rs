//! Read-only data access for the selector.
//!
//! The selector only needs two lookups: content by marketplace, and
//! targeting groups by content id. Both go through `ReadableDao` so a
//! different backing store can be swapped in.

use crate::error::Result;
use crate::types::{AdvertisementContent, CatalogIndex};
use std::sync::Arc;
use targeting::TargetingGroup;

/// A read-only key-value lookup.
///
/// Implementations return an empty collection for unknown keys; `Err` is
/// reserved for a store that could not answer.
pub trait ReadableDao<K: ?Sized, V>: Send + Sync {
    fn get(&self, key: &K) -> Result<V>;
}

/// Content lookup keyed by marketplace id
#[derive(Debug, Clone)]
pub struct ContentDao {
    index: Arc<CatalogIndex>,
}

impl ContentDao {
    pub fn new(index: Arc<CatalogIndex>) -> Self {
        Self { index }
    }
}

impl ReadableDao<str, Vec<AdvertisementContent>> for ContentDao {
    fn get(&self, marketplace_id: &str) -> Result<Vec<AdvertisementContent>> {
        Ok(self.index.get_contents(marketplace_id).to_vec())
    }
}

/// Targeting group lookup keyed by content id
#[derive(Debug, Clone)]
pub struct TargetingGroupDao {
    index: Arc<CatalogIndex>,
}

impl TargetingGroupDao {
    pub fn new(index: Arc<CatalogIndex>) -> Self {
        Self { index }
    }
}

impl ReadableDao<str, Vec<TargetingGroup>> for TargetingGroupDao {
    fn get(&self, content_id: &str) -> Result<Vec<TargetingGroup>> {
        Ok(self.index.get_targeting_groups(content_id).to_vec())
    }
}
