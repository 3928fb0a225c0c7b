//! CatalogIndex loading and validation.
//!
//! Builds the CatalogIndex from a catalog directory:
//! - Parse contents.dat and targeting_groups.dat (in parallel)
//! - Index content by marketplace and targeting groups by content id
//! - Validate references and click-through rates

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::CatalogIndex;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

pub const CONTENTS_FILE: &str = "contents.dat";
pub const TARGETING_GROUPS_FILE: &str = "targeting_groups.dat";

impl CatalogIndex {
    /// Load a catalog from a directory containing `contents.dat` and
    /// `targeting_groups.dat`.
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Insert content and targeting groups in file order
    /// 3. Validate data integrity
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading advertisement catalog from {:?}", data_dir);

        let contents_path = data_dir.join(CONTENTS_FILE);
        let groups_path = data_dir.join(TARGETING_GROUPS_FILE);

        let (contents, groups) = rayon::join(
            || parser::parse_contents(&contents_path),
            || parser::parse_targeting_groups(&groups_path),
        );
        let contents = contents?;
        let groups = groups?;

        info!(
            "Loaded {} content items and {} targeting groups",
            contents.len(),
            groups.len()
        );

        let mut index = CatalogIndex::new();
        for content in contents {
            index.insert_content(content);
        }
        for group in groups {
            index.insert_targeting_group(group);
        }

        index.validate()?;
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Content ids are unique across marketplaces
    /// - Every targeting group references existing content
    /// - Click-through rates are finite and non-negative
    pub fn validate(&self) -> Result<()> {
        let mut content_ids: HashSet<&str> = HashSet::new();
        for content in self.contents_by_marketplace.values().flatten() {
            if !content_ids.insert(content.content_id.as_str()) {
                return Err(CatalogError::DuplicateContent {
                    content_id: content.content_id.clone(),
                });
            }
        }

        self.groups_by_content
            .par_iter()
            .try_for_each(|(content_id, groups)| {
                if self.get_content(content_id).is_none() {
                    return Err(CatalogError::MissingReference {
                        entity: "AdvertisementContent".to_string(),
                        id: content_id.clone(),
                    });
                }
                for group in groups {
                    let ctr = group.click_through_rate;
                    if !ctr.is_finite() || ctr < 0.0 {
                        return Err(CatalogError::InvalidValue {
                            field: format!("clickThroughRate of {}", group.targeting_group_id),
                            value: ctr.to_string(),
                        });
                    }
                }
                Ok(())
            })
    }
}
