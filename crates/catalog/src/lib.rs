//! # Catalog Crate
//!
//! This crate holds the read-only advertisement catalog: the content
//! creatives offered per marketplace and the targeting groups attached to
//! each content item.
//!
//! ## Main Components
//!
//! - **types**: AdvertisementContent and the in-memory CatalogIndex
//! - **parser**: Parse `.dat` catalog files into Rust structs
//! - **index**: Load a catalog directory and validate it
//! - **dao**: Key-value lookups the selector consumes
//! - **error**: Error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, ContentDao, ReadableDao, TargetingGroupDao};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let index = Arc::new(CatalogIndex::load_from_dir(Path::new("data/catalog"))?);
//!
//! let contents = ContentDao::new(index.clone()).get("US")?;
//! let groups = TargetingGroupDao::new(index.clone()).get(&contents[0].content_id)?;
//! ```
//!
//! Lookups for unknown keys return empty collections rather than errors.

pub mod dao;
pub mod error;
pub mod index;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use dao::{ContentDao, ReadableDao, TargetingGroupDao};
pub use error::{CatalogError, Result};
pub use types::{AdvertisementContent, CatalogIndex};
