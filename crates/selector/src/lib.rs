//! Advertisement selection.
//!
//! This crate contains the selector that picks the single best advertisement
//! for a customer and marketplace: the eligible targeting group with the
//! highest click-through rate wins.

pub mod error;
pub mod selection;

pub use error::SelectionError;
pub use selection::{AdvertisementSelector, GeneratedAdvertisement};
