//! Built-in targeting predicates.
//!
//! This module contains the concrete predicates that can be attached to a
//! TargetingGroup. Any other rule can be plugged in by implementing
//! `TargetingPredicate`.

pub mod constant;
pub mod customer;
pub mod inverted;
pub mod marketplace;

// Re-export for convenience
pub use constant::ConstantPredicate;
pub use customer::{CustomerPredicate, RecognizedCustomerPredicate};
pub use inverted::InvertedPredicate;
pub use marketplace::MarketplacePredicate;
