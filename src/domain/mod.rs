//! Core domain types and logic.

pub mod price;
pub mod loader;
pub mod normalize;
pub mod returns;
pub mod valuation;
pub mod stats;
pub mod optimizer;
pub mod assessment;
pub mod universe;
pub mod config_validation;
pub mod error;
