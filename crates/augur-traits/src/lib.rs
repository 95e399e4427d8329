#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/augur/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the augur framework.
//!
//! This crate provides the foundational data model shared by the factor,
//! scoring, allocation and evaluation crates: typed price histories,
//! per-date cross-sections, sector classification, the [`Signal`] trait and
//! a single error type.

/// The version of the augur-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod cross_section;
pub mod error;
pub mod sector;
pub mod series;
pub mod signal;
pub mod stats;
pub mod types;

// Re-exports
pub use cross_section::CrossSection;
pub use error::{AugurError, Result};
pub use sector::{INDEX_BUCKET, SectorMap};
pub use series::{PricePanel, PriceSeries};
pub use signal::{Signal, score_each_asset};
pub use types::{Date, MarketData, Symbol};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
