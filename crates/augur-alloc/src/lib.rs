//! Portfolio construction for the augur ranking model.
//!
//! Ranked candidates are turned into weights in four steps:
//! - align closing prices and estimate a shrunk covariance (Ledoit–Wolf)
//! - express each candidate's confidence as an absolute return view
//! - blend the views with a benchmark-anchored prior (Black–Litterman)
//! - maximize the Sharpe ratio with per-sector caps
//!
//! [`BayesianAllocator`] wires these together and falls back to holding
//! the benchmark when any step fails.
//!
//! # Example
//!
//! ```ignore
//! use augur_alloc::{BayesianAllocator, Recommendation};
//!
//! let recs = vec![Recommendation::from_score("TCS", 72.0)];
//! let allocation = BayesianAllocator::default().allocate(&recs, &panel, &sectors, date);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod allocator;
pub mod black_litterman;
pub mod correlation;
pub mod covariance;
pub mod optimizer;
pub mod returns;
pub mod views;

pub use allocator::{Allocation, AllocationOutcome, AllocatorConfig, BayesianAllocator};
pub use black_litterman::{BlackLitterman, BlackLittermanConfig, Posterior};
pub use correlation::{CorrelationConfig, CorrelationFilter, CorrelationReport};
pub use covariance::{annualize, ledoit_wolf, sample_covariance};
pub use optimizer::{MaxSharpe, OptimizerConfig, PortfolioStats};
pub use returns::AlignedPrices;
pub use views::{Recommendation, View, ViewConfig};
