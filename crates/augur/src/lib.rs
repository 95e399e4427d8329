#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/augur/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # augur
//!
//! augur is an umbrella crate that re-exports all augur sub-crates for
//! convenience.
//!
//! ## Quick Start
//!
//! ```ignore
//! use augur::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = AugurConfig::default();
//! let panel = market_data.price_panel(&config.benchmark)?;
//!
//! // Rank the universe for the latest date
//! let board = config.pipeline().board_at(&panel, &sectors, &ScoringContext::default(), date)?;
//!
//! // Turn the ten best names into weights
//! let recs: Vec<Recommendation> = board
//!     .top(10)
//!     .iter()
//!     .map(|e| Recommendation::from_score(e.symbol.clone(), e.score))
//!     .collect();
//! let allocation = config.allocator().allocate(&recs, &panel, &sectors, date);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Data flows one way:
//!
//! 1. **Signals** compute raw factor readings per asset and classify the regime
//! 2. **Combine** ranks the readings and blends them with regime weights
//! 3. **Alloc** turns the best scores into views, a posterior and capped weights
//! 4. **Eval** prices the trades and replays the process month by month

/// Version information for the augur crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;

pub use config::{AugurConfig, BacktestSection, DEFAULT_BENCHMARK, SearchSection};

// ============================================================================
// Core Types
// ============================================================================

/// Core data model: series, panels, cross-sections, sectors and errors.
pub mod traits {
    pub use augur_traits::*;
}

pub use augur_traits::{
    AugurError, CrossSection, Date, MarketData, PricePanel, PriceSeries, Result, SectorMap,
    Symbol,
};

// ============================================================================
// Signals
// ============================================================================

/// Factor computations, regime classification, DCF and market health.
///
/// ## Factors
///
/// - **Momentum**: 126-period percent change
/// - **Downside risk**: standard deviation of negative returns
/// - **Value proxy**: inverse distance from the 52-week low
/// - **Technical**: RSI, volatility, Bollinger width, volume ratio
/// - **Relative strength**: excess return over the benchmark and the sector
pub mod signals {
    pub use augur_signals::*;
}

// ============================================================================
// Scoring
// ============================================================================

/// Regime weight tables and the composite scorer.
///
/// ```text
/// score = 100 × (w_m · momentum_rank + w_s · safety_rank + w_v · value_rank)
/// ```
pub mod combine {
    pub use augur_combine::*;
}

// ============================================================================
// Allocation
// ============================================================================

/// Black–Litterman allocation with sector caps.
pub mod alloc {
    pub use augur_alloc::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Friction, paper trading, backtesting and weight search.
///
/// The weight search is in-sample: it reports which weights would have done
/// best over the history it was given. The backtest replays a fixed weight
/// table and is the place to judge a strategy.
pub mod eval {
    pub use augur_eval::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use augur::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::AugurConfig;
    pub use augur_alloc::{Allocation, AllocationOutcome, BayesianAllocator, Recommendation};
    pub use augur_combine::{
        AssetStatus, CompositeScorer, RegimeWeights, ScoreBoard, ScoringContext, WeightTable,
    };
    pub use augur_eval::{
        Backtest, BacktestConfig, BacktestResult, FrictionModel, HoldingMode, RankingPipeline,
        TradeSide, WeightSearch,
    };
    pub use augur_signals::{FactorEngine, FactorFrame, Regime, RegimeClassifier};
    pub use augur_traits::{
        AugurError, Date, MarketData, PricePanel, PriceSeries, Result, SectorMap, Symbol,
    };
}

#[cfg(test)]
mod scenario_tests;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_error_types() {
        let _result: Result<()> = Ok(());
        let error: AugurError = "boom".into();
        assert!(error.to_string().contains("boom"));
    }
}
