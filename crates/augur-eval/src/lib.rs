//! Backtesting and evaluation for augur.
//!
//! This crate provides:
//! - Indian equity delivery friction (taxes, fees, slippage)
//! - A shadow ledger for paper trading
//! - A monthly walk-forward backtest with friction drag and rank IC
//! - An in-sample grid search over regime weights
//! - Performance metrics (Sharpe ratio, maximum drawdown, IC summary)
//!
//! # Example
//!
//! ```rust,ignore
//! use augur_eval::{Backtest, BacktestConfig, WeightSearch};
//!
//! let result = Backtest::new(BacktestConfig::default()).run(&panel, &sectors, &context)?;
//! println!("sharpe {:.2}, drawdown {:.1}%", result.sharpe_ratio, result.max_drawdown * 100.0);
//!
//! let weights = WeightSearch::default().run(&panel, &sectors)?.weight_table();
//! ```

pub mod backtest;
pub mod friction;
pub mod ic;
pub mod ledger;
pub mod metrics;
pub mod pipeline;
pub mod search;

// Re-export main types
pub use backtest::{Backtest, BacktestConfig, BacktestResult, BacktestState, HoldingMode};
pub use friction::{
    FeeBreakdown, FeeSchedule, FrictionModel, FrictionReport, PositionFriction, TradeCost,
    TradeSide,
};
pub use ic::{cross_sectional_ic, rank_ic};
pub use ledger::{Holding, ShadowLedger, TradeRecord};
pub use metrics::{InformationRatio, max_drawdown, sharpe_ratio, total_return};
pub use pipeline::RankingPipeline;
pub use search::{CandidateScore, RegimeSearch, SearchConfig, SearchResult, WeightSearch};
