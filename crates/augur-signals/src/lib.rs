//! Factor computations for the augur ranking model.
//!
//! This crate turns price histories into per-asset factor readings:
//! - Momentum: percent change over the trailing half-year
//! - Risk: downside deviation of daily returns
//! - Value: distance from the 52-week low, plus a DCF helper for fundamentals
//! - Technical: RSI, volatility, Bollinger width, volume ratio
//! - Relative: excess return over the benchmark and the sector
//!
//! It also holds the benchmark regime classifier and the intraday market
//! sentinel. Signals return raw values; ranking happens in `augur-combine`.
//!
//! # Example
//!
//! ```ignore
//! use augur_signals::{FactorEngine, RegimeClassifier};
//!
//! let regime = RegimeClassifier::default().classify_at(&panel, date)?;
//! let frame = FactorEngine::default().snapshot(&panel, &sectors, date);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod engine;
pub mod indicators;
pub mod momentum;
pub mod regime;
pub mod registry;
pub mod relative;
pub mod risk;
pub mod sentinel;
pub mod technical;
pub mod value;

// Re-export key types
pub use engine::{FactorConfig, FactorEngine, FactorFrame, FactorSnapshot};
pub use regime::{Regime, RegimeClassifier, RegimeConfig, RegimeState};
pub use registry::{SignalCategory, SignalInfo};
pub use sentinel::{MarketHealth, MarketSentinel, SentinelConfig};
