//! Intraday market health check run before acting on a ranking.

use augur_traits::{AugurError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Thresholds for the health check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// Intraday benchmark change at or beyond which the market is crashing (default: -0.025)
    pub crash_threshold: f64,
    /// Aggregate sentiment below which the market is panicking (default: -0.40)
    pub panic_sentiment: f64,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            crash_threshold: -0.025,
            panic_sentiment: -0.40,
        }
    }
}

/// Outcome of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum MarketHealth {
    /// No halt condition.
    Safe,
    /// Benchmark fell too far since the open.
    Crash {
        /// Fractional change since the open.
        intraday_change: f64,
    },
    /// Aggregate news sentiment is too negative.
    Panic {
        /// Observed aggregate sentiment.
        sentiment: f64,
    },
}

impl MarketHealth {
    /// Whether trading may proceed.
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

/// Evaluates the halt conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketSentinel {
    config: SentinelConfig,
}

impl MarketSentinel {
    /// Create a sentinel with the given thresholds.
    #[must_use]
    pub const fn new(config: SentinelConfig) -> Self {
        Self { config }
    }

    /// Check the benchmark move since the open, then aggregate sentiment.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] for a non-positive or non-finite price.
    pub fn assess(&self, open: f64, current: f64, sentiment: Option<f64>) -> Result<MarketHealth> {
        if !(open.is_finite() && open > 0.0 && current.is_finite() && current > 0.0) {
            return Err(AugurError::InvalidData(format!(
                "benchmark prices must be positive, got open={open} current={current}"
            )));
        }
        let intraday_change = (current - open) / open;
        if intraday_change < self.config.crash_threshold {
            warn!(intraday_change, "market crash detected");
            return Ok(MarketHealth::Crash { intraday_change });
        }
        if let Some(sentiment) = sentiment.filter(|s| *s < self.config.panic_sentiment) {
            warn!(sentiment, "sentiment panic detected");
            return Ok(MarketHealth::Panic { sentiment });
        }
        Ok(MarketHealth::Safe)
    }
}
