//! Market regime detection from the benchmark trend.

use std::fmt;

use augur_traits::{AugurError, Date, PricePanel, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::sma;

/// Bull or bear market state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Regime {
    /// Benchmark trades strictly above its trailing average.
    Bull,
    /// Benchmark at or below its trailing average.
    Bear,
}

impl Regime {
    /// Both regimes, bull first.
    pub const ALL: [Self; 2] = [Self::Bull, Self::Bear];

    /// Classify a price against its trailing average. Ties are bearish.
    #[must_use]
    pub fn from_levels(price: f64, trailing_average: f64) -> Self {
        if price > trailing_average {
            Self::Bull
        } else {
            Self::Bear
        }
    }

    /// Upper-case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bull => "BULL",
            Self::Bear => "BEAR",
        }
    }

    /// Whether this is the bull regime.
    #[must_use]
    pub const fn is_bull(&self) -> bool {
        matches!(self, Self::Bull)
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classification together with the levels it was made from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeState {
    /// Detected regime.
    pub label: Regime,
    /// Latest benchmark close.
    pub price: f64,
    /// Trailing simple moving average of the benchmark.
    pub trailing_average: f64,
}

/// Regime detector configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// Moving-average window in trading days (default: 200)
    pub window: usize,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self { window: 200 }
    }
}

/// Moving-average trend classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeClassifier {
    config: RegimeConfig,
}

impl RegimeClassifier {
    /// Create a classifier with the given window.
    #[must_use]
    pub const fn new(config: RegimeConfig) -> Self {
        Self { config }
    }

    /// Classify the last value of a benchmark history.
    ///
    /// # Errors
    ///
    /// [`AugurError::InsufficientHistory`] when fewer than `window` closes exist.
    pub fn classify(&self, closes: &[f64]) -> Result<RegimeState> {
        let trailing_average = sma(closes, self.config.window)?;
        let price = closes[closes.len() - 1];
        Ok(RegimeState {
            label: Regime::from_levels(price, trailing_average),
            price,
            trailing_average,
        })
    }

    /// Classify the panel's benchmark using closes up to `date`.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::classify`] failures with the benchmark symbol attached.
    pub fn classify_at(&self, panel: &PricePanel, date: Date) -> Result<RegimeState> {
        let closes = panel.benchmark_series().closes_until(date);
        let state = self.classify(closes).map_err(|err| match err {
            AugurError::InsufficientHistory(msg) => AugurError::InsufficientHistory(format!(
                "benchmark {} at {date}: {msg}",
                panel.benchmark()
            )),
            other => other,
        })?;
        debug!(
            %date,
            regime = %state.label,
            price = state.price,
            average = state.trailing_average,
            "classified regime"
        );
        Ok(state)
    }
}
