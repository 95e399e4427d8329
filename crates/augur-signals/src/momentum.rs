//! Price momentum: percent change over a fixed trailing window.

use augur_traits::{CrossSection, Date, PricePanel, Result, Signal, score_each_asset};
use serde::{Deserialize, Serialize};

use crate::indicators::{ensure_history, pct_change};

/// Configuration for the momentum signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Number of periods between the two closes compared (default: 126 ≈ 6 months)
    pub lookback_periods: usize,

    /// Observations required before an asset enters the cross-section (default: 200)
    pub min_history: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback_periods: 126,
            min_history: 200,
        }
    }
}

/// Momentum signal.
///
/// Raw value is `close[t] / close[t - lookback_periods] - 1`; higher is better.
///
/// # Example
///
/// ```ignore
/// use augur_signals::momentum::Momentum;
///
/// let signal = Momentum::default();
/// let values = signal.score(&panel, date)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Momentum {
    config: MomentumConfig,
}

impl Momentum {
    /// Create a new momentum signal with the given configuration.
    #[must_use]
    pub const fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Get the lookback period.
    #[must_use]
    pub const fn lookback_periods(&self) -> usize {
        self.config.lookback_periods
    }

    /// Momentum of a close history that ends at the scoring date.
    ///
    /// # Errors
    ///
    /// [`augur_traits::AugurError::InsufficientHistory`] below the minimum history.
    pub fn compute(&self, closes: &[f64]) -> Result<f64> {
        ensure_history(closes.len(), self.config.min_history)?;
        pct_change(closes, self.config.lookback_periods)
    }
}

impl Signal for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
        Ok(score_each_asset(panel, date, |series| {
            self.compute(series.closes_until(date))
        }))
    }

    fn lookback(&self) -> usize {
        self.config
            .min_history
            .max(self.config.lookback_periods + 1)
    }
}
