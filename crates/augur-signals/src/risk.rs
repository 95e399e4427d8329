//! Downside risk: dispersion of the losing periods only.

use augur_traits::stats::simple_returns;
use augur_traits::{CrossSection, Date, PricePanel, Result, Signal, score_each_asset};
use serde::{Deserialize, Serialize};

use crate::indicators::{downside_deviation, ensure_history};

/// Configuration for the downside-risk signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownsideRiskConfig {
    /// Observations required before an asset is scored (default: 200)
    pub min_history: usize,

    /// Trailing closes used; `None` uses the whole history up to the date
    pub window: Option<usize>,

    /// Negative returns needed before the deviation is trusted (default: 10)
    pub min_negative_observations: usize,

    /// Value used when too few negative returns exist (default: 0.02)
    pub floor: f64,

    /// Scale by `sqrt(periods_per_year)` (default: false, raw periodic value)
    pub annualize: bool,

    /// Periods per year when annualizing (default: 252)
    pub periods_per_year: usize,
}

impl Default for DownsideRiskConfig {
    fn default() -> Self {
        Self {
            min_history: 200,
            window: None,
            min_negative_observations: 10,
            floor: 0.02,
            annualize: false,
            periods_per_year: 252,
        }
    }
}

/// Downside-risk signal. Lower is safer; the scorer inverts its rank.
#[derive(Debug, Clone, Default)]
pub struct DownsideRisk {
    config: DownsideRiskConfig,
}

impl DownsideRisk {
    /// Create a new downside-risk signal with the given configuration.
    #[must_use]
    pub const fn new(config: DownsideRiskConfig) -> Self {
        Self { config }
    }

    /// Downside deviation of a close history ending at the scoring date.
    ///
    /// # Errors
    ///
    /// [`augur_traits::AugurError::InsufficientHistory`] below the minimum history.
    pub fn compute(&self, closes: &[f64]) -> Result<f64> {
        ensure_history(closes.len(), self.config.min_history)?;
        let start = self
            .config
            .window
            .map_or(0, |w| closes.len().saturating_sub(w));
        let returns = simple_returns(&closes[start..]);
        let raw = downside_deviation(
            &returns,
            self.config.min_negative_observations,
            self.config.floor,
        );
        Ok(if self.config.annualize {
            raw * (self.config.periods_per_year as f64).sqrt()
        } else {
            raw
        })
    }
}

impl Signal for DownsideRisk {
    fn name(&self) -> &str {
        "downside_risk"
    }

    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
        Ok(score_each_asset(panel, date, |series| {
            self.compute(series.closes_until(date))
        }))
    }

    fn lookback(&self) -> usize {
        self.config.min_history
    }
}
