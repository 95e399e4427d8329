//! Value proxy: closeness to the trailing 52-week low.

use augur_traits::{AugurError, CrossSection, Date, PricePanel, Result, Signal, score_each_asset};
use serde::{Deserialize, Serialize};

use crate::indicators::{ensure_history, trailing_low};

/// Configuration for the value proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueProxyConfig {
    /// Window for the trailing low (default: 252 ≈ 52 weeks)
    pub window: usize,

    /// Observations required before an asset is scored (default: 200)
    pub min_history: usize,

    /// Added to the distance before inversion, bounding the proxy at `1 / offset` (default: 0.1)
    pub distance_offset: f64,
}

impl Default for ValueProxyConfig {
    fn default() -> Self {
        Self {
            window: 252,
            min_history: 200,
            distance_offset: 0.1,
        }
    }
}

/// Value proxy signal.
///
/// With `d = (price - low) / low`, the raw value is `1 / (d + offset)`, so an
/// asset sitting on its 52-week low scores highest.
#[derive(Debug, Clone, Default)]
pub struct ValueProxy {
    config: ValueProxyConfig,
}

impl ValueProxy {
    /// Create a new value proxy with the given configuration.
    #[must_use]
    pub const fn new(config: ValueProxyConfig) -> Self {
        Self { config }
    }

    /// Value proxy of a close history ending at the scoring date.
    ///
    /// # Errors
    ///
    /// [`AugurError::InsufficientHistory`] below the minimum history.
    pub fn compute(&self, closes: &[f64]) -> Result<f64> {
        ensure_history(closes.len(), self.config.min_history.max(1))?;
        let low = trailing_low(closes, self.config.window)
            .ok_or_else(|| AugurError::InsufficientHistory("empty window".into()))?;
        let price = closes[closes.len() - 1];
        let distance = (price - low) / low;
        Ok(1.0 / (distance + self.config.distance_offset))
    }
}

impl Signal for ValueProxy {
    fn name(&self) -> &str {
        "value_proxy"
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> ValueProxyConfig {
        ValueProxyConfig {
            min_history: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_at_low_scores_maximum() {
        let signal = ValueProxy::new(config());
        assert_relative_eq!(signal.compute(&[120.0, 110.0, 100.0]).unwrap(), 10.0);
    }

    #[test]
    fn test_far_from_low_scores_less() {
        let signal = ValueProxy::new(config());
        // 50% above the low
        assert_relative_eq!(signal.compute(&[100.0, 120.0, 150.0]).unwrap(), 1.0 / 0.6);
    }

    #[test]
    fn test_window_limits_low() {
        let signal = ValueProxy::new(ValueProxyConfig {
            window: 2,
            min_history: 3,
            distance_offset: 0.1,
        });
        // low of the last two closes is 120
        assert_relative_eq!(signal.compute(&[50.0, 120.0, 132.0]).unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_short_history_fails_closed() {
        assert!(ValueProxy::default().compute(&[100.0; 20]).is_err());
    }
}
