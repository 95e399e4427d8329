//! Factor weights per market regime.

use augur_signals::Regime;
use augur_traits::{AugurError, Result};
use serde::{Deserialize, Serialize};

const SUM_TOLERANCE: f64 = 1e-6;

/// Weights of the three ranked components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeWeights {
    /// Weight on the momentum rank
    pub momentum: f64,
    /// Weight on the safety rank (inverse downside risk)
    pub safety: f64,
    /// Weight on the value rank
    pub value: f64,
}

impl RegimeWeights {
    /// Create a weight triple.
    #[must_use]
    pub const fn new(momentum: f64, safety: f64, value: f64) -> Self {
        Self {
            momentum,
            safety,
            value,
        }
    }

    /// Sum of the three weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.momentum + self.safety + self.value
    }

    /// Weights as `[momentum, safety, value]`.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.momentum, self.safety, self.value]
    }

    /// Check that every weight is finite and non-negative.
    ///
    /// The sum is not forced to 1: the live bear preset deliberately sums to 0.9.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] on a negative or non-finite weight.
    pub fn validate(&self) -> Result<()> {
        if self.as_array().iter().all(|w| w.is_finite() && *w >= 0.0) {
            Ok(())
        } else {
            Err(AugurError::InvalidData(format!(
                "weights must be non-negative, got {self:?}"
            )))
        }
    }

    /// Whether the weights lie on the unit simplex.
    #[must_use]
    pub fn is_simplex(&self) -> bool {
        self.validate().is_ok() && (self.total() - 1.0).abs() < SUM_TOLERANCE
    }
}

/// Regime to weights dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    /// Weights applied in a bull regime
    pub bull: RegimeWeights,
    /// Weights applied in a bear regime
    pub bear: RegimeWeights,
}

impl WeightTable {
    /// Live scan weights: balanced in bull markets, safety only in bear markets.
    #[must_use]
    pub const fn live() -> Self {
        Self {
            bull: RegimeWeights::new(0.18, 0.36, 0.36),
            bear: RegimeWeights::new(0.0, 0.90, 0.0),
        }
    }

    /// Momentum and safety only, as used by the historical simulation.
    #[must_use]
    pub const fn two_factor() -> Self {
        Self {
            bull: RegimeWeights::new(0.4, 0.6, 0.0),
            bear: RegimeWeights::new(0.1, 0.9, 0.0),
        }
    }

    /// Fallback returned by the weight search when no date can be evaluated.
    #[must_use]
    pub const fn search_defaults() -> Self {
        Self {
            bull: RegimeWeights::new(0.5, 0.0, 0.5),
            bear: RegimeWeights::new(0.0, 1.0, 0.0),
        }
    }

    /// Weights for `regime`.
    #[must_use]
    pub const fn for_regime(&self, regime: Regime) -> RegimeWeights {
        match regime {
            Regime::Bull => self.bull,
            Regime::Bear => self.bear,
        }
    }

    /// Replace the weights of one regime.
    #[must_use]
    pub const fn with_regime(mut self, regime: Regime, weights: RegimeWeights) -> Self {
        match regime {
            Regime::Bull => self.bull = weights,
            Regime::Bear => self.bear = weights,
        }
        self
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::live()
    }
}

/// All weight triples on a grid of `1 / divisions` that sum to one.
///
/// Ordered lexicographically by (momentum, safety, value), ascending.
#[must_use]
pub fn simplex_grid(divisions: u32) -> Vec<RegimeWeights> {
    let step = 1.0 / f64::from(divisions.max(1));
    let mut grid = Vec::new();
    for m in 0..=divisions {
        for s in 0..=divisions {
            for v in 0..=divisions {
                if m + s + v == divisions {
                    grid.push(RegimeWeights::new(
                        f64::from(m) * step,
                        f64::from(s) * step,
                        f64::from(v) * step,
                    ));
                }
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_live_table() {
        let table = WeightTable::default();
        assert_eq!(table.for_regime(Regime::Bull), RegimeWeights::new(0.18, 0.36, 0.36));
        assert_relative_eq!(table.for_regime(Regime::Bear).total(), 0.9);
    }

    #[test]
    fn test_with_regime() {
        let table = WeightTable::live().with_regime(Regime::Bear, RegimeWeights::new(0.0, 1.0, 0.0));
        assert!(table.bear.is_simplex());
        assert_eq!(table.bull, WeightTable::live().bull);
    }

    #[test]
    fn test_validate_rejects_negative() {
        assert!(RegimeWeights::new(-0.1, 0.6, 0.5).validate().is_err());
        assert!(RegimeWeights::new(0.0, 0.9, 0.0).validate().is_ok());
    }

    #[test]
    fn test_simplex_grid_has_21_points() {
        let grid = simplex_grid(5);
        assert_eq!(grid.len(), 21);
        assert!(grid.iter().all(RegimeWeights::is_simplex));
        assert_eq!(grid[0], RegimeWeights::new(0.0, 0.0, 1.0));
        assert_eq!(grid[20], RegimeWeights::new(1.0, 0.0, 0.0));
    }
}
