//! Weighted blend of percentile ranks.

use augur_traits::{AugurError, Result};
use ndarray::Array1;

use crate::combiner::{Combiner, SignalScore};
use crate::weights::RegimeWeights;

/// Component name for the momentum rank.
pub const MOMENTUM: &str = "momentum";
/// Component name for the safety rank.
pub const SAFETY: &str = "safety";
/// Component name for the value rank.
pub const VALUE: &str = "value";

/// Blends the momentum, safety and value ranks into a 0–100 score.
///
/// Score is `scale × (w_m·momentum + w_s·safety + w_v·value)`. A component
/// whose weight is zero may be absent.
#[derive(Debug, Clone, Copy)]
pub struct RankBlendCombiner {
    weights: RegimeWeights,
    scale: f64,
}

impl RankBlendCombiner {
    /// Create a blend with the given weights on a 0–100 scale.
    #[must_use]
    pub const fn new(weights: RegimeWeights) -> Self {
        Self {
            weights,
            scale: 100.0,
        }
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> RegimeWeights {
        self.weights
    }

    fn component<'a>(signals: &'a [SignalScore], name: &str) -> Option<&'a SignalScore> {
        signals.iter().find(|s| s.name == name)
    }
}

impl Combiner for RankBlendCombiner {
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        let n_assets = signals.first().map_or(0, |s| s.scores.len());
        if let Some(bad) = signals.iter().find(|s| s.scores.len() != n_assets) {
            return Err(AugurError::InvalidData(format!(
                "component '{}' has {} assets, expected {n_assets}",
                bad.name,
                bad.scores.len()
            )));
        }

        let mut composite = Array1::zeros(n_assets);
        for (name, weight) in [
            (MOMENTUM, self.weights.momentum),
            (SAFETY, self.weights.safety),
            (VALUE, self.weights.value),
        ] {
            if weight == 0.0 {
                continue;
            }
            let component = Self::component(signals, name).ok_or_else(|| {
                AugurError::DataUnavailable(format!("missing '{name}' component"))
            })?;
            composite.scaled_add(weight, &component.scores);
        }
        composite *= self.scale;

        if composite.iter().any(|x: &f64| !x.is_finite()) {
            return Err("Combination produced non-finite values".into());
        }
        Ok(composite)
    }

    fn name(&self) -> &str {
        "rank_blend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn components() -> Vec<SignalScore> {
        vec![
            SignalScore::new(MOMENTUM, vec![1.0, 0.5]),
            SignalScore::new(SAFETY, vec![0.5, 1.0]),
            SignalScore::new(VALUE, vec![0.5, 1.0]),
        ]
    }

    #[test]
    fn test_blend() {
        let combiner = RankBlendCombiner::new(RegimeWeights::new(0.18, 0.36, 0.36));
        let scores = combiner.combine(&components()).unwrap();
        assert_relative_eq!(scores[0], 100.0 * (0.18 + 0.36 * 0.5 + 0.36 * 0.5), epsilon = 1e-9);
        assert_relative_eq!(scores[1], 100.0 * (0.09 + 0.36 + 0.36), epsilon = 1e-9);
    }

    #[test]
    fn test_zero_weight_component_may_be_missing() {
        let combiner = RankBlendCombiner::new(RegimeWeights::new(0.0, 0.9, 0.0));
        let scores = combiner.combine(&components()[1..2]).unwrap();
        assert_relative_eq!(scores[1], 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_weighted_component() {
        let combiner = RankBlendCombiner::new(RegimeWeights::new(0.5, 0.5, 0.0));
        assert!(combiner.combine(&components()[1..]).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        let mut signals = components();
        signals[2] = SignalScore::new(VALUE, vec![0.1]);
        let combiner = RankBlendCombiner::new(RegimeWeights::new(0.4, 0.6, 0.0));
        assert!(combiner.combine(&signals).is_err());
    }
}
