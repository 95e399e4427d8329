//! Core trait definition for signal combiners.

use augur_traits::Result;
use ndarray::Array1;

/// Ranked output of a single component for combination.
///
/// Each component holds one percentile rank in `[0, 1]` per asset (1 = best),
/// aligned with the other components on the same asset order.
#[derive(Debug, Clone)]
pub struct SignalScore {
    /// Component name (for lookup and logging)
    pub name: String,

    /// Percentile ranks for each asset in the universe
    pub scores: Array1<f64>,
}

impl SignalScore {
    /// Create a named score vector.
    pub fn new(name: impl Into<String>, scores: impl Into<Array1<f64>>) -> Self {
        Self {
            name: name.into(),
            scores: scores.into(),
        }
    }
}

/// Combines multiple ranked components into a composite score.
///
/// All implementations must be thread-safe (Send + Sync) so that the weight
/// search can evaluate candidates in parallel.
///
/// # Examples
///
/// ```rust,no_run
/// use augur_combine::{Combiner, SignalScore};
/// use ndarray::Array1;
///
/// struct FirstOnly;
///
/// impl Combiner for FirstOnly {
///     fn combine(&self, signals: &[SignalScore]) -> augur_traits::Result<Array1<f64>> {
///         Ok(signals[0].scores.clone())
///     }
///
///     fn name(&self) -> &str {
///         "first_only"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Combine multiple components into a composite vector.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Component vectors have mismatched lengths
    /// - A component the combiner needs is missing
    /// - Combination produces invalid values (NaN, Inf)
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>>;

    /// Name of this combination strategy.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_score_creation() {
        let score = SignalScore::new("momentum", vec![0.5, 1.0, 0.25]);
        assert_eq!(score.name, "momentum");
        assert_eq!(score.scores.len(), 3);
    }
}
