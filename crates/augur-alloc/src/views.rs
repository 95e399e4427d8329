//! Absolute return views derived from ranking confidence.

use augur_traits::{AugurError, Result, Symbol};
use serde::{Deserialize, Serialize};

/// A candidate selected by the ranking, with its conviction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Conviction in `[0, 1]`.
    pub confidence: f64,
}

impl Recommendation {
    /// Create a recommendation, clamping the confidence into `[0, 1]`.
    pub fn new(symbol: impl Into<Symbol>, confidence: f64) -> Self {
        Self {
            symbol: symbol.into(),
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }

    /// Maps a 0–100 composite score to a confidence of `score / 100`.
    pub fn from_score(symbol: impl Into<Symbol>, score: f64) -> Self {
        Self::new(symbol, score / 100.0)
    }
}

/// One absolute view on an asset's annual return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Expected annual return.
    pub expected_return: f64,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// How confidences become views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Long-run benchmark return (default: 0.12)
    pub benchmark_return: f64,
    /// Confidence in the benchmark view (default: 0.60)
    pub benchmark_confidence: f64,
    /// Confidence that maps to a zero return (default: 0.5)
    pub neutral_confidence: f64,
    /// Return per unit of confidence above neutral (default: 2.5)
    pub return_scale: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            benchmark_return: 0.12,
            benchmark_confidence: 0.60,
            neutral_confidence: 0.5,
            return_scale: 2.5,
        }
    }
}

impl ViewConfig {
    /// Expected return implied by a confidence.
    #[must_use]
    pub fn implied_return(&self, confidence: f64) -> f64 {
        (confidence - self.neutral_confidence) * self.return_scale
    }

    /// One view per symbol of `universe`, in the same order.
    ///
    /// # Errors
    ///
    /// [`AugurError::SymbolNotFound`] when a non-benchmark symbol has no recommendation.
    pub fn build(
        &self,
        universe: &[Symbol],
        benchmark: &str,
        recommendations: &[Recommendation],
    ) -> Result<Vec<View>> {
        universe
            .iter()
            .map(|symbol| {
                if symbol == benchmark {
                    return Ok(View {
                        symbol: symbol.clone(),
                        expected_return: self.benchmark_return,
                        confidence: self.benchmark_confidence,
                    });
                }
                let rec = recommendations
                    .iter()
                    .find(|r| &r.symbol == symbol)
                    .ok_or_else(|| AugurError::SymbolNotFound(symbol.clone()))?;
                Ok(View {
                    symbol: symbol.clone(),
                    expected_return: self.implied_return(rec.confidence),
                    confidence: rec.confidence,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_score() {
        assert_relative_eq!(Recommendation::from_score("A", 62.0).confidence, 0.62);
        assert_relative_eq!(Recommendation::from_score("A", 140.0).confidence, 1.0);
        assert_relative_eq!(Recommendation::from_score("A", -3.0).confidence, 0.0);
    }

    #[test]
    fn test_views() {
        let universe: Vec<Symbol> = vec!["^NSEI".into(), "A".into(), "B".into()];
        let recs = vec![Recommendation::new("A", 0.6), Recommendation::new("B", 0.4)];
        let views = ViewConfig::default().build(&universe, "^NSEI", &recs).unwrap();
        assert_relative_eq!(views[0].expected_return, 0.12);
        assert_relative_eq!(views[0].confidence, 0.6);
        assert_relative_eq!(views[1].expected_return, 0.25, epsilon = 1e-12);
        assert_relative_eq!(views[2].expected_return, -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_confidence_is_monotone_in_return() {
        let config = ViewConfig::default();
        assert!(config.implied_return(0.7) > config.implied_return(0.69));
    }

    #[test]
    fn test_missing_recommendation() {
        let universe: Vec<Symbol> = vec!["^NSEI".into(), "A".into()];
        assert!(ViewConfig::default().build(&universe, "^NSEI", &[]).is_err());
    }
}
