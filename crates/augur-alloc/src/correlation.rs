//! Advisory check for candidates that move with the benchmark.

use std::collections::BTreeMap;

use augur_traits::Symbol;
use augur_traits::stats::pearson;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Correlation alert settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Correlation strictly above this flags an asset (default: 0.85)
    pub threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { threshold: 0.85 }
    }
}

/// Per-asset correlation with the benchmark and the assets flagged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Pearson correlation of returns with the benchmark.
    pub correlations: BTreeMap<Symbol, f64>,
    /// Assets above the threshold. They stay in the universe.
    pub flagged: Vec<Symbol>,
}

/// Computes a [`CorrelationReport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationFilter {
    config: CorrelationConfig,
}

impl CorrelationFilter {
    /// Create a filter with the given threshold.
    #[must_use]
    pub const fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    /// Correlate every column of `returns` with the benchmark column.
    ///
    /// Columns with zero variance have no correlation and are never flagged.
    #[must_use]
    pub fn assess(
        &self,
        returns: &DMatrix<f64>,
        symbols: &[Symbol],
        benchmark: &str,
    ) -> CorrelationReport {
        let mut report = CorrelationReport::default();
        let Some(b) = symbols.iter().position(|s| s == benchmark) else {
            return report;
        };
        let bench: Vec<f64> = returns.column(b).iter().copied().collect();
        for (i, symbol) in symbols.iter().enumerate() {
            if i == b {
                continue;
            }
            let column: Vec<f64> = returns.column(i).iter().copied().collect();
            let Some(corr) = pearson(&column, &bench) else {
                continue;
            };
            report.correlations.insert(symbol.clone(), corr);
            if corr > self.config.threshold {
                warn!(%symbol, correlation = corr, "asset is strongly market-linked");
                report.flagged.push(symbol.clone());
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn symbols() -> Vec<Symbol> {
        vec!["^NSEI".into(), "TWIN".into(), "HEDGE".into(), "FLAT".into()]
    }

    fn returns() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            4,
            4,
            &[
                0.01, 0.02, -0.01, 0.0, //
                -0.02, -0.04, 0.02, 0.0, //
                0.03, 0.06, -0.03, 0.0, //
                0.00, 0.00, 0.00, 0.0,
            ],
        )
    }

    #[test]
    fn test_flags_but_keeps() {
        let report = CorrelationFilter::default().assess(&returns(), &symbols(), "^NSEI");
        assert_eq!(report.flagged, vec!["TWIN".to_string()]);
        assert_relative_eq!(report.correlations["TWIN"], 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.correlations["HEDGE"], -1.0, epsilon = 1e-12);
        assert!(!report.correlations.contains_key("FLAT"));
    }

    #[test]
    fn test_missing_benchmark() {
        let report = CorrelationFilter::default().assess(&returns(), &symbols(), "SPY");
        assert!(report.correlations.is_empty());
    }
}
