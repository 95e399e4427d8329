//! Black–Litterman posterior with absolute views on every asset.
//!
//! With one view per asset the pick matrix is the identity, so
//!
//! ```text
//! μ_BL = π + τΣ (τΣ + Ω)⁻¹ (Q − π)
//! Σ_BL = Σ + τΣ − τΣ (τΣ + Ω)⁻¹ τΣ
//! ```
//!
//! where `π = δ Σ w_mkt` is the equilibrium prior and `Ω` is diagonal,
//! calibrated from view confidences with Idzorek's method.

use augur_traits::{AugurError, Result, Symbol};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::views::View;

/// Black–Litterman settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackLittermanConfig {
    /// Uncertainty scale of the prior (default: 0.05)
    pub tau: f64,
    /// Risk aversion δ of the equilibrium prior (default: 1.0)
    pub risk_aversion: f64,
    /// Relative market weight of the benchmark before normalization (default: 100)
    pub benchmark_anchor: f64,
    /// Relative market weight of every other asset (default: 1)
    pub asset_anchor: f64,
    /// View variance used for zero-confidence views (default: 1e6)
    pub zero_confidence_omega: f64,
}

impl Default for BlackLittermanConfig {
    fn default() -> Self {
        Self {
            tau: 0.05,
            risk_aversion: 1.0,
            benchmark_anchor: 100.0,
            asset_anchor: 1.0,
            zero_confidence_omega: 1e6,
        }
    }
}

/// Posterior expected returns and covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    /// Asset order of the vector and matrix.
    pub symbols: Vec<Symbol>,
    /// Posterior expected annual returns.
    pub returns: DVector<f64>,
    /// Posterior covariance.
    pub covariance: DMatrix<f64>,
}

/// Combines an equilibrium prior with views.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackLitterman {
    config: BlackLittermanConfig,
}

impl BlackLitterman {
    /// Create a model with the given settings.
    #[must_use]
    pub const fn new(config: BlackLittermanConfig) -> Self {
        Self { config }
    }

    /// Normalized anchor weights: heavy on the benchmark, equal elsewhere.
    #[must_use]
    pub fn market_weights(&self, symbols: &[Symbol], benchmark: &str) -> DVector<f64> {
        let raw = DVector::from_iterator(
            symbols.len(),
            symbols.iter().map(|s| {
                if s == benchmark {
                    self.config.benchmark_anchor
                } else {
                    self.config.asset_anchor
                }
            }),
        );
        let total = raw.sum();
        if total > 0.0 { raw / total } else { raw }
    }

    /// Equilibrium returns `δ Σ w`.
    #[must_use]
    pub fn implied_returns(&self, cov: &DMatrix<f64>, weights: &DVector<f64>) -> DVector<f64> {
        cov * weights * self.config.risk_aversion
    }

    /// Diagonal of Ω from view confidences.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] for a confidence outside `[0, 1]`.
    pub fn idzorek_omega(&self, cov: &DMatrix<f64>, confidences: &[f64]) -> Result<DVector<f64>> {
        let mut omega = DVector::zeros(confidences.len());
        for (k, &c) in confidences.iter().enumerate() {
            if !(0.0..=1.0).contains(&c) {
                return Err(AugurError::InvalidData(format!(
                    "view confidence {c} outside [0, 1]"
                )));
            }
            omega[k] = if c == 0.0 {
                self.config.zero_confidence_omega
            } else {
                self.config.tau * (1.0 - c) / c * cov[(k, k)]
            };
        }
        Ok(omega)
    }

    /// Posterior given the prior covariance and one view per asset.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] on a dimension mismatch or invalid confidence,
    /// [`AugurError::OptimizationFailure`] when `τΣ + Ω` is singular.
    pub fn posterior(
        &self,
        cov: &DMatrix<f64>,
        views: &[View],
        benchmark: &str,
    ) -> Result<Posterior> {
        let n = views.len();
        if cov.shape() != (n, n) {
            return Err(AugurError::InvalidData(format!(
                "covariance is {:?} but {n} views were given",
                cov.shape()
            )));
        }
        let symbols: Vec<Symbol> = views.iter().map(|v| v.symbol.clone()).collect();
        let prior = self.implied_returns(cov, &self.market_weights(&symbols, benchmark));
        let confidences: Vec<f64> = views.iter().map(|v| v.confidence).collect();
        let omega = self.idzorek_omega(cov, &confidences)?;
        let q = DVector::from_iterator(n, views.iter().map(|v| v.expected_return));

        let tau_sigma = cov * self.config.tau;
        let a = &tau_sigma + DMatrix::from_diagonal(&omega);
        let a_inv = a
            .clone()
            .cholesky()
            .map(|c| c.inverse())
            .or_else(|| a.try_inverse())
            .ok_or_else(|| AugurError::OptimizationFailure("view system is singular".into()))?;

        let gain = &tau_sigma * &a_inv;
        let returns = &prior + &gain * (q - &prior);
        let covariance = cov + &tau_sigma - &gain * &tau_sigma;
        // restore exact symmetry lost to rounding
        let covariance = (&covariance + covariance.transpose()) * 0.5;

        Ok(Posterior {
            symbols,
            returns,
            covariance,
        })
    }
}
