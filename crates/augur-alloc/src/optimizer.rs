//! Long-only maximum Sharpe ratio with per-sector caps.
//!
//! $$
//! \max_{\mathbf{w}} \frac{\mathbf{w}^\top\mu - r_f}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}}
//! \quad \text{s.t.} \quad w_i \ge 0,\ \sum_i w_i = 1,\ \sum_{i \in s} w_i \le c
//! $$
//!
//! The simplex constraint is handled by a softmax parametrisation and the caps
//! by a quadratic penalty during the Nelder–Mead search. The result is then
//! cleaned of dust and repaired so the caps hold exactly.

use std::collections::BTreeMap;

use argmin::core::{CostFunction, Executor};
use argmin::solver::neldermead::NelderMead;
use augur_traits::{AugurError, INDEX_BUCKET, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

const CAP_TOLERANCE: f64 = 1e-12;

/// Optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Annual risk-free hurdle (default: 0.072)
    pub risk_free_rate: f64,
    /// Maximum weight per sector; the index bucket is exempt (default: 0.25)
    pub sector_cap: f64,
    /// Nelder–Mead iteration limit (default: 5000)
    pub max_iters: u64,
    /// Simplex standard-deviation tolerance (default: 1e-10)
    pub sd_tolerance: f64,
    /// Weight of the squared cap violation in the objective (default: 1000)
    pub penalty: f64,
    /// Weights below this are dropped (default: 1e-4)
    pub weight_cutoff: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.072,
            sector_cap: 0.25,
            max_iters: 5000,
            sd_tolerance: 1e-10,
            penalty: 1000.0,
            weight_cutoff: 1e-4,
        }
    }
}

/// Return, risk and Sharpe ratio of a weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Expected annual return.
    pub expected_return: f64,
    /// Annual volatility.
    pub volatility: f64,
    /// Excess return per unit of volatility; 0 when volatility vanishes.
    pub sharpe: f64,
}

impl PortfolioStats {
    /// Evaluate `weights` against `mu` and `cov`.
    #[must_use]
    pub fn evaluate(weights: &[f64], mu: &DVector<f64>, cov: &DMatrix<f64>, risk_free: f64) -> Self {
        let w = DVector::from_column_slice(weights);
        let expected_return = w.dot(mu);
        let volatility = (w.dot(&(cov * &w))).max(0.0).sqrt();
        let sharpe = if volatility > 1e-15 {
            (expected_return - risk_free) / volatility
        } else {
            0.0
        };
        Self {
            expected_return,
            volatility,
            sharpe,
        }
    }
}

fn softmax(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let max_x = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum < 1e-15 {
        vec![1.0 / x.len() as f64; x.len()]
    } else {
        exps.iter().map(|&e| e / sum).collect()
    }
}

/// Member indices of every capped sector.
fn capped_groups(sectors: &[String]) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, sector) in sectors.iter().enumerate() {
        if sector != INDEX_BUCKET {
            groups.entry(sector.as_str()).or_default().push(i);
        }
    }
    groups.into_values().collect()
}

struct SharpeCost {
    mu: DVector<f64>,
    cov: DMatrix<f64>,
    risk_free: f64,
    groups: Vec<Vec<usize>>,
    cap: f64,
    penalty: f64,
}

impl CostFunction for SharpeCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        let w = softmax(x);
        let stats = PortfolioStats::evaluate(&w, &self.mu, &self.cov, self.risk_free);
        let excess = stats.expected_return - self.risk_free;
        let violation: f64 = self
            .groups
            .iter()
            .map(|g| (g.iter().map(|&i| w[i]).sum::<f64>() - self.cap).max(0.0).powi(2))
            .sum();
        Ok(-excess / stats.volatility.max(1e-12) + self.penalty * violation)
    }
}

/// Maximum Sharpe ratio optimizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxSharpe {
    config: OptimizerConfig,
}

impl MaxSharpe {
    /// Create an optimizer with the given settings.
    #[must_use]
    pub const fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Optimizer settings.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Long-only weights maximising the Sharpe ratio under sector caps.
    ///
    /// `sectors[i]` labels asset `i`; [`INDEX_BUCKET`] assets are uncapped.
    ///
    /// # Errors
    ///
    /// [`AugurError::OptimizationFailure`] when no asset clears the hurdle,
    /// the caps cannot hold a fully invested portfolio, or the solver fails.
    pub fn optimize(
        &self,
        mu: &DVector<f64>,
        cov: &DMatrix<f64>,
        sectors: &[String],
    ) -> Result<Vec<f64>> {
        let n = mu.len();
        if n == 0 || cov.shape() != (n, n) || sectors.len() != n {
            return Err(AugurError::OptimizationFailure(format!(
                "inconsistent problem: {n} returns, {:?} covariance, {} sectors",
                cov.shape(),
                sectors.len()
            )));
        }
        let rf = self.config.risk_free_rate;
        if !mu.iter().any(|r| *r > rf) {
            return Err(AugurError::OptimizationFailure(format!(
                "no expected return exceeds the risk-free rate {rf}"
            )));
        }
        let groups = capped_groups(sectors);
        let has_uncapped = sectors.iter().any(|s| s == INDEX_BUCKET);
        if !has_uncapped && (groups.len() as f64) * self.config.sector_cap < 1.0 - 1e-9 {
            return Err(AugurError::OptimizationFailure(format!(
                "{} sectors capped at {} cannot hold a fully invested portfolio",
                groups.len(),
                self.config.sector_cap
            )));
        }

        let cost = SharpeCost {
            mu: mu.clone(),
            cov: cov.clone(),
            risk_free: rf,
            groups,
            cap: self.config.sector_cap,
            penalty: self.config.penalty,
        };

        let x0 = vec![0.0; n];
        let mut simplex = Vec::with_capacity(n + 1);
        simplex.push(x0.clone());
        for i in 0..n {
            let mut point = x0.clone();
            point[i] = 1.0;
            simplex.push(point);
        }

        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(self.config.sd_tolerance)
            .map_err(|e| AugurError::OptimizationFailure(e.to_string()))?;
        let res = Executor::new(cost, solver)
            .configure(|state| state.max_iters(self.config.max_iters))
            .run()
            .map_err(|e| AugurError::OptimizationFailure(e.to_string()))?;
        let best = res.state.best_param.unwrap_or(x0);

        let mut weights = softmax(&best);
        drop_dust(&mut weights, self.config.weight_cutoff);
        repair_caps(&mut weights, sectors, self.config.sector_cap)?;

        let stats = PortfolioStats::evaluate(&weights, mu, cov, rf);
        debug!(
            expected_return = stats.expected_return,
            volatility = stats.volatility,
            sharpe = stats.sharpe,
            "optimized weights"
        );
        Ok(weights)
    }
}

/// Zero out weights below `cutoff` and renormalize the rest.
pub fn drop_dust(weights: &mut [f64], cutoff: f64) {
    for w in weights.iter_mut() {
        if *w < cutoff {
            *w = 0.0;
        }
    }
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }
}

/// Scale over-cap sectors down to the cap and pour the excess into sectors
/// with headroom, in proportion to their current weight.
///
/// # Errors
///
/// [`AugurError::OptimizationFailure`] when the excess cannot be absorbed.
pub fn repair_caps(weights: &mut [f64], sectors: &[String], cap: f64) -> Result<()> {
    let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, sector) in sectors.iter().enumerate() {
        members.entry(sector.as_str()).or_default().push(i);
    }
    let sector_sum = |w: &[f64], idx: &[usize]| idx.iter().map(|&i| w[i]).sum::<f64>();

    let mut excess = 0.0;
    for (sector, idx) in &members {
        let total = sector_sum(weights, idx);
        if *sector != INDEX_BUCKET && total > cap + CAP_TOLERANCE {
            for &i in idx {
                weights[i] *= cap / total;
            }
            excess += total - cap;
        }
    }

    // receiving sectors with their headroom; the index bucket is unlimited
    let mut open: Vec<(&[usize], f64)> = members
        .iter()
        .map(|(sector, idx)| {
            let room = if *sector == INDEX_BUCKET {
                f64::INFINITY
            } else {
                cap - sector_sum(weights, idx)
            };
            (idx.as_slice(), room)
        })
        .filter(|(_, room)| *room > CAP_TOLERANCE)
        .collect();

    while excess > CAP_TOLERANCE {
        if open.is_empty() {
            return Err(AugurError::OptimizationFailure(format!(
                "sector caps leave {excess:.6} of the portfolio unallocated"
            )));
        }
        let base: f64 = open.iter().map(|(idx, _)| sector_sum(weights, idx)).sum();
        let n_open = open.len() as f64;
        let mut poured = 0.0;
        for (idx, room) in &mut open {
            let group_weight = sector_sum(weights, idx);
            let share = if base > 0.0 {
                excess * group_weight / base
            } else {
                excess / n_open
            };
            let given = share.min(*room);
            for &i in *idx {
                weights[i] += if group_weight > 0.0 {
                    given * weights[i] / group_weight
                } else {
                    given / idx.len() as f64
                };
            }
            *room -= given;
            poured += given;
        }
        excess -= poured;
        open.retain(|(_, room)| *room > CAP_TOLERANCE);
    }
    Ok(())
}
