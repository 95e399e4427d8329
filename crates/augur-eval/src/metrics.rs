//! Performance and signal quality metrics.
//!
//! This module provides:
//! - Sharpe ratio of periodic returns
//! - Maximum drawdown of a value history
//! - Information ratio of an IC series (mean IC / std IC)

use augur_traits::stats::{MIN_STD_THRESHOLD, mean, sample_std};
use serde::{Deserialize, Serialize};

/// Annualized Sharpe ratio `mean / std × √periods_per_year` with a zero
/// risk-free rate.
///
/// Uses the sample standard deviation. Returns 0 with fewer than two
/// finite returns or when every return is identical; any dispersion at all
/// gives a ratio.
///
/// # Example
///
/// ```rust
/// use augur_eval::metrics::sharpe_ratio;
///
/// assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 12.0), 0.0);
/// ```
#[must_use]
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    let valid: Vec<f64> = returns.iter().copied().filter(|x| x.is_finite()).collect();
    // identical returns can leave rounding residue in the std
    if valid.windows(2).all(|w| w[0] == w[1]) {
        return 0.0;
    }
    match (mean(&valid), sample_std(&valid)) {
        (Some(m), Some(s)) if s > 0.0 => m / s * periods_per_year.sqrt(),
        _ => 0.0,
    }
}

/// Worst peak-to-trough loss `min((v - peak) / peak)`, in `[-1, 0]`.
#[must_use]
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;
    for &v in values {
        peak = peak.max(v);
        if peak > 0.0 {
            worst = worst.min((v - peak) / peak);
        }
    }
    worst.max(-1.0)
}

/// `last / first - 1`, 0 for fewer than two values.
#[must_use]
pub fn total_return(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if values.len() > 1 && first > 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

/// Information Ratio: mean IC divided by standard deviation of IC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InformationRatio {
    /// Mean IC
    pub mean_ic: f64,
    /// Standard deviation of IC
    pub std_ic: f64,
    /// Information Ratio
    pub ir: f64,
    /// Share of positive ICs
    pub hit_rate: f64,
    /// Number of observations
    pub n_obs: usize,
}

impl InformationRatio {
    /// Summarize an IC series, ignoring non-finite entries.
    ///
    /// `None` with fewer than `min_observations` finite values. The ratio is
    /// 0 when the ICs do not vary.
    #[must_use]
    pub fn calculate(ic_series: &[f64], min_observations: usize) -> Option<Self> {
        let valid: Vec<f64> = ic_series.iter().copied().filter(|x| x.is_finite()).collect();
        let n_obs = valid.len();
        if n_obs < min_observations.max(2) {
            return None;
        }
        let mean_ic = mean(&valid)?;
        let std_ic = sample_std(&valid)?;
        let positive = valid.iter().filter(|ic| **ic > 0.0).count();
        Some(Self {
            mean_ic,
            std_ic,
            ir: if std_ic > MIN_STD_THRESHOLD { mean_ic / std_ic } else { 0.0 },
            hit_rate: positive as f64 / n_obs as f64,
            n_obs,
        })
    }
}
