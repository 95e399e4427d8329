//! Covariance estimators over a returns matrix (periods by assets).

use nalgebra::DMatrix;

/// Column means subtracted from every row.
fn centered(returns: &DMatrix<f64>) -> DMatrix<f64> {
    let mut x = returns.clone();
    for mut col in x.column_iter_mut() {
        let mean = col.mean();
        col.add_scalar_mut(-mean);
    }
    x
}

/// Unbiased sample covariance (n − 1 denominator).
///
/// Returns a zero matrix when fewer than two periods exist.
#[must_use]
pub fn sample_covariance(returns: &DMatrix<f64>) -> DMatrix<f64> {
    let (n, p) = returns.shape();
    if n < 2 {
        return DMatrix::zeros(p, p);
    }
    let x = centered(returns);
    (x.transpose() * &x) / (n - 1) as f64
}

/// Ledoit–Wolf shrinkage towards a scaled identity.
///
/// The target is `μ·I` with `μ` the mean sample variance; the returned pair is
/// the shrunk covariance and the shrinkage intensity in `[0, 1]`. Uses the
/// biased (1/n) sample covariance as the shrinkage source.
#[must_use]
pub fn ledoit_wolf(returns: &DMatrix<f64>) -> (DMatrix<f64>, f64) {
    let (n, p) = returns.shape();
    if n == 0 || p == 0 {
        return (DMatrix::zeros(p, p), 0.0);
    }
    let nf = n as f64;
    let pf = p as f64;

    let x = centered(returns);
    let emp = (x.transpose() * &x) / nf;
    let trace = emp.trace();
    let mu = trace / pf;

    let x2 = x.map(|v| v * v);
    let beta_raw = (x2.transpose() * &x2).sum();
    let delta_raw = emp.map(|v| v * v).sum();

    let beta = (beta_raw / nf - delta_raw) / (pf * nf);
    let delta = (delta_raw - 2.0 * mu * trace + pf * mu * mu) / pf;
    let beta = beta.min(delta);
    let shrinkage = if beta == 0.0 || delta == 0.0 {
        0.0
    } else {
        (beta / delta).clamp(0.0, 1.0)
    };

    let mut shrunk = emp * (1.0 - shrinkage);
    for i in 0..p {
        shrunk[(i, i)] += shrinkage * mu;
    }
    (shrunk, shrinkage)
}

/// Scale a per-period covariance to an annual one.
#[must_use]
pub fn annualize(cov: DMatrix<f64>, periods_per_year: f64) -> DMatrix<f64> {
    cov * periods_per_year
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn returns() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            6,
            3,
            &[
                0.01, 0.02, -0.01, //
                0.00, -0.01, 0.02, //
                0.02, 0.01, 0.00, //
                -0.01, 0.00, 0.01, //
                0.03, 0.02, -0.02, //
                0.01, -0.02, 0.01,
            ],
        )
    }

    #[test]
    fn test_sample_covariance() {
        let cov = sample_covariance(&returns());
        assert_relative_eq!(cov[(0, 0)], 2.0e-4, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], 1.2e-4, epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 2)], -2.066_666_666_666_667e-4, epsilon = 1e-12);
    }

    #[test]
    fn test_ledoit_wolf_matches_reference() {
        let (cov, shrinkage) = ledoit_wolf(&returns());
        assert_relative_eq!(shrinkage, 0.273_116_476_144_238_1, epsilon = 1e-10);
        assert_relative_eq!(cov[(0, 0)], 1.729_888_073_181_536_3e-4, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], 7.268_835_238_557_618e-5, epsilon = 1e-12);
        assert_relative_eq!(cov[(2, 2)], 1.830_844_118_161_503_8e-4, epsilon = 1e-12);
    }

    #[test]
    fn test_shrunk_is_symmetric_and_positive_definite() {
        let (cov, _) = ledoit_wolf(&returns());
        assert_relative_eq!(cov.clone(), cov.transpose(), epsilon = 1e-15);
        assert!(cov.cholesky().is_some());
    }

    #[test]
    fn test_degenerate_inputs() {
        let (cov, shrinkage) = ledoit_wolf(&DMatrix::zeros(0, 2));
        assert_eq!(cov.shape(), (2, 2));
        assert_eq!(shrinkage, 0.0);
        assert_eq!(sample_covariance(&DMatrix::zeros(1, 3)), DMatrix::zeros(3, 3));
    }

    #[test]
    fn test_annualize() {
        let cov = annualize(DMatrix::identity(2, 2), 252.0);
        assert_relative_eq!(cov[(1, 1)], 252.0);
    }
}
