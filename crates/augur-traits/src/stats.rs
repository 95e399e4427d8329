//! Statistical utility functions shared by factors, scorers and evaluators.

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (N-1 denominator), `None` with fewer than two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Simple periodic returns `p[t] / p[t-1] - 1`.
#[must_use]
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Average ranks starting at 1, ties sharing the mean of their positions.
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j are tied; 1-based average
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Percentile ranks in `(0, 1]`: average rank divided by the count.
///
/// The largest value gets 1.0. Matches the `rank(pct=True)` convention.
///
/// # Examples
///
/// ```
/// use augur_traits::stats::percentile_ranks;
///
/// let ranks = percentile_ranks(&[0.3, 0.1, 0.2, 0.2]);
/// assert_eq!(ranks, vec![1.0, 0.25, 0.625, 0.625]);
/// ```
#[must_use]
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    average_ranks(values).into_iter().map(|r| r / n).collect()
}

/// Pearson correlation of two equally long slices.
///
/// `None` when lengths differ, fewer than two points exist, or either side
/// has (near) zero variance.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let (mut cov, mut vx, mut vy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    let denom = (vx * vy).sqrt();
    if denom < MIN_STD_THRESHOLD {
        None
    } else {
        Some(cov / denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(mean(&values).unwrap(), 3.0);
        assert_relative_eq!(sample_std(&values).unwrap(), 2.5_f64.sqrt());
        assert!(mean(&[]).is_none());
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn test_simple_returns() {
        let r = simple_returns(&[100.0, 110.0, 99.0]);
        assert_relative_eq!(r[0], 0.1);
        assert_relative_eq!(r[1], -0.1);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        assert_eq!(average_ranks(&[5.0, 1.0, 5.0, 3.0]), vec![3.5, 1.0, 3.5, 2.0]);
    }

    #[test]
    fn test_percentile_ranks_best_is_one() {
        let ranks = percentile_ranks(&[0.5, -0.2, 0.9]);
        assert_relative_eq!(ranks[2], 1.0);
        assert_relative_eq!(ranks[1], 1.0 / 3.0);
        assert!(percentile_ranks(&[]).is_empty());
    }

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert_relative_eq!(pearson(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
        let neg = [8.0, 6.0, 4.0, 2.0];
        assert_relative_eq!(pearson(&x, &neg).unwrap(), -1.0, epsilon = 1e-12);
        assert!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]).is_none());
        assert!(pearson(&x, &y[..3]).is_none());
    }
}
