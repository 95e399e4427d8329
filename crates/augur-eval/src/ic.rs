//! Information Coefficient (IC) calculations.
//!
//! IC is the Spearman rank correlation between scores and the returns that
//! followed them.

use std::collections::BTreeMap;

use augur_traits::Symbol;
use augur_traits::stats::{average_ranks, pearson};

/// Spearman rank correlation between scores and forward returns.
///
/// Pairs with a non-finite side are dropped. `None` when the inputs differ
/// in length, fewer than two pairs remain, or either side is constant.
///
/// # Example
///
/// ```rust
/// use augur_eval::rank_ic;
///
/// let ic = rank_ic(&[1.5, 0.3, -0.8, 2.1], &[0.02, 0.01, -0.01, 0.03]).unwrap();
/// assert!((ic - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn rank_ic(scores: &[f64], forward_returns: &[f64]) -> Option<f64> {
    if scores.len() != forward_returns.len() {
        return None;
    }
    let (s, r): (Vec<f64>, Vec<f64>) = scores
        .iter()
        .zip(forward_returns)
        .filter(|(s, r)| s.is_finite() && r.is_finite())
        .map(|(s, r)| (*s, *r))
        .unzip();
    if s.len() < 2 {
        return None;
    }
    pearson(&average_ranks(&s), &average_ranks(&r))
}

/// Rank IC over the symbols present in both maps.
#[must_use]
pub fn cross_sectional_ic(
    scores: &BTreeMap<Symbol, f64>,
    forward_returns: &BTreeMap<Symbol, f64>,
) -> Option<f64> {
    let (s, r): (Vec<f64>, Vec<f64>) = scores
        .iter()
        .filter_map(|(symbol, score)| forward_returns.get(symbol).map(|ret| (*score, *ret)))
        .unzip();
    rank_ic(&s, &r)
}
