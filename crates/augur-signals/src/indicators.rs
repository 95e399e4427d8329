//! Rolling-window formulas over close and volume slices.
//!
//! Every function reads the tail of its input only and fails closed with
//! [`AugurError::InsufficientHistory`] rather than padding short windows.

use augur_traits::stats::{mean, sample_std, simple_returns};
use augur_traits::{AugurError, Result};

/// Fails unless `available >= required`.
pub fn ensure_history(available: usize, required: usize) -> Result<()> {
    if available < required {
        Err(AugurError::InsufficientHistory(format!(
            "need {required} observations, have {available}"
        )))
    } else {
        Ok(())
    }
}

/// Percent change between the last close and the close `periods` earlier.
pub fn pct_change(closes: &[f64], periods: usize) -> Result<f64> {
    ensure_history(closes.len(), periods + 1)?;
    let last = closes[closes.len() - 1];
    let base = closes[closes.len() - 1 - periods];
    Ok(last / base - 1.0)
}

/// Simple moving average of the last `window` values.
pub fn sma(values: &[f64], window: usize) -> Result<f64> {
    ensure_history(values.len(), window.max(1))?;
    let tail = &values[values.len() - window.max(1)..];
    mean(tail).ok_or_else(|| AugurError::InsufficientHistory("empty window".into()))
}

/// Standard deviation of the negative returns only.
///
/// With fewer than `min_negative` negative observations the `floor` is
/// returned instead, so a series that rarely falls is not mistaken for a
/// riskless one.
#[must_use]
pub fn downside_deviation(returns: &[f64], min_negative: usize, floor: f64) -> f64 {
    let negatives: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if negatives.len() < min_negative.max(2) {
        return floor;
    }
    sample_std(&negatives).unwrap_or(floor)
}

/// Lowest close of the last `window` observations (all of them when shorter).
#[must_use]
pub fn trailing_low(closes: &[f64], window: usize) -> Option<f64> {
    let start = closes.len().saturating_sub(window);
    closes[start..].iter().copied().reduce(f64::min)
}

/// Relative strength index with simple rolling means of gains and losses.
///
/// A window without losses reads 100; a completely flat window reads 50.
pub fn rsi(closes: &[f64], period: usize) -> Result<f64> {
    ensure_history(closes.len(), period + 1)?;
    let tail = &closes[closes.len() - period - 1..];
    let (mut gain, mut loss) = (0.0, 0.0);
    for w in tail.windows(2) {
        let delta = w[1] - w[0];
        if delta > 0.0 {
            gain += delta;
        } else {
            loss -= delta;
        }
    }
    let (avg_gain, avg_loss) = (gain / period as f64, loss / period as f64);
    Ok(match (avg_gain > 0.0, avg_loss > 0.0) {
        (_, true) => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
        (true, false) => 100.0,
        (false, false) => 50.0,
    })
}

/// Sample standard deviation of the last `window` periodic returns.
pub fn rolling_volatility(closes: &[f64], window: usize) -> Result<f64> {
    ensure_history(closes.len(), window + 1)?;
    let returns = simple_returns(&closes[closes.len() - window - 1..]);
    sample_std(&returns).ok_or_else(|| AugurError::InsufficientHistory("window below 2".into()))
}

/// Bollinger band width `(upper - lower) / middle` over the last `window` closes.
pub fn bollinger_width(closes: &[f64], window: usize, num_std: f64) -> Result<f64> {
    ensure_history(closes.len(), window.max(2))?;
    let tail = &closes[closes.len() - window.max(2)..];
    let middle = mean(tail).unwrap_or(0.0);
    let std = sample_std(tail).unwrap_or(0.0);
    if middle <= 0.0 {
        return Err(AugurError::InvalidData("non-positive band middle".into()));
    }
    Ok(2.0 * num_std * std / middle)
}

/// Last volume divided by the mean volume of the last `window` observations.
pub fn volume_ratio(volumes: &[f64], window: usize) -> Result<f64> {
    let average = sma(volumes, window)?;
    if average <= 0.0 {
        return Err(AugurError::DataUnavailable("no traded volume in window".into()));
    }
    Ok(volumes[volumes.len() - 1] / average)
}
