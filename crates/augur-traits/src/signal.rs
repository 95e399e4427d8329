//! Signal trait for computing cross-sectional factor values.
//!
//! A signal reads the price panel up to and including a date and produces one
//! raw value per asset. Ranking and blending happen downstream; a signal never
//! normalizes its own output.

use crate::{CrossSection, Date, PricePanel, PriceSeries, Result};

/// A factor that scores every asset of a panel at a date.
///
/// Implementations must be thread-safe (`Send + Sync`) so that signals can be
/// evaluated in parallel.
///
/// # Example
///
/// ```no_run
/// use augur_traits::{CrossSection, Date, PricePanel, Result, Signal, score_each_asset};
///
/// struct LastClose;
///
/// impl Signal for LastClose {
///     fn name(&self) -> &str {
///         "last_close"
///     }
///
///     fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
///         Ok(score_each_asset(panel, date, |series| {
///             series
///                 .close_as_of(date)
///                 .ok_or_else(|| "no close".into())
///         }))
///     }
///
///     fn lookback(&self) -> usize {
///         1
///     }
/// }
/// ```
pub trait Signal: Send + Sync {
    /// Returns the name of this signal.
    ///
    /// Used as the column name in exported frames and in logs.
    fn name(&self) -> &str;

    /// Computes raw values for every non-benchmark asset at `date`.
    ///
    /// Only observations dated on or before `date` may be read. Assets that
    /// cannot be scored are recorded in [`CrossSection::excluded`].
    ///
    /// # Errors
    ///
    /// Returns an error only when the whole cross-section cannot be built,
    /// e.g. when the benchmark itself lacks history for a relative measure.
    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection>;

    /// Minimum number of observations an asset needs before it is scored.
    fn lookback(&self) -> usize;
}

/// Applies `f` to every non-benchmark series and gathers the results.
pub fn score_each_asset<F>(panel: &PricePanel, date: Date, f: F) -> CrossSection
where
    F: Fn(&PriceSeries) -> Result<f64>,
{
    CrossSection::from_results(
        date,
        panel
            .assets()
            .map(|series| (series.symbol().to_string(), f(series))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AugurError;

    struct TestSignal {
        lookback: usize,
    }

    impl Signal for TestSignal {
        fn name(&self) -> &str {
            "test_signal"
        }

        fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
            Ok(score_each_asset(panel, date, |series| {
                let closes = series.closes_until(date);
                if closes.len() < self.lookback {
                    return Err(AugurError::InsufficientHistory(format!(
                        "{} < {}",
                        closes.len(),
                        self.lookback
                    )));
                }
                Ok(closes[closes.len() - 1])
            }))
        }

        fn lookback(&self) -> usize {
            self.lookback
        }
    }

    fn panel() -> PricePanel {
        let d1 = Date::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = Date::from_ymd_opt(2024, 1, 2).unwrap();
        PricePanel::new(
            "^NSEI",
            vec![
                PriceSeries::new("^NSEI", vec![d1, d2], vec![100.0, 101.0]).unwrap(),
                PriceSeries::new("A", vec![d1, d2], vec![10.0, 11.0]).unwrap(),
                PriceSeries::new("B", vec![d2], vec![20.0]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_score_excludes_short_history() {
        let signal = TestSignal { lookback: 2 };
        let date = Date::from_ymd_opt(2024, 1, 2).unwrap();
        let section = signal.score(&panel(), date).unwrap();
        assert_eq!(section.get("A"), Some(11.0));
        assert!(section.excluded().contains_key("B"));
        assert!(section.get("^NSEI").is_none());
    }

    #[test]
    fn test_signal_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn Signal>>();
    }

    #[test]
    fn test_signal_lookback() {
        let signal = TestSignal { lookback: 30 };
        assert_eq!(signal.lookback(), 30);
        assert_eq!(signal.name(), "test_signal");
    }
}
