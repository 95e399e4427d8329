//! Typed price history: one [`PriceSeries`] per symbol, collected into a [`PricePanel`].

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{AugurError, Date, Result, Symbol};

/// Ordered close prices for one symbol.
///
/// Dates are strictly increasing and every close is finite and positive.
/// Volumes, when present, have the same length as the closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: Symbol,
    dates: Vec<Date>,
    closes: Vec<f64>,
    volumes: Option<Vec<f64>>,
}

impl PriceSeries {
    /// Builds a series, validating ordering and price values.
    ///
    /// # Errors
    ///
    /// Returns [`AugurError::InvalidData`] when lengths differ, a date is not
    /// strictly after its predecessor, or a close is non-finite or not positive.
    pub fn new(symbol: impl Into<Symbol>, dates: Vec<Date>, closes: Vec<f64>) -> Result<Self> {
        let symbol = symbol.into();
        if dates.len() != closes.len() {
            return Err(AugurError::InvalidData(format!(
                "{symbol}: {} dates but {} closes",
                dates.len(),
                closes.len()
            )));
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(AugurError::InvalidData(format!(
                "{symbol}: dates not strictly increasing at {}",
                w[1]
            )));
        }
        if let Some(bad) = closes.iter().find(|c| !c.is_finite() || **c <= 0.0) {
            return Err(AugurError::InvalidData(format!(
                "{symbol}: close {bad} is not a positive finite price"
            )));
        }

        Ok(Self {
            symbol,
            dates,
            closes,
            volumes: None,
        })
    }

    /// Attaches traded volumes.
    ///
    /// # Errors
    ///
    /// Returns [`AugurError::InvalidData`] on a length mismatch or a negative volume.
    pub fn with_volumes(mut self, volumes: Vec<f64>) -> Result<Self> {
        if volumes.len() != self.closes.len() {
            return Err(AugurError::InvalidData(format!(
                "{}: {} volumes for {} closes",
                self.symbol,
                volumes.len(),
                self.closes.len()
            )));
        }
        if volumes.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(AugurError::InvalidData(format!(
                "{}: negative or non-finite volume",
                self.symbol
            )));
        }
        self.volumes = Some(volumes);
        Ok(self)
    }

    /// The symbol this series belongs to.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All observation dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// All closes.
    #[must_use]
    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// All volumes, if the series carries them.
    #[must_use]
    pub fn volumes(&self) -> Option<&[f64]> {
        self.volumes.as_deref()
    }

    /// Number of observations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.closes.len()
    }

    /// Whether the series has no observations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Number of observations dated on or before `date`.
    #[must_use]
    pub fn observations_until(&self, date: Date) -> usize {
        self.dates.partition_point(|d| *d <= date)
    }

    /// Closes dated on or before `date`; never looks past it.
    #[must_use]
    pub fn closes_until(&self, date: Date) -> &[f64] {
        &self.closes[..self.observations_until(date)]
    }

    /// Volumes dated on or before `date`.
    #[must_use]
    pub fn volumes_until(&self, date: Date) -> Option<&[f64]> {
        let n = self.observations_until(date);
        self.volumes.as_deref().map(|v| &v[..n])
    }

    /// Last close on or before `date` (forward fill).
    #[must_use]
    pub fn close_as_of(&self, date: Date) -> Option<f64> {
        self.closes_until(date).last().copied()
    }

    /// Date of the last observation on or before `date`.
    #[must_use]
    pub fn last_date_until(&self, date: Date) -> Option<Date> {
        self.dates[..self.observations_until(date)].last().copied()
    }
}

/// Close histories for a universe plus its mandatory benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePanel {
    benchmark: PriceSeries,
    assets: BTreeMap<Symbol, PriceSeries>,
}

impl PricePanel {
    /// Builds a panel from a set of series; the benchmark must be among them.
    ///
    /// # Errors
    ///
    /// - [`AugurError::DataUnavailable`] when no series carries the benchmark symbol
    /// - [`AugurError::InvalidData`] when a symbol appears twice
    pub fn new(
        benchmark: &str,
        series: impl IntoIterator<Item = PriceSeries>,
    ) -> Result<Self> {
        let mut bench = None;
        let mut assets = BTreeMap::new();
        for s in series {
            if s.symbol() == benchmark {
                if bench.replace(s).is_some() {
                    return Err(AugurError::InvalidData(format!(
                        "duplicate series for {benchmark}"
                    )));
                }
                continue;
            }
            let symbol = s.symbol().to_string();
            if assets.insert(symbol.clone(), s).is_some() {
                return Err(AugurError::InvalidData(format!(
                    "duplicate series for {symbol}"
                )));
            }
        }

        let benchmark = bench.ok_or_else(|| {
            AugurError::DataUnavailable(format!("benchmark {benchmark} has no price history"))
        })?;

        Ok(Self { benchmark, assets })
    }

    /// The benchmark symbol.
    #[must_use]
    pub fn benchmark(&self) -> &str {
        self.benchmark.symbol()
    }

    /// The benchmark series.
    #[must_use]
    pub const fn benchmark_series(&self) -> &PriceSeries {
        &self.benchmark
    }

    /// Non-benchmark series in symbol order.
    pub fn assets(&self) -> impl Iterator<Item = &PriceSeries> {
        self.assets.values()
    }

    /// Non-benchmark symbols in order.
    pub fn asset_symbols(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    /// Looks up any series, benchmark included.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        if symbol == self.benchmark.symbol() {
            Some(&self.benchmark)
        } else {
            self.assets.get(symbol)
        }
    }

    /// Number of non-benchmark assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the panel holds no assets besides the benchmark.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Sorted union of every observation date in the panel.
    #[must_use]
    pub fn calendar(&self) -> Vec<Date> {
        let mut dates: Vec<Date> = std::iter::once(&self.benchmark)
            .chain(self.assets.values())
            .flat_map(|s| s.dates().iter().copied())
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Last trading date of each calendar month within `[start, end]`.
    #[must_use]
    pub fn month_ends(&self, start: Option<Date>, end: Option<Date>) -> Vec<Date> {
        let calendar: Vec<Date> = self
            .calendar()
            .into_iter()
            .filter(|d| start.is_none_or(|s| *d >= s) && end.is_none_or(|e| *d <= e))
            .collect();

        let mut out: Vec<Date> = Vec::new();
        for date in calendar {
            match out.last_mut() {
                Some(last) if (last.year(), last.month()) == (date.year(), date.month()) => {
                    *last = date;
                }
                _ => out.push(date),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(symbol: &str, dates: &[Date], closes: &[f64]) -> PriceSeries {
        PriceSeries::new(symbol, dates.to_vec(), closes.to_vec()).unwrap()
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let err = PriceSeries::new("A", vec![d(2024, 1, 2), d(2024, 1, 1)], vec![1.0, 2.0]);
        assert!(matches!(err, Err(AugurError::InvalidData(_))));
    }

    #[test]
    fn test_series_rejects_non_positive_close() {
        let err = PriceSeries::new("A", vec![d(2024, 1, 1)], vec![0.0]);
        assert!(err.is_err());
        let err = PriceSeries::new("A", vec![d(2024, 1, 1)], vec![f64::NAN]);
        assert!(err.is_err());
    }

    #[test]
    fn test_closes_until_never_looks_ahead() {
        let s = series(
            "A",
            &[d(2024, 1, 1), d(2024, 1, 3), d(2024, 1, 5)],
            &[10.0, 11.0, 12.0],
        );
        assert_eq!(s.closes_until(d(2024, 1, 4)), &[10.0, 11.0]);
        assert_eq!(s.close_as_of(d(2024, 1, 4)), Some(11.0));
        assert_eq!(s.close_as_of(d(2023, 12, 31)), None);
        assert_eq!(s.last_date_until(d(2024, 1, 9)), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_volume_length_checked() {
        let s = series("A", &[d(2024, 1, 1)], &[10.0]);
        assert!(s.clone().with_volumes(vec![1.0, 2.0]).is_err());
        let s = s.with_volumes(vec![5.0]).unwrap();
        assert_eq!(s.volumes_until(d(2024, 1, 1)), Some(&[5.0][..]));
    }

    #[test]
    fn test_panel_requires_benchmark() {
        let a = series("A", &[d(2024, 1, 1)], &[10.0]);
        let err = PricePanel::new("^NSEI", vec![a]).unwrap_err();
        assert!(matches!(err, AugurError::DataUnavailable(_)));
    }

    #[test]
    fn test_panel_rejects_duplicates() {
        let a = series("A", &[d(2024, 1, 1)], &[10.0]);
        let b = series("^NSEI", &[d(2024, 1, 1)], &[10.0]);
        let err = PricePanel::new("^NSEI", vec![a.clone(), a, b]).unwrap_err();
        assert!(matches!(err, AugurError::InvalidData(_)));
    }

    #[test]
    fn test_month_ends_pick_last_trading_day() {
        let bench = series(
            "^NSEI",
            &[
                d(2024, 1, 30),
                d(2024, 1, 31),
                d(2024, 2, 1),
                d(2024, 2, 28),
                d(2024, 3, 4),
            ],
            &[1.0, 1.0, 1.0, 1.0, 1.0],
        );
        let panel = PricePanel::new("^NSEI", vec![bench]).unwrap();
        assert_eq!(
            panel.month_ends(None, None),
            vec![d(2024, 1, 31), d(2024, 2, 28), d(2024, 3, 4)]
        );
        assert_eq!(
            panel.month_ends(Some(d(2024, 2, 1)), Some(d(2024, 2, 29))),
            vec![d(2024, 2, 28)]
        );
    }

    #[test]
    fn test_panel_lookup_includes_benchmark() {
        let a = series("A", &[d(2024, 1, 2)], &[10.0]);
        let b = series("^NSEI", &[d(2024, 1, 1)], &[10.0]);
        let panel = PricePanel::new("^NSEI", vec![a, b]).unwrap();
        assert!(panel.get("^NSEI").is_some());
        assert_eq!(panel.asset_symbols().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(panel.calendar(), vec![d(2024, 1, 1), d(2024, 1, 2)]);
    }
}
