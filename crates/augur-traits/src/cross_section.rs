//! Per-date cross-sections of a single measurement.

use std::collections::BTreeMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::stats::percentile_ranks;
use crate::{AugurError, Date, Result, Symbol};

/// One value per asset at one date, plus the assets that could not be scored.
///
/// Failures are kept with their reason instead of being dropped, so a caller
/// can report why an asset is missing from a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    date: Date,
    values: BTreeMap<Symbol, f64>,
    excluded: BTreeMap<Symbol, String>,
}

impl CrossSection {
    /// Creates an empty cross-section.
    #[must_use]
    pub const fn new(date: Date) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
            excluded: BTreeMap::new(),
        }
    }

    /// Collects per-asset results; errors become exclusions.
    pub fn from_results(
        date: Date,
        results: impl IntoIterator<Item = (Symbol, Result<f64>)>,
    ) -> Self {
        let mut section = Self::new(date);
        for (symbol, result) in results {
            match result {
                Ok(value) => section.insert(symbol, value),
                Err(err) => section.exclude(symbol, err.to_string()),
            }
        }
        section
    }

    /// Records a value; non-finite values are recorded as exclusions.
    pub fn insert(&mut self, symbol: impl Into<Symbol>, value: f64) {
        let symbol = symbol.into();
        if value.is_finite() {
            self.excluded.remove(&symbol);
            self.values.insert(symbol, value);
        } else {
            self.exclude(symbol, format!("non-finite value {value}"));
        }
    }

    /// Records an exclusion and drops any value previously held.
    pub fn exclude(&mut self, symbol: impl Into<Symbol>, reason: impl Into<String>) {
        let symbol = symbol.into();
        self.values.remove(&symbol);
        self.excluded.insert(symbol, reason.into());
    }

    /// The date this cross-section describes.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// Value for `symbol`, if it was scored.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.values.get(symbol).copied()
    }

    /// Scored values in symbol order.
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<Symbol, f64> {
        &self.values
    }

    /// Excluded symbols and the reason for each.
    #[must_use]
    pub const fn excluded(&self) -> &BTreeMap<Symbol, String> {
        &self.excluded
    }

    /// Number of scored assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no asset was scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Percentile ranks of the scored values (largest = 1.0).
    #[must_use]
    pub fn percentile_ranks(&self) -> BTreeMap<Symbol, f64> {
        let values: Vec<f64> = self.values.values().copied().collect();
        self.values
            .keys()
            .cloned()
            .zip(percentile_ranks(&values))
            .collect()
    }

    /// Converts the scored values into a `symbol`/`value` DataFrame.
    ///
    /// # Errors
    ///
    /// Propagates DataFrame construction failures.
    pub fn to_frame(&self, value_column: &str) -> Result<DataFrame> {
        let symbols: Vec<&str> = self.values.keys().map(String::as_str).collect();
        let values: Vec<f64> = self.values.values().copied().collect();
        DataFrame::new(vec![
            Column::new("symbol".into(), symbols),
            Column::new(value_column.into(), values),
        ])
        .map_err(AugurError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date() -> Date {
        Date::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[test]
    fn test_from_results_records_failures() {
        let section = CrossSection::from_results(
            date(),
            vec![
                ("A".to_string(), Ok(0.2)),
                (
                    "B".to_string(),
                    Err(AugurError::InsufficientHistory("12 < 200".into())),
                ),
            ],
        );
        assert_eq!(section.len(), 1);
        assert!(section.excluded()["B"].contains("12 < 200"));
    }

    #[test]
    fn test_non_finite_is_excluded() {
        let mut section = CrossSection::new(date());
        section.insert("A", f64::NAN);
        assert!(section.is_empty());
        assert!(section.excluded().contains_key("A"));
        section.insert("A", 1.0);
        assert_eq!(section.get("A"), Some(1.0));
        assert!(section.excluded().is_empty());
    }

    #[test]
    fn test_percentile_ranks() {
        let mut section = CrossSection::new(date());
        section.insert("A", 0.3);
        section.insert("B", -0.1);
        section.insert("C", 0.1);
        section.insert("D", 0.5);
        let ranks = section.percentile_ranks();
        assert_relative_eq!(ranks["D"], 1.0);
        assert_relative_eq!(ranks["B"], 0.25);
    }

    #[test]
    fn test_to_frame() {
        let mut section = CrossSection::new(date());
        section.insert("A", 0.3);
        section.insert("B", -0.1);
        let df = section.to_frame("momentum").unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.column("momentum").is_ok());
    }
}
