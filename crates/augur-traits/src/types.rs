//! Common types used throughout the augur framework.
//!
//! Market data enters the system as a long-format Polars DataFrame
//! (`date`, `symbol`, `close`, optional `volume`) and is converted into a
//! typed [`PricePanel`] before any factor is computed.

use std::collections::BTreeMap;

use polars::prelude::*;

use crate::series::{PricePanel, PriceSeries};
use crate::{AugurError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, e.g. `"RELIANCE.NS"` or `"^NSEI"`.
pub type Symbol = String;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch, used to decode Polars dates.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Container for market data.
///
/// `MarketData` wraps a Polars DataFrame in long format.
///
/// # Expected Schema
///
/// - `date`: trading date (`Date` dtype, or `YYYY-MM-DD` strings)
/// - `symbol`: security identifier
/// - `close`: closing price
/// - `volume`: optional traded volume
///
/// # Example
///
/// ```no_run
/// use augur_traits::MarketData;
/// use polars::prelude::*;
///
/// let df = df! {
///     "date" => &["2024-01-01", "2024-01-01"],
///     "symbol" => &["TCS.NS", "^NSEI"],
///     "close" => &[3800.0, 21700.0],
/// }.unwrap();
///
/// let market_data = MarketData::new(df);
/// let panel = market_data.price_panel("^NSEI").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    /// The underlying DataFrame containing market data.
    data: DataFrame,
}

impl MarketData {
    /// Columns every price table must carry.
    pub const REQUIRED_COLUMNS: [&'static str; 3] = ["date", "symbol", "close"];

    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows in the market data.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the market data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks if a column exists in the market data.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Converts the long table into a [`PricePanel`] keyed by symbol.
    ///
    /// Rows with a null close are skipped. The `volume` column is attached to
    /// every series when present.
    ///
    /// # Errors
    ///
    /// - [`AugurError::MissingColumn`] when `date`, `symbol` or `close` is absent
    /// - [`AugurError::InvalidData`] for unparseable dates or duplicated dates
    /// - [`AugurError::DataUnavailable`] when the benchmark has no rows
    pub fn price_panel(&self, benchmark: &str) -> Result<PricePanel> {
        for col in Self::REQUIRED_COLUMNS {
            if !self.has_column(col) {
                return Err(AugurError::MissingColumn(col.to_string()));
            }
        }

        let dates = decode_dates(self.data.column("date")?)?;
        let symbols = self.data.column("symbol")?.as_materialized_series().str()?.clone();
        let closes = self
            .data
            .column("close")?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let closes = closes.f64()?;

        let volumes = if self.has_column("volume") {
            Some(
                self.data
                    .column("volume")?
                    .as_materialized_series()
                    .cast(&DataType::Float64)?,
            )
        } else {
            None
        };
        let volumes = volumes.as_ref().map(|s| s.f64()).transpose()?;

        let mut rows: BTreeMap<Symbol, Vec<(Date, f64, Option<f64>)>> = BTreeMap::new();
        for (i, date) in dates.into_iter().enumerate() {
            let (Some(symbol), Some(close)) = (symbols.get(i), closes.get(i)) else {
                continue;
            };
            let volume = volumes.and_then(|v| v.get(i));
            rows.entry(symbol.to_string())
                .or_default()
                .push((date, close, volume));
        }

        let mut series = Vec::with_capacity(rows.len());
        for (symbol, mut points) in rows {
            points.sort_by_key(|(date, _, _)| *date);
            let dates = points.iter().map(|(d, _, _)| *d).collect();
            let closes = points.iter().map(|(_, c, _)| *c).collect();
            let mut s = PriceSeries::new(symbol, dates, closes)?;
            if volumes.is_some() {
                s = s.with_volumes(points.iter().map(|(_, _, v)| v.unwrap_or(0.0)).collect())?;
            }
            series.push(s);
        }

        PricePanel::new(benchmark, series)
    }
}

fn decode_dates(column: &Column) -> Result<Vec<Date>> {
    let series = column.as_materialized_series();
    match series.dtype() {
        DataType::Date => series
            .date()?
            .into_iter()
            .map(|d: Option<i32>| {
                d.and_then(|d| Date::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE))
                    .ok_or_else(|| AugurError::InvalidData("null or out-of-range date".into()))
            })
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|s| {
                let s = s.ok_or_else(|| AugurError::InvalidData("null date".into()))?;
                Date::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|e| AugurError::InvalidDate(format!("{s}: {e}")))
            })
            .collect(),
        other => Err(AugurError::InvalidData(format!(
            "unsupported date column type {other}"
        ))),
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_table() -> DataFrame {
        df! {
            "date" => &["2024-01-02", "2024-01-01", "2024-01-01", "2024-01-02"],
            "symbol" => &["INFY.NS", "INFY.NS", "^NSEI", "^NSEI"],
            "close" => &[1510.0, 1500.0, 21700.0, 21750.0],
            "volume" => &[1000, 1200, 0, 0],
        }
        .unwrap()
    }

    #[test]
    fn test_market_data_new() {
        let market_data = MarketData::new(DataFrame::default());
        assert!(market_data.is_empty());
    }

    #[test]
    fn test_price_panel_sorts_each_series() {
        let panel = MarketData::new(long_table()).price_panel("^NSEI").unwrap();
        let infy = panel.get("INFY.NS").unwrap();
        assert_eq!(infy.closes(), &[1500.0, 1510.0]);
        assert_eq!(infy.volumes(), Some(&[1200.0, 1000.0][..]));
        assert_eq!(panel.benchmark(), "^NSEI");
        assert_eq!(panel.len(), 1);
    }

    #[test]
    fn test_price_panel_missing_column() {
        let df = df! {
            "symbol" => &["INFY.NS"],
            "close" => &[1500.0],
        }
        .unwrap();
        let err = MarketData::new(df).price_panel("^NSEI").unwrap_err();
        assert!(matches!(err, AugurError::MissingColumn(ref c) if c == "date"));
    }

    #[test]
    fn test_price_panel_missing_benchmark() {
        let err = MarketData::new(long_table())
            .price_panel("^BSESN")
            .unwrap_err();
        assert!(matches!(err, AugurError::DataUnavailable(_)));
    }

    #[test]
    fn test_price_panel_rejects_bad_date() {
        let df = df! {
            "date" => &["2024-13-45"],
            "symbol" => &["^NSEI"],
            "close" => &[21700.0],
        }
        .unwrap();
        let err = MarketData::new(df).price_panel("^NSEI").unwrap_err();
        assert!(matches!(err, AugurError::InvalidDate(_)));
    }

    #[test]
    fn test_price_panel_rejects_duplicate_dates() {
        let df = df! {
            "date" => &["2024-01-01", "2024-01-01"],
            "symbol" => &["^NSEI", "^NSEI"],
            "close" => &[21700.0, 21710.0],
        }
        .unwrap();
        let err = MarketData::new(df).price_panel("^NSEI").unwrap_err();
        assert!(matches!(err, AugurError::InvalidData(_)));
    }

    #[test]
    fn test_has_column() {
        let market_data = MarketData::new(long_table());
        assert!(market_data.has_column("close"));
        assert!(!market_data.has_column("open"));
    }
}
