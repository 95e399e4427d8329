//! File loading utilities for the augur CLI.
//!
//! Prices and sectors are CSV; sentiment and fundamental scores are JSON
//! objects keyed by symbol.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use augur_combine::ScoringContext;
use augur_traits::{AugurError, Date, MarketData, PricePanel, SectorMap};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::de::DeserializeOwned;
use tracing::info;

fn read_csv(path: &Path) -> Result<DataFrame, AugurError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()?;
    Ok(df)
}

/// Load a long-format price table (`date,symbol,close[,volume]`).
pub(crate) fn load_market_data(path: &Path) -> Result<MarketData, AugurError> {
    let df = read_csv(path)?;
    info!(path = %path.display(), rows = df.height(), "loaded prices");
    Ok(MarketData::new(df))
}

/// Load prices and build a panel around `benchmark`.
pub(crate) fn load_panel(path: &Path, benchmark: &str) -> Result<PricePanel, AugurError> {
    load_market_data(path)?.price_panel(benchmark)
}

/// Load a `symbol,sector` table. No path gives an empty map.
pub(crate) fn load_sectors(path: Option<&Path>) -> Result<SectorMap, AugurError> {
    let Some(path) = path else {
        return Ok(SectorMap::new());
    };
    let df = read_csv(path)?;
    let symbols = df.column("symbol")?.as_materialized_series().str()?;
    let sectors = df.column("sector")?.as_materialized_series().str()?;
    let map: SectorMap = symbols
        .into_iter()
        .zip(sectors)
        .filter_map(|(s, t)| Some((s?.to_string(), t?.to_string())))
        .collect();
    info!(path = %path.display(), classified = map.len(), "loaded sectors");
    Ok(map)
}

fn load_json<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, AugurError> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| AugurError::DataUnavailable(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| AugurError::InvalidData(format!("{}: {e}", path.display())))
}

/// Sentiment, fundamental scores and valuation upside from optional JSON files.
pub(crate) fn load_context(
    sentiment: Option<&Path>,
    fundamentals: Option<&Path>,
    upside: Option<&Path>,
) -> Result<ScoringContext, AugurError> {
    Ok(ScoringContext {
        sentiment: load_json::<BTreeMap<String, f64>>(sentiment)?,
        fundamentals: load_json::<BTreeMap<String, u8>>(fundamentals)?,
        upside: load_json::<BTreeMap<String, f64>>(upside)?,
    })
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, AugurError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| AugurError::InvalidDate(format!("{date_str}: {e}")))
}

/// The requested date, or the last date in the panel.
pub(crate) fn resolve_date(panel: &PricePanel, date: Option<&str>) -> Result<Date, AugurError> {
    match date {
        Some(d) => parse_date(d),
        None => panel
            .calendar()
            .last()
            .copied()
            .ok_or_else(|| AugurError::DataUnavailable("price file has no dates".into())),
    }
}

/// Write a frame to CSV.
pub(crate) fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<(), AugurError> {
    let mut file = fs::File::create(path)
        .map_err(|e| AugurError::Other(format!("cannot create {}: {e}", path.display())))?;
    CsvWriter::new(&mut file).include_header(true).finish(frame)?;
    info!(path = %path.display(), rows = frame.height(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("augur-cli-{}-{name}", std::process::id()));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(matches!(parse_date("invalid"), Err(AugurError::InvalidDate(_))));
    }

    #[test]
    fn test_load_panel_from_csv() {
        let path = temp_file(
            "prices.csv",
            "date,symbol,close\n2024-01-02,^NSEI,100\n2024-01-03,^NSEI,101\n2024-01-02,TCS,50\n2024-01-03,TCS,51\n",
        );
        let panel = load_panel(&path, "^NSEI").unwrap();
        assert_eq!(panel.len(), 1);
        assert_eq!(resolve_date(&panel, None).unwrap(), parse_date("2024-01-03").unwrap());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_sectors_and_context() {
        let sectors = temp_file("sectors.csv", "symbol,sector\nTCS,IT\nHDFCBANK,BANK\n");
        let map = load_sectors(Some(&sectors)).unwrap();
        assert_eq!(map.sector_of("TCS"), "IT");
        assert!(load_sectors(None).unwrap().is_empty());

        let sentiment = temp_file("sentiment.json", r#"{"TCS": -0.3}"#);
        let context = load_context(Some(&sentiment), None, None).unwrap();
        assert_eq!(context.sentiment["TCS"], -0.3);
        assert!(context.fundamentals.is_empty());
        assert!(context.upside.is_empty());
        fs::remove_file(sectors).ok();
        fs::remove_file(sentiment).ok();
    }
}
