//! Per-date factor snapshots for a whole universe.
//!
//! The engine evaluates every factor for every non-benchmark asset at one
//! date. Assets are computed in parallel and gathered into ordered maps, so a
//! frame is identical whatever the thread count.

use std::collections::BTreeMap;

use augur_traits::{
    AugurError, CrossSection, Date, PricePanel, PriceSeries, Result, SectorMap, Symbol,
};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{bollinger_width, pct_change, rolling_volatility, rsi, volume_ratio};
use crate::momentum::{Momentum, MomentumConfig};
use crate::relative::{RelativeStrengthConfig, SectorRelativeStrength, sector_mean_returns};
use crate::risk::{DownsideRisk, DownsideRiskConfig};
use crate::technical::TechnicalConfig;
use crate::value::{ValueProxy, ValueProxyConfig};

/// Configuration for every factor the engine computes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Momentum settings.
    pub momentum: MomentumConfig,
    /// Downside risk settings.
    pub downside_risk: DownsideRiskConfig,
    /// Value proxy settings.
    pub value: ValueProxyConfig,
    /// Technical indicator windows.
    pub technical: TechnicalConfig,
    /// Relative strength window.
    pub relative: RelativeStrengthConfig,
}

/// All factor readings for one asset at one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorSnapshot {
    /// Trailing return over the momentum lookback.
    pub momentum: f64,
    /// Standard deviation of negative returns.
    pub downside_risk: f64,
    /// Inverse distance from the trailing low.
    pub value_proxy: f64,
    /// Relative strength index.
    pub rsi: Option<f64>,
    /// Rolling return volatility.
    pub volatility: Option<f64>,
    /// Bollinger band width.
    pub bb_width: Option<f64>,
    /// Last volume over its rolling mean.
    pub volume_ratio: Option<f64>,
    /// Return in excess of the benchmark.
    pub rel_strength_market: Option<f64>,
    /// Return in excess of the sector mean.
    pub rel_strength_sector: Option<f64>,
}

impl FactorSnapshot {
    fn core_is_finite(&self) -> bool {
        self.momentum.is_finite() && self.downside_risk.is_finite() && self.value_proxy.is_finite()
    }
}

/// Factor snapshots for a universe at one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorFrame {
    date: Date,
    snapshots: BTreeMap<Symbol, FactorSnapshot>,
    excluded: BTreeMap<Symbol, String>,
}

impl FactorFrame {
    /// Creates an empty frame.
    #[must_use]
    pub const fn new(date: Date) -> Self {
        Self {
            date,
            snapshots: BTreeMap::new(),
            excluded: BTreeMap::new(),
        }
    }

    /// Collects per-asset results; errors become exclusions.
    pub fn from_results(
        date: Date,
        results: impl IntoIterator<Item = (Symbol, Result<FactorSnapshot>)>,
    ) -> Self {
        let mut frame = Self::new(date);
        for (symbol, result) in results {
            match result {
                Ok(snapshot) if snapshot.core_is_finite() => {
                    frame.snapshots.insert(symbol, snapshot);
                }
                Ok(_) => {
                    frame
                        .excluded
                        .insert(symbol, "non-finite core factor".to_string());
                }
                Err(err) => {
                    frame.excluded.insert(symbol, err.to_string());
                }
            }
        }
        frame
    }

    /// Date of the frame.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// Snapshot of one asset.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&FactorSnapshot> {
        self.snapshots.get(symbol)
    }

    /// All snapshots by symbol.
    #[must_use]
    pub const fn snapshots(&self) -> &BTreeMap<Symbol, FactorSnapshot> {
        &self.snapshots
    }

    /// Assets left out of the frame, with the reason.
    #[must_use]
    pub const fn excluded(&self) -> &BTreeMap<Symbol, String> {
        &self.excluded
    }

    /// Number of scored assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no asset could be scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Extracts one factor as a cross-section; missing readings are excluded.
    pub fn section<F>(&self, factor: F) -> CrossSection
    where
        F: Fn(&FactorSnapshot) -> Option<f64>,
    {
        let mut section = CrossSection::new(self.date);
        for (symbol, snapshot) in &self.snapshots {
            match factor(snapshot) {
                Some(value) => section.insert(symbol.clone(), value),
                None => section.exclude(symbol.clone(), "missing reading"),
            }
        }
        section
    }

    /// Momentum cross-section.
    #[must_use]
    pub fn momentum(&self) -> CrossSection {
        self.section(|s| Some(s.momentum))
    }

    /// Downside risk cross-section.
    #[must_use]
    pub fn downside_risk(&self) -> CrossSection {
        self.section(|s| Some(s.downside_risk))
    }

    /// Value proxy cross-section.
    #[must_use]
    pub fn value_proxy(&self) -> CrossSection {
        self.section(|s| Some(s.value_proxy))
    }

    /// Converts the frame to a DataFrame with one row per asset.
    ///
    /// # Errors
    ///
    /// Propagates DataFrame construction failures.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let rows: Vec<&FactorSnapshot> = self.snapshots.values().collect();
        let symbols: Vec<&str> = self.snapshots.keys().map(String::as_str).collect();
        let required = |f: fn(&FactorSnapshot) -> f64| rows.iter().map(|s| f(s)).collect::<Vec<_>>();
        let optional =
            |f: fn(&FactorSnapshot) -> Option<f64>| rows.iter().map(|s| f(s)).collect::<Vec<_>>();
        DataFrame::new(vec![
            Column::new("symbol".into(), symbols),
            Column::new("momentum".into(), required(|s| s.momentum)),
            Column::new("downside_risk".into(), required(|s| s.downside_risk)),
            Column::new("value_proxy".into(), required(|s| s.value_proxy)),
            Column::new("rsi".into(), optional(|s| s.rsi)),
            Column::new("volatility".into(), optional(|s| s.volatility)),
            Column::new("bb_width".into(), optional(|s| s.bb_width)),
            Column::new("volume_ratio".into(), optional(|s| s.volume_ratio)),
            Column::new("rel_strength_market".into(), optional(|s| s.rel_strength_market)),
            Column::new("rel_strength_sector".into(), optional(|s| s.rel_strength_sector)),
        ])
        .map_err(AugurError::from)
    }
}

/// Computes [`FactorFrame`]s.
#[derive(Debug, Clone, Default)]
pub struct FactorEngine {
    config: FactorConfig,
}

impl FactorEngine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub const fn new(config: FactorConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &FactorConfig {
        &self.config
    }

    /// Factor snapshot of every non-benchmark asset using data up to `date`.
    #[must_use]
    pub fn snapshot(&self, panel: &PricePanel, sectors: &SectorMap, date: Date) -> FactorFrame {
        let window = self.config.relative.window;
        let market = pct_change(panel.benchmark_series().closes_until(date), window).ok();
        let sector_means = sector_mean_returns(panel, sectors, date, window);

        let series: Vec<&PriceSeries> = panel.assets().collect();
        let results: Vec<(Symbol, Result<FactorSnapshot>)> = series
            .par_iter()
            .map(|s| {
                let snapshot = self.compute_asset(s, date, market, sectors, &sector_means);
                (s.symbol().to_string(), snapshot)
            })
            .collect();

        let frame = FactorFrame::from_results(date, results);
        debug!(
            %date,
            scored = frame.len(),
            excluded = frame.excluded().len(),
            "computed factor frame"
        );
        frame
    }

    fn compute_asset(
        &self,
        series: &PriceSeries,
        date: Date,
        market_return: Option<f64>,
        sectors: &SectorMap,
        sector_means: &BTreeMap<String, f64>,
    ) -> Result<FactorSnapshot> {
        let closes = series.closes_until(date);
        let FactorConfig {
            momentum,
            downside_risk,
            value,
            technical,
            relative,
        } = self.config;

        let own_return = pct_change(closes, relative.window).ok();
        let rel_strength_sector = own_return.and_then(|r| {
            SectorRelativeStrength::relative_to(sectors, sector_means, series.symbol(), r).ok()
        });

        Ok(FactorSnapshot {
            momentum: Momentum::new(momentum).compute(closes)?,
            downside_risk: DownsideRisk::new(downside_risk).compute(closes)?,
            value_proxy: ValueProxy::new(value).compute(closes)?,
            rsi: rsi(closes, technical.rsi_period).ok(),
            volatility: rolling_volatility(closes, technical.volatility_window).ok(),
            bb_width: bollinger_width(closes, technical.bollinger_window, technical.bollinger_std)
                .ok(),
            volume_ratio: series
                .volumes_until(date)
                .and_then(|v| volume_ratio(v, technical.volume_window).ok()),
            rel_strength_market: own_return.zip(market_return).map(|(r, m)| r - m),
            rel_strength_sector,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dates(n: u64) -> Vec<Date> {
        let start = Date::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n).map(|i| start + chrono::Days::new(i)).collect()
    }

    fn trending(symbol: &str, n: usize, total_growth: f64) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|t| {
                let t = t as f64;
                100.0 * total_growth.powf(t / (n - 1) as f64) * (1.0 + 0.01 * (1.3 * t).sin())
            })
            .collect();
        PriceSeries::new(symbol, dates(n as u64), closes).unwrap()
    }

    fn panel() -> PricePanel {
        let short = PriceSeries::new("NEW", dates(250)[200..].to_vec(), vec![50.0; 50]).unwrap();
        PricePanel::new(
            "^NSEI",
            vec![
                trending("^NSEI", 250, 1.1),
                trending("UP", 250, 1.5),
                trending("DOWN", 250, 0.7),
                short,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_short_history_is_excluded() {
        let panel = panel();
        let date = *dates(250).last().unwrap();
        let frame = FactorEngine::default().snapshot(&panel, &SectorMap::new(), date);
        assert_eq!(frame.len(), 2);
        assert!(frame.excluded()["NEW"].contains("history"));
    }

    #[test]
    fn test_snapshot_values() {
        let panel = panel();
        let date = *dates(250).last().unwrap();
        let sectors: SectorMap = [("UP", "IT"), ("DOWN", "IT")].into_iter().collect();
        let frame = FactorEngine::default().snapshot(&panel, &sectors, date);

        let up = frame.get("UP").unwrap();
        let down = frame.get("DOWN").unwrap();
        assert!(up.momentum > down.momentum);
        assert!(up.volume_ratio.is_none());
        assert!(up.rsi.is_some());

        // two-member sector: the excess returns mirror each other
        let (a, b) = (up.rel_strength_sector.unwrap(), down.rel_strength_sector.unwrap());
        assert_relative_eq!(a, -b, epsilon = 1e-12);
    }

    #[test]
    fn test_unclassified_has_no_sector_strength() {
        let panel = panel();
        let date = *dates(250).last().unwrap();
        let frame = FactorEngine::default().snapshot(&panel, &SectorMap::new(), date);
        assert!(frame.get("UP").unwrap().rel_strength_sector.is_none());
        assert!(frame.get("UP").unwrap().rel_strength_market.is_some());
    }

    #[test]
    fn test_no_lookahead() {
        let panel = panel();
        let date = dates(250)[230];
        let frame = FactorEngine::default().snapshot(&panel, &SectorMap::new(), date);
        let expected = Momentum::default()
            .compute(panel.get("UP").unwrap().closes_until(date))
            .unwrap();
        assert_relative_eq!(frame.get("UP").unwrap().momentum, expected);
    }

    #[test]
    fn test_frame_export() {
        let panel = panel();
        let date = *dates(250).last().unwrap();
        let frame = FactorEngine::default().snapshot(&panel, &SectorMap::new(), date);
        let df = frame.to_frame().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 10);
        assert_eq!(frame.momentum().len(), 2);
    }
}
