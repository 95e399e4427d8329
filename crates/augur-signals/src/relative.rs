//! Relative strength against the benchmark and against the sector average.

use std::collections::BTreeMap;

use augur_traits::{
    AugurError, CrossSection, Date, PricePanel, Result, SectorMap, Signal, score_each_asset,
};
use serde::{Deserialize, Serialize};

use crate::indicators::pct_change;

/// Configuration shared by both relative-strength measures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeStrengthConfig {
    /// Return horizon in periods (default: 1, the latest period)
    pub window: usize,
}

impl Default for RelativeStrengthConfig {
    fn default() -> Self {
        Self { window: 1 }
    }
}

/// Mean trailing return per sector at `date`, over every non-benchmark asset.
///
/// Unclassified assets are left out, so the index bucket never has an average.
#[must_use]
pub fn sector_mean_returns(
    panel: &PricePanel,
    sectors: &SectorMap,
    date: Date,
    window: usize,
) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for series in panel.assets() {
        if !sectors.is_classified(series.symbol()) {
            continue;
        }
        if let Ok(r) = pct_change(series.closes_until(date), window) {
            let entry = sums
                .entry(sectors.sector_of(series.symbol()).to_string())
                .or_insert((0.0, 0));
            entry.0 += r;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(sector, (sum, n))| (sector, sum / n as f64))
        .collect()
}

/// Asset return minus benchmark return over the same window.
#[derive(Debug, Clone, Default)]
pub struct MarketRelativeStrength {
    config: RelativeStrengthConfig,
}

impl MarketRelativeStrength {
    /// Create a new market relative-strength signal.
    #[must_use]
    pub const fn new(config: RelativeStrengthConfig) -> Self {
        Self { config }
    }
}

impl Signal for MarketRelativeStrength {
    fn name(&self) -> &str {
        "relative_strength_market"
    }

    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
        let window = self.config.window;
        let market = pct_change(panel.benchmark_series().closes_until(date), window)?;
        Ok(score_each_asset(panel, date, |series| {
            Ok(pct_change(series.closes_until(date), window)? - market)
        }))
    }

    fn lookback(&self) -> usize {
        self.config.window + 1
    }
}

/// Asset return minus the mean return of its sector.
#[derive(Debug, Clone, Default)]
pub struct SectorRelativeStrength {
    config: RelativeStrengthConfig,
    sectors: SectorMap,
}

impl SectorRelativeStrength {
    /// Create a new sector relative-strength signal over a classification.
    #[must_use]
    pub const fn new(config: RelativeStrengthConfig, sectors: SectorMap) -> Self {
        Self { config, sectors }
    }

    /// Relative strength of `symbol` given precomputed sector means.
    ///
    /// # Errors
    ///
    /// [`AugurError::DataUnavailable`] for unclassified symbols.
    pub fn relative_to(
        sectors: &SectorMap,
        means: &BTreeMap<String, f64>,
        symbol: &str,
        own_return: f64,
    ) -> Result<f64> {
        let sector = sectors.sector_of(symbol);
        means
            .get(sector)
            .map(|mean| own_return - mean)
            .ok_or_else(|| AugurError::DataUnavailable(format!("{symbol} has no sector peers")))
    }
}

impl Signal for SectorRelativeStrength {
    fn name(&self) -> &str {
        "relative_strength_sector"
    }

    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
        let window = self.config.window;
        let means = sector_mean_returns(panel, &self.sectors, date, window);
        Ok(score_each_asset(panel, date, |series| {
            let own = pct_change(series.closes_until(date), window)?;
            Self::relative_to(&self.sectors, &means, series.symbol(), own)
        }))
    }

    fn lookback(&self) -> usize {
        self.config.window + 1
    }
}
