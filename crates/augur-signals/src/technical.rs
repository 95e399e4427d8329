//! Technical oscillators and the Bollinger squeeze.
//!
//! These are descriptive features reported alongside the ranking factors; the
//! composite score does not weight them.

use augur_traits::{AugurError, CrossSection, Date, PricePanel, Result, Signal, score_each_asset};
use serde::{Deserialize, Serialize};

use crate::indicators::{bollinger_width, rolling_volatility, rsi, volume_ratio};

/// Windows for the technical indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalConfig {
    /// RSI period (default: 14)
    pub rsi_period: usize,
    /// Rolling volatility window in returns (default: 20)
    pub volatility_window: usize,
    /// Bollinger band window (default: 20)
    pub bollinger_window: usize,
    /// Bollinger band width in standard deviations (default: 2.0)
    pub bollinger_std: f64,
    /// Volume averaging window (default: 20)
    pub volume_window: usize,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            volatility_window: 20,
            bollinger_window: 20,
            bollinger_std: 2.0,
            volume_window: 20,
        }
    }
}

/// Relative strength index over `rsi_period`.
#[derive(Debug, Clone, Default)]
pub struct Rsi {
    config: TechnicalConfig,
}

impl Rsi {
    /// Create a new RSI signal.
    #[must_use]
    pub const fn new(config: TechnicalConfig) -> Self {
        Self { config }
    }
}

impl Signal for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
        Ok(score_each_asset(panel, date, |series| {
            rsi(series.closes_until(date), self.config.rsi_period)
        }))
    }

    fn lookback(&self) -> usize {
        self.config.rsi_period + 1
    }
}

/// Rolling volatility of periodic returns.
#[derive(Debug, Clone, Default)]
pub struct Volatility {
    config: TechnicalConfig,
}

impl Volatility {
    /// Create a new volatility signal.
    #[must_use]
    pub const fn new(config: TechnicalConfig) -> Self {
        Self { config }
    }
}

impl Signal for Volatility {
    fn name(&self) -> &str {
        "volatility"
    }

    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
        Ok(score_each_asset(panel, date, |series| {
            rolling_volatility(series.closes_until(date), self.config.volatility_window)
        }))
    }

    fn lookback(&self) -> usize {
        self.config.volatility_window + 1
    }
}

/// Bollinger band width; low readings mark a squeeze.
#[derive(Debug, Clone, Default)]
pub struct BollingerWidth {
    config: TechnicalConfig,
}

impl BollingerWidth {
    /// Create a new band-width signal.
    #[must_use]
    pub const fn new(config: TechnicalConfig) -> Self {
        Self { config }
    }
}

impl Signal for BollingerWidth {
    fn name(&self) -> &str {
        "bollinger_width"
    }

    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
        Ok(score_each_asset(panel, date, |series| {
            bollinger_width(
                series.closes_until(date),
                self.config.bollinger_window,
                self.config.bollinger_std,
            )
        }))
    }

    fn lookback(&self) -> usize {
        self.config.bollinger_window
    }
}

/// Last volume relative to its recent average.
#[derive(Debug, Clone, Default)]
pub struct VolumeRatio {
    config: TechnicalConfig,
}

impl VolumeRatio {
    /// Create a new volume-ratio signal.
    #[must_use]
    pub const fn new(config: TechnicalConfig) -> Self {
        Self { config }
    }
}

impl Signal for VolumeRatio {
    fn name(&self) -> &str {
        "volume_ratio"
    }

    fn score(&self, panel: &PricePanel, date: Date) -> Result<CrossSection> {
        Ok(score_each_asset(panel, date, |series| {
            let volumes = series.volumes_until(date).ok_or_else(|| {
                AugurError::DataUnavailable(format!("{} has no volume data", series.symbol()))
            })?;
            volume_ratio(volumes, self.config.volume_window)
        }))
    }

    fn lookback(&self) -> usize {
        self.config.volume_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use augur_traits::PriceSeries;

    fn fixture(with_volume: bool) -> (PricePanel, Date) {
        let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<Date> = (0..30).map(|i| start + chrono::Days::new(i)).collect();
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + f64::from(i % 3)).collect();
        let mut asset = PriceSeries::new("A", dates.clone(), closes.clone()).unwrap();
        if with_volume {
            asset = asset.with_volumes(vec![1000.0; 30]).unwrap();
        }
        let bench = PriceSeries::new("^NSEI", dates.clone(), closes).unwrap();
        (PricePanel::new("^NSEI", vec![asset, bench]).unwrap(), dates[29])
    }

    #[test]
    fn test_default_config() {
        let config = TechnicalConfig::default();
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.bollinger_window, 20);
    }

    #[test]
    fn test_rsi_in_range() {
        let (panel, date) = fixture(false);
        let value = Rsi::default().score(&panel, date).unwrap().get("A").unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn test_volume_ratio_requires_volume() {
        let (panel, date) = fixture(false);
        let section = VolumeRatio::default().score(&panel, date).unwrap();
        assert!(section.excluded().contains_key("A"));

        let (panel, date) = fixture(true);
        let section = VolumeRatio::default().score(&panel, date).unwrap();
        assert_eq!(section.get("A"), Some(1.0));
    }

    #[test]
    fn test_volatility_and_width_positive() {
        let (panel, date) = fixture(false);
        assert!(Volatility::default().score(&panel, date).unwrap().get("A").unwrap() > 0.0);
        assert!(BollingerWidth::default().score(&panel, date).unwrap().get("A").unwrap() > 0.0);
    }
}
