//! Signal registry for discovering and building the available factors.

use augur_traits::{SectorMap, Signal};
use serde::{Deserialize, Serialize};

use crate::engine::FactorConfig;
use crate::momentum::Momentum;
use crate::relative::{MarketRelativeStrength, SectorRelativeStrength};
use crate::risk::DownsideRisk;
use crate::technical::{BollingerWidth, Rsi, Volatility, VolumeRatio};
use crate::value::ValueProxy;

/// Signal category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalCategory {
    /// Price momentum signals
    Momentum,
    /// Downside and volatility risk
    Risk,
    /// Valuation signals
    Value,
    /// Technical indicators
    Technical,
    /// Performance relative to the market or sector
    Relative,
}

impl SignalCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Momentum => "Price momentum and trend-following signals",
            Self::Risk => "Downside risk measures; lower readings rank safer",
            Self::Value => "Price-based valuation proxies",
            Self::Technical => "Oscillators, bands and volume indicators",
            Self::Relative => "Excess returns over the benchmark or sector peers",
        }
    }
}

/// Metadata about a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Signal name (as returned by [`Signal::name`])
    pub name: &'static str,
    /// Signal category
    pub category: SignalCategory,
    /// Brief description
    pub description: &'static str,
    /// Typical lookback in trading days
    pub typical_lookback: usize,
    /// Whether the signal needs a sector classification
    pub requires_sectors: bool,
}

/// Get all available signals.
#[must_use]
pub fn available_signals() -> Vec<SignalInfo> {
    vec![
        SignalInfo {
            name: "momentum",
            category: SignalCategory::Momentum,
            description: "Percent change over 126 trading days",
            typical_lookback: 200,
            requires_sectors: false,
        },
        SignalInfo {
            name: "downside_risk",
            category: SignalCategory::Risk,
            description: "Standard deviation of negative daily returns",
            typical_lookback: 200,
            requires_sectors: false,
        },
        SignalInfo {
            name: "value_proxy",
            category: SignalCategory::Value,
            description: "Inverse distance from the 52-week low",
            typical_lookback: 200,
            requires_sectors: false,
        },
        SignalInfo {
            name: "rsi",
            category: SignalCategory::Technical,
            description: "14-day relative strength index",
            typical_lookback: 15,
            requires_sectors: false,
        },
        SignalInfo {
            name: "volatility",
            category: SignalCategory::Technical,
            description: "20-day rolling return volatility",
            typical_lookback: 21,
            requires_sectors: false,
        },
        SignalInfo {
            name: "bollinger_width",
            category: SignalCategory::Technical,
            description: "20-day Bollinger band width relative to the mean",
            typical_lookback: 20,
            requires_sectors: false,
        },
        SignalInfo {
            name: "volume_ratio",
            category: SignalCategory::Technical,
            description: "Last volume over its 20-day mean",
            typical_lookback: 20,
            requires_sectors: false,
        },
        SignalInfo {
            name: "relative_strength_market",
            category: SignalCategory::Relative,
            description: "Latest return minus the benchmark return",
            typical_lookback: 2,
            requires_sectors: false,
        },
        SignalInfo {
            name: "relative_strength_sector",
            category: SignalCategory::Relative,
            description: "Latest return minus the sector mean return",
            typical_lookback: 2,
            requires_sectors: true,
        },
    ]
}

/// Get all signals in a specific category.
#[must_use]
pub fn signals_by_category(category: &SignalCategory) -> Vec<SignalInfo> {
    available_signals()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a specific signal by name.
#[must_use]
pub fn get_signal_info(name: &str) -> Option<SignalInfo> {
    available_signals()
        .into_iter()
        .find(|info| info.name == name)
}

/// Get all signal categories with signals.
#[must_use]
pub fn available_categories() -> Vec<SignalCategory> {
    let mut categories: Vec<_> = available_signals()
        .into_iter()
        .map(|info| info.category)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Instantiate a signal by name.
#[must_use]
pub fn build_signal(
    name: &str,
    config: &FactorConfig,
    sectors: &SectorMap,
) -> Option<Box<dyn Signal>> {
    let signal: Box<dyn Signal> = match name {
        "momentum" => Box::new(Momentum::new(config.momentum)),
        "downside_risk" => Box::new(DownsideRisk::new(config.downside_risk)),
        "value_proxy" => Box::new(ValueProxy::new(config.value)),
        "rsi" => Box::new(Rsi::new(config.technical)),
        "volatility" => Box::new(Volatility::new(config.technical)),
        "bollinger_width" => Box::new(BollingerWidth::new(config.technical)),
        "volume_ratio" => Box::new(VolumeRatio::new(config.technical)),
        "relative_strength_market" => Box::new(MarketRelativeStrength::new(config.relative)),
        "relative_strength_sector" => Box::new(SectorRelativeStrength::new(
            config.relative,
            sectors.clone(),
        )),
        _ => return None,
    };
    Some(signal)
}
