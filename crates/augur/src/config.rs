//! Run configuration aggregating every component's settings.

use std::fs;
use std::path::Path;

use augur_alloc::{AllocatorConfig, BayesianAllocator};
use augur_combine::{ScorerConfig, WeightTable};
use augur_eval::{
    BacktestConfig, FeeSchedule, FrictionModel, HoldingMode, RankingPipeline, SearchConfig,
};
use augur_signals::value::DcfConfig;
use augur_signals::{FactorConfig, MarketSentinel, RegimeConfig, SentinelConfig};
use augur_traits::{AugurError, Date, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default benchmark symbol.
pub const DEFAULT_BENCHMARK: &str = "^NSEI";

/// Backtest settings specific to the replay. Regime, factor, allocator and
/// fee settings come from the shared sections of [`AugurConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    /// First rebalance date considered
    pub start: Option<Date>,
    /// Last rebalance date considered
    pub end: Option<Date>,
    /// Initial capital
    pub initial_capital: f64,
    /// Holding construction
    pub mode: HoldingMode,
    /// Rebalances per year, for the Sharpe ratio
    pub periods_per_year: f64,
    /// Weight table for the replay (default: two-factor)
    pub weights: WeightTable,
}

impl Default for BacktestSection {
    fn default() -> Self {
        let base = BacktestConfig::default();
        Self {
            start: base.start,
            end: base.end,
            initial_capital: base.initial_capital,
            mode: base.mode,
            periods_per_year: base.periods_per_year,
            weights: base.scorer.weights,
        }
    }
}

/// Grid search settings specific to the search. Regime and factor settings
/// come from the shared sections of [`AugurConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Grid steps per unit weight
    pub divisions: u32,
    /// Assets held per date
    pub top_n: usize,
    /// Trading dates to the forward price
    pub forward_periods: usize,
    /// First date considered
    pub start: Option<Date>,
    /// Last date considered
    pub end: Option<Date>,
}

impl Default for SearchSection {
    fn default() -> Self {
        let base = SearchConfig::default();
        Self {
            divisions: base.divisions,
            top_n: base.top_n,
            forward_periods: base.forward_periods,
            start: base.start,
            end: base.end,
        }
    }
}

/// Settings for a whole run. Every section falls back to its defaults when
/// absent from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugurConfig {
    /// Benchmark symbol (default: `^NSEI`)
    pub benchmark: String,
    /// Regime classifier
    pub regime: RegimeConfig,
    /// Factor engine
    pub factors: FactorConfig,
    /// Composite scorer
    pub scorer: ScorerConfig,
    /// Bayesian allocator
    pub allocator: AllocatorConfig,
    /// Friction model
    pub fees: FeeSchedule,
    /// Backtest
    pub backtest: BacktestSection,
    /// Weight search
    pub search: SearchSection,
    /// Intrinsic value
    pub dcf: DcfConfig,
    /// Market health check
    pub sentinel: SentinelConfig,
}

impl Default for AugurConfig {
    fn default() -> Self {
        Self {
            benchmark: DEFAULT_BENCHMARK.to_string(),
            regime: RegimeConfig::default(),
            factors: FactorConfig::default(),
            scorer: ScorerConfig::default(),
            allocator: AllocatorConfig::default(),
            fees: FeeSchedule::default(),
            backtest: BacktestSection::default(),
            search: SearchSection::default(),
            dcf: DcfConfig::default(),
            sentinel: SentinelConfig::default(),
        }
    }
}

impl AugurConfig {
    /// Parse from a JSON string.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] for malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AugurError::InvalidData(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// [`AugurError::DataUnavailable`] when the file cannot be read, otherwise
    /// see [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            AugurError::DataUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Self::from_json_str(&text)
    }

    /// Pretty JSON.
    ///
    /// # Errors
    ///
    /// [`AugurError::Other`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AugurError::Other(e.to_string()))
    }

    /// Reject settings no component can work with.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.benchmark.trim().is_empty() {
            return Err(AugurError::InvalidData("benchmark must not be empty".into()));
        }
        for (name, table) in [("scorer", &self.scorer.weights), ("backtest", &self.backtest.weights)] {
            table
                .bull
                .validate()
                .and(table.bear.validate())
                .map_err(|e| AugurError::InvalidData(format!("{name} weights: {e}")))?;
        }
        let cap = self.allocator.optimizer.sector_cap;
        if !(cap > 0.0 && cap <= 1.0) {
            return Err(AugurError::InvalidData(format!(
                "sector cap must be in (0, 1], got {cap}"
            )));
        }
        self.fees.validate()
    }

    /// Scoring pipeline from the regime, factor and scorer sections.
    #[must_use]
    pub const fn pipeline(&self) -> RankingPipeline {
        RankingPipeline::new(self.regime, self.factors, self.scorer)
    }

    /// Allocator from the allocator section.
    #[must_use]
    pub const fn allocator(&self) -> BayesianAllocator {
        BayesianAllocator::new(self.allocator)
    }

    /// Backtest settings: the backtest section plus the shared regime,
    /// factor, allocator and fee sections. The scorer keeps its thresholds
    /// and takes the backtest weight table.
    #[must_use]
    pub const fn backtest(&self) -> BacktestConfig {
        let section = self.backtest;
        BacktestConfig {
            start: section.start,
            end: section.end,
            initial_capital: section.initial_capital,
            mode: section.mode,
            periods_per_year: section.periods_per_year,
            regime: self.regime,
            factors: self.factors,
            scorer: ScorerConfig {
                weights: section.weights,
                ..self.scorer
            },
            allocator: self.allocator,
            fees: self.fees,
        }
    }

    /// Search settings: the search section plus the shared regime and factor
    /// sections.
    #[must_use]
    pub const fn search(&self) -> SearchConfig {
        let section = self.search;
        SearchConfig {
            divisions: section.divisions,
            top_n: section.top_n,
            forward_periods: section.forward_periods,
            start: section.start,
            end: section.end,
            regime: self.regime,
            factors: self.factors,
        }
    }

    /// Friction model from the fee section.
    #[must_use]
    pub const fn friction(&self) -> FrictionModel {
        FrictionModel::new(self.fees)
    }

    /// Market sentinel from the sentinel section.
    #[must_use]
    pub const fn sentinel(&self) -> MarketSentinel {
        MarketSentinel::new(self.sentinel)
    }
}
