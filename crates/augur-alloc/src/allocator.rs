//! Bayesian portfolio allocation from ranked recommendations.
//!
//! Recommendations become absolute views, the views are blended with a
//! benchmark-heavy equilibrium prior, and the posterior is optimized for the
//! Sharpe ratio under sector caps. Any failure along the way yields the
//! benchmark-only portfolio, so callers always receive usable weights.

use std::collections::BTreeMap;

use augur_traits::{
    AugurError, Date, INDEX_BUCKET, PricePanel, Result, SectorMap, Symbol,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::black_litterman::{BlackLitterman, BlackLittermanConfig};
use crate::correlation::{CorrelationConfig, CorrelationFilter, CorrelationReport};
use crate::covariance::{annualize, ledoit_wolf};
use crate::optimizer::{MaxSharpe, OptimizerConfig, PortfolioStats};
use crate::returns::AlignedPrices;
use crate::views::{Recommendation, ViewConfig};

/// Allocator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Calendar dates of history used (default: 252)
    pub lookback: usize,
    /// Aligned rows required before estimating anything (default: 30)
    pub min_observations: usize,
    /// Periods per year for annualizing the covariance (default: 252)
    pub periods_per_year: f64,
    /// Benchmark correlation alert.
    pub correlation: CorrelationConfig,
    /// View construction.
    pub views: ViewConfig,
    /// Prior and posterior settings.
    pub black_litterman: BlackLittermanConfig,
    /// Max-Sharpe settings.
    pub optimizer: OptimizerConfig,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            lookback: 252,
            min_observations: 30,
            periods_per_year: 252.0,
            correlation: CorrelationConfig::default(),
            views: ViewConfig::default(),
            black_litterman: BlackLittermanConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

/// How an allocation was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum AllocationOutcome {
    /// Solved normally.
    Optimized,
    /// Benchmark-only portfolio after a failure.
    Fallback(String),
    /// No recommendations were given.
    Empty,
}

/// Portfolio weights and the diagnostics behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    weights: BTreeMap<Symbol, f64>,
    outcome: AllocationOutcome,
    correlation: CorrelationReport,
    posterior_returns: BTreeMap<Symbol, f64>,
    stats: Option<PortfolioStats>,
}

impl Allocation {
    /// No positions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
            outcome: AllocationOutcome::Empty,
            correlation: CorrelationReport::default(),
            posterior_returns: BTreeMap::new(),
            stats: None,
        }
    }

    /// Everything in the benchmark.
    pub fn fallback(benchmark: &str, reason: impl Into<String>) -> Self {
        Self {
            weights: BTreeMap::from([(benchmark.to_string(), 1.0)]),
            outcome: AllocationOutcome::Fallback(reason.into()),
            ..Self::empty()
        }
    }

    /// Weights by symbol; zero weights are omitted.
    #[must_use]
    pub const fn weights(&self) -> &BTreeMap<Symbol, f64> {
        &self.weights
    }

    /// Weight of `symbol`, 0 when not held.
    #[must_use]
    pub fn get(&self, symbol: &str) -> f64 {
        self.weights.get(symbol).copied().unwrap_or(0.0)
    }

    /// How the weights were reached.
    #[must_use]
    pub const fn outcome(&self) -> &AllocationOutcome {
        &self.outcome
    }

    /// Whether this is the benchmark-only fallback.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.outcome, AllocationOutcome::Fallback(_))
    }

    /// Benchmark correlation diagnostics.
    #[must_use]
    pub const fn correlation(&self) -> &CorrelationReport {
        &self.correlation
    }

    /// Posterior expected returns of the optimized universe.
    #[must_use]
    pub const fn posterior_returns(&self) -> &BTreeMap<Symbol, f64> {
        &self.posterior_returns
    }

    /// Expected return, volatility and Sharpe ratio under the posterior.
    #[must_use]
    pub const fn stats(&self) -> Option<&PortfolioStats> {
        self.stats.as_ref()
    }

    /// Sum of the weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Weight per sector label.
    #[must_use]
    pub fn sector_weights(&self, sectors: &SectorMap) -> BTreeMap<String, f64> {
        let mut out: BTreeMap<String, f64> = BTreeMap::new();
        for (symbol, w) in &self.weights {
            *out.entry(sectors.sector_of(symbol).to_string()).or_insert(0.0) += w;
        }
        out
    }
}

/// Black–Litterman allocator with sector caps.
#[derive(Debug, Clone, Default)]
pub struct BayesianAllocator {
    config: AllocatorConfig,
}

impl BayesianAllocator {
    /// Create an allocator with the given settings.
    #[must_use]
    pub const fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    /// Allocator settings.
    #[must_use]
    pub const fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Weights for `recommendations` using prices up to `as_of`.
    ///
    /// Never fails: an empty input gives an empty allocation and any error
    /// gives the benchmark-only fallback with the reason recorded.
    #[must_use]
    pub fn allocate(
        &self,
        recommendations: &[Recommendation],
        panel: &PricePanel,
        sectors: &SectorMap,
        as_of: Date,
    ) -> Allocation {
        if recommendations.is_empty() {
            debug!("no recommendations, nothing to allocate");
            return Allocation::empty();
        }
        let benchmark = panel.benchmark();
        match self.solve(recommendations, panel, sectors, as_of) {
            Ok(allocation) => {
                info!(
                    %as_of,
                    positions = allocation.weights.len(),
                    "allocation optimized"
                );
                allocation
            }
            Err(err) => {
                warn!(%as_of, error = %err, "allocation failed, reverting to benchmark");
                Allocation::fallback(benchmark, err.to_string())
            }
        }
    }

    fn solve(
        &self,
        recommendations: &[Recommendation],
        panel: &PricePanel,
        sectors: &SectorMap,
        as_of: Date,
    ) -> Result<Allocation> {
        let benchmark = panel.benchmark();
        let mut universe: Vec<Symbol> = vec![benchmark.to_string()];
        for rec in recommendations {
            if !universe.contains(&rec.symbol) {
                universe.push(rec.symbol.clone());
            }
        }

        let aligned = AlignedPrices::build(panel, &universe, as_of, self.config.lookback);
        if aligned.len() < self.config.min_observations {
            return Err(AugurError::InsufficientHistory(format!(
                "{} aligned rows, need {}",
                aligned.len(),
                self.config.min_observations
            )));
        }
        if aligned.position(benchmark).is_none() {
            return Err(AugurError::DataUnavailable(format!(
                "benchmark {benchmark} has no prices in the window"
            )));
        }

        let returns = aligned.returns();
        let symbols = aligned.symbols();
        let correlation =
            CorrelationFilter::new(self.config.correlation).assess(&returns, symbols, benchmark);

        let (cov, shrinkage) = ledoit_wolf(&returns);
        let cov = annualize(cov, self.config.periods_per_year);
        debug!(shrinkage, assets = symbols.len(), "estimated covariance");

        let views = self.config.views.build(symbols, benchmark, recommendations)?;
        let posterior = BlackLitterman::new(self.config.black_litterman)
            .posterior(&cov, &views, benchmark)?;

        let labels: Vec<String> = symbols
            .iter()
            .map(|s| {
                if s == benchmark {
                    INDEX_BUCKET.to_string()
                } else {
                    sectors.sector_of(s).to_string()
                }
            })
            .collect();
        let optimizer = MaxSharpe::new(self.config.optimizer);
        let weights = optimizer.optimize(&posterior.returns, &posterior.covariance, &labels)?;
        let stats = PortfolioStats::evaluate(
            &weights,
            &posterior.returns,
            &posterior.covariance,
            self.config.optimizer.risk_free_rate,
        );

        Ok(Allocation {
            weights: symbols
                .iter()
                .zip(&weights)
                .filter(|(_, w)| **w > 0.0)
                .map(|(s, w)| (s.clone(), *w))
                .collect(),
            outcome: AllocationOutcome::Optimized,
            correlation,
            posterior_returns: symbols
                .iter()
                .cloned()
                .zip(posterior.returns.iter().copied())
                .collect(),
            stats: Some(stats),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use augur_traits::PriceSeries;

    fn dates(n: u64) -> Vec<Date> {
        let start = Date::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n).map(|i| start + chrono::Days::new(i)).collect()
    }

    fn wave(symbol: &str, n: usize, drift: f64, freq: f64, amp: f64) -> PriceSeries {
        let mut price = 100.0;
        let closes: Vec<f64> = (0..n)
            .map(|t| {
                price *= 1.0 + drift + amp * (freq * t as f64).sin();
                price
            })
            .collect();
        PriceSeries::new(symbol, dates(n as u64), closes).unwrap()
    }

    fn panel(n: usize) -> PricePanel {
        PricePanel::new(
            "^NSEI",
            vec![
                wave("^NSEI", n, 0.0004, 0.7, 0.008),
                wave("TCS", n, 0.0010, 1.1, 0.012),
                wave("INFY", n, 0.0008, 1.9, 0.015),
                wave("HDFC", n, 0.0006, 2.3, 0.010),
            ],
        )
        .unwrap()
    }

    fn sectors() -> SectorMap {
        [("TCS", "IT"), ("INFY", "IT"), ("HDFC", "BANK")]
            .into_iter()
            .collect()
    }

    fn recs() -> Vec<Recommendation> {
        vec![
            Recommendation::from_score("TCS", 80.0),
            Recommendation::from_score("INFY", 70.0),
            Recommendation::from_score("HDFC", 65.0),
        ]
    }

    #[test]
    fn test_empty_recommendations() {
        let panel = panel(10);
        let allocation =
            BayesianAllocator::default().allocate(&[], &panel, &sectors(), dates(10)[9]);
        assert!(allocation.weights().is_empty());
        assert_eq!(allocation.outcome(), &AllocationOutcome::Empty);
    }

    #[test]
    fn test_short_history_falls_back() {
        let panel = panel(20);
        let allocation =
            BayesianAllocator::default().allocate(&recs(), &panel, &sectors(), dates(20)[19]);
        assert!(allocation.is_fallback());
        assert_eq!(allocation.weights(), &BTreeMap::from([("^NSEI".to_string(), 1.0)]));
    }

    #[test]
    fn test_weights_sum_to_one_and_respect_caps() {
        let panel = panel(300);
        let sectors = sectors();
        let allocation =
            BayesianAllocator::default().allocate(&recs(), &panel, &sectors, dates(300)[299]);
        assert_relative_eq!(allocation.total(), 1.0, epsilon = 1e-9);
        assert!(allocation.weights().values().all(|w| *w >= 0.0 && *w <= 1.0));
        assert_eq!(allocation.outcome(), &AllocationOutcome::Optimized);
        let by_sector = allocation.sector_weights(&sectors);
        for (sector, w) in &by_sector {
            if sector != INDEX_BUCKET {
                assert!(*w <= 0.25 + 1e-9, "{sector} at {w}");
            }
        }
        assert_eq!(allocation.posterior_returns().len(), 4);
    }

    #[test]
    fn test_one_crowded_sector_is_capped() {
        let n = 300;
        let names = ["TCS", "INFY", "WIPRO", "HCLTECH", "TECHM", "LTIM"];
        let mut series = vec![wave("^NSEI", n, 0.0004, 0.7, 0.008)];
        for (i, name) in names.iter().enumerate() {
            let k = i as f64;
            series.push(wave(name, n, 0.0009 + 0.0001 * k, 1.1 + 0.4 * k, 0.012));
        }
        let panel = PricePanel::new("^NSEI", series).unwrap();
        let sectors: SectorMap = names.iter().map(|s| (*s, "IT")).collect();
        let recs: Vec<Recommendation> = names
            .iter()
            .enumerate()
            .map(|(i, s)| Recommendation::from_score(*s, 90.0 - i as f64))
            .collect();

        let allocation =
            BayesianAllocator::default().allocate(&recs, &panel, &sectors, dates(n as u64)[n - 1]);

        assert_eq!(allocation.outcome(), &AllocationOutcome::Optimized);
        assert_relative_eq!(allocation.total(), 1.0, epsilon = 1e-9);
        let by_sector = allocation.sector_weights(&sectors);
        let it = by_sector.get("IT").copied().unwrap_or(0.0);
        assert!(it <= 0.25 + 1e-9, "IT at {it}");
        assert!(by_sector[INDEX_BUCKET] >= 0.75 - 1e-9);
    }

    #[test]
    fn test_unknown_symbols_leave_the_benchmark() {
        let panel = panel(100);
        let allocation = BayesianAllocator::default().allocate(
            &[Recommendation::new("ZZZ", 0.9)],
            &panel,
            &sectors(),
            dates(100)[99],
        );
        assert_relative_eq!(allocation.get("^NSEI"), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_asset_clears_hurdle() {
        let panel = panel(100);
        let config = AllocatorConfig {
            views: ViewConfig {
                benchmark_return: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let allocation = BayesianAllocator::new(config).allocate(
            &[Recommendation::new("TCS", 0.5)],
            &panel,
            &sectors(),
            dates(100)[99],
        );
        assert!(allocation.is_fallback());
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let panel = panel(120);
        let allocator = BayesianAllocator::default();
        let a = allocator.allocate(&recs(), &panel, &sectors(), dates(120)[119]);
        let b = allocator.allocate(&recs(), &panel, &sectors(), dates(120)[119]);
        assert_eq!(a, b);
    }
}
