//! Monthly walk-forward backtest.
//!
//! On every month-end trading date the portfolio is first marked from the
//! previous rebalance, then rebuilt from scores computed with information up
//! to that date. Rebalancing friction is charged against the next period.

use std::collections::{BTreeMap, BTreeSet};

use augur_alloc::{AllocatorConfig, BayesianAllocator, Recommendation};
use augur_combine::{ScoreBoard, ScorerConfig, ScoringContext, WeightTable};
use augur_signals::{FactorConfig, RegimeConfig};
use augur_traits::{AugurError, Date, PricePanel, Result, SectorMap, Symbol};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::friction::{FeeSchedule, FrictionModel, TradeSide};
use crate::ic::cross_sectional_ic;
use crate::metrics::{InformationRatio, max_drawdown, sharpe_ratio, total_return};
use crate::pipeline::RankingPipeline;

/// How holdings are formed from a score board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingMode {
    /// Equal weights over the n best active assets.
    TopN(usize),
    /// Bayesian allocation over the n best active assets.
    Allocator(usize),
}

impl HoldingMode {
    /// Number of candidates taken from the board.
    #[must_use]
    pub const fn candidates(&self) -> usize {
        match self {
            Self::TopN(n) | Self::Allocator(n) => *n,
        }
    }
}

impl Default for HoldingMode {
    fn default() -> Self {
        Self::TopN(10)
    }
}

/// Backtesting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// First rebalance date considered (default: start of data)
    pub start: Option<Date>,
    /// Last rebalance date considered (default: end of data)
    pub end: Option<Date>,
    /// Initial capital
    pub initial_capital: f64,
    /// Holding construction
    pub mode: HoldingMode,
    /// Rebalances per year, for the Sharpe ratio
    pub periods_per_year: f64,
    /// Regime classifier settings
    pub regime: RegimeConfig,
    /// Factor settings
    pub factors: FactorConfig,
    /// Scoring settings (default: two-factor weight table)
    pub scorer: ScorerConfig,
    /// Allocator settings for [`HoldingMode::Allocator`]
    pub allocator: AllocatorConfig,
    /// Fee schedule for rebalancing trades
    pub fees: FeeSchedule,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            initial_capital: 100_000.0,
            mode: HoldingMode::default(),
            periods_per_year: 12.0,
            regime: RegimeConfig::default(),
            factors: FactorConfig::default(),
            scorer: ScorerConfig {
                weights: WeightTable::two_factor(),
                ..ScorerConfig::default()
            },
            allocator: AllocatorConfig::default(),
            fees: FeeSchedule::default(),
        }
    }
}

/// Mutable state carried from one rebalance to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestState {
    /// Current portfolio value.
    pub portfolio_value: f64,
    /// Current weights.
    pub holdings: BTreeMap<Symbol, f64>,
    /// Cost fraction to charge on the next period.
    pub pending_drag: f64,
    /// Start of the open period: the last date marked or, before the first
    /// period closes, the date holdings were first set.
    pub period_start: Option<Date>,
    /// Active scores of the last board, for IC.
    pub last_scores: BTreeMap<Symbol, f64>,
    /// Values, starting with the initial capital.
    pub values: Vec<f64>,
    /// Net return per period.
    pub returns: Vec<f64>,
    /// End date of each period.
    pub period_ends: Vec<Date>,
    /// Friction charged so far, in currency.
    pub friction_paid: f64,
    /// Rank IC of each period.
    pub ic_history: Vec<f64>,
}

impl BacktestState {
    /// Fresh state holding cash.
    #[must_use]
    pub fn new(initial_capital: f64) -> Self {
        Self {
            portfolio_value: initial_capital,
            holdings: BTreeMap::new(),
            pending_drag: 0.0,
            period_start: None,
            last_scores: BTreeMap::new(),
            values: vec![initial_capital],
            returns: Vec::new(),
            period_ends: Vec::new(),
            friction_paid: 0.0,
            ic_history: Vec::new(),
        }
    }

    /// Close a period with gross return `gross`, charging the pending drag.
    ///
    /// Returns the net return.
    pub fn close_period(&mut self, date: Date, gross: f64) -> f64 {
        let net = (1.0 - self.pending_drag) * (1.0 + gross) - 1.0;
        self.friction_paid += self.pending_drag * self.portfolio_value;
        self.pending_drag = 0.0;
        self.portfolio_value *= 1.0 + net;
        self.values.push(self.portfolio_value);
        self.returns.push(net);
        self.period_ends.push(date);
        net
    }
}

/// Backtesting results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Net return per period
    pub returns: Vec<f64>,
    /// Portfolio values, starting with the initial capital
    pub values: Vec<f64>,
    /// End date of each period
    pub period_ends: Vec<Date>,
    /// Final portfolio value
    pub final_value: f64,
    /// `final / initial - 1`
    pub total_return: f64,
    /// Annualized Sharpe ratio
    pub sharpe_ratio: f64,
    /// Maximum drawdown, in `[-1, 0]`
    pub max_drawdown: f64,
    /// Friction charged, in currency
    pub total_friction: f64,
    /// Rank IC between scores and next-period returns
    pub ic_history: Vec<f64>,
    /// Summary of the IC history
    pub ic_summary: Option<InformationRatio>,
}

impl BacktestResult {
    fn from_state(state: BacktestState, periods_per_year: f64) -> Self {
        Self {
            sharpe_ratio: sharpe_ratio(&state.returns, periods_per_year),
            max_drawdown: max_drawdown(&state.values),
            total_return: total_return(&state.values),
            final_value: state.portfolio_value,
            total_friction: state.friction_paid,
            ic_summary: InformationRatio::calculate(&state.ic_history, 2),
            returns: state.returns,
            values: state.values,
            period_ends: state.period_ends,
            ic_history: state.ic_history,
        }
    }

    /// Whether no period could be simulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Number of simulated periods.
    #[must_use]
    pub fn periods(&self) -> usize {
        self.returns.len()
    }

    /// One row per period: `date`, `return`, `value`.
    ///
    /// # Errors
    ///
    /// Propagates DataFrame construction failures.
    pub fn to_frame(&self) -> Result<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "date".into(),
                self.period_ends.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ),
            Column::new("return".into(), self.returns.clone()),
            Column::new("value".into(), self.values.iter().skip(1).copied().collect::<Vec<_>>()),
        ])
        .map_err(AugurError::from)
    }
}

/// Backtesting engine.
#[derive(Debug, Clone, Default)]
pub struct Backtest {
    config: BacktestConfig,
}

impl Backtest {
    /// Create a backtest with the given configuration.
    #[must_use]
    pub const fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Simulate over the month-end trading dates of `panel`.
    ///
    /// Dates on which nothing can be scored keep the current holdings. When
    /// no date is ever scorable the result has an empty return history.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] for a non-positive initial capital or a
    /// zero candidate count.
    pub fn run(
        &self,
        panel: &PricePanel,
        sectors: &SectorMap,
        context: &ScoringContext,
    ) -> Result<BacktestResult> {
        let config = &self.config;
        if !(config.initial_capital.is_finite() && config.initial_capital > 0.0) {
            return Err(AugurError::InvalidData(format!(
                "initial capital must be positive, got {}",
                config.initial_capital
            )));
        }
        if config.mode.candidates() == 0 {
            return Err(AugurError::InvalidData("backtest needs at least one holding".into()));
        }

        let pipeline = RankingPipeline::new(config.regime, config.factors, config.scorer);
        let friction = FrictionModel::new(config.fees);
        let allocator = BayesianAllocator::new(config.allocator);
        let mut state = BacktestState::new(config.initial_capital);

        let dates = panel.month_ends(config.start, config.end);
        for &date in &dates {
            if let Some(prev) = state.period_start {
                mark(panel, &mut state, prev, date);
            }

            let board = match pipeline.board_at(panel, sectors, context, date) {
                Ok(board) => board,
                Err(err) => {
                    debug!(%date, error = %err, "date not scorable, holdings unchanged");
                    continue;
                }
            };
            let target = self.target_weights(&board, &allocator, panel, sectors, date);
            if target.is_empty() {
                debug!(%date, "no active assets, holdings unchanged");
                continue;
            }

            state.pending_drag =
                rebalance_drag(&friction, panel, &state.holdings, &target, date, state.portfolio_value);
            state.holdings = target;
            state.last_scores = board.active().map(|e| (e.symbol.clone(), e.score)).collect();
            state.period_start = Some(date);
        }

        let result = BacktestResult::from_state(state, config.periods_per_year);
        info!(
            periods = result.periods(),
            total_return = result.total_return,
            sharpe = result.sharpe_ratio,
            max_drawdown = result.max_drawdown,
            friction = result.total_friction,
            "backtest complete"
        );
        Ok(result)
    }

    fn target_weights(
        &self,
        board: &ScoreBoard,
        allocator: &BayesianAllocator,
        panel: &PricePanel,
        sectors: &SectorMap,
        date: Date,
    ) -> BTreeMap<Symbol, f64> {
        let picks = board.top(self.config.mode.candidates());
        if picks.is_empty() {
            return BTreeMap::new();
        }
        match self.config.mode {
            HoldingMode::TopN(_) => {
                let w = 1.0 / picks.len() as f64;
                picks.iter().map(|e| (e.symbol.clone(), w)).collect()
            }
            HoldingMode::Allocator(_) => {
                let recs: Vec<Recommendation> = picks
                    .iter()
                    .map(|e| Recommendation::from_score(e.symbol.clone(), e.score))
                    .collect();
                allocator.allocate(&recs, panel, sectors, date).weights().clone()
            }
        }
    }
}

/// Close the period from `prev` to `date` and drift the holdings. The next
/// period starts at `date` whether or not the holdings are replaced there.
fn mark(panel: &PricePanel, state: &mut BacktestState, prev: Date, date: Date) {
    let symbols: BTreeSet<&str> = state
        .holdings
        .keys()
        .chain(state.last_scores.keys())
        .map(String::as_str)
        .collect();
    let realized = period_returns(panel, symbols, prev, date);

    let mut gross = 0.0;
    let mut valid_weight = 0.0;
    for (symbol, w) in &state.holdings {
        if let Some(r) = realized.get(symbol) {
            gross += w * r;
            valid_weight += w;
        }
    }
    let gross = if valid_weight > 0.0 { gross / valid_weight } else { 0.0 };

    if let Some(ic) = cross_sectional_ic(&state.last_scores, &realized) {
        state.ic_history.push(ic);
    }
    state.holdings = drift(&state.holdings, &realized);
    let net = state.close_period(date, gross);
    state.period_start = Some(date);
    debug!(%date, gross, net, value = state.portfolio_value, "period closed");
}

/// Simple return of each symbol between two dates, using the last close on
/// or before each date. Symbols without both prices are left out.
fn period_returns<'a>(
    panel: &PricePanel,
    symbols: impl IntoIterator<Item = &'a str>,
    from: Date,
    to: Date,
) -> BTreeMap<Symbol, f64> {
    symbols
        .into_iter()
        .filter_map(|symbol| {
            let series = panel.get(symbol)?;
            let start = series.close_as_of(from)?;
            let end = series.close_as_of(to)?;
            (start > 0.0).then(|| (symbol.to_string(), end / start - 1.0))
        })
        .collect()
}

/// Weights after a period of returns; unpriced holdings are dropped.
fn drift(
    holdings: &BTreeMap<Symbol, f64>,
    realized: &BTreeMap<Symbol, f64>,
) -> BTreeMap<Symbol, f64> {
    let grown: BTreeMap<Symbol, f64> = holdings
        .iter()
        .filter_map(|(s, w)| realized.get(s).map(|r| (s.clone(), w * (1.0 + r))))
        .filter(|(_, w)| *w > 0.0)
        .collect();
    let total: f64 = grown.values().sum();
    if total <= 0.0 {
        return BTreeMap::new();
    }
    grown.into_iter().map(|(s, w)| (s, w / total)).collect()
}

/// Cost of moving from `current` to `target` as a fraction of `value`.
fn rebalance_drag(
    friction: &FrictionModel,
    panel: &PricePanel,
    current: &BTreeMap<Symbol, f64>,
    target: &BTreeMap<Symbol, f64>,
    date: Date,
    value: f64,
) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    let symbols: BTreeSet<&Symbol> = current.keys().chain(target.keys()).collect();
    let mut cost = 0.0;
    for symbol in symbols {
        let delta = target.get(symbol).copied().unwrap_or(0.0)
            - current.get(symbol).copied().unwrap_or(0.0);
        if delta.abs() < 1e-12 {
            continue;
        }
        let Some(price) = panel.get(symbol).and_then(|s| s.close_as_of(date)) else {
            debug!(%symbol, %date, "no price to trade at");
            continue;
        };
        let side = if delta > 0.0 { TradeSide::Buy } else { TradeSide::Sell };
        match friction.trade_cost(price, delta.abs() * value / price, side) {
            Ok(trade) => cost += trade.total_cost(),
            Err(err) => debug!(%symbol, error = %err, "trade not priced"),
        }
    }
    cost / value
}
