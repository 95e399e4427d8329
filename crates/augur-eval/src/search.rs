//! In-sample grid search over regime weights.
//!
//! Every candidate is judged on the same history it is chosen from, so the
//! winning weights describe the past and carry no out-of-sample claim. Use
//! [`crate::Backtest`] to validate them.

use augur_combine::{RegimeWeights, ScoringContext, WeightTable, simplex_grid};
use augur_signals::{FactorConfig, FactorFrame, Regime, RegimeConfig};
use augur_traits::stats::mean;
use augur_traits::{AugurError, Date, PricePanel, Result, SectorMap};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::pipeline::RankingPipeline;

/// Grid search settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Grid steps per unit weight (default: 5, i.e. 0.2 increments)
    pub divisions: u32,
    /// Assets held per date (default: 10)
    pub top_n: usize,
    /// Trading dates to the forward price (default: 20)
    pub forward_periods: usize,
    /// First date considered
    pub start: Option<Date>,
    /// Last date considered
    pub end: Option<Date>,
    /// Regime classifier settings
    pub regime: RegimeConfig,
    /// Factor settings
    pub factors: FactorConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            divisions: 5,
            top_n: 10,
            forward_periods: 20,
            start: None,
            end: None,
            regime: RegimeConfig::default(),
            factors: FactorConfig::default(),
        }
    }
}

/// Objective of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Weights tried.
    pub weights: RegimeWeights,
    /// Mean forward return of the top picks, `None` when nothing was evaluable.
    pub objective: Option<f64>,
}

/// Search outcome for one regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSearch {
    /// Regime searched.
    pub regime: Regime,
    /// Winning weights, or the default for the regime.
    pub best: RegimeWeights,
    /// Objective of the winner; `None` when the default was returned.
    pub objective: Option<f64>,
    /// Month-end dates in this regime with a forward price.
    pub dates: usize,
    /// Every candidate in grid order.
    pub candidates: Vec<CandidateScore>,
}

/// Best weights per regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Bull market search.
    pub bull: RegimeSearch,
    /// Bear market search.
    pub bear: RegimeSearch,
}

impl SearchResult {
    /// Result for `regime`.
    #[must_use]
    pub const fn for_regime(&self, regime: Regime) -> &RegimeSearch {
        match regime {
            Regime::Bull => &self.bull,
            Regime::Bear => &self.bear,
        }
    }

    /// The winners as a weight table.
    #[must_use]
    pub const fn weight_table(&self) -> WeightTable {
        WeightTable {
            bull: self.bull.best,
            bear: self.bear.best,
        }
    }
}

/// A month-end date ready for evaluation.
struct Observation {
    date: Date,
    forward: Date,
    frame: FactorFrame,
}

/// Grid search driver.
#[derive(Debug, Clone, Default)]
pub struct WeightSearch {
    config: SearchConfig,
}

impl WeightSearch {
    /// Create a search with the given settings.
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// The settings.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search each regime separately.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] for zero divisions or a zero holding count.
    pub fn run(&self, panel: &PricePanel, sectors: &SectorMap) -> Result<SearchResult> {
        let config = &self.config;
        if config.divisions == 0 || config.top_n == 0 {
            return Err(AugurError::InvalidData(
                "search needs positive divisions and holdings".into(),
            ));
        }
        let pipeline = RankingPipeline::new(config.regime, config.factors, Default::default());
        let grid = simplex_grid(config.divisions);
        let calendar = panel.calendar();

        let mut bull = Vec::new();
        let mut bear = Vec::new();
        for date in panel.month_ends(config.start, config.end) {
            let regime = match pipeline.regime_at(panel, date) {
                Ok(regime) => regime,
                Err(err) => {
                    debug!(%date, error = %err, "no regime, date skipped");
                    continue;
                }
            };
            let Some(forward) = calendar
                .binary_search(&date)
                .ok()
                .and_then(|i| calendar.get(i + config.forward_periods))
                .copied()
            else {
                debug!(%date, "no forward price, date skipped");
                continue;
            };
            let observation = Observation {
                date,
                forward,
                frame: pipeline.frame_at(panel, sectors, date),
            };
            match regime {
                Regime::Bull => bull.push(observation),
                Regime::Bear => bear.push(observation),
            }
        }

        let defaults = WeightTable::search_defaults();
        let result = SearchResult {
            bull: self.search_regime(&pipeline, panel, &grid, Regime::Bull, &bull, defaults.bull),
            bear: self.search_regime(&pipeline, panel, &grid, Regime::Bear, &bear, defaults.bear),
        };
        for regime in Regime::ALL {
            let r = result.for_regime(regime);
            info!(
                %regime,
                dates = r.dates,
                momentum = r.best.momentum,
                safety = r.best.safety,
                value = r.best.value,
                objective = ?r.objective,
                "weight search finished"
            );
        }
        Ok(result)
    }

    fn search_regime(
        &self,
        pipeline: &RankingPipeline,
        panel: &PricePanel,
        grid: &[RegimeWeights],
        regime: Regime,
        observations: &[Observation],
        default: RegimeWeights,
    ) -> RegimeSearch {
        let candidates: Vec<CandidateScore> = grid
            .par_iter()
            .map(|&weights| CandidateScore {
                weights,
                objective: self.objective(pipeline, panel, regime, weights, observations),
            })
            .collect();

        let mut best: Option<(RegimeWeights, f64)> = None;
        for c in &candidates {
            if let Some(obj) = c.objective
                && best.is_none_or(|(_, b)| obj > b)
            {
                best = Some((c.weights, obj));
            }
        }

        RegimeSearch {
            regime,
            best: best.map_or(default, |(w, _)| w),
            objective: best.map(|(_, o)| o),
            dates: observations.len(),
            candidates,
        }
    }

    /// Mean over dates of the average forward return of the top picks.
    fn objective(
        &self,
        pipeline: &RankingPipeline,
        panel: &PricePanel,
        regime: Regime,
        weights: RegimeWeights,
        observations: &[Observation],
    ) -> Option<f64> {
        let context = ScoringContext::default();
        let per_date: Vec<f64> = observations
            .iter()
            .filter_map(|obs| {
                let board = pipeline.board_with(&obs.frame, regime, weights, &context).ok()?;
                let returns: Vec<f64> = board
                    .top(self.config.top_n)
                    .iter()
                    .filter_map(|e| {
                        let series = panel.get(&e.symbol)?;
                        let now = series.close_as_of(obs.date)?;
                        let later = series.close_as_of(obs.forward)?;
                        Some(later / now - 1.0)
                    })
                    .collect();
                mean(&returns)
            })
            .collect();
        mean(&per_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use augur_traits::PriceSeries;

    fn calendar(n: usize) -> Vec<Date> {
        let start = Date::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n as u64).map(|i| start + chrono::Days::new(i)).collect()
    }

    fn series(symbol: &str, n: usize, growth: f64, wobble: f64) -> PriceSeries {
        let closes = (0..n)
            .map(|t| {
                let t = t as f64;
                100.0 * (1.0 + growth).powf(t) * (1.0 + wobble * (1.7 * t).sin())
            })
            .collect();
        PriceSeries::new(symbol, calendar(n), closes).unwrap()
    }

    fn panel(n: usize) -> PricePanel {
        PricePanel::new(
            "^NSEI",
            vec![
                series("^NSEI", n, 0.0005, 0.001),
                series("FAST", n, 0.002, 0.02),
                series("SLOW", n, 0.0005, 0.002),
                series("SINK", n, -0.001, 0.005),
            ],
        )
        .unwrap()
    }

    fn config() -> SearchConfig {
        SearchConfig {
            top_n: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_when_nothing_is_evaluable() {
        let result = WeightSearch::new(config())
            .run(&panel(120), &SectorMap::new())
            .unwrap();
        assert_eq!(result.weight_table(), WeightTable::search_defaults());
        assert!(result.bull.objective.is_none());
        assert!(result.bear.objective.is_none());
        assert_eq!(result.bull.dates, 0);
    }

    #[test]
    fn test_winner_has_the_highest_in_sample_objective() {
        let result = WeightSearch::new(config())
            .run(&panel(400), &SectorMap::new())
            .unwrap();
        let bull = &result.bull;
        assert_eq!(bull.candidates.len(), 21);
        assert!(bull.dates > 0);
        let best = bull.objective.unwrap();
        let max = bull
            .candidates
            .iter()
            .filter_map(|c| c.objective)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(best, max);
        // first candidate in grid order reaching the maximum
        let first = bull
            .candidates
            .iter()
            .find(|c| c.objective == Some(max))
            .unwrap();
        assert_eq!(first.weights, bull.best);
        assert!(bull.best.is_simplex());
    }

    #[test]
    fn test_momentum_candidate_picks_the_trend() {
        let result = WeightSearch::new(config())
            .run(&panel(400), &SectorMap::new())
            .unwrap();
        let momentum_only = result
            .bull
            .candidates
            .iter()
            .find(|c| c.weights == RegimeWeights::new(1.0, 0.0, 0.0))
            .and_then(|c| c.objective)
            .unwrap();
        assert!(momentum_only > 0.0);
    }

    #[test]
    fn test_search_is_deterministic() {
        let search = WeightSearch::new(config());
        let panel = panel(400);
        let a = search.run(&panel, &SectorMap::new()).unwrap();
        let b = search.run(&panel, &SectorMap::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_empty_grid() {
        let search = WeightSearch::new(SearchConfig {
            divisions: 0,
            ..Default::default()
        });
        assert!(search.run(&panel(10), &SectorMap::new()).is_err());
    }
}
