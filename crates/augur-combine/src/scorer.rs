//! Regime-conditioned composite scoring of a factor frame.
//!
//! Only `Active` assets enter the rank inputs. Everything else is reported with
//! its status and a score of exactly zero.

use std::collections::BTreeMap;
use std::fmt;

use augur_signals::{FactorFrame, Regime};
use augur_traits::stats::percentile_ranks;
use augur_traits::{AugurError, Date, Result, Symbol};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combiner::{Combiner, SignalScore};
use crate::rank_blend::{MOMENTUM, RankBlendCombiner, SAFETY, VALUE};
use crate::weights::{RegimeWeights, WeightTable};

/// Composite scorer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Weights per regime (default: live table)
    pub weights: WeightTable,
    /// Sentiment strictly below this rejects the asset (default: -0.20)
    pub sentiment_threshold: f64,
    /// Minimum fundamental score to stay active (default: off)
    pub min_fundamental_score: Option<u8>,
    /// Offset added to a valuation upside before clipping to `[0, 1]` (default: 0.2)
    pub upside_offset: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            weights: WeightTable::live(),
            sentiment_threshold: -0.20,
            min_fundamental_score: None,
            upside_offset: 0.2,
        }
    }
}

/// External per-asset inputs to scoring. Missing entries use neutral defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringContext {
    /// News sentiment in `[-1, 1]`; missing is 0.0
    pub sentiment: BTreeMap<Symbol, f64>,
    /// Fundamental quality score 0–9; missing is 0
    pub fundamentals: BTreeMap<Symbol, u8>,
    /// Valuation upside `(fair - price) / price`; replaces the value-proxy rank when present
    pub upside: BTreeMap<Symbol, f64>,
}

impl ScoringContext {
    fn sentiment_of(&self, symbol: &str) -> f64 {
        self.sentiment.get(symbol).copied().unwrap_or(0.0)
    }

    fn fundamental_of(&self, symbol: &str) -> u8 {
        self.fundamentals.get(symbol).copied().unwrap_or_else(|| {
            debug!(symbol, "no fundamental score, using 0");
            0
        })
    }
}

/// Whether an asset took part in the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Ranked normally.
    Active,
    /// Missing from the factor frame.
    DataError(String),
    /// News sentiment below the threshold.
    RejectedSentiment,
    /// Fundamental score below the configured minimum.
    RejectedFundamental,
}

impl AssetStatus {
    /// Short label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::DataError(_) => "data_error",
            Self::RejectedSentiment => "rejected_sentiment",
            Self::RejectedFundamental => "rejected_fundamental",
        }
    }

    /// Whether the asset was ranked.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataError(reason) => write!(f, "data_error ({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// One row of a score board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAsset {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Composite score in `[0, 100]`; 0 when not active.
    pub score: f64,
    /// Ranking status.
    pub status: AssetStatus,
    /// Momentum percentile rank among active assets.
    pub momentum_rank: Option<f64>,
    /// One minus the downside-risk percentile rank.
    pub safety_rank: Option<f64>,
    /// Value component actually blended.
    pub value_rank: Option<f64>,
    /// Sentiment used for gating.
    pub sentiment: f64,
    /// Fundamental score carried for reporting.
    pub fundamental_score: u8,
}

/// Scored universe at one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoard {
    date: Date,
    regime: Regime,
    weights: RegimeWeights,
    entries: Vec<ScoredAsset>,
}

impl ScoreBoard {
    /// Date of the underlying factor frame.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// Regime the weights were chosen for.
    #[must_use]
    pub const fn regime(&self) -> Regime {
        self.regime
    }

    /// Weights applied.
    #[must_use]
    pub const fn weights(&self) -> RegimeWeights {
        self.weights
    }

    /// All rows, best score first, ties by symbol.
    #[must_use]
    pub fn entries(&self) -> &[ScoredAsset] {
        &self.entries
    }

    /// Row for `symbol`.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&ScoredAsset> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    /// Active rows in board order.
    pub fn active(&self) -> impl Iterator<Item = &ScoredAsset> {
        self.entries.iter().filter(|e| e.status.is_active())
    }

    /// The `n` best active rows.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<&ScoredAsset> {
        self.active().take(n).collect()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the board has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the board to a DataFrame in board order.
    ///
    /// # Errors
    ///
    /// Propagates DataFrame construction failures.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let e = &self.entries;
        DataFrame::new(vec![
            Column::new(
                "symbol".into(),
                e.iter().map(|r| r.symbol.as_str()).collect::<Vec<_>>(),
            ),
            Column::new("score".into(), e.iter().map(|r| r.score).collect::<Vec<_>>()),
            Column::new(
                "status".into(),
                e.iter().map(|r| r.status.as_str()).collect::<Vec<_>>(),
            ),
            Column::new(
                "momentum_rank".into(),
                e.iter().map(|r| r.momentum_rank).collect::<Vec<_>>(),
            ),
            Column::new(
                "safety_rank".into(),
                e.iter().map(|r| r.safety_rank).collect::<Vec<_>>(),
            ),
            Column::new(
                "value_rank".into(),
                e.iter().map(|r| r.value_rank).collect::<Vec<_>>(),
            ),
            Column::new(
                "sentiment".into(),
                e.iter().map(|r| r.sentiment).collect::<Vec<_>>(),
            ),
            Column::new(
                "fundamental_score".into(),
                e.iter()
                    .map(|r| u32::from(r.fundamental_score))
                    .collect::<Vec<_>>(),
            ),
        ])
        .map_err(AugurError::from)
    }
}

/// Turns a factor frame into a [`ScoreBoard`].
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    config: ScorerConfig,
}

impl CompositeScorer {
    /// Create a scorer with the given configuration.
    #[must_use]
    pub const fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Scorer configuration.
    #[must_use]
    pub const fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score with the configured weight table.
    ///
    /// # Errors
    ///
    /// See [`Self::score_with`].
    pub fn score(
        &self,
        frame: &FactorFrame,
        regime: Regime,
        context: &ScoringContext,
    ) -> Result<ScoreBoard> {
        self.score_with(frame, regime, self.config.weights.for_regime(regime), context)
    }

    /// Score with explicit weights, keeping the regime only as a label.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] for negative weights.
    pub fn score_with(
        &self,
        frame: &FactorFrame,
        regime: Regime,
        weights: RegimeWeights,
        context: &ScoringContext,
    ) -> Result<ScoreBoard> {
        weights.validate()?;

        let mut entries = Vec::with_capacity(frame.len() + frame.excluded().len());
        let mut active: Vec<&Symbol> = Vec::new();
        for symbol in frame.snapshots().keys() {
            let sentiment = context.sentiment_of(symbol);
            let fundamental_score = context.fundamental_of(symbol);
            let status = if sentiment < self.config.sentiment_threshold {
                AssetStatus::RejectedSentiment
            } else if self
                .config
                .min_fundamental_score
                .is_some_and(|min| fundamental_score < min)
            {
                AssetStatus::RejectedFundamental
            } else {
                active.push(symbol);
                AssetStatus::Active
            };
            if !status.is_active() {
                entries.push(inactive(symbol, status, sentiment, fundamental_score));
            }
        }
        for (symbol, reason) in frame.excluded() {
            entries.push(inactive(
                symbol,
                AssetStatus::DataError(reason.clone()),
                context.sentiment_of(symbol),
                context.fundamental_of(symbol),
            ));
        }

        let pick = |f: fn(&augur_signals::FactorSnapshot) -> f64| -> Vec<f64> {
            active
                .iter()
                .filter_map(|s| frame.get(s.as_str()))
                .map(f)
                .collect()
        };
        let momentum = percentile_ranks(&pick(|s| s.momentum));
        let safety: Vec<f64> = percentile_ranks(&pick(|s| s.downside_risk))
            .into_iter()
            .map(|r| 1.0 - r)
            .collect();
        let value: Vec<f64> = percentile_ranks(&pick(|s| s.value_proxy))
            .into_iter()
            .zip(&active)
            .map(|(rank, symbol)| {
                match context.upside.get(symbol.as_str()) {
                    Some(upside) if upside.is_finite() => {
                        (upside + self.config.upside_offset).clamp(0.0, 1.0)
                    }
                    Some(upside) => {
                        debug!(%symbol, upside, "non-finite upside, value proxy used");
                        rank
                    }
                    None => rank,
                }
            })
            .collect();

        let scores = RankBlendCombiner::new(weights).combine(&[
            SignalScore::new(MOMENTUM, Array1::from(momentum.clone())),
            SignalScore::new(SAFETY, Array1::from(safety.clone())),
            SignalScore::new(VALUE, Array1::from(value.clone())),
        ])?;

        for (i, symbol) in active.iter().enumerate() {
            entries.push(ScoredAsset {
                symbol: (*symbol).clone(),
                score: scores[i],
                status: AssetStatus::Active,
                momentum_rank: Some(momentum[i]),
                safety_rank: Some(safety[i]),
                value_rank: Some(value[i]),
                sentiment: context.sentiment_of(symbol),
                fundamental_score: context.fundamental_of(symbol),
            });
        }

        entries.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        debug!(
            date = %frame.date(),
            %regime,
            active = active.len(),
            total = entries.len(),
            "scored universe"
        );

        Ok(ScoreBoard {
            date: frame.date(),
            regime,
            weights,
            entries,
        })
    }
}

fn inactive(symbol: &str, status: AssetStatus, sentiment: f64, fundamental_score: u8) -> ScoredAsset {
    ScoredAsset {
        symbol: symbol.to_string(),
        score: 0.0,
        status,
        momentum_rank: None,
        safety_rank: None,
        value_rank: None,
        sentiment,
        fundamental_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use augur_signals::FactorSnapshot;

    fn snapshot(momentum: f64, downside_risk: f64, value_proxy: f64) -> FactorSnapshot {
        FactorSnapshot {
            momentum,
            downside_risk,
            value_proxy,
            rsi: None,
            volatility: None,
            bb_width: None,
            volume_ratio: None,
            rel_strength_market: None,
            rel_strength_sector: None,
        }
    }

    fn frame() -> FactorFrame {
        FactorFrame::from_results(
            Date::from_ymd_opt(2024, 5, 31).unwrap(),
            vec![
                ("A".to_string(), Ok(snapshot(0.3, 0.01, 2.0))),
                ("B".to_string(), Ok(snapshot(0.1, 0.02, 5.0))),
                ("C".to_string(), Ok(snapshot(-0.1, 0.03, 10.0))),
                (
                    "D".to_string(),
                    Err(AugurError::InsufficientHistory("need 200".into())),
                ),
            ],
        )
    }

    fn score_of(board: &ScoreBoard, symbol: &str) -> f64 {
        board.get(symbol).unwrap().score
    }

    #[test]
    fn test_bull_scores() {
        let board = CompositeScorer::default()
            .score(&frame(), Regime::Bull, &ScoringContext::default())
            .unwrap();
        assert_relative_eq!(score_of(&board, "A"), 54.0, epsilon = 1e-9);
        assert_relative_eq!(score_of(&board, "B"), 48.0, epsilon = 1e-9);
        assert_relative_eq!(score_of(&board, "C"), 42.0, epsilon = 1e-9);
        assert_eq!(board.entries()[0].symbol, "A");
    }

    #[test]
    fn test_bear_scores_use_safety_only() {
        let board = CompositeScorer::default()
            .score(&frame(), Regime::Bear, &ScoringContext::default())
            .unwrap();
        assert_relative_eq!(score_of(&board, "A"), 60.0, epsilon = 1e-9);
        assert_relative_eq!(score_of(&board, "C"), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_data_scores_zero() {
        let board = CompositeScorer::default()
            .score(&frame(), Regime::Bull, &ScoringContext::default())
            .unwrap();
        let d = board.get("D").unwrap();
        assert_eq!(d.score, 0.0);
        assert!(matches!(d.status, AssetStatus::DataError(_)));
        assert_eq!(board.top(10).len(), 3);
    }

    #[test]
    fn test_sentiment_rejection_reranks_the_rest() {
        let context = ScoringContext {
            sentiment: [("B".to_string(), -0.5)].into_iter().collect(),
            ..Default::default()
        };
        let board = CompositeScorer::default()
            .score(&frame(), Regime::Bull, &context)
            .unwrap();
        assert_eq!(board.get("B").unwrap().status, AssetStatus::RejectedSentiment);
        assert_eq!(score_of(&board, "B"), 0.0);
        assert_relative_eq!(score_of(&board, "A"), 54.0, epsilon = 1e-9);
        assert_relative_eq!(score_of(&board, "C"), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_threshold_is_strict() {
        let context = ScoringContext {
            sentiment: [("B".to_string(), -0.20)].into_iter().collect(),
            ..Default::default()
        };
        let board = CompositeScorer::default()
            .score(&frame(), Regime::Bull, &context)
            .unwrap();
        assert!(board.get("B").unwrap().status.is_active());
    }

    #[test]
    fn test_fundamental_gate() {
        let scorer = CompositeScorer::new(ScorerConfig {
            min_fundamental_score: Some(5),
            ..Default::default()
        });
        let context = ScoringContext {
            fundamentals: [("A".to_string(), 7), ("B".to_string(), 5)].into_iter().collect(),
            ..Default::default()
        };
        let board = scorer.score(&frame(), Regime::Bull, &context).unwrap();
        assert!(board.get("B").unwrap().status.is_active());
        assert_eq!(board.get("C").unwrap().status, AssetStatus::RejectedFundamental);
    }

    #[test]
    fn test_upside_overrides_value_rank() {
        let context = ScoringContext {
            upside: [("C".to_string(), 0.5)].into_iter().collect(),
            ..Default::default()
        };
        let board = CompositeScorer::default()
            .score(&frame(), Regime::Bull, &context)
            .unwrap();
        let c = board.get("C").unwrap();
        assert_relative_eq!(c.value_rank.unwrap(), 0.7, epsilon = 1e-12);
        assert_relative_eq!(c.score, 31.2, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_upside_falls_back_to_value_rank() {
        let plain = CompositeScorer::default()
            .score(&frame(), Regime::Bull, &ScoringContext::default())
            .unwrap();
        let context = ScoringContext {
            upside: [("C".to_string(), f64::NAN), ("A".to_string(), f64::INFINITY)]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let board = CompositeScorer::default()
            .score(&frame(), Regime::Bull, &context)
            .unwrap();
        for symbol in ["A", "C"] {
            let row = board.get(symbol).unwrap();
            assert!(row.score.is_finite());
            assert_eq!(row.value_rank, plain.get(symbol).unwrap().value_rank);
            assert_relative_eq!(row.score, score_of(&plain, symbol), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_two_factor_weights_and_export() {
        let scorer = CompositeScorer::new(ScorerConfig {
            weights: WeightTable::two_factor(),
            ..Default::default()
        });
        let board = scorer
            .score(&frame(), Regime::Bull, &ScoringContext::default())
            .unwrap();
        // 0.4 * 1 + 0.6 * 2/3
        assert_relative_eq!(score_of(&board, "A"), 80.0, epsilon = 1e-9);
        let df = board.to_frame().unwrap();
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_empty_frame() {
        let frame = FactorFrame::new(Date::from_ymd_opt(2024, 5, 31).unwrap());
        let board = CompositeScorer::default()
            .score(&frame, Regime::Bull, &ScoringContext::default())
            .unwrap();
        assert!(board.is_empty());
    }
}
