//! Regime, factors and scores for one date, as the harness sees them.

use augur_combine::{CompositeScorer, RegimeWeights, ScoreBoard, ScorerConfig, ScoringContext};
use augur_signals::{FactorConfig, FactorEngine, FactorFrame, Regime, RegimeClassifier, RegimeConfig};
use augur_traits::{Date, PricePanel, Result, SectorMap};

/// Classifier, factor engine and scorer wired together.
#[derive(Debug, Clone, Default)]
pub struct RankingPipeline {
    classifier: RegimeClassifier,
    engine: FactorEngine,
    scorer: CompositeScorer,
}

impl RankingPipeline {
    /// Build from component settings.
    #[must_use]
    pub const fn new(regime: RegimeConfig, factors: FactorConfig, scorer: ScorerConfig) -> Self {
        Self {
            classifier: RegimeClassifier::new(regime),
            engine: FactorEngine::new(factors),
            scorer: CompositeScorer::new(scorer),
        }
    }

    /// The scorer.
    #[must_use]
    pub const fn scorer(&self) -> &CompositeScorer {
        &self.scorer
    }

    /// Benchmark regime using prices up to `date`.
    ///
    /// # Errors
    ///
    /// [`augur_traits::AugurError::InsufficientHistory`] when the benchmark is too short.
    pub fn regime_at(&self, panel: &PricePanel, date: Date) -> Result<Regime> {
        Ok(self.classifier.classify_at(panel, date)?.label)
    }

    /// Factor frame at `date`.
    #[must_use]
    pub fn frame_at(&self, panel: &PricePanel, sectors: &SectorMap, date: Date) -> FactorFrame {
        self.engine.snapshot(panel, sectors, date)
    }

    /// Score board at `date` with the configured weight table.
    ///
    /// # Errors
    ///
    /// Propagates regime classification and scoring failures.
    pub fn board_at(
        &self,
        panel: &PricePanel,
        sectors: &SectorMap,
        context: &ScoringContext,
        date: Date,
    ) -> Result<ScoreBoard> {
        let regime = self.regime_at(panel, date)?;
        let frame = self.frame_at(panel, sectors, date);
        self.scorer.score(&frame, regime, context)
    }

    /// Score a precomputed frame with explicit weights.
    ///
    /// # Errors
    ///
    /// [`augur_traits::AugurError::InvalidData`] for negative weights.
    pub fn board_with(
        &self,
        frame: &FactorFrame,
        regime: Regime,
        weights: RegimeWeights,
        context: &ScoringContext,
    ) -> Result<ScoreBoard> {
        self.scorer.score_with(frame, regime, weights, context)
    }
}
