//! Composite scoring for the augur ranking model.
//!
//! This crate blends cross-sectional factor ranks into a single 0–100 score.
//! The blend weights depend on the market regime through a [`WeightTable`],
//! and assets are gated on sentiment (and optionally on fundamentals) before
//! they are ranked.
//!
//! # Examples
//!
//! ```rust,no_run
//! use augur_combine::{Combiner, RankBlendCombiner, RegimeWeights, SignalScore};
//!
//! let combiner = RankBlendCombiner::new(RegimeWeights::new(0.4, 0.6, 0.0));
//! let components = vec![
//!     SignalScore::new("momentum", vec![1.0, 0.5]),
//!     SignalScore::new("safety", vec![0.5, 1.0]),
//! ];
//!
//! let composite = combiner.combine(&components).unwrap();
//! ```

mod combiner;
mod rank_blend;
mod scorer;
mod weights;

// Re-export main types
pub use combiner::{Combiner, SignalScore};
pub use rank_blend::{MOMENTUM, RankBlendCombiner, SAFETY, VALUE};
pub use scorer::{
    AssetStatus, CompositeScorer, ScoreBoard, ScoredAsset, ScorerConfig, ScoringContext,
};
pub use weights::{RegimeWeights, WeightTable, simplex_grid};
