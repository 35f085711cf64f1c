//! Generic multi-criteria candidate ranking.
//!
//! A [`FeatureSet`] names per-candidate extractors, a [`CompiledFormula`]
//! combines them into a score, [`NormalizedFeatureSet`] rescales numeric
//! features over one batch, and [`Ranker`] produces a deterministic best-first
//! order with tolerance-aware tie-breaking.

pub mod error;
pub mod feature_set;
pub mod formula;
pub mod normalize;
pub mod rank;
mod sort;
pub mod value;

pub use error::{CompileError, EvaluationError, NormalizeError, RankError};
pub use feature_set::{Extractor, FeatureSet, FeatureSource};
pub use formula::{CompiledFormula, MAX_NESTING};
pub use normalize::{BatchWarning, Normalization, NormalizedFeatureSet};
pub use rank::{
    rank, Exclusion, ExclusionReason, RankedCandidate, RankedResult, Ranker, SecondaryKey,
};
pub use value::{Value, ValueKind};
