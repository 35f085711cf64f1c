//! Best-first ordering of a candidate batch by formula score.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use setup_types::Tolerance;
use tracing::{debug, info, instrument};

use crate::error::{CompileError, EvaluationError, RankError};
use crate::feature_set::{FeatureSet, FeatureSource};
use crate::formula::CompiledFormula;
use crate::normalize::{BatchWarning, NormalizedFeatureSet};
use crate::sort::merge_sort_by;
use crate::value::Value;

/// Input index, primary score, secondary keys.
type Keyed = (usize, f64, Vec<f64>);

/// A caller-supplied secondary sort key. Larger keys rank first; a NaN key
/// ranks after every number and ties with other NaN keys.
pub struct SecondaryKey<'k, T> {
    name: String,
    key: Box<dyn Fn(&T) -> f64 + 'k>,
}

impl<'k, T> SecondaryKey<'k, T> {
    pub fn new(name: impl Into<String>, key: impl Fn(&T) -> f64 + 'k) -> Self {
        Self {
            name: name.into(),
            key: Box::new(key),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

enum TieBreak<'k, T> {
    /// A numeric feature of the formula's feature set.
    Feature { name: String, slot: usize },
    Custom(SecondaryKey<'k, T>),
}

impl<T> TieBreak<'_, T> {
    fn name(&self) -> &str {
        match self {
            TieBreak::Feature { name, .. } => name,
            TieBreak::Custom(key) => key.name(),
        }
    }
}

/// One ranked candidate. `index` refers to the input slice.
pub struct RankedCandidate<'a, T> {
    pub index: usize,
    pub candidate: &'a T,
    pub score: f64,
}

impl<T: fmt::Debug> fmt::Debug for RankedCandidate<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankedCandidate")
            .field("index", &self.index)
            .field("candidate", self.candidate)
            .field("score", &self.score)
            .finish()
    }
}

/// Why a candidate was left out of the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExclusionReason {
    /// A declared numeric feature is NaN or infinite on the raw candidate.
    NonFiniteFeature { feature: String, value: f64 },
    /// The formula evaluated to NaN or infinity.
    NonFiniteScore { score: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub index: usize,
    pub reason: ExclusionReason,
}

/// Candidates in rank order, best first, plus what was left out and why.
pub struct RankedResult<'a, T> {
    pub entries: Vec<RankedCandidate<'a, T>>,
    pub excluded: Vec<Exclusion>,
    pub warnings: Vec<BatchWarning>,
}

impl<'a, T> RankedResult<'a, T> {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            excluded: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn best(&self) -> Option<&RankedCandidate<'a, T>> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Input indices in rank order.
    pub fn indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.index).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.score).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedCandidate<'a, T>> {
        self.entries.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for RankedResult<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankedResult")
            .field("entries", &self.entries)
            .field("excluded", &self.excluded)
            .field("warnings", &self.warnings)
            .finish()
    }
}

/// Scores a batch with a compiled formula and orders it best first.
///
/// # Examples
///
/// ```ignore
/// let ranked = Ranker::new(&formula)
///     .with_normalization(true)
///     .with_feature_tie_breaker("ClampingThickness")?
///     .rank(&candidates)?;
/// ```
pub struct Ranker<'f, T> {
    formula: &'f CompiledFormula<T>,
    normalize: bool,
    tie_breakers: Vec<TieBreak<'f, T>>,
    tolerance: Tolerance,
}

impl<'f, T> Ranker<'f, T> {
    /// A ranker without normalization or tie-breakers, using the formula's tolerance.
    pub fn new(formula: &'f CompiledFormula<T>) -> Self {
        Self {
            formula,
            normalize: false,
            tie_breakers: Vec::new(),
            tolerance: formula.tolerance(),
        }
    }

    /// Rescale numeric features to `[0, 1]` over each batch before scoring.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Append a secondary key; keys are consulted in the order added.
    pub fn with_tie_breaker(mut self, name: impl Into<String>, key: impl Fn(&T) -> f64 + 'f) -> Self {
        self.tie_breakers
            .push(TieBreak::Custom(SecondaryKey::new(name, key)));
        self
    }

    pub fn with_secondary_key(mut self, key: SecondaryKey<'f, T>) -> Self {
        self.tie_breakers.push(TieBreak::Custom(key));
        self
    }

    /// Append a declared feature (raw value) as a secondary key.
    pub fn with_feature_tie_breaker(mut self, name: &str) -> Result<Self, CompileError> {
        let slot = self
            .formula
            .features()
            .index_of(name)
            .ok_or_else(|| CompileError::UnknownTieBreaker {
                name: name.to_string(),
            })?;
        self.tie_breakers.push(TieBreak::Feature {
            name: name.to_string(),
            slot,
        });
        Ok(self)
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tie_breaker_names(&self) -> Vec<&str> {
        self.tie_breakers.iter().map(|t| t.name()).collect()
    }

    /// Rank the whole batch.
    pub fn rank<'a>(&self, candidates: &'a [T]) -> Result<RankedResult<'a, T>, RankError> {
        let indices: Vec<usize> = (0..candidates.len()).collect();
        self.rank_subset(candidates, &indices)
    }

    /// Rank the candidates at `indices`; result indices refer to `candidates`.
    /// Each index may appear at most once.
    #[instrument(skip(self, candidates, indices), fields(batch = indices.len(), formula = self.formula.source()))]
    pub fn rank_subset<'a>(
        &self,
        candidates: &'a [T],
        indices: &[usize],
    ) -> Result<RankedResult<'a, T>, RankError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= candidates.len()) {
            return Err(RankError::IndexOutOfRange {
                index,
                len: candidates.len(),
            });
        }
        let mut seen = vec![false; candidates.len()];
        for &index in indices {
            if std::mem::replace(&mut seen[index], true) {
                return Err(RankError::DuplicateIndex { index });
            }
        }

        let mut result = RankedResult::empty();
        let features = self.formula.features();

        // Raw values are checked even when normalizing, so rescaling cannot
        // hide an undefined feature.
        let mut survivors = Vec::with_capacity(indices.len());
        for &index in indices {
            match first_non_finite(features, &candidates[index]) {
                Some((feature, value)) => {
                    debug!(index, feature = feature.as_str(), value, "candidate excluded: non-finite feature");
                    result.excluded.push(Exclusion {
                        index,
                        reason: ExclusionReason::NonFiniteFeature { feature, value },
                    });
                }
                None => survivors.push(index),
            }
        }

        if survivors.is_empty() {
            info!(ranked = 0, excluded = result.excluded.len(), "ranking complete");
            return Ok(result);
        }

        let scored = if self.normalize {
            let batch: Vec<&T> = survivors.iter().map(|&i| &candidates[i]).collect();
            let normalized = NormalizedFeatureSet::build(features, &batch, self.tolerance)?;
            let scored = self.score_all(&normalized, candidates, &survivors, &mut result)?;
            result.warnings = normalized.into_warnings();
            scored
        } else {
            self.score_all(features, candidates, &survivors, &mut result)?
        };

        let mut keyed: Vec<Keyed> = Vec::with_capacity(scored.len());
        for (index, score) in scored {
            let keys = self.secondary_keys(&candidates[index], index)?;
            keyed.push((index, score, keys));
        }

        let tol = self.tolerance;
        let ordered = merge_sort_by(keyed, &|a: &Keyed, b: &Keyed| {
            // Descending: compare b to a.
            let primary = tol.compare(b.1, a.1);
            if primary != Ordering::Equal {
                return primary;
            }
            a.2.iter()
                .zip(b.2.iter())
                .map(|(ka, kb)| key_order(tol, *ka, *kb))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        result.entries = ordered
            .into_iter()
            .map(|(index, score, _)| RankedCandidate {
                index,
                candidate: &candidates[index],
                score,
            })
            .collect();

        info!(
            ranked = result.entries.len(),
            excluded = result.excluded.len(),
            degenerate = result.warnings.len(),
            best_score = result.best().map(|b| b.score),
            "ranking complete"
        );
        Ok(result)
    }

    fn score_all<S>(
        &self,
        source: &S,
        candidates: &[T],
        survivors: &[usize],
        result: &mut RankedResult<'_, T>,
    ) -> Result<Vec<(usize, f64)>, RankError>
    where
        S: FeatureSource<T>,
    {
        let mut scored = Vec::with_capacity(survivors.len());
        for &index in survivors {
            let score = self
                .formula
                .score_with(source, &candidates[index])
                .map_err(|source| RankError::Evaluation { index, source })?;
            if score.is_finite() {
                scored.push((index, score));
            } else {
                debug!(index, score, "candidate excluded: non-finite score");
                result.excluded.push(Exclusion {
                    index,
                    reason: ExclusionReason::NonFiniteScore { score },
                });
            }
        }
        Ok(scored)
    }

    fn secondary_keys(&self, candidate: &T, index: usize) -> Result<Vec<f64>, RankError> {
        self.tie_breakers
            .iter()
            .map(|tie| match tie {
                TieBreak::Custom(key) => Ok((key.key)(candidate)),
                TieBreak::Feature { name, slot } => {
                    match self.formula.features().extract(*slot, candidate) {
                        Value::Number(n) => Ok(n),
                        other => Err(RankError::NonNumericKey {
                            name: name.clone(),
                            index,
                            found: other.kind(),
                        }),
                    }
                }
            })
            .collect()
    }
}

/// Descending key order with NaN after every number.
fn key_order(tol: Tolerance, a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => tol.compare(b, a),
    }
}

/// First declared numeric feature that is NaN or infinite for `candidate`.
fn first_non_finite<T>(features: &FeatureSet<T>, candidate: &T) -> Option<(String, f64)> {
    (0..features.len()).find_map(|slot| match features.extract(slot, candidate) {
        Value::Number(n) if !n.is_finite() => {
            Some((features.name(slot).unwrap_or_default().to_string(), n))
        }
        _ => None,
    })
}

/// One-shot ranking: compile `formula` over `features` and rank `candidates`.
///
/// An empty batch, or one where every candidate is excluded, ranks to an
/// empty result; compile and evaluation failures are errors.
pub fn rank<'a, 'k, T>(
    candidates: &'a [T],
    features: FeatureSet<T>,
    formula: &str,
    secondary_keys: Vec<SecondaryKey<'k, T>>,
    normalize: bool,
) -> Result<RankedResult<'a, T>, RankError> {
    let formula = CompiledFormula::compile(features, formula)?;
    let mut ranker = Ranker::new(&formula).with_normalization(normalize);
    for key in secondary_keys {
        ranker = ranker.with_secondary_key(key);
    }
    ranker.rank(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizeError;
    use crate::value::ValueKind;

    #[derive(Debug, Clone)]
    struct Cand {
        score: f64,
        secondary: f64,
        label: &'static str,
    }

    fn cand(score: f64, secondary: f64) -> Cand {
        Cand {
            score,
            secondary,
            label: "c",
        }
    }

    fn features() -> FeatureSet<Cand> {
        FeatureSet::new()
            .with_number("Score", |c: &Cand| c.score)
            .with_number("Secondary", |c: &Cand| c.secondary)
            .with_feature("Label", |c: &Cand| Value::from(c.label))
    }

    fn formula(source: &str) -> CompiledFormula<Cand> {
        CompiledFormula::compile(features(), source)
            .unwrap()
            .with_tolerance(Tolerance::new(1e-6))
    }

    #[test]
    fn test_tie_broken_by_secondary_key() {
        let batch = vec![cand(10.0, 1.0), cand(20.0, 5.0), cand(20.0, 2.0)];
        let f = formula("Score");
        let ranked = Ranker::new(&f)
            .with_tie_breaker("secondary", |c: &Cand| c.secondary)
            .rank(&batch)
            .unwrap();
        assert_eq!(ranked.indices(), vec![1, 2, 0]);
        assert_eq!(ranked.scores(), vec![20.0, 20.0, 10.0]);
    }

    #[test]
    fn test_infinite_feature_is_excluded() {
        let batch = vec![cand(f64::INFINITY, 0.0), cand(3.0, 0.0), cand(4.0, 0.0)];
        let f = formula("Score");
        let ranked = Ranker::new(&f).rank(&batch).unwrap();
        assert_eq!(ranked.indices(), vec![2, 1]);
        assert_eq!(
            ranked.excluded,
            vec![Exclusion {
                index: 0,
                reason: ExclusionReason::NonFiniteFeature {
                    feature: "Score".into(),
                    value: f64::INFINITY
                }
            }]
        );
    }

    #[test]
    fn test_unreferenced_non_finite_feature_still_excludes() {
        let batch = vec![cand(1.0, f64::NAN), cand(2.0, 0.0)];
        let f = formula("Score");
        let ranked = Ranker::new(&f).with_normalization(true).rank(&batch).unwrap();
        assert_eq!(ranked.indices(), vec![1]);
        assert_eq!(ranked.excluded.len(), 1);
    }

    #[test]
    fn test_non_finite_score_is_excluded() {
        let batch = vec![cand(0.0, 1.0), cand(2.0, 1.0)];
        let f = formula("1 / Score");
        let ranked = Ranker::new(&f).rank(&batch).unwrap();
        assert_eq!(ranked.indices(), vec![1]);
        assert!(matches!(
            ranked.excluded[0].reason,
            ExclusionReason::NonFiniteScore { .. }
        ));
    }

    #[test]
    fn test_empty_batch_is_empty_result() {
        let f = formula("Score");
        let ranked = Ranker::new(&f).with_normalization(true).rank(&[]).unwrap();
        assert!(ranked.is_empty());
        assert!(ranked.best().is_none());
    }

    #[test]
    fn test_non_numeric_result_is_error() {
        let batch = vec![cand(1.0, 1.0)];
        let f = formula("Score > 0");
        let err = Ranker::new(&f).rank(&batch).unwrap_err();
        assert_eq!(
            err,
            RankError::Evaluation {
                index: 0,
                source: EvaluationError::NonNumericResult {
                    found: ValueKind::Boolean
                }
            }
        );
    }

    #[test]
    fn test_normalized_scores_in_unit_range() {
        let batch = vec![cand(10.0, 7.0), cand(30.0, 7.0), cand(20.0, 7.0)];
        let f = formula("Score + Secondary");
        let ranked = Ranker::new(&f).with_normalization(true).rank(&batch).unwrap();
        assert_eq!(ranked.indices(), vec![1, 2, 0]);
        // Secondary is degenerate and contributes 1.0 to every score.
        assert_eq!(ranked.scores(), vec![2.0, 1.5, 1.0]);
        assert_eq!(ranked.warnings.len(), 1);
    }

    #[test]
    fn test_scores_within_tolerance_tie() {
        let batch = vec![cand(5.0, 1.0), cand(5.0 + 1e-9, 0.0), cand(5.0 - 1e-9, 2.0)];
        let f = formula("Score");
        let ranked = Ranker::new(&f)
            .with_feature_tie_breaker("Secondary")
            .unwrap()
            .rank(&batch)
            .unwrap();
        assert_eq!(ranked.indices(), vec![2, 0, 1]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let batch = vec![cand(1.0, 1.0), cand(1.0, 1.0), cand(1.0, 1.0)];
        let f = formula("Score");
        let ranked = Ranker::new(&f).rank(&batch).unwrap();
        assert_eq!(ranked.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_tie_breakers_apply_left_to_right() {
        let batch = vec![cand(1.0, 1.0), cand(1.0, 2.0), cand(1.0, 3.0)];
        let f = formula("Score");
        let ranked = Ranker::new(&f)
            .with_tie_breaker("wide", |c: &Cand| if c.secondary >= 2.0 { 1.0 } else { 0.0 })
            .with_tie_breaker("narrowest", |c: &Cand| -c.secondary)
            .rank(&batch)
            .unwrap();
        assert_eq!(ranked.indices(), vec![1, 2, 0]);
        assert_eq!(
            Ranker::new(&f)
                .with_tie_breaker("wide", |_: &Cand| 0.0)
                .tie_breaker_names(),
            vec!["wide"]
        );
    }

    #[test]
    fn test_feature_tie_breaker_errors() {
        let f = formula("Score");
        assert!(matches!(
            Ranker::new(&f).with_feature_tie_breaker("Missing"),
            Err(CompileError::UnknownTieBreaker { .. })
        ));
        let batch = vec![cand(1.0, 1.0)];
        let err = Ranker::new(&f)
            .with_feature_tie_breaker("Label")
            .unwrap()
            .rank(&batch)
            .unwrap_err();
        assert!(matches!(err, RankError::NonNumericKey { index: 0, .. }));
    }

    #[test]
    fn test_rank_subset_uses_original_indices() {
        let batch = vec![cand(1.0, 0.0), cand(9.0, 0.0), cand(5.0, 0.0), cand(7.0, 0.0)];
        let f = formula("Score");
        let ranked = Ranker::new(&f).rank_subset(&batch, &[0, 2, 3]).unwrap();
        assert_eq!(ranked.indices(), vec![3, 2, 0]);
        assert!(matches!(
            Ranker::new(&f).rank_subset(&batch, &[4]),
            Err(RankError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert!(matches!(
            Ranker::new(&f).rank_subset(&batch, &[2, 0, 2]),
            Err(RankError::DuplicateIndex { index: 2 })
        ));
    }

    #[test]
    fn test_nan_secondary_key_ranks_last() {
        let batch = vec![cand(20.0, 1.0), cand(20.0, 3.0), cand(20.0, 6.0)];
        let f = formula("Score");
        let ranked = Ranker::new(&f)
            .with_tie_breaker("root", |c: &Cand| (c.secondary - 2.0).sqrt())
            .rank(&batch)
            .unwrap();
        assert_eq!(ranked.indices(), vec![2, 1, 0]);

        assert_eq!(key_order(Tolerance::default(), f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(key_order(Tolerance::default(), f64::NAN, -1e300), Ordering::Greater);
        assert_eq!(key_order(Tolerance::default(), 0.0, f64::NAN), Ordering::Less);
    }

    #[test]
    fn test_normalizer_errors_surface() {
        let features = FeatureSet::new().with_feature("Mixed", |c: &Cand| {
            if c.score > 0.0 {
                Value::Number(c.score)
            } else {
                Value::from("none")
            }
        });
        let f = CompiledFormula::compile(features, "1").unwrap();
        let batch = vec![cand(1.0, 0.0), cand(-1.0, 0.0)];
        let err = Ranker::new(&f).with_normalization(true).rank(&batch).unwrap_err();
        assert!(matches!(
            err,
            RankError::Normalize(NormalizeError::MixedKinds { .. })
        ));
    }

    #[test]
    fn test_one_shot_rank() {
        let batch = vec![cand(10.0, 1.0), cand(20.0, 5.0), cand(20.0, 2.0)];
        let ranked = rank(
            &batch,
            features(),
            "Score",
            vec![SecondaryKey::new("secondary", |c: &Cand| c.secondary)],
            false,
        )
        .unwrap();
        assert_eq!(ranked.indices(), vec![1, 2, 0]);

        let err = rank(&batch, features(), "Score +", Vec::new(), false).unwrap_err();
        assert!(matches!(err, RankError::Compile(CompileError::Syntax { .. })));
    }
}
