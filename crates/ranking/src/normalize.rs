use serde::Serialize;
use setup_types::Tolerance;
use tracing::debug;

use crate::error::NormalizeError;
use crate::feature_set::{FeatureSet, FeatureSource};
use crate::value::Value;

/// How one feature is rescaled within a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Non-numeric feature, copied unchanged.
    PassThrough,
    /// `(raw - min) / span`, with `span > epsilon`.
    Linear { min: f64, span: f64 },
    /// Every value within epsilon of every other: constant 1.0.
    Degenerate,
}

/// Non-fatal observation made while normalizing a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BatchWarning {
    /// All candidates share one value (within tolerance) for this feature.
    DegenerateFeature { feature: String, value: f64 },
}

/// Batch-scoped view of a [`FeatureSet`] with every numeric feature
/// rescaled to `[0, 1]` over that batch.
///
/// Built from scratch for each batch; never updated or reused.
pub struct NormalizedFeatureSet<'f, T> {
    base: &'f FeatureSet<T>,
    rules: Vec<Normalization>,
    warnings: Vec<BatchWarning>,
}

impl<'f, T> NormalizedFeatureSet<'f, T> {
    /// Compute per-feature min and span over `batch`.
    ///
    /// A feature is numeric when its value for the first candidate is a
    /// number; later candidates must then be numeric and finite too.
    pub fn build(
        base: &'f FeatureSet<T>,
        batch: &[&T],
        tolerance: Tolerance,
    ) -> Result<Self, NormalizeError> {
        let first = batch.first().ok_or(NormalizeError::EmptyBatch)?;
        let mut rules = Vec::with_capacity(base.len());
        let mut warnings = Vec::new();

        for slot in 0..base.len() {
            let name = base.name(slot).unwrap_or_default();
            if base.extract(slot, first).as_number().is_none() {
                rules.push(Normalization::PassThrough);
                continue;
            }

            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for (position, candidate) in batch.iter().enumerate() {
                let value = base.extract(slot, candidate);
                let n = value.as_number().ok_or_else(|| NormalizeError::MixedKinds {
                    feature: name.to_string(),
                    position,
                    found: value.kind(),
                })?;
                if !n.is_finite() {
                    return Err(NormalizeError::NonFinite {
                        feature: name.to_string(),
                        position,
                        value: n,
                    });
                }
                min = min.min(n);
                max = max.max(n);
            }

            let span = max - min;
            if span <= tolerance.epsilon {
                debug!(feature = name, value = min, "degenerate feature normalized to 1.0");
                warnings.push(BatchWarning::DegenerateFeature {
                    feature: name.to_string(),
                    value: min,
                });
                rules.push(Normalization::Degenerate);
            } else {
                rules.push(Normalization::Linear { min, span });
            }
        }

        Ok(Self {
            base,
            rules,
            warnings,
        })
    }

    /// Convenience for a whole slice.
    pub fn from_slice(
        base: &'f FeatureSet<T>,
        batch: &[T],
        tolerance: Tolerance,
    ) -> Result<Self, NormalizeError> {
        let refs: Vec<&T> = batch.iter().collect();
        Self::build(base, &refs, tolerance)
    }

    /// Rule for `slot`, or `None` past the end of the feature set.
    pub fn rule(&self, slot: usize) -> Option<Normalization> {
        self.rules.get(slot).copied()
    }

    pub fn rule_named(&self, name: &str) -> Option<Normalization> {
        self.base.index_of(name).and_then(|slot| self.rule(slot))
    }

    pub fn warnings(&self) -> &[BatchWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<BatchWarning> {
        self.warnings
    }

    pub fn base(&self) -> &'f FeatureSet<T> {
        self.base
    }
}

impl<T> FeatureSource<T> for NormalizedFeatureSet<'_, T> {
    fn feature_count(&self) -> usize {
        self.rules.len()
    }

    fn value(&self, slot: usize, candidate: &T) -> Value {
        match self.rules[slot] {
            Normalization::PassThrough => self.base.extract(slot, candidate),
            Normalization::Degenerate => Value::Number(1.0),
            Normalization::Linear { min, span } => match self.base.extract(slot, candidate) {
                Value::Number(raw) => Value::Number((raw - min) / span),
                other => other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Row {
        a: f64,
        b: f64,
        tag: &'static str,
    }

    fn set() -> FeatureSet<Row> {
        FeatureSet::new()
            .with_number("A", |r: &Row| r.a)
            .with_number("B", |r: &Row| r.b)
            .with_feature("Tag", |r: &Row| Value::from(r.tag))
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { a: 2.0, b: 5.0, tag: "x" },
            Row { a: 6.0, b: 5.0, tag: "y" },
            Row { a: 4.0, b: 5.0, tag: "z" },
        ]
    }

    #[test]
    fn test_linear_rescaling() {
        let set = set();
        let rows = rows();
        let norm = NormalizedFeatureSet::from_slice(&set, &rows, Tolerance::default()).unwrap();
        assert_eq!(norm.rule(0), Some(Normalization::Linear { min: 2.0, span: 4.0 }));
        let values: Vec<f64> = rows
            .iter()
            .map(|r| norm.value(0, r).as_number().unwrap())
            .collect();
        assert_abs_diff_eq!(values[0], 0.0);
        assert_abs_diff_eq!(values[1], 1.0);
        assert_abs_diff_eq!(values[2], 0.5);
    }

    #[test]
    fn test_degenerate_feature_is_one() {
        let set = set();
        let rows = rows();
        let norm = NormalizedFeatureSet::from_slice(&set, &rows, Tolerance::default()).unwrap();
        assert_eq!(norm.rule_named("B"), Some(Normalization::Degenerate));
        for r in &rows {
            assert_eq!(norm.value(1, r), Value::Number(1.0));
        }
        assert_eq!(
            norm.warnings(),
            &[BatchWarning::DegenerateFeature {
                feature: "B".into(),
                value: 5.0
            }]
        );
    }

    #[test]
    fn test_span_within_tolerance_is_degenerate() {
        let set = FeatureSet::new().with_number("A", |r: &f64| *r);
        let batch = [1.0, 1.0 + 1e-8, 1.0 - 1e-8];
        let norm = NormalizedFeatureSet::from_slice(&set, &batch, Tolerance::new(1e-6)).unwrap();
        assert_eq!(norm.rule(0), Some(Normalization::Degenerate));
    }

    #[test]
    fn test_text_passes_through() {
        let set = set();
        let rows = rows();
        let norm = NormalizedFeatureSet::from_slice(&set, &rows, Tolerance::default()).unwrap();
        assert_eq!(norm.rule(2), Some(Normalization::PassThrough));
        assert_eq!(norm.rule(3), None);
        assert_eq!(norm.value(2, &rows[1]), Value::from("y"));
    }

    #[test]
    fn test_errors() {
        let set = set();
        assert_eq!(
            NormalizedFeatureSet::<Row>::build(&set, &[], Tolerance::default()).err(),
            Some(NormalizeError::EmptyBatch)
        );

        let mixed = FeatureSet::new().with_feature("M", |r: &f64| {
            if *r > 0.0 {
                Value::Number(*r)
            } else {
                Value::Boolean(false)
            }
        });
        assert!(matches!(
            NormalizedFeatureSet::from_slice(&mixed, &[1.0, -1.0], Tolerance::default()),
            Err(NormalizeError::MixedKinds { position: 1, .. })
        ));

        let plain = FeatureSet::new().with_number("P", |r: &f64| *r);
        assert!(matches!(
            NormalizedFeatureSet::from_slice(&plain, &[1.0, f64::NAN], Tolerance::default()),
            Err(NormalizeError::NonFinite { position: 1, .. })
        ));
    }
}
