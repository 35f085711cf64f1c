use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// A named per-candidate feature function.
pub type Extractor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

struct Feature<T> {
    name: String,
    extractor: Extractor<T>,
}

impl<T> Clone for Feature<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            extractor: Arc::clone(&self.extractor),
        }
    }
}

/// Ordered, uniquely named set of extractors.
///
/// Formula identifiers resolve to slots in this set at compile time, so
/// the order is part of a compiled formula's identity.
pub struct FeatureSet<T> {
    features: Vec<Feature<T>>,
}

impl<T> FeatureSet<T> {
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Add an extractor. A feature with the same name is replaced in place.
    pub fn with_feature<F>(mut self, name: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.insert(name, extractor);
        self
    }

    /// Convenience for numeric extractors.
    pub fn with_number<F>(self, name: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.with_feature(name, move |c| Value::Number(extractor(c)))
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, extractor: F)
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        let extractor: Extractor<T> = Arc::new(extractor);
        match self.index_of(&name) {
            Some(slot) => self.features[slot].extractor = extractor,
            None => self.features.push(Feature { name, extractor }),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    pub fn name(&self, slot: usize) -> Option<&str> {
        self.features.get(slot).map(|f| f.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// Evaluate the extractor in `slot`.
    ///
    /// # Panics
    /// Panics if `slot` is out of range.
    pub fn extract(&self, slot: usize, candidate: &T) -> Value {
        (self.features[slot].extractor)(candidate)
    }

    /// Evaluate a feature by name.
    pub fn extract_named(&self, name: &str, candidate: &T) -> Option<Value> {
        self.index_of(name).map(|slot| self.extract(slot, candidate))
    }
}

impl<T> Default for FeatureSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FeatureSet<T> {
    fn clone(&self) -> Self {
        Self {
            features: self.features.clone(),
        }
    }
}

impl<T> fmt::Debug for FeatureSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Anything that can answer feature values by slot: a raw [`FeatureSet`]
/// or a batch-normalized view of one.
pub trait FeatureSource<T> {
    fn feature_count(&self) -> usize;

    /// Value of the feature in `slot` for `candidate`.
    ///
    /// # Panics
    /// Panics if `slot >= feature_count()`.
    fn value(&self, slot: usize, candidate: &T) -> Value;
}

impl<T> FeatureSource<T> for FeatureSet<T> {
    fn feature_count(&self) -> usize {
        self.len()
    }

    fn value(&self, slot: usize, candidate: &T) -> Value {
        self.extract(slot, candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Part {
        width: f64,
        label: &'static str,
    }

    fn sample() -> FeatureSet<Part> {
        FeatureSet::new()
            .with_number("Width", |p: &Part| p.width)
            .with_feature("Label", |p: &Part| Value::from(p.label))
    }

    #[test]
    fn test_order_is_insertion_order() {
        let set = sample();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["Width", "Label"]);
        assert_eq!(set.index_of("Label"), Some(1));
        assert_eq!(set.index_of("Height"), None);
    }

    #[test]
    fn test_replace_keeps_slot() {
        let set = sample().with_number("Width", |p: &Part| p.width * 2.0);
        assert_eq!(set.len(), 2);
        assert_eq!(set.index_of("Width"), Some(0));
        let part = Part { width: 3.0, label: "a" };
        assert_eq!(set.extract(0, &part), Value::Number(6.0));
    }

    #[test]
    fn test_extract_named() {
        let set = sample();
        let part = Part { width: 1.0, label: "jaw" };
        assert_eq!(set.extract_named("Label", &part), Some(Value::from("jaw")));
        assert_eq!(set.extract_named("Nope", &part), None);
    }
}
