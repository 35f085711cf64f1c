//! Scoring formulas compiled once against a [`FeatureSet`].

pub mod ast;
mod eval;
mod lexer;
mod parser;

use std::fmt;

use setup_types::{global_tolerance, Tolerance};

use crate::error::{CompileError, EvaluationError};
use crate::feature_set::{FeatureSet, FeatureSource};
use crate::value::Value;

use ast::Expr;
use eval::Evaluator;
use parser::Parser;

pub use parser::MAX_NESTING;

/// An immutable pairing of a feature set and a validated expression.
///
/// Every identifier in the text is bound to a feature slot when the formula
/// is compiled, so evaluation can only fail on value kinds.
pub struct CompiledFormula<T> {
    features: FeatureSet<T>,
    source: String,
    expr: Expr,
    tolerance: Tolerance,
}

impl<T> CompiledFormula<T> {
    /// Parse `source` and resolve its identifiers against `features`.
    pub fn compile(features: FeatureSet<T>, source: &str) -> Result<Self, CompileError> {
        let tokens = lexer::tokenize(source)?;
        let resolve = |name: &str| features.index_of(name);
        let expr = Parser::new(tokens, &resolve).parse()?;
        Ok(Self {
            features,
            source: source.to_string(),
            expr,
            tolerance: global_tolerance(),
        })
    }

    /// Override the tolerance used by `==`, `!=` and the ordering operators.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn features(&self) -> &FeatureSet<T> {
        &self.features
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Names of the features the formula reads, in first-use order.
    pub fn referenced_features(&self) -> Vec<&str> {
        self.expr
            .feature_slots()
            .into_iter()
            .filter_map(|slot| self.features.name(slot))
            .collect()
    }

    /// Evaluate against raw feature values.
    pub fn evaluate(&self, candidate: &T) -> Result<Value, EvaluationError> {
        self.evaluate_with(&self.features, candidate)
    }

    /// Evaluate reading features from another source with the same slots,
    /// typically a [`crate::NormalizedFeatureSet`] built from `self.features()`.
    pub fn evaluate_with<S>(&self, source: &S, candidate: &T) -> Result<Value, EvaluationError>
    where
        S: FeatureSource<T> + ?Sized,
    {
        Evaluator::new(source, candidate, self.tolerance).eval(&self.expr)
    }

    /// Evaluate and require a numeric result.
    pub fn score(&self, candidate: &T) -> Result<f64, EvaluationError> {
        self.score_with(&self.features, candidate)
    }

    pub fn score_with<S>(&self, source: &S, candidate: &T) -> Result<f64, EvaluationError>
    where
        S: FeatureSource<T> + ?Sized,
    {
        let value = self.evaluate_with(source, candidate)?;
        value
            .as_number()
            .ok_or(EvaluationError::NonNumericResult { found: value.kind() })
    }
}

impl<T> Clone for CompiledFormula<T> {
    fn clone(&self) -> Self {
        Self {
            features: self.features.clone(),
            source: self.source.clone(),
            expr: self.expr.clone(),
            tolerance: self.tolerance,
        }
    }
}

impl<T> fmt::Debug for CompiledFormula<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFormula")
            .field("source", &self.source)
            .field("features", &self.features)
            .field("tolerance", &self.tolerance)
            .finish()
    }
}
