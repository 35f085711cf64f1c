use crate::value::ValueKind;

/// A formula that cannot be built. Fatal to that formula instance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("formula is empty")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number literal '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("syntax error at offset {offset}: expected {expected}, found {found}")]
    Syntax {
        offset: usize,
        expected: String,
        found: String,
    },

    #[error("unresolved identifier '{name}' at offset {offset}")]
    UnresolvedIdentifier { name: String, offset: usize },

    #[error("unknown function '{name}' at offset {offset}")]
    UnknownFunction { name: String, offset: usize },

    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("formula nests deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { offset: usize, limit: usize },

    #[error("unknown tie-break feature '{name}'")]
    UnknownTieBreaker { name: String },
}

/// A formula evaluated to the wrong kind of value for one candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("'{op}' expects {expected}, got {found}")]
    TypeMismatch {
        op: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("formula produced a {found}, expected a number")]
    NonNumericResult { found: ValueKind },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("cannot normalize an empty batch")]
    EmptyBatch,

    #[error("feature '{feature}' is numeric for the first candidate but {found} for candidate {position}")]
    MixedKinds {
        feature: String,
        position: usize,
        found: ValueKind,
    },

    #[error("feature '{feature}' is not finite ({value}) for candidate {position}")]
    NonFinite {
        feature: String,
        position: usize,
        value: f64,
    },
}

/// Failure of a whole ranking call. No partial ranking is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("candidate {index}: {source}")]
    Evaluation {
        index: usize,
        #[source]
        source: EvaluationError,
    },

    #[error("tie-break key '{name}' is a {found} for candidate {index}, expected a number")]
    NonNumericKey {
        name: String,
        index: usize,
        found: ValueKind,
    },

    #[error("candidate index {index} out of range for a batch of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("candidate index {index} listed more than once")]
    DuplicateIndex { index: usize },
}
