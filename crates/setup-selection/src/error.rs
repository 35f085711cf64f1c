use ranking::{CompileError, RankError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("invalid selection config: {reason}")]
    Config { reason: String },

    #[error("formula rejected: {0}")]
    Compile(#[from] CompileError),

    #[error("ranking failed: {0}")]
    Rank(#[from] RankError),
}
