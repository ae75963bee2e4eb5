use thiserror::Error;

/// Reason a candidate block does not extend the current tip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainLinkageError {
    #[error("predecessor commitment does not match the tip")]
    PredecessorMismatch,
    #[error("stored commitment does not match the block contents")]
    CommitmentMismatch,
    #[error("invalid block position: expected {expected}, got {got}")]
    PositionGap { expected: u64, got: u64 },
    #[error("tip position {0} has no successor")]
    PositionOverflow(u64),
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain has no blocks")]
    EmptyChain,
    #[error("block at position {0} has no successor position")]
    PositionOverflow(u64),
    #[error("candidate rejected: {0}")]
    Linkage(#[from] ChainLinkageError),
    #[error("genesis block is invalid")]
    InvalidGenesis,
    #[error("block {position} is invalid: {source}")]
    InvalidBlock {
        position: u64,
        source: ChainLinkageError,
    },
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChainError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
