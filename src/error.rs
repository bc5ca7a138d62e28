//! Error types for BeatChain

use thiserror::Error;

/// Why a transaction was refused admission to the pending pool.
///
/// Checked in declaration order, so a transaction with both an empty sender
/// and a zero amount reports `InvalidSender`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum RejectReason {
    #[error("sender must not be empty")]
    InvalidSender,
    #[error("recipient must not be empty")]
    InvalidRecipient,
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("No pending transactions to seal")]
    EmptyPending,
    #[error("Transaction rejected: {0}")]
    Rejected(#[from] RejectReason),
    #[error("Sealing cancelled")]
    Cancelled,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Block {0} not found")]
    UnknownBlock(u64),
    #[error("Transaction {index} not found in block {block}")]
    UnknownTransaction { block: u64, index: usize },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Parse(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
