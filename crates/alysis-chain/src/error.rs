//! Error taxonomy shared by the chain backend and the layers above it.

use bytes::Bytes;
use thiserror::Error;

/// Failures a chain backend operation can surface.
///
/// Every variant carries the user-visible message verbatim; the RPC layer maps
/// variants to JSON-RPC error codes without rewording them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// Invalid values of some of the arguments.
    #[error("{0}")]
    Validation(String),

    /// Requested block cannot be found.
    #[error("{0}")]
    BlockNotFound(String),

    /// Requested transaction cannot be found.
    #[error("{0}")]
    TransactionNotFound(String),

    /// Requested filter cannot be found.
    #[error("{0}")]
    FilterNotFound(String),

    /// Transaction could not be executed.
    #[error("{0}")]
    TransactionFailed(String),

    /// Transaction was partially executed, but had to be reverted.
    /// Carries the raw revert payload returned by the callee.
    #[error("execution reverted: 0x{}", hex::encode(.0))]
    TransactionReverted(Bytes),
}

impl ChainError {
    /// Shorthand for a [`ChainError::Validation`] with a formatted message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
