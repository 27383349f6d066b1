//! # alysis-e2e
//!
//! End-to-end scenarios for the Alysis testerchain.
//!
//! Tests in this crate drive a full node through its JSON-RPC surface the
//! way a client library would: raw signed transactions in, hex-encoded
//! JSON out. The harness keeps the bookkeeping (keys, nonces, funding)
//! out of the scenario bodies, and [`ScriptedChain`] supplies histories
//! the built-in execution model cannot produce, such as blocks with logs.
//!
//! ## Usage
//!
//! ```ignore
//! cargo test -p alysis-e2e
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod harness;
mod scenarios;
mod scripted;

pub use builder::{EtherDenom, TxBuilder};
pub use harness::{
    hash_of, quantity, wei_quantity, ReceiptAssertions, TestAccount, TestClient, FUNDED_BALANCE,
    TEST_TIMESTAMP,
};
pub use scripted::{ScriptedChain, ScriptedLog};

use alysis_rpc::JsonRpcError;

/// Scenario result
pub type E2EResult<T> = Result<T, E2EError>;

/// Harness errors
#[derive(Debug, thiserror::Error)]
pub enum E2EError {
    /// Setup failed
    #[error("setup failed: {0}")]
    Setup(String),

    /// Transaction could not be built or signed
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// The node answered with an error object
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Human-readable message
        message: String,
    },

    /// A response did not have the shape the scenario expected
    #[error("unexpected response: {0}")]
    Response(String),
}

impl From<JsonRpcError> for E2EError {
    fn from(err: JsonRpcError) -> Self {
        E2EError::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

impl E2EError {
    /// JSON-RPC error code, if the node reported one.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            E2EError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}
