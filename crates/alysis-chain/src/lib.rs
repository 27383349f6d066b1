//! # alysis-chain
//!
//! The in-memory chain behind the Alysis testerchain.
//!
//! This crate provides:
//! - [`LocalChain`](chain::LocalChain) - Deterministic chain with a funded
//!   root account and no EVM
//! - [`ChainBackend`](backend::ChainBackend) - The backend contract the
//!   node and RPC layers program against
//! - [`SignedTransaction`](transaction::SignedTransaction) - Raw
//!   transaction decoding and sender recovery

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod block;
pub mod chain;
pub mod config;
pub mod error;
pub mod state;
pub mod transaction;

// Re-export commonly used types
pub use backend::ChainBackend;
pub use block::{
    blank_root_hash, bloom_for_logs, empty_uncles_hash, BlockHeader, StoredBlock, StoredLog,
    StoredReceipt,
};
pub use chain::{LocalChain, INITIAL_BASE_FEE};
pub use config::ChainConfig;
pub use error::ChainError;
pub use state::{Account, AccountState};
pub use transaction::{
    derive_create_address, intrinsic_gas, AccessListItem, AccessListTx, DynamicFeeTx, LegacyTx,
    SignedTransaction, Transaction, TxSignature, TxType,
};
