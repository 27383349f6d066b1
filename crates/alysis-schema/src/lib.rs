//! # alysis-schema
//!
//! RPC schema records for the Alysis testerchain.
//!
//! The catalog of typed records that cross the JSON boundary:
//! request parameter records, response views and the filter criteria
//! types. The wire uses `blockHash`, the in-memory model uses
//! `block_hash`; the projection is applied when (un)structuring.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod block;
mod block_ref;
mod call;
mod filter;
mod log;
mod receipt;
mod transaction;

pub use block::{BlockInfo, BlockNonce, BlockTransactions};
pub use block_ref::BlockRef;
pub use call::{EstimateGasParams, EthCallParams};
pub use filter::{
    AddressFilter, FilterChanges, FilterParams, FilterParamsByBlockHash, GetLogsFilter, Topic,
    Topics,
};
pub use log::{LogEntry, LogsBloom};
pub use receipt::TransactionReceipt;
pub use transaction::TransactionInfo;
