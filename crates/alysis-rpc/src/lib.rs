//! # alysis-rpc
//!
//! JSON-RPC 2.0 dispatch for the Alysis testerchain.
//!
//! This crate puts an Ethereum-compatible RPC surface over a node.
//! There is no transport: requests go in as JSON strings or decoded
//! envelopes and come back the same way, synchronously, which is what
//! an in-process test chain wants.
//!
//! ## Usage
//!
//! ```
//! use alysis_chain::ChainConfig;
//! use alysis_rpc::RpcNode;
//!
//! let mut node = RpcNode::new(ChainConfig::default());
//! let response = node.handle_raw(
//!     r#"{"jsonrpc":"2.0","id":1,"method":"eth_chainId","params":[]}"#,
//! );
//! assert!(response.contains("0x539"));
//! ```
//!
//! ## Supported Methods
//!
//! ### eth_* Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | `eth_accounts` | Returns the locally managed accounts (none) |
//! | `eth_blockNumber` | Returns the latest mined block number |
//! | `eth_call` | Executes a call without creating a transaction |
//! | `eth_chainId` | Returns the chain id |
//! | `eth_estimateGas` | Estimates gas for a transaction |
//! | `eth_gasPrice` | Returns a suggested gas price |
//! | `eth_getBalance` | Returns the balance of an account |
//! | `eth_getBlockByHash` | Returns a block by hash |
//! | `eth_getBlockByNumber` | Returns a block by number |
//! | `eth_getCode` | Returns the code at an address |
//! | `eth_getFilterChanges` | Polls a filter for new deliveries |
//! | `eth_getFilterLogs` | Returns all logs matching a log filter |
//! | `eth_getLogs` | Returns logs matching a one-shot query |
//! | `eth_getStorageAt` | Returns a storage word |
//! | `eth_getTransactionByHash` | Returns a transaction by hash |
//! | `eth_getTransactionCount` | Returns the nonce of an account |
//! | `eth_getTransactionReceipt` | Returns a transaction receipt |
//! | `eth_newBlockFilter` | Installs a new-block filter |
//! | `eth_newFilter` | Installs a log filter |
//! | `eth_newPendingTransactionFilter` | Installs a pending-transaction filter |
//! | `eth_sendRawTransaction` | Submits a signed raw transaction |
//! | `eth_uninstallFilter` | Removes a filter |
//!
//! ### net_* Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | `net_version` | Returns the network id |
//! | `net_listening` | Returns true |
//! | `net_peerCount` | Returns zero |
//!
//! ### web3_* Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | `web3_clientVersion` | Returns the client version |
//! | `web3_sha3` | Returns the Keccak-256 hash of data |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod handler;
pub mod methods;
pub mod types;

// Re-export main types
pub use error::{error_code, JsonRpcError};
pub use handler::{MethodFn, MethodRegistry, RpcNode};
pub use types::{JsonRpcId, JsonRpcRequest, JsonRpcResponse};
