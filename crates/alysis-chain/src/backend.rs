//! The interface the node and RPC layers require from a chain.

use alysis_crypto::keccak256;
use alysis_primitives::{Address, H256, U256};
use alysis_schema::{
    BlockInfo, BlockRef, EstimateGasParams, EthCallParams, LogEntry, TransactionInfo,
    TransactionReceipt,
};
use bytes::Bytes;

use crate::error::ChainError;

/// Chain operations the RPC surface is built from.
///
/// [`LocalChain`](crate::LocalChain) is the stock implementation. Test suites
/// may substitute their own backend to script histories the built-in
/// execution model does not produce, such as blocks with logs.
pub trait ChainBackend {
    /// EIP-155 chain id.
    fn chain_id(&self) -> u64;

    /// Number of the latest mined block.
    fn latest_block_number(&self) -> u64;

    /// Look up a block by reference. The pending block is only reachable
    /// through the `pending` label.
    fn block_by_number(
        &self,
        block: BlockRef,
        with_transactions: bool,
    ) -> Result<BlockInfo, ChainError>;

    /// Look up a mined block by hash. Never resolves the pending block.
    fn block_by_hash(&self, hash: &H256, with_transactions: bool)
        -> Result<BlockInfo, ChainError>;

    /// Number of the mined block with the given hash.
    fn block_number_by_hash(&self, hash: &H256) -> Result<u64, ChainError>;

    /// Look up a transaction, searching the pending block first, then mined
    /// blocks newest-first.
    fn transaction_by_hash(&self, hash: &H256) -> Result<TransactionInfo, ChainError>;

    /// Receipt of a mined transaction. A transaction still in the pending
    /// block has no receipt yet.
    fn transaction_receipt(&self, hash: &H256) -> Result<TransactionReceipt, ChainError>;

    /// All logs of one mined block in (transaction, log) order.
    fn logs_in_block(&self, block_number: u64) -> Result<Vec<LogEntry>, ChainError>;

    /// Account balance at a block.
    fn balance(&self, address: &Address, block: BlockRef) -> Result<U256, ChainError>;

    /// Account nonce at a block.
    fn transaction_count(&self, address: &Address, block: BlockRef) -> Result<u64, ChainError>;

    /// Account code at a block.
    fn code(&self, address: &Address, block: BlockRef) -> Result<Bytes, ChainError>;

    /// Storage slot at a block, as a full 32-byte word.
    fn storage(&self, address: &Address, slot: U256, block: BlockRef)
        -> Result<Bytes, ChainError>;

    /// Hash of a mined block. The pending block has no hash.
    fn block_hash(&self, number: u64) -> Result<H256, ChainError>;

    /// Base fee of the pending block.
    fn base_fee(&self) -> U256;

    /// Hashes of the transactions waiting in the pending block, in
    /// submission order.
    fn pending_transaction_hashes(&self) -> Vec<H256>;

    /// Validate a raw transaction and add it to the pending block.
    /// Does not mine.
    fn submit_transaction(&mut self, raw: &[u8]) -> Result<H256, ChainError>;

    /// Seal the pending block and open the next one. An explicit timestamp
    /// must not be below the pending block's.
    fn mine_block(&mut self, timestamp: Option<u64>) -> Result<H256, ChainError>;

    /// Execute a read-only call against the state at a block.
    fn call(&self, params: &EthCallParams, block: BlockRef) -> Result<Bytes, ChainError>;

    /// Estimate the gas a transaction would use.
    fn estimate_gas(&self, params: &EstimateGasParams, block: BlockRef)
        -> Result<u64, ChainError>;

    /// Keccak-256 digest, exposed for `web3_sha3`.
    fn keccak256(&self, data: &[u8]) -> H256 {
        keccak256(data)
    }
}
