//! The typed node surface.
//!
//! [`Node`] owns a chain backend and a filter registry and exposes one
//! method per RPC operation, with domain types instead of JSON at the
//! boundary. By default every accepted transaction immediately mines a
//! block; tests that need several transactions in one block turn
//! auto-mining off and mine explicitly.

use alysis_chain::{ChainBackend, ChainConfig, ChainError, LocalChain};
use alysis_crypto::PrivateKey;
use alysis_primitives::{Address, H256, U256};
use alysis_schema::{
    BlockInfo, BlockRef, EstimateGasParams, EthCallParams, FilterChanges, FilterParams,
    GetLogsFilter, LogEntry, TransactionInfo, TransactionReceipt,
};
use bytes::Bytes;

use crate::filters::{query_logs, FilterRegistry};

/// What `web3_clientVersion` reports.
pub const CLIENT_VERSION: &str = "Alysis testerchain";

/// Tip `eth_gasPrice` suggests on top of the pending base fee, 1 gwei.
const GAS_PRICE_TIP: u64 = 1_000_000_000;

/// A single test chain instance: backend, filters and the auto-mining
/// switch.
#[derive(Debug, Clone)]
pub struct Node<B: ChainBackend = LocalChain> {
    backend: B,
    filters: FilterRegistry,
    auto_mine: bool,
}

impl Node<LocalChain> {
    /// Create a node over a fresh in-memory chain.
    pub fn new(config: ChainConfig) -> Self {
        Self::with_backend(LocalChain::new(config))
    }

    /// Private key of the funded root account.
    pub fn root_private_key(&self) -> &PrivateKey {
        self.backend.root_private_key()
    }

    /// Address of the funded root account.
    pub fn root_address(&self) -> Address {
        self.backend.root_address()
    }
}

impl Default for Node<LocalChain> {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl<B: ChainBackend> Node<B> {
    /// Create a node over an existing backend.
    pub fn with_backend(backend: B) -> Self {
        Node {
            backend,
            filters: FilterRegistry::new(),
            auto_mine: true,
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The underlying backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Toggle mining a block on every accepted transaction. On by
    /// default.
    pub fn set_auto_mine(&mut self, enabled: bool) {
        self.auto_mine = enabled;
    }

    /// The client version string.
    pub fn client_version(&self) -> &'static str {
        CLIENT_VERSION
    }

    /// The chain id.
    pub fn chain_id(&self) -> u64 {
        self.backend.chain_id()
    }

    /// Number of the latest mined block.
    pub fn block_number(&self) -> u64 {
        self.backend.latest_block_number()
    }

    /// Locally managed accounts. There are none; callers sign their own
    /// transactions.
    pub fn accounts(&self) -> Vec<Address> {
        Vec::new()
    }

    /// Suggested gas price: the pending base fee plus a fixed tip.
    pub fn gas_price(&self) -> U256 {
        self.backend.base_fee() + U256::from(GAS_PRICE_TIP)
    }

    /// Balance of an account at a block.
    pub fn balance(&self, address: &Address, block: BlockRef) -> Result<U256, ChainError> {
        self.backend.balance(address, block)
    }

    /// Nonce of an account at a block.
    pub fn transaction_count(
        &self,
        address: &Address,
        block: BlockRef,
    ) -> Result<u64, ChainError> {
        self.backend.transaction_count(address, block)
    }

    /// Code of an account at a block.
    pub fn code(&self, address: &Address, block: BlockRef) -> Result<Bytes, ChainError> {
        self.backend.code(address, block)
    }

    /// A storage word of an account at a block.
    pub fn storage_at(
        &self,
        address: &Address,
        slot: U256,
        block: BlockRef,
    ) -> Result<Bytes, ChainError> {
        self.backend.storage(address, slot, block)
    }

    /// Block view by number or label.
    pub fn block_by_number(
        &self,
        block: BlockRef,
        with_transactions: bool,
    ) -> Result<BlockInfo, ChainError> {
        self.backend.block_by_number(block, with_transactions)
    }

    /// Block view by hash. Only mined blocks have hashes.
    pub fn block_by_hash(
        &self,
        hash: &H256,
        with_transactions: bool,
    ) -> Result<BlockInfo, ChainError> {
        self.backend.block_by_hash(hash, with_transactions)
    }

    /// Transaction view by hash, pending transactions included.
    pub fn transaction_by_hash(&self, hash: &H256) -> Result<TransactionInfo, ChainError> {
        self.backend.transaction_by_hash(hash)
    }

    /// Receipt of a mined transaction.
    pub fn transaction_receipt(&self, hash: &H256) -> Result<TransactionReceipt, ChainError> {
        self.backend.transaction_receipt(hash)
    }

    /// Accept a raw signed transaction and, when auto-mining, seal a
    /// block with it.
    pub fn send_raw_transaction(&mut self, raw: &[u8]) -> Result<H256, ChainError> {
        let hash = self.backend.submit_transaction(raw)?;
        if self.auto_mine {
            self.backend.mine_block(None)?;
        }
        Ok(hash)
    }

    /// Seal the pending block, optionally at an explicit timestamp.
    pub fn mine_block(&mut self, timestamp: Option<u64>) -> Result<H256, ChainError> {
        self.backend.mine_block(timestamp)
    }

    /// Execute a read-only call.
    pub fn call(&self, params: &EthCallParams, block: BlockRef) -> Result<Bytes, ChainError> {
        self.backend.call(params, block)
    }

    /// Estimate the gas a transaction would use.
    pub fn estimate_gas(
        &self,
        params: &EstimateGasParams,
        block: BlockRef,
    ) -> Result<u64, ChainError> {
        self.backend.estimate_gas(params, block)
    }

    /// Keccak-256 digest of arbitrary bytes.
    pub fn keccak(&self, data: &[u8]) -> H256 {
        self.backend.keccak256(data)
    }

    /// Install a filter delivering newly mined block hashes.
    pub fn new_block_filter(&mut self) -> u64 {
        self.filters.install_block_filter(&self.backend)
    }

    /// Install a filter delivering newly submitted pending transaction
    /// hashes.
    pub fn new_pending_transaction_filter(&mut self) -> u64 {
        self.filters.install_pending_transaction_filter()
    }

    /// Install a log filter.
    pub fn new_log_filter(&mut self, params: FilterParams) -> u64 {
        self.filters.install_log_filter(params, &self.backend)
    }

    /// Remove a filter. Returns whether it existed.
    pub fn uninstall_filter(&mut self, id: u64) -> bool {
        self.filters.uninstall(id)
    }

    /// Poll a filter for changes since the previous poll.
    pub fn filter_changes(&mut self, id: u64) -> Result<FilterChanges, ChainError> {
        self.filters.poll(id, &self.backend)
    }

    /// Full matching window of a log filter.
    pub fn filter_logs(&self, id: u64) -> Result<Vec<LogEntry>, ChainError> {
        self.filters.filter_logs(id, &self.backend)
    }

    /// One-shot log query.
    pub fn logs(&self, filter: &GetLogsFilter) -> Result<Vec<LogEntry>, ChainError> {
        query_logs(filter, &self.backend)
    }
}
