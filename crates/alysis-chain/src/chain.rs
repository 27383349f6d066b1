//! The in-memory chain.
//!
//! The head block IS the pending block: it accumulates submitted
//! transactions until [`mine_block`](ChainBackend::mine_block) seals it and
//! opens the next one. `latest` therefore always resolves to head − 1.
//!
//! There is no EVM. A valid transaction transfers value, consumes exactly
//! its intrinsic gas, and credits the priority fee to the coinbase; a
//! creation installs its payload verbatim as the new account's code. That
//! is enough to exercise every RPC path deterministically.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use alysis_crypto::{private_key_from_bytes, public_key_to_address, PrivateKey};
use alysis_primitives::{Address, H256, U256};
use alysis_schema::{
    BlockInfo, BlockRef, EstimateGasParams, EthCallParams, LogEntry, LogsBloom, TransactionInfo,
    TransactionReceipt,
};
use bytes::Bytes;
use rlp::RlpStream;

use crate::backend::ChainBackend;
use crate::block::{
    blank_root_hash, empty_uncles_hash, BlockHeader, StoredBlock, StoredReceipt,
};
use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::state::AccountState;
use crate::transaction::{derive_create_address, intrinsic_gas, SignedTransaction};

/// Base fee of the genesis block, 1 gwei.
pub const INITIAL_BASE_FEE: u64 = 1_000_000_000;

const BASE_FEE_MAX_CHANGE_DENOMINATOR: u64 = 8;
const ELASTICITY_MULTIPLIER: u64 = 2;

/// An in-memory chain with no EVM and no persistence.
///
/// Cloning yields an independent chain with identical history, which is how
/// test suites fork a prepared state.
#[derive(Clone, Debug)]
pub struct LocalChain {
    config: ChainConfig,
    root_key: PrivateKey,
    root_address: Address,
    /// `blocks[n]` is block `n`; the last entry is always the pending block.
    blocks: Vec<StoredBlock>,
    /// `states[n]` is the account state after block `n`; the last entry is
    /// the live state the pending block mutates.
    states: Vec<AccountState>,
    /// Mined blocks by hash. The pending block is never listed.
    block_numbers: HashMap<H256, u64>,
}

impl LocalChain {
    /// Create a chain with a mined genesis block and an empty pending block.
    pub fn new(config: ChainConfig) -> Self {
        let mut key_bytes = [0u8; 32];
        key_bytes[31] = 1;
        let root_key =
            private_key_from_bytes(&key_bytes).expect("a scalar of one is a valid secp256k1 key");
        let root_address = public_key_to_address(root_key.verifying_key());

        let genesis_timestamp = config.genesis_timestamp.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0)
        });

        let mut genesis_state = AccountState::new();
        genesis_state.credit(root_address, config.root_balance_wei);

        let genesis = StoredBlock {
            header: BlockHeader {
                parent_hash: H256::ZERO,
                uncles_hash: empty_uncles_hash(),
                coinbase: Address::ZERO,
                state_root: genesis_state.state_root(),
                transactions_root: blank_root_hash(),
                receipts_root: blank_root_hash(),
                logs_bloom: LogsBloom::default(),
                difficulty: U256::zero(),
                number: 0,
                gas_limit: config.gas_limit,
                gas_used: 0,
                timestamp: genesis_timestamp,
                extra_data: Bytes::new(),
                mix_hash: H256::ZERO,
                nonce: alysis_schema::BlockNonce::ZERO,
                base_fee_per_gas: U256::from(INITIAL_BASE_FEE),
            },
            transactions: vec![],
            receipts: vec![],
        };
        let genesis_hash = genesis.hash();

        let mut chain = Self {
            config,
            root_key,
            root_address,
            blocks: vec![genesis],
            states: vec![genesis_state],
            block_numbers: HashMap::from([(genesis_hash, 0)]),
        };
        chain.open_pending_block();
        tracing::info!(
            "Chain {} created, genesis block {}",
            chain.config.chain_id,
            genesis_hash
        );
        chain
    }

    /// The construction parameters.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Private key of the funded root account (`0x00…01`).
    pub fn root_private_key(&self) -> &PrivateKey {
        &self.root_key
    }

    /// Address of the funded root account.
    pub fn root_address(&self) -> Address {
        self.root_address
    }

    fn pending_index(&self) -> usize {
        self.blocks.len() - 1
    }

    fn pending_number(&self) -> u64 {
        self.pending_index() as u64
    }

    fn pending_block(&self) -> &StoredBlock {
        &self.blocks[self.pending_index()]
    }

    fn live_state(&self) -> &AccountState {
        &self.states[self.states.len() - 1]
    }

    fn open_pending_block(&mut self) {
        let parent = &self.blocks[self.blocks.len() - 1];
        let parent_hash = parent.hash();
        let number = parent.header.number + 1;
        let header = BlockHeader {
            parent_hash,
            uncles_hash: empty_uncles_hash(),
            coinbase: Address::ZERO,
            state_root: self.live_state().state_root(),
            transactions_root: blank_root_hash(),
            receipts_root: blank_root_hash(),
            logs_bloom: LogsBloom::default(),
            difficulty: U256::zero(),
            number,
            gas_limit: parent.header.gas_limit,
            gas_used: 0,
            timestamp: parent.header.timestamp + 1,
            extra_data: Bytes::new(),
            mix_hash: derive_mix_hash(&parent_hash, number),
            nonce: alysis_schema::BlockNonce::ZERO,
            base_fee_per_gas: next_base_fee(&parent.header),
        };
        self.blocks.push(StoredBlock {
            header,
            transactions: vec![],
            receipts: vec![],
        });
        let live = self.live_state().clone();
        self.states.push(live);
    }

    fn resolve_block_number(&self, block: BlockRef) -> Result<u64, ChainError> {
        match block {
            BlockRef::Latest | BlockRef::Safe | BlockRef::Finalized => Ok(self.latest_block_number()),
            BlockRef::Earliest => Ok(0),
            BlockRef::Pending => Ok(self.pending_number()),
            BlockRef::Number(number) => {
                if number < self.pending_number() {
                    Ok(number)
                } else {
                    Err(ChainError::BlockNotFound(format!(
                        "No block found for block number: {number}"
                    )))
                }
            }
        }
    }

    fn state_at(&self, block: BlockRef) -> Result<&AccountState, ChainError> {
        let number = self.resolve_block_number(block)?;
        Ok(&self.states[number as usize])
    }

    fn validate_transaction(&self, signed: &SignedTransaction) -> Result<(), ChainError> {
        if let Some(chain_id) = signed.chain_id() {
            if chain_id != self.config.chain_id {
                return Err(ChainError::validation(format!(
                    "Invalid transaction: chain id mismatch: got {chain_id}, expected {}",
                    self.config.chain_id
                )));
            }
        }

        let expected_nonce = self.live_state().nonce(&signed.sender());
        if signed.nonce() != expected_nonce {
            return Err(ChainError::validation(format!(
                "Invalid transaction: nonce {} does not match the expected {expected_nonce}",
                signed.nonce()
            )));
        }

        let intrinsic = signed.intrinsic_gas();
        if signed.gas() < intrinsic {
            return Err(ChainError::validation(format!(
                "Invalid transaction: gas limit {} is below the intrinsic gas {intrinsic}",
                signed.gas()
            )));
        }

        let pending = self.pending_block();
        let remaining = pending.header.gas_limit - pending.header.gas_used;
        if signed.gas() > remaining {
            return Err(ChainError::validation(format!(
                "Invalid transaction: gas limit {} exceeds the remaining block gas {remaining}",
                signed.gas()
            )));
        }

        let base_fee = pending.header.base_fee_per_gas;
        if signed.max_fee_per_gas() < base_fee {
            return Err(ChainError::validation(format!(
                "Invalid transaction: max fee per gas {} is below the base fee {base_fee}",
                signed.max_fee_per_gas()
            )));
        }
        if signed.max_priority_fee_per_gas() > signed.max_fee_per_gas() {
            return Err(ChainError::validation(format!(
                "Invalid transaction: max priority fee per gas {} exceeds the max fee per gas {}",
                signed.max_priority_fee_per_gas(),
                signed.max_fee_per_gas()
            )));
        }

        let cost = signed
            .value()
            .saturating_add(U256::from(signed.gas()).saturating_mul(signed.max_fee_per_gas()));
        let balance = self.live_state().balance(&signed.sender());
        if balance < cost {
            return Err(ChainError::validation(format!(
                "Invalid transaction: sender balance {balance} is below the transaction cost {cost}"
            )));
        }

        Ok(())
    }

    /// Apply a validated transaction to the pending block and live state.
    fn execute_transaction(&mut self, signed: SignedTransaction) {
        let pending_index = self.pending_index();
        let base_fee = self.blocks[pending_index].header.base_fee_per_gas;
        let effective_gas_price = signed.effective_gas_price(base_fee);
        let gas_used = signed.intrinsic_gas();
        let sender = signed.sender();
        let value = signed.value();

        let state = &mut self.states[pending_index];
        let charge = U256::from(gas_used).saturating_mul(effective_gas_price);
        state.debit(sender, value.saturating_add(charge));
        state.account_mut(sender).nonce += 1;

        // The base fee portion is burned; only the tip goes to the coinbase.
        let coinbase = self.blocks[pending_index].header.coinbase;
        let tip = effective_gas_price - base_fee;
        let state = &mut self.states[pending_index];
        state.credit(coinbase, U256::from(gas_used).saturating_mul(tip));

        let contract_address = match signed.to() {
            Some(to) => {
                state.credit(to, value);
                None
            }
            None => {
                let address = derive_create_address(&sender, signed.nonce());
                state.account_mut(address).code = signed.data().clone();
                state.credit(address, value);
                Some(address)
            }
        };
        let state_root = state.state_root();

        let block = &mut self.blocks[pending_index];
        block.header.gas_used += gas_used;
        block.header.state_root = state_root;
        block.receipts.push(StoredReceipt {
            gas_used,
            cumulative_gas_used: block.header.gas_used,
            effective_gas_price,
            status: 1,
            contract_address,
            logs: vec![],
            bloom: LogsBloom::default(),
        });
        block.transactions.push(signed);
    }
}

impl Default for LocalChain {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl ChainBackend for LocalChain {
    fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    fn latest_block_number(&self) -> u64 {
        self.pending_number() - 1
    }

    fn block_by_number(
        &self,
        block: BlockRef,
        with_transactions: bool,
    ) -> Result<BlockInfo, ChainError> {
        let number = self.resolve_block_number(block)?;
        let is_pending = number == self.pending_number();
        Ok(self.blocks[number as usize].block_info(
            self.config.chain_id,
            with_transactions,
            is_pending,
        ))
    }

    fn block_by_hash(
        &self,
        hash: &H256,
        with_transactions: bool,
    ) -> Result<BlockInfo, ChainError> {
        let number = self.block_number_by_hash(hash)?;
        Ok(self.blocks[number as usize].block_info(self.config.chain_id, with_transactions, false))
    }

    fn block_number_by_hash(&self, hash: &H256) -> Result<u64, ChainError> {
        self.block_numbers.get(hash).copied().ok_or_else(|| {
            ChainError::BlockNotFound(format!(
                "No block found for block hash: {}",
                hex::encode(hash.as_bytes())
            ))
        })
    }

    fn transaction_by_hash(&self, hash: &H256) -> Result<TransactionInfo, ChainError> {
        let not_found = || {
            ChainError::TransactionNotFound(format!(
                "No transaction found for transaction hash: {hash}"
            ))
        };
        let pending_index = self.pending_index();
        // The reverse scan visits the pending block first, then mined
        // blocks newest-first.
        for (block_number, block) in self.blocks.iter().enumerate().rev() {
            if let Some(index) = block
                .transactions
                .iter()
                .position(|transaction| transaction.hash() == *hash)
            {
                let is_pending = block_number == pending_index;
                return block
                    .transaction_info(self.config.chain_id, index, is_pending)
                    .ok_or_else(not_found);
            }
        }
        Err(not_found())
    }

    fn transaction_receipt(&self, hash: &H256) -> Result<TransactionReceipt, ChainError> {
        let pending = self.pending_block();
        if pending
            .transactions
            .iter()
            .any(|transaction| transaction.hash() == *hash)
        {
            return Err(ChainError::TransactionNotFound(format!(
                "Transaction {hash} is not yet included in a block"
            )));
        }
        let not_found = || {
            ChainError::TransactionNotFound(format!(
                "No transaction found for transaction hash: {hash}"
            ))
        };
        for block in self.blocks[..self.pending_index()].iter().rev() {
            if let Some(index) = block
                .transactions
                .iter()
                .position(|transaction| transaction.hash() == *hash)
            {
                return block.receipt_info(index).ok_or_else(not_found);
            }
        }
        Err(not_found())
    }

    fn logs_in_block(&self, block_number: u64) -> Result<Vec<LogEntry>, ChainError> {
        if block_number >= self.pending_number() {
            return Err(ChainError::BlockNotFound(format!(
                "No block found for block number: {block_number}"
            )));
        }
        Ok(self.blocks[block_number as usize].logs())
    }

    fn balance(&self, address: &Address, block: BlockRef) -> Result<U256, ChainError> {
        Ok(self.state_at(block)?.balance(address))
    }

    fn transaction_count(&self, address: &Address, block: BlockRef) -> Result<u64, ChainError> {
        Ok(self.state_at(block)?.nonce(address))
    }

    fn code(&self, address: &Address, block: BlockRef) -> Result<Bytes, ChainError> {
        Ok(self.state_at(block)?.code(address))
    }

    fn storage(
        &self,
        address: &Address,
        slot: U256,
        block: BlockRef,
    ) -> Result<Bytes, ChainError> {
        let value = self.state_at(block)?.storage(address, &slot);
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);
        Ok(Bytes::copy_from_slice(&word))
    }

    fn block_hash(&self, number: u64) -> Result<H256, ChainError> {
        if number >= self.pending_number() {
            return Err(ChainError::BlockNotFound(format!(
                "No block found for block number: {number}"
            )));
        }
        Ok(self.blocks[number as usize].hash())
    }

    fn base_fee(&self) -> U256 {
        self.pending_block().header.base_fee_per_gas
    }

    fn pending_transaction_hashes(&self) -> Vec<H256> {
        self.pending_block()
            .transactions
            .iter()
            .map(|transaction| transaction.hash())
            .collect()
    }

    fn submit_transaction(&mut self, raw: &[u8]) -> Result<H256, ChainError> {
        let signed = SignedTransaction::decode(raw)?;
        self.validate_transaction(&signed)?;
        let hash = signed.hash();
        self.execute_transaction(signed);
        tracing::debug!(
            "Accepted transaction {} into pending block {}",
            hash,
            self.pending_number()
        );
        Ok(hash)
    }

    fn mine_block(&mut self, timestamp: Option<u64>) -> Result<H256, ChainError> {
        let pending_index = self.pending_index();
        if let Some(timestamp) = timestamp {
            let current_timestamp = self.blocks[pending_index].header.timestamp;
            if timestamp < current_timestamp {
                return Err(ChainError::validation(format!(
                    "The new timestamp ({timestamp}) must be greater than \
                     the current one ({current_timestamp})"
                )));
            }
        }

        let state_root = self.states[pending_index].state_root();
        let block = &mut self.blocks[pending_index];
        if let Some(timestamp) = timestamp {
            block.header.timestamp = timestamp;
        }
        block.header.state_root = state_root;
        block.header.transactions_root = transactions_digest(block);
        block.header.receipts_root = receipts_digest(block);
        let mut bloom = LogsBloom::default();
        for receipt in &block.receipts {
            bloom.accrue_bloom(&receipt.bloom);
        }
        block.header.logs_bloom = bloom;

        let sealed_hash = block.hash();
        let sealed_number = block.header.number;
        let transaction_count = block.transactions.len();
        self.block_numbers.insert(sealed_hash, sealed_number);
        self.open_pending_block();
        tracing::info!(
            "Mined block {} ({} transactions), hash {}",
            sealed_number,
            transaction_count,
            sealed_hash
        );
        Ok(sealed_hash)
    }

    fn call(&self, params: &EthCallParams, block: BlockRef) -> Result<Bytes, ChainError> {
        let number = self.resolve_block_number(block)?;
        if let Some(gas) = params.gas {
            let gas_limit = self.blocks[number as usize].header.gas_limit;
            if gas > gas_limit {
                return Err(ChainError::validation(format!(
                    "Invalid transaction: gas limit {gas} exceeds the block gas limit {gas_limit}"
                )));
            }
        }
        // Without an interpreter a call never produces return data.
        Ok(Bytes::new())
    }

    fn estimate_gas(
        &self,
        params: &EstimateGasParams,
        block: BlockRef,
    ) -> Result<u64, ChainError> {
        let number = self.resolve_block_number(block)?;
        let data = params.data.clone().unwrap_or_default();
        let estimate = intrinsic_gas(&data, params.to.is_none(), &[]);

        let gas_limit = self.blocks[number as usize].header.gas_limit;
        if let Some(gas) = params.gas {
            if gas > gas_limit {
                return Err(ChainError::validation(format!(
                    "Invalid transaction: gas limit {gas} exceeds the block gas limit {gas_limit}"
                )));
            }
            if gas < estimate {
                return Err(ChainError::validation(format!(
                    "Invalid transaction: gas limit {gas} is below the intrinsic gas {estimate}"
                )));
            }
        }

        let state = &self.states[number as usize];
        let cost = params
            .value
            .saturating_add(U256::from(estimate).saturating_mul(params.gas_price));
        let balance = state.balance(&params.from_);
        if balance < cost {
            return Err(ChainError::validation(format!(
                "Invalid transaction: sender balance {balance} is below the transaction cost {cost}"
            )));
        }

        Ok(estimate)
    }
}

fn derive_mix_hash(parent_hash: &H256, number: u64) -> H256 {
    let mut input = [0u8; 40];
    input[..32].copy_from_slice(parent_hash.as_bytes());
    input[32..].copy_from_slice(&number.to_be_bytes());
    alysis_crypto::keccak256(&input)
}

/// EIP-1559 base fee for the block after `parent`.
fn next_base_fee(parent: &BlockHeader) -> U256 {
    let gas_target = parent.gas_limit / ELASTICITY_MULTIPLIER;
    if gas_target == 0 {
        return parent.base_fee_per_gas;
    }
    let base_fee = parent.base_fee_per_gas;
    match parent.gas_used.cmp(&gas_target) {
        Ordering::Equal => base_fee,
        Ordering::Greater => {
            let delta = base_fee * U256::from(parent.gas_used - gas_target)
                / U256::from(gas_target)
                / U256::from(BASE_FEE_MAX_CHANGE_DENOMINATOR);
            base_fee + delta.max(U256::one())
        }
        Ordering::Less => {
            let delta = base_fee * U256::from(gas_target - parent.gas_used)
                / U256::from(gas_target)
                / U256::from(BASE_FEE_MAX_CHANGE_DENOMINATOR);
            base_fee - delta
        }
    }
}

/// Digest standing in for the transactions trie root: keccak over the RLP
/// list of transaction hashes, or the empty-trie root for an empty block.
fn transactions_digest(block: &StoredBlock) -> H256 {
    if block.transactions.is_empty() {
        return blank_root_hash();
    }
    let mut s = RlpStream::new();
    s.begin_list(block.transactions.len());
    for transaction in &block.transactions {
        s.append(&transaction.hash());
    }
    alysis_crypto::keccak256(&s.out())
}

/// Digest standing in for the receipts trie root: keccak over the RLP list
/// of (status, cumulative gas) pairs, or the empty-trie root.
fn receipts_digest(block: &StoredBlock) -> H256 {
    if block.receipts.is_empty() {
        return blank_root_hash();
    }
    let mut s = RlpStream::new();
    s.begin_list(block.receipts.len());
    for receipt in &block.receipts {
        s.begin_list(2);
        s.append(&receipt.status);
        s.append(&receipt.cumulative_gas_used);
    }
    alysis_crypto::keccak256(&s.out())
}
