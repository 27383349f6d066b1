//! A hand-arranged chain history.
//!
//! The built-in execution model never emits logs, so log filter
//! scenarios script their own: each pushed block carries exactly the
//! log entries the scenario hands it, with block and transaction
//! coordinates filled in deterministically.

use alysis_chain::{ChainBackend, ChainError, INITIAL_BASE_FEE};
use alysis_crypto::keccak256;
use alysis_primitives::{Address, H256, U256};
use alysis_schema::{
    BlockInfo, BlockRef, EstimateGasParams, EthCallParams, LogEntry, TransactionInfo,
    TransactionReceipt,
};
use bytes::Bytes;

/// One scripted log: emitting address, topic list, payload.
pub type ScriptedLog = (Address, Vec<H256>, Bytes);

struct ScriptedBlock {
    hash: H256,
    logs: Vec<LogEntry>,
}

/// A backend whose mined history is written by the test instead of by
/// transaction execution.
///
/// Only the operations the filter and log paths touch are answerable;
/// state and transaction lookups report a validation error naming the
/// missing capability.
pub struct ScriptedChain {
    chain_id: u64,
    blocks: Vec<ScriptedBlock>,
}

impl ScriptedChain {
    /// A scripted chain holding only an empty genesis block.
    pub fn new(chain_id: u64) -> Self {
        ScriptedChain {
            chain_id,
            blocks: vec![ScriptedBlock {
                hash: scripted_hash(0),
                logs: Vec::new(),
            }],
        }
    }

    /// Append a mined block in which each entry of `logs` is emitted by
    /// its own transaction. Returns the new block's hash.
    pub fn push_block_with_logs(&mut self, logs: Vec<ScriptedLog>) -> H256 {
        let number = self.blocks.len() as u64;
        let hash = scripted_hash(number);
        let entries = logs
            .into_iter()
            .enumerate()
            .map(|(index, (address, topics, data))| LogEntry {
                address,
                block_hash: hash,
                block_number: number,
                data,
                log_index: index as u64,
                removed: false,
                topics,
                transaction_index: index as u64,
                transaction_hash: scripted_transaction_hash(number, index as u64),
            })
            .collect();
        self.blocks.push(ScriptedBlock { hash, logs: entries });
        hash
    }

    /// Append a mined block with no logs.
    pub fn push_empty_block(&mut self) -> H256 {
        self.push_block_with_logs(Vec::new())
    }
}

/// Deterministic hash for the scripted block at `number`.
fn scripted_hash(number: u64) -> H256 {
    keccak256(&number.to_be_bytes())
}

/// Deterministic hash for scripted transaction `index` of block `number`.
fn scripted_transaction_hash(number: u64, index: u64) -> H256 {
    let mut seed = [0u8; 16];
    seed[..8].copy_from_slice(&number.to_be_bytes());
    seed[8..].copy_from_slice(&index.to_be_bytes());
    keccak256(&seed)
}

fn unsupported(what: &str) -> ChainError {
    ChainError::validation(format!("{what} are not scripted"))
}

impl ChainBackend for ScriptedChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn latest_block_number(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    fn block_by_number(&self, _: BlockRef, _: bool) -> Result<BlockInfo, ChainError> {
        Err(unsupported("block bodies"))
    }

    fn block_by_hash(&self, _: &H256, _: bool) -> Result<BlockInfo, ChainError> {
        Err(unsupported("block bodies"))
    }

    fn block_number_by_hash(&self, hash: &H256) -> Result<u64, ChainError> {
        self.blocks
            .iter()
            .position(|block| block.hash == *hash)
            .map(|index| index as u64)
            .ok_or_else(|| {
                ChainError::BlockNotFound(format!(
                    "No block found for block hash: {}",
                    hex::encode(hash.as_bytes())
                ))
            })
    }

    fn transaction_by_hash(&self, _: &H256) -> Result<TransactionInfo, ChainError> {
        Err(unsupported("transaction lookups"))
    }

    fn transaction_receipt(&self, _: &H256) -> Result<TransactionReceipt, ChainError> {
        Err(unsupported("transaction lookups"))
    }

    fn logs_in_block(&self, block_number: u64) -> Result<Vec<LogEntry>, ChainError> {
        self.blocks
            .get(block_number as usize)
            .map(|block| block.logs.clone())
            .ok_or_else(|| {
                ChainError::BlockNotFound(format!(
                    "No block found for block number: {block_number}"
                ))
            })
    }

    fn balance(&self, _: &Address, _: BlockRef) -> Result<U256, ChainError> {
        Err(unsupported("account states"))
    }

    fn transaction_count(&self, _: &Address, _: BlockRef) -> Result<u64, ChainError> {
        Err(unsupported("account states"))
    }

    fn code(&self, _: &Address, _: BlockRef) -> Result<Bytes, ChainError> {
        Err(unsupported("account states"))
    }

    fn storage(&self, _: &Address, _: U256, _: BlockRef) -> Result<Bytes, ChainError> {
        Err(unsupported("account states"))
    }

    fn block_hash(&self, number: u64) -> Result<H256, ChainError> {
        self.blocks
            .get(number as usize)
            .map(|block| block.hash)
            .ok_or_else(|| {
                ChainError::BlockNotFound(format!("No block found for block number: {number}"))
            })
    }

    fn base_fee(&self) -> U256 {
        U256::from(INITIAL_BASE_FEE)
    }

    fn pending_transaction_hashes(&self) -> Vec<H256> {
        Vec::new()
    }

    fn submit_transaction(&mut self, _: &[u8]) -> Result<H256, ChainError> {
        Err(unsupported("transaction submissions"))
    }

    fn mine_block(&mut self, _: Option<u64>) -> Result<H256, ChainError> {
        Ok(self.push_empty_block())
    }

    fn call(&self, _: &EthCallParams, _: BlockRef) -> Result<Bytes, ChainError> {
        Err(unsupported("calls"))
    }

    fn estimate_gas(&self, _: &EstimateGasParams, _: BlockRef) -> Result<u64, ChainError> {
        Err(unsupported("calls"))
    }
}
