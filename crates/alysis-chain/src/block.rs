//! Stored blocks, receipts, and their RPC views.
//!
//! [`StoredBlock`] is what the chain keeps; the `*_info` methods project it
//! into the schema records, applying the pending-block null rules.

use alysis_crypto::keccak256;
use alysis_primitives::{Address, H256, U256};
use alysis_schema::{
    BlockInfo, BlockNonce, BlockTransactions, LogEntry, LogsBloom, TransactionInfo,
    TransactionReceipt,
};
use bytes::Bytes;
use rlp::RlpStream;

use crate::transaction::{SignedTransaction, TxType};

/// Keccak of an empty RLP string, the root of any empty trie.
pub fn blank_root_hash() -> H256 {
    keccak256(&rlp::NULL_RLP)
}

/// Keccak of an empty RLP list, the uncles hash of every block here.
pub fn empty_uncles_hash() -> H256 {
    keccak256(&rlp::EMPTY_LIST_RLP)
}

/// Block header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Parent block hash.
    pub parent_hash: H256,
    /// Uncles hash (always the empty-list hash).
    pub uncles_hash: H256,
    /// Block producer address.
    pub coinbase: Address,
    /// State digest after executing the block.
    pub state_root: H256,
    /// Transactions digest.
    pub transactions_root: H256,
    /// Receipts digest.
    pub receipts_root: H256,
    /// OR of all receipt blooms.
    pub logs_bloom: LogsBloom,
    /// Difficulty (always 0 post-merge).
    pub difficulty: U256,
    /// Block number.
    pub number: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas used by all transactions.
    pub gas_used: u64,
    /// Timestamp in Unix seconds.
    pub timestamp: u64,
    /// Extra data.
    pub extra_data: Bytes,
    /// Mix hash (prevRandao slot).
    pub mix_hash: H256,
    /// Proof-of-work nonce (always zero).
    pub nonce: BlockNonce,
    /// EIP-1559 base fee.
    pub base_fee_per_gas: U256,
}

impl BlockHeader {
    /// Hash of the RLP-encoded header.
    pub fn hash(&self) -> H256 {
        keccak256(&self.rlp_bytes())
    }

    fn rlp_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new();
        s.begin_list(16);
        s.append(&self.parent_hash);
        s.append(&self.uncles_hash);
        s.append(&self.coinbase);
        s.append(&self.state_root);
        s.append(&self.transactions_root);
        s.append(&self.receipts_root);
        s.append(&self.logs_bloom.as_bytes().to_vec());
        s.append(&self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.timestamp);
        s.append(&self.extra_data);
        s.append(&self.mix_hash);
        s.append(&self.nonce.as_bytes().to_vec());
        s.append(&self.base_fee_per_gas);
        s.out().to_vec()
    }
}

/// A log as produced by transaction execution, before block context exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredLog {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics (at most four).
    pub topics: Vec<H256>,
    /// Unindexed payload.
    pub data: Bytes,
}

/// Bloom filter accumulated over the given logs' addresses and topics.
pub fn bloom_for_logs(logs: &[StoredLog]) -> LogsBloom {
    let mut bloom = LogsBloom::default();
    for log in logs {
        bloom.accrue(log.address.as_bytes());
        for topic in &log.topics {
            bloom.accrue(topic.as_bytes());
        }
    }
    bloom
}

/// Execution result of one transaction inside a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredReceipt {
    /// Gas used by this transaction alone.
    pub gas_used: u64,
    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// Per-gas price actually charged.
    pub effective_gas_price: U256,
    /// 1 on success, 0 on failure.
    pub status: u64,
    /// Address assigned by a creation transaction.
    pub contract_address: Option<Address>,
    /// Logs emitted during execution.
    pub logs: Vec<StoredLog>,
    /// Bloom over this receipt's logs.
    pub bloom: LogsBloom,
}

/// A block as the chain stores it, mined or pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlock {
    /// Header under construction (pending) or sealed (mined).
    pub header: BlockHeader,
    /// Transactions in execution order.
    pub transactions: Vec<SignedTransaction>,
    /// One receipt per transaction, same order.
    pub receipts: Vec<StoredReceipt>,
}

impl StoredBlock {
    /// Header hash.
    pub fn hash(&self) -> H256 {
        self.header.hash()
    }

    /// RLP of the whole block: header, transactions, uncles. Typed
    /// transactions nest as byte strings per EIP-2718.
    pub fn rlp_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new();
        s.begin_list(3);
        s.append_raw(&self.header.rlp_bytes(), 1);
        s.begin_list(self.transactions.len());
        for transaction in &self.transactions {
            let raw = transaction.encode();
            match transaction.tx_type() {
                TxType::Legacy => {
                    s.append_raw(&raw, 1);
                }
                TxType::AccessList | TxType::DynamicFee => {
                    s.append(&raw);
                }
            }
        }
        s.begin_list(0);
        s.out().to_vec()
    }

    /// Project into a [`BlockInfo`]. A pending block nulls `hash`, `nonce`,
    /// `logs_bloom`, `miner`, and `total_difficulty`.
    pub fn block_info(&self, chain_id: u64, with_transactions: bool, is_pending: bool) -> BlockInfo {
        let transactions = if with_transactions {
            BlockTransactions::Full(
                (0..self.transactions.len())
                    .filter_map(|index| self.transaction_info(chain_id, index, is_pending))
                    .collect(),
            )
        } else {
            BlockTransactions::Hashes(
                self.transactions
                    .iter()
                    .map(|transaction| transaction.hash())
                    .collect(),
            )
        };
        BlockInfo {
            number: self.header.number,
            hash: (!is_pending).then(|| self.hash()),
            parent_hash: self.header.parent_hash,
            nonce: (!is_pending).then_some(self.header.nonce),
            sha3_uncles: self.header.uncles_hash,
            logs_bloom: (!is_pending).then_some(self.header.logs_bloom),
            transactions_root: self.header.transactions_root,
            state_root: self.header.state_root,
            receipts_root: self.header.receipts_root,
            miner: (!is_pending).then_some(self.header.coinbase),
            difficulty: if is_pending {
                U256::zero()
            } else {
                self.header.difficulty
            },
            total_difficulty: (!is_pending).then_some(self.header.difficulty),
            extra_data: padded_extra_data(&self.header.extra_data),
            size: self.rlp_bytes().len() as u64,
            gas_limit: self.header.gas_limit,
            gas_used: self.header.gas_used,
            base_fee_per_gas: self.header.base_fee_per_gas,
            timestamp: self.header.timestamp,
            transactions,
            uncles: vec![],
        }
    }

    /// Project the transaction at `index` into a [`TransactionInfo`].
    ///
    /// Pending transactions report a null `block_hash` and
    /// `transaction_index` but keep the block number; their `gas_price` is
    /// the fee cap since the final base fee is not known yet.
    pub fn transaction_info(
        &self,
        chain_id: u64,
        index: usize,
        is_pending: bool,
    ) -> Option<TransactionInfo> {
        let transaction = self.transactions.get(index)?;
        Some(TransactionInfo {
            chain_id: transaction.chain_id().unwrap_or(chain_id),
            block_hash: (!is_pending).then(|| self.hash()),
            block_number: self.header.number,
            from_: transaction.sender(),
            gas: transaction.gas(),
            gas_price: if is_pending {
                transaction.max_fee_per_gas()
            } else {
                transaction.effective_gas_price(self.header.base_fee_per_gas)
            },
            max_fee_per_gas: transaction.max_fee_per_gas(),
            max_priority_fee_per_gas: transaction.max_priority_fee_per_gas(),
            hash: transaction.hash(),
            input: transaction.data().clone(),
            nonce: transaction.nonce(),
            to: transaction.to(),
            transaction_index: (!is_pending).then_some(index as u64),
            type_: transaction.tx_type() as u64,
            value: transaction.value(),
            v: u64::from(transaction.signature.y_parity),
            r: transaction.signature.r,
            s: transaction.signature.s,
        })
    }

    /// Project the receipt at `index` into a [`TransactionReceipt`].
    /// Only meaningful for mined blocks; the chain never exposes receipts
    /// of pending transactions.
    pub fn receipt_info(&self, index: usize) -> Option<TransactionReceipt> {
        let transaction = self.transactions.get(index)?;
        let receipt = self.receipts.get(index)?;
        Some(TransactionReceipt {
            transaction_hash: transaction.hash(),
            transaction_index: index as u64,
            block_hash: self.hash(),
            block_number: self.header.number,
            from_: transaction.sender(),
            to: transaction.to(),
            cumulative_gas_used: receipt.cumulative_gas_used,
            effective_gas_price: receipt.effective_gas_price,
            gas_used: receipt.gas_used,
            contract_address: receipt.contract_address,
            logs: self.log_entries(index),
            logs_bloom: receipt.bloom,
            type_: transaction.tx_type() as u64,
            status: receipt.status,
        })
    }

    /// Log entries of the transaction at `index`, with block context filled
    /// in. Log indices count per transaction.
    pub fn log_entries(&self, index: usize) -> Vec<LogEntry> {
        let Some(transaction) = self.transactions.get(index) else {
            return vec![];
        };
        let Some(receipt) = self.receipts.get(index) else {
            return vec![];
        };
        let block_hash = self.hash();
        receipt
            .logs
            .iter()
            .enumerate()
            .map(|(log_index, log)| LogEntry {
                address: log.address,
                block_hash,
                block_number: self.header.number,
                data: log.data.clone(),
                log_index: log_index as u64,
                removed: false,
                topics: log.topics.clone(),
                transaction_index: index as u64,
                transaction_hash: transaction.hash(),
            })
            .collect()
    }

    /// All log entries of the block in (transaction, log) order.
    pub fn logs(&self) -> Vec<LogEntry> {
        (0..self.transactions.len())
            .flat_map(|index| self.log_entries(index))
            .collect()
    }
}

fn padded_extra_data(extra_data: &Bytes) -> Bytes {
    if extra_data.len() >= 32 {
        return extra_data.clone();
    }
    let mut padded = vec![0u8; 32 - extra_data.len()];
    padded.extend_from_slice(extra_data);
    Bytes::from(padded)
}
