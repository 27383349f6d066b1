//! Block views returned by queries

use std::fmt;

use bytes::Bytes;
use serde_json::Value;

use alysis_codec::{json_record, structure_hex_bytes, Structure, StructuringError, Unstructure};
use alysis_primitives::{Address, H256, U256};

use crate::{LogsBloom, TransactionInfo};

/// 8-byte proof-of-work nonce field of a block header.
///
/// Always zero on this chain, null while the block is pending.
/// Rendered at its full width of 16 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockNonce([u8; 8]);

impl BlockNonce {
    /// Size of the nonce in bytes
    pub const LEN: usize = 8;

    /// All-zero nonce
    pub const ZERO: BlockNonce = BlockNonce([0u8; 8]);

    /// Create a nonce from raw bytes
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        BlockNonce(bytes)
    }

    /// Get as byte slice
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Convert to hex string with 0x prefix, full width
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for BlockNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockNonce({})", self.to_hex())
    }
}

impl Structure for BlockNonce {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let bytes = structure_hex_bytes(value)?;
        if bytes.len() != Self::LEN {
            return Err(StructuringError::at_root("The value must encode 8 bytes"));
        }
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&bytes);
        Ok(BlockNonce(arr))
    }
}

impl Unstructure for BlockNonce {
    fn unstructure(&self) -> Value {
        Value::String(self.to_hex())
    }
}

/// Transactions of a block view: full objects or hashes only,
/// depending on the request flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTransactions {
    /// Full transaction views
    Full(Vec<TransactionInfo>),
    /// Transaction hashes only
    Hashes(Vec<H256>),
}

impl BlockTransactions {
    /// Number of transactions in the block
    pub fn len(&self) -> usize {
        match self {
            BlockTransactions::Full(full) => full.len(),
            BlockTransactions::Hashes(hashes) => hashes.len(),
        }
    }

    /// Whether the block carries no transactions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Structure for BlockTransactions {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let mut errors = Vec::new();
        match Vec::<TransactionInfo>::structure(value) {
            Ok(full) => return Ok(BlockTransactions::Full(full)),
            Err(err) => errors.push(err),
        }
        match Vec::<H256>::structure(value) {
            Ok(hashes) => return Ok(BlockTransactions::Hashes(hashes)),
            Err(err) => errors.push(err),
        }
        Err(StructuringError::group(
            "Could not structure into any of the variants of BlockTransactions",
            errors,
        ))
    }
}

impl Unstructure for BlockTransactions {
    fn unstructure(&self) -> Value {
        match self {
            BlockTransactions::Full(full) => full.unstructure(),
            BlockTransactions::Hashes(hashes) => hashes.unstructure(),
        }
    }
}

json_record! {
    /// A block as reported by `eth_getBlockByNumber` and
    /// `eth_getBlockByHash`.
    ///
    /// For the pending block `hash`, `nonce`, `logs_bloom`, `miner`
    /// and `total_difficulty` are null and `difficulty` is zero.
    pub struct BlockInfo {
        number: u64,
        hash: Option<H256>,
        parent_hash: H256,
        nonce: Option<BlockNonce>,
        sha3_uncles: H256,
        logs_bloom: Option<LogsBloom>,
        transactions_root: H256,
        state_root: H256,
        receipts_root: H256,
        miner: Option<Address>,
        difficulty: U256,
        total_difficulty: Option<U256>,
        extra_data: Bytes,
        size: u64,
        gas_limit: u64,
        gas_used: u64,
        base_fee_per_gas: U256,
        timestamp: u64,
        transactions: BlockTransactions,
        uncles: Vec<H256>,
    }
}

impl BlockInfo {
    /// Whether this view describes the pending block
    pub fn is_pending(&self) -> bool {
        self.hash.is_none()
    }
}
