//! Log entries and bloom filters

use std::fmt;

use bytes::Bytes;
use serde_json::Value;

use alysis_codec::{json_record, structure_hex_bytes, Structure, StructuringError, Unstructure};
use alysis_crypto::keccak256;
use alysis_primitives::{Address, H256};

json_record! {
    /// A single log emitted during transaction execution
    pub struct LogEntry {
        address: Address,
        block_hash: H256,
        block_number: u64,
        data: Bytes,
        log_index: u64,
        removed: bool,
        topics: Vec<H256>,
        transaction_index: u64,
        transaction_hash: H256,
    }
}

/// 2048-bit log bloom filter.
///
/// Each accrued input sets three bits derived from the first six
/// bytes of its Keccak-256 hash. Unlike quantities, the bloom is
/// rendered at its full width of 512 hex characters.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LogsBloom([u8; 256]);

impl LogsBloom {
    /// Size of the bloom in bytes
    pub const LEN: usize = 256;

    /// Bloom with no bits set
    pub const ZERO: LogsBloom = LogsBloom([0u8; 256]);

    /// Create a bloom from raw bytes
    pub const fn from_bytes(bytes: [u8; 256]) -> Self {
        LogsBloom(bytes)
    }

    /// Get as byte slice
    pub fn as_bytes(&self) -> &[u8; 256] {
        &self.0
    }

    /// Check if no bits are set
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    fn bits_of(input: &[u8]) -> [usize; 3] {
        let hash = keccak256(input);
        let hash = hash.as_bytes();
        let mut bits = [0usize; 3];
        for (slot, i) in [0usize, 2, 4].into_iter().enumerate() {
            bits[slot] = (((hash[i] as usize) << 8) | (hash[i + 1] as usize)) & 0x7ff;
        }
        bits
    }

    /// Set the three bits corresponding to the given input
    pub fn accrue(&mut self, input: &[u8]) {
        for bit in Self::bits_of(input) {
            self.0[Self::LEN - 1 - bit / 8] |= 1 << (bit % 8);
        }
    }

    /// Accrue a log's address and all of its topics
    pub fn accrue_log(&mut self, log: &LogEntry) {
        self.accrue(log.address.as_ref());
        for topic in &log.topics {
            self.accrue(topic.as_ref());
        }
    }

    /// Merge another bloom into this one
    pub fn accrue_bloom(&mut self, other: &LogsBloom) {
        for (byte, other_byte) in self.0.iter_mut().zip(other.0.iter()) {
            *byte |= other_byte;
        }
    }

    /// Whether all three bits of the given input are set
    pub fn contains_input(&self, input: &[u8]) -> bool {
        Self::bits_of(input)
            .into_iter()
            .all(|bit| self.0[Self::LEN - 1 - bit / 8] & (1 << (bit % 8)) != 0)
    }

    /// Convert to hex string with 0x prefix, full width
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl Default for LogsBloom {
    fn default() -> Self {
        LogsBloom::ZERO
    }
}

impl fmt::Debug for LogsBloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogsBloom({})", self.to_hex())
    }
}

impl Structure for LogsBloom {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let bytes = structure_hex_bytes(value)?;
        if bytes.len() != Self::LEN {
            return Err(StructuringError::at_root("The value must encode 256 bytes"));
        }
        let mut arr = [0u8; 256];
        arr.copy_from_slice(&bytes);
        Ok(LogsBloom(arr))
    }
}

impl Unstructure for LogsBloom {
    fn unstructure(&self) -> Value {
        Value::String(self.to_hex())
    }
}
