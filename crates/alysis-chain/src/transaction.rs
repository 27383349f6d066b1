//! Transaction envelopes and their wire encoding.
//!
//! Raw transactions arrive RLP-encoded: legacy payloads as a bare list,
//! EIP-2930 and EIP-1559 payloads prefixed with their type byte. Decoding
//! recovers the sender eagerly so every stored transaction knows it.

use alysis_crypto::{keccak256, recover_address};
use alysis_primitives::{Address, H256, U256};
use bytes::Bytes;
use rlp::{DecoderError, Rlp, RlpStream};

use crate::error::ChainError;

/// Base cost of any transaction.
pub const TX_BASE_GAS: u64 = 21_000;
/// Cost per zero byte of calldata.
pub const CALLDATA_ZERO_GAS: u64 = 4;
/// Cost per non-zero byte of calldata.
pub const CALLDATA_NONZERO_GAS: u64 = 16;
/// Cost per access list address entry.
pub const ACCESS_LIST_ADDRESS_GAS: u64 = 2_400;
/// Cost per access list storage key.
pub const ACCESS_LIST_STORAGE_KEY_GAS: u64 = 1_900;
/// Surcharge for contract creation.
pub const CREATE_GAS: u64 = 32_000;
/// Cost per 32-byte word of init code on creation.
pub const INITCODE_WORD_GAS: u64 = 2;

/// Transaction envelope type identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TxType {
    /// Legacy transaction (pre-EIP-2718).
    #[default]
    Legacy = 0,
    /// EIP-2930 access list transaction.
    AccessList = 1,
    /// EIP-1559 dynamic fee transaction.
    DynamicFee = 2,
}

/// Legacy transaction (type 0).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTx {
    /// Replay protection chain id; `None` for pre-EIP-155 signatures.
    pub chain_id: Option<u64>,
    /// Transaction nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: U256,
    /// Gas limit.
    pub gas: u64,
    /// Recipient address (`None` for contract creation).
    pub to: Option<Address>,
    /// Value to transfer in wei.
    pub value: U256,
    /// Input data.
    pub data: Bytes,
}

/// EIP-2930 access list transaction (type 1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessListTx {
    /// Chain id.
    pub chain_id: u64,
    /// Transaction nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: U256,
    /// Gas limit.
    pub gas: u64,
    /// Recipient address (`None` for contract creation).
    pub to: Option<Address>,
    /// Value to transfer in wei.
    pub value: U256,
    /// Input data.
    pub data: Bytes,
    /// Access list.
    pub access_list: Vec<AccessListItem>,
}

/// EIP-1559 dynamic fee transaction (type 2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicFeeTx {
    /// Chain id.
    pub chain_id: u64,
    /// Transaction nonce.
    pub nonce: u64,
    /// Max priority fee per gas (tip).
    pub max_priority_fee_per_gas: U256,
    /// Max fee per gas.
    pub max_fee_per_gas: U256,
    /// Gas limit.
    pub gas: u64,
    /// Recipient address (`None` for contract creation).
    pub to: Option<Address>,
    /// Value to transfer in wei.
    pub value: U256,
    /// Input data.
    pub data: Bytes,
    /// Access list.
    pub access_list: Vec<AccessListItem>,
}

/// Access list item (address + storage keys).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessListItem {
    /// Account address.
    pub address: Address,
    /// Storage keys.
    pub storage_keys: Vec<H256>,
}

impl rlp::Encodable for AccessListItem {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.append_list(&self.storage_keys);
    }
}

impl rlp::Decodable for AccessListItem {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            address: rlp.val_at(0)?,
            storage_keys: rlp.list_at(1)?,
        })
    }
}

/// Signature components as they appear in the envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxSignature {
    /// Recovery parity (0 or 1).
    pub y_parity: u8,
    /// R component.
    pub r: U256,
    /// S component.
    pub s: U256,
}

impl TxSignature {
    /// Create a signature from its components.
    pub fn new(y_parity: u8, r: U256, s: U256) -> Self {
        Self { y_parity, r, s }
    }

    fn to_crypto(self) -> alysis_crypto::Signature {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        self.r.to_big_endian(&mut r);
        self.s.to_big_endian(&mut s);
        alysis_crypto::Signature::new(r, s, self.y_parity)
    }
}

impl From<alysis_crypto::Signature> for TxSignature {
    fn from(signature: alysis_crypto::Signature) -> Self {
        Self {
            y_parity: signature.y_parity,
            r: U256::from_big_endian(&signature.r),
            s: U256::from_big_endian(&signature.s),
        }
    }
}

/// Unsigned transaction payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    /// Legacy transaction.
    Legacy(LegacyTx),
    /// EIP-2930 transaction.
    AccessList(AccessListTx),
    /// EIP-1559 transaction.
    DynamicFee(DynamicFeeTx),
}

impl Transaction {
    /// Envelope type of this payload.
    pub fn tx_type(&self) -> TxType {
        match self {
            Transaction::Legacy(..) => TxType::Legacy,
            Transaction::AccessList(..) => TxType::AccessList,
            Transaction::DynamicFee(..) => TxType::DynamicFee,
        }
    }

    /// Chain id the signature commits to, if any.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Transaction::Legacy(tx) => tx.chain_id,
            Transaction::AccessList(tx) => Some(tx.chain_id),
            Transaction::DynamicFee(tx) => Some(tx.chain_id),
        }
    }

    /// Transaction nonce.
    pub fn nonce(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.nonce,
            Transaction::AccessList(tx) => tx.nonce,
            Transaction::DynamicFee(tx) => tx.nonce,
        }
    }

    /// Gas limit.
    pub fn gas(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.gas,
            Transaction::AccessList(tx) => tx.gas,
            Transaction::DynamicFee(tx) => tx.gas,
        }
    }

    /// Recipient address (`None` for contract creation).
    pub fn to(&self) -> Option<Address> {
        match self {
            Transaction::Legacy(tx) => tx.to,
            Transaction::AccessList(tx) => tx.to,
            Transaction::DynamicFee(tx) => tx.to,
        }
    }

    /// Value to transfer in wei.
    pub fn value(&self) -> U256 {
        match self {
            Transaction::Legacy(tx) => tx.value,
            Transaction::AccessList(tx) => tx.value,
            Transaction::DynamicFee(tx) => tx.value,
        }
    }

    /// Input data.
    pub fn data(&self) -> &Bytes {
        match self {
            Transaction::Legacy(tx) => &tx.data,
            Transaction::AccessList(tx) => &tx.data,
            Transaction::DynamicFee(tx) => &tx.data,
        }
    }

    /// Access list ([] for legacy transactions).
    pub fn access_list(&self) -> &[AccessListItem] {
        match self {
            Transaction::Legacy(..) => &[],
            Transaction::AccessList(tx) => &tx.access_list,
            Transaction::DynamicFee(tx) => &tx.access_list,
        }
    }

    /// Whether this transaction creates a contract.
    pub fn is_create(&self) -> bool {
        self.to().is_none()
    }

    /// Upper bound on the per-gas price the sender is willing to pay.
    pub fn max_fee_per_gas(&self) -> U256 {
        match self {
            Transaction::Legacy(tx) => tx.gas_price,
            Transaction::AccessList(tx) => tx.gas_price,
            Transaction::DynamicFee(tx) => tx.max_fee_per_gas,
        }
    }

    /// Per-gas tip offered to the block producer.
    pub fn max_priority_fee_per_gas(&self) -> U256 {
        match self {
            Transaction::Legacy(tx) => tx.gas_price,
            Transaction::AccessList(tx) => tx.gas_price,
            Transaction::DynamicFee(tx) => tx.max_priority_fee_per_gas,
        }
    }

    /// Per-gas price actually paid in a block with the given base fee.
    pub fn effective_gas_price(&self, base_fee: U256) -> U256 {
        match self {
            Transaction::Legacy(tx) => tx.gas_price,
            Transaction::AccessList(tx) => tx.gas_price,
            Transaction::DynamicFee(tx) => tx
                .max_priority_fee_per_gas
                .saturating_add(base_fee)
                .min(tx.max_fee_per_gas),
        }
    }

    /// Gas consumed before any code would run.
    pub fn intrinsic_gas(&self) -> u64 {
        intrinsic_gas(self.data(), self.is_create(), self.access_list())
    }

    /// Hash the sender signed over.
    pub fn signing_hash(&self) -> H256 {
        match self {
            Transaction::Legacy(tx) => {
                let mut s = RlpStream::new();
                match tx.chain_id {
                    Some(chain_id) => {
                        s.begin_list(9);
                        tx.append_unsigned_fields(&mut s);
                        s.append(&chain_id);
                        s.append(&0u8);
                        s.append(&0u8);
                    }
                    None => {
                        s.begin_list(6);
                        tx.append_unsigned_fields(&mut s);
                    }
                }
                keccak256(&s.out())
            }
            Transaction::AccessList(tx) => {
                let mut s = RlpStream::new();
                s.begin_list(8);
                tx.append_unsigned_fields(&mut s);
                keccak256(&typed_envelope(TxType::AccessList, &s.out()))
            }
            Transaction::DynamicFee(tx) => {
                let mut s = RlpStream::new();
                s.begin_list(9);
                tx.append_unsigned_fields(&mut s);
                keccak256(&typed_envelope(TxType::DynamicFee, &s.out()))
            }
        }
    }

    /// Encode the full signed envelope.
    pub fn encode_signed(&self, signature: &TxSignature) -> Vec<u8> {
        match self {
            Transaction::Legacy(tx) => {
                let v: u64 = match tx.chain_id {
                    Some(chain_id) => 35 + 2 * chain_id + u64::from(signature.y_parity),
                    None => 27 + u64::from(signature.y_parity),
                };
                let mut s = RlpStream::new();
                s.begin_list(9);
                tx.append_unsigned_fields(&mut s);
                s.append(&v);
                s.append(&signature.r);
                s.append(&signature.s);
                s.out().to_vec()
            }
            Transaction::AccessList(tx) => {
                let mut s = RlpStream::new();
                s.begin_list(11);
                tx.append_unsigned_fields(&mut s);
                append_signature_fields(&mut s, signature);
                typed_envelope(TxType::AccessList, &s.out())
            }
            Transaction::DynamicFee(tx) => {
                let mut s = RlpStream::new();
                s.begin_list(12);
                tx.append_unsigned_fields(&mut s);
                append_signature_fields(&mut s, signature);
                typed_envelope(TxType::DynamicFee, &s.out())
            }
        }
    }
}

impl LegacyTx {
    fn append_unsigned_fields(&self, s: &mut RlpStream) {
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas);
        append_to_field(s, &self.to);
        s.append(&self.value);
        s.append(&self.data);
    }
}

impl AccessListTx {
    fn append_unsigned_fields(&self, s: &mut RlpStream) {
        s.append(&self.chain_id);
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas);
        append_to_field(s, &self.to);
        s.append(&self.value);
        s.append(&self.data);
        s.append_list(&self.access_list);
    }
}

impl DynamicFeeTx {
    fn append_unsigned_fields(&self, s: &mut RlpStream) {
        s.append(&self.chain_id);
        s.append(&self.nonce);
        s.append(&self.max_priority_fee_per_gas);
        s.append(&self.max_fee_per_gas);
        s.append(&self.gas);
        append_to_field(s, &self.to);
        s.append(&self.value);
        s.append(&self.data);
        s.append_list(&self.access_list);
    }
}

/// A decoded transaction with its signature, hash, and recovered sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Unsigned payload.
    pub transaction: Transaction,
    /// Signature components.
    pub signature: TxSignature,
    hash: H256,
    sender: Address,
}

impl SignedTransaction {
    /// Decode a raw envelope and recover the sender.
    pub fn decode(raw: &[u8]) -> Result<Self, ChainError> {
        let (transaction, signature) = decode_envelope(raw)
            .map_err(|err| ChainError::validation(format!("Could not decode transaction: {err}")))?;
        let sender = recover_address(&transaction.signing_hash(), &signature.to_crypto())
            .map_err(|err| ChainError::validation(format!("Invalid transaction: {err}")))?;
        Ok(Self {
            transaction,
            signature,
            hash: keccak256(raw),
            sender,
        })
    }

    /// Assemble from parts, computing the hash and sender the same way
    /// [`decode`](Self::decode) would.
    pub fn from_parts(transaction: Transaction, signature: TxSignature) -> Result<Self, ChainError> {
        let raw = transaction.encode_signed(&signature);
        Self::decode(&raw)
    }

    /// Keccak-256 of the raw envelope.
    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Recovered sender address.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Re-encode the raw envelope.
    pub fn encode(&self) -> Vec<u8> {
        self.transaction.encode_signed(&self.signature)
    }

    /// Envelope type.
    pub fn tx_type(&self) -> TxType {
        self.transaction.tx_type()
    }

    /// Chain id the signature commits to, if any.
    pub fn chain_id(&self) -> Option<u64> {
        self.transaction.chain_id()
    }

    /// Transaction nonce.
    pub fn nonce(&self) -> u64 {
        self.transaction.nonce()
    }

    /// Gas limit.
    pub fn gas(&self) -> u64 {
        self.transaction.gas()
    }

    /// Recipient address (`None` for contract creation).
    pub fn to(&self) -> Option<Address> {
        self.transaction.to()
    }

    /// Value to transfer in wei.
    pub fn value(&self) -> U256 {
        self.transaction.value()
    }

    /// Input data.
    pub fn data(&self) -> &Bytes {
        self.transaction.data()
    }

    /// Whether this transaction creates a contract.
    pub fn is_create(&self) -> bool {
        self.transaction.is_create()
    }

    /// Upper bound on the per-gas price.
    pub fn max_fee_per_gas(&self) -> U256 {
        self.transaction.max_fee_per_gas()
    }

    /// Per-gas tip offered to the block producer.
    pub fn max_priority_fee_per_gas(&self) -> U256 {
        self.transaction.max_priority_fee_per_gas()
    }

    /// Per-gas price actually paid in a block with the given base fee.
    pub fn effective_gas_price(&self, base_fee: U256) -> U256 {
        self.transaction.effective_gas_price(base_fee)
    }

    /// Gas consumed before any code would run.
    pub fn intrinsic_gas(&self) -> u64 {
        self.transaction.intrinsic_gas()
    }
}

/// Intrinsic gas of a transaction with the given shape.
pub fn intrinsic_gas(data: &[u8], is_create: bool, access_list: &[AccessListItem]) -> u64 {
    let mut gas = TX_BASE_GAS;
    for byte in data {
        gas += if *byte == 0 {
            CALLDATA_ZERO_GAS
        } else {
            CALLDATA_NONZERO_GAS
        };
    }
    for item in access_list {
        gas += ACCESS_LIST_ADDRESS_GAS;
        gas += ACCESS_LIST_STORAGE_KEY_GAS * item.storage_keys.len() as u64;
    }
    if is_create {
        gas += CREATE_GAS;
        gas += INITCODE_WORD_GAS * data.len().div_ceil(32) as u64;
    }
    gas
}

/// Contract address assigned by a creation transaction:
/// `keccak(rlp([sender, nonce]))[12..]`.
pub fn derive_create_address(sender: &Address, nonce: u64) -> Address {
    let mut s = RlpStream::new();
    s.begin_list(2);
    s.append(sender);
    s.append(&nonce);
    let hash = keccak256(&s.out());
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(out)
}

fn typed_envelope(tx_type: TxType, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(tx_type as u8);
    out.extend_from_slice(payload);
    out
}

fn append_to_field(s: &mut RlpStream, to: &Option<Address>) {
    match to {
        Some(address) => {
            s.append(address);
        }
        None => {
            s.append_empty_data();
        }
    }
}

fn append_signature_fields(s: &mut RlpStream, signature: &TxSignature) {
    s.append(&signature.y_parity);
    s.append(&signature.r);
    s.append(&signature.s);
}

fn decode_to_field(rlp: &Rlp<'_>, index: usize) -> Result<Option<Address>, DecoderError> {
    let raw: Vec<u8> = rlp.val_at(index)?;
    if raw.is_empty() {
        Ok(None)
    } else {
        Address::from_slice(&raw)
            .map(Some)
            .map_err(|_| DecoderError::RlpInvalidLength)
    }
}

fn decode_envelope(raw: &[u8]) -> Result<(Transaction, TxSignature), DecoderError> {
    match raw.first() {
        None => Err(DecoderError::RlpIsTooShort),
        Some(&0x01) => decode_access_list(&raw[1..]),
        Some(&0x02) => decode_dynamic_fee(&raw[1..]),
        Some(first) if *first >= 0xc0 => decode_legacy(raw),
        Some(_) => Err(DecoderError::Custom("unknown transaction type")),
    }
}

fn decode_legacy(raw: &[u8]) -> Result<(Transaction, TxSignature), DecoderError> {
    let rlp = Rlp::new(raw);
    if rlp.item_count()? != 9 {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    let v: u64 = rlp.val_at(6)?;
    let (chain_id, y_parity) = match v {
        27 | 28 => (None, (v - 27) as u8),
        v if v >= 35 => (Some((v - 35) / 2), ((v - 35) % 2) as u8),
        _ => return Err(DecoderError::Custom("invalid legacy signature v")),
    };
    Ok((
        Transaction::Legacy(LegacyTx {
            chain_id,
            nonce: rlp.val_at(0)?,
            gas_price: rlp.val_at(1)?,
            gas: rlp.val_at(2)?,
            to: decode_to_field(&rlp, 3)?,
            value: rlp.val_at(4)?,
            data: rlp.val_at(5)?,
        }),
        TxSignature::new(y_parity, rlp.val_at(7)?, rlp.val_at(8)?),
    ))
}

fn decode_access_list(payload: &[u8]) -> Result<(Transaction, TxSignature), DecoderError> {
    let rlp = Rlp::new(payload);
    if rlp.item_count()? != 11 {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    Ok((
        Transaction::AccessList(AccessListTx {
            chain_id: rlp.val_at(0)?,
            nonce: rlp.val_at(1)?,
            gas_price: rlp.val_at(2)?,
            gas: rlp.val_at(3)?,
            to: decode_to_field(&rlp, 4)?,
            value: rlp.val_at(5)?,
            data: rlp.val_at(6)?,
            access_list: rlp.list_at(7)?,
        }),
        TxSignature::new(rlp.val_at(8)?, rlp.val_at(9)?, rlp.val_at(10)?),
    ))
}

fn decode_dynamic_fee(payload: &[u8]) -> Result<(Transaction, TxSignature), DecoderError> {
    let rlp = Rlp::new(payload);
    if rlp.item_count()? != 12 {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    Ok((
        Transaction::DynamicFee(DynamicFeeTx {
            chain_id: rlp.val_at(0)?,
            nonce: rlp.val_at(1)?,
            max_priority_fee_per_gas: rlp.val_at(2)?,
            max_fee_per_gas: rlp.val_at(3)?,
            gas: rlp.val_at(4)?,
            to: decode_to_field(&rlp, 5)?,
            value: rlp.val_at(6)?,
            data: rlp.val_at(7)?,
            access_list: rlp.list_at(8)?,
        }),
        TxSignature::new(rlp.val_at(9)?, rlp.val_at(10)?, rlp.val_at(11)?),
    ))
}
