//! Transaction views returned by queries

use bytes::Bytes;

use alysis_codec::json_record;
use alysis_primitives::{Address, H256, U256};

json_record! {
    /// A transaction as reported by `eth_getTransactionByHash` and
    /// inside full block views.
    ///
    /// `block_hash` and `transaction_index` are null while the
    /// transaction sits in the pending block. `v` carries the y
    /// parity for all transaction types. For pending transactions
    /// `gas_price` reports the fee cap; for mined ones the effective
    /// gas price.
    pub struct TransactionInfo {
        chain_id: u64,
        block_hash: Option<H256>,
        block_number: u64,
        from_: Address,
        gas: u64,
        gas_price: U256,
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
        hash: H256,
        input: Bytes,
        nonce: u64,
        to: Option<Address>,
        transaction_index: Option<u64>,
        type_: u64,
        value: U256,
        v: u64,
        r: U256,
        s: U256,
    }
}
