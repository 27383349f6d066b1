//! Transaction receipts

use alysis_codec::json_record;
use alysis_primitives::{Address, H256, U256};

use crate::{LogEntry, LogsBloom};

json_record! {
    /// Receipt of a mined transaction.
    ///
    /// `contract_address` is set only for contract creations. Pending
    /// transactions have no receipt.
    pub struct TransactionReceipt {
        transaction_hash: H256,
        transaction_index: u64,
        block_hash: H256,
        block_number: u64,
        from_: Address,
        to: Option<Address>,
        cumulative_gas_used: u64,
        effective_gas_price: U256,
        gas_used: u64,
        contract_address: Option<Address>,
        logs: Vec<LogEntry>,
        logs_bloom: LogsBloom,
        type_: u64,
        status: u64,
    }
}
