//! Ethereum namespace RPC methods (eth_*)

use bytes::Bytes;
use serde_json::Value;

use alysis_chain::{ChainBackend, ChainError};
use alysis_codec::{json_record, unstructure};
use alysis_node::Node;
use alysis_primitives::{Address, H256, U256};
use alysis_schema::{BlockRef, EstimateGasParams, EthCallParams, FilterParams, GetLogsFilter};

use crate::error::JsonRpcError;
use crate::methods::structure_args;

json_record! {
    /// Positional parameters of `eth_getBalance`
    struct GetBalanceArgs {
        address: Address,
        block: BlockRef,
    }
}

json_record! {
    /// Positional parameters of `eth_getTransactionCount`
    struct GetTransactionCountArgs {
        address: Address,
        block: BlockRef,
    }
}

json_record! {
    /// Positional parameters of `eth_getCode`
    struct GetCodeArgs {
        address: Address,
        block: BlockRef,
    }
}

json_record! {
    /// Positional parameters of `eth_getStorageAt`
    struct GetStorageAtArgs {
        address: Address,
        slot: U256,
        block: BlockRef,
    }
}

json_record! {
    /// Positional parameters of `eth_getBlockByNumber`
    struct GetBlockByNumberArgs {
        block: BlockRef,
        with_transactions: bool,
    }
}

json_record! {
    /// Positional parameters of `eth_getBlockByHash`
    struct GetBlockByHashArgs {
        hash: H256,
        with_transactions: bool,
    }
}

json_record! {
    /// Positional parameters of the transaction lookup methods
    struct GetTransactionArgs {
        hash: H256,
    }
}

json_record! {
    /// Positional parameters of `eth_sendRawTransaction`
    struct SendRawTransactionArgs {
        transaction: Bytes,
    }
}

json_record! {
    /// Positional parameters of `eth_call`
    struct CallArgs {
        transaction: EthCallParams,
        block: BlockRef,
    }
}

json_record! {
    /// Positional parameters of `eth_estimateGas`; the block defaults
    /// to pending when omitted
    struct EstimateGasArgs {
        transaction: EstimateGasParams,
        block: BlockRef = BlockRef::Pending,
    }
}

json_record! {
    /// Positional parameters of `eth_newFilter`
    struct NewFilterArgs {
        filter: FilterParams,
    }
}

json_record! {
    /// Positional parameters of `eth_getLogs`
    struct GetLogsArgs {
        filter: GetLogsFilter,
    }
}

json_record! {
    /// Positional parameters of the filter methods taking a filter id
    struct FilterIdArgs {
        id: u64,
    }
}

/// eth_chainId - Returns the chain id
pub fn eth_chain_id<B: ChainBackend>(
    node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(unstructure(&node.chain_id()))
}

/// eth_blockNumber - Returns the number of the latest mined block
pub fn eth_block_number<B: ChainBackend>(
    node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(unstructure(&node.block_number()))
}

/// eth_gasPrice - Returns a gas price that covers the next block
pub fn eth_gas_price<B: ChainBackend>(
    node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(unstructure(&node.gas_price()))
}

/// eth_accounts - Returns the locally managed accounts, always empty
pub fn eth_accounts<B: ChainBackend>(
    node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(unstructure(&node.accounts()))
}

/// eth_getBalance - Returns the balance of an account at a block
pub fn eth_get_balance<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetBalanceArgs = structure_args(params)?;
    Ok(unstructure(&node.balance(&args.address, args.block)?))
}

/// eth_getTransactionCount - Returns the nonce of an account at a block
pub fn eth_get_transaction_count<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetTransactionCountArgs = structure_args(params)?;
    Ok(unstructure(
        &node.transaction_count(&args.address, args.block)?,
    ))
}

/// eth_getCode - Returns the code of an account at a block
pub fn eth_get_code<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetCodeArgs = structure_args(params)?;
    Ok(unstructure(&node.code(&args.address, args.block)?))
}

/// eth_getStorageAt - Returns a storage word of an account at a block
pub fn eth_get_storage_at<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetStorageAtArgs = structure_args(params)?;
    Ok(unstructure(
        &node.storage_at(&args.address, args.slot, args.block)?,
    ))
}

/// eth_getBlockByNumber - Returns a block view by number or label, or
/// null if there is no such block
pub fn eth_get_block_by_number<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetBlockByNumberArgs = structure_args(params)?;
    match node.block_by_number(args.block, args.with_transactions) {
        Ok(block) => Ok(unstructure(&block)),
        Err(ChainError::BlockNotFound(_)) => Ok(Value::Null),
        Err(err) => Err(err.into()),
    }
}

/// eth_getBlockByHash - Returns a block view by hash, or null if there
/// is no such block
pub fn eth_get_block_by_hash<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetBlockByHashArgs = structure_args(params)?;
    match node.block_by_hash(&args.hash, args.with_transactions) {
        Ok(block) => Ok(unstructure(&block)),
        Err(ChainError::BlockNotFound(_)) => Ok(Value::Null),
        Err(err) => Err(err.into()),
    }
}

/// eth_getTransactionByHash - Returns a transaction view, or null if
/// the transaction is unknown
pub fn eth_get_transaction_by_hash<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetTransactionArgs = structure_args(params)?;
    match node.transaction_by_hash(&args.hash) {
        Ok(transaction) => Ok(unstructure(&transaction)),
        Err(ChainError::TransactionNotFound(_)) => Ok(Value::Null),
        Err(err) => Err(err.into()),
    }
}

/// eth_getTransactionReceipt - Returns the receipt of a mined
/// transaction, or null if the transaction is unknown or still pending
pub fn eth_get_transaction_receipt<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetTransactionArgs = structure_args(params)?;
    match node.transaction_receipt(&args.hash) {
        Ok(receipt) => Ok(unstructure(&receipt)),
        Err(ChainError::TransactionNotFound(_)) => Ok(Value::Null),
        Err(err) => Err(err.into()),
    }
}

/// eth_sendRawTransaction - Submits a signed transaction and returns
/// its hash
pub fn eth_send_raw_transaction<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: SendRawTransactionArgs = structure_args(params)?;
    Ok(unstructure(&node.send_raw_transaction(&args.transaction)?))
}

/// eth_call - Executes a read-only call and returns its output
pub fn eth_call<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: CallArgs = structure_args(params)?;
    Ok(unstructure(&node.call(&args.transaction, args.block)?))
}

/// eth_estimateGas - Returns the gas a transaction would use
pub fn eth_estimate_gas<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: EstimateGasArgs = structure_args(params)?;
    Ok(unstructure(
        &node.estimate_gas(&args.transaction, args.block)?,
    ))
}

/// eth_newFilter - Installs a log filter and returns its id
pub fn eth_new_filter<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: NewFilterArgs = structure_args(params)?;
    Ok(unstructure(&node.new_log_filter(args.filter)))
}

/// eth_newBlockFilter - Installs a filter over newly mined block
/// hashes and returns its id
pub fn eth_new_block_filter<B: ChainBackend>(
    node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(unstructure(&node.new_block_filter()))
}

/// eth_newPendingTransactionFilter - Installs a filter over newly
/// submitted transaction hashes and returns its id
pub fn eth_new_pending_transaction_filter<B: ChainBackend>(
    node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(unstructure(&node.new_pending_transaction_filter()))
}

/// eth_uninstallFilter - Removes a filter and reports whether it
/// existed
pub fn eth_uninstall_filter<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: FilterIdArgs = structure_args(params)?;
    Ok(unstructure(&node.uninstall_filter(args.id)))
}

/// eth_getFilterChanges - Returns what a filter delivered since its
/// previous poll
pub fn eth_get_filter_changes<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: FilterIdArgs = structure_args(params)?;
    Ok(unstructure(&node.filter_changes(args.id)?))
}

/// eth_getFilterLogs - Returns the full matching window of a log filter
pub fn eth_get_filter_logs<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: FilterIdArgs = structure_args(params)?;
    Ok(unstructure(&node.filter_logs(args.id)?))
}

/// eth_getLogs - Returns the logs matching a one-shot query
pub fn eth_get_logs<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: GetLogsArgs = structure_args(params)?;
    Ok(unstructure(&node.logs(&args.filter)?))
}
