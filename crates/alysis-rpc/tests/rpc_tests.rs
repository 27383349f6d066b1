//! JSON-RPC integration tests against an in-memory chain.
//!
//! Every test talks to the node the way a client would: JSON envelopes
//! in, hex-encoded JSON out. Typed access is used only to arrange
//! scenarios (signing keys, manual mining).

use bytes::Bytes;
use serde_json::{json, Value};

use alysis_chain::{ChainConfig, DynamicFeeTx, LegacyTx, LocalChain, Transaction, TxSignature};
use alysis_crypto::sign;
use alysis_primitives::{Address, U256};
use alysis_rpc::{error_code, JsonRpcError, RpcNode};

// =============================================================================
// Test Helpers
// =============================================================================

const GWEI: u64 = 1_000_000_000;

fn rpc_node() -> RpcNode<LocalChain> {
    RpcNode::new(ChainConfig {
        genesis_timestamp: Some(1_700_000_000),
        ..ChainConfig::default()
    })
}

fn recipient() -> Address {
    Address::from_bytes([0x21; 20])
}

/// Hex quantity string back to a number
fn quantity(value: &Value) -> u64 {
    let digits = value.as_str().unwrap().strip_prefix("0x").unwrap();
    u64::from_str_radix(digits, 16).unwrap()
}

/// A signed type-2 transfer from the root account, hex-encoded
fn transfer_param(node: &RpcNode<LocalChain>, nonce: u64, to: Address, value: U256) -> Value {
    let transaction = Transaction::DynamicFee(DynamicFeeTx {
        chain_id: node.node().chain_id(),
        nonce,
        max_priority_fee_per_gas: U256::from(GWEI),
        max_fee_per_gas: node.node().gas_price(),
        gas: 21_000,
        to: Some(to),
        value,
        data: Bytes::new(),
        access_list: vec![],
    });
    sign_param(node, transaction)
}

/// A signed legacy transfer from the root account, hex-encoded
fn legacy_transfer_param(
    node: &RpcNode<LocalChain>,
    nonce: u64,
    to: Address,
    value: U256,
) -> Value {
    let transaction = Transaction::Legacy(LegacyTx {
        chain_id: Some(node.node().chain_id()),
        nonce,
        gas_price: node.node().gas_price(),
        gas: 21_000,
        to: Some(to),
        value,
        data: Bytes::new(),
    });
    sign_param(node, transaction)
}

fn sign_param(node: &RpcNode<LocalChain>, transaction: Transaction) -> Value {
    let signature = sign(&transaction.signing_hash(), node.node().root_private_key()).unwrap();
    let raw = transaction.encode_signed(&TxSignature::from(signature));
    json!(format!("0x{}", hex::encode(raw)))
}

fn expect_error(result: Result<Value, JsonRpcError>) -> JsonRpcError {
    result.expect_err("expected an RPC error")
}

// =============================================================================
// Envelope Handling
// =============================================================================

mod envelope {
    use super::*;

    #[test]
    fn test_chain_id_round_trip() {
        let mut node = rpc_node();
        let rendered =
            node.handle_raw(r#"{"jsonrpc":"2.0","id":1,"method":"eth_chainId","params":[]}"#);
        assert_eq!(rendered, r#"{"jsonrpc":"2.0","id":1,"result":"0x539"}"#);
    }

    #[test]
    fn test_string_ids_are_echoed() {
        let mut node = rpc_node();
        let rendered =
            node.handle_raw(r#"{"jsonrpc":"2.0","id":"req-9","method":"eth_blockNumber"}"#);
        let response: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(response["id"], json!("req-9"));
        assert_eq!(response["result"], json!("0x0"));
    }

    #[test]
    fn test_missing_id_defaults_to_null() {
        let mut node = rpc_node();
        let rendered = node.handle_raw(r#"{"jsonrpc":"2.0","method":"net_listening"}"#);
        let response: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["result"], json!(true));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let mut node = rpc_node();
        let rendered = node.handle_raw("{jsonrpc: nope");
        let response: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(response["error"]["code"], json!(-32700));
        assert_eq!(response["error"]["message"], json!("Parse error"));
    }

    #[test]
    fn test_non_request_json_is_invalid() {
        let mut node = rpc_node();
        let rendered = node.handle_raw(r#""eth_chainId""#);
        let response: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(response["error"]["code"], json!(-32600));
    }

    #[test]
    fn test_wrong_version_is_rejected() {
        let mut node = rpc_node();
        let rendered =
            node.handle_raw(r#"{"jsonrpc":"1.0","id":4,"method":"eth_chainId","params":[]}"#);
        let response: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(response["id"], json!(4));
        assert_eq!(response["error"]["code"], json!(-32600));
        assert_eq!(response["error"]["message"], json!("invalid JSON-RPC version"));
    }

    #[test]
    fn test_unknown_method() {
        let mut node = rpc_node();
        let err = expect_error(node.rpc("eth_getProof", &[]));
        assert_eq!(err.code, error_code::METHOD_NOT_FOUND);
        assert_eq!(err.message, "method not found: eth_getProof");
    }
}

// =============================================================================
// Chain and Client Information
// =============================================================================

mod chain_info {
    use super::*;

    #[test]
    fn test_client_version() {
        let mut node = rpc_node();
        assert_eq!(
            node.rpc("web3_clientVersion", &[]).unwrap(),
            json!("Alysis testerchain")
        );
    }

    #[test]
    fn test_net_version_and_chain_id_agree() {
        let mut node = rpc_node();
        assert_eq!(node.rpc("net_version", &[]).unwrap(), json!("1337"));
        assert_eq!(node.rpc("eth_chainId", &[]).unwrap(), json!("0x539"));
    }

    #[test]
    fn test_accounts_are_empty() {
        let mut node = rpc_node();
        assert_eq!(node.rpc("eth_accounts", &[]).unwrap(), json!([]));
    }

    #[test]
    fn test_net_endpoints_have_fixed_answers() {
        let mut node = rpc_node();
        assert_eq!(node.rpc("net_listening", &[]).unwrap(), json!(true));
        assert_eq!(node.rpc("net_peerCount", &[]).unwrap(), json!("0x0"));
    }

    #[test]
    fn test_gas_price_covers_the_pending_base_fee() {
        let mut node = rpc_node();
        // Pending base fee 875000000 plus the 1 gwei tip.
        assert_eq!(node.rpc("eth_gasPrice", &[]).unwrap(), json!("0x6fc23ac0"));
    }

    #[test]
    fn test_sha3_known_vector() {
        let mut node = rpc_node();
        assert_eq!(
            node.rpc("web3_sha3", &[json!("0x68656c6c6f20776f726c64")])
                .unwrap(),
            json!("0x47173285a8d7341e5e972fc677286384f802f8ef42a5ec5f03bbfa254cb01fad")
        );
    }
}

// =============================================================================
// Transfers
// =============================================================================

mod transfers {
    use super::*;

    #[test]
    fn test_dynamic_fee_transfer_lifecycle() {
        let mut node = rpc_node();
        let root = node.node().root_address().to_hex();

        let nonce = node
            .rpc("eth_getTransactionCount", &[json!(root), json!("pending")])
            .unwrap();
        assert_eq!(nonce, json!("0x0"));

        let raw = transfer_param(&node, 0, recipient(), U256::exp10(18));
        let hash = node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        assert_eq!(node.rpc("eth_blockNumber", &[]).unwrap(), json!("0x1"));

        let receipt = node
            .rpc("eth_getTransactionReceipt", &[hash.clone()])
            .unwrap();
        assert_eq!(receipt["status"], json!("0x1"));
        assert_eq!(receipt["blockNumber"], json!("0x1"));
        assert_eq!(receipt["transactionHash"], hash);
        assert_eq!(receipt["gasUsed"], json!("0x5208"));
        assert_eq!(receipt["from"], json!(node.node().root_address().to_hex()));
        assert_eq!(receipt["to"], json!(recipient().to_hex()));
        // min(max fee, tip + base fee) with base fee 875000000.
        assert_eq!(receipt["effectiveGasPrice"], json!("0x6fc23ac0"));

        let balance = node
            .rpc("eth_getBalance", &[json!(recipient().to_hex()), json!("latest")])
            .unwrap();
        assert_eq!(balance, json!("0xde0b6b3a7640000"));
    }

    #[test]
    fn test_sender_pays_value_plus_gas() {
        let mut node = rpc_node();
        let root = node.node().root_address().to_hex();

        let raw = transfer_param(&node, 0, recipient(), U256::exp10(18));
        node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        let fee = U256::from(21_000u64) * U256::from(1_875_000_000u64);
        let expected = U256::exp10(20) - U256::exp10(18) - fee;
        assert_eq!(
            node.rpc("eth_getBalance", &[json!(root), json!("latest")])
                .unwrap(),
            json!(format!("0x{:x}", expected))
        );
    }

    #[test]
    fn test_legacy_transfer() {
        let mut node = rpc_node();

        let raw = legacy_transfer_param(&node, 0, recipient(), U256::from(GWEI));
        let hash = node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        assert_eq!(
            node.rpc("eth_getBalance", &[json!(recipient().to_hex()), json!("latest")])
                .unwrap(),
            json!("0x3b9aca00")
        );

        let info = node.rpc("eth_getTransactionByHash", &[hash]).unwrap();
        assert_eq!(info["type"], json!("0x0"));
        assert_eq!(info["value"], json!("0x3b9aca00"));
    }

    #[test]
    fn test_mined_transaction_view() {
        let mut node = rpc_node();
        let root = node.node().root_address().to_hex();

        let raw = transfer_param(&node, 0, recipient(), U256::exp10(18));
        let hash = node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        let info = node.rpc("eth_getTransactionByHash", &[hash.clone()]).unwrap();
        assert_eq!(info["hash"], hash);
        assert_eq!(info["from"], json!(root));
        assert_eq!(info["to"], json!(recipient().to_hex()));
        assert_eq!(info["nonce"], json!("0x0"));
        assert_eq!(info["type"], json!("0x2"));
        assert_eq!(info["blockNumber"], json!("0x1"));
        assert_eq!(info["transactionIndex"], json!("0x0"));
        assert!(info["blockHash"].is_string());
    }

    #[test]
    fn test_pending_transaction_view() {
        let mut node = rpc_node();
        node.node_mut().set_auto_mine(false);
        let root = node.node().root_address().to_hex();

        let raw = transfer_param(&node, 0, recipient(), U256::exp10(18));
        let hash = node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        // Still in the pending block: no block hash, no index, no receipt.
        let info = node.rpc("eth_getTransactionByHash", &[hash.clone()]).unwrap();
        assert_eq!(info["blockHash"], Value::Null);
        assert_eq!(info["transactionIndex"], Value::Null);
        assert_eq!(info["blockNumber"], json!("0x1"));
        assert_eq!(
            node.rpc("eth_getTransactionReceipt", &[hash.clone()]).unwrap(),
            Value::Null
        );

        // The pending nonce moved, the mined one did not.
        assert_eq!(
            node.rpc("eth_getTransactionCount", &[json!(root.clone()), json!("pending")])
                .unwrap(),
            json!("0x1")
        );
        assert_eq!(
            node.rpc("eth_getTransactionCount", &[json!(root), json!("latest")])
                .unwrap(),
            json!("0x0")
        );

        node.node_mut().mine_block(None).unwrap();
        let receipt = node.rpc("eth_getTransactionReceipt", &[hash]).unwrap();
        assert_eq!(receipt["blockNumber"], json!("0x1"));
    }
}

// =============================================================================
// Blocks
// =============================================================================

mod blocks {
    use super::*;

    #[test]
    fn test_genesis_by_number_and_by_hash_agree() {
        let mut node = rpc_node();
        let by_number = node
            .rpc("eth_getBlockByNumber", &[json!("0x0"), json!(false)])
            .unwrap();
        let hash = by_number["hash"].clone();
        let by_hash = node
            .rpc("eth_getBlockByHash", &[hash, json!(false)])
            .unwrap();
        assert_eq!(by_number, by_hash);
    }

    #[test]
    fn test_latest_label_points_at_the_newest_mined_block() {
        let mut node = rpc_node();
        let raw = transfer_param(&node, 0, recipient(), U256::from(1u64));
        node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        let latest = node
            .rpc("eth_getBlockByNumber", &[json!("latest"), json!(false)])
            .unwrap();
        assert_eq!(latest["number"], json!("0x1"));
        assert!(latest["hash"].is_string());
    }

    #[test]
    fn test_pending_block_view() {
        let mut node = rpc_node();
        let pending = node
            .rpc("eth_getBlockByNumber", &[json!("pending"), json!(false)])
            .unwrap();
        assert_eq!(pending["number"], json!("0x1"));
        assert_eq!(pending["hash"], Value::Null);
        assert_eq!(pending["nonce"], Value::Null);
        assert_eq!(pending["miner"], Value::Null);
        assert_eq!(pending["logsBloom"], Value::Null);
    }

    #[test]
    fn test_unknown_block_number_is_null() {
        let mut node = rpc_node();
        assert_eq!(
            node.rpc("eth_getBlockByNumber", &[json!("0x7d0"), json!(false)])
                .unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_transactions_as_hashes_and_as_objects() {
        let mut node = rpc_node();
        let raw = transfer_param(&node, 0, recipient(), U256::from(1u64));
        let hash = node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        let with_hashes = node
            .rpc("eth_getBlockByNumber", &[json!("0x1"), json!(false)])
            .unwrap();
        assert_eq!(with_hashes["transactions"], json!([hash]));

        let with_objects = node
            .rpc("eth_getBlockByNumber", &[json!("0x1"), json!(true)])
            .unwrap();
        let transactions = with_objects["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["hash"], hash);
        assert_eq!(
            transactions[0]["from"],
            json!(node.node().root_address().to_hex())
        );
    }

    #[test]
    fn test_base_fee_decreases_under_empty_blocks() {
        let mut node = rpc_node();
        node.node_mut().mine_block(None).unwrap();

        let genesis = node
            .rpc("eth_getBlockByNumber", &[json!("0x0"), json!(false)])
            .unwrap();
        let block_one = node
            .rpc("eth_getBlockByNumber", &[json!("0x1"), json!(false)])
            .unwrap();
        assert_eq!(quantity(&genesis["baseFeePerGas"]), GWEI);
        assert_eq!(quantity(&block_one["baseFeePerGas"]), 875_000_000);
    }
}

// =============================================================================
// Filters
// =============================================================================

mod filters {
    use super::*;

    #[test]
    fn test_block_filter_delivers_each_hash_once() {
        let mut node = rpc_node();
        let id = node.rpc("eth_newBlockFilter", &[]).unwrap();

        for nonce in 0..2 {
            let raw = transfer_param(&node, nonce, recipient(), U256::from(1u64));
            node.rpc("eth_sendRawTransaction", &[raw]).unwrap();
        }

        let first = node
            .rpc("eth_getBlockByNumber", &[json!("0x1"), json!(false)])
            .unwrap();
        let second = node
            .rpc("eth_getBlockByNumber", &[json!("0x2"), json!(false)])
            .unwrap();

        let changes = node.rpc("eth_getFilterChanges", &[id.clone()]).unwrap();
        assert_eq!(changes, json!([first["hash"], second["hash"]]));
        assert_eq!(node.rpc("eth_getFilterChanges", &[id]).unwrap(), json!([]));
    }

    #[test]
    fn test_pending_transaction_filter() {
        let mut node = rpc_node();
        node.node_mut().set_auto_mine(false);
        let id = node.rpc("eth_newPendingTransactionFilter", &[]).unwrap();

        let raw = transfer_param(&node, 0, recipient(), U256::from(1u64));
        let hash = node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        assert_eq!(
            node.rpc("eth_getFilterChanges", &[id.clone()]).unwrap(),
            json!([hash])
        );
        assert_eq!(
            node.rpc("eth_getFilterChanges", &[id]).unwrap(),
            json!([])
        );
    }

    #[test]
    fn test_log_filter_stays_empty_without_logs() {
        let mut node = rpc_node();
        let id = node.rpc("eth_newFilter", &[json!({})]).unwrap();

        let raw = transfer_param(&node, 0, recipient(), U256::from(1u64));
        node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        assert_eq!(
            node.rpc("eth_getFilterChanges", &[id.clone()]).unwrap(),
            json!([])
        );
        assert_eq!(node.rpc("eth_getFilterLogs", &[id]).unwrap(), json!([]));
    }

    #[test]
    fn test_uninstall_semantics() {
        let mut node = rpc_node();
        let id = node.rpc("eth_newBlockFilter", &[]).unwrap();

        assert_eq!(node.rpc("eth_uninstallFilter", &[id.clone()]).unwrap(), json!(true));
        assert_eq!(node.rpc("eth_uninstallFilter", &[id.clone()]).unwrap(), json!(false));

        let err = expect_error(node.rpc("eth_getFilterChanges", &[id]));
        assert_eq!(err.code, error_code::FILTER_NOT_FOUND);
        assert_eq!(err.message, "No filter found for filter id: 1");
    }

    #[test]
    fn test_filter_logs_requires_a_log_filter() {
        let mut node = rpc_node();
        let id = node.rpc("eth_newBlockFilter", &[]).unwrap();
        let err = expect_error(node.rpc("eth_getFilterLogs", &[id]));
        assert_eq!(err.code, error_code::FILTER_NOT_FOUND);
    }

    #[test]
    fn test_get_logs_over_the_whole_chain() {
        let mut node = rpc_node();
        let raw = transfer_param(&node, 0, recipient(), U256::from(1u64));
        node.rpc("eth_sendRawTransaction", &[raw]).unwrap();

        let filter = json!({"fromBlock": "earliest", "toBlock": "latest"});
        assert_eq!(node.rpc("eth_getLogs", &[filter]).unwrap(), json!([]));
    }

    #[test]
    fn test_get_logs_by_unknown_block_hash() {
        let mut node = rpc_node();
        let filter = json!({
            "blockHash": format!("0x{}", "ee".repeat(32)),
        });
        let err = expect_error(node.rpc("eth_getLogs", &[filter]));
        assert_eq!(err.code, error_code::BLOCK_NOT_FOUND);
    }
}

// =============================================================================
// Error Handling
// =============================================================================

mod errors {
    use super::*;

    #[test]
    fn test_invalid_address() {
        let mut node = rpc_node();
        let err = expect_error(node.rpc(
            "eth_getBalance",
            &[json!("0x1234"), json!("latest")],
        ));
        assert_eq!(err.code, error_code::INVALID_PARAMS);
        assert!(err.message.contains("The value must encode 20 bytes"));
    }

    #[test]
    fn test_missing_positional_params() {
        let mut node = rpc_node();
        let err = expect_error(node.rpc("eth_getBalance", &[]));
        assert_eq!(err.code, error_code::INVALID_PARAMS);
        assert!(err.message.contains("Missing positional argument address"));
        assert!(err.message.contains("Missing positional argument block"));
    }

    #[test]
    fn test_surplus_params() {
        let mut node = rpc_node();
        let err = expect_error(node.rpc(
            "eth_getTransactionByHash",
            &[json!(format!("0x{}", "11".repeat(32))), json!("latest")],
        ));
        assert_eq!(err.code, error_code::INVALID_PARAMS);
        assert!(err.message.contains("Too many fields"));
    }

    #[test]
    fn test_state_queries_error_on_unknown_blocks() {
        let mut node = rpc_node();
        let root = node.node().root_address().to_hex();
        let err = expect_error(node.rpc("eth_getBalance", &[json!(root), json!("0x5")]));
        assert_eq!(err.code, error_code::BLOCK_NOT_FOUND);
        assert_eq!(err.message, "No block found for block number: 5");
    }

    #[test]
    fn test_nonce_mismatch_is_reported_verbatim() {
        let mut node = rpc_node();
        let raw = transfer_param(&node, 5, recipient(), U256::from(1u64));
        let err = expect_error(node.rpc("eth_sendRawTransaction", &[raw]));
        assert_eq!(err.code, error_code::INVALID_PARAMS);
        assert_eq!(
            err.message,
            "Invalid transaction: nonce 5 does not match the expected 0"
        );
    }

    #[test]
    fn test_chain_id_mismatch() {
        let mut node = rpc_node();
        let transaction = Transaction::DynamicFee(DynamicFeeTx {
            chain_id: 1,
            nonce: 0,
            max_priority_fee_per_gas: U256::from(GWEI),
            max_fee_per_gas: node.node().gas_price(),
            gas: 21_000,
            to: Some(recipient()),
            value: U256::from(1u64),
            data: Bytes::new(),
            access_list: vec![],
        });
        let raw = sign_param(&node, transaction);
        let err = expect_error(node.rpc("eth_sendRawTransaction", &[raw]));
        assert_eq!(
            err.message,
            "Invalid transaction: chain id mismatch: got 1, expected 1337"
        );
    }

    #[test]
    fn test_insufficient_balance() {
        let mut node = rpc_node();
        // More than the root account holds.
        let raw = transfer_param(&node, 0, recipient(), U256::exp10(21));
        let err = expect_error(node.rpc("eth_sendRawTransaction", &[raw]));
        assert_eq!(err.code, error_code::INVALID_PARAMS);
        assert!(err.message.contains("sender balance"));
    }

    #[test]
    fn test_undecodable_transaction() {
        let mut node = rpc_node();
        let err = expect_error(node.rpc("eth_sendRawTransaction", &[json!("0x00")]));
        assert_eq!(err.code, error_code::INVALID_PARAMS);
        assert!(err.message.contains("Could not decode transaction"));
    }
}
