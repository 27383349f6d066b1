//! Request handler and method dispatcher

use std::collections::HashMap;

use serde_json::Value;

use alysis_chain::{ChainBackend, ChainConfig, LocalChain};
use alysis_node::Node;

use crate::error::JsonRpcError;
use crate::methods::{eth, net, web3};
use crate::types::{JsonRpcId, JsonRpcRequest, JsonRpcResponse};

/// Type alias for a method handler
pub type MethodFn<B> = Box<dyn Fn(&mut Node<B>, &[Value]) -> Result<Value, JsonRpcError>>;

/// Method registry for dispatching RPC calls
pub struct MethodRegistry<B: ChainBackend> {
    methods: HashMap<String, MethodFn<B>>,
}

impl<B: ChainBackend + 'static> Default for MethodRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ChainBackend + 'static> MethodRegistry<B> {
    /// Create a new method registry with all methods registered
    pub fn new() -> Self {
        let mut registry = Self {
            methods: HashMap::new(),
        };

        // Register eth_* methods
        registry.register("eth_accounts", eth::eth_accounts);
        registry.register("eth_blockNumber", eth::eth_block_number);
        registry.register("eth_call", eth::eth_call);
        registry.register("eth_chainId", eth::eth_chain_id);
        registry.register("eth_estimateGas", eth::eth_estimate_gas);
        registry.register("eth_gasPrice", eth::eth_gas_price);
        registry.register("eth_getBalance", eth::eth_get_balance);
        registry.register("eth_getBlockByHash", eth::eth_get_block_by_hash);
        registry.register("eth_getBlockByNumber", eth::eth_get_block_by_number);
        registry.register("eth_getCode", eth::eth_get_code);
        registry.register("eth_getFilterChanges", eth::eth_get_filter_changes);
        registry.register("eth_getFilterLogs", eth::eth_get_filter_logs);
        registry.register("eth_getLogs", eth::eth_get_logs);
        registry.register("eth_getStorageAt", eth::eth_get_storage_at);
        registry.register("eth_getTransactionByHash", eth::eth_get_transaction_by_hash);
        registry.register("eth_getTransactionCount", eth::eth_get_transaction_count);
        registry.register("eth_getTransactionReceipt", eth::eth_get_transaction_receipt);
        registry.register("eth_newBlockFilter", eth::eth_new_block_filter);
        registry.register("eth_newFilter", eth::eth_new_filter);
        registry.register(
            "eth_newPendingTransactionFilter",
            eth::eth_new_pending_transaction_filter,
        );
        registry.register("eth_sendRawTransaction", eth::eth_send_raw_transaction);
        registry.register("eth_uninstallFilter", eth::eth_uninstall_filter);

        // Register net_* methods
        registry.register("net_listening", net::net_listening);
        registry.register("net_peerCount", net::net_peer_count);
        registry.register("net_version", net::net_version);

        // Register web3_* methods
        registry.register("web3_clientVersion", web3::web3_client_version);
        registry.register("web3_sha3", web3::web3_sha3);

        registry
    }

    /// Register a method handler
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut Node<B>, &[Value]) -> Result<Value, JsonRpcError> + 'static,
    {
        self.methods.insert(name.to_string(), Box::new(handler));
    }

    /// Dispatch a method call
    pub fn dispatch(
        &self,
        node: &mut Node<B>,
        method: &str,
        params: &[Value],
    ) -> Result<Value, JsonRpcError> {
        match self.methods.get(method) {
            Some(handler) => handler(node, params),
            None => Err(JsonRpcError::method_not_found(method)),
        }
    }

    /// Check if a method is registered
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Get list of registered methods
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(|s| s.as_str()).collect()
    }
}

/// A node with a JSON-RPC front end.
///
/// Typed access stays available through [`node`](Self::node) and
/// [`node_mut`](Self::node_mut); the RPC surface is a thin JSON layer
/// over the same instance.
pub struct RpcNode<B: ChainBackend = LocalChain> {
    node: Node<B>,
    registry: MethodRegistry<B>,
}

impl RpcNode<LocalChain> {
    /// Create an RPC node over a fresh in-memory chain
    pub fn new(config: ChainConfig) -> Self {
        Self::with_node(Node::new(config))
    }
}

impl Default for RpcNode<LocalChain> {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl<B: ChainBackend + 'static> RpcNode<B> {
    /// Wrap an existing node
    pub fn with_node(node: Node<B>) -> Self {
        Self {
            node,
            registry: MethodRegistry::new(),
        }
    }

    /// The typed node underneath
    pub fn node(&self) -> &Node<B> {
        &self.node
    }

    /// The typed node underneath, mutably
    pub fn node_mut(&mut self) -> &mut Node<B> {
        &mut self.node
    }

    /// Call a method directly with positional parameters
    pub fn rpc(&mut self, method: &str, params: &[Value]) -> Result<Value, JsonRpcError> {
        tracing::debug!("Dispatching {}", method);
        self.registry.dispatch(&mut self.node, method, params)
    }

    /// Handle a decoded JSON-RPC request
    pub fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("invalid JSON-RPC version"),
            );
        }

        match self.rpc(&request.method, &request.params) {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(error) => JsonRpcResponse::error(request.id, error),
        }
    }

    /// Handle a raw JSON request string and render the response
    pub fn handle_raw(&mut self, input: &str) -> String {
        let response = match serde_json::from_str::<Value>(input) {
            Ok(value) => match serde_json::from_value::<JsonRpcRequest>(value) {
                Ok(request) => self.handle_request(request),
                Err(err) => JsonRpcResponse::error(
                    JsonRpcId::Null,
                    JsonRpcError::invalid_request(err.to_string()),
                ),
            },
            Err(_) => JsonRpcResponse::error(JsonRpcId::Null, JsonRpcError::parse_error()),
        };
        serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#
                .to_string()
        })
    }
}
