//! Network namespace RPC methods (net_*)

use serde_json::Value;

use alysis_chain::ChainBackend;
use alysis_codec::unstructure;
use alysis_node::Node;

use crate::error::JsonRpcError;

/// net_version - Returns the network id, which equals the chain id
pub fn net_version<B: ChainBackend>(
    node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    // A decimal string, unlike the hex quantity of eth_chainId.
    Ok(Value::String(node.chain_id().to_string()))
}

/// net_listening - Returns whether the client accepts connections;
/// the in-process chain is always reachable
pub fn net_listening<B: ChainBackend>(
    _node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(Value::Bool(true))
}

/// net_peerCount - Returns the number of connected peers; there is no
/// networking, so zero
pub fn net_peer_count<B: ChainBackend>(
    _node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(unstructure(&0u64))
}
