//! Web3 namespace RPC methods (web3_*)

use bytes::Bytes;
use serde_json::Value;

use alysis_chain::ChainBackend;
use alysis_codec::{json_record, unstructure};
use alysis_node::Node;

use crate::error::JsonRpcError;
use crate::methods::structure_args;

json_record! {
    /// Positional parameters of `web3_sha3`
    struct Sha3Args {
        data: Bytes,
    }
}

/// web3_clientVersion - Returns the client version string
pub fn web3_client_version<B: ChainBackend>(
    node: &mut Node<B>,
    _params: &[Value],
) -> Result<Value, JsonRpcError> {
    Ok(Value::String(node.client_version().to_string()))
}

/// web3_sha3 - Returns the Keccak-256 digest of the given bytes
pub fn web3_sha3<B: ChainBackend>(
    node: &mut Node<B>,
    params: &[Value],
) -> Result<Value, JsonRpcError> {
    let args: Sha3Args = structure_args(params)?;
    Ok(unstructure(&node.keccak(&args.data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alysis_chain::{ChainConfig, LocalChain};
    use serde_json::json;

    use crate::error::error_code;

    fn test_node() -> Node<LocalChain> {
        Node::new(ChainConfig::default())
    }

    #[test]
    fn test_client_version() {
        let mut node = test_node();
        assert_eq!(
            web3_client_version(&mut node, &[]).unwrap(),
            json!("Alysis testerchain")
        );
    }

    #[test]
    fn test_sha3_of_hello_world() {
        let mut node = test_node();
        // "hello world"
        let params = vec![json!("0x68656c6c6f20776f726c64")];
        assert_eq!(
            web3_sha3(&mut node, &params).unwrap(),
            json!("0x47173285a8d7341e5e972fc677286384f802f8ef42a5ec5f03bbfa254cb01fad")
        );
    }

    #[test]
    fn test_sha3_of_empty_input() {
        let mut node = test_node();
        let params = vec![json!("0x")];
        assert_eq!(
            web3_sha3(&mut node, &params).unwrap(),
            json!("0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn test_sha3_rejects_bare_hex() {
        let mut node = test_node();
        let err = web3_sha3(&mut node, &[json!("68656c6c6f")]).unwrap_err();
        assert_eq!(err.code, error_code::INVALID_PARAMS);
    }
}
