//! RPC error codes and the JSON-RPC error object

use serde::Serialize;
use serde_json::Value;

use alysis_chain::ChainError;
use alysis_codec::StructuringError;

/// JSON-RPC 2.0 error codes, including the Ethereum-specific ones.
pub mod error_code {
    /// Parse error: invalid JSON was received
    pub const PARSE_ERROR: i64 = -32700;
    /// Invalid request: the JSON is not a valid request object
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i64 = -32603;

    // Ethereum-specific error codes
    /// Requested block does not exist
    pub const BLOCK_NOT_FOUND: i64 = -32001;
    /// Requested transaction does not exist
    pub const TRANSACTION_NOT_FOUND: i64 = -32002;
    /// Requested filter does not exist
    pub const FILTER_NOT_FOUND: i64 = -32003;
    /// Execution reverted; `data` carries the revert payload
    pub const EXECUTION_REVERTED: i64 = 3;
    /// Execution failed before producing a result
    pub const EXECUTION_FAILED: i64 = -32015;
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Optional additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new JSON-RPC error
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error with additional data
    pub fn with_data(code: i64, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error
    pub fn parse_error() -> Self {
        Self::new(error_code::PARSE_ERROR, "Parse error")
    }

    /// Invalid request
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_REQUEST, message)
    }

    /// Method not found
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_code::METHOD_NOT_FOUND,
            format!("method not found: {}", method),
        )
    }

    /// Invalid params
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_PARAMS, message)
    }

    /// Internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_code::INTERNAL_ERROR, message)
    }
}

impl From<ChainError> for JsonRpcError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Validation(message) => Self::invalid_params(message),
            ChainError::BlockNotFound(message) => Self::new(error_code::BLOCK_NOT_FOUND, message),
            ChainError::TransactionNotFound(message) => {
                Self::new(error_code::TRANSACTION_NOT_FOUND, message)
            }
            ChainError::FilterNotFound(message) => {
                Self::new(error_code::FILTER_NOT_FOUND, message)
            }
            ChainError::TransactionFailed(message) => {
                Self::new(error_code::EXECUTION_FAILED, message)
            }
            ChainError::TransactionReverted(payload) => {
                let data = format!("0x{}", hex::encode(&payload));
                Self::with_data(
                    error_code::EXECUTION_REVERTED,
                    format!("execution reverted: {}", data),
                    Value::String(data),
                )
            }
        }
    }
}

impl From<StructuringError> for JsonRpcError {
    fn from(err: StructuringError) -> Self {
        Self::invalid_params(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    // ==================== Error codes ====================

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code::PARSE_ERROR, -32700);
        assert_eq!(error_code::INVALID_REQUEST, -32600);
        assert_eq!(error_code::METHOD_NOT_FOUND, -32601);
        assert_eq!(error_code::INVALID_PARAMS, -32602);
        assert_eq!(error_code::INTERNAL_ERROR, -32603);
        assert_eq!(error_code::BLOCK_NOT_FOUND, -32001);
        assert_eq!(error_code::TRANSACTION_NOT_FOUND, -32002);
        assert_eq!(error_code::FILTER_NOT_FOUND, -32003);
        assert_eq!(error_code::EXECUTION_REVERTED, 3);
        assert_eq!(error_code::EXECUTION_FAILED, -32015);
    }

    // ==================== Construction ====================

    #[test]
    fn test_new_carries_code_and_message() {
        let err = JsonRpcError::new(-32000, "custom error");
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "custom error");
        assert!(err.data.is_none());
    }

    #[test]
    fn test_parse_error() {
        let err = JsonRpcError::parse_error();
        assert_eq!(err.code, error_code::PARSE_ERROR);
        assert_eq!(err.message, "Parse error");
    }

    #[test]
    fn test_method_not_found_names_the_method() {
        let err = JsonRpcError::method_not_found("eth_unknown");
        assert_eq!(err.code, error_code::METHOD_NOT_FOUND);
        assert_eq!(err.message, "method not found: eth_unknown");
    }

    // ==================== Chain error mapping ====================

    #[test]
    fn test_validation_maps_to_invalid_params() {
        let err: JsonRpcError =
            ChainError::validation("Invalid transaction: chain id mismatch: got 1, expected 1337")
                .into();
        assert_eq!(err.code, error_code::INVALID_PARAMS);
        assert_eq!(
            err.message,
            "Invalid transaction: chain id mismatch: got 1, expected 1337"
        );
    }

    #[test]
    fn test_not_found_variants_keep_their_messages() {
        let err: JsonRpcError =
            ChainError::BlockNotFound("No block found for block number: 7".into()).into();
        assert_eq!(err.code, error_code::BLOCK_NOT_FOUND);
        assert_eq!(err.message, "No block found for block number: 7");

        let err: JsonRpcError =
            ChainError::TransactionNotFound("No transaction found for transaction hash: 0x11"
                .into())
            .into();
        assert_eq!(err.code, error_code::TRANSACTION_NOT_FOUND);

        let err: JsonRpcError =
            ChainError::FilterNotFound("No filter found for filter id: 3".into()).into();
        assert_eq!(err.code, error_code::FILTER_NOT_FOUND);
        assert_eq!(err.message, "No filter found for filter id: 3");
    }

    #[test]
    fn test_reverted_carries_payload_as_data() {
        let err: JsonRpcError =
            ChainError::TransactionReverted(Bytes::from(vec![0x08, 0xc3, 0x79, 0xa0])).into();
        assert_eq!(err.code, error_code::EXECUTION_REVERTED);
        assert_eq!(err.message, "execution reverted: 0x08c379a0");
        assert_eq!(err.data, Some(Value::String("0x08c379a0".into())));
    }

    #[test]
    fn test_reverted_empty_payload() {
        let err: JsonRpcError = ChainError::TransactionReverted(Bytes::new()).into();
        assert_eq!(err.message, "execution reverted: 0x");
        assert_eq!(err.data, Some(Value::String("0x".into())));
    }

    #[test]
    fn test_failed_maps_to_execution_failed() {
        let err: JsonRpcError = ChainError::TransactionFailed("The transaction ran out of gas"
            .into())
        .into();
        assert_eq!(err.code, error_code::EXECUTION_FAILED);
    }

    #[test]
    fn test_structuring_error_maps_to_invalid_params() {
        let result: Result<alysis_primitives::Address, _> =
            alysis_codec::structure(&Value::String("0x12".into()));
        let err: JsonRpcError = result.unwrap_err().into();
        assert_eq!(err.code, error_code::INVALID_PARAMS);
        assert_eq!(
            err.message,
            "Failed to structure at `<root>`: The value must encode 20 bytes"
        );
    }

    // ==================== Serialization ====================

    #[test]
    fn test_serialize_without_data_omits_the_field() {
        let err = JsonRpcError::invalid_params("test");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":-32602"));
        assert!(json.contains("\"message\":\"test\""));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_serialize_with_data_keeps_the_field() {
        let err = JsonRpcError::with_data(3, "execution reverted: 0xff", Value::String("0xff".into()));
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"data\":\"0xff\""));
    }
}
