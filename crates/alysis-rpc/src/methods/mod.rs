//! RPC method handlers grouped by namespace

pub mod eth;
pub mod net;
pub mod web3;

use serde_json::Value;

use alysis_codec::Structure;

use crate::error::JsonRpcError;

/// Structure the positional parameter list into a method's argument
/// record. Missing and surplus positions surface as invalid-params
/// errors.
pub(crate) fn structure_args<T: Structure>(params: &[Value]) -> Result<T, JsonRpcError> {
    let combined = Value::Array(params.to_vec());
    Ok(alysis_codec::structure(&combined)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_code;

    // ==================== Argument structuring ====================

    #[test]
    fn test_structure_args_positional() {
        let params = vec![Value::String("0x10".into())];
        let parsed: (u64,) = structure_args(&params).unwrap();
        assert_eq!(parsed.0, 16);
    }

    #[test]
    fn test_structure_args_reports_invalid_params() {
        let params = vec![Value::String("nope".into())];
        let err = structure_args::<(u64,)>(&params).unwrap_err();
        assert_eq!(err.code, error_code::INVALID_PARAMS);
    }
}
