//! Structuring JSON values into typed values

use bytes::Bytes;
use serde_json::Value;

use alysis_primitives::{Address, H256, U256};

use crate::error::{PathItem, StructuringError};

/// A type that can be built from a JSON value.
///
/// Structuring is driven by the target type, not by the shape of the
/// input: the same JSON string may become an address, a hash or a
/// quantity depending on what the caller asks for.
pub trait Structure: Sized {
    /// Build a value of this type from a JSON value
    fn structure(value: &Value) -> Result<Self, StructuringError>;
}

/// Structure a JSON value into the target type
pub fn structure<T: Structure>(value: &Value) -> Result<T, StructuringError> {
    T::structure(value)
}

/// Human-readable name of a JSON value kind, for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

const QUANTITY_MESSAGE: &str = "The value must be a 0x-prefixed hex-encoded integer";
const DATA_MESSAGE: &str = "The value must be a 0x-prefixed hex-encoded data";

/// Decode a `0x`-prefixed hex string into raw bytes
pub fn structure_hex_bytes(value: &Value) -> Result<Vec<u8>, StructuringError> {
    let digits = match value.as_str() {
        Some(s) if s.starts_with("0x") => &s[2..],
        _ => return Err(StructuringError::at_root(DATA_MESSAGE)),
    };
    hex::decode(digits).map_err(|e| StructuringError::at_root(e.to_string()))
}

fn quantity_digits(value: &Value) -> Result<&str, StructuringError> {
    match value.as_str() {
        Some(s) if s.starts_with("0x") => Ok(&s[2..]),
        _ => Err(StructuringError::at_root(QUANTITY_MESSAGE)),
    }
}

impl Structure for bool {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        value
            .as_bool()
            .ok_or_else(|| StructuringError::at_root("The value must be a boolean"))
    }
}

impl Structure for u64 {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let digits = quantity_digits(value)?;
        u64::from_str_radix(digits, 16).map_err(|_| StructuringError::at_root(QUANTITY_MESSAGE))
    }
}

impl Structure for U256 {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let digits = quantity_digits(value)?;
        U256::from_str_radix(digits, 16).map_err(|_| StructuringError::at_root(QUANTITY_MESSAGE))
    }
}

impl Structure for Bytes {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        Ok(Bytes::from(structure_hex_bytes(value)?))
    }
}

impl Structure for Address {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let bytes = structure_hex_bytes(value)?;
        if bytes.len() != Address::LEN {
            return Err(StructuringError::at_root("The value must encode 20 bytes"));
        }
        Address::from_slice(&bytes).map_err(|e| StructuringError::at_root(e.to_string()))
    }
}

impl Structure for H256 {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let bytes = structure_hex_bytes(value)?;
        if bytes.len() != H256::LEN {
            return Err(StructuringError::at_root("The value must encode 32 bytes"));
        }
        H256::from_slice(&bytes).map_err(|e| StructuringError::at_root(e.to_string()))
    }
}

impl<T: Structure> Structure for Option<T> {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        if value.is_null() {
            return Ok(None);
        }
        T::structure(value).map(Some)
    }
}

impl<T: Structure> Structure for Vec<T> {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let items = match value.as_array() {
            Some(items) => items,
            None => {
                return Err(StructuringError::at_root(format!(
                    "Cannot structure into a list from {}",
                    json_type_name(value)
                )))
            }
        };
        let mut result = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            result.push(T::structure(item).map_err(|e| e.nest(PathItem::Index(index)))?);
        }
        Ok(result)
    }
}

macro_rules! structure_tuple_impl {
    ($len:expr => $(($idx:tt, $ty_param:ident, $var:ident)),+) => {
        impl<$($ty_param: Structure),+> Structure for ($($ty_param,)+) {
            fn structure(value: &Value) -> Result<Self, StructuringError> {
                let items = match value.as_array() {
                    Some(items) => items,
                    None => {
                        return Err(StructuringError::at_root(format!(
                            "Cannot structure into a tuple from {}",
                            json_type_name(value)
                        )))
                    }
                };
                if items.len() < $len {
                    return Err(StructuringError::at_root(format!(
                        "Not enough elements to structure into a tuple: got {}, need {}",
                        items.len(),
                        $len
                    )));
                }
                if items.len() > $len {
                    return Err(StructuringError::at_root(format!(
                        "Too many elements to structure into a tuple: got {}, need {}",
                        items.len(),
                        $len
                    )));
                }

                let mut errors = Vec::new();
                $(
                    let $var: Option<$ty_param> =
                        match <$ty_param as Structure>::structure(&items[$idx]) {
                            Ok(parsed) => Some(parsed),
                            Err(err) => {
                                errors.push(err.nest(PathItem::Index($idx)));
                                None
                            }
                        };
                )+

                if errors.is_empty() {
                    if let ($(Some($var),)+) = ($($var,)+) {
                        return Ok(($($var,)+));
                    }
                }
                Err(StructuringError::group(
                    "Could not structure into a tuple",
                    errors,
                ))
            }
        }
    };
}

structure_tuple_impl!(1 => (0, A, a));
structure_tuple_impl!(2 => (0, A, a), (1, B, b));
structure_tuple_impl!(3 => (0, A, a), (1, B, b), (2, C, c));

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== Quantities ====================

    #[test]
    fn test_structure_u64() {
        let parsed: u64 = structure(&json!("0x10")).unwrap();
        assert_eq!(parsed, 16);

        let parsed: u64 = structure(&json!("0x0")).unwrap();
        assert_eq!(parsed, 0);
    }

    #[test]
    fn test_structure_u64_rejects_decimal_string() {
        let result: Result<u64, _> = structure(&json!("16"));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: The value must be a 0x-prefixed hex-encoded integer"
        );
    }

    #[test]
    fn test_structure_u64_rejects_json_number() {
        let result: Result<u64, _> = structure(&json!(16));
        assert!(result.is_err());
    }

    #[test]
    fn test_structure_u64_rejects_empty_digits() {
        let result: Result<u64, _> = structure(&json!("0x"));
        assert!(result.is_err());
    }

    #[test]
    fn test_structure_u64_rejects_overflow() {
        let result: Result<u64, _> = structure(&json!("0x10000000000000000"));
        assert!(result.is_err());
    }

    #[test]
    fn test_structure_u256() {
        let parsed: U256 = structure(&json!("0xde0b6b3a7640000")).unwrap();
        assert_eq!(parsed, U256::from(10u64).pow(U256::from(18u64)));
    }

    #[test]
    fn test_structure_u256_large() {
        let parsed: U256 =
            structure(&json!("0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"))
                .unwrap();
        assert_eq!(parsed, U256::MAX);
    }

    // ==================== Byte strings ====================

    #[test]
    fn test_structure_bytes() {
        let parsed: Bytes = structure(&json!("0xdeadbeef")).unwrap();
        assert_eq!(parsed.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_structure_bytes_empty() {
        let parsed: Bytes = structure(&json!("0x")).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_structure_bytes_rejects_missing_prefix() {
        let result: Result<Bytes, _> = structure(&json!("deadbeef"));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: The value must be a 0x-prefixed hex-encoded data"
        );
    }

    #[test]
    fn test_structure_bytes_rejects_odd_length() {
        let result: Result<Bytes, _> = structure(&json!("0xabc"));
        assert!(result.is_err());
    }

    #[test]
    fn test_structure_bytes_rejects_non_hex() {
        let result: Result<Bytes, _> = structure(&json!("0xzz"));
        assert!(result.is_err());
    }

    // ==================== Fixed-width types ====================

    #[test]
    fn test_structure_address() {
        let parsed: Address =
            structure(&json!("0x742d35cc6634c0532925a3b844bc9e7595f0ab3d")).unwrap();
        assert_eq!(parsed.to_hex(), "0x742d35cc6634c0532925a3b844bc9e7595f0ab3d");
    }

    #[test]
    fn test_structure_address_wrong_size() {
        // One byte short and one byte long
        let short = format!("0x{}", "11".repeat(19));
        let result: Result<Address, _> = structure(&json!(short));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: The value must encode 20 bytes"
        );

        let long = format!("0x{}", "11".repeat(21));
        let result: Result<Address, _> = structure(&json!(long));
        assert!(result.is_err());
    }

    #[test]
    fn test_structure_hash() {
        let parsed: H256 = structure(&json!(
            "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"
        ))
        .unwrap();
        assert!(!parsed.is_zero());
    }

    #[test]
    fn test_structure_hash_wrong_size() {
        let result: Result<H256, _> =
            structure(&json!("0x742d35cc6634c0532925a3b844bc9e7595f0ab3d"));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: The value must encode 32 bytes"
        );
    }

    // ==================== Booleans and nulls ====================

    #[test]
    fn test_structure_bool() {
        let parsed: bool = structure(&json!(true)).unwrap();
        assert!(parsed);

        let result: Result<bool, _> = structure(&json!("true"));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: The value must be a boolean"
        );
    }

    #[test]
    fn test_structure_option_null() {
        let parsed: Option<u64> = structure(&json!(null)).unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_structure_option_present() {
        let parsed: Option<u64> = structure(&json!("0x5")).unwrap();
        assert_eq!(parsed, Some(5));
    }

    // ==================== Lists ====================

    #[test]
    fn test_structure_list() {
        let parsed: Vec<u64> = structure(&json!(["0x1", "0x2", "0x3"])).unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);
    }

    #[test]
    fn test_structure_list_error_carries_index() {
        let result: Result<Vec<u64>, _> = structure(&json!(["0x1", "nope", "0x3"]));
        let err = result.unwrap_err();
        assert_eq!(err.path_str(), "1");
        assert_eq!(
            err.to_string(),
            "Failed to structure at `1`: The value must be a 0x-prefixed hex-encoded integer"
        );
    }

    #[test]
    fn test_structure_list_rejects_non_array() {
        let result: Result<Vec<u64>, _> = structure(&json!("0x1"));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: Cannot structure into a list from a string"
        );
    }

    // ==================== Tuples ====================

    #[test]
    fn test_structure_tuple_two() {
        let parsed: (u64, bool) = structure(&json!(["0x2a", false])).unwrap();
        assert_eq!(parsed, (42, false));
    }

    #[test]
    fn test_structure_tuple_not_enough() {
        let result: Result<(u64, bool), _> = structure(&json!(["0x2a"]));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: Not enough elements to structure into a tuple: got 1, need 2"
        );
    }

    #[test]
    fn test_structure_tuple_too_many() {
        let result: Result<(u64,), _> = structure(&json!(["0x2a", "0x1"]));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: Too many elements to structure into a tuple: got 2, need 1"
        );
    }

    #[test]
    fn test_structure_tuple_aggregates_errors() {
        let result: Result<(u64, bool), _> = structure(&json!(["nope", "still nope"]));
        let err = result.unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.starts_with("Failed to structure:"));
        assert!(rendered.contains("\n  <root>: Could not structure into a tuple"));
        assert!(rendered.contains("\n    0: The value must be a 0x-prefixed hex-encoded integer"));
        assert!(rendered.contains("\n    1: The value must be a boolean"));
    }

    #[test]
    fn test_structure_tuple_rejects_non_array() {
        let result: Result<(u64,), _> = structure(&json!({"a": 1}));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: Cannot structure into a tuple from an object"
        );
    }

    // ==================== Properties ====================

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn quantity_round_trip(n in any::<u64>()) {
                let rendered = format!("{:#x}", n);
                let parsed: u64 = structure(&json!(rendered)).unwrap();
                prop_assert_eq!(parsed, n);
            }

            #[test]
            fn bytes_round_trip(data in proptest::collection::vec(any::<u8>(), 0..64)) {
                let rendered = format!("0x{}", hex::encode(&data));
                let parsed: Bytes = structure(&json!(rendered)).unwrap();
                prop_assert_eq!(parsed.as_ref(), data.as_slice());
            }

            #[test]
            fn garbage_strings_never_panic(s in ".*") {
                let _ = <u64 as Structure>::structure(&json!(s.clone()));
                let _ = <Bytes as Structure>::structure(&json!(s.clone()));
                let _ = <Address as Structure>::structure(&json!(s));
            }
        }
    }
}
