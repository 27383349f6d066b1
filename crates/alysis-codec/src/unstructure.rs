//! Unstructuring typed values into JSON values

use bytes::Bytes;
use serde_json::Value;

use alysis_primitives::{Address, H256, U256};

/// A type that can be rendered as a JSON value.
///
/// Quantities become minimal `0x`-prefixed hex strings, byte strings
/// become `0x`-prefixed hex of their exact contents, and `None`
/// becomes JSON null.
pub trait Unstructure {
    /// Render this value as JSON
    fn unstructure(&self) -> Value;
}

/// Unstructure a typed value into JSON
pub fn unstructure<T: Unstructure>(value: &T) -> Value {
    value.unstructure()
}

impl Unstructure for bool {
    fn unstructure(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Unstructure for u64 {
    fn unstructure(&self) -> Value {
        Value::String(format!("{:#x}", self))
    }
}

impl Unstructure for U256 {
    fn unstructure(&self) -> Value {
        Value::String(format!("0x{:x}", self))
    }
}

impl Unstructure for Bytes {
    fn unstructure(&self) -> Value {
        Value::String(format!("0x{}", hex::encode(self)))
    }
}

impl Unstructure for Address {
    fn unstructure(&self) -> Value {
        Value::String(self.to_hex())
    }
}

impl Unstructure for H256 {
    fn unstructure(&self) -> Value {
        Value::String(self.to_hex())
    }
}

impl Unstructure for String {
    fn unstructure(&self) -> Value {
        Value::String(self.clone())
    }
}

impl<T: Unstructure> Unstructure for Option<T> {
    fn unstructure(&self) -> Value {
        match self {
            Some(inner) => inner.unstructure(),
            None => Value::Null,
        }
    }
}

impl<T: Unstructure> Unstructure for Vec<T> {
    fn unstructure(&self) -> Value {
        Value::Array(self.iter().map(Unstructure::unstructure).collect())
    }
}
