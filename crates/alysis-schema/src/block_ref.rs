//! Block references in requests

use std::fmt;

use serde_json::Value;

use alysis_codec::{Structure, StructuringError, Unstructure};

/// A reference to a block in a request: a well-known label or an
/// explicit block number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
    /// The most recently mined block
    Latest,
    /// The block currently being assembled
    Pending,
    /// Alias of `Latest` (there are no forks to be unsafe against)
    Safe,
    /// Alias of `Latest`
    Finalized,
    /// The genesis block
    Earliest,
    /// An explicit block number
    Number(u64),
}

impl Structure for BlockRef {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        if let Some(label) = value.as_str() {
            match label {
                "latest" => return Ok(BlockRef::Latest),
                "pending" => return Ok(BlockRef::Pending),
                "safe" => return Ok(BlockRef::Safe),
                "finalized" => return Ok(BlockRef::Finalized),
                "earliest" => return Ok(BlockRef::Earliest),
                _ => {}
            }
        }
        u64::structure(value).map(BlockRef::Number)
    }
}

impl Unstructure for BlockRef {
    fn unstructure(&self) -> Value {
        match self {
            BlockRef::Latest => Value::String("latest".to_string()),
            BlockRef::Pending => Value::String("pending".to_string()),
            BlockRef::Safe => Value::String("safe".to_string()),
            BlockRef::Finalized => Value::String("finalized".to_string()),
            BlockRef::Earliest => Value::String("earliest".to_string()),
            BlockRef::Number(number) => number.unstructure(),
        }
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Latest => write!(f, "latest"),
            BlockRef::Pending => write!(f, "pending"),
            BlockRef::Safe => write!(f, "safe"),
            BlockRef::Finalized => write!(f, "finalized"),
            BlockRef::Earliest => write!(f, "earliest"),
            BlockRef::Number(number) => write!(f, "{}", number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alysis_codec::structure;
    use serde_json::json;

    // ==================== Labels ====================

    #[test]
    fn test_block_ref_labels() {
        assert_eq!(
            structure::<BlockRef>(&json!("latest")).unwrap(),
            BlockRef::Latest
        );
        assert_eq!(
            structure::<BlockRef>(&json!("pending")).unwrap(),
            BlockRef::Pending
        );
        assert_eq!(structure::<BlockRef>(&json!("safe")).unwrap(), BlockRef::Safe);
        assert_eq!(
            structure::<BlockRef>(&json!("finalized")).unwrap(),
            BlockRef::Finalized
        );
        assert_eq!(
            structure::<BlockRef>(&json!("earliest")).unwrap(),
            BlockRef::Earliest
        );
    }

    // ==================== Numbers ====================

    #[test]
    fn test_block_ref_number() {
        assert_eq!(
            structure::<BlockRef>(&json!("0x10")).unwrap(),
            BlockRef::Number(16)
        );
        assert_eq!(
            structure::<BlockRef>(&json!("0x0")).unwrap(),
            BlockRef::Number(0)
        );
    }

    #[test]
    fn test_block_ref_rejects_unknown_label() {
        let result = structure::<BlockRef>(&json!("newest"));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to structure at `<root>`: The value must be a 0x-prefixed hex-encoded integer"
        );
    }

    #[test]
    fn test_block_ref_rejects_json_number() {
        assert!(structure::<BlockRef>(&json!(16)).is_err());
    }
}
