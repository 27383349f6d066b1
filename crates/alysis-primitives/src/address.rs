//! Ethereum-compatible address type (20 bytes)

use std::fmt;

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use thiserror::Error;

/// Address parsing error
#[derive(Debug, Error)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Ethereum-compatible 20-byte address
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 20;

    /// Zero address (0x0000...0000)
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create address from bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Create address from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        if slice.len() != 20 {
            return Err(AddressError::InvalidLength(slice.len()));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Address(bytes))
    }

    /// Parse address from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get as byte slice
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Encodable for Address {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(&self.0);
    }
}

impl Decodable for Address {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let bytes: Vec<u8> = rlp.as_val()?;
        if bytes.len() != 20 {
            return Err(DecoderError::RlpInvalidLength);
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Address(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Basic functionality tests ====================

    #[test]
    fn test_address_from_hex() {
        let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        assert!(!addr.is_zero());

        let addr2 = Address::from_hex("742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        assert_eq!(addr, addr2);
    }

    #[test]
    fn test_zero_address() {
        let zero = Address::ZERO;
        assert!(zero.is_zero());
        assert_eq!(zero.to_hex(), "0x0000000000000000000000000000000000000000");
    }

    #[test]
    fn test_address_display() {
        let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        assert_eq!(
            format!("{}", addr),
            "0x742d35cc6634c0532925a3b844bc9e7595f0ab3d"
        );
    }

    #[test]
    fn test_address_debug() {
        let addr = Address::from_bytes([0x11; 20]);
        assert!(format!("{:?}", addr).starts_with("Address(0x"));
    }

    // ==================== Length boundary tests ====================

    #[test]
    fn test_address_from_slice_19_bytes() {
        let result = Address::from_slice(&[0u8; 19]);
        match result {
            Err(AddressError::InvalidLength(19)) => {}
            _ => panic!("Expected InvalidLength error"),
        }
    }

    #[test]
    fn test_address_from_slice_21_bytes() {
        let result = Address::from_slice(&[0u8; 21]);
        match result {
            Err(AddressError::InvalidLength(21)) => {}
            _ => panic!("Expected InvalidLength error"),
        }
    }

    #[test]
    fn test_address_from_hex_invalid_chars() {
        let result = Address::from_hex("0xzz2d35cc6634c0532925a3b844bc9e7595f0ab3d");
        match result {
            Err(AddressError::InvalidHex(_)) => {}
            _ => panic!("Expected InvalidHex error"),
        }
    }

    #[test]
    fn test_address_from_hex_only_prefix() {
        let result = Address::from_hex("0x");
        match result {
            Err(AddressError::InvalidLength(0)) => {}
            _ => panic!("Expected InvalidLength error"),
        }
    }

    // ==================== Conversion tests ====================

    #[test]
    fn test_address_hex_roundtrip() {
        let original = "0x742d35cc6634c0532925a3b844bc9e7595f0ab3d";
        let addr = Address::from_hex(original).unwrap();
        assert_eq!(addr.to_hex(), original);
    }

    #[test]
    fn test_address_from_array() {
        let bytes: [u8; 20] = [0x34; 20];
        let addr: Address = bytes.into();
        assert_eq!(addr.as_bytes(), &bytes);
    }

    #[test]
    fn test_address_as_ref() {
        let addr = Address::from_bytes([0x01; 20]);
        let slice: &[u8] = addr.as_ref();
        assert_eq!(slice.len(), 20);
    }

    // ==================== RLP tests ====================

    #[test]
    fn test_address_rlp_roundtrip() {
        let addr = Address::from_hex("0x742d35cc6634c0532925a3b844bc9e7595f0ab3d").unwrap();
        let encoded = rlp::encode(&addr);
        let decoded: Address = rlp::decode(&encoded).unwrap();
        assert_eq!(addr, decoded);
    }

    #[test]
    fn test_address_rlp_rejects_wrong_length() {
        let encoded = rlp::encode(&vec![0u8; 19]);
        let result: Result<Address, _> = rlp::decode(&encoded);
        assert!(result.is_err());
    }
}
