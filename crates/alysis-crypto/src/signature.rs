//! ECDSA signature operations using secp256k1

use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};

use alysis_primitives::{Address, H256};

use crate::{keccak256, CryptoError};

/// ECDSA signature with recovery parity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component (32 bytes, big-endian)
    pub r: [u8; 32],
    /// s component (32 bytes, big-endian)
    pub s: [u8; 32],
    /// y parity of the recovered point (0 or 1)
    pub y_parity: u8,
}

/// Public key on the secp256k1 curve
pub type PublicKey = VerifyingKey;

/// Private key (32 bytes)
pub type PrivateKey = SigningKey;

impl Signature {
    /// Create a signature from r, s and parity components
    pub fn new(r: [u8; 32], s: [u8; 32], y_parity: u8) -> Self {
        Signature { r, s, y_parity }
    }
}

/// Parse a private key from raw 32-byte scalar material
pub fn private_key_from_bytes(bytes: &[u8; 32]) -> Result<PrivateKey, CryptoError> {
    SigningKey::from_bytes(bytes.into()).map_err(|_| CryptoError::InvalidPrivateKey)
}

/// Sign a message hash with a private key, producing a low-s signature
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    // EIP-2: normalize s to the low half of the curve order,
    // flipping the parity bit when s changes
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => {
            let flipped = RecoveryId::try_from(recovery_id.to_byte() ^ 1)
                .map_err(|_| CryptoError::SigningFailed("recovery id out of range".to_string()))?;
            (normalized, flipped)
        }
        None => (signature, recovery_id),
    };

    Ok(Signature {
        r: signature.r().to_bytes().into(),
        s: signature.s().to_bytes().into(),
        y_parity: recovery_id.to_byte(),
    })
}

/// Recover the public key from a signature and a message hash
pub fn recover_public_key(
    message_hash: &H256,
    signature: &Signature,
) -> Result<PublicKey, CryptoError> {
    let r: k256::FieldBytes = signature.r.into();
    let s: k256::FieldBytes = signature.s.into();
    let k256_sig = K256Signature::from_scalars(r, s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let recovery_id = RecoveryId::try_from(signature.y_parity)
        .map_err(|_| CryptoError::InvalidRecoveryId(signature.y_parity))?;

    VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Recover the signer address from a signature and a message hash
pub fn recover_address(
    message_hash: &H256,
    signature: &Signature,
) -> Result<Address, CryptoError> {
    let public_key = recover_public_key(message_hash, signature)?;
    Ok(public_key_to_address(&public_key))
}

/// Derive the address from a public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    // Uncompressed public key is 65 bytes: 0x04 || x || y.
    // The address is the last 20 bytes of keccak256(x || y).
    let encoded = public_key.to_encoded_point(false);
    let bytes = encoded.as_bytes();

    let hash = keccak256(&bytes[1..]);

    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr_bytes)
}
