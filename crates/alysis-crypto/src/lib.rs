//! # alysis-crypto
//!
//! Cryptographic primitives for the Alysis testerchain.
//!
//! - Keccak-256 hashing
//! - ECDSA signing over secp256k1 with recoverable signatures
//! - Sender recovery and address derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::CryptoError;
pub use hash::keccak256;
pub use signature::{
    private_key_from_bytes, public_key_to_address, recover_address, recover_public_key, sign,
    PrivateKey, PublicKey, Signature,
};
