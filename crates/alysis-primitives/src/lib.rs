//! # alysis-primitives
//!
//! Primitive types for the Alysis testerchain.
//!
//! This crate provides the fixed-width byte types used throughout the system.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;
