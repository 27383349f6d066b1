//! # alysis-codec
//!
//! Hex-JSON structuring and unstructuring for the Alysis testerchain.
//!
//! This crate is the only place that knows about `0x`-hex encoding.
//! Structuring turns JSON values into typed values, driven by the
//! target type; unstructuring renders typed values back as JSON.
//! Failures carry the path from the JSON root to the offending value
//! and aggregate into printable error trees.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod record;
mod structure;
mod unstructure;

pub use error::{PathItem, StructuringError};
pub use record::to_camel_case;
pub use structure::{json_type_name, structure, structure_hex_bytes, Structure};
pub use unstructure::{unstructure, Unstructure};
