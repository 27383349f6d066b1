//! # alysis-node
//!
//! Typed node API for the Alysis testerchain.
//!
//! This crate provides:
//! - [`Node`](node::Node) - One method per RPC operation, with domain
//!   types at the boundary and auto-mining on by default
//! - [`FilterRegistry`](filters::FilterRegistry) - Installable block,
//!   pending-transaction and log filters with poll cursors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod filters;
pub mod node;

// Re-export commonly used types
pub use filters::{query_logs, FilterRegistry};
pub use node::{Node, CLIENT_VERSION};
