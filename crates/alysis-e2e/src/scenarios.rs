//! End-to-end scenarios.
//!
//! Each test walks the node through a complete client workflow over the
//! JSON-RPC surface: identity queries, transfers with receipts, filter
//! polling, and log queries over scripted histories.
