//! Installable filters and one-shot log queries.
//!
//! A filter is a server-side cursor: each poll delivers what happened
//! since the previous one. Block filters deliver mined block hashes,
//! pending-transaction filters deliver transaction hashes waiting in the
//! pending block, log filters deliver matching log entries. Block
//! references in log criteria are resolved at query time, so `latest`
//! tracks the chain as it grows.

use std::collections::{BTreeMap, HashSet};

use alysis_chain::{ChainBackend, ChainError};
use alysis_primitives::H256;
use alysis_schema::{
    AddressFilter, BlockRef, FilterChanges, FilterParams, GetLogsFilter, LogEntry, Topics,
};

/// Registry of the filters installed on one chain instance.
///
/// Ids start at 1 and are never reused, so a stale id always fails
/// instead of silently reading someone else's cursor.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: BTreeMap<u64, Filter>,
    next_id: u64,
}

#[derive(Debug, Clone)]
enum Filter {
    Block {
        /// Number of the last delivered block.
        cursor: u64,
    },
    PendingTransactions {
        /// Hashes already delivered by earlier polls.
        delivered: HashSet<H256>,
    },
    Logs(LogFilter),
}

#[derive(Debug, Clone)]
struct LogFilter {
    from_block: BlockRef,
    to_block: BlockRef,
    address: Option<AddressFilter>,
    topics: Option<Topics>,
    /// Number of the last scanned block, `None` before the first
    /// delivering poll.
    cursor: Option<u64>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        FilterRegistry {
            filters: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn insert(&mut self, filter: Filter) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.filters.insert(id, filter);
        id
    }

    /// Install a filter delivering the hashes of newly mined blocks.
    pub fn install_block_filter(&mut self, backend: &impl ChainBackend) -> u64 {
        let id = self.insert(Filter::Block {
            cursor: backend.latest_block_number(),
        });
        tracing::debug!("Installed block filter {}", id);
        id
    }

    /// Install a filter delivering the hashes of newly submitted
    /// pending transactions.
    pub fn install_pending_transaction_filter(&mut self) -> u64 {
        let id = self.insert(Filter::PendingTransactions {
            delivered: HashSet::new(),
        });
        tracing::debug!("Installed pending transaction filter {}", id);
        id
    }

    /// Install a log filter. Without an explicit `from_block` the filter
    /// watches only blocks mined after installation.
    pub fn install_log_filter(&mut self, params: FilterParams, backend: &impl ChainBackend) -> u64 {
        let from_block = params
            .from_block
            .unwrap_or(BlockRef::Number(backend.latest_block_number() + 1));
        let id = self.insert(Filter::Logs(LogFilter {
            from_block,
            to_block: params.to_block.unwrap_or(BlockRef::Latest),
            address: params.address,
            topics: params.topics,
            cursor: None,
        }));
        tracing::debug!("Installed log filter {}", id);
        id
    }

    /// Remove a filter. Returns whether it existed.
    pub fn uninstall(&mut self, id: u64) -> bool {
        let removed = self.filters.remove(&id).is_some();
        if removed {
            tracing::debug!("Uninstalled filter {}", id);
        }
        removed
    }

    /// Deliver everything the filter has not delivered yet and advance
    /// its cursor.
    pub fn poll(
        &mut self,
        id: u64,
        backend: &impl ChainBackend,
    ) -> Result<FilterChanges, ChainError> {
        let filter = self
            .filters
            .get_mut(&id)
            .ok_or_else(|| filter_not_found(id))?;
        let latest = backend.latest_block_number();
        match filter {
            Filter::Block { cursor } => {
                let mut hashes = Vec::new();
                for number in (*cursor + 1)..=latest {
                    hashes.push(backend.block_hash(number)?);
                }
                *cursor = latest;
                Ok(FilterChanges::Hashes(hashes))
            }
            Filter::PendingTransactions { delivered } => {
                let mut hashes = Vec::new();
                for hash in backend.pending_transaction_hashes() {
                    if delivered.insert(hash) {
                        hashes.push(hash);
                    }
                }
                Ok(FilterChanges::Hashes(hashes))
            }
            Filter::Logs(log_filter) => {
                let from = resolve(log_filter.from_block, latest);
                let high = resolve(log_filter.to_block, latest).min(latest);
                let low = match log_filter.cursor {
                    None => from,
                    Some(cursor) => from.max(cursor + 1),
                };
                let logs = collect_logs(
                    backend,
                    low,
                    high,
                    &log_filter.address,
                    &log_filter.topics,
                )?;
                if high >= low {
                    log_filter.cursor = Some(high);
                }
                Ok(FilterChanges::Logs(logs))
            }
        }
    }

    /// Evaluate a log filter over its full window, regardless of how far
    /// polling has advanced its cursor.
    pub fn filter_logs(
        &self,
        id: u64,
        backend: &impl ChainBackend,
    ) -> Result<Vec<LogEntry>, ChainError> {
        let filter = self.filters.get(&id).ok_or_else(|| filter_not_found(id))?;
        match filter {
            Filter::Logs(log_filter) => {
                let latest = backend.latest_block_number();
                let low = resolve(log_filter.from_block, latest);
                let high = resolve(log_filter.to_block, latest).min(latest);
                collect_logs(backend, low, high, &log_filter.address, &log_filter.topics)
            }
            // Block and pending filters have no log window.
            _ => Err(filter_not_found(id)),
        }
    }
}

/// Answer a one-shot log query without installing anything.
///
/// Range endpoints default to `latest`; an unknown block hash is an
/// error rather than an empty result.
pub fn query_logs(
    filter: &GetLogsFilter,
    backend: &impl ChainBackend,
) -> Result<Vec<LogEntry>, ChainError> {
    match filter {
        GetLogsFilter::ByBlockHash(by_hash) => {
            let number = backend.block_number_by_hash(&by_hash.block_hash)?;
            let logs = backend
                .logs_in_block(number)?
                .into_iter()
                .filter(|log| log_passes(&by_hash.address, &by_hash.topics, log))
                .collect();
            Ok(logs)
        }
        GetLogsFilter::ByRange(by_range) => {
            let latest = backend.latest_block_number();
            let low = resolve(by_range.from_block.unwrap_or(BlockRef::Latest), latest);
            let high = resolve(by_range.to_block.unwrap_or(BlockRef::Latest), latest).min(latest);
            collect_logs(backend, low, high, &by_range.address, &by_range.topics)
        }
    }
}

fn filter_not_found(id: u64) -> ChainError {
    ChainError::FilterNotFound(format!("No filter found for filter id: {id}"))
}

/// Resolve a block reference against the current chain height. Log
/// matching never includes the pending block, so `pending` resolves to
/// one past `latest` and yields an empty window.
fn resolve(block: BlockRef, latest: u64) -> u64 {
    match block {
        BlockRef::Latest | BlockRef::Safe | BlockRef::Finalized => latest,
        BlockRef::Earliest => 0,
        BlockRef::Pending => latest + 1,
        BlockRef::Number(number) => number,
    }
}

fn log_passes(
    address: &Option<AddressFilter>,
    topics: &Option<Topics>,
    log: &LogEntry,
) -> bool {
    let address_passes = address
        .as_ref()
        .map_or(true, |address| address.matches(&log.address));
    let topics_pass = topics
        .as_ref()
        .map_or(true, |topics| topics.matches(&log.topics));
    address_passes && topics_pass
}

/// Matching logs of the mined blocks `low..=high`, in ascending
/// (block, transaction, log) order. An inverted range is empty.
fn collect_logs(
    backend: &impl ChainBackend,
    low: u64,
    high: u64,
    address: &Option<AddressFilter>,
    topics: &Option<Topics>,
) -> Result<Vec<LogEntry>, ChainError> {
    let mut logs = Vec::new();
    for number in low..=high {
        for log in backend.logs_in_block(number)? {
            if log_passes(address, topics, &log) {
                logs.push(log);
            }
        }
    }
    Ok(logs)
}
