//! Log filter criteria

use serde_json::Value;

use alysis_codec::{json_record, Structure, StructuringError, Unstructure};
use alysis_primitives::{Address, H256};

use crate::BlockRef;

/// Addresses a log filter accepts: a single address or an OR-set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressFilter {
    /// Logs from exactly this address
    Single(Address),
    /// Logs from any of these addresses
    Many(Vec<Address>),
}

impl AddressFilter {
    /// Whether the given log address passes this filter
    pub fn matches(&self, address: &Address) -> bool {
        match self {
            AddressFilter::Single(single) => single == address,
            AddressFilter::Many(many) => many.contains(address),
        }
    }
}

impl Structure for AddressFilter {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let mut errors = Vec::new();
        match Address::structure(value) {
            Ok(single) => return Ok(AddressFilter::Single(single)),
            Err(err) => errors.push(err),
        }
        match Vec::<Address>::structure(value) {
            Ok(many) => return Ok(AddressFilter::Many(many)),
            Err(err) => errors.push(err),
        }
        Err(StructuringError::group(
            "Could not structure into any of the variants of AddressFilter",
            errors,
        ))
    }
}

impl Unstructure for AddressFilter {
    fn unstructure(&self) -> Value {
        match self {
            AddressFilter::Single(single) => single.unstructure(),
            AddressFilter::Many(many) => many.unstructure(),
        }
    }
}

/// Pattern for one topic position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Any topic passes
    Any,
    /// Exactly this topic
    Single(H256),
    /// Any of these topics
    OneOf(Vec<H256>),
}

impl Topic {
    /// Whether the given topic passes this pattern
    pub fn matches(&self, topic: &H256) -> bool {
        match self {
            Topic::Any => true,
            Topic::Single(single) => single == topic,
            Topic::OneOf(one_of) => one_of.contains(topic),
        }
    }
}

impl Structure for Topic {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        if value.is_null() {
            return Ok(Topic::Any);
        }
        let mut errors = Vec::new();
        match H256::structure(value) {
            Ok(single) => return Ok(Topic::Single(single)),
            Err(err) => errors.push(err),
        }
        match Vec::<H256>::structure(value) {
            Ok(one_of) => return Ok(Topic::OneOf(one_of)),
            Err(err) => errors.push(err),
        }
        Err(StructuringError::group(
            "Could not structure into any of the variants of Topic",
            errors,
        ))
    }
}

impl Unstructure for Topic {
    fn unstructure(&self) -> Value {
        match self {
            Topic::Any => Value::Null,
            Topic::Single(single) => single.unstructure(),
            Topic::OneOf(one_of) => one_of.unstructure(),
        }
    }
}

/// Positional topic patterns. A log has at most four topics, so at
/// most four positions can be constrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics(pub Vec<Topic>);

impl Topics {
    /// Whether the given log topics pass every constrained position.
    ///
    /// A non-wildcard pattern beyond the log's topic count never
    /// matches.
    pub fn matches(&self, topics: &[H256]) -> bool {
        self.0.iter().enumerate().all(|(i, pattern)| match pattern {
            Topic::Any => true,
            _ => topics.get(i).map_or(false, |topic| pattern.matches(topic)),
        })
    }
}

impl Structure for Topics {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        let topics = Vec::<Topic>::structure(value)?;
        if topics.len() > 4 {
            return Err(StructuringError::at_root(format!(
                "The value must contain at most 4 topics, got {}",
                topics.len()
            )));
        }
        Ok(Topics(topics))
    }
}

impl Unstructure for Topics {
    fn unstructure(&self) -> Value {
        self.0.unstructure()
    }
}

json_record! {
    /// Criteria of a log filter over a block range
    pub struct FilterParams {
        from_block: Option<BlockRef> = None,
        to_block: Option<BlockRef> = None,
        address: Option<AddressFilter> = None,
        topics: Option<Topics> = None,
    }
}

json_record! {
    /// Criteria of a log query over a single block
    pub struct FilterParamsByBlockHash {
        block_hash: H256,
        address: Option<AddressFilter> = None,
        topics: Option<Topics> = None,
    }
}

/// What a filter poll delivered: block or transaction hashes for
/// block and pending-transaction filters, log entries for log
/// filters. Renders as a plain JSON array either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChanges {
    /// Hashes delivered by a block or pending-transaction filter
    Hashes(Vec<H256>),
    /// Log entries delivered by a log filter
    Logs(Vec<crate::LogEntry>),
}

impl Unstructure for FilterChanges {
    fn unstructure(&self) -> Value {
        match self {
            FilterChanges::Hashes(hashes) => hashes.unstructure(),
            FilterChanges::Logs(logs) => logs.unstructure(),
        }
    }
}

/// Source selector for a one-shot log query: either a block range or
/// a single block identified by hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetLogsFilter {
    /// Match within exactly one block
    ByBlockHash(FilterParamsByBlockHash),
    /// Match over a resolved block range
    ByRange(FilterParams),
}

impl Structure for GetLogsFilter {
    fn structure(value: &Value) -> Result<Self, StructuringError> {
        // The range form accepts any object (every field has a
        // default), so the block hash form must be tried first.
        let mut errors = Vec::new();
        match FilterParamsByBlockHash::structure(value) {
            Ok(by_hash) => return Ok(GetLogsFilter::ByBlockHash(by_hash)),
            Err(err) => errors.push(err),
        }
        match FilterParams::structure(value) {
            Ok(by_range) => return Ok(GetLogsFilter::ByRange(by_range)),
            Err(err) => errors.push(err),
        }
        Err(StructuringError::group(
            "Could not structure into any of the variants of GetLogsFilter",
            errors,
        ))
    }
}

impl Unstructure for GetLogsFilter {
    fn unstructure(&self) -> Value {
        match self {
            GetLogsFilter::ByBlockHash(by_hash) => by_hash.unstructure(),
            GetLogsFilter::ByRange(by_range) => by_range.unstructure(),
        }
    }
}
