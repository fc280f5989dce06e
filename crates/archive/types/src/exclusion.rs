//! Records of blocks already handled by a downstream settlement process.

use serde::{Deserialize, Serialize};

/// A `(height, state_hash)` pair read from the exclusion log.
///
/// A block is excluded only when both fields match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRecord {
    /// Height of the settled block.
    pub height: u64,
    /// State hash of the settled block.
    pub state_hash: String,
}

impl ExclusionRecord {
    /// Creates a new [`ExclusionRecord`].
    pub fn new(height: u64, state_hash: impl Into<String>) -> Self {
        Self { height, state_hash: state_hash.into() }
    }
}
