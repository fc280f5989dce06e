use archive_storage::StorageError;
use archive_types::BlockId;
use thiserror::Error;

/// Errors returned by the archive data provider.
///
/// None of these are retried internally; each carries enough detail for an operator to act on.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Walking the chain from the tip ran into inconsistent data.
    #[error(transparent)]
    ChainCorrupt(#[from] ChainCorruptError),

    /// The requested range has heights that were not imported yet.
    #[error(
        "archive is missing blocks in the requested range, import them and try again; missing heights: {missing:?}"
    )]
    ArchiveIncomplete {
        /// The heights with no canonical block.
        missing: Vec<u64>,
    },

    /// The requested range has breaks in chain continuity.
    #[error("archive has blocks with null parents in the requested range: {null_parents:?}")]
    ArchiveCorrupt {
        /// The heights of canonical blocks without a parent.
        null_parents: Vec<u64>,
    },

    /// A required configuration value is missing or invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The lower bound of a height range is above its upper bound.
    #[error("invalid height range: min {min} is greater than max {max}")]
    InvalidRange {
        /// Requested lower bound.
        min: u64,
        /// Requested upper bound.
        max: u64,
    },

    /// The underlying store or exclusion log failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Inconsistencies found while following parent links from the tip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainCorruptError {
    /// A parent is not strictly below its child. Every parent cycle contains such a link.
    #[error(
        "block {child} at height {child_height} has parent {parent} at height {parent_height}"
    )]
    NonDecreasingHeight {
        /// The child block.
        child: BlockId,
        /// Height of the child block.
        child_height: u64,
        /// The parent block.
        parent: BlockId,
        /// Height of the parent block.
        parent_height: u64,
    },
}

/// Errors in configuration values that are validated at the time of use.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The number of slots per epoch was not configured.
    #[error("number of slots per epoch is not configured")]
    MissingSlotsPerEpoch,

    /// The configured number of slots per epoch is not a positive integer.
    #[error("invalid number of slots per epoch: {0:?}")]
    InvalidSlotsPerEpoch(String),

    /// The slot window of the epoch does not fit in a `u64`.
    #[error("slot window of epoch {epoch} overflows with {slots_per_epoch} slots per epoch")]
    EpochOverflow {
        /// Requested epoch.
        epoch: u64,
        /// Configured number of slots per epoch.
        slots_per_epoch: u64,
    },
}
