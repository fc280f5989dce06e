//! Canonical chain reconstruction and integrity checks over an append-only block archive.
//!
//! The archive is populated by an external importer and may contain forks, gaps and blocks
//! that were imported without their ancestors. The [`ArchiveDataProvider`] resolves the
//! canonical chain from the current tip, verifies that a requested height range is fully
//! imported, and drops blocks a settlement process has already paid out before returning.

mod error;
pub use error::{ArchiveError, ChainCorruptError, ConfigurationError};

mod epoch;
pub use epoch::{EpochWindow, SlotWindow};

mod chain;
pub use chain::{CanonicalChain, ChainResolver};

mod validator;
pub use validator::{GenesisTolerance, RangeValidator};

mod exclusion;
pub use exclusion::ExclusionFilter;

mod provider;
pub use provider::{ArchiveConfig, ArchiveDataProvider, BlockDataProvider, StakeDataProvider};

#[cfg(feature = "metrics")]
mod metrics;

#[cfg(test)]
mod test_utils;
