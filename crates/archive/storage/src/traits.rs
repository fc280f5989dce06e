use crate::StorageError;
use archive_types::{Block, BlockId, BlockLink, ExclusionRecord, Stake};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashSet;

/// A lazy, finite stream of exclusion records.
pub type ExclusionStream<'a> = BoxStream<'a, Result<ExclusionRecord, StorageError>>;

/// Read access to the imported block archive.
///
/// Implementations make no snapshot guarantees across calls: the archive may be written by an
/// external importer between any two reads.
#[async_trait]
pub trait BlockStoreReader: Send + Sync {
    /// Returns the highest height stored, or `None` if the archive is empty.
    async fn latest_height(&self) -> Result<Option<u64>, StorageError>;

    /// Returns the links of every stored block with a height of at most `max_height`.
    ///
    /// Blocks on abandoned forks are included; telling them apart is up to the caller.
    async fn block_links(&self, max_height: u64) -> Result<Vec<BlockLink>, StorageError>;

    /// Returns the full rows of blocks created by `creator` whose id is in `ids` and whose
    /// height lies in `[min_height, max_height]`.
    ///
    /// No ordering is guaranteed.
    async fn blocks_by_creator(
        &self,
        creator: &str,
        ids: &HashSet<BlockId>,
        min_height: u64,
        max_height: u64,
    ) -> Result<Vec<Block>, StorageError>;
}

/// Read access to staking ledgers.
#[async_trait]
pub trait StakeReader: Send + Sync {
    /// Returns the accounts of the ledger identified by `ledger_hash` that delegate to `key`.
    async fn stakes(&self, ledger_hash: &str, key: &str) -> Result<Vec<Stake>, StorageError>;
}

/// An append-only source of [`ExclusionRecord`]s.
///
/// Every call to [`ExclusionSource::records`] restarts from the beginning of the log. A log
/// that does not exist yet yields an empty stream.
pub trait ExclusionSource: Send + Sync {
    /// Streams every record currently in the log.
    fn records(&self) -> ExclusionStream<'_>;
}
