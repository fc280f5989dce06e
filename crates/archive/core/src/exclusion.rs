//! Removal of blocks already handled by the settlement process.

use archive_storage::{ExclusionSource, StorageError};
use archive_types::{Block, ExclusionRecord};
use futures::TryStreamExt;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// The set of `(height, state_hash)` pairs found in an exclusion log.
///
/// Only the set of pairs matters: record order and duplicates in the log have no effect, and
/// filtering is idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionFilter {
    settled: HashMap<u64, HashSet<String>>,
}

impl ExclusionFilter {
    /// Reads every record of `log` into a new filter.
    pub async fn load<L>(log: &L) -> Result<Self, StorageError>
    where
        L: ExclusionSource + ?Sized,
    {
        let filter: Self = log
            .records()
            .try_fold(Self::default(), |mut filter, record| async move {
                filter.insert(record);
                Ok(filter)
            })
            .await?;

        debug!(target: "exclusion_filter", records = filter.len(), "Loaded exclusion log");
        Ok(filter)
    }

    /// Adds a record to the filter.
    pub fn insert(&mut self, record: ExclusionRecord) {
        self.settled.entry(record.height).or_default().insert(record.state_hash);
    }

    /// Returns `true` if both the height and the state hash of `block` match a record.
    pub fn is_excluded(&self, block: &Block) -> bool {
        self.settled
            .get(&block.height)
            .is_some_and(|hashes| hashes.contains(block.state_hash.as_str()))
    }

    /// Removes every excluded block from `blocks`, preserving the order of the rest.
    pub fn filter(&self, mut blocks: Vec<Block>) -> Vec<Block> {
        if !self.is_empty() {
            blocks.retain(|block| !self.is_excluded(block));
        }
        blocks
    }

    /// Returns the number of distinct records.
    pub fn len(&self) -> usize {
        self.settled.values().map(HashSet::len).sum()
    }

    /// Returns `true` if the filter excludes nothing.
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}

impl FromIterator<ExclusionRecord> for ExclusionFilter {
    fn from_iter<I: IntoIterator<Item = ExclusionRecord>>(iter: I) -> Self {
        let mut filter = Self::default();
        iter.into_iter().for_each(|record| filter.insert(record));
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::linear_chain;
    use archive_storage::{FileExclusionLog, MemoryExclusionLog};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn heights(blocks: &[Block]) -> Vec<u64> {
        blocks.iter().map(|block| block.height).collect()
    }

    #[test]
    fn test_empty_filter_is_noop() {
        let blocks = linear_chain(1, 5);

        let filtered = ExclusionFilter::default().filter(blocks.clone());

        assert_eq!(filtered, blocks);
    }

    #[test]
    fn test_requires_height_and_state_hash_to_match() {
        let blocks = linear_chain(1, 5);
        let filter: ExclusionFilter = [
            ExclusionRecord::new(2, "3NK2"),
            // Right hash, wrong height.
            ExclusionRecord::new(4, "3NK3"),
            // Right height, wrong hash.
            ExclusionRecord::new(5, "3NK4"),
        ]
        .into_iter()
        .collect();

        assert_eq!(heights(&filter.filter(blocks)), vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let blocks = linear_chain(1, 8);
        let filter: ExclusionFilter =
            [ExclusionRecord::new(3, "3NK3"), ExclusionRecord::new(8, "3NK8")].into_iter().collect();

        let once = filter.filter(blocks);
        let twice = filter.filter(once.clone());

        assert_eq!(once, twice);
        assert_eq!(heights(&once), vec![1, 2, 4, 5, 6, 7]);
    }

    #[test]
    fn test_record_order_and_duplicates_do_not_matter() {
        let records = vec![
            ExclusionRecord::new(1, "3NK1"),
            ExclusionRecord::new(4, "3NK4"),
            ExclusionRecord::new(4, "3NK4"),
            ExclusionRecord::new(6, "3NK6"),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        let forward: ExclusionFilter = records.into_iter().collect();
        let backward: ExclusionFilter = reversed.into_iter().collect();

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 3);
        assert_eq!(forward.filter(linear_chain(1, 6)), backward.filter(linear_chain(1, 6)));
    }

    #[tokio::test]
    async fn test_load_from_memory_log() {
        let log = MemoryExclusionLog::new([ExclusionRecord::new(2, "3NK2")]);

        let filter = ExclusionFilter::load(&log).await.unwrap();

        assert_eq!(heights(&filter.filter(linear_chain(1, 3))), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_load_from_absent_file() {
        let dir = TempDir::new().expect("create temp dir");
        let log = FileExclusionLog::new(dir.path().join(".paidblocks"));

        let filter = ExclusionFilter::load(&log).await.unwrap();

        assert!(filter.is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("create temp file");
        writeln!(file, "2|3NK2").unwrap();
        writeln!(file, "3|3NK3").unwrap();
        file.flush().unwrap();

        let filter = ExclusionFilter::load(&FileExclusionLog::new(file.path())).await.unwrap();

        assert_eq!(heights(&filter.filter(linear_chain(1, 4))), vec![1, 4]);
    }

    #[tokio::test]
    async fn test_load_propagates_malformed_record() {
        let mut file = NamedTempFile::new().expect("create temp file");
        writeln!(file, "2|3NK2").unwrap();
        writeln!(file, "x|3NK3").unwrap();
        file.flush().unwrap();

        let err = ExclusionFilter::load(&FileExclusionLog::new(file.path())).await.unwrap_err();

        assert!(matches!(err, StorageError::MalformedRecord { line: 2, .. }));
    }
}
