//! In-memory implementations of the storage traits.

use crate::{BlockStoreReader, ExclusionSource, ExclusionStream, StakeReader, StorageError};
use archive_types::{Block, BlockId, BlockLink, ExclusionRecord, Stake};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// A [`BlockStoreReader`] and [`StakeReader`] holding its rows in memory.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<Vec<Block>>,
    ledgers: RwLock<HashMap<String, Vec<Stake>>>,
}

impl MemoryBlockStore {
    /// Creates a new empty [`MemoryBlockStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `blocks`.
    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let store = Self::new();
        store.extend(blocks);
        store
    }

    /// Appends a single block.
    pub fn insert(&self, block: Block) {
        self.blocks.write().push(block);
    }

    /// Appends all `blocks`.
    pub fn extend(&self, blocks: impl IntoIterator<Item = Block>) {
        self.blocks.write().extend(blocks);
    }

    /// Adds a staking ledger account under `ledger_hash`.
    pub fn insert_stake(&self, ledger_hash: impl Into<String>, stake: Stake) {
        self.ledgers.write().entry(ledger_hash.into()).or_default().push(stake);
    }

    /// Returns the number of stored blocks.
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// Returns `true` if no block is stored.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl BlockStoreReader for MemoryBlockStore {
    async fn latest_height(&self) -> Result<Option<u64>, StorageError> {
        Ok(self.blocks.read().iter().map(|block| block.height).max())
    }

    async fn block_links(&self, max_height: u64) -> Result<Vec<BlockLink>, StorageError> {
        Ok(self
            .blocks
            .read()
            .iter()
            .filter(|block| block.height <= max_height)
            .map(Block::link)
            .collect())
    }

    async fn blocks_by_creator(
        &self,
        creator: &str,
        ids: &HashSet<BlockId>,
        min_height: u64,
        max_height: u64,
    ) -> Result<Vec<Block>, StorageError> {
        Ok(self
            .blocks
            .read()
            .iter()
            .filter(|block| {
                block.creator_public_key == creator &&
                    ids.contains(&block.id) &&
                    (min_height..=max_height).contains(&block.height)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StakeReader for MemoryBlockStore {
    async fn stakes(&self, ledger_hash: &str, key: &str) -> Result<Vec<Stake>, StorageError> {
        Ok(self
            .ledgers
            .read()
            .get(ledger_hash)
            .map(|accounts| {
                accounts.iter().filter(|stake| stake.delegate == key).cloned().collect()
            })
            .unwrap_or_default())
    }
}

/// An [`ExclusionSource`] backed by a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct MemoryExclusionLog {
    records: Vec<ExclusionRecord>,
}

impl MemoryExclusionLog {
    /// Creates a log containing `records`, in order.
    pub fn new(records: impl IntoIterator<Item = ExclusionRecord>) -> Self {
        Self { records: records.into_iter().collect() }
    }
}

impl ExclusionSource for MemoryExclusionLog {
    fn records(&self) -> ExclusionStream<'_> {
        stream::iter(self.records.iter().cloned().map(Ok)).boxed()
    }
}
