//! The archive data provider facade.

use crate::{
    ArchiveError, ChainResolver, EpochWindow, ExclusionFilter, GenesisTolerance, RangeValidator,
};
use archive_storage::{BlockStoreReader, ExclusionSource, StakeReader};
use archive_types::{Block, HeightBounds, Stakes};
use async_trait::async_trait;
use tracing::{debug, info};

/// Block queries served to payout calculations.
#[async_trait]
pub trait BlockDataProvider {
    /// Returns the highest imported height, `None` if the archive is empty.
    async fn latest_height(&self) -> Result<Option<u64>, ArchiveError>;

    /// Returns the canonical, not yet settled blocks created by `key` with a height in
    /// `[min_height, max_height]`, ordered by descending height.
    ///
    /// Fails if the range is not fully imported, even if `key` produced no blocks in it.
    async fn blocks(
        &self,
        key: &str,
        min_height: u64,
        max_height: u64,
    ) -> Result<Vec<Block>, ArchiveError>;

    /// Returns the lowest and highest canonical heights produced during `epoch`, `None` if no
    /// canonical block falls in the epoch.
    async fn min_max_blocks_by_epoch(
        &self,
        epoch: u64,
    ) -> Result<Option<HeightBounds>, ArchiveError>;
}

/// Staking ledger queries served to payout calculations.
#[async_trait]
pub trait StakeDataProvider {
    /// Returns the stakes delegated to `key` in the ledger identified by `ledger_hash`.
    async fn stakes(&self, ledger_hash: &str, key: &str) -> Result<Stakes, ArchiveError>;
}

/// Settings of an [`ArchiveDataProvider`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Number of slots per epoch as configured, validated when an epoch is queried.
    pub slots_per_epoch: Option<String>,
    /// Genesis boundary tolerance of the range validation.
    pub genesis: GenesisTolerance,
}

/// Serves [`BlockDataProvider`] and [`StakeDataProvider`] queries from a block store and an
/// exclusion log.
///
/// Holds no state between calls: the canonical chain and the exclusion log are re-read on
/// every query.
#[derive(Debug)]
pub struct ArchiveDataProvider<S, L> {
    store: S,
    exclusions: L,
    epochs: EpochWindow,
    validator: RangeValidator,
}

impl<S, L> ArchiveDataProvider<S, L> {
    /// Creates a new [`ArchiveDataProvider`].
    pub fn new(store: S, exclusions: L, config: ArchiveConfig) -> Self {
        #[cfg(feature = "metrics")]
        crate::metrics::Metrics::init();

        Self {
            store,
            exclusions,
            epochs: EpochWindow::new(config.slots_per_epoch),
            validator: RangeValidator::new(config.genesis),
        }
    }

    /// Returns the underlying block store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the exclusion log.
    pub const fn exclusions(&self) -> &L {
        &self.exclusions
    }
}

impl<S, L> ArchiveDataProvider<S, L>
where
    S: BlockStoreReader,
    L: ExclusionSource,
{
    async fn fetch_blocks(
        &self,
        key: &str,
        min_height: u64,
        max_height: u64,
    ) -> Result<Vec<Block>, ArchiveError> {
        if min_height > max_height {
            return Err(ArchiveError::InvalidRange { min: min_height, max: max_height });
        }

        let chain = ChainResolver::new(&self.store).resolve().await?;
        #[cfg(feature = "metrics")]
        crate::metrics::Metrics::record_chain_length(chain.len());

        let blocks =
            self.store.blocks_by_creator(key, chain.ids(), min_height, max_height).await?;

        // Completeness is a property of the chain, not of one creator's blocks.
        self.validator.validate(min_height, max_height, &chain)?;

        let found = blocks.len();
        let exclusions = ExclusionFilter::load(&self.exclusions).await?;
        let mut blocks = exclusions.filter(blocks);
        blocks.sort_unstable_by(|a, b| b.height.cmp(&a.height));

        #[cfg(feature = "metrics")]
        crate::metrics::Metrics::record_excluded(found - blocks.len());

        debug!(
            target: "archive_provider",
            key,
            min_height,
            max_height,
            found,
            excluded = found - blocks.len(),
            "Fetched blocks"
        );

        Ok(blocks)
    }

    async fn fetch_epoch_bounds(&self, epoch: u64) -> Result<Option<HeightBounds>, ArchiveError> {
        // Resolved before touching the store so a misconfiguration fails fast.
        let window = self.epochs.slot_window(epoch)?;

        let chain = ChainResolver::new(&self.store).resolve().await?;
        let bounds = HeightBounds::from_heights(
            chain
                .links()
                .iter()
                .filter(|link| window.contains(link.global_slot))
                .map(|link| link.height),
        );

        if bounds.is_none() {
            info!(
                target: "archive_provider",
                epoch,
                min_slot = window.min,
                max_slot = window.max,
                "No canonical blocks in epoch"
            );
        }

        Ok(bounds)
    }
}

#[async_trait]
impl<S, L> BlockDataProvider for ArchiveDataProvider<S, L>
where
    S: BlockStoreReader,
    L: ExclusionSource,
{
    async fn latest_height(&self) -> Result<Option<u64>, ArchiveError> {
        let result = self.store.latest_height().await.map_err(ArchiveError::from);
        #[cfg(feature = "metrics")]
        crate::metrics::Metrics::record_call("latest_height", &result);
        result
    }

    async fn blocks(
        &self,
        key: &str,
        min_height: u64,
        max_height: u64,
    ) -> Result<Vec<Block>, ArchiveError> {
        let result = self.fetch_blocks(key, min_height, max_height).await;
        #[cfg(feature = "metrics")]
        crate::metrics::Metrics::record_call("blocks", &result);
        result
    }

    async fn min_max_blocks_by_epoch(
        &self,
        epoch: u64,
    ) -> Result<Option<HeightBounds>, ArchiveError> {
        let result = self.fetch_epoch_bounds(epoch).await;
        #[cfg(feature = "metrics")]
        crate::metrics::Metrics::record_call("min_max_blocks_by_epoch", &result);
        result
    }
}

#[async_trait]
impl<S, L> StakeDataProvider for ArchiveDataProvider<S, L>
where
    S: StakeReader,
    L: Send + Sync,
{
    async fn stakes(&self, ledger_hash: &str, key: &str) -> Result<Stakes, ArchiveError> {
        let result = self
            .store
            .stakes(ledger_hash, key)
            .await
            .map(Stakes::from_iter)
            .map_err(ArchiveError::from);
        #[cfg(feature = "metrics")]
        crate::metrics::Metrics::record_call("stakes", &result);
        result
    }
}
