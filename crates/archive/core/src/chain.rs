//! Canonical chain reconstruction.

use crate::{ArchiveError, ChainCorruptError};
use archive_storage::BlockStoreReader;
use archive_types::{BlockId, BlockLink};
use derive_more::Constructor;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, trace, warn};

/// The blocks reachable by following parent links backwards from the tip.
///
/// Derived on every call and never persisted; blocks on abandoned forks are not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalChain {
    /// Links in walk order, starting at the tip.
    links: Vec<BlockLink>,
    ids: HashSet<BlockId>,
}

impl CanonicalChain {
    /// Walks parent links from every block at `tip_height` down to a parentless block.
    ///
    /// If several blocks share the tip height, the union of their ancestries is returned. A
    /// parent id that is not among `links` ends the walk; the missing ancestors then show up
    /// as gaps.
    ///
    /// Every hop must land strictly below the current height, so a walk visits each link at
    /// most once and any parent cycle fails with [`ChainCorruptError::NonDecreasingHeight`].
    pub fn walk(links: &[BlockLink], tip_height: u64) -> Result<Self, ChainCorruptError> {
        let by_id: HashMap<BlockId, &BlockLink> = links.iter().map(|link| (link.id, link)).collect();

        let mut tips: Vec<&BlockLink> =
            by_id.values().copied().filter(|link| link.height == tip_height).collect();
        tips.sort_by_key(|link| link.id);

        let mut chain = Self::default();

        for tip in tips {
            let mut current = tip;
            loop {
                if !chain.ids.insert(current.id) {
                    // Joined the ancestry of a previously walked tip.
                    break;
                }
                chain.links.push(*current);

                let Some(parent_id) = current.parent_id else {
                    break;
                };
                let Some(parent) = by_id.get(&parent_id).copied() else {
                    warn!(
                        target: "chain_resolver",
                        block_id = %current.id,
                        height = current.height,
                        %parent_id,
                        "Parent block not found in archive, chain walk stops here"
                    );
                    break;
                };
                if parent.height >= current.height {
                    return Err(ChainCorruptError::NonDecreasingHeight {
                        child: current.id,
                        child_height: current.height,
                        parent: parent.id,
                        parent_height: parent.height,
                    });
                }
                current = parent;
            }
        }

        Ok(chain)
    }

    /// Returns the links of the chain in walk order, starting at the tip.
    pub fn links(&self) -> &[BlockLink] {
        &self.links
    }

    /// Returns the ids of all canonical blocks.
    pub const fn ids(&self) -> &HashSet<BlockId> {
        &self.ids
    }

    /// Returns `true` if the block with `id` is canonical.
    pub fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    /// Returns the number of canonical blocks.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if the chain has no blocks.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns the height of the tip, `None` for an empty chain.
    pub fn tip_height(&self) -> Option<u64> {
        self.links.first().map(|link| link.height)
    }

    /// Returns the canonical heights in `[min, max]`.
    pub fn heights_in(&self, min: u64, max: u64) -> BTreeSet<u64> {
        self.links
            .iter()
            .map(|link| link.height)
            .filter(|height| (min..=max).contains(height))
            .collect()
    }

    /// Returns the sorted heights of canonical parentless blocks in `[min, max]`.
    pub fn null_parent_heights_in(&self, min: u64, max: u64) -> Vec<u64> {
        let mut heights: Vec<u64> = self
            .links
            .iter()
            .filter(|link| link.is_parentless() && (min..=max).contains(&link.height))
            .map(|link| link.height)
            .collect();
        heights.sort_unstable();
        heights
    }
}

/// Resolves the [`CanonicalChain`] of a [`BlockStoreReader`].
#[derive(Debug, Constructor)]
pub struct ChainResolver<'a, S> {
    store: &'a S,
}

impl<S> ChainResolver<'_, S>
where
    S: BlockStoreReader,
{
    /// Fetches the current tip height and all links below it, then walks the chain.
    ///
    /// An empty archive resolves to an empty chain.
    pub async fn resolve(&self) -> Result<CanonicalChain, ArchiveError> {
        let Some(tip_height) = self.store.latest_height().await? else {
            debug!(target: "chain_resolver", "Archive is empty");
            return Ok(CanonicalChain::default());
        };

        let links = self.store.block_links(tip_height).await?;
        let chain = CanonicalChain::walk(&links, tip_height).inspect_err(|err| {
            warn!(target: "chain_resolver", tip_height, %err, "Canonical chain is corrupt");
        })?;

        trace!(
            target: "chain_resolver",
            tip_height,
            stored = links.len(),
            canonical = chain.len(),
            "Resolved canonical chain"
        );

        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{block, linear_chain};
    use archive_storage::MemoryBlockStore;
    use archive_types::Block;

    fn links(blocks: &[Block]) -> Vec<BlockLink> {
        blocks.iter().map(Block::link).collect()
    }

    fn sorted_ids(chain: &CanonicalChain) -> Vec<i64> {
        let mut ids: Vec<i64> = chain.ids().iter().map(|id| id.0).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_walk_linear_chain() {
        let blocks = linear_chain(1, 5);
        let chain = CanonicalChain::walk(&links(&blocks), 5).unwrap();

        assert_eq!(chain.len(), 5);
        assert_eq!(chain.tip_height(), Some(5));
        assert_eq!(
            chain.links().iter().map(|link| link.height).collect::<Vec<_>>(),
            vec![5, 4, 3, 2, 1]
        );
        assert_eq!(chain.null_parent_heights_in(0, 5), vec![1]);
    }

    #[test]
    fn test_walk_excludes_orphaned_fork() {
        let mut blocks = linear_chain(1, 6);
        // Two blocks at height 5, only block 5 leads to the tip.
        blocks.push(block(55, Some(4), 5));

        let chain = CanonicalChain::walk(&links(&blocks), 6).unwrap();

        assert!(chain.contains(&BlockId(5)));
        assert!(!chain.contains(&BlockId(55)));
        assert_eq!(sorted_ids(&chain), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_walk_unions_tips_at_same_height() {
        let mut blocks = linear_chain(1, 4);
        blocks.push(block(44, Some(3), 4));

        let chain = CanonicalChain::walk(&links(&blocks), 4).unwrap();

        assert_eq!(sorted_ids(&chain), vec![1, 2, 3, 4, 44]);
        assert_eq!(chain.len(), 5);
    }

    #[test]
    fn test_walk_stops_at_missing_parent() {
        let mut blocks = linear_chain(1, 3);
        blocks.push(block(5, Some(4), 5));
        blocks.push(block(6, Some(5), 6));

        let chain = CanonicalChain::walk(&links(&blocks), 6).unwrap();

        assert_eq!(sorted_ids(&chain), vec![5, 6]);
        assert!(chain.null_parent_heights_in(0, 6).is_empty());
    }

    #[test]
    fn test_walk_rejects_parent_cycle() {
        let blocks = vec![block(1, Some(2), 2), block(2, Some(1), 1)];

        let err = CanonicalChain::walk(&links(&blocks), 2).unwrap_err();

        assert_eq!(
            err,
            ChainCorruptError::NonDecreasingHeight {
                child: BlockId(2),
                child_height: 1,
                parent: BlockId(1),
                parent_height: 2,
            }
        );
    }

    #[test]
    fn test_walk_rejects_longer_parent_cycle() {
        // 4 -> 3 -> 2 -> 5 -> 4 never reaches a parentless block.
        let blocks = vec![
            block(4, Some(3), 4),
            block(3, Some(2), 3),
            block(2, Some(5), 2),
            block(5, Some(4), 1),
        ];

        let err = CanonicalChain::walk(&links(&blocks), 4).unwrap_err();

        assert_eq!(
            err,
            ChainCorruptError::NonDecreasingHeight {
                child: BlockId(5),
                child_height: 1,
                parent: BlockId(4),
                parent_height: 4,
            }
        );
    }

    #[test]
    fn test_walk_rejects_parent_at_same_height() {
        let blocks = vec![block(1, None, 3), block(2, Some(1), 3)];

        let err = CanonicalChain::walk(&links(&blocks), 3).unwrap_err();

        assert!(matches!(err, ChainCorruptError::NonDecreasingHeight { .. }));
    }

    #[test]
    fn test_heights_in_range() {
        let chain = CanonicalChain::walk(&links(&linear_chain(1, 10)), 10).unwrap();

        assert_eq!(chain.heights_in(3, 5).into_iter().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert!(chain.heights_in(11, 20).is_empty());
    }

    #[tokio::test]
    async fn test_resolve_empty_archive() {
        let store = MemoryBlockStore::new();

        let chain = ChainResolver::new(&store).resolve().await.unwrap();

        assert!(chain.is_empty());
        assert_eq!(chain.tip_height(), None);
    }

    #[tokio::test]
    async fn test_resolve_from_store() {
        let store = MemoryBlockStore::with_blocks(linear_chain(1, 8));
        store.insert(block(77, Some(6), 7));

        let chain = ChainResolver::new(&store).resolve().await.unwrap();

        assert_eq!(sorted_ids(&chain), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
