//! Block rows and chain links.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Opaque storage key of a block row in the archive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockId(pub i64);

/// The minimal projection of a block needed to walk parent links.
///
/// Links are what the store hands out for chain reconstruction, gap detection and
/// epoch bounds; full [`Block`] rows are only fetched for the final, creator scoped result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLink {
    /// Storage key of the block.
    pub id: BlockId,
    /// Storage key of the parent block, `None` for a genesis block.
    pub parent_id: Option<BlockId>,
    /// Height of the block.
    pub height: u64,
    /// Global slot the block was produced in.
    pub global_slot: u64,
}

impl BlockLink {
    /// Returns `true` if the block has no parent.
    pub const fn is_parentless(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A single imported block together with its derived reward amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Storage key of the block.
    pub id: BlockId,
    /// Storage key of the parent block.
    pub parent_id: Option<BlockId>,
    /// Height of the block.
    #[serde(rename = "blockHeight")]
    pub height: u64,
    /// Content identity of the block.
    pub state_hash: String,
    /// Hash of the staking ledger used for the block's epoch.
    pub staking_ledger_hash: String,
    /// Global slot the block was produced in.
    #[serde(rename = "slot")]
    pub global_slot: u64,
    /// Global slot counted from genesis.
    pub global_slot_since_genesis: u64,
    /// Block timestamp, milliseconds since the Unix epoch.
    pub block_date_time: u64,
    /// Public key of the block producer.
    pub creator_public_key: String,
    /// Public key of the slot winner.
    pub winner_public_key: String,
    /// Public key receiving the coinbase, if any coinbase was paid.
    pub receiver_public_key: Option<String>,
    /// Coinbase amount.
    #[serde(default)]
    pub coinbase: u64,
    /// Fee transfers paid to the coinbase receiver.
    #[serde(default)]
    pub fee_transfer_to_receiver: u64,
    /// Fee transfers paid out of the coinbase.
    #[serde(default)]
    pub fee_transfer_from_coinbase: u64,
    /// Fees from applied user commands.
    #[serde(default)]
    pub user_command_transaction_fees: u64,
}

impl Block {
    /// Returns the [`BlockLink`] projection of this block.
    pub const fn link(&self) -> BlockLink {
        BlockLink {
            id: self.id,
            parent_id: self.parent_id,
            height: self.height,
            global_slot: self.global_slot,
        }
    }
}

/// Lowest and highest height of a set of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightBounds {
    /// Lowest height.
    pub min: u64,
    /// Highest height.
    pub max: u64,
}

impl HeightBounds {
    /// Folds an iterator of heights into their bounds, `None` if it is empty.
    pub fn from_heights(heights: impl IntoIterator<Item = u64>) -> Option<Self> {
        heights.into_iter().fold(None, |acc, height| match acc {
            None => Some(Self { min: height, max: height }),
            Some(Self { min, max }) => Some(Self { min: min.min(height), max: max.max(height) }),
        })
    }
}
