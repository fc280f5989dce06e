//! Block fixtures shared by the unit tests.

use archive_types::{Block, BlockId};

/// Creator key used by the fixtures.
pub(crate) const CREATOR: &str = "B62qcreator";

/// Number of global slots between two consecutive fixture heights.
pub(crate) const SLOTS_PER_HEIGHT: u64 = 10;

/// Builds a block created by [`CREATOR`] with a state hash derived from its id.
pub(crate) fn block(id: i64, parent: Option<i64>, height: u64) -> Block {
    Block {
        id: BlockId(id),
        parent_id: parent.map(BlockId),
        height,
        state_hash: format!("3NK{id}"),
        staking_ledger_hash: "jxLedger".to_string(),
        global_slot: height * SLOTS_PER_HEIGHT,
        global_slot_since_genesis: height * SLOTS_PER_HEIGHT,
        block_date_time: 1_615_940_000_000 + height * 180_000,
        creator_public_key: CREATOR.to_string(),
        winner_public_key: CREATOR.to_string(),
        receiver_public_key: Some(CREATOR.to_string()),
        coinbase: 720_000_000_000,
        fee_transfer_to_receiver: 0,
        fee_transfer_from_coinbase: 0,
        user_command_transaction_fees: 0,
    }
}

/// Builds blocks `from..=to` where each block's id equals its height and `from` has no parent.
pub(crate) fn linear_chain(from: u64, to: u64) -> Vec<Block> {
    (from..=to)
        .map(|height| {
            let id = height as i64;
            let parent = (height > from).then_some(id - 1);
            block(id, parent, height)
        })
        .collect()
}
