//! PostgreSQL backed block store over a Mina archive node schema.

use crate::{BlockStoreReader, StakeReader, StorageError};
use archive_types::{Block, BlockId, BlockLink, Stake};
use async_trait::async_trait;
use sqlx::{
    FromRow,
    postgres::{PgPool, PgPoolOptions},
};
use std::collections::HashSet;
use tracing::{error, trace};

const LATEST_HEIGHT_QUERY: &str = "SELECT MAX(height)::bigint AS height FROM blocks";

const BLOCK_LINKS_QUERY: &str = r#"
    SELECT
        id::bigint AS id,
        parent_id::bigint AS parent_id,
        height::bigint AS height,
        global_slot::bigint AS global_slot
    FROM blocks
    WHERE height <= $1
"#;

const BLOCKS_BY_CREATOR_QUERY: &str = r#"
    SELECT
        b.id::bigint AS id,
        b.parent_id::bigint AS parent_id,
        b.height::bigint AS height,
        b.state_hash AS state_hash,
        slh.value AS staking_ledger_hash,
        b.timestamp::bigint AS block_date_time,
        b.global_slot::bigint AS global_slot,
        b.global_slot_since_genesis::bigint AS global_slot_since_genesis,
        pkc.value AS creator_public_key,
        pkw.value AS winner_public_key,
        pk.value AS receiver_public_key,
        coalesce(bif.coinbase, 0)::bigint AS coinbase,
        coalesce(bif2.fee_transfer_to_receiver, 0)::bigint AS fee_transfer_to_receiver,
        coalesce(bif.fee_transfer_from_coinbase, 0)::bigint AS fee_transfer_from_coinbase,
        coalesce(btf.user_command_transaction_fees, 0)::bigint AS user_command_transaction_fees
    FROM blocks b
    INNER JOIN public_keys pkc ON b.creator_id = pkc.id
    INNER JOIN public_keys pkw ON b.block_winner_id = pkw.id
    INNER JOIN epoch_data ed ON b.staking_epoch_data_id = ed.id
    INNER JOIN snarked_ledger_hashes slh ON ed.ledger_hash_id = slh.id
    LEFT JOIN (
        SELECT
            bic.block_id,
            sum(CASE WHEN ic.type = 'coinbase' THEN coalesce(ic.fee::bigint, 0) ELSE 0 END) AS coinbase,
            sum(CASE WHEN ic.type = 'fee_transfer_via_coinbase' THEN coalesce(ic.fee::bigint, 0) ELSE 0 END)
                AS fee_transfer_from_coinbase,
            max(CASE WHEN ic.type = 'coinbase' THEN ic.receiver_id ELSE NULL END) AS coinbase_receiver_id
        FROM blocks_internal_commands bic
        INNER JOIN internal_commands ic ON bic.internal_command_id = ic.id
        GROUP BY bic.block_id
    ) bif ON b.id = bif.block_id
    LEFT JOIN public_keys pk ON pk.id = bif.coinbase_receiver_id
    LEFT JOIN (
        SELECT
            bic.block_id,
            sum(CASE WHEN ic.type = 'fee_transfer' THEN coalesce(ic.fee::bigint, 0) ELSE 0 END)
                AS fee_transfer_to_receiver,
            ic.receiver_id
        FROM blocks_internal_commands bic
        INNER JOIN internal_commands ic ON bic.internal_command_id = ic.id
        GROUP BY bic.block_id, ic.receiver_id
    ) bif2 ON b.id = bif2.block_id AND bif2.receiver_id = bif.coinbase_receiver_id
    LEFT JOIN (
        SELECT
            buc.block_id,
            sum(coalesce(uc.fee::bigint, 0)) AS user_command_transaction_fees
        FROM blocks_user_commands buc
        INNER JOIN user_commands uc ON buc.user_command_id = uc.id
        WHERE buc.status = 'applied'
        GROUP BY buc.block_id
    ) btf ON b.id = btf.block_id
    WHERE b.id = ANY($1)
    AND pkc.value = $2
    AND b.height >= $3
    AND b.height <= $4
"#;

// Staking ledgers are imported next to the archive, one row per account and ledger.
const STAKES_QUERY: &str = r#"
    SELECT
        public_key,
        balance::bigint AS stake,
        delegate
    FROM staking_ledgers
    WHERE ledger_hash = $1
    AND delegate = $2
    ORDER BY public_key
"#;

#[derive(Debug, FromRow)]
struct HeightRow {
    height: Option<i64>,
}

#[derive(Debug, FromRow)]
struct LinkRow {
    id: i64,
    parent_id: Option<i64>,
    height: i64,
    global_slot: i64,
}

#[derive(Debug, FromRow)]
struct BlockRow {
    id: i64,
    parent_id: Option<i64>,
    height: i64,
    state_hash: String,
    staking_ledger_hash: String,
    block_date_time: i64,
    global_slot: i64,
    global_slot_since_genesis: i64,
    creator_public_key: String,
    winner_public_key: String,
    receiver_public_key: Option<String>,
    coinbase: i64,
    fee_transfer_to_receiver: i64,
    fee_transfer_from_coinbase: i64,
    user_command_transaction_fees: i64,
}

#[derive(Debug, FromRow)]
struct StakeRow {
    public_key: String,
    stake: i64,
    delegate: String,
}

/// Converts a signed database column into an unsigned value.
fn unsigned(column: &'static str, value: i64) -> Result<u64, StorageError> {
    u64::try_from(value)
        .map_err(|_| StorageError::InvalidRow(format!("negative {column}: {value}")))
}

fn signed(value: u64) -> Result<i64, StorageError> {
    i64::try_from(value)
        .map_err(|_| StorageError::InvalidRow(format!("height out of range: {value}")))
}

impl TryFrom<LinkRow> for BlockLink {
    type Error = StorageError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BlockId(row.id),
            parent_id: row.parent_id.map(BlockId),
            height: unsigned("height", row.height)?,
            global_slot: unsigned("global_slot", row.global_slot)?,
        })
    }
}

impl TryFrom<BlockRow> for Block {
    type Error = StorageError;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BlockId(row.id),
            parent_id: row.parent_id.map(BlockId),
            height: unsigned("height", row.height)?,
            state_hash: row.state_hash,
            staking_ledger_hash: row.staking_ledger_hash,
            global_slot: unsigned("global_slot", row.global_slot)?,
            global_slot_since_genesis: unsigned(
                "global_slot_since_genesis",
                row.global_slot_since_genesis,
            )?,
            block_date_time: unsigned("timestamp", row.block_date_time)?,
            creator_public_key: row.creator_public_key,
            winner_public_key: row.winner_public_key,
            receiver_public_key: row.receiver_public_key,
            coinbase: unsigned("coinbase", row.coinbase)?,
            fee_transfer_to_receiver: unsigned(
                "fee_transfer_to_receiver",
                row.fee_transfer_to_receiver,
            )?,
            fee_transfer_from_coinbase: unsigned(
                "fee_transfer_from_coinbase",
                row.fee_transfer_from_coinbase,
            )?,
            user_command_transaction_fees: unsigned(
                "user_command_transaction_fees",
                row.user_command_transaction_fees,
            )?,
        })
    }
}

impl TryFrom<StakeRow> for Stake {
    type Error = StorageError;

    fn try_from(row: StakeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            stake: unsigned("balance", row.stake)?,
            public_key: row.public_key,
            delegate: row.delegate,
        })
    }
}

/// A [`BlockStoreReader`] and [`StakeReader`] over a PostgreSQL archive database.
#[derive(Debug, Clone)]
pub struct PgArchiveStore {
    pool: PgPool,
}

impl PgArchiveStore {
    /// Wraps an existing connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the archive database at `url` with at most `max_connections` connections.
    ///
    /// Connections are opened lazily, so an unreachable database surfaces on first query.
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect_lazy(url)?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl BlockStoreReader for PgArchiveStore {
    async fn latest_height(&self) -> Result<Option<u64>, StorageError> {
        let row = sqlx::query_as::<_, HeightRow>(LATEST_HEIGHT_QUERY)
            .fetch_one(&self.pool)
            .await
            .inspect_err(|err| {
                error!(target: "archive_storage", %err, "Failed to query latest height");
            })?;

        row.height.map(|height| unsigned("height", height)).transpose()
    }

    async fn block_links(&self, max_height: u64) -> Result<Vec<BlockLink>, StorageError> {
        let rows = sqlx::query_as::<_, LinkRow>(BLOCK_LINKS_QUERY)
            .bind(signed(max_height)?)
            .fetch_all(&self.pool)
            .await
            .inspect_err(|err| {
                error!(target: "archive_storage", max_height, %err, "Failed to query block links");
            })?;

        trace!(target: "archive_storage", max_height, links = rows.len(), "Fetched block links");
        rows.into_iter().map(BlockLink::try_from).collect()
    }

    async fn blocks_by_creator(
        &self,
        creator: &str,
        ids: &HashSet<BlockId>,
        min_height: u64,
        max_height: u64,
    ) -> Result<Vec<Block>, StorageError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();

        let rows = sqlx::query_as::<_, BlockRow>(BLOCKS_BY_CREATOR_QUERY)
            .bind(ids)
            .bind(creator)
            .bind(signed(min_height)?)
            .bind(signed(max_height)?)
            .fetch_all(&self.pool)
            .await
            .inspect_err(|err| {
                error!(
                    target: "archive_storage",
                    creator,
                    min_height,
                    max_height,
                    %err,
                    "Failed to query blocks by creator"
                );
            })?;

        rows.into_iter().map(Block::try_from).collect()
    }
}

#[async_trait]
impl StakeReader for PgArchiveStore {
    async fn stakes(&self, ledger_hash: &str, key: &str) -> Result<Vec<Stake>, StorageError> {
        let rows = sqlx::query_as::<_, StakeRow>(STAKES_QUERY)
            .bind(ledger_hash)
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .inspect_err(|err| {
                error!(target: "archive_storage", ledger_hash, key, %err, "Failed to query stakes");
            })?;

        trace!(target: "archive_storage", ledger_hash, key, stakes = rows.len(), "Fetched stakes");
        rows.into_iter().map(Stake::try_from).collect()
    }
}
