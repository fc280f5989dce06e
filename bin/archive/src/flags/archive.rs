//! Archive connection and provider arguments.

use anyhow::Context as _;
use archive_core::{ArchiveConfig, ArchiveDataProvider, GenesisTolerance};
use archive_storage::{FileExclusionLog, PgArchiveStore};
use clap::Args;
use std::path::PathBuf;

/// The provider type served by the CLI.
pub(crate) type PgArchiveProvider = ArchiveDataProvider<PgArchiveStore, FileExclusionLog>;

/// Archive configuration arguments.
#[derive(Args, Debug, Clone)]
pub(crate) struct ArchiveArgs {
    /// PostgreSQL connection string of the archive database.
    #[arg(long = "database-url", env = "DATABASE_URL")]
    pub(crate) database_url: String,

    /// Maximum number of pooled database connections.
    #[arg(long = "db.max-connections", env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub(crate) max_connections: u32,

    /// Number of slots in an epoch. Only required by epoch queries.
    #[arg(long = "slots-per-epoch", env = "NUM_SLOTS_IN_EPOCH")]
    pub(crate) slots_per_epoch: Option<String>,

    /// Path to the log of already settled blocks, one `height|state_hash` record per line.
    #[arg(long = "exclusion-log", env = "EXCLUSION_LOG", default_value = "data/.paidblocks")]
    pub(crate) exclusion_log: PathBuf,

    /// Height allowed to be missing when a range starts at 0.
    #[arg(
        long = "genesis.missing-height",
        default_value_t = GenesisTolerance::DEFAULT_MISSING_HEIGHT
    )]
    pub(crate) genesis_missing_height: u64,

    /// Height of the parentless genesis block tolerated when a range starts at 0.
    #[arg(
        long = "genesis.null-parent-height",
        default_value_t = GenesisTolerance::DEFAULT_NULL_PARENT_HEIGHT
    )]
    pub(crate) genesis_null_parent_height: u64,
}

impl ArchiveArgs {
    /// Returns the [`ArchiveConfig`] described by the arguments.
    pub(crate) fn config(&self) -> ArchiveConfig {
        ArchiveConfig {
            slots_per_epoch: self.slots_per_epoch.clone(),
            genesis: GenesisTolerance {
                missing_height: self.genesis_missing_height,
                null_parent_height: self.genesis_null_parent_height,
            },
        }
    }

    /// Builds the archive data provider.
    ///
    /// The database is connected lazily, so this does not fail for an unreachable database.
    pub(crate) fn init_provider(&self) -> anyhow::Result<PgArchiveProvider> {
        let store = PgArchiveStore::connect_lazy(&self.database_url, self.max_connections)
            .context("Failed to configure archive database pool")?;
        let exclusions = FileExclusionLog::new(&self.exclusion_log);

        Ok(ArchiveDataProvider::new(store, exclusions, self.config()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        archive: ArchiveArgs,
    }

    #[test]
    fn test_defaults() {
        let cli =
            TestCli::try_parse_from(["test", "--database-url", "postgres://localhost/archive"])
                .unwrap();

        assert_eq!(cli.archive.max_connections, 5);
        assert_eq!(cli.archive.genesis_missing_height, 0);
        assert_eq!(cli.archive.genesis_null_parent_height, 1);
        assert_eq!(cli.archive.config().genesis, GenesisTolerance::default());
    }

    #[test]
    fn test_overrides() {
        let cli = TestCli::try_parse_from([
            "test",
            "--database-url",
            "postgres://localhost/archive",
            "--slots-per-epoch",
            "7140",
            "--exclusion-log",
            "/tmp/paid",
            "--genesis.missing-height",
            "1",
            "--genesis.null-parent-height",
            "2",
        ])
        .unwrap();

        let config = cli.archive.config();
        assert_eq!(config.slots_per_epoch.as_deref(), Some("7140"));
        assert_eq!(config.genesis, GenesisTolerance { missing_height: 1, null_parent_height: 2 });
        assert_eq!(cli.archive.exclusion_log, PathBuf::from("/tmp/paid"));
    }

    #[test]
    fn test_invalid_slots_per_epoch_is_accepted_at_parse_time() {
        let cli = TestCli::try_parse_from([
            "test",
            "--database-url",
            "postgres://localhost/archive",
            "--slots-per-epoch",
            "not-a-number",
        ])
        .unwrap();

        assert_eq!(cli.archive.config().slots_per_epoch.as_deref(), Some("not-a-number"));
    }
}
