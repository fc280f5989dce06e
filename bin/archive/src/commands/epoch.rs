//! `epoch-bounds` subcommand.

use crate::commands::print_json;
use archive_core::BlockDataProvider;
use clap::Args;

/// Prints the lowest and highest canonical heights of an epoch, `null` if it has no blocks.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub(crate) struct EpochBoundsCommand {
    /// The epoch to query.
    #[arg(long, short = 'e')]
    pub(crate) epoch: u64,
}

impl EpochBoundsCommand {
    /// Runs the subcommand.
    pub(crate) async fn run<P>(&self, provider: &P) -> anyhow::Result<()>
    where
        P: BlockDataProvider + Sync,
    {
        let bounds = provider.min_max_blocks_by_epoch(self.epoch).await?;
        print_json(&bounds)
    }
}
