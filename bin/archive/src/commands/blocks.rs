//! `blocks` subcommand.

use crate::commands::print_json;
use archive_core::BlockDataProvider;
use clap::Args;
use tracing::info;

/// Prints the canonical, not yet settled blocks of a block producer in a height range.
#[derive(Args, Debug, Clone)]
pub(crate) struct BlocksCommand {
    /// Public key of the block producer.
    #[arg(long, short = 'k')]
    pub(crate) key: String,
    /// Lowest height of the range, inclusive.
    #[arg(long = "min")]
    pub(crate) min_height: u64,
    /// Highest height of the range, inclusive.
    #[arg(long = "max")]
    pub(crate) max_height: u64,
}

impl BlocksCommand {
    /// Runs the subcommand.
    pub(crate) async fn run<P>(&self, provider: &P) -> anyhow::Result<()>
    where
        P: BlockDataProvider + Sync,
    {
        let blocks = provider.blocks(&self.key, self.min_height, self.max_height).await?;
        info!(
            target: "archive_query",
            key = %self.key,
            min_height = self.min_height,
            max_height = self.max_height,
            blocks = blocks.len(),
            "Fetched blocks"
        );
        print_json(&blocks)
    }
}
