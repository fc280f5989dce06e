//! `latest-height` subcommand.

use crate::commands::print_json;
use archive_core::BlockDataProvider;
use clap::Args;
use serde_json::json;

/// Prints the highest imported block height, `null` for an empty archive.
#[derive(Args, Debug, Clone)]
pub(crate) struct LatestHeightCommand {}

impl LatestHeightCommand {
    /// Runs the subcommand.
    pub(crate) async fn run<P>(&self, provider: &P) -> anyhow::Result<()>
    where
        P: BlockDataProvider + Sync,
    {
        let height = provider.latest_height().await?;
        print_json(&json!({ "height": height }))
    }
}
