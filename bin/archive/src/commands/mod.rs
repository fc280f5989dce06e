//! Subcommands of the CLI.

use crate::flags::{ArchiveArgs, GlobalArgs};
use clap::{Parser, Subcommand};
use serde::Serialize;

mod latest;
pub(crate) use latest::LatestHeightCommand;

mod blocks;
pub(crate) use blocks::BlocksCommand;

mod epoch;
pub(crate) use epoch::EpochBoundsCommand;

mod stakes;
pub(crate) use stakes::StakesCommand;

/// Queries a block archive for payout calculations.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub(crate) subcommand: Commands,
    /// Global arguments.
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    /// Archive arguments.
    #[command(flatten)]
    pub(crate) archive: ArchiveArgs,
}

/// Subcommands for the CLI.
#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Commands {
    /// Prints the highest imported block height.
    #[command(alias = "latest")]
    LatestHeight(LatestHeightCommand),
    /// Prints the canonical, not yet settled blocks of a block producer.
    Blocks(BlocksCommand),
    /// Prints the lowest and highest canonical heights of an epoch.
    #[command(alias = "epoch")]
    EpochBounds(EpochBoundsCommand),
    /// Prints the stakes delegated to a block producer in a staking ledger.
    Stakes(StakesCommand),
}

impl Cli {
    /// Runs the subcommand.
    pub(crate) async fn run(self) -> anyhow::Result<()> {
        let provider = self.archive.init_provider()?;

        match self.subcommand {
            Commands::LatestHeight(cmd) => cmd.run(&provider).await,
            Commands::Blocks(cmd) => cmd.run(&provider).await,
            Commands::EpochBounds(cmd) => cmd.run(&provider).await,
            Commands::Stakes(cmd) => cmd.run(&provider).await,
        }
    }
}

/// Writes `value` to stdout as pretty printed JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
