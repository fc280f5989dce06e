//! `stakes` subcommand.

use crate::commands::print_json;
use archive_core::StakeDataProvider;
use clap::Args;

/// Prints the stakes delegated to a block producer in a staking ledger.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub(crate) struct StakesCommand {
    /// Hash of the staking ledger.
    #[arg(long = "ledger-hash", short = 'l')]
    pub(crate) ledger_hash: String,
    /// Public key of the block producer.
    #[arg(long, short = 'k')]
    pub(crate) key: String,
}

impl StakesCommand {
    /// Runs the subcommand.
    pub(crate) async fn run<P>(&self, provider: &P) -> anyhow::Result<()>
    where
        P: StakeDataProvider + Sync,
    {
        let stakes = provider.stakes(&self.ledger_hash, &self.key).await?;
        print_json(&stakes)
    }
}
