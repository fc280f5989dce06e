#![doc = "Command line queries against a block archive."]

use clap::Parser;

mod commands;
mod flags;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();
    cli.global.init_tracing()?;
    cli.run().await
}
