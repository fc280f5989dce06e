//! Global arguments for the CLI.

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Global arguments for the CLI.
#[derive(Parser, Default, Clone, Debug)]
pub(crate) struct GlobalArgs {
    /// Verbosity level, repeat to increase (-v info, -vv debug, -vvv trace).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub(crate) verbosity: u8,
}

impl GlobalArgs {
    /// Returns the default log level for the configured verbosity.
    pub(crate) const fn level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Installs the global tracing subscriber, writing to stderr.
    pub(crate) fn init_tracing(&self) -> anyhow::Result<()> {
        let filter = EnvFilter::builder()
            .with_default_directive(self.level().into())
            .from_env_lossy();

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["test"], LevelFilter::WARN)]
    #[case(&["test", "-v"], LevelFilter::INFO)]
    #[case(&["test", "-vv"], LevelFilter::DEBUG)]
    #[case(&["test", "-vvv"], LevelFilter::TRACE)]
    #[case(&["test", "-vvvvv"], LevelFilter::TRACE)]
    fn test_verbosity_level(#[case] args: &[&str], #[case] expected: LevelFilter) {
        let args = GlobalArgs::try_parse_from(args).unwrap();
        assert_eq!(args.level(), expected);
    }
}
