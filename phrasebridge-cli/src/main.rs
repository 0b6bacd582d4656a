//! phrasebridge — sync translation files between Phrase and an Azure DevOps repository.
//!
//! # Usage
//!
//! ```text
//! phrasebridge sync --direction push|pull [--remove-unmentioned-keys true] [--dry-run] [--json]
//! phrasebridge locales [--json]
//! phrasebridge diff
//! ```
//!
//! Every option can also come from the environment of a pipeline run
//! (`PHRASEAPP_TOKEN`, `PHRASE_SYNC_DIRECTION`, `SYSTEM_ACCESSTOKEN`, ...).

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, locales::LocalesArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "phrasebridge",
    version,
    about = "Push and pull Phrase translation files and open pull requests for updates",
    long_about = None,
)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Push the default locale to Phrase, or pull all locales and open a pull request.
    Sync(SyncArgs),

    /// List the locales of the configured Phrase project.
    Locales(LocalesArgs),

    /// Show unified diff of what a pull would write.
    Diff(DiffArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Sync(args) => args.run().await,
            Commands::Locales(args) => args.run().await,
            Commands::Diff(args) => args.run().await,
        }
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
