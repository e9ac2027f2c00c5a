//! Devkit keeps shared developer tooling in sync across projects.

use std::io;

use color_eyre::{Result, Section};
use tracing::{instrument, level_filters::LevelFilter};

mod cmd;

use clap::{Parser, Subcommand};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Devkit keeps shared developer tooling in sync across projects.
#[derive(Parser)]
#[command(author, version = env!("DEVKIT_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the AI-assistant instructions in CLAUDE.md.
    Claude(cmd::claude::Config),
}

#[instrument]
fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Devkit prints its own reports to stdout, so by default only errors are
    // logged; raise the level with `DEVKIT_LOG` when debugging.
    //
    // Examples:
    // - `DEVKIT_LOG=debug` to see which regions were updated or preserved
    // - `DEVKIT_LOG=trace` to see every parsed region
    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(
            fmt::layer()
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .pretty(),
        )
        .with(
            EnvFilter::builder()
                .with_env_var("DEVKIT_LOG")
                .with_default_directive(LevelFilter::ERROR.into())
                .from_env_lossy(),
        )
        .init();

    match cli.command {
        Commands::Claude(config) => cmd::claude::main(config),
    }
    .suggestion("Set `DEVKIT_LOG=debug` to see what devkit read and decided.")
}
