//! Write a fresh CLAUDE.md.

use clap::Args;
use color_eyre::Result;
use tracing::instrument;

use super::{Target, explain};

#[derive(Args, Clone, Debug)]
pub struct Config {
    #[command(flatten)]
    target: Target,

    /// Overwrite an existing file, discarding its content.
    #[arg(long)]
    force: bool,
}

#[instrument]
pub fn main(config: Config) -> Result<()> {
    let claude = config.target.open()?;
    claude
        .init(config.force)
        .map_err(|error| explain(&claude, error))?;

    let count = claude.registry().len();
    println!(
        "\u{2713} Wrote {} {} to {}",
        count,
        if count == 1 { "section" } else { "sections" },
        claude.path().display()
    );
    println!();
    println!("Add project-specific instructions after the sections; `devkit claude update`");
    println!("keeps the sections current without touching anything outside the markers.");

    Ok(())
}
