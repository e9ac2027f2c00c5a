//! Show the template registry.

use clap::Args;
use color_eyre::Result;
use color_print::cprintln;
use tracing::instrument;

use super::Target;

#[derive(Args, Clone, Debug)]
pub struct Config {
    #[command(flatten)]
    target: Target,
}

#[instrument]
pub fn main(config: Config) -> Result<()> {
    let registry = config.target.registry()?;
    if registry.is_empty() {
        println!("The registry has no sections.");
        return Ok(());
    }

    for section in registry.sections() {
        let summary = section.body.lines().next().unwrap_or_default();
        cprintln!(
            "<bold>{}</bold> <cyan>v{}</cyan>  <dim>{}</dim>",
            section.name,
            section.version,
            summary
        );
    }

    Ok(())
}
