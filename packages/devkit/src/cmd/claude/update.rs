//! Merge the template registry into CLAUDE.md.

use clap::Args;
use color_eyre::{Result, eyre::Context};
use color_print::cprintln;
use devkit::claude::merge::UpdateReport;
use tracing::instrument;

use super::{Target, explain};

#[derive(Args, Clone, Debug)]
pub struct Config {
    #[command(flatten)]
    target: Target,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[instrument]
pub fn main(config: Config) -> Result<()> {
    let claude = config.target.open()?;
    let report = claude.update().map_err(|error| explain(&claude, error))?;

    if config.json {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{json}");
    } else {
        print_report(&report, &claude.path().display().to_string());
    }

    Ok(())
}

fn print_report(report: &UpdateReport, path: &str) {
    if report.is_changed() {
        println!(
            "\u{2713} Updated {} {} in {path}",
            report.updated.len(),
            if report.updated.len() == 1 { "section" } else { "sections" }
        );
    } else {
        println!("\u{2713} {path} is up to date");
    }

    for name in &report.updated {
        cprintln!("  <green>updated</green>    {}", name);
    }
    for name in &report.preserved {
        cprintln!("  <dim>preserved</dim>  {}", name);
    }
    for name in &report.duplicates {
        cprintln!(
            "  <yellow>duplicate</yellow>  {} <dim>(only the first occurrence is managed)</dim>",
            name
        );
    }
}
