//! Check CLAUDE.md for sections that `update` would change.
//!
//! Exits with status 1 when updates are pending, so it can gate CI.

use std::process;

use clap::Args;
use color_eyre::{Result, eyre::Context};
use color_print::cprintln;
use devkit::claude::merge::CheckReport;
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
    let report = claude
        .check_for_updates()
        .map_err(|error| explain(&claude, error))?;

    let path = claude.path().display().to_string();
    if config.json {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{json}");
    } else if report.has_updates {
        print_pending(&report, &path);
    } else {
        println!("\u{2713} {path} is up to date");
    }

    if report.has_updates {
        process::exit(1);
    }
    Ok(())
}

fn print_pending(report: &CheckReport, path: &str) {
    let count = report.sections.len();
    println!(
        "\u{2717} {} {} in {path} {} updates",
        count,
        if count == 1 { "section" } else { "sections" },
        if count == 1 { "needs" } else { "need" }
    );
    for name in &report.sections {
        if report.missing.contains(name) {
            cprintln!("  <red>missing</red>  {}", name);
        } else {
            cprintln!("  <yellow>drifted</yellow>  {}", name);
        }
    }

    println!();
    println!("Run `devkit claude update` to refresh drifted sections.");
    if !report.missing.is_empty() {
        println!("Missing sections are not inserted by `update`; add their markers by hand");
        println!("or recreate the file with `devkit claude init --force`.");
    }
}
