//! Manage the AI-assistant instructions in CLAUDE.md.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use color_eyre::{Report, Result, Section, SectionExt, eyre::Context};
use devkit::claude::{ClaudeMd, Error, registry::Registry};
use tracing::instrument;

pub mod check;
pub mod init;
pub mod list;
pub mod update;

#[derive(Args, Clone, Debug)]
pub struct Config {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
enum Commands {
    /// Write a fresh CLAUDE.md containing every registry section.
    Init(init::Config),

    /// Rewrite drifted registry sections, preserving everything else.
    Update(update::Config),

    /// Report registry sections that are drifted or missing, without writing.
    ///
    /// Exits with status 1 when updates are pending.
    Check(check::Config),

    /// Show the sections of the template registry in use.
    List(list::Config),
}

#[instrument]
pub fn main(config: Config) -> Result<()> {
    match config.command {
        Commands::Init(config) => init::main(config),
        Commands::Update(config) => update::main(config),
        Commands::Check(config) => check::main(config),
        Commands::List(config) => list::main(config),
    }
}

/// Where the document lives and which registry owns its sections.
#[derive(Args, Clone, Debug)]
pub struct Target {
    /// Path to the CLAUDE.md file.
    #[arg(long, env = "DEVKIT_CLAUDE_MD", default_value = "CLAUDE.md")]
    pub file: PathBuf,

    /// Registry file to use instead of the user-level or builtin registry.
    #[arg(long, env = "DEVKIT_REGISTRY")]
    pub registry: Option<PathBuf>,
}

impl Target {
    /// Resolve the registry.
    pub fn registry(&self) -> Result<Registry> {
        Registry::resolve(self.registry.as_deref()).context("load template registry")
    }

    /// Resolve the registry and pair it with the document path.
    pub fn open(&self) -> Result<ClaudeMd> {
        let registry = self.registry()?;
        tracing::debug!(file = ?self.file, sections = registry.len(), "open document");
        let claude = ClaudeMd::builder()
            .path(self.file.clone())
            .registry(registry)
            .build();
        Ok(claude)
    }
}

/// Turn a document error into a report with guidance for the user.
///
/// Malformed documents get an annotated snippet of the offending marker.
pub fn explain(claude: &ClaudeMd, error: Error) -> Report {
    let snippet = match &error {
        Error::MalformedDocument { .. } => fs::read_to_string(claude.path())
            .ok()
            .and_then(|source| error.annotate(&source)),
        _ => None,
    };
    let suggestion = match &error {
        Error::AlreadyExists { .. } => {
            Some("Pass `--force` to replace it; its current content will be lost.")
        }
        Error::NotFound { .. } => Some("Run `devkit claude init` to create it."),
        Error::MalformedDocument { .. } => Some(
            "Markers must pair up as `<!-- BEGIN: name vX -->` ... `<!-- END: name -->` \
             and cannot nest. Fix them by hand, or discard the file with `devkit claude init --force`.",
        ),
        Error::Io { .. } => None,
    };

    let mut report = Report::new(error);
    if let Some(snippet) = snippet {
        report = report.section(snippet.header("Document:"));
    }
    if let Some(suggestion) = suggestion {
        report = report.suggestion(suggestion);
    }
    report
}
