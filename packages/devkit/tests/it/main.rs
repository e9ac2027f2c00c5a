//! Integration tests for the `devkit claude` subcommands.
//!
//! Each test runs the built binary inside its own temporary directory, with
//! `HOME` and `XDG_CONFIG_HOME` pointed there so that no user-level registry
//! leaks in.

mod check;
mod list;
mod update;

use std::fs;
use std::path::Path;

use indoc::indoc;
use tempfile::TempDir;
use xshell::{Shell, cmd};

/// A small registry used by most tests.
pub const REGISTRY: &str = indoc! {r#"
    version: 1
    sections:
      - name: fw/a
        version: "2"
        body: |
          new
      - name: fw/b
        version: "1"
        body: |
          beta line one

          beta line two
"#};

/// A temporary project directory with `registry.yaml` written from [`REGISTRY`].
pub fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("registry.yaml"), REGISTRY).expect("write registry");
    dir
}

/// Read `CLAUDE.md` from the project directory.
pub fn read_claude_md(dir: &Path) -> String {
    fs::read_to_string(dir.join("CLAUDE.md")).expect("read CLAUDE.md")
}

/// Write `CLAUDE.md` into the project directory.
pub fn write_claude_md(dir: &Path, content: &str) {
    fs::write(dir.join("CLAUDE.md"), content).expect("write CLAUDE.md");
}

/// Run `devkit claude <args>` in `dir` against the project registry and
/// return (exit_code, stdout, stderr).
pub fn run_claude(dir: &Path, args: &[&str]) -> (i32, String, String) {
    run_claude_with_registry(dir, Some("registry.yaml"), args)
}

/// Run `devkit claude <args>` in `dir`, optionally pointing it at a registry
/// file, and return (exit_code, stdout, stderr).
pub fn run_claude_with_registry(
    dir: &Path,
    registry: Option<&str>,
    args: &[&str],
) -> (i32, String, String) {
    let sh = Shell::new().expect("create shell");
    sh.change_dir(dir);

    let bin = env!("CARGO_BIN_EXE_devkit");
    let command = cmd!(sh, "{bin} claude {args...}")
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("NO_COLOR", "1")
        .env_remove("DEVKIT_CLAUDE_MD")
        .ignore_status()
        .quiet();
    let command = match registry {
        Some(registry) => command.env("DEVKIT_REGISTRY", registry),
        None => command.env_remove("DEVKIT_REGISTRY"),
    };

    let output = command.output().expect("run devkit");
    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (exit_code, stdout, stderr)
}
