//! Build script for devkit that generates version information.
//!
//! The version string comes from `git describe --always --tags --dirty`, so
//! builds from a modified tree are marked `-dirty`. Outside a git checkout
//! (for example when built from a packaged crate) it falls back to the
//! package version.

use std::env;
use std::iter;
use std::process::Command;

fn main() {
    let version = git_describe()
        .or_else(|_| env::var("CARGO_PKG_VERSION").map_err(|e| e.to_string()))
        .unwrap_or_else(|_| String::from("unknown"));
    println!("cargo:rustc-env=DEVKIT_VERSION={version}");
}

fn git_describe() -> Result<String, String> {
    run("git", &["describe", "--always", "--tags", "--dirty=-dirty"])
}

fn run(prog: &str, argv: &[&str]) -> Result<String, String> {
    let invocation = iter::once(prog)
        .chain(argv.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    let output = Command::new(prog)
        .args(argv)
        .output()
        .map_err(|e| format!("failed to execute `{invocation}`: {e}"))?;
    if !output.status.success() {
        return Err(format!("`{invocation}` exited with non-zero status"));
    }

    let output = String::from_utf8(output.stdout)
        .map_err(|e| format!("could not parse output of `{invocation}` as UTF-8: {e}"))?;
    Ok(output.trim_end().to_string())
}
