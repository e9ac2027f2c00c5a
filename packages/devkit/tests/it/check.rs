//! `devkit claude check`

use pretty_assertions::assert_eq as pretty_assert_eq;
use serde_json::{Value, json};

use crate::{project, read_claude_md, run_claude, write_claude_md};

#[test]
fn test_check_without_sections_needs_everything() {
    let dir = project();
    write_claude_md(dir.path(), "# Just my notes\n");

    let (exit_code, stdout, _stderr) = run_claude(dir.path(), &["check", "--json"]);

    pretty_assert_eq!(exit_code, 1, "pending updates should exit 1");
    let report = serde_json::from_str::<Value>(&stdout).expect("parse JSON report");
    pretty_assert_eq!(
        report,
        json!({
            "hasUpdates": true,
            "sections": ["fw/a", "fw/b"],
            "missing": ["fw/a", "fw/b"],
        })
    );
}

#[test]
fn test_check_reports_drift_without_writing() {
    let dir = project();
    let content = "<!-- BEGIN: fw/a v1 -->\nold\n<!-- END: fw/a -->\n";
    write_claude_md(dir.path(), content);

    let (exit_code, stdout, _stderr) = run_claude(dir.path(), &["check"]);

    pretty_assert_eq!(exit_code, 1, "pending updates should exit 1");
    assert!(stdout.contains("drifted") && stdout.contains("fw/a"), "got: {stdout}");
    assert!(stdout.contains("missing") && stdout.contains("fw/b"), "got: {stdout}");
    pretty_assert_eq!(read_claude_md(dir.path()), content);
}

#[test]
fn test_check_current_document() {
    let dir = project();
    write_claude_md(
        dir.path(),
        "<!-- BEGIN: fw/a v2 -->\nnew\n<!-- END: fw/a -->\nnotes\n<!-- BEGIN: fw/b v1 -->\nbeta line one\n\nbeta line two\n<!-- END: fw/b -->\n",
    );

    let (exit_code, stdout, stderr) = run_claude(dir.path(), &["check"]);

    pretty_assert_eq!(exit_code, 0, "current document should exit 0, stderr: {stderr}");
    assert!(stdout.contains("is up to date"), "got: {stdout}");
}

#[test]
fn test_check_missing_file() {
    let dir = project();
    let (exit_code, _stdout, stderr) = run_claude(dir.path(), &["check"]);

    assert!(exit_code != 0, "check without a document should fail");
    assert!(stderr.contains("does not exist"), "got: {stderr}");
}
