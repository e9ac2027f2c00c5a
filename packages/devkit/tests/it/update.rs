//! `devkit claude update`

use pretty_assertions::assert_eq as pretty_assert_eq;
use serde_json::{Value, json};

use crate::{project, read_claude_md, run_claude, write_claude_md};

#[test]
fn test_update_rewrites_drifted_section() {
    let dir = project();
    write_claude_md(
        dir.path(),
        "<!-- BEGIN: fw/a v1 -->\nold\n<!-- END: fw/a -->\n\nCUSTOM TEXT",
    );

    let (exit_code, stdout, stderr) = run_claude(dir.path(), &["update"]);

    pretty_assert_eq!(exit_code, 0, "update should exit 0, stderr: {stderr}");
    assert!(stdout.contains("Updated 1 section"), "got: {stdout}");
    pretty_assert_eq!(
        read_claude_md(dir.path()),
        "<!-- BEGIN: fw/a v2 -->\nnew\n<!-- END: fw/a -->\n\nCUSTOM TEXT"
    );
}

#[test]
fn test_update_is_idempotent() {
    let dir = project();
    write_claude_md(
        dir.path(),
        "# Team notes\n\n<!-- BEGIN: fw/b -->\nstale\n<!-- END: fw/b -->\nMore notes.\n",
    );

    let (exit_code, _, stderr) = run_claude(dir.path(), &["update"]);
    pretty_assert_eq!(exit_code, 0, "update should exit 0, stderr: {stderr}");
    let first = read_claude_md(dir.path());

    let (exit_code, stdout, stderr) = run_claude(dir.path(), &["update"]);
    pretty_assert_eq!(exit_code, 0, "update should exit 0, stderr: {stderr}");
    assert!(stdout.contains("is up to date"), "got: {stdout}");
    pretty_assert_eq!(read_claude_md(dir.path()), first);
}

#[test]
fn test_update_preserves_unknown_sections() {
    let dir = project();
    let content = "<!-- BEGIN: other/b v7 -->\nhands off\n<!-- END: other/b -->\n";
    write_claude_md(dir.path(), content);

    let (exit_code, stdout, stderr) = run_claude(dir.path(), &["update", "--json"]);

    pretty_assert_eq!(exit_code, 0, "update should exit 0, stderr: {stderr}");
    let report = serde_json::from_str::<Value>(&stdout).expect("parse JSON report");
    pretty_assert_eq!(
        report,
        json!({ "updated": [], "preserved": ["other/b"], "duplicates": [] })
    );
    pretty_assert_eq!(read_claude_md(dir.path()), content);
}

#[test]
fn test_update_missing_file() {
    let dir = project();
    let (exit_code, _stdout, stderr) = run_claude(dir.path(), &["update"]);

    assert!(exit_code != 0, "update without a document should fail");
    assert!(stderr.contains("does not exist"), "got: {stderr}");
    assert!(!dir.path().join("CLAUDE.md").exists());
}

#[test]
fn test_update_malformed_document() {
    let dir = project();
    let content = "# Notes\n<!-- BEGIN: fw/a v1 -->\nold\n";
    write_claude_md(dir.path(), content);

    let (exit_code, _stdout, stderr) = run_claude(dir.path(), &["update"]);

    assert!(exit_code != 0, "update of a malformed document should fail");
    assert!(stderr.contains("never closed"), "got: {stderr}");
    assert!(
        stderr.contains("<!-- BEGIN: fw/a v1 -->"),
        "error should show the offending marker, got: {stderr}"
    );
    pretty_assert_eq!(read_claude_md(dir.path()), content);
}

#[test]
fn test_update_nested_markers() {
    let dir = project();
    write_claude_md(
        dir.path(),
        "<!-- BEGIN: fw/a -->\n<!-- BEGIN: fw/b -->\n<!-- END: fw/b -->\n<!-- END: fw/a -->\n",
    );

    let (exit_code, _stdout, stderr) = run_claude(dir.path(), &["update"]);

    assert!(exit_code != 0, "update of nested markers should fail");
    assert!(stderr.contains("nesting is not supported"), "got: {stderr}");
}
