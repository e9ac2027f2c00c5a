//! `devkit claude list`

use pretty_assertions::assert_eq as pretty_assert_eq;

use crate::{project, run_claude, run_claude_with_registry};

#[test]
fn test_list_project_registry() {
    let dir = project();
    let (exit_code, stdout, stderr) = run_claude(dir.path(), &["list"]);

    pretty_assert_eq!(exit_code, 0, "list should exit 0, stderr: {stderr}");
    assert!(stdout.contains("fw/a") && stdout.contains("v2"), "got: {stdout}");
    assert!(stdout.contains("fw/b") && stdout.contains("beta line one"), "got: {stdout}");
}

#[test]
fn test_list_builtin_registry() {
    let dir = project();
    let (exit_code, stdout, stderr) = run_claude_with_registry(dir.path(), None, &["list"]);

    pretty_assert_eq!(exit_code, 0, "list should exit 0, stderr: {stderr}");
    assert!(stdout.contains("devkit/overview"), "got: {stdout}");
}

#[test]
fn test_list_invalid_registry() {
    let dir = project();
    std::fs::write(dir.path().join("broken.yaml"), "version: 1\nsections: nope\n")
        .expect("write registry");

    let (exit_code, _stdout, stderr) =
        run_claude_with_registry(dir.path(), Some("broken.yaml"), &["list"]);

    assert!(exit_code != 0, "list with a broken registry should fail");
    assert!(stderr.contains("broken.yaml"), "got: {stderr}");
}
