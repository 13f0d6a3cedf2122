//! Shell tool tests
//!
//! Runs real `sh -c` commands inside a temporary workspace.

use serde_json::json;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use termcoder_core::tools::Tool;
use termcoder_core::tools::shell::RunBash;

fn tool() -> (TempDir, RunBash) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let tool = RunBash::new(dir.path().to_path_buf());
    (dir, tool)
}

#[tokio::test]
async fn test_runs_in_workspace() {
    let (dir, tool) = tool();
    std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

    let output = tool.execute(json!({"command": "cat marker.txt"})).await.unwrap();

    assert!(output.success);
    assert_eq!(output.get("exit_code"), Some(&json!(0)));
    assert_eq!(output.get_str("stdout"), Some("here"));
    assert_eq!(output.get_str("stderr"), Some(""));
}

#[tokio::test]
async fn test_nonzero_exit_is_failure_with_output() {
    let (_dir, tool) = tool();

    let output = tool
        .execute(json!({"command": "echo oops >&2; exit 3"}))
        .await
        .unwrap();

    assert!(!output.success);
    assert_eq!(output.get("exit_code"), Some(&json!(3)));
    assert_eq!(output.get_str("stderr"), Some("oops\n"));
}

#[tokio::test]
async fn test_long_output_keeps_head_and_tail() {
    let (_dir, tool) = tool();

    let output = tool.execute(json!({"command": "seq 1000"})).await.unwrap();
    let stdout = output.get_str("stdout").unwrap();

    assert!(stdout.starts_with("1\n2\n"));
    assert!(stdout.contains("\n25\n... (950 lines omitted) ...\n976\n"));
    assert!(stdout.ends_with("\n1000"));
}

#[tokio::test]
async fn test_output_lines_all_is_untruncated() {
    let (_dir, tool) = tool();

    let output = tool
        .execute(json!({"command": "seq 1000", "output_lines": "all"}))
        .await
        .unwrap();

    assert_eq!(output.get_str("stdout").unwrap().lines().count(), 1000);
}

#[tokio::test]
async fn test_output_lines_first() {
    let (_dir, tool) = tool();

    let output = tool
        .execute(json!({"command": "seq 60", "output_lines": "first"}))
        .await
        .unwrap();
    let stdout = output.get_str("stdout").unwrap();

    assert!(stdout.starts_with("1\n"));
    assert!(stdout.ends_with("50\n... (10 more lines)"));
}

#[tokio::test]
async fn test_timeout_kills_command() {
    let (_dir, tool) = tool();

    let started = Instant::now();
    let err = tool
        .execute(json!({"command": "sleep 30", "timeout": 1}))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Command timed out (1s limit)");
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_timeout_below_minimum_is_clamped() {
    let (_dir, tool) = tool();

    let output = tool
        .execute(json!({"command": "echo ok", "timeout": 0}))
        .await
        .unwrap();

    assert!(output.success);
    assert_eq!(output.get_str("stdout"), Some("ok\n"));
}
