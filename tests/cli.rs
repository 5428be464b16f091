//! Integration tests for top-level CLI behavior.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Fresh store directory for one test.
fn store_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("seqcode_cli_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn run_seqcode(store: &Path, backend: &str, args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_seqcode");
    Command::new(bin)
        .args(args)
        .env("SEQCODE_STORE", store)
        .env("SEQCODE_BACKEND", backend)
        .env_remove("SEQCODE_TICKET_PREFIX")
        .env_remove("SEQCODE_WIDTH")
        .output()
        .expect("failed to run seqcode binary")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn next_issues_consecutive_codes() {
    let store = store_dir("next_consecutive");
    let first = run_seqcode(&store, "sqlite", &["next", "LAPTOP", "--at", "2025-01-15"]);
    let second = run_seqcode(&store, "sqlite", &["next", "LAPTOP", "--at", "2025-01-20"]);
    let third = run_seqcode(&store, "sqlite", &["next", "LAPTOP", "--at", "2025-01-31", "--json"]);

    assert!(first.status.success());
    assert_eq!(stdout(&first), "LAPTOP-2501-0001");
    assert_eq!(stdout(&second), "LAPTOP-2501-0002");
    assert_eq!(stdout(&third), r#"{"code":"LAPTOP-2501-0003"}"#);

    let _ = std::fs::remove_dir_all(&store);
}

#[test]
fn new_month_restarts_sequence() {
    let store = store_dir("rollover");
    run_seqcode(&store, "sqlite", &["next", "LAPTOP", "--at", "2025-01-31"]);
    run_seqcode(&store, "sqlite", &["next", "LAPTOP", "--at", "2025-01-31"]);
    let feb = run_seqcode(&store, "sqlite", &["next", "LAPTOP", "--at", "2025-02-01"]);
    assert_eq!(stdout(&feb), "LAPTOP-2502-0001");

    let show = run_seqcode(&store, "sqlite", &["show", "LAPTOP", "--period", "2501"]);
    assert!(stdout(&show).contains("LAPTOP-2501-0002"));

    let list = run_seqcode(&store, "sqlite", &["list"]);
    let out = stdout(&list);
    assert!(out.contains("LAPTOP-2501-0002"));
    assert!(out.contains("LAPTOP-2502-0001"));

    let _ = std::fs::remove_dir_all(&store);
}

#[test]
fn file_backend_persists_between_runs() {
    let store = store_dir("file_backend");
    run_seqcode(&store, "file", &["ticket-number", "--at", "2025-03-02"]);
    let second = run_seqcode(&store, "file", &["ticket-number", "--at", "2025-03-09"]);

    assert_eq!(stdout(&second), "TKT-2503-0002");
    assert!(store.join("sequences").join("ticket.yaml").exists());

    let _ = std::fs::remove_dir_all(&store);
}

#[test]
fn invalid_category_fails_without_code() {
    let store = store_dir("invalid_category");
    let output = run_seqcode(&store, "sqlite", &["next", "lap top"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr.contains("invalid request"));

    let _ = std::fs::remove_dir_all(&store);
}

#[test]
fn assets_tickets_and_planner() {
    let store = store_dir("records");
    let asset = run_seqcode(&store, "sqlite", &["asset", "add", "--type", "PRINTER", "--name", "HP"]);
    assert!(asset.status.success());
    let asset_code = stdout(&asset);
    assert!(asset_code.starts_with("PRINTER-"));
    assert!(asset_code.ends_with("-0001"));

    let ticket = run_seqcode(
        &store,
        "sqlite",
        &["ticket", "open", "--title", "Toner", "--asset", asset_code.as_str(), "--scheduled", "2030-06-01"],
    );
    assert!(ticket.status.success());
    let ticket_code = stdout(&ticket);
    assert!(ticket_code.starts_with("TKT-"));

    let list = run_seqcode(&store, "sqlite", &["ticket", "list"]);
    assert!(stdout(&list).contains(&ticket_code));

    let planner = run_seqcode(&store, "sqlite", &["planner", "--year", "2030"]);
    assert!(stdout(&planner).contains("June 2030"));

    let done = run_seqcode(&store, "sqlite", &["ticket", "status", ticket_code.as_str(), "done"]);
    assert!(stdout(&done).contains("is now done"));

    let _ = std::fs::remove_dir_all(&store);
}

#[test]
fn duplicate_submission_reuses_code() {
    let store = store_dir("duplicate_submission");
    let args = ["ticket", "open", "--title", "Leak", "--submission", "form-42"];
    let first = run_seqcode(&store, "sqlite", &args);
    let again = run_seqcode(&store, "sqlite", &args);

    assert_eq!(stdout(&first), stdout(&again));

    let _ = std::fs::remove_dir_all(&store);
}

#[test]
fn parse_splits_codes() {
    let store = store_dir("parse");
    let output = run_seqcode(&store, "sqlite", &["parse", "TKT-2503-0038"]);
    let out = stdout(&output);
    assert!(output.status.success());
    assert!(out.contains("Period:   2503"));
    assert!(out.contains("Sequence: 38"));
}

#[test]
fn list_on_empty_store() {
    let store = store_dir("empty_list");
    let output = run_seqcode(&store, "sqlite", &["list"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No sequences found"));

    let _ = std::fs::remove_dir_all(&store);
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let store = store_dir("invalid_subcommand");
    let output = run_seqcode(&store, "sqlite", &["nonsense"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn help_succeeds() {
    let store = store_dir("help");
    let output = run_seqcode(&store, "sqlite", &["next", "--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("--at"));
}
