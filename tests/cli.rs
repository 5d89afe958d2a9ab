//! Exit behavior of the `scrollshot` binary for bad input

#![cfg(feature = "cdp")]

use std::process::{Command, Output};

fn scrollshot(dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scrollshot"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run scrollshot")
}

#[test]
fn missing_url_prints_usage_and_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let out = scrollshot(dir.path(), &[]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no URL given"), "{}", stderr);
    assert!(stderr.contains("Usage: scrollshot <URL>"), "{}", stderr);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn invalid_url_exits_1_before_launching_chrome() {
    let dir = tempfile::tempdir().unwrap();
    let out = scrollshot(dir.path(), &["not a url"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[Error] Usage error"), "{}", stderr);
    assert!(!stderr.contains("Starting browser"), "{}", stderr);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn help_exits_0() {
    let dir = tempfile::tempdir().unwrap();
    let out = scrollshot(dir.path(), &["--help"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("scrollshot"));
}
