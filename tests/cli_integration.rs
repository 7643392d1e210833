//! CLI Integration Tests
//!
//! These tests run the `manifest` binary end-to-end against a store file in
//! a temporary directory.
//!
//! Run with:
//! ```bash
//! cargo test --test cli_integration
//! ```

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Get the path to the built binary
fn manifest_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_manifest"))
}

/// Run manifest command and return (stdout, stderr, success)
fn run_manifest(args: &[&str], workdir: &Path) -> (String, String, bool) {
    let store = workdir.join("test.store");
    let config = workdir.join("no-config.json");
    let output = Command::new(manifest_binary())
        .arg("-s")
        .arg(&store)
        .arg("--config")
        .arg(&config)
        .args(["-f", "json"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute manifest");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn run_json(args: &[&str], workdir: &Path) -> Value {
    let (stdout, stderr, success) = run_manifest(args, workdir);
    assert!(success, "command {:?} failed: {}", args, stderr);
    serde_json::from_str(stdout.trim()).expect("stdout should be JSON")
}

/// Lay out a small source tree and import it, returning the root
fn import_fixture() -> (TempDir, String) {
    let dir = tempdir().unwrap();
    let src = dir.path().join("site");
    std::fs::create_dir_all(src.join("img/icons")).unwrap();
    std::fs::create_dir_all(src.join("empty")).unwrap();
    std::fs::write(src.join("index.html"), "<html></html>").unwrap();
    std::fs::write(src.join("img/logo.png"), "png").unwrap();
    std::fs::write(src.join("img/icons/a.svg"), "<svg/>").unwrap();

    let json = run_json(&["import", src.to_str().unwrap()], dir.path());
    assert_eq!(json["files"], 3);
    assert_eq!(json["directories"], 1);
    let root = json["root"].as_str().unwrap().to_string();
    assert_eq!(root.len(), 64);
    (dir, root)
}

fn listed(json: &Value) -> Vec<(String, String)> {
    json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            let full = format!(
                "{}{}",
                e["path"].as_str().unwrap(),
                e["name"].as_str().unwrap()
            );
            (e["kind"].as_str().unwrap().to_string(), full)
        })
        .collect()
}

// ============================================================================
// Import Tests
// ============================================================================

#[test]
fn test_cli_import_creates_store() {
    let (dir, _root) = import_fixture();
    assert!(dir.path().join("test.store").exists());
}

#[test]
fn test_cli_import_is_deterministic() {
    let (dir, root) = import_fixture();
    let src = dir.path().join("site");
    let json = run_json(&["import", src.to_str().unwrap()], dir.path());
    assert_eq!(json["root"].as_str().unwrap(), root);
}

// ============================================================================
// Listing Tests
// ============================================================================

#[test]
fn test_cli_ls_one_level() {
    let (dir, root) = import_fixture();
    let json = run_json(&["ls", &root], dir.path());

    assert_eq!(json["level"], 1);
    assert_eq!(
        listed(&json),
        vec![
            ("directory".to_string(), "empty/".to_string()),
            ("directory".to_string(), "img/".to_string()),
            ("file".to_string(), "index.html".to_string()),
        ]
    );
}

#[test]
fn test_cli_ls_two_levels_from_subdirectory() {
    let (dir, root) = import_fixture();
    let json = run_json(&["ls", &root, "img/", "-L", "2"], dir.path());

    assert_eq!(
        listed(&json),
        vec![
            ("directory".to_string(), "icons/".to_string()),
            ("file".to_string(), "logo.png".to_string()),
            ("file".to_string(), "icons/a.svg".to_string()),
        ]
    );
}

#[test]
fn test_cli_tree_lists_everything() {
    let (dir, root) = import_fixture();
    let json = run_json(&["tree", &root], dir.path());

    let mut all = listed(&json);
    all.sort();
    assert_eq!(
        all,
        vec![
            ("directory".to_string(), "empty/".to_string()),
            ("directory".to_string(), "img/".to_string()),
            ("directory".to_string(), "img/icons/".to_string()),
            ("file".to_string(), "img/icons/a.svg".to_string()),
            ("file".to_string(), "img/logo.png".to_string()),
            ("file".to_string(), "index.html".to_string()),
        ]
    );
}

#[test]
fn test_cli_ls_missing_path_fails() {
    let (dir, root) = import_fixture();
    let (_stdout, stderr, success) = run_manifest(&["ls", &root, "nope/"], dir.path());
    assert!(!success);
    assert!(stderr.contains("not found"), "unexpected stderr: {}", stderr);
}

// ============================================================================
// Lookup Tests
// ============================================================================

#[test]
fn test_cli_get_entry() {
    let (dir, root) = import_fixture();
    let json = run_json(&["get", &root, "img/logo.png"], dir.path());

    assert_eq!(json["path"], "img/logo.png");
    assert_eq!(json["metadata"]["size"], "3");
    assert_eq!(json["reference"].as_str().unwrap().len(), 64);
}

#[test]
fn test_cli_get_content() {
    let (dir, root) = import_fixture();
    let (stdout, stderr, success) =
        run_manifest(&["get", &root, "img/icons/a.svg", "--content"], dir.path());
    assert!(success, "get --content failed: {}", stderr);
    assert_eq!(stdout, "<svg/>");
}

#[test]
fn test_cli_invalid_root_fails() {
    let (dir, _root) = import_fixture();
    let (_stdout, _stderr, success) = run_manifest(&["ls", "not-hex"], dir.path());
    assert!(!success);
}

#[test]
fn test_cli_text_format_is_pretty() {
    let (dir, root) = import_fixture();
    let output = Command::new(manifest_binary())
        .arg("-s")
        .arg(dir.path().join("test.store"))
        .arg("--config")
        .arg(dir.path().join("no-config.json"))
        .args(["-f", "text", "get", &root, "index.html"])
        .output()
        .expect("Failed to execute manifest");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().count() > 1, "text output should be pretty JSON");
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["metadata"]["size"], "13");
}
