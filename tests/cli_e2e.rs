#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn snipvault(data: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("snipvault").unwrap();
    cmd.env("NO_COLOR", "1")
        .arg("--config")
        .arg(data.path().join("config.toml"))
        .arg("--data-dir")
        .arg(data.path());
    cmd
}

fn add_sort(data: &TempDir) {
    snipvault(data)
        .args([
            "add",
            "--title",
            "Sort",
            "--code",
            "def s(a): return sorted(a)",
            "--tags",
            "python, algo",
            "--language",
            "python",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved snippet"));
}

#[test]
fn test_add_then_search() {
    let data = TempDir::new().unwrap();
    add_sort(&data);

    assert!(data.path().join("codeSnippets.json").exists());

    snipvault(&data)
        .args(["search", "ALGO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sort"))
        .stdout(predicate::str::contains("#python #algo"));

    snipvault(&data)
        .args(["search", "rust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No snippets match"));
}

#[test]
fn test_add_without_code_fails() {
    let data = TempDir::new().unwrap();
    snipvault(&data)
        .args(["add", "--title", "Empty", "--code", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs some code"));

    snipvault(&data)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No snippets yet"));
}

#[test]
fn test_delete_flow() {
    let data = TempDir::new().unwrap();
    add_sort(&data);

    let saved = fs::read_to_string(data.path().join("codeSnippets.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&saved).unwrap();
    let id = parsed[0]["id"].to_string();

    snipvault(&data)
        .args(["delete", &id])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete cancelled"));

    snipvault(&data)
        .args(["rm", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted snippet"));

    snipvault(&data)
        .args(["ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No snippets yet"));
}

#[test]
fn test_export_import_between_collections() {
    let source = TempDir::new().unwrap();
    add_sort(&source);
    let export_path = source.path().join("code-snippets.json");

    snipvault(&source)
        .args(["export", "--output"])
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 snippet(s)"));

    let target = TempDir::new().unwrap();
    snipvault(&target)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported"))
        .stdout(predicate::str::contains("1"));

    snipvault(&target)
        .args(["list", "--search", "sort"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Python]"));
}

#[test]
fn test_import_rejects_non_array() {
    let data = TempDir::new().unwrap();
    let bad = data.path().join("bad.json");
    fs::write(&bad, r#"{"title": "x", "code": "y"}"#).unwrap();

    snipvault(&data)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error importing snippets"));
}

#[test]
fn test_login_whoami_logout() {
    let data = TempDir::new().unwrap();
    snipvault(&data)
        .args(["login", "--provider", "github", "--uid", "u-42", "--name", "Ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as"))
        .stdout(predicate::str::contains("Ada"))
        .stdout(predicate::str::contains("GitHub"));

    snipvault(&data)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("u-42"));

    snipvault(&data)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"));

    snipvault(&data)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_remote_mode_requires_base_url() {
    let data = TempDir::new().unwrap();
    snipvault(&data)
        .args(["--remote", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("remote.base_url"));
}
