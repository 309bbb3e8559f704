//! Integration tests for the llm-comp binary
//!
//! The binary runs with piped stdio here, so every prompt goes through JSON
//! mode. No test sets an API key, so no request ever leaves the machine.

#![allow(deprecated)]

use assert_cmd::{assert::OutputAssertExt, cargo::CommandCargoExt};
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const KEY_VARS: [&str; 3] = ["OPENAI_API_KEY", "ANTHROPIC_API_KEY", "GEMINI_API_KEY"];

/// `llm-comp` isolated from the caller's keys, `.env` and config files.
fn llm_comp(dir: &Path, config: &str) -> assert_cmd::Command {
    let config_path = dir.join("test-config.toml");
    std::fs::write(&config_path, config).unwrap();

    let mut cmd = assert_cmd::Command::cargo_bin("llm-comp").unwrap();
    for var in KEY_VARS {
        cmd.env_remove(var);
    }
    cmd.env("LLM_COMP_SKIP_DOTENV", "1")
        .env("LLM_COMP_CONFIG", &config_path)
        .env_remove("RUST_LOG")
        .arg("--cwd")
        .arg(dir);
    cmd
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("llm-comp").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Compare LLM responses"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("llm-comp").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(concat!("llm-comp ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_init_creates_then_skips() {
    let tmp = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("llm-comp").unwrap();
    cmd.arg("init").arg("--cwd").arg(tmp.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Created:"))
        .stdout(predicate::str::contains("./llm-comp.toml"))
        .stdout(predicate::str::contains("Next: Add your API keys to .env"));

    assert!(tmp.path().join("llm-comp.toml").is_file());
    assert!(tmp.path().join(".env").is_file());

    let mut again = Command::cargo_bin("llm-comp").unwrap();
    again.arg("init").arg("--cwd").arg(tmp.path());
    again
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped (already exists):"))
        .stdout(predicate::str::contains("Created:").not());
}

#[test]
fn test_missing_keys_are_reported_as_json() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = llm_comp(tmp.path(), "[app]\ntitle = \"test\"\n");
    cmd.arg("why is the sky blue?");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 3);
    for (record, var) in records.iter().zip(KEY_VARS) {
        let error = record["error"].as_str().unwrap();
        assert!(error.starts_with(&format!("Missing {}", var)), "{}", error);
        assert!(record.get("text").is_none());
    }
}

#[test]
fn test_prompt_from_stdin() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = llm_comp(tmp.path(), "");
    cmd.arg("--json").write_stdin("  piped prompt \n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"provider\": \"openai\""))
        .stdout(predicate::str::contains("Missing OPENAI_API_KEY"));
}

#[test]
fn test_disabled_provider() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = llm_comp(tmp.path(), "[providers.claude]\nenabled = false\n");
    cmd.arg("hello");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Disabled. Set 'enabled = true'"))
        .stdout(predicate::str::contains("Missing GEMINI_API_KEY"));
}

#[test]
fn test_empty_prompt_prints_help() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = llm_comp(tmp.path(), "");
    cmd.write_stdin("   \n");

    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = llm_comp(tmp.path(), "[app\n");
    cmd.arg("hello");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}
