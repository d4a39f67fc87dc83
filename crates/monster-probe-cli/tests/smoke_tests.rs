//! Smoke tests for the monster-probe binary
//!
//! Browser-free: suite runs use `--driver fake`.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Command for the monster-probe binary, isolated from the caller's env
fn monster_probe(cwd: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("monster-probe").expect("monster-probe binary should exist");
    cmd.current_dir(cwd.path())
        .env_remove("MONSTER_PROBE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn bundled_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/monsters.json")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    monster_probe(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    monster_probe(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check-fixture"))
        .stdout(predicate::str::contains("locators"));
}

#[test]
fn test_no_args_fails() {
    let dir = TempDir::new().unwrap();
    monster_probe(&dir).assert().failure();
}

#[test]
fn test_unknown_scenario_fails() {
    let dir = TempDir::new().unwrap();
    monster_probe(&dir)
        .args(["run", "--scenario", "smoke"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("smoke"));
}

// ============================================================================
// Fixture / Locator / Config Commands
// ============================================================================

#[test]
fn test_check_bundled_fixture() {
    let dir = TempDir::new().unwrap();
    monster_probe(&dir)
        .arg("check-fixture")
        .arg(bundled_fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("5 monster(s)"))
        .stdout(predicate::str::contains("[monster-5] Robot Bear"));
}

#[test]
fn test_check_invalid_fixture() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"monsters": []}"#).unwrap();
    monster_probe(&dir)
        .arg("check-fixture")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("fixture contains no monsters"));
}

#[test]
fn test_locators_text() {
    let dir = TempDir::new().unwrap();
    monster_probe(&dir)
        .arg("locators")
        .assert()
        .success()
        .stdout(predicate::str::contains("monster_card"))
        .stdout(predicate::str::contains("alert_message"));
}

#[test]
fn test_config_picks_up_working_directory_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("monster-probe.yaml"),
        "base_url: \"http://127.0.0.1:4000/\"\n",
    )
    .unwrap();
    monster_probe(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:4000"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.yaml");
    fs::write(&path, "base_ulr: http://x/\n").unwrap();
    monster_probe(&dir)
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ============================================================================
// Suite Runs (fake driver)
// ============================================================================

#[test]
fn test_fake_run_passes_and_writes_report() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    monster_probe(&dir)
        .args(["run", "--driver", "fake", "--timeout", "500", "--format", "json"])
        .arg("--fixture")
        .arg(bundled_fixture())
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"passed\": 3"))
        .stdout(predicate::str::contains("\"failed\": 0"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["scenarios"][0]["name"], "crud");
    assert_eq!(report["scenarios"][0]["status"], "passed");
}

#[test]
fn test_validation_scenarios_need_no_fixture() {
    let dir = TempDir::new().unwrap();
    monster_probe(&dir)
        .args([
            "run",
            "--driver",
            "fake",
            "-s",
            "required-fields",
            "-s",
            "numeric-validation",
            "--fixture",
            "missing.json",
            "-q",
        ])
        .assert()
        .success();
    assert!(dir.path().join("target/monster-probe/report.json").exists());
}

#[test]
fn test_failing_scenario_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("run.yaml");
    fs::write(
        &config,
        "scenarios: [crud]\ntimeout_ms: 100\npoll_interval_ms: 5\nvisuals:\n  favorite_color: \"rgb(1, 2, 3)\"\n",
    )
    .unwrap();
    monster_probe(&dir)
        .args(["run", "--driver", "fake", "--color", "never", "--config"])
        .arg(&config)
        .arg("--fixture")
        .arg(bundled_fixture())
        .assert()
        .failure()
        .stderr(predicate::str::contains("FAIL crud"))
        .stderr(predicate::str::contains("FAILED 1 scenarios"));
}
