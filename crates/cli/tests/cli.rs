//! Integration tests for the hilctl binary
//!
//! No boards are reachable here, so runs exercise the skip and error paths.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn hilctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hilctl")?;
    cmd.env_remove("HIL_CONFIG")
        .env_remove("HIL_URI")
        .env_remove("HIL_HW")
        .env_remove("HIL_SERIAL_NUMBER")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    Ok(cmd)
}

fn stdout_json(output: &std::process::Output) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

/// A local port with nothing listening on it.
fn closed_port() -> Result<u16, Box<dyn std::error::Error>> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[test]
fn test_help_lists_commands() -> TestResult {
    hilctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("probe"));
    Ok(())
}

#[test]
fn test_list_shows_both_boards() -> TestResult {
    hilctl()?
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("fmcomms5"))
        .stdout(predicate::str::contains("test_fmcomms5_phase_sync[2400000000]"))
        .stdout(predicate::str::contains("test_daq2_cw_loopback[1-param_set0]"))
        .stdout(predicate::str::contains("68 scenarios"));
    Ok(())
}

#[test]
fn test_list_json_for_one_board() -> TestResult {
    let output = hilctl()?.args(["list", "--board", "daq2", "--json"]).output()?;
    assert!(output.status.success());
    let json = stdout_json(&output)?;
    assert_eq!(json["count"], 14);
    assert_eq!(json["scenarios"][0]["id"], "test_daq2_tx_data[0]");
    assert_eq!(json["scenarios"][0]["class"], "adi.DAQ2");
    Ok(())
}

#[test]
fn test_run_without_hardware_skips_everything() -> TestResult {
    let output = hilctl()?.args(["run", "--json"]).output()?;
    assert!(output.status.success());
    let json = stdout_json(&output)?;
    assert_eq!(json["summary"]["total"], 68);
    assert_eq!(json["summary"]["skipped"], 68);
    assert_eq!(json["scenarios"][0]["outcome"], "skipped");
    assert_eq!(json["scenarios"][0]["reason"], "No valid hardware found");
    Ok(())
}

#[test]
fn test_run_human_summary() -> TestResult {
    hilctl()?
        .args(["run", "--board", "daq2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIPPED test_daq2_tx_data[0]"))
        .stdout(predicate::str::contains("14 total, 0 passed, 0 failed, 14 skipped, 0 errors"));
    Ok(())
}

#[test]
fn test_run_help_explains_collaborator_groups() -> TestResult {
    hilctl()?
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--exclude"))
        .stdout(predicate::str::contains("embedding harness"))
        .stdout(predicate::str::contains("test_fmcomms5_phase_sync"));
    Ok(())
}

#[test]
fn test_run_exclude_drops_groups() -> TestResult {
    let output = hilctl()?
        .args(["run", "--json", "--board", "fmcomms5", "-x", "test_ad7291", "--exclude", "test_dcxo"])
        .output()?;
    assert!(output.status.success());
    let json = stdout_json(&output)?;
    assert_eq!(json["summary"]["total"], 44);
    let ids: Vec<&str> = json["scenarios"]
        .as_array()
        .map(|s| s.iter().filter_map(|s| s["id"].as_str()).collect())
        .unwrap_or_default();
    assert!(ids.iter().all(|id| !id.starts_with("test_ad7291") && !id.starts_with("test_dcxo")));
    Ok(())
}

#[test]
fn test_run_writes_report_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("report.json");
    hilctl()?
        .args(["run", "--filter", "test_dcxo", "--report"])
        .arg(&path)
        .assert()
        .success();
    let report: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(report["summary"]["total"], 1);
    let id = report["scenarios"][0]["id"].as_str().unwrap_or_default();
    assert!(id.starts_with("test_dcxo["), "{id}");
    Ok(())
}

#[test]
fn test_unreachable_board_is_an_error_outcome() -> TestResult {
    let uri = format!("ip:127.0.0.1:{}", closed_port()?);
    let output = hilctl()?
        .args(["run", "--json", "--filter", "test_fmcomms5_attr[", "--timeout-ms", "500"])
        .args(["--uri", &uri, "--hw", "fmcomms5"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output)?;
    assert_eq!(json["summary"]["total"], 7);
    assert_eq!(json["summary"]["errors"], 7);
    assert_eq!(json["scenarios"][0]["outcome"], "error");
    let reason = json["scenarios"][0]["reason"].as_str().unwrap_or_default();
    assert!(reason.contains("Failed to connect"), "{reason}");
    Ok(())
}

#[test]
fn test_config_file_absent_board_skips() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hil.yaml");
    fs::write(
        &path,
        "contexts:\n  - hw: fmcomms5\n    uri: ip:192.168.2.1\n    present: false\n",
    )?;
    let output = hilctl()?
        .args(["run", "--json", "--board", "fmcomms5", "--config"])
        .arg(&path)
        .output()?;
    assert!(output.status.success());
    let json = stdout_json(&output)?;
    assert_eq!(json["summary"]["skipped"], 54);
    Ok(())
}

#[test]
fn test_bad_config_extension_exit_code() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hil.toml");
    fs::write(&path, "contexts = []\n")?;
    hilctl()?
        .args(["run", "--config"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid configuration"));
    Ok(())
}

#[test]
fn test_malformed_config_json_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hil.json");
    fs::write(&path, "{\"contexts\": [{\"hw\": \"daq2\"}]}")?;
    let output = hilctl()?.args(["run", "--json", "--config"]).arg(&path).output()?;
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output)?;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["type"], "InvalidConfiguration");
    Ok(())
}

#[test]
fn test_uri_without_hw_rejected() -> TestResult {
    hilctl()?
        .args(["run", "--uri", "ip:192.168.2.1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--uri needs --hw"));
    Ok(())
}

#[test]
fn test_probe_without_uri() -> TestResult {
    hilctl()?.arg("probe").assert().code(2);
    Ok(())
}

#[test]
fn test_probe_unsupported_scheme() -> TestResult {
    hilctl()?
        .args(["probe", "usb:1.2.5"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Unsupported context URI"));
    Ok(())
}

#[test]
fn test_probe_refused_connection() -> TestResult {
    let uri = format!("ip:127.0.0.1:{}", closed_port()?);
    hilctl()?
        .args(["probe", &uri, "--timeout-ms", "500"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to connect"));
    Ok(())
}
