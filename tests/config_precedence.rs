#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

const SEVEN_RESTARTS: &str = r#"{"items":[{"metadata":{"name":"web-1"},"status":{
  "conditions":[{"type":"Ready","status":"True"}],
  "containerStatuses":[{"name":"app","ready":true,"restartCount":7}]}}]}"#;

fn base_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kubepods-probe"));
    cmd.env("HOME", home);
    cmd.env("FAKE_KUBECTL_DIR", home);
    cmd.env_remove("KUBEPODS_PROBE_CONFIG");
    cmd.env_remove("KUBEPODS_PROBE_WARN");
    cmd.env_remove("KUBEPODS_PROBE_CRITICAL");
    cmd.env_remove("KUBEPODS_PROBE_NAMESPACE");
    cmd.env_remove("KUBEPODS_PROBE_VERBOSE");
    cmd.env_remove("KUBEPODS_PROBE_TIMEOUT");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--kubectl")
        .arg(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fake-kubectl"));
    cmd
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);

    let temp = std::env::temp_dir();
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let uniq = format!("kubepods-probe-config-test-{}-{seq}", std::process::id());
    let home = temp.join(uniq);
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    std::fs::write(home.join("pods-default.json"), SEVEN_RESTARTS).expect("write pods");
    home
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdirs");
    }
    std::fs::write(path, bytes).expect("write");
}

fn run_with(home: &Path, env: &[(&str, &str)], args: &[&str]) -> Output {
    let mut cmd = base_cmd(home);
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd.args(args).output().expect("run kubepods-probe")
}

fn write_default_config(home: &Path, body: &str) {
    write_file(
        home.join(".config/kubepods-probe/config.toml").as_path(),
        body.as_bytes(),
    );
}

#[test]
fn default_thresholds_warn_on_seven_restarts() {
    let home = make_temp_home();
    let out = run_with(&home, &[], &["-n", "default"]);
    assert_eq!(out.status.code(), Some(1));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn config_file_thresholds_apply() {
    let home = make_temp_home();
    write_default_config(
        &home,
        r#"
[thresholds]
warn = 10
critical = 100

[scan]
namespace = "default"
"#,
    );

    let out = run_with(&home, &[], &[]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("OK: Pod: web-1   Container: app    Ready: true   Restarts: 7"),
        "stdout={stdout}"
    );
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn env_overrides_config_file() {
    let home = make_temp_home();
    write_default_config(&home, "[thresholds]\nwarn = 10\n");

    let out = run_with(
        &home,
        &[("KUBEPODS_PROBE_WARN", "3"), ("KUBEPODS_PROBE_CRITICAL", "6")],
        &["-n", "default"],
    );
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn cli_overrides_env() {
    let home = make_temp_home();

    let out = run_with(
        &home,
        &[("KUBEPODS_PROBE_WARN", "3")],
        &["-n", "default", "--warn", "20"],
    );
    assert_eq!(out.status.code(), Some(0));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn cli_config_path_overrides_env_config_path() {
    let home = make_temp_home();
    let cfg_env = home.join("env-config.toml");
    let cfg_cli = home.join("cli-config.toml");
    write_file(cfg_env.as_path(), b"[thresholds]\nwarn = 100\ncritical = 200\n");
    write_file(cfg_cli.as_path(), b"[thresholds]\nwarn = 1\ncritical = 2\n");

    let out = {
        let mut cmd = base_cmd(&home);
        cmd.env("KUBEPODS_PROBE_CONFIG", &cfg_env);
        cmd.args(["-n", "default", "--config"]);
        cmd.arg(&cfg_cli);
        cmd.output().expect("run kubepods-probe")
    };
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn non_numeric_env_threshold_is_a_config_error() {
    let home = make_temp_home();
    let out = run_with(&home, &[("KUBEPODS_PROBE_WARN", "lots")], &["-n", "default"]);
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("KUBEPODS_PROBE_WARN"));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn non_numeric_config_threshold_is_a_config_error() {
    let home = make_temp_home();
    write_default_config(&home, "[thresholds]\ncritical = \"fifty\"\n");
    let out = run_with(&home, &[], &["-n", "default"]);
    assert_eq!(out.status.code(), Some(4));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn missing_explicit_config_file_is_a_config_error() {
    let home = make_temp_home();
    let out = run_with(&home, &[], &["--config", "/nonexistent/probe.toml"]);
    assert_eq!(out.status.code(), Some(4));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn show_config_reports_effective_values() {
    let home = make_temp_home();
    write_default_config(&home, "[thresholds]\nwarn = 8\n");

    let out = run_with(
        &home,
        &[("KUBEPODS_PROBE_NAMESPACE", "payments")],
        &["--show-config", "--json", "-c", "80"],
    );
    assert_eq!(out.status.code(), Some(0));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert_eq!(v["thresholds"]["warn"].as_i64(), Some(8));
    assert_eq!(v["thresholds"]["critical"].as_i64(), Some(80));
    assert_eq!(v["scan"]["namespace"].as_str(), Some("payments"));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn zero_timeout_is_a_config_error_before_scanning() {
    let home = make_temp_home();

    let out = run_with(&home, &[], &["-n", "default", "--timeout", "0"]);
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stdout).is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("timeout"));
    assert!(!home.join("calls.log").exists());

    let out = run_with(&home, &[("KUBEPODS_PROBE_TIMEOUT", "0")], &["-n", "default"]);
    assert_eq!(out.status.code(), Some(4));

    write_default_config(&home, "[probe]\ntimeout_secs = 0\n");
    let out = run_with(&home, &[], &["-n", "default"]);
    assert_eq!(out.status.code(), Some(4));
    assert!(!home.join("calls.log").exists());

    let _ = std::fs::remove_dir_all(&home);
}
