// SPDX-License-Identifier: Apache-2.0

//! Binary smoke tests. These run against a scratch directory that is not a
//! git repository, so discovery degrades to empty input sets and every check
//! reports skipped.

use assert_cmd::Command;

fn bin() -> Command {
    Command::cargo_bin("groundwork-verify").expect("binary builds")
}

#[test]
fn help_names_the_three_subcommands() {
    let assert = bin().arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("run"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("doctor"));
}

#[test]
fn run_in_empty_scratch_dir_skips_everything_and_exits_zero() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let assert = bin()
        .arg("--repo-root")
        .arg(scratch.path())
        .arg("run")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Markdown: SKIPPED"));
    assert!(stdout.contains("Shell: SKIPPED"));
    assert!(stdout.contains("Manifest-build: SKIPPED"));
    assert!(stdout.contains("summary: ok=0 failed=0 skipped=3 total=3"));
}

#[test]
fn run_emits_a_schema_versioned_json_report() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let assert = bin()
        .arg("--repo-root")
        .arg(scratch.path())
        .args(["run", "--run-id", "smoke_json", "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("json report");
    assert_eq!(report["schema_version"], 1);
    assert_eq!(report["run_id"], "smoke_json");
    assert_eq!(report["summary"]["skipped"], 3);
}

#[test]
fn run_mirrors_the_report_to_the_out_file() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let out = scratch.path().join("report.json");
    bin()
        .arg("--repo-root")
        .arg(scratch.path())
        .args(["run", "--format", "json", "--out"])
        .arg(&out)
        .assert()
        .success();
    let mirrored = std::fs::read_to_string(&out).expect("out file");
    let report: serde_json::Value = serde_json::from_str(&mirrored).expect("json report");
    assert_eq!(report["summary"]["total"], 3);
}

#[test]
fn ci_mode_frames_checks_with_fold_markers() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let assert = bin()
        .arg("--repo-root")
        .arg(scratch.path())
        .args(["run", "--ci"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("::group::Markdown"));
    assert!(stdout.contains("::endgroup::"));
}

#[test]
fn malformed_run_id_is_a_usage_error() {
    let scratch = tempfile::tempdir().expect("tempdir");
    bin()
        .arg("--repo-root")
        .arg(scratch.path())
        .args(["run", "--run-id", "Not-Snake"])
        .assert()
        .code(2);
}

#[test]
fn list_reports_empty_input_sets() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let assert = bin()
        .arg("--repo-root")
        .arg(scratch.path())
        .arg("list")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("markdown files: 0"));
    assert!(stdout.contains("shell files: 0"));
    assert!(stdout.contains("manifest directories: 0"));
}

#[test]
fn doctor_reports_tool_availability() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let output = bin()
        .arg("--repo-root")
        .arg(scratch.path())
        .args(["doctor", "--format", "json"])
        .output()
        .expect("doctor runs");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("doctor json");
    assert!(payload["tools"].get("git").is_some());
    assert!(payload["tools"].get("kustomize").is_some());
    assert!(payload["status"].is_string());
}

#[test]
fn quiet_suppresses_terminal_output_but_keeps_the_exit_code() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let assert = bin()
        .arg("--repo-root")
        .arg(scratch.path())
        .args(["--quiet", "run"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.is_empty());
}
