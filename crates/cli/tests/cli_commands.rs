use std::fs;
use std::path::{Path, PathBuf};

use predicates::prelude::*;
use tempfile::tempdir;

/// `functions` lists every function that has a rule set.
#[test]
fn functions_lists_supported_targets() {
    assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .arg("functions")
        .assert()
        .success()
        .stdout(predicate::str::contains("- numpy.zeros"))
        .stdout(predicate::str::contains("- pandas.read_csv"))
        .stdout(predicate::str::contains("- matplotlib.pyplot.plot"));
}

#[test]
fn functions_json_is_machine_readable() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .args(["functions", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(entries.as_array().map(Vec::len), Some(7));
}

/// Offline classification needs no interpreter for literal-only rules.
#[test]
fn classify_offline_prints_tags() {
    assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .args(["classify", "--offline", "--module", "numpy", "np.zeros(3, order='F')"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zeros.shape-order"));
}

#[test]
fn classify_offline_reports_clean_calls() {
    assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .args(["classify", "--offline", "--module", "numpy", "zeros((2, 3), order='F')"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No risky combinations"));
}

#[test]
fn classify_offline_lists_skipped_families_on_stderr() {
    assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .args([
            "classify",
            "--offline",
            "--module",
            "pandas",
            "read_csv('a.csv', sep=';', delimiter=';', skipfooter=2)",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("read_csv.sep-delimiter"))
        .stderr(predicate::str::contains("skipped skipfooter"));
}

#[test]
fn classify_json_output() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .args(["classify", "--offline", "--json", "--module", "numpy", "arange(10, 5)"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(body["tags"][0], "arange.start-stop-step");
}

/// An unsupported function is an error, not an empty result.
#[test]
fn classify_unknown_function_fails() {
    assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .args(["classify", "--offline", "--module", "numpy", "ones(3)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no rule set registered for numpy.ones"));
}

#[cfg(unix)]
fn fake_python(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-python");
    fs::write(
        &path,
        r#"#!/bin/sh
payload=$(cat)
case "$payload" in
  *undefined*) printf '\036RISKYCOMB {"status":"error","error":"NameError: undefined"}\n' ;;
  *) printf '\036RISKYCOMB {"status":"ok","facts":null}\n' ;;
esac
"#,
    )
    .expect("write fake python");
    let mut perms = fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    path
}

#[cfg(unix)]
#[test]
fn scan_writes_executable_and_tag_logs() {
    let dir = tempdir().expect("tempdir");
    let python = fake_python(dir.path());
    let input = dir.path().join("numpy.zeros-calls.txt");
    fs::write(
        &input,
        "np.zeros(3, order='F')\nnp.zeros(int(input()))\nnp.zeros(undefined)\nnp.zeros((2, 2))\n",
    )
    .expect("write input");
    let out = dir.path().join("out");

    assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .arg("scan")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out)
        .arg("--python")
        .arg(&python)
        .arg("--no-timestamp")
        .assert()
        .success()
        .stdout(predicate::str::contains("Executable:     2"))
        .stdout(predicate::str::contains("- zeros.shape-order: 1"));

    assert_eq!(
        fs::read_to_string(out.join("zeros_executable.csv")).expect("executable log"),
        "zeros(3, order='F')\nzeros((2, 2))\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("zeros.shape-order.csv")).expect("tag log"),
        "zeros(3, order='F')\n"
    );
    assert!(!out.join("zeros_timed_out.csv").exists());
}

#[cfg(unix)]
#[test]
fn scan_json_summary_with_explicit_target() {
    let dir = tempdir().expect("tempdir");
    let python = fake_python(dir.path());
    let input = dir.path().join("calls.txt");
    fs::write(&input, "pd.read_csv('a.csv', sep=';', delimiter=';')\n").expect("write input");

    let output = assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .arg("scan")
        .arg(&input)
        .args(["--module", "pandas", "--function", "read_csv", "--json", "--no-timestamp"])
        .arg("--output-dir")
        .arg(dir.path())
        .arg("--python")
        .arg(&python)
        .output()
        .expect("run");
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(body["target"]["function"], "read_csv");
    assert_eq!(body["summary"]["executable"], 1);
    assert_eq!(body["summary"]["tags"]["read_csv.sep-delimiter"], 1);
}

#[test]
fn scan_without_target_hint_fails() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("calls");
    fs::write(&input, "zeros(3)\n").expect("write input");

    assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .arg("scan")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot tell the target function"));
}

#[test]
fn scan_missing_config_fails() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("numpy.zeros-calls.txt");
    fs::write(&input, "zeros(3)\n").expect("write input");

    assert_cmd::cargo::cargo_bin_cmd!("riskycomb")
        .arg("scan")
        .arg(&input)
        .arg("--config")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}
