//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn jsxgrade() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("jsxgrade").unwrap()
}

#[test]
fn check_passing_submission() {
    jsxgrade()
        .args(["check", "--code", "tests/fixtures/greeting.jsx"])
        .args(["--suite", "../../suites/react-basics.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Root element is a div"))
        .stdout(predicate::str::contains("6/6 passed (100.0%)"));
}

#[test]
fn check_failing_submission_exits_nonzero() {
    jsxgrade()
        .args(["check", "--code", "tests/fixtures/counter.jsx"])
        .args(["--suite", "../../suites/react-basics.toml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"));
}

#[test]
fn check_json_format() {
    let output = jsxgrade()
        .args(["check", "--code", "tests/fixtures/counter.jsx"])
        .args(["--suite", "../../suites/hooks.toml", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["suite"], "hooks");
    assert_eq!(report["allPassed"], true);
    assert_eq!(report["metrics"]["total"], 5);
    assert_eq!(report["metrics"]["passRate"], 100.0);
    assert_eq!(report["results"][4]["message"], "Pattern found 1 time(s)");
    assert!(report["gradedAt"].is_string());
}

#[test]
fn check_rejects_unknown_format() {
    jsxgrade()
        .args(["check", "--code", "tests/fixtures/counter.jsx"])
        .args(["--suite", "../../suites/hooks.toml", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn check_missing_source_file() {
    jsxgrade()
        .args(["check", "--code", "missing.jsx"])
        .args(["--suite", "../../suites/hooks.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read source file"));
}

#[test]
fn analyze_prints_context_and_metrics() {
    let output = jsxgrade()
        .args(["analyze", "--code", "tests/fixtures/counter.jsx"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["context"]["usesUseState"], true);
    assert_eq!(report["context"]["jsxElementName"], "button");
    assert_eq!(report["validation"]["hasErrors"], false);
    assert_eq!(report["quality"]["indentStyle"], "spaces");
}

#[test]
fn validate_valid_suite() {
    jsxgrade()
        .args(["validate", "--suite", "../../suites/react-basics.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 cases"))
        .stdout(predicate::str::contains("All suites valid"));
}

#[test]
fn validate_directory() {
    jsxgrade()
        .args(["validate", "--suite", "../../suites"])
        .assert()
        .success()
        .stdout(predicate::str::contains("React Basics"))
        .stdout(predicate::str::contains("React Hooks"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
[suite]
id = "bad"
name = "Bad"

[[cases]]
type = "ast"
description = "typo"
checker = "usesUseStat"
"#,
    )
    .unwrap();

    jsxgrade()
        .args(["validate", "--suite"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[#1] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    jsxgrade()
        .args(["validate", "--suite", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    jsxgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created jsxgrade.toml"))
        .stdout(predicate::str::contains("Created suites/example.toml"));

    assert!(dir.path().join("jsxgrade.toml").exists());
    assert!(dir.path().join("suites/example.toml").exists());

    // The generated suite is valid and is found through the config.
    jsxgrade()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Example Suite (3 cases)"))
        .stdout(predicate::str::contains("All suites valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("jsxgrade.toml"), "").unwrap();

    jsxgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));
}

#[test]
fn serve_answers_requests_on_stdout() {
    let input = concat!(
        r#"{"type":"evaluate","id":"abc","code":"function Welcome() { return <div>Hi</div>; }","checker":"isJSXElement"}"#,
        "\n",
        r#"{"type":"evaluate","id":"def"}"#,
        "\n",
    );

    jsxgrade()
        .arg("serve")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"type":"success","id":"abc","passed":true}"#))
        .stdout(predicate::str::contains(
            r#"{"type":"error","id":"def","error":"Invalid request type or missing parameters"}"#,
        ));
}

#[test]
fn help_output() {
    jsxgrade()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("serve"));
}
