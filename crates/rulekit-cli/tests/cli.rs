//! CLI contract tests: argument handling, exit codes, and the build path.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

const ADULT_RULE: &str = "rule \"Mark adult\"\nwhen age >= 18\nthen set adult true\nend\n";

fn rulekit() -> Command {
    Command::cargo_bin("rulekit").unwrap()
}

fn touch(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[test]
fn no_arguments_prints_usage_and_exits_one() {
    rulekit()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn one_argument_prints_usage_and_exits_one() {
    rulekit()
        .arg("rules/")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn builds_a_bundle_and_confirms_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules");
    touch(&rules.join("adult.drl"), ADULT_RULE);
    let archive = dir.path().join("dist/bundle.jar");

    rulekit()
        .arg(&rules)
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle written to:"));

    assert!(std::fs::metadata(&archive).unwrap().len() > 0);
}

#[test]
fn missing_rules_folder_fails_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("bundle.jar");

    rulekit()
        .arg(dir.path().join("no-such-folder"))
        .arg(&archive)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid input"));
    assert!(!archive.exists());
}

#[test]
fn compilation_errors_fail_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules");
    touch(&rules.join("bad.drl"), "rule broken\nwhen age too old\nend\n");
    let archive = dir.path().join("bundle.jar");

    rulekit()
        .arg(&rules)
        .arg(&archive)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("rule compilation failed"));
    assert!(!archive.exists());
}
