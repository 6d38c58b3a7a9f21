//! Tests for error handling, exit codes and suggestions.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn caffa() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("caffa");
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_unknown_class_is_not_found() {
    caffa()
        .args(["describe", "Hexagon"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Hexagon"))
        .stderr(predicate::str::contains("caffa classes"));
}

#[test]
fn test_unknown_field_lists_fields() {
    caffa()
        .args(["new", "Point", "--set", "z=1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("has no field 'z'"))
        .stderr(predicate::str::contains("x (int32)"));
}

#[test]
fn test_malformed_assignment_is_a_usage_error() {
    caffa()
        .args(["new", "Point", "--set", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("FIELD=VALUE"));
}

#[test]
fn test_rejected_value_is_a_user_error() {
    caffa()
        .args(["new", "Circle", "--set", "radius=5000"])
        .assert()
        .code(2);
}

#[test]
fn test_wrong_value_type_is_a_user_error() {
    caffa()
        .args(["new", "Point", "--set", "x=\"left\""])
        .assert()
        .code(2);
}

#[test]
fn test_missing_document_is_not_found() {
    let temp = TempDir::new().unwrap();
    caffa()
        .arg("inspect")
        .arg(temp.path().join("absent.json"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn test_malformed_document_is_a_user_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    caffa().arg("inspect").arg(&path).assert().code(2);
}

#[test]
fn test_missing_explicit_config_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    caffa()
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .arg("classes")
        .assert()
        .code(4);
}

#[test]
fn test_unknown_config_key() {
    caffa()
        .args(["config", "get", "io.missing"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_verbose_hint_only_without_verbose() {
    caffa()
        .args(["describe", "Hexagon"])
        .assert()
        .stderr(predicate::str::contains("--verbose"));

    caffa()
        .args(["-v", "describe", "Hexagon"])
        .assert()
        .stderr(predicate::str::contains("Use -v / --verbose").not());
}

#[test]
fn test_missing_subcommand_shows_help() {
    caffa().assert().code(2).stderr(predicate::str::contains("Usage"));
}
