//! Integration tests for the `caffa` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn caffa() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("caffa");
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_flag() {
    caffa()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("describe"));
}

#[test]
fn test_version_flag() {
    caffa()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_classes_table() {
    caffa()
        .arg("classes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered classes:"))
        .stdout(predicate::str::contains("Circle"))
        .stdout(predicate::str::contains("Shape"));
}

#[test]
fn test_classes_list_is_sorted_keywords() {
    caffa()
        .args(["classes", "--format", "list"])
        .assert()
        .success()
        .stdout("Circle\nDrawing\nPoint\nShape\n");
}

#[test]
fn test_classes_json() {
    let out = caffa()
        .args(["ls", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let classes = value.as_array().unwrap();
    assert_eq!(classes.len(), 4);
    let circle = classes.iter().find(|c| c["keyword"] == "Circle").unwrap();
    assert_eq!(circle["parent"], "Shape");
}

#[test]
fn test_classes_csv_header() {
    caffa()
        .args(["classes", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("keyword,parent,fields,documentation\n"))
        .stdout(predicate::str::contains("Circle,Shape,"));
}

#[test]
fn test_describe_circle() {
    caffa()
        .args(["describe", "Circle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Circle \u{2192} Shape"))
        .stdout(predicate::str::contains("radius"))
        .stdout(predicate::str::contains("center"))
        .stdout(predicate::str::contains("color"));
}

#[test]
fn test_describe_point_lists_methods() {
    caffa()
        .args(["describe", "Point"])
        .assert()
        .success()
        .stdout(predicate::str::contains("translate(dx, dy)"))
        .stdout(predicate::str::contains("read-only"));
}

#[test]
fn test_describe_json() {
    let out = caffa()
        .args(["--output-format", "json", "describe", "Drawing"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["keyword"], "Drawing");
    let fields: Vec<&str> = value["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["keyword"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["title", "tags", "units", "origin", "shapes"]);
}

#[test]
fn test_new_point_to_stdout() {
    let out = caffa()
        .args(["new", "Point", "--set", "x=3", "--set", "y=4"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["keyword"], "Point");
    assert_eq!(value["x"], 3);
    assert_eq!(value["y"], 4);
    assert!(value["uuid"].is_string());
}

#[test]
fn test_new_to_file_then_inspect() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("drawing.json");

    caffa()
        .args(["new", "Drawing", "--set", "title=Plan", "--set", r#"tags=["a","b"]"#, "-o"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created Drawing"));

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"title\": \"Plan\""));

    caffa()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("title = \"Plan\""))
        .stdout(predicate::str::contains("Drawing: 1"));

    let out = caffa()
        .args(["inspect", "--json"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["root"], "Drawing");
    assert_eq!(value["objects"], 1);
}

#[test]
fn test_new_refuses_to_overwrite_without_force() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("point.json");
    fs::write(&path, "{}").unwrap();

    caffa()
        .args(["new", "Point", "-o"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    caffa()
        .args(["new", "Point", "--force", "-o"])
        .arg(&path)
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("\"Point\""));
}

#[test]
fn test_inspect_reads_hand_written_document() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("circle.json");
    fs::write(
        &path,
        r#"{"keyword":"Circle","radius":2.5,"center":{"keyword":"Point","x":1,"y":2}}"#,
    )
    .unwrap();

    caffa()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("radius = 2.5"))
        .stdout(predicate::str::contains("x = 1"))
        .stdout(predicate::str::contains("2 objects"));
}

#[test]
fn test_completions_bash() {
    caffa()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("caffa"));
}

#[test]
fn test_init_and_config_commands() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("nested/caffa.toml");

    caffa()
        .arg("--config")
        .arg(&config)
        .arg("init")
        .assert()
        .success();
    assert!(config.exists());

    caffa()
        .arg("--config")
        .arg(&config)
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    caffa()
        .arg("--config")
        .arg(&config)
        .args(["init", "--force"])
        .assert()
        .success();

    caffa()
        .arg("--config")
        .arg(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("caffa.toml"));

    caffa()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "io.pretty"])
        .assert()
        .success()
        .stdout("true\n");

    caffa()
        .arg("--config")
        .arg(&config)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[output]"));
}

#[test]
fn test_config_file_turns_off_pretty_output() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("caffa.toml");
    fs::write(&config, "[io]\npretty = false\n").unwrap();

    caffa()
        .arg("--config")
        .arg(&config)
        .args(["new", "Point"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"{"keyword":"Point""#));
}
