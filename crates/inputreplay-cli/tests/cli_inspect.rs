// Test module - relaxed lint rules
#![allow(clippy::default_trait_access)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::panic)]
#![allow(clippy::manual_assert)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::cast_possible_truncation)]
#![allow(missing_docs)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_inputreplay"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run inputreplay")
}

fn write_script(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn parse_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout was not JSON ({}): {}",
            err,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn inspect_json_lists_steps_with_defaults_applied() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "script.json",
        r#"[{"frame":10,"action":1,"param_num":7},{"action":2,"param_num":7,"param_str":"up"}]"#,
    );

    let output = run(&["inspect", "--script", &script, "--json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value = parse_stdout(&output);
    assert_eq!(value["status"]["kind"], "complete");
    assert_eq!(value["capacity"], 200);
    assert_eq!(value["dropped"], 0);
    let steps = value["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["frame"], 10);
    assert_eq!(steps[0]["action"], "press");
    assert_eq!(steps[1]["frame"], 70);
    assert_eq!(steps[1]["action"], "release");
    assert_eq!(steps[1]["param_str"], "up");
}

#[test]
fn inspect_reports_partial_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "broken.json",
        r#"[{"frame":1,"action":1,"param_num":1},{"frame":2,"action":2,"param_num":1},{"frame":]"#,
    );

    let output = run(&["inspect", "--script", &script, "--json"]);
    assert!(output.status.success());
    let value = parse_stdout(&output);
    assert_eq!(value["status"]["kind"], "partial");
    assert!(value["status"]["error"]
        .as_str()
        .unwrap()
        .contains("line 1"));
    assert_eq!(value["steps"].as_array().unwrap().len(), 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid JSON"), "stderr: {stderr}");
}

#[test]
fn inspect_strict_exits_two_on_partial_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "broken.json", "[{\"frame\":1,");

    let output = run(&["inspect", "--script", &script, "--strict"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn inspect_missing_script_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json").display().to_string();

    let output = run(&["inspect", "--script", &missing, "--json"]);
    assert!(output.status.success());
    let value = parse_stdout(&output);
    assert_eq!(value["status"]["kind"], "unreadable");
    assert_eq!(value["steps"].as_array().unwrap().len(), 0);
}

#[test]
fn inspect_honours_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let entries: Vec<String> = (0..8)
        .map(|i| format!(r#"{{"frame":{},"action":1,"param_num":1}}"#, i))
        .collect();
    let script = write_script(dir.path(), "long.json", &format!("[{}]", entries.join(",")));

    let config_path = dir.path().join("config.yaml");
    let config: serde_yml::Value = serde_yml::from_str("capacity: 5\n").unwrap();
    fs::write(&config_path, serde_yml::to_string(&config).unwrap()).unwrap();

    let output = run(&[
        "inspect",
        "--script",
        &script,
        "--config",
        &config_path.display().to_string(),
        "--json",
    ]);
    assert!(output.status.success());
    let value = parse_stdout(&output);
    assert_eq!(value["capacity"], 5);
    assert_eq!(value["dropped"], 3);
    assert_eq!(value["steps"].as_array().unwrap().len(), 5);
}

#[test]
fn inspect_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "script.json", "[]");
    let config = write_script(dir.path(), "config.json", r#"{"capacity": 0}"#);

    let output = run(&["inspect", "--script", &script, "--config", &config]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("capacity"), "stderr: {stderr}");
}

#[test]
fn inspect_text_output_lists_steps() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "script.json",
        r#"[{"frame":3,"action":1,"param_num":13}]"#,
    );

    let output = run(&["inspect", "--script", &script, "--color", "never"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("script: complete"), "stdout: {stdout}");
    assert!(stdout.contains("press"));
    assert!(stdout.contains("13"));
}
