// ABOUTME: Integration tests for the CLI application
// ABOUTME: Runs the digkit binary against project files written to a temp directory

use std::process::Command;

mod common;
use common::{archive_files, TestEnvironment};

const PROJECT_YAML: &str = r#"
name: analytics
root:
  path: files
workflows:
  - name: daily_report
    exports:
      env: prod
    schedule:
      daily: "07:00:00"
      skip_delayed_by: 0
    tasks:
      - name: fetch
        type: command
        command: ./fetch.sh
      - name: per_region
        type: repeat
        iterables:
          region: [us, eu]
        tasks:
          - name: load
            type: command
            command: ./load.sh ${region}
  - name: weekly
    tasks:
      - name: run_daily
        type: call
        workflow: daily_report
"#;

fn digkit() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_digkit"));
    command.env_remove("RUST_LOG").arg("--no-color");
    command
}

fn project_env() -> TestEnvironment {
    let env = TestEnvironment::new();
    env.write_file("project.yaml", PROJECT_YAML);
    env.write_file("files/fetch.sh", "#!/bin/sh\n");
    env
}

#[test]
fn test_cli_help_command() {
    let output = digkit().arg("--help").output().expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("render"));
    assert!(stdout.contains("push"));
}

#[test]
fn test_cli_render_single_workflow() {
    let env = project_env();

    let output = digkit()
        .arg("render")
        .arg(env.path().join("project.yaml"))
        .args(["--workflow", "daily_report"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.starts_with("# daily_report.dig\ntimezone: UTC\n"));
    assert!(stdout.contains("schedule:\n    daily>: 07:00:00\n    skip_on_overtime: true\n"));
    assert!(stdout.contains("    for_each>:\n        region: [us, eu]\n\n"));
    assert!(stdout.contains("    _do:\n        +load:\n"));
    assert!(!stdout.contains("weekly"));
}

#[test]
fn test_cli_render_unknown_workflow_fails() {
    let env = project_env();

    let output = digkit()
        .arg("render")
        .arg(env.path().join("project.yaml"))
        .args(["--workflow", "missing"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing"));
}

#[test]
fn test_cli_archive_writes_file() {
    let env = project_env();
    let archive_path = env.path().join("out.tar.gz");

    let output = digkit()
        .arg("archive")
        .arg(env.path().join("project.yaml"))
        .arg("--output")
        .arg(&archive_path)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());

    let files = archive_files(&std::fs::read(&archive_path).unwrap());
    assert!(files["weekly.dig"].contains("+run_daily:\n    call>: daily_report.dig\n"));
    assert_eq!(files["fetch.sh"], "#!/bin/sh\n");
}

#[test]
fn test_cli_invalid_project_file() {
    let env = TestEnvironment::new();
    let path = env.write_file("broken.yaml", "name: [unterminated");

    let output = digkit()
        .arg("render")
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load project"));
}
