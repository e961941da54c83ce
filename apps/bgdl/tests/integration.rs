//! Integration tests for the bgdl CLI

use std::io::Write;
use std::process::{Command, Stdio};

fn bgdl(app_data: &std::path::Path) -> Command {
    let config = app_data.join("config.toml");
    std::fs::write(&config, "[network]\nretries = 0\n").unwrap();

    let mut command = Command::new(env!("CARGO_BIN_EXE_bgdl"));
    command
        .env("BGDL_APP_DATA", app_data)
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    command
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_bgdl"))
        .arg("--version")
        .output()
        .expect("Failed to execute bgdl");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bgdl"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_bgdl"))
        .arg("--help")
        .output()
        .expect("Failed to execute bgdl");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fetch"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_cli_invalid_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_bgdl"))
        .arg("invalid-command")
        .output()
        .expect("Failed to execute bgdl");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_fetch_unsupported_destination_fails() {
    let temp = tempfile::tempdir().unwrap();
    let output = bgdl(temp.path())
        .args(["fetch", "https://127.0.0.1:9/f.bin", "ftp://nowhere/f.bin"])
        .output()
        .expect("Failed to execute bgdl");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("transfer.destination_resolution"));
}

#[test]
fn test_serve_answers_each_command() {
    let temp = tempfile::tempdir().unwrap();
    let mut child = bgdl(temp.path())
        .arg("serve")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to execute bgdl");

    {
        let stdin = child.stdin.as_mut().unwrap();
        writeln!(
            stdin,
            r#"{{"callbackId": "a", "action": "stop", "args": ["https://example.com/f.bin"]}}"#
        )
        .unwrap();
        writeln!(stdin, r#"{{"callbackId": "b", "action": "pause", "args": []}}"#).unwrap();
        writeln!(stdin, "not json").unwrap();
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let replies: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(replies.len(), 3);

    let reply = |id: serde_json::Value| {
        replies
            .iter()
            .find(|r| r["callbackId"] == id)
            .cloned()
            .unwrap()
    };
    assert_eq!(reply("a".into())["status"], "ok");
    assert_eq!(reply("a".into())["keepCallback"], false);
    assert_eq!(reply("b".into())["status"], "error");
    assert_eq!(
        reply("b".into())["message"]["code"],
        "bridge.invalid_action"
    );
    assert_eq!(
        reply(serde_json::Value::Null)["message"]["code"],
        "bridge.malformed_command"
    );
}
