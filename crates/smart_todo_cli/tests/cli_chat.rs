use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("smart-todo-{nanos}-{name}"))
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_smart_todo"))
        .args(args)
        .env("SMART_TODO_DATA_DIR", data_dir)
        .env("SMART_TODO_CONFIG_PATH", data_dir.join("config.json"))
        .env_remove("OPENAI_API_KEY")
        .output()
        .expect("failed to run smart_todo")
}

#[test]
fn chat_without_key_reports_auth_failure() {
    let data_dir = temp_path("cli-chat-no-key");

    let output = run(&data_dir, &["chat", "add", "milk"]);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Assistant: Authentication failed"));
}

#[test]
fn chat_with_unreachable_service_reports_request_failure() {
    let data_dir = temp_path("cli-chat-offline");
    let saved = run(&data_dir, &["key", "set", "sk-test"]);

    let output = run(
        &data_dir,
        &[
            "--config-override",
            "assistant.endpoint=http://127.0.0.1:9/v1/chat/completions",
            "--json",
            "chat",
            "hello",
        ],
    );
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(saved.status.success());
    assert!(output.status.success());
    let printed: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert!(
        printed["reply"]
            .as_str()
            .unwrap()
            .starts_with("Assistant request failed")
    );
    assert!(printed["added_tasks"].as_array().unwrap().is_empty());
}

#[test]
fn chat_rejects_blank_message() {
    let data_dir = temp_path("cli-chat-blank");

    let output = run(&data_dir, &["chat", "  "]);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_input"));
}

#[test]
fn key_commands_store_and_remove_credential() {
    let data_dir = temp_path("cli-key");

    let set = run(&data_dir, &["key", "set", "sk-test"]);
    let stored = std::fs::read_to_string(data_dir.join("openai-api-key")).unwrap();
    let status = run(&data_dir, &["--json", "key", "status"]);
    let clear = run(&data_dir, &["key", "clear"]);
    let after = run(&data_dir, &["key", "status"]);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(set.status.success());
    assert_eq!(stored, "sk-test");
    let printed: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&status.stdout).trim()).unwrap();
    assert_eq!(printed["configured"], true);
    assert!(clear.status.success());
    assert!(String::from_utf8_lossy(&after.stdout).contains("not configured"));
}

#[test]
fn invalid_override_is_rejected() {
    let data_dir = temp_path("cli-bad-override");

    let output = run(&data_dir, &["--config-override", "assistant.max_tokens=0", "list"]);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_tokens"));
}
