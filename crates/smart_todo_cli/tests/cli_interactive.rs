use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("smart-todo-{nanos}-{name}"))
}

fn run_interactive(input: &str) -> std::process::Output {
    let data_dir = temp_path("cli-interactive");

    let mut child = Command::new(env!("CARGO_BIN_EXE_smart_todo"))
        .env("SMART_TODO_DATA_DIR", &data_dir)
        .env("SMART_TODO_CONFIG_PATH", data_dir.join("config.json"))
        .env_remove("OPENAI_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    let output = child
        .wait_with_output()
        .expect("failed to read interactive output");

    std::fs::remove_dir_all(&data_dir).ok();
    output
}

#[test]
fn interactive_help_shows_usage() {
    let output = run_interactive("help\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
}

#[test]
fn interactive_invalid_command_prints_error() {
    let output = run_interactive("nope\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn interactive_session_keeps_state_between_lines() {
    let output = run_interactive("add \"demo task\"\nsuggest --count 2\nprogress\nquit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: demo task"));
    assert!(stdout.contains("0/3 done (0%)"));
}

#[test]
fn interactive_rejects_config_overrides() {
    let output = run_interactive("list --config-override theme=noir\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("only accepted at startup"));
}
