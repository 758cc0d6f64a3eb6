use std::fs;
use std::process::{Command, Stdio};

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn stampterm_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_stampterm").expect("stampterm test binary not built")
}

fn detached(command: &mut Command) -> &mut Command {
    command
        .stdin(Stdio::null())
        .env("STAMPTERM_NO_LOGS", "1")
        .env_remove("STAMPTERM_LOG")
}

#[test]
fn stampterm_help_mentions_name() {
    let output = Command::new(stampterm_bin())
        .arg("--help")
        .output()
        .expect("run stampterm --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Stampterm"));
    assert!(combined.contains("t/T truncate"));
}

#[test]
fn stampterm_requires_a_command() {
    let output = Command::new(stampterm_bin())
        .output()
        .expect("run stampterm without a command");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("COMMAND"));
}

#[cfg(unix)]
#[test]
fn stampterm_logs_a_detached_run_and_mirrors_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("logs").join("run.log");
    let output = detached(&mut Command::new(stampterm_bin()))
        .arg("--no-pager")
        .arg("--no-color")
        .arg("--log-file")
        .arg(&log)
        .args(["sh", "-c", "echo hello; echo oops >&2; exit 3"])
        .output()
        .expect("run stampterm");
    assert_eq!(output.status.code(), Some(3));

    let contents = fs::read_to_string(&log).expect("read transcript");
    let mut lines: Vec<&str> = contents.lines().collect();
    lines.sort_by_key(|line| line.ends_with("oops"));
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("  hello"));
    assert!(lines[1].ends_with("^ oops"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Run Summary"));
    assert!(stderr.contains("exit 3"));
    assert!(stderr.contains(&log.display().to_string()));
}

#[cfg(unix)]
#[test]
fn stampterm_reports_launch_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = detached(&mut Command::new(stampterm_bin()))
        .arg("--no-pager")
        .arg("--log-file")
        .arg(dir.path().join("run.log"))
        .arg("definitely-not-a-real-program-xyz")
        .output()
        .expect("run stampterm");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("failed to launch"));
}

#[test]
fn stampterm_rejects_a_directory_as_log_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = detached(&mut Command::new(stampterm_bin()))
        .arg("--log-file")
        .arg(dir.path())
        .args(["echo", "hi"])
        .output()
        .expect("run stampterm");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("points at a directory"));
}
