mod common;

use common::{basic_history, BASIC_CHANGELOG};
use std::process::{Command, Output};
use tempfile::TempDir;

fn changetool(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_changetool"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_version_command() {
    let output = changetool(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        format!("{}\n", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_help_lists_commands() {
    let output = changetool(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["changelog", "semver", "version"] {
        assert!(stdout.contains(command), "{}", stdout);
    }
}

#[test]
fn test_changelog_to_stdout() {
    let repo = basic_history();
    let config = TempDir::new().unwrap();
    let config_file = config.path().join("changetool.toml");
    std::fs::write(&config_file, "").unwrap();

    let output = changetool(&[
        "changelog",
        "-p",
        &repo.path_string(),
        "-c",
        config_file.to_str().unwrap(),
        "-q",
    ]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), BASIC_CHANGELOG);
}

#[test]
fn test_not_a_repository_fails() {
    let dir = TempDir::new().unwrap();
    let output = changetool(&["semver", "-p", dir.path().to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("ERROR"), "{}", stderr);
    assert!(stderr.contains("semver failed"), "{}", stderr);
}

#[test]
fn test_missing_since_tag_fails() {
    let repo = basic_history();
    let output = changetool(&["changelog", "-p", &repo.path_string(), "--since", "v9.9.9"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Unable to find desired tag v9.9.9"), "{}", stderr);
}

#[test]
fn test_jsonl_logs_on_stderr() {
    let repo = basic_history();
    let output = changetool(&["changelog", "-p", &repo.path_string(), "-d", "-l", "jsonl"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), BASIC_CHANGELOG);

    let stderr = String::from_utf8(output.stderr).unwrap();
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.is_empty()).collect();
    assert!(!lines.is_empty());
    assert!(lines.iter().all(|l| l.starts_with('{') && l.ends_with('}')), "{}", stderr);
}
