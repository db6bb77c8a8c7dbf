//! End-to-end tests for the `regen` binary.

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"
[[project]]
name = "Core"
root = "Core"

[[project]]
name = "App"
root = "App"
references = ["Core"]
"#;

const DEFINITION: &str = "+++\nextension = \".txt\"\n+++\n{{#types}}{{name}};{{/types}}";

/// A two-project solution with one definition in `Core`.
fn solution() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("regen.toml"), MANIFEST).unwrap();
    write(root, "Core/defs.tst", DEFINITION);
    write(root, "Core/Model.cs", "namespace Core;\npublic class Model {}\n");
    write(root, "App/Screen.cs", "public record Screen(int Id);\n");
    temp
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// `regen` isolated from the user's configuration and log settings.
fn regen(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("regen").unwrap();
    cmd.current_dir(cwd)
        .env("XDG_CONFIG_HOME", cwd.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("REGEN__WATCH__POLL_INTERVAL_MS")
        .env_remove("REGEN__OUTPUT__FORMAT");
    cmd
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    regen(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    regen(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completions_use_binary_name() {
    let temp = TempDir::new().unwrap();
    regen(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_regen"));
}

#[test]
fn list_shows_definitions() {
    let temp = solution();
    regen(temp.path())
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Core/defs.tst"));
}

#[test]
fn list_json_is_machine_readable() {
    let temp = solution();
    let out = regen(temp.path())
        .args(["--output-format", "json", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let rows: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(rows[0]["name"], "defs");
    assert_eq!(rows[0]["project"], "Core");
    assert_eq!(rows[0]["output_extension"], ".txt");
}

#[test]
fn render_writes_outputs_for_consumers() {
    let temp = solution();
    regen(temp.path())
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 2 file(s) from 1 template(s)"));

    assert_eq!(
        fs::read_to_string(temp.path().join("Core/Model.txt")).unwrap(),
        "Model;"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("App/Screen.txt")).unwrap(),
        "Screen;"
    );
    assert!(temp.path().join(".regen").is_dir());
}

#[test]
fn render_single_template_by_path() {
    let temp = solution();
    regen(temp.path())
        .args(["render", ".", "--template", "Core/defs.tst"])
        .assert()
        .success();

    assert!(temp.path().join("Core/Model.txt").is_file());
}

#[test]
fn render_reports_files_without_output() {
    let temp = solution();
    write(temp.path(), "Core/Empty.cs", "// nothing here\n");

    regen(temp.path())
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("produced no output"))
        .stdout(predicate::str::contains("Empty.cs"));

    assert!(!temp.path().join("Core/Empty.txt").exists());
}

#[test]
fn config_get_reads_defaults_and_environment() {
    let temp = TempDir::new().unwrap();
    regen(temp.path())
        .args(["config", "get", "watch.poll_interval_ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("500"));

    regen(temp.path())
        .env("REGEN__WATCH__POLL_INTERVAL_MS", "250")
        .args(["config", "get", "watch.poll_interval_ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("250"));
}

#[test]
fn local_config_file_is_picked_up() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".regen.toml"), "[watch]\npoll_interval_ms = 75\n").unwrap();

    regen(temp.path())
        .args(["config", "get", "watch.poll_interval_ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("75"));
}
