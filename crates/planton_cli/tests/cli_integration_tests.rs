//! End-to-end tests of the `project-planton` binary.
//!
//! These cover the commands that never reach an IaC tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const LOCAL_FILE: &str = r#"apiVersion: local.project-planton.org/v1
kind: LocalFile
metadata:
  name: notes
spec:
  path: /tmp/notes.txt
  content: hello
"#;

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_project-planton"))
}

fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(binary())
        .args(args)
        .env("PROJECT_PLANTON_HOME", home)
        .env_remove("PROJECT_PLANTON_BACKEND_TYPE")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run project-planton")
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_version_prints_package_version() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_validate_accepts_valid_manifest() {
    let temp = TempDir::new().unwrap();
    let manifest = write(&temp, "notes.yaml", LOCAL_FILE);

    let output = run(temp.path(), &["validate", "-f", &manifest]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("is valid"));
}

#[test]
fn test_unknown_field_exits_with_one() {
    let temp = TempDir::new().unwrap();
    let manifest = write(
        &temp,
        "typo.yaml",
        "apiVersion: local.project-planton.org/v1\nkind: LocalFile\nmetadata:\n  name: notes\nspc:\n  path: /tmp/n\n",
    );

    let output = run(temp.path(), &["validate-manifest", "-f", &manifest]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown Field in Manifest"));
    assert!(stderr.contains("spc"));
}

#[test]
fn test_load_manifest_applies_defaults_and_overrides() {
    let temp = TempDir::new().unwrap();
    let manifest = write(&temp, "notes.yaml", LOCAL_FILE);

    let output = run(
        temp.path(),
        &["load", "-f", &manifest, "--set", "spec.content=changed"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kind: LocalFile"));
    assert!(stdout.lines().any(|l| l.contains("fileMode:") && l.contains("0644")));
    assert!(stdout.contains("content: changed"));

    // The source file is left untouched.
    assert!(fs::read_to_string(&manifest).unwrap().contains("content: hello"));
}

#[test]
fn test_load_tfvars_renders_hcl() {
    let temp = TempDir::new().unwrap();
    let manifest = write(&temp, "notes.yaml", LOCAL_FILE);

    let output = run(temp.path(), &["tofu", "load-tfvars", &manifest]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("metadata = {"));
    assert!(stdout.contains("spec = {"));
    assert!(stdout.contains("file_mode = \"0644\""));
}

#[test]
fn test_modules_version_without_staging() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["modules-version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No IaC modules cached yet."));
}

#[test]
fn test_missing_provisioner_fails_without_terminal() {
    let temp = TempDir::new().unwrap();
    let manifest = write(&temp, "notes.yaml", LOCAL_FILE);
    let module = temp.path().join("module");
    fs::create_dir_all(&module).unwrap();

    let output = run(
        temp.path(),
        &["plan", "-f", &manifest, "--module-dir", &module.to_string_lossy()],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("project-planton.org/provisioner"));
}

#[test]
fn test_no_manifest_source_is_an_error() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["apply"]);
    assert_eq!(output.status.code(), Some(1));
}
