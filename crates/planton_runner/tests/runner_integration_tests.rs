//! Integration tests for process execution.

use std::sync::mpsc;

use tempfile::tempdir;

use planton_runner::{CommandSpec, MockResponse, MockRunner, ProcessRunner, RunnerError, SystemRunner};

/// The child runs in the requested directory and sees only the extra env we pass.
#[cfg(unix)]
#[test]
fn test_working_dir_and_env_reach_child() {
    let temp = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();

    let spec = CommandSpec::new("sh")
        .args(["-c", "pwd; echo $PLANTON_TEST_VALUE"])
        .current_dir(temp.path())
        .env("PLANTON_TEST_VALUE", "scoped")
        .streaming(true);
    SystemRunner.run(&spec, Some(tx)).unwrap();

    let lines: Vec<String> = rx.iter().collect();
    let cwd = std::fs::canonicalize(temp.path()).unwrap();
    assert_eq!(std::fs::canonicalize(&lines[0]).unwrap(), cwd);
    assert_eq!(lines[1], "scoped");
    assert!(std::env::var("PLANTON_TEST_VALUE").is_err());
}

/// The sink is closed once the run returns, even when the child fails.
#[cfg(unix)]
#[test]
fn test_sink_closed_after_failure() {
    let (tx, rx) = mpsc::channel();
    let spec = CommandSpec::new("sh")
        .args(["-c", "echo partial; exit 2"])
        .streaming(true);

    let err = SystemRunner.run(&spec, Some(tx)).unwrap_err();
    assert!(matches!(err, RunnerError::ChildProcessFailed { exit_code: Some(2), .. }));
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec!["partial"]);
}

#[test]
fn test_mock_runner_as_trait_object() {
    let mock = MockRunner::new().respond_to("destroy", MockResponse::failure(1));
    let runner: Box<dyn ProcessRunner> = Box::new(mock.clone());

    runner.run(&CommandSpec::new("pulumi").arg("preview"), None).unwrap();
    assert!(runner.run(&CommandSpec::new("pulumi").arg("destroy"), None).is_err());
    assert_eq!(mock.command_lines(), vec!["pulumi preview", "pulumi destroy"]);
}
