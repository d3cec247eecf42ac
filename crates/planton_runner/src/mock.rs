//! Recording process runner for tests.
//!
//! Captures every command it is asked to run and answers with canned
//! responses, so dispatch can be exercised without IaC binaries installed.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::command::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{check_status, ExecutionResult, LineSink, ProcessRunner};

/// Canned outcome for one command.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i32,
    /// Lines sent to the sink in streaming mode.
    pub stdout: Vec<String>,
}

impl MockResponse {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            stdout: Vec::new(),
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            exit_code,
            stdout: Vec::new(),
        }
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stdout = lines.into_iter().map(Into::into).collect();
        self
    }
}

/// Mock runner. Clones share their recorded state.
#[derive(Clone, Default)]
pub struct MockRunner {
    /// Recorded commands, in order.
    calls: Arc<RwLock<Vec<CommandSpec>>>,
    /// Responses keyed by the first argument (`init`, `apply`, ...).
    responses: Arc<RwLock<Vec<(String, MockResponse)>>>,
    /// Binaries that `locate` reports as missing.
    missing: Arc<RwLock<HashSet<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands whose first argument is `subcommand` with `response`.
    pub fn respond_to(self, subcommand: impl Into<String>, response: MockResponse) -> Self {
        self.responses.write().push((subcommand.into(), response));
        self
    }

    /// Pretend `binary` is not installed.
    pub fn without_binary(self, binary: impl Into<String>) -> Self {
        self.missing.write().insert(binary.into());
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Rendered command lines, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.read().iter().map(CommandSpec::display).collect()
    }

    /// First recorded call whose first argument is `subcommand`.
    pub fn find_call(&self, subcommand: &str) -> Option<CommandSpec> {
        self.calls
            .read()
            .iter()
            .find(|c| c.args.first().map(String::as_str) == Some(subcommand))
            .cloned()
    }

    pub fn clear_calls(&self) {
        self.calls.write().clear();
    }

    fn response_for(&self, spec: &CommandSpec) -> MockResponse {
        let first = spec.args.first().map(String::as_str).unwrap_or_default();
        self.responses
            .read()
            .iter()
            .find(|(sub, _)| sub == first)
            .map(|(_, response)| response.clone())
            .unwrap_or_else(MockResponse::success)
    }
}

impl ProcessRunner for MockRunner {
    fn locate(&self, binary: &str, display_name: &str) -> RunnerResult<PathBuf> {
        if self.missing.read().contains(binary) {
            return Err(RunnerError::BinaryNotInPath {
                display_name: display_name.to_string(),
                binary: binary.to_string(),
            });
        }
        Ok(PathBuf::from("/usr/local/bin").join(binary))
    }

    fn run(&self, spec: &CommandSpec, sink: Option<LineSink>) -> RunnerResult<ExecutionResult> {
        self.calls.write().push(spec.clone());
        let response = self.response_for(spec);

        if let Some(tx) = sink {
            for line in &response.stdout {
                let _ = tx.send(line.clone());
            }
        }

        let now = Utc::now();
        let result = ExecutionResult {
            command: spec.display(),
            exit_code: Some(response.exit_code),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        };
        check_status(result, &format!("exit status: {}", response.exit_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_records_calls_in_order() {
        let runner = MockRunner::new();
        runner.run(&CommandSpec::new("tofu").arg("init"), None).unwrap();
        runner
            .run(&CommandSpec::new("tofu").args(["apply", "--auto-approve"]), None)
            .unwrap();

        assert_eq!(runner.call_count(), 2);
        assert_eq!(
            runner.command_lines(),
            vec!["tofu init", "tofu apply --auto-approve"]
        );
        assert!(runner.find_call("apply").is_some());
        assert!(runner.find_call("destroy").is_none());
    }

    #[test]
    fn test_failure_response() {
        let runner = MockRunner::new().respond_to("apply", MockResponse::failure(1));
        assert!(runner.run(&CommandSpec::new("tofu").arg("init"), None).is_ok());

        let err = runner
            .run(&CommandSpec::new("tofu").arg("apply"), None)
            .unwrap_err();
        assert!(matches!(
            err,
            RunnerError::ChildProcessFailed {
                exit_code: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn test_streams_lines() {
        let runner = MockRunner::new()
            .respond_to("plan", MockResponse::success().with_lines(["{\"a\":1}", "{\"b\":2}"]));
        let (tx, rx) = mpsc::channel();
        runner
            .run(&CommandSpec::new("tofu").arg("plan").streaming(true), Some(tx))
            .unwrap();
        assert_eq!(rx.iter().count(), 2);
    }

    #[test]
    fn test_missing_binary() {
        let runner = MockRunner::new().without_binary("pulumi");
        assert!(runner.locate("tofu", "OpenTofu").is_ok());
        assert!(matches!(
            runner.locate("pulumi", "Pulumi"),
            Err(RunnerError::BinaryNotInPath { .. })
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let runner = MockRunner::new();
        let clone = runner.clone();
        clone.run(&CommandSpec::new("git").arg("pull"), None).unwrap();
        assert_eq!(runner.call_count(), 1);
    }
}
