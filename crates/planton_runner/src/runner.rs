//! Process runner trait and the system implementation.

use std::any::Any;
use std::io::{self, BufRead, BufReader, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::command::{CommandSpec, OutputMode};
use crate::error::{RunnerError, RunnerResult};

/// Receives complete stdout lines in streaming mode.
pub type LineSink = Sender<String>;

/// Outcome of a successful child process.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Rendered command line
    pub command: String,
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Locates and runs external binaries.
pub trait ProcessRunner: Send + Sync {
    /// Resolve `binary` on PATH, failing with [`RunnerError::BinaryNotInPath`].
    fn locate(&self, binary: &str, display_name: &str) -> RunnerResult<PathBuf>;

    /// Run to completion. A non-zero exit is returned as
    /// [`RunnerError::ChildProcessFailed`] carrying the command line.
    fn run(&self, spec: &CommandSpec, sink: Option<LineSink>) -> RunnerResult<ExecutionResult>;
}

/// Runs real processes with `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn locate(&self, binary: &str, display_name: &str) -> RunnerResult<PathBuf> {
        which::which(binary).map_err(|_| RunnerError::BinaryNotInPath {
            display_name: display_name.to_string(),
            binary: binary.to_string(),
        })
    }

    fn run(&self, spec: &CommandSpec, sink: Option<LineSink>) -> RunnerResult<ExecutionResult> {
        let command = spec.display();
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).envs(&spec.env).stdin(Stdio::inherit()).stderr(Stdio::inherit());
        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }

        info!("Executing: {}", command);
        debug!("Extra environment: {:?}", spec.env_keys());

        let started_at = Utc::now();
        let start = Instant::now();

        let status = match spec.output {
            OutputMode::Inherit => cmd
                .stdout(Stdio::inherit())
                .status()
                .map_err(|source| RunnerError::SpawnFailed {
                    command: command.clone(),
                    source,
                })?,
            OutputMode::Stream => run_streaming(&mut cmd, &command, sink)?,
        };

        let result = ExecutionResult {
            command,
            exit_code: status.code(),
            started_at,
            finished_at: Utc::now(),
            duration_ms: millis(start.elapsed()),
        };
        check_status(result, &status.to_string())
    }
}

/// Turn a finished execution into an error when the exit code is non-zero.
pub fn check_status(result: ExecutionResult, status: &str) -> RunnerResult<ExecutionResult> {
    if result.success() {
        debug!("Command finished in {}ms", result.duration_ms);
        Ok(result)
    } else {
        Err(RunnerError::ChildProcessFailed {
            command: result.command,
            status: status.to_string(),
            exit_code: result.exit_code,
        })
    }
}

fn run_streaming(
    cmd: &mut Command,
    command: &str,
    sink: Option<LineSink>,
) -> RunnerResult<ExitStatus> {
    let mut child = cmd
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|source| RunnerError::SpawnFailed {
            command: command.to_string(),
            source,
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stdout was not captured"))?;

    let (err_tx, err_rx) = mpsc::channel::<RunnerError>();
    let reader = thread::spawn(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| forward_lines(stdout, sink.as_ref())));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = err_tx.send(RunnerError::Io(e));
            }
            Err(payload) => {
                let _ = err_tx.send(RunnerError::ReaderPanicked(panic_message(payload.as_ref())));
            }
        }
        // sink and err_tx drop here, closing both channels
    });

    let status = child.wait()?;

    if let Err(payload) = reader.join() {
        return Err(RunnerError::ReaderPanicked(panic_message(payload.as_ref())));
    }
    if let Some(err) = err_rx.try_iter().next() {
        return Err(err);
    }
    Ok(status)
}

/// Forward each stdout line to `sink`, or to our own stdout without one.
fn forward_lines<R: Read>(source: R, sink: Option<&LineSink>) -> io::Result<()> {
    for line in BufReader::new(source).lines() {
        let line = line?;
        match sink {
            // a dropped receiver means nobody is listening; keep draining the pipe
            Some(tx) => {
                let _ = tx.send(line);
            }
            None => println!("{}", line),
        }
    }
    Ok(())
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
