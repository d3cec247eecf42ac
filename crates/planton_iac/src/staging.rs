//! The staging clone of the modules repository.
//!
//! A single clone lives under `~/.project-planton/staging/project-planton`.
//! Its checked-out version is recorded in a `.version` file at the clone root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use planton_runner::{CommandSpec, ProcessRunner, RunnerError};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{IacError, IacResult};
use crate::workspace::{modules_repo_url, ToolDirs};

/// Sentinel recording the checked-out version.
pub const VERSION_FILE: &str = ".version";

/// What `modules-version` reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagingInfo {
    pub exists: bool,
    pub version: Option<String>,
    pub path: PathBuf,
}

/// Modules repository clone used as the default module source.
#[derive(Debug, Clone)]
pub struct Staging {
    repo_dir: PathBuf,
    repo_url: String,
}

impl Staging {
    pub fn new(repo_dir: impl Into<PathBuf>, repo_url: impl Into<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            repo_url: repo_url.into(),
        }
    }

    pub fn from_tool_dirs(dirs: &ToolDirs) -> Self {
        Self::new(dirs.staging_repo(), modules_repo_url())
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn exists(&self) -> bool {
        self.repo_dir.is_dir()
    }

    /// Contents of `.version`, if recorded.
    pub fn version(&self) -> Option<String> {
        fs::read_to_string(self.repo_dir.join(VERSION_FILE))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn info(&self) -> StagingInfo {
        StagingInfo {
            exists: self.exists(),
            version: self.version(),
            path: self.repo_dir.clone(),
        }
    }

    fn record_version(&self, version: &str) -> IacResult<()> {
        fs::write(self.repo_dir.join(VERSION_FILE), format!("{}\n", version))?;
        debug!("Recorded staging version {}", version);
        Ok(())
    }

    /// Clone the repository when the staging directory does not exist yet.
    pub fn ensure(&self, runner: &dyn ProcessRunner) -> IacResult<()> {
        if self.exists() {
            return Ok(());
        }
        self.clone_repo(runner)
    }

    fn clone_repo(&self, runner: &dyn ProcessRunner) -> IacResult<()> {
        runner.locate("git", "Git")?;
        if let Some(parent) = self.repo_dir.parent() {
            fs::create_dir_all(parent)?;
        }

        info!("Cloning {} into {}", self.repo_url, self.repo_dir.display());
        let spec = CommandSpec::new("git")
            .arg("clone")
            .arg(&self.repo_url)
            .arg(self.repo_dir.to_string_lossy());
        runner.run(&spec, None).map_err(git_error)?;

        if self.exists() {
            let version = describe(runner, &self.repo_dir)?;
            self.record_version(&version)?;
        }
        Ok(())
    }

    /// Update to the latest upstream state and return the recorded version.
    ///
    /// A detached checkout (pinned tag or commit) is fetched but not pulled.
    pub fn pull(&self, runner: &dyn ProcessRunner) -> IacResult<String> {
        if !self.exists() {
            self.clone_repo(runner)?;
            return Ok(self.version().unwrap_or_default());
        }

        runner.locate("git", "Git")?;
        git(runner, &self.repo_dir, &["fetch", "--all", "--tags"])?;
        match current_branch(runner, &self.repo_dir)? {
            Some(branch) => {
                info!("Pulling latest changes on {}", branch);
                git(runner, &self.repo_dir, &["pull"])?;
            }
            None => info!("Staging is on a detached version; fetched without pulling"),
        }

        let version = describe(runner, &self.repo_dir)?;
        self.record_version(&version)?;
        Ok(version)
    }

    /// Switch the staging clone to a tag, branch or commit.
    pub fn checkout(&self, runner: &dyn ProcessRunner, version: &str) -> IacResult<()> {
        self.ensure(runner)?;
        runner.locate("git", "Git")?;
        git(runner, &self.repo_dir, &["fetch", "--all", "--tags"])?;
        checkout_ref(runner, &self.repo_dir, version)?;
        self.record_version(version)
    }
}

/// `git checkout <version>` in `dir`.
pub fn checkout_ref(runner: &dyn ProcessRunner, dir: &Path, version: &str) -> IacResult<()> {
    info!("Checking out {} in {}", version, dir.display());
    let spec = CommandSpec::new("git").args(["checkout", version]).current_dir(dir);
    runner.run(&spec, None).map_err(|e| match e {
        RunnerError::ChildProcessFailed { status, .. } => IacError::ModuleCheckoutFailed {
            version: version.to_string(),
            message: status,
        },
        other => IacError::Runner(other),
    })?;
    Ok(())
}

fn git(runner: &dyn ProcessRunner, dir: &Path, args: &[&str]) -> IacResult<()> {
    let spec = CommandSpec::new("git").args(args.iter().copied()).current_dir(dir);
    runner.run(&spec, None).map_err(git_error)?;
    Ok(())
}

/// Run git and collect its stdout lines.
fn git_output(runner: &dyn ProcessRunner, dir: &Path, args: &[&str]) -> IacResult<Vec<String>> {
    let spec = CommandSpec::new("git")
        .args(args.iter().copied())
        .current_dir(dir)
        .streaming(true);
    let (tx, rx) = mpsc::channel();
    runner.run(&spec, Some(tx)).map_err(git_error)?;
    Ok(rx.try_iter().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect())
}

fn current_branch(runner: &dyn ProcessRunner, dir: &Path) -> IacResult<Option<String>> {
    let lines = git_output(runner, dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(lines.into_iter().next().filter(|b| b != "HEAD"))
}

fn describe(runner: &dyn ProcessRunner, dir: &Path) -> IacResult<String> {
    let lines = git_output(runner, dir, &["describe", "--tags", "--always"])?;
    Ok(lines.into_iter().next().unwrap_or_else(|| "unknown".to_string()))
}

fn git_error(err: RunnerError) -> IacError {
    match err {
        RunnerError::ChildProcessFailed { command, status, .. } => {
            IacError::GitError(format!("'{}' failed: {}", command, status))
        }
        other => IacError::Runner(other),
    }
}
