//! Tool directory layout under `~/.project-planton`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IacError, IacResult};

/// Overrides the tool directory.
pub const ENV_HOME: &str = "PROJECT_PLANTON_HOME";
/// Overrides the modules repository clone URL.
pub const ENV_MODULES_REPO: &str = "PROJECT_PLANTON_MODULES_REPO";

pub const TOOL_DIR_NAME: &str = ".project-planton";
pub const DEFAULT_MODULES_REPO: &str = "https://github.com/project-planton/project-planton";
pub const STAGING_REPO_NAME: &str = "project-planton";

/// Directories owned by the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDirs {
    root: PathBuf,
}

impl ToolDirs {
    /// `$PROJECT_PLANTON_HOME`, or `~/.project-planton`.
    pub fn resolve() -> IacResult<Self> {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(lookup: F) -> IacResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_HOME).filter(|v| !v.trim().is_empty()) {
            return Ok(Self::from_root(root));
        }
        let home = dirs::home_dir().ok_or(IacError::HomeDirUnavailable)?;
        Ok(Self::from_root(home.join(TOOL_DIR_NAME)))
    }

    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Downloaded, extracted and overridden manifests, and stack input files.
    pub fn downloads(&self) -> PathBuf {
        self.root.join("downloads")
    }

    /// Parent of the modules clone.
    pub fn staging(&self) -> PathBuf {
        self.root.join("staging")
    }

    /// The modules clone itself.
    pub fn staging_repo(&self) -> PathBuf {
        self.staging().join(STAGING_REPO_NAME)
    }

    /// Per-invocation module copies.
    pub fn workspaces(&self) -> PathBuf {
        self.root.join("workspaces")
    }

    /// Create the root and the downloads directory.
    pub fn ensure(&self) -> IacResult<()> {
        for dir in [self.root.clone(), self.downloads()] {
            if !dir.is_dir() {
                fs::create_dir_all(&dir)?;
                debug!("Created {}", dir.display());
            }
        }
        Ok(())
    }
}

/// Clone URL for the modules repository.
pub fn modules_repo_url() -> String {
    modules_repo_url_with(|key| std::env::var(key).ok())
}

pub fn modules_repo_url_with<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_MODULES_REPO)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_MODULES_REPO.to_string())
}
