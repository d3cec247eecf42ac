//! Locating the module working directory for a kind and provisioner.

use std::fs;
use std::path::{Path, PathBuf};

use fs_extra::dir::CopyOptions;
use planton_manifest::{Provisioner, ResourceKind};
use planton_runner::ProcessRunner;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::cleanup::CleanupContext;
use crate::error::{IacError, IacResult};
use crate::staging::{checkout_ref, Staging};
use crate::workspace::ToolDirs;

/// Root of the per-provider module tree inside the repository.
pub const MODULES_ROOT: &str = "apis/org/project_planton/provider";

/// Where the module for an invocation comes from.
#[derive(Debug, Clone, Default)]
pub struct ModuleOptions {
    /// Use this directory as is.
    pub module_dir: Option<PathBuf>,
    /// Tag, branch or commit of the modules repository.
    pub module_version: Option<String>,
    /// Resolve from a local checkout instead of staging.
    pub local_module: bool,
    pub local_repo: Option<PathBuf>,
    /// Keep per-invocation copies after the run.
    pub no_cleanup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ModuleSource {
    Explicit,
    LocalRepo,
    Staging,
    VersionedCopy { version: String },
}

/// A resolved module directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleLocation {
    pub path: PathBuf,
    #[serde(flatten)]
    pub source: ModuleSource,
}

/// Directory name of the IaC flavour; Terraform and OpenTofu share `tf`.
pub fn iac_dir_name(provisioner: Provisioner) -> &'static str {
    match provisioner {
        Provisioner::Pulumi => "pulumi",
        _ => "tf",
    }
}

/// `apis/org/project_planton/provider/<provider>/<kind>/v1/iac/<pulumi|tf>`
pub fn module_subpath(kind: ResourceKind, provisioner: Provisioner) -> PathBuf {
    Path::new(MODULES_ROOT)
        .join(kind.provider().module_dir())
        .join(kind.module_name())
        .join("v1")
        .join("iac")
        .join(iac_dir_name(provisioner))
}

/// `~/scm/github.com/project-planton/project-planton`
pub fn default_local_repo() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join("scm")
            .join("github.com")
            .join("project-planton")
            .join("project-planton")
    })
}

/// Walk `repo` for a `<kind>/v1/iac/<pulumi|tf>` directory.
pub fn find_module_dir(repo: &Path, kind: ResourceKind, provisioner: Provisioner) -> Option<PathBuf> {
    let suffix = Path::new(&kind.module_name())
        .join("v1")
        .join("iac")
        .join(iac_dir_name(provisioner));

    WalkDir::new(repo)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            name != ".git" && name != "node_modules" && name != ".terraform"
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .find(|e| e.path().ends_with(&suffix))
        .map(|e| e.into_path())
}

fn locate_in_repo(repo: &Path, kind: ResourceKind, provisioner: Provisioner) -> IacResult<PathBuf> {
    let expected = repo.join(module_subpath(kind, provisioner));
    if expected.is_dir() {
        return Ok(expected);
    }

    debug!("{} missing, searching {}", expected.display(), repo.display());
    find_module_dir(repo, kind, provisioner).ok_or_else(|| IacError::ModuleNotFound {
        kind: kind.as_str().to_string(),
        provisioner: provisioner.as_str().to_string(),
        path: expected,
    })
}

/// Resolves [`ModuleOptions`] to a directory, registering cleanup for copies.
pub struct ModuleResolver<'a> {
    dirs: &'a ToolDirs,
    staging: &'a Staging,
    runner: &'a dyn ProcessRunner,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(dirs: &'a ToolDirs, staging: &'a Staging, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            dirs,
            staging,
            runner,
        }
    }

    pub fn resolve(
        &self,
        kind: ResourceKind,
        provisioner: Provisioner,
        resource_id: &str,
        options: &ModuleOptions,
        cleanup: &mut CleanupContext,
    ) -> IacResult<ModuleLocation> {
        if let Some(dir) = &options.module_dir {
            if !dir.is_dir() {
                return Err(IacError::ModuleNotFound {
                    kind: kind.as_str().to_string(),
                    provisioner: provisioner.as_str().to_string(),
                    path: dir.clone(),
                });
            }
            return Ok(ModuleLocation {
                path: dir.clone(),
                source: ModuleSource::Explicit,
            });
        }

        if options.local_module {
            let repo = match &options.local_repo {
                Some(repo) => repo.clone(),
                None => default_local_repo().ok_or(IacError::HomeDirUnavailable)?,
            };
            info!("Using local modules repository {}", repo.display());
            return Ok(ModuleLocation {
                path: locate_in_repo(&repo, kind, provisioner)?,
                source: ModuleSource::LocalRepo,
            });
        }

        self.staging.ensure(self.runner)?;

        let pinned = options
            .module_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());
        match pinned {
            Some(version) if self.staging.version().as_deref() != Some(version) => {
                let copy = self.versioned_copy(resource_id, version, options.no_cleanup, cleanup)?;
                Ok(ModuleLocation {
                    path: locate_in_repo(&copy, kind, provisioner)?,
                    source: ModuleSource::VersionedCopy {
                        version: version.to_string(),
                    },
                })
            }
            _ => Ok(ModuleLocation {
                path: locate_in_repo(self.staging.repo_dir(), kind, provisioner)?,
                source: ModuleSource::Staging,
            }),
        }
    }

    /// Copy the staging clone and check out `version` in the copy.
    fn versioned_copy(
        &self,
        resource_id: &str,
        version: &str,
        no_cleanup: bool,
        cleanup: &mut CleanupContext,
    ) -> IacResult<PathBuf> {
        let short = uuid::Uuid::new_v4().simple().to_string();
        let copy = self
            .dirs
            .workspaces()
            .join(format!("{}-{}", resource_id, &short[..8]));
        fs::create_dir_all(&copy)?;

        if no_cleanup {
            info!("Keeping workspace copy {}", copy.display());
        } else {
            cleanup.remove_path(&copy);
        }

        let mut options = CopyOptions::new();
        options.content_only = true;
        fs_extra::dir::copy(self.staging.repo_dir(), &copy, &options)
            .map_err(|e| IacError::StagingError(format!("copying modules: {}", e)))?;
        info!(
            "Created workspace copy {} for version {}",
            copy.display(),
            version
        );

        checkout_ref(self.runner, &copy, version)?;
        Ok(copy)
    }
}
