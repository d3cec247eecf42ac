//! One provisioning invocation, from manifest source to tool exit.
//!
//! [`Engine::run`] walks the [`InvocationState`] sequence: resolve and load the
//! manifest, validate it, detect provisioner and provider, load credentials,
//! resolve the backend (HCL tools), materialize the module directory, then run
//! `init` and the operation. Every temporary artifact is registered with a
//! [`CleanupContext`] which runs before `run` returns, on success or error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use planton_backend::{backend_config_values, resolve_backend, BackendConfig, ResolvedBackend};
use planton_manifest::{
    apply_overrides_to_file, kube_context, load_manifest, provisioner_from_labels,
    pulumi_stack_fqdn, validate_manifest, FieldOverride, Manifest, ManifestResolver,
    ManifestSource, Provisioner, PROVISIONER_LABEL,
};
use planton_provider::LoadedCredential;
use planton_runner::{ExecutionResult, LineSink, ProcessRunner, SystemRunner};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cleanup::CleanupContext;
use crate::error::{IacError, IacResult};
use crate::events::{PresentationEvent, Presenter, S3_REASON_AUTO_REGION, S3_REASON_ENDPOINT};
use crate::hcl::{HclOptions, HclRunner};
use crate::module::{ModuleLocation, ModuleOptions, ModuleResolver};
use crate::operation::Operation;
use crate::pulumi::{PulumiOptions, PulumiRunner};
use crate::stack_input::{build_stack_input_yaml, write_stack_input_file, STACK_INPUT_FILE_ENV};
use crate::staging::Staging;
use crate::state::{InvocationState, InvocationTracker};
use crate::tfvars::write_tfvars;
use crate::workspace::ToolDirs;

/// Environment variable carrying a kube context override to the modules.
pub const KUBE_CONTEXT_ENV: &str = "KUBE_CTX";

/// Everything a provisioning command was given.
#[derive(Debug, Clone, Default)]
pub struct ProvisionRequest {
    pub source: ManifestSource,
    /// Raw `--set key=value` overrides.
    pub overrides: Vec<String>,
    /// `-p` credential file.
    pub provider_config: Option<PathBuf>,
    pub kube_context: Option<String>,
    /// Forced by the `tofu`/`terraform`/`pulumi` command groups.
    pub provisioner: Option<Provisioner>,
    pub module: ModuleOptions,
    /// Backend flags; the highest-priority layer.
    pub backend: BackendConfig,
    /// Raw `--backend-config key=value` values.
    pub backend_config: Vec<String>,
    pub auto_approve: bool,
    /// `plan --destroy`
    pub destroy: bool,
    pub reconfigure: bool,
    /// Stream `-json` output into `output`.
    pub json: bool,
    pub stack: Option<String>,
    pub yes: bool,
    pub diff: bool,
    pub output: Option<LineSink>,
}

impl ProvisionRequest {
    pub fn new(source: ManifestSource) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }
}

/// A loaded manifest and what came with it.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    /// `provider_config` of a stack input source.
    pub provider_config: Option<serde_yaml::Value>,
    pub overrides_applied: usize,
}

/// Result of a completed invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationOutcome {
    pub operation: Operation,
    pub provisioner: Provisioner,
    pub resource_id: String,
    pub module: ModuleLocation,
    /// `None` for Pulumi `init`, which only selects the stack.
    pub result: Option<ExecutionResult>,
    pub states: Vec<InvocationState>,
}

/// Orchestrates invocations against one tool directory.
pub struct Engine {
    dirs: ToolDirs,
    staging: Staging,
    runner: Arc<dyn ProcessRunner>,
    resolver: ManifestResolver,
    backend_env: BackendConfig,
}

impl Engine {
    pub fn new(dirs: ToolDirs) -> Self {
        Self {
            resolver: ManifestResolver::new(dirs.downloads()),
            staging: Staging::from_tool_dirs(&dirs),
            runner: Arc::new(SystemRunner::new()),
            backend_env: planton_backend::env::from_env(),
            dirs,
        }
    }

    /// Engine for the tool directory of the current user.
    pub fn from_env() -> IacResult<Self> {
        Ok(Self::new(ToolDirs::resolve()?))
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_resolver(mut self, resolver: ManifestResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_staging(mut self, staging: Staging) -> Self {
        self.staging = staging;
        self
    }

    /// Replace the `PROJECT_PLANTON_BACKEND_*` layer.
    pub fn with_backend_env(mut self, backend_env: BackendConfig) -> Self {
        self.backend_env = backend_env;
        self
    }

    pub fn dirs(&self) -> &ToolDirs {
        &self.dirs
    }

    pub fn staging(&self) -> &Staging {
        &self.staging
    }

    pub fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    /// Resolve, override and load a manifest, validating it when `validate` is set.
    ///
    /// Temporary files are removed before returning.
    pub async fn load(
        &self,
        source: &ManifestSource,
        overrides: &[String],
        validate: bool,
        presenter: &dyn Presenter,
    ) -> IacResult<LoadedManifest> {
        let mut cleanup = CleanupContext::new();
        let mut tracker = InvocationTracker::new();
        let loaded = self
            .load_stage(source, overrides, false, presenter, &mut cleanup, &mut tracker)
            .await?;
        if validate {
            self.validate_stage(&loaded.manifest, presenter, &mut tracker)?;
        }
        Ok(loaded)
    }

    /// Run `operation` for `request`.
    pub async fn run(
        &self,
        operation: Operation,
        request: &ProvisionRequest,
        presenter: &dyn Presenter,
    ) -> IacResult<InvocationOutcome> {
        let mut cleanup = CleanupContext::new();
        let mut tracker = InvocationTracker::new();

        let result = self
            .execute(operation, request, presenter, &mut cleanup, &mut tracker)
            .await;

        tracker.finish();
        let failures = cleanup.run();
        if failures > 0 {
            warn!("{} cleanup step(s) failed", failures);
        }

        result.map(|mut outcome| {
            outcome.states = tracker.history().to_vec();
            outcome
        })
    }

    async fn execute(
        &self,
        operation: Operation,
        request: &ProvisionRequest,
        presenter: &dyn Presenter,
        cleanup: &mut CleanupContext,
        tracker: &mut InvocationTracker,
    ) -> IacResult<InvocationOutcome> {
        let keep_files = request.module.no_cleanup;
        info!("Starting {} invocation", operation);

        let loaded = self
            .load_stage(&request.source, &request.overrides, keep_files, presenter, cleanup, tracker)
            .await?;
        let manifest = &loaded.manifest;
        self.validate_stage(manifest, presenter, tracker)?;

        let provisioner = self.select_provisioner(manifest, request.provisioner, presenter)?;
        let context = kube_context(manifest, request.kube_context.as_deref());
        if let Some(ctx) = &context {
            presenter.event(&PresentationEvent::KubeContextSelected {
                context: ctx.clone(),
            });
        }

        let provider = manifest.kind.provider();
        presenter.event(&PresentationEvent::ProviderDetected {
            kind: manifest.kind.as_str().to_string(),
            provider,
            requires_credentials: provider.requires_credentials(),
        });
        tracker.advance(InvocationState::ProviderDetected)?;

        let credential = self.load_credential(manifest, request, loaded.provider_config.clone())?;
        let mut env = BTreeMap::new();
        if let Some(loaded) = &credential {
            let generated = loaded.credential.to_environment(self.dirs.root())?;
            for file in &generated.files {
                track(cleanup, file, keep_files);
            }
            presenter.event(&PresentationEvent::CredentialsLoaded {
                provider,
                variables: generated.keys().iter().map(|k| k.to_string()).collect(),
            });
            env.extend(generated.vars);
        }
        if let Some(ctx) = context {
            env.insert(KUBE_CONTEXT_ENV.to_string(), ctx);
        }
        debug!("Tool environment keys: {:?}", env.keys().collect::<Vec<_>>());
        tracker.advance(InvocationState::CredsLoaded)?;

        let backend = if provisioner.is_hcl() {
            HclRunner::new(Arc::clone(&self.runner), provisioner).check_available()?;
            Some(self.backend_stage(manifest, provisioner, request, presenter)?)
        } else {
            PulumiRunner::new(Arc::clone(&self.runner)).check_available()?;
            None
        };
        tracker.advance(InvocationState::BackendResolved)?;

        let resource_id = manifest.resource_id();
        let module = ModuleResolver::new(&self.dirs, &self.staging, self.runner.as_ref()).resolve(
            manifest.kind,
            provisioner,
            &resource_id,
            &request.module,
            cleanup,
        )?;
        info!("{} module directory: {}", provisioner.binary(), module.path.display());
        presenter.event(&PresentationEvent::ExecutionPrepared {
            resource_id: resource_id.clone(),
            module_dir: module.path.clone(),
        });
        tracker.advance(InvocationState::WorkspaceReady)?;

        let result = match backend {
            Some(backend) => self.dispatch_hcl(
                operation,
                provisioner,
                request,
                &module.path,
                manifest,
                &backend,
                &env,
                presenter,
                tracker,
            )?,
            None => {
                let stack_input =
                    build_stack_input_yaml(manifest, credential.as_ref().map(|c| &c.document))?;
                let path = write_stack_input_file(&self.dirs.downloads(), &stack_input)?;
                track(cleanup, &path, keep_files);
                env.insert(
                    STACK_INPUT_FILE_ENV.to_string(),
                    path.to_string_lossy().into_owned(),
                );
                self.dispatch_pulumi(operation, request, &module.path, manifest, &env, presenter, tracker)?
            }
        };

        Ok(InvocationOutcome {
            operation,
            provisioner,
            resource_id,
            module,
            result,
            states: Vec::new(),
        })
    }

    async fn load_stage(
        &self,
        source: &ManifestSource,
        overrides: &[String],
        keep_files: bool,
        presenter: &dyn Presenter,
        cleanup: &mut CleanupContext,
        tracker: &mut InvocationTracker,
    ) -> IacResult<LoadedManifest> {
        self.dirs.ensure()?;
        let resolved = self.resolver.resolve(source).await?;
        if resolved.is_temp {
            track(cleanup, &resolved.path, keep_files);
        }
        tracker.advance(InvocationState::Resolved)?;

        let overrides = FieldOverride::parse_all(overrides)?;
        let (path, rewritten) =
            apply_overrides_to_file(&resolved.path, &overrides, &self.dirs.downloads())?;
        if rewritten {
            track(cleanup, &path, keep_files);
        }

        let manifest = load_manifest(&path)?;
        tracker.advance(InvocationState::Loaded)?;
        presenter.event(&PresentationEvent::ManifestLoaded {
            path: resolved.path.clone(),
            kind: manifest.kind.as_str().to_string(),
            name: manifest.name().to_string(),
        });
        if !overrides.is_empty() {
            presenter.event(&PresentationEvent::OverridesApplied {
                count: overrides.len(),
            });
        }

        Ok(LoadedManifest {
            manifest,
            provider_config: resolved.provider_config,
            overrides_applied: overrides.len(),
        })
    }

    fn validate_stage(
        &self,
        manifest: &Manifest,
        presenter: &dyn Presenter,
        tracker: &mut InvocationTracker,
    ) -> IacResult<()> {
        validate_manifest(manifest)?;
        tracker.advance(InvocationState::Validated)?;
        presenter.event(&PresentationEvent::Validated);
        Ok(())
    }

    /// Flag, then label, then an interactive choice.
    fn select_provisioner(
        &self,
        manifest: &Manifest,
        forced: Option<Provisioner>,
        presenter: &dyn Presenter,
    ) -> IacResult<Provisioner> {
        let from_label = provisioner_from_labels(manifest)?;

        let (provisioner, labelled) = match forced.filter(|p| *p != Provisioner::Unspecified) {
            Some(p) => (p, false),
            None if from_label != Provisioner::Unspecified => (from_label, true),
            None => {
                let chosen = if presenter.is_interactive() {
                    presenter.choose_provisioner()?
                } else {
                    None
                };
                let p = chosen
                    .filter(|p| *p != Provisioner::Unspecified)
                    .ok_or(IacError::ProvisionerRequired {
                        label: PROVISIONER_LABEL,
                    })?;
                (p, false)
            }
        };

        presenter.event(&PresentationEvent::ProvisionerDetected {
            provisioner,
            from_label: labelled,
        });
        Ok(provisioner)
    }

    /// `-p` file first, then the stack input's `provider_config`.
    fn load_credential(
        &self,
        manifest: &Manifest,
        request: &ProvisionRequest,
        from_stack_input: Option<serde_yaml::Value>,
    ) -> IacResult<Option<LoadedCredential>> {
        let provider = manifest.kind.provider();
        if !provider.requires_credentials() {
            if request.provider_config.is_some() {
                warn!("{} does not take provider credentials; ignoring -p", manifest.kind);
            }
            return Ok(None);
        }

        let credential = match (&request.provider_config, from_stack_input) {
            (Some(path), _) => LoadedCredential::load(path, provider)?,
            (None, Some(document)) => LoadedCredential::from_document(document, provider)?,
            (None, None) => {
                return Err(IacError::ProviderConfigRequired {
                    kind: manifest.kind.as_str().to_string(),
                    provider,
                })
            }
        };
        Ok(Some(credential))
    }

    fn backend_stage(
        &self,
        manifest: &Manifest,
        provisioner: Provisioner,
        request: &ProvisionRequest,
        presenter: &dyn Presenter,
    ) -> IacResult<ResolvedBackend> {
        let resolved = resolve_backend(manifest, provisioner, &self.backend_env, &request.backend)?;
        let config = &resolved.config;

        if config.is_incomplete_without_type() {
            presenter.event(&PresentationEvent::BackendIncomplete);
        }
        if config.s3_compatible {
            let reason = if config.region() == Some("auto") {
                S3_REASON_AUTO_REGION
            } else {
                S3_REASON_ENDPOINT
            };
            presenter.event(&PresentationEvent::S3CompatibleDetected { reason });
        }
        if !resolved.is_valid() {
            presenter.event(&PresentationEvent::BackendFieldsMissing {
                validation: resolved.validation.clone(),
            });
        }

        let resolved = resolved.complete(presenter.is_interactive(), |config, validation| {
            presenter.prompt_backend(config, validation)
        })?;
        presenter.event(&PresentationEvent::BackendResolved {
            config: resolved.config.clone(),
        });
        Ok(resolved)
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch_hcl(
        &self,
        operation: Operation,
        provisioner: Provisioner,
        request: &ProvisionRequest,
        module_dir: &Path,
        manifest: &Manifest,
        backend: &ResolvedBackend,
        env: &BTreeMap<String, String>,
        presenter: &dyn Presenter,
        tracker: &mut InvocationTracker,
    ) -> IacResult<Option<ExecutionResult>> {
        let hcl = HclRunner::new(Arc::clone(&self.runner), provisioner);
        let tool = hcl.display_name();
        let options = HclOptions {
            auto_approve: request.auto_approve,
            destroy_plan: request.destroy && operation == Operation::Plan,
            reconfigure: request.reconfigure,
            json: request.json,
        };
        let sink = request.output.as_ref();

        let tfvars = write_tfvars(module_dir, manifest)?;
        let values = backend_config_values(&backend.config, &request.backend_config)?;

        presenter.event(&PresentationEvent::Handoff { tool });
        let init = hcl.init(module_dir, &tfvars, &backend.config, &values, env, &options, sink);
        let init = finish_if_failed(init, tool, presenter, tracker)?;
        tracker.advance(InvocationState::InitDone)?;
        tracker.advance(InvocationState::OperationRunning)?;

        let result = if operation == Operation::Init {
            init
        } else {
            let run = hcl.run_operation(module_dir, operation, &tfvars, env, &options, sink);
            finish_if_failed(run, tool, presenter, tracker)?
        };

        tracker.advance(InvocationState::OperationComplete { success: true })?;
        presenter.event(&PresentationEvent::ToolCompleted { tool, success: true });
        Ok(Some(result))
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch_pulumi(
        &self,
        operation: Operation,
        request: &ProvisionRequest,
        module_dir: &Path,
        manifest: &Manifest,
        env: &BTreeMap<String, String>,
        presenter: &dyn Presenter,
        tracker: &mut InvocationTracker,
    ) -> IacResult<Option<ExecutionResult>> {
        let pulumi = PulumiRunner::new(Arc::clone(&self.runner));
        let tool = Provisioner::Pulumi.display_name();
        let fqdn = request
            .stack
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| pulumi_stack_fqdn(manifest));
        let options = PulumiOptions::for_operation(operation, request.yes, request.diff);

        presenter.event(&PresentationEvent::Handoff { tool });
        let selected = pulumi.select_stack(module_dir, &fqdn, env);
        finish_if_failed(selected, tool, presenter, tracker)?;
        tracker.advance(InvocationState::InitDone)?;
        tracker.advance(InvocationState::OperationRunning)?;

        let run = pulumi.run_operation(
            module_dir,
            operation,
            &fqdn,
            env,
            &options,
            request.output.as_ref(),
        );
        let result = finish_if_failed(run, tool, presenter, tracker)?;

        tracker.advance(InvocationState::OperationComplete { success: true })?;
        presenter.event(&PresentationEvent::ToolCompleted { tool, success: true });
        Ok(result)
    }
}

/// Report a failed tool step before passing the error on.
///
/// A failed operation completes unsuccessfully; a failed `init` goes straight
/// to cleanup.
fn finish_if_failed<T>(
    result: IacResult<T>,
    tool: &'static str,
    presenter: &dyn Presenter,
    tracker: &mut InvocationTracker,
) -> IacResult<T> {
    if result.is_err() {
        if tracker.current() == InvocationState::OperationRunning {
            tracker.advance(InvocationState::OperationComplete { success: false })?;
        }
        presenter.event(&PresentationEvent::ToolCompleted { tool, success: false });
    }
    result
}

fn track(cleanup: &mut CleanupContext, path: &Path, keep: bool) {
    if keep {
        debug!("Keeping {}", path.display());
    } else {
        cleanup.remove_path(path);
    }
}
