//! Flag groups shared by the provisioning commands.

use std::path::PathBuf;

use clap::Args;
use planton_backend::BackendConfig;
use planton_iac::{ModuleOptions, ProvisionRequest};
use planton_manifest::ManifestSource;

/// Where the manifest comes from, plus `--set` overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ManifestArgs {
    /// Manifest file path or http(s) URL
    #[arg(short = 'f', long = "manifest", value_name = "PATH")]
    pub manifest: Option<String>,

    /// Read the manifest (or a path to it) from the clipboard
    #[arg(short = 'c', long = "clipboard", visible_aliases = ["clip", "cb"])]
    pub clipboard: bool,

    /// Stack input file ({target, provider_config}); without a path, combine with -c
    #[arg(
        short = 'i',
        long = "stack-input",
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub stack_input: Option<String>,

    /// Kustomize base directory
    #[arg(long, value_name = "DIR", requires = "overlay")]
    pub kustomize_dir: Option<PathBuf>,

    /// Kustomize overlay to build
    #[arg(long, value_name = "NAME")]
    pub overlay: Option<String>,

    /// Directory holding target.yaml
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Field override, e.g. --set spec.replicas=3 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

impl ManifestArgs {
    pub fn source(&self) -> ManifestSource {
        let (stack_input, from_clipboard) = match self.stack_input.as_deref() {
            Some("") => (None, true),
            Some(path) => (Some(PathBuf::from(path)), false),
            None => (None, false),
        };
        ManifestSource {
            stack_input,
            stack_input_from_clipboard: from_clipboard,
            clipboard: self.clipboard,
            manifest: self.manifest.clone(),
            kustomize_dir: self.kustomize_dir.clone(),
            overlay: self.overlay.clone(),
            input_dir: self.input_dir.clone(),
        }
    }
}

/// Backend overrides; the highest-priority layer.
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// State backend type: local, s3, gcs or azurerm
    #[arg(long, value_name = "TYPE")]
    pub backend_type: Option<String>,

    /// Bucket (container for azurerm)
    #[arg(long, value_name = "NAME")]
    pub backend_bucket: Option<String>,

    /// State object key (prefix for gcs)
    #[arg(long, value_name = "KEY")]
    pub backend_key: Option<String>,

    /// Region; 'auto' for S3-compatible stores
    #[arg(long, value_name = "REGION")]
    pub backend_region: Option<String>,

    /// Custom S3 endpoint (R2, MinIO)
    #[arg(long, value_name = "URL")]
    pub backend_endpoint: Option<String>,

    /// Raw backend setting passed to init (repeatable)
    #[arg(long = "backend-config", value_name = "KEY=VALUE")]
    pub backend_config: Vec<String>,

    /// Force backend reinitialization
    #[arg(long)]
    pub reconfigure: bool,
}

impl BackendArgs {
    pub fn config(&self) -> BackendConfig {
        let mut config = BackendConfig::new();
        let fields = [
            ("type", &self.backend_type),
            ("bucket", &self.backend_bucket),
            ("key", &self.backend_key),
            ("region", &self.backend_region),
            ("endpoint", &self.backend_endpoint),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                config.set_field(name, v);
            }
        }
        config
    }
}

/// Flags of `apply`, `plan`, `destroy`, `refresh` and `init`.
#[derive(Args, Debug, Clone, Default)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Provider credential file; the provider is detected from the manifest kind
    #[arg(short = 'p', long, value_name = "PATH")]
    pub provider_config: Option<PathBuf>,

    /// Kubernetes context for the modules
    #[arg(long, value_name = "NAME")]
    pub kube_context: Option<String>,

    /// Run the module in this directory
    #[arg(long, value_name = "DIR")]
    pub module_dir: Option<PathBuf>,

    /// Tag, branch or commit of the modules repository
    #[arg(long, value_name = "REF")]
    pub module_version: Option<String>,

    /// Use a local checkout of the modules repository
    #[arg(long)]
    pub local_module: bool,

    /// Local repository used with --local-module
    #[arg(long = "project-planton-git-repo", value_name = "DIR")]
    pub local_repo: Option<PathBuf>,

    /// Keep per-invocation workspace copies and temporary files
    #[arg(long)]
    pub no_cleanup: bool,

    /// Apply or destroy without confirmation
    #[arg(long)]
    pub auto_approve: bool,

    /// With plan: produce a destroy plan
    #[arg(long)]
    pub destroy: bool,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Pulumi stack (org/project/stack)
    #[arg(long, value_name = "FQDN")]
    pub stack: Option<String>,

    /// Pulumi: skip confirmation, also for preview
    #[arg(long)]
    pub yes: bool,

    /// Pulumi: show a detailed diff
    #[arg(long)]
    pub diff: bool,

    /// Stream machine-readable tool output (OpenTofu/Terraform -json)
    #[arg(long)]
    pub json: bool,
}

impl ProvisionArgs {
    pub fn to_request(&self) -> ProvisionRequest {
        ProvisionRequest {
            source: self.manifest.source(),
            overrides: self.manifest.overrides.clone(),
            provider_config: self.provider_config.clone(),
            kube_context: self.kube_context.clone(),
            provisioner: None,
            module: ModuleOptions {
                module_dir: self.module_dir.clone(),
                module_version: self.module_version.clone(),
                local_module: self.local_module,
                local_repo: self.local_repo.clone(),
                no_cleanup: self.no_cleanup,
            },
            backend: self.backend.config(),
            backend_config: self.backend.backend_config.clone(),
            auto_approve: self.auto_approve,
            destroy: self.destroy,
            reconfigure: self.backend.reconfigure,
            json: self.json,
            stack: self.stack.clone(),
            yes: self.yes,
            diff: self.diff,
            output: None,
        }
    }
}
