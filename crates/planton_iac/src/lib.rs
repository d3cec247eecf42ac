//! # planton_iac
//!
//! Workspace materialization and IaC dispatch for Project Planton.
//!
//! # Features
//!
//! - **Staging**: One clone of the modules repository with a `.version` sentinel
//! - **Version Pinning**: Per-invocation copies checked out at `--module-version`
//! - **Stack Input**: `{target, provider_config}` YAML with unfolded base64 keys
//! - **HCL Dispatch**: `backend.tf`, tfvars, `init` then the operation (OpenTofu, Terraform)
//! - **Pulumi Dispatch**: `stack select --create` then `up`/`preview`/`refresh`/`destroy`
//! - **Cleanup**: Finalizers run in reverse order on every exit path
//! - **Presentation Events**: Stage boundaries reported through a [`Presenter`]
//!
//! # Example
//!
//! ```rust,no_run
//! use planton_iac::{Engine, Operation, ProvisionRequest, SilentPresenter};
//! use planton_manifest::ManifestSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::from_env()?;
//!
//!     let mut request = ProvisionRequest::new(ManifestSource::from_path("bucket.yaml"));
//!     request.provider_config = Some("aws-provider-config.yaml".into());
//!     request.auto_approve = true;
//!
//!     let outcome = engine.run(Operation::Apply, &request, &SilentPresenter).await?;
//!     println!("Applied {} from {}", outcome.resource_id, outcome.module.path.display());
//!     Ok(())
//! }
//! ```

pub mod cleanup;
pub mod engine;
pub mod error;
pub mod events;
pub mod hcl;
pub mod module;
pub mod operation;
pub mod pulumi;
pub mod stack_input;
pub mod staging;
pub mod state;
pub mod tfvars;
pub mod workspace;

pub use cleanup::CleanupContext;
pub use engine::{Engine, InvocationOutcome, LoadedManifest, ProvisionRequest, KUBE_CONTEXT_ENV};
pub use error::{IacError, IacResult};
pub use events::{PresentationEvent, Presenter, RecordingPresenter, SilentPresenter};
pub use hcl::{HclOptions, HclRunner};
pub use module::{ModuleLocation, ModuleOptions, ModuleResolver, ModuleSource};
pub use operation::Operation;
pub use pulumi::{PulumiOptions, PulumiRunner};
pub use stack_input::{build_stack_input_yaml, write_stack_input_file, STACK_INPUT_FILE_ENV};
pub use staging::{Staging, StagingInfo, VERSION_FILE};
pub use state::{InvocationState, InvocationTracker};
pub use tfvars::{render_tfvars, write_tfvars, TFVARS_FILE_NAME};
pub use workspace::{modules_repo_url, ToolDirs};
