//! # planton_backend
//!
//! State backend configuration for the HCL provisioners (OpenTofu, Terraform).
//!
//! ## Features
//!
//! - **Layering**: `PROJECT_PLANTON_BACKEND_*` env < manifest labels < CLI flags
//! - **Legacy Labels**: `terraform.` label prefix used when provisioner labels are absent
//! - **Validation**: Required fields per backend type with flag/env/label guidance
//! - **S3-Compatible Stores**: R2 and MinIO detection with the needed skip flags
//! - **Emission**: `backend.tf` and `--backend-config` arguments for `init`
//!
//! ## Example
//!
//! ```rust,no_run
//! use planton_backend::{backend_config_values, env, resolve_backend, BackendConfig};
//! use planton_manifest::{load_manifest, Provisioner};
//! use std::path::Path;
//!
//! let manifest = load_manifest(Path::new("bucket.yaml")).unwrap();
//! let flags = BackendConfig::new().with_region("auto");
//!
//! let resolved = resolve_backend(&manifest, Provisioner::Tofu, &env::from_env(), &flags).unwrap();
//! let resolved = resolved.complete(false, |_, _| Ok(())).unwrap();
//! println!("{:?}", backend_config_values(&resolved.config, &[]).unwrap());
//! ```

pub mod config;
pub mod emit;
pub mod env;
pub mod error;
pub mod labels;
pub mod prompt;
pub mod resolve;
pub mod validate;

pub use config::{BackendConfig, BackendType};
pub use emit::{
    backend_config_args, backend_config_values, render_backend_file, write_backend_file,
    BACKEND_FILE_NAME, S3_COMPATIBLE_FLAGS,
};
pub use error::{BackendError, BackendResult};
pub use labels::backend_label_key;
pub use prompt::{is_interactive, prompt_missing_fields, prompt_missing_fields_stdin};
pub use resolve::{resolve_backend, ResolvedBackend};
pub use validate::{validate_backend, MissingField, ValidationResult};
