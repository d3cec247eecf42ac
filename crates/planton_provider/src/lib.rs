//! # planton_provider
//!
//! Cloud provider catalogue and credential handling for Project Planton.
//!
//! ## Features
//!
//! - Closed set of cloud providers with display names and module directories
//! - Strict, provider-shaped credential documents (camelCase or snake_case keys)
//! - Translation of credentials into the environment variables IaC modules expect
//! - Kubeconfig synthesis for managed Kubernetes clusters
//! - Guidance text for missing or invalid provider configs
//!
//! ## Example
//!
//! ```rust,no_run
//! use planton_provider::{CloudProvider, LoadedCredential};
//! use std::path::Path;
//!
//! let loaded = LoadedCredential::load(Path::new("aws.yaml"), CloudProvider::Aws).unwrap();
//! let env = loaded.credential.to_environment(Path::new("/tmp")).unwrap();
//! println!("exporting {:?}", env.keys());
//! ```

pub mod credential;
pub mod env_vars;
pub mod error;
pub mod guidance;
pub mod kubeconfig;
pub mod private_file;
pub mod provider;

pub use credential::{
    CloudflareAuthScheme, KubernetesClusterProvider, LoadedCredential, ProviderCredential, Secret,
};
pub use env_vars::CredentialEnvironment;
pub use error::{ProviderError, ProviderResult};
pub use guidance::{
    invalid_provider_config_guidance, kind_detection_error_guidance,
    missing_provider_config_guidance, ProviderGuidance,
};
pub use kubeconfig::{render_kubeconfig, write_kubeconfig, GKE_EXEC_PLUGIN_PATH};
pub use private_file::write_private_file;
pub use provider::CloudProvider;
