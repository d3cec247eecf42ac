//! # planton_manifest
//!
//! Manifest resolution, loading and validation for Project Planton.
//!
//! A manifest is a YAML document with `apiVersion`, `kind`, `metadata` and
//! `spec`. This crate turns whatever the user pointed at (a file, a URL, the
//! clipboard, a stack input or a kustomize overlay) into a validated,
//! defaults-filled [`Manifest`].
//!
//! ## Features
//!
//! - **Resolver**: Priority-ordered input modes, each producing one manifest file
//! - **Registry**: Closed set of resource kinds with provider, id prefix and spec schema
//! - **Loader**: Strict decoding with did-you-mean suggestions and line/column hints
//! - **Defaults**: Schema defaults filled only where a field is unset
//! - **Overrides**: `--set key=value` applied to a copy, re-decoded after each pass
//! - **Validation**: Field rules and cross-field constraints, all violations reported
//! - **Labels**: Provisioner, kube-context and Pulumi stack labels
//!
//! ## Example
//!
//! ```rust,no_run
//! use planton_manifest::{load_validated_manifest, provisioner_from_labels};
//! use std::path::Path;
//!
//! let manifest = load_validated_manifest(Path::new("bucket.yaml")).unwrap();
//! println!("{} {}", manifest.kind, manifest.name());
//!
//! let provisioner = provisioner_from_labels(&manifest).unwrap();
//! println!("provisioner: {}", provisioner);
//! ```

pub mod defaults;
pub mod detect;
pub mod error;
mod kinds;
pub mod labels;
pub mod loader;
pub mod model;
pub mod overrides;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod suggest;
pub mod validate;

pub use defaults::apply_defaults;
pub use detect::{detect_from_manifest, detect_kind, DetectionResult};
pub use error::{ErrorCategory, ManifestError, ManifestResult};
pub use labels::{
    kube_context, provisioner_from_labels, pulumi_stack_fqdn, Provisioner, KUBE_CONTEXT_LABEL,
    PROVISIONER_LABEL, PULUMI_ORGANIZATION_LABEL, PULUMI_PROJECT_LABEL, PULUMI_STACK_FQDN_LABEL,
    PULUMI_STACK_NAME_LABEL,
};
pub use loader::{
    decode_manifest, load_manifest, load_validated_manifest, parse_manifest, write_manifest,
};
pub use model::{Manifest, Metadata};
pub use overrides::{apply_overrides, apply_overrides_to_file, FieldOverride};
pub use registry::{kinds_for_provider, KindInfo, ResourceKind, API_DOMAIN};
pub use resolver::{
    ClipboardReader, HttpFetcher, ManifestFetcher, ManifestResolver, ManifestSource,
    ResolvedManifest, StackInput,
};
pub use validate::{validate_manifest, FieldViolation, ManifestValidator, ValidationReport};
