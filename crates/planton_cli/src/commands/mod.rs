//! CLI command definitions.
//!
//! Provisioning subcommands share the flag groups in [`args`]; the
//! `tofu`, `terraform` and `pulumi` groups run the same operations with the
//! provisioner forced instead of read from the manifest label.

use clap::{Args, Parser, Subcommand};

pub mod args;
pub mod load_manifest;
pub mod load_tfvars;
pub mod modules;
pub mod provision;
pub mod validate_manifest;
pub mod version;

use args::ProvisionArgs;

/// project-planton - deploy a single cloud resource from a YAML manifest
#[derive(Parser, Debug)]
#[command(name = "project-planton")]
#[command(version, about = "Provision cloud resources from declarative manifests")]
#[command(long_about = r#"
project-planton resolves a resource manifest, detects its cloud provider and
IaC tool, and drives Pulumi, OpenTofu or Terraform through one operation.

OPERATIONS:
  apply (update)       → Create or update the resource
  plan (preview)       → Show what would change
  destroy (delete)     → Remove the resource
  refresh              → Reconcile state with the cloud
  init                 → Initialize the backend (or select the Pulumi stack)

MANIFESTS:
  load-manifest        → Print the resolved manifest with defaults
  validate-manifest    → Validate a manifest against its kind

MODULES:
  pull                 → Update the cached IaC modules
  checkout <version>   → Switch the cached modules to a version
  modules-version      → Show the cached modules version

EXIT CODES:
  0 - Success
  1 - Any error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update the resource
    #[command(visible_alias = "update")]
    Apply(ProvisionArgs),

    /// Preview changes
    #[command(visible_alias = "preview")]
    Plan(ProvisionArgs),

    /// Destroy the resource
    #[command(visible_alias = "delete")]
    Destroy(ProvisionArgs),

    /// Reconcile state with the cloud
    Refresh(ProvisionArgs),

    /// Initialize the backend
    Init(ProvisionArgs),

    /// Print the resolved manifest with defaults and overrides applied
    #[command(name = "load-manifest", visible_alias = "load")]
    LoadManifest(load_manifest::LoadManifestArgs),

    /// Validate a manifest
    #[command(name = "validate-manifest", visible_alias = "validate")]
    ValidateManifest(validate_manifest::ValidateManifestArgs),

    /// Update the cached IaC modules to the latest upstream state
    Pull,

    /// Switch the cached IaC modules to a tag, branch or commit
    Checkout(modules::CheckoutArgs),

    /// Show the location and version of the cached IaC modules
    #[command(name = "modules-version")]
    ModulesVersion,

    /// Print the CLI version
    Version,

    /// Run an operation with OpenTofu
    Tofu(HclGroup),

    /// Run an operation with Terraform
    Terraform(HclGroup),

    /// Run an operation with Pulumi
    Pulumi(PulumiGroup),
}

#[derive(Args, Debug)]
pub struct HclGroup {
    #[command(subcommand)]
    pub command: HclCommand,
}

#[derive(Subcommand, Debug)]
pub enum HclCommand {
    Apply(ProvisionArgs),
    Plan(ProvisionArgs),
    Destroy(ProvisionArgs),
    Refresh(ProvisionArgs),
    Init(ProvisionArgs),

    /// Print the tfvars rendering of a manifest
    #[command(name = "load-tfvars")]
    LoadTfvars(load_tfvars::LoadTfvarsArgs),
}

#[derive(Args, Debug)]
pub struct PulumiGroup {
    #[command(subcommand)]
    pub command: PulumiCommand,
}

#[derive(Subcommand, Debug)]
pub enum PulumiCommand {
    #[command(visible_alias = "up")]
    Update(ProvisionArgs),
    Preview(ProvisionArgs),
    Destroy(ProvisionArgs),
    Refresh(ProvisionArgs),
    Init(ProvisionArgs),
}
