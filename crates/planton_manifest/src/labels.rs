//! Well-known manifest labels read by the engine.

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, ManifestResult};
use crate::model::Manifest;

pub const PROVISIONER_LABEL: &str = "project-planton.org/provisioner";
pub const KUBE_CONTEXT_LABEL: &str = "project-planton.org/kube-context";
pub const PULUMI_STACK_FQDN_LABEL: &str = "pulumi.project-planton.org/stack.fqdn";
pub const PULUMI_ORGANIZATION_LABEL: &str = "pulumi.project-planton.org/organization";
pub const PULUMI_PROJECT_LABEL: &str = "pulumi.project-planton.org/project";
pub const PULUMI_STACK_NAME_LABEL: &str = "pulumi.project-planton.org/stack.name";

/// IaC tool that provisions a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provisioner {
    Pulumi,
    Tofu,
    Terraform,
    Unspecified,
}

impl Provisioner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provisioner::Pulumi => "pulumi",
            Provisioner::Tofu => "tofu",
            Provisioner::Terraform => "terraform",
            Provisioner::Unspecified => "unspecified",
        }
    }

    /// Parse a provisioner name; blank input is `Unspecified`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pulumi" => Some(Provisioner::Pulumi),
            "tofu" | "opentofu" => Some(Provisioner::Tofu),
            "terraform" => Some(Provisioner::Terraform),
            "" | "unspecified" => Some(Provisioner::Unspecified),
            _ => None,
        }
    }

    /// Concrete choices offered to the user.
    pub fn choices() -> [Provisioner; 3] {
        [Provisioner::Pulumi, Provisioner::Tofu, Provisioner::Terraform]
    }

    /// Binary name on PATH.
    pub fn binary(&self) -> &'static str {
        match self {
            Provisioner::Pulumi => "pulumi",
            Provisioner::Tofu => "tofu",
            Provisioner::Terraform | Provisioner::Unspecified => "terraform",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provisioner::Pulumi => "Pulumi",
            Provisioner::Tofu => "OpenTofu",
            Provisioner::Terraform => "Terraform",
            Provisioner::Unspecified => "Unspecified",
        }
    }

    /// Terraform and OpenTofu share HCL modules and backends.
    pub fn is_hcl(&self) -> bool {
        matches!(self, Provisioner::Tofu | Provisioner::Terraform)
    }
}

impl std::fmt::Display for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provisioner requested by the manifest's label.
pub fn provisioner_from_labels(manifest: &Manifest) -> ManifestResult<Provisioner> {
    match manifest.metadata.label(PROVISIONER_LABEL) {
        None => Ok(Provisioner::Unspecified),
        Some(value) => {
            Provisioner::from_str(value).ok_or_else(|| ManifestError::InvalidProvisioner(value.to_string()))
        }
    }
}

/// Kube context from the flag, falling back to the manifest label.
pub fn kube_context(manifest: &Manifest, flag: Option<&str>) -> Option<String> {
    flag.filter(|f| !f.trim().is_empty())
        .or_else(|| manifest.metadata.label(KUBE_CONTEXT_LABEL))
        .map(str::to_string)
}

/// Pulumi stack FQDN from labels, or synthesized from metadata.
pub fn pulumi_stack_fqdn(manifest: &Manifest) -> String {
    let meta = &manifest.metadata;
    if let Some(fqdn) = meta.label(PULUMI_STACK_FQDN_LABEL) {
        return fqdn.to_string();
    }

    if let (Some(org), Some(project), Some(stack)) = (
        meta.label(PULUMI_ORGANIZATION_LABEL),
        meta.label(PULUMI_PROJECT_LABEL),
        meta.label(PULUMI_STACK_NAME_LABEL),
    ) {
        return format!("{}/{}/{}", org, project, stack);
    }

    let org = non_empty(meta.org.as_deref()).unwrap_or("organization");
    let env = non_empty(meta.env.as_deref()).unwrap_or("dev");
    format!(
        "{}/{}/{}.{}",
        org,
        manifest.kind.module_name(),
        env,
        meta.name
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
