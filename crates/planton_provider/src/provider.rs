//! Cloud provider definitions.

use serde::{Deserialize, Serialize};

/// Cloud providers a resource kind can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudProvider {
    Unspecified,
    Atlas,
    Auth0,
    Aws,
    Azure,
    Civo,
    Cloudflare,
    Confluent,
    DigitalOcean,
    Gcp,
    Kubernetes,
    #[serde(rename = "openfga", alias = "open_fga")]
    OpenFga,
    Snowflake,
}

impl CloudProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Unspecified => "unspecified",
            CloudProvider::Atlas => "atlas",
            CloudProvider::Auth0 => "auth0",
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Civo => "civo",
            CloudProvider::Cloudflare => "cloudflare",
            CloudProvider::Confluent => "confluent",
            CloudProvider::DigitalOcean => "digital_ocean",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Kubernetes => "kubernetes",
            CloudProvider::OpenFga => "openfga",
            CloudProvider::Snowflake => "snowflake",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unspecified" | "" => Some(CloudProvider::Unspecified),
            "atlas" => Some(CloudProvider::Atlas),
            "auth0" => Some(CloudProvider::Auth0),
            "aws" => Some(CloudProvider::Aws),
            "azure" => Some(CloudProvider::Azure),
            "civo" => Some(CloudProvider::Civo),
            "cloudflare" => Some(CloudProvider::Cloudflare),
            "confluent" => Some(CloudProvider::Confluent),
            "digital_ocean" | "digitalocean" => Some(CloudProvider::DigitalOcean),
            "gcp" => Some(CloudProvider::Gcp),
            "kubernetes" => Some(CloudProvider::Kubernetes),
            "openfga" | "open_fga" => Some(CloudProvider::OpenFga),
            "snowflake" => Some(CloudProvider::Snowflake),
            _ => None,
        }
    }

    /// All providers that accept credentials, in catalogue order.
    pub fn all() -> Vec<Self> {
        vec![
            CloudProvider::Atlas,
            CloudProvider::Auth0,
            CloudProvider::Aws,
            CloudProvider::Azure,
            CloudProvider::Civo,
            CloudProvider::Cloudflare,
            CloudProvider::Confluent,
            CloudProvider::DigitalOcean,
            CloudProvider::Gcp,
            CloudProvider::Kubernetes,
            CloudProvider::OpenFga,
            CloudProvider::Snowflake,
        ]
    }

    /// Human-friendly name used in terminal output.
    pub fn display_name(&self) -> &'static str {
        match self {
            CloudProvider::Unspecified => "Unspecified",
            CloudProvider::Atlas => "MongoDB Atlas",
            CloudProvider::Auth0 => "Auth0",
            CloudProvider::Aws => "AWS",
            CloudProvider::Azure => "Azure",
            CloudProvider::Civo => "Civo",
            CloudProvider::Cloudflare => "Cloudflare",
            CloudProvider::Confluent => "Confluent",
            CloudProvider::DigitalOcean => "DigitalOcean",
            CloudProvider::Gcp => "GCP",
            CloudProvider::Kubernetes => "Kubernetes",
            CloudProvider::OpenFga => "OpenFGA",
            CloudProvider::Snowflake => "Snowflake",
        }
    }

    pub fn requires_credentials(&self) -> bool {
        !matches!(self, CloudProvider::Unspecified)
    }

    /// Directory name of this provider inside the modules repository.
    pub fn module_dir(&self) -> &'static str {
        match self {
            CloudProvider::DigitalOcean => "digitalocean",
            CloudProvider::Unspecified => "_unspecified",
            other => other.as_str(),
        }
    }

    /// Group used in the `apiVersion` of manifests for this provider.
    pub fn api_group(&self) -> &'static str {
        match self {
            CloudProvider::DigitalOcean => "digitalocean",
            CloudProvider::Unspecified => "local",
            other => other.as_str(),
        }
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
