//! Closed registry of resource kinds.

use std::collections::HashMap;
use std::sync::OnceLock;

use planton_provider::CloudProvider;
use serde::{Serialize, Serializer};

use crate::kinds;
use crate::schema::MessageSchema;

/// Domain suffix shared by every manifest `apiVersion` group.
pub const API_DOMAIN: &str = "project-planton.org";

/// Every resource kind the engine can provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    AwsDocumentDb,
    AwsS3Bucket,
    AwsRoute53Zone,
    AwsRoute53DnsRecord,
    AzureAksNodePool,
    AzureDnsRecord,
    AzureStorageAccount,
    AzureVirtualMachine,
    GcpCertManagerCert,
    GcpComputeInstance,
    GcpDnsRecord,
    GcpGkeCluster,
    GcpGkeNodePool,
    GcpRouterNat,
    KubernetesCertManager,
    KubernetesExternalSecrets,
    KubernetesGatewayApiCrds,
    KubernetesRookCephOperator,
    CloudflareDnsZone,
    CloudflareDnsRecord,
    DigitalOceanVpc,
    DigitalOceanDnsZone,
    DigitalOceanKubernetesCluster,
    CivoDatabase,
    CivoKubernetesCluster,
    MongodbAtlas,
    Auth0Client,
    ConfluentKafka,
    SnowflakeDatabase,
    OpenFgaStore,
    LocalFile,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::AwsDocumentDb => "AwsDocumentDb",
            ResourceKind::AwsS3Bucket => "AwsS3Bucket",
            ResourceKind::AwsRoute53Zone => "AwsRoute53Zone",
            ResourceKind::AwsRoute53DnsRecord => "AwsRoute53DnsRecord",
            ResourceKind::AzureAksNodePool => "AzureAksNodePool",
            ResourceKind::AzureDnsRecord => "AzureDnsRecord",
            ResourceKind::AzureStorageAccount => "AzureStorageAccount",
            ResourceKind::AzureVirtualMachine => "AzureVirtualMachine",
            ResourceKind::GcpCertManagerCert => "GcpCertManagerCert",
            ResourceKind::GcpComputeInstance => "GcpComputeInstance",
            ResourceKind::GcpDnsRecord => "GcpDnsRecord",
            ResourceKind::GcpGkeCluster => "GcpGkeCluster",
            ResourceKind::GcpGkeNodePool => "GcpGkeNodePool",
            ResourceKind::GcpRouterNat => "GcpRouterNat",
            ResourceKind::KubernetesCertManager => "KubernetesCertManager",
            ResourceKind::KubernetesExternalSecrets => "KubernetesExternalSecrets",
            ResourceKind::KubernetesGatewayApiCrds => "KubernetesGatewayApiCrds",
            ResourceKind::KubernetesRookCephOperator => "KubernetesRookCephOperator",
            ResourceKind::CloudflareDnsZone => "CloudflareDnsZone",
            ResourceKind::CloudflareDnsRecord => "CloudflareDnsRecord",
            ResourceKind::DigitalOceanVpc => "DigitalOceanVpc",
            ResourceKind::DigitalOceanDnsZone => "DigitalOceanDnsZone",
            ResourceKind::DigitalOceanKubernetesCluster => "DigitalOceanKubernetesCluster",
            ResourceKind::CivoDatabase => "CivoDatabase",
            ResourceKind::CivoKubernetesCluster => "CivoKubernetesCluster",
            ResourceKind::MongodbAtlas => "MongodbAtlas",
            ResourceKind::Auth0Client => "Auth0Client",
            ResourceKind::ConfluentKafka => "ConfluentKafka",
            ResourceKind::SnowflakeDatabase => "SnowflakeDatabase",
            ResourceKind::OpenFgaStore => "OpenFgaStore",
            ResourceKind::LocalFile => "LocalFile",
        }
    }

    /// Exact (case-sensitive) lookup by kind name.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|k| k.as_str() == s)
    }

    pub fn all() -> Vec<Self> {
        vec![
            ResourceKind::AwsDocumentDb,
            ResourceKind::AwsS3Bucket,
            ResourceKind::AwsRoute53Zone,
            ResourceKind::AwsRoute53DnsRecord,
            ResourceKind::AzureAksNodePool,
            ResourceKind::AzureDnsRecord,
            ResourceKind::AzureStorageAccount,
            ResourceKind::AzureVirtualMachine,
            ResourceKind::GcpCertManagerCert,
            ResourceKind::GcpComputeInstance,
            ResourceKind::GcpDnsRecord,
            ResourceKind::GcpGkeCluster,
            ResourceKind::GcpGkeNodePool,
            ResourceKind::GcpRouterNat,
            ResourceKind::KubernetesCertManager,
            ResourceKind::KubernetesExternalSecrets,
            ResourceKind::KubernetesGatewayApiCrds,
            ResourceKind::KubernetesRookCephOperator,
            ResourceKind::CloudflareDnsZone,
            ResourceKind::CloudflareDnsRecord,
            ResourceKind::DigitalOceanVpc,
            ResourceKind::DigitalOceanDnsZone,
            ResourceKind::DigitalOceanKubernetesCluster,
            ResourceKind::CivoDatabase,
            ResourceKind::CivoKubernetesCluster,
            ResourceKind::MongodbAtlas,
            ResourceKind::Auth0Client,
            ResourceKind::ConfluentKafka,
            ResourceKind::SnowflakeDatabase,
            ResourceKind::OpenFgaStore,
            ResourceKind::LocalFile,
        ]
    }

    pub fn provider(&self) -> CloudProvider {
        self.info().provider
    }

    pub fn id_prefix(&self) -> &'static str {
        self.info().id_prefix
    }

    /// Expected `apiVersion` for manifests of this kind.
    pub fn api_version(&self) -> String {
        format!("{}.{}/v1", self.provider().api_group(), API_DOMAIN)
    }

    /// Directory name of the kind inside the modules repository.
    pub fn module_name(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// Schema of the kind's `spec`.
    pub fn spec_schema(&self) -> &'static MessageSchema {
        &self.info().spec
    }

    fn info(&self) -> &'static KindInfo {
        &registry()[self]
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ResourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Registry entry for one kind.
#[derive(Debug)]
pub struct KindInfo {
    pub provider: CloudProvider,
    pub id_prefix: &'static str,
    pub spec: MessageSchema,
}

impl KindInfo {
    pub fn new(provider: CloudProvider, id_prefix: &'static str, spec: MessageSchema) -> Self {
        Self {
            provider,
            id_prefix,
            spec,
        }
    }
}

/// Dispatch table, built once from `ResourceKind::all()`.
fn registry() -> &'static HashMap<ResourceKind, KindInfo> {
    static REGISTRY: OnceLock<HashMap<ResourceKind, KindInfo>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        ResourceKind::all()
            .into_iter()
            .map(|kind| (kind, kinds::definition(kind)))
            .collect()
    })
}

/// Kinds targeting the given provider.
pub fn kinds_for_provider(provider: CloudProvider) -> Vec<ResourceKind> {
    ResourceKind::all()
        .into_iter()
        .filter(|k| k.provider() == provider)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_registered() {
        for kind in ResourceKind::all() {
            assert!(registry().contains_key(&kind), "{} missing", kind);
            assert!(!kind.id_prefix().is_empty());
        }
        assert_eq!(registry().len(), ResourceKind::all().len());
    }

    #[test]
    fn test_from_str_is_case_sensitive() {
        assert_eq!(
            ResourceKind::from_str("AwsDocumentDb"),
            Some(ResourceKind::AwsDocumentDb)
        );
        assert_eq!(ResourceKind::from_str("awsdocumentdb"), None);
        assert_eq!(ResourceKind::from_str("AwsDocumentDB"), None);
    }

    #[test]
    fn test_api_versions() {
        assert_eq!(
            ResourceKind::AwsDocumentDb.api_version(),
            "aws.project-planton.org/v1"
        );
        assert_eq!(
            ResourceKind::DigitalOceanVpc.api_version(),
            "digitalocean.project-planton.org/v1"
        );
        assert_eq!(
            ResourceKind::LocalFile.api_version(),
            "local.project-planton.org/v1"
        );
    }

    #[test]
    fn test_id_prefixes_are_unique() {
        let mut prefixes: Vec<_> = ResourceKind::all().iter().map(|k| k.id_prefix()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), ResourceKind::all().len());
    }

    #[test]
    fn test_every_provider_has_a_kind() {
        for provider in CloudProvider::all() {
            assert!(
                !kinds_for_provider(provider).is_empty(),
                "no kinds for {}",
                provider
            );
        }
        assert_eq!(
            kinds_for_provider(CloudProvider::Unspecified),
            vec![ResourceKind::LocalFile]
        );
    }
}
