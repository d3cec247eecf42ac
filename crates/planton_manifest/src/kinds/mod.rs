//! Spec schemas for every registered kind, grouped by provider.

mod aws;
mod azure;
mod gcp;
mod kubernetes;
mod others;

use planton_provider::CloudProvider;

use crate::registry::{KindInfo, ResourceKind};
use crate::schema::{FieldSchema, MessageSchema};

pub(crate) const CIDR_PATTERN: &str = r"^(\d{1,3}\.){3}\d{1,3}/\d{1,2}$";
pub(crate) const DOMAIN_PATTERN: &str = r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$";
pub(crate) const DNS_RECORD_TYPES: &[&str] = &["A", "AAAA", "CNAME", "MX", "TXT", "NS", "SRV", "CAA"];

/// Registry entry for `kind`.
pub(crate) fn definition(kind: ResourceKind) -> KindInfo {
    use CloudProvider as P;
    use ResourceKind as K;

    match kind {
        K::AwsDocumentDb => KindInfo::new(P::Aws, "awsdocdb", aws::document_db()),
        K::AwsS3Bucket => KindInfo::new(P::Aws, "s3bkt", aws::s3_bucket()),
        K::AwsRoute53Zone => KindInfo::new(P::Aws, "r53zone", aws::route53_zone()),
        K::AwsRoute53DnsRecord => KindInfo::new(P::Aws, "r53rec", aws::route53_dns_record()),
        K::AzureAksNodePool => KindInfo::new(P::Azure, "aksnp", azure::aks_node_pool()),
        K::AzureDnsRecord => KindInfo::new(P::Azure, "azdnsr", azure::dns_record()),
        K::AzureStorageAccount => KindInfo::new(P::Azure, "azsa", azure::storage_account()),
        K::AzureVirtualMachine => KindInfo::new(P::Azure, "azvm", azure::virtual_machine()),
        K::GcpCertManagerCert => KindInfo::new(P::Gcp, "gcpcert", gcp::cert_manager_cert()),
        K::GcpComputeInstance => KindInfo::new(P::Gcp, "gcpvm", gcp::compute_instance()),
        K::GcpDnsRecord => KindInfo::new(P::Gcp, "gcpdnsr", gcp::dns_record()),
        K::GcpGkeCluster => KindInfo::new(P::Gcp, "gke", gcp::gke_cluster()),
        K::GcpGkeNodePool => KindInfo::new(P::Gcp, "gkenp", gcp::gke_node_pool()),
        K::GcpRouterNat => KindInfo::new(P::Gcp, "gcpnat", gcp::router_nat()),
        K::KubernetesCertManager => {
            KindInfo::new(P::Kubernetes, "k8scm", kubernetes::cert_manager())
        }
        K::KubernetesExternalSecrets => {
            KindInfo::new(P::Kubernetes, "k8ses", kubernetes::external_secrets())
        }
        K::KubernetesGatewayApiCrds => {
            KindInfo::new(P::Kubernetes, "k8sgwcrd", kubernetes::gateway_api_crds())
        }
        K::KubernetesRookCephOperator => {
            KindInfo::new(P::Kubernetes, "k8srco", kubernetes::rook_ceph_operator())
        }
        K::CloudflareDnsZone => KindInfo::new(P::Cloudflare, "cfzone", others::cloudflare_dns_zone()),
        K::CloudflareDnsRecord => {
            KindInfo::new(P::Cloudflare, "cfdns", others::cloudflare_dns_record())
        }
        K::DigitalOceanVpc => KindInfo::new(P::DigitalOcean, "dovpc", others::digital_ocean_vpc()),
        K::DigitalOceanDnsZone => {
            KindInfo::new(P::DigitalOcean, "dozone", others::digital_ocean_dns_zone())
        }
        K::DigitalOceanKubernetesCluster => KindInfo::new(
            P::DigitalOcean,
            "dok8s",
            others::digital_ocean_kubernetes_cluster(),
        ),
        K::CivoDatabase => KindInfo::new(P::Civo, "civodb", others::civo_database()),
        K::CivoKubernetesCluster => {
            KindInfo::new(P::Civo, "civok8s", others::civo_kubernetes_cluster())
        }
        K::MongodbAtlas => KindInfo::new(P::Atlas, "mdbatl", others::mongodb_atlas()),
        K::Auth0Client => KindInfo::new(P::Auth0, "a0cli", others::auth0_client()),
        K::ConfluentKafka => KindInfo::new(P::Confluent, "cnfkfk", others::confluent_kafka()),
        K::SnowflakeDatabase => KindInfo::new(P::Snowflake, "sfdb", others::snowflake_database()),
        K::OpenFgaStore => KindInfo::new(P::OpenFga, "fgastore", others::openfga_store()),
        K::LocalFile => KindInfo::new(P::Unspecified, "lclfile", others::local_file()),
    }
}

/// `{minNodes, maxNodes}` autoscaling block shared by node pool kinds.
pub(crate) fn autoscaling() -> MessageSchema {
    MessageSchema::new("Autoscaling")
        .field(FieldSchema::int("minNodes").required().min(1.0))
        .field(FieldSchema::int("maxNodes").required().min(1.0))
        .constraint(crate::schema::Constraint::Custom {
            description: "minNodes must not exceed maxNodes",
            check: min_not_above_max,
        })
}

fn min_not_above_max(msg: &serde_json::Map<String, serde_json::Value>) -> Result<(), String> {
    let min = msg.get("minNodes").and_then(|v| v.as_i64());
    let max = msg.get("maxNodes").and_then(|v| v.as_i64());
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(format!(
            "minNodes ({}) must not exceed maxNodes ({})",
            min, max
        )),
        _ => Ok(()),
    }
}

/// Kubernetes container resource requests and limits.
pub(crate) fn container_resources(
    cpu_limit: &'static str,
    memory_limit: &'static str,
    cpu_request: &'static str,
    memory_request: &'static str,
) -> MessageSchema {
    let quantity = |name, default: &'static str| FieldSchema::string(name).default_value(default);

    MessageSchema::new("Container").field(FieldSchema::message(
        "resources",
        MessageSchema::new("ContainerResources")
            .field(FieldSchema::message(
                "limits",
                MessageSchema::new("CpuMemory")
                    .field(quantity("cpu", cpu_limit))
                    .field(quantity("memory", memory_limit)),
            ))
            .field(FieldSchema::message(
                "requests",
                MessageSchema::new("CpuMemory")
                    .field(quantity("cpu", cpu_request))
                    .field(quantity("memory", memory_request)),
            )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_defaults_match_field_types() {
        fn check(schema: &MessageSchema) {
            for field in &schema.fields {
                if let Some(default) = &field.default {
                    assert!(
                        field.ty.is_scalar(),
                        "{}.{} has a default but is not scalar",
                        schema.name,
                        field.name
                    );
                    if let crate::schema::FieldType::Enum(values) = &field.ty {
                        let s = default.as_str().unwrap_or_default();
                        assert!(values.contains(&s), "{}.{}", schema.name, field.name);
                    }
                }
                if let Some(inner) = field.ty.as_message() {
                    check(inner);
                }
            }
        }
        for kind in ResourceKind::all() {
            check(kind.spec_schema());
        }
    }

    #[test]
    fn test_patterns_compile() {
        fn check(schema: &MessageSchema) {
            for field in &schema.fields {
                for rule in &field.rules {
                    if let crate::schema::Rule::Pattern(p) = rule {
                        assert!(p.regex().is_ok(), "bad pattern {}", p.as_str());
                    }
                }
                if let Some(inner) = field.ty.as_message() {
                    check(inner);
                }
                if let crate::schema::FieldType::List(item) = &field.ty {
                    if let Some(inner) = item.as_message() {
                        check(inner);
                    }
                }
            }
        }
        for kind in ResourceKind::all() {
            check(kind.spec_schema());
        }
    }

    #[test]
    fn test_autoscaling_bounds() {
        let ok = json!({"minNodes": 1, "maxNodes": 3});
        let bad = json!({"minNodes": 5, "maxNodes": 3});
        assert!(min_not_above_max(ok.as_object().unwrap()).is_ok());
        assert!(min_not_above_max(bad.as_object().unwrap()).is_err());
    }
}
