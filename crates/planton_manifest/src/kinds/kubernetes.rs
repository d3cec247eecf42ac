use super::{container_resources, DOMAIN_PATTERN};
use crate::schema::{Constraint, FieldSchema, FieldType, MessageSchema};

fn target_cluster() -> MessageSchema {
    MessageSchema::new("KubernetesClusterSelector")
        .field(FieldSchema::string("clusterKind"))
        .field(FieldSchema::string("clusterName"))
}

pub(super) fn cert_manager() -> MessageSchema {
    MessageSchema::new("KubernetesCertManagerSpec")
        .field(FieldSchema::message("targetCluster", target_cluster()))
        .field(FieldSchema::string("namespace").default_value("cert-manager"))
        .field(FieldSchema::bool("createNamespace").default_value(true))
        .field(FieldSchema::string("releaseChannel").default_value("stable"))
        .field(FieldSchema::string("helmChartVersion").default_value("v1.16.1"))
        .field(FieldSchema::bool("skipInstallSelfSignedIssuer"))
        .field(FieldSchema::message(
            "acme",
            MessageSchema::new("AcmeConfig")
                .field(FieldSchema::string("email").required().pattern(r"^[^@\s]+@[^@\s]+$"))
                .field(
                    FieldSchema::string("server")
                        .default_value("https://acme-v02.api.letsencrypt.org/directory"),
                ),
        ))
        .field(FieldSchema::list(
            "dnsProviders",
            FieldType::Message(
                MessageSchema::new("DnsProviderConfig")
                    .field(FieldSchema::string("name").required())
                    .field(
                        FieldSchema::list("dnsZones", FieldType::String)
                            .min_items(1),
                    )
                    .field(FieldSchema::message(
                        "cloudflare",
                        MessageSchema::new("CloudflareSolver")
                            .field(FieldSchema::string("apiToken").required()),
                    ))
                    .field(FieldSchema::message(
                        "gcpCloudDns",
                        MessageSchema::new("GcpCloudDnsSolver")
                            .field(FieldSchema::string("projectId").required())
                            .field(FieldSchema::string("serviceAccountEmail").required()),
                    ))
                    .constraint(Constraint::ExactlyOneOf(&["cloudflare", "gcpCloudDns"])),
            ),
        ))
}

pub(super) fn external_secrets() -> MessageSchema {
    MessageSchema::new("KubernetesExternalSecretsSpec")
        .field(FieldSchema::message("targetCluster", target_cluster()))
        .field(FieldSchema::string("namespace").default_value("external-secrets"))
        .field(FieldSchema::string("helmChartVersion").default_value("v0.9.20"))
        .field(
            FieldSchema::int("pollIntervalSeconds")
                .default_value(10)
                .min(1.0),
        )
        .field(FieldSchema::message(
            "container",
            container_resources("1000m", "1Gi", "50m", "100Mi"),
        ))
        .field(FieldSchema::message(
            "gke",
            MessageSchema::new("GkeSecretsBackend")
                .field(FieldSchema::string("projectId").required())
                .field(FieldSchema::string("gsaEmail").required()),
        ))
        .field(FieldSchema::message(
            "eks",
            MessageSchema::new("EksSecretsBackend")
                .field(FieldSchema::string("region").required())
                .field(FieldSchema::string("irsaRoleArnOverride")),
        ))
        .field(FieldSchema::message(
            "aksKeyVault",
            MessageSchema::new("AksKeyVaultBackend")
                .field(FieldSchema::string("vaultResourceId").required())
                .field(FieldSchema::string("managedIdentityClientId")),
        ))
        .constraint(Constraint::AtMostOneOf(&["gke", "eks", "aksKeyVault"]))
}

pub(super) fn gateway_api_crds() -> MessageSchema {
    MessageSchema::new("KubernetesGatewayApiCrdsSpec")
        .field(FieldSchema::message("targetCluster", target_cluster()))
        .field(
            FieldSchema::string("version")
                .default_value("v1.2.1")
                .pattern(r"^v\d+\.\d+\.\d+$"),
        )
        .field(FieldSchema::message(
            "installChannel",
            MessageSchema::new("InstallChannel").field(
                FieldSchema::enumeration("channel", &["standard", "experimental"])
                    .default_value("standard"),
            ),
        ))
}

pub(super) fn rook_ceph_operator() -> MessageSchema {
    MessageSchema::new("KubernetesRookCephOperatorSpec")
        .field(FieldSchema::message("targetCluster", target_cluster()))
        .field(FieldSchema::string("namespace").default_value("rook-ceph"))
        .field(FieldSchema::bool("createNamespace").default_value(true))
        .field(FieldSchema::string("operatorVersion").default_value("v1.16.6"))
        .field(FieldSchema::bool("crdsEnabled").default_value(true))
        .field(FieldSchema::message(
            "csi",
            MessageSchema::new("CsiConfig")
                .field(FieldSchema::bool("enableRbdDriver").default_value(true))
                .field(FieldSchema::bool("enableCephfsDriver").default_value(true))
                .field(FieldSchema::bool("disableCsiDriver").default_value(false))
                .field(
                    FieldSchema::string("provisionerHost")
                        .pattern(DOMAIN_PATTERN),
                ),
        ))
        .field(FieldSchema::message(
            "container",
            container_resources("500m", "512Mi", "100m", "128Mi"),
        ))
}
