use super::{autoscaling, CIDR_PATTERN, DNS_RECORD_TYPES, DOMAIN_PATTERN};
use crate::schema::{value_or_ref_schema, Constraint, FieldSchema, FieldType, MessageSchema};

pub(super) fn cert_manager_cert() -> MessageSchema {
    MessageSchema::new("GcpCertManagerCertSpec")
        .field(FieldSchema::string("gcpProjectId").required())
        .field(
            FieldSchema::string("primaryDomainName")
                .required()
                .pattern(DOMAIN_PATTERN),
        )
        .field(FieldSchema::list("alternateDomainNames", FieldType::String))
        .field(FieldSchema::value_or_ref("cloudDnsZoneId").required())
        .field(
            FieldSchema::enumeration("certificateType", &["MANAGED", "LOAD_BALANCER"])
                .default_value("MANAGED"),
        )
        .field(FieldSchema::string("validationMethod").default_value("DNS"))
}

pub(super) fn compute_instance() -> MessageSchema {
    MessageSchema::new("GcpComputeInstanceSpec")
        .field(FieldSchema::value_or_ref("projectId").required())
        .field(
            FieldSchema::string("zone")
                .required()
                .pattern(r"^[a-z]+-[a-z]+[0-9]+-[a-z]$"),
        )
        .field(FieldSchema::string("machineType").required())
        .field(FieldSchema::message(
            "bootDisk",
            MessageSchema::new("BootDisk")
                .field(FieldSchema::string("image").required())
                .field(
                    FieldSchema::int("sizeGb")
                        .default_value(10)
                        .range(10.0, 65536.0),
                )
                .field(
                    FieldSchema::enumeration("type", &["pd-standard", "pd-balanced", "pd-ssd"])
                        .default_value("pd-balanced"),
                ),
        ).required())
        .field(FieldSchema::list(
            "networkInterfaces",
            FieldType::Message(
                MessageSchema::new("NetworkInterface")
                    .field(FieldSchema::value_or_ref("network"))
                    .field(FieldSchema::value_or_ref("subnetwork"))
                    .field(FieldSchema::bool("assignExternalIp")),
            ),
        ))
        .field(FieldSchema::list("tags", FieldType::String))
        .field(FieldSchema::string_map("labels"))
        .field(FieldSchema::bool("preemptible"))
        .field(FieldSchema::bool("spot"))
        .constraint(Constraint::AtMostOneOf(&["preemptible", "spot"]))
}

pub(super) fn dns_record() -> MessageSchema {
    MessageSchema::new("GcpDnsRecordSpec")
        .field(FieldSchema::value_or_ref("projectId").required())
        .field(FieldSchema::string("managedZone").required())
        .field(FieldSchema::enumeration("recordType", DNS_RECORD_TYPES).required())
        .field(
            FieldSchema::string("name")
                .required()
                .pattern(r"^(\*\.)?([a-zA-Z0-9_-]+\.)+$"),
        )
        .field(FieldSchema::list("values", FieldType::String).min_items(1))
        .field(
            FieldSchema::int("ttlSeconds")
                .default_value(300)
                .min(1.0),
        )
}

pub(super) fn gke_cluster() -> MessageSchema {
    MessageSchema::new("GcpGkeClusterSpec")
        .field(FieldSchema::value_or_ref("projectId").required())
        .field(FieldSchema::string("location").required())
        .field(FieldSchema::value_or_ref("subnetwork").required())
        .field(FieldSchema::value_or_ref("clusterSecondaryRangeName").required())
        .field(FieldSchema::value_or_ref("servicesSecondaryRangeName").required())
        .field(
            FieldSchema::string("masterIpv4CidrBlock")
                .required()
                .pattern(CIDR_PATTERN),
        )
        .field(FieldSchema::bool("enablePublicNodes").default_value(false))
        .field(
            FieldSchema::enumeration("releaseChannel", &["RAPID", "REGULAR", "STABLE", "NONE"])
                .default_value("REGULAR"),
        )
        .field(FieldSchema::bool("disableNetworkPolicy"))
        .field(FieldSchema::bool("disableWorkloadIdentity"))
        .field(FieldSchema::value_or_ref("routerNatName").required())
}

pub(super) fn gke_node_pool() -> MessageSchema {
    MessageSchema::new("GcpGkeNodePoolSpec")
        .field(FieldSchema::value_or_ref("clusterName").required())
        .field(FieldSchema::string("machineType").default_value("e2-medium"))
        .field(
            FieldSchema::int("diskSizeGb")
                .default_value(100)
                .range(10.0, 65536.0),
        )
        .field(FieldSchema::string("diskType").default_value("pd-standard"))
        .field(FieldSchema::string("imageType").default_value("COS_CONTAINERD"))
        .field(FieldSchema::bool("spot"))
        .field(FieldSchema::int("nodeCount").min(1.0))
        .field(FieldSchema::message("autoscaling", autoscaling()))
        .field(FieldSchema::string_map("nodeLabels"))
        .field(FieldSchema::message(
            "management",
            MessageSchema::new("NodeManagement")
                .field(FieldSchema::bool("disableAutoUpgrade"))
                .field(FieldSchema::bool("disableAutoRepair")),
        ))
        .constraint(Constraint::ExactlyOneOf(&["nodeCount", "autoscaling"]))
}

pub(super) fn router_nat() -> MessageSchema {
    MessageSchema::new("GcpRouterNatSpec")
        .field(FieldSchema::value_or_ref("vpcSelfLink").required())
        .field(FieldSchema::string("region").required())
        .field(FieldSchema::list(
            "subnetworkSelfLinks",
            FieldType::Message(value_or_ref_schema()),
        ))
        .field(FieldSchema::list(
            "natIpNames",
            FieldType::Message(value_or_ref_schema()),
        ))
        .field(
            FieldSchema::enumeration("logFilter", &["DISABLED", "ERRORS_ONLY", "ALL"])
                .default_value("ERRORS_ONLY"),
        )
}
