use super::{CIDR_PATTERN, DNS_RECORD_TYPES, DOMAIN_PATTERN};
use crate::schema::{value_or_ref_schema, Constraint, FieldSchema, FieldType, MessageSchema};

pub(super) fn cloudflare_dns_zone() -> MessageSchema {
    MessageSchema::new("CloudflareDnsZoneSpec")
        .field(
            FieldSchema::string("zoneName")
                .required()
                .pattern(DOMAIN_PATTERN),
        )
        .field(FieldSchema::string("accountId").required())
        .field(
            FieldSchema::enumeration("plan", &["FREE", "PRO", "BUSINESS", "ENTERPRISE"])
                .default_value("FREE"),
        )
        .field(FieldSchema::bool("paused"))
        .field(FieldSchema::bool("defaultProxied"))
}

pub(super) fn cloudflare_dns_record() -> MessageSchema {
    MessageSchema::new("CloudflareDnsRecordSpec")
        .field(FieldSchema::value_or_ref("zoneId").required())
        .field(FieldSchema::string("name").required())
        .field(FieldSchema::enumeration("type", DNS_RECORD_TYPES).required())
        .field(FieldSchema::string("value").required())
        .field(FieldSchema::bool("proxied").default_value(false))
        .field(
            FieldSchema::int("ttl")
                .default_value(1)
                .range(1.0, 86400.0),
        )
        .field(FieldSchema::int("priority").range(0.0, 65535.0))
        .field(FieldSchema::string("comment").max_len(100))
}

pub(super) fn digital_ocean_vpc() -> MessageSchema {
    MessageSchema::new("DigitalOceanVpcSpec")
        .field(FieldSchema::string("region").required())
        .field(FieldSchema::string("ipRangeCidr").pattern(CIDR_PATTERN))
        .field(FieldSchema::string("description").max_len(255))
        .field(FieldSchema::bool("isDefaultForRegion"))
}

pub(super) fn digital_ocean_dns_zone() -> MessageSchema {
    MessageSchema::new("DigitalOceanDnsZoneSpec")
        .field(
            FieldSchema::string("domainName")
                .required()
                .pattern(DOMAIN_PATTERN),
        )
        .field(FieldSchema::list(
            "records",
            FieldType::Message(
                MessageSchema::new("DigitalOceanDnsRecord")
                    .field(FieldSchema::string("name").required())
                    .field(FieldSchema::enumeration("type", DNS_RECORD_TYPES).required())
                    .field(
                        FieldSchema::list("values", FieldType::Message(value_or_ref_schema()))
                            .min_items(1),
                    )
                    .field(FieldSchema::int("ttlSeconds").default_value(1800).min(30.0)),
            ),
        ))
}

fn digital_ocean_node_pool() -> MessageSchema {
    MessageSchema::new("DigitalOceanNodePool")
        .field(FieldSchema::string("size").required())
        .field(FieldSchema::int("nodeCount").default_value(3).min(1.0))
        .field(FieldSchema::bool("autoScale"))
        .field(FieldSchema::int("minNodes").min(1.0))
        .field(FieldSchema::int("maxNodes").min(1.0))
}

pub(super) fn digital_ocean_kubernetes_cluster() -> MessageSchema {
    MessageSchema::new("DigitalOceanKubernetesClusterSpec")
        .field(FieldSchema::string("clusterName").required())
        .field(FieldSchema::string("region").required())
        .field(FieldSchema::string("kubernetesVersion").required())
        .field(FieldSchema::value_or_ref("vpc").required())
        .field(FieldSchema::bool("highlyAvailable"))
        .field(FieldSchema::bool("autoUpgrade").default_value(true))
        .field(FieldSchema::bool("disableSurgeUpgrade"))
        .field(FieldSchema::list("tags", FieldType::String))
        .field(FieldSchema::message("defaultNodePool", digital_ocean_node_pool()).required())
}

pub(super) fn civo_database() -> MessageSchema {
    MessageSchema::new("CivoDatabaseSpec")
        .field(FieldSchema::string("dbInstanceName").required().max_len(64))
        .field(FieldSchema::enumeration("engine", &["mysql", "postgres"]).required())
        .field(FieldSchema::string("engineVersion").required())
        .field(FieldSchema::string("region").required())
        .field(FieldSchema::string("size").required())
        .field(FieldSchema::int("replicas").default_value(0).range(0.0, 4.0))
        .field(FieldSchema::value_or_ref("networkId").required())
        .field(FieldSchema::list(
            "firewallIds",
            FieldType::Message(value_or_ref_schema()),
        ))
}

pub(super) fn civo_kubernetes_cluster() -> MessageSchema {
    MessageSchema::new("CivoKubernetesClusterSpec")
        .field(FieldSchema::string("clusterName").required())
        .field(FieldSchema::string("region").required())
        .field(FieldSchema::string("kubernetesVersion").required())
        .field(FieldSchema::value_or_ref("network").required())
        .field(FieldSchema::bool("highlyAvailable"))
        .field(FieldSchema::bool("autoUpgrade"))
        .field(FieldSchema::bool("disableSurgeUpgrade"))
        .field(FieldSchema::list("tags", FieldType::String))
        .field(
            FieldSchema::message(
                "defaultNodePool",
                MessageSchema::new("CivoNodePool")
                    .field(FieldSchema::string("size").required())
                    .field(FieldSchema::int("nodeCount").default_value(3).min(1.0)),
            )
            .required(),
        )
}

pub(super) fn mongodb_atlas() -> MessageSchema {
    MessageSchema::new("MongodbAtlasSpec").field(
        FieldSchema::message(
            "clusterConfig",
            MessageSchema::new("MongodbAtlasClusterConfig")
                .field(FieldSchema::string("projectId").required())
                .field(
                    FieldSchema::enumeration("clusterType", &["REPLICASET", "SHARDED", "GEOSHARDED"])
                        .default_value("REPLICASET"),
                )
                .field(FieldSchema::int("electableNodes").default_value(3).range(3.0, 7.0))
                .field(FieldSchema::int("priority").default_value(7).range(0.0, 7.0))
                .field(FieldSchema::int("readOnlyNodes").default_value(0).min(0.0))
                .field(FieldSchema::bool("cloudBackup").default_value(true))
                .field(FieldSchema::bool("autoScalingDiskGbEnabled").default_value(true))
                .field(FieldSchema::string("mongoDbMajorVersion").default_value("7.0"))
                .field(FieldSchema::enumeration("providerName", &["AWS", "GCP", "AZURE"]).required())
                .field(FieldSchema::string("providerInstanceSizeName").required()),
        )
        .required(),
    )
}

pub(super) fn auth0_client() -> MessageSchema {
    MessageSchema::new("Auth0ClientSpec")
        .field(
            FieldSchema::enumeration(
                "applicationType",
                &["native", "spa", "regular_web", "non_interactive"],
            )
            .required(),
        )
        .field(FieldSchema::string("description").max_len(140))
        .field(FieldSchema::list("callbacks", FieldType::String))
        .field(FieldSchema::list("allowedLogoutUrls", FieldType::String))
        .field(FieldSchema::list("webOrigins", FieldType::String))
        .field(FieldSchema::list("grantTypes", FieldType::String))
        .field(FieldSchema::bool("oidcConformant").default_value(true))
}

pub(super) fn confluent_kafka() -> MessageSchema {
    MessageSchema::new("ConfluentKafkaSpec")
        .field(FieldSchema::enumeration("cloud", &["AWS", "AZURE", "GCP"]).required())
        .field(
            FieldSchema::enumeration("availability", &["SINGLE_ZONE", "MULTI_ZONE"])
                .default_value("SINGLE_ZONE"),
        )
        .field(FieldSchema::string("region").required())
        .field(FieldSchema::string("environmentId").required())
        .field(
            FieldSchema::enumeration("clusterType", &["BASIC", "STANDARD", "DEDICATED"])
                .default_value("BASIC"),
        )
        .field(FieldSchema::message(
            "dedicated",
            MessageSchema::new("DedicatedConfig")
                .field(FieldSchema::int("cku").default_value(1).min(1.0)),
        ))
        .constraint(Constraint::Custom {
            description: "dedicated settings require the DEDICATED cluster type",
            check: dedicated_requires_type,
        })
}

fn dedicated_requires_type(
    spec: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), String> {
    let cluster_type = spec.get("clusterType").and_then(|v| v.as_str());
    if spec.contains_key("dedicated") && cluster_type != Some("DEDICATED") {
        return Err("dedicated is only allowed when clusterType is DEDICATED".to_string());
    }
    Ok(())
}

pub(super) fn snowflake_database() -> MessageSchema {
    MessageSchema::new("SnowflakeDatabaseSpec")
        .field(FieldSchema::string("catalog"))
        .field(FieldSchema::string("comment").max_len(256))
        .field(
            FieldSchema::int("dataRetentionTimeInDays")
                .default_value(1)
                .range(0.0, 90.0),
        )
        .field(FieldSchema::bool("isTransient").default_value(false))
        .field(
            FieldSchema::int("maxDataExtensionTimeInDays")
                .default_value(14)
                .range(0.0, 90.0),
        )
        .field(FieldSchema::bool("replaceInvalidCharacters"))
}

pub(super) fn openfga_store() -> MessageSchema {
    MessageSchema::new("OpenFgaStoreSpec").field(
        FieldSchema::string("name")
            .required()
            .max_len(64)
            .pattern(r"^[a-zA-Z0-9][a-zA-Z0-9 _.-]*$"),
    )
}

pub(super) fn local_file() -> MessageSchema {
    MessageSchema::new("LocalFileSpec")
        .field(FieldSchema::string("path").required())
        .field(FieldSchema::string("content"))
        .field(
            FieldSchema::string("fileMode")
                .default_value("0644")
                .pattern(r"^0[0-7]{3}$"),
        )
}
