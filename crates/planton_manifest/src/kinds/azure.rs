use super::{autoscaling, DNS_RECORD_TYPES};
use crate::schema::{Constraint, FieldSchema, FieldType, MessageSchema};

pub(super) fn aks_node_pool() -> MessageSchema {
    MessageSchema::new("AzureAksNodePoolSpec")
        .field(FieldSchema::value_or_ref("clusterName").required())
        .field(FieldSchema::string("vmSize").required())
        .field(
            FieldSchema::int("initialNodeCount")
                .default_value(1)
                .min(1.0),
        )
        .field(FieldSchema::message("autoscaling", autoscaling()))
        .field(FieldSchema::list("availabilityZones", FieldType::String))
        .field(FieldSchema::enumeration("osType", &["LINUX", "WINDOWS"]).default_value("LINUX"))
        .field(FieldSchema::bool("spotEnabled"))
}

pub(super) fn dns_record() -> MessageSchema {
    MessageSchema::new("AzureDnsRecordSpec")
        .field(FieldSchema::string("resourceGroup").required())
        .field(FieldSchema::value_or_ref("zoneName").required())
        .field(FieldSchema::enumeration("recordType", DNS_RECORD_TYPES).required())
        .field(FieldSchema::string("name").required())
        .field(FieldSchema::list("values", FieldType::String).min_items(1))
        .field(
            FieldSchema::int("ttlSeconds")
                .default_value(300)
                .min(1.0),
        )
        .field(FieldSchema::int("mxPriority").range(0.0, 65535.0))
}

pub(super) fn storage_account() -> MessageSchema {
    MessageSchema::new("AzureStorageAccountSpec")
        .field(FieldSchema::string("region").required())
        .field(FieldSchema::string("resourceGroup").required())
        .field(
            FieldSchema::enumeration(
                "accountKind",
                &["STORAGE_V2", "BLOB_STORAGE", "BLOCK_BLOB_STORAGE", "FILE_STORAGE"],
            )
            .default_value("STORAGE_V2"),
        )
        .field(FieldSchema::enumeration("accountTier", &["STANDARD", "PREMIUM"]).default_value("STANDARD"))
        .field(
            FieldSchema::enumeration("replicationType", &["LRS", "GRS", "RAGRS", "ZRS"])
                .default_value("LRS"),
        )
        .field(FieldSchema::bool("enableHttpsTrafficOnly").default_value(true))
        .field(
            FieldSchema::enumeration("minTlsVersion", &["TLS1_0", "TLS1_1", "TLS1_2"])
                .default_value("TLS1_2"),
        )
        .field(FieldSchema::list(
            "containers",
            FieldType::Message(
                MessageSchema::new("StorageContainer")
                    .field(
                        FieldSchema::string("name")
                            .required()
                            .pattern(r"^[a-z0-9][a-z0-9-]{2,62}$"),
                    )
                    .field(
                        FieldSchema::enumeration("accessType", &["PRIVATE", "BLOB", "CONTAINER"])
                            .default_value("PRIVATE"),
                    ),
            ),
        ))
}

pub(super) fn virtual_machine() -> MessageSchema {
    MessageSchema::new("AzureVirtualMachineSpec")
        .field(FieldSchema::string("region").required())
        .field(FieldSchema::string("resourceGroup").required())
        .field(FieldSchema::value_or_ref("subnetId").required())
        .field(FieldSchema::string("vmSize").default_value("Standard_D2s_v3"))
        .field(
            FieldSchema::string("adminUsername")
                .default_value("azureuser")
                .pattern(r"^[a-z_][a-z0-9_-]{0,31}$"),
        )
        .field(FieldSchema::string("sshPublicKey"))
        .field(FieldSchema::string("adminPassword").min_len(12))
        .field(FieldSchema::message(
            "image",
            MessageSchema::new("VmImage")
                .field(FieldSchema::string("publisher").default_value("Canonical"))
                .field(FieldSchema::string("offer").default_value("ubuntu-24_04-lts"))
                .field(FieldSchema::string("sku").default_value("server"))
                .field(FieldSchema::string("version").default_value("latest")),
        ))
        .field(
            FieldSchema::int("osDiskSizeGb")
                .default_value(30)
                .range(30.0, 4095.0),
        )
        .field(FieldSchema::bool("enablePublicIp"))
        .constraint(Constraint::ExactlyOneOf(&["sshPublicKey", "adminPassword"]))
}
