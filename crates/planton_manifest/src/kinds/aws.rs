use serde_json::{Map, Value};

use super::{DNS_RECORD_TYPES, DOMAIN_PATTERN};
use crate::schema::{Constraint, FieldSchema, FieldType, MessageSchema};

pub(super) fn document_db() -> MessageSchema {
    MessageSchema::new("AwsDocumentDbSpec")
        .field(FieldSchema::list(
            "subnets",
            FieldType::Message(crate::schema::value_or_ref_schema()),
        ))
        .field(FieldSchema::list(
            "securityGroups",
            FieldType::Message(crate::schema::value_or_ref_schema()),
        ))
        .field(FieldSchema::list("allowedCidrs", FieldType::String))
        .field(FieldSchema::value_or_ref("dbSubnetGroup"))
        .field(FieldSchema::string("engineVersion").default_value("5.0.0"))
        .field(
            FieldSchema::int("port")
                .default_value(27017)
                .range(1.0, 65535.0),
        )
        .field(
            FieldSchema::string("masterUsername")
                .default_value("docdbadmin")
                .pattern(r"^[a-zA-Z][a-zA-Z0-9]*$")
                .max_len(63),
        )
        .field(FieldSchema::string("masterPassword").required())
        .field(
            FieldSchema::int("instanceCount")
                .default_value(1)
                .range(1.0, 16.0),
        )
        .field(FieldSchema::string("instanceClass").default_value("db.r6g.large"))
        .field(FieldSchema::bool("storageEncrypted").default_value(true))
        .field(FieldSchema::value_or_ref("kmsKey"))
        .field(
            FieldSchema::int("backupRetentionPeriod")
                .default_value(7)
                .range(1.0, 35.0),
        )
        .field(FieldSchema::string("preferredBackupWindow").pattern(r"^\d{2}:\d{2}-\d{2}:\d{2}$"))
        .field(
            FieldSchema::string("preferredMaintenanceWindow")
                .pattern(r"^[a-z]{3}:\d{2}:\d{2}-[a-z]{3}:\d{2}:\d{2}$"),
        )
        .field(FieldSchema::bool("deletionProtection"))
        .field(FieldSchema::bool("skipFinalSnapshot"))
        .field(FieldSchema::string("finalSnapshotIdentifier"))
        .field(FieldSchema::list(
            "enabledCloudwatchLogsExports",
            FieldType::Enum(&["audit", "profiler"]),
        ))
        .field(FieldSchema::bool("applyImmediately"))
        .field(FieldSchema::string("clusterParameterGroupName"))
        .constraint(Constraint::Custom {
            description: "at least two subnets unless dbSubnetGroup is set",
            check: subnets_or_group,
        })
        .constraint(Constraint::RequiredUnless {
            field: "finalSnapshotIdentifier",
            flag: "skipFinalSnapshot",
        })
}

fn subnets_or_group(spec: &Map<String, Value>) -> Result<(), String> {
    if crate::schema::is_populated(spec.get("dbSubnetGroup")) {
        return Ok(());
    }
    let count = spec
        .get("subnets")
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0);
    if count < 2 {
        return Err(format!(
            "subnets must list at least 2 entries when dbSubnetGroup is not set (found {})",
            count
        ));
    }
    Ok(())
}

pub(super) fn s3_bucket() -> MessageSchema {
    MessageSchema::new("AwsS3BucketSpec")
        .field(FieldSchema::string("awsRegion").required())
        .field(FieldSchema::bool("isPublic").default_value(false))
        .field(FieldSchema::bool("versioningEnabled").default_value(false))
        .field(
            FieldSchema::enumeration("encryptionType", &["sse_s3", "sse_kms"])
                .default_value("sse_s3"),
        )
        .field(FieldSchema::value_or_ref("kmsKeyId"))
        .field(FieldSchema::bool("forceDestroy"))
        .field(FieldSchema::string_map("tags"))
        .constraint(Constraint::Custom {
            description: "kmsKeyId requires sse_kms encryption",
            check: kms_requires_sse_kms,
        })
}

fn kms_requires_sse_kms(spec: &Map<String, Value>) -> Result<(), String> {
    let encryption = spec.get("encryptionType").and_then(|v| v.as_str());
    if crate::schema::is_populated(spec.get("kmsKeyId")) && encryption != Some("sse_kms") {
        return Err("kmsKeyId is only allowed when encryptionType is sse_kms".to_string());
    }
    Ok(())
}

pub(super) fn route53_zone() -> MessageSchema {
    MessageSchema::new("AwsRoute53ZoneSpec")
        .field(FieldSchema::bool("isPrivate"))
        .field(FieldSchema::list("vpcIds", FieldType::String))
        .field(FieldSchema::list(
            "records",
            FieldType::Message(
                MessageSchema::new("Route53ZoneRecord")
                    .field(FieldSchema::enumeration("recordType", DNS_RECORD_TYPES).required())
                    .field(FieldSchema::string("name").required())
                    .field(FieldSchema::list("values", FieldType::String).min_items(1))
                    .field(
                        FieldSchema::int("ttlSeconds")
                            .default_value(300)
                            .min(0.0),
                    ),
            ),
        ))
        .constraint(Constraint::Custom {
            description: "private zones need at least one VPC",
            check: private_zone_has_vpc,
        })
}

fn private_zone_has_vpc(spec: &Map<String, Value>) -> Result<(), String> {
    let private = spec.get("isPrivate").and_then(|v| v.as_bool()).unwrap_or(false);
    if private && !crate::schema::is_populated(spec.get("vpcIds")) {
        return Err("vpcIds is required when isPrivate is true".to_string());
    }
    Ok(())
}

pub(super) fn route53_dns_record() -> MessageSchema {
    MessageSchema::new("AwsRoute53DnsRecordSpec")
        .field(FieldSchema::value_or_ref("zoneId").required())
        .field(FieldSchema::string("name").required().pattern(r"^(\*\.)?[a-zA-Z0-9.-]+$"))
        .field(FieldSchema::enumeration("type", DNS_RECORD_TYPES).required())
        .field(
            FieldSchema::int("ttl")
                .default_value(300)
                .range(0.0, 2_147_483_647.0),
        )
        .field(FieldSchema::list("records", FieldType::String))
        .field(FieldSchema::message(
            "alias",
            MessageSchema::new("Route53Alias")
                .field(FieldSchema::string("dnsName").required().pattern(DOMAIN_PATTERN))
                .field(FieldSchema::string("zoneId").required())
                .field(FieldSchema::bool("evaluateTargetHealth")),
        ))
        .constraint(Constraint::ExactlyOneOf(&["records", "alias"]))
}
