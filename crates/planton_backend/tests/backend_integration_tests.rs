//! Integration tests for backend resolution and emission.

use std::fs;

use serial_test::serial;
use tempfile::tempdir;

use planton_backend::{
    backend_config_args, backend_config_values, env, resolve_backend, write_backend_file,
    BackendConfig, BackendError, S3_COMPATIBLE_FLAGS,
};
use planton_manifest::{parse_manifest, Manifest, Provisioner};

fn manifest_with_labels(labels: &[(&str, &str)]) -> Manifest {
    let mut yaml = String::from(
        "apiVersion: aws.project-planton.org/v1\nkind: AwsS3Bucket\nmetadata:\n  name: assets\n",
    );
    if !labels.is_empty() {
        yaml.push_str("  labels:\n");
        for (k, v) in labels {
            yaml.push_str(&format!("    {}: {}\n", k, v));
        }
    }
    yaml.push_str("spec:\n  awsRegion: us-east-1\n");
    parse_manifest(&yaml).unwrap()
}

/// R2 backend from labels plus flags: skip flags in the file, values as init args.
#[test]
fn test_s3_compatible_backend_end_to_end() {
    let temp = tempdir().unwrap();
    let manifest = manifest_with_labels(&[
        ("tofu.project-planton.org/backend.type", "s3"),
        ("tofu.project-planton.org/backend.object", "rbucket/env/prod.tfstate"),
    ]);
    let flags = BackendConfig::new()
        .with_region("auto")
        .with_endpoint("https://x.r2.cloudflarestorage.com");

    let resolved = resolve_backend(&manifest, Provisioner::Tofu, &BackendConfig::new(), &flags).unwrap();
    assert!(resolved.is_valid());
    assert!(resolved.config.s3_compatible);

    let path = write_backend_file(temp.path(), &resolved.config).unwrap();
    let file = fs::read_to_string(path).unwrap();
    for flag in S3_COMPATIBLE_FLAGS {
        assert!(file.contains(&format!("{} ", flag)), "missing {}", flag);
    }

    let args = backend_config_args(&backend_config_values(&resolved.config, &[]).unwrap());
    let pairs: Vec<&[String]> = args.chunks(2).collect();
    assert!(pairs.iter().all(|p| p[0] == "--backend-config"));
    assert!(args.contains(&"key=env/prod.tfstate".to_string()));
    assert!(args.contains(&"bucket=rbucket".to_string()));
}

#[test]
fn test_auto_region_without_endpoint_is_incomplete() {
    let manifest = manifest_with_labels(&[
        ("tofu.project-planton.org/backend.type", "s3"),
        ("tofu.project-planton.org/backend.bucket", "b"),
        ("tofu.project-planton.org/backend.key", "k"),
    ]);
    let flags = BackendConfig::new().with_region("auto").with_endpoint("");

    let resolved = resolve_backend(&manifest, Provisioner::Tofu, &BackendConfig::new(), &flags).unwrap();
    match resolved.complete(false, |_, _| Ok(())).unwrap_err() {
        BackendError::BackendIncomplete(result) => {
            assert_eq!(result.missing_names(), vec!["endpoint"]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_legacy_labels_used_for_tofu() {
    let manifest = manifest_with_labels(&[
        ("terraform.project-planton.org/backend.type", "gcs"),
        ("terraform.project-planton.org/backend.object", "legacy-bucket/state"),
    ]);
    let resolved =
        resolve_backend(&manifest, Provisioner::Tofu, &BackendConfig::new(), &BackendConfig::new()).unwrap();
    assert_eq!(resolved.config.type_str(), Some("gcs"));
    assert_eq!(resolved.config.bucket(), Some("legacy-bucket"));
}

#[test]
fn test_flag_order_within_layer_does_not_matter() {
    let manifest = manifest_with_labels(&[]);
    let a = BackendConfig::new().with_type("s3").with_region("auto").with_endpoint("https://e");
    let b = BackendConfig::new().with_endpoint("https://e").with_region("auto").with_type("s3");

    let ra = resolve_backend(&manifest, Provisioner::Terraform, &BackendConfig::new(), &a).unwrap();
    let rb = resolve_backend(&manifest, Provisioner::Terraform, &BackendConfig::new(), &b).unwrap();
    assert_eq!(ra.config, rb.config);
}

#[test]
#[serial]
fn test_environment_is_lowest_priority() {
    let manifest = manifest_with_labels(&[("tofu.project-planton.org/backend.bucket", "label-bucket")]);

    temp_env::with_vars(
        [
            (env::ENV_BACKEND_TYPE, Some("s3")),
            (env::ENV_BACKEND_BUCKET, Some("env-bucket")),
            (env::ENV_BACKEND_REGION, Some("us-east-1")),
            (env::ENV_BACKEND_ENDPOINT, None),
        ],
        || {
            let flags = BackendConfig::new().with_key("from/flag.tfstate");
            let resolved = resolve_backend(&manifest, Provisioner::Tofu, &env::from_env(), &flags).unwrap();

            assert!(resolved.is_valid());
            assert_eq!(resolved.config.type_str(), Some("s3"));
            assert_eq!(resolved.config.bucket(), Some("label-bucket"));
            assert_eq!(resolved.config.region(), Some("us-east-1"));
            assert_eq!(resolved.config.key(), Some("from/flag.tfstate"));
        },
    );
}
