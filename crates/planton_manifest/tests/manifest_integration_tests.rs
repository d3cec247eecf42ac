//! Integration tests for manifest resolution, loading and validation.

use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;

use planton_manifest::{
    apply_overrides, apply_overrides_to_file, detect_from_manifest, load_manifest,
    load_validated_manifest, provisioner_from_labels, write_manifest, ClipboardReader,
    FieldOverride, ManifestError, ManifestResolver, ManifestResult, ManifestSource, Provisioner,
    ResourceKind,
};
use planton_provider::CloudProvider;

const BUCKET: &str = r#"apiVersion: aws.project-planton.org/v1
kind: AwsS3Bucket
metadata:
  name: assets
  org: acme
  env: prod
  labels:
    project-planton.org/provisioner: tofu
spec:
  awsRegion: us-east-1
"#;

const LOCAL_FILE: &str = r#"apiVersion: local.project-planton.org/v1
kind: LocalFile
metadata:
  name: motd
spec:
  path: /tmp/motd
  content: hello
"#;

struct FixedClipboard(&'static str);

impl ClipboardReader for FixedClipboard {
    fn read(&self) -> ManifestResult<String> {
        Ok(self.0.to_string())
    }
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Loading, writing and re-loading yields the same manifest.
#[test]
fn test_load_write_load_is_stable() {
    let temp = tempdir().unwrap();
    let path = write(temp.path(), "bucket.yaml", BUCKET);

    let first = load_manifest(&path).unwrap();
    assert_eq!(first.kind, ResourceKind::AwsS3Bucket);
    assert_eq!(first.spec["encryptionType"], json!("sse_s3"));
    assert_eq!(first.spec["versioningEnabled"], json!(false));

    let copy = temp.path().join("copy.yaml");
    write_manifest(&first, &copy).unwrap();
    let second = load_manifest(&copy).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_labels_and_resource_id() {
    let temp = tempdir().unwrap();
    let path = write(temp.path(), "bucket.yaml", BUCKET);
    let manifest = load_validated_manifest(&path).unwrap();

    assert_eq!(provisioner_from_labels(&manifest).unwrap(), Provisioner::Tofu);
    assert_eq!(manifest.resource_id(), "s3bkt-assets");
}

#[test]
fn test_validation_reports_every_violation() {
    let temp = tempdir().unwrap();
    let path = write(
        temp.path(),
        "file.yaml",
        "apiVersion: local.project-planton.org/v1\nkind: LocalFile\nmetadata:\n  name: motd\nspec:\n  fileMode: \"999\"\n",
    );

    match load_validated_manifest(&path).unwrap_err() {
        ManifestError::ValidationFailed(violations) => {
            let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
            assert!(fields.contains(&"spec.path"), "{:?}", fields);
            assert!(fields.contains(&"spec.fileMode"), "{:?}", fields);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_unknown_field_suggestion() {
    let temp = tempdir().unwrap();
    let path = write(
        temp.path(),
        "file.yaml",
        "apiVersion: local.project-planton.org/v1\nkind: LocalFile\nmetadata:\n  name: motd\nspec:\n  pth: /tmp/motd\n",
    );

    match load_manifest(&path).unwrap_err() {
        ManifestError::UnknownField {
            name,
            suggestion,
            line,
            ..
        } => {
            assert_eq!(name, "pth");
            assert_eq!(suggestion.as_deref(), Some("path"));
            assert_eq!(line, Some(6));
        }
        other => panic!("expected unknown field, got {:?}", other),
    }
}

#[test]
fn test_missing_manifest_file() {
    let err = load_manifest(Path::new("/definitely/missing.yaml")).unwrap_err();
    assert!(matches!(err, ManifestError::ManifestPathInvalid(_)));
}

/// Applying the same overrides twice gives the same manifest as once.
#[test]
fn test_overrides_are_idempotent() {
    let temp = tempdir().unwrap();
    let path = write(temp.path(), "bucket.yaml", BUCKET);
    let manifest = load_manifest(&path).unwrap();

    let overrides = FieldOverride::parse_all(&[
        "spec.versioningEnabled=true".to_string(),
        "metadata.labels.team=platform".to_string(),
    ])
    .unwrap();

    let once = apply_overrides(&manifest, &overrides).unwrap();
    let twice = apply_overrides(&once, &overrides).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.spec["versioningEnabled"], json!(true));
    assert_eq!(once.metadata.label("team"), Some("platform"));
}

#[test]
fn test_overrides_leave_source_file_untouched() {
    let temp = tempdir().unwrap();
    let path = write(temp.path(), "bucket.yaml", BUCKET);
    let overrides = vec![FieldOverride::parse("spec.awsRegion=eu-west-1").unwrap()];

    let (updated, is_temp) = apply_overrides_to_file(&path, &overrides, temp.path()).unwrap();
    assert!(is_temp);
    assert_ne!(updated, path);
    assert_eq!(fs::read_to_string(&path).unwrap(), BUCKET);
    assert_eq!(load_manifest(&updated).unwrap().spec["awsRegion"], json!("eu-west-1"));
}

#[test]
fn test_detect_from_manifest_bytes() {
    let detected = detect_from_manifest(BUCKET.as_bytes()).unwrap();
    assert_eq!(detected.kind, ResourceKind::AwsS3Bucket);
    assert_eq!(detected.provider, CloudProvider::Aws);
    assert!(detected.requires_credentials);

    let local = detect_from_manifest(LOCAL_FILE.as_bytes()).unwrap();
    assert_eq!(local.provider, CloudProvider::Unspecified);
    assert!(!local.requires_credentials);
}

#[tokio::test]
async fn test_resolve_clipboard_manifest_then_load() {
    let temp = tempdir().unwrap();
    let resolver = ManifestResolver::new(temp.path().join("downloads"))
        .with_clipboard(Box::new(FixedClipboard(LOCAL_FILE)));

    let source = ManifestSource {
        clipboard: true,
        ..Default::default()
    };
    let resolved = resolver.resolve(&source).await.unwrap();
    assert!(resolved.is_temp);

    let manifest = load_validated_manifest(&resolved.path).unwrap();
    assert_eq!(manifest.kind, ResourceKind::LocalFile);
    assert_eq!(manifest.spec["fileMode"], json!("0644"));
}

#[tokio::test]
async fn test_resolve_clipboard_path() {
    let temp = tempdir().unwrap();
    let path = write(temp.path(), "bucket.yaml", BUCKET);
    let raw: &'static str = Box::leak(path.to_string_lossy().into_owned().into_boxed_str());

    let resolver = ManifestResolver::new(temp.path().join("downloads"))
        .with_clipboard(Box::new(FixedClipboard(raw)));
    let source = ManifestSource {
        clipboard: true,
        ..Default::default()
    };

    let resolved = resolver.resolve(&source).await.unwrap();
    assert_eq!(resolved.path, path);
    assert!(!resolved.is_temp);
}

#[tokio::test]
async fn test_resolve_stack_input_file() {
    let temp = tempdir().unwrap();
    let input = write(
        temp.path(),
        "input.yaml",
        "target:\n  apiVersion: local.project-planton.org/v1\n  kind: LocalFile\n  metadata:\n    name: motd\n  spec:\n    path: /tmp/motd\nprovider_config: {}\n",
    );

    let resolver = ManifestResolver::new(temp.path().join("downloads"))
        .with_clipboard(Box::new(FixedClipboard("")));
    let source = ManifestSource {
        stack_input: Some(input),
        ..Default::default()
    };

    let resolved = resolver.resolve(&source).await.unwrap();
    assert!(resolved.is_temp);
    assert!(resolved.path.starts_with(temp.path().join("downloads")));
    assert_eq!(load_manifest(&resolved.path).unwrap().name(), "motd");
}

#[tokio::test]
async fn test_resolve_empty_clipboard() {
    let temp = tempdir().unwrap();
    let resolver = ManifestResolver::new(temp.path()).with_clipboard(Box::new(FixedClipboard("   ")));
    let source = ManifestSource {
        clipboard: true,
        ..Default::default()
    };
    let err = resolver.resolve(&source).await.unwrap_err();
    assert!(matches!(err, ManifestError::ClipboardEmpty));
}
