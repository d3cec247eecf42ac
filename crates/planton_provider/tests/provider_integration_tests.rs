//! Integration tests for provider credentials.

use std::collections::BTreeSet;
use std::fs;

use planton_provider::{CloudProvider, LoadedCredential, ProviderError, ProviderGuidance};
use tempfile::tempdir;

#[test]
fn test_guidance_examples_are_valid_credentials() {
    for provider in CloudProvider::all() {
        let example = ProviderGuidance::for_provider(provider).config_example;
        let loaded = LoadedCredential::parse(example, provider);
        assert!(
            loaded.is_ok(),
            "example for {} rejected: {:?}",
            provider,
            loaded.err()
        );
    }
}

#[test]
fn test_credential_file_to_environment() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("azure-provider-config.yaml");
    fs::write(
        &path,
        "clientId: cid\nclientSecret: csecret\ntenantId: tid\nsubscriptionId: sid\n",
    )
    .unwrap();

    let loaded = LoadedCredential::load(&path, CloudProvider::Azure).unwrap();
    let env = loaded.credential.to_environment(dir.path()).unwrap();

    let keys: BTreeSet<&str> = env.keys().into_iter().collect();
    let expected: BTreeSet<&str> = [
        "ARM_CLIENT_ID",
        "ARM_CLIENT_SECRET",
        "ARM_SUBSCRIPTION_ID",
        "ARM_TENANT_ID",
    ]
    .into_iter()
    .collect();
    assert_eq!(keys, expected);
    assert_eq!(env.vars["ARM_TENANT_ID"], "tid");
    assert!(env.files.is_empty());
}

#[test]
fn test_document_is_preserved_for_stack_input() {
    let loaded = LoadedCredential::parse(
        "apiToken: tok\ndefaultRegion: NYC1\n",
        CloudProvider::Civo,
    )
    .unwrap();
    assert_eq!(loaded.document["defaultRegion"].as_str(), Some("NYC1"));
    assert_eq!(loaded.provider, CloudProvider::Civo);
}

#[test]
fn test_wrong_shape_for_provider() {
    let err = LoadedCredential::parse(
        "accessKeyId: AKIA\nsecretAccessKey: x\nregion: us-east-1\n",
        CloudProvider::Gcp,
    )
    .unwrap_err();
    assert!(matches!(err, ProviderError::CredentialMalformed { .. }));
    assert!(err.to_string().contains("GCP"));
}

#[test]
fn test_non_mapping_document() {
    let err = LoadedCredential::parse("- a\n- b\n", CloudProvider::Aws).unwrap_err();
    assert!(matches!(err, ProviderError::CredentialMalformed { .. }));
}
