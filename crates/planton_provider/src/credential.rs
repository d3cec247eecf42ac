//! Provider credential documents.
//!
//! Each provider has a fixed credential shape. Field names are accepted in
//! camelCase (as written in stack inputs) and snake_case (as shown in the
//! provider guidance examples). Unknown fields are rejected.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::CloudProvider;

/// A credential string whose value never appears in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "Secret(<empty>)")
        } else {
            write!(f, "Secret(***)")
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AwsCredential {
    #[serde(default, alias = "account_id", deserialize_with = "string_or_number")]
    pub account_id: String,
    #[serde(default, alias = "access_key_id")]
    pub access_key_id: Secret,
    #[serde(default, alias = "secret_access_key")]
    pub secret_access_key: Secret,
    #[serde(default)]
    pub region: String,
    #[serde(default, alias = "session_token")]
    pub session_token: Secret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AzureCredential {
    #[serde(default, alias = "client_id")]
    pub client_id: Secret,
    #[serde(default, alias = "client_secret")]
    pub client_secret: Secret,
    #[serde(default, alias = "tenant_id")]
    pub tenant_id: Secret,
    #[serde(default, alias = "subscription_id")]
    pub subscription_id: Secret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GcpCredential {
    #[serde(default, alias = "service_account_key_base64")]
    pub service_account_key_base64: Secret,
}

/// Cloudflare authentication scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudflareAuthScheme {
    ApiToken,
    LegacyApiKey,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CloudflareCredential {
    #[serde(default, alias = "auth_scheme")]
    pub auth_scheme: Option<CloudflareAuthScheme>,
    #[serde(default, alias = "api_token")]
    pub api_token: Secret,
    #[serde(default, alias = "api_key")]
    pub api_key: Secret,
    #[serde(default)]
    pub email: String,
}

impl CloudflareCredential {
    /// Effective scheme: explicit when given, otherwise inferred from the populated fields.
    pub fn scheme(&self) -> CloudflareAuthScheme {
        match self.auth_scheme {
            Some(scheme) => scheme,
            None if self.api_token.is_empty() && !self.api_key.is_empty() => {
                CloudflareAuthScheme::LegacyApiKey
            }
            None => CloudflareAuthScheme::ApiToken,
        }
    }
}

/// Managed Kubernetes flavour the credential targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KubernetesClusterProvider {
    GcpGke,
    AwsEks,
    AzureAks,
}

impl KubernetesClusterProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            KubernetesClusterProvider::GcpGke => "gcp_gke",
            KubernetesClusterProvider::AwsEks => "aws_eks",
            KubernetesClusterProvider::AzureAks => "azure_aks",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GkeClusterCredential {
    #[serde(default, alias = "cluster_endpoint")]
    pub cluster_endpoint: String,
    #[serde(default, alias = "cluster_ca_data")]
    pub cluster_ca_data: String,
    #[serde(default, alias = "service_account_key_base64")]
    pub service_account_key_base64: Secret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KubernetesCredential {
    pub provider: KubernetesClusterProvider,
    #[serde(default, alias = "gcp_gke")]
    pub gcp_gke: Option<GkeClusterCredential>,
    #[serde(default, alias = "aws_eks")]
    pub aws_eks: Option<serde_yaml::Value>,
    #[serde(default, alias = "azure_aks")]
    pub azure_aks: Option<serde_yaml::Value>,
    // Flat form: the GKE fields written directly next to `provider`.
    #[serde(default, alias = "cluster_endpoint")]
    pub cluster_endpoint: String,
    #[serde(default, alias = "cluster_ca_data")]
    pub cluster_ca_data: String,
    #[serde(default, alias = "service_account_key_base64")]
    pub service_account_key_base64: Secret,
}

impl KubernetesCredential {
    /// GKE cluster details, preferring the nested `gcpGke` block over the flat form.
    pub fn gke(&self) -> GkeClusterCredential {
        match &self.gcp_gke {
            Some(gke) => gke.clone(),
            None => GkeClusterCredential {
                cluster_endpoint: self.cluster_endpoint.clone(),
                cluster_ca_data: self.cluster_ca_data.clone(),
                service_account_key_base64: self.service_account_key_base64.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AtlasCredential {
    #[serde(default, alias = "public_key")]
    pub public_key: Secret,
    #[serde(default, alias = "private_key")]
    pub private_key: Secret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Auth0Credential {
    #[serde(default)]
    pub domain: String,
    #[serde(default, alias = "client_id")]
    pub client_id: Secret,
    #[serde(default, alias = "client_secret")]
    pub client_secret: Secret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfluentCredential {
    #[serde(default, alias = "api_key")]
    pub api_key: Secret,
    #[serde(default, alias = "api_secret")]
    pub api_secret: Secret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnowflakeCredential {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Secret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OpenFgaCredential {
    #[serde(default, alias = "api_url")]
    pub api_url: String,
    #[serde(default, alias = "api_token")]
    pub api_token: Secret,
    #[serde(default, alias = "client_id")]
    pub client_id: Secret,
    #[serde(default, alias = "client_secret")]
    pub client_secret: Secret,
    #[serde(default, alias = "api_token_issuer")]
    pub api_token_issuer: String,
    #[serde(default, alias = "api_scopes")]
    pub api_scopes: String,
    #[serde(default, alias = "api_audience")]
    pub api_audience: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CivoCredential {
    #[serde(default, alias = "api_token")]
    pub api_token: Secret,
    #[serde(default, alias = "default_region")]
    pub default_region: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DigitalOceanCredential {
    #[serde(default, alias = "api_token")]
    pub api_token: Secret,
    #[serde(default, alias = "default_region")]
    pub default_region: String,
}

/// A parsed, shape-checked credential for one provider.
#[derive(Debug, Clone)]
pub enum ProviderCredential {
    Aws(AwsCredential),
    Azure(AzureCredential),
    Gcp(GcpCredential),
    Cloudflare(CloudflareCredential),
    Kubernetes(KubernetesCredential),
    Atlas(AtlasCredential),
    Auth0(Auth0Credential),
    Confluent(ConfluentCredential),
    Snowflake(SnowflakeCredential),
    OpenFga(OpenFgaCredential),
    Civo(CivoCredential),
    DigitalOcean(DigitalOceanCredential),
}

/// A credential together with the raw document it was parsed from.
///
/// The raw document is what gets embedded as `provider_config` in the stack input.
#[derive(Debug, Clone)]
pub struct LoadedCredential {
    pub provider: CloudProvider,
    pub document: serde_yaml::Value,
    pub credential: ProviderCredential,
}

impl LoadedCredential {
    /// Read and validate a credential file for `provider`.
    pub fn load(path: &Path, provider: CloudProvider) -> ProviderResult<Self> {
        if !path.is_file() {
            return Err(ProviderError::CredentialFileMissing(path.to_path_buf()));
        }
        debug!("Loading {} provider config from {}", provider, path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, provider)
    }

    /// Parse credential YAML for `provider`.
    pub fn parse(content: &str, provider: CloudProvider) -> ProviderResult<Self> {
        let document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| malformed(provider, e))?;
        Self::from_document(document, provider)
    }

    /// Validate an already-parsed credential document (e.g. a stack input's `provider_config`).
    pub fn from_document(document: serde_yaml::Value, provider: CloudProvider) -> ProviderResult<Self> {
        if !document.is_mapping() {
            return Err(ProviderError::CredentialMalformed {
                provider,
                message: "expected a mapping of credential fields".to_string(),
            });
        }
        let credential = ProviderCredential::from_value(&document, provider)?;
        credential.validate()?;
        Ok(Self {
            provider,
            document,
            credential,
        })
    }
}

impl ProviderCredential {
    fn from_value(value: &serde_yaml::Value, provider: CloudProvider) -> ProviderResult<Self> {
        fn decode<T: for<'de> Deserialize<'de>>(
            value: &serde_yaml::Value,
            provider: CloudProvider,
        ) -> ProviderResult<T> {
            serde_yaml::from_value(value.clone()).map_err(|e| malformed(provider, e))
        }

        let credential = match provider {
            CloudProvider::Aws => Self::Aws(decode(value, provider)?),
            CloudProvider::Azure => Self::Azure(decode(value, provider)?),
            CloudProvider::Gcp => Self::Gcp(decode(value, provider)?),
            CloudProvider::Cloudflare => Self::Cloudflare(decode(value, provider)?),
            CloudProvider::Kubernetes => Self::Kubernetes(decode(value, provider)?),
            CloudProvider::Atlas => Self::Atlas(decode(value, provider)?),
            CloudProvider::Auth0 => Self::Auth0(decode(value, provider)?),
            CloudProvider::Confluent => Self::Confluent(decode(value, provider)?),
            CloudProvider::Snowflake => Self::Snowflake(decode(value, provider)?),
            CloudProvider::OpenFga => Self::OpenFga(decode(value, provider)?),
            CloudProvider::Civo => Self::Civo(decode(value, provider)?),
            CloudProvider::DigitalOcean => Self::DigitalOcean(decode(value, provider)?),
            CloudProvider::Unspecified => {
                return Err(ProviderError::CredentialMalformed {
                    provider,
                    message: "this resource kind does not take provider credentials".to_string(),
                })
            }
        };
        Ok(credential)
    }

    pub fn provider(&self) -> CloudProvider {
        match self {
            Self::Aws(_) => CloudProvider::Aws,
            Self::Azure(_) => CloudProvider::Azure,
            Self::Gcp(_) => CloudProvider::Gcp,
            Self::Cloudflare(_) => CloudProvider::Cloudflare,
            Self::Kubernetes(_) => CloudProvider::Kubernetes,
            Self::Atlas(_) => CloudProvider::Atlas,
            Self::Auth0(_) => CloudProvider::Auth0,
            Self::Confluent(_) => CloudProvider::Confluent,
            Self::Snowflake(_) => CloudProvider::Snowflake,
            Self::OpenFga(_) => CloudProvider::OpenFga,
            Self::Civo(_) => CloudProvider::Civo,
            Self::DigitalOcean(_) => CloudProvider::DigitalOcean,
        }
    }

    /// Check that every field the provider needs is populated.
    pub fn validate(&self) -> ProviderResult<()> {
        let provider = self.provider();
        let require = |fields: &[(&'static str, bool)]| -> ProviderResult<()> {
            match fields.iter().find(|(_, empty)| *empty) {
                Some((field, _)) => Err(ProviderError::CredentialMissingRequired {
                    provider,
                    field: *field,
                }),
                None => Ok(()),
            }
        };

        match self {
            Self::Aws(c) => require(&[
                ("accessKeyId", c.access_key_id.is_empty()),
                ("secretAccessKey", c.secret_access_key.is_empty()),
                ("region", c.region.trim().is_empty()),
            ]),
            Self::Azure(c) => require(&[
                ("clientId", c.client_id.is_empty()),
                ("clientSecret", c.client_secret.is_empty()),
                ("tenantId", c.tenant_id.is_empty()),
                ("subscriptionId", c.subscription_id.is_empty()),
            ]),
            Self::Gcp(c) => require(&[(
                "serviceAccountKeyBase64",
                c.service_account_key_base64.is_empty(),
            )]),
            Self::Cloudflare(c) => match c.scheme() {
                CloudflareAuthScheme::ApiToken => require(&[("apiToken", c.api_token.is_empty())]),
                CloudflareAuthScheme::LegacyApiKey => require(&[
                    ("apiKey", c.api_key.is_empty()),
                    ("email", c.email.trim().is_empty()),
                ]),
            },
            Self::Kubernetes(c) => match c.provider {
                KubernetesClusterProvider::GcpGke => {
                    let gke = c.gke();
                    require(&[
                        ("clusterEndpoint", gke.cluster_endpoint.trim().is_empty()),
                        ("clusterCaData", gke.cluster_ca_data.trim().is_empty()),
                        (
                            "serviceAccountKeyBase64",
                            gke.service_account_key_base64.is_empty(),
                        ),
                    ])
                }
                KubernetesClusterProvider::AwsEks | KubernetesClusterProvider::AzureAks => Ok(()),
            },
            Self::Atlas(c) => require(&[
                ("publicKey", c.public_key.is_empty()),
                ("privateKey", c.private_key.is_empty()),
            ]),
            Self::Auth0(c) => require(&[
                ("domain", c.domain.trim().is_empty()),
                ("clientId", c.client_id.is_empty()),
                ("clientSecret", c.client_secret.is_empty()),
            ]),
            Self::Confluent(c) => require(&[
                ("apiKey", c.api_key.is_empty()),
                ("apiSecret", c.api_secret.is_empty()),
            ]),
            Self::Snowflake(c) => require(&[
                ("account", c.account.trim().is_empty()),
                ("region", c.region.trim().is_empty()),
                ("username", c.username.trim().is_empty()),
                ("password", c.password.is_empty()),
            ]),
            Self::OpenFga(c) => require(&[("apiUrl", c.api_url.trim().is_empty())]),
            Self::Civo(c) => require(&[("apiToken", c.api_token.is_empty())]),
            Self::DigitalOcean(c) => require(&[("apiToken", c.api_token.is_empty())]),
        }
    }
}

/// Accept unquoted numbers for identifier fields such as AWS account ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, found {:?}",
            other
        ))),
    }
}

fn malformed(provider: CloudProvider, err: serde_yaml::Error) -> ProviderError {
    ProviderError::CredentialMalformed {
        provider,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aws_snake_and_camel_case() {
        let camel = "accessKeyId: AKIA\nsecretAccessKey: s3cr3t\nregion: us-east-1\n";
        let snake = "access_key_id: AKIA\nsecret_access_key: s3cr3t\nregion: us-east-1\n";

        for content in [camel, snake] {
            let loaded = LoadedCredential::parse(content, CloudProvider::Aws).unwrap();
            match loaded.credential {
                ProviderCredential::Aws(aws) => {
                    assert_eq!(aws.access_key_id.expose(), "AKIA");
                    assert_eq!(aws.region, "us-east-1");
                }
                other => panic!("unexpected credential: {:?}", other),
            }
        }
    }

    #[test]
    fn test_numeric_account_id() {
        let loaded = LoadedCredential::parse(
            "accountId: 123456789012\naccessKeyId: AKIA\nsecretAccessKey: x\nregion: us-east-1\n",
            CloudProvider::Aws,
        )
        .unwrap();
        match loaded.credential {
            ProviderCredential::Aws(aws) => assert_eq!(aws.account_id, "123456789012"),
            other => panic!("unexpected credential: {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_field() {
        let err = LoadedCredential::parse("accessKeyId: AKIA\nregion: us-east-1\n", CloudProvider::Aws)
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::CredentialMissingRequired {
                field: "secretAccessKey",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_field_is_malformed() {
        let err = LoadedCredential::parse("apiToken: abc\nbogus: 1\n", CloudProvider::Civo).unwrap_err();
        assert!(matches!(err, ProviderError::CredentialMalformed { .. }));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let loaded = LoadedCredential::parse(
            "accessKeyId: AKIAEXAMPLE\nsecretAccessKey: topsecret\nregion: eu-west-1\n",
            CloudProvider::Aws,
        )
        .unwrap();
        let debug = format!("{:?}", loaded.credential);
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("AKIAEXAMPLE"));
        assert!(debug.contains("eu-west-1"));
    }

    #[test]
    fn test_cloudflare_scheme_inference() {
        let loaded = LoadedCredential::parse("apiKey: k\nemail: a@b.c\n", CloudProvider::Cloudflare).unwrap();
        match loaded.credential {
            ProviderCredential::Cloudflare(cf) => {
                assert_eq!(cf.scheme(), CloudflareAuthScheme::LegacyApiKey)
            }
            other => panic!("unexpected credential: {:?}", other),
        }
    }

    #[test]
    fn test_kubernetes_nested_and_flat_forms() {
        let nested = "provider: gcp_gke\ngcpGke:\n  clusterEndpoint: 1.2.3.4\n  clusterCaData: Q0E=\n  serviceAccountKeyBase64: a2V5\n";
        let flat = "provider: gcp_gke\nclusterEndpoint: 1.2.3.4\nclusterCaData: Q0E=\nserviceAccountKeyBase64: a2V5\n";

        for content in [nested, flat] {
            let loaded = LoadedCredential::parse(content, CloudProvider::Kubernetes).unwrap();
            match loaded.credential {
                ProviderCredential::Kubernetes(k) => {
                    assert_eq!(k.gke().cluster_endpoint, "1.2.3.4");
                    assert_eq!(k.gke().service_account_key_base64.expose(), "a2V5");
                }
                other => panic!("unexpected credential: {:?}", other),
            }
        }
    }

    #[test]
    fn test_unspecified_provider_rejects_credentials() {
        let err = LoadedCredential::parse("a: b\n", CloudProvider::Unspecified).unwrap_err();
        assert!(matches!(err, ProviderError::CredentialMalformed { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = LoadedCredential::load(Path::new("/nonexistent/aws.yaml"), CloudProvider::Aws)
            .unwrap_err();
        assert!(matches!(err, ProviderError::CredentialFileMissing(_)));
    }
}
