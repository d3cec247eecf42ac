//! Translation of provider credentials into IaC environment variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::credential::{CloudflareAuthScheme, ProviderCredential};
use crate::error::{ProviderError, ProviderResult};
use crate::kubeconfig::write_kubeconfig;

/// Environment for the IaC child process, plus any files created to back it.
#[derive(Default)]
pub struct CredentialEnvironment {
    pub vars: BTreeMap<String, String>,
    /// Temporary artifacts (e.g. kubeconfigs) the caller must remove at cleanup.
    pub files: Vec<PathBuf>,
}

impl CredentialEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.vars.insert(key.to_string(), value.into());
    }

    fn set_if_present(&mut self, key: &str, value: &str) {
        if !value.trim().is_empty() {
            self.set(key, value);
        }
    }

    /// Variable names, for logging without values.
    pub fn keys(&self) -> Vec<&str> {
        self.vars.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for CredentialEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialEnvironment")
            .field("vars", &self.keys())
            .field("files", &self.files)
            .finish()
    }
}

impl ProviderCredential {
    /// Build the environment the IaC module expects for this credential.
    ///
    /// `file_cache_dir` receives generated kubeconfig files.
    pub fn to_environment(&self, file_cache_dir: &Path) -> ProviderResult<CredentialEnvironment> {
        let mut env = CredentialEnvironment::new();

        match self {
            ProviderCredential::Aws(c) => {
                env.set("AWS_REGION", c.region.as_str());
                env.set("AWS_ACCESS_KEY_ID", c.access_key_id.expose());
                env.set("AWS_SECRET_ACCESS_KEY", c.secret_access_key.expose());
                env.set_if_present("AWS_SESSION_TOKEN", c.session_token.expose());
            }
            ProviderCredential::Azure(c) => {
                env.set("ARM_CLIENT_ID", c.client_id.expose());
                env.set("ARM_CLIENT_SECRET", c.client_secret.expose());
                env.set("ARM_TENANT_ID", c.tenant_id.expose());
                env.set("ARM_SUBSCRIPTION_ID", c.subscription_id.expose());
            }
            ProviderCredential::Gcp(c) => {
                let decoded = decode_base64(
                    "serviceAccountKeyBase64",
                    c.service_account_key_base64.expose(),
                )?;
                env.set("GOOGLE_CREDENTIALS", decoded);
            }
            ProviderCredential::Cloudflare(c) => match c.scheme() {
                CloudflareAuthScheme::ApiToken => {
                    env.set("CLOUDFLARE_API_TOKEN", c.api_token.expose());
                }
                CloudflareAuthScheme::LegacyApiKey => {
                    env.set("CLOUDFLARE_API_KEY", c.api_key.expose());
                    env.set("CLOUDFLARE_EMAIL", c.email.as_str());
                }
            },
            ProviderCredential::Kubernetes(c) => {
                let path = write_kubeconfig(c, file_cache_dir)?;
                env.set("KUBECONFIG", path.to_string_lossy());
                env.files.push(path);
            }
            ProviderCredential::Atlas(c) => {
                env.set("MONGODB_ATLAS_PUBLIC_KEY", c.public_key.expose());
                env.set("MONGODB_ATLAS_PRIVATE_KEY", c.private_key.expose());
            }
            ProviderCredential::Auth0(c) => {
                env.set("AUTH0_DOMAIN", c.domain.as_str());
                env.set("AUTH0_CLIENT_ID", c.client_id.expose());
                env.set("AUTH0_CLIENT_SECRET", c.client_secret.expose());
            }
            ProviderCredential::Confluent(c) => {
                env.set("CONFLUENT_API_KEY", c.api_key.expose());
                env.set("CONFLUENT_API_SECRET", c.api_secret.expose());
            }
            ProviderCredential::Snowflake(c) => {
                env.set("SNOWFLAKE_ACCOUNT", c.account.as_str());
                env.set("SNOWFLAKE_REGION", c.region.as_str());
                env.set("SNOWFLAKE_USERNAME", c.username.as_str());
                env.set("SNOWFLAKE_PASSWORD", c.password.expose());
            }
            ProviderCredential::OpenFga(c) => {
                env.set("FGA_API_URL", c.api_url.as_str());
                env.set_if_present("FGA_API_TOKEN", c.api_token.expose());
                env.set_if_present("FGA_CLIENT_ID", c.client_id.expose());
                env.set_if_present("FGA_CLIENT_SECRET", c.client_secret.expose());
                env.set_if_present("FGA_API_TOKEN_ISSUER", &c.api_token_issuer);
                env.set_if_present("FGA_API_SCOPES", &c.api_scopes);
                env.set_if_present("FGA_API_AUDIENCE", &c.api_audience);
            }
            ProviderCredential::Civo(c) => {
                env.set("CIVO_TOKEN", c.api_token.expose());
            }
            ProviderCredential::DigitalOcean(c) => {
                env.set("DIGITALOCEAN_TOKEN", c.api_token.expose());
            }
        }

        debug!(
            "Prepared {} environment variables: {:?}",
            self.provider(),
            env.keys()
        );
        Ok(env)
    }
}

fn decode_base64(field: &'static str, value: &str) -> ProviderResult<String> {
    let compact: String = value.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ProviderError::InvalidBase64 {
            field,
            message: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| ProviderError::InvalidBase64 {
        field,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::LoadedCredential;
    use crate::provider::CloudProvider;

    fn env_for(content: &str, provider: CloudProvider) -> CredentialEnvironment {
        let dir = tempfile::tempdir().unwrap();
        let loaded = LoadedCredential::parse(content, provider).unwrap();
        loaded.credential.to_environment(dir.path()).unwrap()
    }

    fn keys(env: &CredentialEnvironment) -> Vec<&str> {
        env.keys()
    }

    #[test]
    fn test_aws_env_vars() {
        let env = env_for(
            "accessKeyId: AKIA\nsecretAccessKey: s3cr3t\nregion: us-west-2\n",
            CloudProvider::Aws,
        );
        assert_eq!(
            keys(&env),
            vec!["AWS_ACCESS_KEY_ID", "AWS_REGION", "AWS_SECRET_ACCESS_KEY"]
        );
        assert_eq!(env.vars["AWS_REGION"], "us-west-2");
    }

    #[test]
    fn test_aws_session_token_when_present() {
        let env = env_for(
            "accessKeyId: AKIA\nsecretAccessKey: s\nregion: us-west-2\nsessionToken: tok\n",
            CloudProvider::Aws,
        );
        assert_eq!(env.vars["AWS_SESSION_TOKEN"], "tok");
    }

    #[test]
    fn test_gcp_decodes_service_account_key() {
        let encoded = STANDARD.encode(r#"{"type":"service_account"}"#);
        let env = env_for(
            &format!("serviceAccountKeyBase64: {}\n", encoded),
            CloudProvider::Gcp,
        );
        assert_eq!(keys(&env), vec!["GOOGLE_CREDENTIALS"]);
        assert_eq!(env.vars["GOOGLE_CREDENTIALS"], r#"{"type":"service_account"}"#);
    }

    #[test]
    fn test_gcp_rejects_invalid_base64() {
        let dir = tempfile::tempdir().unwrap();
        let loaded =
            LoadedCredential::parse("serviceAccountKeyBase64: '%%%'\n", CloudProvider::Gcp).unwrap();
        let err = loaded.credential.to_environment(dir.path()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidBase64 { .. }));
    }

    #[test]
    fn test_cloudflare_token_and_legacy() {
        let env = env_for("apiToken: tok\n", CloudProvider::Cloudflare);
        assert_eq!(keys(&env), vec!["CLOUDFLARE_API_TOKEN"]);

        let env = env_for(
            "authScheme: legacy_api_key\napiKey: key\nemail: ops@example.com\n",
            CloudProvider::Cloudflare,
        );
        assert_eq!(keys(&env), vec!["CLOUDFLARE_API_KEY", "CLOUDFLARE_EMAIL"]);
    }

    #[test]
    fn test_openfga_optional_vars_only_when_set() {
        let env = env_for("apiUrl: https://fga.example.com\n", CloudProvider::OpenFga);
        assert_eq!(keys(&env), vec!["FGA_API_URL"]);

        let env = env_for(
            "apiUrl: https://fga.example.com\nclientId: id\nclientSecret: s\napiAudience: aud\n",
            CloudProvider::OpenFga,
        );
        assert_eq!(
            keys(&env),
            vec!["FGA_API_AUDIENCE", "FGA_API_URL", "FGA_CLIENT_ID", "FGA_CLIENT_SECRET"]
        );
    }

    #[test]
    fn test_token_providers() {
        assert_eq!(keys(&env_for("apiToken: t\n", CloudProvider::Civo)), vec!["CIVO_TOKEN"]);
        assert_eq!(
            keys(&env_for("apiToken: t\n", CloudProvider::DigitalOcean)),
            vec!["DIGITALOCEAN_TOKEN"]
        );
        assert_eq!(
            keys(&env_for("apiKey: k\napiSecret: s\n", CloudProvider::Confluent)),
            vec!["CONFLUENT_API_KEY", "CONFLUENT_API_SECRET"]
        );
        assert_eq!(
            keys(&env_for("publicKey: p\nprivateKey: k\n", CloudProvider::Atlas)),
            vec!["MONGODB_ATLAS_PRIVATE_KEY", "MONGODB_ATLAS_PUBLIC_KEY"]
        );
    }

    #[test]
    fn test_kubernetes_exports_kubeconfig_path() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = LoadedCredential::parse(
            "provider: gcp_gke\nclusterEndpoint: 1.2.3.4\nclusterCaData: Q0E=\nserviceAccountKeyBase64: a2V5\n",
            CloudProvider::Kubernetes,
        )
        .unwrap();
        let env = loaded.credential.to_environment(dir.path()).unwrap();

        assert_eq!(keys(&env), vec!["KUBECONFIG"]);
        assert_eq!(env.files.len(), 1);
        assert_eq!(env.vars["KUBECONFIG"], env.files[0].to_string_lossy());
        assert!(env.files[0].exists());
    }

    #[test]
    fn test_debug_hides_values() {
        let env = env_for("apiToken: very-secret\n", CloudProvider::Civo);
        assert!(!format!("{:?}", env).contains("very-secret"));
    }
}
