//! Per-provider credential guidance shown when credentials are missing or invalid.

use crate::provider::CloudProvider;

/// Static guidance data for one provider.
#[derive(Debug, Clone)]
pub struct ProviderGuidance {
    pub provider: CloudProvider,
    /// Environment variables the user can export instead of writing a config file.
    pub env_vars: &'static [&'static str],
    pub env_help: &'static str,
    pub config_example: &'static str,
    pub docs_url: &'static str,
}

impl ProviderGuidance {
    pub fn for_provider(provider: CloudProvider) -> Self {
        let (env_vars, env_help, config_example, docs_url): (
            &'static [&'static str],
            &'static str,
            &'static str,
            &'static str,
        ) = match provider {
            CloudProvider::Aws => (
                &["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "AWS_REGION"],
                "export AWS_ACCESS_KEY_ID=<your-access-key-id>\nexport AWS_SECRET_ACCESS_KEY=<your-secret-access-key>\nexport AWS_REGION=us-east-1",
                "account_id: \"123456789012\"\naccess_key_id: <your-access-key-id>\nsecret_access_key: <your-secret-access-key>\nregion: us-east-1",
                "https://docs.aws.amazon.com/cli/latest/userguide/cli-configure-envvars.html",
            ),
            CloudProvider::Azure => (
                &["ARM_CLIENT_ID", "ARM_CLIENT_SECRET", "ARM_TENANT_ID", "ARM_SUBSCRIPTION_ID"],
                "export ARM_CLIENT_ID=<your-client-id>\nexport ARM_CLIENT_SECRET=<your-client-secret>\nexport ARM_TENANT_ID=<your-tenant-id>\nexport ARM_SUBSCRIPTION_ID=<your-subscription-id>",
                "client_id: <your-client-id>\nclient_secret: <your-client-secret>\ntenant_id: <your-tenant-id>\nsubscription_id: <your-subscription-id>",
                "https://learn.microsoft.com/en-us/azure/developer/terraform/authenticate-to-azure",
            ),
            CloudProvider::Gcp => (
                &["GOOGLE_APPLICATION_CREDENTIALS"],
                "export GOOGLE_APPLICATION_CREDENTIALS=/path/to/service-account-key.json\n# or authenticate with: gcloud auth application-default login",
                "service_account_key_base64: <base64-encoded-service-account-json>",
                "https://cloud.google.com/docs/authentication/application-default-credentials",
            ),
            CloudProvider::Cloudflare => (
                &["CLOUDFLARE_API_TOKEN"],
                "export CLOUDFLARE_API_TOKEN=<your-api-token>",
                "auth_scheme: api_token\napi_token: <your-api-token>",
                "https://developers.cloudflare.com/fundamentals/api/get-started/create-token/",
            ),
            CloudProvider::Kubernetes => (
                &["KUBECONFIG"],
                "export KUBECONFIG=~/.kube/config\n# optionally pick a context with --kube-context <name>",
                "provider: gcp_gke\ngcp_gke:\n  cluster_endpoint: <cluster-endpoint-ip>\n  cluster_ca_data: <base64-cluster-ca-certificate>\n  service_account_key_base64: <base64-encoded-service-account-json>",
                "https://kubernetes.io/docs/concepts/configuration/organize-cluster-access-kubeconfig/",
            ),
            CloudProvider::Atlas => (
                &["MONGODB_ATLAS_PUBLIC_KEY", "MONGODB_ATLAS_PRIVATE_KEY"],
                "export MONGODB_ATLAS_PUBLIC_KEY=<your-public-key>\nexport MONGODB_ATLAS_PRIVATE_KEY=<your-private-key>",
                "public_key: <your-public-key>\nprivate_key: <your-private-key>",
                "https://www.mongodb.com/docs/atlas/configure-api-access/",
            ),
            CloudProvider::Auth0 => (
                &["AUTH0_DOMAIN", "AUTH0_CLIENT_ID", "AUTH0_CLIENT_SECRET"],
                "export AUTH0_DOMAIN=<your-tenant>.auth0.com\nexport AUTH0_CLIENT_ID=<your-client-id>\nexport AUTH0_CLIENT_SECRET=<your-client-secret>",
                "domain: <your-tenant>.auth0.com\nclient_id: <your-client-id>\nclient_secret: <your-client-secret>",
                "https://auth0.com/docs/get-started/auth0-overview/create-applications/machine-to-machine-apps",
            ),
            CloudProvider::Confluent => (
                &["CONFLUENT_CLOUD_API_KEY", "CONFLUENT_CLOUD_API_SECRET"],
                "export CONFLUENT_CLOUD_API_KEY=<your-api-key>\nexport CONFLUENT_CLOUD_API_SECRET=<your-api-secret>",
                "api_key: <your-api-key>\napi_secret: <your-api-secret>",
                "https://docs.confluent.io/cloud/current/access-management/authenticate/api-keys/api-keys.html",
            ),
            CloudProvider::Civo => (
                &["CIVO_TOKEN"],
                "export CIVO_TOKEN=<your-api-token>",
                "api_token: <your-api-token>\ndefault_region: LON1",
                "https://www.civo.com/docs/account/api-keys",
            ),
            CloudProvider::DigitalOcean => (
                &["DIGITALOCEAN_TOKEN"],
                "export DIGITALOCEAN_TOKEN=<your-api-token>",
                "api_token: <your-api-token>",
                "https://docs.digitalocean.com/reference/api/create-personal-access-token/",
            ),
            CloudProvider::OpenFga => (
                &["FGA_API_URL", "FGA_API_TOKEN"],
                "export FGA_API_URL=https://api.fga.example\nexport FGA_API_TOKEN=<your-api-token>",
                "api_url: https://api.fga.example\napi_token: <your-api-token>",
                "https://openfga.dev/docs/getting-started/setup-sdk-client",
            ),
            CloudProvider::Snowflake => (
                &["SNOWFLAKE_ACCOUNT", "SNOWFLAKE_USER", "SNOWFLAKE_PASSWORD"],
                "export SNOWFLAKE_ACCOUNT=<your-account>\nexport SNOWFLAKE_USER=<your-username>\nexport SNOWFLAKE_PASSWORD=<your-password>",
                "account: <your-account>\nregion: <your-region>\nusername: <your-username>\npassword: <your-password>",
                "https://docs.snowflake.com/en/user-guide/admin-account-identifier",
            ),
            CloudProvider::Unspecified => (
                &[],
                "# Environment variables not available for this provider",
                "# Provider config format not available",
                "",
            ),
        };

        Self {
            provider,
            env_vars,
            env_help,
            config_example,
            docs_url,
        }
    }

    /// Suggested filename for the provider config.
    pub fn config_file_name(&self) -> String {
        match self.provider {
            CloudProvider::Unspecified => "provider-config.yaml".to_string(),
            CloudProvider::DigitalOcean => "digitalocean-provider-config.yaml".to_string(),
            other => format!("{}-provider-config.yaml", other.as_str()),
        }
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}\n", prefix, line))
        .collect()
}

/// Help text for a resource whose provider credentials were not supplied.
pub fn missing_provider_config_guidance(kind: &str, provider: CloudProvider) -> String {
    let guidance = ProviderGuidance::for_provider(provider);
    let file_name = guidance.config_file_name();
    let mut out = String::new();

    out.push_str(&format!(
        "The {} resource requires {} credentials.\n\n",
        kind,
        provider.display_name()
    ));

    out.push_str("Option 1: Set environment variables\n\n");
    out.push_str(&indent(guidance.env_help, "  "));

    out.push_str("\nOption 2: Create a provider config file\n\n");
    out.push_str(&format!("  Create '{}' with:\n\n", file_name));
    out.push_str(&indent(guidance.config_example, "    "));
    out.push_str("\n  Then run:\n\n");
    out.push_str(&format!(
        "    project-planton plan -f manifest.yaml -p {}\n",
        file_name
    ));

    if !guidance.docs_url.is_empty() {
        out.push_str(&format!("\nFor more information: {}\n", guidance.docs_url));
    }
    out
}

/// Help text for a manifest whose kind could not be determined.
pub fn kind_detection_error_guidance() -> String {
    r#"The manifest must contain valid 'apiVersion' and 'kind' fields:

  apiVersion: gcp.project-planton.org/v1
  kind: GcpGkeCluster
  metadata:
    name: my-cluster
  spec:
    # ... resource configuration

Check your manifest file for:
  - Missing or misspelled 'apiVersion'
  - Missing or misspelled 'kind'
  - Invalid YAML syntax

For supported resource kinds, see: https://project-planton.org/docs/resources"#
        .to_string()
}

/// Help text for a provider config file that failed to parse or validate.
pub fn invalid_provider_config_guidance(provider: CloudProvider, error: &str) -> String {
    let guidance = ProviderGuidance::for_provider(provider);
    let mut out = String::new();

    out.push_str(&format!(
        "The provider config file could not be parsed as {} credentials.\n\n",
        provider.display_name()
    ));
    out.push_str(&format!("Parse error: {}\n\n", error));
    out.push_str(&format!(
        "Expected format for {} provider config:\n\n",
        provider.display_name()
    ));
    out.push_str(&indent(guidance.config_example, "  "));

    if !guidance.docs_url.is_empty() {
        out.push_str(&format!("\nFor more information: {}\n", guidance.docs_url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_provider_has_guidance() {
        for provider in CloudProvider::all() {
            let guidance = ProviderGuidance::for_provider(provider);
            assert!(!guidance.env_vars.is_empty(), "{} has no env vars", provider);
            assert!(!guidance.config_example.is_empty());
            assert!(guidance.docs_url.starts_with("https://"));
            assert!(guidance.config_file_name().ends_with("-provider-config.yaml"));
        }
    }

    #[test]
    fn test_config_example_parses_as_yaml() {
        for provider in CloudProvider::all() {
            let example = ProviderGuidance::for_provider(provider).config_example;
            let parsed: Result<serde_yaml::Value, _> = serde_yaml::from_str(example);
            assert!(parsed.is_ok(), "example for {} is not YAML", provider);
        }
    }

    #[test]
    fn test_missing_guidance_mentions_both_options() {
        let text = missing_provider_config_guidance("AwsDocumentDb", CloudProvider::Aws);
        assert!(text.contains("requires AWS credentials"));
        assert!(text.contains("Option 1: Set environment variables"));
        assert!(text.contains("export AWS_ACCESS_KEY_ID"));
        assert!(text.contains("-p aws-provider-config.yaml"));
        assert!(text.contains("https://docs.aws.amazon.com"));
    }

    #[test]
    fn test_invalid_guidance_includes_error() {
        let text = invalid_provider_config_guidance(CloudProvider::Gcp, "unknown field `foo`");
        assert!(text.contains("as GCP credentials"));
        assert!(text.contains("unknown field `foo`"));
        assert!(text.contains("service_account_key_base64"));
    }
}
