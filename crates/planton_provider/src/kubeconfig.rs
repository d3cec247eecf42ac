//! Kubeconfig synthesis for managed cluster credentials.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::credential::{GkeClusterCredential, KubernetesClusterProvider, KubernetesCredential};
use crate::error::{ProviderError, ProviderResult};
use crate::private_file::write_private_file;

/// Exec plugin that exchanges a GCP service-account key for a cluster token.
pub const GKE_EXEC_PLUGIN_PATH: &str = "/usr/local/bin/kube-client-go-gcp-exec-plugin";

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct KubeConfig<'a> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    current_context: &'static str,
    contexts: Vec<Named<ContextEntry>>,
    clusters: Vec<Named<ClusterEntry<'a>>>,
    users: Vec<Named<UserEntry<'a>>>,
}

#[derive(Serialize)]
struct Named<T> {
    name: &'static str,
    #[serde(flatten)]
    entry: T,
}

#[derive(Serialize)]
struct ContextEntry {
    context: ContextRef,
}

#[derive(Serialize)]
struct ContextRef {
    cluster: &'static str,
    user: &'static str,
}

#[derive(Serialize)]
struct ClusterEntry<'a> {
    cluster: Cluster<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster<'a> {
    server: String,
    certificate_authority_data: &'a str,
}

#[derive(Serialize)]
struct UserEntry<'a> {
    user: User<'a>,
}

#[derive(Serialize)]
struct User<'a> {
    exec: ExecConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecConfig<'a> {
    api_version: &'static str,
    interactive_mode: &'static str,
    command: &'static str,
    args: Vec<&'a str>,
}

const CONTEXT_NAME: &str = "kube-context";
const CLUSTER_NAME: &str = "gke-cluster";
const USER_NAME: &str = "kube-user";

/// Render a kubeconfig for the given cluster credential.
pub fn render_kubeconfig(credential: &KubernetesCredential) -> ProviderResult<String> {
    match credential.provider {
        KubernetesClusterProvider::GcpGke => render_gke_kubeconfig(&credential.gke()),
        other => Err(ProviderError::UnsupportedCluster(other.as_str().to_string())),
    }
}

fn render_gke_kubeconfig(gke: &GkeClusterCredential) -> ProviderResult<String> {
    let config = KubeConfig {
        api_version: "v1",
        kind: "Config",
        current_context: CONTEXT_NAME,
        contexts: vec![Named {
            name: CONTEXT_NAME,
            entry: ContextEntry {
                context: ContextRef {
                    cluster: CLUSTER_NAME,
                    user: USER_NAME,
                },
            },
        }],
        clusters: vec![Named {
            name: CLUSTER_NAME,
            entry: ClusterEntry {
                cluster: Cluster {
                    server: format!("https://{}", gke.cluster_endpoint.trim()),
                    certificate_authority_data: gke.cluster_ca_data.trim(),
                },
            },
        }],
        users: vec![Named {
            name: USER_NAME,
            entry: UserEntry {
                user: User {
                    exec: ExecConfig {
                        api_version: "client.authentication.k8s.io/v1",
                        interactive_mode: "Never",
                        command: GKE_EXEC_PLUGIN_PATH,
                        args: vec![gke.service_account_key_base64.expose().trim()],
                    },
                },
            },
        }],
    };
    Ok(serde_yaml::to_string(&config)?)
}

/// Write a kubeconfig for `credential` to a uniquely named 0600 file under `dir`.
pub fn write_kubeconfig(credential: &KubernetesCredential, dir: &Path) -> ProviderResult<PathBuf> {
    let content = render_kubeconfig(credential)?;
    let path = dir.join(Uuid::new_v4().to_string());
    write_private_file(&path, content.as_bytes())?;
    debug!("Wrote kubeconfig to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Secret;

    fn gke_credential(key: &str) -> KubernetesCredential {
        KubernetesCredential {
            provider: KubernetesClusterProvider::GcpGke,
            gcp_gke: Some(GkeClusterCredential {
                cluster_endpoint: "34.1.2.3".to_string(),
                cluster_ca_data: "LS0tLS1CRUdJTg==".to_string(),
                service_account_key_base64: Secret::new(key),
            }),
            aws_eks: None,
            azure_aks: None,
            cluster_endpoint: String::new(),
            cluster_ca_data: String::new(),
            service_account_key_base64: Secret::default(),
        }
    }

    #[test]
    fn test_gke_kubeconfig_embeds_key_verbatim() {
        let key = "eyJ0eXBlIjoic2VydmljZV9hY2NvdW50In0".repeat(20);
        let rendered = render_kubeconfig(&gke_credential(&key)).unwrap();

        let doc: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        let arg = &doc["users"][0]["user"]["exec"]["args"][0];
        assert_eq!(arg.as_str(), Some(key.as_str()));
        assert_eq!(
            doc["clusters"][0]["cluster"]["server"].as_str(),
            Some("https://34.1.2.3")
        );
        assert_eq!(
            doc["users"][0]["user"]["exec"]["command"].as_str(),
            Some(GKE_EXEC_PLUGIN_PATH)
        );
    }

    #[test]
    fn test_gke_kubeconfig_survives_yaml_metacharacters() {
        let mut credential = gke_credential("a\"b\n- injected: true\n#c");
        if let Some(gke) = credential.gcp_gke.as_mut() {
            gke.cluster_endpoint = "34.1.2.3\nusers: []".to_string();
        }
        let rendered = render_kubeconfig(&credential).unwrap();

        let doc: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        let args = doc["users"][0]["user"]["exec"]["args"].as_sequence().unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].as_str(), Some("a\"b\n- injected: true\n#c"));
        assert_eq!(doc["users"].as_sequence().unwrap().len(), 1);
        assert_eq!(
            doc["clusters"][0]["cluster"]["server"].as_str(),
            Some("https://34.1.2.3\nusers: []")
        );
        assert_eq!(doc["current-context"].as_str(), Some("kube-context"));
        assert_eq!(doc["contexts"][0]["context"]["user"].as_str(), Some("kube-user"));
    }

    #[test]
    fn test_eks_is_unsupported() {
        let mut credential = gke_credential("a2V5");
        credential.provider = KubernetesClusterProvider::AwsEks;
        let err = render_kubeconfig(&credential).unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedCluster(ref c) if c == "aws_eks"));
    }

    #[test]
    fn test_write_kubeconfig_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let credential = gke_credential("a2V5");
        let first = write_kubeconfig(&credential, dir.path()).unwrap();
        let second = write_kubeconfig(&credential, dir.path()).unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with(dir.path()));
    }
}
