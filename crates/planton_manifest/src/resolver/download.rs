//! Manifest download for `-f https://...`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use planton_provider::write_private_file;
use tracing::info;

use crate::error::{ManifestError, ManifestResult};

/// Fetches manifest bytes from a URL.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ManifestResult<Vec<u8>>;
}

/// HTTP(S) fetcher backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ManifestFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ManifestResult<Vec<u8>> {
        let failed = |message: String| ManifestError::ManifestDownloadFailed {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("server responded with {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

pub fn is_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

/// Download `url` into `<uuid>.yaml` under `dir`.
pub async fn download_manifest(
    fetcher: &dyn ManifestFetcher,
    url: &str,
    dir: &Path,
) -> ManifestResult<PathBuf> {
    let bytes = fetcher.fetch(url).await?;
    let path = dir.join(format!("{}.yaml", uuid::Uuid::new_v4()));
    write_private_file(&path, &bytes)?;
    info!("Downloaded manifest from {} to {}", url, path.display());
    Ok(path)
}
