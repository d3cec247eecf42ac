//! Manifest resolution: turn any supported input mode into one file on disk.
//!
//! Modes are tried in priority order and the first one provided wins:
//! stack input, clipboard, manifest path or URL, kustomize overlay, input
//! directory.

mod clipboard;
mod download;
mod kustomize;
mod stack_input;

pub use clipboard::{
    classify_clipboard, expand_home, is_likely_file_path, ClipboardContent, ClipboardReader,
    SystemClipboard,
};
#[cfg(test)]
pub use clipboard::MockClipboardReader;
pub use download::{download_manifest, is_url, HttpFetcher, ManifestFetcher};
pub use kustomize::{build_kustomize_manifest, overlay_dir};
pub use stack_input::StackInput;

use std::path::{Path, PathBuf};

use planton_provider::write_private_file;
use tracing::{debug, info};

use crate::error::{ManifestError, ManifestResult};

/// File name of the manifest inside an `--input-dir` directory.
pub const INPUT_DIR_MANIFEST: &str = "target.yaml";

/// The manifest input modes a command was given.
#[derive(Debug, Clone, Default)]
pub struct ManifestSource {
    /// `-i <path>`.
    pub stack_input: Option<PathBuf>,
    /// `-i` given without a path, to be combined with `--clipboard`.
    pub stack_input_from_clipboard: bool,
    pub clipboard: bool,
    /// `-f`, a path or an http(s) URL.
    pub manifest: Option<String>,
    pub kustomize_dir: Option<PathBuf>,
    pub overlay: Option<String>,
    pub input_dir: Option<PathBuf>,
}

impl ManifestSource {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            manifest: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stack_input.is_none()
            && !self.stack_input_from_clipboard
            && !self.clipboard
            && self.manifest.is_none()
            && self.kustomize_dir.is_none()
            && self.input_dir.is_none()
    }
}

/// Outcome of resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedManifest {
    pub path: PathBuf,
    /// True when `path` was created by the resolver and must be cleaned up.
    pub is_temp: bool,
    /// `provider_config` carried by a stack input, if any.
    pub provider_config: Option<serde_yaml::Value>,
}

impl ResolvedManifest {
    fn existing(path: PathBuf) -> Self {
        Self {
            path,
            is_temp: false,
            provider_config: None,
        }
    }

    fn temporary(path: PathBuf) -> Self {
        Self {
            path,
            is_temp: true,
            provider_config: None,
        }
    }
}

/// Resolves a [`ManifestSource`] to a manifest file.
pub struct ManifestResolver {
    download_dir: PathBuf,
    clipboard: Box<dyn ClipboardReader>,
    fetcher: Box<dyn ManifestFetcher>,
}

impl ManifestResolver {
    /// Resolver using the OS clipboard and an HTTP fetcher.
    ///
    /// Temporary files are written to `download_dir`.
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            clipboard: Box::new(SystemClipboard),
            fetcher: Box::new(HttpFetcher::new()),
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardReader>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn ManifestFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub async fn resolve(&self, source: &ManifestSource) -> ManifestResult<ResolvedManifest> {
        if source.stack_input_from_clipboard {
            if !source.clipboard {
                return Err(ManifestError::StackInputInvalid(
                    "--stack-input needs a path unless combined with --clipboard".to_string(),
                ));
            }
            return self.stack_input_from_clipboard();
        }

        if let Some(path) = &source.stack_input {
            info!("Reading stack input from {}", path.display());
            let input = StackInput::load(path)?;
            return self.extract_stack_input(input);
        }

        if source.clipboard {
            return self.from_clipboard();
        }

        if let Some(manifest) = &source.manifest {
            return self.from_manifest_arg(manifest).await;
        }

        if let Some(dir) = &source.kustomize_dir {
            let overlay = source.overlay.as_deref().ok_or_else(|| {
                ManifestError::ManifestPathInvalid("--kustomize-dir requires --overlay".to_string())
            })?;
            self.ensure_download_dir()?;
            let path = build_kustomize_manifest(dir, overlay, &self.download_dir)?;
            return Ok(ResolvedManifest::temporary(path));
        }

        if let Some(dir) = &source.input_dir {
            let path = dir.join(INPUT_DIR_MANIFEST);
            if !path.is_file() {
                return Err(ManifestError::ManifestPathInvalid(format!(
                    "{} not found in input directory {}",
                    INPUT_DIR_MANIFEST,
                    dir.display()
                )));
            }
            return Ok(ResolvedManifest::existing(path));
        }

        Err(ManifestError::NoManifestSource)
    }

    async fn from_manifest_arg(&self, manifest: &str) -> ManifestResult<ResolvedManifest> {
        if is_url(manifest) {
            self.ensure_download_dir()?;
            let path = download_manifest(self.fetcher.as_ref(), manifest, &self.download_dir).await?;
            return Ok(ResolvedManifest::temporary(path));
        }

        let path = expand_home(manifest);
        if !path.is_file() {
            return Err(ManifestError::ManifestPathInvalid(format!(
                "manifest file not found: {}",
                path.display()
            )));
        }
        Ok(ResolvedManifest::existing(path))
    }

    fn from_clipboard(&self) -> ManifestResult<ResolvedManifest> {
        let raw = self.clipboard.read()?;
        match classify_clipboard(&raw)? {
            ClipboardContent::FilePath(path) => {
                info!("Using manifest path from clipboard: {}", path.display());
                Ok(ResolvedManifest::existing(path))
            }
            ClipboardContent::StackInput(map) => {
                info!("Clipboard holds a stack input, extracting target");
                self.extract_stack_input(StackInput::from_mapping(map)?)
            }
            ClipboardContent::Manifest(content) => {
                self.ensure_download_dir()?;
                let path = self
                    .download_dir
                    .join(format!("{}-clipboard-manifest.yaml", uuid::Uuid::new_v4()));
                write_private_file(&path, content.as_bytes())?;
                debug!("Wrote clipboard manifest to {}", path.display());
                Ok(ResolvedManifest::temporary(path))
            }
        }
    }

    fn stack_input_from_clipboard(&self) -> ManifestResult<ResolvedManifest> {
        let raw = self.clipboard.read()?;
        let input = match classify_clipboard(&raw)? {
            ClipboardContent::StackInput(map) => StackInput::from_mapping(map)?,
            ClipboardContent::FilePath(path) => StackInput::load(&path)?,
            ClipboardContent::Manifest(_) => return Err(ManifestError::ClipboardNotStackInput),
        };
        self.extract_stack_input(input)
    }

    fn extract_stack_input(&self, input: StackInput) -> ManifestResult<ResolvedManifest> {
        self.ensure_download_dir()?;
        let path = input.write_target(&self.download_dir)?;
        debug!("Extracted stack input target to {}", path.display());
        Ok(ResolvedManifest {
            path,
            is_temp: true,
            provider_config: input.provider_config,
        })
    }

    fn ensure_download_dir(&self) -> ManifestResult<()> {
        std::fs::create_dir_all(&self.download_dir)?;
        Ok(())
    }
}
