//! `kustomize build` rendering of a base + overlay directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use planton_provider::write_private_file;
use tracing::info;

use crate::error::{ManifestError, ManifestResult};

/// Directory kustomize renders for `overlay`.
pub fn overlay_dir(kustomize_dir: &Path, overlay: &str) -> PathBuf {
    kustomize_dir.join("overlays").join(overlay)
}

/// Render `<dir>/overlays/<overlay>` into `<uuid>-kustomize-manifest.yaml`.
pub fn build_kustomize_manifest(
    kustomize_dir: &Path,
    overlay: &str,
    out_dir: &Path,
) -> ManifestResult<PathBuf> {
    let target = overlay_dir(kustomize_dir, overlay);
    let failed = |message: String| ManifestError::KustomizeFailed {
        dir: target.clone(),
        message,
    };

    if !target.is_dir() {
        return Err(failed("overlay directory does not exist".to_string()));
    }

    let binary = which::which("kustomize")
        .map_err(|_| failed("kustomize CLI not found in PATH".to_string()))?;

    let output = Command::new(binary)
        .arg("build")
        .arg(&target)
        .output()
        .map_err(|e| failed(format!("failed to run kustomize: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(stderr.trim().to_string()));
    }

    let path = out_dir.join(format!("{}-kustomize-manifest.yaml", uuid::Uuid::new_v4()));
    write_private_file(&path, &output.stdout)?;
    info!("Rendered kustomize overlay {} to {}", overlay, path.display());
    Ok(path)
}
