//! Clipboard access and content classification.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{ManifestError, ManifestResult};

/// Source of clipboard text.
#[cfg_attr(test, mockall::automock)]
pub trait ClipboardReader: Send + Sync {
    fn read(&self) -> ManifestResult<String>;
}

/// Clipboard tools tried in order, with their arguments.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("pbpaste", &[]),
    ("wl-paste", &["--no-newline"]),
    ("xclip", &["-selection", "clipboard", "-o"]),
    ("xsel", &["--clipboard", "--output"]),
    ("powershell.exe", &["-NoProfile", "-Command", "Get-Clipboard"]),
];

/// Reads the OS clipboard through the first working clipboard tool on PATH.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardReader for SystemClipboard {
    fn read(&self) -> ManifestResult<String> {
        let mut failures = Vec::new();

        for (tool, args) in CLIPBOARD_TOOLS {
            let Ok(binary) = which::which(tool) else {
                continue;
            };

            debug!("Reading clipboard with {}", tool);
            match Command::new(&binary).args(*args).output() {
                Ok(output) if output.status.success() => {
                    return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
                }
                Ok(output) => failures.push(format!(
                    "{} exited with {}: {}",
                    tool,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )),
                Err(e) => failures.push(format!("{}: {}", tool, e)),
            }
        }

        let message = if failures.is_empty() {
            let names: Vec<&str> = CLIPBOARD_TOOLS.iter().map(|(tool, _)| *tool).collect();
            format!("no clipboard tool found on PATH (tried {})", names.join(", "))
        } else {
            failures.join("; ")
        };
        Err(ManifestError::ClipboardUnavailable(message))
    }
}

/// What the clipboard turned out to hold.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardContent {
    /// Path to an existing manifest file.
    FilePath(PathBuf),
    /// A stack input document (top-level `target`).
    StackInput(Mapping),
    /// A raw manifest document.
    Manifest(String),
}

/// Classify clipboard text as a path, a stack input or a manifest.
pub fn classify_clipboard(raw: &str) -> ManifestResult<ClipboardContent> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ManifestError::ClipboardEmpty);
    }

    if is_likely_file_path(content) {
        let path = expand_home(content);
        if !path.exists() {
            return Err(ManifestError::ClipboardFileNotFound { path });
        }
        debug!("Clipboard holds a file path: {}", path.display());
        return Ok(ClipboardContent::FilePath(path));
    }

    match serde_yaml::from_str::<Value>(content) {
        Ok(Value::Mapping(map)) => {
            if map.contains_key("target") {
                Ok(ClipboardContent::StackInput(map))
            } else {
                Ok(ClipboardContent::Manifest(content.to_string()))
            }
        }
        Ok(_) => Err(ManifestError::ClipboardInvalidYaml {
            raw: content.to_string(),
            message: "expected a YAML mapping with apiVersion, kind, metadata and spec".to_string(),
        }),
        Err(e) => Err(ManifestError::ClipboardInvalidYaml {
            raw: content.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Heuristic for a single-line filesystem path to a manifest.
pub fn is_likely_file_path(content: &str) -> bool {
    if content.contains('\n') || content.contains(' ') {
        return false;
    }

    let lower = content.to_lowercase();
    let yaml_suffix = lower.ends_with(".yaml") || lower.ends_with(".yml");
    let path_prefix = ["/", "./", "../", "~/"]
        .iter()
        .any(|prefix| content.starts_with(prefix));

    if path_prefix {
        yaml_suffix || expand_home(content).exists()
    } else {
        yaml_suffix && !content.contains(':')
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => Path::new(path).to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_empty_clipboard() {
        assert!(matches!(
            classify_clipboard("  \n\t"),
            Err(ManifestError::ClipboardEmpty)
        ));
    }

    #[test]
    fn test_existing_path_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.yaml");
        fs::write(&path, "kind: X\n").unwrap();

        let content = classify_clipboard(&format!("{}\n", path.display())).unwrap();
        assert_eq!(content, ClipboardContent::FilePath(path));
    }

    #[test]
    fn test_missing_yaml_path() {
        let err = classify_clipboard("/definitely/not/here/m.yaml").unwrap_err();
        assert!(matches!(err, ManifestError::ClipboardFileNotFound { .. }));
    }

    #[test]
    fn test_existing_path_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest");
        fs::write(&path, "kind: X\n").unwrap();
        assert!(is_likely_file_path(&path.to_string_lossy()));
    }

    #[test]
    fn test_path_heuristics() {
        assert!(is_likely_file_path("./m.yaml"));
        assert!(is_likely_file_path("../dir/M.YML"));
        assert!(is_likely_file_path("m.yaml"));
        assert!(!is_likely_file_path("kind: m.yaml"));
        assert!(!is_likely_file_path("/no/extension/and/missing"));
        assert!(!is_likely_file_path("a b.yaml"));
        assert!(!is_likely_file_path("kind: X\nspec: {}"));
    }

    #[test]
    fn test_stack_input_detected() {
        let content = classify_clipboard("target:\n  kind: AwsS3Bucket\nprovider_config: {}\n").unwrap();
        assert!(matches!(content, ClipboardContent::StackInput(_)));
    }

    #[test]
    fn test_manifest_detected() {
        let content = classify_clipboard("apiVersion: a/v1\nkind: AwsS3Bucket\n").unwrap();
        assert!(matches!(content, ClipboardContent::Manifest(_)));
    }

    #[test]
    fn test_scalar_is_invalid_yaml() {
        let err = classify_clipboard("just-some-word").unwrap_err();
        assert!(matches!(err, ManifestError::ClipboardInvalidYaml { .. }));
    }

    #[test]
    fn test_broken_yaml() {
        let err = classify_clipboard("kind: [oops\n").unwrap_err();
        match err {
            ManifestError::ClipboardInvalidYaml { raw, .. } => assert_eq!(raw, "kind: [oops"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mock_reader() {
        let mut reader = MockClipboardReader::new();
        reader
            .expect_read()
            .times(1)
            .returning(|| Ok("kind: X\n".to_string()));
        assert_eq!(reader.read().unwrap(), "kind: X\n");
    }
}
