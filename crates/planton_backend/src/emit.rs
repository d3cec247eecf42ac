//! Backend file and `--backend-config` argument emission for HCL tools.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{BackendConfig, BackendType};
use crate::error::BackendResult;

/// File written into the module directory.
pub const BACKEND_FILE_NAME: &str = "backend.tf";

/// Flags baked into the backend block of S3-compatible stores.
pub const S3_COMPATIBLE_FLAGS: &[&str] = &[
    "skip_credentials_validation",
    "skip_region_validation",
    "skip_requesting_account_id",
    "skip_metadata_api_check",
    "use_path_style",
];

/// Render the `terraform { backend "<type>" {} }` block.
pub fn render_backend_file(config: &BackendConfig) -> BackendResult<String> {
    let backend_type = config.resolved_type()?;
    let mut out = String::from("terraform {\n");

    if config.s3_compatible {
        out.push_str(&format!("  backend \"{}\" {{\n", backend_type));
        let width = S3_COMPATIBLE_FLAGS.iter().map(|f| f.len()).max().unwrap_or(0);
        for flag in S3_COMPATIBLE_FLAGS {
            out.push_str(&format!("    {:width$} = true\n", flag, width = width));
        }
        out.push_str("  }\n");
    } else {
        out.push_str(&format!("  backend \"{}\" {{}}\n", backend_type));
    }

    out.push_str("}\n");
    Ok(out)
}

/// Write [`BACKEND_FILE_NAME`] into `module_dir`.
pub fn write_backend_file(module_dir: &Path, config: &BackendConfig) -> BackendResult<PathBuf> {
    let path = module_dir.join(BACKEND_FILE_NAME);
    fs::write(&path, render_backend_file(config)?)?;
    debug!("Wrote backend file {}", path.display());
    Ok(path)
}

/// `key=value` pairs for `init --backend-config`, followed by `extra` as given.
pub fn backend_config_values(config: &BackendConfig, extra: &[String]) -> BackendResult<Vec<String>> {
    let mut values = Vec::new();
    let mut push = |name: &str, value: Option<&str>| {
        if let Some(v) = value {
            values.push(format!("{}={}", name, v));
        }
    };

    match config.resolved_type()? {
        BackendType::Local => {}
        BackendType::S3 => {
            push("bucket", config.bucket());
            push("key", config.key());
            push("region", config.region());
            if let Some(endpoint) = config.endpoint() {
                push("endpoints", Some(format!("{{s3=\"{}\"}}", endpoint).as_str()));
            }
        }
        BackendType::Gcs => {
            push("bucket", config.bucket());
            push("prefix", config.key());
        }
        BackendType::Azurerm => {
            push("container_name", config.bucket());
            push("key", config.key());
        }
    }

    values.extend(extra.iter().cloned());
    Ok(values)
}

/// Expand values into `--backend-config <value>` argument pairs.
pub fn backend_config_args(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| ["--backend-config".to_string(), v.clone()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r2() -> BackendConfig {
        BackendConfig::new()
            .with_type("s3")
            .with_bucket("rbucket")
            .with_key("env/prod.tfstate")
            .with_region("auto")
            .with_endpoint("https://x.r2.cloudflarestorage.com")
    }

    #[test]
    fn test_plain_backend_block() {
        let file = render_backend_file(&BackendConfig::new().with_type("gcs")).unwrap();
        assert_eq!(file, "terraform {\n  backend \"gcs\" {}\n}\n");

        let local = render_backend_file(&BackendConfig::new()).unwrap();
        assert!(local.contains("backend \"local\" {}"));
    }

    #[test]
    fn test_s3_compatible_block() {
        let file = render_backend_file(&r2()).unwrap();
        for flag in S3_COMPATIBLE_FLAGS {
            assert!(file.contains(flag), "missing {}", flag);
        }
        assert!(file
            .lines()
            .any(|l| l.trim().starts_with("use_path_style") && l.trim().ends_with("= true")));
    }

    #[test]
    fn test_s3_values() {
        let values = backend_config_values(&r2(), &["encrypt=true".to_string()]).unwrap();
        assert_eq!(
            values,
            vec![
                "bucket=rbucket",
                "key=env/prod.tfstate",
                "region=auto",
                "endpoints={s3=\"https://x.r2.cloudflarestorage.com\"}",
                "encrypt=true",
            ]
        );
    }

    #[test]
    fn test_gcs_and_azure_mapping() {
        let gcs = BackendConfig::new().with_type("gcs").with_bucket("b").with_key("p");
        assert_eq!(backend_config_values(&gcs, &[]).unwrap(), vec!["bucket=b", "prefix=p"]);

        let azure = BackendConfig::new().with_type("azurerm").with_bucket("c").with_key("k");
        assert_eq!(
            backend_config_values(&azure, &[]).unwrap(),
            vec!["container_name=c", "key=k"]
        );
    }

    #[test]
    fn test_args_expansion() {
        let args = backend_config_args(&["key=a".to_string(), "region=b".to_string()]);
        assert_eq!(args, vec!["--backend-config", "key=a", "--backend-config", "region=b"]);
    }

    #[test]
    fn test_write_backend_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_backend_file(dir.path(), &r2()).unwrap();
        assert_eq!(path, dir.path().join("backend.tf"));
        assert!(fs::read_to_string(path).unwrap().contains("backend \"s3\""));
    }
}
