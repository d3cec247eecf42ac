//! Backend defaults from `PROJECT_PLANTON_BACKEND_*` environment variables.
//!
//! The state key is never read from the environment.

use crate::config::BackendConfig;

pub const ENV_BACKEND_TYPE: &str = "PROJECT_PLANTON_BACKEND_TYPE";
pub const ENV_BACKEND_BUCKET: &str = "PROJECT_PLANTON_BACKEND_BUCKET";
pub const ENV_BACKEND_REGION: &str = "PROJECT_PLANTON_BACKEND_REGION";
pub const ENV_BACKEND_ENDPOINT: &str = "PROJECT_PLANTON_BACKEND_ENDPOINT";

/// Read the environment layer through `lookup`.
pub fn from_env_with<F>(lookup: F) -> BackendConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = BackendConfig {
        backend_type: lookup(ENV_BACKEND_TYPE),
        bucket: lookup(ENV_BACKEND_BUCKET),
        key: None,
        region: lookup(ENV_BACKEND_REGION),
        endpoint: lookup(ENV_BACKEND_ENDPOINT),
        s3_compatible: false,
    };
    config.s3_compatible = config.is_s3_compatible();
    config
}

/// Read the environment layer from the process environment.
pub fn from_env() -> BackendConfig {
    from_env_with(|name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_lookup_layer() {
        let vars: HashMap<&str, &str> = [
            (ENV_BACKEND_TYPE, "s3"),
            (ENV_BACKEND_BUCKET, "state"),
            (ENV_BACKEND_REGION, "auto"),
            ("PROJECT_PLANTON_BACKEND_KEY", "ignored"),
        ]
        .into_iter()
        .collect();

        let config = from_env_with(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.type_str(), Some("s3"));
        assert_eq!(config.bucket(), Some("state"));
        assert_eq!(config.key(), None);
        assert!(config.s3_compatible);
    }

    #[test]
    #[serial_test::serial]
    fn test_process_environment() {
        temp_env::with_vars(
            [
                (ENV_BACKEND_TYPE, Some("gcs")),
                (ENV_BACKEND_BUCKET, Some("from-env")),
                (ENV_BACKEND_REGION, None),
                (ENV_BACKEND_ENDPOINT, None),
            ],
            || {
                let config = from_env();
                assert_eq!(config.type_str(), Some("gcs"));
                assert_eq!(config.bucket(), Some("from-env"));
                assert_eq!(config.region(), None);
            },
        );
    }
}
