//! Configuration loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Service endpoints and output settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Multipart upload endpoint returning detected objects.
    pub detect_url: String,
    /// JSON endpoint returning the extracted object.
    pub extract_url: String,
    /// Directory exports are written to.
    pub output_dir: PathBuf,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            detect_url: "http://127.0.0.1:5000/detect".to_string(),
            extract_url: "http://127.0.0.1:5000/extract".to_string(),
            output_dir: PathBuf::from("."),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load from `CUTOUT_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let request_timeout = get("CUTOUT_REQUEST_TIMEOUT_SECS").and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    warn!(value = %raw, "ignoring invalid CUTOUT_REQUEST_TIMEOUT_SECS");
                    None
                }
            }
        });

        Self {
            detect_url: get("CUTOUT_DETECT_URL").unwrap_or(defaults.detect_url),
            extract_url: get("CUTOUT_EXTRACT_URL").unwrap_or(defaults.extract_url),
            output_dir: get("CUTOUT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            request_timeout,
        }
    }

    /// Build the shared HTTP client.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.detect_url, "http://127.0.0.1:5000/detect");
        assert_eq!(config.extract_url, "http://127.0.0.1:5000/extract");
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CUTOUT_DETECT_URL", "http://ml:8000/detect"),
            ("CUTOUT_EXTRACT_URL", "http://ml:8000/extract"),
            ("CUTOUT_OUTPUT_DIR", "/tmp/out"),
            ("CUTOUT_REQUEST_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.detect_url, "http://ml:8000/detect");
        assert_eq!(config.extract_url, "http://ml:8000/extract");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CUTOUT_DETECT_URL", "  "),
            ("CUTOUT_REQUEST_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.detect_url, ClientConfig::default().detect_url);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = ClientConfig::from_lookup(lookup(&[("CUTOUT_REQUEST_TIMEOUT_SECS", "0")]));
        assert_eq!(config.request_timeout, None);
    }
}
