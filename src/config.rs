//! Runtime configuration, read from `HYSPLIT_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::TrajectoryParams;

pub const DEFAULT_BASE_URL: &str = "https://www.ready.noaa.gov";
/// Time the server needs to finish a typical run before the archive appears
pub const DEFAULT_RESULT_WAIT: Duration = Duration::from_secs(10);
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(1);

/// Configuration for HysplitClient
#[derive(Debug, Clone)]
pub struct HysplitConfig {
    /// Service root, without trailing slash
    pub base_url: String,
    /// Directory the result archive is written to
    pub output_dir: PathBuf,
    /// Fixed wait between submission and download
    pub result_wait: Duration,
    /// Pause between form steps
    pub step_delay: Duration,
    /// Per-request timeout (None = HTTP client default)
    pub request_timeout: Option<Duration>,
    pub params: TrajectoryParams,
}

impl Default for HysplitConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("."),
            result_wait: DEFAULT_RESULT_WAIT,
            step_delay: DEFAULT_STEP_DELAY,
            request_timeout: None,
            params: TrajectoryParams::default(),
        }
    }
}

impl HysplitConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("HYSPLIT_BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    key: "HYSPLIT_BASE_URL",
                    value: url.to_string(),
                    reason: "expected an http:// or https:// URL".to_string(),
                });
            }
            config.base_url = url.to_string();
        }

        if let Some(dir) = lookup("HYSPLIT_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "HYSPLIT_RESULT_WAIT_SECS")? {
            config.result_wait = Duration::from_secs(secs);
        }

        if let Some(ms) = parse_var::<u64>(&lookup, "HYSPLIT_STEP_DELAY_MS")? {
            config.step_delay = Duration::from_millis(ms);
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "HYSPLIT_TIMEOUT_SECS")? {
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        if let Some(path) = lookup("HYSPLIT_PARAMS") {
            config.params = load_params(PathBuf::from(path))?;
        }

        Ok(config)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

/// Load trajectory params from a JSON file
pub fn load_params(path: PathBuf) -> Result<TrajectoryParams, ConfigError> {
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(source) => return Err(ConfigError::ParamsRead { path, source }),
    };
    serde_json::from_str(&raw).map_err(|source| ConfigError::ParamsParse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HysplitConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.result_wait, Duration::from_secs(10));
        assert_eq!(config.step_delay, Duration::from_secs(1));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.params, TrajectoryParams::default());
    }

    #[test]
    fn test_overrides() {
        let config = HysplitConfig::from_lookup(lookup(&[
            ("HYSPLIT_BASE_URL", "http://127.0.0.1:8080/"),
            ("HYSPLIT_OUTPUT_DIR", "/tmp/out"),
            ("HYSPLIT_RESULT_WAIT_SECS", "30"),
            ("HYSPLIT_STEP_DELAY_MS", "0"),
            ("HYSPLIT_TIMEOUT_SECS", " 45 "),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.result_wait, Duration::from_secs(30));
        assert_eq!(config.step_delay, Duration::ZERO);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let err = HysplitConfig::from_lookup(lookup(&[("HYSPLIT_RESULT_WAIT_SECS", "ten")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "HYSPLIT_RESULT_WAIT_SECS", .. }
        ));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err =
            HysplitConfig::from_lookup(lookup(&[("HYSPLIT_BASE_URL", "ftp://example")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HYSPLIT_BASE_URL", .. }));
    }

    #[test]
    fn test_params_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"met_file": "gdas1.jan23.w1", "trajectory_count": 3}"#).unwrap();

        let config = HysplitConfig::from_lookup(lookup(&[(
            "HYSPLIT_PARAMS",
            path.to_str().unwrap(),
        )]))
        .unwrap();
        assert_eq!(config.params.met_file, "gdas1.jan23.w1");
        assert_eq!(config.params.trajectory_count, 3);
        assert_eq!(config.params.met_data, "GDAS1");
    }

    #[test]
    fn test_params_file_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"latitude": "north"}"#).unwrap();

        let err = HysplitConfig::from_lookup(lookup(&[(
            "HYSPLIT_PARAMS",
            path.to_str().unwrap(),
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParamsParse { .. }));
    }

    #[test]
    fn test_params_file_missing() {
        let err = HysplitConfig::from_lookup(lookup(&[("HYSPLIT_PARAMS", "/nonexistent/p.json")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParamsRead { .. }));
    }
}
