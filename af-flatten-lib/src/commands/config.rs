use crate::Result;
use crate::hierarchy::SentinelStyle;
use crate::sink::PollSettings;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "af-flatten.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the DataRobot REST API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Name given to uploaded datasets
    #[serde(default = "default_dataset_name")]
    pub dataset_name: String,

    /// Total time to wait for an upload to be indexed
    #[serde(default = "default_poll_timeout", with = "humantime_serde")]
    pub poll_timeout: Duration,

    /// Pause between dataset status checks
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Timeout for a single HTTP request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Placeholder style for unnamed nodes
    #[serde(default)]
    pub sentinels: SentinelStyle,

    /// Rows shown in the console preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_endpoint() -> String {
    crate::sink::DEFAULT_ENDPOINT.to_string()
}

fn default_dataset_name() -> String {
    crate::sink::DEFAULT_DATASET_NAME.to_string()
}

const fn default_poll_timeout() -> Duration {
    crate::sink::DEFAULT_POLL_TIMEOUT
}

const fn default_poll_interval() -> Duration {
    crate::sink::DEFAULT_POLL_INTERVAL
}

const fn default_request_timeout() -> Duration {
    crate::source::DEFAULT_REQUEST_TIMEOUT
}

const fn default_preview_rows() -> usize {
    10
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading af-flatten configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!("no '{path}' found, using default configuration");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading af-flatten configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        log::debug!("loaded configuration from '{final_path}'");
        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// The configured endpoint as a URL.
    pub fn endpoint_url(&self) -> Result<Url> {
        parse_endpoint(&self.endpoint)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if polling bounds are inconsistent or the endpoint is not an HTTP(S) URL
    pub fn validate(&self) -> Result<()> {
        PollSettings {
            timeout: self.poll_timeout,
            interval: self.poll_interval,
        }
        .validate()?;

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        if self.dataset_name.trim().is_empty() {
            return Err(app_err!("dataset_name must not be empty"));
        }

        let _ = self.endpoint_url()?;
        Ok(())
    }
}

/// Parse an API endpoint, accepting only `http` and `https` URLs.
pub fn parse_endpoint(s: &str) -> Result<Url> {
    let url = Url::parse(s).into_app_err_with(|| format!("invalid endpoint URL '{s}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(app_err!("endpoint must be an http or https URL, got '{s}'"));
    }

    Ok(url)
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
    }

    #[test]
    fn test_default_config_matches_field_defaults() {
        let from_empty: Config = toml::from_str("").unwrap();
        assert_eq!(from_empty, Config::default());
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.poll_timeout, Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.sentinels, SentinelStyle::Legacy);
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn test_validate_zero_interval() {
        let config = Config {
            poll_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_interval_longer_than_timeout() {
        let config = Config {
            poll_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(10),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_interval_equal_to_timeout() {
        let config = Config {
            poll_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(5),
            ..Config::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_non_http_endpoint() {
        let config = Config {
            endpoint: "ftp://example.com/api".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_garbage_endpoint() {
        let config = Config {
            endpoint: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_blank_dataset_name() {
        let config = Config {
            dataset_name: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let output_path = Utf8PathBuf::try_from(tmp.path().join(CONFIG_FILE_NAME)).unwrap();
        Config::save_default(&output_path).unwrap();
        let loaded = Config::load(&Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap(), Some(&output_path)).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let base_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let config = Config::load(&base_dir, None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_found_in_base_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let base_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(base_dir.join(CONFIG_FILE_NAME), "sentinels = \"unified\"\npoll_interval = \"500ms\"\n").unwrap();

        let config = Config::load(&base_dir, None).unwrap();
        assert_eq!(config.sentinels, SentinelStyle::Unified);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_default_config_toml_is_not_empty() {
        assert!(!DEFAULT_CONFIG_TOML.is_empty());
    }
}
