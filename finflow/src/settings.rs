use crate::background::poller::{PollerConfig, DEFAULT_MAX_POLL_ATTEMPTS};
use config::{Config, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_PATH_VAR: &str = "FINFLOW_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "finflow.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    #[serde(default)]
    pub max_consecutive_poll_errors: Option<u32>,

    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    finflow_api::DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    1500
}

fn default_max_poll_attempts() -> u32 {
    DEFAULT_MAX_POLL_ATTEMPTS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            max_consecutive_poll_errors: None,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Load from `$FINFLOW_CONFIG` (or `finflow.toml`) and `FINFLOW__*` variables.
    pub fn new() -> Result<Self, SettingsError> {
        let config_path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(&config_path)
    }

    pub fn load(config_path: &str) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("FINFLOW").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.base_url.is_empty() {
            return Err(SettingsError::Invalid("base_url is required".to_string()));
        }
        if !self.base_url.starts_with("http") {
            return Err(SettingsError::Invalid(
                "base_url must be a valid HTTP(S) URL".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(SettingsError::Invalid(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_poll_attempts == 0 {
            return Err(SettingsError::Invalid(
                "max_poll_attempts must be greater than zero".to_string(),
            ));
        }
        if self.max_consecutive_poll_errors == Some(0) {
            return Err(SettingsError::Invalid(
                "max_consecutive_poll_errors must be greater than zero; omit it for no limit"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
            max_consecutive_errors: self.max_consecutive_poll_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("finflow-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load("/nonexistent/finflow.toml").unwrap();
        assert_eq!(settings.base_url, "http://localhost:8000/api/v1");
        assert_eq!(settings.poller_config(), PollerConfig::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_config(
            "base_url = \"https://finance.example.com/api/v1\"\n\
             poll_interval_ms = 250\n\
             max_consecutive_poll_errors = 5\n",
        );
        let settings = Settings::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.base_url, "https://finance.example.com/api/v1");
        let poller = settings.poller_config();
        assert_eq!(poller.interval, Duration::from_millis(250));
        assert_eq!(poller.max_attempts, 120);
        assert_eq!(poller.max_consecutive_errors, Some(5));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = Settings {
            base_url: "localhost:8000".to_string(),
            ..Settings::default()
        };
        assert!(matches!(bad_url.validate(), Err(SettingsError::Invalid(_))));

        let no_attempts = Settings {
            max_poll_attempts: 0,
            ..Settings::default()
        };
        assert!(no_attempts.validate().is_err());

        let no_interval = Settings {
            poll_interval_ms: 0,
            ..Settings::default()
        };
        assert!(no_interval.validate().is_err());

        let zero_error_bound = Settings {
            max_consecutive_poll_errors: Some(0),
            ..Settings::default()
        };
        assert!(matches!(
            zero_error_bound.validate(),
            Err(SettingsError::Invalid(_))
        ));

        let error_bound = Settings {
            max_consecutive_poll_errors: Some(1),
            ..Settings::default()
        };
        assert!(error_bound.validate().is_ok());
    }
}
