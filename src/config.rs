use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::transport::GEMINI_API_URL;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Credential for the generative API. Absence is reported at first use, not at load.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: GEMINI_API_URL.to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_seconds: 60,
            temperature: None,
        }
    }
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("STUDY_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => Self::from_yaml(&contents).unwrap_or_else(|e| {
                    tracing::error!(
                        "Failed to parse config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }),
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::debug!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // GEMINI_API_KEY wins over the bare API_KEY when both are set
        if let Some(api_key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
            self.gemini.api_key = Some(api_key);
        }
        if let Some(model) = lookup("STUDY_MODEL") {
            self.gemini.model = model;
        }
        if let Some(base_url) = lookup("STUDY_API_BASE_URL") {
            self.gemini.base_url = base_url;
        }
        if let Some(timeout) = lookup("STUDY_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.gemini.timeout_seconds = secs;
            }
        }
        if let Some(temperature) = lookup("STUDY_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.gemini.temperature = Some(value);
            }
        }
        if let Some(level) = lookup("STUDY_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.gemini.has_api_key() {
            return Err("API_KEY environment variable is not set".into());
        }
        if self.gemini.timeout_seconds == 0 {
            return Err("gemini.timeout_seconds cannot be 0".into());
        }
        if self.gemini.model.trim().is_empty() {
            return Err("gemini.model cannot be empty".into());
        }
        if let Some(t) = self.gemini.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err("gemini.temperature must be between 0.0 and 2.0".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.gemini.timeout(), Duration::from_secs(60));
        assert!(!cfg.gemini.has_api_key());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup_from(&[
            ("API_KEY", "plain"),
            ("STUDY_MODEL", "gemini-2.5-pro"),
            ("STUDY_TIMEOUT_SECONDS", "30"),
            ("STUDY_TEMPERATURE", "not-a-number"),
        ]));
        assert_eq!(cfg.gemini.api_key.as_deref(), Some("plain"));
        assert_eq!(cfg.gemini.model, "gemini-2.5-pro");
        assert_eq!(cfg.gemini.timeout_seconds, 30);
        assert_eq!(cfg.gemini.temperature, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_gemini_key_preferred() {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup_from(&[("API_KEY", "plain"), ("GEMINI_API_KEY", "scoped")]));
        assert_eq!(cfg.gemini.api_key.as_deref(), Some("scoped"));
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup_from(&[("API_KEY", "  ")]));
        assert!(!cfg.gemini.has_api_key());
    }

    #[test]
    fn test_from_yaml_partial() {
        let cfg = Config::from_yaml(
            "gemini:\n  base_url: http://localhost:8080/v1beta\n  timeout_seconds: 45\n",
        )
        .expect("valid yaml");
        assert_eq!(cfg.gemini.base_url, "http://localhost:8080/v1beta");
        assert_eq!(cfg.gemini.timeout_seconds, 45);
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.gemini.api_key, None);
        assert_eq!(cfg.logging.level, "info");
    }
}
