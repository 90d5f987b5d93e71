//! TOML-based configuration for the Tena client
//!
//! Settings come from, in increasing priority:
//! 1. built-in defaults,
//! 2. `tena.toml` (or the file passed with `--config`),
//! 3. environment variables (`TENA_API_BASE_URL`, `TENA_AI_SERVICE_URL`,
//!    `TENA_LOG_LEVEL`), including a `.env` file loaded by the binary,
//! 4. command-line flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tena.toml";

pub const ENV_API_BASE_URL: &str = "TENA_API_BASE_URL";
pub const ENV_AI_SERVICE_URL: &str = "TENA_AI_SERVICE_URL";
pub const ENV_LOG_LEVEL: &str = "TENA_LOG_LEVEL";

/// Root configuration structure loaded from tena.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenaConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

// ============= API Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the main API; endpoint paths are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL of the AI service, only used for health checks
    #[serde(default = "default_ai_service_url")]
    pub ai_service_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_ai_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_user_agent() -> String {
    format!("tena-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ai_service_url: default_ai_service_url(),
            user_agent: default_user_agent(),
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ============= Output Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl TenaConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `tena.toml` in the working
    /// directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path.to_path_buf()));
                }
                Self::load_file(path)
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_file(default_path)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading configuration from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `TENA_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_with(|name| std::env::var(name).ok());
    }

    /// Apply `TENA_*` overrides using `lookup` as the environment.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(url) = non_empty(ENV_AI_SERVICE_URL) {
            self.api.ai_service_url = url;
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    /// Validate that both base URLs are absolute http(s) URLs
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_url("api.ai_service_url", &self.api.ai_service_url)?;

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(value.trim()).map_err(|e| {
        ConfigError::ValidationError(format!("{} '{}' is not a valid URL: {}", key, value, e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::ValidationError(format!(
            "{} must use http or https, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn create_test_config() -> String {
        r#"
[api]
base_url = "https://tena-api.example.com/api"
ai_service_url = "https://tena-ai.example.com"

[logging]
level = "debug"
json = true

[output]
color = false
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config = TenaConfig::from_toml_str(&create_test_config()).unwrap();

        assert_eq!(config.api.base_url, "https://tena-api.example.com/api");
        assert_eq!(config.api.ai_service_url, "https://tena-ai.example.com");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(!config.output.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TenaConfig::from_toml_str("").unwrap();

        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.ai_service_url, "http://localhost:8000");
        assert!(config.api.user_agent.starts_with("tena-client/"));
        assert_eq!(config.logging.level, "warn");
        assert!(config.output.color);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = TenaConfig::from_toml_str(
            r#"
[api]
base_url = "http://10.0.0.2:5000/api"
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.2:5000/api");
        assert_eq!(config.api.ai_service_url, "http://localhost:8000");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = TenaConfig::from_toml_str("[api\nbase_url = 1");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_BASE_URL, "https://override.example.com/api"),
            (ENV_AI_SERVICE_URL, "   "),
            (ENV_LOG_LEVEL, "tena=trace"),
        ]);
        let mut config = TenaConfig::default();

        config.apply_env_overrides_with(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://override.example.com/api");
        // Blank values are ignored
        assert_eq!(config.api.ai_service_url, "http://localhost:8000");
        assert_eq!(config.logging.level, "tena=trace");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = TenaConfig::default();
        config.api.base_url = "localhost:5000".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = TenaConfig::default();
        config.api.ai_service_url = "ftp://files.example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));

        let mut config = TenaConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = TenaConfig::load(Some(Path::new("/definitely/not/here/tena.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(create_test_config().as_bytes()).unwrap();

        let config = TenaConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.level, "debug");
    }
}
