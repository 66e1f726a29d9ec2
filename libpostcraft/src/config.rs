//! Configuration management for Postcraft

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::types::PostType;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "POSTCRAFT_CONFIG";

/// Environment variable carrying the preview signing secret
pub const PREVIEW_SECRET_ENV: &str = "POSTCRAFT_PREVIEW_SECRET";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    pub preview: PreviewConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for durable drafts; drafts live in memory only when unset
    pub path: Option<String>,

    /// Bound on each storage operation (humantime, e.g. "5s")
    #[serde(default = "default_io_timeout")]
    pub io_timeout: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            io_timeout: default_io_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Absolute http(s) URL preview links are issued under
    pub base_url: String,

    /// Lifetime of a preview link (humantime, e.g. "1h")
    #[serde(default = "default_ttl")]
    pub default_ttl: String,

    /// Directory rendered preview pages are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File holding the signing secret
    pub secret_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_owner")]
    pub owner: String,
    pub theme: Option<String>,
    #[serde(default)]
    pub post_type: PostType,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            theme: None,
            post_type: PostType::default(),
        }
    }
}

fn default_io_timeout() -> String {
    "5s".to_string()
}

fn default_ttl() -> String {
    "1h".to_string()
}

fn default_output_dir() -> String {
    "~/.local/share/postcraft/previews".to_string()
}

fn default_owner() -> String {
    "default".to_string()
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    /// Parse and check configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                path: Some("~/.local/share/postcraft/drafts".to_string()),
                io_timeout: default_io_timeout(),
            },
            preview: PreviewConfig {
                base_url: "http://localhost:8080".to_string(),
                default_ttl: default_ttl(),
                output_dir: default_output_dir(),
                secret_file: None,
            },
            defaults: DefaultsConfig::default(),
        }
    }

    /// Check values that TOML typing alone cannot
    pub fn validate(&self) -> Result<()> {
        if self.preview.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("preview.base_url".to_string()).into());
        }
        self.io_timeout()?;
        self.preview_ttl()?;
        Ok(())
    }

    pub fn io_timeout(&self) -> Result<Duration> {
        parse_duration_field("storage.io_timeout", &self.storage.io_timeout)
    }

    pub fn preview_ttl(&self) -> Result<Duration> {
        parse_duration_field("preview.default_ttl", &self.preview.default_ttl)
    }

    /// Draft directory with `~` expanded
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage.path.as_deref().map(expand_path)
    }

    pub fn output_dir(&self) -> PathBuf {
        expand_path(&self.preview.output_dir)
    }
}

/// Parse a humantime duration (e.g. "30s", "1h 30m")
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    humantime::parse_duration(input.trim())
        .map_err(|e| format!("Invalid duration '{}': {}", input, e))
}

fn parse_duration_field(field: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value).map_err(|message| ConfigError::InvalidValue {
        field: field.to_string(),
        message,
    })?;
    if duration.is_zero() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into());
    }
    Ok(duration)
}

/// Expand a leading `~` in a configured path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// Resolve the configuration file path under the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(expand_path(&path));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("postcraft").join("config.toml"))
}
