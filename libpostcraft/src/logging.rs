//! Logging setup for applications embedding Postcraft
//!
//! The library itself only emits `tracing` events. Applications call
//! [`init_default`] (or build a [`LoggingConfig`]) once at startup to decide
//! where those events go.
//!
//! # Examples
//!
//! ```no_run
//! use libpostcraft::logging::{LoggingConfig, LogFormat};
//!
//! // JSON lines on stderr at debug level
//! LoggingConfig::new(LogFormat::Json, "debug").init();
//!
//! // Or honor POSTCRAFT_LOG_FORMAT / POSTCRAFT_LOG_LEVEL
//! libpostcraft::logging::init_default();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::error::PostcraftError;

pub const LOG_FORMAT_ENV: &str = "POSTCRAFT_LOG_FORMAT";
pub const LOG_LEVEL_ENV: &str = "POSTCRAFT_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    #[default]
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = PostcraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(PostcraftError::InvalidInput(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            ))),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive, e.g. `info` or `libpostcraft=debug,warn`
    pub level: String,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: impl Into<String>) -> Self {
        Self {
            format,
            level: level.into(),
        }
    }

    /// Settings from `POSTCRAFT_LOG_FORMAT` and `POSTCRAFT_LOG_LEVEL`
    ///
    /// Unset or unparsable values fall back to text output at `info`.
    pub fn from_env() -> Self {
        let format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
        Self::new(format, level)
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Install the global subscriber
    ///
    /// Returns `false` if a subscriber was already installed, in which case
    /// the existing one stays in place.
    pub fn init(&self) -> bool {
        let filter = self.filter();
        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(false)
                .try_init(),
        };
        installed.is_ok()
    }
}

/// Install logging from environment settings
pub fn init_default() -> bool {
    LoggingConfig::from_env().init()
}
