//! Error types for Postcraft

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostcraftError>;

#[derive(Error, Debug)]
pub enum PostcraftError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Preview link expired at {expired_at}")]
    ExpiredToken { expired_at: DateTime<Utc> },

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Operation timed out: {0}")]
    Transient(String),

    #[error("Publish failed: {0}")]
    PublishFailed(#[from] PlatformError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PostcraftError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PostcraftError::InvalidInput(_) | PostcraftError::Validation(_) => 3,
            PostcraftError::PublishFailed(PlatformError::Authentication(_)) => 2,
            PostcraftError::Transient(_) => 75,
            PostcraftError::NotFound(_)
            | PostcraftError::ExpiredToken { .. }
            | PostcraftError::UnknownTheme(_)
            | PostcraftError::PublishFailed(_)
            | PostcraftError::Config(_)
            | PostcraftError::Storage(_) => 1,
        }
    }

    /// Whether a caller may retry the failed operation
    ///
    /// Only timeouts qualify. Lookup failures, expiry and publish failures
    /// are terminal for the call that produced them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PostcraftError::Transient(_))
    }
}

/// One failing component inside a composed post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentIssue {
    pub index: usize,
    pub kind: String,
    pub reason: String,
}

impl fmt::Display for ComponentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.index, self.kind, self.reason)
    }
}

/// Every component that failed validation during `compose()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ComponentIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ComponentIssue>) -> Self {
        Self { issues }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} component(s) invalid", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt draft record: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures reported by a publish client
#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected by platform: {0}")]
    Rejected(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(index: usize, kind: &str, reason: &str) -> ComponentIssue {
        ComponentIssue {
            index,
            kind: kind.to_string(),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_exit_code_invalid_input() {
        let error = PostcraftError::InvalidInput("Empty name".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_validation() {
        let error = PostcraftError::Validation(ValidationError::new(vec![issue(
            0,
            "hook",
            "empty",
        )]));
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = PostcraftError::PublishFailed(PlatformError::Authentication(
            "Missing token".to_string(),
        ));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_publish_errors() {
        for err in [
            PlatformError::Network("down".to_string()),
            PlatformError::Rejected("duplicate".to_string()),
            PlatformError::RateLimit("slow down".to_string()),
        ] {
            assert_eq!(PostcraftError::PublishFailed(err).exit_code(), 1);
        }
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(PostcraftError::Transient("store".to_string()).is_retryable());
        assert!(!PostcraftError::NotFound("draft".to_string()).is_retryable());
        assert!(!PostcraftError::ExpiredToken {
            expired_at: Utc::now()
        }
        .is_retryable());
        assert!(!PostcraftError::PublishFailed(PlatformError::Network("x".to_string()))
            .is_retryable());
    }

    #[test]
    fn test_validation_error_lists_every_issue() {
        let error = ValidationError::new(vec![
            issue(0, "hook", "content must be 1-200 characters"),
            issue(3, "progress_chart", "values must be within 0-100"),
        ]);
        let message = error.to_string();
        assert!(message.starts_with("2 component(s) invalid"));
        assert!(message.contains("#0 hook: content must be 1-200 characters"));
        assert!(message.contains("#3 progress_chart"));
    }

    #[test]
    fn test_error_message_formatting_not_found() {
        let error = PostcraftError::NotFound("draft draft_abc".to_string());
        assert_eq!(error.to_string(), "Not found: draft draft_abc");
    }

    #[test]
    fn test_error_message_formatting_publish() {
        let error: PostcraftError = PlatformError::Rejected("too long".to_string()).into();
        assert_eq!(
            error.to_string(),
            "Publish failed: Rejected by platform: too long"
        );
    }

    #[test]
    fn test_error_message_formatting_config() {
        let config_error = ConfigError::MissingField("preview.base_url".to_string());
        let error = PostcraftError::Config(config_error);
        assert_eq!(
            error.to_string(),
            "Configuration error: Missing required field: preview.base_url"
        );
    }

    #[test]
    fn test_error_conversion_from_storage_error() {
        let storage_error = StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let error: PostcraftError = storage_error.into();
        match error {
            PostcraftError::Storage(_) => {}
            _ => panic!("Expected PostcraftError::Storage"),
        }
    }

    #[test]
    fn test_platform_error_clone() {
        let original = PlatformError::Network("Connection failed".to_string());
        let cloned = original.clone();
        assert_eq!(format!("{}", original), format!("{}", cloned));
    }
}
