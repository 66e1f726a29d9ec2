//! Mock publish client for testing
//!
//! Simulates successes, failures and latency so publish flows can be tested
//! without credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::context::AuthHandle;
use crate::error::PlatformError;
use crate::platforms::{PublishClient, PublishReceipt};
use crate::types::Visibility;

/// Configuration for mock publisher behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Client name (e.g., "mock-linkedin")
    pub name: String,

    /// Error returned for every publish, if any
    pub failure: Option<PlatformError>,

    /// Credential the mock accepts; any credential when `None`
    pub accepted_token: Option<String>,

    /// Delay before completing (simulates network latency)
    pub delay: Duration,

    /// Character limit enforced on publish
    pub character_limit: Option<usize>,

    /// Number of times publish has been called
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Text and visibility of every accepted publish
    pub published: Arc<Mutex<Vec<(String, Visibility)>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            failure: None,
            accepted_token: None,
            delay: Duration::from_millis(0),
            character_limit: None,
            publish_call_count: Arc::new(Mutex::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock publisher for testing
pub struct MockPublisher {
    config: MockConfig,
}

impl MockPublisher {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock publisher that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock publisher that only accepts one credential
    pub fn requiring_token(name: &str, token: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            accepted_token: Some(token.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock publisher that fails every publish with `error`
    pub fn failing(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            failure: Some(error),
            ..Default::default()
        })
    }

    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            character_limit: Some(limit),
            ..Default::default()
        })
    }

    /// Get the number of times publish was called
    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    /// Get all text that was published
    pub fn published(&self) -> Vec<(String, Visibility)> {
        self.config.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishClient for MockPublisher {
    async fn publish(
        &self,
        auth: &AuthHandle,
        text: &str,
        visibility: Visibility,
    ) -> std::result::Result<PublishReceipt, PlatformError> {
        *self.config.publish_call_count.lock().unwrap() += 1;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if let Some(expected) = &self.config.accepted_token {
            if auth.expose() != expected {
                return Err(PlatformError::Authentication(
                    "Token rejected".to_string(),
                ));
            }
        }

        if let Some(error) = &self.config.failure {
            return Err(error.clone());
        }

        if let Some(limit) = self.config.character_limit {
            let count = text.chars().count();
            if count > limit {
                return Err(PlatformError::Rejected(format!(
                    "Content exceeds {} character limit (got {} characters)",
                    limit, count
                )));
            }
        }

        self.config
            .published
            .lock()
            .unwrap()
            .push((text.to_string(), visibility));

        let id = format!("{}:mock-{}", self.config.name, uuid::Uuid::new_v4());
        Ok(PublishReceipt { id, url: None })
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }
}
