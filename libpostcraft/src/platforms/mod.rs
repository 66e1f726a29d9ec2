//! Publish client abstraction
//!
//! Postcraft never talks to a social network itself. Publishing goes through a
//! [`PublishClient`] supplied by the embedding application, which owns the
//! network call and credential handling.
//!
//! # Examples
//!
//! ```no_run
//! use libpostcraft::context::AuthHandle;
//! use libpostcraft::platforms::{mock::MockPublisher, PublishClient};
//! use libpostcraft::types::Visibility;
//!
//! # async fn example() -> Result<(), libpostcraft::error::PlatformError> {
//! let client = MockPublisher::success("mock");
//! let auth = AuthHandle::new("token");
//! let receipt = client.publish(&auth, "Hello!", Visibility::Public).await?;
//! println!("Published {} to {}", receipt.id, client.name());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::AuthHandle;
use crate::error::PlatformError;
use crate::types::Visibility;

// Mock publisher is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Confirmation returned by a platform after a successful publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Platform-specific post id
    pub id: String,
    /// Public URL of the post, when the platform reports one
    pub url: Option<String>,
}

/// Outbound side of publishing
///
/// Implementations perform exactly one publish attempt per call. Retrying is
/// the caller's decision.
#[async_trait]
pub trait PublishClient: Send + Sync {
    /// Publish `text` on behalf of the credential holder
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if the credential is rejected,
    /// `PlatformError::Rejected` if the platform refuses the content, and
    /// `PlatformError::Network` or `PlatformError::RateLimit` for transport
    /// problems.
    async fn publish(
        &self,
        auth: &AuthHandle,
        text: &str,
        visibility: Visibility,
    ) -> std::result::Result<PublishReceipt, PlatformError>;

    /// Lowercase identifier for logs (e.g. "linkedin")
    fn name(&self) -> &str;

    /// Maximum post length in characters, or `None` without a hard limit
    fn character_limit(&self) -> Option<usize> {
        None
    }
}
