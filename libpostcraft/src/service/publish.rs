//! Publishing the current draft through a platform client

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::draft::DraftStore;
use crate::context::RequestContext;
use crate::error::{PlatformError, PostcraftError, Result};
use crate::platforms::{PublishClient, PublishReceipt};
use crate::types::Visibility;

/// Result of a publish request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub draft_id: String,
    pub platform: String,
    pub char_count: usize,
    pub visibility: Visibility,
    /// `None` for dry runs
    pub receipt: Option<PublishReceipt>,
}

impl PublishOutcome {
    pub fn is_dry_run(&self) -> bool {
        self.receipt.is_none()
    }
}

/// Publishes owners' current drafts
///
/// Each request makes at most one client call; failures are returned to the
/// caller unretried.
#[derive(Clone)]
pub struct PublishService {
    store: Arc<DraftStore>,
    client: Arc<dyn PublishClient>,
}

impl PublishService {
    pub fn new(store: Arc<DraftStore>, client: Arc<dyn PublishClient>) -> Self {
        Self { store, client }
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Publish the composed text of the caller's current draft
    ///
    /// With `dry_run` every check runs but the client is not called.
    ///
    /// # Errors
    ///
    /// - `PostcraftError::PublishFailed(Authentication)` if the context carries
    ///   no credential
    /// - `PostcraftError::NotFound` if the caller has no current draft
    /// - `PostcraftError::InvalidInput` if the draft has no composed text
    /// - `PostcraftError::PublishFailed(Rejected)` if the text exceeds the
    ///   client's character limit
    /// - `PostcraftError::PublishFailed` with the client's error otherwise
    pub async fn publish_current(
        &self,
        ctx: &RequestContext,
        visibility: Visibility,
        dry_run: bool,
    ) -> Result<PublishOutcome> {
        let auth = ctx.auth.as_ref().ok_or_else(|| {
            PostcraftError::PublishFailed(PlatformError::Authentication(
                "No credential supplied".to_string(),
            ))
        })?;

        let draft = self
            .store
            .get_current_draft(ctx)
            .await?
            .ok_or_else(|| PostcraftError::NotFound("current draft".to_string()))?;

        let text = draft
            .composed_text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                PostcraftError::InvalidInput(format!(
                    "Draft '{}' has no composed text to publish",
                    draft.draft_id
                ))
            })?;

        let char_count = text.chars().count();
        if let Some(limit) = self.client.character_limit() {
            if char_count > limit {
                return Err(PlatformError::Rejected(format!(
                    "Content exceeds {} character limit for {} (got {} characters)",
                    limit,
                    self.client.name(),
                    char_count
                ))
                .into());
            }
        }

        let mut outcome = PublishOutcome {
            draft_id: draft.draft_id.clone(),
            platform: self.client.name().to_string(),
            char_count,
            visibility,
            receipt: None,
        };

        if dry_run {
            info!(
                owner = %ctx.owner,
                draft_id = %draft.draft_id,
                platform = self.client.name(),
                "Dry run: skipping publish"
            );
            return Ok(outcome);
        }

        info!(
            owner = %ctx.owner,
            draft_id = %draft.draft_id,
            platform = self.client.name(),
            chars = char_count,
            "Publishing current draft"
        );
        match self.client.publish(auth, text, visibility).await {
            Ok(receipt) => {
                info!(
                    draft_id = %draft.draft_id,
                    platform = self.client.name(),
                    post_id = %receipt.id,
                    "Published"
                );
                outcome.receipt = Some(receipt);
                Ok(outcome)
            }
            Err(e) => {
                warn!(
                    draft_id = %draft.draft_id,
                    platform = self.client.name(),
                    error = %e,
                    "Publish failed"
                );
                Err(e.into())
            }
        }
    }
}
