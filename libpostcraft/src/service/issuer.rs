//! Preview link issuance and resolution
//!
//! A preview token is `base64url(payload) "." base64url(HMAC-SHA256(payload))`
//! where the payload is a small JSON document naming the owner, the draft and
//! the validity window. Tokens carry no draft content: resolving one always
//! re-reads the live draft from the store.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info, warn};
use url::Url;

use super::draft::DraftStore;
use crate::clock::Clock;
use crate::config::PREVIEW_SECRET_ENV;
use crate::context::{OwnerId, RequestContext};
use crate::error::{ConfigError, PostcraftError, Result};
use crate::types::Draft;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: u8 = 1;
const RANDOM_KEY_BYTES: usize = 32;

/// Secret used to sign preview tokens
pub struct SigningKey(SecretBox<Vec<u8>>);

impl SigningKey {
    /// Wrap raw key material
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty key.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "preview secret".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(Self(SecretBox::new(Box::new(bytes))))
    }

    /// Fresh random key; tokens signed with it die with the process
    pub fn random() -> Self {
        let mut bytes = vec![0u8; RANDOM_KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(SecretBox::new(Box::new(bytes)))
    }

    /// Key from `POSTCRAFT_PREVIEW_SECRET`, then `secret_file`, then random
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if a configured secret file cannot be
    /// read and `ConfigError::InvalidValue` if the secret is empty.
    pub fn load(secret_file: Option<&Path>) -> Result<Self> {
        if let Ok(secret) = std::env::var(PREVIEW_SECRET_ENV) {
            debug!("Using preview secret from environment");
            return Self::from_bytes(secret.trim().as_bytes().to_vec());
        }

        if let Some(path) = secret_file {
            let secret = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
            debug!(path = %path.display(), "Using preview secret from file");
            return Self::from_bytes(secret.trim().as_bytes().to_vec());
        }

        warn!("No preview secret configured; preview links will not survive a restart");
        Ok(Self::random())
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length
        match HmacSha256::new_from_slice(self.0.expose_secret()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC-SHA256 takes keys of any length"),
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    v: u8,
    o: String,
    d: String,
    iat: i64,
    exp: i64,
    b: String,
}

/// Verified contents of a preview token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewClaims {
    pub owner: OwnerId,
    pub draft_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub base_url: String,
}

/// A shareable preview URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewLink {
    pub url: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and resolves signed, expiring preview tokens
pub struct PreviewIssuer {
    store: Arc<DraftStore>,
    clock: Arc<dyn Clock>,
    key: SigningKey,
    default_ttl: Duration,
    base_url: Option<String>,
}

impl PreviewIssuer {
    pub fn new(
        store: Arc<DraftStore>,
        clock: Arc<dyn Clock>,
        key: SigningKey,
        default_ttl: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            key,
            default_ttl,
            base_url: None,
        }
    }

    /// Pin the issuer to one base URL
    ///
    /// Links for any other base URL are refused, and tokens minted under a
    /// different base URL no longer resolve.
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::InvalidInput` if `base_url` is not an
    /// absolute http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Some(normalize_base_url(base_url)?);
        Ok(self)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a preview link for one of the caller's drafts
    ///
    /// `expires_in` falls back to the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::NotFound` if the caller has no such draft and
    /// `PostcraftError::InvalidInput` for a base URL that is not an absolute
    /// http(s) URL (or not the pinned one) and for a lifetime that is not
    /// positive or overflows the calendar.
    pub async fn generate_preview_url(
        &self,
        ctx: &RequestContext,
        draft_id: &str,
        base_url: &str,
        expires_in: Option<Duration>,
    ) -> Result<PreviewLink> {
        let base_url = normalize_base_url(base_url)?;
        if let Some(pinned) = &self.base_url {
            if *pinned != base_url {
                return Err(PostcraftError::InvalidInput(format!(
                    "Preview links are served from '{}', not '{}'",
                    pinned, base_url
                )));
            }
        }
        let ttl = expires_in.unwrap_or(self.default_ttl);
        if ttl <= Duration::zero() {
            return Err(PostcraftError::InvalidInput(
                "Preview lifetime must be positive".to_string(),
            ));
        }

        let draft = self.store.get_draft(ctx, draft_id).await?;

        let issued_at = self.clock.now();
        let expires_at = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            PostcraftError::InvalidInput("Preview lifetime is too large".to_string())
        })?;
        let payload = TokenPayload {
            v: TOKEN_VERSION,
            o: ctx.owner.as_str().to_string(),
            d: draft.draft_id.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            b: base_url.clone(),
        };
        let token = self.sign(&payload)?;

        info!(
            owner = %ctx.owner,
            draft_id = %draft.draft_id,
            expires_at = %expires_at,
            "Issued preview link"
        );
        Ok(PreviewLink {
            url: format!("{}/preview/{}", base_url, token),
            token,
            expires_at: DateTime::from_timestamp(payload.exp, 0).unwrap_or(expires_at),
        })
    }

    /// Check a token's signature and decode it without touching the store
    ///
    /// Expiry is not checked here.
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::NotFound` for malformed or tampered tokens.
    pub fn verify(&self, token: &str) -> Result<PreviewClaims> {
        let not_found = || PostcraftError::NotFound("preview".to_string());

        let (payload_b64, signature_b64) = token.split_once('.').ok_or_else(not_found)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| not_found())?;
        let mut mac = self.key.mac();
        mac.update(payload_b64.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            debug!("Rejected preview token with bad signature");
            return Err(not_found());
        }

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| not_found())?;
        let payload: TokenPayload =
            serde_json::from_slice(&payload_json).map_err(|_| not_found())?;
        if payload.v != TOKEN_VERSION {
            return Err(not_found());
        }

        Ok(PreviewClaims {
            owner: OwnerId::new(payload.o).map_err(|_| not_found())?,
            draft_id: payload.d,
            issued_at: DateTime::from_timestamp(payload.iat, 0).ok_or_else(not_found)?,
            expires_at: DateTime::from_timestamp(payload.exp, 0).ok_or_else(not_found)?,
            base_url: payload.b,
        })
    }

    /// Resolve a token to the live draft it names
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::NotFound` for malformed or tampered tokens,
    /// for tokens minted under another base URL when the issuer is pinned,
    /// and for drafts that no longer exist, and `PostcraftError::ExpiredToken`
    /// once the current time is past the token's expiry.
    pub async fn resolve(&self, token: &str) -> Result<Draft> {
        let claims = self.verify(token)?;
        if let Some(pinned) = &self.base_url {
            if *pinned != claims.base_url {
                debug!(base_url = %claims.base_url, "Rejected preview token for another base URL");
                return Err(PostcraftError::NotFound("preview".to_string()));
            }
        }
        let draft = self.store.find(&claims.owner, &claims.draft_id).await?;

        // Tokens carry whole seconds
        if self.clock.now().timestamp() > claims.expires_at.timestamp() {
            info!(
                owner = %claims.owner,
                draft_id = %claims.draft_id,
                expired_at = %claims.expires_at,
                "Preview link expired"
            );
            return Err(PostcraftError::ExpiredToken {
                expired_at: claims.expires_at,
            });
        }

        debug!(owner = %claims.owner, draft_id = %claims.draft_id, "Resolved preview link");
        Ok(draft)
    }

    fn sign(&self, payload: &TokenPayload) -> Result<String> {
        let json = serde_json::to_vec(payload).map_err(|e| {
            PostcraftError::InvalidInput(format!("Unencodable token payload: {}", e))
        })?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(json);
        let mut mac = self.key.mac();
        mac.update(payload_b64.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", payload_b64, signature))
    }
}

/// Accept only absolute http(s) URLs; strip trailing slashes
fn normalize_base_url(base_url: &str) -> Result<String> {
    let parsed = Url::parse(base_url.trim()).map_err(|e| {
        PostcraftError::InvalidInput(format!("Invalid base URL '{}': {}", base_url, e))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(PostcraftError::InvalidInput(format!(
            "Base URL must be an absolute http(s) URL: '{}'",
            base_url
        )));
    }
    Ok(base_url.trim().trim_end_matches('/').to_string())
}
