//! Per-request caller identity
//!
//! Every store and publish operation takes a [`RequestContext`] explicitly.
//! Nothing about the caller is kept in global or task-local state.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{PostcraftError, Result};

/// Stable identifier of the party owning drafts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    /// Build an owner id
    ///
    /// Owner ids name a directory in file-backed stores, so only ASCII
    /// letters, digits, `-`, `_` and `.` are accepted.
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::InvalidInput` for empty ids or ids with other characters.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id == "." || id == ".." {
            return Err(PostcraftError::InvalidInput(format!(
                "Invalid owner id: '{}'",
                id
            )));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(PostcraftError::InvalidInput(format!(
                "Invalid owner id: '{}'. Use letters, digits, '-', '_' or '.'",
                id
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque platform credential
///
/// Debug output is redacted and the value is never serialized.
#[derive(Clone)]
pub struct AuthHandle(SecretString);

impl AuthHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthHandle([REDACTED])")
    }
}

/// Caller identity for one operation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub owner: OwnerId,
    pub auth: Option<AuthHandle>,
}

impl RequestContext {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner, auth: None }
    }

    /// Context for the named owner without credentials
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::InvalidInput` if the owner id is invalid.
    pub fn for_owner(owner: &str) -> Result<Self> {
        Ok(Self::new(OwnerId::new(owner)?))
    }

    pub fn with_auth(mut self, auth: AuthHandle) -> Self {
        self.auth = Some(auth);
        self
    }
}
