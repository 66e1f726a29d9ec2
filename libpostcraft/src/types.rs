//! Core types for Postcraft

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{PostcraftError, Result};

/// Structured draft content; the `composed_text` key holds the final text
pub type DraftContent = Map<String, Value>;

/// Content key carrying the composed post text
pub const COMPOSED_TEXT_KEY: &str = "composed_text";

/// Platform limit a composed post is measured against
pub const MAX_POST_CHARS: usize = 3000;

/// Characters visible before the platform's "see more" fold
pub const FOLD_CHARS: usize = 210;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    Text,
    Document,
    Poll,
    Video,
    Carousel,
    Image,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Text => "text",
            PostType::Document => "document",
            PostType::Poll => "poll",
            PostType::Video => "video",
            PostType::Carousel => "carousel",
            PostType::Image => "image",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = PostcraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(PostType::Text),
            "document" => Ok(PostType::Document),
            "poll" => Ok(PostType::Poll),
            "video" => Ok(PostType::Video),
            "carousel" => Ok(PostType::Carousel),
            "image" => Ok(PostType::Image),
            _ => Err(PostcraftError::InvalidInput(format!(
                "Invalid post type: '{}'. Valid options: text, document, poll, video, carousel, image",
                s
            ))),
        }
    }
}

/// Audience of a published post
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Connections,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Connections => write!(f, "connections"),
        }
    }
}

/// A named, in-progress post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Draft {
    pub draft_id: String,
    pub name: String,
    pub post_type: PostType,
    pub theme: Option<String>,
    pub content: DraftContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(
        name: String,
        post_type: PostType,
        theme: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            draft_id: new_draft_id(),
            name,
            post_type,
            theme,
            content: DraftContent::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Final composed text, if one has been stored
    pub fn composed_text(&self) -> Option<&str> {
        self.content.get(COMPOSED_TEXT_KEY).and_then(Value::as_str)
    }

    pub fn summary(&self, is_current: bool) -> DraftSummary {
        DraftSummary {
            draft_id: self.draft_id.clone(),
            name: self.name.clone(),
            post_type: self.post_type,
            theme: self.theme.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_current,
        }
    }
}

/// Externally visible shape of a draft
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftSummary {
    pub draft_id: String,
    pub name: String,
    pub post_type: PostType,
    pub theme: Option<String>,
    pub content: DraftContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_current: bool,
}

/// Fresh globally unique draft id: `draft_` + 32 hex digits
pub fn new_draft_id() -> String {
    format!("draft_{}", Uuid::new_v4().simple())
}
