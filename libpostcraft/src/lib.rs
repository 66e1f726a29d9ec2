//! Postcraft - composable social posts
//!
//! This library assembles professional social-network posts from small
//! components (hooks, bodies, charts, checklists) styled by persona themes,
//! keeps them as owner-scoped drafts, and shares them through signed,
//! expiring preview links.

pub mod clock;
pub mod components;
pub mod composition;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod preview;
pub mod service;
pub mod themes;
pub mod types;

// Re-export commonly used types
pub use composition::{ComposablePost, PostBuilder};
pub use config::Config;
pub use context::{AuthHandle, OwnerId, RequestContext};
pub use error::{PostcraftError, Result};
pub use service::PostcraftService;
pub use themes::{Theme, ThemeManager};
pub use types::{Draft, DraftSummary, PostType, Visibility};
