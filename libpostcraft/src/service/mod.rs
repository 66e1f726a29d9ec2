//! Service layer for Postcraft
//!
//! A single [`PostcraftService`] is built at startup and handed to whatever
//! interface sits on top (CLI, HTTP handler, MCP bridge). It owns the shared
//! pieces and exposes specialized sub-services:
//!
//! - `DraftStore`: owner-scoped draft CRUD with a current-draft pointer
//! - `PreviewIssuer`: signed, expiring preview links
//! - `PreviewRenderer`: HTML preview pages
//! - `PublishService`: publishing the current draft through a client
//!
//! # Example
//!
//! ```no_run
//! use libpostcraft::composition::PostBuilder;
//! use libpostcraft::context::RequestContext;
//! use libpostcraft::service::PostcraftService;
//! use libpostcraft::types::PostType;
//! use libpostcraft::Config;
//!
//! # async fn example() -> libpostcraft::Result<()> {
//! let service = PostcraftService::from_config(Config::load()?).await?;
//! let ctx = RequestContext::for_owner("alice")?;
//!
//! let draft = service
//!     .drafts()
//!     .create_draft(&ctx, "Launch day", PostType::Text, Some("storyteller"))
//!     .await?;
//! let theme = service.themes().get_theme("storyteller")?;
//! let post = PostBuilder::story(
//!     "It started with a bug.",
//!     "Production was down.",
//!     "Three days of bisecting.",
//!     "One missing index.",
//!     "Measure before you guess.",
//!     Some(theme),
//! );
//! service.compose_into_draft(&ctx, &draft.draft_id, &post).await?;
//!
//! let link = service.issue_preview(&ctx, &draft.draft_id, None).await?;
//! println!("Preview at {}", link.url);
//! # Ok(())
//! # }
//! ```

pub mod draft;
pub mod issuer;
pub mod publish;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use maud::Markup;
use tracing::{info, warn};

use self::draft::{DraftStore, FileBackend};
use self::issuer::{PreviewIssuer, PreviewLink, SigningKey};
use self::publish::PublishService;
use crate::clock::{Clock, SystemClock};
use crate::composition::ComposablePost;
use crate::config::{expand_path, Config};
use crate::context::RequestContext;
use crate::error::{ConfigError, PostcraftError, Result};
use crate::platforms::PublishClient;
use crate::preview::{PreviewRenderer, PreviewStats};
use crate::themes::ThemeManager;
use crate::types::Draft;

/// Run `fut`, failing with `PostcraftError::Transient` once `limit` elapses
pub(crate) async fn bounded<T, F>(op: &str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation = op, timeout = ?limit, "Operation timed out");
            Err(PostcraftError::Transient(format!(
                "{} timed out after {:?}",
                op, limit
            )))
        }
    }
}

/// Main service facade
///
/// All sub-services share the same `Arc<DraftStore>`, so drafts created
/// through [`drafts`](Self::drafts) are visible to preview and publish.
pub struct PostcraftService {
    config: Arc<Config>,
    themes: Arc<ThemeManager>,
    drafts: Arc<DraftStore>,
    previews: PreviewIssuer,
    renderer: PreviewRenderer,
    publishing: Option<PublishService>,
}

impl PostcraftService {
    /// Build the service from configuration using the system clock
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation or the preview
    /// secret file cannot be read.
    pub async fn from_config(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Build the service with an explicit clock
    ///
    /// # Errors
    ///
    /// Same as [`from_config`](Self::from_config).
    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let io_timeout = config.io_timeout()?;
        let ttl = chrono::Duration::from_std(config.preview_ttl()?).map_err(|e| {
            ConfigError::InvalidValue {
                field: "preview.default_ttl".to_string(),
                message: e.to_string(),
            }
        })?;

        let themes = Arc::new(ThemeManager::new());
        if let Some(theme) = &config.defaults.theme {
            themes.get_theme(theme)?;
        }

        let mut store = DraftStore::new(Arc::clone(&themes), Arc::clone(&clock));
        if let Some(path) = config.storage_path() {
            info!(path = %path.display(), "Using file-backed draft storage");
            store = store.with_backend(Arc::new(FileBackend::new(path)), io_timeout);
        }
        let drafts = Arc::new(store);

        let secret_file = config.preview.secret_file.as_deref().map(expand_path);
        let key = SigningKey::load(secret_file.as_deref())?;
        let previews = PreviewIssuer::new(Arc::clone(&drafts), clock, key, ttl)
            .with_base_url(&config.preview.base_url)?;

        Ok(Self {
            config: Arc::new(config),
            themes,
            drafts,
            previews,
            renderer: PreviewRenderer::new(io_timeout),
            publishing: None,
        })
    }

    /// Attach the client used by [`publishing`](Self::publishing)
    pub fn with_publisher(mut self, client: Arc<dyn PublishClient>) -> Self {
        info!(platform = client.name(), "Publisher attached");
        self.publishing = Some(PublishService::new(Arc::clone(&self.drafts), client));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn themes(&self) -> &ThemeManager {
        &self.themes
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn previews(&self) -> &PreviewIssuer {
        &self.previews
    }

    pub fn renderer(&self) -> &PreviewRenderer {
        &self.renderer
    }

    /// The publish service, if a publisher was attached
    pub fn publishing(&self) -> Option<&PublishService> {
        self.publishing.as_ref()
    }

    /// Context for the configured default owner
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::InvalidInput` if `defaults.owner` is not a
    /// valid owner id.
    pub fn default_context(&self) -> Result<RequestContext> {
        RequestContext::for_owner(&self.config.defaults.owner)
    }

    /// Validate, compose and store a post as the draft's content
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::Validation` if any component is invalid and
    /// `PostcraftError::NotFound` if the caller has no such draft.
    pub async fn compose_into_draft(
        &self,
        ctx: &RequestContext,
        draft_id: &str,
        post: &ComposablePost,
    ) -> Result<Draft> {
        let content = post.to_draft_content()?;
        self.drafts
            .store_composition(ctx, draft_id, content, post.theme().map(|t| t.key))
            .await
    }

    /// Issue a preview link under the configured base URL
    ///
    /// # Errors
    ///
    /// See [`PreviewIssuer::generate_preview_url`].
    pub async fn issue_preview(
        &self,
        ctx: &RequestContext,
        draft_id: &str,
        expires_in: Option<chrono::Duration>,
    ) -> Result<PreviewLink> {
        self.previews
            .generate_preview_url(ctx, draft_id, &self.config.preview.base_url, expires_in)
            .await
    }

    /// Resolve a preview token and render the live draft
    ///
    /// # Errors
    ///
    /// See [`PreviewIssuer::resolve`].
    pub async fn render_preview(&self, token: &str) -> Result<Markup> {
        let draft = self.previews.resolve(token).await?;
        let stats = PreviewStats::for_draft(&draft);
        Ok(self.renderer.render_html(&draft, &stats))
    }

    /// Render one of the caller's drafts to `<output_dir>/<draft_id>.html`
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::NotFound` if the caller has no such draft,
    /// `PostcraftError::Storage` on write failure and
    /// `PostcraftError::Transient` if the write times out.
    pub async fn save_preview(&self, ctx: &RequestContext, draft_id: &str) -> Result<PathBuf> {
        let draft = self.drafts.get_draft(ctx, draft_id).await?;
        let stats = PreviewStats::for_draft(&draft);
        let path = self
            .config
            .output_dir()
            .join(format!("{}.html", draft.draft_id));
        self.renderer
            .save(self.renderer.render_html(&draft, &stats), &path)
            .await
    }
}
