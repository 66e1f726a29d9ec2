//! Draft store
//!
//! Owner-scoped CRUD over drafts plus a per-owner "current draft" pointer.
//!
//! # Locking
//!
//! Each owner has one record behind an async `RwLock`, and every draft inside
//! it sits behind its own async `Mutex`. Content updates take the record's
//! read lock and the draft's mutex, so updates to different drafts of the same
//! owner run concurrently while two updates to one draft are serialized.
//! Create, delete, switch and clear take the record's write lock.
//!
//! Drafts live in memory. With a [`DraftBackend`] attached every mutation is
//! persisted before it becomes visible, and an owner's drafts are loaded
//! lazily on first access. The owner map is only locked long enough to find
//! or insert the owner's slot; the load itself runs on the slot, so a slow
//! load stalls that owner alone.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::bounded;
use crate::clock::Clock;
use crate::context::{OwnerId, RequestContext};
use crate::error::{PostcraftError, Result, StorageError};
use crate::preview::PreviewStats;
use crate::themes::ThemeManager;
use crate::types::{new_draft_id, Draft, DraftContent, DraftSummary, PostType};

/// Default bound on a single backend operation
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable storage for drafts
///
/// Calls are bounded by a timeout and dropped when it elapses. `save` and
/// `remove` must therefore commit in a single step that is either reached
/// inside a poll or not at all: a dropped call leaves the stored draft as it
/// was, and a timed-out mutation is never visible after a reload.
#[async_trait]
pub trait DraftBackend: Send + Sync {
    /// All stored drafts of one owner, in any order
    async fn load_owner(&self, owner: &OwnerId) -> Result<Vec<Draft>>;

    /// Insert or overwrite one draft
    async fn save(&self, owner: &OwnerId, draft: &Draft) -> Result<()>;

    /// Remove one draft; removing a missing draft is not an error
    async fn remove(&self, owner: &OwnerId, draft_id: &str) -> Result<()>;
}

/// One pretty-printed JSON file per draft at `<root>/<owner>/<draft_id>.json`
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn owner_dir(&self, owner: &OwnerId) -> PathBuf {
        self.root.join(owner.as_str())
    }

    fn draft_path(&self, owner: &OwnerId, draft_id: &str) -> PathBuf {
        self.owner_dir(owner).join(format!("{}.json", draft_id))
    }
}

#[async_trait]
impl DraftBackend for FileBackend {
    async fn load_owner(&self, owner: &OwnerId) -> Result<Vec<Draft>> {
        let dir = self.owner_dir(owner);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e).into()),
        };

        let mut drafts = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(StorageError::Io)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await.map_err(StorageError::Io)?;
            match serde_json::from_slice::<Draft>(&bytes) {
                Ok(draft) => drafts.push(draft),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping corrupt draft file"),
            }
        }
        Ok(drafts)
    }

    async fn save(&self, owner: &OwnerId, draft: &Draft) -> Result<()> {
        let dir = self.owner_dir(owner);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(StorageError::Io)?;

        let json = serde_json::to_vec_pretty(draft).map_err(StorageError::Serde)?;
        let path = self.draft_path(owner, &draft.draft_id);
        // Unique per call: a write abandoned on timeout may still be running
        let tmp = dir.join(format!("{}.{}.tmp", draft.draft_id, Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, json).await.map_err(StorageError::Io)?;

        // Commit point, run inline so it cannot outlive a dropped future
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::Io(e).into());
        }
        Ok(())
    }

    async fn remove(&self, owner: &OwnerId, draft_id: &str) -> Result<()> {
        match std::fs::remove_file(self.draft_path(owner, draft_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }
}

#[derive(Default)]
struct OwnerRecord {
    drafts: HashMap<String, Arc<Mutex<Draft>>>,
    /// Draft ids in creation order
    order: Vec<String>,
    current: Option<String>,
}

impl OwnerRecord {
    fn from_drafts(mut drafts: Vec<Draft>) -> Self {
        drafts.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.draft_id.cmp(&b.draft_id))
        });
        let mut record = Self::default();
        for draft in drafts {
            record.current = Some(draft.draft_id.clone());
            record.insert(draft);
        }
        record
    }

    fn insert(&mut self, draft: Draft) {
        self.order.push(draft.draft_id.clone());
        self.drafts
            .insert(draft.draft_id.clone(), Arc::new(Mutex::new(draft)));
    }

    /// Drop a draft and the pointer to it
    fn remove(&mut self, draft_id: &str) {
        self.drafts.remove(draft_id);
        self.order.retain(|id| id != draft_id);
        if self.current.as_deref() == Some(draft_id) {
            self.current = None;
        }
    }

    fn get(&self, draft_id: &str) -> Result<Arc<Mutex<Draft>>> {
        self.drafts
            .get(draft_id)
            .cloned()
            .ok_or_else(|| PostcraftError::NotFound(format!("draft {}", draft_id)))
    }
}

type SharedRecord = Arc<RwLock<OwnerRecord>>;

/// Set once the owner's drafts are loaded
type RecordSlot = Arc<OnceCell<SharedRecord>>;

/// Owner-scoped draft storage with a current-draft pointer
pub struct DraftStore {
    owners: RwLock<HashMap<OwnerId, RecordSlot>>,
    themes: Arc<ThemeManager>,
    clock: Arc<dyn Clock>,
    backend: Option<Arc<dyn DraftBackend>>,
    io_timeout: Duration,
}

impl DraftStore {
    /// Create an in-memory store
    pub fn new(themes: Arc<ThemeManager>, clock: Arc<dyn Clock>) -> Self {
        Self {
            owners: RwLock::new(HashMap::new()),
            themes,
            clock,
            backend: None,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Persist every mutation through `backend`, bounding each call by `io_timeout`
    pub fn with_backend(mut self, backend: Arc<dyn DraftBackend>, io_timeout: Duration) -> Self {
        self.backend = Some(backend);
        self.io_timeout = io_timeout;
        self
    }

    async fn record(&self, owner: &OwnerId) -> Result<SharedRecord> {
        let existing = self.owners.read().await.get(owner).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let mut owners = self.owners.write().await;
                Arc::clone(owners.entry(owner.clone()).or_default())
            }
        };

        // A failed load leaves the slot empty for the next caller to retry
        let record = slot.get_or_try_init(|| self.load_record(owner)).await?;
        Ok(Arc::clone(record))
    }

    async fn load_record(&self, owner: &OwnerId) -> Result<SharedRecord> {
        let record = match &self.backend {
            Some(backend) => {
                let drafts =
                    bounded("load drafts", self.io_timeout, backend.load_owner(owner)).await?;
                debug!(owner = %owner, count = drafts.len(), "Loaded drafts");
                OwnerRecord::from_drafts(drafts)
            }
            None => OwnerRecord::default(),
        };
        Ok(Arc::new(RwLock::new(record)))
    }

    async fn persist(&self, owner: &OwnerId, draft: &Draft) -> Result<()> {
        match &self.backend {
            Some(backend) => {
                bounded("save draft", self.io_timeout, backend.save(owner, draft)).await
            }
            None => Ok(()),
        }
    }

    async fn unpersist(&self, owner: &OwnerId, draft_id: &str) -> Result<()> {
        match &self.backend {
            Some(backend) => {
                bounded("remove draft", self.io_timeout, backend.remove(owner, draft_id)).await
            }
            None => Ok(()),
        }
    }

    fn check_theme(&self, theme: Option<&str>) -> Result<()> {
        if let Some(name) = theme {
            self.themes.get_theme(name)?;
        }
        Ok(())
    }

    /// Create a draft and make it the owner's current draft
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::InvalidInput` for a blank name and
    /// `PostcraftError::UnknownTheme` for a theme outside the catalog.
    pub async fn create_draft(
        &self,
        ctx: &RequestContext,
        name: &str,
        post_type: PostType,
        theme: Option<&str>,
    ) -> Result<Draft> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PostcraftError::InvalidInput(
                "Draft name cannot be empty".to_string(),
            ));
        }
        self.check_theme(theme)?;

        let draft = Draft::new(
            name.to_string(),
            post_type,
            theme.map(str::to_string),
            self.clock.now(),
        );

        let record = self.record(&ctx.owner).await?;
        let mut record = record.write().await;
        self.persist(&ctx.owner, &draft).await?;
        record.insert(draft.clone());
        record.current = Some(draft.draft_id.clone());

        info!(owner = %ctx.owner, draft_id = %draft.draft_id, post_type = %post_type, "Created draft");
        Ok(draft)
    }

    /// Apply `change` to one draft under its lock and persist the result
    async fn mutate<F>(&self, ctx: &RequestContext, draft_id: &str, change: F) -> Result<Draft>
    where
        F: FnOnce(&mut Draft) + Send,
    {
        let record = self.record(&ctx.owner).await?;
        let record = record.read().await;
        let slot = record.get(draft_id)?;
        let mut draft = slot.lock().await;

        let mut updated = draft.clone();
        change(&mut updated);
        updated.updated_at = self.clock.now().max(draft.updated_at);

        self.persist(&ctx.owner, &updated).await?;
        *draft = updated.clone();
        Ok(updated)
    }

    /// Merge top-level keys of `content` into the draft's content
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::NotFound` if the owner has no such draft.
    pub async fn update_draft(
        &self,
        ctx: &RequestContext,
        draft_id: &str,
        content: DraftContent,
    ) -> Result<Draft> {
        let keys = content.len();
        let draft = self
            .mutate(ctx, draft_id, move |draft| draft.content.extend(content))
            .await?;
        debug!(owner = %ctx.owner, draft_id, keys, "Updated draft");
        Ok(draft)
    }

    /// Replace the draft's content wholesale
    pub async fn replace_content(
        &self,
        ctx: &RequestContext,
        draft_id: &str,
        content: DraftContent,
    ) -> Result<Draft> {
        self.mutate(ctx, draft_id, move |draft| draft.content = content)
            .await
    }

    /// Merge composed content and, when given, switch the theme in one update
    ///
    /// Readers see either the old draft or both changes, never one without
    /// the other.
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::UnknownTheme` for a theme outside the catalog
    /// and `PostcraftError::NotFound` if the owner has no such draft. Nothing
    /// is stored on error.
    pub async fn store_composition(
        &self,
        ctx: &RequestContext,
        draft_id: &str,
        content: DraftContent,
        theme: Option<&str>,
    ) -> Result<Draft> {
        self.check_theme(theme)?;
        let theme = theme.map(str::to_string);
        let draft = self
            .mutate(ctx, draft_id, move |draft| {
                draft.content.extend(content);
                if theme.is_some() {
                    draft.theme = theme;
                }
            })
            .await?;
        debug!(owner = %ctx.owner, draft_id, theme = ?draft.theme, "Stored composition");
        Ok(draft)
    }

    /// Change or clear the draft's theme
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::UnknownTheme` for a theme outside the catalog.
    pub async fn set_theme(
        &self,
        ctx: &RequestContext,
        draft_id: &str,
        theme: Option<&str>,
    ) -> Result<Draft> {
        self.check_theme(theme)?;
        let theme = theme.map(str::to_string);
        self.mutate(ctx, draft_id, move |draft| draft.theme = theme)
            .await
    }

    /// Look up a draft of `owner` without a full request context
    pub async fn find(&self, owner: &OwnerId, draft_id: &str) -> Result<Draft> {
        let record = self.record(owner).await?;
        let record = record.read().await;
        let slot = record.get(draft_id)?;
        let draft = slot.lock().await.clone();
        Ok(draft)
    }

    /// # Errors
    ///
    /// Returns `PostcraftError::NotFound` if the owner has no such draft.
    pub async fn get_draft(&self, ctx: &RequestContext, draft_id: &str) -> Result<Draft> {
        self.find(&ctx.owner, draft_id).await
    }

    pub async fn get_current_draft(&self, ctx: &RequestContext) -> Result<Option<Draft>> {
        let record = self.record(&ctx.owner).await?;
        let record = record.read().await;
        match &record.current {
            Some(id) => {
                let slot = record.get(id)?;
                let draft = slot.lock().await.clone();
                Ok(Some(draft))
            }
            None => Ok(None),
        }
    }

    /// All drafts of the owner in creation order
    pub async fn list_drafts(&self, ctx: &RequestContext) -> Result<Vec<DraftSummary>> {
        let record = self.record(&ctx.owner).await?;
        let record = record.read().await;
        let mut summaries = Vec::with_capacity(record.order.len());
        for id in &record.order {
            let slot = record.get(id)?;
            let draft = slot.lock().await;
            summaries.push(draft.summary(record.current.as_deref() == Some(id.as_str())));
        }
        Ok(summaries)
    }

    /// Point the owner's current draft at `draft_id`
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::NotFound` if the owner has no such draft; the
    /// pointer is left unchanged.
    pub async fn switch_draft(&self, ctx: &RequestContext, draft_id: &str) -> Result<Draft> {
        let record = self.record(&ctx.owner).await?;
        let mut record = record.write().await;
        let slot = record.get(draft_id)?;
        let draft = slot.lock().await.clone();
        record.current = Some(draft_id.to_string());
        debug!(owner = %ctx.owner, draft_id, "Switched current draft");
        Ok(draft)
    }

    /// Remove a draft; clears the pointer if it named this draft
    ///
    /// Waits for any in-flight update of the same draft to finish first.
    pub async fn delete_draft(&self, ctx: &RequestContext, draft_id: &str) -> Result<()> {
        let record = self.record(&ctx.owner).await?;
        let mut record = record.write().await;
        let slot = record.get(draft_id)?;
        let _guard = slot.lock().await;

        self.unpersist(&ctx.owner, draft_id).await?;
        record.remove(draft_id);

        info!(owner = %ctx.owner, draft_id, "Deleted draft");
        Ok(())
    }

    /// Remove every draft of the owner, returning how many were removed
    ///
    /// # Errors
    ///
    /// Stops at the first backend failure. Drafts removed before it stay
    /// removed, and the current pointer is cleared if it named one of them.
    pub async fn clear_all(&self, ctx: &RequestContext) -> Result<usize> {
        let record = self.record(&ctx.owner).await?;
        let mut record = record.write().await;

        let ids = record.order.clone();
        for id in &ids {
            if let Err(e) = self.unpersist(&ctx.owner, id).await {
                warn!(owner = %ctx.owner, draft_id = %id, error = %e, "Clear stopped early");
                return Err(e);
            }
            record.remove(id);
        }
        record.current = None;

        info!(owner = %ctx.owner, count = ids.len(), "Cleared drafts");
        Ok(ids.len())
    }

    /// Pretty JSON of one draft
    pub async fn export_draft(&self, ctx: &RequestContext, draft_id: &str) -> Result<String> {
        let draft = self.get_draft(ctx, draft_id).await?;
        serde_json::to_string_pretty(&draft)
            .map_err(|e| StorageError::Serde(e).into())
    }

    /// Store a previously exported draft under the caller's owner
    ///
    /// The draft always gets a fresh id. Importing does not move the
    /// current-draft pointer.
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::InvalidInput` for malformed JSON or a blank
    /// name and `PostcraftError::UnknownTheme` for a theme outside the catalog.
    pub async fn import_draft(&self, ctx: &RequestContext, json: &str) -> Result<Draft> {
        let mut draft: Draft = serde_json::from_str(json)
            .map_err(|e| PostcraftError::InvalidInput(format!("Invalid draft JSON: {}", e)))?;
        if draft.name.trim().is_empty() {
            return Err(PostcraftError::InvalidInput(
                "Draft name cannot be empty".to_string(),
            ));
        }
        self.check_theme(draft.theme.as_deref())?;

        draft.draft_id = new_draft_id();

        let record = self.record(&ctx.owner).await?;
        let mut record = record.write().await;
        self.persist(&ctx.owner, &draft).await?;
        record.insert(draft.clone());

        info!(owner = %ctx.owner, draft_id = %draft.draft_id, "Imported draft");
        Ok(draft)
    }

    /// Length and engagement figures for one draft
    pub async fn draft_stats(&self, ctx: &RequestContext, draft_id: &str) -> Result<PreviewStats> {
        let draft = self.get_draft(ctx, draft_id).await?;
        Ok(PreviewStats::for_draft(&draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::COMPOSED_TEXT_KEY;
    use chrono::Utc;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn ctx(owner: &str) -> RequestContext {
        RequestContext::for_owner(owner).unwrap()
    }

    fn content(value: Value) -> DraftContent {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn setup_store() -> (DraftStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = DraftStore::new(Arc::new(ThemeManager::new()), clock.clone());
        (store, clock)
    }

    fn setup_file_store(dir: &TempDir, clock: Arc<ManualClock>) -> DraftStore {
        let backend = Arc::new(FileBackend::new(dir.path()));
        DraftStore::new(Arc::new(ThemeManager::new()), clock)
            .with_backend(backend, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_create_draft() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");

        let draft = store
            .create_draft(&alice, "Launch", PostType::Text, Some("storyteller"))
            .await
            .unwrap();

        assert!(draft.draft_id.starts_with("draft_"));
        assert_eq!(draft.name, "Launch");
        assert!(draft.content.is_empty());
        assert_eq!(draft.created_at, draft.updated_at);

        let current = store.get_current_draft(&alice).await.unwrap().unwrap();
        assert_eq!(current.draft_id, draft.draft_id);
    }

    #[tokio::test]
    async fn test_create_draft_rejects_blank_name() {
        let (store, _clock) = setup_store();
        let result = store.create_draft(&ctx("alice"), "  ", PostType::Text, None).await;
        assert!(matches!(result, Err(PostcraftError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_create_draft_rejects_unknown_theme() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");
        let result = store
            .create_draft(&alice, "Launch", PostType::Text, Some("influencer"))
            .await;
        assert!(matches!(result, Err(PostcraftError::UnknownTheme(_))));
        assert!(store.list_drafts(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_content() {
        let (store, clock) = setup_store();
        let alice = ctx("alice");
        let draft = store
            .create_draft(&alice, "Launch", PostType::Text, None)
            .await
            .unwrap();

        clock.advance(chrono::Duration::seconds(5));
        store
            .update_draft(&alice, &draft.draft_id, content(json!({"a": 1, "b": 2})))
            .await
            .unwrap();
        let updated = store
            .update_draft(&alice, &draft.draft_id, content(json!({"b": 3})))
            .await
            .unwrap();

        assert_eq!(updated.content, content(json!({"a": 1, "b": 3})));
        assert!(updated.updated_at > draft.updated_at);

        let fetched = store.get_draft(&alice, &draft.draft_id).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_updated_at_never_moves_backwards() {
        let (store, clock) = setup_store();
        let alice = ctx("alice");
        let draft = store
            .create_draft(&alice, "Launch", PostType::Text, None)
            .await
            .unwrap();

        clock.advance(chrono::Duration::seconds(-60));
        let updated = store
            .update_draft(&alice, &draft.draft_id, content(json!({"x": true})))
            .await
            .unwrap();
        assert_eq!(updated.updated_at, draft.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_draft() {
        let (store, _clock) = setup_store();
        let result = store
            .update_draft(&ctx("alice"), "draft_missing", DraftContent::new())
            .await;
        assert!(matches!(result, Err(PostcraftError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_drafts_are_owner_scoped() {
        let (store, _clock) = setup_store();
        let draft = store
            .create_draft(&ctx("alice"), "Mine", PostType::Text, None)
            .await
            .unwrap();

        let bob = ctx("bob");
        assert!(matches!(
            store.get_draft(&bob, &draft.draft_id).await,
            Err(PostcraftError::NotFound(_))
        ));
        assert!(store.get_current_draft(&bob).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_is_last_created() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");
        let mut last = None;
        for i in 0..5 {
            let draft = store
                .create_draft(&alice, &format!("Draft {}", i), PostType::Text, None)
                .await
                .unwrap();
            last = Some(draft.draft_id);
        }

        let current = store.get_current_draft(&alice).await.unwrap().unwrap();
        assert_eq!(Some(current.draft_id), last);

        let listed = store.list_drafts(&alice).await.unwrap();
        assert_eq!(listed.len(), 5);
        assert_eq!(listed.iter().filter(|d| d.is_current).count(), 1);
        assert!(listed[4].is_current);
        assert_eq!(listed[0].name, "Draft 0");
    }

    #[tokio::test]
    async fn test_switch_draft() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");
        let first = store
            .create_draft(&alice, "First", PostType::Text, None)
            .await
            .unwrap();
        store
            .create_draft(&alice, "Second", PostType::Text, None)
            .await
            .unwrap();

        store.switch_draft(&alice, &first.draft_id).await.unwrap();
        let current = store.get_current_draft(&alice).await.unwrap().unwrap();
        assert_eq!(current.draft_id, first.draft_id);

        let result = store.switch_draft(&alice, "draft_missing").await;
        assert!(matches!(result, Err(PostcraftError::NotFound(_))));
        let current = store.get_current_draft(&alice).await.unwrap().unwrap();
        assert_eq!(current.draft_id, first.draft_id);
    }

    #[tokio::test]
    async fn test_delete_current_clears_pointer() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");
        let first = store
            .create_draft(&alice, "First", PostType::Text, None)
            .await
            .unwrap();
        let second = store
            .create_draft(&alice, "Second", PostType::Text, None)
            .await
            .unwrap();

        store.delete_draft(&alice, &first.draft_id).await.unwrap();
        let current = store.get_current_draft(&alice).await.unwrap().unwrap();
        assert_eq!(current.draft_id, second.draft_id);

        store.delete_draft(&alice, &second.draft_id).await.unwrap();
        assert!(store.get_current_draft(&alice).await.unwrap().is_none());
        assert!(matches!(
            store.delete_draft(&alice, &second.draft_id).await,
            Err(PostcraftError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");
        for name in ["a", "b", "c"] {
            store
                .create_draft(&alice, name, PostType::Text, None)
                .await
                .unwrap();
        }
        assert_eq!(store.clear_all(&alice).await.unwrap(), 3);
        assert!(store.list_drafts(&alice).await.unwrap().is_empty());
        assert!(store.get_current_draft(&alice).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_theme() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");
        let draft = store
            .create_draft(&alice, "Launch", PostType::Text, None)
            .await
            .unwrap();

        let updated = store
            .set_theme(&alice, &draft.draft_id, Some("data_driven"))
            .await
            .unwrap();
        assert_eq!(updated.theme.as_deref(), Some("data_driven"));

        let result = store.set_theme(&alice, &draft.draft_id, Some("nope")).await;
        assert!(matches!(result, Err(PostcraftError::UnknownTheme(_))));
    }

    #[tokio::test]
    async fn test_export_then_import_gets_fresh_id() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");
        let draft = store
            .create_draft(&alice, "Launch", PostType::Text, None)
            .await
            .unwrap();
        store
            .update_draft(&alice, &draft.draft_id, content(json!({COMPOSED_TEXT_KEY: "Hi"})))
            .await
            .unwrap();

        let exported = store.export_draft(&alice, &draft.draft_id).await.unwrap();
        let imported = store.import_draft(&alice, &exported).await.unwrap();

        assert_ne!(imported.draft_id, draft.draft_id);
        assert_eq!(imported.composed_text(), Some("Hi"));
        assert_eq!(store.list_drafts(&alice).await.unwrap().len(), 2);
        let current = store.get_current_draft(&alice).await.unwrap().unwrap();
        assert_eq!(current.draft_id, draft.draft_id);
    }

    #[tokio::test]
    async fn test_import_rejects_garbage() {
        let (store, _clock) = setup_store();
        let result = store.import_draft(&ctx("alice"), "{not json").await;
        assert!(matches!(result, Err(PostcraftError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_concurrent_updates_to_distinct_drafts() {
        let (store, _clock) = setup_store();
        let store = Arc::new(store);
        let alice = ctx("alice");

        let mut ids = Vec::new();
        for i in 0..8 {
            let draft = store
                .create_draft(&alice, &format!("d{}", i), PostType::Text, None)
                .await
                .unwrap();
            ids.push(draft.draft_id);
        }

        let mut handles = Vec::new();
        for (i, id) in ids.iter().enumerate() {
            for round in 0..10 {
                let store = Arc::clone(&store);
                let alice = alice.clone();
                let id = id.clone();
                handles.push(tokio::spawn(async move {
                    let key = format!("k{}", round);
                    store
                        .update_draft(&alice, &id, content(json!({ key: i })))
                        .await
                        .unwrap();
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for (i, id) in ids.iter().enumerate() {
            let draft = store.get_draft(&alice, id).await.unwrap();
            assert_eq!(draft.content.len(), 10);
            assert!(draft.content.values().all(|v| v == &json!(i)));
        }
    }

    #[tokio::test]
    async fn test_file_backend_persists_across_stores() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::default());
        let alice = ctx("alice");

        let (first, second) = {
            let store = setup_file_store(&dir, clock.clone());
            let first = store
                .create_draft(&alice, "First", PostType::Text, None)
                .await
                .unwrap();
            clock.advance(chrono::Duration::seconds(1));
            let second = store
                .create_draft(&alice, "Second", PostType::Poll, None)
                .await
                .unwrap();
            store
                .update_draft(&alice, &first.draft_id, content(json!({"hook": "Hi"})))
                .await
                .unwrap();
            (first, second)
        };

        assert!(dir
            .path()
            .join("alice")
            .join(format!("{}.json", first.draft_id))
            .exists());

        let reopened = setup_file_store(&dir, clock);
        let listed = reopened.list_drafts(&alice).await.unwrap();
        assert_eq!(listed.len(), 2);
        let fetched = reopened.get_draft(&alice, &first.draft_id).await.unwrap();
        assert_eq!(fetched.content["hook"], "Hi");
        let current = reopened.get_current_draft(&alice).await.unwrap().unwrap();
        assert_eq!(current.draft_id, second.draft_id);
    }

    #[tokio::test]
    async fn test_file_backend_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = setup_file_store(&dir, Arc::new(ManualClock::default()));
        let alice = ctx("alice");
        let draft = store
            .create_draft(&alice, "Temp", PostType::Text, None)
            .await
            .unwrap();
        let path = dir
            .path()
            .join("alice")
            .join(format!("{}.json", draft.draft_id));
        assert!(path.exists());

        store.delete_draft(&alice, &draft.draft_id).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_file_backend_skips_corrupt_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("alice")).unwrap();
        std::fs::write(dir.path().join("alice").join("draft_bad.json"), "{oops").unwrap();

        let store = setup_file_store(&dir, Arc::new(ManualClock::default()));
        assert!(store.list_drafts(&ctx("alice")).await.unwrap().is_empty());
    }

    struct StalledBackend;

    #[async_trait]
    impl DraftBackend for StalledBackend {
        async fn load_owner(&self, _owner: &OwnerId) -> Result<Vec<Draft>> {
            Ok(Vec::new())
        }

        async fn save(&self, _owner: &OwnerId, _draft: &Draft) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }

        async fn remove(&self, _owner: &OwnerId, _draft_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stalled_backend_is_transient() {
        let store = DraftStore::new(Arc::new(ThemeManager::new()), Arc::new(ManualClock::default()))
            .with_backend(Arc::new(StalledBackend), Duration::from_millis(20));
        let alice = ctx("alice");

        let result = store
            .create_draft(&alice, "Slow", PostType::Text, None)
            .await;
        match result {
            Err(e) => assert!(e.is_retryable()),
            Ok(_) => panic!("Expected Transient error"),
        }
        assert!(store.list_drafts(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_replaces_of_one_draft_serialize() {
        let (store, clock) = setup_store();
        let store = Arc::new(store);
        let alice = ctx("alice");
        let draft = store
            .create_draft(&alice, "Contended", PostType::Text, None)
            .await
            .unwrap();

        let payload =
            |i: usize| content(json!({"writer": i, "body": format!("p{}", i), "check": i}));

        let reader = {
            let store = Arc::clone(&store);
            let alice = alice.clone();
            let id = draft.draft_id.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let seen = store.get_draft(&alice, &id).await.unwrap();
                    if let Some(writer) = seen.content.get("writer").and_then(Value::as_u64) {
                        assert_eq!(seen.content, payload(writer as usize));
                    } else {
                        assert!(seen.content.is_empty());
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            let clock = clock.clone();
            let alice = alice.clone();
            let id = draft.draft_id.clone();
            handles.push(tokio::spawn(async move {
                clock.advance(chrono::Duration::seconds(1));
                store.replace_content(&alice, &id, payload(i)).await.unwrap()
            }));
        }
        let mut written = Vec::new();
        for handle in handles {
            written.push(handle.await.unwrap());
        }
        reader.await.unwrap();

        let last = store.get_draft(&alice, &draft.draft_id).await.unwrap();
        let writer = last.content["writer"].as_u64().unwrap() as usize;
        assert_eq!(last.content, payload(writer));
        assert!(written.iter().all(|d| d.updated_at <= last.updated_at));

        // The surviving payload is the one that committed last
        let winner = written.iter().find(|d| d.content == last.content).unwrap();
        assert_eq!(winner.updated_at, last.updated_at);
    }

    #[tokio::test]
    async fn test_store_composition_sets_content_and_theme_together() {
        let (store, _clock) = setup_store();
        let alice = ctx("alice");
        let draft = store
            .create_draft(&alice, "Composed", PostType::Text, Some("storyteller"))
            .await
            .unwrap();

        let result = store
            .store_composition(
                &alice,
                &draft.draft_id,
                content(json!({COMPOSED_TEXT_KEY: "Lost"})),
                Some("pirate"),
            )
            .await;
        assert!(matches!(result, Err(PostcraftError::UnknownTheme(_))));
        let unchanged = store.get_draft(&alice, &draft.draft_id).await.unwrap();
        assert_eq!(unchanged, draft);

        let stored = store
            .store_composition(
                &alice,
                &draft.draft_id,
                content(json!({COMPOSED_TEXT_KEY: "Hello"})),
                Some("data_driven"),
            )
            .await
            .unwrap();
        assert_eq!(stored.theme.as_deref(), Some("data_driven"));
        assert_eq!(stored.composed_text(), Some("Hello"));

        let kept = store
            .store_composition(
                &alice,
                &draft.draft_id,
                content(json!({COMPOSED_TEXT_KEY: "Again"})),
                None,
            )
            .await
            .unwrap();
        assert_eq!(kept.theme.as_deref(), Some("data_driven"));
        assert_eq!(kept.composed_text(), Some("Again"));
    }

    /// Fails the second `remove` it sees
    #[derive(Default)]
    struct FlakyRemoveBackend {
        removes: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl DraftBackend for FlakyRemoveBackend {
        async fn load_owner(&self, _owner: &OwnerId) -> Result<Vec<Draft>> {
            Ok(Vec::new())
        }

        async fn save(&self, _owner: &OwnerId, _draft: &Draft) -> Result<()> {
            Ok(())
        }

        async fn remove(&self, _owner: &OwnerId, _draft_id: &str) -> Result<()> {
            let n = self
                .removes
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n == 1 {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk gone",
                ))
                .into());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_clear_all_failure_keeps_pointer_valid() {
        let store = DraftStore::new(Arc::new(ThemeManager::new()), Arc::new(ManualClock::default()))
            .with_backend(Arc::new(FlakyRemoveBackend::default()), Duration::from_secs(5));
        let alice = ctx("alice");
        let first = store
            .create_draft(&alice, "First", PostType::Text, None)
            .await
            .unwrap();
        let second = store
            .create_draft(&alice, "Second", PostType::Text, None)
            .await
            .unwrap();
        store.switch_draft(&alice, &first.draft_id).await.unwrap();

        assert!(store.clear_all(&alice).await.is_err());

        let listed = store.list_drafts(&alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].draft_id, second.draft_id);
        assert!(store.get_current_draft(&alice).await.unwrap().is_none());

        store.switch_draft(&alice, &second.draft_id).await.unwrap();
        assert_eq!(store.clear_all(&alice).await.unwrap(), 1);
        assert!(store.list_drafts(&alice).await.unwrap().is_empty());
    }

    /// Loading owner "slow" takes a second
    struct SlowLoadBackend;

    #[async_trait]
    impl DraftBackend for SlowLoadBackend {
        async fn load_owner(&self, owner: &OwnerId) -> Result<Vec<Draft>> {
            if owner.as_str() == "slow" {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Ok(Vec::new())
        }

        async fn save(&self, _owner: &OwnerId, _draft: &Draft) -> Result<()> {
            Ok(())
        }

        async fn remove(&self, _owner: &OwnerId, _draft_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_owner_load_does_not_block_other_owners() {
        let store = Arc::new(
            DraftStore::new(Arc::new(ThemeManager::new()), Arc::new(ManualClock::default()))
                .with_backend(Arc::new(SlowLoadBackend), Duration::from_secs(5)),
        );
        let bob = ctx("bob");
        store
            .create_draft(&bob, "Ready", PostType::Text, None)
            .await
            .unwrap();

        let loading = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.list_drafts(&ctx("slow")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let listed = tokio::time::timeout(Duration::from_millis(500), store.list_drafts(&bob))
            .await
            .expect("bob should not wait for another owner's load")
            .unwrap();
        assert_eq!(listed.len(), 1);

        let newcomer = tokio::time::timeout(
            Duration::from_millis(500),
            store.list_drafts(&ctx("carol")),
        )
        .await
        .expect("a fresh owner should not wait either")
        .unwrap();
        assert!(newcomer.is_empty());

        assert!(loading.await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_backend_save_is_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path());
        let owner = OwnerId::new("alice").unwrap();
        let mut committed = Draft::new("v0".to_string(), PostType::Text, None, Utc::now());
        backend.save(&owner, &committed).await.unwrap();
        let path = dir
            .path()
            .join("alice")
            .join(format!("{}.json", committed.draft_id));

        for step in 1..40u64 {
            let mut next = committed.clone();
            next.name = format!("v{}", step);
            let result =
                tokio::time::timeout(Duration::from_micros(step * 50), backend.save(&owner, &next))
                    .await;
            // Let abandoned blocking writes finish
            tokio::time::sleep(Duration::from_millis(20)).await;

            let on_disk: Draft = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
            match result {
                Ok(saved) => {
                    saved.unwrap();
                    assert_eq!(on_disk, next);
                    committed = next;
                }
                Err(_) => assert_eq!(on_disk, committed, "timed-out save landed at step {}", step),
            }
        }

        let store = setup_file_store(&dir, Arc::new(ManualClock::default()));
        let reloaded = store.list_drafts(&ctx("alice")).await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].name, committed.name);
    }
}
