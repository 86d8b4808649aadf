//! Note lifecycle orchestration.
//!
//! [`NoteService`] is the single entry point tying the store, the summary
//! cache, and the summarization backend together. The store owns all
//! lifecycle state; the cache is advisory; the backend is only consulted
//! on an explicit summarize request, never as a side effect of a read.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use jot_core::{
    defaults::{READ_RETRY_ATTEMPTS, READ_RETRY_BACKOFF_MS, TRASH_RETENTION_DAYS},
    fingerprint, CreateNoteRequest, Error, Language, ListNotesRequest, Note, NoteStore,
    NoteVersion, NoteWithSummary, Result, Summary, SummaryBackend, SummaryCache,
    UpdateNoteRequest,
};

/// Orchestrates note lifecycle operations.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    cache: Arc<dyn SummaryCache>,
    backend: Arc<dyn SummaryBackend>,
}

impl NoteService {
    pub fn new(
        store: Arc<dyn NoteStore>,
        cache: Arc<dyn SummaryCache>,
        backend: Arc<dyn SummaryBackend>,
    ) -> Self {
        Self {
            store,
            cache,
            backend,
        }
    }

    /// Access the underlying store (for the sweeper and admin tooling).
    pub fn store(&self) -> Arc<dyn NoteStore> {
        self.store.clone()
    }

    /// Create a note for `owner`, subject to the active-note quota.
    pub async fn create(&self, owner: &str, req: CreateNoteRequest) -> Result<Note> {
        if req.title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".to_string()));
        }

        let note = self.store.insert(owner, req).await?;
        info!(
            subsystem = "engine",
            component = "service",
            op = "create",
            note_id = %note.id,
            "Note created"
        );
        Ok(note)
    }

    /// Run a read against the store, retrying transient I/O failures a
    /// bounded number of times. Mutations never come through here: a
    /// retried mutation could double-apply version snapshots.
    async fn with_read_retry<T, F, Fut>(&self, op: &'static str, read: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match read().await {
                Err(e) if e.is_retryable() && attempt < READ_RETRY_ATTEMPTS => {
                    attempt += 1;
                    warn!(
                        subsystem = "engine",
                        component = "service",
                        op = op,
                        attempt,
                        "Retrying read after transient store error: {}",
                        e
                    );
                    sleep(Duration::from_millis(READ_RETRY_BACKOFF_MS * attempt as u64)).await;
                }
                other => return other,
            }
        }
    }

    /// Fetch an active note. Transient store failures are retried a
    /// bounded number of times; domain errors are returned immediately.
    pub async fn fetch(&self, owner: &str, id: Uuid) -> Result<Note> {
        self.with_read_retry("fetch", || self.store.fetch(owner, id, false))
            .await
    }

    /// Fetch a note from any state, including the trash.
    pub async fn fetch_any(&self, owner: &str, id: Uuid) -> Result<Note> {
        self.with_read_retry("fetch_any", || self.store.fetch(owner, id, true))
            .await
    }

    /// List an owner's notes, most recently updated first.
    pub async fn list(&self, owner: &str, req: ListNotesRequest) -> Result<Vec<Note>> {
        self.with_read_retry("list", || self.store.list(owner, req.clone()))
            .await
    }

    /// Edit a note, snapshotting its pre-edit state into the version
    /// history.
    pub async fn update(&self, owner: &str, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        if let Some(title) = &req.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("title must not be empty".to_string()));
            }
        }
        self.store.update(owner, id, req).await
    }

    /// Delete a note: `permanent = false` moves it to the trash
    /// (idempotent, returns the trashed note); `permanent = true` purges
    /// it immediately from any state (returns `None`).
    pub async fn delete(&self, owner: &str, id: Uuid, permanent: bool) -> Result<Option<Note>> {
        if permanent {
            self.store.hard_delete(owner, id).await?;
            info!(
                subsystem = "engine",
                component = "service",
                op = "delete",
                note_id = %id,
                permanent = true,
                "Note permanently deleted"
            );
            return Ok(None);
        }

        let note = self.store.soft_delete(owner, id).await?;
        info!(
            subsystem = "engine",
            component = "service",
            op = "delete",
            note_id = %id,
            permanent = false,
            "Note moved to trash"
        );
        Ok(Some(note))
    }

    /// Restore a trashed note, subject to the quota (idempotent for
    /// active notes).
    pub async fn restore(&self, owner: &str, id: Uuid) -> Result<Note> {
        let note = self.store.restore(owner, id).await?;
        info!(
            subsystem = "engine",
            component = "service",
            op = "restore",
            note_id = %id,
            "Note restored"
        );
        Ok(note)
    }

    /// A note's version history, newest-first.
    pub async fn versions(&self, owner: &str, id: Uuid) -> Result<Vec<NoteVersion>> {
        self.with_read_retry("versions", || self.store.list_versions(owner, id))
            .await
    }

    /// Count the owner's active notes.
    pub async fn count_active(&self, owner: &str) -> Result<i64> {
        self.with_read_retry("count_active", || self.store.count_active(owner))
            .await
    }

    /// Fetch a note together with its cached summary, if one exists for
    /// the note's current content in `language`.
    ///
    /// This never generates a summary: a cache miss simply yields
    /// `summary: None`.
    pub async fn fetch_with_summary(
        &self,
        owner: &str,
        id: Uuid,
        language: Language,
    ) -> Result<NoteWithSummary> {
        let note = self.fetch(owner, id).await?;
        let summary = self.cache.get(note.id, &note.content, language).await;
        debug!(
            subsystem = "engine",
            component = "service",
            op = "fetch_with_summary",
            note_id = %id,
            language = %language,
            cache_hit = summary.is_some(),
            "Fetched note with summary probe"
        );
        Ok(NoteWithSummary { note, summary })
    }

    /// Generate (or serve from cache) a summary of the note in `language`.
    ///
    /// Failures are returned to the caller and never cached, so the next
    /// request retries the backend.
    pub async fn summarize(&self, owner: &str, id: Uuid, language: Language) -> Result<Summary> {
        let note = self.fetch(owner, id).await?;

        if let Some(cached) = self.cache.get(note.id, &note.content, language).await {
            debug!(
                subsystem = "engine",
                component = "service",
                op = "summarize",
                note_id = %id,
                language = %language,
                cache_hit = true,
                "Summary served from cache"
            );
            return Ok(cached);
        }

        let start = Instant::now();
        let text = self
            .backend
            .summarize(&note.title, &note.content, language)
            .await?;

        let summary = Summary {
            note_id: note.id,
            title: note.title.clone(),
            language,
            fingerprint: fingerprint(&note.content),
            summary: text,
            model: self.backend.model_name().to_string(),
            generated_at_utc: Utc::now(),
        };

        self.cache.put(note.id, &note.content, language, &summary).await;
        info!(
            subsystem = "engine",
            component = "service",
            op = "summarize",
            note_id = %id,
            language = %language,
            duration_ms = start.elapsed().as_millis() as u64,
            "Summary generated"
        );
        Ok(summary)
    }

    /// Purge all notes trashed longer ago than the retention window.
    /// Returns the number of notes removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let cutoff = Utc::now() - chrono::Duration::days(TRASH_RETENTION_DAYS);
        self.store.purge_expired(cutoff).await
    }
}
