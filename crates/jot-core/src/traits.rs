//! Boundary traits for the jot note engine.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability: the persistent
//! store, the summary cache, and the AI summarization collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Language, Note, NoteVersion, Summary};

// =============================================================================
// NOTE STORE
// =============================================================================

/// Request for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
}

/// Request for updating a note. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Request for listing an owner's notes.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    /// Include trashed notes in the listing.
    pub include_deleted: bool,
    /// Maximum results (defaults to [`crate::defaults::PAGE_LIMIT`]).
    pub limit: Option<i64>,
    /// Pagination offset.
    pub offset: Option<i64>,
}

/// Persistent store for note lifecycle state.
///
/// Every method is an atomic unit against the store. Implementations must
/// serialize quota-checked operations (insert, restore) per owner, and must
/// apply the snapshot-and-trim of an update atomically relative to
/// concurrent edits of the same note. All operations are owner-scoped: a
/// note belonging to a different owner is indistinguishable from a missing
/// note.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a new note, enforcing the active-note quota in the same
    /// logical unit as the insert. Fails `QuotaExceeded` with no partial
    /// write when the owner is at the cap.
    async fn insert(&self, owner: &str, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by ID. Fails `NoteNotFound` when absent, owned by
    /// someone else, or trashed while `include_deleted` is false.
    async fn fetch(&self, owner: &str, id: Uuid, include_deleted: bool) -> Result<Note>;

    /// List an owner's notes, most recently updated first.
    async fn list(&self, owner: &str, req: ListNotesRequest) -> Result<Vec<Note>>;

    /// Apply an edit: snapshot the pre-edit state into the version history
    /// (evicting the oldest entry beyond the cap), apply the new fields,
    /// and bump `updated_at_utc` — all atomically. Editing a trashed note
    /// fails `InvalidState`.
    async fn update(&self, owner: &str, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Move a note to the trash. Versions are untouched and
    /// `updated_at_utc` does not advance. Soft-deleting an already-trashed
    /// note is a no-op returning the current state.
    async fn soft_delete(&self, owner: &str, id: Uuid) -> Result<Note>;

    /// Restore a trashed note, re-checking the quota in the same logical
    /// unit; fails `QuotaExceeded` leaving the note trashed. Restoring an
    /// active note is a no-op returning the current state.
    async fn restore(&self, owner: &str, id: Uuid) -> Result<Note>;

    /// Permanently purge a note and its version history from any state.
    /// Fails `NoteNotFound` when the note does not exist.
    async fn hard_delete(&self, owner: &str, id: Uuid) -> Result<()>;

    /// Count the owner's active (non-trashed) notes. Always derived from
    /// the store, never a cached counter.
    async fn count_active(&self, owner: &str) -> Result<i64>;

    /// List a note's version history, newest-first. Works for trashed
    /// notes too.
    async fn list_versions(&self, owner: &str, id: Uuid) -> Result<Vec<NoteVersion>>;

    /// IDs of trashed notes whose `deleted_at` is older than `cutoff`.
    async fn list_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>>;

    /// Permanently purge every note trashed before `cutoff`, across all
    /// owners. Idempotent and order-independent. Returns the purge count.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

// =============================================================================
// SUMMARY CACHE
// =============================================================================

/// Advisory cache for AI-generated summaries.
///
/// Keys are derived from `(note_id, fingerprint(content), language)`, so a
/// content edit implicitly invalidates prior entries — the old keys simply
/// become unreachable. Neither method ever surfaces an error: a backing
/// store failure degrades to a forced miss.
#[async_trait]
pub trait SummaryCache: Send + Sync {
    /// Probe the cache for a summary of this exact content in `language`.
    async fn get(&self, note_id: Uuid, content: &str, language: Language) -> Option<Summary>;

    /// Store a freshly generated summary under the content's fingerprint.
    async fn put(&self, note_id: Uuid, content: &str, language: Language, summary: &Summary);
}

// =============================================================================
// SUMMARIZATION BACKEND
// =============================================================================

/// The external AI summarization collaborator.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Generate a summary of the note in the requested language.
    async fn summarize(&self, title: &str, content: &str, language: Language) -> Result<String>;

    /// The model name being used.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_notes_request_default() {
        let req = ListNotesRequest::default();
        assert!(!req.include_deleted);
        assert!(req.limit.is_none());
        assert!(req.offset.is_none());
    }

    #[test]
    fn test_update_note_request_default_changes_nothing() {
        let req = UpdateNoteRequest::default();
        assert!(req.title.is_none());
        assert!(req.content.is_none());
        assert!(req.tags.is_none());
    }

    #[test]
    fn test_create_note_request() {
        let req = CreateNoteRequest {
            title: "Groceries".to_string(),
            content: "Buy milk".to_string(),
            tags: Some(vec!["errands".to_string()]),
        };
        assert_eq!(req.title, "Groceries");
        assert_eq!(req.tags.unwrap().len(), 1);
    }

    #[test]
    fn test_requests_are_clone_and_debug() {
        let req = UpdateNoteRequest {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        let cloned = req.clone();
        assert_eq!(cloned.title, req.title);
        assert!(format!("{:?}", req).contains("UpdateNoteRequest"));
    }
}
