//! Read-retry policy tests: transient store I/O failures are absorbed by
//! reads up to the retry bound, while mutations surface them immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use jot_engine::{
    defaults, CreateNoteRequest, Error, ListNotesRequest, MemoryNoteStore, MemorySummaryCache,
    Note, NoteService, NoteStore, NoteVersion, Result, UpdateNoteRequest,
};
use jot_inference::mock::MockSummaryBackend;

const OWNER: &str = "cookie-user";

/// Store wrapper that fails the next N calls with a transient I/O error
/// before delegating to the real store.
struct FlakyNoteStore {
    inner: MemoryNoteStore,
    failures_left: AtomicUsize,
}

impl FlakyNoteStore {
    fn new(inner: MemoryNoteStore) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(0),
        }
    }

    fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    fn trip(&self) -> Result<()> {
        let tripped = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NoteStore for FlakyNoteStore {
    async fn insert(&self, owner: &str, req: CreateNoteRequest) -> Result<Note> {
        self.trip()?;
        self.inner.insert(owner, req).await
    }

    async fn fetch(&self, owner: &str, id: Uuid, include_deleted: bool) -> Result<Note> {
        self.trip()?;
        self.inner.fetch(owner, id, include_deleted).await
    }

    async fn list(&self, owner: &str, req: ListNotesRequest) -> Result<Vec<Note>> {
        self.trip()?;
        self.inner.list(owner, req).await
    }

    async fn update(&self, owner: &str, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        self.trip()?;
        self.inner.update(owner, id, req).await
    }

    async fn soft_delete(&self, owner: &str, id: Uuid) -> Result<Note> {
        self.trip()?;
        self.inner.soft_delete(owner, id).await
    }

    async fn restore(&self, owner: &str, id: Uuid) -> Result<Note> {
        self.trip()?;
        self.inner.restore(owner, id).await
    }

    async fn hard_delete(&self, owner: &str, id: Uuid) -> Result<()> {
        self.trip()?;
        self.inner.hard_delete(owner, id).await
    }

    async fn count_active(&self, owner: &str) -> Result<i64> {
        self.trip()?;
        self.inner.count_active(owner).await
    }

    async fn list_versions(&self, owner: &str, id: Uuid) -> Result<Vec<NoteVersion>> {
        self.trip()?;
        self.inner.list_versions(owner, id).await
    }

    async fn list_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>> {
        self.trip()?;
        self.inner.list_trashed_before(cutoff).await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.trip()?;
        self.inner.purge_expired(cutoff).await
    }
}

fn flaky_service() -> (NoteService, Arc<FlakyNoteStore>) {
    let store = Arc::new(FlakyNoteStore::new(MemoryNoteStore::new()));
    let service = NoteService::new(
        store.clone(),
        Arc::new(MemorySummaryCache::new()),
        Arc::new(MockSummaryBackend::new()),
    );
    (service, store)
}

fn request(title: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        title: title.to_string(),
        content: "x".to_string(),
        tags: None,
    }
}

#[tokio::test]
async fn test_reads_absorb_one_transient_failure() {
    let (service, store) = flaky_service();
    let note = service.create(OWNER, request("Sturdy")).await.unwrap();

    store.fail_next(1);
    assert!(service.fetch(OWNER, note.id).await.is_ok());

    store.fail_next(1);
    assert!(service.fetch_any(OWNER, note.id).await.is_ok());

    store.fail_next(1);
    assert!(service.list(OWNER, ListNotesRequest::default()).await.is_ok());

    store.fail_next(1);
    assert!(service.versions(OWNER, note.id).await.is_ok());

    store.fail_next(1);
    assert_eq!(service.count_active(OWNER).await.unwrap(), 1);
}

#[tokio::test]
async fn test_reads_give_up_past_the_retry_bound() {
    let (service, store) = flaky_service();
    let note = service.create(OWNER, request("Sturdy")).await.unwrap();

    // One more failure than the bound allows: the error surfaces.
    store.fail_next(defaults::READ_RETRY_ATTEMPTS as usize + 1);
    let err = service.fetch(OWNER, note.id).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    // The budget was consumed; the store works again.
    assert!(service.fetch(OWNER, note.id).await.is_ok());
}

#[tokio::test]
async fn test_domain_errors_are_not_retried() {
    let (service, store) = flaky_service();

    // Absent note: NoteNotFound immediately, no failure budget consumed.
    store.fail_next(0);
    let err = service.fetch(OWNER, Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(_)));
}

#[tokio::test]
async fn test_mutations_surface_transient_failures_immediately() {
    let (service, store) = flaky_service();
    let note = service.create(OWNER, request("Sturdy")).await.unwrap();

    store.fail_next(1);
    let err = service.create(OWNER, request("Unlucky")).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    store.fail_next(1);
    let err = service
        .update(
            OWNER,
            note.id,
            UpdateNoteRequest {
                content: Some("y".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    store.fail_next(1);
    let err = service.delete(OWNER, note.id, false).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    store.fail_next(1);
    let err = service.restore(OWNER, note.id).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    // No retry fired: the note saw exactly zero extra edits.
    assert!(service.versions(OWNER, note.id).await.unwrap().is_empty());
}
