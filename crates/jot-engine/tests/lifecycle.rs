//! End-to-end note lifecycle tests running the full service against the
//! in-memory store, the in-memory summary cache, and the mock backend.

use std::sync::Arc;

use jot_engine::{
    defaults, CreateNoteRequest, Error, ListNotesRequest, MemoryNoteStore, MemorySummaryCache,
    NoteService, UpdateNoteRequest,
};
use jot_inference::mock::MockSummaryBackend;
use jot_inference::Language;

const OWNER: &str = "cookie-user";

fn service_with(backend: MockSummaryBackend) -> (NoteService, Arc<MemoryNoteStore>, Arc<MemorySummaryCache>) {
    let store = Arc::new(MemoryNoteStore::new());
    let cache = Arc::new(MemorySummaryCache::new());
    let service = NoteService::new(store.clone(), cache.clone(), Arc::new(backend));
    (service, store, cache)
}

fn service() -> (NoteService, Arc<MemoryNoteStore>, Arc<MemorySummaryCache>) {
    service_with(MockSummaryBackend::new())
}

fn request(title: &str, content: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        title: title.to_string(),
        content: content.to_string(),
        tags: None,
    }
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let (service, _, _) = service();
    let err = service.create(OWNER, request("   ", "x")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_six_edits_keep_last_five_snapshots() {
    let (service, _, _) = service();
    let note = service.create(OWNER, request("Counter", "v0")).await.unwrap();

    for i in 1..=6 {
        service
            .update(
                OWNER,
                note.id,
                UpdateNoteRequest {
                    content: Some(format!("v{}", i)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let versions = service.versions(OWNER, note.id).await.unwrap();
    assert_eq!(versions.len(), defaults::MAX_VERSION_HISTORY);
    let contents: Vec<&str> = versions.iter().map(|v| v.content.as_str()).collect();
    assert_eq!(contents, vec!["v5", "v4", "v3", "v2", "v1"]);
}

#[tokio::test]
async fn test_quota_enforced_through_service() {
    let (service, _, _) = service();

    for i in 0..defaults::ACTIVE_NOTE_QUOTA {
        service
            .create(OWNER, request(&format!("n{}", i), "x"))
            .await
            .unwrap();
    }

    let err = service.create(OWNER, request("overflow", "x")).await.unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded { .. }));
    assert_eq!(
        service.count_active(OWNER).await.unwrap(),
        defaults::ACTIVE_NOTE_QUOTA
    );
}

#[tokio::test]
async fn test_concurrent_creates_for_final_slot() {
    let (service, _, _) = service();

    for i in 0..defaults::ACTIVE_NOTE_QUOTA - 1 {
        service
            .create(OWNER, request(&format!("n{}", i), "x"))
            .await
            .unwrap();
    }

    let (a, b) = tokio::join!(
        service.create(OWNER, request("racer-a", "x")),
        service.create(OWNER, request("racer-b", "x")),
    );
    assert!(a.is_ok() != b.is_ok());
    assert_eq!(
        service.count_active(OWNER).await.unwrap(),
        defaults::ACTIVE_NOTE_QUOTA
    );
}

#[tokio::test]
async fn test_delete_restore_round_trip_preserves_note() {
    let (service, _, _) = service();
    let note = service.create(OWNER, request("Keeper", "important")).await.unwrap();
    service
        .update(
            OWNER,
            note.id,
            UpdateNoteRequest {
                content: Some("still important".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let trashed = service.delete(OWNER, note.id, false).await.unwrap().unwrap();
    assert!(trashed.is_deleted());

    // Trashed notes are invisible to normal reads.
    assert!(matches!(
        service.fetch(OWNER, note.id).await,
        Err(Error::NoteNotFound(_))
    ));
    assert!(service.fetch_any(OWNER, note.id).await.is_ok());

    let restored = service.restore(OWNER, note.id).await.unwrap();
    assert!(!restored.is_deleted());
    assert_eq!(restored.title, trashed.title);
    assert_eq!(restored.content, trashed.content);
    assert_eq!(restored.versions, trashed.versions);
}

#[tokio::test]
async fn test_trash_transitions_are_idempotent() {
    let (service, _, _) = service();
    let note = service.create(OWNER, request("Stable", "x")).await.unwrap();

    let first = service.delete(OWNER, note.id, false).await.unwrap().unwrap();
    let second = service.delete(OWNER, note.id, false).await.unwrap().unwrap();
    assert_eq!(first.deleted_at, second.deleted_at);

    let restored = service.restore(OWNER, note.id).await.unwrap();
    let again = service.restore(OWNER, note.id).await.unwrap();
    assert_eq!(restored.updated_at_utc, again.updated_at_utc);
}

#[tokio::test]
async fn test_editing_trashed_note_is_rejected() {
    let (service, _, _) = service();
    let note = service.create(OWNER, request("Doomed", "x")).await.unwrap();
    service.delete(OWNER, note.id, false).await.unwrap();

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
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_restore_blocked_at_quota_leaves_note_trashed() {
    let (service, _, _) = service();
    let victim = service.create(OWNER, request("victim", "x")).await.unwrap();
    service.delete(OWNER, victim.id, false).await.unwrap();

    for i in 0..defaults::ACTIVE_NOTE_QUOTA {
        service
            .create(OWNER, request(&format!("n{}", i), "x"))
            .await
            .unwrap();
    }

    let err = service.restore(OWNER, victim.id).await.unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded { .. }));
    assert!(service.fetch_any(OWNER, victim.id).await.unwrap().is_deleted());
}

#[tokio::test]
async fn test_permanent_delete_from_any_state() {
    let (service, _, _) = service();
    let active = service.create(OWNER, request("active", "x")).await.unwrap();
    let trashed = service.create(OWNER, request("trashed", "x")).await.unwrap();
    service.delete(OWNER, trashed.id, false).await.unwrap();

    assert!(service.delete(OWNER, active.id, true).await.unwrap().is_none());
    assert!(service.delete(OWNER, trashed.id, true).await.unwrap().is_none());

    let err = service.delete(OWNER, active.id, true).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(_)));
}

#[tokio::test]
async fn test_list_hides_trash_by_default() {
    let (service, _, _) = service();
    let keep = service.create(OWNER, request("keep", "x")).await.unwrap();
    let toss = service.create(OWNER, request("toss", "x")).await.unwrap();
    service.delete(OWNER, toss.id, false).await.unwrap();

    let visible = service.list(OWNER, ListNotesRequest::default()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, keep.id);

    let all = service
        .list(
            OWNER,
            ListNotesRequest {
                include_deleted: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_summarize_caches_by_content_fingerprint() {
    let backend = MockSummaryBackend::new().with_fixed_response("A shopping list.");
    let (service, _, _) = service_with(backend.clone());
    let note = service.create(OWNER, request("Groceries", "Buy milk")).await.unwrap();

    let first = service.summarize(OWNER, note.id, Language::En).await.unwrap();
    assert_eq!(first.summary, "A shopping list.");
    assert_eq!(first.model, "mock");
    assert_eq!(backend.call_count(), 1);

    // Second request is served from cache.
    let second = service.summarize(OWNER, note.id, Language::En).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(backend.call_count(), 1);

    // An edit changes the fingerprint: the old entry is unreachable.
    service
        .update(
            OWNER,
            note.id,
            UpdateNoteRequest {
                content: Some("Buy milk and eggs".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let probe = service
        .fetch_with_summary(OWNER, note.id, Language::En)
        .await
        .unwrap();
    assert!(probe.summary.is_none());

    let third = service.summarize(OWNER, note.id, Language::En).await.unwrap();
    assert_ne!(third.fingerprint, first.fingerprint);
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_summaries_are_cached_per_language() {
    let backend = MockSummaryBackend::new();
    let (service, _, _) = service_with(backend.clone());
    let note = service.create(OWNER, request("Groceries", "Buy milk")).await.unwrap();

    service.summarize(OWNER, note.id, Language::En).await.unwrap();
    service.summarize(OWNER, note.id, Language::De).await.unwrap();
    assert_eq!(backend.call_count(), 2);

    // Both languages now hit the cache.
    service.summarize(OWNER, note.id, Language::En).await.unwrap();
    service.summarize(OWNER, note.id, Language::De).await.unwrap();
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_summarize_failures_are_not_cached() {
    let failing = MockSummaryBackend::new().with_failure("model unavailable");
    let (service, store, cache) = service_with(failing.clone());
    let note = service.create(OWNER, request("Groceries", "Buy milk")).await.unwrap();

    for _ in 0..2 {
        let err = service.summarize(OWNER, note.id, Language::En).await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }
    // Every attempt reached the backend: nothing was cached.
    assert_eq!(failing.call_count(), 2);
    assert!(cache.is_empty().await);

    // Once the backend recovers, the same cache serves a real summary.
    let recovered = NoteService::new(
        store,
        cache.clone(),
        Arc::new(MockSummaryBackend::new().with_fixed_response("A shopping list.")),
    );
    let summary = recovered.summarize(OWNER, note.id, Language::En).await.unwrap();
    assert_eq!(summary.summary, "A shopping list.");
    assert!(!cache.is_empty().await);
}

#[tokio::test]
async fn test_fetch_with_summary_never_generates() {
    let backend = MockSummaryBackend::new();
    let (service, _, _) = service_with(backend.clone());
    let note = service.create(OWNER, request("Groceries", "Buy milk")).await.unwrap();

    let probe = service
        .fetch_with_summary(OWNER, note.id, Language::En)
        .await
        .unwrap();
    assert!(probe.summary.is_none());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_summarize_trashed_note_is_not_found() {
    let (service, _, _) = service();
    let note = service.create(OWNER, request("Doomed", "x")).await.unwrap();
    service.delete(OWNER, note.id, false).await.unwrap();

    let err = service.summarize(OWNER, note.id, Language::En).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(_)));
}
