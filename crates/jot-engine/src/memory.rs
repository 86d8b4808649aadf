//! In-memory note store for tests and embedded use.
//!
//! A single mutex over the note map gives every operation the same
//! atomicity the PostgreSQL store gets from transactions: quota checks,
//! snapshot-and-trim, and trash transitions all happen under one lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use jot_core::{
    defaults::{ACTIVE_NOTE_QUOTA, MAX_VERSION_HISTORY, PAGE_LIMIT},
    normalize_tags, CreateNoteRequest, Error, ListNotesRequest, Note, NoteStore, NoteVersion,
    Result, UpdateNoteRequest,
};

/// Note store held entirely in memory.
#[derive(Clone, Default)]
pub struct MemoryNoteStore {
    notes: Arc<Mutex<HashMap<Uuid, Note>>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of notes in any state, across all owners.
    pub async fn len(&self) -> usize {
        self.notes.lock().await.len()
    }

    /// Whether the store holds no notes at all.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn count_active_locked(notes: &HashMap<Uuid, Note>, owner: &str) -> i64 {
        notes
            .values()
            .filter(|n| n.owner == owner && !n.is_deleted())
            .count() as i64
    }

    fn get_owned<'a>(
        notes: &'a mut HashMap<Uuid, Note>,
        owner: &str,
        id: Uuid,
    ) -> Result<&'a mut Note> {
        match notes.get_mut(&id) {
            Some(note) if note.owner == owner => Ok(note),
            _ => Err(Error::NoteNotFound(id)),
        }
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, owner: &str, req: CreateNoteRequest) -> Result<Note> {
        let mut notes = self.notes.lock().await;
        if Self::count_active_locked(&notes, owner) >= ACTIVE_NOTE_QUOTA {
            return Err(Error::QuotaExceeded {
                owner: owner.to_string(),
                limit: ACTIVE_NOTE_QUOTA,
            });
        }

        let now = Utc::now();
        let note = Note {
            id: Uuid::now_v7(),
            owner: owner.to_string(),
            title: req.title,
            content: req.content,
            tags: normalize_tags(req.tags.unwrap_or_default()),
            created_at_utc: now,
            updated_at_utc: now,
            deleted_at: None,
            versions: Vec::new(),
        };
        notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn fetch(&self, owner: &str, id: Uuid, include_deleted: bool) -> Result<Note> {
        let mut notes = self.notes.lock().await;
        let note = Self::get_owned(&mut notes, owner, id)?;
        if note.is_deleted() && !include_deleted {
            return Err(Error::NoteNotFound(id));
        }
        Ok(note.clone())
    }

    async fn list(&self, owner: &str, req: ListNotesRequest) -> Result<Vec<Note>> {
        let notes = self.notes.lock().await;
        let mut matched: Vec<Note> = notes
            .values()
            .filter(|n| n.owner == owner && (req.include_deleted || !n.is_deleted()))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.updated_at_utc
                .cmp(&a.updated_at_utc)
                .then(b.id.cmp(&a.id))
        });

        let offset = req.offset.unwrap_or(0).max(0) as usize;
        let limit = req.limit.unwrap_or(PAGE_LIMIT).max(0) as usize;
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn update(&self, owner: &str, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let mut notes = self.notes.lock().await;
        let note = Self::get_owned(&mut notes, owner, id)?;
        if note.is_deleted() {
            return Err(Error::InvalidState(format!(
                "note {} is in the trash; restore it before editing",
                id
            )));
        }

        // Snapshot the pre-edit state, newest-first, then trim to the cap.
        note.versions.insert(
            0,
            NoteVersion {
                title: note.title.clone(),
                content: note.content.clone(),
                updated_at_utc: note.updated_at_utc,
                recorded_at_utc: Utc::now(),
            },
        );
        note.versions.truncate(MAX_VERSION_HISTORY);

        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(content) = req.content {
            note.content = content;
        }
        if let Some(tags) = req.tags {
            note.tags = normalize_tags(tags);
        }
        note.updated_at_utc = Utc::now();
        Ok(note.clone())
    }

    async fn soft_delete(&self, owner: &str, id: Uuid) -> Result<Note> {
        let mut notes = self.notes.lock().await;
        let note = Self::get_owned(&mut notes, owner, id)?;
        if note.deleted_at.is_none() {
            note.deleted_at = Some(Utc::now());
        }
        Ok(note.clone())
    }

    async fn restore(&self, owner: &str, id: Uuid) -> Result<Note> {
        let mut notes = self.notes.lock().await;
        let active = Self::count_active_locked(&notes, owner);
        let note = Self::get_owned(&mut notes, owner, id)?;

        if note.is_deleted() {
            // The trashed note itself is not in the active count.
            if active >= ACTIVE_NOTE_QUOTA {
                return Err(Error::QuotaExceeded {
                    owner: owner.to_string(),
                    limit: ACTIVE_NOTE_QUOTA,
                });
            }
            note.deleted_at = None;
            note.updated_at_utc = Utc::now();
        }
        Ok(note.clone())
    }

    async fn hard_delete(&self, owner: &str, id: Uuid) -> Result<()> {
        let mut notes = self.notes.lock().await;
        Self::get_owned(&mut notes, owner, id)?;
        notes.remove(&id);
        Ok(())
    }

    async fn count_active(&self, owner: &str) -> Result<i64> {
        let notes = self.notes.lock().await;
        Ok(Self::count_active_locked(&notes, owner))
    }

    async fn list_versions(&self, owner: &str, id: Uuid) -> Result<Vec<NoteVersion>> {
        let mut notes = self.notes.lock().await;
        let note = Self::get_owned(&mut notes, owner, id)?;
        Ok(note.versions.clone())
    }

    async fn list_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>> {
        let notes = self.notes.lock().await;
        Ok(notes
            .values()
            .filter(|n| matches!(n.deleted_at, Some(at) if at < cutoff))
            .map(|n| n.id)
            .collect())
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut notes = self.notes.lock().await;
        let before = notes.len();
        notes.retain(|_, n| !matches!(n.deleted_at, Some(at) if at < cutoff));
        Ok((before - notes.len()) as u64)
    }
}
