//! PostgreSQL-backed note store.
//!
//! Each trait method is one transaction. Mutations lock the note row with
//! `SELECT ... FOR UPDATE` so snapshot-and-trim, trash transitions, and
//! field updates are atomic relative to concurrent operations on the same
//! note; quota-checked paths additionally take a per-owner advisory lock so
//! count-and-insert cannot interleave across connections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use jot_core::{
    defaults::PAGE_LIMIT, normalize_tags, CreateNoteRequest, Error, ListNotesRequest, Note,
    NoteStore, NoteVersion, Result, UpdateNoteRequest,
};

use crate::{quota, trash, versions};

/// (id, owner, title, content, created_at_utc, updated_at_utc, deleted_at)
type NoteRow = (
    Uuid,
    String,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

/// Note store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(Error::Database)
    }

    /// Fetch an owner's note row without locking it.
    async fn fetch_row_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &str,
        id: Uuid,
    ) -> Result<Option<NoteRow>> {
        sqlx::query_as(
            "SELECT id, owner, title, content, created_at_utc, updated_at_utc, deleted_at
             FROM note WHERE id = $1 AND owner = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)
    }

    /// Fetch an owner's note row and hold a row lock for the rest of the
    /// transaction.
    async fn lock_row_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &str,
        id: Uuid,
    ) -> Result<Option<NoteRow>> {
        sqlx::query_as(
            "SELECT id, owner, title, content, created_at_utc, updated_at_utc, deleted_at
             FROM note WHERE id = $1 AND owner = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)
    }

    async fn load_tags_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: Uuid,
    ) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT tag_name FROM note_tag WHERE note_id = $1 ORDER BY tag_name")
                .bind(note_id)
                .fetch_all(&mut **tx)
                .await
                .map_err(Error::Database)?;
        Ok(rows.into_iter().map(|(tag,)| tag).collect())
    }

    async fn replace_tags_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: Uuid,
        tags: &[String],
    ) -> Result<()> {
        sqlx::query("DELETE FROM note_tag WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        for tag in tags {
            sqlx::query("INSERT INTO note_tag (note_id, tag_name) VALUES ($1, $2)")
                .bind(note_id)
                .bind(tag)
                .execute(&mut **tx)
                .await
                .map_err(Error::Database)?;
        }
        Ok(())
    }

    /// Build a full [`Note`] from a row plus its tags and versions.
    async fn assemble_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        row: NoteRow,
    ) -> Result<Note> {
        let (id, owner, title, content, created_at_utc, updated_at_utc, deleted_at) = row;
        let tags = self.load_tags_tx(tx, id).await?;
        let note_versions = versions::list_versions_tx(tx, id).await?;
        Ok(Note {
            id,
            owner,
            title,
            content,
            tags,
            created_at_utc,
            updated_at_utc,
            deleted_at,
            versions: note_versions,
        })
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(&self, owner: &str, req: CreateNoteRequest) -> Result<Note> {
        let mut tx = self.begin().await?;
        quota::lock_owner(&mut tx, owner).await?;
        quota::ensure_capacity_tx(&mut tx, owner).await?;

        let id = Uuid::now_v7();
        let now = Utc::now();
        let tags = normalize_tags(req.tags.unwrap_or_default());

        sqlx::query(
            "INSERT INTO note (id, owner, title, content, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $5)",
        )
        .bind(id)
        .bind(owner)
        .bind(&req.title)
        .bind(&req.content)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        self.replace_tags_tx(&mut tx, id, &tags).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            note_id = %id,
            "Note created"
        );

        Ok(Note {
            id,
            owner: owner.to_string(),
            title: req.title,
            content: req.content,
            tags,
            created_at_utc: now,
            updated_at_utc: now,
            deleted_at: None,
            versions: Vec::new(),
        })
    }

    async fn fetch(&self, owner: &str, id: Uuid, include_deleted: bool) -> Result<Note> {
        let mut tx = self.begin().await?;
        let row = self
            .fetch_row_tx(&mut tx, owner, id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;

        if row.6.is_some() && !include_deleted {
            return Err(Error::NoteNotFound(id));
        }

        let note = self.assemble_tx(&mut tx, row).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note)
    }

    async fn list(&self, owner: &str, req: ListNotesRequest) -> Result<Vec<Note>> {
        let limit = req.limit.unwrap_or(PAGE_LIMIT);
        let offset = req.offset.unwrap_or(0);

        let mut tx = self.begin().await?;
        let rows: Vec<NoteRow> = sqlx::query_as(
            "SELECT id, owner, title, content, created_at_utc, updated_at_utc, deleted_at
             FROM note
             WHERE owner = $1 AND ($2 OR deleted_at IS NULL)
             ORDER BY updated_at_utc DESC, id DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(owner)
        .bind(req.include_deleted)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let mut notes = Vec::with_capacity(rows.len());
        for row in rows {
            notes.push(self.assemble_tx(&mut tx, row).await?);
        }
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list",
            result_count = notes.len(),
            "Listed notes"
        );
        Ok(notes)
    }

    async fn update(&self, owner: &str, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let mut tx = self.begin().await?;
        let row = self
            .lock_row_tx(&mut tx, owner, id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let (_, _, old_title, old_content, _, old_updated_at, deleted_at) = &row;

        if deleted_at.is_some() {
            return Err(Error::InvalidState(format!(
                "note {} is in the trash; restore it before editing",
                id
            )));
        }

        // Snapshot the pre-edit state first, then apply the new fields.
        versions::record_version_tx(&mut tx, id, old_title, old_content, *old_updated_at).await?;

        let title = req.title.unwrap_or_else(|| old_title.clone());
        let content = req.content.unwrap_or_else(|| old_content.clone());
        let now = Utc::now();

        sqlx::query("UPDATE note SET title = $1, content = $2, updated_at_utc = $3 WHERE id = $4")
            .bind(&title)
            .bind(&content)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if let Some(tags) = req.tags {
            let tags = normalize_tags(tags);
            self.replace_tags_tx(&mut tx, id, &tags).await?;
        }

        let refreshed = self
            .fetch_row_tx(&mut tx, owner, id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let note = self.assemble_tx(&mut tx, refreshed).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "update",
            note_id = %id,
            "Note updated"
        );
        Ok(note)
    }

    async fn soft_delete(&self, owner: &str, id: Uuid) -> Result<Note> {
        let mut tx = self.begin().await?;
        let row = self
            .lock_row_tx(&mut tx, owner, id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;

        // Already trashed: no-op, the original deleted_at stands.
        if row.6.is_none() {
            trash::soft_delete_tx(&mut tx, id, Utc::now()).await?;
        }

        let refreshed = self
            .fetch_row_tx(&mut tx, owner, id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let note = self.assemble_tx(&mut tx, refreshed).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "soft_delete",
            note_id = %id,
            "Note moved to trash"
        );
        Ok(note)
    }

    async fn restore(&self, owner: &str, id: Uuid) -> Result<Note> {
        let mut tx = self.begin().await?;
        quota::lock_owner(&mut tx, owner).await?;
        let row = self
            .lock_row_tx(&mut tx, owner, id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;

        if row.6.is_some() {
            // The trashed note itself is excluded from the active count, so
            // this admits it only when there is genuine room.
            quota::ensure_capacity_tx(&mut tx, owner).await?;
            trash::restore_tx(&mut tx, id, Utc::now()).await?;
        }

        let refreshed = self
            .fetch_row_tx(&mut tx, owner, id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let note = self.assemble_tx(&mut tx, refreshed).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "restore",
            note_id = %id,
            "Note restored from trash"
        );
        Ok(note)
    }

    async fn hard_delete(&self, owner: &str, id: Uuid) -> Result<()> {
        // Versions and tags cascade with the note row.
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }

        debug!(
            subsystem = "db",
            component = "notes",
            op = "hard_delete",
            note_id = %id,
            "Note permanently deleted"
        );
        Ok(())
    }

    async fn count_active(&self, owner: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM note WHERE owner = $1 AND deleted_at IS NULL")
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn list_versions(&self, owner: &str, id: Uuid) -> Result<Vec<NoteVersion>> {
        let mut tx = self.begin().await?;
        self.fetch_row_tx(&mut tx, owner, id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let note_versions = versions::list_versions_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note_versions)
    }

    async fn list_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>> {
        trash::list_trashed_before(&self.pool, cutoff).await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        trash::purge_expired(&self.pool, cutoff).await
    }
}
