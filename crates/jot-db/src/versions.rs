//! Version history: capped, newest-first snapshots of pre-edit note state.
//!
//! Snapshots are recorded by the store immediately before an edit is
//! applied, in the same transaction, so append-and-trim is atomic relative
//! to concurrent edits of the same note.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use jot_core::{defaults::MAX_VERSION_HISTORY, Error, NoteVersion, Result};

/// Record a pre-edit snapshot and trim the history to the cap.
///
/// `title`, `content`, and `updated_at_utc` are the note's values as they
/// stood before the incoming edit.
pub(crate) async fn record_version_tx(
    tx: &mut Transaction<'_, Postgres>,
    note_id: Uuid,
    title: &str,
    content: &str,
    updated_at_utc: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO note_version (id, note_id, title, content, updated_at_utc, recorded_at_utc)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::now_v7())
    .bind(note_id)
    .bind(title)
    .bind(content)
    .bind(updated_at_utc)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;

    // Evict everything beyond the newest MAX_VERSION_HISTORY snapshots.
    // The v7 id breaks recorded_at ties in insertion order.
    sqlx::query(
        "DELETE FROM note_version
         WHERE note_id = $1 AND id NOT IN (
             SELECT id FROM note_version
             WHERE note_id = $1
             ORDER BY recorded_at_utc DESC, id DESC
             LIMIT $2
         )",
    )
    .bind(note_id)
    .bind(MAX_VERSION_HISTORY as i64)
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

/// List a note's snapshots, newest-first.
pub(crate) async fn list_versions_tx(
    tx: &mut Transaction<'_, Postgres>,
    note_id: Uuid,
) -> Result<Vec<NoteVersion>> {
    let rows: Vec<(String, String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
        "SELECT title, content, updated_at_utc, recorded_at_utc
         FROM note_version
         WHERE note_id = $1
         ORDER BY recorded_at_utc DESC, id DESC",
    )
    .bind(note_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(Error::Database)?;

    Ok(rows
        .into_iter()
        .map(
            |(title, content, updated_at_utc, recorded_at_utc)| NoteVersion {
                title,
                content,
                updated_at_utc,
                recorded_at_utc,
            },
        )
        .collect())
}
