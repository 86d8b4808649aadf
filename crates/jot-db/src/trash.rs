//! Trash state transitions: soft delete, restore, and permanent purge.
//!
//! Soft delete and restore only ever touch `deleted_at` (and, for restore,
//! `updated_at_utc`); version history is untouched by both so a
//! delete/restore cycle leaves the note byte-identical apart from the
//! timestamps these transitions own.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use jot_core::{Error, Result};

/// Mark a note trashed. `updated_at_utc` does not advance: deletion is not
/// an edit.
pub(crate) async fn soft_delete_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE note SET deleted_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(())
}

/// Bring a trashed note back; the restore counts as a mutation, so
/// `updated_at_utc` advances.
pub(crate) async fn restore_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE note SET deleted_at = NULL, updated_at_utc = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(())
}

/// IDs of trashed notes whose `deleted_at` is older than `cutoff`.
pub(crate) async fn list_trashed_before(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<Vec<Uuid>> {
    let ids: Vec<(Uuid,)> =
        sqlx::query_as("SELECT id FROM note WHERE deleted_at IS NOT NULL AND deleted_at < $1")
            .bind(cutoff)
            .fetch_all(pool)
            .await
            .map_err(Error::Database)?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}

/// Permanently purge every note trashed before `cutoff`.
///
/// A single bulk delete: idempotent, order-independent, and skips anything
/// restored in the meantime (restore clears `deleted_at`, so the row no
/// longer matches). Versions and tags go with the note via ON DELETE
/// CASCADE.
pub(crate) async fn purge_expired(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM note WHERE deleted_at IS NOT NULL AND deleted_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await
        .map_err(Error::Database)?;

    let purged = result.rows_affected();
    if purged > 0 {
        info!(
            subsystem = "db",
            component = "trash",
            op = "purge",
            purged_count = purged,
            "Purged expired trash entries"
        );
    }
    Ok(purged)
}
