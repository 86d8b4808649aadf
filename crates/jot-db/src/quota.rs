//! Per-owner quota enforcement for note creation and restore.
//!
//! The quota is always derived from a live count of active rows, never a
//! cached counter, so concurrent processes cannot drift. Callers must take
//! the owner lock before counting so that count-and-insert behaves as one
//! logical unit.

use sqlx::{Postgres, Transaction};

use jot_core::{defaults::ACTIVE_NOTE_QUOTA, Error, Result};

/// Serialize quota-checked operations for one owner within the current
/// transaction. Other owners are unaffected.
pub(crate) async fn lock_owner(tx: &mut Transaction<'_, Postgres>, owner: &str) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(owner)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(())
}

/// Count the owner's active (non-trashed) notes.
pub(crate) async fn count_active_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner: &str,
) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM note WHERE owner = $1 AND deleted_at IS NULL")
            .bind(owner)
            .fetch_one(&mut **tx)
            .await
            .map_err(Error::Database)?;
    Ok(count)
}

/// Fail `QuotaExceeded` when the owner has no room for another active note.
pub(crate) async fn ensure_capacity_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner: &str,
) -> Result<()> {
    let count = count_active_tx(tx, owner).await?;
    if count >= ACTIVE_NOTE_QUOTA {
        return Err(Error::QuotaExceeded {
            owner: owner.to_string(),
            limit: ACTIVE_NOTE_QUOTA,
        });
    }
    Ok(())
}
