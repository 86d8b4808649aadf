//! Centralized default constants for the jot note engine.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// NOTE LIFECYCLE
// =============================================================================

/// Maximum number of snapshots retained in a note's version history.
/// The 6th snapshot evicts the oldest.
pub const MAX_VERSION_HISTORY: usize = 5;

/// Maximum number of active (non-deleted) notes a single owner may hold.
pub const ACTIVE_NOTE_QUOTA: i64 = 10;

/// Days a soft-deleted note stays in the trash before it becomes eligible
/// for permanent purge.
pub const TRASH_RETENTION_DAYS: i64 = 7;

// =============================================================================
// SUMMARY CACHE
// =============================================================================

/// Time-to-live for cached summaries, in seconds.
pub const SUMMARY_CACHE_TTL_SECS: u64 = 3600;

/// Key prefix for summary cache entries in the shared cache backend.
pub const SUMMARY_CACHE_PREFIX: &str = "jot:summary:";

// =============================================================================
// SUMMARIZATION BACKEND
// =============================================================================

/// Default Gemini model used for note summarization.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default Gemini API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Timeout for summarization requests, in seconds.
pub const SUMMARIZE_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// TRASH SWEEPER
// =============================================================================

/// Interval between background trash sweep passes, in seconds.
pub const SWEEP_INTERVAL_SECS: u64 = 3600;

// =============================================================================
// ORCHESTRATOR
// =============================================================================

/// How many times a failed read is retried before the store error surfaces.
/// Mutating operations are never retried.
pub const READ_RETRY_ATTEMPTS: u32 = 2;

/// Base backoff between read retries, in milliseconds.
pub const READ_RETRY_BACKOFF_MS: u64 = 50;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for note list queries.
pub const PAGE_LIMIT: i64 = 100;
