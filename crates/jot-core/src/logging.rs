//! Structured logging schema and field name constants for the jot engine.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "engine", "db", "cache", "inference", "sweeper"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "summary_cache", "gemini", "trash_sweeper"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "update", "restore", "purge", "summarize"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Opaque owner key the operation is scoped to.
pub const OWNER: &str = "owner";

/// Summary language code.
pub const LANGUAGE: &str = "language";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a list query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of notes permanently removed by a sweep pass.
pub const PURGED_COUNT: &str = "purged_count";

/// Whether a summary cache probe hit.
pub const CACHE_HIT: &str = "cache_hit";
