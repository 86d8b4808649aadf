//! # jot-core
//!
//! Core types, traits, and abstractions for the jot note lifecycle engine.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other jot crates depend on: the note data model, the persistent
//! store boundary, the summary cache and summarization backend contracts,
//! the content fingerprint function, and the shared error taxonomy.

pub mod defaults;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use fingerprint::{fingerprint, normalize_content};
pub use models::{normalize_tags, Language, Note, NoteVersion, NoteWithSummary, Summary};
pub use traits::{
    CreateNoteRequest, ListNotesRequest, NoteStore, SummaryBackend, SummaryCache,
    UpdateNoteRequest,
};
