//! # jot-engine
//!
//! Note lifecycle orchestration for jot.
//!
//! This crate provides:
//! - [`NoteService`], the single entry point for note operations
//! - Summary caches keyed by content fingerprint ([`RedisSummaryCache`],
//!   [`MemorySummaryCache`])
//! - [`MemoryNoteStore`], an in-process store for tests and embedded use
//! - [`TrashSweeper`], the background retention purge task
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jot_engine::{MemoryNoteStore, MemorySummaryCache, NoteService};
//! use jot_inference::GeminiBackend;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = NoteService::new(
//!         Arc::new(MemoryNoteStore::new()),
//!         Arc::new(MemorySummaryCache::new()),
//!         Arc::new(GeminiBackend::from_env()?),
//!     );
//!
//!     let note = service
//!         .create(
//!             "cookie-user",
//!             jot_core::CreateNoteRequest {
//!                 title: "Groceries".to_string(),
//!                 content: "Buy milk".to_string(),
//!                 tags: None,
//!             },
//!         )
//!         .await?;
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod memory;
pub mod service;
pub mod sweeper;

// Re-export core types
pub use jot_core::*;

pub use cache::{MemorySummaryCache, RedisSummaryCache};
pub use memory::MemoryNoteStore;
pub use service::NoteService;
pub use sweeper::{SweeperConfig, SweeperEvent, SweeperHandle, TrashSweeper};
