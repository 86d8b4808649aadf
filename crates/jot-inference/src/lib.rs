//! # jot-inference
//!
//! AI summarization backend abstraction for jot.
//!
//! This crate provides:
//! - The Gemini `generateContent` backend (default)
//! - Per-language summarization prompts
//! - A deterministic mock backend for tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use jot_inference::GeminiBackend;
//! use jot_core::{Language, SummaryBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::from_env().unwrap();
//!     let summary = backend
//!         .summarize("Groceries", "Buy milk and eggs", Language::En)
//!         .await
//!         .unwrap();
//!     println!("{}", summary);
//! }
//! ```

pub mod gemini;
pub mod prompts;

// Mock summarization backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use jot_core::*;

pub use gemini::{GeminiBackend, GeminiConfig};
pub use prompts::{build_prompt, summary_prompt};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockSummaryBackend;
