//! Content fingerprinting for summary cache keys.
//!
//! The fingerprint is a pure function of normalized note *content* only.
//! Titles and tags never influence it, so title-only or tag-only edits do
//! not invalidate a cached summary, while any content edit produces a
//! different key and therefore a guaranteed cache miss.

use sha2::{Digest, Sha256};

/// Normalize note content before hashing.
///
/// Line endings are unified to `\n`, trailing whitespace is stripped from
/// each line, and outer whitespace is trimmed. Two contents that differ
/// only in these respects summarize identically, so they share a cache key.
pub fn normalize_content(content: &str) -> String {
    content
        .replace("\r\n", "\n")
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Compute the SHA-256 fingerprint of normalized content.
///
/// Returns `sha256:<hex>`.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_content(content).as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
