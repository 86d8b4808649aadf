//! Core data model for the jot note lifecycle engine.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// A snapshot of a note's state captured immediately before an edit
/// overwrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteVersion {
    /// Title at snapshot time.
    pub title: String,
    /// Content at snapshot time.
    pub content: String,
    /// The note's `updated_at_utc` at snapshot time.
    pub updated_at_utc: DateTime<Utc>,
    /// When the snapshot itself was recorded.
    pub recorded_at_utc: DateTime<Utc>,
}

/// The central note entity.
///
/// Trash state is carried by `deleted_at` alone: a note is in the trash iff
/// `deleted_at` is set, so the "deleted flag matches deletion timestamp"
/// invariant holds structurally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier, assigned at creation, immutable.
    pub id: Uuid,
    /// Opaque owner identity derived from a cookie value, immutable.
    pub owner: String,
    /// Note title.
    pub title: String,
    /// Note content.
    pub content: String,
    /// Normalized tags: lowercased, deduplicated, sorted.
    pub tags: Vec<String>,
    /// Set once at creation.
    pub created_at_utc: DateTime<Utc>,
    /// Bumped on create, edit, and restore.
    pub updated_at_utc: DateTime<Utc>,
    /// Set when soft-deleted, cleared on restore.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Version history, newest-first, capped at
    /// [`crate::defaults::MAX_VERSION_HISTORY`] entries.
    pub versions: Vec<NoteVersion>,
}

impl Note {
    /// Whether the note is currently in the trash.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Normalize a tag set: lowercase, trim, drop empties, dedupe, sort.
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let set: BTreeSet<String> = tags
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    set.into_iter().collect()
}

/// A cached AI-generated summary of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// The summarized note.
    pub note_id: Uuid,
    /// Note title at generation time.
    pub title: String,
    /// Language the summary was generated in.
    pub language: Language,
    /// Fingerprint of the content the summary was generated from.
    pub fingerprint: String,
    /// The generated summary text.
    pub summary: String,
    /// Model that produced the summary.
    pub model: String,
    /// Generation timestamp.
    pub generated_at_utc: DateTime<Utc>,
}

/// A note paired with its cached summary, if one is available.
///
/// `summary: None` is the "summary not yet available" marker: reads never
/// trigger generation, they only probe the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteWithSummary {
    pub note: Note,
    pub summary: Option<Summary>,
}

/// Supported summarization languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    Uk,
    Sk,
    De,
    Cs,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Ru,
        Language::Uk,
        Language::Sk,
        Language::De,
        Language::Cs,
    ];

    /// The ISO 639-1 code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Uk => "uk",
            Language::Sk => "sk",
            Language::De => "de",
            Language::Cs => "cs",
        }
    }

    /// English name of the language.
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ru => "Russian",
            Language::Uk => "Ukrainian",
            Language::Sk => "Slovak",
            Language::De => "German",
            Language::Cs => "Czech",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            "uk" => Ok(Language::Uk),
            "sk" => Ok(Language::Sk),
            "de" => Ok(Language::De),
            "cs" => Ok(Language::Cs),
            other => Err(Error::InvalidInput(format!(
                "unsupported language: {} (supported: en, ru, uk, sk, de, cs)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::now_v7(),
            owner: "cookie-user".to_string(),
            title: "Groceries".to_string(),
            content: "Buy milk".to_string(),
            tags: vec!["errands".to_string()],
            created_at_utc: now,
            updated_at_utc: now,
            deleted_at: None,
            versions: Vec::new(),
        }
    }

    #[test]
    fn test_is_deleted_tracks_deleted_at() {
        let mut note = sample_note();
        assert!(!note.is_deleted());

        note.deleted_at = Some(Utc::now());
        assert!(note.is_deleted());
    }

    #[test]
    fn test_note_serialization_round_trip() {
        let note = sample_note();
        let json = serde_json::to_string(&note).unwrap();
        let parsed: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, note.id);
        assert_eq!(parsed.title, note.title);
        assert_eq!(parsed.tags, note.tags);
        assert!(parsed.deleted_at.is_none());
    }

    #[test]
    fn test_normalize_tags_lowercases_and_sorts() {
        let tags = normalize_tags(vec![
            "Work".to_string(),
            "errands".to_string(),
            "WORK".to_string(),
        ]);
        assert_eq!(tags, vec!["errands", "work"]);
    }

    #[test]
    fn test_normalize_tags_drops_empty_and_trims() {
        let tags = normalize_tags(vec![
            "  ".to_string(),
            " todo ".to_string(),
            "".to_string(),
        ]);
        assert_eq!(tags, vec!["todo"]);
    }

    #[test]
    fn test_language_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_language_unsupported_code() {
        let err = "xx".parse::<Language>().unwrap_err();
        match err {
            Error::InvalidInput(msg) => assert!(msg.contains("xx")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_language_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Language::De).unwrap(), "\"de\"");
        let parsed: Language = serde_json::from_str("\"uk\"").unwrap();
        assert_eq!(parsed, Language::Uk);
    }

    #[test]
    fn test_summary_serialization_round_trip() {
        let summary = Summary {
            note_id: Uuid::now_v7(),
            title: "Groceries".to_string(),
            language: Language::En,
            fingerprint: "sha256:abc".to_string(),
            summary: "A shopping list.".to_string(),
            model: "gemini-2.0-flash".to_string(),
            generated_at_utc: Utc::now(),
        };

        let json = serde_json::to_string(&summary).unwrap();
        let parsed: Summary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }

    #[test]
    fn test_note_with_summary_miss_marker() {
        let wrapped = NoteWithSummary {
            note: sample_note(),
            summary: None,
        };
        let json = serde_json::to_value(&wrapped).unwrap();
        assert!(json["summary"].is_null());
    }
}
