//! Per-word practice records and word identifier rules.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DrillError, Result};

/// Words accepted on import: letters and hyphens, then optionally dots and
/// apostrophes (`o'clock`, `e.g.`).
static VALID_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z-]+[A-Za-z-.']*$").unwrap_or_else(|e| panic!("invalid word regex: {e}"))
});

/// Normalize a word or a typed answer for storage and comparison.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Validate and normalize a word identifier.
pub fn validate_word(word: &str) -> Result<String> {
    let trimmed = word.trim();
    if !VALID_WORD.is_match(trimmed) {
        return Err(DrillError::validation(format!("invalid word '{}'", trimmed)));
    }
    Ok(normalize_word(trimmed))
}

/// Truncate a timestamp to whole seconds, the precision records are stored at.
pub fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Practice record for a single word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordProgress {
    /// Normalized word identifier.
    pub word: String,
    /// Consecutive correct answers since the last reset.
    pub degree: u32,
    /// When the word was last answered (second precision).
    pub last_reviewed_at: DateTime<Utc>,
}

impl WordProgress {
    /// Zero-value record for a word that has never been answered.
    pub fn new(word: impl AsRef<str>) -> Self {
        Self {
            word: normalize_word(word.as_ref()),
            degree: 0,
            last_reviewed_at: DateTime::UNIX_EPOCH,
        }
    }

    /// Build a record from its stored columns.
    pub fn from_parts(word: impl AsRef<str>, degree: u32, last_reviewed_secs: i64) -> Self {
        Self {
            word: normalize_word(word.as_ref()),
            degree,
            last_reviewed_at: DateTime::from_timestamp(last_reviewed_secs, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
        }
    }

    /// Apply an answer: +1 when correct, back to 0 when wrong.
    ///
    /// The degree is not clamped at the mastery degree.
    pub fn record_answer(&mut self, correct: bool, now: DateTime<Utc>) {
        if correct {
            self.degree = self.degree.saturating_add(1);
        } else {
            self.degree = 0;
        }
        self.last_reviewed_at = truncate_to_seconds(now);
    }

    /// Stored form of `last_reviewed_at`.
    pub fn last_reviewed_secs(&self) -> i64 {
        self.last_reviewed_at.timestamp()
    }
}
