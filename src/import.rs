//! Word-list import for lexdrill.
//!
//! A word list has one word per line; blank lines are skipped. Every line is
//! validated before the store is touched, so a single bad word rejects the
//! whole file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::validate_word;
use crate::error::{DrillError, Result};
use crate::storage::CollectionStore;
use crate::util::{collection_name_from_path, read_to_string_limited};

/// Result of importing words into a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Collection the words went into.
    pub collection: String,
    /// Distinct words read from the input.
    pub words: usize,
    /// Words that were not already members.
    pub added: usize,
    /// Members after the import.
    pub total: usize,
}

/// Validate a collection name.
pub fn validate_collection_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DrillError::validation("collection name is empty"));
    }
    if name.chars().any(|c| c.is_control() || c == '/' || c == '\\') {
        return Err(DrillError::validation(format!(
            "invalid collection name '{}'",
            name
        )));
    }
    Ok(name.to_string())
}

/// Parse and validate a word list.
///
/// Returns normalized words with duplicates removed, in first-seen order.
pub fn parse_word_list(content: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut seen = HashSet::new();
    let mut invalid = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match validate_word(line) {
            Ok(word) => {
                if seen.insert(word.clone()) {
                    words.push(word);
                }
            }
            Err(_) => invalid.push(format!("line {}: '{}'", line_no + 1, line.trim())),
        }
    }

    if !invalid.is_empty() {
        return Err(DrillError::validation(format!(
            "{} invalid word(s), nothing imported: {}",
            invalid.len(),
            invalid.join(", ")
        )));
    }

    Ok(words)
}

/// Import a word-list file into a collection.
///
/// Without a name, the collection is named after the file (up to its first
/// `.`). Importing the same file twice leaves the member set unchanged.
pub fn import_file(
    store: &dyn CollectionStore,
    path: &Path,
    name: Option<&str>,
) -> Result<ImportReport> {
    let name = match name {
        Some(name) => validate_collection_name(name)?,
        None => collection_name_from_path(path)
            .ok_or_else(|| {
                DrillError::validation(format!(
                    "cannot derive a collection name from {}",
                    path.display()
                ))
            })
            .and_then(|n| validate_collection_name(&n))?,
    };

    let content = read_to_string_limited(path)?;
    let words = parse_word_list(&content)?;
    let report = import_words(store, &name, &words)?;

    info!(
        collection = %report.collection,
        added = report.added,
        total = report.total,
        path = %path.display(),
        "imported word list"
    );
    Ok(report)
}

/// Append a single word to a collection, creating it if needed.
pub fn append_word(store: &dyn CollectionStore, name: &str, word: &str) -> Result<ImportReport> {
    let name = validate_collection_name(name)?;
    let word = validate_word(word)?;
    import_words(store, &name, &[word])
}

fn import_words(store: &dyn CollectionStore, name: &str, words: &[String]) -> Result<ImportReport> {
    let before = if store.exists(name)? {
        store.members(name)?.len()
    } else {
        0
    };

    store.put_members(name, words)?;
    let total = store.members(name)?.len();

    Ok(ImportReport {
        collection: name.to_string(),
        words: words.len(),
        added: total - before.min(total),
        total,
    })
}
