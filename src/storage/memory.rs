//! In-memory storage for testing.
//!
//! Thread-safe implementation of both store traits, used by unit tests and
//! by callers that want a throwaway practice run.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use crate::core::WordProgress;
use crate::error::{DrillError, Result};
use crate::storage::{CollectionStore, ProgressStore};

/// In-memory progress and collection store.
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    progress: RwLock<HashMap<String, WordProgress>>,
    collections: RwLock<BTreeMap<String, BTreeSet<String>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored progress records.
    pub fn progress_len(&self) -> usize {
        self.progress.read().map(|p| p.len()).unwrap_or(0)
    }
}

fn poisoned<T>(_: T) -> DrillError {
    DrillError::database("in-memory store lock poisoned")
}

impl ProgressStore for MemoryStore {
    fn find(&self, word: &str) -> Result<Option<WordProgress>> {
        let progress = self.progress.read().map_err(poisoned)?;
        Ok(progress.get(word).cloned())
    }

    fn put(&self, record: &WordProgress) -> Result<()> {
        let mut progress = self.progress.write().map_err(poisoned)?;
        progress.insert(record.word.clone(), record.clone());
        Ok(())
    }

    fn for_each(&self, visitor: &mut dyn FnMut(&WordProgress)) -> Result<()> {
        let progress = self.progress.read().map_err(poisoned)?;
        for record in progress.values() {
            visitor(record);
        }
        Ok(())
    }

    fn reset_all(&self) -> Result<()> {
        self.progress.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl CollectionStore for MemoryStore {
    fn put_members(&self, name: &str, words: &[String]) -> Result<()> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        collections
            .entry(name.to_string())
            .or_default()
            .extend(words.iter().cloned());
        Ok(())
    }

    fn list_collections(&self) -> Result<BTreeMap<String, usize>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .iter()
            .map(|(name, members)| (name.clone(), members.len()))
            .collect())
    }

    fn members(&self, name: &str) -> Result<Vec<String>> {
        let collections = self.collections.read().map_err(poisoned)?;
        collections
            .get(name)
            .map(|members| members.iter().cloned().collect())
            .ok_or_else(|| DrillError::collection_not_found(name))
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DrillError::collection_not_found(name))
    }
}
