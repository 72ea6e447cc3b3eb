//! Storage traits for lexdrill.
//!
//! `ProgressStore` holds one practice record per word; `CollectionStore`
//! holds named word sets. Both are the single source of truth: a practice
//! session keeps only transient state derived from them.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::WordProgress;
use crate::error::Result;

/// Trait for word progress storage backends.
pub trait ProgressStore: Send + Sync {
    /// Retrieve the stored record for a word.
    ///
    /// Returns `Ok(None)` if the word has never been answered.
    fn find(&self, word: &str) -> Result<Option<WordProgress>>;

    /// Save a record, replacing any prior value for the same word.
    ///
    /// The write is atomic and durable when this returns.
    fn put(&self, progress: &WordProgress) -> Result<()>;

    /// Visit every stored record in unspecified order.
    fn for_each(&self, visitor: &mut dyn FnMut(&WordProgress)) -> Result<()>;

    /// Delete every record in one atomic step.
    fn reset_all(&self) -> Result<()>;

    /// Retrieve a record, defaulting to a fresh degree-0 record.
    fn get(&self, word: &str) -> Result<WordProgress> {
        Ok(self
            .find(word)?
            .unwrap_or_else(|| WordProgress::new(word)))
    }

    /// Collect all records, sorted by word.
    fn all(&self) -> Result<Vec<WordProgress>> {
        let mut records = Vec::new();
        self.for_each(&mut |p| records.push(p.clone()))?;
        records.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(records)
    }
}

/// Trait for collection storage backends.
pub trait CollectionStore: Send + Sync {
    /// Union `words` into the named collection, creating it if absent.
    ///
    /// Words already present are left alone. The whole call is atomic.
    fn put_members(&self, name: &str, words: &[String]) -> Result<()>;

    /// All collections with their member counts.
    fn list_collections(&self) -> Result<BTreeMap<String, usize>>;

    /// Members of a collection, sorted.
    ///
    /// Fails with `NotFound` if the collection doesn't exist.
    fn members(&self, name: &str) -> Result<Vec<String>>;

    /// Remove a collection and all its memberships.
    ///
    /// Fails with `NotFound` if the collection doesn't exist.
    fn delete(&self, name: &str) -> Result<()>;

    /// Check if a collection exists.
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_collections()?.contains_key(name))
    }
}

impl<T: ProgressStore + ?Sized> ProgressStore for Arc<T> {
    fn find(&self, word: &str) -> Result<Option<WordProgress>> {
        (**self).find(word)
    }

    fn put(&self, progress: &WordProgress) -> Result<()> {
        (**self).put(progress)
    }

    fn for_each(&self, visitor: &mut dyn FnMut(&WordProgress)) -> Result<()> {
        (**self).for_each(visitor)
    }

    fn reset_all(&self) -> Result<()> {
        (**self).reset_all()
    }
}

impl<T: CollectionStore + ?Sized> CollectionStore for Arc<T> {
    fn put_members(&self, name: &str, words: &[String]) -> Result<()> {
        (**self).put_members(name, words)
    }

    fn list_collections(&self) -> Result<BTreeMap<String, usize>> {
        (**self).list_collections()
    }

    fn members(&self, name: &str) -> Result<Vec<String>> {
        (**self).members(name)
    }

    fn delete(&self, name: &str) -> Result<()> {
        (**self).delete(name)
    }
}
