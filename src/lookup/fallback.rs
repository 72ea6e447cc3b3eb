//! Lookup wrappers: read-through caching and hint fallback.

use tracing::{debug, warn};

use crate::error::Result;
use crate::lookup::{Definition, FileDefinitionCache, Lookup};

/// Consults the file cache before an upstream lookup and stores what the
/// upstream returns.
///
/// This is where a remote dictionary plugs in; the binary ships no upstream
/// and reads the cache directly through [`HintLookup`].
///
/// A failed cache write is logged and does not fail the lookup.
pub struct CachedLookup<U: Lookup> {
    upstream: U,
    cache: FileDefinitionCache,
}

impl<U: Lookup> CachedLookup<U> {
    /// Wrap `upstream` with `cache`.
    pub fn new(upstream: U, cache: FileDefinitionCache) -> Self {
        Self { upstream, cache }
    }

    /// The underlying cache.
    pub fn cache(&self) -> &FileDefinitionCache {
        &self.cache
    }
}

impl<U: Lookup> Lookup for CachedLookup<U> {
    fn name(&self) -> &'static str {
        "cached"
    }

    fn fetch(&self, word: &str) -> Result<Definition> {
        if let Some(definition) = self.cache.get(word)? {
            debug!(word, "definition cache hit");
            return Ok(definition);
        }

        let definition = self.upstream.fetch(word)?;
        if let Err(err) = self.cache.put(&definition) {
            warn!(
                "Failed to cache definition of '{}' from '{}': {}",
                word,
                self.upstream.name(),
                err
            );
        }
        Ok(definition)
    }
}

/// Falls back to a masked-spelling hint when the inner lookup has no entry.
///
/// Errors other than `NotFound` are passed through.
pub struct HintLookup<L: Lookup> {
    inner: L,
}

impl<L: Lookup> HintLookup<L> {
    /// Wrap `inner`.
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<L: Lookup> Lookup for HintLookup<L> {
    fn name(&self) -> &'static str {
        "hint-fallback"
    }

    fn fetch(&self, word: &str) -> Result<Definition> {
        match self.inner.fetch(word) {
            Err(err) if err.is_not_found() => {
                debug!(
                    word,
                    source = self.inner.name(),
                    "no definition found, showing hint"
                );
                Ok(Definition::hint_only(word))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrillError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Upstream that knows one word and counts calls.
    struct CountingLookup {
        calls: AtomicUsize,
    }

    impl Lookup for CountingLookup {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn fetch(&self, word: &str) -> Result<Definition> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if word == "apple" {
                Ok(Definition::new("apple").with_sense("n.", "a fruit"))
            } else {
                Err(DrillError::definition_not_found(word))
            }
        }
    }

    struct BrokenLookup;

    impl Lookup for BrokenLookup {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn fetch(&self, _word: &str) -> Result<Definition> {
            Err(DrillError::database("connection reset"))
        }
    }

    fn counting() -> CountingLookup {
        CountingLookup {
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_cached_lookup_reads_through_once() {
        let dir = TempDir::new().unwrap();
        let cache = FileDefinitionCache::with_dir(dir.path()).unwrap();
        let lookup = CachedLookup::new(counting(), cache);

        let first = lookup.fetch("apple").unwrap();
        let second = lookup.fetch("apple").unwrap();

        assert_eq!(first, second);
        assert_eq!(lookup.upstream.calls.load(Ordering::SeqCst), 1);
        assert!(lookup.cache().get("apple").unwrap().is_some());
    }

    #[test]
    fn test_cached_lookup_passes_not_found() {
        let dir = TempDir::new().unwrap();
        let cache = FileDefinitionCache::with_dir(dir.path()).unwrap();
        let lookup = CachedLookup::new(counting(), cache);

        assert!(lookup.fetch("pear").unwrap_err().is_not_found());
        assert!(lookup.cache().get("pear").unwrap().is_none());
    }

    #[test]
    fn test_hint_lookup_falls_back_on_not_found() {
        let lookup = HintLookup::new(counting());
        let definition = lookup.fetch("pear").unwrap();
        assert!(definition.is_hint_only());
        assert_eq!(definition.hint.as_deref(), Some("p__r (4 letters)"));

        let definition = lookup.fetch("apple").unwrap();
        assert!(!definition.is_hint_only());
    }

    #[test]
    fn test_hint_lookup_passes_other_errors() {
        let lookup = HintLookup::new(BrokenLookup);
        let err = lookup.fetch("apple").unwrap_err();
        assert!(matches!(err, DrillError::Database { .. }));
    }
}
