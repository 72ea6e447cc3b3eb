//! Batch scheduling for practice sessions.
//!
//! A batch takes due words first, in collection order. When there are fewer
//! due words than the batch size, the rest comes from the front of the fresh
//! pool (words never answered). Words taken from the pool do not go back;
//! afterwards they return only through their progress record.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::core::policy::{Classification, ReviewPolicy};
use crate::core::progress::WordProgress;
use crate::error::{DrillError, Result};
use crate::storage::ProgressStore;

/// How to order the fresh pool at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shuffle {
    /// Keep collection order.
    #[default]
    None,
    /// Shuffle with a fixed seed (reproducible).
    Seeded(u64),
    /// Shuffle with a seed drawn from the OS.
    Random,
}

impl Shuffle {
    /// `Random` when `enabled`, `None` otherwise.
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            Self::Random
        } else {
            Self::None
        }
    }

    fn apply(self, words: &mut [String]) {
        let mut rng = match self {
            Self::None => return,
            Self::Seeded(seed) => StdRng::seed_from_u64(seed),
            Self::Random => StdRng::from_entropy(),
        };
        words.shuffle(&mut rng);
    }
}

/// Words of a collection that have never been answered, in presentation
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreshPool {
    words: VecDeque<String>,
}

impl FreshPool {
    /// Build a pool from words, shuffling once if requested.
    pub fn new(mut words: Vec<String>, shuffle: Shuffle) -> Self {
        shuffle.apply(&mut words);
        Self {
            words: words.into(),
        }
    }

    /// Remove up to `n` words from the front.
    pub fn take(&mut self, n: usize) -> Vec<String> {
        let n = n.min(self.words.len());
        self.words.drain(..n).collect()
    }

    /// Words left in the pool.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the pool is exhausted.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Builds batches from a collection using a review policy.
#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: ReviewPolicy,
    batch_size: usize,
}

impl Scheduler {
    /// Create a scheduler. The batch size must be at least 1.
    pub fn new(policy: ReviewPolicy, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(DrillError::config("batch size must be at least 1"));
        }
        Ok(Self { policy, batch_size })
    }

    /// The policy used for classification.
    pub fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    /// Maximum words per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Build the fresh pool for a session over `members`.
    pub fn fresh_pool<P: ProgressStore + ?Sized>(
        &self,
        store: &P,
        members: &[String],
        shuffle: Shuffle,
    ) -> Result<FreshPool> {
        let records = member_records(store, members)?;
        let fresh: Vec<String> = members
            .iter()
            .filter(|w| !records.contains_key(w.as_str()))
            .cloned()
            .collect();
        Ok(FreshPool::new(fresh, shuffle))
    }

    /// Due words among `members`, in member order.
    pub fn due_words<P: ProgressStore + ?Sized>(
        &self,
        store: &P,
        members: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let records = member_records(store, members)?;
        Ok(members
            .iter()
            .filter(|w| {
                records
                    .get(w.as_str())
                    .map(|p| self.policy.classify(p, now) == Classification::Due)
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    /// Build the next batch.
    ///
    /// An empty batch means the collection has no more work right now.
    pub fn build_batch<P: ProgressStore + ?Sized>(
        &self,
        store: &P,
        members: &[String],
        pool: &mut FreshPool,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let mut batch = self.due_words(store, members, now)?;
        let due = batch.len();

        if batch.len() >= self.batch_size {
            batch.truncate(self.batch_size);
        } else {
            batch.extend(pool.take(self.batch_size - batch.len()));
        }

        debug!(
            due,
            fresh = batch.len() - due.min(batch.len()),
            pool_left = pool.len(),
            "built practice batch"
        );
        Ok(batch)
    }
}

/// Stored records for the given members, keyed by word.
pub(crate) fn member_records<P: ProgressStore + ?Sized>(
    store: &P,
    members: &[String],
) -> Result<HashMap<String, WordProgress>> {
    let wanted: HashSet<&str> = members.iter().map(String::as_str).collect();
    let mut records = HashMap::new();
    store.for_each(&mut |p| {
        if wanted.contains(p.word.as_str()) {
            records.insert(p.word.clone(), p.clone());
        }
    })?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntervalEntry;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn policy() -> ReviewPolicy {
        ReviewPolicy::new(&[
            IntervalEntry::wait(0, 1),
            IntervalEntry::wait(3, 24),
            IntervalEntry::mastery(5),
        ])
        .unwrap()
    }

    fn members(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("word{:02}", i)).collect()
    }

    fn put(store: &MemoryStore, word: &str, degree: u32, hours_ago: i64) {
        let mut p = WordProgress::new(word);
        p.degree = degree;
        p.last_reviewed_at = now() - Duration::hours(hours_ago);
        store.put(&p).unwrap();
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = Scheduler::new(policy(), 0).unwrap_err();
        assert!(matches!(err, DrillError::Config { .. }));
    }

    #[test]
    fn test_fresh_words_fill_consecutive_disjoint_batches() {
        let store = MemoryStore::new();
        let members = members(10);
        let scheduler = Scheduler::new(policy(), 5).unwrap();
        let mut pool = scheduler
            .fresh_pool(&store, &members, Shuffle::None)
            .unwrap();

        let first = scheduler
            .build_batch(&store, &members, &mut pool, now())
            .unwrap();
        let second = scheduler
            .build_batch(&store, &members, &mut pool, now())
            .unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);
        let all: HashSet<&String> = first.iter().chain(second.iter()).collect();
        assert_eq!(all.len(), 10);
        assert!(all.iter().all(|w| members.contains(w)));
        assert!(pool.is_empty());

        let third = scheduler
            .build_batch(&store, &members, &mut pool, now())
            .unwrap();
        assert!(third.is_empty());
    }

    #[test]
    fn test_due_words_come_first_and_fill_from_pool() {
        let store = MemoryStore::new();
        let members = members(6);
        put(&store, "word03", 1, 5); // due
        put(&store, "word04", 0, 0); // not yet due
        let scheduler = Scheduler::new(policy(), 3).unwrap();
        let mut pool = scheduler
            .fresh_pool(&store, &members, Shuffle::None)
            .unwrap();
        assert_eq!(pool.len(), 4);

        let batch = scheduler
            .build_batch(&store, &members, &mut pool, now())
            .unwrap();
        assert_eq!(batch, vec!["word03", "word00", "word01"]);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_due_words_truncated_to_batch_size_without_touching_pool() {
        let store = MemoryStore::new();
        let members = members(6);
        for w in ["word00", "word01", "word02", "word03"] {
            put(&store, w, 2, 10);
        }
        let scheduler = Scheduler::new(policy(), 2).unwrap();
        let mut pool = scheduler
            .fresh_pool(&store, &members, Shuffle::None)
            .unwrap();

        let batch = scheduler
            .build_batch(&store, &members, &mut pool, now())
            .unwrap();
        assert_eq!(batch, vec!["word00", "word01"]);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_mastered_words_never_scheduled() {
        let store = MemoryStore::new();
        let members = members(3);
        for w in &members {
            put(&store, w, 5, 10_000);
        }
        let scheduler = Scheduler::new(policy(), 5).unwrap();
        let mut pool = scheduler
            .fresh_pool(&store, &members, Shuffle::None)
            .unwrap();

        assert!(pool.is_empty());
        let batch = scheduler
            .build_batch(&store, &members, &mut pool, now())
            .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_records_outside_collection_ignored() {
        let store = MemoryStore::new();
        put(&store, "elsewhere", 1, 100);
        let members = members(1);
        let scheduler = Scheduler::new(policy(), 5).unwrap();

        let due = scheduler.due_words(&store, &members, now()).unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let words = members(20);
        let a = FreshPool::new(words.clone(), Shuffle::Seeded(42));
        let b = FreshPool::new(words.clone(), Shuffle::Seeded(42));
        let unshuffled = FreshPool::new(words.clone(), Shuffle::None);

        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert_ne!(a, unshuffled);
    }

    #[test]
    fn test_pool_take_caps_at_len() {
        let mut pool = FreshPool::new(members(3), Shuffle::None);
        assert_eq!(pool.take(10).len(), 3);
        assert!(pool.take(1).is_empty());
    }

    #[test]
    fn test_shuffle_from_flag() {
        assert_eq!(Shuffle::from_flag(false), Shuffle::None);
        assert_eq!(Shuffle::from_flag(true), Shuffle::Random);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Batches never exceed the batch size and never repeat a word
            #[test]
            fn prop_batches_bounded_and_distinct(
                n in 0usize..40,
                batch_size in 1usize..12,
                seed in any::<u64>(),
            ) {
                let store = MemoryStore::new();
                let members = members(n);
                let scheduler = Scheduler::new(policy(), batch_size).unwrap();
                let mut pool = scheduler
                    .fresh_pool(&store, &members, Shuffle::Seeded(seed))
                    .unwrap();

                let mut seen = HashSet::new();
                loop {
                    let batch = scheduler.build_batch(&store, &members, &mut pool, now()).unwrap();
                    if batch.is_empty() {
                        break;
                    }
                    prop_assert!(batch.len() <= batch_size);
                    for w in batch {
                        prop_assert!(seen.insert(w));
                    }
                }
                prop_assert_eq!(seen.len(), n);
            }
        }
    }
}
