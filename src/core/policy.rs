//! Review policy: which words are mastered, due, or still resting.
//!
//! Classification logic:
//! 1. `degree >= mastery_degree` → mastered, never scheduled again
//! 2. Find the interval entry with the greatest threshold `<= degree`
//! 3. No entry → due immediately
//! 4. Otherwise due once `last_reviewed_at + wait < now`; a wait that runs
//!    past the representable range never elapses

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{IntervalEntry, ReviewConfig};
use crate::core::progress::WordProgress;
use crate::error::{DrillError, Result};

/// Where a word stands at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Reached the mastery degree; excluded until progress is reset.
    Mastered,
    /// Waited long enough; eligible for the next batch.
    Due,
    /// Reviewed too recently at its current degree.
    NotYetDue,
}

impl Classification {
    /// Whether the scheduler may pick this word.
    pub fn is_due(&self) -> bool {
        matches!(self, Self::Due)
    }

    /// Display name for output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mastered => "mastered",
            Self::Due => "due",
            Self::NotYetDue => "not yet due",
        }
    }
}

/// Validated, immutable degree → wait table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPolicy {
    waits: BTreeMap<u32, Duration>,
    mastery_degree: u32,
}

impl ReviewPolicy {
    /// Build a policy from configured interval entries.
    ///
    /// The mastery degree is the entry flagged `mastered`, or the greatest
    /// threshold when no entry carries the flag.
    pub fn new(entries: &[IntervalEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Err(DrillError::config("review interval table is empty"));
        }

        let sentinels: Vec<u32> = entries
            .iter()
            .filter(|e| e.mastered)
            .map(|e| e.degree)
            .collect();
        if sentinels.len() > 1 {
            return Err(DrillError::config(format!(
                "review interval table marks more than one mastery degree: {:?}",
                sentinels
            )));
        }

        let mastery_degree = match sentinels.first() {
            Some(degree) => *degree,
            None => entries.iter().map(|e| e.degree).max().unwrap_or(0),
        };
        if mastery_degree == 0 {
            return Err(DrillError::config(
                "mastery degree must be at least 1, otherwise every word starts mastered",
            ));
        }

        // With an explicit sentinel, a wait at the mastery degree is dead too
        let has_sentinel = !sentinels.is_empty();
        let mut waits = BTreeMap::new();
        for entry in entries.iter().filter(|e| !e.mastered) {
            if entry.degree > mastery_degree || (has_sentinel && entry.degree == mastery_degree) {
                return Err(DrillError::config(format!(
                    "interval for degree {} is not below mastery degree {} and can never apply",
                    entry.degree, mastery_degree
                )));
            }
            if waits
                .insert(entry.degree, Duration::hours(i64::from(entry.hours)))
                .is_some()
            {
                return Err(DrillError::config(format!(
                    "review interval table lists degree {} twice",
                    entry.degree
                )));
            }
        }

        Ok(Self {
            waits,
            mastery_degree,
        })
    }

    /// Build a policy from the `[review]` config section.
    pub fn from_config(config: &ReviewConfig) -> Result<Self> {
        Self::new(&config.intervals)
    }

    /// Degree at or above which a word is mastered.
    pub fn mastery_degree(&self) -> u32 {
        self.mastery_degree
    }

    /// Wait that applies to a word at `degree`, if any threshold covers it.
    pub fn wait_for(&self, degree: u32) -> Option<Duration> {
        self.waits.range(..=degree).next_back().map(|(_, w)| *w)
    }

    /// Classify a record at `now`.
    pub fn classify(&self, progress: &WordProgress, now: DateTime<Utc>) -> Classification {
        if progress.degree >= self.mastery_degree {
            return Classification::Mastered;
        }

        let Some(wait) = self.wait_for(progress.degree) else {
            return Classification::Due;
        };
        match progress.last_reviewed_at.checked_add_signed(wait) {
            Some(due_at) if due_at < now => Classification::Due,
            _ => Classification::NotYetDue,
        }
    }

    /// Whether a record has reached the mastery degree.
    pub fn is_mastered(&self, progress: &WordProgress) -> bool {
        progress.degree >= self.mastery_degree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    /// `{0: 1h, 3: 24h, 5: mastered}`
    fn sample_policy() -> ReviewPolicy {
        ReviewPolicy::new(&[
            IntervalEntry::wait(0, 1),
            IntervalEntry::wait(3, 24),
            IntervalEntry::mastery(5),
        ])
        .unwrap()
    }

    fn reviewed(degree: u32, hours_ago: i64) -> WordProgress {
        let mut p = WordProgress::new("word");
        p.degree = degree;
        p.last_reviewed_at = now() - Duration::hours(hours_ago);
        p
    }

    #[test]
    fn test_degree_three_waits_a_day() {
        let policy = sample_policy();
        assert_eq!(
            policy.classify(&reviewed(3, 23), now()),
            Classification::NotYetDue
        );
        assert_eq!(policy.classify(&reviewed(3, 25), now()), Classification::Due);
    }

    #[test]
    fn test_greatest_threshold_at_or_below_degree_applies() {
        let policy = sample_policy();
        // degree 4 falls under the degree-3 entry, not degree-0
        assert_eq!(
            policy.classify(&reviewed(4, 2), now()),
            Classification::NotYetDue
        );
        assert_eq!(policy.wait_for(4), Some(Duration::hours(24)));
        assert_eq!(policy.wait_for(2), Some(Duration::hours(1)));
    }

    #[test]
    fn test_wait_boundary_is_strict() {
        let policy = sample_policy();
        assert_eq!(
            policy.classify(&reviewed(0, 1), now()),
            Classification::NotYetDue
        );
    }

    #[test]
    fn test_no_threshold_below_degree_is_due() {
        let policy =
            ReviewPolicy::new(&[IntervalEntry::wait(2, 48), IntervalEntry::mastery(4)]).unwrap();
        assert_eq!(policy.wait_for(1), None);
        assert_eq!(policy.classify(&reviewed(1, 0), now()), Classification::Due);
    }

    #[test]
    fn test_mastered_at_and_above_mastery_degree() {
        let policy = sample_policy();
        assert_eq!(
            policy.classify(&reviewed(5, 1000), now()),
            Classification::Mastered
        );
        assert_eq!(
            policy.classify(&reviewed(9, 0), now()),
            Classification::Mastered
        );
        assert!(policy.is_mastered(&reviewed(5, 0)));
        assert!(!policy.is_mastered(&reviewed(4, 0)));
    }

    #[test]
    fn test_mastery_defaults_to_greatest_threshold() {
        let policy =
            ReviewPolicy::new(&[IntervalEntry::wait(0, 1), IntervalEntry::wait(6, 72)]).unwrap();
        assert_eq!(policy.mastery_degree(), 6);
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = ReviewPolicy::new(&[]).unwrap_err();
        assert!(matches!(err, DrillError::Config { .. }));
    }

    #[test]
    fn test_unreachable_mastery_rejected() {
        let err = ReviewPolicy::new(&[IntervalEntry::mastery(0)]).unwrap_err();
        assert!(matches!(err, DrillError::Config { .. }));

        let err = ReviewPolicy::new(&[IntervalEntry::wait(0, 1)]).unwrap_err();
        assert!(matches!(err, DrillError::Config { .. }));
    }

    #[test]
    fn test_two_sentinels_rejected() {
        let err = ReviewPolicy::new(&[
            IntervalEntry::wait(0, 1),
            IntervalEntry::mastery(3),
            IntervalEntry::mastery(5),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("more than one"));
    }

    #[test]
    fn test_interval_beyond_mastery_rejected() {
        let err = ReviewPolicy::new(&[
            IntervalEntry::wait(0, 1),
            IntervalEntry::mastery(3),
            IntervalEntry::wait(4, 24),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("not below mastery"));
    }

    #[test]
    fn test_interval_at_mastery_sentinel_rejected() {
        let err = ReviewPolicy::new(&[
            IntervalEntry::wait(0, 1),
            IntervalEntry::wait(3, 24),
            IntervalEntry::mastery(3),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("not below mastery"));
    }

    #[test]
    fn test_huge_wait_never_elapses() {
        let policy =
            ReviewPolicy::new(&[IntervalEntry::wait(0, u32::MAX), IntervalEntry::mastery(5)])
                .unwrap();
        assert_eq!(
            policy.classify(&reviewed(0, 10_000), now()),
            Classification::NotYetDue
        );

        let mut far_future = WordProgress::new("word");
        far_future.last_reviewed_at = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        assert_eq!(policy.classify(&far_future, now()), Classification::NotYetDue);
    }

    #[test]
    fn test_duplicate_degree_rejected() {
        let err = ReviewPolicy::new(&[
            IntervalEntry::wait(0, 1),
            IntervalEntry::wait(0, 2),
            IntervalEntry::mastery(3),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_policy() -> impl Strategy<Value = ReviewPolicy> {
            (1u32..12, proptest::collection::vec(0u32..200, 1..6)).prop_map(
                |(mastery, hours)| {
                    let mut entries: Vec<IntervalEntry> = hours
                        .iter()
                        .enumerate()
                        .filter(|(degree, _)| (*degree as u32) < mastery)
                        .map(|(degree, h)| IntervalEntry::wait(degree as u32, *h))
                        .collect();
                    entries.push(IntervalEntry::mastery(mastery));
                    ReviewPolicy::new(&entries).unwrap()
                },
            )
        }

        proptest! {
            // Mastered words are never due, whatever the table or timestamps
            #[test]
            fn prop_mastered_never_due(
                policy in arb_policy(),
                extra in 0u32..50,
                hours_ago in 0i64..100_000,
            ) {
                let p = reviewed(policy.mastery_degree() + extra, hours_ago);
                let class = policy.classify(&p, now());
                prop_assert_eq!(class, Classification::Mastered);
                prop_assert!(!class.is_due());
            }

            // Below mastery, a word is eventually due
            #[test]
            fn prop_unmastered_eventually_due(policy in arb_policy(), degree in 0u32..12) {
                prop_assume!(degree < policy.mastery_degree());
                let p = reviewed(degree, 1_000);
                prop_assert_eq!(policy.classify(&p, now()), Classification::Due);
            }
        }
    }
}
