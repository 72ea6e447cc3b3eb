//! Progress summaries computed from the progress store.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Classification, ReviewPolicy};
use crate::error::Result;
use crate::storage::ProgressStore;

/// Counts of words by where they stand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    /// Words considered (stored records, or collection members).
    pub words: usize,
    /// Members that have never been answered.
    pub fresh: usize,
    /// Words at or above the mastery degree.
    pub mastered: usize,
    /// Words due for review now.
    pub due: usize,
    /// Words still resting at their degree.
    pub not_yet_due: usize,
    /// Answered correctly at least once and not mastered yet.
    pub in_progress: usize,
}

impl ProgressSummary {
    /// Fraction of words mastered, 0.0 when there are none.
    pub fn mastered_ratio(&self) -> f64 {
        if self.words == 0 {
            0.0
        } else {
            self.mastered as f64 / self.words as f64
        }
    }

    fn count(&mut self, classification: Classification, degree: u32) {
        match classification {
            Classification::Mastered => self.mastered += 1,
            Classification::Due => self.due += 1,
            Classification::NotYetDue => self.not_yet_due += 1,
        }
        if classification != Classification::Mastered && degree > 0 {
            self.in_progress += 1;
        }
    }
}

/// Summarize every stored record.
pub fn summarize<P: ProgressStore + ?Sized>(
    store: &P,
    policy: &ReviewPolicy,
    now: DateTime<Utc>,
) -> Result<ProgressSummary> {
    let mut summary = ProgressSummary::default();
    store.for_each(&mut |p| {
        summary.words += 1;
        summary.count(policy.classify(p, now), p.degree);
    })?;
    Ok(summary)
}

/// Summarize the members of one collection.
///
/// Members without a stored record count as fresh.
pub fn summarize_members<P: ProgressStore + ?Sized>(
    store: &P,
    policy: &ReviewPolicy,
    members: &[String],
    now: DateTime<Utc>,
) -> Result<ProgressSummary> {
    let wanted: HashSet<&str> = members.iter().map(String::as_str).collect();
    let mut summary = ProgressSummary {
        words: wanted.len(),
        ..Default::default()
    };

    let mut answered = 0;
    store.for_each(&mut |p| {
        if wanted.contains(p.word.as_str()) {
            answered += 1;
            summary.count(policy.classify(p, now), p.degree);
        }
    })?;
    summary.fresh = summary.words - answered;

    Ok(summary)
}
