//! Practice session state machine for lexdrill.
//!
//! A session drives one run over a collection:
//!
//! ```text
//! Loading ──advance──► AwaitingAnswer ──correct──► AnswerEvaluated{success}
//!    │                   │    ▲                         │
//!    │                   └────┘ wrong (same word)       │ advance
//!    │                                                  ▼
//!    └──empty batch──► Terminated ◄────────────── Loading
//! ```
//!
//! The session holds only transient state. Every answer is written through
//! the progress store before the call returns.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::policy::Classification;
use crate::core::progress::normalize_word;
use crate::core::scheduler::{member_records, FreshPool, Scheduler, Shuffle};
use crate::error::{DrillError, Result};
use crate::lookup::{Definition, Lookup};
use crate::storage::{CollectionStore, ProgressStore};

/// Where a session is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SessionState {
    /// No current word; the next `advance` pops or builds a batch.
    Loading,
    /// A word is shown and an answer is expected.
    AwaitingAnswer,
    /// The last answer was evaluated; input is locked until `advance`.
    AnswerEvaluated { success: bool },
    /// No more work, or the run was aborted.
    Terminated,
}

impl SessionState {
    /// Check if the session is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    fn name(&self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::AwaitingAnswer => "awaiting-answer",
            SessionState::AnswerEvaluated { .. } => "answer-evaluated",
            SessionState::Terminated => "terminated",
        }
    }
}

/// A word handed to the caller for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedWord {
    /// What to show while the user recalls the word.
    pub definition: Definition,
    /// 1-based position of this word in the current batch.
    pub batch_position: usize,
    /// Number of words the current batch started with.
    pub batch_len: usize,
}

/// Result of `Session::advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// A word is now awaiting an answer.
    Word(PresentedWord),
    /// The collection has no more work right now.
    Terminated,
}

/// Result of `Session::submit_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
}

/// Snapshot of session counters for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Words in the collection.
    pub total: usize,
    /// Members at or above the mastery degree.
    pub mastered: usize,
    /// Members currently due for review.
    pub due_count: usize,
    /// Words in the current batch when it was built.
    pub batch_size: usize,
    /// Words presented so far from the current batch.
    pub batch_position: usize,
    /// Degree of the word being asked, if any.
    pub current_word_degree: Option<u32>,
}

/// One practice run over a collection.
///
/// Fields are private; callers only see snapshots.
pub struct Session<'a> {
    progress: &'a dyn ProgressStore,
    lookup: &'a dyn Lookup,
    scheduler: Scheduler,
    collection: String,
    members: Vec<String>,
    pool: FreshPool,
    batch: VecDeque<String>,
    batch_len: usize,
    batch_position: usize,
    current: Option<Definition>,
    state: SessionState,
}

impl<'a> Session<'a> {
    /// Start a session over `collection`.
    ///
    /// Fails with `NotFound` if the collection doesn't exist. The fresh pool
    /// is built and shuffled once here.
    pub fn start(
        progress: &'a dyn ProgressStore,
        collections: &dyn CollectionStore,
        lookup: &'a dyn Lookup,
        scheduler: Scheduler,
        collection: &str,
        shuffle: Shuffle,
    ) -> Result<Self> {
        let members = collections.members(collection)?;
        let pool = scheduler.fresh_pool(progress, &members, shuffle)?;

        info!(
            collection,
            members = members.len(),
            fresh = pool.len(),
            "starting practice session"
        );

        Ok(Self {
            progress,
            lookup,
            scheduler,
            collection: collection.to_string(),
            members,
            pool,
            batch: VecDeque::new(),
            batch_len: 0,
            batch_position: 0,
            current: None,
            state: SessionState::Loading,
        })
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Name of the collection being practiced.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Definition of the word being asked, if any.
    pub fn current(&self) -> Option<&Definition> {
        self.current.as_ref()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Move to the next word.
    ///
    /// Valid in `Loading` and after a correct answer.
    pub fn advance(&mut self) -> Result<Advance> {
        self.advance_at(Utc::now())
    }

    /// `advance` with an explicit clock.
    pub fn advance_at(&mut self, now: DateTime<Utc>) -> Result<Advance> {
        match self.state {
            SessionState::Loading | SessionState::AnswerEvaluated { success: true } => {}
            other => {
                return Err(DrillError::invalid_state(format!(
                    "Cannot advance in {} state",
                    other.name()
                )));
            }
        }

        self.state = SessionState::Loading;
        self.current = None;

        if self.batch.is_empty() {
            let batch = self
                .scheduler
                .build_batch(self.progress, &self.members, &mut self.pool, now)
                .map_err(|e| self.abort(e))?;
            if batch.is_empty() {
                info!(collection = %self.collection, "no more words to practice");
                self.state = SessionState::Terminated;
                return Ok(Advance::Terminated);
            }
            self.batch_len = batch.len();
            self.batch_position = 0;
            self.batch = batch.into();
        }

        let Some(word) = self.batch.front() else {
            return Err(DrillError::invalid_state("batch emptied while loading"));
        };

        // A failed lookup leaves the session in Loading so the caller can
        // retry or quit.
        let definition = self.lookup.fetch(word)?;

        self.batch_position += 1;
        self.current = Some(definition.clone());
        self.state = SessionState::AwaitingAnswer;
        debug!(word = %definition.word, position = self.batch_position, "presenting word");

        Ok(Advance::Word(PresentedWord {
            definition,
            batch_position: self.batch_position,
            batch_len: self.batch_len,
        }))
    }

    /// Evaluate an answer for the current word.
    ///
    /// A wrong answer resets the word's degree and keeps it current.
    pub fn submit_answer(&mut self, text: &str) -> Result<AnswerOutcome> {
        self.submit_answer_at(text, Utc::now())
    }

    /// `submit_answer` with an explicit clock.
    pub fn submit_answer_at(&mut self, text: &str, now: DateTime<Utc>) -> Result<AnswerOutcome> {
        let word = self.awaiting_word("submit an answer")?.to_string();
        let correct = normalize_word(text) == word;

        let mut progress = self.progress.get(&word).map_err(|e| self.abort(e))?;
        progress.record_answer(correct, now);
        self.progress.put(&progress).map_err(|e| self.abort(e))?;

        debug!(word = %word, correct, degree = progress.degree, "answer recorded");

        if correct {
            self.batch.pop_front();
            self.state = SessionState::AnswerEvaluated { success: true };
        }

        Ok(AnswerOutcome { correct })
    }

    /// The identifier of the current word. Progress is not touched.
    pub fn reveal_answer(&self) -> Result<&str> {
        self.awaiting_word("reveal the answer")
    }

    /// End the run early.
    pub fn quit(&mut self) {
        self.current = None;
        self.state = SessionState::Terminated;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Counters for the collection and the current batch.
    pub fn stats(&self) -> Result<SessionStats> {
        self.stats_at(Utc::now())
    }

    /// `stats` with an explicit clock.
    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<SessionStats> {
        let records = member_records(self.progress, &self.members)?;
        let policy = self.scheduler.policy();

        let mut mastered = 0;
        let mut due_count = 0;
        for record in records.values() {
            match policy.classify(record, now) {
                Classification::Mastered => mastered += 1,
                Classification::Due => due_count += 1,
                Classification::NotYetDue => {}
            }
        }

        let current_word_degree = self
            .awaiting_word("read the current word")
            .ok()
            .map(|w| records.get(w).map(|p| p.degree).unwrap_or(0));

        Ok(SessionStats {
            total: self.members.len(),
            mastered,
            due_count,
            batch_size: self.batch_len,
            batch_position: self.batch_position,
            current_word_degree,
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn awaiting_word(&self, action: &str) -> Result<&str> {
        match (&self.state, self.batch.front()) {
            (SessionState::AwaitingAnswer, Some(word)) => Ok(word),
            _ => Err(DrillError::invalid_state(format!(
                "Cannot {} in {} state",
                action,
                self.state.name()
            ))),
        }
    }

    /// Terminate on store failures; other errors pass through untouched.
    fn abort(&mut self, err: DrillError) -> DrillError {
        if err.is_storage_failure() {
            warn!(collection = %self.collection, "aborting session: {}", err);
            self.current = None;
            self.state = SessionState::Terminated;
        }
        err
    }
}
