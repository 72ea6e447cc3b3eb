//! Core types and logic for lexdrill.
//!
//! This module contains the practice engine: per-word progress records, the
//! review policy, batch scheduling, and the session state machine.

pub mod policy;
pub mod progress;
pub mod scheduler;
pub mod session;

pub use policy::{Classification, ReviewPolicy};
pub use progress::{normalize_word, truncate_to_seconds, validate_word, WordProgress};
pub use scheduler::{FreshPool, Scheduler, Shuffle};
pub use session::{
    Advance, AnswerOutcome, PresentedWord, Session, SessionState, SessionStats,
};
