//! lexdrill - spaced-repetition vocabulary practice
//!
//! lexdrill tests you on the words of a collection, tracks a degree per word,
//! and decides from a degree → interval table which words are due again.
//! Progress and collections live in an embedded SQLite database.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod import;
pub mod lookup;
pub mod stats;
pub mod storage;
pub mod util;

pub use config::Config;
pub use core::{
    Advance, AnswerOutcome, Classification, ReviewPolicy, Scheduler, Session, SessionState,
    SessionStats, Shuffle, WordProgress,
};
pub use error::{DrillError, Result};
pub use lookup::{CachedLookup, Definition, FileDefinitionCache, HintLookup, Lookup};
pub use stats::ProgressSummary;
pub use storage::{CollectionStore, MemoryStore, ProgressStore, SqliteStore};

// CLI commands
pub use cli::{CollectionCommand, DefineCommand, InitCommand, PracticeCommand, ProgressCommand};
