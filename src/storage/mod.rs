//! Persistent storage for lexdrill.
//!
//! This module provides the word progress and collection stores,
//! backed by SQLite on disk or by memory in tests.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CollectionStore, ProgressStore};
