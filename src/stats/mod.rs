//! Progress statistics for lexdrill.
//!
//! Summaries are computed on demand by visiting every stored record; there
//! is no separate stats cache to keep in sync.

pub mod summary;

pub use summary::{summarize, summarize_members, ProgressSummary};
