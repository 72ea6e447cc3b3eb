//! CLI commands for lexdrill.
//!
//! This module provides CLI commands for lexdrill, organized into:
//! - **Practice**: practice (interactive session)
//! - **Data commands**: collection, progress, define
//! - **Utility commands**: init

// Practice
pub mod practice;

// Data commands
pub mod collection;
pub mod define;
pub mod progress;

// Utility commands
pub mod init;

pub use collection::{CollectionAction, CollectionCommand};
pub use define::DefineCommand;
pub use init::InitCommand;
pub use practice::PracticeCommand;
pub use progress::{ProgressAction, ProgressCommand};
