//! Collection command for lexdrill.
//!
//! Import word lists, append words, and list, show or delete collections.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::import::{append_word, import_file, ImportReport};
use crate::storage::CollectionStore;

/// Options for the collection command.
#[derive(Debug, Clone, Default)]
pub struct CollectionOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// What the collection command should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionAction {
    /// Import a word-list file.
    Import {
        path: PathBuf,
        name: Option<String>,
    },
    /// Append one word.
    Add { name: String, word: String },
    /// List collections with member counts.
    List,
    /// Show the members of a collection.
    Show { name: String },
    /// Delete a collection.
    Delete { name: String },
}

/// One collection in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub members: usize,
}

/// Output format for the collection command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Collections (for list).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<CollectionInfo>,
    /// Collection being shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Members (for show).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    /// Import or append result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportReport>,
    /// Deleted collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectionOutput {
    fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// The collection command implementation.
pub struct CollectionCommand<S: CollectionStore> {
    store: S,
}

impl<S: CollectionStore> CollectionCommand<S> {
    /// Create a new collection command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the collection command.
    pub fn run(&self, action: &CollectionAction) -> CollectionOutput {
        match action {
            CollectionAction::Import { path, name } => {
                match import_file(&self.store, path, name.as_deref()) {
                    Ok(report) => CollectionOutput {
                        import: Some(report),
                        ..CollectionOutput::ok()
                    },
                    Err(e) => CollectionOutput::failure(format!("Import failed: {}", e)),
                }
            }
            CollectionAction::Add { name, word } => match append_word(&self.store, name, word) {
                Ok(report) => CollectionOutput {
                    import: Some(report),
                    ..CollectionOutput::ok()
                },
                Err(e) => CollectionOutput::failure(format!("Failed to add word: {}", e)),
            },
            CollectionAction::List => match self.store.list_collections() {
                Ok(map) => CollectionOutput {
                    collections: map
                        .into_iter()
                        .map(|(name, members)| CollectionInfo { name, members })
                        .collect(),
                    ..CollectionOutput::ok()
                },
                Err(e) => CollectionOutput::failure(format!("Failed to list collections: {}", e)),
            },
            CollectionAction::Show { name } => match self.store.members(name) {
                Ok(members) => CollectionOutput {
                    name: Some(name.clone()),
                    members,
                    ..CollectionOutput::ok()
                },
                Err(e) => CollectionOutput::failure(e.to_string()),
            },
            CollectionAction::Delete { name } => match self.store.delete(name) {
                Ok(()) => CollectionOutput {
                    deleted: Some(name.clone()),
                    ..CollectionOutput::ok()
                },
                Err(e) => CollectionOutput::failure(e.to_string()),
            },
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CollectionOutput, options: &CollectionOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &CollectionOutput) -> String {
        if !output.success {
            return format!(
                "Error: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if let Some(report) = &output.import {
            return format!(
                "{}: {} new word(s), {} total\n",
                report.collection, report.added, report.total
            );
        }

        if let Some(name) = &output.deleted {
            return format!("Deleted collection '{}'\n", name);
        }

        if let Some(name) = &output.name {
            let mut lines = vec![format!("{} ({} words)", name, output.members.len())];
            lines.extend(output.members.iter().map(|w| format!("  {}", w)));
            return lines.join("\n") + "\n";
        }

        if output.collections.is_empty() {
            return "No collections. Import one with `lexdrill collection import <file>`.\n"
                .to_string();
        }

        let width = output
            .collections
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0);
        let mut lines = Vec::new();
        for info in &output.collections {
            lines.push(format!("{:<width$}  {}", info.name, info.members, width = width));
        }
        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::fs;
    use tempfile::TempDir;

    fn command_with_words() -> CollectionCommand<MemoryStore> {
        let cmd = CollectionCommand::new(MemoryStore::new());
        cmd.run(&CollectionAction::Add {
            name: "default".to_string(),
            word: "apple".to_string(),
        });
        cmd.run(&CollectionAction::Add {
            name: "default".to_string(),
            word: "pear".to_string(),
        });
        cmd
    }

    #[test]
    fn test_import_and_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gre.txt");
        fs::write(&path, "apple\npear\n").unwrap();

        let cmd = CollectionCommand::new(MemoryStore::new());
        let output = cmd.run(&CollectionAction::Import { path, name: None });
        assert!(output.success);
        assert_eq!(output.import.as_ref().unwrap().added, 2);

        let output = cmd.run(&CollectionAction::List);
        assert_eq!(
            output.collections,
            vec![CollectionInfo {
                name: "gre".to_string(),
                members: 2
            }]
        );
    }

    #[test]
    fn test_show_members() {
        let cmd = command_with_words();
        let output = cmd.run(&CollectionAction::Show {
            name: "default".to_string(),
        });
        assert!(output.success);
        assert_eq!(output.members, vec!["apple", "pear"]);

        let text = cmd.format_output(&output, &CollectionOptions::default());
        assert!(text.starts_with("default (2 words)"));
        assert!(text.contains("  pear"));
    }

    #[test]
    fn test_show_missing_collection() {
        let cmd = CollectionCommand::new(MemoryStore::new());
        let output = cmd.run(&CollectionAction::Show {
            name: "nope".to_string(),
        });
        assert!(!output.success);
        assert!(output.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_delete() {
        let cmd = command_with_words();
        let output = cmd.run(&CollectionAction::Delete {
            name: "default".to_string(),
        });
        assert!(output.success);

        let output = cmd.run(&CollectionAction::List);
        assert!(output.collections.is_empty());
        let text = cmd.format_output(&output, &CollectionOptions::default());
        assert!(text.contains("No collections"));
    }

    #[test]
    fn test_format_output_json() {
        let cmd = command_with_words();
        let output = cmd.run(&CollectionAction::List);
        let options = CollectionOptions {
            json: true,
            ..Default::default()
        };

        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("\"success\": true"));
        assert!(formatted.contains("\"members\": 2"));
    }

    #[test]
    fn test_format_output_quiet() {
        let cmd = command_with_words();
        let output = cmd.run(&CollectionAction::List);
        let options = CollectionOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &options).is_empty());
    }
}
