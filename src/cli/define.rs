//! Define command for lexdrill.
//!
//! Stores, shows, or removes a word's definition in the local cache. Practice
//! shows cached definitions and falls back to a spelling hint otherwise.

use serde::{Deserialize, Serialize};

use crate::core::validate_word;
use crate::error::Result;
use crate::lookup::{Definition, FileDefinitionCache};

/// Options for the define command.
#[derive(Debug, Clone, Default)]
pub struct DefineOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Remove the cached definition instead.
    pub remove: bool,
}

/// Content to store. Empty input shows the cached definition.
#[derive(Debug, Clone, Default)]
pub struct DefineInput {
    /// Senses as `part: meaning` or just `meaning`.
    pub senses: Vec<String>,
    /// Example sentences.
    pub examples: Vec<String>,
    /// Pronunciations as `region: phonetic` or just `phonetic`.
    pub phonetics: Vec<String>,
}

impl DefineInput {
    fn is_empty(&self) -> bool {
        self.senses.is_empty() && self.examples.is_empty() && self.phonetics.is_empty()
    }
}

/// Output format for the define command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefineOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// The definition stored or found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Definition>,
    /// Whether a definition was written.
    pub stored: bool,
    /// Whether a definition was removed.
    pub removed: bool,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DefineOutput {
    fn found(definition: Option<Definition>, stored: bool) -> Self {
        Self {
            success: true,
            definition,
            stored,
            removed: false,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            definition: None,
            stored: false,
            removed: false,
            error: Some(error.into()),
        }
    }
}

/// Split `label: text` into its parts; text without a label gets an empty one.
fn split_labeled(value: &str) -> (String, String) {
    match value.split_once(':') {
        Some((label, text)) if !label.trim().is_empty() && !label.contains(' ') => {
            (label.trim().to_string(), text.trim().to_string())
        }
        _ => (String::new(), value.trim().to_string()),
    }
}

/// The define command implementation.
pub struct DefineCommand {
    cache: FileDefinitionCache,
}

impl DefineCommand {
    /// Create a new define command.
    pub fn new(cache: FileDefinitionCache) -> Self {
        Self { cache }
    }

    /// Run the define command.
    pub fn run(&self, word: &str, input: &DefineInput, options: &DefineOptions) -> DefineOutput {
        let word = match validate_word(word) {
            Ok(w) => w,
            Err(e) => return DefineOutput::failure(e.to_string()),
        };

        if options.remove {
            return match self.cache.remove(&word) {
                Ok(()) => DefineOutput {
                    removed: true,
                    ..DefineOutput::found(None, false)
                },
                Err(e) => DefineOutput::failure(format!("Failed to remove definition: {}", e)),
            };
        }

        if input.is_empty() {
            return match self.cache.get(&word) {
                Ok(Some(definition)) => DefineOutput::found(Some(definition), false),
                Ok(None) => DefineOutput::failure(format!("No definition stored for '{}'", word)),
                Err(e) => DefineOutput::failure(format!("Failed to read definition: {}", e)),
            };
        }

        match self.store(&word, input) {
            Ok(definition) => DefineOutput::found(Some(definition), true),
            Err(e) => DefineOutput::failure(format!("Failed to store definition: {}", e)),
        }
    }

    fn store(&self, word: &str, input: &DefineInput) -> Result<Definition> {
        let mut definition = Definition::new(word);
        for sense in &input.senses {
            let (part, meaning) = split_labeled(sense);
            definition = definition.with_sense(part, meaning);
        }
        for phonetic in &input.phonetics {
            let (region, text) = split_labeled(phonetic);
            definition = definition.with_pronunciation(region, text);
        }
        for example in &input.examples {
            definition = definition.with_example(example.trim(), None);
        }

        self.cache.put(&definition)?;
        Ok(definition)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &DefineOutput, options: &DefineOptions) -> String {
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
    fn format_human_readable(&self, output: &DefineOutput) -> String {
        if !output.success {
            return format!(
                "Error: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.removed {
            return "Definition removed.\n".to_string();
        }

        let Some(definition) = &output.definition else {
            return String::new();
        };

        let mut lines = vec![definition.word.clone()];
        for p in &definition.pronunciations {
            if p.region.is_empty() {
                lines.push(format!("  [{}]", p.phonetic));
            } else {
                lines.push(format!("  {} [{}]", p.region, p.phonetic));
            }
        }
        for sense in &definition.senses {
            if sense.part.is_empty() {
                lines.push(format!("  {}", sense.meaning));
            } else {
                lines.push(format!("  {} {}", sense.part, sense.meaning));
            }
        }
        for example in &definition.examples {
            lines.push(format!("  > {}", example.text));
        }
        if output.stored {
            lines.push(String::new());
            lines.push("Stored.".to_string());
        }
        lines.join("\n") + "\n"
    }
}
