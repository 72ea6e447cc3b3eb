//! Progress command for lexdrill.
//!
//! Lists per-word degrees, summarizes progress, and resets all progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ReviewPolicy;
use crate::error::Result;
use crate::stats::{summarize, summarize_members, ProgressSummary};
use crate::storage::{CollectionStore, ProgressStore};

/// Options for the progress command.
#[derive(Debug, Clone, Default)]
pub struct ProgressOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Restrict listings and stats to one collection.
    pub collection: Option<String>,
}

/// What the progress command should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAction {
    /// List every answered word with its degree.
    Degree,
    /// Summary counts.
    Stats,
    /// Delete all progress records.
    Clean,
}

/// One answered word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeEntry {
    pub word: String,
    pub degree: u32,
    pub last_reviewed_at: DateTime<Utc>,
    pub status: String,
}

/// Output format for the progress command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Per-word listing (for degree).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<DegreeEntry>,
    /// Summary (for stats).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ProgressSummary>,
    /// Records deleted (for clean).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<usize>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressOutput {
    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// The progress command implementation.
pub struct ProgressCommand<S: ProgressStore + CollectionStore> {
    store: S,
    policy: ReviewPolicy,
}

impl<S: ProgressStore + CollectionStore> ProgressCommand<S> {
    /// Create a new progress command.
    pub fn new(store: S, policy: ReviewPolicy) -> Self {
        Self { store, policy }
    }

    /// Run the progress command.
    pub fn run(&self, action: ProgressAction, options: &ProgressOptions) -> ProgressOutput {
        self.run_at(action, options, Utc::now())
    }

    /// Run with an explicit clock.
    pub fn run_at(
        &self,
        action: ProgressAction,
        options: &ProgressOptions,
        now: DateTime<Utc>,
    ) -> ProgressOutput {
        let result = match action {
            ProgressAction::Degree => self.degrees(options, now).map(|words| ProgressOutput {
                success: true,
                words,
                ..Default::default()
            }),
            ProgressAction::Stats => self.summary(options, now).map(|summary| ProgressOutput {
                success: true,
                summary: Some(summary),
                ..Default::default()
            }),
            ProgressAction::Clean => self.clean().map(|cleared| ProgressOutput {
                success: true,
                cleared: Some(cleared),
                ..Default::default()
            }),
        };

        result.unwrap_or_else(|e| ProgressOutput::failure(e.to_string()))
    }

    fn degrees(&self, options: &ProgressOptions, now: DateTime<Utc>) -> Result<Vec<DegreeEntry>> {
        let mut records = self.store.all()?;
        if let Some(name) = &options.collection {
            let members = self.store.members(name)?;
            records.retain(|p| members.binary_search(&p.word).is_ok());
        }

        Ok(records
            .into_iter()
            .map(|p| DegreeEntry {
                status: self.policy.classify(&p, now).display_name().to_string(),
                word: p.word,
                degree: p.degree,
                last_reviewed_at: p.last_reviewed_at,
            })
            .collect())
    }

    fn summary(&self, options: &ProgressOptions, now: DateTime<Utc>) -> Result<ProgressSummary> {
        match &options.collection {
            Some(name) => {
                let members = self.store.members(name)?;
                summarize_members(&self.store, &self.policy, &members, now)
            }
            None => summarize(&self.store, &self.policy, now),
        }
    }

    fn clean(&self) -> Result<usize> {
        let mut count = 0;
        self.store.for_each(&mut |_| count += 1)?;
        self.store.reset_all()?;
        tracing::info!(cleared = count, "reset all progress");
        Ok(count)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ProgressOutput, options: &ProgressOptions) -> String {
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
    fn format_human_readable(&self, output: &ProgressOutput) -> String {
        if !output.success {
            return format!(
                "Error: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if let Some(cleared) = output.cleared {
            return format!("Cleared progress for {} word(s)\n", cleared);
        }

        if let Some(summary) = &output.summary {
            let lines = [
                format!("Words:        {}", summary.words),
                format!(
                    "Mastered:     {} ({:.0}%)",
                    summary.mastered,
                    summary.mastered_ratio() * 100.0
                ),
                format!("Due:          {}", summary.due),
                format!("Resting:      {}", summary.not_yet_due),
                format!("In progress:  {}", summary.in_progress),
                format!("Never seen:   {}", summary.fresh),
            ];
            return lines.join("\n") + "\n";
        }

        if output.words.is_empty() {
            return "No words practiced yet.\n".to_string();
        }

        let width = output.words.iter().map(|w| w.word.len()).max().unwrap_or(0);
        let mut lines = Vec::new();
        for entry in &output.words {
            lines.push(format!(
                "{:<width$}  {:>3}  {}  {}",
                entry.word,
                entry.degree,
                entry.last_reviewed_at.format("%Y-%m-%d %H:%M"),
                entry.status,
                width = width
            ));
        }
        lines.join("\n") + "\n"
    }
}
