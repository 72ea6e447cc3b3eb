//! Init command for lexdrill.
//!
//! Writes a default config file and creates the data directories.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Force overwrite an existing config file.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether initialization was successful.
    pub success: bool,
    /// Files and directories created.
    pub created: Vec<String>,
    /// Files that already existed (skipped).
    pub skipped: Vec<String>,
    /// Error message if initialization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    /// Create a successful output.
    pub fn success(created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: true,
            created,
            skipped,
            error: None,
        }
    }

    /// Create a failed output with partial success information.
    ///
    /// Reports what was created before the failure so the user knows what
    /// partial state may have been left behind.
    pub fn failure(error: impl Into<String>, created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: false,
            created,
            skipped,
            error: Some(error.into()),
        }
    }
}

/// The init command implementation.
pub struct InitCommand {
    config_path: PathBuf,
    config: Config,
}

impl InitCommand {
    /// Create a new init command writing `config` to `config_path`.
    pub fn new(config_path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            config_path: config_path.into(),
            config,
        }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        let mut created = Vec::new();
        let mut skipped = Vec::new();

        let config_display = self.config_path.display().to_string();
        if self.config_path.exists() && !options.force {
            skipped.push(config_display);
        } else {
            match self.config.save(&self.config_path) {
                Ok(()) => created.push(config_display),
                Err(e) => return InitOutput::failure(e.to_string(), created, skipped),
            }
        }

        let dirs = [self.config.data_dir(), self.config.definitions_dir()];
        for dir in dirs.into_iter().flatten() {
            match self.ensure_dir(&dir) {
                Ok(true) => created.push(dir.display().to_string()),
                Ok(false) => skipped.push(dir.display().to_string()),
                Err(e) => return InitOutput::failure(e, created, skipped),
            }
        }

        InitOutput::success(created, skipped)
    }

    /// Ensure a directory exists.
    /// Returns Ok(true) if created, Ok(false) if already exists.
    fn ensure_dir(&self, path: &Path) -> Result<bool, String> {
        if path.exists() {
            if path.is_dir() {
                return Ok(false);
            } else {
                return Err(format!("{} exists but is not a directory", path.display()));
            }
        }

        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))?;

        Ok(true)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
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
    fn format_human_readable(&self, output: &InitOutput) -> String {
        let mut lines = Vec::new();

        if !output.success {
            lines.push(format!(
                "Init failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            ));
            if !output.created.is_empty() {
                lines.push(String::new());
                lines.push("Partially created before failure:".to_string());
                for path in &output.created {
                    lines.push(format!("  {}", path));
                }
            }
            return lines.join("\n") + "\n";
        }

        if output.created.is_empty() {
            return "lexdrill already initialized.\n".to_string();
        }

        lines.push("Created:".to_string());
        for path in &output.created {
            lines.push(format!("  {}", path));
        }

        if !output.skipped.is_empty() {
            lines.push("Already exists (skipped):".to_string());
            for path in &output.skipped {
                lines.push(format!("  {}", path));
            }
        }

        lines.push(String::new());
        lines.push("lexdrill initialized. Import a word list with `lexdrill collection import <file>`.".to_string());

        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn command(temp: &TempDir) -> InitCommand {
        let mut config = Config::default();
        config.storage.data_dir = Some(temp.path().join("data"));
        InitCommand::new(temp.path().join("config.toml"), config)
    }

    #[test]
    fn test_init_output_failure_with_partial_state() {
        let output = InitOutput::failure(
            "permission denied",
            vec!["created_dir".to_string()],
            vec![],
        );

        assert!(!output.success);
        assert_eq!(output.created, vec!["created_dir"]);
        assert_eq!(output.error, Some("permission denied".to_string()));
    }

    #[test]
    fn test_init_creates_config_and_dirs() {
        let temp = TempDir::new().unwrap();
        let output = command(&temp).run(&InitOptions::default());

        assert!(output.success);
        assert_eq!(output.created.len(), 3);
        assert!(temp.path().join("config.toml").exists());
        assert!(temp.path().join("data").join("definitions").is_dir());

        let loaded = Config::load_from_file(&temp.path().join("config.toml")).unwrap();
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_init_idempotent() {
        let temp = TempDir::new().unwrap();
        let cmd = command(&temp);
        cmd.run(&InitOptions::default());

        let output = cmd.run(&InitOptions::default());
        assert!(output.success);
        assert!(output.created.is_empty());
        assert_eq!(output.skipped.len(), 3);

        let text = cmd.format_output(&output, &InitOptions::default());
        assert_eq!(text, "lexdrill already initialized.\n");
    }

    #[test]
    fn test_init_with_force_rewrites_config() {
        let temp = TempDir::new().unwrap();
        let cmd = command(&temp);
        cmd.run(&InitOptions::default());

        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "# modified").unwrap();

        let output = cmd.run(&InitOptions {
            force: true,
            ..Default::default()
        });
        assert!(output.success);
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("batch_size"));
    }

    #[test]
    fn test_data_dir_is_a_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("data"), "oops").unwrap();

        let output = command(&temp).run(&InitOptions::default());
        assert!(!output.success);
        assert!(output.error.unwrap().contains("not a directory"));
        assert_eq!(output.created.len(), 1);
    }

    #[test]
    fn test_format_output_json() {
        let temp = TempDir::new().unwrap();
        let cmd = command(&temp);
        let output = InitOutput::success(vec!["test".to_string()], vec![]);
        let options = InitOptions {
            json: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &options).contains("\"success\": true"));
    }
}
