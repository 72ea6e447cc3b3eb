//! Configuration loading for lexdrill.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Config file (`--config <path>`, else `<home>/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! The config file is optional unless given explicitly on the command line.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::ReviewPolicy;
use crate::error::{DrillError, Result};

/// Main configuration struct for lexdrill.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the database and definition cache live.
    pub storage: StorageConfig,
    /// Practice session behavior.
    pub practice: PracticeConfig,
    /// Review interval table.
    pub review: ReviewConfig,
}

/// Storage location configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory. Defaults to the lexdrill home directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Practice session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PracticeConfig {
    /// Words per batch.
    pub batch_size: usize,
    /// Shuffle never-seen words once at session start.
    pub shuffle: bool,
}

/// Smallest accepted batch size.
pub const MIN_BATCH_SIZE: usize = 1;

impl PracticeConfig {
    /// Check if a batch size value is valid.
    pub fn is_valid_batch_size(value: usize) -> bool {
        value >= MIN_BATCH_SIZE
    }
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            shuffle: false,
        }
    }
}

/// One row of the review interval table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntervalEntry {
    /// Degree threshold this wait applies from.
    pub degree: u32,
    /// Hours to wait after the last review before the word is due again.
    #[serde(default)]
    pub hours: u32,
    /// Marks the mastery degree instead of a wait.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mastered: bool,
}

impl IntervalEntry {
    /// A wait of `hours` for words at or above `degree`.
    pub fn wait(degree: u32, hours: u32) -> Self {
        Self {
            degree,
            hours,
            mastered: false,
        }
    }

    /// The mastery sentinel at `degree`.
    pub fn mastery(degree: u32) -> Self {
        Self {
            degree,
            hours: 0,
            mastered: true,
        }
    }
}

/// Review interval configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    /// Degree thresholds and their waits, plus one mastery sentinel.
    pub intervals: Vec<IntervalEntry>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            intervals: vec![
                IntervalEntry::wait(0, 1),
                IntervalEntry::wait(1, 8),
                IntervalEntry::wait(2, 24),
                IntervalEntry::wait(3, 72),
                IntervalEntry::wait(4, 168),
                IntervalEntry::mastery(5),
            ],
        }
    }
}

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// An explicit `path` must exist. Without one, `<home>/config.toml` is
    /// used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(DrillError::config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                Self::load_from_file(path)?
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => {
                    Self::load_from_file(&default_path)?
                }
                _ => Config::default(),
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| DrillError::storage(path, e))?;
        toml::from_str(&content)
            .map_err(|e| DrillError::config(format!("{}: {}", path.display(), e)))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // LEXDRILL_BATCH_SIZE
        if let Ok(val) = env::var("LEXDRILL_BATCH_SIZE") {
            match val.parse::<usize>() {
                Ok(n) => {
                    if PracticeConfig::is_valid_batch_size(n) {
                        self.practice.batch_size = n;
                    } else {
                        eprintln!(
                            "Warning: Invalid LEXDRILL_BATCH_SIZE value '{}'. \
                            Must be >= {}. Using '{}'.",
                            n, MIN_BATCH_SIZE, self.practice.batch_size
                        );
                    }
                }
                Err(_) => eprintln!(
                    "Warning: Invalid LEXDRILL_BATCH_SIZE value '{}'. \
                    Expected a positive integer. Using '{}'.",
                    val, self.practice.batch_size
                ),
            }
        }

        // LEXDRILL_SHUFFLE
        if let Ok(val) = env::var("LEXDRILL_SHUFFLE") {
            self.practice.shuffle = val == "true" || val == "1";
        }

        // LEXDRILL_DATA_DIR
        if let Ok(val) = env::var("LEXDRILL_DATA_DIR") {
            if val.is_empty() {
                eprintln!("Warning: LEXDRILL_DATA_DIR is empty, ignoring.");
            } else {
                self.storage.data_dir = Some(PathBuf::from(val));
            }
        }
    }

    /// Check everything a session needs before it starts.
    pub fn validate(&self) -> Result<()> {
        if !PracticeConfig::is_valid_batch_size(self.practice.batch_size) {
            return Err(DrillError::config(format!(
                "practice.batch_size must be >= {}, got {}",
                MIN_BATCH_SIZE, self.practice.batch_size
            )));
        }
        ReviewPolicy::from_config(&self.review).map(|_| ())
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage.data_dir.clone().or_else(lexdrill_home)
    }

    /// Path of the SQLite database file.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.data_dir().map(|d| d.join("lexdrill.db"))
    }

    /// Directory holding cached word definitions.
    pub fn definitions_dir(&self) -> Option<PathBuf> {
        self.data_dir().map(|d| d.join("definitions"))
    }

    /// Save configuration to `path`.
    ///
    /// Creates the parent directory if needed and writes through a temp file
    /// followed by a rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| DrillError::storage(&dir, e))?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| DrillError::config(e.to_string()))?;

        let temp_path = dir.join(".config.toml.tmp");
        fs::write(&temp_path, &content).map_err(|e| DrillError::storage(&temp_path, e))?;

        let file = fs::File::open(&temp_path).map_err(|e| DrillError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| DrillError::storage(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, path).map_err(|e| DrillError::storage(path, e))?;

        Ok(())
    }
}

/// Get the lexdrill home directory.
///
/// Checks `LEXDRILL_HOME` first, then falls back to `~/.lexdrill`.
/// An empty `LEXDRILL_HOME` is ignored.
pub fn lexdrill_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("LEXDRILL_HOME") {
        if home.is_empty() {
            tracing::warn!("LEXDRILL_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("LEXDRILL_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".lexdrill"));
    }

    let fallback_path = env::temp_dir().join("lexdrill");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get the default config file path.
///
/// Returns `<lexdrill_home>/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    lexdrill_home().map(|h| h.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        env::remove_var("LEXDRILL_BATCH_SIZE");
        env::remove_var("LEXDRILL_SHUFFLE");
        env::remove_var("LEXDRILL_DATA_DIR");
        env::remove_var("LEXDRILL_HOME");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.practice.batch_size, 10);
        assert!(!config.practice.shuffle);
        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.review.intervals.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_review_table_is_valid() {
        let policy = ReviewPolicy::from_config(&ReviewConfig::default()).unwrap();
        assert_eq!(policy.mastery_degree(), 5);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[storage]
data_dir = "/var/lib/lexdrill"

[practice]
batch_size = 5
shuffle = true

[[review.intervals]]
degree = 0
hours = 1

[[review.intervals]]
degree = 3
hours = 24

[[review.intervals]]
degree = 5
mastered = true
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/var/lib/lexdrill"))
        );
        assert_eq!(config.practice.batch_size, 5);
        assert!(config.practice.shuffle);
        assert_eq!(
            config.review.intervals,
            vec![
                IntervalEntry::wait(0, 1),
                IntervalEntry::wait(3, 24),
                IntervalEntry::mastery(5),
            ]
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[practice]\nbatch_size = 3\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.practice.batch_size, 3);
        assert!(!config.practice.shuffle);
        assert_eq!(config.review, ReviewConfig::default());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is [not valid").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, DrillError::Config { .. }));
    }

    #[test]
    #[serial]
    fn test_load_explicit_missing_path_fails() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    #[serial]
    fn test_load_without_file_uses_defaults() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("LEXDRILL_HOME", dir.path());

        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_reads_home_config() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("LEXDRILL_HOME", dir.path());
        fs::write(dir.path().join("config.toml"), "[practice]\nbatch_size = 7\n").unwrap();

        let config = Config::load(None).unwrap();
        assert_eq!(config.practice.batch_size, 7);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("LEXDRILL_HOME", dir.path());
        env::set_var("LEXDRILL_BATCH_SIZE", "4");
        env::set_var("LEXDRILL_SHUFFLE", "1");
        env::set_var("LEXDRILL_DATA_DIR", "/srv/words");

        let config = Config::load(None).unwrap();
        assert_eq!(config.practice.batch_size, 4);
        assert!(config.practice.shuffle);
        assert_eq!(config.data_dir(), Some(PathBuf::from("/srv/words")));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_batch_size_ignored() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("LEXDRILL_HOME", dir.path());

        env::set_var("LEXDRILL_BATCH_SIZE", "0");
        assert_eq!(Config::load(None).unwrap().practice.batch_size, 10);

        env::set_var("LEXDRILL_BATCH_SIZE", "many");
        assert_eq!(Config::load(None).unwrap().practice.batch_size, 10);

        clear_env();
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = Config::default();
        config.practice.batch_size = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            DrillError::Config { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_empty_interval_table() {
        let mut config = Config::default();
        config.review.intervals.clear();
        assert!(matches!(
            config.validate().unwrap_err(),
            DrillError::Config { .. }
        ));
    }

    #[test]
    #[serial]
    fn test_lexdrill_home_with_env() {
        clear_env();
        env::set_var("LEXDRILL_HOME", "/custom/lexdrill");
        assert_eq!(lexdrill_home(), Some(PathBuf::from("/custom/lexdrill")));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_lexdrill_home_empty_env_falls_back() {
        clear_env();
        env::set_var("LEXDRILL_HOME", "");
        let home = lexdrill_home().unwrap();
        assert!(home.ends_with(".lexdrill") || home.ends_with("lexdrill"));
        clear_env();
    }

    #[test]
    fn test_derived_paths() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/data"));
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/data/lexdrill.db"))
        );
        assert_eq!(
            config.definitions_dir(),
            Some(PathBuf::from("/data/definitions"))
        );
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.practice.batch_size = 12;
        config.save(&path).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join(".config.toml.tmp").exists());
        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
