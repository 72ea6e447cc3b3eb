//! File-based definition cache for lexdrill.
//!
//! Definitions are stored as JSON files in `<data_dir>/definitions/`.
//! Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::core::validate_word;
use crate::error::{DrillError, Result};
use crate::lookup::{Definition, Lookup};

/// File-based definition cache.
///
/// Also serves as a `Lookup` over whatever it already holds.
#[derive(Debug, Clone)]
pub struct FileDefinitionCache {
    /// Directory where definition files are stored.
    dir: PathBuf,
}

impl FileDefinitionCache {
    /// Create a cache in `dir`, creating the directory if needed.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| DrillError::storage(&dir, e))?;
        }

        Ok(Self { dir })
    }

    /// Get the path for a definition file.
    ///
    /// Words are validated first so they can't escape the cache directory.
    fn definition_path(&self, word: &str) -> Result<PathBuf> {
        let word = validate_word(word)?;
        Ok(self.dir.join(format!("{}.json", word)))
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, word: &str) -> Result<PathBuf> {
        let word = validate_word(word)?;
        Ok(self.dir.join(format!(".{}.json.tmp", word)))
    }

    /// Retrieve a cached definition.
    ///
    /// Returns `Ok(None)` on a cache miss.
    pub fn get(&self, word: &str) -> Result<Option<Definition>> {
        let path = self.definition_path(word)?;

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| DrillError::storage(&path, e))?;
        let definition: Definition = serde_json::from_str(&content)?;

        Ok(Some(definition))
    }

    /// Store a definition, replacing any cached one.
    pub fn put(&self, definition: &Definition) -> Result<()> {
        let final_path = self.definition_path(&definition.word)?;
        let temp_path = self.temp_path(&definition.word)?;

        let json = serde_json::to_string_pretty(definition)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| DrillError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| DrillError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| DrillError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path).map_err(|e| DrillError::storage(&final_path, e))?;

        Ok(())
    }

    /// Remove a cached definition. Missing entries are not an error.
    pub fn remove(&self, word: &str) -> Result<()> {
        let path = self.definition_path(word)?;
        if path.exists() {
            fs::remove_file(&path).map_err(|e| DrillError::storage(&path, e))?;
        }

        let temp_path = self.temp_path(word)?;
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}

impl Lookup for FileDefinitionCache {
    fn name(&self) -> &'static str {
        "file-cache"
    }

    fn fetch(&self, word: &str) -> Result<Definition> {
        self.get(word)?
            .ok_or_else(|| DrillError::definition_not_found(word))
    }
}
