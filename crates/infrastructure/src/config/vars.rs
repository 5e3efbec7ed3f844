//! `KEY=VALUE` vars file parsing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::ConfigError;

/// Parsed contents of a vars file.
///
/// One `KEY=VALUE` per line, split at the first `=`. Blank lines, `#`
/// comments and lines without `=` are ignored; keys and values are trimmed.
/// A repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarsFile {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl VarsFile {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let vars = Self::parse(path, &text);
        tracing::debug!(path = %path.display(), keys = vars.len(), "loaded vars file");
        Ok(vars)
    }

    /// Parses `text` as if read from `path`.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self {
            path: path.into(),
            entries,
        }
    }

    /// File the entries came from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the value of `key` unless it is absent or empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the value of `key`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` if the key is absent or empty.
    pub fn require(&self, key: &'static str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey {
            key,
            path: self.path.clone(),
        })
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the file had no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
