//! Configuration for Memfog
//!
//! Settings live in `~/.memfog/config.json` (or `$MEMFOG_HOME/config.json`).
//! Every field is optional; missing sections fall back to defaults. After the
//! file is read, environment variables override individual values:
//!
//! | Variable                | Field                  |
//! |-------------------------|------------------------|
//! | `MEMFOG_TOP`            | `search.top_n`         |
//! | `MEMFOG_DISPLAY_ORDER`  | `search.display_order` |
//! | `MEMFOG_ON_DUPLICATE`   | `import.on_duplicate`  |
//! | `MEMFOG_EDITOR`         | `editor`               |
//!
//! ```json
//! {
//!     "search": { "top_n": 10, "display_order": "strongest_first" },
//!     "import": { "on_duplicate": "overwrite" },
//!     "editor": "nvim"
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MemfogError, Result};
use crate::selector::DisplayOrder;

/// Default number of ranked records shown per query.
pub const DEFAULT_TOP_N: usize = 10;

/// Search and menu settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of candidates shown per query.
    pub top_n: usize,
    /// Menu order for the ranked shortlist.
    pub display_order: DisplayOrder,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            display_order: DisplayOrder::default(),
        }
    }
}

/// What a forced import does with a record whose title already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Replace keywords and body of the existing record in place.
    #[default]
    Overwrite,
    /// Insert the imported record next to the existing one.
    Duplicate,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "duplicate" => Ok(Self::Duplicate),
            other => Err(format!(
                "unknown duplicate policy '{}' (expected overwrite or duplicate)",
                other
            )),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Duplicate => write!(f, "duplicate"),
        }
    }
}

/// Import settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub on_duplicate: DuplicatePolicy,
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub import: ImportConfig,
    /// Editor command; falls back to `$VISUAL`, `$EDITOR`, then `vi`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Config {
    /// Data home: `$MEMFOG_HOME`, else `~/.memfog`.
    pub fn dir() -> PathBuf {
        if let Some(home) = std::env::var_os("MEMFOG_HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".memfog")
    }

    /// Location of `config.json`.
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// SQLite database holding every record.
    pub fn db_path() -> PathBuf {
        Self::dir().join("data").join("records.db")
    }

    /// Word list excluded from matching, one word per line.
    pub fn exclusions_path() -> PathBuf {
        Self::dir().join("data").join("exclusions.txt")
    }

    /// Load from the default path and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a specific file. A missing or blank file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            MemfogError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            MemfogError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply `MEMFOG_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(top) = lookup("MEMFOG_TOP") {
            self.search.top_n = parse_top_n(&top).map_err(|e| {
                MemfogError::Config(format!("MEMFOG_TOP: {}", e))
            })?;
        }
        if let Some(order) = lookup("MEMFOG_DISPLAY_ORDER") {
            self.search.display_order = order
                .parse()
                .map_err(|e| MemfogError::Config(format!("MEMFOG_DISPLAY_ORDER: {}", e)))?;
        }
        if let Some(policy) = lookup("MEMFOG_ON_DUPLICATE") {
            self.import.on_duplicate = policy
                .parse()
                .map_err(|e| MemfogError::Config(format!("MEMFOG_ON_DUPLICATE: {}", e)))?;
        }
        if let Some(editor) = lookup("MEMFOG_EDITOR").filter(|e| !e.trim().is_empty()) {
            self.editor = Some(editor);
        }
        Ok(())
    }

    /// Editor command to launch for add/edit.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Create the data directory and an empty exclusions file if missing.
    pub fn ensure_dirs() -> Result<()> {
        let data_dir = Self::dir().join("data");
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            MemfogError::Config(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        let exclusions = Self::exclusions_path();
        if !exclusions.exists() {
            std::fs::write(&exclusions, "").map_err(|e| {
                MemfogError::Config(format!(
                    "Failed to create {}: {}",
                    exclusions.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

/// Parse a list size: one or more ASCII digits.
pub fn parse_top_n(value: &str) -> std::result::Result<usize, String> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid list size '{}'", value));
    }
    value
        .parse()
        .map_err(|_| format!("list size '{}' is too large", value))
}
