//! Scoring configuration.
//!
//! Settings can live in a TOML file:
//!
//! ```toml
//! filter = ["medtype", "scigraph"]
//! limit = 1000
//! format = "markdown"
//! pattern = "**/*.jsonl"
//! jobs = 4
//! ```
//!
//! Command-line flags override file values. Without `--config`, the file at
//! `<config dir>/concord/config.toml` is used when it exists.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::filter::ProjectFilter;
use crate::ingest::DEFAULT_PATTERN;
use crate::report::ReportFormat;

/// Scoring settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreConfig {
    /// Projects to include; empty means all
    pub filter: Vec<String>,
    /// Maximum records read per file; `0` in a file means unlimited
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "zero_is_unlimited")]
    pub limit: Option<usize>,
    /// Report format
    pub format: ReportFormat,
    /// Glob (relative to the input directory) selecting files to score
    pub pattern: String,
    /// Worker threads for directory runs: 0 = one per core, 1 = sequential
    pub jobs: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            filter: Vec::new(),
            limit: None,
            format: ReportFormat::default(),
            pattern: DEFAULT_PATTERN.to_string(),
            jobs: 0,
        }
    }
}

impl ScoreConfig {
    /// Default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&text).map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    /// Load `path` if given, else the user config file if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                log::info!("using config {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Replace the project filter.
    #[must_use]
    pub fn with_filter<S: Into<String>>(mut self, projects: impl IntoIterator<Item = S>) -> Self {
        self.filter = projects.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-file record limit. `0` means unlimited.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = if limit > 0 { Some(limit) } else { None };
        self
    }

    /// Set the report format.
    #[must_use]
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the directory glob.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// The filter as a set.
    #[must_use]
    pub fn project_filter(&self) -> ProjectFilter {
        self.filter.iter().cloned().collect()
    }
}

fn zero_is_unlimited<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<usize>::deserialize(deserializer)?.filter(|&n| n > 0))
}

/// `<config dir>/concord/config.toml`, if the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut dir| {
        dir.push("concord");
        dir.push("config.toml");
        dir
    })
}
