//! Input resolution: stdin, a single file, or a directory scan.

use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

use crate::error::{Error, Result};

/// Files picked up from a directory when no pattern is configured.
pub const DEFAULT_PATTERN: &str = "**/*.jsonl";

/// Where records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input (`-`)
    Stdin,
    /// One JSONL file
    File(PathBuf),
    /// Every matching file below a directory, each scored on its own
    Directory(PathBuf),
}

impl InputSource {
    /// Classify a command-line input argument.
    pub fn resolve(input: &str) -> Result<Self> {
        if input == "-" {
            return Ok(Self::Stdin);
        }
        let path = PathBuf::from(input);
        if path.is_dir() {
            Ok(Self::Directory(path))
        } else if path.is_file() {
            Ok(Self::File(path))
        } else {
            Err(Error::invalid_input(format!("{}: no such file or directory", input)))
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Stdin => "-".to_string(),
            Self::File(p) | Self::Directory(p) => p.display().to_string(),
        }
    }
}

/// Recursively collect files under `dir` matching `pattern`, sorted by path.
pub fn collect_input_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| Error::invalid_input(format!("{}: path is not UTF-8", dir.display())))?;
    let full = format!("{}/{}", Pattern::escape(dir_str.trim_end_matches('/')), pattern);

    let entries = glob(&full)
        .map_err(|e| Error::invalid_input(format!("invalid pattern '{}': {}", pattern, e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::Io(e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    log::info!("{}: found {} file(s) matching {}", dir.display(), files.len(), pattern);
    Ok(files)
}
