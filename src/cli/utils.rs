//! Utility functions for CLI commands

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::config::ScoreConfig;
use crate::ingest::{collect_input_files, InputSource};

/// Load the config file (explicit path, user config, or defaults).
pub fn load_config(path: Option<&Path>) -> Result<ScoreConfig, String> {
    ScoreConfig::load_or_default(path).map_err(|e| e.to_string())
}

/// Resolve the INPUT argument.
pub fn resolve_input(input: &str) -> Result<InputSource, String> {
    InputSource::resolve(input).map_err(|e| e.to_string())
}

/// Open every stream behind `source`, labelled for error messages.
///
/// Directories are scanned with `pattern`; files come back in sorted order.
pub fn open_streams(
    source: &InputSource,
    pattern: &str,
) -> Result<Vec<(String, Box<dyn BufRead>)>, String> {
    let open = |path: &PathBuf| -> Result<(String, Box<dyn BufRead>), String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
        let reader: Box<dyn BufRead> = Box::new(BufReader::new(file));
        Ok((path.display().to_string(), reader))
    };
    match source {
        InputSource::Stdin => {
            let reader: Box<dyn BufRead> = Box::new(io::stdin().lock());
            Ok(vec![("-".to_string(), reader)])
        }
        InputSource::File(path) => Ok(vec![open(path)?]),
        InputSource::Directory(dir) => collect_input_files(dir, pattern)
            .map_err(|e| e.to_string())?
            .iter()
            .map(open)
            .collect(),
    }
}
