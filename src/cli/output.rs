//! Output formatting utilities for CLI commands

use is_terminal::IsTerminal;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Log info message (respects quiet flag)
pub fn log_info(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", msg);
    }
}

/// Write output to file or stdout
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), String> {
    if let Some(path) = path {
        std::fs::write(path, content).map_err(|e| format!("Failed to write to {}: {}", path, e))?;
    } else {
        print!("{}", content);
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }
    Ok(())
}

/// Open the output destination: a file if `path` is given, else stdout.
pub fn open_output(path: Option<&str>) -> Result<Box<dyn Write>, String> {
    match path {
        Some(path) => {
            let file =
                File::create(path).map_err(|e| format!("Failed to create {}: {}", path, e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Whether stdout is an interactive terminal
pub fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Whether stderr is an interactive terminal
pub fn stderr_is_terminal() -> bool {
    io::stderr().is_terminal()
}

/// Wrap text in ANSI escape codes when `enabled`
pub fn color(code: &str, text: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Pluralize a count: `plural(1, "file")` -> "1 file", `plural(3, "file")` -> "3 files"
pub fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "pair"), "1 pair");
        assert_eq!(plural(0, "pair"), "0 pairs");
    }

    #[test]
    fn test_color_only_when_enabled() {
        assert_eq!(color("33", "x", false), "x");
        assert_eq!(color("33", "x", true), "\x1b[33mx\x1b[0m");
    }

    #[test]
    fn test_open_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        {
            let mut out = open_output(path.to_str()).unwrap();
            writeln!(out, "line").unwrap();
            out.flush().unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output("hello\n", path.to_str()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
