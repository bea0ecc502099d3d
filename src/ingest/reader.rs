//! Line-by-line JSONL record reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use concord_core::{DocumentRecord, Error as RecordError};

use crate::error::Result;

/// Iterator over the records of one JSONL stream.
///
/// Blank lines are skipped. A line that does not parse yields an error, after
/// which the caller is expected to stop; there is no skip-and-continue.
#[derive(Debug)]
pub struct RecordReader<R> {
    reader: R,
    buf: Vec<u8>,
    source_name: String,
    line_no: usize,
    limit: Option<usize>,
    emitted: usize,
}

impl<R: BufRead> RecordReader<R> {
    /// Read records from `reader`; `source_name` labels error messages.
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            source_name: source_name.into(),
            line_no: 0,
            limit: None,
            emitted: 0,
        }
    }

    /// Stop after `limit` records (`None` reads everything).
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Name used in error messages.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Records produced so far.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl RecordReader<BufReader<File>> {
    /// Open a JSONL file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<DocumentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.limit.is_some_and(|limit| self.emitted >= limit) {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_no += 1;
            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(RecordError::malformed(
                        self.source_name.as_str(),
                        self.line_no,
                        format!("invalid UTF-8: {}", e),
                    )
                    .into()))
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            log::debug!(
                "{}:{}: {}",
                self.source_name,
                self.line_no,
                trimmed.chars().take(100).collect::<String>()
            );
            self.emitted += 1;
            return Some(
                DocumentRecord::from_json_line(trimmed, &self.source_name, self.line_no)
                    .map_err(Into::into),
            );
        }
    }
}
