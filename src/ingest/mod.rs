//! Record ingestion.
//!
//! Turns JSONL files, directories of JSONL files, or stdin into a stream of
//! normalized [`DocumentRecord`](concord_core::DocumentRecord)s.

pub mod reader;
pub mod source;

pub use reader::RecordReader;
pub use source::{collect_input_files, InputSource, DEFAULT_PATTERN};
