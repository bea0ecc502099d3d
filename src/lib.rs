//! # concord
//!
//! Agreement scoring for independently produced span annotations.
//!
//! A document carries several *tracks* of denotations (spans with categories
//! and linked identifiers), one per annotating project. concord groups
//! overlapping denotations across tracks into span clusters, then counts, for
//! every ordered pair of projects, how often they mark the same region and
//! how often they agree on identifiers and categories there.
//!
//! ```text
//! JSONL records ──► SpanClusterer ──► AgreementScorer ──► RunResult::merge ──► Reporter
//!   (per line)       (per document)     (per document)      (per file, run)
//! ```
//!
//! - [`cluster`]: overlap clustering of one document
//! - [`score`]: pairwise counters for one document
//! - [`aggregate`]: commutative merging into the run-wide matrix
//! - [`ingest`]: JSONL reading and directory scans
//! - [`report`]: percentage tables, markdown, TSV, JSON
//!
//! ## Quick start
//!
//! ```rust
//! use concord::{pipeline, Reporter, ReportFormat, ScoreConfig};
//! use std::io::Cursor;
//!
//! let jsonl = r#"{"tracks":[{"project":"a","denotations":[{"span":{"begin":0,"end":5},"obj":"Drug"}]},{"project":"b","denotations":[{"span":{"begin":3,"end":9},"obj":"Drug"}]}]}"#;
//! let run = pipeline::score_reader(Cursor::new(jsonl), "inline", &ScoreConfig::new()).unwrap();
//!
//! assert_eq!(run.pair("a", "b").unwrap().shared_spans, 1);
//! println!("{}", Reporter::new(ReportFormat::Markdown).render(&run).unwrap());
//! ```

#![warn(missing_docs)]

pub mod aggregate;
pub mod cluster;
pub mod config;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod score;

#[cfg(feature = "cli")]
pub mod cli;

pub use aggregate::RunResult;
pub use cluster::{
    cluster_document, ClusterKey, SpanCluster, SpanClusterer, SpanClusters, TaggedDenotation,
};
pub use config::ScoreConfig;
pub use error::{Error, Result};
pub use filter::ProjectFilter;
pub use report::{PairReport, ReportFormat, Reporter};
pub use score::{compare_pair, AgreementScorer, PairwiseResult};

// Record types live in concord-core.
pub use concord_core::{Denotation, DocumentRecord, TextSpan, Track};
