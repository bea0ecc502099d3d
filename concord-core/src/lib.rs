//! # concord-core
//!
//! Record types shared by the concord crates.
//!
//! This crate provides:
//! - **Records**: `DocumentRecord`, `Track`, `Denotation`, `TextSpan`
//! - **Parsing**: one JSON line in, one normalized record out
//!
//! Upstream annotation formats disagree on a few shapes (a lone track object
//! instead of a list, a bare category string instead of a list). Those are
//! normalized here so the scoring crates only ever see sequences.

#![warn(missing_docs)]

pub mod error;
pub mod record;

pub use error::{Error, Result};
pub use record::{Denotation, DocumentRecord, TextSpan, Track};
