//! Annotated document records.
//!
//! One record per JSONL line:
//!
//! ```text
//! {"source_url": "...", "text": "...",
//!  "tracks": [{"project": "medtype", "denotations": [
//!     {"id": "T1", "obj": ["biolink:Drug"], "span": {"begin": 0, "end": 7},
//!      "link_ids": ["CHEBI:15365"], "text": "aspirin"}]}]}
//! ```
//!
//! `tracks` may also be a single track object, and `obj` a single string.
//! Both are normalized to sequences during deserialization.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Half-open character span `[begin, end)` of a denotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    /// Start offset (inclusive)
    pub begin: u64,
    /// End offset (exclusive)
    pub end: u64,
}

impl TextSpan {
    /// Create a span.
    #[must_use]
    pub const fn new(begin: u64, end: u64) -> Self {
        Self { begin, end }
    }

    /// Whether two spans overlap for clustering purposes.
    ///
    /// Both endpoints are compared inclusively (`b <= e && d >= s`), so spans
    /// that touch at a boundary offset count as overlapping:
    ///
    /// ```
    /// use concord_core::TextSpan;
    ///
    /// assert!(TextSpan::new(0, 5).overlaps(&TextSpan::new(5, 10)));
    /// assert!(!TextSpan::new(0, 5).overlaps(&TextSpan::new(6, 10)));
    /// ```
    #[must_use]
    pub const fn overlaps(&self, other: &TextSpan) -> bool {
        self.begin <= other.end && self.end >= other.begin
    }

    /// Span length in offsets.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end.saturating_sub(self.begin)
    }

    /// True for zero-width spans.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single annotated span: category, linked identifiers, surface text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denotation {
    /// Identifier within the track (not necessarily unique across tracks)
    #[serde(default)]
    pub id: String,
    /// Categories assigned to the span
    #[serde(default, deserialize_with = "nullable_one_or_many")]
    pub obj: Vec<String>,
    /// Character span
    pub span: TextSpan,
    /// Linked knowledge-base identifiers
    #[serde(default, deserialize_with = "nullable_list")]
    pub link_ids: Vec<String>,
    /// Surface text
    #[serde(default)]
    pub text: String,
}

impl Denotation {
    /// Create a denotation with no categories or links.
    #[must_use]
    pub fn new(id: impl Into<String>, begin: u64, end: u64, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            obj: Vec::new(),
            span: TextSpan::new(begin, end),
            link_ids: Vec::new(),
            text: text.into(),
        }
    }

    /// Add a category.
    #[must_use]
    pub fn with_obj(mut self, category: impl Into<String>) -> Self {
        self.obj.push(category.into());
        self
    }

    /// Add a linked identifier.
    #[must_use]
    pub fn with_link_id(mut self, link_id: impl Into<String>) -> Self {
        self.link_ids.push(link_id.into());
        self
    }
}

/// A named set of denotations produced by one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Project name, unique within a document
    pub project: String,
    /// Denotations in production order
    pub denotations: Vec<Denotation>,
}

impl Track {
    /// Create an empty track.
    #[must_use]
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            denotations: Vec::new(),
        }
    }

    /// Append a denotation.
    #[must_use]
    pub fn with_denotation(mut self, denotation: Denotation) -> Self {
        self.denotations.push(denotation);
        self
    }
}

/// One annotated document: the text plus every track attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Where the document came from
    #[serde(default)]
    pub source_url: String,
    /// Document text
    #[serde(default)]
    pub text: String,
    /// Annotation tracks, always a sequence after deserialization
    #[serde(deserialize_with = "one_or_many")]
    pub tracks: Vec<Track>,
}

impl DocumentRecord {
    /// Create a record with no tracks.
    #[must_use]
    pub fn new(source_url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            text: text.into(),
            tracks: Vec::new(),
        }
    }

    /// Append a track.
    #[must_use]
    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Parse one JSONL line.
    ///
    /// `source_name` and `line` only feed the error message. Spans with
    /// `end < begin` are rejected; zero-width spans are kept with a warning.
    pub fn from_json_line(json: &str, source_name: &str, line: usize) -> Result<Self> {
        let record: DocumentRecord = serde_json::from_str(json)
            .map_err(|e| Error::malformed(source_name, line, e.to_string()))?;
        record.check_spans(source_name, line)?;
        Ok(record)
    }

    /// Total denotations across all tracks.
    #[must_use]
    pub fn denotation_count(&self) -> usize {
        self.tracks.iter().map(|t| t.denotations.len()).sum()
    }

    fn check_spans(&self, source_name: &str, line: usize) -> Result<()> {
        for track in &self.tracks {
            for d in &track.denotations {
                if d.span.end < d.span.begin {
                    return Err(Error::malformed(
                        source_name,
                        line,
                        format!(
                            "denotation '{}' in track '{}' has end {} before begin {}",
                            d.id, track.project, d.span.end, d.span.begin
                        ),
                    ));
                }
                if d.span.is_empty() {
                    log::warn!(
                        "{}:{}: zero-width denotation '{}' in track '{}' at {}",
                        source_name,
                        line,
                        d.id,
                        track.project,
                        d.span.begin
                    );
                }
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

fn nullable_one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

fn nullable_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
