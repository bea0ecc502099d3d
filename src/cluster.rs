//! Overlap-based span clustering.
//!
//! Denotations from every track of a document are grouped into clusters keyed
//! by a `(begin, end)` span. Processing order is fixed: tracks in document
//! order, denotations in track order. Each denotation is appended to **every**
//! existing cluster whose key span overlaps its own; if none does, it opens a
//! new cluster keyed by its own span.
//!
//! ```text
//! track a:  [0────5]                 [12──15]
//! track b:     [2────6]     [9─10]
//!
//! clusters: 0_5  -> a(0,5), b(2,6)
//!           9_10 -> b(9,10)
//!           12_15 -> a(12,15)
//! ```
//!
//! Clusters are never merged with each other. A denotation that bridges two
//! clusters created earlier is registered in both, and the two clusters stay
//! separate. Scoring counts depend on this, so it is kept as is.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use concord_core::{Denotation, DocumentRecord, TextSpan};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::filter::ProjectFilter;

/// Category assigned by linkers when nothing more specific is known.
pub const GENERIC_CATEGORY: &str = "biolink:NamedThing";

/// Key of a span cluster: the span of the denotation that opened it.
///
/// The text form is `"{begin}_{end}"`, which is also how keys appear in
/// serialized cluster dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterKey {
    /// Start offset
    pub begin: u64,
    /// End offset
    pub end: u64,
}

impl ClusterKey {
    /// Key for a span.
    #[must_use]
    pub const fn new(begin: u64, end: u64) -> Self {
        Self { begin, end }
    }

    /// The key as a span.
    #[must_use]
    pub const fn span(&self) -> TextSpan {
        TextSpan::new(self.begin, self.end)
    }
}

impl From<TextSpan> for ClusterKey {
    fn from(span: TextSpan) -> Self {
        Self::new(span.begin, span.end)
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.begin, self.end)
    }
}

impl FromStr for ClusterKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed =
            || Error::invariant(format!("cluster key '{}' is incorrectly formatted", s));
        let (begin, end) = s.split_once('_').ok_or_else(malformed)?;
        let parse = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<u64>().map_err(|_| malformed())
        };
        Ok(Self::new(parse(begin)?, parse(end)?))
    }
}

impl Serialize for ClusterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClusterKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A denotation together with the project that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedDenotation {
    /// Position in the document's processing order (0-based)
    pub ordinal: usize,
    /// Originating project
    pub project: String,
    /// The denotation itself
    pub denotation: Denotation,
}

impl TaggedDenotation {
    /// Whether the categories include the generic fallback category.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.denotation.obj.iter().any(|o| o == GENERIC_CATEGORY)
    }
}

/// Denotations grouped under one key span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanCluster {
    key: ClusterKey,
    members: Vec<TaggedDenotation>,
}

impl SpanCluster {
    fn open(key: ClusterKey, first: TaggedDenotation) -> Self {
        Self {
            key,
            members: vec![first],
        }
    }

    /// Cluster key.
    #[must_use]
    pub fn key(&self) -> ClusterKey {
        self.key
    }

    /// Members in the order they were registered.
    #[must_use]
    pub fn members(&self) -> &[TaggedDenotation] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for clusters produced by [`SpanClusterer`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members produced by `project`.
    pub fn members_of<'a>(
        &'a self,
        project: &'a str,
    ) -> impl Iterator<Item = &'a TaggedDenotation> + 'a {
        self.members.iter().filter(move |m| m.project == project)
    }

    /// Whether at least one member comes from `project`.
    #[must_use]
    pub fn has_project(&self, project: &str) -> bool {
        self.members.iter().any(|m| m.project == project)
    }

    /// Distinct projects with members here.
    #[must_use]
    pub fn projects(&self) -> BTreeSet<&str> {
        self.members.iter().map(|m| m.project.as_str()).collect()
    }
}

/// All clusters of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanClusters {
    denotation_count: usize,
    clusters: BTreeMap<ClusterKey, SpanCluster>,
}

impl SpanClusters {
    /// Parse a JSON cluster dump (as written by `concord clusters --format json`).
    ///
    /// Keys that are not `"{begin}_{end}"`, or a map key that differs from
    /// the cluster's own key, are an invariant violation.
    pub fn from_json(json: &str) -> Result<Self> {
        let clusters: SpanClusters = serde_json::from_str(json)
            .map_err(|e| Error::invariant(format!("bad cluster dump: {}", e)))?;
        for (key, cluster) in &clusters.clusters {
            if *key != cluster.key {
                return Err(Error::invariant(format!(
                    "cluster dump lists cluster {} under key {}",
                    cluster.key, key
                )));
            }
        }
        Ok(clusters)
    }

    /// Number of denotations that went through the clusterer.
    #[must_use]
    pub fn denotation_count(&self) -> usize {
        self.denotation_count
    }

    /// Number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True when the document had no (unfiltered) denotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Look up a cluster by key.
    #[must_use]
    pub fn get(&self, key: &ClusterKey) -> Option<&SpanCluster> {
        self.clusters.get(key)
    }

    /// Clusters ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = &SpanCluster> {
        self.clusters.values()
    }

    /// Clusters holding more than one denotation.
    pub fn multi_member(&self) -> impl Iterator<Item = &SpanCluster> {
        self.clusters.values().filter(|c| c.len() > 1)
    }
}

/// Document-scoped clustering state.
///
/// Create one per document, feed it denotations, then call [`finish`](Self::finish).
#[derive(Debug)]
pub struct SpanClusterer<'f> {
    filter: &'f ProjectFilter,
    clusters: BTreeMap<ClusterKey, SpanCluster>,
    next_ordinal: usize,
}

impl<'f> SpanClusterer<'f> {
    /// Empty clusterer honouring `filter`.
    #[must_use]
    pub fn new(filter: &'f ProjectFilter) -> Self {
        Self {
            filter,
            clusters: BTreeMap::new(),
            next_ordinal: 0,
        }
    }

    /// Register every denotation of every allowed track, in document order.
    pub fn add_document(&mut self, document: &DocumentRecord) {
        for track in &document.tracks {
            if !self.filter.allows(&track.project) {
                log::debug!("{}: skipping filtered track '{}'", document.source_url, track.project);
                continue;
            }
            for denotation in &track.denotations {
                self.add(&track.project, denotation);
            }
        }
    }

    /// Register one denotation.
    ///
    /// Returns the keys of the clusters it ended up in. Denotations from
    /// filtered projects are ignored and return no keys.
    pub fn add(&mut self, project: &str, denotation: &Denotation) -> Vec<ClusterKey> {
        if !self.filter.allows(project) {
            return Vec::new();
        }

        let tagged = TaggedDenotation {
            ordinal: self.next_ordinal,
            project: project.to_string(),
            denotation: denotation.clone(),
        };
        self.next_ordinal += 1;

        let span = denotation.span;
        let mut matched = Vec::new();
        for cluster in self.clusters.values_mut() {
            if span.overlaps(&cluster.key.span()) {
                cluster.members.push(tagged.clone());
                matched.push(cluster.key);
            }
        }

        if matched.is_empty() {
            let key = ClusterKey::from(span);
            log::debug!("opening cluster {} for {} '{}'", key, project, denotation.text);
            self.clusters.insert(key, SpanCluster::open(key, tagged));
            matched.push(key);
        } else if matched.len() > 1 {
            log::debug!(
                "{} '{}' ({}) registered in {} clusters",
                project,
                denotation.text,
                ClusterKey::from(span),
                matched.len()
            );
        }
        matched
    }

    /// Hand over the clusters built so far.
    #[must_use]
    pub fn finish(self) -> SpanClusters {
        SpanClusters {
            denotation_count: self.next_ordinal,
            clusters: self.clusters,
        }
    }
}

/// Cluster one document.
#[must_use]
pub fn cluster_document(document: &DocumentRecord, filter: &ProjectFilter) -> SpanClusters {
    let mut clusterer = SpanClusterer::new(filter);
    clusterer.add_document(document);
    clusterer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::Track;

    fn doc(tracks: &[(&str, &[(u64, u64)])]) -> DocumentRecord {
        let mut record = DocumentRecord::new("test", "");
        for (project, spans) in tracks {
            let mut track = Track::new(*project);
            for (i, (b, e)) in spans.iter().enumerate() {
                track = track.with_denotation(Denotation::new(format!("T{}", i), *b, *e, ""));
            }
            record = record.with_track(track);
        }
        record
    }

    fn cluster_all(record: &DocumentRecord) -> SpanClusters {
        cluster_document(record, &ProjectFilter::allow_all())
    }

    #[test]
    fn test_overlapping_spans_share_a_cluster() {
        let clusters = cluster_all(&doc(&[("a", &[(0, 5)]), ("b", &[(2, 6)])]));
        assert_eq!(clusters.len(), 1);
        let cluster = clusters.get(&ClusterKey::new(0, 5)).unwrap();
        assert_eq!(cluster.len(), 2);
        assert!(cluster.has_project("a") && cluster.has_project("b"));
    }

    #[test]
    fn test_touching_spans_share_a_cluster() {
        let clusters = cluster_all(&doc(&[("a", &[(0, 5)]), ("b", &[(5, 10)])]));
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn test_disjoint_spans_open_separate_clusters() {
        let clusters = cluster_all(&doc(&[("a", &[(0, 5)]), ("b", &[(10, 15)])]));
        assert_eq!(clusters.len(), 2);
        assert!(clusters.get(&ClusterKey::new(10, 15)).unwrap().has_project("b"));
    }

    #[test]
    fn test_bridging_denotation_joins_both_clusters_without_merging() {
        let clusters = cluster_all(&doc(&[("a", &[(0, 3), (8, 12)]), ("b", &[(2, 9)])]));
        assert_eq!(clusters.len(), 2);
        let left = clusters.get(&ClusterKey::new(0, 3)).unwrap();
        let right = clusters.get(&ClusterKey::new(8, 12)).unwrap();
        assert!(left.has_project("b"));
        assert!(right.has_project("b"));
        assert_eq!(left.members_of("b").next().unwrap().ordinal, 2);
        assert_eq!(right.members_of("b").next().unwrap().ordinal, 2);
        assert_eq!(clusters.denotation_count(), 3);
    }

    #[test]
    fn test_key_is_the_opening_span_not_the_union() {
        let filter = ProjectFilter::allow_all();
        let mut clusterer = SpanClusterer::new(&filter);
        clusterer.add("a", &Denotation::new("1", 10, 20, ""));
        // Overlaps (10,20) and is absorbed, but the key stays (10,20).
        clusterer.add("b", &Denotation::new("2", 18, 30, ""));
        // Overlaps (18,30) but not the key (10,20): opens a new cluster.
        let keys = clusterer.add("c", &Denotation::new("3", 25, 28, ""));
        assert_eq!(keys, vec![ClusterKey::new(25, 28)]);
        let clusters = clusterer.finish();
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_filtered_tracks_are_skipped() {
        let filter: ProjectFilter = ["a"].into_iter().collect();
        let clusters = cluster_document(&doc(&[("a", &[(0, 5)]), ("b", &[(2, 6)])]), &filter);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters.denotation_count(), 1);
        assert!(!clusters.iter().any(|c| c.has_project("b")));
    }

    #[test]
    fn test_multi_member_listing() {
        let clusters = cluster_all(&doc(&[("a", &[(0, 5), (20, 25)]), ("b", &[(2, 6)])]));
        let multi: Vec<_> = clusters.multi_member().map(|c| c.key()).collect();
        assert_eq!(multi, vec![ClusterKey::new(0, 5)]);
    }

    #[test]
    fn test_generic_category_flag() {
        let tagged = TaggedDenotation {
            ordinal: 0,
            project: "a".into(),
            denotation: Denotation::new("1", 0, 1, "x").with_obj(GENERIC_CATEGORY),
        };
        assert!(tagged.is_generic());
    }

    #[test]
    fn test_cluster_key_text_form() {
        let key: ClusterKey = "12_20".parse().unwrap();
        assert_eq!(key, ClusterKey::new(12, 20));
        assert_eq!(key.to_string(), "12_20");
        for bad in ["12-20", "12_", "_20", "a_b", "12_20_3", "-1_4", ""] {
            let err = bad.parse::<ClusterKey>().unwrap_err();
            assert!(matches!(err, Error::InvariantViolation(_)), "{bad}");
        }
    }

    #[test]
    fn test_cluster_dump_round_trip_and_bad_key() {
        let clusters = cluster_all(&doc(&[("a", &[(0, 5)]), ("b", &[(2, 6)])]));
        let json = serde_json::to_string(&clusters).unwrap();
        assert!(json.contains("\"0_5\""));
        assert_eq!(SpanClusters::from_json(&json).unwrap(), clusters);

        let broken = json.replacen("\"0_5\"", "\"0to5\"", 1);
        assert!(matches!(
            SpanClusters::from_json(&broken),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_cluster_dump_key_mismatch() {
        let clusters = cluster_all(&doc(&[("a", &[(0, 5)]), ("b", &[(2, 6)])]));
        let json = serde_json::to_string(&clusters).unwrap();
        // The map key comes before the embedded "key" field.
        let moved = json.replacen("\"0_5\"", "\"7_9\"", 1);
        assert!(moved.contains("\"key\":\"0_5\""));
        let err = SpanClusters::from_json(&moved).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert!(err.to_string().contains("under key 7_9"));
    }
}
