//! Pairwise agreement scoring.
//!
//! For each ordered pair of distinct projects `(p1, p2)`, every cluster of a
//! document is classified by which of the two projects have members in it:
//!
//! | p1 present | p2 present | Counted as |
//! |------------|------------|------------|
//! | yes | yes | `shared_spans` |
//! | yes | no  | `spans_in_1_not_2` |
//! | no  | yes | `spans_in_2_not_1` |
//! | no  | no  | (not counted) |
//!
//! Shared clusters are then checked for agreement on linked identifiers and
//! on categories: a cluster agrees when any value of any `p1` member equals
//! any value of any `p2` member.
//!
//! # Example
//!
//! ```
//! use concord::{cluster_document, AgreementScorer, ProjectFilter};
//! use concord::{Denotation, DocumentRecord, Track};
//!
//! let doc = DocumentRecord::new("doc1", "aspirin dose")
//!     .with_track(Track::new("a").with_denotation(
//!         Denotation::new("T1", 0, 5, "aspir").with_obj("Drug").with_link_id("X1")))
//!     .with_track(Track::new("b").with_denotation(
//!         Denotation::new("T1", 2, 6, "piri").with_obj("Drug").with_link_id("X1")));
//!
//! let filter = ProjectFilter::allow_all();
//! let clusters = cluster_document(&doc, &filter);
//! let mut scorer = AgreementScorer::new(filter.clone());
//! let partial = scorer.score(&doc, &clusters);
//!
//! let ab = partial.pair("a", "b").unwrap();
//! assert_eq!(ab.shared_spans, 1);
//! assert_eq!(ab.identical_link_ids, 1);
//! ```

use std::collections::BTreeSet;

use concord_core::DocumentRecord;
use serde::{Deserialize, Serialize};

use crate::aggregate::RunResult;
use crate::cluster::{cluster_document, SpanCluster, SpanClusters};
use crate::filter::ProjectFilter;

/// Agreement counters between two projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairwiseResult {
    /// Clusters containing at least one of the two projects
    pub total_spans: u64,
    /// Clusters containing both
    pub shared_spans: u64,
    /// Clusters containing only the first project
    pub spans_in_1_not_2: u64,
    /// Clusters containing only the second project
    pub spans_in_2_not_1: u64,
    /// Shared clusters where the projects have a link id in common
    pub identical_link_ids: u64,
    /// Shared clusters where the projects have a category in common
    pub identical_obj: u64,
}

impl PairwiseResult {
    /// Whether `shared + in_1 + in_2 == total` and agreement counts fit in `shared`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let split = self
            .shared_spans
            .checked_add(self.spans_in_1_not_2)
            .and_then(|s| s.checked_add(self.spans_in_2_not_1));
        split == Some(self.total_spans)
            && self.identical_link_ids <= self.shared_spans
            && self.identical_obj <= self.shared_spans
    }

    /// Counter-wise sum, `None` on overflow.
    #[must_use]
    pub fn checked_add(&self, other: &PairwiseResult) -> Option<PairwiseResult> {
        Some(PairwiseResult {
            total_spans: self.total_spans.checked_add(other.total_spans)?,
            shared_spans: self.shared_spans.checked_add(other.shared_spans)?,
            spans_in_1_not_2: self.spans_in_1_not_2.checked_add(other.spans_in_1_not_2)?,
            spans_in_2_not_1: self.spans_in_2_not_1.checked_add(other.spans_in_2_not_1)?,
            identical_link_ids: self.identical_link_ids.checked_add(other.identical_link_ids)?,
            identical_obj: self.identical_obj.checked_add(other.identical_obj)?,
        })
    }

    /// The same counts seen from the other project's side.
    #[must_use]
    pub fn swapped(&self) -> PairwiseResult {
        PairwiseResult {
            spans_in_1_not_2: self.spans_in_2_not_1,
            spans_in_2_not_1: self.spans_in_1_not_2,
            ..*self
        }
    }
}

/// Compare two projects over one document's clusters.
#[must_use]
pub fn compare_pair(clusters: &SpanClusters, first: &str, second: &str) -> PairwiseResult {
    let mut result = PairwiseResult::default();
    for cluster in clusters.iter() {
        match (cluster.has_project(first), cluster.has_project(second)) {
            (true, true) => {
                result.shared_spans += 1;
                if links_agree(cluster, first, second) {
                    result.identical_link_ids += 1;
                }
                if categories_agree(cluster, first, second) {
                    result.identical_obj += 1;
                }
            }
            (true, false) => result.spans_in_1_not_2 += 1,
            (false, true) => result.spans_in_2_not_1 += 1,
            (false, false) => continue,
        }
        result.total_spans += 1;
    }
    debug_assert!(result.is_consistent());
    result
}

fn links_agree(cluster: &SpanCluster, first: &str, second: &str) -> bool {
    cluster.members_of(first).any(|a| {
        cluster
            .members_of(second)
            .any(|b| a.denotation.link_ids.iter().any(|id| b.denotation.link_ids.contains(id)))
    })
}

fn categories_agree(cluster: &SpanCluster, first: &str, second: &str) -> bool {
    cluster.members_of(first).any(|a| {
        cluster
            .members_of(second)
            .any(|b| a.denotation.obj.iter().any(|o| b.denotation.obj.contains(o)))
    })
}

/// Per-run scoring state: the project filter and every project name seen so far.
///
/// Pairs are formed over all names seen by this scorer, not only the names in
/// the current document. A pair with one project missing from the document
/// still collects the other project's clusters as one-sided; a pair with
/// both missing gets a zero entry.
#[derive(Debug, Clone, Default)]
pub struct AgreementScorer {
    filter: ProjectFilter,
    seen: BTreeSet<String>,
}

impl AgreementScorer {
    /// Scorer with the given filter.
    #[must_use]
    pub fn new(filter: ProjectFilter) -> Self {
        Self {
            filter,
            seen: BTreeSet::new(),
        }
    }

    /// The project filter.
    #[must_use]
    pub fn filter(&self) -> &ProjectFilter {
        &self.filter
    }

    /// Project names seen so far, sorted.
    pub fn seen_projects(&self) -> impl Iterator<Item = &str> {
        self.seen.iter().map(String::as_str)
    }

    /// Score one document's clusters, returning that document's contribution.
    pub fn score(&mut self, document: &DocumentRecord, clusters: &SpanClusters) -> RunResult {
        for track in &document.tracks {
            if self.filter.allows(&track.project) && !self.seen.contains(&track.project) {
                log::debug!("{}: new project '{}'", document.source_url, track.project);
                self.seen.insert(track.project.clone());
            }
        }

        let mut partial = RunResult::new();
        for first in &self.seen {
            for second in &self.seen {
                if first == second {
                    continue;
                }
                partial.record(first, second, compare_pair(clusters, first, second));
            }
        }
        partial
    }

    /// Cluster then score one document.
    pub fn score_document(&mut self, document: &DocumentRecord) -> (SpanClusters, RunResult) {
        let clusters = cluster_document(document, &self.filter);
        let partial = self.score(document, &clusters);
        (clusters, partial)
    }
}
