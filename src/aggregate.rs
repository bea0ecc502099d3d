//! Run-wide aggregation of pairwise results.
//!
//! A [`RunResult`] is the agreement matrix for a whole run. Documents and
//! files each produce a partial `RunResult`; partials are folded together with
//! [`RunResult::merge`], which is a counter-wise sum and therefore
//! associative and commutative. Files can be scored independently (and in
//! parallel) and reduced at the end without changing the totals.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::score::PairwiseResult;

/// Agreement matrix: first project → second project → counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResult {
    pairs: BTreeMap<String, BTreeMap<String, PairwiseResult>>,
}

impl RunResult {
    /// Empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no pair has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.values().all(BTreeMap::is_empty)
    }

    /// Number of ordered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.values().map(BTreeMap::len).sum()
    }

    /// Counters for `(first, second)`.
    #[must_use]
    pub fn pair(&self, first: &str, second: &str) -> Option<&PairwiseResult> {
        self.pairs.get(first)?.get(second)
    }

    /// All ordered pairs, sorted by first then second project.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, &PairwiseResult)> {
        self.pairs.iter().flat_map(|(first, row)| {
            row.iter()
                .map(move |(second, result)| (first.as_str(), second.as_str(), result))
        })
    }

    /// Every project name appearing on either side of a pair.
    #[must_use]
    pub fn projects(&self) -> BTreeSet<&str> {
        self.pairs()
            .flat_map(|(first, second, _)| [first, second])
            .collect()
    }

    /// Add a freshly computed document contribution.
    pub(crate) fn record(&mut self, first: &str, second: &str, result: PairwiseResult) {
        let slot = self
            .pairs
            .entry(first.to_string())
            .or_default()
            .entry(second.to_string())
            .or_default();
        *slot = PairwiseResult {
            total_spans: slot.total_spans + result.total_spans,
            shared_spans: slot.shared_spans + result.shared_spans,
            spans_in_1_not_2: slot.spans_in_1_not_2 + result.spans_in_1_not_2,
            spans_in_2_not_1: slot.spans_in_2_not_1 + result.spans_in_2_not_1,
            identical_link_ids: slot.identical_link_ids + result.identical_link_ids,
            identical_obj: slot.identical_obj + result.identical_obj,
        };
    }

    /// Fold `partial` into this matrix.
    ///
    /// Every pair in `partial` is added counter by counter, creating missing
    /// entries at zero. A partial entry whose split does not add up to its
    /// total, or a sum that overflows, is an invariant violation: the run
    /// must be aborted.
    pub fn merge(&mut self, partial: &RunResult) -> Result<()> {
        for (first, second, delta) in partial.pairs() {
            if !delta.is_consistent() {
                return Err(Error::invariant(format!(
                    "inconsistent contribution for ({}, {}): {:?}",
                    first, second, delta
                )));
            }
            let slot = self
                .pairs
                .entry(first.to_string())
                .or_default()
                .entry(second.to_string())
                .or_default();
            *slot = slot.checked_add(delta).ok_or_else(|| {
                Error::invariant(format!("counter overflow merging ({}, {})", first, second))
            })?;
        }
        Ok(())
    }

    /// By-value [`merge`](Self::merge), convenient for folds and reductions.
    pub fn merged(mut self, partial: RunResult) -> Result<RunResult> {
        self.merge(&partial)?;
        Ok(self)
    }
}
