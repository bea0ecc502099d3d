//! Project (track name) filter.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of project names allowed to take part in clustering and scoring.
///
/// An empty filter allows every project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectFilter {
    names: BTreeSet<String>,
}

impl ProjectFilter {
    /// Filter that allows everything.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Whether `project` participates.
    #[must_use]
    pub fn allows(&self, project: &str) -> bool {
        self.names.is_empty() || self.names.contains(project)
    }

    /// True when no names are set (no filtering).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Allowed names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ProjectFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
