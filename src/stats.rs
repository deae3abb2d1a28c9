//! Derived per-client label statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::Label;

/// Multiset of labels held by one client, as `(label, count)` sorted by label.
///
/// Serializes transparently as a list of `[label, count]` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientStatistics {
    label_counts: Vec<(Label, usize)>,
}

impl ClientStatistics {
    /// Count occurrences of each label.
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = Label>,
    {
        let mut counts: BTreeMap<Label, usize> = BTreeMap::new();
        for label in labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        Self {
            label_counts: counts.into_iter().collect(),
        }
    }

    /// `(label, count)` pairs, ascending by label.
    pub fn label_counts(&self) -> &[(Label, usize)] {
        &self.label_counts
    }

    /// Total samples.
    pub fn total(&self) -> usize {
        self.label_counts.iter().map(|(_, c)| c).sum()
    }

    /// Count for one label (0 if absent).
    pub fn count(&self, label: Label) -> usize {
        self.label_counts
            .binary_search_by_key(&label, |&(l, _)| l)
            .map_or(0, |i| self.label_counts[i].1)
    }

    /// Number of distinct labels.
    pub fn n_labels(&self) -> usize {
        self.label_counts.len()
    }
}
