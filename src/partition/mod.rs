//! Non-IID partitioning of a sample set across simulated clients.
//!
//! Every strategy assigns each sample index to at most one client:
//!
//! | Strategy | Skew | Respects `min_size` |
//! |----------|------|---------------------|
//! | [`label`] | Each client holds exactly `n_class_per_client` classes | No |
//! | [`dirichlet`] | Per-class Dirichlet(alpha) over clients | Yes (bounded retries) |
//! | [`quantity`] | Per-client sample counts from Dirichlet(alpha) | Yes (bounded retries) |
//! | [`uniform`] | None, sizes differ by at most 1 | No |

pub mod dirichlet;
pub mod label;
pub mod quantity;
pub mod uniform;

pub use dirichlet::dirichlet_partition;
pub use label::label_partition;
pub use quantity::dirichlet_quantity_partition;
pub use uniform::uniform_partition;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::{Label, SampleSet};
use crate::error::FedSplitError;
use crate::stats::ClientStatistics;

/// Default bound on whole-dataset sampling attempts for the Dirichlet strategies.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Default minimum number of samples per client.
pub const DEFAULT_MIN_SIZE: usize = 1;

/// Strategy names without their parameters, as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Fixed number of classes per client
    Label,
    /// Class-wise Dirichlet skew
    Dirichlet,
    /// Quantity-only Dirichlet skew
    DirichletQuantity,
    /// IID split
    Uniform,
}

impl StrategyKind {
    /// Every accepted strategy name.
    pub const NAMES: [&'static str; 4] = ["label", "dirichlet", "dirichlet_quantity", "uniform"];

    /// Name used in configs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Label => "label",
            StrategyKind::Dirichlet => "dirichlet",
            StrategyKind::DirichletQuantity => "dirichlet_quantity",
            StrategyKind::Uniform => "uniform",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = FedSplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(StrategyKind::Label),
            "dirichlet" => Ok(StrategyKind::Dirichlet),
            "dirichlet_quantity" => Ok(StrategyKind::DirichletQuantity),
            "uniform" => Ok(StrategyKind::Uniform),
            other => Err(FedSplitError::InvalidStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partitioning strategy together with its required parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Strategy {
    /// Each client holds exactly `n_class_per_client` distinct classes.
    Label {
        /// Classes per client
        n_class_per_client: usize,
    },
    /// For each class, client shares follow Dirichlet(`alpha`).
    Dirichlet {
        /// Concentration; smaller is more skewed
        alpha: f64,
    },
    /// Client sample counts follow Dirichlet(`alpha`), classes ignored.
    DirichletQuantity {
        /// Concentration; smaller is more skewed
        alpha: f64,
    },
    /// Shuffle then split into equal contiguous groups.
    Uniform,
}

impl Strategy {
    /// Build a strategy from its name and the optional parameters.
    ///
    /// Rejects a missing `alpha` for the Dirichlet variants and a missing
    /// `n_class_per_client` for `label`. Parameters the strategy does not use
    /// are ignored.
    pub fn from_parts(
        kind: StrategyKind,
        alpha: Option<f64>,
        n_class_per_client: Option<usize>,
    ) -> Result<Self, FedSplitError> {
        let require_alpha = || {
            alpha.ok_or(FedSplitError::MissingParameter {
                strategy: kind.as_str(),
                parameter: "alpha",
            })
        };
        let strategy = match kind {
            StrategyKind::Label => Strategy::Label {
                n_class_per_client: n_class_per_client.ok_or(FedSplitError::MissingParameter {
                    strategy: kind.as_str(),
                    parameter: "n_class_per_client",
                })?,
            },
            StrategyKind::Dirichlet => Strategy::Dirichlet {
                alpha: require_alpha()?,
            },
            StrategyKind::DirichletQuantity => Strategy::DirichletQuantity {
                alpha: require_alpha()?,
            },
            StrategyKind::Uniform => Strategy::Uniform,
        };
        strategy.validate()?;
        Ok(strategy)
    }

    /// The strategy's name.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Label { .. } => StrategyKind::Label,
            Strategy::Dirichlet { .. } => StrategyKind::Dirichlet,
            Strategy::DirichletQuantity { .. } => StrategyKind::DirichletQuantity,
            Strategy::Uniform => StrategyKind::Uniform,
        }
    }

    /// Dirichlet concentration, if the strategy uses one.
    pub fn alpha(&self) -> Option<f64> {
        match self {
            Strategy::Dirichlet { alpha } | Strategy::DirichletQuantity { alpha } => Some(*alpha),
            _ => None,
        }
    }

    /// Classes per client, if the strategy uses it.
    pub fn n_class_per_client(&self) -> Option<usize> {
        match self {
            Strategy::Label { n_class_per_client } => Some(*n_class_per_client),
            _ => None,
        }
    }

    /// Whether the strategy enforces `min_size` through retries.
    pub fn respects_min_size(&self) -> bool {
        matches!(
            self,
            Strategy::Dirichlet { .. } | Strategy::DirichletQuantity { .. }
        )
    }

    /// Check parameter ranges that do not depend on the dataset.
    pub fn validate(&self) -> Result<(), FedSplitError> {
        match self {
            Strategy::Label { n_class_per_client } if *n_class_per_client == 0 => {
                Err(FedSplitError::invalid("n_class_per_client", "must be >= 1"))
            }
            Strategy::Dirichlet { alpha } | Strategy::DirichletQuantity { alpha }
                if !(alpha.is_finite() && *alpha > 0.0) =>
            {
                Err(FedSplitError::invalid(
                    "alpha",
                    format!("{} (must be finite and > 0)", alpha),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Result of partitioning: which sample indices each client owns.
///
/// Client id is the position in [`clients`](Self::clients). Client sets and
/// [`dropped`](Self::dropped) together cover every sample index exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Partition {
    clients: Vec<Vec<usize>>,
    dropped: Vec<usize>,
}

impl Partition {
    pub(crate) fn new(clients: Vec<Vec<usize>>, mut dropped: Vec<usize>) -> Self {
        dropped.sort_unstable();
        Self { clients, dropped }
    }

    /// Number of clients.
    pub fn n_clients(&self) -> usize {
        self.clients.len()
    }

    /// Sample indices per client.
    pub fn clients(&self) -> &[Vec<usize>] {
        &self.clients
    }

    /// Samples assigned to no client, ascending.
    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    /// Per-client sample counts.
    pub fn sizes(&self) -> Vec<usize> {
        self.clients.iter().map(Vec::len).collect()
    }

    /// Total number of assigned samples.
    pub fn n_assigned(&self) -> usize {
        self.clients.iter().map(Vec::len).sum()
    }

    /// Per-client (label, count) statistics.
    pub fn statistics(&self, labels: &[Label]) -> Vec<ClientStatistics> {
        self.clients
            .iter()
            .map(|indices| ClientStatistics::from_labels(indices.iter().map(|&i| labels[i])))
            .collect()
    }

    /// Copy each client's samples out of `set`.
    pub fn materialize(&self, set: &SampleSet) -> Vec<SampleSet> {
        self.clients
            .par_iter()
            .map(|indices| set.select(indices))
            .collect()
    }
}

/// High-level partitioner binding a strategy to its retry policy.
///
/// # Example
///
/// ```rust
/// use fedsplit::partition::{Partitioner, Strategy};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let labels: Vec<u32> = (0..100).map(|i| i % 10).collect();
/// let partitioner = Partitioner::new(Strategy::Dirichlet { alpha: 0.5 }).with_min_size(5);
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let partition = partitioner.partition(&labels, 4, &mut rng).unwrap();
/// assert!(partition.sizes().iter().all(|&s| s >= 5));
/// ```
#[derive(Clone, Debug)]
pub struct Partitioner {
    strategy: Strategy,
    min_size: usize,
    max_attempts: usize,
}

impl Partitioner {
    /// Create a partitioner with `min_size = 1` and the default retry bound.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            min_size: DEFAULT_MIN_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Minimum samples per client (Dirichlet strategies only).
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Bound on sampling attempts before giving up (Dirichlet strategies only).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The configured strategy.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Assign sample indices to `n_clients` clients.
    ///
    /// # Arguments
    ///
    /// * `labels` - Label of every sample; only labels drive the assignment
    /// * `n_clients` - Number of clients, at least 1
    /// * `rng` - Random source; the same seed yields the same partition
    pub fn partition<R: Rng + ?Sized>(
        &self,
        labels: &[Label],
        n_clients: usize,
        rng: &mut R,
    ) -> Result<Partition, FedSplitError> {
        if labels.is_empty() {
            return Err(FedSplitError::EmptyDataset);
        }
        if n_clients == 0 {
            return Err(FedSplitError::invalid("n_clients", "must be >= 1"));
        }
        self.strategy.validate()?;
        if self.strategy.respects_min_size() {
            if self.max_attempts == 0 {
                return Err(FedSplitError::invalid("max_attempts", "must be >= 1"));
            }
            let required = n_clients.saturating_mul(self.min_size);
            if required > labels.len() {
                return Err(FedSplitError::invalid(
                    "min_size",
                    format!(
                        "{} clients x min_size {} = {} exceeds the {} available samples",
                        n_clients,
                        self.min_size,
                        required,
                        labels.len()
                    ),
                ));
            }
        }

        let partition = match &self.strategy {
            Strategy::Label { n_class_per_client } => {
                label_partition(labels, n_clients, *n_class_per_client, rng)?
            }
            Strategy::Dirichlet { alpha } => dirichlet_partition(
                labels,
                n_clients,
                *alpha,
                self.min_size,
                self.max_attempts,
                rng,
            )?,
            Strategy::DirichletQuantity { alpha } => dirichlet_quantity_partition(
                labels.len(),
                n_clients,
                *alpha,
                self.min_size,
                self.max_attempts,
                rng,
            )?,
            Strategy::Uniform => uniform_partition(labels.len(), n_clients, rng),
        };

        tracing::debug!(
            strategy = %self.strategy.kind(),
            n_clients,
            assigned = partition.n_assigned(),
            dropped = partition.dropped().len(),
            "partition computed"
        );
        Ok(partition)
    }

    /// Partition `set` and materialize each client's (data, labels) group.
    pub fn split_dataset<R: Rng + ?Sized>(
        &self,
        set: &SampleSet,
        n_clients: usize,
        rng: &mut R,
    ) -> Result<Vec<SampleSet>, FedSplitError> {
        let partition = self.partition(set.labels(), n_clients, rng)?;
        Ok(partition.materialize(set))
    }
}

/// Consecutive slices of `indices` with the given lengths.
///
/// `sizes` must sum to at most `indices.len()`.
pub(crate) fn deal<'a>(
    indices: &'a [usize],
    sizes: &'a [usize],
) -> impl Iterator<Item = &'a [usize]> + 'a {
    sizes.iter().scan(0usize, move |start, &size| {
        let chunk = &indices[*start..*start + size];
        *start += size;
        Some(chunk)
    })
}

/// Sample indices grouped by class, classes in ascending label order.
pub(crate) fn indices_by_class(labels: &[Label]) -> Vec<(Label, Vec<usize>)> {
    let mut groups: std::collections::BTreeMap<Label, Vec<usize>> = Default::default();
    for (i, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(i);
    }
    groups.into_iter().collect()
}
