//! # fedsplit: reproducible non-IID client datasets for federated learning
//!
//! fedsplit turns one labeled dataset into per-client train/test shards for
//! federated learning simulations, with controlled label or quantity skew.
//!
//! ## Partitioning Strategies
//!
//! - [`label_partition()`] - Each client holds exactly `n_class_per_client` classes
//! - [`dirichlet_partition()`] - Per-class Dirichlet(alpha) client shares, `min_size` enforced
//! - [`dirichlet_quantity_partition()`] - Dirichlet(alpha) client sizes, classes ignored
//! - [`uniform_partition()`] - IID, client sizes differ by at most 1
//!
//! ## High-Level API
//!
//! Use [`Partitioner`] to bind a strategy to its retry policy, or [`generate`]
//! to run the whole partition / split / persist pipeline from a
//! [`GenerateConfig`].
//!
//! Every random draw comes from an explicitly passed RNG, so a seed fully
//! determines the output.

#![deny(missing_docs)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod math;
pub mod partition;
pub mod persist;
pub mod pipeline;
pub mod split;
pub mod stats;
pub mod verification;

// Re-exports
pub use config::GenerateConfig;
pub use dataset::{Label, SampleSet};
pub use error::FedSplitError;
pub use partition::dirichlet_partition;
pub use partition::dirichlet_quantity_partition;
pub use partition::label_partition;
pub use partition::uniform_partition;
pub use partition::{Partition, Partitioner, Strategy, StrategyKind};
pub use persist::{DatasetConfig, Persister, ShardFormat};
pub use pipeline::{generate, GenerateReport};
pub use split::{split_clients, train_test_split, SplitOutcome};
pub use stats::ClientStatistics;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
