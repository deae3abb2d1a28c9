//! Generation parameters.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::FedSplitError;
use crate::partition::{Partitioner, Strategy, DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_SIZE};
use crate::persist::{Persister, ShardFormat};
use crate::split::validate_test_ratio;

/// Everything needed to turn a sample set into client shards on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Output root
    pub dir_path: PathBuf,
    /// Number of clients
    pub n_clients: usize,
    /// Partitioning strategy with its parameters
    pub strategy: Strategy,
    /// Fraction of each client's samples held out for testing
    pub test_ratio: f64,
    /// Minimum samples per client (Dirichlet strategies)
    pub min_size: usize,
    /// Retry bound for the Dirichlet strategies
    pub max_attempts: usize,
    /// Seed for every random draw of the run
    pub seed: u64,
    /// Shard encoding
    pub format: ShardFormat,
    /// Regenerate even if an up-to-date output exists
    pub force: bool,
}

impl GenerateConfig {
    /// Config with `min_size = 1`, the default retry bound, seed 0 and bincode shards.
    pub fn new(
        dir_path: impl Into<PathBuf>,
        n_clients: usize,
        strategy: Strategy,
        test_ratio: f64,
    ) -> Self {
        Self {
            dir_path: dir_path.into(),
            n_clients,
            strategy,
            test_ratio,
            min_size: DEFAULT_MIN_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: 0,
            format: ShardFormat::default(),
            force: false,
        }
    }

    /// Set the minimum client size.
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the retry bound.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the shard encoding.
    pub fn with_format(mut self, format: ShardFormat) -> Self {
        self.format = format;
        self
    }

    /// Regenerate even when the output looks up to date.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Check every parameter that can be checked without the dataset.
    pub fn validate(&self) -> Result<(), FedSplitError> {
        if self.dir_path.as_os_str().is_empty() {
            return Err(FedSplitError::invalid("dir_path", "must not be empty"));
        }
        if self.n_clients == 0 {
            return Err(FedSplitError::invalid("n_clients", "must be >= 1"));
        }
        self.strategy.validate()?;
        validate_test_ratio(self.test_ratio)?;
        if self.strategy.respects_min_size() && self.max_attempts == 0 {
            return Err(FedSplitError::invalid("max_attempts", "must be >= 1"));
        }
        Ok(())
    }

    /// Partitioner for this config.
    pub fn partitioner(&self) -> Partitioner {
        Partitioner::new(self.strategy.clone())
            .with_min_size(self.min_size)
            .with_max_attempts(self.max_attempts)
    }

    /// Persister for this config.
    pub fn persister(&self) -> Persister {
        Persister::new(&self.dir_path, self.format)
    }
}
