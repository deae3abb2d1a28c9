//! Error types for fedsplit

use std::path::PathBuf;

use thiserror::Error;

/// All possible errors in fedsplit
#[derive(Error, Debug)]
pub enum FedSplitError {
    /// The sample set has no samples
    #[error("Empty dataset provided")]
    EmptyDataset,

    /// Feature rows and labels disagree in length
    #[error("Length mismatch: {data} feature rows, {labels} labels")]
    LengthMismatch {
        /// Number of feature rows
        data: usize,
        /// Number of labels
        labels: usize,
    },

    /// Strategy name is not one of the known strategies
    #[error("Unknown strategy '{0}'. Use 'label', 'dirichlet', 'dirichlet_quantity', or 'uniform'")]
    InvalidStrategy(String),

    /// A parameter required by the chosen strategy was not supplied
    #[error("Strategy '{strategy}' requires '{parameter}'")]
    MissingParameter {
        /// Strategy name
        strategy: &'static str,
        /// Name of the missing parameter
        parameter: &'static str,
    },

    /// A parameter is outside its valid range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// No assignment satisfying `min_size` was found within the retry bound
    #[error(
        "Partition infeasible: no assignment gave every client >= {min_size} samples \
         after {attempts} attempts (smallest client reached {smallest})"
    )]
    Infeasible {
        /// Attempts made
        attempts: usize,
        /// Required minimum client size
        min_size: usize,
        /// Best smallest-client size seen across attempts
        smallest: usize,
    },

    /// A partition or split violated one of its invariants
    #[error("Verification failed: {0}")]
    VerificationError(String),

    /// Filesystem error while loading or persisting
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding a shard / config failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FedSplitError {
    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FedSplitError::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for [`FedSplitError::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        FedSplitError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FedSplitError {
    fn from(e: serde_json::Error) -> Self {
        FedSplitError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for FedSplitError {
    fn from(e: bincode::Error) -> Self {
        FedSplitError::Serialization(e.to_string())
    }
}
