//! In-memory labeled sample sets.
//!
//! A [`SampleSet`] holds flattened features as an `Array2<f32>` (one row per
//! sample) alongside a parallel label vector. It is the input to the
//! partitioner and the unit every client shard is materialized into.

pub mod synthetic;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::FedSplitError;

/// Class label type.
pub type Label = u32;

/// Features and labels for a set of samples, `data[i]` paired with `labels[i]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSampleSet")]
pub struct SampleSet {
    #[serde(rename = "x")]
    data: Array2<f32>,
    #[serde(rename = "y")]
    labels: Vec<Label>,
}

#[derive(Deserialize)]
struct RawSampleSet {
    x: Array2<f32>,
    y: Vec<Label>,
}

impl TryFrom<RawSampleSet> for SampleSet {
    type Error = FedSplitError;

    fn try_from(raw: RawSampleSet) -> Result<Self, Self::Error> {
        SampleSet::new(raw.x, raw.y)
    }
}

impl SampleSet {
    /// Pair a feature matrix with its labels.
    ///
    /// Fails with [`FedSplitError::LengthMismatch`] if the row count differs
    /// from the label count.
    pub fn new(data: Array2<f32>, labels: Vec<Label>) -> Result<Self, FedSplitError> {
        if data.nrows() != labels.len() {
            return Err(FedSplitError::LengthMismatch {
                data: data.nrows(),
                labels: labels.len(),
            });
        }
        Ok(Self { data, labels })
    }

    /// An empty set with `n_features` columns.
    pub fn empty(n_features: usize) -> Self {
        Self {
            data: Array2::zeros((0, n_features)),
            labels: Vec::new(),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the set holds no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature width of each sample.
    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Feature matrix.
    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    /// Labels, parallel to the rows of [`data`](Self::data).
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Distinct labels in ascending order.
    pub fn classes(&self) -> Vec<Label> {
        self.labels
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Label-space size, `max(label) + 1` (0 for an empty set).
    pub fn num_classes(&self) -> usize {
        self.labels.iter().max().map_or(0, |&m| m as usize + 1)
    }

    /// Copy out the samples at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> SampleSet {
        SampleSet {
            data: self.data.select(Axis(0), indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Hex SHA-256 over the shape, features (row-major) and labels.
    ///
    /// Stable across runs and platforms; recorded in `config.json` to tell
    /// whether an existing output came from this exact data.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.data.nrows() as u64).to_le_bytes());
        hasher.update((self.data.ncols() as u64).to_le_bytes());
        for value in self.data.iter() {
            hasher.update(value.to_le_bytes());
        }
        for label in &self.labels {
            hasher.update(label.to_le_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }

    /// Load a sample set from `.json` or `.bin` (bincode).
    pub fn load(path: &Path) -> Result<Self, FedSplitError> {
        let format = DataFormat::from_path(path)?;
        let file = File::open(path).map_err(|e| FedSplitError::io(path, e))?;
        let reader = BufReader::new(file);
        let set = match format {
            DataFormat::Json => serde_json::from_reader(reader)?,
            DataFormat::Bincode => bincode::deserialize_from(reader)?,
        };
        Ok(set)
    }

    /// Write the sample set to `.json` or `.bin` (bincode).
    pub fn save(&self, path: &Path) -> Result<(), FedSplitError> {
        let format = DataFormat::from_path(path)?;
        let file = File::create(path).map_err(|e| FedSplitError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        match format {
            DataFormat::Json => serde_json::to_writer(&mut writer, self)?,
            DataFormat::Bincode => bincode::serialize_into(&mut writer, self)?,
        }
        writer.flush().map_err(|e| FedSplitError::io(path, e))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DataFormat {
    Json,
    Bincode,
}

impl DataFormat {
    fn from_path(path: &Path) -> Result<Self, FedSplitError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(DataFormat::Json),
            Some("bin") => Ok(DataFormat::Bincode),
            _ => Err(FedSplitError::invalid(
                "input",
                format!("{} (expected a .json or .bin file)", path.display()),
            )),
        }
    }
}
