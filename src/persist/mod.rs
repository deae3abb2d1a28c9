//! Writing client shards and the dataset config to disk.
//!
//! Layout under the output directory:
//!
//! ```text
//! <dir_path>/config.json
//! <dir_path>/train/<client_id>.<ext>
//! <dir_path>/test/<client_id>.<ext>
//! ```
//!
//! Each shard file holds one [`SampleSet`] serialized as `{ "x": ..., "y": ... }`.

pub mod dataset_config;

pub use dataset_config::{DatasetConfig, FileManifest};

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::SampleSet;
use crate::error::FedSplitError;
use crate::split::SplitOutcome;

/// File name of the dataset config.
pub const CONFIG_FILE: &str = "config.json";

/// Encoding used for shard files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum ShardFormat {
    /// bincode, compact
    #[default]
    Bin,
    /// JSON, human readable
    Json,
}

impl ShardFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ShardFormat::Bin => "bin",
            ShardFormat::Json => "json",
        }
    }
}

impl FromStr for ShardFormat {
    type Err = FedSplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bin" => Ok(ShardFormat::Bin),
            "json" => Ok(ShardFormat::Json),
            other => Err(FedSplitError::invalid(
                "format",
                format!("'{}' (use 'bin' or 'json')", other),
            )),
        }
    }
}

impl fmt::Display for ShardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which half of a client's data a shard holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitKind {
    /// Training shard
    Train,
    /// Test shard
    Test,
}

impl SplitKind {
    /// Directory name under the output root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            SplitKind::Train => "train",
            SplitKind::Test => "test",
        }
    }
}

/// Writes shards and the config under one output directory.
#[derive(Clone, Debug)]
pub struct Persister {
    root: PathBuf,
    format: ShardFormat,
}

impl Persister {
    /// Persister rooted at `root`, writing shards as `format`.
    pub fn new(root: impl Into<PathBuf>, format: ShardFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    /// Output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `config.json`.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Shard path relative to the root, e.g. `train/3.bin`.
    pub fn relative_shard_path(&self, kind: SplitKind, client_id: usize) -> PathBuf {
        Path::new(kind.dir_name()).join(format!("{}.{}", client_id, self.format.extension()))
    }

    /// Absolute shard path.
    pub fn shard_path(&self, kind: SplitKind, client_id: usize) -> PathBuf {
        self.root.join(self.relative_shard_path(kind, client_id))
    }

    /// Create `train/` and `test/`; succeeds if they already exist.
    pub fn prepare_dirs(&self) -> Result<(), FedSplitError> {
        for kind in [SplitKind::Train, SplitKind::Test] {
            let dir = self.root.join(kind.dir_name());
            fs::create_dir_all(&dir).map_err(|e| FedSplitError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Write every client's train and test shard, returning the manifest.
    ///
    /// Client `i` of `outcomes` is written as `train/i.<ext>` and `test/i.<ext>`.
    pub fn write_shards(&self, outcomes: &[SplitOutcome]) -> Result<FileManifest, FedSplitError> {
        self.prepare_dirs()?;

        outcomes
            .par_iter()
            .enumerate()
            .try_for_each(|(client_id, outcome)| {
                let train_path = self.shard_path(SplitKind::Train, client_id);
                write_shard(&train_path, &outcome.train, self.format)?;
                let test_path = self.shard_path(SplitKind::Test, client_id);
                write_shard(&test_path, &outcome.test, self.format)
            })?;

        let manifest = |kind: SplitKind| -> Vec<String> {
            (0..outcomes.len())
                .map(|id| self.relative_shard_path(kind, id).to_string_lossy().into_owned())
                .collect()
        };
        Ok(FileManifest {
            train: manifest(SplitKind::Train),
            test: manifest(SplitKind::Test),
        })
    }

    /// Write `config.json` (pretty-printed).
    pub fn write_config(&self, config: &DatasetConfig) -> Result<PathBuf, FedSplitError> {
        fs::create_dir_all(&self.root).map_err(|e| FedSplitError::io(&self.root, e))?;
        let path = self.config_path();
        let file = File::create(&path).map_err(|e| FedSplitError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, config)?;
        writer.flush().map_err(|e| FedSplitError::io(&path, e))?;
        Ok(path)
    }

    /// Read `config.json` if present.
    pub fn read_config(&self) -> Result<Option<DatasetConfig>, FedSplitError> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path).map_err(|e| FedSplitError::io(&path, e))?;
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    /// Whether every file listed in `manifest` exists under the root.
    pub fn manifest_present(&self, manifest: &FileManifest) -> bool {
        manifest
            .train
            .iter()
            .chain(&manifest.test)
            .all(|rel| self.root.join(rel).is_file())
    }
}

/// Serialize one shard to `path`.
pub fn write_shard(
    path: &Path,
    shard: &SampleSet,
    format: ShardFormat,
) -> Result<(), FedSplitError> {
    let file = File::create(path).map_err(|e| FedSplitError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    match format {
        ShardFormat::Bin => bincode::serialize_into(&mut writer, shard)?,
        ShardFormat::Json => serde_json::to_writer(&mut writer, shard)?,
    }
    writer.flush().map_err(|e| FedSplitError::io(path, e))
}

/// Deserialize one shard from `path`.
pub fn read_shard(path: &Path, format: ShardFormat) -> Result<SampleSet, FedSplitError> {
    let file = File::open(path).map_err(|e| FedSplitError::io(path, e))?;
    let reader = BufReader::new(file);
    let shard = match format {
        ShardFormat::Bin => bincode::deserialize_from(reader)?,
        ShardFormat::Json => serde_json::from_reader(reader)?,
    };
    Ok(shard)
}
