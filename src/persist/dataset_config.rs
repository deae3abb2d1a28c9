//! The `config.json` record written next to the shards.

use serde::{Deserialize, Serialize};

use super::ShardFormat;
use crate::config::GenerateConfig;
use crate::partition::StrategyKind;
use crate::stats::ClientStatistics;

/// Relative paths of every shard file, indexed by client id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    /// `train/<id>.<ext>`
    pub train: Vec<String>,
    /// `test/<id>.<ext>`
    pub test: Vec<String>,
}

/// Description of a generated dataset: parameters, statistics, file layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Number of clients
    pub num_clients: usize,
    /// Label-space size, `max(label) + 1`
    pub num_classes: usize,
    /// Samples in the source dataset
    pub num_samples: usize,
    /// Feature width of the source dataset
    pub n_features: usize,
    /// [`SampleSet::fingerprint`](crate::dataset::SampleSet::fingerprint) of the source dataset
    pub source_sha256: String,
    /// Strategy name
    pub partition: StrategyKind,
    /// Dirichlet concentration, if used
    pub alpha: Option<f64>,
    /// Minimum client size requested
    pub min_size: usize,
    /// Classes per client, if used
    pub n_class_per_client: Option<usize>,
    /// Held-out fraction per client
    pub test_ratio: f64,
    /// Seed of the run
    pub seed: u64,
    /// Shard encoding
    pub format: ShardFormat,
    /// Samples assigned to no client
    pub dropped_samples: usize,
    /// Label counts of the whole source dataset
    pub dataset_statistic: ClientStatistics,
    /// Per-client label counts, before the train/test split
    pub statistic: Vec<ClientStatistics>,
    /// Per-client training set sizes
    pub train_sizes: Vec<usize>,
    /// Per-client test set sizes
    pub test_sizes: Vec<usize>,
    /// Shard files
    pub files: FileManifest,
}

impl DatasetConfig {
    /// Whether this record was produced by the same parameters on the same data.
    ///
    /// `source_sha256` is the fingerprint of the dataset about to be split.
    pub fn matches(&self, config: &GenerateConfig, source_sha256: &str) -> bool {
        let strategy = &config.strategy;
        self.num_clients == config.n_clients
            && self.partition == strategy.kind()
            && same_option_f64(self.alpha, strategy.alpha())
            && self.n_class_per_client == strategy.n_class_per_client()
            && self.min_size == config.min_size
            && same_f64(self.test_ratio, config.test_ratio)
            && self.seed == config.seed
            && self.format == config.format
            && self.source_sha256 == source_sha256
    }
}

// JSON may not round-trip the last bit of an f64.
fn same_f64(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
}

fn same_option_f64(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_f64(a, b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Strategy;

    const SOURCE: &str = "9f2c";

    fn record(config: &GenerateConfig, stats: &ClientStatistics) -> DatasetConfig {
        DatasetConfig {
            num_clients: config.n_clients,
            num_classes: 3,
            num_samples: stats.total(),
            n_features: 2,
            source_sha256: SOURCE.to_string(),
            partition: config.strategy.kind(),
            alpha: config.strategy.alpha(),
            min_size: config.min_size,
            n_class_per_client: config.strategy.n_class_per_client(),
            test_ratio: config.test_ratio,
            seed: config.seed,
            format: config.format,
            dropped_samples: 0,
            dataset_statistic: stats.clone(),
            statistic: vec![],
            train_sizes: vec![],
            test_sizes: vec![],
            files: FileManifest::default(),
        }
    }

    #[test]
    fn test_matches_same_parameters() {
        let cfg = GenerateConfig::new("out", 3, Strategy::Dirichlet { alpha: 0.1 }, 0.2);
        let stats = ClientStatistics::from_labels([0, 1, 2, 2]);
        let rec = record(&cfg, &stats);
        assert!(rec.matches(&cfg, SOURCE));

        let json = serde_json::to_string(&rec).unwrap();
        let back: DatasetConfig = serde_json::from_str(&json).unwrap();
        assert!(back.matches(&cfg, SOURCE));
    }

    #[test]
    fn test_detects_changes() {
        let cfg = GenerateConfig::new("out", 3, Strategy::Dirichlet { alpha: 0.1 }, 0.2);
        let stats = ClientStatistics::from_labels([0, 1, 2, 2]);
        let rec = record(&cfg, &stats);

        assert!(!rec.matches(&cfg.clone().with_seed(1), SOURCE));
        assert!(!rec.matches(&cfg.clone().with_min_size(2), SOURCE));
        assert!(!rec.matches(
            &GenerateConfig::new("out", 3, Strategy::Dirichlet { alpha: 0.3 }, 0.2),
            SOURCE
        ));
        assert!(!rec.matches(
            &GenerateConfig::new("out", 3, Strategy::DirichletQuantity { alpha: 0.1 }, 0.2),
            SOURCE
        ));
        assert!(!rec.matches(&cfg, "77aa"));
    }

    #[test]
    fn test_statistic_json_shape() {
        let cfg = GenerateConfig::new("out", 1, Strategy::Uniform, 0.5);
        let mut rec = record(&cfg, &ClientStatistics::from_labels([0, 0, 1]));
        rec.statistic = vec![ClientStatistics::from_labels([0, 0, 1])];
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["statistic"], serde_json::json!([[[0, 2], [1, 1]]]));
        assert_eq!(value["partition"], "uniform");
        assert_eq!(value["alpha"], serde_json::Value::Null);
        assert_eq!(value["format"], "bin");
    }
}
