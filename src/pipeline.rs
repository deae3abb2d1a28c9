//! End-to-end generation: partition, verify, split, persist.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GenerateConfig;
use crate::dataset::SampleSet;
use crate::error::FedSplitError;
use crate::partition::Strategy;
use crate::persist::DatasetConfig;
use crate::split::split_clients;
use crate::stats::ClientStatistics;
use crate::verification::{check_coverage, check_max_spread, check_min_size};

/// What a call to [`generate`] did.
#[derive(Clone, Debug)]
pub struct GenerateReport {
    /// Location of `config.json`
    pub config_path: PathBuf,
    /// The record describing the output (freshly written or pre-existing)
    pub dataset: DatasetConfig,
    /// True if an up-to-date output was found and nothing was written
    pub skipped: bool,
    /// Clients whose split fell back to non-stratified
    pub unstratified_clients: Vec<usize>,
}

/// Partition `set` across clients, split each client, and write the result.
///
/// All randomness comes from one `StdRng` seeded with `config.seed`, so the
/// same input and config always produce the same files. Unless
/// `config.force` is set, an existing output produced by identical parameters
/// on identical data (same [`SampleSet::fingerprint`]) is left untouched.
pub fn generate(set: &SampleSet, config: &GenerateConfig) -> Result<GenerateReport, FedSplitError> {
    config.validate()?;
    if set.is_empty() {
        return Err(FedSplitError::EmptyDataset);
    }

    let persister = config.persister();
    let source_sha256 = set.fingerprint();

    if !config.force {
        if let Some(existing) = up_to_date(config, &source_sha256) {
            tracing::info!(
                dir = %config.dir_path.display(),
                "dataset already generated with these parameters, skipping"
            );
            return Ok(GenerateReport {
                config_path: persister.config_path(),
                dataset: existing,
                skipped: true,
                unstratified_clients: Vec::new(),
            });
        }
    }

    let dataset_statistic = ClientStatistics::from_labels(set.labels().iter().copied());
    tracing::info!(
        samples = set.len(),
        classes = dataset_statistic.n_labels(),
        clients = config.n_clients,
        strategy = %config.strategy.kind(),
        seed = config.seed,
        "partitioning dataset"
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let partition = config
        .partitioner()
        .partition(set.labels(), config.n_clients, &mut rng)?;

    check_coverage(&partition, set.len())?;
    match config.strategy {
        Strategy::Dirichlet { .. } | Strategy::DirichletQuantity { .. } => {
            check_min_size(&partition, config.min_size)?
        }
        Strategy::Uniform => check_max_spread(&partition, 1)?,
        Strategy::Label { .. } => {}
    }
    if !partition.dropped().is_empty() {
        tracing::warn!(
            dropped = partition.dropped().len(),
            "samples of classes held by no client were dropped"
        );
    }

    let statistic = partition.statistics(set.labels());
    let clients = partition.materialize(set);
    let outcomes = split_clients(&clients, config.test_ratio, &mut rng)?;

    let unstratified_clients: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| !o.stratified)
        .map(|(i, _)| i)
        .collect();
    if !unstratified_clients.is_empty() {
        tracing::warn!(
            clients = ?unstratified_clients,
            "stratified split infeasible, used random split"
        );
    }

    for (client_id, (stats, outcome)) in statistic.iter().zip(&outcomes).enumerate() {
        tracing::debug!(
            client_id,
            samples = stats.total(),
            train = outcome.train.len(),
            test = outcome.test.len(),
            labels = ?stats.label_counts(),
            "client shard"
        );
    }

    let files = persister.write_shards(&outcomes)?;
    let dataset = DatasetConfig {
        num_clients: config.n_clients,
        num_classes: set.num_classes(),
        num_samples: set.len(),
        n_features: set.n_features(),
        source_sha256,
        partition: config.strategy.kind(),
        alpha: config.strategy.alpha(),
        min_size: config.min_size,
        n_class_per_client: config.strategy.n_class_per_client(),
        test_ratio: config.test_ratio,
        seed: config.seed,
        format: config.format,
        dropped_samples: partition.dropped().len(),
        dataset_statistic,
        statistic,
        train_sizes: outcomes.iter().map(|o| o.train.len()).collect(),
        test_sizes: outcomes.iter().map(|o| o.test.len()).collect(),
        files,
    };
    let config_path = persister.write_config(&dataset)?;

    tracing::info!(
        dir = %config.dir_path.display(),
        train = dataset.train_sizes.iter().sum::<usize>(),
        test = dataset.test_sizes.iter().sum::<usize>(),
        "client shards written"
    );

    Ok(GenerateReport {
        config_path,
        dataset,
        skipped: false,
        unstratified_clients,
    })
}

/// The existing record, if it matches `config` and all its files are present.
fn up_to_date(config: &GenerateConfig, source_sha256: &str) -> Option<DatasetConfig> {
    let persister = config.persister();
    match persister.read_config() {
        Ok(Some(existing))
            if existing.matches(config, source_sha256)
                && persister.manifest_present(&existing.files) =>
        {
            Some(existing)
        }
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable existing config");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::synthetic::gaussian_blobs;
    use crate::persist::{read_shard, SplitKind};

    fn dataset(n: usize) -> SampleSet {
        gaussian_blobs(&mut StdRng::seed_from_u64(0), n, 3, 10).unwrap()
    }

    #[test]
    fn test_uniform_example() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GenerateConfig::new(dir.path(), 4, Strategy::Uniform, 0.2);
        let report = generate(&dataset(100), &cfg).unwrap();

        assert!(!report.skipped);
        assert_eq!(report.dataset.train_sizes, vec![20; 4]);
        assert_eq!(report.dataset.test_sizes, vec![5; 4]);
        assert_eq!(report.dataset.num_classes, 10);
        assert!(report.config_path.is_file());

        let persister = cfg.persister();
        let shard = read_shard(&persister.shard_path(SplitKind::Test, 3), cfg.format).unwrap();
        assert_eq!(shard.len(), 5);
        assert_eq!(shard.n_features(), 3);
    }

    #[test]
    fn test_config_error_before_work() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GenerateConfig::new(dir.path().join("out"), 4, Strategy::Uniform, 0.0);
        assert!(generate(&dataset(20), &cfg).is_err());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_skips_when_up_to_date() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GenerateConfig::new(dir.path(), 3, Strategy::Dirichlet { alpha: 0.5 }, 0.25)
            .with_min_size(5)
            .with_seed(4);
        let set = dataset(300);

        let first = generate(&set, &cfg).unwrap();
        assert!(!first.skipped);
        let second = generate(&set, &cfg).unwrap();
        assert!(second.skipped);
        assert_eq!(first.dataset, second.dataset);

        let forced = generate(&set, &cfg.clone().with_force(true)).unwrap();
        assert!(!forced.skipped);
        assert_eq!(forced.dataset, first.dataset);

        let reseeded = generate(&set, &cfg.clone().with_seed(5)).unwrap();
        assert!(!reseeded.skipped);
    }

    #[test]
    fn test_regenerates_when_source_data_changes() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GenerateConfig::new(dir.path(), 2, Strategy::Uniform, 0.2);
        let narrow = gaussian_blobs(&mut StdRng::seed_from_u64(0), 100, 3, 10).unwrap();
        let wide = gaussian_blobs(&mut StdRng::seed_from_u64(0), 100, 8, 10).unwrap();
        assert_eq!(narrow.labels(), wide.labels());

        let first = generate(&narrow, &cfg).unwrap();
        assert_eq!(first.dataset.n_features, 3);
        let second = generate(&wide, &cfg).unwrap();
        assert!(!second.skipped);
        assert_eq!(second.dataset.n_features, 8);
        assert_ne!(second.dataset.source_sha256, first.dataset.source_sha256);

        let shard_path = cfg.persister().shard_path(SplitKind::Train, 0);
        let shard = read_shard(&shard_path, cfg.format).unwrap();
        assert_eq!(shard.n_features(), 8);
        assert!(generate(&wide, &cfg).unwrap().skipped);
    }

    #[test]
    fn test_regenerates_when_files_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GenerateConfig::new(dir.path(), 2, Strategy::Uniform, 0.5);
        let set = dataset(40);
        generate(&set, &cfg).unwrap();
        std::fs::remove_file(cfg.persister().shard_path(SplitKind::Train, 1)).unwrap();
        assert!(!generate(&set, &cfg).unwrap().skipped);
    }

    #[test]
    fn test_label_strategy_reports_drops() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GenerateConfig::new(
            dir.path(),
            2,
            Strategy::Label {
                n_class_per_client: 2,
            },
            0.2,
        );
        let report = generate(&dataset(100), &cfg).unwrap();
        // 2 clients x 2 classes hold 4 of 10 classes, 10 samples each
        assert_eq!(report.dataset.dropped_samples, 60);
        assert!(report.dataset.statistic.iter().all(|s| s.n_labels() == 2));
    }
}
