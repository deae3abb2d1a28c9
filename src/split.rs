//! Per-client train/test splitting.
//!
//! Splits are stratified by label whenever every class can appear on both
//! sides; otherwise they fall back to a plain random split. Each client is
//! split with its own child RNG so clients can be processed in parallel
//! without changing the result for a given seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::dataset::SampleSet;
use crate::error::FedSplitError;
use crate::math::largest_remainder;
use crate::partition::indices_by_class;

/// Slack subtracted before rounding up, so `0.1 * 30` yields 3 and not 4.
const RATIO_EPSILON: f64 = 1e-9;

/// Train and test halves of one client's samples.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitOutcome {
    /// Training samples
    pub train: SampleSet,
    /// Held-out samples
    pub test: SampleSet,
    /// Whether per-class proportions were preserved
    pub stratified: bool,
}

/// Check that `test_ratio` lies strictly between 0 and 1.
pub fn validate_test_ratio(test_ratio: f64) -> Result<(), FedSplitError> {
    if test_ratio.is_finite() && test_ratio > 0.0 && test_ratio < 1.0 {
        Ok(())
    } else {
        Err(FedSplitError::invalid(
            "test_ratio",
            format!("{} (must be in (0, 1))", test_ratio),
        ))
    }
}

/// Number of test samples for a client of `n` samples.
///
/// `ceil(test_ratio * n)`, clamped to `n - 1` so the train side is never
/// empty. Clients with fewer than 2 samples are train-only.
pub fn test_size(n: usize, test_ratio: f64) -> usize {
    if n < 2 {
        return 0;
    }
    let raw = (test_ratio * n as f64 - RATIO_EPSILON).ceil().max(0.0) as usize;
    raw.clamp(1, n - 1)
}

/// Randomly split one client's samples into train and test.
///
/// # Arguments
///
/// * `set` - The client's samples
/// * `test_ratio` - Fraction held out, in (0, 1)
/// * `rng` - Random source
pub fn train_test_split<R: Rng + ?Sized>(
    set: &SampleSet,
    test_ratio: f64,
    rng: &mut R,
) -> Result<SplitOutcome, FedSplitError> {
    validate_test_ratio(test_ratio)?;

    let n = set.len();
    let n_test = test_size(n, test_ratio);
    let n_train = n - n_test;

    let by_class = indices_by_class(set.labels());
    let n_classes = by_class.len();
    let stratify = n_classes > 0
        && by_class.iter().all(|(_, idx)| idx.len() >= 2)
        && n_test >= n_classes
        && n_train >= n_classes;

    let (mut train_idx, mut test_idx) = if stratify {
        let counts: Vec<usize> = by_class.iter().map(|(_, idx)| idx.len()).collect();
        let test_counts = largest_remainder(&counts, n_test);

        let mut train_idx = Vec::with_capacity(n_train);
        let mut test_idx = Vec::with_capacity(n_test);
        for ((_, mut idx), take) in by_class.into_iter().zip(test_counts) {
            idx.shuffle(rng);
            test_idx.extend_from_slice(&idx[..take]);
            train_idx.extend_from_slice(&idx[take..]);
        }
        (train_idx, test_idx)
    } else {
        if n > 1 {
            tracing::debug!(n, n_classes, "stratification infeasible, using random split");
        }
        let mut idx: Vec<usize> = (0..n).collect();
        idx.shuffle(rng);
        let train_idx = idx.split_off(n_test);
        (train_idx, idx)
    };

    train_idx.shuffle(rng);
    test_idx.shuffle(rng);

    Ok(SplitOutcome {
        train: set.select(&train_idx),
        test: set.select(&test_idx),
        stratified: stratify,
    })
}

/// Split every client, in parallel, reproducibly.
///
/// One child seed per client is drawn from `rng` in client order before any
/// work starts.
pub fn split_clients<R: Rng + ?Sized>(
    clients: &[SampleSet],
    test_ratio: f64,
    rng: &mut R,
) -> Result<Vec<SplitOutcome>, FedSplitError> {
    validate_test_ratio(test_ratio)?;
    let seeds: Vec<u64> = clients.iter().map(|_| rng.gen()).collect();

    clients
        .par_iter()
        .zip(&seeds)
        .map(|(set, &seed)| train_test_split(set, test_ratio, &mut StdRng::seed_from_u64(seed)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Label;
    use crate::stats::ClientStatistics;
    use ndarray::Array2;

    fn client(labels: Vec<Label>) -> SampleSet {
        let n = labels.len();
        SampleSet::new(Array2::from_shape_fn((n, 1), |(i, _)| i as f32), labels).unwrap()
    }

    #[test]
    fn test_test_size_rounding() {
        assert_eq!(test_size(25, 0.2), 5);
        assert_eq!(test_size(30, 0.1), 3);
        assert_eq!(test_size(10, 0.25), 3);
        assert_eq!(test_size(2, 0.01), 1);
        assert_eq!(test_size(2, 0.99), 1);
        assert_eq!(test_size(1, 0.5), 0);
        assert_eq!(test_size(0, 0.5), 0);
    }

    #[test]
    fn test_invalid_ratio() {
        let set = client(vec![0, 1, 0, 1]);
        let mut rng = StdRng::seed_from_u64(0);
        for ratio in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(train_test_split(&set, ratio, &mut rng).is_err());
        }
    }

    #[test]
    fn test_sizes_and_disjoint() {
        let set = client((0..25).map(|i| i % 5).collect());
        let mut rng = StdRng::seed_from_u64(1);
        let out = train_test_split(&set, 0.2, &mut rng).unwrap();
        assert_eq!(out.train.len(), 20);
        assert_eq!(out.test.len(), 5);

        let mut seen: Vec<u32> = out
            .train
            .data()
            .iter()
            .chain(out.test.data().iter())
            .map(|&v| v as u32)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_stratified_preserves_proportions() {
        // 60 of class 0, 20 of class 1, 20 of class 2
        let labels: Vec<Label> = (0..100)
            .map(|i| match i {
                0..=59 => 0,
                60..=79 => 1,
                _ => 2,
            })
            .collect();
        let set = client(labels);
        let mut rng = StdRng::seed_from_u64(2);
        let out = train_test_split(&set, 0.25, &mut rng).unwrap();
        assert!(out.stratified);
        let test = ClientStatistics::from_labels(out.test.labels().iter().copied());
        assert_eq!(test.label_counts(), &[(0, 15), (1, 5), (2, 5)]);
    }

    #[test]
    fn test_falls_back_when_class_is_singleton() {
        let mut labels = vec![0; 19];
        labels.push(1);
        let set = client(labels);
        let mut rng = StdRng::seed_from_u64(3);
        let out = train_test_split(&set, 0.2, &mut rng).unwrap();
        assert!(!out.stratified);
        assert_eq!(out.train.len(), 16);
        assert_eq!(out.test.len(), 4);
    }

    #[test]
    fn test_falls_back_when_test_too_small() {
        // 3 classes but only 1 test sample
        let set = client(vec![0, 0, 1, 1, 2, 2]);
        let mut rng = StdRng::seed_from_u64(4);
        let out = train_test_split(&set, 0.1, &mut rng).unwrap();
        assert!(!out.stratified);
        assert_eq!(out.test.len(), 1);
    }

    #[test]
    fn test_tiny_clients() {
        let mut rng = StdRng::seed_from_u64(5);
        let single = train_test_split(&client(vec![4]), 0.3, &mut rng).unwrap();
        assert_eq!((single.train.len(), single.test.len()), (1, 0));

        let empty = train_test_split(&SampleSet::empty(1), 0.3, &mut rng).unwrap();
        assert!(empty.train.is_empty() && empty.test.is_empty());
    }

    #[test]
    fn test_split_clients_reproducible() {
        let clients: Vec<SampleSet> = (0..6)
            .map(|c| client((0..20 + c).map(|i| (i % 3) as Label).collect()))
            .collect();
        let a = split_clients(&clients, 0.3, &mut StdRng::seed_from_u64(8)).unwrap();
        let b = split_clients(&clients, 0.3, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
        for (outcome, set) in a.iter().zip(&clients) {
            assert_eq!(outcome.test.len(), test_size(set.len(), 0.3));
        }
    }
}
