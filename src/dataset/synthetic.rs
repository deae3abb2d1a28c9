//! Seeded synthetic datasets for smoke runs and benchmarks.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};

use super::{Label, SampleSet};
use crate::error::FedSplitError;

/// Spread of the class centers around the origin.
const CENTER_SPREAD: f32 = 5.0;

/// Isotropic Gaussian blobs, one per class.
///
/// Sample `i` gets label `i % n_classes`, so class sizes differ by at most 1.
/// Each class has a center drawn from N(0, 5²) per feature; samples are the
/// center plus unit Gaussian noise.
pub fn gaussian_blobs<R: Rng + ?Sized>(
    rng: &mut R,
    n_samples: usize,
    n_features: usize,
    n_classes: usize,
) -> Result<SampleSet, FedSplitError> {
    if n_samples == 0 {
        return Err(FedSplitError::EmptyDataset);
    }
    if n_classes == 0 {
        return Err(FedSplitError::invalid("synthetic_classes", "must be >= 1"));
    }
    if n_features == 0 {
        return Err(FedSplitError::invalid("synthetic_features", "must be >= 1"));
    }

    let spread = Normal::new(0.0f32, CENTER_SPREAD)
        .map_err(|e| FedSplitError::invalid("synthetic_features", e.to_string()))?;
    let centers = Array2::from_shape_fn((n_classes, n_features), |_| spread.sample(rng));

    let labels: Vec<Label> = (0..n_samples).map(|i| (i % n_classes) as Label).collect();
    let data = Array2::from_shape_fn((n_samples, n_features), |(i, j)| {
        let noise: f32 = StandardNormal.sample(rng);
        centers[[labels[i] as usize, j]] + noise
    });

    SampleSet::new(data, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shape_and_labels() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = gaussian_blobs(&mut rng, 103, 4, 10).unwrap();
        assert_eq!(set.len(), 103);
        assert_eq!(set.n_features(), 4);
        assert_eq!(set.classes(), (0..10).collect::<Vec<Label>>());
        assert_eq!(set.labels().iter().filter(|&&l| l == 0).count(), 11);
        assert_eq!(set.labels().iter().filter(|&&l| l == 9).count(), 10);
    }

    #[test]
    fn test_seeded() {
        let a = gaussian_blobs(&mut StdRng::seed_from_u64(5), 20, 3, 2).unwrap();
        let b = gaussian_blobs(&mut StdRng::seed_from_u64(5), 20, 3, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_degenerate() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(gaussian_blobs(&mut rng, 0, 3, 2).is_err());
        assert!(gaussian_blobs(&mut rng, 10, 0, 2).is_err());
        assert!(gaussian_blobs(&mut rng, 10, 3, 0).is_err());
    }
}
