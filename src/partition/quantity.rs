//! Quantity-skewed Dirichlet partitioning.
//!
//! Client sizes follow Dirichlet(alpha) over the whole dataset; which samples
//! land where is a plain shuffle, so label mixes stay roughly IID.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{deal, Partition};
use crate::error::FedSplitError;
use crate::math::{proportional_sizes, sample_dirichlet};

/// Partition `n_samples` indices with Dirichlet(`alpha`) client sizes.
///
/// Sizes are redrawn until the smallest reaches `min_size`, at most
/// `max_attempts` times.
pub fn dirichlet_quantity_partition<R: Rng + ?Sized>(
    n_samples: usize,
    n_clients: usize,
    alpha: f64,
    min_size: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Partition, FedSplitError> {
    let mut best_smallest = 0;

    for attempt in 1..=max_attempts {
        let proportions = sample_dirichlet(rng, alpha, n_clients)?;
        let sizes = proportional_sizes(&proportions, n_samples);
        let smallest = sizes.iter().copied().min().unwrap_or(0);

        if smallest >= min_size {
            tracing::debug!(attempt, smallest, "quantity partition accepted");
            let mut indices: Vec<usize> = (0..n_samples).collect();
            indices.shuffle(rng);
            let clients = deal(&indices, &sizes).map(<[usize]>::to_vec).collect();
            return Ok(Partition::new(clients, Vec::new()));
        }
        best_smallest = best_smallest.max(smallest);
    }

    Err(FedSplitError::Infeasible {
        attempts: max_attempts,
        min_size,
        smallest: best_smallest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    #[test]
    fn test_coverage_and_min_size() {
        let mut rng = StdRng::seed_from_u64(0);
        let p = dirichlet_quantity_partition(1000, 5, 1.0, 50, 1000, &mut rng).unwrap();
        assert_eq!(p.n_assigned(), 1000);
        let all: BTreeSet<usize> = p.clients().iter().flatten().copied().collect();
        assert_eq!(all.len(), 1000);
        assert!(p.sizes().iter().all(|&s| s >= 50), "sizes {:?}", p.sizes());
    }

    #[test]
    fn test_sizes_vary() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = dirichlet_quantity_partition(10_000, 10, 0.5, 1, 1000, &mut rng).unwrap();
        let sizes = p.sizes();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        assert!(max > 2 * min, "expected quantity skew, sizes {:?}", sizes);
    }

    #[test]
    fn test_infeasible() {
        let mut rng = StdRng::seed_from_u64(2);
        let err = dirichlet_quantity_partition(10, 4, 1.0, 3, 5, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            FedSplitError::Infeasible {
                attempts: 5,
                min_size: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_seeded_reproducible() {
        let a = dirichlet_quantity_partition(300, 4, 0.7, 10, 100, &mut StdRng::seed_from_u64(3));
        let b = dirichlet_quantity_partition(300, 4, 0.7, 10, 100, &mut StdRng::seed_from_u64(3));
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
