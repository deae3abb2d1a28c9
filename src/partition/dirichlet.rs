//! Class-wise Dirichlet partitioning (label distribution skew).
//!
//! For every class, client shares are drawn from Dirichlet(alpha) and the
//! class's shuffled samples are cut at the cumulative share points. A client
//! that already holds its fair share (`n / n_clients`) gets no more samples in
//! this attempt, which keeps sizes from drifting too far apart. The whole
//! assignment is redrawn until every client reaches `min_size`.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{deal, indices_by_class, Partition};
use crate::dataset::Label;
use crate::error::FedSplitError;
use crate::math::{proportional_sizes, sample_dirichlet};

/// Partition by per-class Dirichlet(`alpha`) shares.
///
/// Fails with [`FedSplitError::Infeasible`] if `max_attempts` draws all
/// leave some client below `min_size`.
pub fn dirichlet_partition<R: Rng + ?Sized>(
    labels: &[Label],
    n_clients: usize,
    alpha: f64,
    min_size: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Partition, FedSplitError> {
    let by_class = indices_by_class(labels);
    let fair_share = labels.len() as f64 / n_clients as f64;
    let mut best_smallest = 0;

    for attempt in 1..=max_attempts {
        let mut clients: Vec<Vec<usize>> = vec![Vec::new(); n_clients];

        for (_, class_indices) in &by_class {
            let mut indices = class_indices.clone();
            indices.shuffle(rng);

            let draw = sample_dirichlet(rng, alpha, n_clients)?;
            let mut shares: Vec<f64> = draw
                .iter()
                .zip(&clients)
                .map(|(&p, held)| if (held.len() as f64) < fair_share { p } else { 0.0 })
                .collect();
            let total: f64 = shares.iter().sum();
            if total > 0.0 {
                shares.iter_mut().for_each(|s| *s /= total);
            } else {
                shares = draw;
            }

            let sizes = proportional_sizes(&shares, indices.len());
            for (held, chunk) in clients.iter_mut().zip(deal(&indices, &sizes)) {
                held.extend_from_slice(chunk);
            }
        }

        let smallest = clients.iter().map(Vec::len).min().unwrap_or(0);
        if smallest >= min_size {
            tracing::debug!(attempt, smallest, "dirichlet partition accepted");
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
