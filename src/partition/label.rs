//! Fixed classes per client ("pathological" non-IID).
//!
//! With `C` classes and `k` classes per client, client `i` holds classes
//! `(i*k + j) mod C` for `j` in `0..k`. Walking the clients this way visits
//! the class ring in order, so every class is held by `floor(N*k/C)` or
//! `ceil(N*k/C)` clients. Each class is then shuffled and dealt out in
//! near-equal chunks to its holders.
//!
//! Two edge cases are defined rather than rejected:
//!
//! - When `N*k < C` some classes have no holder. Their samples are dropped and
//!   reported in [`Partition::dropped`].
//! - When a class has fewer samples than holders, the trailing holders get
//!   zero samples of that class.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{deal, indices_by_class, Partition};
use crate::dataset::Label;
use crate::error::FedSplitError;
use crate::math::even_chunk_sizes;

/// Give every client exactly `n_class_per_client` distinct classes.
///
/// # Arguments
///
/// * `labels` - Label of every sample
/// * `n_clients` - Number of clients
/// * `n_class_per_client` - Classes per client, `1..=C`
/// * `rng` - Random source for the per-class shuffles
pub fn label_partition<R: Rng + ?Sized>(
    labels: &[Label],
    n_clients: usize,
    n_class_per_client: usize,
    rng: &mut R,
) -> Result<Partition, FedSplitError> {
    let by_class = indices_by_class(labels);
    let n_classes = by_class.len();

    if n_class_per_client == 0 || n_class_per_client > n_classes {
        return Err(FedSplitError::invalid(
            "n_class_per_client",
            format!(
                "{} (dataset has {} classes)",
                n_class_per_client, n_classes
            ),
        ));
    }

    let holders = class_holders(n_clients, n_class_per_client, n_classes);

    let mut clients: Vec<Vec<usize>> = vec![Vec::new(); n_clients];
    let mut dropped = Vec::new();

    for ((label, indices), owners) in by_class.into_iter().zip(&holders) {
        if owners.is_empty() {
            tracing::warn!(
                label,
                samples = indices.len(),
                "no client holds this class, dropping its samples"
            );
            dropped.extend(indices);
            continue;
        }
        if indices.len() < owners.len() {
            tracing::debug!(
                label,
                samples = indices.len(),
                holders = owners.len(),
                "class has fewer samples than holders"
            );
        }

        let mut indices = indices;
        indices.shuffle(rng);
        let sizes = even_chunk_sizes(indices.len(), owners.len());
        for (&client, chunk) in owners.iter().zip(deal(&indices, &sizes)) {
            clients[client].extend_from_slice(chunk);
        }
    }

    Ok(Partition::new(clients, dropped))
}

/// For each class position `0..n_classes`, the clients holding it (ascending).
pub fn class_holders(
    n_clients: usize,
    n_class_per_client: usize,
    n_classes: usize,
) -> Vec<Vec<usize>> {
    let mut holders = vec![Vec::new(); n_classes];
    if n_classes == 0 {
        return holders;
    }
    for client in 0..n_clients {
        for j in 0..n_class_per_client {
            holders[(client * n_class_per_client + j) % n_classes].push(client);
        }
    }
    holders
}
