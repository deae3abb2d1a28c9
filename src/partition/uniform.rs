//! IID partitioning: shuffle, then cut into equal contiguous groups.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{deal, Partition};
use crate::math::even_chunk_sizes;

/// Split `n_samples` shuffled indices into `n_clients` groups.
///
/// The first `n_samples % n_clients` clients get one extra sample, so sizes
/// differ by at most 1.
pub fn uniform_partition<R: Rng + ?Sized>(
    n_samples: usize,
    n_clients: usize,
    rng: &mut R,
) -> Partition {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(rng);
    let sizes = even_chunk_sizes(n_samples, n_clients);
    let clients = deal(&indices, &sizes).map(<[usize]>::to_vec).collect();
    Partition::new(clients, Vec::new())
}
