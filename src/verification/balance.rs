//! Client size checks.

use crate::error::FedSplitError;
use crate::partition::Partition;

/// Difference between the largest and smallest client (0 with no clients).
pub fn size_spread(partition: &Partition) -> usize {
    let sizes = partition.sizes();
    match (sizes.iter().max(), sizes.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}

/// Check that every client holds at least `min_size` samples.
pub fn check_min_size(partition: &Partition, min_size: usize) -> Result<(), FedSplitError> {
    match partition
        .sizes()
        .iter()
        .enumerate()
        .find(|&(_, &size)| size < min_size)
    {
        Some((client, size)) => Err(FedSplitError::VerificationError(format!(
            "Client {} holds {} samples, below min_size {}",
            client, size, min_size
        ))),
        None => Ok(()),
    }
}

/// Check that client sizes differ by at most `max_spread`.
pub fn check_max_spread(partition: &Partition, max_spread: usize) -> Result<(), FedSplitError> {
    let spread = size_spread(partition);
    if spread <= max_spread {
        Ok(())
    } else {
        Err(FedSplitError::VerificationError(format!(
            "Client sizes differ by {} (allowed {})",
            spread, max_spread
        )))
    }
}
