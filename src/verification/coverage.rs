//! Coverage verification for partitions.
//!
//! Client index sets and the drop set must together hit every index in
//! `0..n_samples` exactly once.

use crate::error::FedSplitError;
use crate::partition::Partition;

/// Check that `partition` covers `0..n_samples` with no overlap.
///
/// Returns `Ok(())` on exact coverage, or a
/// [`FedSplitError::VerificationError`] naming the first problem found.
pub fn check_coverage(partition: &Partition, n_samples: usize) -> Result<(), FedSplitError> {
    let mut seen = vec![false; n_samples];

    let assigned = partition.clients().iter().flatten();
    for &idx in assigned.chain(partition.dropped()) {
        match seen.get_mut(idx) {
            None => {
                return Err(FedSplitError::VerificationError(format!(
                    "Index {} out of range for {} samples",
                    idx, n_samples
                )))
            }
            Some(true) => {
                return Err(FedSplitError::VerificationError(format!(
                    "Index {} assigned more than once",
                    idx
                )))
            }
            Some(slot) => *slot = true,
        }
    }

    let missing = seen.iter().filter(|&&s| !s).count();
    if missing > 0 {
        return Err(FedSplitError::VerificationError(format!(
            "{} of {} samples neither assigned nor dropped",
            missing, n_samples
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_cover() {
        let p = Partition::new(vec![vec![0, 3], vec![1]], vec![2]);
        assert!(check_coverage(&p, 4).is_ok());
    }

    #[test]
    fn test_duplicate() {
        let p = Partition::new(vec![vec![0, 1], vec![1]], vec![]);
        assert!(matches!(
            check_coverage(&p, 2),
            Err(FedSplitError::VerificationError(_))
        ));
    }

    #[test]
    fn test_duplicate_between_client_and_drop() {
        let p = Partition::new(vec![vec![0, 1]], vec![1]);
        assert!(check_coverage(&p, 2).is_err());
    }

    #[test]
    fn test_missing() {
        let p = Partition::new(vec![vec![0], vec![2]], vec![]);
        assert!(check_coverage(&p, 3).is_err());
    }

    #[test]
    fn test_out_of_range() {
        let p = Partition::new(vec![vec![0, 5]], vec![]);
        assert!(check_coverage(&p, 2).is_err());
    }
}
