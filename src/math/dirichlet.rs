//! Symmetric Dirichlet sampling.
//!
//! Draws `k` independent Gamma(alpha, 1) variates and normalizes them. Small
//! `alpha` concentrates mass on few clients; large `alpha` approaches uniform.

use rand::Rng;
use rand_distr::{Distribution, Gamma};

use crate::error::FedSplitError;

/// Sample a point on the `k`-simplex from a symmetric Dirichlet(`alpha`).
///
/// For very small `alpha` every Gamma draw can underflow to zero. In that
/// limit all mass sits on one component, so a uniformly chosen one-hot vector
/// is returned instead of dividing by zero.
///
/// # Arguments
///
/// * `rng` - Random source (callers pass a seeded `StdRng`)
/// * `alpha` - Concentration parameter, must be finite and > 0
/// * `k` - Number of components
pub fn sample_dirichlet<R: Rng + ?Sized>(
    rng: &mut R,
    alpha: f64,
    k: usize,
) -> Result<Vec<f64>, FedSplitError> {
    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(FedSplitError::invalid(
            "alpha",
            format!("{} (must be finite and > 0)", alpha),
        ));
    }

    match k {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![1.0]),
        _ => {}
    }

    let gamma = Gamma::new(alpha, 1.0).map_err(|e| FedSplitError::invalid("alpha", e.to_string()))?;
    let mut draws: Vec<f64> = (0..k).map(|_| gamma.sample(rng)).collect();
    let total: f64 = draws.iter().sum();

    if total > 0.0 && total.is_finite() {
        draws.iter_mut().for_each(|d| *d /= total);
    } else {
        let hot = rng.gen_range(0..k);
        draws.iter_mut().enumerate().for_each(|(i, d)| {
            *d = if i == hot { 1.0 } else { 0.0 };
        });
    }

    Ok(draws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sums_to_one() {
        let mut rng = StdRng::seed_from_u64(7);
        for &alpha in &[0.05, 0.5, 1.0, 10.0] {
            let p = sample_dirichlet(&mut rng, alpha, 8).unwrap();
            assert_eq!(p.len(), 8);
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(p.iter().all(|&x| (0.0..=1.0).contains(&x)));
        }
    }

    #[test]
    fn test_degenerate_sizes() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sample_dirichlet(&mut rng, 1.0, 0).unwrap().is_empty());
        assert_eq!(sample_dirichlet(&mut rng, 1.0, 1).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_invalid_alpha() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sample_dirichlet(&mut rng, 0.0, 3).is_err());
        assert!(sample_dirichlet(&mut rng, -1.0, 3).is_err());
        assert!(sample_dirichlet(&mut rng, f64::NAN, 3).is_err());
        assert!(sample_dirichlet(&mut rng, f64::INFINITY, 3).is_err());
    }

    #[test]
    fn test_tiny_alpha_still_normalized() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let p = sample_dirichlet(&mut rng, 1e-4, 5).unwrap();
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_large_alpha_near_uniform() {
        let mut rng = StdRng::seed_from_u64(11);
        let p = sample_dirichlet(&mut rng, 10_000.0, 4).unwrap();
        for x in p {
            assert!((x - 0.25).abs() < 0.05, "expected ~0.25, got {}", x);
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let a = sample_dirichlet(&mut StdRng::seed_from_u64(42), 0.5, 6).unwrap();
        let b = sample_dirichlet(&mut StdRng::seed_from_u64(42), 0.5, 6).unwrap();
        assert_eq!(a, b);
    }
}
