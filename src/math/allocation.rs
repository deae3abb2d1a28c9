//! Integer allocation helpers.

/// Sizes for splitting `n` items into `parts` contiguous chunks.
///
/// The first `n % parts` chunks get one extra item, so sizes differ by at
/// most 1. Returns an empty vector when `parts == 0`.
pub fn even_chunk_sizes(n: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return Vec::new();
    }
    let base = n / parts;
    let extra = n % parts;
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}

/// Sizes obtained by cutting `n` items at the cumulative proportion points.
///
/// Cut `i` sits at `floor(n * sum(proportions[..=i]))`, the last chunk takes
/// whatever remains. Proportions are expected to sum to ~1.
pub fn proportional_sizes(proportions: &[f64], n: usize) -> Vec<usize> {
    if proportions.is_empty() {
        return Vec::new();
    }

    let mut sizes = Vec::with_capacity(proportions.len());
    let mut cumulative = 0.0;
    let mut prev_cut = 0usize;

    for &p in &proportions[..proportions.len() - 1] {
        cumulative += p;
        let cut = ((cumulative * n as f64) as usize).clamp(prev_cut, n);
        sizes.push(cut - prev_cut);
        prev_cut = cut;
    }
    sizes.push(n - prev_cut);
    sizes
}

/// Apportion `total` across `weights` proportionally (Hamilton's method).
///
/// Each entry gets `floor(w * total / sum)`; the leftover units go to the
/// largest remainders, ties broken by position. No entry exceeds its weight
/// as long as `total <= sum(weights)`.
pub fn largest_remainder(weights: &[usize], total: usize) -> Vec<usize> {
    let sum: usize = weights.iter().sum();
    if sum == 0 {
        return vec![0; weights.len()];
    }

    let mut shares: Vec<usize> = weights.iter().map(|&w| w * total / sum).collect();
    let assigned: usize = shares.iter().sum();

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = weights[a] * total % sum;
        let rb = weights[b] * total % sum;
        rb.cmp(&ra).then(a.cmp(&b))
    });

    for &i in order.iter().take(total.saturating_sub(assigned)) {
        shares[i] += 1;
    }
    shares
}
