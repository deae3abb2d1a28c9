//! Quickstart example: Dirichlet-skewed client shards from a synthetic dataset

use fedsplit::dataset::synthetic::gaussian_blobs;
use fedsplit::{generate, GenerateConfig, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    println!("fedsplit Quickstart Demo\n");

    // 2,000 samples, 10 classes
    let set = gaussian_blobs(&mut StdRng::seed_from_u64(0), 2_000, 8, 10).unwrap();

    let out = std::env::temp_dir().join("fedsplit-quickstart");
    let config = GenerateConfig::new(&out, 8, Strategy::Dirichlet { alpha: 0.3 }, 0.2)
        .with_min_size(50)
        .with_seed(42)
        .with_force(true);

    println!("Splitting across 8 clients with Dirichlet(0.3)...\n");
    let report = generate(&set, &config).unwrap();

    for (client, stats) in report.dataset.statistic.iter().enumerate() {
        println!(
            "Client {:>2}: {:>4} samples ({:>4} train / {:>3} test), labels {:?}",
            client,
            stats.total(),
            report.dataset.train_sizes[client],
            report.dataset.test_sizes[client],
            stats.label_counts()
        );
    }
    println!("\nShards written under {}", out.display());
}
