//! Compare how skewed each partitioning strategy is on the same dataset

use fedsplit::dataset::synthetic::gaussian_blobs;
use fedsplit::verification::size_spread;
use fedsplit::{Partitioner, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    println!("Comparing Partitioning Strategies\n");
    println!("Scenario: 5,000 samples, 10 classes, 10 clients\n");

    let set = gaussian_blobs(&mut StdRng::seed_from_u64(0), 5_000, 4, 10).unwrap();

    let strategies: Vec<(&str, Strategy)> = vec![
        ("Uniform (IID)", Strategy::Uniform),
        (
            "Label (2 per client)",
            Strategy::Label {
                n_class_per_client: 2,
            },
        ),
        ("Dirichlet (alpha=0.1)", Strategy::Dirichlet { alpha: 0.1 }),
        ("Dirichlet (alpha=10)", Strategy::Dirichlet { alpha: 10.0 }),
        ("Quantity (alpha=0.5)", Strategy::DirichletQuantity { alpha: 0.5 }),
    ];

    for (name, strategy) in strategies {
        let partition = Partitioner::new(strategy)
            .with_min_size(10)
            .partition(set.labels(), 10, &mut StdRng::seed_from_u64(7))
            .unwrap();
        let stats = partition.statistics(set.labels());
        let mean_labels =
            stats.iter().map(|s| s.n_labels()).sum::<usize>() as f64 / stats.len() as f64;

        println!(
            "{:<24} size spread: {:>5}  mean labels/client: {:>4.1}",
            name,
            size_spread(&partition),
            mean_labels
        );
    }
}
