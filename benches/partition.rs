use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fedsplit::dataset::synthetic::gaussian_blobs;
use fedsplit::{split_clients, Partitioner, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for &n_samples in &[10_000usize, 60_000] {
        let set = gaussian_blobs(&mut StdRng::seed_from_u64(0), n_samples, 8, 10).unwrap();

        for &n_clients in &[10usize, 100] {
            let id = format!("{}s_{}c", n_samples, n_clients);

            let strategies = [
                (
                    "label",
                    Strategy::Label {
                        n_class_per_client: 2,
                    },
                ),
                ("dirichlet", Strategy::Dirichlet { alpha: 0.5 }),
                ("dirichlet_quantity", Strategy::DirichletQuantity { alpha: 0.5 }),
                ("uniform", Strategy::Uniform),
            ];

            for (name, strategy) in strategies {
                let partitioner = Partitioner::new(strategy);
                group.bench_with_input(BenchmarkId::new(name, &id), &set, |b, set| {
                    b.iter(|| {
                        let mut rng = StdRng::seed_from_u64(1);
                        partitioner.partition(set.labels(), n_clients, &mut rng).unwrap()
                    })
                });
            }

            let clients = Partitioner::new(Strategy::Uniform)
                .split_dataset(&set, n_clients, &mut StdRng::seed_from_u64(2))
                .unwrap();
            group.bench_with_input(
                BenchmarkId::new("train_test_split", &id),
                &clients,
                |b, clients| {
                    b.iter(|| split_clients(clients, 0.2, &mut StdRng::seed_from_u64(3)).unwrap())
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_partition);
criterion_main!(benches);
