use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cblv::prelude::*;
use cblv::utils::random_tree;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_single_tree(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut group = c.benchmark_group("encode_formatted");

    for num_tips in [50, 500, 5000] {
        let tree = random_tree(num_tips, None, &mut rng).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(num_tips), &tree, |b, tree| {
            b.iter(|| encode_formatted(tree, EncodingKind::Plain, num_tips).unwrap());
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let trees: Vec<Tree> = (0..1000)
        .map(|_| random_tree(200, Some(2), &mut rng).unwrap())
        .collect();
    let encoder = BatchEncoder::new(EncoderConfig::binary_state());

    c.bench_function("batch_1000x200_binary_state", |b| {
        b.iter(|| encoder.encode(&trees).unwrap());
    });
}

criterion_group!(benches, bench_single_tree, bench_batch);
criterion_main!(benches);
