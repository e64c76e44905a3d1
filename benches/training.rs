use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use salescast::ml::gbdt_stump::{TrainDataset, TrainOptions, train_gbdt_stump};

const ROWS: usize = 240;
const FEATURES: usize = 5;

fn synthetic_dataset() -> TrainDataset {
    let x: Vec<Vec<f64>> = (0..ROWS)
        .map(|i| {
            (0..FEATURES)
                .map(|f| ((i * (f + 3)) % 17) as f64 + f as f64)
                .collect()
        })
        .collect();
    let y = x
        .iter()
        .map(|row| 3.0 * row[0] - 2.0 * row[3] + 0.5 * row[4])
        .collect();
    TrainDataset {
        feature_len: FEATURES,
        x,
        y,
    }
}

fn bench_fit(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    for rounds in [100usize, 500] {
        let options = TrainOptions {
            rounds,
            ..TrainOptions::default()
        };
        c.bench_with_input(
            BenchmarkId::new("gbdt_stump_fit", rounds),
            &options,
            |b, options| {
                b.iter(|| train_gbdt_stump(black_box(&dataset), options).expect("fit"));
            },
        );
    }
}

criterion_group!(benches, bench_fit);
criterion_main!(benches);
