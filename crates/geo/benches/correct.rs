//! Benchmarks for coordinate correction.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use timejourney_geo::{batch::PointItem, correct, correct_points, restore, GeoPoint};

fn create_test_items(count: usize) -> Vec<PointItem> {
    (0..count)
        .map(|i| {
            // Generate points in a grid around Beijing
            let lat = 39.0 + (i as f64 * 0.01) % 2.0;
            let lng = 116.0 + (i as f64 * 0.01) % 2.0;
            PointItem {
                id: i as i64,
                latitude: lat,
                longitude: lng,
            }
        })
        .collect()
}

fn bench_single_correction(c: &mut Criterion) {
    let beijing = GeoPoint::new(39.9042, 116.4074);
    let paris = GeoPoint::new(48.8566, 2.3522);

    let mut group = c.benchmark_group("correct_single");
    group.bench_function("in_region", |b| b.iter(|| correct(black_box(beijing))));
    group.bench_function("out_of_region", |b| b.iter(|| correct(black_box(paris))));
    group.finish();
}

fn bench_restore(c: &mut Criterion) {
    let on_map = GeoPoint::new(39.905_603_343_165_07, 116.413_642_253_788_03);

    c.bench_function("restore_single", |b| b.iter(|| restore(black_box(on_map))));
}

fn bench_batch_correction(c: &mut Criterion) {
    let mut group = c.benchmark_group("correct_points");

    for size in [10, 100, 1000, 10000].iter() {
        let items = create_test_items(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| correct_points(black_box(&items)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_correction, bench_restore, bench_batch_correction);
criterion_main!(benches);
