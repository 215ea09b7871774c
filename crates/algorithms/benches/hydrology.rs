//! Benchmarks for the drainage pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rivulet_algorithms::hydrology::{
    drainage_analysis, flow_accumulation, flow_direction, AccumulationMethod, DrainageParams,
    FlowAccumulationParams,
};
use rivulet_core::{GeoTransform, Raster};

/// Basin-shaped DEM: edges sloping toward a central outlet, with a little
/// deterministic noise so no two neighbors tie.
fn basin_dem(size: usize) -> Raster<f64> {
    let mut dem = Raster::new(size, size);
    dem.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    let center = size as f64 / 2.0;
    for row in 0..size {
        for col in 0..size {
            let dr = row as f64 - center;
            let dc = col as f64 - center;
            let dist = (dr * dr + dc * dc).sqrt();
            let noise = ((row * 7 + col * 13) % 17) as f64 * 0.01;
            dem.set(row, col, dist + noise).unwrap();
        }
    }
    dem
}

fn bench_flow_direction(c: &mut Criterion) {
    let mut group = c.benchmark_group("hydrology/flow_direction");
    for size in [256, 512, 1024] {
        let dem = basin_dem(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| flow_direction(black_box(&dem)).unwrap())
        });
    }
    group.finish();
}

fn bench_flow_accumulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("hydrology/flow_accumulation");
    for size in [256, 512] {
        let dem = basin_dem(size);
        let fdir = flow_direction(&dem).unwrap();
        for (label, method) in [
            ("iterative", AccumulationMethod::Iterative),
            ("vectorized", AccumulationMethod::Vectorized),
            ("topological", AccumulationMethod::Topological),
        ] {
            group.bench_with_input(
                BenchmarkId::new(label, size),
                &size,
                |b, _| {
                    b.iter(|| {
                        flow_accumulation(
                            black_box(&fdir),
                            FlowAccumulationParams { method },
                        )
                        .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_drainage_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("hydrology/drainage_analysis");
    group.sample_size(10);
    for size in [256, 512] {
        let dem = basin_dem(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| drainage_analysis(black_box(&dem), DrainageParams::default()).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_flow_direction,
    bench_flow_accumulation,
    bench_drainage_pipeline
);
criterion_main!(benches);
