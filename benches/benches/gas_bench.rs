//! # Gas Engine Benchmarks
//!
//! Measures the per-cycle math: ADC to resistance, ratio to ppm and the
//! composite index.
//!
//! Run: `cargo bench --bench gas_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use udara_gas::{channel_concentration, composite_index, resistance_from_adc, GasChannel, PerChannel};

fn bench_resistance(c: &mut Criterion) {
    let mut group = c.benchmark_group("resistance");

    for adc in [1u16, 2000, 4095] {
        group.bench_with_input(BenchmarkId::from_parameter(adc), &adc, |b, &adc| {
            b.iter(|| resistance_from_adc(black_box(adc), 3.3, 10.0, 4095))
        });
    }

    group.bench_function("full_scale_sweep", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for adc in 0..=4095u16 {
                sum += resistance_from_adc(adc, 3.3, 10.0, 4095);
            }
            black_box(sum)
        })
    });

    group.finish();
}

fn bench_concentration(c: &mut Criterion) {
    let mut group = c.benchmark_group("concentration");

    for channel in GasChannel::ALL {
        group.bench_function(channel.name(), |b| {
            b.iter(|| channel_concentration(channel, black_box(10.475), black_box(1.0656)))
        });
    }

    group.bench_function("invalid_baseline", |b| {
        b.iter(|| channel_concentration(GasChannel::Mq7, black_box(10.475), black_box(0.0)))
    });

    group.finish();
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("index");

    let clean = PerChannel::new(4.0, 1.5, 2.0);
    let polluted = PerChannel::new(900.0, 450.0, 700.0);

    group.bench_function("clean_air", |b| b.iter(|| composite_index(black_box(&clean))));
    group.bench_function("capped", |b| b.iter(|| composite_index(black_box(&polluted))));

    group.finish();
}

criterion_group!(benches, bench_resistance, bench_concentration, bench_index);
criterion_main!(benches);
