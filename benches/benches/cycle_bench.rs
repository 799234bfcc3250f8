//! # Cycle Benchmarks
//!
//! Measures one full reading cycle and its JSON serialization.
//!
//! Run: `cargo bench --bench cycle_bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use udara_core::prelude::*;
use udara_environment::ClimateSample;
use udara_gas::{Baselines, RawSamples};
use udara_orchestration::{DeviceIdentity, ReadingPipeline};

#[derive(Debug)]
struct Drifting(u16);

impl Component for Drifting {
    fn name(&self) -> &str {
        "drifting"
    }
}

impl Sensor for Drifting {
    type RawData = RawSamples;

    fn read(&mut self) -> Result<RawSamples, SensorError> {
        self.0 = if self.0 >= 3000 { 1000 } else { self.0 + 7 };
        Ok(RawSamples::new(self.0, self.0 / 2, self.0 + 500))
    }
}

#[derive(Debug)]
struct Probe;

impl Component for Probe {
    fn name(&self) -> &str {
        "probe"
    }
}

impl Sensor for Probe {
    type RawData = ClimateSample;

    fn read(&mut self) -> Result<ClimateSample, SensorError> {
        Ok(ClimateSample::new(29.1, 68.4))
    }
}

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle");
    let baselines = Baselines::new(1.07, 0.33, 0.52);

    let mut pipeline = ReadingPipeline::new(Drifting(1000), Probe, DeviceIdentity::new("bench", "MQ"));
    group.bench_function("run_cycle", |b| {
        b.iter(|| black_box(pipeline.run_cycle(&baselines, 0)))
    });

    let mut pipeline = ReadingPipeline::new(Drifting(1000), Probe, DeviceIdentity::new("bench", "MQ"));
    group.bench_function("run_cycle_to_json", |b| {
        b.iter(|| {
            let reading = pipeline.run_cycle(&baselines, 0).into_reading();
            black_box(reading.map(|r| r.to_json()))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_cycle);
criterion_main!(benches);
