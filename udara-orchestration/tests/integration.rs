//! Testes de integração para udara-orchestration

use std::sync::{Arc, Mutex};

use udara_core::prelude::*;
use udara_environment::ClimateSample;
use udara_gas::{AdcFrontEnd, CalibrationPlan, CalibrationStore, CancelToken, RawSamples};
use udara_orchestration::*;

#[derive(Debug)]
struct SteadyArray(u16);

impl Component for SteadyArray {
    fn name(&self) -> &str {
        "steady-array"
    }
}

impl Sensor for SteadyArray {
    type RawData = RawSamples;

    fn read(&mut self) -> Result<RawSamples, SensorError> {
        Ok(RawSamples::splat(self.0))
    }
}

#[derive(Debug)]
struct FixedProbe;

impl Component for FixedProbe {
    fn name(&self) -> &str {
        "fixed-probe"
    }
}

impl Sensor for FixedProbe {
    type RawData = ClimateSample;

    fn read(&mut self) -> Result<ClimateSample, SensorError> {
        Ok(ClimateSample::new(26.4, 61.2))
    }
}

#[derive(Debug, Default)]
struct Collector(Arc<Mutex<Vec<String>>>);

impl Component for Collector {
    fn name(&self) -> &str {
        "collector"
    }
}

impl Transport for Collector {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        self.0.lock().map_err(|_| TransportError::Closed)?.push(payload.to_string());
        Ok(())
    }
}

#[test]
fn test_calibrate_then_read_then_dispatch() {
    let store = CalibrationStore::new(share(MemoryEeprom::new(64)), 0).unwrap();
    let mut gas = SteadyArray(2000);

    let plan = CalibrationPlan::new(4, 0).unwrap();
    let baselines = store
        .run_calibration(&plan, &AdcFrontEnd::REFERENCE, || gas.read(), |_| {}, &CancelToken::new())
        .unwrap();
    assert_eq!(store.baselines(), baselines);

    let mut pipeline = ReadingPipeline::new(gas, FixedProbe, DeviceIdentity::new("node-it", "MQ"));
    let clock = ManualClock::new(0);

    let delivered = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::spawn(Collector(Arc::clone(&delivered)), DispatchConfig::default()).unwrap();

    let mut scheduler = CycleScheduler::new(1000).unwrap();
    for _ in 0..3 {
        let tick = scheduler.wait_for_next_tick(&clock);
        let reading = pipeline
            .run_cycle(&store.baselines(), tick.at)
            .into_reading()
            .unwrap();
        dispatcher.submit(reading.to_json().unwrap()).unwrap();
        clock.advance(1000);
    }

    let stats = dispatcher.shutdown();
    assert_eq!(stats.sent, 3);
    assert_eq!(scheduler.missed_ticks(), 0);

    let delivered = delivered.lock().unwrap();
    let last: WireReading = serde_json::from_str(&delivered[2]).unwrap();
    assert_eq!(last.device_id, "node-it");
    assert_eq!(last.uptime_ms, 2000);
    assert_eq!(last.temperature, 26.4);
    assert_eq!(last.ro_135, 1.066);
}

#[test]
fn test_cycle_without_climate_history_uses_initial_values() {
    #[derive(Debug)]
    struct DeadProbe;

    impl Component for DeadProbe {
        fn name(&self) -> &str {
            "dead-probe"
        }
    }

    impl Sensor for DeadProbe {
        type RawData = ClimateSample;

        fn read(&mut self) -> Result<ClimateSample, SensorError> {
            Err(SensorError::Timeout(250))
        }
    }

    let mut pipeline = ReadingPipeline::new(SteadyArray(1500), DeadProbe, DeviceIdentity::new("node-it", "MQ"));
    let reading = pipeline
        .run_cycle(&udara_gas::Baselines::splat(10.0), 0)
        .into_reading()
        .unwrap();

    assert_eq!(reading.climate().sample, ClimateSample::default());
    assert_eq!(reading.climate().consecutive_failures, 1);
}
