//! Testes integrados do canal climático

use crate::*;
use udara_core::traits::SensorError;

#[test]
fn test_flaky_sensor_sequence() {
    let mut monitor = ClimateMonitor::new();
    let reads: Vec<Result<ClimateSample, SensorError>> = vec![
        Ok(ClimateSample::new(29.0, 70.0)),
        Ok(ClimateSample::new(f32::NAN, 70.0)),
        Err(SensorError::ReadFailed("checksum".into())),
        Ok(ClimateSample::new(29.5, 69.0)),
        Ok(ClimateSample::new(-45.0, 69.0)),
    ];

    let readings: Vec<ClimateReading> = reads.into_iter().map(|r| monitor.accept(r)).collect();

    let sources: Vec<ClimateSource> = readings.iter().map(|r| r.source).collect();
    assert_eq!(
        sources,
        vec![
            ClimateSource::Measured,
            ClimateSource::LastKnownGood,
            ClimateSource::LastKnownGood,
            ClimateSource::Measured,
            ClimateSource::LastKnownGood,
        ]
    );

    let counters: Vec<u32> = readings.iter().map(|r| r.consecutive_failures).collect();
    assert_eq!(counters, vec![0, 1, 2, 0, 1]);

    assert_eq!(readings[2].sample, ClimateSample::new(29.0, 70.0));
    assert_eq!(readings[4].sample, ClimateSample::new(29.5, 69.0));
}

#[test]
fn test_custom_limits_are_applied() {
    let limits = ClimateLimits::new(0.0, 50.0, 5.0, 95.0).unwrap();
    let mut monitor = ClimateMonitor::with_limits(limits, ClimateSample::new(20.0, 50.0));

    assert!(!monitor.accept(Ok(ClimateSample::new(60.0, 50.0))).is_fresh());
    assert!(!monitor.accept(Ok(ClimateSample::new(20.0, 99.0))).is_fresh());
    assert!(monitor.accept(Ok(ClimateSample::new(45.0, 90.0))).is_fresh());
}

#[test]
fn test_counter_never_overflows() {
    let mut monitor = ClimateMonitor::new();
    for _ in 0..1000 {
        monitor.accept(Ok(ClimateSample::new(f32::NAN, f32::NAN)));
    }
    assert_eq!(monitor.consecutive_failures(), 1000);
    assert_eq!(monitor.total_failures(), 1000);
}
