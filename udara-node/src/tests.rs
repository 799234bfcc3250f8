//! Testes do nó

use super::*;
use std::sync::{Arc, Mutex};

use udara_core::clock::{ManualClock, MonotonicClock};
use udara_core::io::{share, Eeprom, MemoryEeprom, MmapEeprom, SharedEeprom};
use udara_core::settings::NodeSettings;
use udara_core::traits::{Component, Transport, TransportError};
use udara_gas::{CalibrationState, CancelToken, DEFAULT_BASELINE};
use udara_orchestration::CycleOutcome;

const DOC: &str = r#"{
    "device_id": "node-test",
    "sensor_type": "MQ",
    "protocol": "serial",
    "interval_ms": 100
}"#;

fn settings() -> NodeSettings {
    NodeSettings {
        calibration_samples: 5,
        calibration_interval_ms: 0,
        transport_timeout_ms: 1000,
        ..NodeSettings::default()
    }
}

fn boot<E: Eeprom>(eeprom: SharedEeprom<E>) -> Node<E, SimulatedGasArray, SimulatedClimateProbe> {
    Node::boot(
        settings(),
        eeprom,
        SimulatedGasArray::steady(2000, 4095),
        SimulatedClimateProbe::default(),
        Box::new(ManualClock::new(1234)),
    )
    .unwrap()
}

fn fresh() -> (SharedEeprom<MemoryEeprom>, Node<MemoryEeprom, SimulatedGasArray, SimulatedClimateProbe>) {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    let node = boot(eeprom.clone());
    (eeprom, node)
}

#[derive(Debug, Default, Clone)]
struct Recorder {
    delivered: Arc<Mutex<Vec<String>>>,
}

impl Component for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }
}

impl Transport for Recorder {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        self.delivered.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BOOT E GATE DE CONFIGURAÇÃO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_fresh_node_is_uncalibrated_and_gated() {
    let (_, mut node) = fresh();

    assert_eq!(node.calibration_state(), CalibrationState::Absent);
    assert_eq!(node.baselines().mq7, DEFAULT_BASELINE);
    assert!(!node.is_configured());
    assert!(matches!(node.run_cycle(), Err(NodeError::NotConfigured)));
    assert_eq!(node.pipeline().stats().emitted, 0);
}

#[test]
fn test_provisioned_uncalibrated_node_emits_with_defaults() {
    let (_, mut node) = fresh();
    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();

    let reading = node.run_cycle().unwrap().into_reading().unwrap();
    assert_eq!(reading.identity().device_id, "node-test");
    assert_eq!(reading.baselines().mq135, DEFAULT_BASELINE);
    assert_eq!(reading.uptime_ms(), 1234);
}

#[test]
fn test_supplied_configuration_is_not_persisted() {
    let (eeprom, mut node) = fresh();
    node.use_configuration(DeviceConfiguration::from_json(DOC).unwrap());
    assert!(node.run_cycle().is_ok());

    let rebooted = boot(eeprom);
    assert!(!rebooted.is_configured());
}

#[test]
fn test_corrupt_configuration_blocks_cycles() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    eeprom.lock().unwrap().write_byte(CONFIG_ADDRESS, 0x42).unwrap();

    let mut node = boot(eeprom);
    assert!(!node.is_configured());
    assert!(node.status().config_fault.is_some());
    assert!(matches!(node.run_cycle(), Err(NodeError::NotConfigured)));

    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();
    assert!(node.status().config_fault.is_none());
    assert!(node.run_cycle().is_ok());
}

/// Grava marcador, tamanho e corpo crus na região de configuração
fn write_raw_config(eeprom: &SharedEeprom<MemoryEeprom>, len: u16, body: &[u8]) {
    let mut guard = eeprom.lock().unwrap();
    guard.write(CONFIG_ADDRESS + 1, &len.to_le_bytes()).unwrap();
    guard.write(CONFIG_ADDRESS + 3, body).unwrap();
    guard.write_byte(CONFIG_ADDRESS, CONFIG_MAGIC).unwrap();
}

/// Boot sobre a região dada termina desconfigurado, com motivo, e aceita novo provisionamento
fn assert_discarded_then_recoverable(eeprom: SharedEeprom<MemoryEeprom>) {
    let mut node = Node::boot(
        settings(),
        eeprom,
        SimulatedGasArray::steady(2000, 4095),
        SimulatedClimateProbe::default(),
        Box::new(ManualClock::new(0)),
    )
    .expect("a bad stored configuration must not stop the boot");

    assert!(!node.is_configured());
    assert!(node.status().config_fault.is_some());
    assert!(matches!(node.run_cycle(), Err(NodeError::NotConfigured)));

    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();
    assert!(node.is_configured());
    assert!(node.run_cycle().is_ok());
}

#[test]
fn test_stored_document_failing_validation_is_discarded() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    let doc = br#"{"device_id":"x","sensor_type":"MQ","protocol":"lora","interval_ms":2000}"#;
    write_raw_config(&eeprom, doc.len() as u16, doc);
    assert_discarded_then_recoverable(eeprom);

    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    let doc = br#"{"device_id":"x","sensor_type":"MQ","protocol":"serial","interval_ms":5}"#;
    write_raw_config(&eeprom, doc.len() as u16, doc);
    assert_discarded_then_recoverable(eeprom);
}

#[test]
fn test_stored_length_out_of_range_is_discarded() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    write_raw_config(&eeprom, 0, b"");
    assert_discarded_then_recoverable(eeprom);

    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    write_raw_config(&eeprom, (CONFIG_REGION_LEN as u16) + 1, b"{}");
    assert_discarded_then_recoverable(eeprom);
}

#[test]
fn test_stored_non_utf8_body_is_discarded() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    write_raw_config(&eeprom, 4, &[0xC3, 0x28, 0xFE, 0xFF]);
    assert_discarded_then_recoverable(eeprom);
}

#[test]
fn test_stored_malformed_json_is_discarded() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    write_raw_config(&eeprom, 9, b"{\"device_");
    assert_discarded_then_recoverable(eeprom);
}

#[test]
fn test_stored_unknown_marker_is_discarded() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    eeprom.lock().unwrap().write_byte(CONFIG_ADDRESS, 0x42).unwrap();
    assert_discarded_then_recoverable(eeprom);
}

#[test]
fn test_deprovision_blocks_again() {
    let (eeprom, mut node) = fresh();
    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();
    node.deprovision().unwrap();

    assert!(matches!(node.run_cycle(), Err(NodeError::NotConfigured)));
    assert!(!boot(eeprom).is_configured());
}

#[test]
fn test_storage_too_small_is_fatal() {
    let eeprom = share(MemoryEeprom::new(16));
    let result = Node::boot(
        settings(),
        eeprom,
        SimulatedGasArray::default(),
        SimulatedClimateProbe::default(),
        Box::new(ManualClock::new(0)),
    );
    assert!(matches!(result, Err(NodeError::Config(_))));
}

#[test]
fn test_invalid_front_end_rejected_at_boot() {
    let bad = NodeSettings {
        supply_voltage: 0.0,
        ..settings()
    };
    let result = Node::boot(
        bad,
        share(MemoryEeprom::new(EEPROM_CAPACITY)),
        SimulatedGasArray::default(),
        SimulatedClimateProbe::default(),
        Box::new(ManualClock::new(0)),
    );
    assert!(matches!(result, Err(NodeError::Gas(_))));
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALIBRAÇÃO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_calibration_updates_cycles_and_storage() {
    let (eeprom, mut node) = fresh();
    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();

    let mut reports = 0;
    let baselines = node.calibrate(|_| reports += 1, &CancelToken::new()).unwrap();

    assert_eq!(reports, 5);
    assert!((baselines.mq135 - 1.0656).abs() < 1e-3);
    assert_eq!(node.calibration_state(), CalibrationState::Valid(baselines));

    let reading = node.run_cycle().unwrap().into_reading().unwrap();
    assert_eq!(*reading.baselines(), baselines);

    // Referências e configuração sobrevivem ao reboot na mesma imagem
    let rebooted = boot(eeprom);
    assert_eq!(rebooted.calibration_state(), CalibrationState::Valid(baselines));
    assert!(rebooted.is_configured());
}

#[test]
fn test_cancelled_calibration_keeps_previous_baselines() {
    let (eeprom, mut node) = fresh();
    let cancel = CancelToken::new();
    cancel.cancel();

    assert!(matches!(node.calibrate(|_| {}, &cancel), Err(NodeError::Gas(_))));
    assert_eq!(node.calibration_state(), CalibrationState::Absent);
    assert_eq!(node.baselines().mq9, DEFAULT_BASELINE);
    assert_eq!(eeprom.lock().unwrap().commit_count(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOP AGENDADO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_scheduled_run_dispatches_each_reading() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    let mut node = Node::boot(
        settings(),
        eeprom,
        SimulatedGasArray::default(),
        SimulatedClimateProbe::new(Some(2)),
        Box::new(MonotonicClock::new()),
    )
    .unwrap();
    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();

    let recorder = Recorder::default();
    let delivered = Arc::clone(&recorder.delivered);
    let summary = node.run_scheduled(recorder, Some(3), &CancelToken::new()).unwrap();

    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.pipeline.emitted, 3);
    assert_eq!(summary.dispatch.sent, 3);
    assert_eq!(summary.scheduler.tick_count, 3);

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 3);
    let first: serde_json::Value = serde_json::from_str(&delivered[0]).unwrap();
    assert_eq!(first["device_id"], "node-test");
    assert!(first["aqi"].is_number());
}

#[test]
fn test_scheduled_run_requires_configuration() {
    let (_, mut node) = fresh();
    let result = node.run_scheduled(Recorder::default(), Some(1), &CancelToken::new());
    assert!(matches!(result, Err(NodeError::NotConfigured)));
}

#[test]
fn test_stopped_run_does_no_cycles() {
    let (_, mut node) = fresh();
    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();

    let stop = CancelToken::new();
    stop.cancel();
    let summary = node.run_scheduled(Recorder::default(), None, &stop).unwrap();
    assert_eq!(summary.cycles, 0);
    assert_eq!(summary.dispatch.submitted, 0);
}

#[test]
fn test_cancel_mid_run_stops_and_drains() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    let mut node = Node::boot(
        settings(),
        eeprom,
        SimulatedGasArray::default(),
        SimulatedClimateProbe::default(),
        Box::new(MonotonicClock::new()),
    )
    .unwrap();
    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();

    let stop = CancelToken::new();
    let remote = stop.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(250));
        remote.cancel();
    });

    let recorder = Recorder::default();
    let delivered = Arc::clone(&recorder.delivered);
    let summary = node.run_scheduled(recorder, None, &stop).unwrap();
    canceller.join().unwrap();

    assert!(summary.cycles >= 1);
    assert_eq!(summary.dispatch.pending(), 0);
    assert_eq!(summary.dispatch.sent, summary.pipeline.emitted);
    assert_eq!(delivered.lock().unwrap().len() as u64, summary.pipeline.emitted);
}

#[test]
fn test_raw_out_of_range_skips_cycle() {
    let eeprom = share(MemoryEeprom::new(EEPROM_CAPACITY));
    let narrow = NodeSettings {
        adc_max: 1023,
        ..settings()
    };
    let mut node = Node::boot(
        narrow,
        eeprom,
        SimulatedGasArray::steady(4095, 4095),
        SimulatedClimateProbe::default(),
        Box::new(ManualClock::new(0)),
    )
    .unwrap();
    node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();

    assert!(matches!(node.run_cycle().unwrap(), CycleOutcome::NoReading(_)));
    assert_eq!(node.pipeline().stats().skipped, 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATUS E IMAGEM EM ARQUIVO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_status_hides_secrets() {
    let (_, mut node) = fresh();
    let doc = r#"{
        "device_id": "node-mqtt",
        "sensor_type": "MQ",
        "protocol": "mqtt",
        "interval_ms": 2000,
        "mqtt": {"host": "broker.local", "port": 1883, "topic": "udara/air", "client_id": "n1",
                 "username": "u", "password": "hunter2"},
        "wifi": {"ssid": "lab", "password": "wifi-secret"}
    }"#;
    node.provision(DeviceConfiguration::from_json(doc).unwrap()).unwrap();

    let status = node.status();
    assert_eq!(status.calibration, "absent");
    let summary = status.configuration.clone().unwrap();
    assert_eq!(summary.protocol, "mqtt");
    assert!(summary.wifi);

    let json = serde_json::to_string(&status).unwrap();
    assert!(!json.contains("hunter2"));
    assert!(!json.contains("wifi-secret"));
}

#[test]
fn test_file_image_survives_reboot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("udara.eeprom");

    let baselines = {
        let eeprom = share(MmapEeprom::open(&path, EEPROM_CAPACITY).unwrap());
        let mut node = boot(eeprom);
        node.provision(DeviceConfiguration::from_json(DOC).unwrap()).unwrap();
        node.calibrate(|_| {}, &CancelToken::new()).unwrap()
    };

    let eeprom = share(MmapEeprom::open(&path, EEPROM_CAPACITY).unwrap());
    let node = boot(eeprom);
    assert_eq!(node.calibration_state(), CalibrationState::Valid(baselines));
    assert_eq!(node.configuration().unwrap().device_id(), "node-test");
}
