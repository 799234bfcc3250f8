//! # Nó Udara
//!
//! Junta as peças do nó sobre uma única imagem de EEPROM:
//!
//! ```text
//! 0x000 ┌──────────────────────┐
//!       │ calibração (13 B)    │
//! 0x020 ├──────────────────────┤
//!       │ configuração (480 B) │
//! 0x200 └──────────────────────┘
//! ```
//!
//! Nenhum ciclo roda sem configuração válida. Calibração e ciclos tomam
//! `&mut self`, então nunca se sobrepõem dentro do mesmo nó.

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use udara_core::clock::Clock;
use udara_core::io::{Eeprom, EepromError, SharedEeprom};
use udara_core::settings::NodeSettings;
use udara_core::traits::{Sensor, Transport};
use udara_environment::ClimateSample;
use udara_gas::{
    AdcFrontEnd, Baselines, CalibrationPlan, CalibrationProgress, CalibrationState, CalibrationStore, CancelToken,
    GasError, RawSamples,
};
use udara_orchestration::{
    CycleOutcome, CycleScheduler, DeviceIdentity, DispatchConfig, DispatchStats, Dispatcher, OrchestrationError,
    PipelineConfig, PipelineStats, ReadingPipeline, SchedulerStats,
};

use crate::config::{ConfigError, DeviceConfiguration};
use crate::store::ConfigStore;

/// Tamanho da imagem de EEPROM do nó
pub const EEPROM_CAPACITY: usize = 512;
/// Início do bloco de calibração
pub const CALIBRATION_ADDRESS: usize = 0;
/// Início da região de configuração
pub const CONFIG_ADDRESS: usize = 32;
/// Tamanho da região de configuração
pub const CONFIG_REGION_LEN: usize = EEPROM_CAPACITY - CONFIG_ADDRESS;

pub type NodeResult<T> = Result<T, NodeError>;

/// Erros do nó
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Storage error: {0}")]
    Storage(#[from] EepromError),

    #[error(transparent)]
    Gas(#[from] GasError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Node is not configured: provision a configuration before running cycles")]
    NotConfigured,

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),
}

/// Resumo de uma execução agendada
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cycles: u64,
    pub pipeline: PipelineStats,
    pub scheduler: SchedulerStats,
    pub dispatch: DispatchStats,
}

/// Configuração sem segredos, para exibição
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub device_id: String,
    pub sensor_type: String,
    pub protocol: &'static str,
    pub interval_ms: u64,
    pub wifi: bool,
}

impl From<&DeviceConfiguration> for ConfigSummary {
    fn from(config: &DeviceConfiguration) -> Self {
        Self {
            device_id: config.identity().device_id.clone(),
            sensor_type: config.identity().sensor_type.clone(),
            protocol: config.transport().protocol(),
            interval_ms: config.interval_ms(),
            wifi: config.wifi().is_some(),
        }
    }
}

/// Estado do nó para o comando `status`
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatus {
    /// `valid`, `absent` ou `corrupt`
    pub calibration: &'static str,
    pub baselines: Baselines,
    pub configuration: Option<ConfigSummary>,
    /// Motivo pelo qual a configuração guardada foi descartada
    pub config_fault: Option<String>,
    pub pipeline: PipelineStats,
    pub uptime_ms: u64,
}

/// Nó de sensoriamento
pub struct Node<E: Eeprom, G, C> {
    settings: NodeSettings,
    calibration: CalibrationStore<E>,
    config_store: ConfigStore<E>,
    pipeline: ReadingPipeline<G, C>,
    clock: Box<dyn Clock>,
    calibration_state: CalibrationState,
    configuration: Option<DeviceConfiguration>,
    config_fault: Option<String>,
}

impl<E: Eeprom, G: std::fmt::Debug, C: std::fmt::Debug> std::fmt::Debug for Node<E, G, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("settings", &self.settings)
            .field("calibration_state", &self.calibration_state)
            .field("configuration", &self.configuration)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl<E, G, C> Node<E, G, C>
where
    E: Eeprom,
    G: Sensor<RawData = RawSamples>,
    C: Sensor<RawData = ClimateSample>,
{
    /// Sobe o nó: abre as duas regiões e carrega o que estiver persistido.
    ///
    /// Falha de armazenamento é fatal. Calibração ausente ou corrompida cai
    /// nas referências padrão; configuração ausente ou corrompida deixa o nó
    /// bloqueado até um provisionamento.
    pub fn boot(
        settings: NodeSettings,
        eeprom: SharedEeprom<E>,
        gas: G,
        climate: C,
        clock: Box<dyn Clock>,
    ) -> NodeResult<Self> {
        let calibration = CalibrationStore::new(eeprom.clone(), CALIBRATION_ADDRESS)?;
        let config_store = ConfigStore::new(eeprom, CONFIG_ADDRESS, CONFIG_REGION_LEN)?;

        let calibration_state = calibration.load()?;

        let (configuration, config_fault) = match config_store.load() {
            Ok(Some(config)) => {
                tracing::info!(
                    device_id = config.device_id(),
                    protocol = config.transport().protocol(),
                    interval_ms = config.interval_ms(),
                    "configuration loaded"
                );
                (Some(config), None)
            }
            Ok(None) => {
                tracing::warn!("node not provisioned, cycles are blocked");
                (None, None)
            }
            Err(ConfigError::Corrupt(reason)) => {
                tracing::warn!(%reason, "stored configuration discarded, cycles are blocked");
                (None, Some(reason))
            }
            Err(e) => return Err(e.into()),
        };

        let front_end = AdcFrontEnd::new(settings.supply_voltage, settings.load_resistance, settings.adc_max)?;
        let identity = configuration
            .as_ref()
            .map(|c| c.identity().clone())
            .unwrap_or_else(|| DeviceIdentity::new("unprovisioned", "MQ"));
        let pipeline_config = PipelineConfig {
            front_end,
            ..PipelineConfig::default()
        };
        let pipeline = ReadingPipeline::with_config(gas, climate, identity, pipeline_config)?;

        Ok(Self {
            settings,
            calibration,
            config_store,
            pipeline,
            clock,
            calibration_state,
            configuration,
            config_fault,
        })
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration_state
    }

    /// Referências em uso nos ciclos
    pub fn baselines(&self) -> Baselines {
        self.calibration.baselines()
    }

    pub fn pipeline(&self) -> &ReadingPipeline<G, C> {
        &self.pipeline
    }

    /// Configuração ativa; erro enquanto o nó não está configurado
    pub fn configuration(&self) -> NodeResult<&DeviceConfiguration> {
        self.configuration.as_ref().ok_or(NodeError::NotConfigured)
    }

    pub fn is_configured(&self) -> bool {
        self.configuration.is_some()
    }

    /// Valida, persiste e ativa uma configuração
    pub fn provision(&mut self, config: DeviceConfiguration) -> NodeResult<()> {
        self.config_store.persist(&config)?;
        self.use_configuration(config);
        Ok(())
    }

    /// Ativa uma configuração só em memória (não sobrevive ao reboot)
    pub fn use_configuration(&mut self, config: DeviceConfiguration) {
        self.pipeline.set_identity(config.identity().clone());
        self.configuration = Some(config);
        self.config_fault = None;
    }

    /// Apaga a configuração guardada e bloqueia os ciclos
    pub fn deprovision(&mut self) -> NodeResult<()> {
        self.config_store.clear()?;
        self.configuration = None;
        Ok(())
    }

    /// Calibra em ar limpo com o plano vindo das configurações do nó
    pub fn calibrate<P>(&mut self, progress: P, cancel: &CancelToken) -> NodeResult<Baselines>
    where
        P: FnMut(&CalibrationProgress),
    {
        let plan = CalibrationPlan::new(self.settings.calibration_samples, self.settings.calibration_interval_ms)?;
        self.calibrate_with(&plan, progress, cancel)
    }

    /// Calibra com um plano explícito
    pub fn calibrate_with<P>(&mut self, plan: &CalibrationPlan, progress: P, cancel: &CancelToken) -> NodeResult<Baselines>
    where
        P: FnMut(&CalibrationProgress),
    {
        let front_end = self.pipeline.config().front_end;
        let gas = self.pipeline.gas_mut();

        let baselines = self
            .calibration
            .run_calibration(plan, &front_end, || gas.read(), progress, cancel)?;

        self.calibration_state = CalibrationState::Valid(baselines);
        Ok(baselines)
    }

    /// Um ciclo de leitura com as referências ativas
    pub fn run_cycle(&mut self) -> NodeResult<CycleOutcome> {
        self.configuration()?;
        let baselines = self.calibration.baselines();
        let uptime_ms = self.clock.now_ms();
        Ok(self.pipeline.run_cycle(&baselines, uptime_ms))
    }

    /// Loop agendado no intervalo configurado, entregando cada leitura ao transporte.
    ///
    /// Para após `max_cycles` (se houver) ou quando `stop` é cancelado. A
    /// falha de um envio nunca interrompe o loop.
    pub fn run_scheduled<T>(&mut self, transport: T, max_cycles: Option<u64>, stop: &CancelToken) -> NodeResult<RunSummary>
    where
        T: Transport + 'static,
    {
        let interval_ms = self.configuration()?.interval_ms();
        let mut scheduler = CycleScheduler::new(interval_ms)?;
        let dispatcher = Dispatcher::spawn(
            transport,
            DispatchConfig {
                send_budget_ms: self.settings.transport_timeout_ms,
                ..DispatchConfig::default()
            },
        )?;

        tracing::info!(
            interval_ms,
            transport = dispatcher.transport_name(),
            max_cycles,
            "scheduled readings started"
        );

        let mut cycles = 0u64;
        while !stop.is_cancelled() && max_cycles.is_none_or(|max| cycles < max) {
            scheduler.wait_for_next_tick(self.clock.as_ref());
            if stop.is_cancelled() {
                break;
            }
            let started = Instant::now();

            if let Some(reading) = self.run_cycle()?.into_reading() {
                match reading.to_json() {
                    Ok(json) => {
                        if let Err(e) = dispatcher.submit(json) {
                            tracing::warn!(error = %e, "reading not dispatched");
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "reading serialization failed"),
                }
            }

            scheduler.record_execution_time(started.elapsed());
            cycles += 1;
        }

        let dispatch = dispatcher.shutdown();
        let summary = RunSummary {
            cycles,
            pipeline: self.pipeline.stats(),
            scheduler: scheduler.stats(),
            dispatch,
        };
        tracing::info!(
            cycles,
            sent = dispatch.sent,
            failed = dispatch.failed,
            dropped = dispatch.dropped,
            "scheduled readings stopped"
        );
        Ok(summary)
    }

    pub fn status(&self) -> NodeStatus {
        let calibration = match self.calibration_state {
            CalibrationState::Valid(_) => "valid",
            CalibrationState::Absent => "absent",
            CalibrationState::Corrupt => "corrupt",
        };

        NodeStatus {
            calibration,
            baselines: self.calibration.baselines(),
            configuration: self.configuration.as_ref().map(ConfigSummary::from),
            config_fault: self.config_fault.clone(),
            pipeline: self.pipeline.stats(),
            uptime_ms: self.clock.now_ms(),
        }
    }
}
