//! Pipeline de leitura: um ciclo completo de amostragem
//!
//! ```text
//! AcquireRaw → ValidateRaw → ComputeResistance → ComputeConcentration
//!            → ReadEnvironmental → ComputeIndex → Emit
//! ```
//!
//! Só dois estágios podem encerrar o ciclo sem leitura: falha de aquisição e
//! código de ADC fora da faixa. Todo o resto degrada com substituição
//! registrada em log.

use serde::{Deserialize, Serialize};
use udara_core::traits::{Sensor, SensorError, Timestamp};
use udara_environment::{ClimateLimits, ClimateMonitor, ClimateSample};
use udara_gas::{
    channel_concentration, composite_index, AdcFrontEnd, Baselines, ConcentrationEstimate,
    GasChannel, RawSamples,
};

use crate::error::{OrchestrationError, OrchestrationResult};
use crate::reading::{AirQualityReading, DeviceIdentity};

/// Estágio do ciclo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CycleStage {
    AcquireRaw = 0,
    ValidateRaw = 1,
    ComputeResistance = 2,
    ComputeConcentration = 3,
    ReadEnvironmental = 4,
    ComputeIndex = 5,
    Emit = 6,
}

impl CycleStage {
    /// Retorna próximo estágio
    pub fn next(&self) -> Option<CycleStage> {
        match self {
            CycleStage::AcquireRaw => Some(CycleStage::ValidateRaw),
            CycleStage::ValidateRaw => Some(CycleStage::ComputeResistance),
            CycleStage::ComputeResistance => Some(CycleStage::ComputeConcentration),
            CycleStage::ComputeConcentration => Some(CycleStage::ReadEnvironmental),
            CycleStage::ReadEnvironmental => Some(CycleStage::ComputeIndex),
            CycleStage::ComputeIndex => Some(CycleStage::Emit),
            CycleStage::Emit => None,
        }
    }

    /// Lista todos os estágios em ordem
    pub fn all() -> Vec<CycleStage> {
        vec![
            CycleStage::AcquireRaw,
            CycleStage::ValidateRaw,
            CycleStage::ComputeResistance,
            CycleStage::ComputeConcentration,
            CycleStage::ReadEnvironmental,
            CycleStage::ComputeIndex,
            CycleStage::Emit,
        ]
    }
}

/// Por que um ciclo terminou sem leitura
#[derive(Debug, Clone)]
pub enum SkipReason {
    /// O arranjo de gás não respondeu
    AcquisitionFailed(SensorError),
    /// Código acima do máximo do ADC
    RawOutOfRange { channel: GasChannel, value: u16, max: u16 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AcquisitionFailed(e) => write!(f, "raw acquisition failed: {e}"),
            SkipReason::RawOutOfRange { channel, value, max } => {
                write!(f, "{channel} raw value {value} exceeds ADC max {max}")
            }
        }
    }
}

/// Resultado de um ciclo
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Emitted(AirQualityReading),
    NoReading(SkipReason),
}

impl CycleOutcome {
    pub fn reading(&self) -> Option<&AirQualityReading> {
        match self {
            CycleOutcome::Emitted(reading) => Some(reading),
            CycleOutcome::NoReading(_) => None,
        }
    }

    pub fn into_reading(self) -> Option<AirQualityReading> {
        match self {
            CycleOutcome::Emitted(reading) => Some(reading),
            CycleOutcome::NoReading(_) => None,
        }
    }
}

/// Configuração do pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Parâmetros elétricos do arranjo
    pub front_end: AdcFrontEnd,
    /// Códigos até este valor geram aviso (sensor desconectado?)
    pub near_zero_threshold: u16,
    /// Faixa aceita do canal climático
    pub climate_limits: ClimateLimits,
    /// Valor climático antes da primeira leitura boa
    pub initial_climate: ClimateSample,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            front_end: AdcFrontEnd::REFERENCE,
            near_zero_threshold: 10,
            climate_limits: ClimateLimits::default(),
            initial_climate: ClimateSample::default(),
        }
    }
}

/// Contadores de ciclos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub emitted: u64,
    pub skipped: u64,
}

/// Pipeline de leitura sobre um arranjo de gás e uma sonda climática
#[derive(Debug)]
pub struct ReadingPipeline<G, C> {
    gas: G,
    climate_sensor: C,
    climate: ClimateMonitor,
    config: PipelineConfig,
    identity: DeviceIdentity,
    current_stage: Option<CycleStage>,
    stats: PipelineStats,
}

impl<G, C> ReadingPipeline<G, C>
where
    G: Sensor<RawData = RawSamples>,
    C: Sensor<RawData = ClimateSample>,
{
    /// Cria pipeline com configuração padrão
    pub fn new(gas: G, climate_sensor: C, identity: DeviceIdentity) -> Self {
        Self {
            gas,
            climate_sensor,
            climate: ClimateMonitor::new(),
            config: PipelineConfig::default(),
            identity,
            current_stage: None,
            stats: PipelineStats::default(),
        }
    }

    /// Cria pipeline com configuração específica
    pub fn with_config(
        gas: G,
        climate_sensor: C,
        identity: DeviceIdentity,
        config: PipelineConfig,
    ) -> OrchestrationResult<Self> {
        if config.near_zero_threshold >= config.front_end.adc_max() {
            return Err(OrchestrationError::InvalidConfiguration(format!(
                "near-zero threshold {} must be below ADC max {}",
                config.near_zero_threshold,
                config.front_end.adc_max()
            )));
        }

        Ok(Self {
            gas,
            climate_sensor,
            climate: ClimateMonitor::with_limits(config.climate_limits, config.initial_climate),
            config,
            identity,
            current_stage: None,
            stats: PipelineStats::default(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Troca a identidade (nova configuração provisionada)
    pub fn set_identity(&mut self, identity: DeviceIdentity) {
        self.identity = identity;
    }

    /// Arranjo de gás (calibração lê por aqui, fora de um ciclo)
    pub fn gas_mut(&mut self) -> &mut G {
        &mut self.gas
    }

    pub fn climate_monitor(&self) -> &ClimateMonitor {
        &self.climate
    }

    /// Estágio em execução (só visível durante um ciclo)
    pub fn current_stage(&self) -> Option<CycleStage> {
        self.current_stage
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    fn enter(&mut self, stage: CycleStage) {
        tracing::trace!(?stage, "cycle stage");
        self.current_stage = Some(stage);
    }

    fn skip(&mut self, reason: SkipReason) -> CycleOutcome {
        tracing::warn!(%reason, "no reading this cycle");
        self.current_stage = None;
        self.stats.skipped += 1;
        CycleOutcome::NoReading(reason)
    }

    /// Executa um ciclo completo com as referências informadas
    pub fn run_cycle(&mut self, baselines: &Baselines, uptime_ms: Timestamp) -> CycleOutcome {
        self.enter(CycleStage::AcquireRaw);
        let raw = match self.gas.read() {
            Ok(raw) => raw,
            Err(e) => return self.skip(SkipReason::AcquisitionFailed(e)),
        };

        self.enter(CycleStage::ValidateRaw);
        let front_end = self.config.front_end;
        for (channel, &value) in raw.iter() {
            if !front_end.in_range(value) {
                return self.skip(SkipReason::RawOutOfRange {
                    channel,
                    value,
                    max: front_end.adc_max(),
                });
            }
            if value <= self.config.near_zero_threshold {
                tracing::warn!(%channel, value, "raw value near zero, sensor may be disconnected");
            }
        }

        self.enter(CycleStage::ComputeResistance);
        let resistance = raw.map(|_, &adc| front_end.resistance(adc));

        self.enter(CycleStage::ComputeConcentration);
        let concentrations = resistance.map(|channel, &rs| {
            let ro = *baselines.get(channel);
            let value = channel_concentration(channel, rs, ro);
            if value.is_invalid() {
                tracing::warn!(%channel, rs, ro, "invalid concentration, substituting floor");
            }
            ConcentrationEstimate::from_concentration(channel, value)
        });

        self.enter(CycleStage::ReadEnvironmental);
        let climate = self.climate.accept(self.climate_sensor.read());

        self.enter(CycleStage::ComputeIndex);
        let index = composite_index(&concentrations.map(|_, e| e.ppm));

        self.enter(CycleStage::Emit);
        let reading = AirQualityReading::new(
            self.identity.clone(),
            climate,
            concentrations,
            raw,
            resistance,
            *baselines,
            index,
            uptime_ms,
        );

        tracing::debug!(
            aqi = index.score,
            status = index.category.english_name(),
            climate_fresh = climate.is_fresh(),
            "cycle complete"
        );

        self.current_stage = None;
        self.stats.emitted += 1;
        CycleOutcome::Emitted(reading)
    }
}
