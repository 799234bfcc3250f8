//! Leitura de qualidade do ar e formato de saída
//!
//! Os nomes de campo e a precisão do JSON são contrato com o backend e o
//! dashboard:
//!
//! | Campo | Precisão |
//! |-------|----------|
//! | `temperature`, `humidity`, `aqi`, `ppm_*` | 1 casa |
//! | `ro_*` | 3 casas |
//! | `adc_*`, `uptime_ms` | inteiro |

use serde::{Deserialize, Serialize};
use udara_core::traits::Timestamp;
use udara_environment::ClimateReading;
use udara_gas::{AqiCategory, Baselines, CompositeIndex, ConcentrationEstimate, PerChannel, RawSamples};

use crate::error::OrchestrationResult;

/// Campos de identidade repassados sem interpretação
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub sensor_type: String,
}

impl DeviceIdentity {
    pub fn new(device_id: impl Into<String>, sensor_type: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            sensor_type: sensor_type.into(),
        }
    }
}

/// Resultado completo de um ciclo. Construída uma vez, nunca alterada.
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityReading {
    identity: DeviceIdentity,
    climate: ClimateReading,
    concentrations: PerChannel<ConcentrationEstimate>,
    raw: RawSamples,
    resistance: PerChannel<f32>,
    baselines: Baselines,
    index: CompositeIndex,
    uptime_ms: Timestamp,
}

impl AirQualityReading {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        identity: DeviceIdentity,
        climate: ClimateReading,
        concentrations: PerChannel<ConcentrationEstimate>,
        raw: RawSamples,
        resistance: PerChannel<f32>,
        baselines: Baselines,
        index: CompositeIndex,
        uptime_ms: Timestamp,
    ) -> Self {
        Self {
            identity,
            climate,
            concentrations,
            raw,
            resistance,
            baselines,
            index,
            uptime_ms,
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Temperatura/umidade e de onde vieram
    pub fn climate(&self) -> &ClimateReading {
        &self.climate
    }

    pub fn concentrations(&self) -> &PerChannel<ConcentrationEstimate> {
        &self.concentrations
    }

    /// Concentrações em ppm
    pub fn ppm(&self) -> PerChannel<f32> {
        self.concentrations.map(|_, estimate| estimate.ppm)
    }

    pub fn raw(&self) -> &RawSamples {
        &self.raw
    }

    /// Resistências calculadas no ciclo
    pub fn resistance(&self) -> &PerChannel<f32> {
        &self.resistance
    }

    /// Referências usadas no ciclo
    pub fn baselines(&self) -> &Baselines {
        &self.baselines
    }

    pub fn index(&self) -> &CompositeIndex {
        &self.index
    }

    pub fn category(&self) -> AqiCategory {
        self.index.category
    }

    pub fn uptime_ms(&self) -> Timestamp {
        self.uptime_ms
    }

    /// Algum canal caiu no piso por cálculo inválido?
    pub fn has_substitutions(&self) -> bool {
        self.concentrations.iter().any(|(_, e)| e.substituted)
    }

    /// Forma de saída, já arredondada
    pub fn to_wire(&self) -> WireReading {
        WireReading {
            device_id: self.identity.device_id.clone(),
            sensor_type: self.identity.sensor_type.clone(),
            temperature: round_to(self.climate.sample.temperature, 1),
            humidity: round_to(self.climate.sample.humidity, 1),
            aqi: round_to(self.index.score, 1),
            status: self.index.category,
            ppm_135: round_to(self.concentrations.mq135.ppm, 1),
            ppm_7: round_to(self.concentrations.mq7.ppm, 1),
            ppm_9: round_to(self.concentrations.mq9.ppm, 1),
            adc_135: self.raw.mq135,
            adc_7: self.raw.mq7,
            adc_9: self.raw.mq9,
            ro_135: round_to(self.baselines.mq135, 3),
            ro_7: round_to(self.baselines.mq7, 3),
            ro_9: round_to(self.baselines.mq9, 3),
            uptime_ms: self.uptime_ms,
        }
    }

    /// JSON entregue aos transportes
    pub fn to_json(&self) -> OrchestrationResult<String> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }
}

/// Documento JSON de uma leitura
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireReading {
    pub device_id: String,
    pub sensor_type: String,
    pub temperature: f64,
    pub humidity: f64,
    pub aqi: f64,
    pub status: AqiCategory,
    pub ppm_135: f64,
    pub ppm_7: f64,
    pub ppm_9: f64,
    pub adc_135: u16,
    pub adc_7: u16,
    pub adc_9: u16,
    pub ro_135: f64,
    pub ro_7: f64,
    pub ro_9: f64,
    pub uptime_ms: Timestamp,
}

/// Arredonda em f64 para o JSON não carregar o resíduo binário do f32
fn round_to(value: f32, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value as f64 * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(27.3, 1), 27.3);
        assert_eq!(round_to(27.25, 1), 27.3);
        assert_eq!(round_to(1.065_62, 3), 1.066);
        assert_eq!(round_to(0.1, 1), 0.1);
    }

    #[test]
    fn test_identity_new() {
        let identity = DeviceIdentity::new("node-01", "MQ-array");
        assert_eq!(identity.device_id, "node-01");
        assert_eq!(identity.sensor_type, "MQ-array");
    }
}
