//! Sensores sintéticos
//!
//! O nó roda fora do hardware com estes dois sensores. Os valores variam de
//! forma determinística com o número da amostra, então duas execuções com os
//! mesmos parâmetros produzem a mesma sequência.

use std::f32::consts::PI;

use udara_core::traits::{Component, Sensor, SensorError};
use udara_environment::ClimateSample;
use udara_gas::{PerChannel, RawSamples};

/// Arranjo de gás sintético: seno em torno de um código central
#[derive(Debug, Clone)]
pub struct SimulatedGasArray {
    center: u16,
    amplitude: u16,
    adc_max: u16,
    sample_count: u64,
}

impl SimulatedGasArray {
    /// `center` é clampado ao fundo de escala
    pub fn new(center: u16, amplitude: u16, adc_max: u16) -> Self {
        Self {
            center: center.min(adc_max),
            amplitude,
            adc_max,
            sample_count: 0,
        }
    }

    /// Sinal constante (amplitude zero), útil para calibrar
    pub fn steady(code: u16, adc_max: u16) -> Self {
        Self::new(code, 0, adc_max)
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    fn channel_code(&self, phase: f32) -> u16 {
        let cycle = (self.sample_count as f32 * 0.1) % (2.0 * PI);
        let value = self.center as f32 + self.amplitude as f32 * (cycle + phase).sin();
        value.round().clamp(0.0, self.adc_max as f32) as u16
    }
}

impl Default for SimulatedGasArray {
    fn default() -> Self {
        Self::new(2000, 300, 4095)
    }
}

impl Component for SimulatedGasArray {
    fn name(&self) -> &str {
        "simulated-gas-array"
    }
}

impl Sensor for SimulatedGasArray {
    type RawData = RawSamples;

    fn read(&mut self) -> Result<RawSamples, SensorError> {
        let raw = PerChannel::new(
            self.channel_code(0.0),
            self.channel_code(2.0 * PI / 3.0),
            self.channel_code(4.0 * PI / 3.0),
        );
        self.sample_count += 1;
        Ok(raw)
    }
}

/// Sonda climática sintética que falha a cada `fail_every` leituras
#[derive(Debug, Clone)]
pub struct SimulatedClimateProbe {
    fail_every: Option<u64>,
    sample_count: u64,
}

impl SimulatedClimateProbe {
    pub fn new(fail_every: Option<u64>) -> Self {
        Self {
            fail_every: fail_every.filter(|&n| n > 0),
            sample_count: 0,
        }
    }
}

impl Default for SimulatedClimateProbe {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Component for SimulatedClimateProbe {
    fn name(&self) -> &str {
        "simulated-climate-probe"
    }
}

impl Sensor for SimulatedClimateProbe {
    type RawData = ClimateSample;

    fn read(&mut self) -> Result<ClimateSample, SensorError> {
        self.sample_count += 1;

        // Sonda real devolve NaN quando o barramento falha
        if self.fail_every.is_some_and(|n| self.sample_count % n == 0) {
            return Ok(ClimateSample::new(f32::NAN, f32::NAN));
        }

        let cycle = (self.sample_count as f32 * 0.1) % (2.0 * PI);
        Ok(ClimateSample::new(
            28.0 + 3.0 * cycle.sin(),
            70.0 - 10.0 * cycle.sin(),
        ))
    }
}
