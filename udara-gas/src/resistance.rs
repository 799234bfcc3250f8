//! Modelo de resistência: código de ADC → resistência do sensor
//!
//! O sensor forma um divisor de tensão com a resistência de carga `RL`:
//!
//! ```text
//! Vsensor = adc / adc_max * Vsupply
//! Rs      = Vsupply * RL / Vsensor - RL
//! ```

use serde::{Deserialize, Serialize};
use crate::error::{GasError, GasResult};

/// Resistência devolvida para `adc == 0` (sensor efetivamente em aberto)
pub const OPEN_CIRCUIT_RESISTANCE: f32 = 999_999.0;

/// Menor resistência aceita; valores calculados `<= 0` são substituídos
pub const MIN_RESISTANCE: f32 = 0.1;

/// Converte um código de ADC em resistência (mesma unidade de `load_resistance`).
///
/// Função pura. `adc_value == 0` devolve [`OPEN_CIRCUIT_RESISTANCE`];
/// resultado não positivo devolve [`MIN_RESISTANCE`].
pub fn resistance_from_adc(adc_value: u16, supply_voltage: f32, load_resistance: f32, adc_max: u16) -> f32 {
    if adc_value == 0 {
        return OPEN_CIRCUIT_RESISTANCE;
    }

    // f64 internamente: em f32 o fundo de escala pode sobrar um resíduo positivo
    let supply = supply_voltage as f64;
    let load = load_resistance as f64;
    let v_sensor = adc_value as f64 / adc_max as f64 * supply;
    let rs = (supply * load / v_sensor) - load;

    if rs > 0.0 { rs as f32 } else { MIN_RESISTANCE }
}

/// Parâmetros elétricos do front-end analógico
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdcFrontEnd {
    supply_voltage: f32,
    load_resistance: f32,
    adc_max: u16,
}

impl AdcFrontEnd {
    /// Front-end de referência: 3.3 V, RL = 10 kΩ, ADC de 12 bits
    pub const REFERENCE: Self = Self {
        supply_voltage: 3.3,
        load_resistance: 10.0,
        adc_max: 4095,
    };

    /// Cria front-end validado
    pub fn new(supply_voltage: f32, load_resistance: f32, adc_max: u16) -> GasResult<Self> {
        if !supply_voltage.is_finite() || supply_voltage <= 0.0 {
            return Err(GasError::InvalidConfig(
                "Supply voltage must be a positive finite value".into(),
            ));
        }

        if !load_resistance.is_finite() || load_resistance <= 0.0 {
            return Err(GasError::InvalidConfig(
                "Load resistance must be a positive finite value".into(),
            ));
        }

        if adc_max == 0 {
            return Err(GasError::InvalidConfig("ADC max must be > 0".into()));
        }

        Ok(Self {
            supply_voltage,
            load_resistance,
            adc_max,
        })
    }

    pub fn supply_voltage(&self) -> f32 {
        self.supply_voltage
    }

    pub fn load_resistance(&self) -> f32 {
        self.load_resistance
    }

    pub fn adc_max(&self) -> u16 {
        self.adc_max
    }

    /// Código dentro da faixa do conversor?
    pub fn in_range(&self, adc_value: u16) -> bool {
        adc_value <= self.adc_max
    }

    /// Resistência para um código deste front-end
    #[inline]
    pub fn resistance(&self, adc_value: u16) -> f32 {
        resistance_from_adc(adc_value, self.supply_voltage, self.load_resistance, self.adc_max)
    }
}

impl Default for AdcFrontEnd {
    fn default() -> Self {
        Self::REFERENCE
    }
}
