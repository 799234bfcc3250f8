//! Configuração do nó carregada de `.env` ou variáveis de ambiente
//!
//! Parâmetros de hardware e de operação que não fazem parte do documento de
//! configuração do dispositivo (que chega por provisionamento).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// Carrega .env na primeira consulta
static DOTENV_INIT: Lazy<()> = Lazy::new(|| {
    let _ = dotenv::dotenv();
});

#[inline]
fn ensure_loaded() {
    let _ = &*DOTENV_INIT;
}

/// Converte um valor opcional, caindo no padrão se ausente ou inválido
fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    ensure_loaded();
    parse_or(env::var(key).ok(), default)
}

/// Tensão de alimentação do divisor (V)
/// Default: 3.3 V
pub fn supply_voltage() -> f32 {
    var_or("UDARA_SUPPLY_VOLTAGE", 3.3)
}

/// Resistência de carga do divisor (kΩ)
/// Default: 10.0 kΩ
pub fn load_resistance() -> f32 {
    var_or("UDARA_LOAD_RESISTANCE", 10.0)
}

/// Código máximo do ADC
/// Default: 4095 (12 bits)
pub fn adc_max() -> u16 {
    var_or("UDARA_ADC_MAX", 4095)
}

/// Caminho da imagem de EEPROM
/// Default: udara.eeprom
pub fn eeprom_path() -> PathBuf {
    var_or("UDARA_EEPROM_PATH", PathBuf::from("udara.eeprom"))
}

/// Orçamento de latência de um envio (ms)
/// Default: 5000 ms
pub fn transport_timeout_ms() -> u64 {
    var_or("UDARA_TRANSPORT_TIMEOUT_MS", 5000)
}

/// Número de amostras da calibração
/// Default: 50
pub fn calibration_samples() -> u32 {
    var_or("UDARA_CALIBRATION_SAMPLES", 50)
}

/// Intervalo entre amostras da calibração (ms)
/// Default: 200 ms
pub fn calibration_interval_ms() -> u64 {
    var_or("UDARA_CALIBRATION_INTERVAL_MS", 200)
}

/// Conjunto completo de parâmetros do nó
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSettings {
    pub supply_voltage: f32,
    pub load_resistance: f32,
    pub adc_max: u16,
    pub eeprom_path: PathBuf,
    pub transport_timeout_ms: u64,
    pub calibration_samples: u32,
    pub calibration_interval_ms: u64,
}

impl NodeSettings {
    /// Lê todos os parâmetros do ambiente
    pub fn from_env() -> Self {
        Self {
            supply_voltage: supply_voltage(),
            load_resistance: load_resistance(),
            adc_max: adc_max(),
            eeprom_path: eeprom_path(),
            transport_timeout_ms: transport_timeout_ms(),
            calibration_samples: calibration_samples(),
            calibration_interval_ms: calibration_interval_ms(),
        }
    }
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            supply_voltage: 3.3,
            load_resistance: 10.0,
            adc_max: 4095,
            eeprom_path: PathBuf::from("udara.eeprom"),
            transport_timeout_ms: 5000,
            calibration_samples: 50,
            calibration_interval_ms: 200,
        }
    }
}
