//! Tipos de dados climáticos

use serde::{Deserialize, Serialize};
use crate::error::{EnvironmentError, EnvironmentResult};

/// Uma leitura do sensor de temperatura/umidade
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClimateSample {
    /// Temperatura em graus Celsius
    pub temperature: f32,

    /// Umidade relativa (%)
    pub humidity: f32,
}

impl ClimateSample {
    pub const fn new(temperature: f32, humidity: f32) -> Self {
        Self { temperature, humidity }
    }
}

/// Faixa plausível do sensor; fora dela a leitura é descartada
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateLimits {
    pub temp_min: f32,
    pub temp_max: f32,
    pub humidity_min: f32,
    pub humidity_max: f32,
}

impl Default for ClimateLimits {
    fn default() -> Self {
        Self {
            temp_min: -40.0,
            temp_max: 80.0,
            humidity_min: 0.0,
            humidity_max: 100.0,
        }
    }
}

impl ClimateLimits {
    /// Limites validados (`min < max`, ambos finitos)
    pub fn new(temp_min: f32, temp_max: f32, humidity_min: f32, humidity_max: f32) -> EnvironmentResult<Self> {
        let finite = [temp_min, temp_max, humidity_min, humidity_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || temp_min >= temp_max || humidity_min >= humidity_max {
            return Err(EnvironmentError::InvalidConfig(format!(
                "climate limits must be finite with min < max (temp {temp_min}..{temp_max}, humidity {humidity_min}..{humidity_max})"
            )));
        }

        Ok(Self {
            temp_min,
            temp_max,
            humidity_min,
            humidity_max,
        })
    }

    /// Aceita a amostra ou diz por que ela foi recusada. Limites inclusivos.
    pub fn check(&self, sample: &ClimateSample) -> EnvironmentResult<()> {
        if sample.temperature.is_nan() || sample.humidity.is_nan() {
            return Err(EnvironmentError::InvalidData(format!(
                "NaN in reading (temperature {}, humidity {})",
                sample.temperature, sample.humidity
            )));
        }

        if !(self.temp_min..=self.temp_max).contains(&sample.temperature) {
            return Err(EnvironmentError::OutOfRange(format!(
                "temperature {} outside [{}, {}]",
                sample.temperature, self.temp_min, self.temp_max
            )));
        }

        if !(self.humidity_min..=self.humidity_max).contains(&sample.humidity) {
            return Err(EnvironmentError::OutOfRange(format!(
                "humidity {} outside [{}, {}]",
                sample.humidity, self.humidity_min, self.humidity_max
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = ClimateLimits::default();
        assert_eq!(limits.temp_min, -40.0);
        assert_eq!(limits.temp_max, 80.0);
        assert_eq!(limits.humidity_max, 100.0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let limits = ClimateLimits::default();
        assert!(limits.check(&ClimateSample::new(-40.0, 0.0)).is_ok());
        assert!(limits.check(&ClimateSample::new(80.0, 100.0)).is_ok());
        assert!(limits.check(&ClimateSample::new(80.1, 50.0)).is_err());
        assert!(limits.check(&ClimateSample::new(25.0, -0.5)).is_err());
    }

    #[test]
    fn test_nan_is_invalid_data() {
        let limits = ClimateLimits::default();
        let err = limits.check(&ClimateSample::new(f32::NAN, 40.0)).unwrap_err();
        assert!(matches!(err, EnvironmentError::InvalidData(_)));
    }

    #[test]
    fn test_infinity_is_out_of_range() {
        let limits = ClimateLimits::default();
        let err = limits.check(&ClimateSample::new(f32::INFINITY, 40.0)).unwrap_err();
        assert!(matches!(err, EnvironmentError::OutOfRange(_)));
    }

    #[test]
    fn test_invalid_limits_rejected() {
        assert!(ClimateLimits::new(10.0, 5.0, 0.0, 100.0).is_err());
        assert!(ClimateLimits::new(f32::NAN, 5.0, 0.0, 100.0).is_err());
        assert!(ClimateLimits::new(-10.0, 50.0, 10.0, 90.0).is_ok());
    }

    #[test]
    fn test_serialization() {
        let sample = ClimateSample::new(27.5, 61.0);
        let json = serde_json::to_string(&sample).unwrap();
        let back: ClimateSample = serde_json::from_str(&json).unwrap();
        assert_eq!(sample, back);
    }
}
