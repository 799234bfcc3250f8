//! Erros do canal climático

use thiserror::Error;
use udara_core::traits::SensorError;

pub type EnvironmentResult<T> = Result<T, EnvironmentError>;

/// Erros do módulo de ambiente
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("Sensor read failed: {0}")]
    SensorReadFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid sensor data: {0}")]
    InvalidData(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),
}

// Conversão para SensorError do core
impl From<EnvironmentError> for SensorError {
    fn from(err: EnvironmentError) -> Self {
        match err {
            EnvironmentError::InvalidConfig(msg) => SensorError::InvalidConfig(msg),
            other => SensorError::ReadFailed(other.to_string()),
        }
    }
}

impl From<SensorError> for EnvironmentError {
    fn from(err: SensorError) -> Self {
        EnvironmentError::SensorReadFailed(err.to_string())
    }
}
