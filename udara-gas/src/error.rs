//! Erros específicos do motor de gás

use thiserror::Error;
use udara_core::io::EepromError;
use udara_core::traits::SensorError;

pub type GasResult<T> = Result<T, GasError>;

#[derive(Debug, Error, Clone)]
pub enum GasError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Calibration failed: {0}")]
    CalibrationFailed(String),

    #[error("Calibration already in progress")]
    CalibrationInProgress,

    #[error("Calibration cancelled after {completed} of {total} samples")]
    CalibrationCancelled { completed: u32, total: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] EepromError),

    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for GasError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        GasError::LockPoisoned(err.to_string())
    }
}

// Conversão para SensorError do core
impl From<GasError> for SensorError {
    fn from(err: GasError) -> Self {
        match err {
            GasError::InvalidConfig(msg) => SensorError::InvalidConfig(msg),
            GasError::CalibrationFailed(msg) => SensorError::CalibrationFailed(msg),
            GasError::Sensor(inner) => inner,
            other => SensorError::Hardware(other.to_string()),
        }
    }
}
