//! Erros de orquestração

use thiserror::Error;
use udara_core::traits::{ComponentError, SensorError, TransportError};
use udara_gas::GasError;

pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Erros de orquestração
#[derive(Debug, Error, Clone)]
pub enum OrchestrationError {
    /// Erro de componente
    #[error("Component error: {0}")]
    ComponentError(#[from] ComponentError),

    /// Erro do motor de gás
    #[error("Gas engine error: {0}")]
    Gas(#[from] GasError),

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Fila do despachante cheia; payload descartado
    #[error("Dispatch queue full ({0} pending)")]
    QueueFull(usize),

    /// Despachante encerrado
    #[error("Dispatcher closed")]
    Closed,

    /// Falha de serialização
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Lock poison
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<SensorError> for OrchestrationError {
    fn from(err: SensorError) -> Self {
        OrchestrationError::ComponentError(ComponentError::Sensor(err))
    }
}

impl From<TransportError> for OrchestrationError {
    fn from(err: TransportError) -> Self {
        OrchestrationError::ComponentError(ComponentError::Transport(err))
    }
}

impl From<serde_json::Error> for OrchestrationError {
    fn from(err: serde_json::Error) -> Self {
        OrchestrationError::Serialization(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for OrchestrationError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        OrchestrationError::LockPoisoned(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrchestrationError::QueueFull(8);
        assert_eq!(err.to_string(), "Dispatch queue full (8 pending)");
    }

    #[test]
    fn test_component_error_conversion() {
        let orch_err: OrchestrationError = SensorError::Timeout(40).into();
        assert!(orch_err.to_string().contains("Component error"));

        let orch_err: OrchestrationError = TransportError::Closed.into();
        assert!(matches!(
            orch_err,
            OrchestrationError::ComponentError(ComponentError::Transport(TransportError::Closed))
        ));
    }
}
