//! # 🎯 Traits — Abstrações Fundamentais do Nó Udara
//!
//! Este módulo define os traits base que os componentes do nó implementam.
//!
//! | Grupo | Traits |
//! |:------|:-------|
//! | Base | [`Component`] |
//! | Percepção | [`Sensor`] |
//! | Saída | [`Transport`] |
//!
//! ## Fronteira
//!
//! Hardware real, sensores simulados e transportes de rede ficam do lado de
//! fora destes traits; o pipeline só enxerga `Sensor` e `Transport`.
//! Implementações concretas vivem em `udara-node` e nos testes de cada crate.

use std::fmt::Debug;

// ═══════════════════════════════════════════════════════════════════════════════
// TIPOS COMUNS
// ═══════════════════════════════════════════════════════════════════════════════

/// Timestamp monotônico em milissegundos desde o boot
pub type Timestamp = u64;

// ═══════════════════════════════════════════════════════════════════════════════
// TRAIT BASE — Todo componente do nó
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait base para qualquer componente do nó.
///
/// Todo sensor e todo transporte implementa este trait.
///
/// # Exemplo
///
/// ```ignore
/// use udara_core::traits::Component;
///
/// #[derive(Debug)]
/// struct MyProbe;
///
/// impl Component for MyProbe {
///     fn name(&self) -> &str { "my-probe" }
/// }
/// ```
pub trait Component: Send + Debug {
    /// Nome único do componente (para logs e debug)
    fn name(&self) -> &str;

    /// Versão do componente (para compatibilidade)
    fn version(&self) -> &str {
        "2026.1.16"
    }

    /// Componente está pronto para uso?
    fn is_ready(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERCEPÇÃO — Sensores
// ═══════════════════════════════════════════════════════════════════════════════

/// Erro de sensor
#[derive(Debug, Clone, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor not initialized")]
    NotInitialized,
    #[error("Sensor read failed: {0}")]
    ReadFailed(String),
    #[error("Calibration failed: {0}")]
    CalibrationFailed(String),
    #[error("Configuration invalid: {0}")]
    InvalidConfig(String),
    #[error("Hardware error: {0}")]
    Hardware(String),
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

/// Trait para fontes de amostras brutas.
///
/// O arranjo de gás devolve três códigos de ADC por leitura; a sonda
/// climática devolve temperatura e umidade. Nenhum dos dois interpreta os
/// valores: validação e conversão ficam no pipeline.
///
/// # Exemplo
///
/// ```ignore
/// use udara_core::traits::{Component, Sensor, SensorError};
///
/// #[derive(Debug)]
/// struct FixedAdc(u16);
///
/// impl Component for FixedAdc {
///     fn name(&self) -> &str { "fixed-adc" }
/// }
///
/// impl Sensor for FixedAdc {
///     type RawData = u16;
///
///     fn read(&mut self) -> Result<u16, SensorError> {
///         Ok(self.0)
///     }
/// }
/// ```
pub trait Sensor: Component {
    /// Tipo dos dados brutos lidos do sensor
    type RawData;

    /// Lê dados brutos do sensor
    fn read(&mut self) -> Result<Self::RawData, SensorError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SAÍDA — Transportes
// ═══════════════════════════════════════════════════════════════════════════════

/// Erro de transporte
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Rejected by peer: {0}")]
    Rejected(String),
    #[error("Timeout after {0}ms")]
    Timeout(u64),
    #[error("Transport closed")]
    Closed,
}

/// Status de transporte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// Pronto para enviar
    Ready,
    /// Conectando / aguardando broker
    Connecting,
    /// Em erro (última tentativa falhou)
    Fault,
    /// Desligado
    Off,
}

/// Trait para transportes que entregam a leitura serializada.
///
/// O payload é sempre o JSON da leitura; o transporte não o interpreta.
/// Implementações devem respeitar o próprio timeout: um envio lento é uma
/// falha de envio, nunca uma falha do pipeline.
pub trait Transport: Component {
    /// Envia um payload
    fn send(&mut self, payload: &str) -> Result<(), TransportError>;

    /// Status atual do transporte
    fn status(&self) -> TransportStatus {
        TransportStatus::Ready
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRO GENÉRICO
// ═══════════════════════════════════════════════════════════════════════════════

/// Resultado de operação de componente
pub type ComponentResult<T> = Result<T, ComponentError>;

/// Erro genérico de componente
#[derive(Debug, Clone, thiserror::Error)]
pub enum ComponentError {
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Other error: {0}")]
    Other(String),
}
