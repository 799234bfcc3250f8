//! # 🌍 udara-environment — Canal Climático
//!
//! Temperatura e umidade acompanham cada leitura de qualidade do ar. O sensor
//! é tratado como não confiável: leituras NaN, fora da faixa plausível ou com
//! erro de barramento são recusadas e o ciclo segue com o último par bom.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use udara_environment::{ClimateMonitor, ClimateSample, ClimateSource};
//!
//! let mut monitor = ClimateMonitor::new();
//! monitor.accept(Ok(ClimateSample::new(28.4, 71.0)));
//!
//! let reading = monitor.accept(Ok(ClimateSample::new(f32::NAN, 71.0)));
//! assert_eq!(reading.source, ClimateSource::LastKnownGood);
//! assert_eq!(reading.sample.temperature, 28.4);
//! assert_eq!(reading.consecutive_failures, 1);
//! ```
//!
//! ## Módulos
//!
//! - [`climate`] - Monitor com fallback para o último valor bom
//! - [`types`] - Amostra e limites
//! - [`error`] - Tratamento de erros

pub mod error;
pub mod types;
pub mod climate;

pub use error::{EnvironmentError, EnvironmentResult};
pub use types::{ClimateLimits, ClimateSample};
pub use climate::{ClimateMonitor, ClimateReading, ClimateSource};

#[cfg(test)]
mod tests;
