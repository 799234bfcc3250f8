//! Aceitação de leituras climáticas com fallback para o último valor bom
//!
//! O sensor de temperatura/umidade falha com frequência (NaN, timeout de
//! barramento, valores absurdos). Uma falha nunca derruba o ciclo: o monitor
//! devolve o último par aceito e incrementa um contador de falhas
//! consecutivas, zerado na próxima leitura boa.

use serde::{Deserialize, Serialize};
use udara_core::traits::SensorError;

use crate::error::EnvironmentError;
use crate::types::{ClimateLimits, ClimateSample};

/// Origem dos valores usados num ciclo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimateSource {
    /// Leitura deste ciclo
    Measured,
    /// Leitura recusada; valores do último ciclo bom
    LastKnownGood,
}

/// Resultado do canal climático num ciclo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
    pub sample: ClimateSample,
    pub source: ClimateSource,
    /// Falhas seguidas até aqui (diagnóstico)
    pub consecutive_failures: u32,
}

impl ClimateReading {
    pub fn is_fresh(&self) -> bool {
        self.source == ClimateSource::Measured
    }
}

/// Dono do último valor bom do canal climático
#[derive(Debug, Clone)]
pub struct ClimateMonitor {
    limits: ClimateLimits,
    last_good: ClimateSample,
    consecutive_failures: u32,
    total_failures: u64,
}

impl ClimateMonitor {
    /// Monitor com limites padrão e valor inicial `0.0 / 0.0`
    pub fn new() -> Self {
        Self::with_limits(ClimateLimits::default(), ClimateSample::default())
    }

    /// Monitor com limites e valor inicial explícitos
    pub fn with_limits(limits: ClimateLimits, initial: ClimateSample) -> Self {
        Self {
            limits,
            last_good: initial,
            consecutive_failures: 0,
            total_failures: 0,
        }
    }

    pub fn limits(&self) -> &ClimateLimits {
        &self.limits
    }

    /// Último par aceito
    pub fn last_good(&self) -> ClimateSample {
        self.last_good
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Falhas desde a criação
    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    /// Processa o resultado bruto de uma leitura do sensor
    pub fn accept(&mut self, read: Result<ClimateSample, SensorError>) -> ClimateReading {
        let rejection = match read {
            Ok(sample) => match self.limits.check(&sample) {
                Ok(()) => {
                    if self.consecutive_failures > 0 {
                        tracing::debug!(
                            after = self.consecutive_failures,
                            "climate sensor recovered"
                        );
                    }
                    self.last_good = sample;
                    self.consecutive_failures = 0;
                    return ClimateReading {
                        sample,
                        source: ClimateSource::Measured,
                        consecutive_failures: 0,
                    };
                }
                Err(e) => e,
            },
            Err(e) => EnvironmentError::from(e),
        };

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures += 1;

        tracing::warn!(
            reason = %rejection,
            consecutive_failures = self.consecutive_failures,
            temperature = self.last_good.temperature,
            humidity = self.last_good.humidity,
            "climate reading rejected, reusing last known good values"
        );

        ClimateReading {
            sample: self.last_good,
            source: ClimateSource::LastKnownGood,
            consecutive_failures: self.consecutive_failures,
        }
    }
}

impl Default for ClimateMonitor {
    fn default() -> Self {
        Self::new()
    }
}
