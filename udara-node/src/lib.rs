//! # 📡 udara-node — Runtime do Nó
//!
//! Provisionamento, calibração, ciclos agendados e transportes de referência
//! sobre uma imagem de EEPROM em arquivo.
//!
//! | Módulo | Papel |
//! |:-------|:------|
//! | [`config`] | Documento de configuração e validação |
//! | [`store`] | Região de configuração na EEPROM |
//! | [`node`] | Boot, gate de configuração, calibração e loop |
//! | [`transport`] | Serial, HTTP e MQTT |
//! | [`simulation`] | Sensores sintéticos para rodar sem hardware |
//! | [`shutdown`] | SIGINT/SIGTERM encerram `run` com a fila drenada |
//!
//! ```ignore
//! use udara_core::prelude::*;
//! use udara_node::{Node, SimulatedClimateProbe, SimulatedGasArray, EEPROM_CAPACITY};
//!
//! let eeprom = share(MmapEeprom::open("udara.eeprom", EEPROM_CAPACITY)?);
//! let mut node = Node::boot(
//!     NodeSettings::from_env(),
//!     eeprom,
//!     SimulatedGasArray::default(),
//!     SimulatedClimateProbe::default(),
//!     Box::new(MonotonicClock::new()),
//! )?;
//! let outcome = node.run_cycle()?;
//! ```

pub mod config;
pub mod node;
pub mod shutdown;
pub mod simulation;
pub mod store;
pub mod transport;

pub use config::{ConfigError, ConfigIssue, ConfigResult, DeviceConfiguration, MqttSettings, TransportConfig};
pub use node::{
    ConfigSummary, Node, NodeError, NodeResult, NodeStatus, RunSummary, CALIBRATION_ADDRESS, CONFIG_ADDRESS,
    CONFIG_REGION_LEN, EEPROM_CAPACITY,
};
pub use simulation::{SimulatedClimateProbe, SimulatedGasArray};
pub use store::{ConfigStore, CONFIG_MAGIC};
pub use transport::{HttpTransport, MqttTransport, NodeTransport, SerialEcho};

#[cfg(test)]
mod tests;
