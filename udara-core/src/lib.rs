//! # 🌫️ Udara-Core
//!
//! Base comum do nó de sensoriamento ambiental Udara.
//!
//! ## Módulos
//!
//! - [`traits`]: Traits fundamentais (Component, Sensor, Transport)
//! - [`clock`]: Relógio monotônico em milissegundos
//! - [`io`]: Persistência endereçável (EEPROM emulada)
//! - [`settings`]: Parâmetros do nó vindos de `.env`
//!
//! ## Quick Start
//!
//! ```
//! use udara_core::prelude::*;
//!
//! let mut eeprom = MemoryEeprom::new(64);
//! eeprom.write_byte(0, 0xA5).unwrap();
//! eeprom.commit().unwrap();
//!
//! let clock = ManualClock::new(0);
//! clock.advance(1000);
//! assert_eq!(clock.now_ms(), 1000);
//! ```
//!
//! ## Princípios
//!
//! 1. **Núcleo sem E/S**: O motor de gás nunca fala com rede
//! 2. **Estado injetável**: Nada de globais mutáveis; lojas são passadas por referência
//! 3. **Degradar, não abortar**: Anomalias de sensor viram substituições registradas

pub mod traits;
pub mod clock;
pub mod io;
pub mod settings;
pub mod prelude;

// Re-exportações de nível superior
pub use traits::{
    Component, ComponentError, ComponentResult,
    Sensor, SensorError,
    Transport, TransportError, TransportStatus,
    Timestamp,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use settings::NodeSettings;
