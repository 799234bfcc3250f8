//! # Prelude — Re-exportações Convenientes
//!
//! ```
//! use udara_core::prelude::*;
//! ```

// Traits fundamentais
pub use crate::traits::{
    Component,
    ComponentError,
    ComponentResult,
    Sensor,
    SensorError,
    Timestamp,
    Transport,
    TransportError,
    TransportStatus,
};

// Tempo
pub use crate::clock::{Clock, ManualClock, MonotonicClock};

// Persistência
pub use crate::io::{share, Eeprom, EepromError, EepromResult, MemoryEeprom, MmapEeprom, SharedEeprom};

// Configuração
pub use crate::settings::NodeSettings;
