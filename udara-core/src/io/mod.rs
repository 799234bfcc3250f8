//! # 📁 I/O — Persistência do Nó
//!
//! Armazenamento durável dos blocos de calibração e de configuração.
//!
//! ```ignore
//! use udara_core::io::{Eeprom, MmapEeprom};
//!
//! let mut eeprom = MmapEeprom::open("udara.eeprom", 512)?;
//! eeprom.write(0, &[0xA5])?;
//! eeprom.commit()?;
//! ```

pub mod eeprom;

pub use eeprom::{Eeprom, EepromError, EepromResult, MemoryEeprom, MmapEeprom, ERASED};

use std::sync::{Arc, Mutex};

/// EEPROM compartilhada entre as lojas que ocupam regiões do mesmo dispositivo.
///
/// O mutex garante acesso exclusivo durante uma leitura ou escrita de bloco.
pub type SharedEeprom<E> = Arc<Mutex<E>>;

/// Envolve um dispositivo para compartilhamento
pub fn share<E: Eeprom>(eeprom: E) -> SharedEeprom<E> {
    Arc::new(Mutex::new(eeprom))
}
