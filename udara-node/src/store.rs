//! Bloco de configuração na EEPROM
//!
//! ```text
//! base + 0          marcador (0xC3 = válido)
//! base + 1 .. + 3   tamanho do JSON (u16 little-endian)
//! base + 3 ..       JSON do documento
//! ```
//!
//! Mesma disciplina do bloco de calibração: marcador invalidado primeiro,
//! escrito por último.

use bytes::{Buf, BufMut, BytesMut};
use udara_core::io::{Eeprom, SharedEeprom, ERASED};

use crate::config::{ConfigError, ConfigResult, DeviceConfiguration};

/// Marcador de bloco válido
pub const CONFIG_MAGIC: u8 = 0xC3;

const HEADER_LEN: usize = 3;

/// Loja da configuração provisionada
#[derive(Debug)]
pub struct ConfigStore<E: Eeprom> {
    eeprom: SharedEeprom<E>,
    base_address: usize,
    region_len: usize,
}

impl<E: Eeprom> ConfigStore<E> {
    /// Cria loja sobre `region_len` bytes a partir de `base_address`
    pub fn new(eeprom: SharedEeprom<E>, base_address: usize, region_len: usize) -> ConfigResult<Self> {
        let capacity = eeprom.lock()?.capacity();
        let fits = base_address
            .checked_add(region_len)
            .is_some_and(|end| end <= capacity);
        if !fits || region_len <= HEADER_LEN {
            return Err(ConfigError::Corrupt(format!(
                "config region {base_address}+{region_len} does not fit in {capacity} bytes"
            )));
        }

        Ok(Self {
            eeprom,
            base_address,
            region_len,
        })
    }

    /// Maior documento que cabe na região
    pub fn max_document_len(&self) -> usize {
        (self.region_len - HEADER_LEN).min(u16::MAX as usize)
    }

    /// Lê a configuração guardada. `Ok(None)` se nunca provisionado.
    pub fn load(&self) -> ConfigResult<Option<DeviceConfiguration>> {
        let mut region = vec![0u8; self.region_len];
        self.eeprom.lock()?.read(self.base_address, &mut region)?;

        let mut cursor = &region[..];
        let marker = cursor.get_u8();
        if marker == ERASED || marker == 0x00 {
            return Ok(None);
        }
        if marker != CONFIG_MAGIC {
            return Err(ConfigError::Corrupt(format!("unknown marker 0x{marker:02X}")));
        }

        let len = cursor.get_u16_le() as usize;
        if len == 0 || len > self.max_document_len() {
            return Err(ConfigError::Corrupt(format!("document length {len} out of range")));
        }

        let document = std::str::from_utf8(&cursor[..len])
            .map_err(|e| ConfigError::Corrupt(format!("document is not UTF-8: {e}")))?;

        // Documento guardado que não passa na validação é tão inútil quanto lixo
        match DeviceConfiguration::from_json(document) {
            Ok(config) => Ok(Some(config)),
            Err(ConfigError::Parse(msg)) => Err(ConfigError::Corrupt(msg)),
            Err(ConfigError::Invalid(issues)) => Err(ConfigError::Corrupt(format!(
                "stored document fails validation: {}",
                issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
            ))),
            Err(other) => Err(other),
        }
    }

    /// Persiste a configuração
    pub fn persist(&self, config: &DeviceConfiguration) -> ConfigResult<()> {
        let document = config.to_json()?;
        if document.len() > self.max_document_len() {
            return Err(ConfigError::Corrupt(format!(
                "document of {} bytes exceeds the {} byte region",
                document.len(),
                self.max_document_len()
            )));
        }

        let mut body = BytesMut::with_capacity(2 + document.len());
        body.put_u16_le(document.len() as u16);
        body.put_slice(document.as_bytes());

        let mut eeprom = self.eeprom.lock()?;
        eeprom.write_byte(self.base_address, 0x00)?;
        eeprom.commit()?;
        eeprom.write(self.base_address + 1, &body)?;
        eeprom.commit()?;
        eeprom.write_byte(self.base_address, CONFIG_MAGIC)?;
        eeprom.commit()?;

        tracing::info!(device_id = config.device_id(), bytes = document.len(), "configuration persisted");
        Ok(())
    }

    /// Apaga a configuração (volta ao estado não provisionado)
    pub fn clear(&self) -> ConfigResult<()> {
        let mut eeprom = self.eeprom.lock()?;
        eeprom.write_byte(self.base_address, ERASED)?;
        eeprom.commit()?;
        Ok(())
    }
}
