//! # EEPROM — Persistência por endereço
//!
//! Dispositivo endereçável por byte no estilo de uma EEPROM emulada em flash:
//! escritas vão para um buffer e só ficam duráveis após [`Eeprom::commit`].
//!
//! ## Implementações
//!
//! | Tipo | Uso |
//! |------|-----|
//! | [`MemoryEeprom`] | Testes e execução sem disco |
//! | [`MmapEeprom`] | Imagem em arquivo mapeada em memória (sobrevive a reinícios) |
//!
//! Uma posição nunca escrita vale `0xFF`, como numa flash apagada.

use memmap2::{MmapMut, MmapOptions};
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Valor de uma célula apagada
pub const ERASED: u8 = 0xFF;

pub type EepromResult<T> = Result<T, EepromError>;

/// Erros de acesso à EEPROM
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EepromError {
    #[error("Access out of bounds: {len} bytes at {address} (capacity {capacity})")]
    OutOfBounds {
        address: usize,
        len: usize,
        capacity: usize,
    },

    #[error("EEPROM initialization failed: {0}")]
    Init(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Dispositivo de armazenamento endereçável por byte
pub trait Eeprom: Send + Debug {
    /// Tamanho total em bytes
    fn capacity(&self) -> usize;

    /// Lê `buf.len()` bytes a partir de `address`
    fn read(&self, address: usize, buf: &mut [u8]) -> EepromResult<()>;

    /// Escreve `data` a partir de `address` (ainda não durável)
    fn write(&mut self, address: usize, data: &[u8]) -> EepromResult<()>;

    /// Torna duráveis as escritas pendentes
    fn commit(&mut self) -> EepromResult<()>;

    /// Lê um único byte
    fn read_byte(&self, address: usize) -> EepromResult<u8> {
        let mut byte = [0u8; 1];
        self.read(address, &mut byte)?;
        Ok(byte[0])
    }

    /// Escreve um único byte
    fn write_byte(&mut self, address: usize, value: u8) -> EepromResult<()> {
        self.write(address, &[value])
    }
}

fn check_bounds(address: usize, len: usize, capacity: usize) -> EepromResult<()> {
    match address.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(EepromError::OutOfBounds {
            address,
            len,
            capacity,
        }),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMORY EEPROM
// ═══════════════════════════════════════════════════════════════════════════════

/// EEPROM volátil em memória
#[derive(Debug, Clone)]
pub struct MemoryEeprom {
    cells: Vec<u8>,
    commits: u64,
}

impl MemoryEeprom {
    /// Cria dispositivo apagado com a capacidade dada
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![ERASED; capacity],
            commits: 0,
        }
    }

    /// Número de commits realizados
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Conteúdo bruto (para diagnóstico)
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }
}

impl Eeprom for MemoryEeprom {
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> EepromResult<()> {
        check_bounds(address, buf.len(), self.cells.len())?;
        buf.copy_from_slice(&self.cells[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> EepromResult<()> {
        check_bounds(address, data.len(), self.cells.len())?;
        self.cells[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> EepromResult<()> {
        self.commits += 1;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MMAP EEPROM
// ═══════════════════════════════════════════════════════════════════════════════

/// EEPROM persistida em arquivo via memory mapping
#[derive(Debug)]
pub struct MmapEeprom {
    path: PathBuf,
    mmap: MmapMut,
}

impl MmapEeprom {
    /// Abre (ou cria) a imagem em `path` com `capacity` bytes.
    ///
    /// Regiões novas do arquivo são inicializadas como apagadas. Uma imagem
    /// maior que `capacity` é recusada.
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> EepromResult<Self> {
        if capacity == 0 {
            return Err(EepromError::Init("capacity must be > 0".into()));
        }

        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| EepromError::Init(format!("{}: {}", path.display(), e)))?;

        let current_len = file
            .metadata()
            .map_err(|e| EepromError::Init(e.to_string()))?
            .len() as usize;

        if current_len > capacity {
            return Err(EepromError::Init(format!(
                "{} holds {} bytes, expected at most {}",
                path.display(),
                current_len,
                capacity
            )));
        }

        if current_len < capacity {
            file.set_len(capacity as u64)
                .map_err(|e| EepromError::Init(e.to_string()))?;
        }

        // SAFETY: o arquivo é aberto em modo leitura/escrita e só este processo
        // mantém o mapeamento durante a vida do nó.
        let mut mmap = unsafe {
            MmapOptions::new()
                .len(capacity)
                .map_mut(&file)
                .map_err(|e| EepromError::Init(e.to_string()))?
        };

        if current_len < capacity {
            mmap[current_len..].fill(ERASED);
            mmap.flush().map_err(|e| EepromError::Init(e.to_string()))?;
        }

        tracing::debug!(path = %path.display(), capacity, "EEPROM image mapped");

        Ok(Self { path, mmap })
    }

    /// Caminho da imagem
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Eeprom for MmapEeprom {
    fn capacity(&self) -> usize {
        self.mmap.len()
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> EepromResult<()> {
        check_bounds(address, buf.len(), self.mmap.len())?;
        buf.copy_from_slice(&self.mmap[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> EepromResult<()> {
        check_bounds(address, data.len(), self.mmap.len())?;
        self.mmap[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> EepromResult<()> {
        self.mmap.flush().map_err(|e| EepromError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_eeprom_starts_erased() {
        let eeprom = MemoryEeprom::new(16);
        assert_eq!(eeprom.capacity(), 16);
        assert!(eeprom.as_bytes().iter().all(|&b| b == ERASED));
    }

    #[test]
    fn test_memory_eeprom_read_write() {
        let mut eeprom = MemoryEeprom::new(16);
        eeprom.write(4, &[1, 2, 3]).unwrap();
        eeprom.commit().unwrap();

        let mut buf = [0u8; 3];
        eeprom.read(4, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(eeprom.read_byte(7).unwrap(), ERASED);
        assert_eq!(eeprom.commit_count(), 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut eeprom = MemoryEeprom::new(8);
        let err = eeprom.write(6, &[0; 4]).unwrap_err();
        assert!(matches!(err, EepromError::OutOfBounds { address: 6, len: 4, capacity: 8 }));

        let mut buf = [0u8; 2];
        assert!(eeprom.read(usize::MAX, &mut buf).is_err());
    }

    #[test]
    fn test_mmap_eeprom_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.eeprom");

        {
            let mut eeprom = MmapEeprom::open(&path, 64).unwrap();
            assert_eq!(eeprom.read_byte(0).unwrap(), ERASED);
            eeprom.write(10, &[0xA5, 0x5A]).unwrap();
            eeprom.commit().unwrap();
        }

        let eeprom = MmapEeprom::open(&path, 64).unwrap();
        let mut buf = [0u8; 2];
        eeprom.read(10, &mut buf).unwrap();
        assert_eq!(buf, [0xA5, 0x5A]);
        assert_eq!(eeprom.read_byte(63).unwrap(), ERASED);
    }

    #[test]
    fn test_mmap_eeprom_grows_erased() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.eeprom");
        std::fs::write(&path, [0u8; 4]).unwrap();

        let eeprom = MmapEeprom::open(&path, 16).unwrap();
        assert_eq!(eeprom.read_byte(0).unwrap(), 0);
        assert_eq!(eeprom.read_byte(4).unwrap(), ERASED);
    }

    #[test]
    fn test_mmap_eeprom_rejects_oversized_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.eeprom");
        std::fs::write(&path, [0u8; 32]).unwrap();

        assert!(matches!(MmapEeprom::open(&path, 16), Err(EepromError::Init(_))));
    }
}
