//! Relógio monotônico em milissegundos
//!
//! Usado apenas para controle de intervalo e `uptime_ms` das leituras; nenhum
//! cálculo do motor de gás depende do tempo.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::traits::Timestamp;

/// Fonte de tempo monotônico
pub trait Clock: Send + Sync {
    /// Milissegundos desde o boot do nó
    fn now_ms(&self) -> Timestamp;
}

/// Relógio real, ancorado no instante de criação
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    boot: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { boot: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Timestamp {
        self.boot.elapsed().as_millis() as Timestamp
    }
}

/// Relógio virtual: só avança quando [`ManualClock::advance`] é chamado.
///
/// Clones compartilham o mesmo contador.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Avança o relógio
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Define o instante atual
    pub fn set(&self, ms: Timestamp) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
