//! # Despachante de transporte
//!
//! Tira o envio do caminho de amostragem. O pipeline entrega o JSON com
//! [`Dispatcher::submit`], que nunca bloqueia; uma thread dona do transporte
//! consome a fila limitada.
//!
//! ```text
//! pipeline ──try_send──► [fila limitada] ──► worker ──► Transport::send
//!              │ cheia
//!              └─► descartado (contado)
//! ```
//!
//! Um envio que passa do orçamento conta como timeout, e timeout é falha de
//! envio: nada volta para o pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use udara_core::traits::{Transport, TransportError};

use crate::error::{OrchestrationError, OrchestrationResult};

/// Configuração do despachante
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Payloads aguardando envio
    pub queue_capacity: usize,
    /// Latência máxima de um envio (ms)
    pub send_budget_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 8,
            send_budget_ms: 5000,
        }
    }
}

/// Contadores compartilhados com o worker
#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    dropped: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

/// Retrato dos contadores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Aceitos na fila
    pub submitted: u64,
    /// Descartados com a fila cheia
    pub dropped: u64,
    /// Entregues dentro do orçamento
    pub sent: u64,
    /// Falhas de envio (inclui timeouts)
    pub failed: u64,
    /// Envios que passaram do orçamento
    pub timed_out: u64,
}

impl DispatchStats {
    /// Payloads ainda sem desfecho
    pub fn pending(&self) -> u64 {
        self.submitted.saturating_sub(self.sent + self.failed)
    }
}

/// Dono da thread de envio
#[derive(Debug)]
pub struct Dispatcher {
    sender: Option<Sender<String>>,
    worker: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
    config: DispatchConfig,
    transport_name: String,
}

impl Dispatcher {
    /// Move o transporte para uma thread dedicada
    pub fn spawn<T>(transport: T, config: DispatchConfig) -> OrchestrationResult<Self>
    where
        T: Transport + 'static,
    {
        if config.queue_capacity == 0 {
            return Err(OrchestrationError::InvalidConfiguration(
                "dispatch queue capacity must be > 0".into(),
            ));
        }

        let transport_name = transport.name().to_string();
        let (sender, receiver) = bounded::<String>(config.queue_capacity);
        let counters = Arc::new(Counters::default());
        let budget = Duration::from_millis(config.send_budget_ms);

        let worker_counters = Arc::clone(&counters);
        let worker = std::thread::Builder::new()
            .name(format!("udara-dispatch-{transport_name}"))
            .spawn(move || {
                let mut transport = transport;
                for payload in receiver.iter() {
                    deliver(&mut transport, &payload, budget, &worker_counters);
                }
                tracing::debug!(transport = transport.name(), "dispatch worker stopped");
            })
            .map_err(|e| OrchestrationError::InvalidConfiguration(format!("spawn dispatch worker: {e}")))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            counters,
            config,
            transport_name,
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn transport_name(&self) -> &str {
        &self.transport_name
    }

    /// Enfileira um payload sem bloquear
    pub fn submit(&self, payload: String) -> OrchestrationResult<()> {
        let sender = self.sender.as_ref().ok_or(OrchestrationError::Closed)?;

        match sender.try_send(payload) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    transport = %self.transport_name,
                    capacity = self.config.queue_capacity,
                    "dispatch queue full, reading dropped"
                );
                Err(OrchestrationError::QueueFull(sender.len()))
            }
            Err(TrySendError::Disconnected(_)) => Err(OrchestrationError::Closed),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            sent: self.counters.sent.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            timed_out: self.counters.timed_out.load(Ordering::Relaxed),
        }
    }

    /// Fecha a fila, espera o worker drenar o que já foi aceito
    pub fn shutdown(mut self) -> DispatchStats {
        self.close();
        self.stats()
    }

    fn close(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!(transport = %self.transport_name, "dispatch worker panicked");
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.close();
    }
}

fn deliver<T: Transport>(transport: &mut T, payload: &str, budget: Duration, counters: &Counters) {
    let started = Instant::now();
    let result = transport.send(payload);
    let elapsed = started.elapsed();

    match result {
        Ok(()) if elapsed <= budget => {
            counters.sent.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(transport = transport.name(), elapsed_ms = elapsed.as_millis() as u64, "reading sent");
        }
        Ok(()) | Err(TransportError::Timeout(_)) => {
            counters.timed_out.fetch_add(1, Ordering::Relaxed);
            counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                transport = transport.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = budget.as_millis() as u64,
                "send exceeded latency budget"
            );
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(transport = transport.name(), error = %e, "send failed");
        }
    }
}
