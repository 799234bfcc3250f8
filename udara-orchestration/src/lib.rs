//! # 🎭 udara-orchestration — Ciclo de Leitura
//!
//! Coordena um ciclo de amostragem completo e o que acontece com a leitura
//! depois dele.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ CycleScheduler (taxa fixa, relógio monotônico)               │
//! │   └─► ReadingPipeline                                        │
//! │         AcquireRaw → ValidateRaw → ComputeResistance →       │
//! │         ComputeConcentration → ReadEnvironmental →           │
//! │         ComputeIndex → Emit                                  │
//! │           └─► AirQualityReading ──to_json──► Dispatcher      │
//! │                                        (fila + worker)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```ignore
//! use udara_orchestration::{ReadingPipeline, DeviceIdentity, CycleOutcome};
//!
//! let mut pipeline = ReadingPipeline::new(gas, probe, DeviceIdentity::new("node-01", "MQ"));
//! if let CycleOutcome::Emitted(reading) = pipeline.run_cycle(&store.baselines(), clock.now_ms()) {
//!     dispatcher.submit(reading.to_json()?)?;
//! }
//! ```

pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod reading;
pub mod scheduler;

pub use dispatch::{DispatchConfig, DispatchStats, Dispatcher};
pub use error::{OrchestrationError, OrchestrationResult};
pub use pipeline::{CycleOutcome, CycleStage, PipelineConfig, PipelineStats, ReadingPipeline, SkipReason};
pub use reading::{AirQualityReading, DeviceIdentity, WireReading};
pub use scheduler::{CycleScheduler, SchedulerStats, TickInfo, MIN_INTERVAL_MS};
