//! # Calibração — Resistência de referência em ar limpo
//!
//! Cada canal tem uma resistência de referência `Ro`, medida com o nó em ar
//! limpo e persistida na EEPROM. Sem calibração válida o nó continua útil
//! com `Ro = 10.0` em todos os canais, apenas menos preciso.
//!
//! ## Layout do bloco
//!
//! ```text
//! base + 0  .. base + 12   três f32 little-endian (A, B, C)
//! base + 12                marcador de validade (0xA5)
//! ```
//!
//! O marcador é invalidado antes e escrito por último depois do payload:
//! uma queda de energia no meio da escrita deixa o estado anterior válido ou
//! um marcador inválido, nunca uma referência corrompida aceita como boa.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use udara_core::io::{Eeprom, SharedEeprom, ERASED};
use udara_core::traits::SensorError;

use crate::error::{GasError, GasResult};
use crate::resistance::AdcFrontEnd;
use crate::types::{Baselines, GasChannel, PerChannel, RawSamples};

/// Referência usada quando não há calibração válida
pub const DEFAULT_BASELINE: f32 = 10.0;

/// Razão Rs/Ro em ar limpo na curva do datasheet
pub const CLEAN_AIR_FACTOR: f32 = 9.83;

/// Marcador de bloco válido
pub const CALIBRATION_MAGIC: u8 = 0xA5;

const PAYLOAD_LEN: usize = 12;

/// Tamanho do bloco de calibração na EEPROM
pub const BLOCK_LEN: usize = PAYLOAD_LEN + 1;

/// Estado persistido da calibração
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationState {
    /// Bloco íntegro
    Valid(Baselines),
    /// Nunca calibrado (marcador apagado)
    Absent,
    /// Marcador desconhecido ou payload inválido
    Corrupt,
}

impl CalibrationState {
    pub fn is_calibrated(&self) -> bool {
        matches!(self, CalibrationState::Valid(_))
    }

    /// `Absent` e `Corrupt` caem no mesmo padrão
    pub fn baselines_or_default(&self) -> Baselines {
        match self {
            CalibrationState::Valid(baselines) => *baselines,
            CalibrationState::Absent | CalibrationState::Corrupt => Baselines::splat(DEFAULT_BASELINE),
        }
    }
}

fn is_valid_baseline(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn encode_payload(baselines: &Baselines) -> BytesMut {
    let mut buf = BytesMut::with_capacity(PAYLOAD_LEN);
    for (_, value) in baselines.iter() {
        buf.put_f32_le(*value);
    }
    buf
}

fn decode_block(block: &[u8; BLOCK_LEN]) -> CalibrationState {
    let marker = block[PAYLOAD_LEN];
    if marker != CALIBRATION_MAGIC {
        return if marker == ERASED || marker == 0x00 {
            CalibrationState::Absent
        } else {
            CalibrationState::Corrupt
        };
    }

    let mut payload = &block[..PAYLOAD_LEN];
    let mq135 = payload.get_f32_le();
    let mq7 = payload.get_f32_le();
    let mq9 = payload.get_f32_le();
    let baselines = Baselines::new(mq135, mq7, mq9);

    if baselines.iter().all(|(_, v)| is_valid_baseline(*v)) {
        CalibrationState::Valid(baselines)
    } else {
        CalibrationState::Corrupt
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROCEDIMENTO DE CALIBRAÇÃO
// ═══════════════════════════════════════════════════════════════════════════════

/// Parâmetros do procedimento
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPlan {
    /// Número de amostras por canal
    pub sample_count: u32,
    /// Intervalo entre amostras (ms)
    pub sample_interval_ms: u64,
    /// Divisor aplicado à média das resistências
    pub clean_air_factor: f32,
}

impl Default for CalibrationPlan {
    fn default() -> Self {
        Self {
            sample_count: 50,
            sample_interval_ms: 200,
            clean_air_factor: CLEAN_AIR_FACTOR,
        }
    }
}

impl CalibrationPlan {
    /// Plano com o fator de ar limpo de referência
    pub fn new(sample_count: u32, sample_interval_ms: u64) -> GasResult<Self> {
        let plan = Self {
            sample_count,
            sample_interval_ms,
            clean_air_factor: CLEAN_AIR_FACTOR,
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> GasResult<()> {
        if self.sample_count == 0 {
            return Err(GasError::InvalidConfig("Sample count must be > 0".into()));
        }
        if !is_valid_baseline(self.clean_air_factor) {
            return Err(GasError::InvalidConfig(
                "Clean-air factor must be a positive finite value".into(),
            ));
        }
        Ok(())
    }

    /// Duração nominal do procedimento
    pub fn nominal_duration(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms * self.sample_count.saturating_sub(1) as u64)
    }
}

/// Progresso reportado após cada amostra
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationProgress {
    /// Amostra recém-processada (1-based)
    pub sample: u32,
    pub total: u32,
    /// Amostras aceitas até aqui
    pub accepted: u32,
    /// Média corrente das resistências aceitas
    pub mean_resistance: PerChannel<f32>,
}

/// Sinal cooperativo de cancelamento, verificado entre amostras
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Executa o procedimento e devolve as novas referências, sem persistir.
///
/// Bloqueia por `plan.nominal_duration()`. Amostras com falha de leitura ou
/// código fora da faixa do ADC são descartadas; sem nenhuma amostra aceita a
/// calibração falha.
pub fn calibrate<A, P>(
    plan: &CalibrationPlan,
    front_end: &AdcFrontEnd,
    mut acquire: A,
    mut progress: P,
    cancel: &CancelToken,
) -> GasResult<Baselines>
where
    A: FnMut() -> Result<RawSamples, SensorError>,
    P: FnMut(&CalibrationProgress),
{
    plan.validate()?;

    let total = plan.sample_count;
    let interval = Duration::from_millis(plan.sample_interval_ms);
    let mut sums = PerChannel::<f64>::splat(0.0);
    let mut accepted = 0u32;

    for sample in 0..total {
        if cancel.is_cancelled() {
            tracing::info!(completed = sample, total, "calibration cancelled");
            return Err(GasError::CalibrationCancelled {
                completed: sample,
                total,
            });
        }

        if sample > 0 && !interval.is_zero() {
            std::thread::sleep(interval);
        }

        match acquire() {
            Ok(raw) => {
                if let Some((channel, value)) = raw.iter().find(|(_, v)| !front_end.in_range(**v)) {
                    tracing::warn!(
                        sample,
                        %channel,
                        value,
                        adc_max = front_end.adc_max(),
                        "calibration sample out of ADC range, skipped"
                    );
                } else {
                    for channel in GasChannel::ALL {
                        *sums.get_mut(channel) += front_end.resistance(*raw.get(channel)) as f64;
                    }
                    accepted += 1;
                }
            }
            Err(e) => {
                tracing::warn!(sample, error = %e, "calibration sample read failed, skipped");
            }
        }

        let mean_resistance = if accepted > 0 {
            sums.map(|_, sum| (sum / accepted as f64) as f32)
        } else {
            PerChannel::splat(0.0)
        };

        progress(&CalibrationProgress {
            sample: sample + 1,
            total,
            accepted,
            mean_resistance,
        });
    }

    if accepted == 0 {
        return Err(GasError::CalibrationFailed(format!(
            "no valid samples out of {total}"
        )));
    }

    let factor = plan.clean_air_factor as f64;
    let baselines = sums.map(|_, sum| (sum / accepted as f64 / factor) as f32);

    if let Some((channel, value)) = baselines.iter().find(|(_, v)| !is_valid_baseline(**v)) {
        return Err(GasError::CalibrationFailed(format!(
            "{channel} produced invalid baseline {value}"
        )));
    }

    tracing::info!(
        ro_135 = baselines.mq135,
        ro_7 = baselines.mq7,
        ro_9 = baselines.mq9,
        accepted,
        total,
        "calibration complete"
    );

    Ok(baselines)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOJA DE CALIBRAÇÃO
// ═══════════════════════════════════════════════════════════════════════════════

/// Dona exclusiva das referências de calibração.
///
/// O pipeline só lê uma cópia via [`CalibrationStore::baselines`].
#[derive(Debug)]
pub struct CalibrationStore<E: Eeprom> {
    eeprom: SharedEeprom<E>,
    base_address: usize,
    active: RwLock<Baselines>,
    calibrating: AtomicBool,
}

/// Libera a flag de calibração ao sair do escopo
struct CalibrationGuard<'a>(&'a AtomicBool);

impl Drop for CalibrationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<E: Eeprom> CalibrationStore<E> {
    /// Endereço padrão do bloco
    pub const DEFAULT_ADDRESS: usize = 0;

    /// Cria loja sobre uma região da EEPROM. Começa com as referências padrão.
    pub fn new(eeprom: SharedEeprom<E>, base_address: usize) -> GasResult<Self> {
        let capacity = eeprom.lock()?.capacity();
        if base_address.checked_add(BLOCK_LEN).is_none_or(|end| end > capacity) {
            return Err(GasError::InvalidConfig(format!(
                "calibration block at {base_address} does not fit in {capacity} bytes"
            )));
        }

        Ok(Self {
            eeprom,
            base_address,
            active: RwLock::new(Baselines::splat(DEFAULT_BASELINE)),
            calibrating: AtomicBool::new(false),
        })
    }

    /// Lê o bloco persistido e atualiza as referências ativas.
    pub fn load(&self) -> GasResult<CalibrationState> {
        let mut block = [0u8; BLOCK_LEN];
        {
            let eeprom = self.eeprom.lock()?;
            eeprom.read(self.base_address, &mut block)?;
        }

        let state = decode_block(&block);
        match state {
            CalibrationState::Valid(b) => {
                tracing::info!(ro_135 = b.mq135, ro_7 = b.mq7, ro_9 = b.mq9, "calibration loaded");
            }
            CalibrationState::Absent => {
                tracing::warn!(default = DEFAULT_BASELINE, "no calibration stored, using default baselines");
            }
            CalibrationState::Corrupt => {
                tracing::warn!(default = DEFAULT_BASELINE, "calibration block corrupt, using default baselines");
            }
        }

        self.set_active(state.baselines_or_default());
        Ok(state)
    }

    /// Grava as referências: invalida o marcador, grava o payload, grava o marcador.
    pub fn persist(&self, baselines: &Baselines) -> GasResult<()> {
        if let Some((channel, value)) = baselines.iter().find(|(_, v)| !is_valid_baseline(**v)) {
            return Err(GasError::InvalidConfig(format!(
                "refusing to persist invalid baseline {value} for {channel}"
            )));
        }

        let payload = encode_payload(baselines);
        let marker_address = self.base_address + PAYLOAD_LEN;
        {
            let mut eeprom = self.eeprom.lock()?;
            eeprom.write_byte(marker_address, 0x00)?;
            eeprom.commit()?;
            eeprom.write(self.base_address, &payload)?;
            eeprom.commit()?;
            eeprom.write_byte(marker_address, CALIBRATION_MAGIC)?;
            eeprom.commit()?;
        }

        self.set_active(*baselines);
        tracing::info!(address = self.base_address, "calibration persisted");
        Ok(())
    }

    /// Roda o procedimento completo e persiste o resultado.
    ///
    /// Um segundo disparo enquanto outro está em andamento é recusado com
    /// [`GasError::CalibrationInProgress`]. Em falha ou cancelamento a EEPROM
    /// não é tocada.
    pub fn run_calibration<A, P>(
        &self,
        plan: &CalibrationPlan,
        front_end: &AdcFrontEnd,
        acquire: A,
        progress: P,
        cancel: &CancelToken,
    ) -> GasResult<Baselines>
    where
        A: FnMut() -> Result<RawSamples, SensorError>,
        P: FnMut(&CalibrationProgress),
    {
        if self
            .calibrating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("calibration trigger ignored: already running");
            return Err(GasError::CalibrationInProgress);
        }
        let _guard = CalibrationGuard(&self.calibrating);

        let baselines = calibrate(plan, front_end, acquire, progress, cancel)?;
        self.persist(&baselines)?;
        Ok(baselines)
    }

    /// Há uma calibração em andamento?
    pub fn is_calibrating(&self) -> bool {
        self.calibrating.load(Ordering::SeqCst)
    }

    /// Cópia das referências ativas
    pub fn baselines(&self) -> Baselines {
        *self.active.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_active(&self, baselines: Baselines) {
        *self.active.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = baselines;
    }
}
