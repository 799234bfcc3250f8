//! # udara-gas — Motor de Calibração e Concentração de Gás
//!
//! Converte os códigos brutos do arranjo de sensores resistivos (MQ-135,
//! MQ-7, MQ-9) em concentrações calibradas e num índice composto de
//! qualidade do ar.
//!
//! ## Fluxo
//!
//! ```text
//! adc ──► resistance ──► Rs/Ro ──► concentration ──► composite_index
//!                          ▲
//!                  CalibrationStore (Ro por canal)
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use udara_gas::{AdcFrontEnd, GasChannel, PerChannel, channel_concentration, composite_index};
//!
//! let front_end = AdcFrontEnd::REFERENCE;
//! let rs = front_end.resistance(2000);
//! let ppm = PerChannel::new(0, 0, 0).map(|channel, _| {
//!     channel_concentration(channel, rs, 10.0).or_floor()
//! });
//! let index = composite_index(&ppm);
//! assert!(index.score <= 500.0);
//! assert_ne!(ppm.get(GasChannel::Mq135), ppm.get(GasChannel::Mq7));
//! ```

pub mod calibration;
pub mod concentration;
pub mod error;
pub mod index;
pub mod resistance;
pub mod types;

pub use calibration::{
    calibrate, CalibrationPlan, CalibrationProgress, CalibrationState, CalibrationStore,
    CancelToken, BLOCK_LEN, CALIBRATION_MAGIC, CLEAN_AIR_FACTOR, DEFAULT_BASELINE,
};
pub use concentration::{
    channel_concentration, concentration, Concentration, ConcentrationEstimate, PPM_CAP, PPM_FLOOR,
};
pub use error::{GasError, GasResult};
pub use index::{composite_index, AqiCategory, CompositeIndex, INDEX_CAP};
pub use resistance::{resistance_from_adc, AdcFrontEnd, MIN_RESISTANCE, OPEN_CIRCUIT_RESISTANCE};
pub use types::{Baselines, CurveCoefficients, GasChannel, PerChannel, RawSamples};
