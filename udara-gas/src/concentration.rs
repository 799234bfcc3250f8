//! Modelo de concentração: razão Rs/Ro → ppm
//!
//! Curva de potência `ppm = a * (Rs/Ro)^b` com `b < 0`: quanto mais condutiva
//! a superfície do sensor (razão menor), mais gás alvo.
//!
//! A curva não é confiável nos extremos, então todo resultado válido passa
//! por piso e teto. Entradas que impedem o cálculo (`Ro <= 0`, razão `<= 0`)
//! devolvem [`Concentration::Invalid`], que é distinto de um valor pequeno;
//! quem chama decide a substituição.

use serde::{Deserialize, Serialize};
use crate::types::{CurveCoefficients, GasChannel};

/// Menor concentração reportada (ppm)
pub const PPM_FLOOR: f32 = 0.1;

/// Maior concentração reportada (ppm)
pub const PPM_CAP: f32 = 10_000.0;

/// Resultado do modelo de concentração
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Concentration {
    /// Estimativa válida, já dentro de `[PPM_FLOOR, PPM_CAP]`
    Ppm(f32),
    /// Cálculo impossível com as entradas dadas
    Invalid,
}

impl Concentration {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Concentration::Invalid)
    }

    /// Valor em ppm, se válido
    pub fn ppm(&self) -> Option<f32> {
        match self {
            Concentration::Ppm(v) => Some(*v),
            Concentration::Invalid => None,
        }
    }

    /// Valor em ppm, com `Invalid` substituído pelo piso
    pub fn or_floor(&self) -> f32 {
        self.ppm().unwrap_or(PPM_FLOOR)
    }
}

/// Calcula a concentração para uma resistência medida e uma de referência.
///
/// Ordem das verificações: `ro > 0`, depois `rs / ro > 0` (NaN conta como
/// inválido). Piso e teto são aplicados nesta ordem a todo valor válido.
pub fn concentration(rs: f32, ro: f32, curve: CurveCoefficients) -> Concentration {
    if !(ro > 0.0) {
        return Concentration::Invalid;
    }

    let ratio = rs / ro;
    if !(ratio > 0.0) {
        return Concentration::Invalid;
    }

    let mut ppm = curve.a * ratio.powf(curve.b);
    if ppm.is_nan() {
        return Concentration::Invalid;
    }

    if ppm < PPM_FLOOR {
        ppm = PPM_FLOOR;
    }
    if ppm > PPM_CAP {
        ppm = PPM_CAP;
    }

    Concentration::Ppm(ppm)
}

/// Atalho com a curva fixa do canal
pub fn channel_concentration(channel: GasChannel, rs: f32, ro: f32) -> Concentration {
    concentration(rs, ro, channel.curve())
}

/// Estimativa final de um canal num ciclo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationEstimate {
    pub channel: GasChannel,
    /// Concentração em ppm (nunca negativa)
    pub ppm: f32,
    /// `true` quando o cálculo foi inválido e o piso foi usado no lugar
    pub substituted: bool,
}

impl ConcentrationEstimate {
    pub fn from_concentration(channel: GasChannel, value: Concentration) -> Self {
        Self {
            channel,
            ppm: value.or_floor(),
            substituted: value.is_invalid(),
        }
    }
}
