//! Índice composto de qualidade do ar
//!
//! ```text
//! score = Σ peso(c) * ppm(c) * periculosidade(c)     (c ∈ {A, B, C})
//! score = min(score, 500)
//! ```
//!
//! A faixa do rótulo é particionada em intervalos fechados à esquerda e
//! abertos à direita. Os textos de [`AqiCategory::label`] são contrato com o
//! dashboard, que calcula o mesmo rótulo de forma independente.

use serde::{Deserialize, Serialize};
use crate::types::PerChannel;

/// Teto do índice composto
pub const INDEX_CAP: f32 = 500.0;

/// Categoria do índice (ordem crescente de gravidade)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    /// `[0, 20)`
    #[serde(rename = "Baik")]
    Good,
    /// `[20, 50)`
    #[serde(rename = "Sedang")]
    Moderate,
    /// `[50, 100)`
    #[serde(rename = "Tidak Sehat")]
    Unhealthy,
    /// `[100, 200)`
    #[serde(rename = "Sangat Tidak Sehat")]
    VeryUnhealthy,
    /// `[200, ∞)`
    #[serde(rename = "Berbahaya")]
    Hazardous,
}

impl AqiCategory {
    /// Todas as categorias em ordem
    pub const ALL: [AqiCategory; 5] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    /// Classifica um score
    pub fn from_score(score: f32) -> Self {
        if score < 20.0 {
            AqiCategory::Good
        } else if score < 50.0 {
            AqiCategory::Moderate
        } else if score < 100.0 {
            AqiCategory::Unhealthy
        } else if score < 200.0 {
            AqiCategory::VeryUnhealthy
        } else {
            AqiCategory::Hazardous
        }
    }

    /// Limite inferior (inclusivo) da faixa
    pub fn lower_bound(&self) -> f32 {
        match self {
            AqiCategory::Good => 0.0,
            AqiCategory::Moderate => 20.0,
            AqiCategory::Unhealthy => 50.0,
            AqiCategory::VeryUnhealthy => 100.0,
            AqiCategory::Hazardous => 200.0,
        }
    }

    /// Texto do campo `status` na saída
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Baik",
            AqiCategory::Moderate => "Sedang",
            AqiCategory::Unhealthy => "Tidak Sehat",
            AqiCategory::VeryUnhealthy => "Sangat Tidak Sehat",
            AqiCategory::Hazardous => "Berbahaya",
        }
    }

    /// Nome em inglês (logs)
    pub fn english_name(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Interpreta um texto de `status`
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resultado do motor de índice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeIndex {
    /// Score em `[0, 500]`
    pub score: f32,
    pub category: AqiCategory,
}

/// Combina as três concentrações num score limitado e no seu rótulo.
///
/// Função pura; não-decrescente em cada entrada.
pub fn composite_index(ppm: &PerChannel<f32>) -> CompositeIndex {
    let raw: f32 = ppm
        .iter()
        .map(|(channel, &value)| channel.index_weight() * (value * channel.hazard_multiplier()))
        .sum();

    let score = raw.min(INDEX_CAP);

    CompositeIndex {
        score,
        category: AqiCategory::from_score(score),
    }
}
