//! Tipos de dados do arranjo de gás

use serde::{Deserialize, Serialize};

/// Canal do arranjo de sensores resistivos
///
/// A ordem A/B/C é fixa e aparece no formato de saída pelas chaves
/// `135`, `7` e `9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GasChannel {
    /// Canal A: MQ-135 (CO2 equivalente, qualidade do ar geral)
    Mq135,
    /// Canal B: MQ-7 (monóxido de carbono)
    Mq7,
    /// Canal C: MQ-9 (CO e gases combustíveis)
    Mq9,
}

/// Coeficientes da curva `ppm = a * (Rs/Ro)^b`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveCoefficients {
    pub a: f32,
    pub b: f32,
}

impl GasChannel {
    /// Todos os canais, na ordem A, B, C
    pub const ALL: [GasChannel; 3] = [GasChannel::Mq135, GasChannel::Mq7, GasChannel::Mq9];

    /// ID numérico (0 = A, 1 = B, 2 = C)
    pub fn id(&self) -> u8 {
        match self {
            GasChannel::Mq135 => 0,
            GasChannel::Mq7 => 1,
            GasChannel::Mq9 => 2,
        }
    }

    /// Sufixo usado nos campos de saída (`ppm_135`, `adc_7`, ...)
    pub fn key(&self) -> &'static str {
        match self {
            GasChannel::Mq135 => "135",
            GasChannel::Mq7 => "7",
            GasChannel::Mq9 => "9",
        }
    }

    /// Nome do sensor
    pub fn name(&self) -> &'static str {
        match self {
            GasChannel::Mq135 => "MQ-135",
            GasChannel::Mq7 => "MQ-7",
            GasChannel::Mq9 => "MQ-9",
        }
    }

    /// Curva de resposta do sensor (tabela fixa, não configurável)
    pub const fn curve(&self) -> CurveCoefficients {
        match self {
            GasChannel::Mq135 => CurveCoefficients { a: 110.47, b: -2.862 },
            GasChannel::Mq7 => CurveCoefficients { a: 99.042, b: -1.518 },
            GasChannel::Mq9 => CurveCoefficients { a: 1000.5, b: -2.186 },
        }
    }

    /// Multiplicador de periculosidade aplicado ao ppm antes da ponderação
    pub const fn hazard_multiplier(&self) -> f32 {
        match self {
            GasChannel::Mq135 => 1.0,
            GasChannel::Mq7 => 2.0, // CO é o mais tóxico dos três
            GasChannel::Mq9 => 1.0,
        }
    }

    /// Peso do canal no índice composto (soma = 1.0)
    pub const fn index_weight(&self) -> f32 {
        match self {
            GasChannel::Mq135 => 0.4,
            GasChannel::Mq7 => 0.3,
            GasChannel::Mq9 => 0.3,
        }
    }
}

impl std::fmt::Display for GasChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Um valor por canal
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerChannel<T> {
    pub mq135: T,
    pub mq7: T,
    pub mq9: T,
}

impl<T> PerChannel<T> {
    pub const fn new(mq135: T, mq7: T, mq9: T) -> Self {
        Self { mq135, mq7, mq9 }
    }

    /// Valor de um canal
    pub fn get(&self, channel: GasChannel) -> &T {
        match channel {
            GasChannel::Mq135 => &self.mq135,
            GasChannel::Mq7 => &self.mq7,
            GasChannel::Mq9 => &self.mq9,
        }
    }

    /// Valor mutável de um canal
    pub fn get_mut(&mut self, channel: GasChannel) -> &mut T {
        match channel {
            GasChannel::Mq135 => &mut self.mq135,
            GasChannel::Mq7 => &mut self.mq7,
            GasChannel::Mq9 => &mut self.mq9,
        }
    }

    /// Aplica `f` a cada canal, na ordem A, B, C
    pub fn map<U>(&self, mut f: impl FnMut(GasChannel, &T) -> U) -> PerChannel<U> {
        PerChannel {
            mq135: f(GasChannel::Mq135, &self.mq135),
            mq7: f(GasChannel::Mq7, &self.mq7),
            mq9: f(GasChannel::Mq9, &self.mq9),
        }
    }

    /// Itera `(canal, valor)` na ordem A, B, C
    pub fn iter(&self) -> impl Iterator<Item = (GasChannel, &T)> {
        GasChannel::ALL.into_iter().map(move |ch| (ch, self.get(ch)))
    }
}

impl<T: Copy> PerChannel<T> {
    /// Mesmo valor nos três canais
    pub const fn splat(value: T) -> Self {
        Self {
            mq135: value,
            mq7: value,
            mq9: value,
        }
    }
}

/// Códigos brutos do ADC de um ciclo
pub type RawSamples = PerChannel<u16>;

/// Resistências de referência (Ro) em ar limpo, kΩ
pub type Baselines = PerChannel<f32>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_ids_and_keys() {
        assert_eq!(GasChannel::Mq135.id(), 0);
        assert_eq!(GasChannel::Mq7.id(), 1);
        assert_eq!(GasChannel::Mq9.id(), 2);
        assert_eq!(GasChannel::Mq135.key(), "135");
        assert_eq!(GasChannel::Mq9.to_string(), "MQ-9");
    }

    #[test]
    fn test_index_weights_are_convex() {
        let total: f32 = GasChannel::ALL.iter().map(|c| c.index_weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_channel_b_weighted_highest() {
        let b = GasChannel::Mq7.hazard_multiplier();
        assert!(b > GasChannel::Mq135.hazard_multiplier());
        assert!(b > GasChannel::Mq9.hazard_multiplier());
    }

    #[test]
    fn test_curves_are_decreasing() {
        for channel in GasChannel::ALL {
            let curve = channel.curve();
            assert!(curve.a > 0.0);
            assert!(curve.b < 0.0);
        }
    }

    #[test]
    fn test_per_channel_map_and_iter() {
        let raw = RawSamples::new(1, 2, 3);
        let doubled = raw.map(|_, v| v * 2);
        assert_eq!(doubled, PerChannel::new(2, 4, 6));

        let order: Vec<_> = raw.iter().map(|(ch, v)| (ch.key(), *v)).collect();
        assert_eq!(order, vec![("135", 1), ("7", 2), ("9", 3)]);
    }

    #[test]
    fn test_per_channel_get_mut() {
        let mut baselines = Baselines::splat(10.0);
        *baselines.get_mut(GasChannel::Mq7) = 4.2;
        assert_eq!(*baselines.get(GasChannel::Mq7), 4.2);
        assert_eq!(baselines.mq135, 10.0);
    }
}
