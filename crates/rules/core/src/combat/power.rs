//! Attack power evaluation.

use crate::source::StatSource;

/// How a modifier rewrites attack power.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum PowerAdjustment {
    /// Added to base power.
    Flat(f64),
    /// Fraction of the flat-adjusted power, summed with other percents.
    Percent(f64),
}

/// Power-evaluation modifier registered by a passive, building or action.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerModifier {
    pub source: StatSource,
    pub adjustment: PowerAdjustment,
}

impl PowerModifier {
    pub fn new(source: StatSource, adjustment: PowerAdjustment) -> Self {
        Self { source, adjustment }
    }
}

/// Base and rewritten attack power.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerLog {
    pub base: f64,
    pub modified: f64,
}

/// Applies `modifiers` to `base`.
///
/// ```text
/// flat     = base + Σ flat
/// modified = flat × (1 + Σ percent)
/// ```
///
/// Registration order does not matter.
pub fn evaluate_power(base: f64, modifiers: &[PowerModifier]) -> PowerLog {
    let (flat, percent) = modifiers.iter().fold(
        (0.0, 0.0),
        |(flat, percent), modifier| match modifier.adjustment {
            PowerAdjustment::Flat(amount) => (flat + amount, percent),
            PowerAdjustment::Percent(fraction) => (flat, percent + fraction),
        },
    );

    PowerLog {
        base,
        modified: (base + flat) * (1.0 + percent),
    }
}
