//! Delta computer: turns a change specification into a signed delta.
//!
//! Nothing here knows about bounds. The result is the *requested* delta that
//! a reconciliation strategy later accepts, clamps or rejects.

use crate::ids::ResourceId;

use super::error::ChangeSpecError;

/// Values this close to an integer are treated as that integer before
/// rounding, so `0.1 * 30.0` does not ceil to 4.
const SNAP_EPSILON: f64 = 1e-9;

/// How a fractional intermediate becomes an integer delta.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantNames,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoundingMode {
    /// Ceiling.
    Up,
    /// Floor.
    Down,
    /// Round half up.
    Nearest,
}

impl RoundingMode {
    pub fn apply(self, value: f64) -> f64 {
        let nearest = value.round();
        let value = if (value - nearest).abs() < SNAP_EPSILON {
            nearest
        } else {
            value
        };

        match self {
            Self::Up => value.ceil(),
            Self::Down => value.floor(),
            Self::Nearest => (value + 0.5).floor(),
        }
    }
}

fn round_with(value: f64, mode: Option<RoundingMode>) -> f64 {
    mode.map_or(value, |mode| mode.apply(value))
}

/// Declarative description of a change to one resource.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum ChangeSpec {
    /// Fixed signed amount. Not rounded unless a mode is given.
    Amount {
        amount: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        rounding_mode: Option<RoundingMode>,
    },

    /// Fractions of the current value, compounding or additive.
    Percent {
        modifiers: Vec<f64>,
        #[cfg_attr(feature = "serde", serde(default))]
        rounding_mode: Option<RoundingMode>,
        #[cfg_attr(feature = "serde", serde(default))]
        additive: bool,
    },

    /// The source resource's current value is the fraction applied to the
    /// current value; `multiplier` repeats it when an effect fires N times.
    PercentFromResource {
        source_resource_id: ResourceId,
        #[cfg_attr(feature = "serde", serde(default))]
        rounding_mode: Option<RoundingMode>,
        #[cfg_attr(feature = "serde", serde(default))]
        additive: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        multiplier: Option<u32>,
    },
}

impl ChangeSpec {
    pub fn amount(amount: f64) -> Self {
        Self::Amount {
            amount,
            rounding_mode: None,
        }
    }

    pub fn percent(modifiers: impl Into<Vec<f64>>) -> Self {
        Self::Percent {
            modifiers: modifiers.into(),
            rounding_mode: None,
            additive: false,
        }
    }

    pub fn percent_from_resource(source: impl Into<ResourceId>) -> Self {
        Self::PercentFromResource {
            source_resource_id: source.into(),
            rounding_mode: None,
            additive: false,
            multiplier: None,
        }
    }

    /// Builder: set the rounding mode.
    pub fn rounded(mut self, mode: RoundingMode) -> Self {
        match &mut self {
            Self::Amount { rounding_mode, .. }
            | Self::Percent { rounding_mode, .. }
            | Self::PercentFromResource { rounding_mode, .. } => *rounding_mode = Some(mode),
        }
        self
    }

    /// Builder: sum fractions against the base instead of compounding.
    ///
    /// No effect on `Amount`.
    pub fn additive(mut self) -> Self {
        if let Self::Percent { additive, .. } | Self::PercentFromResource { additive, .. } =
            &mut self
        {
            *additive = true;
        }
        self
    }

    /// Builder: repeat a resource-sourced percent `times` times.
    ///
    /// No effect on other variants.
    pub fn times(mut self, times: u32) -> Self {
        if let Self::PercentFromResource { multiplier, .. } = &mut self {
            *multiplier = Some(times);
        }
        self
    }

    /// Checks the invariants authored data must satisfy.
    ///
    /// [`compute_delta`] assumes these hold; the content layer calls this
    /// when it converts authored specs.
    pub fn validate(&self) -> Result<(), ChangeSpecError> {
        match self {
            Self::Amount { amount, .. } if !amount.is_finite() => {
                Err(ChangeSpecError::NonFinite("amount"))
            }
            Self::Percent { modifiers, .. } if modifiers.is_empty() => {
                Err(ChangeSpecError::EmptyModifiers)
            }
            Self::Percent { modifiers, .. } if modifiers.iter().any(|m| !m.is_finite()) => {
                Err(ChangeSpecError::NonFinite("percent modifier"))
            }
            _ => Ok(()),
        }
    }
}

/// Computes the signed delta requested by `change` against `current`.
///
/// `resolve` reads other resources' current values (used by
/// `PercentFromResource`). Pure: no bounds, no side effects.
pub fn compute_delta<F>(current: f64, change: &ChangeSpec, resolve: F) -> f64
where
    F: Fn(&ResourceId) -> f64,
{
    match change {
        ChangeSpec::Amount {
            amount,
            rounding_mode,
        } => round_with(*amount, *rounding_mode),

        ChangeSpec::Percent {
            modifiers,
            rounding_mode,
            additive,
        } => percent_delta(
            current,
            modifiers.iter().copied(),
            *rounding_mode,
            *additive,
        ),

        ChangeSpec::PercentFromResource {
            source_resource_id,
            rounding_mode,
            additive,
            multiplier,
        } => {
            let fraction = resolve(source_resource_id);
            let times = multiplier.unwrap_or(1) as usize;
            percent_delta(
                current,
                core::iter::repeat_n(fraction, times),
                *rounding_mode,
                *additive,
            )
        }
    }
}

/// Additive: one rounding of `base * sum(fractions)`.
/// Compounding: each step rounds its own increment and feeds the next.
fn percent_delta(
    base: f64,
    fractions: impl Iterator<Item = f64>,
    rounding: Option<RoundingMode>,
    additive: bool,
) -> f64 {
    if additive {
        let total: f64 = fractions.sum();
        round_with(base * total, rounding)
    } else {
        let compounded = fractions.fold(base, |value, fraction| {
            value + round_with(value * fraction, rounding)
        });
        compounded - base
    }
}
