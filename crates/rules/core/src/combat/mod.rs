//! Attack resolution: parameters, logs, power, target handlers and the
//! pipeline tying them together.

mod pipeline;
mod power;
mod target;

pub use pipeline::resolve_attack;
pub use power::{PowerAdjustment, PowerLog, PowerModifier, evaluate_power};
pub use target::{
    AttackMeta, AttackTarget, BUILDING_MODIFIER_KEY, BuildingMutation, BuildingTarget,
    BuildingTargetHandler, BuildingTargetLog, MODIFIER_KEYS, RESOURCE_MODIFIER_KEY,
    STAT_MODIFIER_KEY, TargetHandler, TargetLog, ValueMutation, ValueTarget, ValueTargetHandler,
    ValueTargetLog,
};

use crate::effect::Effect;
use crate::ids::ResourceId;

/// Effects run after an attack that dealt damage.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OnDamage {
    /// Run as the attacker.
    pub attacker: Vec<Effect>,
    /// Run as the defender.
    pub defender: Vec<Effect>,
}

/// Parameters of an attack effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AttackParams {
    pub target: AttackTarget,
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_damage: OnDamage,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_absorption: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_fortification: bool,
    /// Overrides the configured absorption resource.
    #[cfg_attr(feature = "serde", serde(default))]
    pub absorption_resource_id: Option<ResourceId>,
}

impl AttackParams {
    pub fn new(target: AttackTarget) -> Self {
        Self {
            target,
            on_damage: OnDamage::default(),
            ignore_absorption: false,
            ignore_fortification: false,
            absorption_resource_id: None,
        }
    }
}

/// Absorption step of an attack.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsorptionLog {
    pub ignored: bool,
    pub fraction: f64,
    /// Damage entering the step.
    pub before: f64,
    /// Damage leaving the step.
    pub after: f64,
}

/// Fortification step of an attack.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FortificationLog {
    pub ignored: bool,
    /// Fortification before the soak.
    pub before: f64,
    /// Damage soaked.
    pub damage: f64,
    /// Fortification after the soak.
    pub after: f64,
}

/// Every intermediate value of one attack.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackEvaluationLog {
    pub power: PowerLog,
    pub absorption: AbsorptionLog,
    pub fortification: FortificationLog,
    pub target: TargetLog,
}

/// Result of [`resolve_attack`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AttackOutcome {
    /// Damage that reached the target after absorption and fortification.
    pub damage_dealt: f64,
    pub log: AttackEvaluationLog,
}
