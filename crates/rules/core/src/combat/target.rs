//! Target handlers: how damage lands on each kind of attack target.
//!
//! Every handler implements the same three operations:
//!
//! 1. `evaluation_modifier_key`: which power-modifier list applies
//! 2. `apply_damage`: mutate state, return a mutation record
//! 3. `build_log`: render the log entry from that record
//!
//! The pipeline always applies before it logs, and the log is built from the
//! returned mutation only, so it never re-reads state that triggers may
//! since have changed. Adding a target kind means adding an
//! [`AttackTarget`] variant and a handler; the pipeline does not change.

use crate::effect::{Effect, EngineContext, execute_effect};
use crate::error::EngineError;
use crate::ids::{BuildingId, ResourceId};
use crate::state::PlayerId;

/// Power-modifier list consulted for `resource` targets.
pub const RESOURCE_MODIFIER_KEY: &str = "attack:resource";
/// Power-modifier list consulted for `stat` targets.
pub const STAT_MODIFIER_KEY: &str = "attack:stat";
/// Power-modifier list consulted for `building` targets.
pub const BUILDING_MODIFIER_KEY: &str = "attack:building";

/// Every key an attack evaluation can consult.
pub const MODIFIER_KEYS: [&str; 3] = [
    RESOURCE_MODIFIER_KEY,
    STAT_MODIFIER_KEY,
    BUILDING_MODIFIER_KEY,
];

/// Attack target addressed by a value key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueTarget {
    pub key: ResourceId,
}

/// Attack target addressed by building id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingTarget {
    pub id: BuildingId,
}

/// What an attack hits.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum AttackTarget {
    Resource(ValueTarget),
    Stat(ValueTarget),
    Building(BuildingTarget),
}

impl AttackTarget {
    pub fn resource(key: impl Into<ResourceId>) -> Self {
        Self::Resource(ValueTarget { key: key.into() })
    }

    pub fn stat(key: impl Into<ResourceId>) -> Self {
        Self::Stat(ValueTarget { key: key.into() })
    }

    pub fn building(id: impl Into<BuildingId>) -> Self {
        Self::Building(BuildingTarget { id: id.into() })
    }

    /// Key of the attacker's power-modifier list for this target.
    pub fn evaluation_modifier_key(&self) -> &'static str {
        match self {
            Self::Resource(target) => ValueTargetHandler::RESOURCE.evaluation_modifier_key(target),
            Self::Stat(target) => ValueTargetHandler::STAT.evaluation_modifier_key(target),
            Self::Building(target) => BuildingTargetHandler.evaluation_modifier_key(target),
        }
    }

    /// Applies `damage` through the matching handler and builds its log.
    pub(crate) fn strike(
        &self,
        ctx: &mut EngineContext<'_>,
        damage: f64,
        meta: &AttackMeta,
    ) -> Result<TargetLog, EngineError> {
        match self {
            Self::Resource(target) => {
                strike_with(&ValueTargetHandler::RESOURCE, ctx, target, damage, meta)
            }
            Self::Stat(target) => strike_with(&ValueTargetHandler::STAT, ctx, target, damage, meta),
            Self::Building(target) => strike_with(&BuildingTargetHandler, ctx, target, damage, meta),
        }
    }
}

fn strike_with<H: TargetHandler>(
    handler: &H,
    ctx: &mut EngineContext<'_>,
    target: &H::Target,
    damage: f64,
    meta: &AttackMeta,
) -> Result<TargetLog, EngineError> {
    let mutation = handler.apply_damage(ctx, target, damage, meta)?;
    Ok(handler.build_log(target, damage, meta, &mutation))
}

/// Attack facts handed to target handlers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackMeta {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub base_power: f64,
    pub modified_power: f64,
}

/// Log entry for a resource or stat target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueTargetLog {
    pub key: ResourceId,
    pub damage: f64,
    pub before: f64,
    pub after: f64,
}

/// Log entry for a building target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingTargetLog {
    pub id: BuildingId,
    pub damage: f64,
    pub existed: bool,
    pub destroyed: bool,
}

/// Target-specific part of the attack evaluation log.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum TargetLog {
    Resource(ValueTargetLog),
    Stat(ValueTargetLog),
    Building(BuildingTargetLog),
}

impl TargetLog {
    /// Damage the handler received.
    pub fn damage(&self) -> f64 {
        match self {
            Self::Resource(log) | Self::Stat(log) => log.damage,
            Self::Building(log) => log.damage,
        }
    }
}

/// Damage contract for one attack target kind.
pub trait TargetHandler {
    type Target;
    type Mutation;

    fn evaluation_modifier_key(&self, target: &Self::Target) -> &'static str;

    /// Mutates state and reports what changed.
    fn apply_damage(
        &self,
        ctx: &mut EngineContext<'_>,
        target: &Self::Target,
        damage: f64,
        meta: &AttackMeta,
    ) -> Result<Self::Mutation, EngineError>;

    /// Pure: same inputs, same log.
    fn build_log(
        &self,
        target: &Self::Target,
        damage: f64,
        meta: &AttackMeta,
        mutation: &Self::Mutation,
    ) -> TargetLog;
}

/// Before/after of a damaged value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueMutation {
    pub before: f64,
    pub after: f64,
}

/// Handler for resource and stat targets. Damage floors at zero and is
/// written through the ordinary set path, never reconciliation.
///
/// The `stat` handler only accepts resources flagged
/// [`ResourceFlags::STAT`](crate::resource::ResourceFlags::STAT); the
/// `resource` handler only accepts unflagged ones.
#[derive(Clone, Copy, Debug)]
pub struct ValueTargetHandler {
    key: &'static str,
    stat: bool,
    wrap: fn(ValueTargetLog) -> TargetLog,
}

impl ValueTargetHandler {
    pub const RESOURCE: Self = Self {
        key: RESOURCE_MODIFIER_KEY,
        stat: false,
        wrap: TargetLog::Resource,
    };

    pub const STAT: Self = Self {
        key: STAT_MODIFIER_KEY,
        stat: true,
        wrap: TargetLog::Stat,
    };

    /// Target kind name as it appears in attack parameters.
    fn kind(&self) -> &'static str {
        if self.stat { "stat" } else { "resource" }
    }
}

impl TargetHandler for ValueTargetHandler {
    type Target = ValueTarget;
    type Mutation = ValueMutation;

    fn evaluation_modifier_key(&self, _target: &ValueTarget) -> &'static str {
        self.key
    }

    fn apply_damage(
        &self,
        ctx: &mut EngineContext<'_>,
        target: &ValueTarget,
        damage: f64,
        meta: &AttackMeta,
    ) -> Result<ValueMutation, EngineError> {
        let definition = ctx
            .env
            .resources()
            .get(&target.key)
            .ok_or_else(|| EngineError::UnknownResource(target.key.clone()))?;
        if definition.is_stat() != self.stat {
            return Err(EngineError::TargetKindMismatch {
                resource: target.key.clone(),
                expected: self.kind(),
            });
        }

        let before = ctx
            .state
            .player(meta.defender)?
            .resources
            .value(&target.key);
        let after = (before - damage).max(0.0);
        ctx.set_resource(meta.defender, &target.key, after)?;
        Ok(ValueMutation { before, after })
    }

    fn build_log(
        &self,
        target: &ValueTarget,
        damage: f64,
        _meta: &AttackMeta,
        mutation: &ValueMutation,
    ) -> TargetLog {
        (self.wrap)(ValueTargetLog {
            key: target.key.clone(),
            damage,
            before: mutation.before,
            after: mutation.after,
        })
    }
}

/// Whether a targeted building stood and whether it fell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildingMutation {
    pub existed: bool,
    pub destroyed: bool,
}

/// Handler for building targets: any positive damage removes the building.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildingTargetHandler;

impl TargetHandler for BuildingTargetHandler {
    type Target = BuildingTarget;
    type Mutation = BuildingMutation;

    fn evaluation_modifier_key(&self, _target: &BuildingTarget) -> &'static str {
        BUILDING_MODIFIER_KEY
    }

    fn apply_damage(
        &self,
        ctx: &mut EngineContext<'_>,
        target: &BuildingTarget,
        damage: f64,
        meta: &AttackMeta,
    ) -> Result<BuildingMutation, EngineError> {
        let existed = ctx.state.player(meta.defender)?.owns_building(&target.id);
        if damage > 0.0 && existed {
            let mut scope = ctx.acting_as(meta.defender)?;
            execute_effect(&mut scope, &Effect::remove_building(target.id.clone()))?;
        }
        let destroyed = existed && !ctx.state.player(meta.defender)?.owns_building(&target.id);
        Ok(BuildingMutation { existed, destroyed })
    }

    fn build_log(
        &self,
        target: &BuildingTarget,
        damage: f64,
        _meta: &AttackMeta,
        mutation: &BuildingMutation,
    ) -> TargetLog {
        TargetLog::Building(BuildingTargetLog {
            id: target.id.clone(),
            damage,
            existed: mutation.existed,
            destroyed: mutation.destroyed,
        })
    }
}
