//! Authored effects, change specifications and trigger lists.
//!
//! The RON shapes here are externally tagged (`Amount(amount: 5.0)`) rather
//! than the `type`-tagged JSON shapes `rules-core` exposes to transports.
//! Conversion checks every numeric field and every catalog reference.

use serde::Deserialize;

use rules_core::{
    AttackParams, AttackTarget, ChangeSpec, Effect, LifecycleEvent, MODIFIER_KEYS, OnDamage,
    Passive, PowerAdjustment, PowerModifier, ReconciliationMode, ResourceId, RoundingMode,
    StatSource,
};

use super::{ContentError, References};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum ChangeDef {
    Amount {
        amount: f64,
        #[serde(default)]
        rounding: Option<RoundingMode>,
    },
    Percent {
        modifiers: Vec<f64>,
        #[serde(default)]
        rounding: Option<RoundingMode>,
        #[serde(default)]
        additive: bool,
    },
    PercentFromResource {
        source: String,
        #[serde(default)]
        rounding: Option<RoundingMode>,
        #[serde(default)]
        additive: bool,
        #[serde(default)]
        multiplier: Option<u32>,
    },
}

/// Authored power adjustment: `Flat(2.0)` or `Percent(0.25)`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub enum PowerAdjustmentDef {
    Flat(f64),
    Percent(f64),
}

impl From<PowerAdjustmentDef> for PowerAdjustment {
    fn from(def: PowerAdjustmentDef) -> Self {
        match def {
            PowerAdjustmentDef::Flat(amount) => Self::Flat(amount),
            PowerAdjustmentDef::Percent(amount) => Self::Percent(amount),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub enum TargetDef {
    Resource(String),
    Stat(String),
    Building(String),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OnDamageDef {
    pub attacker: Vec<EffectDef>,
    pub defender: Vec<EffectDef>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttackDef {
    pub target: TargetDef,
    #[serde(default)]
    pub on_damage: OnDamageDef,
    #[serde(default)]
    pub ignore_absorption: bool,
    #[serde(default)]
    pub ignore_fortification: bool,
    #[serde(default)]
    pub absorption_resource: Option<String>,
}

/// Effect lists per lifecycle event.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggersDef {
    pub before_attacked: Vec<EffectDef>,
    pub attack_resolved: Vec<EffectDef>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassiveDef {
    pub id: String,
    /// Defaults to a passive source named after the passive.
    #[serde(default)]
    pub source: Option<StatSource>,
    #[serde(default)]
    pub triggers: TriggersDef,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub enum EffectDef {
    Resource {
        resource: String,
        change: ChangeDef,
        #[serde(default)]
        reconciliation: ReconciliationMode,
    },
    AddBuilding(String),
    RemoveBuilding(String),
    AddPassive(PassiveDef),
    RemovePassive(String),
    AddPowerModifier {
        key: String,
        source: StatSource,
        adjustment: PowerAdjustmentDef,
    },
    Attack(AttackDef),
}

impl TryFrom<ChangeDef> for ChangeSpec {
    type Error = rules_core::reconcile::ChangeSpecError;

    fn try_from(def: ChangeDef) -> Result<Self, Self::Error> {
        let spec = match def {
            ChangeDef::Amount { amount, rounding } => ChangeSpec::Amount {
                amount,
                rounding_mode: rounding,
            },
            ChangeDef::Percent {
                modifiers,
                rounding,
                additive,
            } => ChangeSpec::Percent {
                modifiers,
                rounding_mode: rounding,
                additive,
            },
            ChangeDef::PercentFromResource {
                source,
                rounding,
                additive,
                multiplier,
            } => ChangeSpec::PercentFromResource {
                source_resource_id: ResourceId::new(source),
                rounding_mode: rounding,
                additive,
                multiplier,
            },
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl TriggersDef {
    pub(crate) fn resolve(
        self,
        context: &str,
        refs: &References,
    ) -> Result<Vec<(LifecycleEvent, Vec<Effect>)>, ContentError> {
        Ok(vec![
            (
                LifecycleEvent::BeforeAttacked,
                resolve_all(self.before_attacked, context, refs)?,
            ),
            (
                LifecycleEvent::AttackResolved,
                resolve_all(self.attack_resolved, context, refs)?,
            ),
        ])
    }
}

pub(crate) fn resolve_all(
    defs: Vec<EffectDef>,
    context: &str,
    refs: &References,
) -> Result<Vec<Effect>, ContentError> {
    defs.into_iter()
        .map(|def| def.resolve(context, refs))
        .collect()
}

impl EffectDef {
    /// Converts into an engine effect, checking references against `refs`.
    pub(crate) fn resolve(self, context: &str, refs: &References) -> Result<Effect, ContentError> {
        let effect = match self {
            EffectDef::Resource {
                resource,
                change,
                reconciliation,
            } => {
                refs.resource(context, &resource)?;
                if let ChangeDef::PercentFromResource { source, .. } = &change {
                    refs.resource(context, source)?;
                }
                let change =
                    ChangeSpec::try_from(change).map_err(|source| ContentError::InvalidChange {
                        context: format!("{context} change to `{resource}`"),
                        source,
                    })?;
                Effect::resource_with(resource, change, reconciliation)
            }
            EffectDef::AddBuilding(id) => {
                refs.building(context, &id)?;
                Effect::add_building(id)
            }
            EffectDef::RemoveBuilding(id) => {
                refs.building(context, &id)?;
                Effect::remove_building(id)
            }
            EffectDef::AddPassive(passive) => Effect::AddPassive(passive.resolve(refs)?),
            EffectDef::RemovePassive(id) => Effect::RemovePassive { id: id.into() },
            EffectDef::AddPowerModifier {
                key,
                source,
                adjustment,
            } => {
                if !MODIFIER_KEYS.contains(&key.as_str()) {
                    return Err(ContentError::UnknownModifierKey {
                        context: context.to_owned(),
                        key,
                    });
                }
                let amount = match adjustment {
                    PowerAdjustmentDef::Flat(amount) | PowerAdjustmentDef::Percent(amount) => {
                        amount
                    }
                };
                if !amount.is_finite() {
                    return Err(ContentError::NonFinite {
                        context: context.to_owned(),
                        field: "power adjustment",
                    });
                }
                Effect::AddPowerModifier {
                    key,
                    modifier: PowerModifier::new(source, adjustment.into()),
                }
            }
            EffectDef::Attack(attack) => Effect::Attack(attack.resolve(context, refs)?),
        };
        Ok(effect)
    }
}

impl PassiveDef {
    pub(crate) fn resolve(self, refs: &References) -> Result<Passive, ContentError> {
        let context = format!("passive `{}`", self.id);
        let source = self
            .source
            .unwrap_or_else(|| StatSource::passive(self.id.as_str()));
        let mut passive = Passive::new(self.id, source);
        for (event, effects) in self.triggers.resolve(&context, refs)? {
            if !effects.is_empty() {
                passive = passive.on(event, effects);
            }
        }
        Ok(passive)
    }
}

impl AttackDef {
    fn resolve(self, context: &str, refs: &References) -> Result<AttackParams, ContentError> {
        let target = match self.target {
            TargetDef::Resource(key) => {
                refs.value_target(context, &key, false)?;
                AttackTarget::resource(key)
            }
            TargetDef::Stat(key) => {
                refs.value_target(context, &key, true)?;
                AttackTarget::stat(key)
            }
            TargetDef::Building(id) => {
                refs.building(context, &id)?;
                AttackTarget::building(id)
            }
        };

        if let Some(resource) = &self.absorption_resource {
            refs.resource(context, resource)?;
        }

        Ok(AttackParams {
            target,
            on_damage: OnDamage {
                attacker: resolve_all(self.on_damage.attacker, context, refs)?,
                defender: resolve_all(self.on_damage.defender, context, refs)?,
            },
            ignore_absorption: self.ignore_absorption,
            ignore_fortification: self.ignore_fortification,
            absorption_resource_id: self.absorption_resource.map(ResourceId::new),
        })
    }
}
