//! Declarative effects and their executor.
//!
//! Effects are the only instructions content can issue. Every effect targets
//! the acting player of the [`EngineContext`]; trigger bundles and attack
//! `on_damage` lists reach other players by running inside an
//! [`ActorScope`].
//!
//! # Effects
//!
//! - `Resource`: bounded change through reconciliation
//! - `AddBuilding` / `RemoveBuilding`: ownership changes
//! - `AddPassive` / `RemovePassive`: hook registration
//! - `AddPowerModifier`: attack power evaluation modifier
//! - `Attack`: full attack resolution against the next seat

mod context;

pub use context::{ActorScope, EngineContext, FrameScope};

use tracing::{debug, trace};

use crate::combat::{AttackOutcome, AttackParams, PowerModifier, resolve_attack};
use crate::error::EngineError;
use crate::ids::{BuildingId, PassiveId, ResourceId};
use crate::reconcile::{ChangeSpec, ReconciliationMode};
use crate::resource::{ResourceUpdate, TierTransition};
use crate::state::PlayerId;
use crate::trigger::Passive;

/// Bounded change to one of the acting player's resources.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResourceEffect {
    pub resource: ResourceId,
    pub change: ChangeSpec,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reconciliation: ReconciliationMode,
}

/// One declarative instruction.
#[derive(Clone, Debug, PartialEq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
#[strum(serialize_all = "snake_case")]
pub enum Effect {
    Resource(ResourceEffect),
    AddBuilding { id: BuildingId },
    RemoveBuilding { id: BuildingId },
    AddPassive(Passive),
    RemovePassive { id: PassiveId },
    AddPowerModifier { key: String, modifier: PowerModifier },
    Attack(AttackParams),
}

impl Effect {
    /// Clamped change to `resource`.
    pub fn resource(resource: impl Into<ResourceId>, change: ChangeSpec) -> Self {
        Self::Resource(ResourceEffect {
            resource: resource.into(),
            change,
            reconciliation: ReconciliationMode::Clamp,
        })
    }

    /// Change to `resource` under an explicit reconciliation mode.
    pub fn resource_with(
        resource: impl Into<ResourceId>,
        change: ChangeSpec,
        reconciliation: ReconciliationMode,
    ) -> Self {
        Self::Resource(ResourceEffect {
            resource: resource.into(),
            change,
            reconciliation,
        })
    }

    pub fn add_building(id: impl Into<BuildingId>) -> Self {
        Self::AddBuilding { id: id.into() }
    }

    pub fn remove_building(id: impl Into<BuildingId>) -> Self {
        Self::RemoveBuilding { id: id.into() }
    }
}

/// Observable record of what an effect did.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum EffectLog {
    ResourceChanged {
        player: PlayerId,
        update: ResourceUpdate,
    },
    TierChanged {
        player: PlayerId,
        transition: TierTransition,
    },
    BuildingAdded {
        player: PlayerId,
        id: BuildingId,
    },
    BuildingRemoved {
        player: PlayerId,
        id: BuildingId,
    },
    PassiveAdded {
        player: PlayerId,
        id: PassiveId,
    },
    PassiveRemoved {
        player: PlayerId,
        id: PassiveId,
    },
    PowerModifierAdded {
        player: PlayerId,
        key: String,
        modifier: PowerModifier,
    },
    Attack {
        attacker: PlayerId,
        defender: PlayerId,
        outcome: AttackOutcome,
    },
}

/// Runs `effects` in order, stopping at the first error.
///
/// Effects already applied stay applied.
pub fn execute_effects(ctx: &mut EngineContext<'_>, effects: &[Effect]) -> Result<(), EngineError> {
    effects
        .iter()
        .try_for_each(|effect| execute_effect(ctx, effect))
}

/// Runs one effect against the acting player.
pub fn execute_effect(ctx: &mut EngineContext<'_>, effect: &Effect) -> Result<(), EngineError> {
    let player = ctx.actor();
    let kind: &'static str = effect.into();
    trace!(target: "rules::effect", %player, kind, "executing effect");

    match effect {
        Effect::Resource(resource) => {
            ctx.ensure_resource(&resource.resource)?;
            if let ChangeSpec::PercentFromResource {
                source_resource_id, ..
            } = &resource.change
            {
                ctx.ensure_resource(source_resource_id)?;
            }
            ctx.apply_change(
                player,
                &resource.resource,
                &resource.change,
                resource.reconciliation,
            )?;
        }
        Effect::AddBuilding { id } => {
            if !ctx.env.buildings().contains(id) {
                return Err(EngineError::UnknownBuilding(id.clone()));
            }
            if !ctx.state.player_mut(player)?.add_building(id.clone()) {
                return Err(EngineError::BuildingAlreadyOwned {
                    player,
                    building: id.clone(),
                });
            }
            ctx.record(EffectLog::BuildingAdded {
                player,
                id: id.clone(),
            });
        }
        Effect::RemoveBuilding { id } => {
            if !ctx.state.player_mut(player)?.remove_building(id) {
                return Err(EngineError::BuildingNotOwned {
                    player,
                    building: id.clone(),
                });
            }
            ctx.record(EffectLog::BuildingRemoved {
                player,
                id: id.clone(),
            });
        }
        Effect::AddPassive(passive) => {
            ctx.state.player_mut(player)?.add_passive(passive.clone())?;
            ctx.record(EffectLog::PassiveAdded {
                player,
                id: passive.id.clone(),
            });
        }
        Effect::RemovePassive { id } => {
            ctx.state.player_mut(player)?.remove_passive(id)?;
            ctx.record(EffectLog::PassiveRemoved {
                player,
                id: id.clone(),
            });
        }
        Effect::AddPowerModifier { key, modifier } => {
            ctx.state
                .player_mut(player)?
                .add_power_modifier(key.clone(), modifier.clone());
            ctx.record(EffectLog::PowerModifierAdded {
                player,
                key: key.clone(),
                modifier: modifier.clone(),
            });
        }
        Effect::Attack(params) => execute_attack(ctx, player, params)?,
    }

    Ok(())
}

fn execute_attack(
    ctx: &mut EngineContext<'_>,
    attacker: PlayerId,
    params: &AttackParams,
) -> Result<(), EngineError> {
    let defender = ctx.state.opponent_of(attacker)?;
    let outcome = resolve_attack(ctx, attacker, defender, params)?;
    let damage_dealt = outcome.damage_dealt;
    ctx.record(EffectLog::Attack {
        attacker,
        defender,
        outcome,
    });

    if damage_dealt > 0.0 {
        debug!(
            target: "rules::effect",
            %attacker,
            %defender,
            damage_dealt,
            "running on-damage effects"
        );
        {
            let mut scope = ctx.acting_as(attacker)?;
            execute_effects(&mut scope, &params.on_damage.attacker)?;
        }
        let mut scope = ctx.acting_as(defender)?;
        execute_effects(&mut scope, &params.on_damage.defender)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{AttackTarget, OnDamage, PowerAdjustment};
    use crate::reconcile::{ReconcileError, RoundingMode};
    use crate::source::StatSource;
    use crate::testing::{Fixture, gain};

    #[test]
    fn resource_effect_targets_active_player() {
        let mut fixture = Fixture::duel();
        let mut ctx = fixture.context();
        execute_effect(&mut ctx, &gain("gold", 15.0)).unwrap();

        assert_eq!(ctx.state.player(PlayerId(1)).unwrap().resources.value("gold"), 15.0);
        assert_eq!(ctx.state.player(PlayerId(2)).unwrap().resources.value("gold"), 0.0);
    }

    #[test]
    fn resource_effect_clamps_into_bounds() {
        let mut fixture = Fixture::duel();
        let mut ctx = fixture.context();
        execute_effect(&mut ctx, &gain("gold", 250.0)).unwrap();

        let Some(EffectLog::ResourceChanged { update, .. }) = ctx.log().last() else {
            panic!("expected resource log");
        };
        let result = update.reconciliation.unwrap();
        assert_eq!(result.final_value, 100.0);
        assert!(result.touched_upper);
        assert!(!result.touched_lower);
    }

    #[test]
    fn reject_mode_surfaces_bound_error_without_writing() {
        let mut fixture = Fixture::duel();
        let mut ctx = fixture.context();
        let effect = Effect::resource_with(
            "gold",
            ChangeSpec::amount(-5.0),
            ReconciliationMode::Reject,
        );

        let error = execute_effect(&mut ctx, &effect).unwrap_err();
        assert!(matches!(
            error,
            EngineError::Reconcile(ReconcileError::BoundExceeded(_))
        ));
        assert_eq!(ctx.state.player(PlayerId(1)).unwrap().resources.value("gold"), 0.0);
        assert!(ctx.log().is_empty());
    }

    #[test]
    fn unknown_resources_are_rejected() {
        let mut fixture = Fixture::duel();
        let mut ctx = fixture.context();

        assert_eq!(
            execute_effect(&mut ctx, &gain("mana", 1.0)),
            Err(EngineError::UnknownResource(ResourceId::new("mana")))
        );

        let sourced = Effect::resource("gold", ChangeSpec::percent_from_resource("mana"));
        assert_eq!(
            execute_effect(&mut ctx, &sourced),
            Err(EngineError::UnknownResource(ResourceId::new("mana")))
        );
    }

    #[test]
    fn percent_from_resource_reads_actor_store() {
        let mut fixture = Fixture::duel();
        let mut ctx = fixture.context();
        execute_effects(
            &mut ctx,
            &[
                gain("gold", 40.0),
                gain("interest", 0.25),
                Effect::resource(
                    "gold",
                    ChangeSpec::percent_from_resource("interest").rounded(RoundingMode::Down),
                ),
            ],
        )
        .unwrap();

        assert_eq!(ctx.state.player(PlayerId(1)).unwrap().resources.value("gold"), 50.0);
    }

    #[test]
    fn building_ownership_changes_are_checked() {
        let mut fixture = Fixture::duel();
        let mut ctx = fixture.context();

        execute_effect(&mut ctx, &Effect::add_building("tower")).unwrap();
        assert!(matches!(
            execute_effect(&mut ctx, &Effect::add_building("tower")),
            Err(EngineError::BuildingAlreadyOwned { .. })
        ));
        assert_eq!(
            execute_effect(&mut ctx, &Effect::add_building("castle")),
            Err(EngineError::UnknownBuilding(BuildingId::new("castle")))
        );

        execute_effect(&mut ctx, &Effect::remove_building("tower")).unwrap();
        assert!(matches!(
            execute_effect(&mut ctx, &Effect::remove_building("tower")),
            Err(EngineError::BuildingNotOwned { .. })
        ));
        assert!(matches!(
            ctx.log(),
            [
                EffectLog::BuildingAdded { .. },
                EffectLog::BuildingRemoved { .. }
            ]
        ));
    }

    #[test]
    fn frames_attribute_breakdown() {
        let mut fixture = Fixture::duel();
        let mut ctx = fixture.context();
        {
            let mut frame = ctx.within_frame(StatSource::building("mint"));
            execute_effect(&mut frame, &gain("gold", 7.0)).unwrap();
        }
        execute_effect(&mut ctx, &gain("gold", 3.0)).unwrap();

        let breakdown = ctx
            .state
            .player(PlayerId(1))
            .unwrap()
            .resources
            .breakdown("gold")
            .cloned()
            .unwrap_or_default();
        assert_eq!(breakdown.get(&StatSource::building("mint")), Some(&7.0));
        assert_eq!(breakdown.len(), 1);
    }

    #[test]
    fn passives_and_modifiers_register_on_actor() {
        let mut fixture = Fixture::duel();
        let mut ctx = fixture.context();
        let modifier = PowerModifier::new(StatSource::passive("drills"), PowerAdjustment::Flat(2.0));

        execute_effects(
            &mut ctx,
            &[
                Effect::AddPassive(Passive::new("drills", StatSource::passive("drills"))),
                Effect::AddPowerModifier {
                    key: "attack:resource".into(),
                    modifier: modifier.clone(),
                },
            ],
        )
        .unwrap();

        let player = ctx.state.player(PlayerId(1)).unwrap();
        assert!(player.passive("drills").is_some());
        assert_eq!(player.power_modifiers("attack:resource"), &[modifier]);

        execute_effect(
            &mut ctx,
            &Effect::RemovePassive {
                id: PassiveId::new("drills"),
            },
        )
        .unwrap();
        assert!(ctx.state.player(PlayerId(1)).unwrap().passives().is_empty());
    }

    #[test]
    fn on_damage_runs_in_each_players_scope() {
        let mut fixture = Fixture::duel();
        fixture.set(PlayerId(1), "army_strength", 10.0);
        fixture.set(PlayerId(2), "population", 20.0);
        let mut ctx = fixture.context();

        let attack = Effect::Attack(AttackParams {
            on_damage: OnDamage {
                attacker: vec![gain("gold", 5.0)],
                defender: vec![gain("happiness", -3.0)],
            },
            ..AttackParams::new(AttackTarget::resource("population"))
        });
        execute_effect(&mut ctx, &attack).unwrap();

        let attacker = ctx.state.player(PlayerId(1)).unwrap();
        let defender = ctx.state.player(PlayerId(2)).unwrap();
        assert_eq!(defender.resources.value("population"), 10.0);
        assert_eq!(attacker.resources.value("gold"), 5.0);
        assert_eq!(defender.resources.value("happiness"), -3.0);
        assert_eq!(attacker.resources.value("happiness"), 0.0);
        assert_eq!(ctx.actor(), PlayerId(1));
    }

    #[test]
    fn on_damage_skipped_without_damage() {
        let mut fixture = Fixture::duel();
        fixture.set(PlayerId(2), "population", 20.0);
        let mut ctx = fixture.context();

        let attack = Effect::Attack(AttackParams {
            on_damage: OnDamage {
                attacker: vec![gain("gold", 5.0)],
                defender: Vec::new(),
            },
            ..AttackParams::new(AttackTarget::resource("population"))
        });
        execute_effect(&mut ctx, &attack).unwrap();

        assert_eq!(ctx.state.player(PlayerId(1)).unwrap().resources.value("gold"), 0.0);
        assert!(matches!(
            ctx.log().last(),
            Some(EffectLog::Attack { outcome, .. }) if outcome.damage_dealt == 0.0
        ));
    }
}
