//! Attack resolution.
//!
//! Single pass, no retries:
//!
//! ```text
//! before_attacked triggers (defender scope)
//!   → power evaluation (attacker modifiers)
//!   → absorption (defender fraction, capped)
//!   → fortification soak (written back immediately)
//!   → target damage (handler apply, then log)
//!   → attack_resolved triggers (defender scope)
//!   → fortification floor
//! ```
//!
//! Errors propagate unchanged and nothing is rolled back; the acting player
//! is always restored by the scope guard.

use tracing::{debug, warn};

use crate::effect::{EngineContext, execute_effects};
use crate::error::EngineError;
use crate::state::PlayerId;
use crate::trigger::{LifecycleEvent, collect_triggers};

use super::power::{PowerLog, evaluate_power};
use super::target::{AttackMeta, TargetLog};
use super::{AbsorptionLog, AttackEvaluationLog, AttackOutcome, AttackParams, FortificationLog};

/// Resolves one attack of `attacker` against `defender`.
pub fn resolve_attack(
    ctx: &mut EngineContext<'_>,
    attacker: PlayerId,
    defender: PlayerId,
    params: &AttackParams,
) -> Result<AttackOutcome, EngineError> {
    let config = ctx.env.config;

    run_triggers(ctx, defender, LifecycleEvent::BeforeAttacked)?;

    let power = evaluate_attack_power(ctx, attacker, params)?;
    let meta = AttackMeta {
        attacker,
        defender,
        base_power: power.base,
        modified_power: power.modified,
    };

    let absorption = absorb(ctx, defender, params, power.modified)?;
    let fortification = fortify(ctx, defender, params, absorption.after)?;

    let target_damage = (absorption.after - fortification.damage).max(0.0);
    let target = params.target.strike(ctx, target_damage, &meta)?;

    run_triggers(ctx, defender, LifecycleEvent::AttackResolved)?;

    let fortification_now = ctx
        .state
        .player(defender)?
        .resources
        .value(&config.fortification_resource);
    if fortification_now < 0.0 {
        warn!(
            target: "rules::attack",
            %defender,
            value = fortification_now,
            "fortification driven negative by triggers; flooring at zero"
        );
        ctx.set_resource(defender, &config.fortification_resource, 0.0)?;
    }

    debug!(
        target: "rules::attack",
        %attacker,
        %defender,
        power = power.modified,
        after_absorption = absorption.after,
        soaked = fortification.damage,
        damage = target_damage,
        "attack resolved"
    );

    Ok(AttackOutcome {
        damage_dealt: target_damage,
        log: AttackEvaluationLog {
            power,
            absorption,
            fortification,
            target,
        },
    })
}

/// Runs `defender`'s bundles for `event` as the defender, one frame per bundle.
fn run_triggers(
    ctx: &mut EngineContext<'_>,
    defender: PlayerId,
    event: LifecycleEvent,
) -> Result<(), EngineError> {
    let bundles = collect_triggers(ctx.state, ctx.env.catalog, defender, event)?;
    if bundles.is_empty() {
        return Ok(());
    }

    debug!(
        target: "rules::attack",
        %defender,
        %event,
        bundles = bundles.len(),
        "running triggers"
    );

    let mut scope = ctx.acting_as(defender)?;
    for bundle in bundles {
        let mut frame = scope.within_frame(bundle.frame);
        execute_effects(&mut frame, &bundle.effects)?;
    }
    Ok(())
}

fn evaluate_attack_power(
    ctx: &EngineContext<'_>,
    attacker: PlayerId,
    params: &AttackParams,
) -> Result<PowerLog, EngineError> {
    let player = ctx.state.player(attacker)?;
    let base = player.resources.value(&ctx.env.config.power_resource);
    let modifiers = player.power_modifiers(params.target.evaluation_modifier_key());
    Ok(evaluate_power(base, modifiers))
}

fn absorb(
    ctx: &EngineContext<'_>,
    defender: PlayerId,
    params: &AttackParams,
    power: f64,
) -> Result<AbsorptionLog, EngineError> {
    let config = ctx.env.config;
    if params.ignore_absorption {
        return Ok(AbsorptionLog {
            ignored: true,
            fraction: 0.0,
            before: power,
            after: power,
        });
    }

    let resource = params
        .absorption_resource_id
        .as_ref()
        .unwrap_or(&config.absorption_resource);
    let fraction = ctx
        .state
        .player(defender)?
        .resources
        .value(resource)
        .min(config.absorption_cap)
        .max(0.0);

    Ok(AbsorptionLog {
        ignored: false,
        fraction,
        before: power,
        after: config.absorption_rounding.apply(power * (1.0 - fraction)),
    })
}

fn fortify(
    ctx: &mut EngineContext<'_>,
    defender: PlayerId,
    params: &AttackParams,
    damage: f64,
) -> Result<FortificationLog, EngineError> {
    let config = ctx.env.config;
    let resource = &config.fortification_resource;
    let before = ctx.state.player(defender)?.resources.value(resource);
    if params.ignore_fortification {
        return Ok(FortificationLog {
            ignored: true,
            before,
            damage: 0.0,
            after: before,
        });
    }

    let soaked = before.min(damage).max(0.0);
    let after = (before - soaked).max(0.0);
    if after != before {
        ctx.set_resource(defender, resource, after)?;
    }

    Ok(FortificationLog {
        ignored: false,
        before,
        damage: soaked,
        after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::BuildingDefinition;
    use crate::combat::{AttackTarget, PowerAdjustment, PowerModifier};
    use crate::config::RulesConfig;
    use crate::effect::{Effect, EffectLog};
    use crate::ids::ResourceId;
    use crate::reconcile::RoundingMode;
    use crate::source::StatSource;
    use crate::testing::{Fixture, gain};
    use crate::trigger::Passive;

    fn siege(fixture: &mut Fixture) {
        fixture.set(PlayerId(1), "army_strength", 10.0);
        fixture.set(PlayerId(2), "absorption", 0.5);
        fixture.set(PlayerId(2), "fortification", 2.0);
        fixture.set(PlayerId(2), "population", 20.0);
    }

    fn attack(fixture: &mut Fixture, params: &AttackParams) -> AttackOutcome {
        let mut ctx = fixture.context();
        resolve_attack(&mut ctx, PlayerId(1), PlayerId(2), params).unwrap()
    }

    #[test]
    fn absorption_then_fortification_then_target() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);

        let outcome = attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );

        assert_eq!(outcome.damage_dealt, 3.0);
        let log = &outcome.log;
        assert_eq!(
            log.power,
            PowerLog {
                base: 10.0,
                modified: 10.0
            }
        );
        assert_eq!(
            log.absorption,
            AbsorptionLog {
                ignored: false,
                fraction: 0.5,
                before: 10.0,
                after: 5.0
            }
        );
        assert_eq!(
            log.fortification,
            FortificationLog {
                ignored: false,
                before: 2.0,
                damage: 2.0,
                after: 0.0
            }
        );
        assert!(matches!(
            &log.target,
            TargetLog::Resource(target) if target.before == 20.0 && target.after == 17.0
        ));
        assert_eq!(fixture.value(PlayerId(2), "population"), 17.0);
        assert_eq!(fixture.value(PlayerId(2), "fortification"), 0.0);
    }

    #[test]
    fn ignored_absorption_passes_power_unrounded() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.set(PlayerId(1), "army_strength", 7.5);

        let params = AttackParams {
            ignore_absorption: true,
            ..AttackParams::new(AttackTarget::resource("population"))
        };
        let outcome = attack(&mut fixture, &params);

        let absorption = outcome.log.absorption;
        assert!(absorption.ignored);
        assert_eq!(absorption.fraction, 0.0);
        assert_eq!(absorption.after, absorption.before);
        assert_eq!(absorption.after, 7.5);
        assert_eq!(outcome.damage_dealt, 5.5);
    }

    #[test]
    fn ignored_fortification_is_untouched() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);

        let params = AttackParams {
            ignore_fortification: true,
            ..AttackParams::new(AttackTarget::resource("population"))
        };
        let outcome = attack(&mut fixture, &params);

        assert_eq!(
            outcome.log.fortification,
            FortificationLog {
                ignored: true,
                before: 2.0,
                damage: 0.0,
                after: 2.0
            }
        );
        assert_eq!(outcome.damage_dealt, 5.0);
        assert_eq!(fixture.value(PlayerId(2), "fortification"), 2.0);
    }

    #[test]
    fn ignoring_both_mitigations_deals_full_power() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);

        let params = AttackParams {
            ignore_absorption: true,
            ignore_fortification: true,
            ..AttackParams::new(AttackTarget::resource("population"))
        };
        let outcome = attack(&mut fixture, &params);

        assert_eq!(outcome.damage_dealt, 10.0);
        assert_eq!(fixture.value(PlayerId(2), "population"), 10.0);
    }

    #[test]
    fn absorption_is_capped_and_floored() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.config = fixture.config.clone().with_absorption_cap(0.25);
        fixture.set(PlayerId(2), "absorption", 0.9);

        let outcome = attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );
        assert_eq!(outcome.log.absorption.fraction, 0.25);
        // 10 × 0.75 = 7.5, rounded down
        assert_eq!(outcome.log.absorption.after, 7.0);

        fixture.set(PlayerId(2), "absorption", -3.0);
        fixture.set(PlayerId(2), "fortification", 0.0);
        let outcome = attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );
        assert_eq!(outcome.log.absorption.fraction, 0.0);
        assert_eq!(outcome.damage_dealt, 10.0);
    }

    #[test]
    fn absorption_resource_can_be_overridden() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.config = fixture
            .config
            .clone()
            .with_absorption_rounding(RoundingMode::Up);
        fixture.set(PlayerId(2), "shield_wall", 0.35);

        let params = AttackParams {
            absorption_resource_id: Some(ResourceId::new("shield_wall")),
            ..AttackParams::new(AttackTarget::resource("population"))
        };
        let outcome = attack(&mut fixture, &params);

        assert_eq!(outcome.log.absorption.fraction, 0.35);
        assert_eq!(outcome.log.absorption.after, 7.0);
    }

    #[test]
    fn fortification_larger_than_damage_absorbs_everything() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.set(PlayerId(2), "fortification", 8.0);

        let outcome = attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );
        assert_eq!(outcome.log.fortification.damage, 5.0);
        assert_eq!(outcome.log.fortification.after, 3.0);
        assert_eq!(outcome.damage_dealt, 0.0);
        assert_eq!(fixture.value(PlayerId(2), "population"), 20.0);
    }

    #[test]
    fn power_modifiers_use_target_key() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        let player = fixture.state.player_mut(PlayerId(1)).unwrap();
        player.add_power_modifier(
            "attack:resource",
            PowerModifier::new(StatSource::passive("drills"), PowerAdjustment::Flat(4.0)),
        );
        player.add_power_modifier(
            "attack:building",
            PowerModifier::new(StatSource::passive("rams"), PowerAdjustment::Flat(100.0)),
        );

        let outcome = attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );
        assert_eq!(
            outcome.log.power,
            PowerLog {
                base: 10.0,
                modified: 14.0
            }
        );
        assert_eq!(outcome.damage_dealt, 5.0);
    }

    #[test]
    fn building_target_destroyed_implies_existed() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture
            .state
            .player_mut(PlayerId(2))
            .unwrap()
            .add_building("mint".into());

        let outcome = attack(&mut fixture, &AttackParams::new(AttackTarget::building("mint")));
        let TargetLog::Building(log) = &outcome.log.target else {
            panic!("expected building log");
        };
        assert!(log.existed && log.destroyed);
        assert!(log.damage > 0.0);

        let outcome = attack(&mut fixture, &AttackParams::new(AttackTarget::building("mint")));
        let TargetLog::Building(log) = &outcome.log.target else {
            panic!("expected building log");
        };
        assert!(!log.existed && !log.destroyed);
    }

    #[test]
    fn pre_triggers_run_before_mitigation() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.define_building(
            BuildingDefinition::new("tower")
                .on(LifecycleEvent::BeforeAttacked, [gain("fortification", 3.0)]),
        );
        fixture
            .state
            .player_mut(PlayerId(2))
            .unwrap()
            .add_building("tower".into());

        let outcome = attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );

        assert_eq!(outcome.log.fortification.before, 5.0);
        assert_eq!(outcome.damage_dealt, 0.0);
        assert_eq!(fixture.value(PlayerId(1), "fortification"), 0.0);

        let breakdown = fixture
            .state
            .player(PlayerId(2))
            .unwrap()
            .resources
            .breakdown("fortification")
            .cloned()
            .unwrap_or_default();
        assert_eq!(breakdown.get(&StatSource::building("tower")), Some(&3.0));
    }

    #[test]
    fn triggers_run_passives_then_buildings() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.define_building(
            BuildingDefinition::new("barracks")
                .on(LifecycleEvent::BeforeAttacked, [gain("army_strength", 2.0)]),
        );
        let defender = fixture.state.player_mut(PlayerId(2)).unwrap();
        defender.add_building("barracks".into());
        defender
            .add_passive(
                Passive::new("levy", StatSource::passive("levy"))
                    .on(LifecycleEvent::BeforeAttacked, [gain("army_strength", 1.0)]),
            )
            .unwrap();

        let mut ctx = fixture.context();
        resolve_attack(
            &mut ctx,
            PlayerId(1),
            PlayerId(2),
            &AttackParams::new(AttackTarget::resource("population")),
        )
        .unwrap();

        let army: Vec<f64> = ctx
            .log()
            .iter()
            .filter_map(|entry| match entry {
                EffectLog::ResourceChanged { player, update }
                    if *player == PlayerId(2) && update.resource.as_str() == "army_strength" =>
                {
                    Some(update.after)
                }
                _ => None,
            })
            .collect();
        assert_eq!(army, vec![1.0, 3.0]);
    }

    #[test]
    fn zero_fortification_is_not_written() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.set(PlayerId(2), "fortification", 0.0);
        let bulwark = RulesConfig {
            fortification_resource: ResourceId::new("bulwark"),
            ..RulesConfig::default()
        };

        for config in [RulesConfig::default(), bulwark] {
            let mut ctx = EngineContext::new(
                &mut fixture.state,
                crate::env::RulesEnv::new(&fixture.catalog, &config),
            );
            let outcome = resolve_attack(
                &mut ctx,
                PlayerId(1),
                PlayerId(2),
                &AttackParams::new(AttackTarget::resource("population")),
            )
            .unwrap();

            assert_eq!(outcome.log.fortification.damage, 0.0);
            assert!(!ctx.log().iter().any(|entry| matches!(
                entry,
                EffectLog::ResourceChanged { update, .. }
                    if update.resource == config.fortification_resource
            )));
        }

        let defender = fixture.state.player(PlayerId(2)).unwrap();
        assert!(defender.resources.entry("bulwark").is_none());
    }

    #[test]
    fn post_trigger_negative_fortification_is_floored() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.set(PlayerId(2), "fortification", 9.0);
        fixture.define_building(
            BuildingDefinition::new("tower")
                .on(LifecycleEvent::AttackResolved, [gain("fortification", -50.0)]),
        );
        fixture
            .state
            .player_mut(PlayerId(2))
            .unwrap()
            .add_building("tower".into());

        let outcome = attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );

        assert_eq!(outcome.log.fortification.after, 4.0);
        assert_eq!(fixture.value(PlayerId(2), "fortification"), 0.0);
    }

    #[test]
    fn failing_trigger_restores_actor() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.define_building(
            BuildingDefinition::new("tower")
                .on(LifecycleEvent::BeforeAttacked, [gain("mana", 1.0)]),
        );
        fixture
            .state
            .player_mut(PlayerId(2))
            .unwrap()
            .add_building("tower".into());

        let mut ctx = fixture.context();
        let result = resolve_attack(
            &mut ctx,
            PlayerId(1),
            PlayerId(2),
            &AttackParams::new(AttackTarget::resource("population")),
        );

        assert_eq!(
            result,
            Err(EngineError::UnknownResource(ResourceId::new("mana")))
        );
        assert_eq!(ctx.actor(), PlayerId(1));
        assert_eq!(ctx.current_frame(), None);
    }

    #[test]
    fn failing_resolved_trigger_restores_actor() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.define_building(
            BuildingDefinition::new("tower")
                .on(LifecycleEvent::AttackResolved, [gain("mana", 1.0)]),
        );
        fixture
            .state
            .player_mut(PlayerId(2))
            .unwrap()
            .add_building("tower".into());

        let mut ctx = fixture.context();
        let result = resolve_attack(
            &mut ctx,
            PlayerId(1),
            PlayerId(2),
            &AttackParams::new(AttackTarget::resource("population")),
        );

        assert_eq!(
            result,
            Err(EngineError::UnknownResource(ResourceId::new("mana")))
        );
        assert_eq!(ctx.actor(), PlayerId(1));
        assert_eq!(ctx.current_frame(), None);
        drop(ctx);

        // Damage landed before the failing hook and is not rolled back.
        assert_eq!(fixture.value(PlayerId(2), "population"), 17.0);
    }

    #[test]
    fn trigger_effects_target_the_defender() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        let defender = fixture.state.player_mut(PlayerId(2)).unwrap();
        defender
            .add_passive(
                Passive::new("watch", StatSource::passive("watch"))
                    .on(LifecycleEvent::AttackResolved, [gain("gold", 4.0)]),
            )
            .unwrap();

        attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );

        assert_eq!(fixture.value(PlayerId(2), "gold"), 4.0);
        assert_eq!(fixture.value(PlayerId(1), "gold"), 0.0);
        assert_eq!(fixture.state.active_player(), PlayerId(1));
    }

    #[test]
    fn target_damage_never_negative() {
        for (power, fortification) in [(0.0, 0.0), (1.0, 5.0), (3.0, 3.0), (10.0, 0.0)] {
            let mut fixture = Fixture::duel();
            fixture.set(PlayerId(1), "army_strength", power);
            fixture.set(PlayerId(2), "fortification", fortification);
            fixture.set(PlayerId(2), "morale", 2.0);

            let outcome = attack(&mut fixture, &AttackParams::new(AttackTarget::stat("morale")));
            assert!(outcome.damage_dealt >= 0.0);
            assert!(outcome.log.fortification.after >= 0.0);
            assert!(fixture.value(PlayerId(2), "morale") >= 0.0);
        }
    }

    #[test]
    fn target_kind_must_match_stat_flag() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.set(PlayerId(2), "morale", 5.0);

        let mut ctx = fixture.context();
        let error = resolve_attack(
            &mut ctx,
            PlayerId(1),
            PlayerId(2),
            &AttackParams::new(AttackTarget::stat("population")),
        )
        .unwrap_err();
        assert_eq!(
            error,
            EngineError::TargetKindMismatch {
                resource: ResourceId::new("population"),
                expected: "stat",
            }
        );

        let error = resolve_attack(
            &mut ctx,
            PlayerId(1),
            PlayerId(2),
            &AttackParams::new(AttackTarget::resource("morale")),
        )
        .unwrap_err();
        assert_eq!(
            error,
            EngineError::TargetKindMismatch {
                resource: ResourceId::new("morale"),
                expected: "resource",
            }
        );
        drop(ctx);

        assert_eq!(fixture.value(PlayerId(2), "population"), 20.0);
        assert_eq!(fixture.value(PlayerId(2), "morale"), 5.0);
    }

    #[test]
    fn nested_attack_in_trigger_resolves() {
        let mut fixture = Fixture::duel();
        siege(&mut fixture);
        fixture.set(PlayerId(2), "army_strength", 4.0);
        fixture.set(PlayerId(1), "population", 10.0);
        fixture.define_building(BuildingDefinition::new("barracks").on(
            LifecycleEvent::AttackResolved,
            [Effect::Attack(AttackParams::new(AttackTarget::resource(
                "population",
            )))],
        ));
        fixture
            .state
            .player_mut(PlayerId(2))
            .unwrap()
            .add_building("barracks".into());

        attack(
            &mut fixture,
            &AttackParams::new(AttackTarget::resource("population")),
        );

        assert_eq!(fixture.value(PlayerId(2), "population"), 17.0);
        assert_eq!(fixture.value(PlayerId(1), "population"), 6.0);
        assert_eq!(fixture.state.active_player(), PlayerId(1));
    }
}
