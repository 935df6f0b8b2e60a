//! Entry point for rule resolution.
//!
//! [`RulesEngine`] is the authoritative reducer for [`GameState`]. Every
//! mutation a session applies flows through it: effect lists, standalone
//! attacks, and single resource changes all build an [`EngineContext`] and
//! go through the same executor.

use tracing::debug;

use crate::combat::{self, AttackOutcome, AttackParams};
use crate::effect::{Effect, EffectLog, EngineContext, execute_effects};
use crate::env::RulesEnv;
use crate::error::EngineError;
use crate::ids::ResourceId;
use crate::reconcile::{ChangeSpec, ReconciliationMode};
use crate::resource::ResourceUpdate;
use crate::state::{GameState, PlayerId};

/// Applies effects and attacks to a borrowed [`GameState`].
pub struct RulesEngine<'a> {
    state: &'a mut GameState,
}

impl<'a> RulesEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    /// Runs `effects` as the active player and returns what they did.
    ///
    /// On error, effects already applied stay applied.
    pub fn execute(
        &mut self,
        env: RulesEnv<'_>,
        effects: &[Effect],
    ) -> Result<Vec<EffectLog>, EngineError> {
        let actor = self.state.active_player();
        debug!(
            target: "rules::effect",
            %actor,
            effects = effects.len(),
            "executing effects"
        );

        let mut ctx = EngineContext::new(self.state, env);
        execute_effects(&mut ctx, effects)?;
        Ok(ctx.into_log())
    }

    /// Resolves an attack without running its `on_damage` effects.
    pub fn resolve_attack(
        &mut self,
        env: RulesEnv<'_>,
        attacker: PlayerId,
        defender: PlayerId,
        params: &AttackParams,
    ) -> Result<AttackOutcome, EngineError> {
        let mut ctx = EngineContext::new(self.state, env);
        combat::resolve_attack(&mut ctx, attacker, defender, params)
    }

    /// Applies one bounded change to `player`'s resource.
    pub fn apply_resource_change(
        &mut self,
        env: RulesEnv<'_>,
        player: PlayerId,
        resource: &ResourceId,
        change: &ChangeSpec,
        mode: ReconciliationMode,
    ) -> Result<ResourceUpdate, EngineError> {
        let mut ctx = EngineContext::new(self.state, env);
        ctx.ensure_resource(resource)?;
        ctx.apply_change(player, resource, change, mode)
    }
}
