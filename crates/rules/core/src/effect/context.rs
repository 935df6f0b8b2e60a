//! Execution context and its scoped guards.
//!
//! The acting player and the stat-source frame stack are the only ambient
//! state effect execution reads. Both are swapped exclusively through RAII
//! guards so an early return, a `?` or a panic unwinding through a trigger
//! can never leave them pointing at the wrong player or frame.

use core::ops::{Deref, DerefMut};

use tracing::trace;

use crate::env::RulesEnv;
use crate::error::EngineError;
use crate::ids::ResourceId;
use crate::reconcile::{ChangeSpec, ReconciliationMode};
use crate::resource::ResourceUpdate;
use crate::source::StatSource;
use crate::state::{GameState, PlayerId};

use super::EffectLog;

/// Mutable state plus read-only environment for one resolution call.
pub struct EngineContext<'a> {
    pub state: &'a mut GameState,
    pub env: RulesEnv<'a>,
    frames: Vec<StatSource>,
    log: Vec<EffectLog>,
}

impl<'a> EngineContext<'a> {
    pub fn new(state: &'a mut GameState, env: RulesEnv<'a>) -> Self {
        Self {
            state,
            env,
            frames: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Player effects currently target.
    pub fn actor(&self) -> PlayerId {
        self.state.active_player()
    }

    /// Makes `player` the acting player until the guard drops.
    pub fn acting_as(&mut self, player: PlayerId) -> Result<ActorScope<'_, 'a>, EngineError> {
        self.state.player(player)?;
        let previous = self.state.active_player();
        self.state.set_active(player);
        trace!(target: "rules::effect", from = %previous, to = %player, "actor scope entered");
        Ok(ActorScope {
            ctx: self,
            previous,
        })
    }

    /// Attributes mutations to `source` until the guard drops.
    pub fn within_frame(&mut self, source: StatSource) -> FrameScope<'_, 'a> {
        self.frames.push(source);
        FrameScope { ctx: self }
    }

    /// Innermost attribution frame, if any.
    pub fn current_frame(&self) -> Option<&StatSource> {
        self.frames.last()
    }

    pub fn record(&mut self, entry: EffectLog) {
        self.log.push(entry);
    }

    pub fn log(&self) -> &[EffectLog] {
        &self.log
    }

    pub fn into_log(self) -> Vec<EffectLog> {
        self.log
    }

    /// Applies a bounded change to `player`'s resource under the current frame.
    pub fn apply_change(
        &mut self,
        player: PlayerId,
        resource: &ResourceId,
        change: &ChangeSpec,
        mode: ReconciliationMode,
    ) -> Result<ResourceUpdate, EngineError> {
        let catalog = self.env.resources();
        let source = self.frames.last();
        let update = self.state.player_mut(player)?.resources.apply_change(
            catalog, resource, change, mode, source,
        )?;
        self.record_update(player, &update);
        Ok(update)
    }

    /// Writes `value` to `player`'s resource through the ordinary set path.
    pub fn set_resource(
        &mut self,
        player: PlayerId,
        resource: &ResourceId,
        value: f64,
    ) -> Result<ResourceUpdate, EngineError> {
        let catalog = self.env.resources();
        let source = self.frames.last();
        let update = self
            .state
            .player_mut(player)?
            .resources
            .set_value(catalog, resource, value, source);
        self.record_update(player, &update);
        Ok(update)
    }

    /// Fails unless the catalog defines `resource`.
    pub fn ensure_resource(&self, resource: &ResourceId) -> Result<(), EngineError> {
        if self.env.resources().contains(resource) {
            Ok(())
        } else {
            Err(EngineError::UnknownResource(resource.clone()))
        }
    }

    fn record_update(&mut self, player: PlayerId, update: &ResourceUpdate) {
        if let Some(transition) = &update.tier_transition {
            self.log.push(EffectLog::TierChanged {
                player,
                transition: transition.clone(),
            });
        }
        self.log.push(EffectLog::ResourceChanged {
            player,
            update: update.clone(),
        });
    }
}

/// Restores the previous acting player on drop.
pub struct ActorScope<'s, 'a> {
    ctx: &'s mut EngineContext<'a>,
    previous: PlayerId,
}

impl<'a> Deref for ActorScope<'_, 'a> {
    type Target = EngineContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for ActorScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for ActorScope<'_, '_> {
    fn drop(&mut self) {
        self.ctx.state.set_active(self.previous);
        trace!(target: "rules::effect", restored = %self.previous, "actor scope left");
    }
}

/// Pops its stat-source frame on drop.
pub struct FrameScope<'s, 'a> {
    ctx: &'s mut EngineContext<'a>,
}

impl<'a> Deref for FrameScope<'_, 'a> {
    type Target = EngineContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for FrameScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for FrameScope<'_, '_> {
    fn drop(&mut self) {
        self.ctx.frames.pop();
    }
}
