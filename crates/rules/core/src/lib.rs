//! Deterministic rule resolution shared by every game surface.
//!
//! `rules-core` owns the numeric semantics of the game: how a requested change
//! to a bounded resource is reconciled (clamp, pass, reject), and how an attack
//! is resolved through absorption, fortification, triggered hooks and target
//! mutation. Transport, UI and content authoring consume the types re-exported
//! here; all state mutation flows through [`engine::RulesEngine`] or the
//! effect executor it wraps.
pub mod building;
pub mod combat;
pub mod config;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod ids;
pub mod reconcile;
pub mod resource;
pub mod source;
pub mod state;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use building::{BuildingCatalog, BuildingDefinition};
pub use combat::{
    AbsorptionLog, AttackEvaluationLog, AttackMeta, AttackOutcome, AttackParams, AttackTarget,
    BUILDING_MODIFIER_KEY, BuildingTarget, BuildingTargetLog, FortificationLog, MODIFIER_KEYS,
    OnDamage, PowerAdjustment, PowerLog, PowerModifier, RESOURCE_MODIFIER_KEY, STAT_MODIFIER_KEY,
    TargetHandler, TargetLog, ValueTarget, ValueTargetLog, resolve_attack,
};
pub use config::RulesConfig;
pub use effect::{
    ActorScope, Effect, EffectLog, EngineContext, FrameScope, ResourceEffect, execute_effect,
    execute_effects,
};
pub use engine::RulesEngine;
pub use env::{Catalog, RulesEnv};
pub use error::{EngineError, ErrorSeverity, GameError};
pub use ids::{BuildingId, PassiveId, ResourceId, TierId};
pub use reconcile::{
    BoundKind, ChangeSpec, ReconcileError, ReconciliationInput, ReconciliationMode,
    ReconciliationResult, ResourceBoundExceeded, RoundingMode, compute_delta, reconcile,
};
pub use resource::{
    ResourceBounds, ResourceCatalog, ResourceDefinition, ResourceEntry, ResourceFlags,
    ResourceGain, ResourceGroup, ResourceStore, ResourceUpdate, Tier, TierTrack, TierTransition,
};
pub use source::{SourceKind, StatSource};
pub use state::{GameState, PlayerId, PlayerState};
pub use trigger::{LifecycleEvent, Passive, TriggerBundle, collect_triggers};
