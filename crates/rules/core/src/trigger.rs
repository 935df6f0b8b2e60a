//! Trigger collection for attack lifecycle events.
//!
//! Hooks are declarative: a passive or a building registers effect lists
//! against a [`LifecycleEvent`]. When the event fires for a player, the
//! collector gathers one [`TriggerBundle`] per registration, each carrying
//! the stat-source frame its effects replay under.
//!
//! # Ordering
//!
//! - Passives first, in registration order
//! - Then owned buildings, in id order

use std::collections::BTreeMap;

use tracing::trace;

use crate::effect::Effect;
use crate::env::Catalog;
use crate::error::EngineError;
use crate::ids::PassiveId;
use crate::source::StatSource;
use crate::state::{GameState, PlayerId};

/// Named points in attack resolution where hooks fire.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LifecycleEvent {
    /// The owner is about to be attacked.
    BeforeAttacked,
    /// An attack against the owner has been resolved.
    AttackResolved,
}

/// Hook registrations a player carries independently of buildings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passive {
    pub id: PassiveId,
    pub source: StatSource,
    #[cfg_attr(feature = "serde", serde(default))]
    pub triggers: BTreeMap<LifecycleEvent, Vec<Effect>>,
}

impl Passive {
    pub fn new(id: impl Into<PassiveId>, source: StatSource) -> Self {
        Self {
            id: id.into(),
            source,
            triggers: BTreeMap::new(),
        }
    }

    /// Builder: append effects for `event`.
    pub fn on(mut self, event: LifecycleEvent, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.triggers.entry(event).or_default().extend(effects);
        self
    }
}

/// Effects to run for one registration, with their attribution frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerBundle {
    pub event: LifecycleEvent,
    pub owner: PlayerId,
    pub frame: StatSource,
    pub effects: Vec<Effect>,
}

/// Gathers every bundle `owner` registered for `event`.
///
/// Owned buildings missing from the catalog are a content defect and fail
/// with [`EngineError::UnknownBuilding`].
pub fn collect_triggers(
    state: &GameState,
    catalog: &Catalog,
    owner: PlayerId,
    event: LifecycleEvent,
) -> Result<Vec<TriggerBundle>, EngineError> {
    let player = state.player(owner)?;
    let mut bundles = Vec::new();

    for passive in player.passives() {
        if let Some(effects) = passive.triggers.get(&event)
            && !effects.is_empty()
        {
            bundles.push(TriggerBundle {
                event,
                owner,
                frame: passive.source.clone(),
                effects: effects.clone(),
            });
        }
    }

    for building in player.buildings() {
        let definition = catalog
            .buildings
            .get(building)
            .ok_or_else(|| EngineError::UnknownBuilding(building.clone()))?;
        let effects = definition.effects_for(event);
        if !effects.is_empty() {
            bundles.push(TriggerBundle {
                event,
                owner,
                frame: StatSource::building(building.as_str()),
                effects: effects.to_vec(),
            });
        }
    }

    trace!(
        target: "rules::trigger",
        %owner,
        %event,
        bundles = bundles.len(),
        "collected triggers"
    );

    Ok(bundles)
}
