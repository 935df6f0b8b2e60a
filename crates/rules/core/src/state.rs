//! Authoritative game state.
//!
//! Players own their resource store, buildings, passives and power
//! modifiers. [`GameState`] additionally tracks which player is acting; that
//! index is the one piece of ambient mutable state the engine has, and only
//! the scoped guard in [`crate::effect::ActorScope`] swaps it.

use std::collections::{BTreeMap, BTreeSet};

use crate::combat::PowerModifier;
use crate::error::EngineError;
use crate::ids::{BuildingId, PassiveId};
use crate::resource::{ResourceCatalog, ResourceStore};
use crate::trigger::Passive;

/// Seat identifier of a player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlayerId(pub u32);

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the engine tracks for one player.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub id: PlayerId,
    pub resources: ResourceStore,
    buildings: BTreeSet<BuildingId>,
    passives: Vec<Passive>,
    power_modifiers: BTreeMap<String, Vec<PowerModifier>>,
}

impl PlayerState {
    /// Creates a player with an empty store.
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            resources: ResourceStore::new(),
            buildings: BTreeSet::new(),
            passives: Vec::new(),
            power_modifiers: BTreeMap::new(),
        }
    }

    /// Creates a player with every catalog resource at its initial value.
    pub fn from_catalog(id: PlayerId, catalog: &ResourceCatalog) -> Self {
        Self {
            resources: ResourceStore::from_catalog(catalog),
            ..Self::new(id)
        }
    }

    pub fn owns_building(&self, id: &str) -> bool {
        self.buildings.contains(id)
    }

    /// Owned buildings in id order.
    pub fn buildings(&self) -> impl Iterator<Item = &BuildingId> {
        self.buildings.iter()
    }

    /// Returns false if the building was already owned.
    pub fn add_building(&mut self, id: BuildingId) -> bool {
        self.buildings.insert(id)
    }

    /// Returns false if the building was not owned.
    pub fn remove_building(&mut self, id: &str) -> bool {
        self.buildings.remove(id)
    }

    /// Passives in registration order.
    pub fn passives(&self) -> &[Passive] {
        &self.passives
    }

    pub fn passive(&self, id: &str) -> Option<&Passive> {
        self.passives.iter().find(|passive| passive.id.as_str() == id)
    }

    pub fn add_passive(&mut self, passive: Passive) -> Result<(), EngineError> {
        if self.passive(&passive.id).is_some() {
            return Err(EngineError::DuplicatePassive {
                player: self.id,
                passive: passive.id,
            });
        }
        self.passives.push(passive);
        Ok(())
    }

    pub fn remove_passive(&mut self, id: &PassiveId) -> Result<Passive, EngineError> {
        let index = self
            .passives
            .iter()
            .position(|passive| &passive.id == id)
            .ok_or_else(|| EngineError::PassiveNotFound {
                player: self.id,
                passive: id.clone(),
            })?;
        Ok(self.passives.remove(index))
    }

    /// Power-evaluation modifiers registered under `key`.
    pub fn power_modifiers(&self, key: &str) -> &[PowerModifier] {
        self.power_modifiers
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn add_power_modifier(&mut self, key: impl Into<String>, modifier: PowerModifier) {
        self.power_modifiers
            .entry(key.into())
            .or_default()
            .push(modifier);
    }
}

/// Canonical snapshot of one game session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    players: Vec<PlayerState>,
    active: PlayerId,
}

impl GameState {
    /// Creates a state from players in seat order. The first player acts.
    pub fn new(players: Vec<PlayerState>) -> Self {
        let active = players.first().map_or(PlayerId::default(), |player| player.id);
        Self { players, active }
    }

    /// Player currently acting.
    pub fn active_player(&self) -> PlayerId {
        self.active
    }

    /// Hands the turn to `player`.
    ///
    /// Meant for the session layer between actions; inside resolution the
    /// acting player only changes through a scoped guard.
    pub fn begin_turn(&mut self, player: PlayerId) -> Result<(), EngineError> {
        self.player(player)?;
        self.active = player;
        Ok(())
    }

    pub(crate) fn set_active(&mut self, player: PlayerId) {
        self.active = player;
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Result<&PlayerState, EngineError> {
        self.players
            .iter()
            .find(|player| player.id == id)
            .ok_or(EngineError::PlayerNotFound(id))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut PlayerState, EngineError> {
        self.players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(EngineError::PlayerNotFound(id))
    }

    /// Next player in seat order, wrapping around.
    pub fn opponent_of(&self, id: PlayerId) -> Result<PlayerId, EngineError> {
        let seat = self
            .players
            .iter()
            .position(|player| player.id == id)
            .ok_or(EngineError::PlayerNotFound(id))?;
        if self.players.len() < 2 {
            return Err(EngineError::NoOpponent { player: id });
        }
        Ok(self.players[(seat + 1) % self.players.len()].id)
    }
}
