//! Building definitions.
//!
//! A building owned by a player contributes the trigger bundles its
//! definition registers. Ownership itself lives in [`crate::PlayerState`].

use std::collections::BTreeMap;

use crate::effect::Effect;
use crate::ids::BuildingId;
use crate::trigger::LifecycleEvent;

/// Immutable description of one building.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingDefinition {
    pub id: BuildingId,
    /// Effects fired at lifecycle events while the building stands.
    #[cfg_attr(feature = "serde", serde(default))]
    pub triggers: BTreeMap<LifecycleEvent, Vec<Effect>>,
}

impl BuildingDefinition {
    pub fn new(id: impl Into<BuildingId>) -> Self {
        Self {
            id: id.into(),
            triggers: BTreeMap::new(),
        }
    }

    /// Builder: append effects for `event`.
    pub fn on(mut self, event: LifecycleEvent, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.triggers.entry(event).or_default().extend(effects);
        self
    }

    pub fn effects_for(&self, event: LifecycleEvent) -> &[Effect] {
        self.triggers.get(&event).map(Vec::as_slice).unwrap_or_default()
    }
}

/// All building definitions known to a game, keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingCatalog {
    definitions: BTreeMap<BuildingId, BuildingDefinition>,
}

impl BuildingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition, returning the one it replaced.
    pub fn insert(&mut self, definition: BuildingDefinition) -> Option<BuildingDefinition> {
        self.definitions.insert(definition.id.clone(), definition)
    }

    pub fn get(&self, id: &str) -> Option<&BuildingDefinition> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<BuildingDefinition> for BuildingCatalog {
    fn from_iter<I: IntoIterator<Item = BuildingDefinition>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for definition in iter {
            catalog.insert(definition);
        }
        catalog
    }
}
