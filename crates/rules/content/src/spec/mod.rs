//! Authored content formats and their validation into `rules-core` types.
//!
//! Authored structs are plain serde types: a repeated field is a
//! deserialization error, so no builder-style bookkeeping is needed. The
//! `TryFrom` conversions enforce what serde cannot:
//!
//! - Bounds are ordered, numbers are finite, percent lists are non-empty
//! - Resource and building ids are unique
//! - Tier tracks are well-formed
//! - Every effect references resources and buildings the catalog defines

mod effect;
mod error;
mod resource;

pub use effect::{
    AttackDef, ChangeDef, EffectDef, OnDamageDef, PassiveDef, PowerAdjustmentDef, TargetDef,
    TriggersDef,
};
pub use error::ContentError;
pub use resource::{FlagSpec, GroupSpec, ResourceSpec, TierSpec, TierTrackSpec};

use std::collections::BTreeSet;

use serde::Deserialize;

use rules_core::{
    BuildingCatalog, BuildingDefinition, Catalog, EngineError, GameState, Passive, PlayerId,
    PlayerState, ResourceCatalog, ResourceDefinition, RulesConfig,
};

/// One building as written in `catalog.ron`.
///
/// ```ron
/// (
///     id: "watchtower",
///     triggers: (
///         before_attacked: [
///             Resource(resource: "fortification", change: Amount(amount: 3.0)),
///         ],
///     ),
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingSpec {
    pub id: String,
    #[serde(default)]
    pub triggers: TriggersDef,
}

/// Root of `catalog.ron`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSpec {
    pub resources: Vec<ResourceSpec>,
    pub buildings: Vec<BuildingSpec>,
    /// Passives every player starts with.
    pub passives: Vec<PassiveDef>,
}

/// Ids an effect may reference.
#[derive(Debug, Default)]
pub(crate) struct References {
    resources: BTreeSet<String>,
    stats: BTreeSet<String>,
    buildings: BTreeSet<String>,
}

impl References {
    /// Registers a resource id; false if it was already known.
    fn add_resource(&mut self, id: &str, stat: bool) -> bool {
        if stat {
            self.stats.insert(id.to_owned());
        }
        self.resources.insert(id.to_owned())
    }

    /// Like [`Self::resource`], and the resource must be a stat exactly when
    /// `stat` is set.
    fn value_target(&self, context: &str, id: &str, stat: bool) -> Result<(), ContentError> {
        self.resource(context, id)?;
        if self.stats.contains(id) == stat {
            Ok(())
        } else {
            Err(ContentError::TargetKindMismatch {
                context: context.to_owned(),
                resource: id.to_owned(),
                expected: if stat { "stat" } else { "resource" },
            })
        }
    }

    fn resource(&self, context: &str, id: &str) -> Result<(), ContentError> {
        if self.resources.contains(id) {
            Ok(())
        } else {
            Err(ContentError::UnknownResource {
                context: context.to_owned(),
                resource: id.to_owned(),
            })
        }
    }

    fn building(&self, context: &str, id: &str) -> Result<(), ContentError> {
        if self.buildings.contains(id) {
            Ok(())
        } else {
            Err(ContentError::UnknownBuilding {
                context: context.to_owned(),
                building: id.to_owned(),
            })
        }
    }
}

/// Validated catalog plus the passives content declares up front.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub passives: Vec<Passive>,
}

impl LoadedCatalog {
    /// Fresh player at catalog initial values holding the starting passives.
    pub fn new_player(&self, id: PlayerId) -> Result<PlayerState, EngineError> {
        let mut player = PlayerState::from_catalog(id, &self.catalog.resources);
        for passive in &self.passives {
            player.add_passive(passive.clone())?;
        }
        Ok(player)
    }

    /// Game with one fresh player per seat; the first seat acts.
    pub fn new_game(
        &self,
        seats: impl IntoIterator<Item = PlayerId>,
    ) -> Result<GameState, EngineError> {
        let players = seats
            .into_iter()
            .map(|id| self.new_player(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GameState::new(players))
    }
}

impl TryFrom<CatalogSpec> for LoadedCatalog {
    type Error = ContentError;

    fn try_from(spec: CatalogSpec) -> Result<Self, Self::Error> {
        let mut refs = References::default();

        let mut resources = ResourceCatalog::new();
        for resource in spec.resources {
            let stat = resource.flags.contains(&FlagSpec::Stat);
            if !refs.add_resource(&resource.id, stat) {
                return Err(ContentError::DuplicateResource(resource.id));
            }
            resources.insert(ResourceDefinition::try_from(resource)?);
        }

        // Buildings may reference each other, so collect ids before converting.
        for building in &spec.buildings {
            if !refs.buildings.insert(building.id.clone()) {
                return Err(ContentError::DuplicateBuilding(building.id.clone()));
            }
        }

        let mut buildings = BuildingCatalog::new();
        for building in spec.buildings {
            let context = format!("building `{}`", building.id);
            let mut definition = BuildingDefinition::new(building.id);
            for (event, effects) in building.triggers.resolve(&context, &refs)? {
                if !effects.is_empty() {
                    definition = definition.on(event, effects);
                }
            }
            buildings.insert(definition);
        }

        let mut passive_ids = BTreeSet::new();
        let mut passives = Vec::with_capacity(spec.passives.len());
        for passive in spec.passives {
            if !passive_ids.insert(passive.id.clone()) {
                return Err(ContentError::DuplicatePassive(passive.id));
            }
            passives.push(passive.resolve(&refs)?);
        }

        Ok(Self {
            catalog: Catalog::new(resources, buildings),
            passives,
        })
    }
}

/// Rejects configuration the pipeline cannot use.
pub fn validate_config(config: &RulesConfig) -> Result<(), ContentError> {
    if !config.absorption_cap.is_finite() {
        return Err(ContentError::InvalidConfig("absorption_cap must be finite"));
    }
    if !(0.0..=1.0).contains(&config.absorption_cap) {
        return Err(ContentError::InvalidConfig(
            "absorption_cap must be between 0 and 1",
        ));
    }
    Ok(())
}
