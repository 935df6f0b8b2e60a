//! Shared fixtures for unit tests.

use crate::building::{BuildingCatalog, BuildingDefinition};
use crate::config::RulesConfig;
use crate::effect::{Effect, EngineContext};
use crate::env::{Catalog, RulesEnv};
use crate::ids::ResourceId;
use crate::reconcile::ChangeSpec;
use crate::resource::{
    ResourceBounds, ResourceCatalog, ResourceDefinition, ResourceFlags, Tier, TierTrack,
};
use crate::state::{GameState, PlayerId, PlayerState};

/// Routes engine logs to the test harness; filter with `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) struct Fixture {
    pub state: GameState,
    pub catalog: Catalog,
    pub config: RulesConfig,
}

impl Fixture {
    /// Two players seated 1 then 2, player 1 acting.
    pub fn duel() -> Self {
        init_tracing();
        let catalog = Catalog::new(resources(), buildings());
        let state = GameState::new(vec![
            PlayerState::from_catalog(PlayerId(1), &catalog.resources),
            PlayerState::from_catalog(PlayerId(2), &catalog.resources),
        ]);
        Self {
            state,
            catalog,
            config: RulesConfig::default(),
        }
    }

    pub fn context(&mut self) -> EngineContext<'_> {
        EngineContext::new(
            &mut self.state,
            RulesEnv::new(&self.catalog, &self.config),
        )
    }

    pub fn set(&mut self, player: PlayerId, resource: &str, value: f64) {
        self.state
            .player_mut(player)
            .unwrap()
            .resources
            .set_value(&self.catalog.resources, &ResourceId::new(resource), value, None);
    }

    pub fn value(&self, player: PlayerId, resource: &str) -> f64 {
        self.state.player(player).unwrap().resources.value(resource)
    }

    pub fn define_building(&mut self, definition: BuildingDefinition) {
        self.catalog.buildings.insert(definition);
    }
}

pub(crate) fn gain(resource: &str, amount: f64) -> Effect {
    Effect::resource(resource, ChangeSpec::amount(amount))
}

fn resources() -> ResourceCatalog {
    let non_negative = ResourceBounds::at_least(0);
    [
        ResourceDefinition::new("gold")
            .with_bounds(ResourceBounds::new(Some(0), Some(100)).unwrap())
            .with_flags(ResourceFlags::TRACK_RECENT_GAIN | ResourceFlags::TRACK_BREAKDOWN),
        ResourceDefinition::new("interest"),
        ResourceDefinition::new("happiness").with_tier_track(TierTrack::new(
            "mood",
            vec![
                Tier::new("unrest", i64::MIN, Some(0)),
                Tier::new("content", 0, Some(5)),
                Tier::new("joyful", 5, None),
            ],
        )),
        ResourceDefinition::new("army_strength").with_bounds(non_negative),
        ResourceDefinition::new("absorption"),
        ResourceDefinition::new("shield_wall"),
        ResourceDefinition::new("fortification").with_flags(ResourceFlags::TRACK_BREAKDOWN),
        ResourceDefinition::new("population").with_bounds(non_negative),
        ResourceDefinition::new("morale").with_flags(ResourceFlags::STAT),
    ]
    .into_iter()
    .collect()
}

fn buildings() -> BuildingCatalog {
    ["tower", "mint", "barracks"]
        .into_iter()
        .map(BuildingDefinition::new)
        .collect()
}
