//! Read-only inputs of rule resolution.
//!
//! The [`Catalog`] is produced by content loading; [`RulesEnv`] bundles it
//! with the configuration so the executor can reach everything it needs
//! without owning any of it.

use crate::building::BuildingCatalog;
use crate::config::RulesConfig;
use crate::resource::ResourceCatalog;

/// Static content consumed by the engine.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    #[cfg_attr(feature = "serde", serde(default))]
    pub resources: ResourceCatalog,
    #[cfg_attr(feature = "serde", serde(default))]
    pub buildings: BuildingCatalog,
}

impl Catalog {
    pub fn new(resources: ResourceCatalog, buildings: BuildingCatalog) -> Self {
        Self {
            resources,
            buildings,
        }
    }
}

/// Borrowed view of catalog and configuration.
#[derive(Clone, Copy, Debug)]
pub struct RulesEnv<'a> {
    pub catalog: &'a Catalog,
    pub config: &'a RulesConfig,
}

impl<'a> RulesEnv<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a RulesConfig) -> Self {
        Self { catalog, config }
    }

    pub fn resources(&self) -> &'a ResourceCatalog {
        &self.catalog.resources
    }

    pub fn buildings(&self) -> &'a BuildingCatalog {
        &self.catalog.buildings
    }
}
