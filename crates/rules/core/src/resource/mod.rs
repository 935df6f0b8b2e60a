//! Resource catalog and per-player value store.
//!
//! Definitions are created once when content loads and never change:
//! - **Bounds**: optional integer floor and ceiling
//! - **Group**: optional membership with a display order
//! - **Tier track**: optional value ranges resolved after every mutation
//! - **Flags**: which bookkeeping the store performs for the resource
//!
//! Current values live in [`ResourceStore`], one per player.

mod store;
mod tier;

pub use store::{ResourceEntry, ResourceGain, ResourceStore, ResourceUpdate, TierTransition};
pub use tier::{Tier, TierTrack};

use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::ids::ResourceId;

/// Optional integer floor and ceiling of a resource.
///
/// Constructed through [`ResourceBounds::new`], which guarantees
/// `upper >= lower` when both are present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceBounds {
    lower: Option<i64>,
    upper: Option<i64>,
}

/// Rejected bounds pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("upper bound {upper} is below lower bound {lower}")]
pub struct InvalidBounds {
    pub lower: i64,
    pub upper: i64,
}

impl ResourceBounds {
    pub const UNBOUNDED: Self = Self {
        lower: None,
        upper: None,
    };

    pub fn new(lower: Option<i64>, upper: Option<i64>) -> Result<Self, InvalidBounds> {
        if let (Some(lower), Some(upper)) = (lower, upper)
            && upper < lower
        {
            return Err(InvalidBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Floor only.
    pub const fn at_least(lower: i64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    pub const fn lower(&self) -> Option<i64> {
        self.lower
    }

    pub const fn upper(&self) -> Option<i64> {
        self.upper
    }

    /// Pulls `value` into the bounds.
    pub fn constrain(&self, value: f64) -> f64 {
        let value = self.lower.map_or(value, |lower| value.max(lower as f64));
        self.upper.map_or(value, |upper| value.min(upper as f64))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceBounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            #[serde(default)]
            lower: Option<i64>,
            #[serde(default)]
            upper: Option<i64>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.lower, raw.upper).map_err(serde::de::Error::custom)
    }
}

/// Group membership of a resource, with its order inside the group.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceGroup {
    pub id: String,
    pub order: u32,
}

impl ResourceGroup {
    pub fn new(id: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
        }
    }
}

bitflags! {
    /// Bookkeeping the store performs for a resource.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ResourceFlags: u8 {
        /// Accumulate applied deltas per stat-source frame.
        const TRACK_BREAKDOWN   = 1 << 0;
        /// Record positive applied deltas as recent gains.
        const TRACK_RECENT_GAIN = 1 << 1;
        /// The resource is a stat (attack target kind `stat`).
        const STAT              = 1 << 2;
    }
}

/// Immutable description of one tracked quantity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceDefinition {
    pub id: ResourceId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bounds: Option<ResourceBounds>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub group: Option<ResourceGroup>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tier_track: Option<TierTrack>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: ResourceFlags,
}

impl ResourceDefinition {
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            bounds: None,
            group: None,
            tier_track: None,
            flags: ResourceFlags::empty(),
        }
    }

    pub fn with_bounds(mut self, bounds: ResourceBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn in_group(mut self, group: ResourceGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_tier_track(mut self, track: TierTrack) -> Self {
        self.tier_track = Some(track);
        self
    }

    pub fn with_flags(mut self, flags: ResourceFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn is_stat(&self) -> bool {
        self.flags.contains(ResourceFlags::STAT)
    }

    /// Value a fresh store starts from: zero pulled into the bounds.
    pub fn initial_value(&self) -> f64 {
        self.bounds.map_or(0.0, |bounds| bounds.constrain(0.0))
    }
}

/// All resource definitions known to a game, keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCatalog {
    definitions: BTreeMap<ResourceId, ResourceDefinition>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition, returning the one it replaced.
    pub fn insert(&mut self, definition: ResourceDefinition) -> Option<ResourceDefinition> {
        self.definitions.insert(definition.id.clone(), definition)
    }

    pub fn get(&self, id: &str) -> Option<&ResourceDefinition> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn bounds(&self, id: &str) -> Option<ResourceBounds> {
        self.get(id).and_then(|definition| definition.bounds)
    }

    /// Members of `group`, ordered by their group order then id.
    pub fn group_members(&self, group: &str) -> Vec<&ResourceDefinition> {
        let mut members: Vec<_> = self
            .definitions
            .values()
            .filter(|definition| {
                definition
                    .group
                    .as_ref()
                    .is_some_and(|membership| membership.id == group)
            })
            .collect();
        members.sort_by_key(|definition| {
            (
                definition.group.as_ref().map_or(0, |membership| membership.order),
                definition.id.clone(),
            )
        });
        members
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<ResourceDefinition> for ResourceCatalog {
    fn from_iter<I: IntoIterator<Item = ResourceDefinition>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for definition in iter {
            catalog.insert(definition);
        }
        catalog
    }
}
