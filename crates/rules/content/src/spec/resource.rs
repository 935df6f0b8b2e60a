//! Authored resource definitions.

use serde::Deserialize;

use rules_core::{
    ResourceBounds, ResourceDefinition, ResourceFlags, ResourceGroup, Tier, TierTrack,
};

use super::ContentError;

/// Bookkeeping switches a resource opts into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSpec {
    TrackBreakdown,
    TrackRecentGain,
    Stat,
}

impl From<FlagSpec> for ResourceFlags {
    fn from(flag: FlagSpec) -> Self {
        match flag {
            FlagSpec::TrackBreakdown => Self::TRACK_BREAKDOWN,
            FlagSpec::TrackRecentGain => Self::TRACK_RECENT_GAIN,
            FlagSpec::Stat => Self::STAT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub id: String,
    #[serde(default)]
    pub order: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierSpec {
    pub id: String,
    pub min: i64,
    #[serde(default)]
    pub max: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierTrackSpec {
    pub id: String,
    pub tiers: Vec<TierSpec>,
}

/// One resource as written in `catalog.ron`.
///
/// ```ron
/// (
///     id: "gold",
///     lower: Some(0),
///     upper: Some(500),
///     group: Some((id: "economy", order: 1)),
///     flags: [track_recent_gain],
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    pub id: String,
    #[serde(default)]
    pub lower: Option<i64>,
    #[serde(default)]
    pub upper: Option<i64>,
    #[serde(default)]
    pub group: Option<GroupSpec>,
    #[serde(default)]
    pub tier_track: Option<TierTrackSpec>,
    #[serde(default)]
    pub flags: Vec<FlagSpec>,
}

impl TryFrom<ResourceSpec> for ResourceDefinition {
    type Error = ContentError;

    fn try_from(spec: ResourceSpec) -> Result<Self, Self::Error> {
        let mut definition = ResourceDefinition::new(spec.id.as_str());

        if spec.lower.is_some() || spec.upper.is_some() {
            let bounds = ResourceBounds::new(spec.lower, spec.upper).map_err(|source| {
                ContentError::InvalidBounds {
                    resource: spec.id.clone(),
                    source,
                }
            })?;
            definition = definition.with_bounds(bounds);
        }

        if let Some(group) = spec.group {
            definition = definition.in_group(ResourceGroup::new(group.id, group.order));
        }

        if let Some(track) = spec.tier_track {
            definition = definition.with_tier_track(tier_track(&spec.id, track)?);
        }

        let flags = spec
            .flags
            .into_iter()
            .fold(ResourceFlags::empty(), |flags, flag| flags | flag.into());
        Ok(definition.with_flags(flags))
    }
}

/// Tiers must be non-empty, each range non-empty, and listed in ascending,
/// non-overlapping order.
fn tier_track(resource: &str, spec: TierTrackSpec) -> Result<TierTrack, ContentError> {
    let invalid = |reason| ContentError::InvalidTierTrack {
        resource: resource.to_owned(),
        track: spec.id.clone(),
        reason,
    };

    if spec.tiers.is_empty() {
        return Err(invalid("track has no tiers"));
    }

    let mut previous_max: Option<Option<i64>> = None;
    for tier in &spec.tiers {
        if tier.max.is_some_and(|max| max <= tier.min) {
            return Err(invalid("tier max must exceed min"));
        }
        match previous_max {
            Some(None) => return Err(invalid("unbounded tier must be last")),
            Some(Some(max)) if tier.min < max => return Err(invalid("tiers overlap")),
            _ => {}
        }
        previous_max = Some(tier.max);
    }

    let tiers = spec
        .tiers
        .iter()
        .map(|tier| Tier::new(tier.id.as_str(), tier.min, tier.max))
        .collect();
    Ok(TierTrack::new(spec.id.clone(), tiers))
}
