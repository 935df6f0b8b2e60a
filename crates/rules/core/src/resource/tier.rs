//! Tier tracks: value ranges a resource resolves into.

use crate::ids::TierId;

/// One half-open range `[min, max)` of a tier track.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tier {
    pub id: TierId,
    pub min: i64,
    /// Exclusive upper edge; `None` means unbounded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max: Option<i64>,
}

impl Tier {
    pub fn new(id: impl Into<TierId>, min: i64, max: Option<i64>) -> Self {
        Self {
            id: id.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min as f64 && self.max.is_none_or(|max| value < max as f64)
    }
}

/// Ordered set of tiers attached to a resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierTrack {
    pub id: String,
    pub tiers: Vec<Tier>,
}

impl TierTrack {
    pub fn new(id: impl Into<String>, tiers: Vec<Tier>) -> Self {
        Self {
            id: id.into(),
            tiers,
        }
    }

    /// First tier containing `value`, if any.
    pub fn resolve(&self, value: f64) -> Option<&TierId> {
        self.tiers
            .iter()
            .find(|tier| tier.contains(value))
            .map(|tier| &tier.id)
    }
}
