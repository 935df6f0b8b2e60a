//! Stat-source attribution frames.
//!
//! Effects that fire from a passive or a building run under a frame naming
//! that origin. Resources flagged for breakdown tracking accumulate their
//! applied deltas per frame, which is what the UI shows as "where did this
//! come from".

/// Category of an attribution frame.
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
pub enum SourceKind {
    Passive,
    Building,
    Action,
}

/// Origin that modifiers and effects are attributed to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatSource {
    pub kind: SourceKind,
    pub id: String,
}

impl StatSource {
    pub fn new(kind: SourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn passive(id: impl Into<String>) -> Self {
        Self::new(SourceKind::Passive, id)
    }

    pub fn building(id: impl Into<String>) -> Self {
        Self::new(SourceKind::Building, id)
    }

    pub fn action(id: impl Into<String>) -> Self {
        Self::new(SourceKind::Action, id)
    }
}

impl core::fmt::Display for StatSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
