use crate::ids::ResourceId;
use crate::reconcile::RoundingMode;

/// Tunable parameters of attack resolution.
///
/// Missing keys in authored configuration fall back to the defaults below.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Attacker resource read as base attack power (army strength).
    pub power_resource: ResourceId,
    /// Defender resource read as the absorption fraction unless an attack
    /// names its own.
    pub absorption_resource: ResourceId,
    /// Defender resource that soaks damage before the target.
    pub fortification_resource: ResourceId,
    /// Upper limit on the absorption fraction.
    pub absorption_cap: f64,
    /// Rounding of damage after absorption. Independent of change-spec rounding.
    pub absorption_rounding: RoundingMode,
}

impl RulesConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_POWER_RESOURCE: &'static str = "army_strength";
    pub const DEFAULT_ABSORPTION_RESOURCE: &'static str = "absorption";
    pub const DEFAULT_FORTIFICATION_RESOURCE: &'static str = "fortification";
    pub const DEFAULT_ABSORPTION_CAP: f64 = 1.0;
    pub const DEFAULT_ABSORPTION_ROUNDING: RoundingMode = RoundingMode::Down;

    pub fn new() -> Self {
        Self {
            power_resource: ResourceId::new(Self::DEFAULT_POWER_RESOURCE),
            absorption_resource: ResourceId::new(Self::DEFAULT_ABSORPTION_RESOURCE),
            fortification_resource: ResourceId::new(Self::DEFAULT_FORTIFICATION_RESOURCE),
            absorption_cap: Self::DEFAULT_ABSORPTION_CAP,
            absorption_rounding: Self::DEFAULT_ABSORPTION_ROUNDING,
        }
    }

    pub fn with_absorption_cap(mut self, cap: f64) -> Self {
        self.absorption_cap = cap;
        self
    }

    pub fn with_absorption_rounding(mut self, rounding: RoundingMode) -> Self {
        self.absorption_rounding = rounding;
        self
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}
