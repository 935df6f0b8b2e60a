use rules_core::reconcile::ChangeSpecError;
use rules_core::resource::InvalidBounds;

/// Authored content that cannot become engine data.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ContentError {
    #[error("duplicate resource id `{0}`")]
    DuplicateResource(String),

    #[error("duplicate building id `{0}`")]
    DuplicateBuilding(String),

    #[error("duplicate passive id `{0}`")]
    DuplicatePassive(String),

    #[error("resource `{resource}`: {source}")]
    InvalidBounds {
        resource: String,
        source: InvalidBounds,
    },

    #[error("resource `{resource}` tier track `{track}`: {reason}")]
    InvalidTierTrack {
        resource: String,
        track: String,
        reason: &'static str,
    },

    #[error("{context}: {source}")]
    InvalidChange {
        context: String,
        source: ChangeSpecError,
    },

    #[error("{context}: {field} must be a finite number")]
    NonFinite {
        context: String,
        field: &'static str,
    },

    #[error("{context} references unknown resource `{resource}`")]
    UnknownResource { context: String, resource: String },

    #[error("{context} references unknown building `{building}`")]
    UnknownBuilding { context: String, building: String },

    #[error("{context}: resource `{resource}` is not a {expected} target")]
    TargetKindMismatch {
        context: String,
        resource: String,
        expected: &'static str,
    },

    #[error("{context}: unknown power modifier key `{key}`")]
    UnknownModifierKey { context: String, key: String },

    #[error("invalid rules config: {0}")]
    InvalidConfig(&'static str),
}
