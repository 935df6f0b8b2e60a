//! Common error infrastructure for rules-core.
//!
//! Domain errors live next to the code that raises them
//! ([`ReconcileError`] in `reconcile`); [`EngineError`] is the umbrella the
//! effect executor and attack pipeline return.
//!
//! # Design Principles
//!
//! - **Fail loudly**: nothing in the engine retries or silently corrects
//! - **Severity Classification**: errors are categorized for the caller's handling
//! - **Propagation**: errors raised inside trigger bundles reach the caller unchanged

use crate::ids::{BuildingId, PassiveId, ResourceId};
use crate::reconcile::{ReconcileError, ResourceBoundExceeded};
use crate::state::PlayerId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry with a different action
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: defects in the caller or in content data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative action.
    ///
    /// Examples: building already owned
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: bound exceeded under reject, building not owned
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: player missing from state
    Internal,

    /// Fatal error - content or caller defect.
    ///
    /// Examples: unknown reconciliation mode, effect naming an unknown resource
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a defect.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all rules-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors surfaced by effect execution and attack resolution.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("player {player} has no opponent to attack")]
    NoOpponent { player: PlayerId },

    #[error("unknown resource `{0}`")]
    UnknownResource(ResourceId),

    #[error("unknown building `{0}`")]
    UnknownBuilding(BuildingId),

    #[error("resource `{resource}` cannot be attacked as a {expected} target")]
    TargetKindMismatch {
        resource: ResourceId,
        expected: &'static str,
    },

    #[error("player {player} does not own building `{building}`")]
    BuildingNotOwned {
        player: PlayerId,
        building: BuildingId,
    },

    #[error("player {player} already owns building `{building}`")]
    BuildingAlreadyOwned {
        player: PlayerId,
        building: BuildingId,
    },

    #[error("player {player} has no passive `{passive}`")]
    PassiveNotFound { player: PlayerId, passive: PassiveId },

    #[error("player {player} already has passive `{passive}`")]
    DuplicatePassive { player: PlayerId, passive: PassiveId },
}

impl From<ResourceBoundExceeded> for EngineError {
    fn from(error: ResourceBoundExceeded) -> Self {
        Self::Reconcile(error.into())
    }
}

impl EngineError {
    /// The bound violation carried by this error, if any.
    pub fn bound_exceeded(&self) -> Option<&ResourceBoundExceeded> {
        match self {
            Self::Reconcile(ReconcileError::BoundExceeded(exceeded)) => Some(exceeded),
            _ => None,
        }
    }
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        use EngineError::*;
        match self {
            Reconcile(error) => error.severity(),
            PlayerNotFound(_) => ErrorSeverity::Internal,
            NoOpponent { .. } => ErrorSeverity::Validation,
            UnknownResource(_) | UnknownBuilding(_) | TargetKindMismatch { .. } => {
                ErrorSeverity::Fatal
            }
            BuildingNotOwned { .. } | PassiveNotFound { .. } => ErrorSeverity::Validation,
            BuildingAlreadyOwned { .. } | DuplicatePassive { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use EngineError::*;
        match self {
            Reconcile(error) => error.error_code(),
            PlayerNotFound(_) => "ENGINE_PLAYER_NOT_FOUND",
            NoOpponent { .. } => "ENGINE_NO_OPPONENT",
            UnknownResource(_) => "ENGINE_UNKNOWN_RESOURCE",
            UnknownBuilding(_) => "ENGINE_UNKNOWN_BUILDING",
            TargetKindMismatch { .. } => "ENGINE_TARGET_KIND_MISMATCH",
            BuildingNotOwned { .. } => "ENGINE_BUILDING_NOT_OWNED",
            BuildingAlreadyOwned { .. } => "ENGINE_BUILDING_ALREADY_OWNED",
            PassiveNotFound { .. } => "ENGINE_PASSIVE_NOT_FOUND",
            DuplicatePassive { .. } => "ENGINE_DUPLICATE_PASSIVE",
        }
    }
}
