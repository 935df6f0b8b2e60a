//! Reconciliation errors.

use crate::error::{ErrorSeverity, GameError};

/// Which side of a resource's bounds a value ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum BoundKind {
    Lower,
    Upper,
}

/// Raised by the reject strategy when a change would leave the bounds.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[error(
    "{bound} bound exceeded: attempted {attempted}, bound {bound_value}, requested delta {requested_delta}"
)]
pub struct ResourceBoundExceeded {
    pub bound: BoundKind,
    pub attempted: f64,
    pub bound_value: i64,
    pub requested_delta: f64,
}

/// Errors produced by the reconciliation dispatcher.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    BoundExceeded(#[from] ResourceBoundExceeded),

    /// A mode name that is not one of the closed set of strategies.
    ///
    /// Only reachable when parsing authored data; indicates a content or
    /// caller defect.
    #[error("unknown reconciliation mode `{mode}` (valid modes: {})", .valid.join(", "))]
    UnknownMode {
        mode: String,
        valid: &'static [&'static str],
    },
}

impl GameError for ReconcileError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::BoundExceeded(_) => ErrorSeverity::Validation,
            Self::UnknownMode { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BoundExceeded(_) => "RECONCILE_BOUND_EXCEEDED",
            Self::UnknownMode { .. } => "RECONCILE_UNKNOWN_MODE",
        }
    }
}

/// Problems with an authored change specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChangeSpecError {
    #[error("percent change requires at least one modifier")]
    EmptyModifiers,

    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
}
