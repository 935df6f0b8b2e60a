//! Resource-value reconciliation.
//!
//! Every bounded mutation in the engine goes through [`reconcile`]:
//!
//! 1. **Delta**: [`compute_delta`] turns a [`ChangeSpec`] into a requested delta
//! 2. **Strategy**: the [`ReconciliationMode`] picks clamp, pass or reject
//! 3. **Result**: a fresh [`ReconciliationResult`] describing what was applied
//!
//! The mode set is closed. Adding a fourth mode is a design decision, not an
//! extension point, so dispatch is a plain `match` from enum to function.

mod delta;
mod error;
pub mod strategy;

pub use delta::{ChangeSpec, RoundingMode, compute_delta};
pub use error::{BoundKind, ChangeSpecError, ReconcileError, ResourceBoundExceeded};
pub use strategy::Strategy;

use core::str::FromStr;

use strum::VariantNames;
use tracing::trace;

use crate::ids::ResourceId;
use crate::resource::ResourceBounds;

/// Outcome of one reconciliation call.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReconciliationResult {
    pub requested_delta: f64,
    pub applied_delta: f64,
    pub final_value: f64,
    pub touched_lower: bool,
    pub touched_upper: bool,
}

/// How a requested change interacts with a resource's bounds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::VariantNames,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum ReconciliationMode {
    /// Constrain into bounds.
    #[default]
    Clamp,
    /// Ignore bounds.
    Pass,
    /// Fail when a bound would be crossed.
    Reject,
}

impl ReconciliationMode {
    /// Returns the strategy implementing this mode.
    pub fn strategy(self) -> Strategy {
        match self {
            Self::Clamp => strategy::clamp,
            Self::Pass => strategy::pass,
            Self::Reject => strategy::reject,
        }
    }
}

impl FromStr for ReconciliationMode {
    type Err = ReconcileError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "clamp" => Ok(Self::Clamp),
            "pass" => Ok(Self::Pass),
            "reject" => Ok(Self::Reject),
            _ => Err(ReconcileError::UnknownMode {
                mode: name.to_owned(),
                valid: Self::VARIANTS,
            }),
        }
    }
}

/// Everything the dispatcher needs for one call.
#[derive(Clone, Copy)]
pub struct ReconciliationInput<'a> {
    pub current: f64,
    pub change: &'a ChangeSpec,
    pub bounds: Option<ResourceBounds>,
    pub mode: ReconciliationMode,
    /// Reads other resources for `PercentFromResource`. Missing resolver
    /// reads every source as zero.
    pub resolver: Option<&'a dyn Fn(&ResourceId) -> f64>,
}

impl<'a> ReconciliationInput<'a> {
    /// Creates an input with no bounds, clamp mode and no resolver.
    pub fn new(current: f64, change: &'a ChangeSpec) -> Self {
        Self {
            current,
            change,
            bounds: None,
            mode: ReconciliationMode::Clamp,
            resolver: None,
        }
    }

    /// Builder: set bounds.
    pub fn bounds(mut self, bounds: Option<ResourceBounds>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Builder: set mode.
    pub fn mode(mut self, mode: ReconciliationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set the resolver for resource-sourced percents.
    pub fn resolver(mut self, resolver: &'a dyn Fn(&ResourceId) -> f64) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Computes the requested delta and applies the selected strategy.
pub fn reconcile(input: ReconciliationInput<'_>) -> Result<ReconciliationResult, ReconcileError> {
    let resolver = input.resolver;
    let requested = compute_delta(input.current, input.change, |id| {
        resolver.map_or(0.0, |resolve| resolve(id))
    });
    let target = input.current + requested;

    let result = (input.mode.strategy())(input.current, target, requested, input.bounds)?;

    trace!(
        target: "rules::reconcile",
        mode = %input.mode,
        current = input.current,
        requested,
        applied = result.applied_delta,
        final_value = result.final_value,
        "reconciled change"
    );

    Ok(result)
}
