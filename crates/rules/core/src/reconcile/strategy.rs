//! The three reconciliation strategies.
//!
//! Each strategy takes the current value, the unbounded target
//! (`current + requested`), the requested delta and optional bounds, and
//! decides what actually happens.

use crate::resource::ResourceBounds;

use super::ReconciliationResult;
use super::error::{BoundKind, ResourceBoundExceeded};

/// Shared signature of every strategy.
pub type Strategy = fn(
    f64,
    f64,
    f64,
    Option<ResourceBounds>,
) -> Result<ReconciliationResult, ResourceBoundExceeded>;

/// Constrains the target into the bounds.
///
/// A touched flag is set only when constraining changed the value on that
/// side; landing exactly on a bound does not count.
pub fn clamp(
    current: f64,
    target: f64,
    requested: f64,
    bounds: Option<ResourceBounds>,
) -> Result<ReconciliationResult, ResourceBoundExceeded> {
    let mut final_value = target;
    let mut touched_lower = false;
    let mut touched_upper = false;

    if let Some(bounds) = bounds {
        if let Some(lower) = bounds.lower().map(|v| v as f64)
            && final_value < lower
        {
            final_value = lower;
            touched_lower = true;
        }
        if let Some(upper) = bounds.upper().map(|v| v as f64)
            && final_value > upper
        {
            final_value = upper;
            touched_upper = true;
        }
    }

    Ok(ReconciliationResult {
        requested_delta: requested,
        applied_delta: final_value - current,
        final_value,
        touched_lower,
        touched_upper,
    })
}

/// Applies the target unconditionally, ignoring bounds.
pub fn pass(
    _current: f64,
    target: f64,
    requested: f64,
    _bounds: Option<ResourceBounds>,
) -> Result<ReconciliationResult, ResourceBoundExceeded> {
    Ok(ReconciliationResult {
        requested_delta: requested,
        applied_delta: requested,
        final_value: target,
        touched_lower: false,
        touched_upper: false,
    })
}

/// Fails if the target leaves the bounds, otherwise behaves like [`pass`].
pub fn reject(
    current: f64,
    target: f64,
    requested: f64,
    bounds: Option<ResourceBounds>,
) -> Result<ReconciliationResult, ResourceBoundExceeded> {
    if let Some(bounds) = bounds {
        if let Some(lower) = bounds.lower()
            && target < lower as f64
        {
            return Err(ResourceBoundExceeded {
                bound: BoundKind::Lower,
                attempted: target,
                bound_value: lower,
                requested_delta: requested,
            });
        }
        if let Some(upper) = bounds.upper()
            && target > upper as f64
        {
            return Err(ResourceBoundExceeded {
                bound: BoundKind::Upper,
                attempted: target,
                bound_value: upper,
                requested_delta: requested,
            });
        }
    }

    pass(current, target, requested, bounds)
}
