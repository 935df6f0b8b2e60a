//! Per-player resource values and their bookkeeping.

use std::collections::BTreeMap;

use tracing::trace;

use crate::ids::{ResourceId, TierId};
use crate::reconcile::{
    ChangeSpec, ReconcileError, ReconciliationInput, ReconciliationMode, ReconciliationResult,
    reconcile,
};
use crate::source::StatSource;

use super::{ResourceCatalog, ResourceFlags};

/// Current state of one resource for one player.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceEntry {
    pub value: f64,
    /// Set whenever a mutation changes the value; cleared by the owner of
    /// change notifications.
    pub touched: bool,
    /// Tier resolved from the definition's tier track.
    pub tier: Option<TierId>,
}

/// A positive change recorded for a resource tracking recent gains.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceGain {
    pub resource: ResourceId,
    pub amount: f64,
}

/// A resource moved from one tier to another.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierTransition {
    pub resource: ResourceId,
    pub from: Option<TierId>,
    pub to: Option<TierId>,
}

/// Record of one store mutation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceUpdate {
    pub resource: ResourceId,
    pub before: f64,
    pub after: f64,
    /// Present when the mutation went through reconciliation.
    pub reconciliation: Option<ReconciliationResult>,
    pub tier_transition: Option<TierTransition>,
}

impl ResourceUpdate {
    pub fn delta(&self) -> f64 {
        self.after - self.before
    }
}

/// Map from resource id to current value, owned by one player.
///
/// Bounded changes go through [`ResourceStore::apply_change`]; the ordinary
/// path [`ResourceStore::set_value`] writes a value as-is (attack damage uses
/// it, flooring at zero itself).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceStore {
    entries: BTreeMap<ResourceId, ResourceEntry>,
    recent_gains: Vec<ResourceGain>,
    // Struct-keyed maps do not survive JSON; the breakdown is rebuilt per session.
    #[cfg_attr(feature = "serde", serde(skip))]
    breakdown: BTreeMap<ResourceId, BTreeMap<StatSource, f64>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with every catalog resource at its initial value.
    pub fn from_catalog(catalog: &ResourceCatalog) -> Self {
        let entries = catalog
            .iter()
            .map(|definition| {
                let value = definition.initial_value();
                let tier = definition
                    .tier_track
                    .as_ref()
                    .and_then(|track| track.resolve(value))
                    .cloned();
                (
                    definition.id.clone(),
                    ResourceEntry {
                        value,
                        touched: false,
                        tier,
                    },
                )
            })
            .collect();

        Self {
            entries,
            ..Self::default()
        }
    }

    /// Current value; resources never written read as zero.
    pub fn value(&self, id: &str) -> f64 {
        self.entries.get(id).map_or(0.0, |entry| entry.value)
    }

    pub fn entry(&self, id: &str) -> Option<&ResourceEntry> {
        self.entries.get(id)
    }

    pub fn tier(&self, id: &str) -> Option<&TierId> {
        self.entries.get(id).and_then(|entry| entry.tier.as_ref())
    }

    pub fn is_touched(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|entry| entry.touched)
    }

    /// Ids of every resource changed since the last [`Self::clear_touched`].
    pub fn touched(&self) -> impl Iterator<Item = &ResourceId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.touched)
            .map(|(id, _)| id)
    }

    pub fn clear_touched(&mut self) {
        for entry in self.entries.values_mut() {
            entry.touched = false;
        }
    }

    pub fn recent_gains(&self) -> &[ResourceGain] {
        &self.recent_gains
    }

    /// Drains the recorded gains.
    pub fn take_recent_gains(&mut self) -> Vec<ResourceGain> {
        core::mem::take(&mut self.recent_gains)
    }

    /// Applied deltas per attribution source, for breakdown-tracked resources.
    pub fn breakdown(&self, id: &str) -> Option<&BTreeMap<StatSource, f64>> {
        self.breakdown.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &ResourceEntry)> {
        self.entries.iter()
    }

    /// Applies a bounded change through the reconciliation dispatcher.
    ///
    /// Bounds come from the catalog; unknown resources are unbounded.
    /// `PercentFromResource` sources are read from this store.
    pub fn apply_change(
        &mut self,
        catalog: &ResourceCatalog,
        id: &ResourceId,
        change: &ChangeSpec,
        mode: ReconciliationMode,
        source: Option<&StatSource>,
    ) -> Result<ResourceUpdate, ReconcileError> {
        let resolve = |other: &ResourceId| self.value(other);
        let input = ReconciliationInput::new(self.value(id), change)
            .bounds(catalog.bounds(id))
            .mode(mode)
            .resolver(&resolve);
        let result = reconcile(input)?;

        let mut update = self.write(catalog, id, result.final_value, source);
        update.reconciliation = Some(result);
        Ok(update)
    }

    /// Writes `value` without reconciliation.
    pub fn set_value(
        &mut self,
        catalog: &ResourceCatalog,
        id: &ResourceId,
        value: f64,
        source: Option<&StatSource>,
    ) -> ResourceUpdate {
        self.write(catalog, id, value, source)
    }

    fn write(
        &mut self,
        catalog: &ResourceCatalog,
        id: &ResourceId,
        value: f64,
        source: Option<&StatSource>,
    ) -> ResourceUpdate {
        let definition = catalog.get(id);
        let flags = definition.map_or(ResourceFlags::empty(), |definition| definition.flags);
        let resolved_tier = definition
            .and_then(|definition| definition.tier_track.as_ref())
            .and_then(|track| track.resolve(value))
            .cloned();

        let entry = self.entries.entry(id.clone()).or_default();
        let before = entry.value;
        let delta = value - before;

        entry.value = value;
        if delta != 0.0 {
            entry.touched = true;
        }

        let tier_transition = (entry.tier != resolved_tier).then(|| TierTransition {
            resource: id.clone(),
            from: entry.tier.clone(),
            to: resolved_tier.clone(),
        });
        entry.tier = resolved_tier;

        if flags.contains(ResourceFlags::TRACK_RECENT_GAIN) && delta > 0.0 {
            self.recent_gains.push(ResourceGain {
                resource: id.clone(),
                amount: delta,
            });
        }

        if flags.contains(ResourceFlags::TRACK_BREAKDOWN)
            && delta != 0.0
            && let Some(source) = source
        {
            *self
                .breakdown
                .entry(id.clone())
                .or_default()
                .entry(source.clone())
                .or_insert(0.0) += delta;
        }

        trace!(
            target: "rules::resource",
            resource = %id,
            before,
            after = value,
            "resource written"
        );

        ResourceUpdate {
            resource: id.clone(),
            before,
            after: value,
            reconciliation: None,
            tier_transition,
        }
    }
}
