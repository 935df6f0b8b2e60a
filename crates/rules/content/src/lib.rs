//! Data-driven content for the rules engine.
//!
//! This crate turns authored data files into the read-only inputs
//! `rules-core` consumes:
//! - Resource catalog: bounds, groups, tier tracks, bookkeeping flags (RON)
//! - Building catalog: lifecycle trigger effects (RON)
//! - Starting passives (RON)
//! - Rules configuration (TOML)
//!
//! Authored formats live in [`spec`] and are validated on conversion; the
//! engine never sees unvalidated content.

pub mod spec;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use spec::{CatalogSpec, ContentError, LoadedCatalog, validate_config};

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, ConfigLoader, ContentFactory, LoadResult};
