//! Content factory for building engine inputs from data files.

use std::path::{Path, PathBuf};

use rules_core::RulesConfig;

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult};
use crate::spec::LoadedCatalog;

/// Content factory that loads all rules content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── catalog.ron
/// └── rules.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load resources, buildings and starting passives from `catalog.ron`.
    pub fn load_catalog(&self) -> LoadResult<LoadedCatalog> {
        CatalogLoader::load(&self.data_dir.join("catalog.ron"))
    }

    /// Load rules configuration from `rules.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<RulesConfig> {
        let path = self.data_dir.join("rules.toml");
        if path.exists() {
            ConfigLoader::load(&path)
        } else {
            Ok(RulesConfig::default())
        }
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
