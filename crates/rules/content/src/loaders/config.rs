//! Rules configuration loader.

use std::path::Path;

use rules_core::RulesConfig;

use crate::loaders::{LoadResult, read_file};
use crate::spec::validate_config;

/// Loader for rules configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys take [`RulesConfig`] defaults.
    pub fn load(path: &Path) -> LoadResult<RulesConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid rules config {}: {}", path.display(), e))
    }

    /// Parse and validate config TOML held in memory.
    pub fn parse(content: &str) -> LoadResult<RulesConfig> {
        let config: RulesConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        validate_config(&config)?;
        Ok(config)
    }
}
