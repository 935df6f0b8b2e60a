//! Catalog loader.

use std::path::Path;

use tracing::debug;

use crate::loaders::{LoadResult, read_file};
use crate::spec::{CatalogSpec, LoadedCatalog};

/// Loader for the resource and building catalog from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load and validate a catalog from a RON file.
    ///
    /// RON format: [`CatalogSpec`]
    ///
    /// ```ron
    /// (
    ///     resources: [(id: "gold", lower: Some(0))],
    ///     buildings: [(id: "mint")],
    /// )
    /// ```
    pub fn load(path: &Path) -> LoadResult<LoadedCatalog> {
        let content = read_file(path)?;
        let loaded = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid catalog {}: {}", path.display(), e))?;

        debug!(
            target: "rules::content",
            path = %path.display(),
            resources = loaded.catalog.resources.len(),
            buildings = loaded.catalog.buildings.len(),
            passives = loaded.passives.len(),
            "catalog loaded"
        );

        Ok(loaded)
    }

    /// Parse and validate catalog RON held in memory.
    pub fn parse(content: &str) -> LoadResult<LoadedCatalog> {
        let spec: CatalogSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog RON: {}", e))?;
        Ok(LoadedCatalog::try_from(spec)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ContentError;
    use rules_core::{Effect, LifecycleEvent, PowerAdjustment, PowerModifier, StatSource};

    #[test]
    fn parses_effects_and_tiers() {
        let loaded = CatalogLoader::parse(
            r#"(
                resources: [
                    (id: "fortification", lower: Some(0)),
                    (
                        id: "happiness",
                        tier_track: Some((
                            id: "mood",
                            tiers: [
                                (id: "unrest", min: -10, max: Some(0)),
                                (id: "content", min: 0),
                            ],
                        )),
                        flags: [track_breakdown],
                    ),
                ],
                buildings: [
                    (
                        id: "tower",
                        triggers: (
                            before_attacked: [
                                Resource(
                                    resource: "fortification",
                                    change: Percent(modifiers: [0.5], rounding: Some(up)),
                                ),
                            ],
                        ),
                    ),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(loaded.catalog.resources.len(), 2);
        assert!(loaded.catalog.buildings.contains("tower"));
    }

    fn drill(adjustment: &str) -> String {
        format!(
            r#"(
                resources: [(id: "army_strength")],
                passives: [
                    (
                        id: "drill",
                        triggers: (
                            before_attacked: [
                                AddPowerModifier(
                                    key: "attack:resource",
                                    source: (kind: passive, id: "drill"),
                                    adjustment: {adjustment},
                                ),
                            ],
                        ),
                    ),
                ],
            )"#
        )
    }

    #[test]
    fn parses_power_modifiers() {
        let loaded = CatalogLoader::parse(&drill("Flat(2.0)")).unwrap();
        let effects = loaded.passives[0].triggers[&LifecycleEvent::BeforeAttacked].as_slice();
        assert_eq!(
            effects,
            &[Effect::AddPowerModifier {
                key: "attack:resource".into(),
                modifier: PowerModifier::new(
                    StatSource::passive("drill"),
                    PowerAdjustment::Flat(2.0)
                ),
            }]
        );

        assert!(CatalogLoader::parse(&drill("Percent(0.25)")).is_ok());
    }

    #[test]
    fn non_finite_power_modifier_is_rejected() {
        let error = CatalogLoader::parse(&drill("Flat(inf)")).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ContentError>(),
            Some(ContentError::NonFinite { field: "power adjustment", .. })
        ));
    }

    #[test]
    fn repeated_fields_fail_to_parse() {
        let result = CatalogLoader::parse(r#"(resources: [(id: "gold", id: "silver")])"#);
        assert!(result.is_err());
    }

    #[test]
    fn validation_errors_keep_their_type() {
        let error = CatalogLoader::parse(
            r#"(resources: [(id: "gold", lower: Some(10), upper: Some(1))])"#,
        )
        .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ContentError>(),
            Some(ContentError::InvalidBounds { .. })
        ));
    }
}
