// src/forest/registry.rs
//! Data-driven tree archetypes + loader.

use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::core::ScatterError;

// ---------- Public plugin to register asset+loader ----------

pub struct ForestRegistryAssetPlugin;

impl Plugin for ForestRegistryAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<ForestRegistry>()
            .register_asset_loader(ForestRegistryLoader);
    }
}

// ---------- Scatter parameters (data form) ----------

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ScatterDef {
    Scatter {
        count: usize,
        spacing: f32,
        #[serde(default = "default_tries")]
        tries: u32,
    },
}

fn default_tries() -> u32 {
    10
}

impl ScatterDef {
    /// Check the parameters that do not depend on the session region.
    pub fn validate(&self) -> Result<(), ScatterError> {
        let ScatterDef::Scatter { spacing, tries, .. } = *self;
        if !(spacing > 0.0) {
            return Err(ScatterError::NonPositiveSpacing(spacing));
        }
        if tries == 0 {
            return Err(ScatterError::ZeroTries);
        }
        Ok(())
    }

    /// Apply a global density multiplier to the target count.
    pub fn scaled(&self, density: f32) -> Self {
        let ScatterDef::Scatter { count, spacing, tries } = *self;
        ScatterDef::Scatter {
            count: ((count as f32) * density.max(0.0)).round() as usize,
            spacing,
            tries,
        }
    }
}

// ---------- Render refs (data form) ----------

/// What to show at an accepted position. The placement pipeline is agnostic
/// to this; it is handed to the spawn step untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RenderRef {
    /// Externally generated tree asset (e.g. "models/oak.glb#Scene0").
    Scene { path: String },
    /// Built from engine primitives: a trunk cylinder under a crown sphere.
    Canopy {
        trunk_height: f32,
        trunk_radius: f32,
        crown_radius: f32,
        trunk_color: [f32; 3],
        crown_color: [f32; 3],
    },
}

// ---------- Archetype definition (data form) ----------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeArchetypeDef {
    /// Unique human-readable name (used for lookup).
    pub name: String,

    /// Optional category hint (e.g. "tree", "understory").
    #[serde(default)]
    pub category: Option<String>,

    /// Visual representation.
    pub render: RenderRef,

    /// Scatter parameters for this archetype.
    pub scatter: ScatterDef,

    /// Uniform per-instance scale range.
    #[serde(default = "default_scale")]
    pub scale: (f32, f32),

    /// Pin one instance at the origin before scattering the rest.
    #[serde(default)]
    pub centerpiece: bool,
}

fn default_scale() -> (f32, f32) {
    (1.0, 1.0)
}

// ---------- Runtime registry asset ----------

#[derive(Asset, TypePath, Clone, Debug)]
pub struct ForestRegistry {
    /// Ordered list; index in this vector is the archetype id.
    pub archetypes: Vec<TreeArchetypeDef>,
    /// Name → index for quick lookups.
    pub name_to_index: HashMap<String, u32>,
}

impl ForestRegistry {
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.name_to_index.get(name).copied()
    }

    pub fn get(&self, index: u32) -> Option<&TreeArchetypeDef> {
        self.archetypes.get(index as usize)
    }
}

/// Parse and validate a registry manifest. Shared by the asset loader and
/// the tests.
pub fn parse_defs(bytes: &[u8]) -> Result<ForestRegistry, ForestRegistryLoadError> {
    let defs: Vec<TreeArchetypeDef> =
        ron::de::from_bytes(bytes).map_err(|e| ForestRegistryLoadError::Ron(e.to_string()))?;

    let mut name_to_index = HashMap::with_capacity(defs.len());
    for (i, def) in defs.iter().enumerate() {
        if let Some(prev) = name_to_index.insert(def.name.clone(), i as u32) {
            return Err(ForestRegistryLoadError::DuplicateName {
                name: def.name.clone(),
                first: prev,
                second: i as u32,
            });
        }
        def.scatter.validate().map_err(|source| ForestRegistryLoadError::Scatter {
            name: def.name.clone(),
            source,
        })?;
    }

    Ok(ForestRegistry { archetypes: defs, name_to_index })
}

// ---------- Asset loader for `.forest.ron` ----------

#[derive(Default)]
pub struct ForestRegistryLoader;

impl AssetLoader for ForestRegistryLoader {
    type Asset = ForestRegistry;
    type Settings = ();
    type Error = ForestRegistryLoadError;

    fn extensions(&self) -> &[&str] {
        &["forest.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        parse_defs(&bytes)
    }
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum ForestRegistryLoadError {
    #[error("I/O while reading registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Duplicate archetype name '{name}' (first idx {first}, second idx {second})")]
    DuplicateName { name: String, first: u32, second: u32 },
    #[error("Archetype '{name}': {source}")]
    Scatter { name: String, source: ScatterError },
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
        [
            (
                name: "oak",
                category: Some("tree"),
                render: Canopy(
                    trunk_height: 9.0,
                    trunk_radius: 0.8,
                    crown_radius: 6.5,
                    trunk_color: (0.36, 0.25, 0.13),
                    crown_color: (0.16, 0.42, 0.14),
                ),
                scatter: Scatter(count: 20, spacing: 40.0, tries: 12),
                scale: (0.85, 1.25),
                centerpiece: true,
            ),
            (
                name: "pine",
                render: Scene(path: "models/pine.glb#Scene0"),
                scatter: Scatter(count: 30, spacing: 22.0),
            ),
        ]
    "#;

    #[test]
    fn parses_a_manifest_and_applies_defaults() {
        let reg = parse_defs(MANIFEST.as_bytes()).expect("manifest should parse");

        assert_eq!(reg.archetypes.len(), 2);
        assert_eq!(reg.index_of("oak"), Some(0));
        assert_eq!(reg.index_of("pine"), Some(1));
        assert_eq!(reg.index_of("birch"), None);

        let oak = reg.get(0).unwrap();
        assert!(oak.centerpiece);
        assert_eq!(oak.scale, (0.85, 1.25));

        // Omitted fields fall back to their defaults.
        let pine = reg.get(1).unwrap();
        assert!(!pine.centerpiece);
        assert_eq!(pine.scale, (1.0, 1.0));
        assert_eq!(pine.category, None);
        let ScatterDef::Scatter { tries, .. } = pine.scatter;
        assert_eq!(tries, 10);
    }

    #[test]
    fn rejects_duplicate_names() {
        let manifest = r#"
            [
                (name: "oak", render: Scene(path: "a.glb"), scatter: Scatter(count: 1, spacing: 5.0)),
                (name: "oak", render: Scene(path: "b.glb"), scatter: Scatter(count: 1, spacing: 5.0)),
            ]
        "#;
        let err = parse_defs(manifest.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ForestRegistryLoadError::DuplicateName { first: 0, second: 1, .. }
        ));
    }

    #[test]
    fn rejects_invalid_scatter_params() {
        let manifest = r#"
            [
                (name: "oak", render: Scene(path: "a.glb"), scatter: Scatter(count: 1, spacing: 0.0)),
            ]
        "#;
        let err = parse_defs(manifest.as_bytes()).unwrap_err();
        match err {
            ForestRegistryLoadError::Scatter { name, source } => {
                assert_eq!(name, "oak");
                assert_eq!(source, ScatterError::NonPositiveSpacing(0.0));
            }
            other => panic!("expected scatter error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_ron() {
        assert!(matches!(
            parse_defs(b"not ron at all").unwrap_err(),
            ForestRegistryLoadError::Ron(_)
        ));
    }

    #[test]
    fn density_scales_the_target_count() {
        let def = ScatterDef::Scatter { count: 20, spacing: 5.0, tries: 10 };

        let ScatterDef::Scatter { count, .. } = def.scaled(0.5);
        assert_eq!(count, 10);

        let ScatterDef::Scatter { count, .. } = def.scaled(0.0);
        assert_eq!(count, 0);

        // Spacing and tries are untouched.
        let ScatterDef::Scatter { spacing, tries, .. } = def.scaled(2.0);
        assert_eq!((spacing, tries), (5.0, 10));
    }
}
