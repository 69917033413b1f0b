//! Named match presets: reusable variant configs keyed by name.
//! Loaded from TOML at runtime for the CLI and the simulator.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::engine::config::GameConfig;
use crate::error::{EngineError, Result};

/// Presets every build knows, merged under any loaded from file.
static BUILTIN_PRESETS: Lazy<BTreeMap<String, toml::Value>> = Lazy::new(|| {
    let source = r#"
        [x01_501]
        type = "x01"

        [x01_301_double_in]
        type = "x01"
        start_score = 301
        in_mode = "double"

        [cricket]
        type = "cricket"

        [cricket_cut_throat]
        type = "cricket"
        mode = "cut_throat"

        [killer]
        type = "killer"

        [shanghai]
        type = "shanghai"

        [round_the_clock]
        type = "round_the_clock"

        [high_score]
        type = "high_score"

        [halve_it]
        type = "halve_it"
    "#;
    match toml::from_str(source) {
        Ok(presets) => presets,
        Err(e) => {
            tracing::error!(error = %e, "built-in match presets failed to parse");
            BTreeMap::new()
        }
    }
});

/// Which preset to use when none is named.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PresetDefaults {
    pub preset: Option<String>,
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MatchPresets {
    #[serde(default)]
    pub presets: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub defaults: PresetDefaults,
}

impl MatchPresets {
    /// Built-in presets only.
    pub fn builtin() -> Self {
        MatchPresets {
            presets: BUILTIN_PRESETS.clone(),
            defaults: PresetDefaults {
                preset: Some("x01_501".into()),
            },
        }
    }

    /// Names of every resolvable preset, file entries and built-ins.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .presets
            .keys()
            .chain(BUILTIN_PRESETS.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Resolve a preset name, or the configured default when `name` is None.
    /// File entries shadow built-ins of the same name.
    pub fn resolve(&self, name: Option<&str>) -> Result<GameConfig> {
        let name = name
            .or(self.defaults.preset.as_deref())
            .ok_or_else(|| EngineError::InvalidConfig("no preset named and no default set".into()))?;
        let value = self
            .presets
            .get(name)
            .or_else(|| BUILTIN_PRESETS.get(name))
            .ok_or_else(|| EngineError::InvalidConfig(format!("unknown preset {name:?}")))?;
        GameConfig::from_value(serde_json::to_value(value)?)
    }
}

/// Load presets from a TOML file at the given path.
pub fn load_presets(path: &Path) -> Result<MatchPresets> {
    let content = std::fs::read_to_string(path)?;
    let presets: MatchPresets = toml::from_str(&content)?;
    for (name, value) in &presets.presets {
        GameConfig::from_value(serde_json::to_value(value)?).map_err(|e| {
            EngineError::InvalidConfig(format!("preset {name:?} in {}: {e}", path.display()))
        })?;
    }
    Ok(presets)
}

/// Try to load presets from well-known paths, falling back to the built-ins.
pub fn load_default_presets() -> MatchPresets {
    let candidates = [
        "match_presets.toml",
        "../match_presets.toml",
        "/etc/dart-engine/match_presets.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_presets(p) {
                Ok(presets) => {
                    tracing::info!(path = %p.display(), count = presets.presets.len(), "loaded match presets");
                    return presets;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load match presets");
                }
            }
        }
    }
    tracing::info!("no match_presets.toml found, using built-in presets");
    MatchPresets::builtin()
}
