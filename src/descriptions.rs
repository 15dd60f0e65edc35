use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentDescription {
    #[serde(default)]
    pub utilite: String,
    #[serde(default)]
    pub exemple: String,
}

/// Component type → usage notes, loaded from the composants.yaml
/// collaborator file.
#[derive(Debug, Clone, Default)]
pub struct ComponentDescriptions {
    entries: BTreeMap<String, ComponentDescription>,
}

impl ComponentDescriptions {
    /// A missing or malformed file degrades to an empty map; the renderer
    /// then falls back to its per-component placeholder line.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("cannot read {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_yaml::from_str(&raw) {
            Ok(entries) => Self { entries },
            Err(e) => {
                warn!("cannot parse {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn get(&self, component_type: &str) -> Option<&ComponentDescription> {
        self.entries.get(component_type)
    }
}
