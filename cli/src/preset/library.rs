use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::tree::{ConfigTree, NodeKey};

use super::error::PresetError;
use super::model::Preset;

/// Named presets. Names are unique ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetLibrary {
    #[serde(default, rename = "preset")]
    presets: Vec<Preset>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a library from TOML. A missing file is an empty library.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PresetError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(event = "preset.library_missing", path = %path.display());
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut library: PresetLibrary =
            toml::from_str(&content).map_err(|source| PresetError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        library.sort();
        debug!(event = "preset.library_loaded", path = %path.display(), presets = library.presets.len());
        Ok(library)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PresetError> {
        let path = path.as_ref();
        let content = toml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(event = "preset.library_saved", path = %path.display(), presets = self.presets.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| same_name(&p.name, name))
    }

    /// Inserts or replaces the preset with the same name.
    pub fn upsert(&mut self, preset: Preset) -> Result<(), PresetError> {
        if preset.name.trim().is_empty() {
            return Err(PresetError::InvalidName);
        }
        match self.presets.iter_mut().find(|p| same_name(&p.name, &preset.name)) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
        self.sort();
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Preset, PresetError> {
        let index = self
            .presets
            .iter()
            .position(|p| same_name(&p.name, name))
            .ok_or_else(|| PresetError::NotFound {
                name: name.to_string(),
            })?;
        Ok(self.presets.remove(index))
    }

    /// Names sorted ignoring case.
    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Applies the named preset to each target except the root. Returns how
    /// many targets were written.
    pub fn apply(
        &self,
        name: &str,
        tree: &mut ConfigTree,
        targets: &[NodeKey],
    ) -> Result<usize, PresetError> {
        let preset = self.get(name).ok_or_else(|| PresetError::NotFound {
            name: name.to_string(),
        })?;
        let mut written = 0;
        for target in targets {
            if tree.is_root(*target) {
                debug!(event = "preset.root_skipped", preset = %preset.name);
                continue;
            }
            preset.apply_to(tree, *target)?;
            written += 1;
        }
        Ok(written)
    }

    fn sort(&mut self) {
        self.presets.sort_by_key(|p| p.name.to_lowercase());
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
