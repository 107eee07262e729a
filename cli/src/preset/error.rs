use std::path::PathBuf;

use crate::tree::TreeError;

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("Preset '{name}' not found")]
    NotFound { name: String },

    #[error("Preset name cannot be empty")]
    InvalidName,

    #[error("Preset '{preset}' could not write any value to node '{node}'")]
    NothingApplied { preset: String, node: String },

    #[error("Tree operation failed: {source}")]
    Tree {
        #[from]
        source: TreeError,
    },

    #[error("Failed to read presets {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse presets {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize presets: {source}")]
    Serialize {
        #[from]
        source: toml::ser::Error,
    },
}
