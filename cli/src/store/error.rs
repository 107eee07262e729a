use std::path::PathBuf;

use crate::tree::NodeKind;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize tree: {source}")]
    Serialize {
        #[from]
        source: toml::ser::Error,
    },

    #[error("Top-level node must be the root, found {kind}")]
    InvalidRoot { kind: NodeKind },

    #[error("Unsupported snapshot version {version}")]
    UnsupportedVersion { version: u32 },
}
