use std::path::{Path, PathBuf};
use tracing::info;

use crate::inheritance::InheritanceDefaults;
use crate::schema::ValidationResult;
use crate::scope::ResolutionPolicy;
use crate::tree::ConfigTree;

use super::error::StoreError;
use super::models::TreeSnapshot;
use super::snapshot::{build_tree, snapshot_tree};

/// Persistence collaborator for a whole connection tree.
pub trait TreeStore {
    /// Every returned node carries a complete toggle set.
    fn load_tree(&self) -> Result<(ConfigTree, ValidationResult), StoreError>;

    /// Writes only locally stored values.
    fn save_tree(&self, tree: &ConfigTree) -> Result<(), StoreError>;
}

/// Stores a tree as a single TOML document.
pub struct TomlTreeStore {
    path: PathBuf,
    defaults: InheritanceDefaults,
    policy: ResolutionPolicy,
}

impl TomlTreeStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            defaults: InheritanceDefaults::default(),
            policy: ResolutionPolicy::default(),
        }
    }

    /// Settings handed to every tree this store loads.
    pub fn with_settings(mut self, defaults: InheritanceDefaults, policy: ResolutionPolicy) -> Self {
        self.defaults = defaults;
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn parse(content: &str, path: &Path) -> Result<TreeSnapshot, StoreError> {
        toml::from_str(content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl TreeStore for TomlTreeStore {
    fn load_tree(&self) -> Result<(ConfigTree, ValidationResult), StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let snapshot = Self::parse(&content, &self.path)?;
        let (tree, validation) = build_tree(snapshot, self.defaults.clone(), self.policy.clone())?;
        info!(
            event = "store.loaded",
            path = %self.path.display(),
            nodes = tree.len(),
            warnings = validation.warnings.len(),
            errors = validation.errors.len()
        );
        Ok((tree, validation))
    }

    fn save_tree(&self, tree: &ConfigTree) -> Result<(), StoreError> {
        let content = toml::to_string(&snapshot_tree(tree))?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(event = "store.saved", path = %self.path.display(), nodes = tree.len());
        Ok(())
    }
}
