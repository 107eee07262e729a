use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::schema::PropertyValue;
use crate::tree::{ConfigTree, NodeKey};

use super::error::PresetError;

/// A detached, named bundle of local values and inheritance flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,

    #[serde(default)]
    pub values: BTreeMap<String, PropertyValue>,

    #[serde(default)]
    pub toggles: BTreeMap<String, bool>,
}

/// Outcome of applying a preset to one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub skipped: Vec<String>,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            toggles: BTreeMap::new(),
        }
    }

    /// Captures every serializable, non-identity property's local value
    /// (stored or default) and the whole toggle set of `key`.
    pub fn capture_from(
        name: impl Into<String>,
        tree: &ConfigTree,
        key: NodeKey,
    ) -> Result<Self, PresetError> {
        let schema = tree.schema();
        let mut preset = Preset::new(name);

        for descriptor in schema.serializable() {
            if schema.is_identity(descriptor.name) {
                continue;
            }
            let value = tree.local_value(key, descriptor.name)?;
            preset.values.insert(descriptor.name.to_string(), value);
        }
        for (toggle, inherit) in tree.toggles(key)?.flags() {
            preset.toggles.insert(toggle.to_string(), *inherit);
        }

        info!(
            event = "preset.captured",
            preset = %preset.name,
            node = %tree.node(key)?.id(),
            values = preset.values.len()
        );
        Ok(preset)
    }

    /// Writes every captured value and flag onto `key`, one at a time.
    /// Entries that fail are logged and skipped; the call only fails when
    /// there was something to write and none of it could be written.
    pub fn apply_to(&self, tree: &mut ConfigTree, key: NodeKey) -> Result<ApplyReport, PresetError> {
        let node_id = tree.node(key)?.id().to_string();
        let mut report = ApplyReport::default();

        for (property, value) in &self.values {
            match tree.set_value(key, property, value.clone()) {
                Ok(_) => report.applied += 1,
                Err(e) => {
                    warn!(
                        event = "preset.apply_skipped",
                        preset = %self.name,
                        node = %node_id,
                        property = %property,
                        error = %e
                    );
                    report.skipped.push(property.clone());
                }
            }
        }
        for (toggle, inherit) in &self.toggles {
            match tree.set_inherited(key, toggle, *inherit) {
                Ok(_) => report.applied += 1,
                Err(e) => {
                    warn!(
                        event = "preset.apply_skipped",
                        preset = %self.name,
                        node = %node_id,
                        toggle = %toggle,
                        error = %e
                    );
                    report.skipped.push(toggle.clone());
                }
            }
        }

        if report.applied == 0 && !report.skipped.is_empty() {
            return Err(PresetError::NothingApplied {
                preset: self.name.clone(),
                node: node_id,
            });
        }
        info!(
            event = "preset.applied",
            preset = %self.name,
            node = %node_id,
            applied = report.applied,
            skipped = report.skipped.len()
        );
        Ok(report)
    }
}
