use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::PropertyValue;
use crate::tree::NodeKind;

pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Persisted form of a whole tree.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TreeSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,

    pub root: NodeSnapshot,
}

/// Persisted form of one node. Only locally stored values are kept.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeSnapshot {
    pub id: String,

    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_id: Option<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,

    #[serde(default)]
    pub inheritance: BTreeMap<String, bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inheritance_stash: Option<BTreeMap<String, bool>>,

    // TOML uses [[child]] array syntax
    #[serde(rename = "child", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            linked_id: None,
            properties: BTreeMap::new(),
            inheritance: BTreeMap::new(),
            inheritance_stash: None,
            children: Vec::new(),
        }
    }

    pub fn label_display(&self) -> &str {
        self.properties
            .get("name")
            .and_then(PropertyValue::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.id.as_str())
    }
}
