use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::inheritance::InheritanceToggles;
use crate::schema::PropertyValue;

/// Arena slot of a node. Only valid for the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) usize);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Container,
    Leaf,
}

impl NodeKind {
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Container)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => write!(f, "root"),
            NodeKind::Container => write!(f, "container"),
            NodeKind::Leaf => write!(f, "leaf"),
        }
    }
}

/// A node of the connection tree.
///
/// `properties` holds only locally stored raw values; anything absent reads
/// as the schema default. Structure is owned by [`super::ConfigTree`].
#[derive(Debug, Clone)]
pub struct ConfigNode {
    pub(crate) id: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) properties: BTreeMap<&'static str, PropertyValue>,
    pub(crate) linked_id: Option<String>,
    pub(crate) toggles: InheritanceToggles,
}

impl ConfigNode {
    pub(crate) fn new(id: String, kind: NodeKind, toggles: InheritanceToggles) -> Self {
        Self {
            id,
            kind,
            parent: None,
            children: Vec::new(),
            properties: BTreeMap::new(),
            linked_id: None,
            toggles,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn linked_id(&self) -> Option<&str> {
        self.linked_id.as_deref()
    }

    pub fn is_alias(&self) -> bool {
        self.linked_id.is_some()
    }

    pub fn toggles(&self) -> &InheritanceToggles {
        &self.toggles
    }

    /// The stored raw value, without schema default.
    pub fn stored(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn stored_values(&self) -> &BTreeMap<&'static str, PropertyValue> {
        &self.properties
    }

    /// Local `name`, or the id when no name has been stored.
    pub fn display_name(&self) -> &str {
        self.properties
            .get("name")
            .and_then(PropertyValue::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.id.as_str())
    }
}
