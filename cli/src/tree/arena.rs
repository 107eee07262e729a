use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, info};
use uuid::Uuid;

use crate::inheritance::{InheritanceDefaults, InheritanceToggles};
use crate::schema::{discover, PropertyRegistry, PropertyValue, SchemaError};
use crate::scope::{Config, ConfigError, ResolutionPolicy, ResolveError, Resolver};

use super::error::TreeError;
use super::events::TreeEvent;
use super::lookup::NodeLookup;
use super::node::{ConfigNode, NodeKey, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Owning arena for every node of one connection tree.
///
/// Nodes refer to each other by [`NodeKey`]; the parent link is a plain key
/// and never keeps a node alive. Deleted slots stay empty.
pub struct ConfigTree {
    nodes: Vec<Option<ConfigNode>>,
    root: NodeKey,
    schema: &'static PropertyRegistry,
    defaults: InheritanceDefaults,
    policy: ResolutionPolicy,
    subscribers: Vec<Sender<TreeEvent>>,
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::with_settings(InheritanceDefaults::default(), ResolutionPolicy::default())
    }

    pub fn with_settings(defaults: InheritanceDefaults, policy: ResolutionPolicy) -> Self {
        Self::with_root_id(generate_id(), defaults, policy)
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let schema = discover();
        Ok(Self::with_settings(
            config.inheritance_defaults(schema)?,
            config.resolution_policy(schema)?,
        ))
    }

    pub(crate) fn with_root_id(
        root_id: String,
        defaults: InheritanceDefaults,
        policy: ResolutionPolicy,
    ) -> Self {
        let schema = discover();
        let root = ConfigNode::new(
            root_id,
            NodeKind::Root,
            InheritanceToggles::uniform(schema, false),
        );
        Self {
            nodes: vec![Some(root)],
            root: NodeKey(0),
            schema,
            defaults,
            policy,
            subscribers: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn schema(&self) -> &'static PropertyRegistry {
        self.schema
    }

    pub fn defaults(&self) -> &InheritanceDefaults {
        &self.defaults
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    /// Number of live nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: NodeKey) -> Option<&ConfigNode> {
        self.nodes.get(key.0).and_then(Option::as_ref)
    }

    pub fn node(&self, key: NodeKey) -> Result<&ConfigNode, TreeError> {
        self.get(key).ok_or(TreeError::NodeNotFound { key })
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Result<&mut ConfigNode, TreeError> {
        self.nodes
            .get_mut(key.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::NodeNotFound { key })
    }

    /// Pre-order walk of the attached tree, starting at the root.
    pub fn iter(&self) -> Descendants<'_> {
        self.descendants(self.root)
    }

    /// Pre-order walk of `key` and everything below it.
    pub fn descendants(&self, key: NodeKey) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![key],
        }
    }

    pub fn is_root(&self, key: NodeKey) -> bool {
        key == self.root
    }

    /// Key of the node with `id`, or an error naming the id.
    pub fn key_of(&self, id: &str) -> Result<NodeKey, TreeError> {
        self.find_by_id(id).ok_or_else(|| TreeError::UnknownId { id: id.to_string() })
    }

    /// Registers a listener for change notifications.
    pub fn subscribe(&mut self) -> Receiver<TreeEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, event: TreeEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn id_of(&self, key: NodeKey) -> String {
        self.get(key).map(|n| n.id.clone()).unwrap_or_else(|| key.to_string())
    }

    // --- creation ---------------------------------------------------------

    /// Creates a detached node with a fresh id and the default toggle template.
    pub fn create_node(&mut self, kind: NodeKind, name: &str) -> Result<NodeKey, TreeError> {
        let key = self.create_node_with_id(kind, generate_id())?;
        if !name.is_empty() {
            self.node_mut(key)?.properties.insert("name", PropertyValue::from(name));
        }
        Ok(key)
    }

    pub fn create_node_with_id(
        &mut self,
        kind: NodeKind,
        id: impl Into<String>,
    ) -> Result<NodeKey, TreeError> {
        if kind == NodeKind::Root {
            return Err(TreeError::DuplicateRoot);
        }
        let toggles = self.defaults.template(self.schema);
        Ok(self.insert_slot(ConfigNode::new(id.into(), kind, toggles)))
    }

    pub(crate) fn insert_slot(&mut self, node: ConfigNode) -> NodeKey {
        self.nodes.push(Some(node));
        NodeKey(self.nodes.len() - 1)
    }

    /// Appends a loaded node as it was persisted, without the re-parenting
    /// inheritance rules or notifications.
    pub(crate) fn attach_loaded(&mut self, parent: NodeKey, mut node: ConfigNode) -> NodeKey {
        node.parent = Some(parent);
        let key = self.insert_slot(node);
        if let Some(Some(parent_node)) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(key);
        }
        key
    }

    /// Creates a node and appends it to `parent`.
    pub fn add_node(
        &mut self,
        parent: NodeKey,
        kind: NodeKind,
        name: &str,
    ) -> Result<NodeKey, TreeError> {
        let key = self.create_node(kind, name)?;
        self.add_child(parent, key)?;
        Ok(key)
    }

    // --- structure --------------------------------------------------------

    /// Appends `child` to `parent`. Does nothing when it is already there.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), TreeError> {
        if self.node(child)?.parent == Some(parent) {
            return Ok(());
        }
        let len = self.node(parent)?.children.len();
        self.add_child_at(parent, child, len)
    }

    /// Attaches `child` under `parent` at `index`, detaching it from any
    /// previous parent first. This is the re-parenting operation. A child
    /// already under `parent` is only repositioned.
    pub fn add_child_at(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        index: usize,
    ) -> Result<(), TreeError> {
        let parent_node = self.node(parent)?;
        if !parent_node.kind.is_container() {
            return Err(TreeError::NotAContainer {
                id: parent_node.id.clone(),
            });
        }
        if child == self.root {
            return Err(TreeError::RootImmovable);
        }
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::WouldCreateCycle {
                node: self.id_of(child),
                parent: self.id_of(parent),
            });
        }

        let previous = self.node(child)?.parent;
        if previous == Some(parent) {
            return self.set_child_position(parent, child, index);
        }
        let len = self.node(parent)?.children.len();
        if index > len {
            return Err(TreeError::PositionOutOfRange {
                parent: self.id_of(parent),
                index,
                len,
            });
        }

        if let Some(old_parent) = previous {
            self.detach(old_parent, child)?;
        }
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);

        let event = TreeEvent::ChildAdded {
            parent: self.id_of(parent),
            child: self.id_of(child),
        };
        self.emit(event);

        self.reparent_inheritance(child, previous, parent)?;

        if self.auto_sort_enabled(parent) {
            self.sort_children(parent, SortDirection::Ascending)?;
        }
        Ok(())
    }

    /// Moves `node` under `parent`, appended last.
    pub fn set_parent(&mut self, node: NodeKey, parent: NodeKey) -> Result<(), TreeError> {
        self.add_child(parent, node)
    }

    /// Detaches `child` from `parent` without destroying it.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), TreeError> {
        self.detach(parent, child)
    }

    fn detach(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), TreeError> {
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|k| *k == child)
            .ok_or_else(|| TreeError::NotAChild {
                parent: self.id_of(parent),
                child: self.id_of(child),
            })?;
        self.node_mut(parent)?.children.remove(position);
        self.node_mut(child)?.parent = None;

        let event = TreeEvent::ChildRemoved {
            parent: self.id_of(parent),
            child: self.id_of(child),
        };
        self.emit(event);
        Ok(())
    }

    /// Destroys `key` and its whole subtree.
    pub fn delete(&mut self, key: NodeKey) -> Result<(), TreeError> {
        if key == self.root {
            return Err(TreeError::RootImmovable);
        }
        if let Some(parent) = self.node(key)?.parent {
            self.detach(parent, key)?;
        }
        let doomed: Vec<NodeKey> = self.descendants(key).map(|(k, _)| k).collect();
        for k in &doomed {
            self.nodes[k.0] = None;
        }
        debug!(event = "tree.deleted", nodes = doomed.len());
        Ok(())
    }

    pub fn set_child_position(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        index: usize,
    ) -> Result<(), TreeError> {
        let children = &self.node(parent)?.children;
        let len = children.len();
        let current = children.iter().position(|k| *k == child).ok_or_else(|| {
            TreeError::NotAChild {
                parent: self.id_of(parent),
                child: self.id_of(child),
            }
        })?;
        if index >= len {
            return Err(TreeError::PositionOutOfRange {
                parent: self.id_of(parent),
                index,
                len,
            });
        }
        let node = self.node_mut(parent)?;
        node.children.remove(current);
        node.children.insert(index, child);

        if self.auto_sort_enabled(parent) {
            self.sort_children(parent, SortDirection::Ascending)?;
        }
        Ok(())
    }

    /// Stable sort of the direct children by name, ignoring case.
    pub fn sort_children(
        &mut self,
        parent: NodeKey,
        direction: SortDirection,
    ) -> Result<(), TreeError> {
        let mut keyed: Vec<(String, NodeKey)> = self
            .node(parent)?
            .children
            .iter()
            .filter_map(|k| self.get(*k).map(|n| (n.display_name().to_lowercase(), *k)))
            .collect();
        keyed.sort_by(|a, b| match direction {
            SortDirection::Ascending => a.0.cmp(&b.0),
            SortDirection::Descending => b.0.cmp(&a.0),
        });
        self.node_mut(parent)?.children = keyed.into_iter().map(|(_, k)| k).collect();
        Ok(())
    }

    pub fn sort_recursive(
        &mut self,
        key: NodeKey,
        direction: SortDirection,
    ) -> Result<(), TreeError> {
        let containers: Vec<NodeKey> = self
            .descendants(key)
            .filter(|(_, n)| n.kind.is_container())
            .map(|(k, _)| k)
            .collect();
        for container in containers {
            self.sort_children(container, direction)?;
        }
        Ok(())
    }

    fn auto_sort_enabled(&self, container: NodeKey) -> bool {
        Resolver::new(self)
            .resolve(container, "auto_sort")
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeKey, mut key: NodeKey) -> bool {
        loop {
            if key == ancestor {
                return true;
            }
            match self.get(key).and_then(|n| n.parent) {
                Some(parent) => key = parent,
                None => return false,
            }
        }
    }

    /// Moving under the root switches inheritance off; moving away from it
    /// brings back the stash, or the default template when nothing was stashed.
    /// Moves between other containers leave the flags alone.
    fn reparent_inheritance(
        &mut self,
        child: NodeKey,
        previous: Option<NodeKey>,
        parent: NodeKey,
    ) -> Result<(), TreeError> {
        let root = self.root;
        let template = self.defaults.template(self.schema);
        let node = self.node_mut(child)?;

        if parent == root {
            node.toggles.disable();
        } else if previous != Some(root) {
            return Ok(());
        } else if !node.toggles.restore() {
            node.toggles.copy_from(&template);
        }

        let id = node.id.clone();
        self.emit(TreeEvent::InheritanceChanged {
            node: id,
            property: None,
        });
        Ok(())
    }

    // --- values -----------------------------------------------------------

    /// The stored raw value, or the schema default when nothing is stored.
    pub fn local_value(&self, key: NodeKey, name: &str) -> Result<PropertyValue, TreeError> {
        let descriptor = self.schema.require(name)?;
        Ok(self
            .node(key)?
            .properties
            .get(descriptor.name)
            .cloned()
            .unwrap_or_else(|| descriptor.default_value()))
    }

    /// The effective value, after link and ancestor delegation.
    pub fn value(&self, key: NodeKey, name: &str) -> Result<PropertyValue, ResolveError> {
        Resolver::new(self).resolve(key, name)
    }

    /// Writes a local value. Returns false, and fires nothing, when the value
    /// is already the local one.
    pub fn set_value(
        &mut self,
        key: NodeKey,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<bool, TreeError> {
        let descriptor = self.schema.require(name)?;
        if !descriptor.writable {
            return Err(SchemaError::ReadOnly {
                property: name.to_string(),
            }
            .into());
        }
        let value = descriptor.value_type.check(descriptor.name, value.into())?;
        if self.local_value(key, descriptor.name)? == value {
            return Ok(false);
        }

        let property = descriptor.name;
        let node = self.node_mut(key)?;
        node.properties.insert(property, value);
        let id = node.id.clone();
        self.emit(TreeEvent::PropertyChanged { node: id, property });
        Ok(true)
    }

    /// Writes the local value of every serializable, non-identity property of
    /// `container` onto every node below it. Returns how many values changed.
    pub fn apply_properties_to_children(&mut self, container: NodeKey) -> Result<usize, TreeError> {
        let source = self.node(container)?;
        if !source.kind.is_container() {
            return Err(TreeError::NotAContainer {
                id: source.id.clone(),
            });
        }
        let schema = self.schema;
        let mut values = Vec::new();
        for descriptor in schema.serializable() {
            if descriptor.writable && !schema.is_identity(descriptor.name) {
                values.push((descriptor.name, self.local_value(container, descriptor.name)?));
            }
        }
        let below: Vec<NodeKey> = self.descendants(container).skip(1).map(|(k, _)| k).collect();

        let mut changed = 0;
        for key in &below {
            for (name, value) in &values {
                if self.set_value(*key, name, value.clone())? {
                    changed += 1;
                }
            }
        }
        debug!(
            event = "tree.properties_pushed",
            container = %self.id_of(container),
            nodes = below.len(),
            changed
        );
        Ok(changed)
    }

    /// Drops the stored value so the schema default applies again.
    pub fn clear_value(&mut self, key: NodeKey, name: &str) -> Result<bool, TreeError> {
        let descriptor = self.schema.require(name)?;
        let property = descriptor.name;
        let node = self.node_mut(key)?;
        if node.properties.remove(property).is_none() {
            return Ok(false);
        }
        let id = node.id.clone();
        self.emit(TreeEvent::PropertyChanged { node: id, property });
        Ok(true)
    }

    // --- links ------------------------------------------------------------

    pub fn set_linked_id(
        &mut self,
        key: NodeKey,
        target: Option<String>,
    ) -> Result<bool, TreeError> {
        if key == self.root {
            return Err(TreeError::RootImmovable);
        }
        let node = self.node_mut(key)?;
        if node.linked_id == target {
            return Ok(false);
        }
        node.linked_id = target.clone();
        let id = node.id.clone();
        self.emit(TreeEvent::LinkChanged { node: id, target });
        Ok(true)
    }

    /// Follows the link chain from `key` to the first node that is not an
    /// alias. `None` when a target is missing or the chain loops.
    pub fn resolve_link_target(&self, key: NodeKey) -> Option<NodeKey> {
        self.resolve_link_target_with(self, key)
    }

    pub fn resolve_link_target_with(
        &self,
        lookup: &dyn NodeLookup,
        key: NodeKey,
    ) -> Option<NodeKey> {
        let mut visited = HashSet::new();
        let mut current = key;
        loop {
            if !visited.insert(current) {
                return None;
            }
            match self.get(current)?.linked_id.as_deref() {
                Some(target) => current = lookup.find_by_id(target)?,
                None => return Some(current),
            }
        }
    }

    /// Creates an alias leaf of `source` under `parent`, pointing at the
    /// ultimate non-alias source.
    pub fn create_link(&mut self, source: NodeKey, parent: NodeKey) -> Result<NodeKey, TreeError> {
        let target = self
            .resolve_link_target(source)
            .ok_or_else(|| TreeError::UnresolvedLink {
                id: self.id_of(source),
            })?;
        let target_id = self.id_of(target);
        let name = self.node(source)?.display_name().to_string();

        let alias = self.create_node(NodeKind::Leaf, &name)?;
        self.node_mut(alias)?.linked_id = Some(target_id.clone());
        self.add_child(parent, alias)?;
        info!(event = "tree.link_created", alias = %self.id_of(alias), target = %target_id);
        Ok(alias)
    }

    /// Deep copy of a subtree with fresh ids. The copy is detached and the
    /// top node's link is cleared.
    pub fn duplicate(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        if key == self.root {
            return Err(TreeError::RootImmovable);
        }
        let copy = self.copy_subtree(key, None)?;
        self.node_mut(copy)?.linked_id = None;
        Ok(copy)
    }

    fn copy_subtree(&mut self, key: NodeKey, parent: Option<NodeKey>) -> Result<NodeKey, TreeError> {
        let original = self.node(key)?;
        let children = original.children.clone();
        let mut copy = original.clone();
        copy.id = generate_id();
        copy.parent = parent;
        copy.children = Vec::new();
        let copy_key = self.insert_slot(copy);

        for child in children {
            let child_copy = self.copy_subtree(child, Some(copy_key))?;
            self.node_mut(copy_key)?.children.push(child_copy);
        }
        Ok(copy_key)
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Descendants<'a> {
    tree: &'a ConfigTree,
    stack: Vec<NodeKey>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeKey, &'a ConfigNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(key) = self.stack.pop() {
            if let Some(node) = self.tree.get(key) {
                self.stack.extend(node.children.iter().rev().copied());
                return Some((key, node));
            }
        }
        None
    }
}
