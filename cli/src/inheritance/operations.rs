use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::tree::{ConfigTree, NodeKey, TreeError, TreeEvent};

use super::toggles::InheritanceToggles;

/// Tri-state value of the "everything inherited" meta toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritAll {
    Yes,
    No,
    /// Derive every flag by comparing local values with the parent's.
    Auto,
}

impl FromStr for InheritAll {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "true" | "on" => Ok(InheritAll::Yes),
            "no" | "false" | "off" => Ok(InheritAll::No),
            "auto" => Ok(InheritAll::Auto),
            other => Err(format!("Expected yes, no or auto, got '{}'", other)),
        }
    }
}

impl fmt::Display for InheritAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InheritAll::Yes => write!(f, "yes"),
            InheritAll::No => write!(f, "no"),
            InheritAll::Auto => write!(f, "auto"),
        }
    }
}

impl ConfigTree {
    /// False for the root and for the two levels directly below it. A
    /// detached node counts as active; it simply has no parent to ask.
    pub fn inheritance_active(&self, key: NodeKey) -> bool {
        let root = self.root();
        if key == root {
            return false;
        }
        let parent = match self.get(key).and_then(|n| n.parent()) {
            Some(parent) => parent,
            None => return true,
        };
        if parent == root {
            return false;
        }
        !matches!(self.get(parent).and_then(|n| n.parent()), Some(grandparent) if grandparent == root)
    }

    pub fn toggles(&self, key: NodeKey) -> Result<&InheritanceToggles, TreeError> {
        Ok(self.node(key)?.toggles())
    }

    pub fn set_inherited(
        &mut self,
        key: NodeKey,
        name: &str,
        inherit: bool,
    ) -> Result<bool, TreeError> {
        let property = self.schema().toggle_names().iter().copied().find(|t| *t == name);
        let node = self.node_mut(key)?;
        if !node.toggles.set(name, inherit)? {
            return Ok(false);
        }
        let id = node.id().to_string();
        self.emit(TreeEvent::InheritanceChanged { node: id, property });
        Ok(true)
    }

    pub fn everything_inherited(&self, key: NodeKey) -> Result<bool, TreeError> {
        Ok(self.node(key)?.toggles().everything_inherited())
    }

    pub fn set_everything_inherited(
        &mut self,
        key: NodeKey,
        mode: InheritAll,
    ) -> Result<(), TreeError> {
        match mode {
            InheritAll::Auto => self.apply_automatic_inheritance_from_parent(key),
            InheritAll::Yes | InheritAll::No => {
                let node = self.node_mut(key)?;
                if node.toggles.set_all(mode == InheritAll::Yes) {
                    let id = node.id().to_string();
                    self.emit(TreeEvent::InheritanceChanged {
                        node: id,
                        property: None,
                    });
                }
                Ok(())
            }
        }
    }

    /// Sets each flag to whether the node's local value equals the parent's
    /// local value. Does nothing for a node without a parent.
    pub fn apply_automatic_inheritance_from_parent(
        &mut self,
        key: NodeKey,
    ) -> Result<(), TreeError> {
        let parent = match self.node(key)?.parent() {
            Some(parent) => parent,
            None => return Ok(()),
        };

        let derived: Vec<(&'static str, bool)> = self
            .schema()
            .toggle_names()
            .iter()
            .map(|name| {
                let same = match (self.local_value(key, name), self.local_value(parent, name)) {
                    (Ok(own), Ok(theirs)) => own == theirs,
                    _ => false,
                };
                (*name, same)
            })
            .collect();

        let node = self.node_mut(key)?;
        let mut changed = false;
        for (name, inherit) in &derived {
            changed |= node.toggles.set(name, *inherit)?;
        }
        let id = node.id().to_string();
        debug!(
            event = "inheritance.auto_derived",
            node = %id,
            inherited = derived.iter().filter(|(_, inherit)| *inherit).count()
        );
        if changed {
            self.emit(TreeEvent::InheritanceChanged {
                node: id,
                property: None,
            });
        }
        Ok(())
    }

    /// Stashes the current flags and turns every flag off.
    pub fn disable_inheritance(&mut self, key: NodeKey) -> Result<(), TreeError> {
        let node = self.node_mut(key)?;
        node.toggles.disable();
        let id = node.id().to_string();
        self.emit(TreeEvent::InheritanceChanged {
            node: id,
            property: None,
        });
        Ok(())
    }

    /// Restores stashed flags. Returns false when nothing was stashed.
    pub fn enable_inheritance(&mut self, key: NodeKey) -> Result<bool, TreeError> {
        let node = self.node_mut(key)?;
        if !node.toggles.restore() {
            return Ok(false);
        }
        let id = node.id().to_string();
        self.emit(TreeEvent::InheritanceChanged {
            node: id,
            property: None,
        });
        Ok(true)
    }

    /// Copies the toggle set of `container` onto every node below it.
    /// Returns how many descendants changed.
    pub fn apply_inheritance_to_children(&mut self, container: NodeKey) -> Result<usize, TreeError> {
        let source = self.node(container)?;
        if !source.kind().is_container() {
            return Err(TreeError::NotAContainer {
                id: source.id().to_string(),
            });
        }
        let template = source.toggles().clone();
        let below: Vec<NodeKey> = self.descendants(container).skip(1).map(|(k, _)| k).collect();

        let mut changed = 0;
        for key in below {
            let node = self.node_mut(key)?;
            let before = node.toggles.flags().clone();
            node.toggles.copy_from(&template);
            if node.toggles.flags() == &before {
                continue;
            }
            let id = node.id().to_string();
            self.emit(TreeEvent::InheritanceChanged {
                node: id,
                property: None,
            });
            changed += 1;
        }
        debug!(
            event = "inheritance.pushed_to_children",
            container = %self.node(container)?.id(),
            changed
        );
        Ok(changed)
    }

    /// Properties currently delegated to the parent; empty while inheritance
    /// is not active for the node.
    pub fn enabled_inheritance_properties(
        &self,
        key: NodeKey,
    ) -> Result<Vec<&'static str>, TreeError> {
        let toggles = self.node(key)?.toggles();
        if !self.inheritance_active(key) {
            return Ok(Vec::new());
        }
        Ok(toggles.enabled().collect())
    }
}
