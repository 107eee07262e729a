use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::schema::{PropertyDescriptor, PropertyValue, SchemaError};
use crate::tree::{ConfigTree, NodeKey, NodeLookup, TreeError};

use super::config::ResolutionPolicy;

lazy_static! {
    static ref NAME_TOKEN: Regex = Regex::new(r"(?i)%name%").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Cannot resolve: {source}")]
    Schema {
        #[from]
        source: SchemaError,
    },

    #[error("Cannot resolve: {source}")]
    Tree {
        #[from]
        source: TreeError,
    },
}

/// How the requesting node came by its effective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    /// The node's own stored value or schema default.
    Local,
    /// First delegation step went to an ancestor.
    Inherited,
    /// First delegation step followed the node's live link.
    Linked,
    /// A loop or the depth bound stopped the walk.
    CycleFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: PropertyValue,
    /// Node whose local value was used.
    pub source: NodeKey,
    pub origin: ValueOrigin,
}

/// One lookup's walk state: nodes seen so far, hops taken, first step.
#[derive(Default)]
struct Walk {
    visited: HashSet<NodeKey>,
    hops: usize,
    first: Option<ValueOrigin>,
    stopped: bool,
}

impl Walk {
    fn step(&mut self, origin: ValueOrigin) {
        self.first.get_or_insert(origin);
    }
}

/// Computes effective property values. Never mutates the tree.
pub struct Resolver<'a> {
    tree: &'a ConfigTree,
    lookup: &'a dyn NodeLookup,
    policy: &'a ResolutionPolicy,
}

impl<'a> Resolver<'a> {
    /// Uses the tree itself for id lookups and the tree's policy.
    pub fn new(tree: &'a ConfigTree) -> Self {
        Self {
            tree,
            lookup: tree,
            policy: tree.policy(),
        }
    }

    /// Swaps in a different id lookup, typically a prebuilt [`crate::tree::IdIndex`].
    pub fn with_lookup(mut self, lookup: &'a dyn NodeLookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_policy(mut self, policy: &'a ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolve(&self, key: NodeKey, property: &str) -> Result<PropertyValue, ResolveError> {
        self.resolve_with_origin(key, property).map(|r| r.value)
    }

    pub fn resolve_with_origin(
        &self,
        key: NodeKey,
        property: &str,
    ) -> Result<Resolution, ResolveError> {
        let descriptor = self.tree.schema().require(property)?;
        let mut walk = Walk::default();
        let (value, source) = self.walk(key, descriptor, &mut walk)?;

        let origin = if walk.stopped {
            ValueOrigin::CycleFallback
        } else {
            walk.first.unwrap_or(ValueOrigin::Local)
        };
        let value = if descriptor.name == "hostname" {
            self.expand_name_token(key, value)?
        } else {
            value
        };

        Ok(Resolution {
            value,
            source,
            origin,
        })
    }

    /// Effective value of every property of `key`.
    pub fn effective_values(
        &self,
        key: NodeKey,
    ) -> Result<BTreeMap<&'static str, PropertyValue>, ResolveError> {
        self.tree
            .schema()
            .descriptors()
            .iter()
            .map(|d| self.resolve(key, d.name).map(|value| (d.name, value)))
            .collect()
    }

    fn walk(
        &self,
        key: NodeKey,
        descriptor: &PropertyDescriptor,
        walk: &mut Walk,
    ) -> Result<(PropertyValue, NodeKey), ResolveError> {
        let node = self.tree.node(key)?;
        let property = descriptor.name;

        if walk.hops >= self.policy.max_depth || !walk.visited.insert(key) {
            warn!(
                event = "resolve.cycle_detected",
                node = %node.id(),
                property,
                hops = walk.hops
            );
            walk.stopped = true;
            return Ok((self.local(key, descriptor)?, key));
        }
        walk.hops += 1;

        if let Some(linked_id) = node.linked_id() {
            if !self.tree.schema().is_identity(property) {
                match self.lookup.find_by_id(linked_id) {
                    Some(target) => {
                        walk.step(ValueOrigin::Linked);
                        return self.walk(target, descriptor, walk);
                    }
                    None => debug!(
                        event = "resolve.link_unresolved",
                        node = %node.id(),
                        target = %linked_id,
                        property
                    ),
                }
            }
        }

        if descriptor.inheritable
            && node.toggles().is_set(property)
            && self.tree.inheritance_active(key)
        {
            if let Some(parent) = node.parent() {
                walk.step(ValueOrigin::Inherited);
                let next = if self.policy.skips_empty(property) {
                    self.first_non_empty_ancestor(parent, descriptor)?
                        .unwrap_or(parent)
                } else {
                    parent
                };
                return self.walk(next, descriptor, walk);
            }
        }

        Ok((self.local(key, descriptor)?, key))
    }

    /// Climbs from `start` towards the root, never considering the root itself,
    /// and returns the first ancestor whose local value is not empty.
    fn first_non_empty_ancestor(
        &self,
        start: NodeKey,
        descriptor: &PropertyDescriptor,
    ) -> Result<Option<NodeKey>, ResolveError> {
        let root = self.tree.root();
        let mut current = Some(start);
        let mut climbed = 0;

        while let Some(key) = current {
            if key == root || climbed >= self.policy.max_depth {
                break;
            }
            let local = self.local(key, descriptor)?;
            if !self.policy.empty_values.is_empty(&local) {
                return Ok(Some(key));
            }
            current = self.tree.node(key)?.parent();
            climbed += 1;
        }
        Ok(None)
    }

    fn local(&self, key: NodeKey, descriptor: &PropertyDescriptor) -> Result<PropertyValue, ResolveError> {
        Ok(self
            .tree
            .node(key)?
            .stored(descriptor.name)
            .cloned()
            .unwrap_or_else(|| descriptor.default_value()))
    }

    fn expand_name_token(
        &self,
        key: NodeKey,
        value: PropertyValue,
    ) -> Result<PropertyValue, ResolveError> {
        match value {
            PropertyValue::Text(hostname) if NAME_TOKEN.is_match(&hostname) => {
                let name = self.tree.local_value(key, "name")?.to_string();
                Ok(PropertyValue::Text(
                    NAME_TOKEN.replace_all(&hostname, regex::NoExpand(&name)).into_owned(),
                ))
            }
            other => Ok(other),
        }
    }
}
