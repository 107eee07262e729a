use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::inheritance::InheritanceDefaults;
use crate::schema::{SchemaValidator, ValidationResult};
use crate::scope::ResolutionPolicy;
use crate::tree::{ConfigNode, ConfigTree, IdIndex, NodeKey, NodeKind};

use super::error::StoreError;
use super::models::{NodeSnapshot, TreeSnapshot, SNAPSHOT_VERSION};

/// Captures the stored values, toggles and structure of `tree`.
/// Effective values are never written.
pub fn snapshot_tree(tree: &ConfigTree) -> TreeSnapshot {
    TreeSnapshot {
        version: SNAPSHOT_VERSION,
        root: snapshot_node(tree, tree.root()),
    }
}

fn snapshot_node(tree: &ConfigTree, key: NodeKey) -> NodeSnapshot {
    let node = match tree.get(key) {
        Some(node) => node,
        None => return NodeSnapshot::new(key.to_string(), NodeKind::Leaf),
    };
    let schema = tree.schema();

    let mut snapshot = NodeSnapshot::new(node.id(), node.kind());
    snapshot.linked_id = node.linked_id().map(str::to_string);
    snapshot.properties = node
        .stored_values()
        .iter()
        .filter(|(name, _)| schema.get(name).map(|d| d.serializable).unwrap_or(false))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    snapshot.inheritance = to_owned_flags(node.toggles().flags());
    snapshot.inheritance_stash = node.toggles().stashed().map(to_owned_flags);
    snapshot.children = node
        .children()
        .iter()
        .map(|child| snapshot_node(tree, *child))
        .collect();
    snapshot
}

fn to_owned_flags(flags: &BTreeMap<&'static str, bool>) -> BTreeMap<String, bool> {
    flags.iter().map(|(name, flag)| (name.to_string(), *flag)).collect()
}

/// Rebuilds a tree from a snapshot.
///
/// Unknown properties and toggles are dropped, mistyped values are coerced
/// or dropped, and missing toggles come from the default template. Every
/// such repair is reported in the returned [`ValidationResult`].
pub fn build_tree(
    snapshot: TreeSnapshot,
    defaults: InheritanceDefaults,
    policy: ResolutionPolicy,
) -> Result<(ConfigTree, ValidationResult), StoreError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            version: snapshot.version,
        });
    }
    let mut root = snapshot.root;
    if root.kind != NodeKind::Root {
        return Err(StoreError::InvalidRoot { kind: root.kind });
    }
    let children = std::mem::take(&mut root.children);

    let mut tree = ConfigTree::with_root_id(root.id.clone(), defaults, policy);
    let mut validation = ValidationResult::new();

    let root_key = tree.root();
    let loaded = load_node(&tree, root, &mut validation);
    if let Ok(root_node) = tree.node_mut(root_key) {
        root_node.properties = loaded.properties;
        root_node.toggles = loaded.toggles;
    }
    for child in children {
        load_subtree(&mut tree, root_key, child, &mut validation);
    }

    for id in IdIndex::build(&tree).duplicates() {
        validation.add_warning(
            format!("Id '{}' is used by more than one node; links to it will not resolve", id),
            None,
        );
    }

    for issue in validation.errors.iter().chain(validation.warnings.iter()) {
        warn!(
            event = "store.load_issue",
            location = issue.location.as_deref().unwrap_or("-"),
            message = %issue.message
        );
    }
    debug!(event = "store.tree_built", nodes = tree.len());
    Ok((tree, validation))
}

fn load_subtree(
    tree: &mut ConfigTree,
    parent: NodeKey,
    mut snapshot: NodeSnapshot,
    validation: &mut ValidationResult,
) {
    let location = format!("node {}", snapshot.id);
    let kind = snapshot.kind;
    if kind == NodeKind::Root {
        validation.add_error(
            "Nested root node skipped with its subtree".to_string(),
            Some(location),
        );
        return;
    }
    let children = std::mem::take(&mut snapshot.children);

    let node = load_node(tree, snapshot, validation);
    let key = tree.attach_loaded(parent, node);

    if kind == NodeKind::Leaf && !children.is_empty() {
        validation.add_error(
            format!("Leaf has {} children; they were skipped", children.len()),
            Some(location),
        );
        return;
    }
    for child in children {
        load_subtree(tree, key, child, validation);
    }
}

fn load_node(
    tree: &ConfigTree,
    snapshot: NodeSnapshot,
    validation: &mut ValidationResult,
) -> ConfigNode {
    let schema = tree.schema();
    let validator = SchemaValidator::new(schema);
    let location = format!("node {}", snapshot.id);

    let mut node = ConfigNode::new(snapshot.id, snapshot.kind, tree.defaults().template(schema));
    node.linked_id = snapshot.linked_id;
    node.properties = validator.validate_properties(&location, snapshot.properties, validation);

    let flags = validator.validate_toggles(&location, snapshot.inheritance, validation);
    let missing = schema.toggle_names().len() - flags.len();
    for (name, flag) in flags {
        let _ = node.toggles.set(name, flag);
    }
    if missing > 0 {
        debug!(event = "store.toggles_defaulted", node = %node.id(), missing);
    }

    if let Some(stash) = snapshot.inheritance_stash {
        let stash = validator.validate_toggles(&location, stash, validation);
        let mut full = node.toggles.flags().clone();
        full.extend(stash);
        node.toggles.set_stash(Some(full));
    }
    node
}
