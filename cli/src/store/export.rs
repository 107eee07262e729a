use serde::Serialize;
use std::collections::BTreeMap;

use crate::schema::PropertyValue;
use crate::scope::{ResolveError, Resolver};
use crate::tree::{ConfigTree, NodeKind};

const REDACTED: &str = "********";

/// Effective configuration of one node, as exported for other tools.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_id: Option<String>,
    pub values: BTreeMap<&'static str, PropertyValue>,
}

/// Effective values of every attached node, root excluded. Non-empty
/// encrypted values are masked unless `reveal_secrets` is set.
pub fn export_effective(
    tree: &ConfigTree,
    reveal_secrets: bool,
) -> Result<Vec<ExportedNode>, ResolveError> {
    let resolver = Resolver::new(tree);
    let schema = tree.schema();
    let mut exported = Vec::new();

    for (key, node) in tree.iter().filter(|(_, n)| n.kind() != NodeKind::Root) {
        let mut values = resolver.effective_values(key)?;
        if !reveal_secrets {
            for descriptor in schema.encrypted() {
                if let Some(value) = values.get_mut(descriptor.name) {
                    if value.as_str().map(|s| !s.is_empty()).unwrap_or(false) {
                        *value = PropertyValue::from(REDACTED);
                    }
                }
            }
        }
        exported.push(ExportedNode {
            id: node.id().to_string(),
            kind: node.kind(),
            name: node.display_name().to_string(),
            parent: node
                .parent()
                .and_then(|p| tree.get(p))
                .map(|p| p.id().to_string()),
            linked_id: node.linked_id().map(str::to_string),
            values,
        });
    }
    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_masks_secrets() {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        let leaf = tree.add_node(root, NodeKind::Leaf, "db").unwrap();
        tree.set_value(leaf, "password", "hunter2").unwrap();

        let exported = export_effective(&tree, false).unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].name, "db");
        assert_eq!(exported[0].values.get("password"), Some(&PropertyValue::from(REDACTED)));
        assert_eq!(exported[0].values.get("vnc_proxy_password"), Some(&PropertyValue::from("")));

        let revealed = export_effective(&tree, true).unwrap();
        assert_eq!(revealed[0].values.get("password"), Some(&PropertyValue::from("hunter2")));

        let json = serde_json::to_value(&exported).unwrap();
        assert_eq!(json[0]["values"]["port"], serde_json::json!(3389));
        assert_eq!(json[0]["kind"], serde_json::json!("leaf"));
    }
}
