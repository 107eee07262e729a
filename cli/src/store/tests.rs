#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::inheritance::InheritanceDefaults;
    use crate::schema::PropertyValue;
    use crate::scope::ResolutionPolicy;
    use crate::tree::{ConfigTree, NodeKind, NodeLookup};
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(content: &str) -> TreeSnapshot {
        TomlTreeStore::parse(content, Path::new("inline.toml")).unwrap()
    }

    #[test]
    fn test_save_and_load_reproduces_tree() {
        let dir = TempDir::new().unwrap();
        let store = TomlTreeStore::new(dir.path().join("connections.toml"));

        let mut tree = ConfigTree::new();
        let root = tree.root();
        let top = tree.add_node(root, NodeKind::Container, "Top").unwrap();
        let mid = tree.add_node(top, NodeKind::Container, "Mid").unwrap();
        let folder = tree.add_node(mid, NodeKind::Container, "Folder").unwrap();
        let leaf = tree.add_node(folder, NodeKind::Leaf, "web").unwrap();
        tree.set_value(folder, "username", "svc").unwrap();
        tree.set_value(leaf, "port", 8080).unwrap();
        tree.set_value(leaf, "protocol", "https").unwrap();
        tree.set_value(leaf, "favorite", true).unwrap();
        tree.set_inherited(leaf, "username", true).unwrap();
        let alias = tree.create_link(leaf, top).unwrap();

        store.save_tree(&tree).unwrap();
        let (loaded, validation) = store.load_tree().unwrap();
        assert!(!validation.has_issues(), "{}", validation);

        assert_eq!(loaded.len(), tree.len());
        for ((_, before), (_, after)) in tree.iter().zip(loaded.iter()) {
            assert_eq!(before.id(), after.id());
            assert_eq!(before.kind(), after.kind());
            assert_eq!(before.linked_id(), after.linked_id());
            assert_eq!(before.stored_values(), after.stored_values());
            assert_eq!(before.toggles(), after.toggles());
        }

        let leaf_id = tree.node(leaf).unwrap().id().to_string();
        let alias_id = tree.node(alias).unwrap().id().to_string();
        let loaded_leaf = loaded.find_by_id(&leaf_id).unwrap();
        let loaded_alias = loaded.find_by_id(&alias_id).unwrap();
        assert_eq!(loaded.value(loaded_leaf, "username").unwrap(), PropertyValue::from("svc"));
        assert_eq!(loaded.value(loaded_alias, "port").unwrap(), PropertyValue::Int(8080));
    }

    #[test]
    fn test_snapshot_holds_only_local_values() {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        let top = tree.add_node(root, NodeKind::Container, "top").unwrap();
        let mid = tree.add_node(top, NodeKind::Container, "mid").unwrap();
        let parent = tree.add_node(mid, NodeKind::Container, "parent").unwrap();
        let child = tree.add_node(parent, NodeKind::Leaf, "child").unwrap();
        tree.set_value(parent, "domain", "CORP").unwrap();
        tree.set_inherited(child, "domain", true).unwrap();
        assert_eq!(tree.value(child, "domain").unwrap(), PropertyValue::from("CORP"));

        let snapshot = snapshot_tree(&tree);
        let child_snapshot = &snapshot.root.child_at(&[0, 0, 0, 0]);
        assert_eq!(child_snapshot.label_display(), "child");
        assert!(!child_snapshot.properties.contains_key("domain"));
        assert_eq!(child_snapshot.inheritance.get("domain"), Some(&true));
        assert_eq!(child_snapshot.inheritance.len(), tree.schema().toggle_names().len());
    }

    #[test]
    fn test_stash_survives_reload() {
        let dir = TempDir::new().unwrap();
        let store = TomlTreeStore::new(dir.path().join("tree.toml"));

        let mut tree = ConfigTree::new();
        let root = tree.root();
        let folder = tree.add_node(root, NodeKind::Container, "folder").unwrap();
        let sub = tree.add_node(folder, NodeKind::Container, "sub").unwrap();
        let node = tree.add_node(sub, NodeKind::Leaf, "node").unwrap();
        tree.set_inherited(node, "hostname", true).unwrap();
        tree.set_parent(node, root).unwrap();
        store.save_tree(&tree).unwrap();

        let (mut loaded, _) = store.load_tree().unwrap();
        let id = tree.node(node).unwrap().id().to_string();
        let node = loaded.find_by_id(&id).unwrap();
        let sub = loaded.find_by_id(tree.node(sub).unwrap().id()).unwrap();
        assert!(loaded.toggles(node).unwrap().has_stash());
        assert!(!loaded.toggles(node).unwrap().is_set("hostname"));

        loaded.set_parent(node, sub).unwrap();
        assert!(loaded.toggles(node).unwrap().is_set("hostname"));
    }

    #[test]
    fn test_load_repairs_and_reports() {
        let snapshot = parse(
            r#"
version = 1

[root]
id = "root"
kind = "root"

[[root.child]]
id = "folder-1"
kind = "container"

[root.child.properties]
name = "Servers"
port = "2222"
colour = "blue"

[root.child.inheritance]
username = true
legacy = true

[[root.child.child]]
id = "leaf-1"
kind = "leaf"

[root.child.child.properties]
name = "web"
protocol = "SSH2"
"#,
        );

        let (tree, validation) =
            build_tree(snapshot, InheritanceDefaults::new(true), ResolutionPolicy::default())
                .unwrap();
        assert!(validation.is_valid());
        assert_eq!(validation.warnings.len(), 3, "{}", validation);

        let folder = tree.find_by_id("FOLDER-1").unwrap();
        assert_eq!(tree.local_value(folder, "port").unwrap(), PropertyValue::Int(2222));
        assert!(tree.node(folder).unwrap().stored("colour").is_none());
        assert!(tree.everything_inherited(folder).unwrap());

        let leaf = tree.find_by_id("leaf-1").unwrap();
        assert!(tree.everything_inherited(leaf).unwrap());
        assert_eq!(tree.local_value(leaf, "protocol").unwrap(), PropertyValue::from("ssh2"));
        assert_eq!(tree.node(tree.root()).unwrap().id(), "root");
    }

    #[test]
    fn test_structural_problems_are_errors() {
        let snapshot = parse(
            r#"
[root]
id = "r"
kind = "root"

[[root.child]]
id = "leaf"
kind = "leaf"

[[root.child.child]]
id = "orphan"
kind = "leaf"

[[root.child]]
id = "imposter"
kind = "root"
"#,
        );
        let (tree, validation) =
            build_tree(snapshot, InheritanceDefaults::default(), ResolutionPolicy::default())
                .unwrap();
        assert_eq!(validation.errors.len(), 2);
        assert_eq!(tree.len(), 2);
        assert!(tree.find_by_id("orphan").is_none());
    }

    #[test]
    fn test_duplicate_ids_are_reported() {
        let snapshot = parse(
            r#"
[root]
id = "r"
kind = "root"

[[root.child]]
id = "same"
kind = "leaf"

[[root.child]]
id = "SAME"
kind = "leaf"
"#,
        );
        let (tree, validation) =
            build_tree(snapshot, InheritanceDefaults::default(), ResolutionPolicy::default())
                .unwrap();
        assert_eq!(validation.warnings.len(), 1);
        assert!(tree.find_by_id("same").is_none());
    }

    #[test]
    fn test_rejects_bad_top_level() {
        let snapshot = parse("[root]\nid = \"x\"\nkind = \"container\"\n");
        assert!(matches!(
            build_tree(snapshot, InheritanceDefaults::default(), ResolutionPolicy::default()),
            Err(StoreError::InvalidRoot { kind: NodeKind::Container })
        ));

        let snapshot = parse("version = 9\n[root]\nid = \"x\"\nkind = \"root\"\n");
        assert!(matches!(
            build_tree(snapshot, InheritanceDefaults::default(), ResolutionPolicy::default()),
            Err(StoreError::UnsupportedVersion { version: 9 })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = TomlTreeStore::new(dir.path().join("absent.toml"));
        assert!(!store.exists());
        assert!(matches!(store.load_tree(), Err(StoreError::Io { .. })));
    }

    impl NodeSnapshot {
        fn child_at(&self, path: &[usize]) -> &NodeSnapshot {
            path.iter().fold(self, |node, index| &node.children[*index])
        }
    }
}
