#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::schema::PropertyValue;
    use crate::tree::{ConfigTree, NodeKey, NodeKind, TreeEvent};

    fn nested() -> (ConfigTree, NodeKey, NodeKey) {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        let top = tree.add_node(root, NodeKind::Container, "top").unwrap();
        let mid = tree.add_node(top, NodeKind::Container, "mid").unwrap();
        let parent = tree.add_node(mid, NodeKind::Container, "parent").unwrap();
        let child = tree.add_node(parent, NodeKind::Leaf, "child").unwrap();
        (tree, parent, child)
    }

    #[test]
    fn test_auto_inherit_when_local_values_match() {
        let (mut tree, parent, child) = nested();
        tree.set_value(parent, "port", 3389).unwrap();
        tree.set_value(child, "port", 3389).unwrap();
        assert!(!tree.toggles(child).unwrap().is_set("port"));

        tree.apply_automatic_inheritance_from_parent(child).unwrap();
        assert!(tree.toggles(child).unwrap().is_set("port"));
    }

    #[test]
    fn test_auto_inherit_off_when_local_values_differ() {
        let (mut tree, parent, child) = nested();
        tree.set_value(parent, "port", 3389).unwrap();
        tree.set_value(child, "port", 22).unwrap();
        tree.set_value(parent, "hostname", "p").unwrap();
        tree.set_inherited(child, "port", true).unwrap();

        tree.apply_automatic_inheritance_from_parent(child).unwrap();
        let toggles = tree.toggles(child).unwrap();
        assert!(!toggles.is_set("port"));
        assert!(!toggles.is_set("hostname"));
        assert!(toggles.is_set("username"), "both empty, so equal");
    }

    #[test]
    fn test_auto_inherit_compares_local_not_effective_values() {
        let (mut tree, parent, child) = nested();
        tree.set_value(parent, "username", "svc").unwrap();
        tree.set_inherited(child, "username", true).unwrap();
        assert_eq!(tree.value(child, "username").unwrap(), PropertyValue::from("svc"));

        tree.apply_automatic_inheritance_from_parent(child).unwrap();
        assert!(!tree.toggles(child).unwrap().is_set("username"));
    }

    #[test]
    fn test_auto_inherit_without_parent_is_a_no_op() {
        let mut tree = ConfigTree::new();
        let loose = tree.create_node(NodeKind::Leaf, "loose").unwrap();
        let before = tree.toggles(loose).unwrap().clone();
        tree.apply_automatic_inheritance_from_parent(loose).unwrap();
        assert_eq!(tree.toggles(loose).unwrap(), &before);
    }

    #[test]
    fn test_everything_inherited_tri_state() {
        let (mut tree, _, child) = nested();

        tree.set_everything_inherited(child, InheritAll::Yes).unwrap();
        assert!(tree.everything_inherited(child).unwrap());
        tree.set_everything_inherited(child, InheritAll::Yes).unwrap();
        assert!(tree.everything_inherited(child).unwrap());

        tree.set_everything_inherited(child, InheritAll::No).unwrap();
        assert!(!tree.everything_inherited(child).unwrap());

        tree.set_everything_inherited(child, InheritAll::Auto).unwrap();
        assert!(tree.everything_inherited(child).unwrap(), "nothing stored on either side");
    }

    #[test]
    fn test_enabled_properties_empty_while_inactive() {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        let top = tree.add_node(root, NodeKind::Container, "top").unwrap();
        let second = tree.add_node(top, NodeKind::Container, "second").unwrap();
        let third = tree.add_node(second, NodeKind::Leaf, "third").unwrap();
        for key in [second, third] {
            tree.set_inherited(key, "hostname", true).unwrap();
        }

        assert!(tree.enabled_inheritance_properties(second).unwrap().is_empty());
        assert_eq!(tree.enabled_inheritance_properties(third).unwrap(), vec!["hostname"]);
    }

    #[test]
    fn test_disable_and_enable_round_trip() {
        let (mut tree, _, child) = nested();
        tree.set_inherited(child, "domain", true).unwrap();
        tree.set_inherited(child, "password", true).unwrap();
        let events = tree.subscribe();

        tree.disable_inheritance(child).unwrap();
        assert!(tree.enabled_inheritance_properties(child).unwrap().is_empty());
        assert!(tree.enable_inheritance(child).unwrap());
        assert_eq!(
            tree.enabled_inheritance_properties(child).unwrap(),
            vec!["domain", "password"]
        );
        assert!(!tree.enable_inheritance(child).unwrap());
        assert_eq!(events.try_iter().count(), 2);
    }

    #[test]
    fn test_set_inherited_notifies_once() {
        let (mut tree, _, child) = nested();
        let events = tree.subscribe();
        assert!(tree.set_inherited(child, "vm_id", true).unwrap());
        assert!(!tree.set_inherited(child, "vm_id", true).unwrap());

        let id = tree.node(child).unwrap().id().to_string();
        let received: Vec<TreeEvent> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![TreeEvent::InheritanceChanged {
                node: id,
                property: Some("vm_id")
            }]
        );
        assert!(tree.set_inherited(child, "name", true).is_err());
    }

    #[test]
    fn test_detached_node_counts_as_active() {
        let mut tree = ConfigTree::new();
        let loose = tree.create_node(NodeKind::Leaf, "loose").unwrap();
        tree.set_inherited(loose, "port", true).unwrap();

        assert!(tree.inheritance_active(loose));
        assert_eq!(tree.enabled_inheritance_properties(loose).unwrap(), vec!["port"]);
        assert_eq!(tree.value(loose, "port").unwrap(), PropertyValue::Int(3389));
    }

    #[test]
    fn test_apply_inheritance_to_children() {
        let (mut tree, parent, child) = nested();
        let sub = tree.add_node(parent, NodeKind::Container, "sub").unwrap();
        let deep = tree.add_node(sub, NodeKind::Leaf, "deep").unwrap();
        tree.set_inherited(parent, "domain", true).unwrap();
        tree.set_inherited(parent, "port", true).unwrap();
        tree.set_inherited(deep, "hostname", true).unwrap();

        let events = tree.subscribe();
        assert_eq!(tree.apply_inheritance_to_children(parent).unwrap(), 3);

        for key in [child, sub, deep] {
            assert_eq!(tree.toggles(key).unwrap().flags(), tree.toggles(parent).unwrap().flags());
        }
        assert!(!tree.toggles(deep).unwrap().is_set("hostname"));
        assert_eq!(events.try_iter().count(), 3);

        assert_eq!(tree.apply_inheritance_to_children(parent).unwrap(), 0);
        assert!(matches!(
            tree.apply_inheritance_to_children(child),
            Err(crate::tree::TreeError::NotAContainer { .. })
        ));
    }

    #[test]
    fn test_inherit_all_parsing() {
        assert_eq!("YES".parse::<InheritAll>().unwrap(), InheritAll::Yes);
        assert_eq!("false".parse::<InheritAll>().unwrap(), InheritAll::No);
        assert_eq!("auto".parse::<InheritAll>().unwrap(), InheritAll::Auto);
        assert!("sometimes".parse::<InheritAll>().is_err());
        assert_eq!(InheritAll::Auto.to_string(), "auto");
    }
}
