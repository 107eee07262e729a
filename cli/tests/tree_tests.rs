//! Library-level tests across the tree, store and preset modules

use conntree::inheritance::InheritAll;
use conntree::preset::{Preset, PresetLibrary};
use conntree::schema::{discover, PropertyValue};
use conntree::scope::{Resolver, ValueOrigin};
use conntree::store::{snapshot_tree, TomlTreeStore, TreeStore};
use conntree::tree::{ConfigTree, IdIndex, NodeKind, TreeEvent};
use std::fs;
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/connections.toml");

fn load_fixture() -> (TempDir, TomlTreeStore, ConfigTree) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("connections.toml");
    fs::write(&path, FIXTURE).unwrap();
    let store = TomlTreeStore::new(&path);
    let (tree, validation) = store.load_tree().unwrap();
    assert!(!validation.has_issues(), "{}", validation);
    (dir, store, tree)
}

#[test]
fn test_fixture_resolves_like_the_cli() {
    let (_dir, _store, tree) = load_fixture();
    let web = tree.key_of("web").unwrap();
    let region = tree.key_of("region").unwrap();

    let resolution = Resolver::new(&tree).resolve_with_origin(web, "username").unwrap();
    assert_eq!(resolution.value, PropertyValue::from("GP_User"));
    assert_eq!(resolution.source, region);
    assert_eq!(resolution.origin, ValueOrigin::Inherited);

    assert_eq!(tree.value(web, "domain").unwrap(), PropertyValue::from("CORP"));
    assert!(!tree.inheritance_active(region));
    assert!(tree.inheritance_active(web));
}

#[test]
fn test_moving_under_root_stashes_and_restores() {
    let (_dir, store, mut tree) = load_fixture();
    let web = tree.key_of("web").unwrap();
    let root = tree.root();

    tree.set_parent(web, root).unwrap();
    assert!(tree.enabled_inheritance_properties(web).unwrap().is_empty());
    assert!(tree.toggles(web).unwrap().has_stash());

    store.save_tree(&tree).unwrap();
    let (mut reloaded, _) = store.load_tree().unwrap();
    let web = reloaded.key_of("web").unwrap();
    let team = reloaded.key_of("team").unwrap();

    reloaded.set_parent(web, team).unwrap();
    assert!(reloaded.toggles(web).unwrap().is_set("username"));
    assert_eq!(reloaded.value(web, "username").unwrap(), PropertyValue::from("GP_User"));
}

#[test]
fn test_preset_library_round_trip_through_disk() {
    let (dir, _store, mut tree) = load_fixture();
    let web = tree.key_of("web").unwrap();
    let alias = tree.key_of("web-alias").unwrap();
    let presets = dir.path().join("presets.toml");

    let mut library = PresetLibrary::load(&presets).unwrap();
    assert!(library.is_empty());
    library.upsert(Preset::capture_from("ssh", &tree, web).unwrap()).unwrap();
    library.save(&presets).unwrap();

    let library = PresetLibrary::load(&presets).unwrap();
    let root = tree.root();
    let events = tree.subscribe();
    assert_eq!(library.apply("ssh", &mut tree, &[alias, root]).unwrap(), 1);

    assert_eq!(tree.local_value(alias, "protocol").unwrap(), PropertyValue::from("ssh2"));
    assert!(tree.toggles(alias).unwrap().is_set("username"));
    assert!(events
        .try_iter()
        .any(|e| matches!(e, TreeEvent::PropertyChanged { property: "protocol", .. })));
}

#[test]
fn test_everything_inherited_auto_on_loaded_node() {
    let (_dir, _store, mut tree) = load_fixture();
    let team = tree.key_of("team").unwrap();
    let leaf = tree.add_node(team, NodeKind::Leaf, "db").unwrap();
    tree.set_value(leaf, "domain", "CORP").unwrap();
    tree.set_value(leaf, "username", "dba").unwrap();

    tree.set_everything_inherited(leaf, InheritAll::Auto).unwrap();
    let toggles = tree.toggles(leaf).unwrap();
    assert!(toggles.is_set("domain"));
    assert!(!toggles.is_set("username"));
}

#[test]
fn test_resolution_is_shareable_across_threads() {
    let (_dir, _store, tree) = load_fixture();
    let index = IdIndex::build(&tree);
    let keys: Vec<_> = tree.iter().map(|(key, _)| key).collect();
    let expected: Vec<_> = keys
        .iter()
        .map(|key| tree.value(*key, "username").unwrap())
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let resolver = Resolver::new(&tree).with_lookup(&index);
                for (key, want) in keys.iter().zip(expected.iter()) {
                    assert_eq!(&resolver.resolve(*key, "username").unwrap(), want);
                    resolver.effective_values(*key).unwrap();
                }
            });
        }
        scope.spawn(|| {
            let snapshot = snapshot_tree(&tree);
            assert_eq!(snapshot.root.children.len(), 1);
        });
    });
}

#[test]
fn test_registry_is_consistent() {
    let schema = discover();
    assert!(schema.self_check());
    assert!(schema.validate_inheritance_sync().is_empty());
    assert!(schema.validate_orphaned_toggles().is_empty());
}
