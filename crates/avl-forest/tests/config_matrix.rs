use avl_forest::{
    AnyTree, BalancedTree, ForestError, Locator, StoreKind, TreeConfig, DEFAULT_CAPACITY,
};
use serde_json::json;

#[test]
fn config_toml_matrix() {
    let config: TreeConfig = toml::from_str("store = \"implicit\"\ncapacity = 31\n").unwrap();
    assert_eq!(config, TreeConfig::new(StoreKind::Implicit, 31));

    let config: TreeConfig = toml::from_str("").unwrap();
    assert_eq!(config.store, StoreKind::Arena);
    assert_eq!(config.capacity, DEFAULT_CAPACITY);

    let config: TreeConfig = toml::from_str("store = \"reference\"").unwrap();
    assert_eq!(config.capacity, DEFAULT_CAPACITY);

    assert!(toml::from_str::<TreeConfig>("store = \"heap\"").is_err());

    let text = toml::to_string(&TreeConfig::default()).unwrap();
    assert_eq!(toml::from_str::<TreeConfig>(&text).unwrap(), TreeConfig::default());
}

#[test]
fn config_json_matrix() {
    let config: TreeConfig = serde_json::from_value(json!({ "capacity": 7 })).unwrap();
    assert_eq!(config, TreeConfig::new(StoreKind::Arena, 7));
    assert_eq!(
        serde_json::to_value(TreeConfig::new(StoreKind::Implicit, 15)).unwrap(),
        json!({ "store": "implicit", "capacity": 15 })
    );
}

#[test]
fn store_kind_from_str_matrix() {
    assert_eq!("ARENA".parse::<StoreKind>(), Ok(StoreKind::Arena));
    assert_eq!(
        "splay".parse::<StoreKind>(),
        Err(ForestError::UnknownStore("splay".to_string()))
    );
    assert_eq!(
        ForestError::UnknownStore("splay".to_string()).to_string(),
        "unknown store kind: splay"
    );
}

#[test]
fn any_tree_behaves_alike_matrix() {
    let mut shapes = Vec::new();
    for store in [StoreKind::Reference, StoreKind::Arena, StoreKind::Implicit] {
        let mut tree: AnyTree<i64> = TreeConfig::new(store, 63).build();
        assert_eq!(tree.kind(), store);
        for key in [40, 20, 60, 10, 30, 50, 70, 25] {
            assert_eq!(tree.insert(key), Ok(true));
        }
        assert_eq!(tree.delete(&60), Ok(true));
        assert_eq!(tree.delete(&60), Ok(false));
        tree.assert_valid().unwrap();
        assert_eq!(tree.min(), Some(&10));
        assert_eq!(tree.max(), Some(&70));
        assert!(tree.contains(&25));

        shapes.push(
            tree.traverse()
                .map(|v| (v.key, v.height, v.depth))
                .collect::<Vec<_>>(),
        );
    }
    assert_eq!(shapes[0], shapes[1]);
    assert_eq!(shapes[1], shapes[2]);
}

#[test]
fn any_tree_locators_matrix() {
    let mut reference: AnyTree<i64> = TreeConfig::new(StoreKind::Reference, 0).build();
    let mut implicit: AnyTree<i64> = TreeConfig::new(StoreKind::Implicit, 7).build();
    for key in [10, 20, 30] {
        reference.insert(key).unwrap();
        implicit.insert(key).unwrap();
    }
    assert_eq!(reference.search(&30), Some(Locator::Node(30)));
    assert_eq!(implicit.search(&30), Some(Locator::Slot(2)));
    assert_eq!(reference.stats(), None);
    assert_eq!(implicit.stats().map(|s| s.live), Some(3));

    let root = implicit.traverse().next().unwrap();
    assert_eq!(
        serde_json::to_value(&root).unwrap(),
        json!({
            "locator": { "slot": 0 },
            "key": 20,
            "height": 2,
            "depth": 0,
            "left": { "slot": 1 },
            "right": { "slot": 2 }
        })
    );

    implicit.clear();
    assert!(implicit.is_empty());
}
