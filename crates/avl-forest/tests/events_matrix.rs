use std::cell::RefCell;
use std::rc::Rc;

use avl_forest::{ArenaTree, ImplicitTree, ReferenceTree, Rotation, TreeEvent};

type Log = Rc<RefCell<Vec<TreeEvent<i64>>>>;

fn recorder() -> (Log, impl FnMut(&TreeEvent<i64>) + 'static) {
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    (log, move |event: &TreeEvent<i64>| {
        sink.borrow_mut().push(event.clone())
    })
}

fn expected() -> Vec<TreeEvent<i64>> {
    vec![
        TreeEvent::Inserted { key: 10 },
        TreeEvent::Inserted { key: 20 },
        TreeEvent::Rotated {
            rotation: Rotation::Left,
            root: 20,
        },
        TreeEvent::Inserted { key: 30 },
        TreeEvent::Duplicate { key: 20 },
        TreeEvent::Missing { key: 99 },
        TreeEvent::Removed { key: 10 },
    ]
}

#[test]
fn arena_events_matrix() {
    let mut tree = ArenaTree::with_capacity(8);
    let (log, listener) = recorder();
    let id = tree.subscribe(listener);

    for key in [10, 20, 30, 20] {
        tree.insert(key).unwrap();
    }
    tree.delete(&99).unwrap();
    tree.delete(&10).unwrap();
    assert_eq!(*log.borrow(), expected());

    assert!(tree.unsubscribe(id));
    assert!(!tree.unsubscribe(id));
    tree.insert(40).unwrap();
    assert_eq!(log.borrow().len(), expected().len());
}

#[test]
fn implicit_events_matrix() {
    let mut tree = ImplicitTree::with_depth(3);
    let (log, listener) = recorder();
    tree.subscribe(listener);

    for key in [10, 20, 30, 20] {
        tree.insert(key).unwrap();
    }
    tree.delete(&99).unwrap();
    tree.delete(&10).unwrap();
    assert_eq!(*log.borrow(), expected());
}

#[test]
fn reference_events_matrix() {
    let mut tree = ReferenceTree::new();
    let (log, listener) = recorder();
    tree.subscribe(listener);

    for key in [10, 20, 30, 20] {
        tree.insert(key).unwrap();
    }
    tree.delete(&99).unwrap();
    tree.delete(&10).unwrap();
    assert_eq!(*log.borrow(), expected());
}

#[test]
fn double_rotation_events_matrix() {
    let mut tree = ArenaTree::with_capacity(8);
    let (log, listener) = recorder();
    tree.subscribe(listener);
    for key in [30, 10, 20] {
        tree.insert(key).unwrap();
    }
    let rotations: Vec<_> = log
        .borrow()
        .iter()
        .filter_map(|event| match event {
            TreeEvent::Rotated { rotation, root } => Some((rotation.case(), *root)),
            _ => None,
        })
        .collect();
    assert_eq!(rotations, vec![("LR", 20)]);
}

#[test]
fn failed_insert_emits_nothing_matrix() {
    let mut tree = ArenaTree::with_capacity(1);
    tree.insert(1).unwrap();
    let (log, listener) = recorder();
    tree.subscribe(listener);
    assert!(tree.insert(2).is_err());
    assert!(log.borrow().is_empty());
}

#[test]
fn rolled_back_delete_emits_nothing_matrix() {
    let mut tree = ImplicitTree::with_capacity(11);
    for key in [8, 4, 10, 2, 6, 11, 1, 5] {
        tree.insert(key).unwrap();
    }
    let (log, listener) = recorder();
    tree.subscribe(listener);
    assert!(tree.delete(&11).is_err());
    assert!(log.borrow().is_empty());

    assert_eq!(tree.delete(&1), Ok(true));
    assert_eq!(*log.borrow(), vec![TreeEvent::Removed { key: 1 }]);
}
