use std::collections::BTreeSet;

use avl_forest::{ArenaTree, BalancedTree, ImplicitTree, ReferenceTree};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Insert(i32),
    Delete(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..64i32).prop_map(Op::Insert),
        2 => (0..64i32).prop_map(Op::Delete),
    ]
}

fn apply<T: BalancedTree<i32>>(tree: &mut T, model: &BTreeSet<i32>, op: &Op) -> bool {
    match op {
        Op::Insert(key) => {
            let fresh = !model.contains(key);
            tree.insert(*key) == Ok(fresh)
        }
        Op::Delete(key) => {
            let present = model.contains(key);
            tree.delete(key) == Ok(present)
        }
    }
}

fn check<T: BalancedTree<i32>>(tree: &T, model: &BTreeSet<i32>) -> Result<(), TestCaseError> {
    prop_assert_eq!(tree.assert_valid(), Ok(()));
    prop_assert_eq!(tree.len(), model.len());
    prop_assert!(tree.keys().copied().eq(model.iter().copied()));
    for key in 0..64 {
        prop_assert_eq!(tree.contains(&key), model.contains(&key));
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_invariants_hold_after_every_op(ops in prop::collection::vec(op(), 0..200)) {
        let mut model = BTreeSet::new();
        let mut reference = ReferenceTree::new();
        let mut arena = ArenaTree::with_capacity(ops.len());
        let mut implicit = ImplicitTree::with_depth(12);

        for op in &ops {
            prop_assert!(apply(&mut reference, &model, op));
            prop_assert!(apply(&mut arena, &model, op));
            prop_assert!(apply(&mut implicit, &model, op));
            match op {
                Op::Insert(key) => model.insert(*key),
                Op::Delete(key) => model.remove(key),
            };
            check(&reference, &model)?;
            check(&arena, &model)?;
            check(&implicit, &model)?;
        }
    }

    #[test]
    fn prop_delete_leaves_the_set_difference(
        keys in prop::collection::btree_set(-1000..1000i32, 0..120),
        doomed in prop::collection::btree_set(-1000..1000i32, 0..120)
    ) {
        let mut tree = ArenaTree::with_capacity(keys.len());
        for key in &keys {
            tree.insert(*key).unwrap();
        }
        let allocated = tree.stats().allocated;
        for key in &doomed {
            prop_assert_eq!(tree.delete(key), Ok(keys.contains(key)));
            prop_assert_eq!(tree.stats().allocated, allocated);
        }
        let expected: Vec<i32> = keys.difference(&doomed).copied().collect();
        prop_assert_eq!(tree.keys().copied().collect::<Vec<_>>(), expected);
        prop_assert_eq!(tree.assert_valid(), Ok(()));
    }

    #[test]
    fn prop_duplicate_insert_is_idempotent(keys in prop::collection::vec(0..500i32, 1..80)) {
        let mut tree = ImplicitTree::with_depth(12);
        for key in &keys {
            tree.insert(*key).unwrap();
        }
        let before: Vec<_> = tree.traverse().collect();
        for key in &keys {
            prop_assert_eq!(tree.insert(*key), Ok(false));
        }
        prop_assert_eq!(tree.traverse().collect::<Vec<_>>(), before);
    }
}
