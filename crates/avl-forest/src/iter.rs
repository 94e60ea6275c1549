//! Lazy walks over a [`NodeStore`]-backed tree.
//!
//! Both iterators keep an explicit stack bounded by the tree height and
//! borrow the store, so calling `traverse()` / `keys()` again restarts them.

use crate::types::{NodeStore, NodeView};

/// Pre-order walk yielding one [`NodeView`] per live node.
pub struct Traverse<'a, S: NodeStore> {
    store: &'a S,
    stack: Vec<(S::Loc, u32)>,
}

impl<'a, S: NodeStore> Traverse<'a, S> {
    pub(crate) fn new(store: &'a S, root: Option<S::Loc>) -> Self {
        Self {
            store,
            stack: root.map(|root| (root, 0)).into_iter().collect(),
        }
    }
}

impl<S: NodeStore> Iterator for Traverse<'_, S> {
    type Item = NodeView<S::Key, S::Loc>;

    fn next(&mut self) -> Option<Self::Item> {
        let (at, depth) = self.stack.pop()?;
        let left = self.store.left(at);
        let right = self.store.right(at);
        if let Some(r) = right {
            self.stack.push((r, depth + 1));
        }
        if let Some(l) = left {
            self.stack.push((l, depth + 1));
        }
        Some(NodeView {
            locator: at,
            key: self.store.key(at).clone(),
            height: self.store.height(at),
            depth,
            left,
            right,
        })
    }
}

/// In-order walk over keys.
pub struct Keys<'a, S: NodeStore> {
    store: &'a S,
    stack: Vec<S::Loc>,
}

impl<'a, S: NodeStore> Keys<'a, S> {
    pub(crate) fn new(store: &'a S, root: Option<S::Loc>) -> Self {
        let mut keys = Self {
            store,
            stack: Vec::new(),
        };
        keys.descend(root);
        keys
    }

    fn descend(&mut self, mut curr: Option<S::Loc>) {
        while let Some(at) = curr {
            self.stack.push(at);
            curr = self.store.left(at);
        }
    }
}

impl<'a, S: NodeStore> Iterator for Keys<'a, S> {
    type Item = &'a S::Key;

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.stack.pop()?;
        let store = self.store;
        self.descend(store.right(at));
        Some(store.key(at))
    }
}
