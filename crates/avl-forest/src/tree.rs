//! AVL tree orchestration over any [`NodeStore`].
//!
//! Insert and delete descend by key comparison, then rebalance every ancestor
//! on the way back up and hang the resulting subtree root on its parent slot.
//! The store decides what "hanging" means: relinking for the arena,
//! relocation for implicit slots.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::arena::ArenaStore;
use crate::balance;
use crate::error::ForestError;
use crate::events::{Observers, TreeEvent};
use crate::implicit::ImplicitStore;
use crate::iter::{Keys, Traverse};
use crate::types::{NodeStore, NodeView, Slot, StoreStats};
use crate::validate::check_views;

/// Operations shared by every tree variant.
pub trait BalancedTree<K: Ord + Clone + Debug> {
    /// How a node is named in exports and search results.
    type Locator: Ord + Clone + Debug;

    /// Adds `key`. Returns `Ok(false)` when it was already present.
    fn insert(&mut self, key: K) -> Result<bool, ForestError>;

    /// Removes `key`. Returns `Ok(false)` when it was not present.
    fn delete(&mut self, key: &K) -> Result<bool, ForestError>;

    fn search(&self, key: &K) -> Option<Self::Locator>;

    fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Height of the root, 0 for an empty tree.
    fn height(&self) -> u32;

    /// Pre-order export of every live node.
    fn traverse(&self) -> impl Iterator<Item = NodeView<K, Self::Locator>> + '_;

    /// Keys in ascending order.
    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a;

    /// Checks ordering, heights and balance through the export hook.
    fn assert_valid(&self) -> Result<(), String> {
        let views: Vec<_> = self.traverse().collect();
        if views.len() != self.len() {
            return Err(format!(
                "Size mismatch: tracked {}, exported {}",
                self.len(),
                views.len()
            ));
        }
        check_views(views)
    }
}

/// AVL tree whose nodes live in a [`NodeStore`].
#[derive(Debug)]
pub struct AvlTree<S: NodeStore> {
    store: S,
    root: Option<S::Loc>,
    len: usize,
    observers: Observers<S::Key>,
}

pub type ArenaTree<K> = AvlTree<ArenaStore<K>>;
pub type ImplicitTree<K> = AvlTree<ImplicitStore<K>>;

impl<K: Ord + Clone + Debug> AvlTree<ArenaStore<K>> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_store(ArenaStore::with_capacity(capacity))
    }
}

impl<K: Ord + Clone + Debug> AvlTree<ImplicitStore<K>> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_store(ImplicitStore::with_capacity(capacity))
    }

    /// Tree over `2^depth - 1` slots.
    pub fn with_depth(depth: u32) -> Self {
        Self::from_store(ImplicitStore::with_depth(depth))
    }
}

impl<S: NodeStore> AvlTree<S> {
    /// Wraps an empty store.
    pub fn from_store(mut store: S) -> Self {
        store.clear();
        Self {
            store,
            root: None,
            len: 0,
            observers: Observers::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn root(&self) -> Option<S::Loc> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn height(&self) -> u32 {
        balance::height(&self.store, self.root)
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    pub fn key(&self, at: S::Loc) -> &S::Key {
        self.store.key(at)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TreeEvent<S::Key>) + 'static) -> u64 {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: u64) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Locator of the node holding `key`.
    pub fn search(&self, key: &S::Key) -> Option<S::Loc> {
        let mut curr = self.root;
        while let Some(at) = curr {
            curr = match key.cmp(self.store.key(at)) {
                Ordering::Less => self.store.left(at),
                Ordering::Greater => self.store.right(at),
                Ordering::Equal => return Some(at),
            };
        }
        None
    }

    pub fn contains(&self, key: &S::Key) -> bool {
        self.search(key).is_some()
    }

    pub fn min(&self) -> Option<&S::Key> {
        let mut at = self.root?;
        while let Some(l) = self.store.left(at) {
            at = l;
        }
        Some(self.store.key(at))
    }

    pub fn max(&self) -> Option<&S::Key> {
        let mut at = self.root?;
        while let Some(r) = self.store.right(at) {
            at = r;
        }
        Some(self.store.key(at))
    }

    /// Adds `key`. A failed insert leaves the tree exactly as it was.
    pub fn insert(&mut self, key: S::Key) -> Result<bool, ForestError> {
        self.store.begin();
        let record = !self.observers.is_empty();
        let mut pass = Pass::new(&mut self.store, record);
        let outcome = pass
            .insert_at(self.root, Slot::Root, &key)
            .and_then(|root| pass.store.attach(Slot::Root, Some(root)));
        let (changed, rotations) = pass.finish();
        let root = match outcome {
            Ok(root) => root,
            Err(err) => {
                self.store.rollback();
                tracing::debug!(?key, %err, "insert rejected");
                return Err(err);
            }
        };
        self.store.commit();
        self.root = root;

        self.observers.emit_all(rotations);
        if changed {
            self.len += 1;
            self.observers.emit(|| TreeEvent::Inserted { key });
        } else {
            tracing::debug!(?key, "duplicate key ignored");
            self.observers.emit(|| TreeEvent::Duplicate { key });
        }
        Ok(changed)
    }

    /// Removes `key`. A failed delete leaves the tree exactly as it was.
    pub fn delete(&mut self, key: &S::Key) -> Result<bool, ForestError> {
        self.store.begin();
        let record = !self.observers.is_empty();
        let mut pass = Pass::new(&mut self.store, record);
        let outcome = pass
            .remove_at(self.root, key)
            .and_then(|root| pass.store.attach(Slot::Root, root));
        let (changed, rotations) = pass.finish();
        let root = match outcome {
            Ok(root) => root,
            Err(err) => {
                self.store.rollback();
                tracing::warn!(?key, %err, "delete rolled back");
                return Err(err);
            }
        };
        self.store.commit();
        self.root = root;

        self.observers.emit_all(rotations);
        if changed {
            self.len -= 1;
            self.observers.emit(|| TreeEvent::Removed { key: key.clone() });
        } else {
            tracing::debug!(?key, "delete of absent key ignored");
            self.observers.emit(|| TreeEvent::Missing { key: key.clone() });
        }
        Ok(changed)
    }

    /// Drops every node. The arena free pointer starts over.
    pub fn clear(&mut self) {
        self.store.clear();
        self.root = None;
        self.len = 0;
    }

    pub fn traverse(&self) -> Traverse<'_, S> {
        Traverse::new(&self.store, self.root)
    }

    pub fn keys(&self) -> Keys<'_, S> {
        Keys::new(&self.store, self.root)
    }

    pub fn assert_valid(&self) -> Result<(), String> {
        BalancedTree::assert_valid(self)
    }
}

impl<S: NodeStore> BalancedTree<S::Key> for AvlTree<S> {
    type Locator = S::Loc;

    fn insert(&mut self, key: S::Key) -> Result<bool, ForestError> {
        AvlTree::insert(self, key)
    }

    fn delete(&mut self, key: &S::Key) -> Result<bool, ForestError> {
        AvlTree::delete(self, key)
    }

    fn search(&self, key: &S::Key) -> Option<S::Loc> {
        AvlTree::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn height(&self) -> u32 {
        AvlTree::height(self)
    }

    fn traverse(&self) -> impl Iterator<Item = NodeView<S::Key, S::Loc>> + '_ {
        AvlTree::traverse(self)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a S::Key> + 'a
    where
        S::Key: 'a,
    {
        AvlTree::keys(self)
    }
}

/// State of a single insert or delete. Rotation events are held back until
/// the operation has succeeded.
struct Pass<'a, S: NodeStore> {
    store: &'a mut S,
    changed: bool,
    record: bool,
    rotations: Vec<TreeEvent<S::Key>>,
}

impl<'a, S: NodeStore> Pass<'a, S> {
    fn new(store: &'a mut S, record: bool) -> Self {
        Self {
            store,
            changed: false,
            record,
            rotations: Vec::new(),
        }
    }

    fn finish(self) -> (bool, Vec<TreeEvent<S::Key>>) {
        (self.changed, self.rotations)
    }

    fn insert_at(
        &mut self,
        at: Option<S::Loc>,
        slot: Slot<S::Loc>,
        key: &S::Key,
    ) -> Result<S::Loc, ForestError> {
        let Some(n) = at else {
            let leaf = self.store.allocate(slot, key.clone())?;
            self.changed = true;
            return Ok(leaf);
        };

        match key.cmp(self.store.key(n)) {
            Ordering::Less => {
                let left = self.store.left(n);
                let child = self.insert_at(left, Slot::Left(n), key)?;
                self.store.attach(Slot::Left(n), Some(child))?;
            }
            Ordering::Greater => {
                let right = self.store.right(n);
                let child = self.insert_at(right, Slot::Right(n), key)?;
                self.store.attach(Slot::Right(n), Some(child))?;
            }
            Ordering::Equal => return Ok(n),
        }

        if !self.changed {
            return Ok(n);
        }
        self.rebalance(n)
    }

    fn remove_at(
        &mut self,
        at: Option<S::Loc>,
        key: &S::Key,
    ) -> Result<Option<S::Loc>, ForestError> {
        let Some(n) = at else {
            return Ok(None);
        };

        match key.cmp(self.store.key(n)) {
            Ordering::Less => {
                let left = self.store.left(n);
                let child = self.remove_at(left, key)?;
                self.store.attach(Slot::Left(n), child)?;
            }
            Ordering::Greater => {
                let right = self.store.right(n);
                let child = self.remove_at(right, key)?;
                self.store.attach(Slot::Right(n), child)?;
            }
            Ordering::Equal => {
                self.changed = true;
                match (self.store.left(n), self.store.right(n)) {
                    (Some(left), Some(_)) => {
                        // Two children: the in-order predecessor takes over.
                        let predecessor = self.max_key(left).clone();
                        self.store.set_key(n, predecessor.clone());
                        let child = self.remove_at(Some(left), &predecessor)?;
                        self.store.attach(Slot::Left(n), child)?;
                    }
                    (child, None) | (None, child) => {
                        self.store.release(n);
                        return Ok(child);
                    }
                }
            }
        }

        if !self.changed {
            return Ok(Some(n));
        }
        self.rebalance(n).map(Some)
    }

    fn max_key(&self, mut at: S::Loc) -> &S::Key {
        while let Some(r) = self.store.right(at) {
            at = r;
        }
        self.store.key(at)
    }

    fn rebalance(&mut self, at: S::Loc) -> Result<S::Loc, ForestError> {
        let (root, rotation) = balance::rebalance(self.store, at)?;
        if let Some(rotation) = rotation {
            let key = self.store.key(root);
            tracing::trace!(case = rotation.case(), root = ?key, "rotated");
            if self.record {
                self.rotations.push(TreeEvent::Rotated {
                    rotation,
                    root: key.clone(),
                });
            }
        }
        Ok(root)
    }
}
