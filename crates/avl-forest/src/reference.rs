//! Owned-node AVL tree.
//!
//! Every parent exclusively owns its children through `Box`, so a rotation
//! is a handful of `take()`s and the subtree dropped by a delete is freed on
//! the spot. Nodes have no address a caller could hold on to; the key itself
//! serves as the locator.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::balance::select_rotation;
use crate::error::ForestError;
use crate::events::{Observers, TreeEvent};
use crate::tree::BalancedTree;
use crate::types::{NodeView, Rotation};

type Link<K> = Option<Box<RefNode<K>>>;

#[derive(Clone, Debug)]
pub struct RefNode<K> {
    key: K,
    height: u32,
    left: Link<K>,
    right: Link<K>,
}

impl<K> RefNode<K> {
    fn leaf(key: K) -> Self {
        Self {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn left(&self) -> Option<&RefNode<K>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&RefNode<K>> {
        self.right.as_deref()
    }
}

fn height<K>(link: &Link<K>) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn balance_factor<K>(link: &Link<K>) -> i32 {
    link.as_ref()
        .map_or(0, |n| height(&n.left) as i32 - height(&n.right) as i32)
}

fn update_height<K>(node: &mut RefNode<K>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

fn rotate_left<K>(mut x: Box<RefNode<K>>) -> Box<RefNode<K>> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    update_height(&mut x);
    y.left = Some(x);
    update_height(&mut y);
    y
}

fn rotate_right<K>(mut x: Box<RefNode<K>>) -> Box<RefNode<K>> {
    let Some(mut y) = x.left.take() else {
        return x;
    };
    x.left = y.right.take();
    update_height(&mut x);
    y.right = Some(x);
    update_height(&mut y);
    y
}

#[derive(Debug)]
pub struct ReferenceTree<K> {
    root: Link<K>,
    len: usize,
    observers: Observers<K>,
}

impl<K: Ord + Clone + Debug> Default for ReferenceTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + Debug> ReferenceTree<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            observers: Observers::default(),
        }
    }

    pub fn root(&self) -> Option<&RefNode<K>> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TreeEvent<K>) + 'static) -> u64 {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: u64) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Node holding `key`.
    pub fn find(&self, key: &K) -> Option<&RefNode<K>> {
        let mut curr = self.root.as_deref();
        while let Some(node) = curr {
            curr = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    pub fn search(&self, key: &K) -> Option<K> {
        self.find(key).map(|node| node.key.clone())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn min(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(l) = node.left.as_deref() {
            node = l;
        }
        Some(&node.key)
    }

    pub fn max(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(r) = node.right.as_deref() {
            node = r;
        }
        Some(&node.key)
    }

    /// Never fails; the `Result` matches the indexed trees.
    pub fn insert(&mut self, key: K) -> Result<bool, ForestError> {
        let mut pass = Pass::new(&mut self.observers);
        self.root = Some(pass.insert_at(self.root.take(), &key));
        let changed = pass.changed;
        if changed {
            self.len += 1;
            self.observers.emit(|| TreeEvent::Inserted { key });
        } else {
            tracing::debug!(?key, "duplicate key ignored");
            self.observers.emit(|| TreeEvent::Duplicate { key });
        }
        Ok(changed)
    }

    pub fn delete(&mut self, key: &K) -> Result<bool, ForestError> {
        let mut pass = Pass::new(&mut self.observers);
        self.root = pass.remove_at(self.root.take(), key);
        let changed = pass.changed;
        if changed {
            self.len -= 1;
            self.observers.emit(|| TreeEvent::Removed { key: key.clone() });
        } else {
            tracing::debug!(?key, "delete of absent key ignored");
            self.observers.emit(|| TreeEvent::Missing { key: key.clone() });
        }
        Ok(changed)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    pub fn traverse(&self) -> RefTraverse<'_, K> {
        RefTraverse {
            stack: self.root.as_deref().map(|n| (n, 0)).into_iter().collect(),
        }
    }

    pub fn keys(&self) -> RefKeys<'_, K> {
        let mut keys = RefKeys { stack: Vec::new() };
        keys.descend(self.root.as_deref());
        keys
    }

    pub fn assert_valid(&self) -> Result<(), String> {
        BalancedTree::assert_valid(self)
    }
}

impl<K: Ord + Clone + Debug> BalancedTree<K> for ReferenceTree<K> {
    type Locator = K;

    fn insert(&mut self, key: K) -> Result<bool, ForestError> {
        ReferenceTree::insert(self, key)
    }

    fn delete(&mut self, key: &K) -> Result<bool, ForestError> {
        ReferenceTree::delete(self, key)
    }

    fn search(&self, key: &K) -> Option<K> {
        ReferenceTree::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn height(&self) -> u32 {
        ReferenceTree::height(self)
    }

    fn traverse(&self) -> impl Iterator<Item = NodeView<K, K>> + '_ {
        ReferenceTree::traverse(self)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        ReferenceTree::keys(self)
    }
}

struct Pass<'a, K> {
    observers: &'a mut Observers<K>,
    changed: bool,
}

impl<'a, K: Ord + Clone + Debug> Pass<'a, K> {
    fn new(observers: &'a mut Observers<K>) -> Self {
        Self {
            observers,
            changed: false,
        }
    }

    fn insert_at(&mut self, link: Link<K>, key: &K) -> Box<RefNode<K>> {
        let Some(mut node) = link else {
            self.changed = true;
            return Box::new(RefNode::leaf(key.clone()));
        };
        match key.cmp(&node.key) {
            Ordering::Less => node.left = Some(self.insert_at(node.left.take(), key)),
            Ordering::Greater => node.right = Some(self.insert_at(node.right.take(), key)),
            Ordering::Equal => return node,
        }
        if !self.changed {
            return node;
        }
        self.rebalance(node)
    }

    fn remove_at(&mut self, link: Link<K>, key: &K) -> Link<K> {
        let mut node = link?;
        match key.cmp(&node.key) {
            Ordering::Less => node.left = self.remove_at(node.left.take(), key),
            Ordering::Greater => node.right = self.remove_at(node.right.take(), key),
            Ordering::Equal => {
                self.changed = true;
                match (node.left.take(), node.right.take()) {
                    (Some(left), Some(right)) => {
                        let mut max = &left;
                        while let Some(r) = &max.right {
                            max = r;
                        }
                        let predecessor = max.key.clone();
                        node.left = self.remove_at(Some(left), &predecessor);
                        node.right = Some(right);
                        node.key = predecessor;
                    }
                    (child, None) | (None, child) => return child,
                }
            }
        }
        if !self.changed {
            return Some(node);
        }
        Some(self.rebalance(node))
    }

    fn rebalance(&mut self, mut node: Box<RefNode<K>>) -> Box<RefNode<K>> {
        update_height(&mut node);
        let rotation = select_rotation(
            height(&node.left) as i32 - height(&node.right) as i32,
            balance_factor(&node.left),
            balance_factor(&node.right),
        );
        let Some(rotation) = rotation else {
            return node;
        };
        let root = match rotation {
            Rotation::Right => rotate_right(node),
            Rotation::Left => rotate_left(node),
            Rotation::LeftRight => {
                node.left = node.left.take().map(rotate_left);
                rotate_right(node)
            }
            Rotation::RightLeft => {
                node.right = node.right.take().map(rotate_right);
                rotate_left(node)
            }
        };
        tracing::trace!(case = rotation.case(), root = ?root.key, "rotated");
        self.observers.emit(|| TreeEvent::Rotated {
            rotation,
            root: root.key.clone(),
        });
        root
    }
}

/// Pre-order walk; locators are the keys themselves.
pub struct RefTraverse<'a, K> {
    stack: Vec<(&'a RefNode<K>, u32)>,
}

impl<K: Clone> Iterator for RefTraverse<'_, K> {
    type Item = NodeView<K, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        if let Some(r) = node.right.as_deref() {
            self.stack.push((r, depth + 1));
        }
        if let Some(l) = node.left.as_deref() {
            self.stack.push((l, depth + 1));
        }
        Some(NodeView {
            locator: node.key.clone(),
            key: node.key.clone(),
            height: node.height,
            depth,
            left: node.left.as_ref().map(|n| n.key.clone()),
            right: node.right.as_ref().map(|n| n.key.clone()),
        })
    }
}

/// In-order walk over keys.
pub struct RefKeys<'a, K> {
    stack: Vec<&'a RefNode<K>>,
}

impl<'a, K> RefKeys<'a, K> {
    fn descend(&mut self, mut curr: Option<&'a RefNode<K>>) {
        while let Some(node) = curr {
            self.stack.push(node);
            curr = node.left.as_deref();
        }
    }
}

impl<'a, K> Iterator for RefKeys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(node.right.as_deref());
        Some(&node.key)
    }
}
