//! Flat node table addressed by `u32` indices.
//!
//! Slots are handed out by a free pointer that only moves forward. A slot
//! given up by a deletion keeps its stale payload and is never reused, so the
//! footprint of a tree only grows until [`NodeStore::clear`].

use std::fmt::Debug;

use crate::balance::update_height;
use crate::error::ForestError;
use crate::types::{NodeStore, Slot, StoreStats};

#[derive(Clone, Debug)]
pub struct ArenaNode<K> {
    pub key: K,
    pub height: u32,
    pub left: Option<u32>,
    pub right: Option<u32>,
}

impl<K> ArenaNode<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ArenaStore<K> {
    nodes: Vec<ArenaNode<K>>,
    capacity: usize,
    released: usize,
}

impl<K> ArenaStore<K> {
    /// Reserves room for `capacity` nodes up front.
    ///
    /// Indices are `u32`, so capacities beyond `u32::MAX` are clamped.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        Self {
            nodes: Vec::with_capacity(capacity),
            capacity,
            released: 0,
        }
    }

    /// Next index the free pointer will hand out.
    pub fn free_pointer(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn node(&self, at: u32) -> &ArenaNode<K> {
        &self.nodes[at as usize]
    }
}

impl<K: Ord + Clone + Debug> NodeStore for ArenaStore<K> {
    type Key = K;
    type Loc = u32;

    #[inline]
    fn key(&self, at: u32) -> &K {
        &self.nodes[at as usize].key
    }

    fn set_key(&mut self, at: u32, key: K) {
        self.nodes[at as usize].key = key;
    }

    #[inline]
    fn height(&self, at: u32) -> u32 {
        self.nodes[at as usize].height
    }

    fn set_height(&mut self, at: u32, height: u32) {
        self.nodes[at as usize].height = height;
    }

    #[inline]
    fn left(&self, at: u32) -> Option<u32> {
        self.nodes[at as usize].left
    }

    #[inline]
    fn right(&self, at: u32) -> Option<u32> {
        self.nodes[at as usize].right
    }

    fn allocate(&mut self, _slot: Slot<u32>, key: K) -> Result<u32, ForestError> {
        if self.nodes.len() >= self.capacity {
            return Err(ForestError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.nodes.push(ArenaNode::new(key));
        Ok(self.free_pointer() - 1)
    }

    fn attach(&mut self, slot: Slot<u32>, child: Option<u32>) -> Result<Option<u32>, ForestError> {
        match slot {
            Slot::Root => {}
            Slot::Left(p) => self.nodes[p as usize].left = child,
            Slot::Right(p) => self.nodes[p as usize].right = child,
        }
        Ok(child)
    }

    fn release(&mut self, at: u32) {
        let node = &mut self.nodes[at as usize];
        node.left = None;
        node.right = None;
        node.height = 0;
        self.released += 1;
    }

    fn rotate_left(&mut self, x: u32) -> Result<u32, ForestError> {
        let Some(y) = self.right(x) else {
            return Ok(x);
        };
        let z = self.left(y);
        self.nodes[y as usize].left = Some(x);
        self.nodes[x as usize].right = z;
        update_height(self, x);
        update_height(self, y);
        Ok(y)
    }

    fn rotate_right(&mut self, x: u32) -> Result<u32, ForestError> {
        let Some(y) = self.left(x) else {
            return Ok(x);
        };
        let z = self.right(y);
        self.nodes[y as usize].right = Some(x);
        self.nodes[x as usize].left = z;
        update_height(self, x);
        update_height(self, y);
        Ok(y)
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            capacity: self.capacity,
            allocated: self.nodes.len(),
            live: self.nodes.len() - self.released,
            released: self.released,
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.released = 0;
    }
}
