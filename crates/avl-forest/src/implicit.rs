//! Fixed-capacity slots laid out as an implicit complete binary tree.
//!
//! The children of slot `i` live at `2i + 1` and `2i + 2`; the root is slot 0.
//! A node's slot *is* its structural position, so nothing can be relinked.
//! Every rotation instead runs a full relocation cycle:
//!
//! 1. extract the subtree at the pivot into a [`Subtree`],
//! 2. transform it with the logical rotation,
//! 3. check that every node still lands inside the array,
//! 4. clear the old footprint,
//! 5. write the transformed subtree back from the pivot, heights bottom-up.
//!
//! A rotation therefore costs time proportional to the size of the rotated
//! subtree, not O(1).

use std::fmt::Debug;

use crate::balance::update_height;
use crate::error::ForestError;
use crate::types::{NodeStore, Rotation, Slot, StoreStats};

#[inline]
pub fn left_of(i: usize) -> usize {
    2 * i + 1
}

#[inline]
pub fn right_of(i: usize) -> usize {
    2 * i + 2
}

/// Index-free copy of a subtree, used while a rotation is in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subtree<K> {
    Empty,
    Node {
        key: K,
        left: Box<Subtree<K>>,
        right: Box<Subtree<K>>,
    },
}

impl<K> Subtree<K> {
    pub fn leaf(key: K) -> Self {
        Subtree::Node {
            key,
            left: Box::new(Subtree::Empty),
            right: Box::new(Subtree::Empty),
        }
    }

    /// `x(a, y(z, c))` becomes `y(x(a, z), c)`.
    pub fn rotate_left(self) -> Self {
        match self {
            Subtree::Node {
                key: x,
                left: a,
                right,
            } => match *right {
                Subtree::Node {
                    key: y,
                    left: z,
                    right: c,
                } => Subtree::Node {
                    key: y,
                    left: Box::new(Subtree::Node {
                        key: x,
                        left: a,
                        right: z,
                    }),
                    right: c,
                },
                Subtree::Empty => Subtree::Node {
                    key: x,
                    left: a,
                    right: Box::new(Subtree::Empty),
                },
            },
            Subtree::Empty => Subtree::Empty,
        }
    }

    /// `x(y(a, z), c)` becomes `y(a, x(z, c))`.
    pub fn rotate_right(self) -> Self {
        match self {
            Subtree::Node {
                key: x,
                left,
                right: c,
            } => match *left {
                Subtree::Node {
                    key: y,
                    left: a,
                    right: z,
                } => Subtree::Node {
                    key: y,
                    left: a,
                    right: Box::new(Subtree::Node {
                        key: x,
                        left: z,
                        right: c,
                    }),
                },
                Subtree::Empty => Subtree::Node {
                    key: x,
                    left: Box::new(Subtree::Empty),
                    right: c,
                },
            },
            Subtree::Empty => Subtree::Empty,
        }
    }

    fn map_left(self, f: impl FnOnce(Subtree<K>) -> Subtree<K>) -> Self {
        match self {
            Subtree::Node { key, left, right } => Subtree::Node {
                key,
                left: Box::new(f(*left)),
                right,
            },
            Subtree::Empty => Subtree::Empty,
        }
    }

    fn map_right(self, f: impl FnOnce(Subtree<K>) -> Subtree<K>) -> Self {
        match self {
            Subtree::Node { key, left, right } => Subtree::Node {
                key,
                left,
                right: Box::new(f(*right)),
            },
            Subtree::Empty => Subtree::Empty,
        }
    }

    /// Whether every node lands on a slot below `capacity` when the subtree
    /// is written starting at slot `at`.
    pub fn fits(&self, at: usize, capacity: usize) -> bool {
        match self {
            Subtree::Empty => true,
            Subtree::Node { left, right, .. } => {
                at < capacity
                    && left.fits(left_of(at), capacity)
                    && right.fits(right_of(at), capacity)
            }
        }
    }
}

/// Deepest layout [`ImplicitStore::with_depth`] allocates. Slot indices then
/// fit in a `u32`, as arena indices do.
pub const MAX_DEPTH: u32 = 32;

/// Slots in `depth` complete levels, `depth` capped at [`MAX_DEPTH`].
pub fn depth_capacity(depth: u32) -> usize {
    usize::try_from((1u64 << depth.min(MAX_DEPTH)) - 1).unwrap_or(usize::MAX)
}

/// Slot contents overwritten since `begin`, oldest first.
type Journal<K> = Vec<(usize, Option<K>, u32)>;

#[derive(Clone, Debug)]
pub struct ImplicitStore<K> {
    keys: Vec<Option<K>>,
    heights: Vec<u32>,
    occupied: usize,
    journal: Option<Journal<K>>,
}

impl<K> ImplicitStore<K> {
    /// Allocates `capacity` empty slots. Any capacity is accepted; one that
    /// does not end on a complete level can make rotations overflow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: std::iter::repeat_with(|| None).take(capacity).collect(),
            heights: vec![0; capacity],
            occupied: 0,
            journal: None,
        }
    }

    /// Allocates `2^depth - 1` slots: exactly `depth` complete levels.
    /// Depths past [`MAX_DEPTH`] are capped.
    pub fn with_depth(depth: u32) -> Self {
        if depth > MAX_DEPTH {
            tracing::warn!(depth, max = MAX_DEPTH, "implicit depth capped");
        }
        Self::with_capacity(depth_capacity(depth))
    }

    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Key stored at slot `at`, `None` for an empty or out-of-range slot.
    pub fn get(&self, at: usize) -> Option<&K> {
        self.keys.get(at).and_then(Option::as_ref)
    }

    #[inline]
    fn is_occupied(&self, at: usize) -> bool {
        matches!(self.keys.get(at), Some(Some(_)))
    }

    fn position(slot: Slot<usize>) -> usize {
        match slot {
            Slot::Root => 0,
            Slot::Left(p) => left_of(p),
            Slot::Right(p) => right_of(p),
        }
    }

    fn overflow(&self, slot: usize) -> ForestError {
        ForestError::RotationOverflow {
            slot,
            capacity: self.capacity(),
        }
    }
}

impl<K: Ord + Clone + Debug> ImplicitStore<K> {
    /// Records the current contents of `at` while an operation is open.
    fn save(&mut self, at: usize) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push((at, self.keys[at].clone(), self.heights[at]));
        }
    }

    /// Marks every slot of the subtree at `at` empty.
    fn clear_subtree(&mut self, at: usize) {
        if !self.is_occupied(at) {
            return;
        }
        self.save(at);
        self.keys[at] = None;
        self.heights[at] = 0;
        self.occupied -= 1;
        self.clear_subtree(left_of(at));
        self.clear_subtree(right_of(at));
    }

    /// Copies the subtree rooted at `at` out of the array.
    pub fn extract(&self, at: usize) -> Subtree<K> {
        match self.get(at) {
            None => Subtree::Empty,
            Some(key) => Subtree::Node {
                key: key.clone(),
                left: Box::new(self.extract(left_of(at))),
                right: Box::new(self.extract(right_of(at))),
            },
        }
    }

    /// Places `tree` starting at slot `at`. The caller has checked that it
    /// fits.
    fn write(&mut self, tree: Subtree<K>, at: usize) {
        let Subtree::Node { key, left, right } = tree else {
            return;
        };
        self.save(at);
        self.keys[at] = Some(key);
        self.occupied += 1;
        self.write(*left, left_of(at));
        self.write(*right, right_of(at));
        update_height(self, at);
    }

    /// Clears the footprint at `at` and writes `tree` there instead.
    fn replace(&mut self, at: usize, tree: Subtree<K>) -> Result<(), ForestError> {
        if !tree.fits(at, self.capacity()) {
            return Err(self.overflow(at));
        }
        self.clear_subtree(at);
        self.write(tree, at);
        Ok(())
    }

    /// Moves the subtree at `from` so that it is rooted at `to`.
    fn relocate(&mut self, from: usize, to: usize) -> Result<(), ForestError> {
        let tree = self.extract(from);
        if !tree.fits(to, self.capacity()) {
            return Err(self.overflow(to));
        }
        self.clear_subtree(from);
        self.write(tree, to);
        Ok(())
    }
}

impl<K: Ord + Clone + Debug> NodeStore for ImplicitStore<K> {
    type Key = K;
    type Loc = usize;

    fn key(&self, at: usize) -> &K {
        self.keys[at]
            .as_ref()
            .expect("locator points at an occupied slot")
    }

    fn set_key(&mut self, at: usize, key: K) {
        self.save(at);
        self.keys[at] = Some(key);
    }

    #[inline]
    fn height(&self, at: usize) -> u32 {
        self.heights[at]
    }

    fn set_height(&mut self, at: usize, height: u32) {
        self.save(at);
        self.heights[at] = height;
    }

    #[inline]
    fn left(&self, at: usize) -> Option<usize> {
        let l = left_of(at);
        self.is_occupied(l).then_some(l)
    }

    #[inline]
    fn right(&self, at: usize) -> Option<usize> {
        let r = right_of(at);
        self.is_occupied(r).then_some(r)
    }

    fn allocate(&mut self, slot: Slot<usize>, key: K) -> Result<usize, ForestError> {
        let at = Self::position(slot);
        if at >= self.capacity() {
            return Err(ForestError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        debug_assert!(!self.is_occupied(at), "slot {at} already holds a node");
        self.save(at);
        self.keys[at] = Some(key);
        self.heights[at] = 1;
        self.occupied += 1;
        Ok(at)
    }

    fn attach(
        &mut self,
        slot: Slot<usize>,
        child: Option<usize>,
    ) -> Result<Option<usize>, ForestError> {
        let at = Self::position(slot);
        match child {
            None => {
                self.clear_subtree(at);
                Ok(None)
            }
            Some(c) if c == at => Ok(Some(at)),
            Some(c) => {
                self.relocate(c, at)?;
                Ok(Some(at))
            }
        }
    }

    fn release(&mut self, at: usize) {
        self.save(at);
        if self.keys[at].take().is_some() {
            self.occupied -= 1;
        }
        self.heights[at] = 0;
    }

    fn rotate_left(&mut self, at: usize) -> Result<usize, ForestError> {
        if self.right(at).is_none() {
            return Ok(at);
        }
        self.rotate(at, Rotation::Left)
    }

    fn rotate_right(&mut self, at: usize) -> Result<usize, ForestError> {
        if self.left(at).is_none() {
            return Ok(at);
        }
        self.rotate(at, Rotation::Right)
    }

    /// One extract/transform/check/clear/write cycle per case. Both halves
    /// of a double rotation are applied to the extracted copy, so only the
    /// final shape has to fit.
    fn rotate(&mut self, at: usize, rotation: Rotation) -> Result<usize, ForestError> {
        let tree = self.extract(at);
        let rotated = match rotation {
            Rotation::Right => tree.rotate_right(),
            Rotation::Left => tree.rotate_left(),
            Rotation::LeftRight => tree.map_left(Subtree::rotate_left).rotate_right(),
            Rotation::RightLeft => tree.map_right(Subtree::rotate_right).rotate_left(),
        };
        self.replace(at, rotated)?;
        Ok(at)
    }

    fn begin(&mut self) {
        self.journal = Some(Vec::new());
    }

    fn commit(&mut self) {
        self.journal = None;
    }

    fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        tracing::debug!(writes = journal.len(), "restoring implicit slots");
        for (at, key, height) in journal.into_iter().rev() {
            match (self.keys[at].is_some(), key.is_some()) {
                (true, false) => self.occupied -= 1,
                (false, true) => self.occupied += 1,
                _ => {}
            }
            self.keys[at] = key;
            self.heights[at] = height;
        }
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            capacity: self.capacity(),
            allocated: self.occupied,
            live: self.occupied,
            released: 0,
        }
    }

    fn clear(&mut self) {
        self.keys.iter_mut().for_each(|k| *k = None);
        self.heights.iter_mut().for_each(|h| *h = 0);
        self.occupied = 0;
        self.journal = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Subtree<i64> {
        // 10 -> 20 -> 30, all to the right.
        Subtree::Node {
            key: 10,
            left: Box::new(Subtree::Empty),
            right: Box::new(Subtree::Node {
                key: 20,
                left: Box::new(Subtree::Empty),
                right: Box::new(Subtree::leaf(30)),
            }),
        }
    }

    #[test]
    fn logical_rotation_left() {
        let rotated = chain().rotate_left();
        assert_eq!(
            rotated,
            Subtree::Node {
                key: 20,
                left: Box::new(Subtree::leaf(10)),
                right: Box::new(Subtree::leaf(30)),
            }
        );
    }

    #[test]
    fn logical_rotations_are_inverse() {
        let tree = chain();
        assert_eq!(tree.clone().rotate_left().rotate_right(), tree);
    }

    #[test]
    fn fits_respects_capacity() {
        let tree = chain();
        // Slots 0, 2, 6.
        assert!(tree.fits(0, 7));
        assert!(!tree.fits(0, 6));
        assert!(Subtree::<i64>::Empty.fits(100, 0));
    }

    #[test]
    fn rotation_relocates_the_whole_subtree() {
        let mut store = ImplicitStore::with_depth(3);
        store.allocate(Slot::Root, 10).unwrap();
        store.allocate(Slot::Right(0), 20).unwrap();
        store.allocate(Slot::Right(2), 30).unwrap();
        update_height(&mut store, 2);
        update_height(&mut store, 0);

        assert_eq!(store.rotate_left(0), Ok(0));
        assert_eq!(store.get(0), Some(&20));
        assert_eq!(store.get(1), Some(&10));
        assert_eq!(store.get(2), Some(&30));
        assert_eq!(store.get(6), None);
        assert_eq!(store.height(0), 2);
        assert_eq!(store.stats().live, 3);
    }

    #[test]
    fn attach_moves_a_child_up() {
        let mut store = ImplicitStore::with_capacity(7);
        store.allocate(Slot::Root, 5).unwrap();
        store.allocate(Slot::Left(0), 3).unwrap();
        store.allocate(Slot::Left(1), 1).unwrap();
        store.release(0);

        assert_eq!(store.attach(Slot::Root, Some(1)), Ok(Some(0)));
        assert_eq!(store.get(0), Some(&3));
        assert_eq!(store.get(1), Some(&1));
        assert_eq!(store.get(3), None);
        assert_eq!(store.stats().live, 2);
    }

    #[test]
    fn overflowing_rotation_leaves_slots_untouched() {
        // Slots 0..=2 exist, 3..=6 do not: a left rotation of 0 -> 2 would
        // need slot 3 for the old root.
        let mut store = ImplicitStore::with_capacity(3);
        store.allocate(Slot::Root, 1).unwrap();
        store.allocate(Slot::Left(0), 0).unwrap();
        store.allocate(Slot::Right(0), 2).unwrap();
        update_height(&mut store, 0);

        assert_eq!(
            store.rotate_left(0),
            Err(ForestError::RotationOverflow {
                slot: 0,
                capacity: 3
            })
        );
        assert_eq!(store.get(0), Some(&1));
        assert_eq!(store.get(1), Some(&0));
        assert_eq!(store.get(2), Some(&2));
    }

    #[test]
    fn double_rotation_only_needs_the_final_shape_to_fit() {
        // 10 -> 20 -> 15 sits on slots 0, 2, 5. Rotating 20 on its own would
        // push it to slot 6, which does not exist.
        let mut store = ImplicitStore::with_capacity(6);
        store.allocate(Slot::Root, 10).unwrap();
        store.allocate(Slot::Right(0), 20).unwrap();
        store.allocate(Slot::Left(2), 15).unwrap();
        update_height(&mut store, 2);
        update_height(&mut store, 0);

        assert_eq!(store.rotate(0, Rotation::RightLeft), Ok(0));
        assert_eq!(store.get(0), Some(&15));
        assert_eq!(store.get(1), Some(&10));
        assert_eq!(store.get(2), Some(&20));
        assert_eq!(store.get(5), None);
        assert_eq!(store.height(0), 2);
    }

    #[test]
    fn rollback_restores_every_slot() {
        let mut store = ImplicitStore::with_capacity(7);
        store.allocate(Slot::Root, 10).unwrap();
        store.allocate(Slot::Right(0), 20).unwrap();
        update_height(&mut store, 0);
        let before = store.extract(0);

        store.begin();
        store.allocate(Slot::Right(2), 30).unwrap();
        update_height(&mut store, 2);
        update_height(&mut store, 0);
        store.rotate_left(0).unwrap();
        store.set_key(1, 5);
        store.rollback();

        assert_eq!(store.extract(0), before);
        assert_eq!(store.height(0), 2);
        assert_eq!(store.height(2), 1);
        assert_eq!(store.stats().live, 2);

        // Nothing is recorded once the operation is over.
        store.rollback();
        assert_eq!(store.extract(0), before);
    }

    #[test]
    fn commit_keeps_the_writes() {
        let mut store = ImplicitStore::with_capacity(3);
        store.begin();
        store.allocate(Slot::Root, 1).unwrap();
        store.commit();
        store.rollback();
        assert_eq!(store.get(0), Some(&1));
        assert_eq!(store.stats().live, 1);
    }

    #[test]
    fn depth_is_capped() {
        assert_eq!(depth_capacity(0), 0);
        assert_eq!(depth_capacity(3), 7);
        assert_eq!(depth_capacity(MAX_DEPTH + 1), depth_capacity(MAX_DEPTH));
        assert_eq!(depth_capacity(u32::MAX), depth_capacity(MAX_DEPTH));
        assert_eq!(ImplicitStore::<i64>::with_depth(4).capacity(), 15);
    }

    #[test]
    fn allocation_past_the_last_slot_fails() {
        let mut store = ImplicitStore::with_capacity(1);
        store.allocate(Slot::Root, 1).unwrap();
        assert_eq!(
            store.allocate(Slot::Left(0), 0),
            Err(ForestError::CapacityExceeded { capacity: 1 })
        );
    }
}
