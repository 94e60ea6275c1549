//! Storage-facing types shared by every tree variant.
//!
//! A [`NodeStore`] owns node payloads (key, height) and structure (left and
//! right links). Nodes are addressed by an opaque `Loc`: an index into a flat
//! table for [`crate::ArenaStore`], a structural slot position for
//! [`crate::ImplicitStore`]. All tree algorithms in [`crate::balance`] and
//! [`crate::tree`] are written against this trait only.

use std::fmt::Debug;

use serde::Serialize;

use crate::error::ForestError;

/// Where a node hangs: the tree root, or one side of a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot<L> {
    Root,
    Left(L),
    Right(L),
}

/// One of the four AVL restructuring cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Left-left case: rotate right at the node.
    Right,
    /// Right-right case: rotate left at the node.
    Left,
    /// Left-right case: rotate left at the left child, then right at the node.
    LeftRight,
    /// Right-left case: rotate right at the right child, then left at the node.
    RightLeft,
}

impl Rotation {
    /// Conventional case name (`LL`, `RR`, `LR`, `RL`).
    pub fn case(self) -> &'static str {
        match self {
            Rotation::Right => "LL",
            Rotation::Left => "RR",
            Rotation::LeftRight => "LR",
            Rotation::RightLeft => "RL",
        }
    }
}

/// Snapshot of one live node, as yielded by the pre-order export hook.
///
/// `left` and `right` hold the children's locators so that parent/child edges
/// can be rebuilt without knowing how the tree is stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeView<K, L> {
    pub locator: L,
    pub key: K,
    pub height: u32,
    pub depth: u32,
    pub left: Option<L>,
    pub right: Option<L>,
}

impl<K, L> NodeView<K, L> {
    /// Renames the node and both of its edges.
    pub fn map_locator<M>(self, f: impl Fn(L) -> M) -> NodeView<K, M> {
        NodeView {
            locator: f(self.locator),
            key: self.key,
            height: self.height,
            depth: self.depth,
            left: self.left.map(&f),
            right: self.right.map(&f),
        }
    }
}

/// Slot accounting for a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Configured number of slots.
    pub capacity: usize,
    /// Slots consumed so far. For the arena this never shrinks.
    pub allocated: usize,
    /// Slots holding a live node.
    pub live: usize,
    /// Slots given up by deletions and not reused.
    pub released: usize,
}

/// Node storage addressed by locators.
pub trait NodeStore {
    type Key: Ord + Clone + Debug;
    type Loc: Copy + Eq + Ord + Debug;

    fn key(&self, at: Self::Loc) -> &Self::Key;
    fn set_key(&mut self, at: Self::Loc, key: Self::Key);
    fn height(&self, at: Self::Loc) -> u32;
    fn set_height(&mut self, at: Self::Loc, height: u32);
    fn left(&self, at: Self::Loc) -> Option<Self::Loc>;
    fn right(&self, at: Self::Loc) -> Option<Self::Loc>;

    /// Creates a leaf holding `key` for the given slot.
    fn allocate(
        &mut self,
        slot: Slot<Self::Loc>,
        key: Self::Key,
    ) -> Result<Self::Loc, ForestError>;

    /// Hangs `child` (or nothing) at `slot` and returns the child's locator
    /// after the move. Stores whose locators are positional relocate the
    /// child's subtree here.
    fn attach(
        &mut self,
        slot: Slot<Self::Loc>,
        child: Option<Self::Loc>,
    ) -> Result<Option<Self::Loc>, ForestError>;

    /// Gives up the node at `at`. Its children are not touched.
    fn release(&mut self, at: Self::Loc);

    /// Rotates the subtree at `at` to the left and returns its new root.
    fn rotate_left(&mut self, at: Self::Loc) -> Result<Self::Loc, ForestError>;

    /// Rotates the subtree at `at` to the right and returns its new root.
    fn rotate_right(&mut self, at: Self::Loc) -> Result<Self::Loc, ForestError>;

    /// Applies `rotation` at `at` and returns the new subtree root. Double
    /// rotations default to two single rotations with the inner result
    /// hung back on `at`.
    fn rotate(&mut self, at: Self::Loc, rotation: Rotation) -> Result<Self::Loc, ForestError> {
        match rotation {
            Rotation::Right => self.rotate_right(at),
            Rotation::Left => self.rotate_left(at),
            Rotation::LeftRight => {
                if let Some(left) = self.left(at) {
                    let left = self.rotate_left(left)?;
                    self.attach(Slot::Left(at), Some(left))?;
                }
                self.rotate_right(at)
            }
            Rotation::RightLeft => {
                if let Some(right) = self.right(at) {
                    let right = self.rotate_right(right)?;
                    self.attach(Slot::Right(at), Some(right))?;
                }
                self.rotate_left(at)
            }
        }
    }

    /// Marks the start of an insert or delete. Stores that can fail after
    /// they started writing record enough here to undo the operation.
    fn begin(&mut self) {}

    /// The operation succeeded; drop whatever `begin` recorded.
    fn commit(&mut self) {}

    /// The operation failed; put every slot back as it was at `begin`.
    fn rollback(&mut self) {}

    fn stats(&self) -> StoreStats;

    /// Drops every node and resets allocation.
    fn clear(&mut self);
}
