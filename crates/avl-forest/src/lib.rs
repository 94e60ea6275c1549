//! AVL trees over three storage disciplines.
//!
//! The same balancing rules run against:
//!
//! - **owned nodes** ([`ReferenceTree`]): every parent owns its children
//!   through `Box`;
//! - **an index arena** ([`ArenaTree`]): nodes live in a flat table and are
//!   addressed by `u32` indices handed out by a free pointer that never
//!   reclaims slots;
//! - **implicit slots** ([`ImplicitTree`]): node positions are complete
//!   binary tree indices (children of `i` at `2i + 1` / `2i + 2`), so a
//!   rotation has to physically move whole subtrees.
//!
//! The two indexed variants share one [`AvlTree`] implementation written
//! against the [`NodeStore`] trait. All variants expose [`BalancedTree`] and a
//! pre-order export ([`NodeView`]) that the storage-independent checker in
//! [`validate`] consumes.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! [`types`] | [`NodeStore`], [`Slot`], [`Rotation`], [`NodeView`], [`StoreStats`] |
//! [`balance`] | height bookkeeping, rotation selection, `rebalance` |
//! [`arena`] | [`ArenaStore`] |
//! [`implicit`] | [`ImplicitStore`] and the index-free [`Subtree`] |
//! [`tree`] | [`AvlTree`], [`BalancedTree`] |
//! [`reference`] | [`ReferenceTree`] |
//! [`config`] | [`TreeConfig`], [`StoreKind`], [`AnyTree`] |
//! [`events`] | [`TreeEvent`] and listener registry |
//!
//! ```
//! use avl_forest::ArenaTree;
//!
//! let mut tree = ArenaTree::with_capacity(16);
//! for key in [10, 20, 30] {
//!     tree.insert(key).unwrap();
//! }
//! assert_eq!(tree.height(), 2);
//! assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
//! tree.assert_valid().unwrap();
//! ```

pub mod arena;
pub mod balance;
pub mod config;
pub mod error;
pub mod events;
pub mod implicit;
pub mod iter;
pub mod reference;
pub mod tree;
pub mod types;
pub mod validate;

pub use arena::{ArenaNode, ArenaStore};
pub use config::{AnyTree, Locator, StoreKind, TreeConfig, DEFAULT_CAPACITY};
pub use error::ForestError;
pub use events::{Observers, TreeEvent};
pub use implicit::{depth_capacity, ImplicitStore, Subtree, MAX_DEPTH};
pub use iter::{Keys, Traverse};
pub use reference::{RefKeys, RefNode, RefTraverse, ReferenceTree};
pub use tree::{ArenaTree, AvlTree, BalancedTree, ImplicitTree};
pub use types::{NodeStore, NodeView, Rotation, Slot, StoreStats};
pub use validate::check_views;
