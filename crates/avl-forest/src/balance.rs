//! Height bookkeeping and rotation selection.
//!
//! These functions are identical for every storage discipline. Only the
//! store decides how a rotation is materialized: relinking for the arena,
//! subtree relocation for implicit slots.

use crate::error::ForestError;
use crate::types::{NodeStore, Rotation};

/// Height of the node at `at`, 0 when absent.
#[inline]
pub fn height<S: NodeStore>(store: &S, at: Option<S::Loc>) -> u32 {
    at.map_or(0, |at| store.height(at))
}

/// `height(left) - height(right)`, 0 when absent.
pub fn balance_factor<S: NodeStore>(store: &S, at: Option<S::Loc>) -> i32 {
    let Some(at) = at else {
        return 0;
    };
    height(store, store.left(at)) as i32 - height(store, store.right(at)) as i32
}

/// Recomputes and stores the height of `at` from its current children.
pub fn update_height<S: NodeStore>(store: &mut S, at: S::Loc) {
    let h = 1 + height(store, store.left(at)).max(height(store, store.right(at)));
    store.set_height(at, h);
}

/// Picks the rotation case for a node, or `None` when it is balanced.
///
/// `left_balance` and `right_balance` are the balance factors of the node's
/// children. The same thresholds drive insertion and deletion.
pub fn select_rotation(balance: i32, left_balance: i32, right_balance: i32) -> Option<Rotation> {
    if balance > 1 {
        if left_balance >= 0 {
            Some(Rotation::Right)
        } else {
            Some(Rotation::LeftRight)
        }
    } else if balance < -1 {
        if right_balance <= 0 {
            Some(Rotation::Left)
        } else {
            Some(Rotation::RightLeft)
        }
    } else {
        None
    }
}

/// Updates the height of `at` and restores its balance.
///
/// Returns the locator now rooting the subtree and the rotation applied, if
/// any. Errors come from the store's rotation and are returned as is.
pub fn rebalance<S: NodeStore>(
    store: &mut S,
    at: S::Loc,
) -> Result<(S::Loc, Option<Rotation>), ForestError> {
    update_height(store, at);
    let rotation = select_rotation(
        balance_factor(store, Some(at)),
        balance_factor(store, store.left(at)),
        balance_factor(store, store.right(at)),
    );
    let Some(rotation) = rotation else {
        return Ok((at, None));
    };

    let root = store.rotate(at, rotation)?;
    Ok((root, Some(rotation)))
}
