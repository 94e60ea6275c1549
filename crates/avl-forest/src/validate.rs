//! Storage-independent invariant checks.
//!
//! The checker only sees what the export hook yields, so one implementation
//! covers owned nodes, arena indices and implicit slots alike.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::types::NodeView;

/// Verifies a pre-order export: every edge resolves, the order is really
/// pre-order, and BST order, stored heights and AVL balance all hold.
pub fn check_views<K, L>(views: impl IntoIterator<Item = NodeView<K, L>>) -> Result<(), String>
where
    K: Ord + Debug,
    L: Ord + Clone + Debug,
{
    let views: Vec<NodeView<K, L>> = views.into_iter().collect();
    let Some(root) = views.first() else {
        return Ok(());
    };

    let mut by_locator = BTreeMap::new();
    for (i, view) in views.iter().enumerate() {
        if by_locator.insert(view.locator.clone(), i).is_some() {
            return Err(format!("Locator {:?} exported twice", view.locator));
        }
    }

    let mut walk = Walk {
        views: &views,
        by_locator,
        order: Vec::with_capacity(views.len()),
    };
    walk.visit(&root.locator, None, None, 0)?;

    if walk.order.len() != views.len() {
        return Err(format!(
            "{} of {} exported nodes are unreachable from the root",
            views.len() - walk.order.len(),
            views.len()
        ));
    }
    for (view, idx) in views.iter().zip(&walk.order) {
        if views[*idx].locator != view.locator {
            return Err(format!(
                "Export is not in pre-order at locator {:?}",
                view.locator
            ));
        }
    }
    Ok(())
}

struct Walk<'a, K, L> {
    views: &'a [NodeView<K, L>],
    by_locator: BTreeMap<L, usize>,
    order: Vec<usize>,
}

impl<K, L> Walk<'_, K, L>
where
    K: Ord + Debug,
    L: Ord + Clone + Debug,
{
    fn visit(
        &mut self,
        at: &L,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: u32,
    ) -> Result<u32, String> {
        let Some(&idx) = self.by_locator.get(at) else {
            return Err(format!("Dangling locator {at:?}"));
        };
        let views = self.views;
        let view = &views[idx];
        self.order.push(idx);

        if view.depth != depth {
            return Err(format!(
                "Depth mismatch at {:?}: exported {}, actual {depth}",
                view.key, view.depth
            ));
        }
        if lower.is_some_and(|lower| view.key <= *lower)
            || upper.is_some_and(|upper| view.key >= *upper)
        {
            return Err(format!("Node order violated at {:?}", view.key));
        }

        let lh = match &view.left {
            Some(l) => self.visit(l, lower, Some(&view.key), depth + 1)?,
            None => 0,
        };
        let rh = match &view.right {
            Some(r) => self.visit(r, Some(&view.key), upper, depth + 1)?,
            None => 0,
        };

        let expected = 1 + lh.max(rh);
        if view.height != expected {
            return Err(format!(
                "Height mismatch at {:?}: stored {}, actual {expected}",
                view.key, view.height
            ));
        }
        let bf = lh as i64 - rh as i64;
        if !(-1..=1).contains(&bf) {
            return Err(format!("AVL balance violated at {:?}: {bf}", view.key));
        }
        Ok(expected)
    }
}
