//! Informational events raised by tree operations.
//!
//! Nothing in the algorithms prints. Callers that want to see duplicates,
//! misses or rotations subscribe a listener; the same events are also
//! emitted as `tracing` records.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::Rotation;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent<K> {
    Inserted { key: K },
    /// The key was already present; the tree is unchanged.
    Duplicate { key: K },
    Removed { key: K },
    /// Delete of a key that is not in the tree; the tree is unchanged.
    Missing { key: K },
    /// A rotation case was applied; `root` now tops the rotated subtree.
    Rotated { rotation: Rotation, root: K },
}

type Listener<K> = Box<dyn FnMut(&TreeEvent<K>)>;

/// Listener registry owned by a tree.
pub struct Observers<K> {
    next_id: u64,
    listeners: BTreeMap<u64, Listener<K>>,
}

impl<K> Default for Observers<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: BTreeMap::new(),
        }
    }
}

impl<K> fmt::Debug for Observers<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<K> Observers<K> {
    pub fn subscribe(&mut self, listener: impl FnMut(&TreeEvent<K>) + 'static) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&mut self, id: u64) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers events that were held back until an operation succeeded.
    pub fn emit_all(&mut self, events: Vec<TreeEvent<K>>) {
        for event in events {
            for listener in self.listeners.values_mut() {
                listener(&event);
            }
        }
    }

    /// Builds the event only when someone is listening.
    pub fn emit(&mut self, event: impl FnOnce() -> TreeEvent<K>) {
        if self.listeners.is_empty() {
            return;
        }
        let event = event();
        for listener in self.listeners.values_mut() {
            listener(&event);
        }
    }
}
