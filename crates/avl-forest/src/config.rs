//! Choosing a storage discipline at runtime.

use std::fmt::{self, Debug};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForestError;
use crate::events::TreeEvent;
use crate::reference::ReferenceTree;
use crate::tree::{ArenaTree, BalancedTree, ImplicitTree};
use crate::types::{NodeView, StoreStats};

/// Slots reserved when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 100_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Owned boxed nodes; capacity is ignored.
    Reference,
    /// Non-reclaiming index arena.
    #[default]
    Arena,
    /// Implicit complete-binary-tree slots.
    Implicit,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Reference => "reference",
            StoreKind::Arena => "arena",
            StoreKind::Implicit => "implicit",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = ForestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "reference" | "ref" | "boxed" => Ok(Self::Reference),
            "arena" => Ok(Self::Arena),
            "implicit" | "implicit_indexed" => Ok(Self::Implicit),
            _ => Err(ForestError::UnknownStore(value.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub store: StoreKind,
    pub capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TreeConfig {
    pub fn new(store: StoreKind, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub fn build<K: Ord + Clone + Debug>(&self) -> AnyTree<K> {
        tracing::debug!(store = %self.store, capacity = self.capacity, "building tree");
        match self.store {
            StoreKind::Reference => AnyTree::Reference(ReferenceTree::new()),
            StoreKind::Arena => AnyTree::Arena(ArenaTree::with_capacity(self.capacity)),
            StoreKind::Implicit => AnyTree::Implicit(ImplicitTree::with_capacity(self.capacity)),
        }
    }
}

/// Node name shared by every variant: the key for owned nodes, the index or
/// slot otherwise.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator<K> {
    Node(K),
    Slot(usize),
}

#[derive(Debug)]
pub enum AnyTree<K: Ord + Clone + Debug> {
    Reference(ReferenceTree<K>),
    Arena(ArenaTree<K>),
    Implicit(ImplicitTree<K>),
}

impl<K: Ord + Clone + Debug> AnyTree<K> {
    pub fn kind(&self) -> StoreKind {
        match self {
            AnyTree::Reference(_) => StoreKind::Reference,
            AnyTree::Arena(_) => StoreKind::Arena,
            AnyTree::Implicit(_) => StoreKind::Implicit,
        }
    }

    /// Slot accounting; `None` for owned nodes.
    pub fn stats(&self) -> Option<StoreStats> {
        match self {
            AnyTree::Reference(_) => None,
            AnyTree::Arena(t) => Some(t.stats()),
            AnyTree::Implicit(t) => Some(t.stats()),
        }
    }

    pub fn min(&self) -> Option<&K> {
        match self {
            AnyTree::Reference(t) => t.min(),
            AnyTree::Arena(t) => t.min(),
            AnyTree::Implicit(t) => t.min(),
        }
    }

    pub fn max(&self) -> Option<&K> {
        match self {
            AnyTree::Reference(t) => t.max(),
            AnyTree::Arena(t) => t.max(),
            AnyTree::Implicit(t) => t.max(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TreeEvent<K>) + 'static) -> u64 {
        match self {
            AnyTree::Reference(t) => t.subscribe(listener),
            AnyTree::Arena(t) => t.subscribe(listener),
            AnyTree::Implicit(t) => t.subscribe(listener),
        }
    }

    pub fn unsubscribe(&mut self, id: u64) -> bool {
        match self {
            AnyTree::Reference(t) => t.unsubscribe(id),
            AnyTree::Arena(t) => t.unsubscribe(id),
            AnyTree::Implicit(t) => t.unsubscribe(id),
        }
    }

    pub fn clear(&mut self) {
        match self {
            AnyTree::Reference(t) => t.clear(),
            AnyTree::Arena(t) => t.clear(),
            AnyTree::Implicit(t) => t.clear(),
        }
    }
}

impl<K: Ord + Clone + Debug> BalancedTree<K> for AnyTree<K> {
    type Locator = Locator<K>;

    fn insert(&mut self, key: K) -> Result<bool, ForestError> {
        match self {
            AnyTree::Reference(t) => t.insert(key),
            AnyTree::Arena(t) => t.insert(key),
            AnyTree::Implicit(t) => t.insert(key),
        }
    }

    fn delete(&mut self, key: &K) -> Result<bool, ForestError> {
        match self {
            AnyTree::Reference(t) => t.delete(key),
            AnyTree::Arena(t) => t.delete(key),
            AnyTree::Implicit(t) => t.delete(key),
        }
    }

    fn search(&self, key: &K) -> Option<Locator<K>> {
        match self {
            AnyTree::Reference(t) => t.search(key).map(Locator::Node),
            AnyTree::Arena(t) => t.search(key).map(|at| Locator::Slot(at as usize)),
            AnyTree::Implicit(t) => t.search(key).map(Locator::Slot),
        }
    }

    fn len(&self) -> usize {
        match self {
            AnyTree::Reference(t) => t.len(),
            AnyTree::Arena(t) => t.len(),
            AnyTree::Implicit(t) => t.len(),
        }
    }

    fn height(&self) -> u32 {
        match self {
            AnyTree::Reference(t) => t.height(),
            AnyTree::Arena(t) => t.height(),
            AnyTree::Implicit(t) => t.height(),
        }
    }

    fn traverse(&self) -> impl Iterator<Item = NodeView<K, Locator<K>>> + '_ {
        let views: Box<dyn Iterator<Item = NodeView<K, Locator<K>>> + '_> = match self {
            AnyTree::Reference(t) => Box::new(t.traverse().map(|v| v.map_locator(Locator::Node))),
            AnyTree::Arena(t) => Box::new(
                t.traverse()
                    .map(|v| v.map_locator(|at| Locator::Slot(at as usize))),
            ),
            AnyTree::Implicit(t) => Box::new(t.traverse().map(|v| v.map_locator(Locator::Slot))),
        };
        views
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        let keys: Box<dyn Iterator<Item = &'a K> + 'a> = match self {
            AnyTree::Reference(t) => Box::new(t.keys()),
            AnyTree::Arena(t) => Box::new(t.keys()),
            AnyTree::Implicit(t) => Box::new(t.keys()),
        };
        keys
    }
}
