//! Homogeneous list and dict containers
//!
//! Every member of a list or dict shares the container's category. With the
//! block category these are the block list and block dict; members may then
//! be blocks or nested block containers.

use crate::node::{Key, NodeId};
use crate::ordered::OrderedMap;

/// Ordered container addressed by position
#[derive(Debug, Clone, Default)]
pub struct ComponentList {
    members: Vec<NodeId>,
}

impl ComponentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.members.get(index).copied()
    }

    pub fn position(&self, child: NodeId) -> Option<usize> {
        self.members.iter().position(|&id| id == child)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    pub(crate) fn insert(&mut self, index: usize, child: NodeId) {
        self.members.insert(index, child);
    }

    pub(crate) fn replace(&mut self, index: usize, child: NodeId) -> Option<NodeId> {
        self.members
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, child))
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<NodeId> {
        (index < self.members.len()).then(|| self.members.remove(index))
    }
}

/// Keyed container preserving insertion order
#[derive(Debug, Clone, Default)]
pub struct ComponentDict {
    entries: OrderedMap<Key, NodeId>,
}

impl ComponentDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<NodeId> {
        self.entries.get(key).copied()
    }

    pub fn get_index(&self, i: usize) -> Option<(&Key, NodeId)> {
        self.entries.get_index(i).map(|(k, id)| (k, *id))
    }

    pub fn key_of(&self, child: NodeId) -> Option<&Key> {
        self.entries
            .iter()
            .find(|(_, id)| **id == child)
            .map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, NodeId)> + '_ {
        self.entries.iter().map(|(k, id)| (k, *id))
    }

    /// Replacing an existing key keeps its position
    pub(crate) fn insert(&mut self, key: Key, child: NodeId) -> Option<NodeId> {
        self.entries.insert(key, child)
    }

    pub(crate) fn remove(&mut self, key: &Key) -> Option<NodeId> {
        self.entries.shift_remove(key)
    }
}
