//! Insertion-ordered map used for block indices and dict containers

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Map that iterates in insertion order and supports positional access
///
/// Removal shifts later entries down, so positions always match the order in
/// which surviving entries were inserted.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Position of a key in insertion order
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).copied()
    }

    /// Entry at a position in insertion order
    pub fn get_index(&self, i: usize) -> Option<(&K, &V)> {
        self.entries.get(i).map(|(k, v)| (k, v))
    }

    /// Insert a value; an existing key keeps its position
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Value for a key, inserting one built by `make` if absent
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(key.clone(), i);
                self.entries.push((key, make()));
                i
            }
        };
        &mut self.entries[i].1
    }

    /// Remove a key, shifting later entries to keep order
    pub fn shift_remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.index.remove(key)?;
        let (_, value) = self.entries.remove(i);
        for (k, _) in &self.entries[i..] {
            if let Some(pos) = self.index.get_mut::<K>(k) {
                *pos -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut map = OrderedMap::new();
        map.insert("c", 1);
        map.insert("a", 2);
        map.insert("b", 3);

        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(map.get_index(1), Some((&"a", &2)));
    }

    #[test]
    fn test_insert_existing_keeps_position() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.insert("a", 10), Some(1));

        assert_eq!(map.position("a"), Some(0));
        assert_eq!(map.get("a"), Some(&10));
    }

    #[test]
    fn test_shift_remove_reindexes() {
        let mut map = OrderedMap::new();
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            map.insert(*k, i);
        }

        assert_eq!(map.shift_remove("b"), Some(1));
        assert_eq!(map.len(), 3);
        assert_eq!(map.position("c"), Some(1));
        assert_eq!(map.position("d"), Some(2));
        assert_eq!(map.get("d"), Some(&3));
        assert_eq!(map.shift_remove("b"), None);
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut map: OrderedMap<&str, Vec<u32>> = OrderedMap::new();
        map.get_or_insert_with("x", Vec::new).push(1);
        map.get_or_insert_with("x", Vec::new).push(2);

        assert_eq!(map.get("x"), Some(&vec![1, 2]));
        assert_eq!(map.len(), 1);
    }
}
