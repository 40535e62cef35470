//! Dynamic block storage: open-ended named children

use crate::category::Category;
use crate::node::NodeId;
use crate::ordered::OrderedMap;
use std::sync::Arc;

/// Children of a block whose child set is open-ended
///
/// Keeps two indices over the same members: declaration order and one
/// bucket per category. Buckets are created on first use and dropped when
/// they become empty.
#[derive(Debug, Clone, Default)]
pub struct DynamicBlock {
    order: OrderedMap<Arc<str>, NodeId>,
    by_category: OrderedMap<Category, OrderedMap<Arc<str>, NodeId>>,
}

impl DynamicBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Child bound at `name`
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.order.get(name).copied()
    }

    /// Children in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, NodeId)> + '_ {
        self.order.iter().map(|(name, id)| (name, *id))
    }

    /// Categories with at least one child, in first-seen order
    pub fn categories(&self) -> impl Iterator<Item = &Category> + '_ {
        self.by_category.keys()
    }

    /// Child at position `i` of the declaration order, or of one category bucket
    pub fn child_at(&self, category: Option<&Category>, i: usize) -> Option<(&Arc<str>, NodeId)> {
        let index = match category {
            None => &self.order,
            Some(category) => self.by_category.get(category)?,
        };
        index.get_index(i).map(|(name, id)| (name, *id))
    }

    /// Name under which `child` is stored, scanning only its category bucket
    pub fn key_of(&self, category: &Category, child: NodeId) -> Option<&Arc<str>> {
        self.by_category
            .get(category)?
            .iter()
            .find(|(_, id)| **id == child)
            .map(|(name, _)| name)
    }

    pub(crate) fn insert(&mut self, name: Arc<str>, category: &Category, child: NodeId) {
        self.by_category
            .get_or_insert_with(category.clone(), OrderedMap::new)
            .insert(name.clone(), child);
        self.order.insert(name, child);
    }

    pub(crate) fn remove(&mut self, name: &str, category: &Category) -> Option<NodeId> {
        let child = self.order.shift_remove(name)?;
        let now_empty = match self.by_category.get_mut(category) {
            Some(bucket) => {
                bucket.shift_remove(name);
                bucket.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.by_category.shift_remove(category);
        }
        Some(child)
    }

    /// Every child appears exactly once in the order index and in one bucket
    #[cfg(test)]
    pub(crate) fn indices_agree(&self) -> bool {
        let bucketed: usize = self.by_category.values().map(|b| b.len()).sum();
        bucketed == self.order.len()
            && self.by_category.values().all(|bucket| {
                !bucket.is_empty()
                    && bucket
                        .iter()
                        .all(|(name, id)| self.order.get(name) == Some(id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[test]
    fn test_insert_indexes_by_order_and_category() {
        let mut block = DynamicBlock::new();
        let (x, c, y) = (NodeId::new(), NodeId::new(), NodeId::new());
        block.insert(name("x"), &Category::new("Var"), x);
        block.insert(name("c"), &Category::new("Con"), c);
        block.insert(name("y"), &Category::new("Var"), y);

        assert_eq!(block.len(), 3);
        assert_eq!(block.child_at(None, 1).map(|(_, id)| id), Some(c));
        let var = Category::new("Var");
        assert_eq!(block.child_at(Some(&var), 1).map(|(_, id)| id), Some(y));
        assert_eq!(
            block.categories().map(|c| c.as_str()).collect::<Vec<_>>(),
            vec!["Var", "Con"]
        );
        assert!(block.indices_agree());
    }

    #[test]
    fn test_remove_drops_empty_bucket() {
        let mut block = DynamicBlock::new();
        let c = NodeId::new();
        let con = Category::new("Con");
        block.insert(name("c"), &con, c);

        assert_eq!(block.remove("c", &con), Some(c));
        assert!(block.is_empty());
        assert_eq!(block.categories().count(), 0);
        assert_eq!(block.remove("c", &con), None);
        assert!(block.indices_agree());
    }

    #[test]
    fn test_key_of_scans_bucket() {
        let mut block = DynamicBlock::new();
        let x = NodeId::new();
        let var = Category::new("Var");
        block.insert(name("x"), &var, x);

        assert_eq!(block.key_of(&var, x).map(|n| &**n), Some("x"));
        assert_eq!(block.key_of(&Category::new("Con"), x), None);
        assert_eq!(block.key_of(&var, NodeId::new()), None);
    }
}
