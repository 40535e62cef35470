//! Model arena: node ownership, attachment and child access

use crate::block::DynamicBlock;
use crate::category::Category;
use crate::container::{ComponentDict, ComponentList};
use crate::error::{Error, Result};
use crate::limits::{validate_category, validate_key_name, ValidationError};
use crate::node::{Categorized, Component, Key, Node, NodeId, NodeKind};
use crate::static_block::{StaticBlock, StaticLayout};
use std::collections::HashMap;
use std::sync::Arc;

/// Arena owning every node of one or more container trees
///
/// Nodes are created free-standing and join a tree when attached under a
/// key. Parent links are plain [`NodeId`] handles, so the arena is the only
/// owner of node storage.
#[derive(Debug, Clone, Default)]
pub struct Model {
    nodes: HashMap<NodeId, Node>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(Error::UnknownNode(id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Node creation
    // ─────────────────────────────────────────────────────────────────────────

    fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        tracing::trace!("Created {} node {} ({})", node.kind_label(), id, node.category);
        self.nodes.insert(id, node);
        id
    }

    /// Add a free-standing leaf component
    pub fn add_component(&mut self, component: Component) -> Result<NodeId> {
        validate_category(component.category.as_str())?;
        if component.category.is_block() {
            return Err(ValidationError::ReservedCategory(component.category.0).into());
        }
        Ok(self.insert_node(Node::new(
            component.category,
            component.active,
            NodeKind::Component {
                metadata: component.metadata,
            },
        )))
    }

    /// Add a free-standing block with an open-ended child set
    pub fn add_block(&mut self) -> NodeId {
        self.insert_node(Node::new(
            Category::block(),
            Some(true),
            NodeKind::Block(DynamicBlock::new()),
        ))
    }

    /// Add a free-standing block whose slots come from `layout`
    pub fn add_static_block(&mut self, layout: Arc<StaticLayout>) -> NodeId {
        self.insert_node(Node::new(
            Category::block(),
            Some(true),
            NodeKind::Static(StaticBlock::new(layout)),
        ))
    }

    /// Add a free-standing list holding members of one category
    pub fn add_list(&mut self, category: impl Into<Category>) -> Result<NodeId> {
        let category = category.into();
        validate_category(category.as_str())?;
        Ok(self.insert_node(Node::new(
            category,
            Some(true),
            NodeKind::List(ComponentList::new()),
        )))
    }

    /// Add a free-standing dict holding members of one category
    pub fn add_dict(&mut self, category: impl Into<Category>) -> Result<NodeId> {
        let category = category.into();
        validate_category(category.as_str())?;
        Ok(self.insert_node(Node::new(
            category,
            Some(true),
            NodeKind::Dict(ComponentDict::new()),
        )))
    }

    pub fn add_block_list(&mut self) -> NodeId {
        self.insert_node(Node::new(
            Category::block(),
            Some(true),
            NodeKind::List(ComponentList::new()),
        ))
    }

    pub fn add_block_dict(&mut self) -> NodeId {
        self.insert_node(Node::new(
            Category::block(),
            Some(true),
            NodeKind::Dict(ComponentDict::new()),
        ))
    }

    /// Remove a free-standing node and everything beneath it from the arena
    ///
    /// Returns the number of nodes dropped.
    pub fn discard(&mut self, id: NodeId) -> Result<usize> {
        if let Some(parent) = self.node(id)?.parent {
            return Err(Error::Attached { node: id, parent });
        }

        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                removed += 1;
                match &node.kind {
                    NodeKind::Component { .. } => {}
                    NodeKind::Block(block) => stack.extend(block.iter().map(|(_, id)| id)),
                    NodeKind::Static(block) => stack.extend(block.iter().map(|(_, id)| id)),
                    NodeKind::List(list) => stack.extend(list.iter()),
                    NodeKind::Dict(dict) => stack.extend(dict.iter().map(|(_, id)| id)),
                }
            }
        }

        tracing::debug!("Discarded {} nodes rooted at {}", removed, id);
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Flags and ancestry
    // ─────────────────────────────────────────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn category(&self, id: NodeId) -> Result<&Category> {
        Ok(&self.node(id)?.category)
    }

    pub fn is_active(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_active())
    }

    /// Set the node's own active flag; descendants keep theirs
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<()> {
        self.node_mut(id)?.active = Some(active);
        Ok(())
    }

    pub fn activate(&mut self, id: NodeId) -> Result<()> {
        self.set_active(id, true)
    }

    pub fn deactivate(&mut self, id: NodeId) -> Result<()> {
        self.set_active(id, false)
    }

    /// Parent, grandparent, ... up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            model: self,
            next: self.parent(id),
        }
    }

    /// Topmost ancestor, or the node itself when free-standing
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Child bound at `key` on `container`
    pub fn child(&self, container: NodeId, key: impl Into<Key>) -> Result<Option<NodeId>> {
        self.lookup(container, &key.into())
    }

    fn lookup(&self, container: NodeId, key: &Key) -> Result<Option<NodeId>> {
        let node = self.node(container)?;
        Ok(match &node.kind {
            NodeKind::Component { .. } => return Err(Error::NotAContainer(container)),
            NodeKind::Block(block) => key.as_name().and_then(|n| block.get(n)),
            NodeKind::Static(block) => key.as_name().and_then(|n| block.get(n)),
            NodeKind::List(list) => key.as_index().and_then(|i| list.get(i)),
            NodeKind::Dict(dict) => dict.get(key),
        })
    }

    /// Key under which `child` is stored on `container`
    pub fn key_of(&self, container: NodeId, child: NodeId) -> Result<Key> {
        let node = self.node(container)?;
        let unknown = || Error::UnknownChild(format!("{} on {}", child, container));
        let child_node = self.nodes.get(&child).ok_or_else(unknown)?;
        let key = match &node.kind {
            NodeKind::Component { .. } => return Err(Error::NotAContainer(container)),
            NodeKind::Block(block) => block
                .key_of(&child_node.category, child)
                .map(|name| Key::Name(name.clone())),
            NodeKind::Static(block) => block.key_of(child).map(|name| Key::Name(name.clone())),
            NodeKind::List(list) => list.position(child).map(Key::Index),
            NodeKind::Dict(dict) => dict.key_of(child).cloned(),
        };
        key.ok_or_else(unknown)
    }

    /// Direct children in declaration order
    pub fn children(&self, container: NodeId) -> Result<Children<'_>> {
        self.children_filtered(container, None)
    }

    /// Direct children of one category, in that category's order
    pub fn children_in(
        &self,
        container: NodeId,
        category: impl Into<Category>,
    ) -> Result<Children<'_>> {
        self.children_filtered(container, Some(category.into()))
    }

    pub(crate) fn children_filtered(
        &self,
        container: NodeId,
        category: Option<Category>,
    ) -> Result<Children<'_>> {
        if !self.node(container)?.is_container() {
            return Err(Error::NotAContainer(container));
        }
        Ok(Children {
            model: self,
            container,
            category,
            cursor: 0,
        })
    }

    /// Next direct child at or after `cursor`, advancing it
    pub(crate) fn next_child(
        &self,
        container: NodeId,
        category: Option<&Category>,
        cursor: &mut usize,
    ) -> Option<(Key, NodeId)> {
        let node = self.nodes.get(&container)?;
        match &node.kind {
            NodeKind::Component { .. } => None,
            NodeKind::Block(block) => {
                let (name, id) = block.child_at(category, *cursor)?;
                *cursor += 1;
                Some((Key::Name(name.clone()), id))
            }
            NodeKind::Static(block) => loop {
                let (name, id) = block.next_occupied(cursor)?;
                let matches = match category {
                    None => true,
                    Some(category) => self
                        .nodes
                        .get(&id)
                        .map_or(false, |child| &child.category == category),
                };
                if matches {
                    return Some((Key::Name(name.clone()), id));
                }
            },
            NodeKind::List(list) => {
                if category.is_some_and(|c| *c != node.category) {
                    return None;
                }
                let id = list.get(*cursor)?;
                let key = Key::Index(*cursor);
                *cursor += 1;
                Some((key, id))
            }
            NodeKind::Dict(dict) => {
                if category.is_some_and(|c| *c != node.category) {
                    return None;
                }
                let (key, id) = dict.get_index(*cursor)?;
                *cursor += 1;
                Some((key.clone(), id))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attachment
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach a free-standing node under `key`
    ///
    /// Attaching a node at the key it already occupies on this container is a
    /// no-op. A different node already bound at `key` is detached first and
    /// returned; on blocks this is logged as a warning.
    pub fn attach(
        &mut self,
        container: NodeId,
        key: impl Into<Key>,
        child: NodeId,
    ) -> Result<Option<NodeId>> {
        let key = key.into();
        let child_parent = self.node(child)?.parent;
        if child_parent == Some(container) && self.lookup(container, &key)? == Some(child) {
            tracing::debug!("Node {} already attached at '{}' on {}", child, key, container);
            return Ok(None);
        }

        let child_category = self.check_attachable(container, child)?;
        let name = self.check_key(container, &key, &child_category)?;

        let replaced = self.lookup(container, &key)?;
        let replaced_category = match replaced {
            Some(old) => Some(self.node(old)?.category.clone()),
            None => None,
        };
        if let (Some(old), Some(old_category)) = (replaced, &replaced_category) {
            if self.node(container)?.is_block() {
                tracing::warn!(
                    "Implicitly replacing component '{}' (category={}) on block {} with a new \
                     component (category={}). This is usually indicative of a modeling error; \
                     detach the original component before attaching a new one under the same name",
                    key,
                    old_category,
                    container,
                    child_category
                );
            } else {
                tracing::debug!("Replacing member {} at '{}' on {}", old, key, container);
            }
        }

        let displaced = match &mut self.node_mut(container)?.kind {
            NodeKind::Component { .. } => return Err(Error::NotAContainer(container)),
            NodeKind::Block(block) => {
                let name = name.ok_or_else(|| Error::Internal("block key without name".into()))?;
                if let Some(old_category) = &replaced_category {
                    block.remove(&name, old_category);
                }
                block.insert(name, &child_category, child);
                replaced
            }
            NodeKind::Static(block) => {
                let name = name.ok_or_else(|| Error::Internal("slot key without name".into()))?;
                block.put(&name, child)
            }
            NodeKind::List(list) => match key.as_index() {
                Some(index) if index == list.len() => {
                    list.insert(index, child);
                    None
                }
                Some(index) => list.replace(index, child),
                None => return Err(Error::Internal("list key without index".into())),
            },
            NodeKind::Dict(dict) => dict.insert(key.clone(), child),
        };

        if let Some(old) = displaced {
            if let Some(node) = self.nodes.get_mut(&old) {
                node.parent = None;
            }
        }
        self.node_mut(child)?.parent = Some(container);

        tracing::debug!("Attached {} at '{}' on {}", child, key, container);
        Ok(displaced)
    }

    /// Append a free-standing node to the end of a list
    pub fn push(&mut self, list: NodeId, child: NodeId) -> Result<()> {
        let len = self.list_len(list)?;
        self.attach(list, Key::Index(len), child).map(|_| ())
    }

    /// Insert a free-standing node into a list, shifting later members
    pub fn insert(&mut self, list: NodeId, index: usize, child: NodeId) -> Result<()> {
        let len = self.list_len(list)?;
        if index > len {
            return Err(Error::InvalidKey {
                key: index.to_string(),
                container: list,
            });
        }
        if index == len {
            return self.push(list, child);
        }

        let child_category = self.check_attachable(list, child)?;
        self.check_member_category(list, &child_category)?;
        if let NodeKind::List(members) = &mut self.node_mut(list)?.kind {
            members.insert(index, child);
        }
        self.node_mut(child)?.parent = Some(list);

        tracing::debug!("Inserted {} at [{}] on {}", child, index, list);
        Ok(())
    }

    /// Detach the child bound at `key`, returning it free-standing
    pub fn detach(&mut self, container: NodeId, key: impl Into<Key>) -> Result<NodeId> {
        let key = key.into();
        let child = self
            .lookup(container, &key)?
            .ok_or_else(|| Error::UnknownChild(format!("'{}' on {}", key, container)))?;
        let category = self.node(child)?.category.clone();

        let removed = match &mut self.node_mut(container)?.kind {
            NodeKind::Component { .. } => None,
            NodeKind::Block(block) => key.as_name().and_then(|n| block.remove(n, &category)),
            NodeKind::Static(block) => key.as_name().and_then(|n| block.take(n)),
            NodeKind::List(list) => key.as_index().and_then(|i| list.remove(i)),
            NodeKind::Dict(dict) => dict.remove(&key),
        };
        if removed != Some(child) {
            return Err(Error::Internal(format!(
                "child index of {} out of sync at '{}'",
                container, key
            )));
        }
        self.node_mut(child)?.parent = None;

        tracing::debug!("Detached {} from '{}' on {}", child, key, container);
        Ok(child)
    }

    /// Detach a direct child wherever it is stored on `container`
    pub fn detach_child(&mut self, container: NodeId, child: NodeId) -> Result<Key> {
        let key = self.key_of(container, child)?;
        self.detach(container, key.clone())?;
        Ok(key)
    }

    fn list_len(&self, list: NodeId) -> Result<usize> {
        match &self.node(list)?.kind {
            NodeKind::List(members) => Ok(members.len()),
            NodeKind::Component { .. } => Err(Error::NotAContainer(list)),
            _ => Err(Error::InvalidKey {
                key: "<end>".to_string(),
                container: list,
            }),
        }
    }

    /// The child must be free-standing and must not enclose `container`
    fn check_attachable(&self, container: NodeId, child: NodeId) -> Result<Category> {
        let node = self.node(child)?;
        if let Some(parent) = node.parent {
            return Err(Error::DuplicateParent { child, parent });
        }
        if !self.node(container)?.is_container() {
            return Err(Error::NotAContainer(container));
        }
        if container == child || self.ancestors(container).any(|a| a == child) {
            return Err(Error::Cycle { container, child });
        }
        Ok(node.category.clone())
    }

    fn check_member_category(&self, container: NodeId, category: &Category) -> Result<()> {
        let expected = &self.node(container)?.category;
        if expected != category {
            return Err(Error::CategoryMismatch {
                expected: expected.clone(),
                found: category.clone(),
            });
        }
        Ok(())
    }

    /// Validate `key` for the container kind, returning the name for named kinds
    fn check_key(
        &self,
        container: NodeId,
        key: &Key,
        category: &Category,
    ) -> Result<Option<Arc<str>>> {
        let invalid = || Error::InvalidKey {
            key: key.to_string(),
            container,
        };
        match &self.node(container)?.kind {
            NodeKind::Component { .. } => Err(Error::NotAContainer(container)),
            NodeKind::Block(_) => match key {
                Key::Name(name) => {
                    validate_key_name(name)?;
                    Ok(Some(name.clone()))
                }
                Key::Index(_) => Err(invalid()),
            },
            NodeKind::Static(block) => match key {
                Key::Name(name) => {
                    block.check_slot(name, category)?;
                    Ok(Some(name.clone()))
                }
                Key::Index(_) => Err(invalid()),
            },
            NodeKind::List(list) => {
                self.check_member_category(container, category)?;
                match key.as_index() {
                    Some(index) if index <= list.len() => Ok(None),
                    _ => Err(invalid()),
                }
            }
            NodeKind::Dict(_) => {
                self.check_member_category(container, category)?;
                if let Key::Name(name) = key {
                    validate_key_name(name)?;
                    // Numeric names would render like index keys
                    if name.parse::<usize>().is_ok() {
                        return Err(invalid());
                    }
                }
                Ok(None)
            }
        }
    }
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a> {
    model: &'a Model,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.model.parent(current);
        Some(current)
    }
}

/// Lazy iterator over the direct children of a container
///
/// Each call to [`Model::children`] starts a fresh pass.
pub struct Children<'a> {
    model: &'a Model,
    container: NodeId,
    category: Option<Category>,
    cursor: usize,
}

impl<'a> Children<'a> {
    /// Pair every child with its key
    pub fn with_keys(self) -> KeyedChildren<'a> {
        KeyedChildren(self)
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.model
            .next_child(self.container, self.category.as_ref(), &mut self.cursor)
            .map(|(_, id)| id)
    }
}

/// Children paired with the keys they are stored under
pub struct KeyedChildren<'a>(Children<'a>);

impl Iterator for KeyedChildren<'_> {
    type Item = (Key, NodeId);

    fn next(&mut self) -> Option<(Key, NodeId)> {
        let inner = &mut self.0;
        inner
            .model
            .next_child(inner.container, inner.category.as_ref(), &mut inner.cursor)
    }
}
