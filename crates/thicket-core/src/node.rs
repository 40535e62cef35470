//! Node handles, storage keys and the node capability trait

use crate::block::DynamicBlock;
use crate::category::Category;
use crate::container::{ComponentDict, ComponentList};
use crate::static_block::StaticBlock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use ulid::Ulid;

/// Unique handle for a node in a [`Model`](crate::Model)
///
/// Handles are non-owning: a parent back-reference is just the parent's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Ulid);

impl NodeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage key of a child within its direct parent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Named entry (block attribute, dict entry)
    Name(Arc<str>),
    /// Positional entry (list member, integer dict key)
    Index(usize),
}

impl Key {
    pub fn name(s: &str) -> Self {
        Self::Name(Arc::from(s))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_ref()),
            Self::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Name(_) => None,
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::name(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Name(Arc::from(s))
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Self::name(s)
    }
}

impl From<Arc<str>> for Key {
    fn from(s: Arc<str>) -> Self {
        Self::Name(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Minimum capability set every tree node provides
pub trait Categorized {
    /// Category tag of this node
    fn category(&self) -> &Category;

    /// True for addressable nodes (leaf components and blocks)
    fn is_component(&self) -> bool;

    /// True for nodes that hold children
    fn is_container(&self) -> bool;

    /// Non-owning reference to the containing node
    fn parent(&self) -> Option<NodeId>;

    /// Tri-state active flag; `None` means the node never deactivates
    fn active(&self) -> Option<bool> {
        None
    }

    /// Active flag with "not applicable" read as active
    fn is_active(&self) -> bool {
        self.active().unwrap_or(true)
    }

    /// Heterogeneous container that is itself a component
    fn is_block(&self) -> bool {
        self.is_component() && self.is_container()
    }
}

/// A leaf component to be placed in a model
///
/// The content is opaque to the tree and carried as metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Component category (e.g. "Var", "Con")
    pub category: Category,

    /// Active flag, if this component kind supports deactivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Arbitrary metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Component {
    /// Create a component that has no active flag
    pub fn new(category: impl Into<Category>) -> Self {
        Self {
            category: category.into(),
            active: None,
            metadata: HashMap::new(),
        }
    }

    /// Give this component an explicit active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Kind-specific node storage
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Leaf component with opaque content
    Component {
        metadata: HashMap<String, serde_json::Value>,
    },
    /// Block with an open-ended set of named children
    Block(DynamicBlock),
    /// Block with a fixed set of declared slots
    Static(StaticBlock),
    /// Ordered homogeneous container
    List(ComponentList),
    /// Keyed homogeneous container
    Dict(ComponentDict),
}

/// A node stored in the model arena
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) category: Category,
    pub(crate) parent: Option<NodeId>,
    pub(crate) active: Option<bool>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(category: Category, active: Option<bool>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            category,
            parent: None,
            active,
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Component metadata, `None` for containers
    pub fn metadata(&self) -> Option<&HashMap<String, serde_json::Value>> {
        match &self.kind {
            NodeKind::Component { metadata } => Some(metadata),
            _ => None,
        }
    }

    pub fn as_dynamic_block(&self) -> Option<&DynamicBlock> {
        match &self.kind {
            NodeKind::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_static_block(&self) -> Option<&StaticBlock> {
        match &self.kind {
            NodeKind::Static(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ComponentList> {
        match &self.kind {
            NodeKind::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&ComponentDict> {
        match &self.kind {
            NodeKind::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Short label for diagnostics and listings
    pub fn kind_label(&self) -> &'static str {
        match &self.kind {
            NodeKind::Component { .. } => "component",
            NodeKind::Block(_) => "block",
            NodeKind::Static(_) => "static_block",
            NodeKind::List(_) => "list",
            NodeKind::Dict(_) => "dict",
        }
    }

    /// Delimiter placed between this container's name and a child segment
    pub(crate) fn name_delimiter(&self) -> &'static str {
        match &self.kind {
            NodeKind::List(_) | NodeKind::Dict(_) => "",
            _ => ".",
        }
    }

    /// Name segment for a child stored under this container
    pub(crate) fn name_segment(&self, key: &str) -> String {
        match &self.kind {
            NodeKind::List(_) | NodeKind::Dict(_) => format!("[{}]", key),
            _ => key.to_string(),
        }
    }
}

impl Categorized for Node {
    fn category(&self) -> &Category {
        &self.category
    }

    fn is_component(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Component { .. } | NodeKind::Block(_) | NodeKind::Static(_)
        )
    }

    fn is_container(&self) -> bool {
        !matches!(self.kind, NodeKind::Component { .. })
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn active(&self) -> Option<bool> {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(Key::name("x").to_string(), "x");
        assert_eq!(Key::Index(3).to_string(), "3");
        assert_eq!(Key::from("b").as_name(), Some("b"));
        assert_eq!(Key::from(2usize).as_index(), Some(2));
    }

    #[test]
    fn test_component_capabilities() {
        let node = Node::new(
            Category::new("Var"),
            None,
            NodeKind::Component {
                metadata: HashMap::new(),
            },
        );
        assert!(node.is_component());
        assert!(!node.is_container());
        assert!(!node.is_block());
        assert!(node.is_active());
        assert_eq!(node.parent(), None);
    }

    #[test]
    fn test_block_capabilities() {
        let node = Node::new(
            Category::block(),
            Some(false),
            NodeKind::Block(DynamicBlock::new()),
        );
        assert!(node.is_block());
        assert!(!node.is_active());
        assert_eq!(node.name_delimiter(), ".");
        assert_eq!(node.name_segment("x"), "x");

        let list = Node::new(
            Category::block(),
            Some(true),
            NodeKind::List(ComponentList::new()),
        );
        assert!(list.is_container());
        assert!(!list.is_component());
        assert_eq!(list.name_segment("0"), "[0]");
    }

    #[test]
    fn test_component_builder() {
        let c = Component::new("Con")
            .with_active(false)
            .with_metadata("body", serde_json::json!("x <= 1"));
        assert_eq!(c.category.as_str(), "Con");
        assert_eq!(c.active, Some(false));
        assert_eq!(c.metadata.len(), 1);
    }
}
