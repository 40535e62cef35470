//! Thicket Core - Container tree engine for model structures
//!
//! This crate provides the node arena, the block and container kinds, and
//! the traversal engine used to organize named components into a single
//! addressable model tree.

pub mod block;
pub mod category;
pub mod container;
pub mod error;
pub mod limits;
pub mod manifest;
pub mod model;
pub mod names;
pub mod node;
pub mod ordered;
pub mod query;
pub mod static_block;
pub mod traversal;

pub use block::DynamicBlock;
pub use category::Category;
pub use container::{ComponentDict, ComponentList};
pub use error::{Error, Result};
pub use manifest::{ModelManifest, NamedNode, NodeManifest};
pub use model::{Ancestors, Children, KeyedChildren, Model};
pub use node::{Categorized, Component, Key, Node, NodeId, NodeKind};
pub use ordered::OrderedMap;
pub use query::TraversalQuery;
pub use static_block::{SlotDescriptor, StaticBlock, StaticLayout, StaticLayoutBuilder};
pub use traversal::{Blocks, Components, KeyedTraversal, Order, Traversal};
