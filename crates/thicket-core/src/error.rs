//! Error types for Thicket Core

use crate::category::Category;
use crate::limits::ValidationError;
use crate::node::NodeId;
use thiserror::Error;

/// Result type alias using Thicket's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Thicket error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node {child} already belongs to container {parent}")]
    DuplicateParent { child: NodeId, parent: NodeId },

    #[error("No child entry: {0}")]
    UnknownChild(String),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Invalid active filter: {0} (only unset or true are accepted)")]
    InvalidFilter(bool),

    #[error("Node is not a container: {0}")]
    NotAContainer(NodeId),

    #[error("Node is not a block: {0}")]
    NotABlock(NodeId),

    #[error("Node {node} is still attached to {parent}")]
    Attached { node: NodeId, parent: NodeId },

    #[error("Category mismatch: expected '{expected}', found '{found}'")]
    CategoryMismatch { expected: Category, found: Category },

    #[error("Unknown slot '{slot}' on static layout '{layout}'")]
    UnknownSlot { layout: String, slot: String },

    #[error("Invalid key '{key}' for {container}")]
    InvalidKey { key: String, container: NodeId },

    #[error("Attaching {child} under {container} would create a cycle")]
    Cycle { container: NodeId, child: NodeId },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
