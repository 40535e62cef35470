//! Traversal query parameters

use crate::category::Category;
use crate::error::{Error, Result};
use crate::node::Key;
use serde::{Deserialize, Serialize};

/// Traversal query builder
///
/// Shared by every traversal operation. Fields an operation has no use for
/// are ignored by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalQuery {
    /// Restrict results to one category (None = all categories)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Active filter: unset or `Some(true)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Emit blocks that are walked only to reach the requested category
    #[serde(default = "default_true")]
    pub include_parent_blocks: bool,

    /// Recurse into sub-blocks (false = direct children only)
    #[serde(default = "default_true")]
    pub descend_into: bool,

    /// Key reported for the root by keyed traversals
    #[serde(skip)]
    pub root_key: Option<Key>,
}

fn default_true() -> bool {
    true
}

impl Default for TraversalQuery {
    fn default() -> Self {
        Self {
            category: None,
            active: None,
            include_parent_blocks: default_true(),
            descend_into: default_true(),
            root_key: None,
        }
    }
}

impl TraversalQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by category
    pub fn with_category(mut self, category: impl Into<Category>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Skip nodes whose active flag is explicitly false
    pub fn only_active(mut self) -> Self {
        self.active = Some(true);
        self
    }

    pub fn with_active(mut self, active: Option<bool>) -> Self {
        self.active = active;
        self
    }

    /// Walk blocks without emitting them when a category is requested
    pub fn without_parent_blocks(mut self) -> Self {
        self.include_parent_blocks = false;
        self
    }

    pub fn include_parent_blocks(mut self, include: bool) -> Self {
        self.include_parent_blocks = include;
        self
    }

    /// Restrict to the root's direct children
    pub fn shallow(mut self) -> Self {
        self.descend_into = false;
        self
    }

    pub fn descend_into(mut self, descend: bool) -> Self {
        self.descend_into = descend;
        self
    }

    pub fn with_root_key(mut self, key: impl Into<Key>) -> Self {
        self.root_key = Some(key.into());
        self
    }

    /// Resolve the active filter to "active only", rejecting `Some(false)`
    pub(crate) fn active_filter(&self) -> Result<bool> {
        match self.active {
            None => Ok(false),
            Some(true) => Ok(true),
            Some(false) => Err(Error::InvalidFilter(false)),
        }
    }
}
