//! Category tags identifying the kind of a tree node

use serde::{Deserialize, Serialize};

/// Tag carried by every block
pub const BLOCK: &str = "block";

/// Opaque category tag (e.g. "block", "Var", "Con")
///
/// The tree never interprets a category beyond equality and the reserved
/// block tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The block category
    pub fn block() -> Self {
        Self(BLOCK.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_block(&self) -> bool {
        self.0 == BLOCK
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for Category {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<&Category> for Category {
    fn from(c: &Category) -> Self {
        c.clone()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
