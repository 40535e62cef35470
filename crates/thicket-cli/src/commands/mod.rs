//! CLI command implementations

pub mod completions;
pub mod config;
pub mod query;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use thicket_core::{Categorized, Model, ModelManifest, NodeId, TraversalQuery};

use crate::config::Config;
use crate::output::NodeRow;

/// Options shared by every query command
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Manifest file (.json or .toml)
    pub file: PathBuf,

    /// Only include nodes of this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only include active nodes
    #[arg(short, long)]
    pub active: bool,

    /// Do not descend into sub-blocks
    #[arg(long)]
    pub shallow: bool,
}

impl QueryArgs {
    /// Build a traversal query from flags and config defaults
    pub fn to_query(&self, config: &Config) -> TraversalQuery {
        let mut query = TraversalQuery::new().descend_into(!self.shallow);
        if let Some(category) = &self.category {
            query = query.with_category(category.as_str());
        }
        if self.active || config.active_only {
            query = query.only_active();
        }
        query
    }
}

/// Parse a manifest file, choosing the format by extension
pub fn load_manifest(path: &Path) -> anyhow::Result<ModelManifest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let manifest = if is_toml {
        toml::from_str(&contents)
            .with_context(|| format!("Invalid TOML manifest {}", path.display()))?
    } else {
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid JSON manifest {}", path.display()))?
    };
    Ok(manifest)
}

/// Load a manifest file into a fresh model
pub fn load_model(path: &Path) -> anyhow::Result<(Model, NodeId)> {
    let manifest = load_manifest(path)?;
    let mut model = Model::new();
    let root = model.load_manifest(&manifest)?;
    tracing::info!("Loaded {} nodes from {}", model.len(), path.display());
    Ok((model, root))
}

/// Describe a node for output, using its name relative to the root
pub fn node_row(model: &Model, root: NodeId, id: NodeId, name: String) -> anyhow::Result<NodeRow> {
    let node = model.node(id)?;
    let depth = model
        .ancestors(id)
        .position(|ancestor| ancestor == root)
        .map_or(0, |i| i + 1);
    Ok(NodeRow {
        name,
        kind: node.kind_label(),
        category: node.category().to_string(),
        active: node.is_active(),
        depth,
    })
}
