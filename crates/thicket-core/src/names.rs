//! Fully qualified name generation

use crate::error::{Error, Result};
use crate::model::Model;
use crate::node::{Categorized, Key, NodeId};
use crate::query::TraversalQuery;
use std::collections::HashMap;

impl Model {
    /// Names of every node under `root` relative to it
    ///
    /// Keys are rendered with their `Display` form and no prefix.
    pub fn generate_names(
        &self,
        root: NodeId,
        query: &TraversalQuery,
    ) -> Result<HashMap<NodeId, String>> {
        self.generate_names_with(root, query, "", |key| key.to_string())
    }

    /// Names of every node under `root`, built from converted keys
    ///
    /// A block child is joined to its parent's name with `.`; a list or dict
    /// member is appended as `[key]`. Names are computed once and do not
    /// track later changes to the tree.
    pub fn generate_names_with<F>(
        &self,
        root: NodeId,
        query: &TraversalQuery,
        prefix: &str,
        convert: F,
    ) -> Result<HashMap<NodeId, String>>
    where
        F: Fn(&Key) -> String,
    {
        let active_only = query.active_filter()?;
        let mut names = HashMap::new();
        if active_only && !self.node(root)?.is_active() {
            return Ok(names);
        }

        let entries: Vec<(Key, NodeId)> = if query.descend_into {
            let walk = query.clone().include_parent_blocks(true);
            self.preorder(root, &walk)?
                .with_keys()
                .skip(1)
                .map(|(key, id)| {
                    key.map(|k| (k, id))
                        .ok_or_else(|| Error::Internal(format!("missing key for {}", id)))
                })
                .collect::<Result<_>>()?
        } else {
            self.children_filtered(root, query.category.clone())?
                .with_keys()
                .filter(|(_, id)| !active_only || self.get(*id).map_or(false, |n| n.is_active()))
                .collect()
        };

        for (key, id) in entries {
            let parent_id = self
                .parent(id)
                .ok_or_else(|| Error::Internal(format!("node {} has no parent", id)))?;
            let parent = self.node(parent_id)?;
            let segment = parent.name_segment(&convert(&key));

            let name = if parent_id == root {
                format!("{}{}", prefix, segment)
            } else {
                let parent_name = names.get(&parent_id).ok_or_else(|| {
                    Error::Internal(format!("parent {} named after child {}", parent_id, id))
                })?;
                format!("{}{}{}", parent_name, parent.name_delimiter(), segment)
            };
            names.insert(id, name);
        }

        tracing::debug!("Generated {} names under {}", names.len(), root);
        Ok(names)
    }

    /// Fully qualified name of a single node, walking up to its root
    pub fn qualified_name(&self, id: NodeId) -> Result<String> {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(parent_id) = self.node(current)?.parent {
            let parent = self.node(parent_id)?;
            let key = self.key_of(parent_id, current)?;
            segments.push((parent.name_delimiter(), parent.name_segment(&key.to_string())));
            current = parent_id;
        }

        let mut name = String::new();
        for (i, (delimiter, segment)) in segments.iter().rev().enumerate() {
            if i > 0 {
                name.push_str(delimiter);
            }
            name.push_str(segment);
        }
        Ok(name)
    }
}
