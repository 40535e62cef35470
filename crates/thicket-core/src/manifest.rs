//! Serializable tree manifests
//!
//! A manifest describes a whole model tree. Loading one goes through the
//! regular attach API, so a loaded tree satisfies the same invariants as
//! one built by hand.

use crate::category::Category;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::node::{Categorized, Component, Key, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root block of a model tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub children: Vec<NamedNode>,
}

/// A node stored under a name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedNode {
    pub name: String,

    #[serde(flatten)]
    pub node: NodeManifest,
}

/// Description of one node and its contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeManifest {
    Component {
        category: Category,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active: Option<bool>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        metadata: HashMap<String, serde_json::Value>,
    },
    Block {
        #[serde(default = "default_active")]
        active: bool,
        #[serde(default)]
        children: Vec<NamedNode>,
    },
    List {
        category: Category,
        #[serde(default = "default_active")]
        active: bool,
        #[serde(default)]
        items: Vec<NodeManifest>,
    },
    Dict {
        category: Category,
        #[serde(default = "default_active")]
        active: bool,
        #[serde(default)]
        entries: Vec<NamedNode>,
    },
}

fn default_active() -> bool {
    true
}

impl ModelManifest {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Dict keys written as canonical integers are stored positionally
///
/// Other numeric spellings ("03", "+3") stay names and are rejected on attach.
fn dict_key(name: &str) -> Key {
    match name.parse::<usize>() {
        Ok(i) if i.to_string() == name => Key::Index(i),
        _ => Key::name(name),
    }
}

impl Model {
    /// Build the tree described by `manifest`, returning its root block
    pub fn load_manifest(&mut self, manifest: &ModelManifest) -> Result<NodeId> {
        let root = self.add_block();
        self.set_active(root, manifest.active)?;
        for child in &manifest.children {
            let id = self.build_node(&child.node)?;
            self.attach_entry(root, Key::name(&child.name), &child.name, id)?;
        }
        tracing::debug!("Loaded manifest into {} ({} nodes)", root, self.len());
        Ok(root)
    }

    fn build_node(&mut self, manifest: &NodeManifest) -> Result<NodeId> {
        match manifest {
            NodeManifest::Component {
                category,
                active,
                metadata,
            } => self.add_component(Component {
                category: category.clone(),
                active: *active,
                metadata: metadata.clone(),
            }),
            NodeManifest::Block { active, children } => {
                let block = self.add_block();
                self.set_active(block, *active)?;
                for child in children {
                    let id = self.build_node(&child.node)?;
                    self.attach_entry(block, Key::name(&child.name), &child.name, id)?;
                }
                Ok(block)
            }
            NodeManifest::List {
                category,
                active,
                items,
            } => {
                let list = self.add_list(category.clone())?;
                self.set_active(list, *active)?;
                for (i, item) in items.iter().enumerate() {
                    let id = self.build_node(item)?;
                    self.push(list, id)
                        .map_err(|e| Error::Manifest(format!("[{}]: {}", i, e)))?;
                }
                Ok(list)
            }
            NodeManifest::Dict {
                category,
                active,
                entries,
            } => {
                let dict = self.add_dict(category.clone())?;
                self.set_active(dict, *active)?;
                for entry in entries {
                    let id = self.build_node(&entry.node)?;
                    self.attach_entry(dict, dict_key(&entry.name), &entry.name, id)?;
                }
                Ok(dict)
            }
        }
    }

    /// Attach a manifest entry, refusing to replace an earlier one
    fn attach_entry(
        &mut self,
        container: NodeId,
        key: Key,
        label: &str,
        id: NodeId,
    ) -> Result<()> {
        let taken = self
            .child(container, key.clone())
            .map_err(|e| Error::Manifest(format!("'{}': {}", label, e)))?;
        if taken.is_some() {
            return Err(Error::Manifest(format!("duplicate entry '{}'", label)));
        }
        self.attach(container, key, id)
            .map_err(|e| Error::Manifest(format!("'{}': {}", label, e)))?;
        Ok(())
    }

    /// Describe the block at `root` as a manifest
    pub fn to_manifest(&self, root: NodeId) -> Result<ModelManifest> {
        let node = self.node(root)?;
        if !node.is_block() {
            return Err(Error::NotABlock(root));
        }
        Ok(ModelManifest {
            active: node.is_active(),
            children: self.named_children(root)?,
        })
    }

    fn named_children(&self, container: NodeId) -> Result<Vec<NamedNode>> {
        self.children(container)?
            .with_keys()
            .map(|(key, id)| {
                Ok(NamedNode {
                    name: key.to_string(),
                    node: self.describe(id)?,
                })
            })
            .collect()
    }

    fn describe(&self, id: NodeId) -> Result<NodeManifest> {
        let node = self.node(id)?;
        Ok(match node.kind() {
            NodeKind::Component { metadata } => NodeManifest::Component {
                category: node.category().clone(),
                active: node.active(),
                metadata: metadata.clone(),
            },
            NodeKind::Block(_) | NodeKind::Static(_) => NodeManifest::Block {
                active: node.is_active(),
                children: self.named_children(id)?,
            },
            NodeKind::List(_) => NodeManifest::List {
                category: node.category().clone(),
                active: node.is_active(),
                items: self
                    .children(id)?
                    .map(|child| self.describe(child))
                    .collect::<Result<_>>()?,
            },
            NodeKind::Dict(_) => NodeManifest::Dict {
                category: node.category().clone(),
                active: node.is_active(),
                entries: self.named_children(id)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraversalQuery;

    const SAMPLE: &str = r#"{
        "children": [
            {"name": "x", "kind": "component", "category": "Var"},
            {"name": "b", "kind": "block", "children": [
                {"name": "y", "kind": "component", "category": "Con", "active": false,
                 "metadata": {"body": "x <= 1"}}
            ]},
            {"name": "stages", "kind": "list", "category": "block", "items": [
                {"kind": "block", "children": [
                    {"name": "z", "kind": "component", "category": "Var"}
                ]}
            ]},
            {"name": "costs", "kind": "dict", "category": "Param", "entries": [
                {"name": "1", "kind": "component", "category": "Param"},
                {"name": "peak", "kind": "component", "category": "Param"}
            ]}
        ]
    }"#;

    #[test]
    fn test_load_manifest() {
        let manifest = ModelManifest::from_json(SAMPLE).unwrap();
        let mut model = Model::new();
        let root = model.load_manifest(&manifest).unwrap();

        let names: Vec<String> = {
            let names = model.generate_names(root, &TraversalQuery::new()).unwrap();
            let mut all: Vec<String> = names.into_values().collect();
            all.sort();
            all
        };
        assert_eq!(
            names,
            vec![
                "b", "b.y", "costs", "costs[1]", "costs[peak]", "stages", "stages[0]",
                "stages[0].z", "x"
            ]
        );

        let b = model.child(root, "b").unwrap().unwrap();
        let y = model.child(b, "y").unwrap().unwrap();
        assert!(!model.is_active(y).unwrap());
        assert_eq!(
            model.node(y).unwrap().metadata().unwrap()["body"],
            serde_json::json!("x <= 1")
        );
    }

    #[test]
    fn test_manifest_rejects_mismatched_members() {
        let json = r#"{"children": [
            {"name": "vars", "kind": "list", "category": "Var", "items": [
                {"kind": "component", "category": "Con"}
            ]}
        ]}"#;
        let manifest = ModelManifest::from_json(json).unwrap();
        let err = Model::new().load_manifest(&manifest).unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }

    #[test]
    fn test_manifest_rejects_reserved_names() {
        let json = r#"{"children": [{"name": "a.b", "kind": "component", "category": "Var"}]}"#;
        let manifest = ModelManifest::from_json(json).unwrap();
        assert!(Model::new().load_manifest(&manifest).is_err());
    }

    #[test]
    fn test_manifest_rejects_duplicate_names() {
        let json = r#"{"children": [
            {"name": "b", "kind": "block", "children": [
                {"name": "x", "kind": "component", "category": "Var"},
                {"name": "x", "kind": "component", "category": "Var"}
            ]}
        ]}"#;
        let manifest = ModelManifest::from_json(json).unwrap();
        let err = Model::new().load_manifest(&manifest).unwrap_err();
        assert!(matches!(err, Error::Manifest(ref msg) if msg.contains("duplicate entry 'x'")));

        let json = r#"{"children": [
            {"name": "x", "kind": "component", "category": "Var"},
            {"name": "x", "kind": "component", "category": "Con"}
        ]}"#;
        let manifest = ModelManifest::from_json(json).unwrap();
        assert!(matches!(
            Model::new().load_manifest(&manifest),
            Err(Error::Manifest(_))
        ));
    }

    #[test]
    fn test_manifest_rejects_ambiguous_dict_keys() {
        let json = r#"{"children": [
            {"name": "costs", "kind": "dict", "category": "Param", "entries": [
                {"name": "3", "kind": "component", "category": "Param"},
                {"name": "03", "kind": "component", "category": "Param"}
            ]}
        ]}"#;
        let manifest = ModelManifest::from_json(json).unwrap();
        let err = Model::new().load_manifest(&manifest).unwrap_err();
        assert!(matches!(err, Error::Manifest(ref msg) if msg.contains("03")));

        let json = r#"{"children": [
            {"name": "costs", "kind": "dict", "category": "Param", "entries": [
                {"name": "3", "kind": "component", "category": "Param"},
                {"name": "3", "kind": "component", "category": "Param"}
            ]}
        ]}"#;
        let manifest = ModelManifest::from_json(json).unwrap();
        let err = Model::new().load_manifest(&manifest).unwrap_err();
        assert!(matches!(err, Error::Manifest(ref msg) if msg.contains("duplicate entry '3'")));
    }

    #[test]
    fn test_to_manifest_reproduces_tree() {
        let manifest = ModelManifest::from_json(SAMPLE).unwrap();
        let mut model = Model::new();
        let root = model.load_manifest(&manifest).unwrap();

        let described = model.to_manifest(root).unwrap();
        assert_eq!(described.children.len(), 4);
        assert_eq!(described.children[0].name, "x");
        assert!(matches!(
            &described.children[3].node,
            NodeManifest::Dict { entries, .. } if entries.len() == 2 && entries[0].name == "1"
        ));
    }

    #[test]
    fn test_manifest_from_toml() {
        let toml_src = r#"
            [[children]]
            name = "x"
            kind = "component"
            category = "Var"

            [[children]]
            name = "b"
            kind = "block"
            active = false
        "#;
        let manifest: ModelManifest = toml::from_str(toml_src).unwrap();
        assert_eq!(manifest.children.len(), 2);
        assert!(matches!(
            manifest.children[1].node,
            NodeManifest::Block { active: false, .. }
        ));
    }
}
