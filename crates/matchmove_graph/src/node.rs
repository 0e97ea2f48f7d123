// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the scene graph.

use crate::attribute::Attribute;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Host type name, e.g. `transform`
    pub id: String,
    /// Description
    pub description: String,
    /// Attributes every instance starts with
    pub attributes: Vec<Attribute>,
}

impl NodeType {
    /// Find an attribute template by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A node instance in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    /// Unique node path
    pub name: String,
    /// Host type name
    pub node_type: String,
    /// Attributes by name
    pub attributes: IndexMap<String, Attribute>,
    /// DAG parents; more than one when the node is instanced
    #[serde(default)]
    pub parents: IndexSet<String>,
}

impl SceneNode {
    /// Create a new node from a type definition
    pub fn new(name: impl Into<String>, node_type: &NodeType) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.id.clone(),
            attributes: node_type
                .attributes
                .iter()
                .map(|a| (a.name.clone(), a.clone()))
                .collect(),
            parents: IndexSet::new(),
        }
    }

    /// Get an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Get a mutable attribute by name
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(name)
    }

    /// Leaf attribute names: compound parents are replaced by their direct children
    pub fn leaf_attribute_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let is_child = |name: &String| {
            self.attributes.values().any(|a| a.children.contains(name))
        };
        for attr in self.attributes.values() {
            if attr.is_compound() {
                names.extend(attr.children.iter().cloned());
            } else if !is_child(&attr.name) {
                names.push(attr.name.clone());
            }
        }
        names
    }
}

/// Registry of available node types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeTypeRegistry {
    /// Registered node types by ID
    types: IndexMap<String, NodeType>,
}

impl NodeTypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Create a node from a type ID
    pub fn create_node(&self, name: impl Into<String>, type_id: &str) -> Option<SceneNode> {
        self.get(type_id).map(|t| SceneNode::new(name, t))
    }
}
