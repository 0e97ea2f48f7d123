// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read-only query contract over a scene.
//!
//! Everything the affects resolver knows about a scene goes through
//! [`SceneRegistry`]. Hosts wrap their own scene database behind it; tests
//! and the command-line tool use [`SceneGraph`].

use crate::attribute::ValueType;
use crate::connection::Plug;
use crate::graph::SceneGraph;

/// Error raised when a queried node, attribute or type does not exist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Attribute not found
    #[error("Attribute not found: {0}")]
    AttributeNotFound(Plug),

    /// No node type definition carries the attribute
    #[error("Unknown node type or attribute: {node_type}.{attr}")]
    UnknownNodeType {
        /// Host type name
        node_type: String,
        /// Attribute name
        attr: String,
    },
}

/// Queries the affects resolver makes against a scene
///
/// All methods are pure reads. Implementations report missing nodes and
/// attributes as [`RegistryError`].
pub trait SceneRegistry {
    /// Whether a node exists
    fn node_exists(&self, node: &str) -> bool;

    /// Host type name of a node
    fn node_type(&self, node: &str) -> Result<String, RegistryError>;

    /// Leaf attribute names; array/compound parents are expanded one level
    fn list_attributes(&self, node: &str) -> Result<Vec<String>, RegistryError>;

    /// Whether a node carries an attribute
    fn has_attribute(&self, plug: &Plug) -> Result<bool, RegistryError>;

    /// Direct DAG parents
    fn list_parents(&self, node: &str) -> Result<Vec<String>, RegistryError>;

    /// Direct DAG children
    fn list_children(&self, node: &str) -> Result<Vec<String>, RegistryError>;

    /// Nodes one hop upstream: sources of connections into any of the node's
    /// attributes, plus its DAG parents
    fn list_upstream_nodes(&self, node: &str) -> Result<Vec<String>, RegistryError>;

    /// Plugs one hop upstream of a plug
    fn list_upstream_plugs(&self, plug: &Plug) -> Result<Vec<Plug>, RegistryError>;

    /// Element/child plugs of an array or compound plug; empty for leaves
    fn list_child_plugs(&self, plug: &Plug) -> Result<Vec<Plug>, RegistryError>;

    /// Whether the plug holds a value that can be set directly
    fn is_settable(&self, plug: &Plug) -> Result<bool, RegistryError>;

    /// Data type of a plug
    fn value_type(&self, plug: &Plug) -> Result<ValueType, RegistryError>;

    /// Whether an attribute of a node type can change world-space position
    fn affects_worldspace(&self, node_type: &str, attr: &str) -> Result<bool, RegistryError>;

    /// Value of a plug at a frame
    fn sample_at_frame(&self, plug: &Plug, frame: i32) -> Result<f64, RegistryError>;

    /// Topology revision; a change means cached structural answers are stale
    fn revision(&self) -> u64 {
        0
    }
}

impl SceneGraph {
    fn require_node(&self, node: &str) -> Result<&crate::node::SceneNode, RegistryError> {
        self.node(node)
            .ok_or_else(|| RegistryError::NodeNotFound(node.to_string()))
    }

    fn require_attribute(&self, plug: &Plug) -> Result<&crate::attribute::Attribute, RegistryError> {
        self.require_node(&plug.node)?
            .attribute(&plug.attr)
            .ok_or_else(|| RegistryError::AttributeNotFound(plug.clone()))
    }
}

impl SceneRegistry for SceneGraph {
    fn node_exists(&self, node: &str) -> bool {
        self.node(node).is_some()
    }

    fn node_type(&self, node: &str) -> Result<String, RegistryError> {
        Ok(self.require_node(node)?.node_type.clone())
    }

    fn list_attributes(&self, node: &str) -> Result<Vec<String>, RegistryError> {
        Ok(self.require_node(node)?.leaf_attribute_names())
    }

    fn has_attribute(&self, plug: &Plug) -> Result<bool, RegistryError> {
        Ok(self.require_node(&plug.node)?.attribute(&plug.attr).is_some())
    }

    fn list_parents(&self, node: &str) -> Result<Vec<String>, RegistryError> {
        Ok(self.require_node(node)?.parents.iter().cloned().collect())
    }

    fn list_children(&self, node: &str) -> Result<Vec<String>, RegistryError> {
        self.require_node(node)?;
        Ok(self.children(node).map(|n| n.name.clone()).collect())
    }

    fn list_upstream_nodes(&self, node: &str) -> Result<Vec<String>, RegistryError> {
        let scene_node = self.require_node(node)?;
        let mut upstream: Vec<String> = Vec::new();
        for connection in self.connections_into_node(node) {
            if connection.from.node != node && !upstream.contains(&connection.from.node) {
                upstream.push(connection.from.node.clone());
            }
        }
        for parent in &scene_node.parents {
            if !upstream.contains(parent) {
                upstream.push(parent.clone());
            }
        }
        Ok(upstream)
    }

    fn list_upstream_plugs(&self, plug: &Plug) -> Result<Vec<Plug>, RegistryError> {
        let attr = self.require_attribute(plug)?;
        let mut upstream: Vec<Plug> = self.connections_to(plug).map(|c| c.from.clone()).collect();
        if !attr.writable {
            upstream.extend(
                attr.affected_by
                    .iter()
                    .map(|name| Plug::new(plug.node.clone(), name.clone())),
            );
        }
        Ok(upstream)
    }

    fn list_child_plugs(&self, plug: &Plug) -> Result<Vec<Plug>, RegistryError> {
        let attr = self.require_attribute(plug)?;
        Ok(attr
            .children
            .iter()
            .map(|name| Plug::new(plug.node.clone(), name.clone()))
            .collect())
    }

    fn is_settable(&self, plug: &Plug) -> Result<bool, RegistryError> {
        let attr = self.require_attribute(plug)?;
        Ok(attr.writable
            && !attr.locked
            && !attr.is_compound()
            && self.connections_to(plug).next().is_none())
    }

    fn value_type(&self, plug: &Plug) -> Result<ValueType, RegistryError> {
        Ok(self.require_attribute(plug)?.value_type)
    }

    fn affects_worldspace(&self, node_type: &str, attr: &str) -> Result<bool, RegistryError> {
        if let Some(template) = self.types().get(node_type).and_then(|t| t.attribute(attr)) {
            return Ok(template.affects_worldspace);
        }
        // Dynamic attributes only exist on instances
        self.nodes()
            .filter(|n| n.node_type == node_type)
            .find_map(|n| n.attribute(attr))
            .map(|a| a.affects_worldspace)
            .ok_or_else(|| RegistryError::UnknownNodeType {
                node_type: node_type.to_string(),
                attr: attr.to_string(),
            })
    }

    fn sample_at_frame(&self, plug: &Plug, frame: i32) -> Result<f64, RegistryError> {
        Ok(self.require_attribute(plug)?.value.sample(f64::from(frame)))
    }

    fn revision(&self) -> u64 {
        SceneGraph::revision(self)
    }
}
