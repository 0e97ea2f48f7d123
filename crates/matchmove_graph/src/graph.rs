// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene graph containing nodes, parenting and attribute connections.

use crate::attribute::{Attribute, AttrValue};
use crate::connection::{Connection, ConnectionId, Plug};
use crate::library;
use crate::node::{NodeTypeRegistry, SceneNode};
use indexmap::IndexMap;
use matchmove_anim::AnimCurve;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An in-memory scene snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Scene name
    pub name: String,
    /// Known node types
    types: NodeTypeRegistry,
    /// Nodes by path
    nodes: IndexMap<String, SceneNode>,
    /// Connections between plugs
    connections: IndexMap<ConnectionId, Connection>,
    /// Bumped on every topology change
    #[serde(skip)]
    revision: u64,
}

impl SceneGraph {
    /// Create an empty scene with the built-in node types registered
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_types(name, library::create_matchmove_registry())
    }

    /// Create an empty scene with a custom type registry
    pub fn with_types(name: impl Into<String>, types: NodeTypeRegistry) -> Self {
        Self {
            name: name.into(),
            types,
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            revision: 0,
        }
    }

    /// Node type registry
    pub fn types(&self) -> &NodeTypeRegistry {
        &self.types
    }

    /// Topology revision, bumped whenever nodes, attributes, parenting or
    /// connections change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Add a node of a registered type
    pub fn add_node(&mut self, name: impl Into<String>, type_id: &str) -> Result<String, SceneError> {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            return Err(SceneError::DuplicateNode(name));
        }
        let node = self
            .types
            .create_node(name.clone(), type_id)
            .ok_or_else(|| SceneError::UnknownNodeType(type_id.to_string()))?;
        self.nodes.insert(name.clone(), node);
        self.touch();
        Ok(name)
    }

    /// Remove a node together with its connections and child parent links
    pub fn remove_node(&mut self, name: &str) -> Option<SceneNode> {
        let node = self.nodes.shift_remove(name)?;
        self.connections.retain(|_, c| !c.involves_node(name));
        for other in self.nodes.values_mut() {
            other.parents.shift_remove(name);
        }
        self.touch();
        Some(node)
    }

    /// Get a node by path
    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.get(name)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a dynamic attribute to one node
    pub fn add_attribute(&mut self, node: &str, attribute: Attribute) -> Result<(), SceneError> {
        let scene_node = self
            .nodes
            .get_mut(node)
            .ok_or_else(|| SceneError::NodeNotFound(node.to_string()))?;
        scene_node.attributes.insert(attribute.name.clone(), attribute);
        self.touch();
        Ok(())
    }

    /// Parent `child` under `parent`; an existing parent is kept (instancing)
    pub fn set_parent(&mut self, child: &str, parent: &str) -> Result<(), SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent.to_string()));
        }
        if child == parent || self.ancestors(parent).iter().any(|a| a == child) {
            return Err(SceneError::ParentCycle {
                child: child.to_string(),
                parent: parent.to_string(),
            });
        }
        let node = self
            .nodes
            .get_mut(child)
            .ok_or_else(|| SceneError::NodeNotFound(child.to_string()))?;
        node.parents.insert(parent.to_string());
        self.touch();
        Ok(())
    }

    /// Remove one parent link
    pub fn remove_parent(&mut self, child: &str, parent: &str) -> bool {
        let removed = self
            .nodes
            .get_mut(child)
            .is_some_and(|n| n.parents.shift_remove(parent));
        if removed {
            self.touch();
        }
        removed
    }

    /// All DAG ancestors of a node, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut queue: Vec<&str> = vec![name];
        while let Some(current) = queue.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            for parent in &node.parents {
                if !found.contains(parent) {
                    found.push(parent.clone());
                    queue.push(parent);
                }
            }
        }
        found
    }

    /// Direct DAG children of a node
    pub fn children(&self, name: &str) -> impl Iterator<Item = &SceneNode> + '_ {
        let name = name.to_string();
        self.nodes.values().filter(move |n| n.parents.contains(&name))
    }

    /// Look up an attribute by plug
    pub fn attribute(&self, plug: &Plug) -> Option<&Attribute> {
        self.nodes.get(&plug.node)?.attribute(&plug.attr)
    }

    fn attribute_mut(&mut self, plug: &Plug) -> Result<&mut Attribute, SceneError> {
        let node = self
            .nodes
            .get_mut(&plug.node)
            .ok_or_else(|| SceneError::NodeNotFound(plug.node.clone()))?;
        node.attribute_mut(&plug.attr)
            .ok_or_else(|| SceneError::AttributeNotFound(plug.clone()))
    }

    /// Set a static value
    pub fn set_value(&mut self, plug: &Plug, value: f64) -> Result<(), SceneError> {
        self.attribute_mut(plug)?.value = AttrValue::Static(value);
        Ok(())
    }

    /// Keyframe an attribute
    pub fn set_curve(&mut self, plug: &Plug, curve: AnimCurve) -> Result<(), SceneError> {
        self.attribute_mut(plug)?.value = AttrValue::Animated(curve);
        Ok(())
    }

    /// Lock or unlock an attribute
    pub fn set_locked(&mut self, plug: &Plug, locked: bool) -> Result<(), SceneError> {
        self.attribute_mut(plug)?.locked = locked;
        self.touch();
        Ok(())
    }

    /// Connect a source plug into a destination plug
    pub fn connect(&mut self, from: Plug, to: Plug) -> Result<ConnectionId, ConnectionError> {
        // Validate both ends exist
        for plug in [&from, &to] {
            let node = self
                .nodes
                .get(&plug.node)
                .ok_or_else(|| ConnectionError::NodeNotFound(plug.node.clone()))?;
            if node.attribute(&plug.attr).is_none() {
                return Err(ConnectionError::AttributeNotFound(plug.clone()));
            }
        }

        if from == to {
            return Err(ConnectionError::SelfLoop(from));
        }

        // A destination has at most one incoming connection
        if self.connections_to(&to).next().is_some() {
            return Err(ConnectionError::AlreadyConnected(to));
        }

        let connection = Connection::new(from, to);
        let id = connection.id;
        tracing::trace!("connect {} -> {}", connection.from, connection.to);
        self.connections.insert(id, connection);
        self.touch();
        Ok(id)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let removed = self.connections.shift_remove(&connection_id);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections into a specific plug
    pub fn connections_to<'a>(&'a self, plug: &'a Plug) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.to == *plug)
    }

    /// Get connections out of a specific plug
    pub fn connections_from<'a>(&'a self, plug: &'a Plug) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.from == *plug)
    }

    /// Get connections whose destination is on a node
    pub fn connections_into_node<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.to.node == node)
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Load a scene snapshot from disk
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path)?;
        let scene = Self::from_ron(&text)?;
        tracing::debug!(
            "Loaded scene '{}' from {:?}: {} nodes, {} connections",
            scene.name,
            path,
            scene.node_count(),
            scene.connection_count()
        );
        Ok(scene)
    }

    /// Save a scene snapshot to disk
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let text = self.to_ron()?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Attribute not found
    #[error("Attribute not found: {0}")]
    AttributeNotFound(Plug),

    /// Destination already has an incoming connection
    #[error("Plug already connected: {0}")]
    AlreadyConnected(Plug),

    /// Plug connected to itself
    #[error("Self-loop not allowed: {0}")]
    SelfLoop(Plug),
}

/// Error when editing or loading a scene
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Attribute not found
    #[error("Attribute not found: {0}")]
    AttributeNotFound(Plug),

    /// Node name already taken
    #[error("Node already exists: {0}")]
    DuplicateNode(String),

    /// Type not registered
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Parenting would create a DAG cycle
    #[error("Cannot parent {child} under {parent}: would create a cycle")]
    ParentCycle {
        /// Child node
        child: String,
        /// Requested parent
        parent: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON write error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level() -> SceneGraph {
        let mut scene = SceneGraph::new("test");
        scene.add_node("top", "transform").unwrap();
        scene.add_node("bottom", "transform").unwrap();
        scene.set_parent("bottom", "top").unwrap();
        scene
    }

    #[test]
    fn test_add_node_rejects_duplicates_and_unknown_types() {
        let mut scene = two_level();
        assert!(matches!(scene.add_node("top", "transform"), Err(SceneError::DuplicateNode(_))));
        assert!(matches!(scene.add_node("x", "nope"), Err(SceneError::UnknownNodeType(_))));
    }

    #[test]
    fn test_parenting_and_ancestors() {
        let mut scene = two_level();
        scene.add_node("leaf", "transform").unwrap();
        scene.add_node("other", "transform").unwrap();
        scene.set_parent("leaf", "bottom").unwrap();
        scene.set_parent("leaf", "other").unwrap();

        let ancestors = scene.ancestors("leaf");
        assert_eq!(ancestors.len(), 3);
        assert!(ancestors.contains(&"top".to_string()));
        assert!(ancestors.contains(&"other".to_string()));
        assert_eq!(scene.children("top").count(), 1);

        assert!(matches!(scene.set_parent("top", "leaf"), Err(SceneError::ParentCycle { .. })));
        assert!(scene.remove_parent("leaf", "other"));
        assert!(!scene.remove_parent("leaf", "other"));
    }

    #[test]
    fn test_connect_validation() {
        let mut scene = two_level();
        let tx = Plug::new("top", "translateX");
        let btx = Plug::new("bottom", "translateX");

        assert!(matches!(
            scene.connect(Plug::new("nope", "translateX"), btx.clone()),
            Err(ConnectionError::NodeNotFound(_))
        ));
        assert!(matches!(
            scene.connect(Plug::new("top", "nope"), btx.clone()),
            Err(ConnectionError::AttributeNotFound(_))
        ));
        assert!(matches!(scene.connect(tx.clone(), tx.clone()), Err(ConnectionError::SelfLoop(_))));

        let id = scene.connect(tx.clone(), btx.clone()).unwrap();
        assert!(matches!(
            scene.connect(Plug::new("top", "translateY"), btx.clone()),
            Err(ConnectionError::AlreadyConnected(_))
        ));
        assert_eq!(scene.connections_to(&btx).count(), 1);
        assert_eq!(scene.connections_from(&tx).count(), 1);
        assert!(scene.disconnect(id).is_some());
        assert_eq!(scene.connection_count(), 0);
    }

    #[test]
    fn test_revision_tracks_topology() {
        let mut scene = SceneGraph::new("rev");
        let start = scene.revision();
        scene.add_node("a", "transform").unwrap();
        assert!(scene.revision() > start);

        let before = scene.revision();
        scene.set_value(&Plug::new("a", "translateX"), 3.0).unwrap();
        assert_eq!(scene.revision(), before);
    }

    #[test]
    fn test_remove_node_drops_connections_and_parent_links() {
        let mut scene = two_level();
        scene
            .connect(Plug::new("top", "translateX"), Plug::new("bottom", "translateY"))
            .unwrap();
        assert!(scene.remove_node("top").is_some());
        assert_eq!(scene.connection_count(), 0);
        assert!(scene.node("bottom").unwrap().parents.is_empty());
    }

    #[test]
    fn test_ron_round_trip() {
        let mut scene = two_level();
        scene
            .set_curve(
                &Plug::new("top", "translateX"),
                AnimCurve::from_pairs(&[(1.0, 0.0), (5.0, 4.0)], matchmove_anim::InterpolationMode::Linear),
            )
            .unwrap();
        let text = scene.to_ron().unwrap();
        let loaded = SceneGraph::from_ron(&text).unwrap();
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.ancestors("bottom"), vec!["top".to_string()]);
        let value = &loaded.attribute(&Plug::new("top", "translateX")).unwrap().value;
        assert_eq!(value.sample(3.0), 2.0);
    }
}
