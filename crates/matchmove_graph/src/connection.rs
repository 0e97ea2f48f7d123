// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plugs and connections (edges) in the scene graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A `(node, attribute)` pair
///
/// Ordering is by node path, then attribute name, so sorted collections of
/// plugs print deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Plug {
    /// Node path
    pub node: String,
    /// Attribute name
    pub attr: String,
}

impl Plug {
    /// Create a plug
    pub fn new(node: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attr: attr.into(),
        }
    }

    /// Parse `node.attr`, splitting at the first dot after the last `|`
    pub fn parse(name: &str) -> Option<Self> {
        let path_end = name.rfind('|').map_or(0, |i| i + 1);
        let dot = path_end + name[path_end..].find('.')?;
        let (node, attr) = (&name[..dot], &name[dot + 1..]);
        if node.is_empty() || attr.is_empty() {
            return None;
        }
        Some(Self::new(node, attr))
    }
}

impl fmt::Display for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.attr)
    }
}

/// A connection from a source plug into a destination plug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source plug
    pub from: Plug,
    /// Destination plug
    pub to: Plug,
}

impl Connection {
    /// Create a new connection
    pub fn new(from: Plug, to: Plug) -> Self {
        Self {
            id: ConnectionId::new(),
            from,
            to,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node: &str) -> bool {
        self.from.node == node || self.to.node == node
    }

    /// Check if this connection involves a specific plug
    pub fn involves_plug(&self, plug: &Plug) -> bool {
        self.from == *plug || self.to == *plug
    }
}
