// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene dependency graph for matchmove solving.
//!
//! This crate models the slice of a 3D scene that a camera/bundle solve
//! needs to reason about:
//! - Named nodes with a host type (`transform`, `camera`, `mmMarker`, ...)
//! - Typed attributes, optionally keyframed
//! - Directed attribute connections and DAG parenting
//!
//! ## Architecture
//!
//! [`SceneRegistry`] is the read-only query contract that the affects
//! resolver consumes. [`SceneGraph`] is an in-memory implementation that can
//! be built programmatically or loaded from a RON snapshot.

pub mod attribute;
pub mod node;
pub mod connection;
pub mod graph;
pub mod registry;
pub mod library;

pub use attribute::{Attribute, AttrValue, ValueType};
pub use node::{SceneNode, NodeType, NodeTypeRegistry};
pub use connection::{Connection, ConnectionId, Plug};
pub use graph::{SceneGraph, ConnectionError, SceneError};
pub use registry::{SceneRegistry, RegistryError};
