// SPDX-License-Identifier: MIT OR Apache-2.0
//! Upstream closure over the scene's node connections.
//!
//! The walk is breadth-first: each iteration replaces the frontier with the
//! not-yet-visited upstream nodes of every frontier node. A visited set
//! stops cycles from revisiting nodes; the iteration cap bounds pathological
//! depth, returning a partial closure instead of running on.

use matchmove_graph::{RegistryError, SceneRegistry};
use std::collections::BTreeSet;

/// Nodes reachable upstream of a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamClosure {
    /// Root and every node found upstream of it, sorted and unique
    pub nodes: Vec<String>,
    /// Iterations performed
    pub iterations: usize,
    /// Upstream nodes discovered past the cap and left out; zero when complete
    pub pending: usize,
}

impl UpstreamClosure {
    /// Whether the iteration cap cut the traversal short
    pub fn bound_exceeded(&self) -> bool {
        self.pending > 0
    }
}

/// Collect the upstream closure of `node`, expanding at most
/// `max_iterations` hops
pub fn upstream_closure<R: SceneRegistry + ?Sized>(
    registry: &R,
    node: &str,
    max_iterations: usize,
) -> Result<UpstreamClosure, RegistryError> {
    let mut visited: BTreeSet<String> = BTreeSet::new();
    visited.insert(node.to_string());
    let mut frontier: BTreeSet<String> = visited.clone();
    let mut iterations = 0;
    let mut pending = 0;

    loop {
        let mut next: BTreeSet<String> = BTreeSet::new();
        for current in &frontier {
            for upstream in registry.list_upstream_nodes(current)? {
                if !visited.contains(&upstream) {
                    next.insert(upstream);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        if iterations >= max_iterations {
            pending = next.len();
            break;
        }
        iterations += 1;
        visited.extend(next.iter().cloned());
        frontier = next;
    }

    tracing::trace!(
        "Upstream of {}: {} nodes in {} iterations",
        node,
        visited.len(),
        iterations
    );

    Ok(UpstreamClosure {
        nodes: visited.into_iter().collect(),
        iterations,
        pending,
    })
}

/// Every DAG ancestor of `node` across all parent chains, sorted
pub fn dag_ancestors<R: SceneRegistry + ?Sized>(
    registry: &R,
    node: &str,
) -> Result<BTreeSet<String>, RegistryError> {
    let mut ancestors = BTreeSet::new();
    let mut stack = registry.list_parents(node)?;
    while let Some(parent) = stack.pop() {
        if parent != node && ancestors.insert(parent.clone()) {
            stack.extend(registry.list_parents(&parent)?);
        }
    }
    Ok(ancestors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use matchmove_graph::{Plug, SceneGraph};

    #[test]
    fn test_isolated_node_is_singleton() {
        let mut scene = SceneGraph::new("single");
        scene.add_node("solo", "transform").unwrap();
        let closure = upstream_closure(&scene, "solo", 9).unwrap();
        assert_eq!(closure.nodes, vec!["solo".to_string()]);
        assert_eq!(closure.iterations, 0);
        assert!(!closure.bound_exceeded());
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let scene = SceneGraph::new("empty");
        assert_eq!(
            upstream_closure(&scene, "ghost", 9),
            Err(RegistryError::NodeNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_closure_includes_parents_and_sources() {
        let scene = fixtures::camera_rig();
        let closure = upstream_closure(&scene, "camShape", 9).unwrap();
        assert_eq!(
            closure.nodes,
            vec!["camShape".to_string(), "camTfm".to_string(), "lens".to_string()]
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let mut scene = SceneGraph::new("cycle");
        scene.add_node("a", "transform").unwrap();
        scene.add_node("b", "transform").unwrap();
        scene.connect(Plug::new("a", "translateX"), Plug::new("b", "translateX")).unwrap();
        scene.connect(Plug::new("b", "translateY"), Plug::new("a", "translateY")).unwrap();
        let closure = upstream_closure(&scene, "a", 9).unwrap();
        assert_eq!(closure.nodes, vec!["a".to_string(), "b".to_string()]);
        assert!(!closure.bound_exceeded());
    }

    #[test]
    fn test_cap_returns_partial_closure() {
        let scene = fixtures::chain(12);
        let closure = upstream_closure(&scene, "n0", 9).unwrap();
        // n0 plus nine hops
        assert_eq!(closure.nodes.len(), 10);
        assert_eq!(closure.iterations, 9);
        assert!(closure.bound_exceeded());
        assert_eq!(closure.pending, 1);

        let full = upstream_closure(&scene, "n0", 20).unwrap();
        assert_eq!(full.nodes.len(), 12);
        assert!(!full.bound_exceeded());
    }

    #[test]
    fn test_exact_depth_does_not_trip_cap() {
        let scene = fixtures::chain(10);
        let closure = upstream_closure(&scene, "n0", 9).unwrap();
        assert_eq!(closure.nodes.len(), 10);
        assert!(!closure.bound_exceeded());
    }

    #[test]
    fn test_instanced_node_has_all_ancestors() {
        let mut scene = SceneGraph::new("instanced");
        for name in ["rootA", "rootB", "mid", "leaf"] {
            scene.add_node(name, "transform").unwrap();
        }
        scene.set_parent("mid", "rootA").unwrap();
        scene.set_parent("leaf", "mid").unwrap();
        scene.set_parent("leaf", "rootB").unwrap();

        let ancestors = dag_ancestors(&scene, "leaf").unwrap();
        let expected: BTreeSet<String> =
            ["mid", "rootA", "rootB"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ancestors, expected);

        let closure = upstream_closure(&scene, "leaf", 9).unwrap();
        assert_eq!(closure.nodes.len(), 4);
    }
}
