// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute classification.
//!
//! Decides whether a `(node, attribute)` pair is a solvable plug, either
//! directly or through the connections driving it, and returns the settable
//! leaf plugs it resolves to.

use crate::config::ResolverConfig;
use crate::kind::NodeKind;
use matchmove_graph::{Plug, RegistryError, SceneRegistry, ValueType};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Structural answers memoized for the lifetime of a resolver session
///
/// Entries only depend on graph topology and type definitions, never on
/// attribute values. Clear the cache whenever the topology changes.
#[derive(Debug, Default)]
pub struct ClassifierCache {
    node_types: HashMap<String, String>,
    worldspace: HashMap<(String, String), bool>,
    value_types: HashMap<(String, String), ValueType>,
}

impl ClassifierCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every memoized entry
    pub fn clear(&mut self) {
        self.node_types.clear();
        self.worldspace.clear();
        self.value_types.clear();
    }

    /// Number of memoized entries
    pub fn len(&self) -> usize {
        self.node_types.len() + self.worldspace.len() + self.value_types.len()
    }

    /// Whether nothing is memoized
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies attributes against a registry, memoizing into a cache
pub struct AttributeClassifier<'a, R: SceneRegistry + ?Sized> {
    registry: &'a R,
    config: &'a ResolverConfig,
    cache: &'a mut ClassifierCache,
}

impl<'a, R: SceneRegistry + ?Sized> AttributeClassifier<'a, R> {
    /// Create a classifier
    pub fn new(registry: &'a R, config: &'a ResolverConfig, cache: &'a mut ClassifierCache) -> Self {
        Self {
            registry,
            config,
            cache,
        }
    }

    /// Host type name of a node
    pub fn node_type(&mut self, node: &str) -> Result<String, RegistryError> {
        if let Some(node_type) = self.cache.node_types.get(node) {
            return Ok(node_type.clone());
        }
        let node_type = self.registry.node_type(node)?;
        self.cache.node_types.insert(node.to_string(), node_type.clone());
        Ok(node_type)
    }

    /// Classification kind of a node
    pub fn node_kind(&mut self, node: &str) -> Result<NodeKind, RegistryError> {
        let node_type = self.node_type(node)?;
        Ok(NodeKind::from_type_name(&node_type, self.config))
    }

    fn affects_worldspace(&mut self, node_type: &str, attr: &str) -> Result<bool, RegistryError> {
        let key = (node_type.to_string(), attr.to_string());
        if let Some(&affects) = self.cache.worldspace.get(&key) {
            return Ok(affects);
        }
        let affects = self.registry.affects_worldspace(node_type, attr)?;
        self.cache.worldspace.insert(key, affects);
        Ok(affects)
    }

    fn value_type(&mut self, plug: &Plug) -> Result<ValueType, RegistryError> {
        let node_type = self.node_type(&plug.node)?;
        let key = (node_type, plug.attr.clone());
        if let Some(&value_type) = self.cache.value_types.get(&key) {
            return Ok(value_type);
        }
        let value_type = self.registry.value_type(plug)?;
        self.cache.value_types.insert(key, value_type);
        Ok(value_type)
    }

    fn is_solvable_type(&mut self, plug: &Plug) -> Result<bool, RegistryError> {
        Ok(self.value_type(plug)?.is_solvable())
    }

    /// Solvable plugs that `node.attr` resolves to; empty when irrelevant
    pub fn classify(&mut self, node: &str, attr: &str) -> Result<BTreeSet<Plug>, RegistryError> {
        let node_type = self.node_type(node)?;
        let relevant = match NodeKind::from_type_name(&node_type, self.config) {
            NodeKind::Camera => self.config.is_camera_attribute(attr),
            NodeKind::LensModel => self.config.is_lens_attribute(attr),
            NodeKind::Generic => self.affects_worldspace(&node_type, attr)?,
        };
        if !relevant {
            return Ok(BTreeSet::new());
        }

        let plug = Plug::new(node, attr);
        let mut found = BTreeSet::new();
        if self.registry.is_settable(&plug)? {
            if self.is_solvable_type(&plug)? {
                found.insert(plug);
            }
        } else {
            self.resolve_driven(plug, &mut found)?;
        }
        Ok(found)
    }

    /// Solvable plugs of every attribute on a node
    pub fn classify_node(&mut self, node: &str) -> Result<BTreeSet<Plug>, RegistryError> {
        let mut found = BTreeSet::new();
        for attr in self.registry.list_attributes(node)? {
            found.extend(self.classify(node, &attr)?);
        }
        Ok(found)
    }

    /// Walk back from an unsettable plug to the settable leaves driving it
    fn resolve_driven(&mut self, plug: Plug, found: &mut BTreeSet<Plug>) -> Result<(), RegistryError> {
        let mut visited: HashSet<Plug> = HashSet::new();
        visited.insert(plug.clone());
        let mut stack = vec![plug];

        while let Some(current) = stack.pop() {
            let mut candidates = self.registry.list_child_plugs(&current)?;
            for source in self.registry.list_upstream_plugs(&current)? {
                let elements = self.registry.list_child_plugs(&source)?;
                if elements.is_empty() {
                    candidates.push(source);
                } else {
                    candidates.extend(elements);
                }
            }

            for candidate in candidates {
                if !visited.insert(candidate.clone()) {
                    continue;
                }
                if self.registry.is_settable(&candidate)? {
                    if self.is_solvable_type(&candidate)? {
                        found.insert(candidate);
                    }
                } else {
                    stack.push(candidate);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use matchmove_graph::{Attribute, SceneGraph};

    fn classify(scene: &SceneGraph, node: &str, attr: &str) -> BTreeSet<Plug> {
        let config = ResolverConfig::default();
        let mut cache = ClassifierCache::new();
        AttributeClassifier::new(scene, &config, &mut cache)
            .classify(node, attr)
            .unwrap()
    }

    fn plugs(names: &[&str]) -> BTreeSet<Plug> {
        names.iter().map(|n| Plug::parse(n).unwrap()).collect()
    }

    #[test]
    fn test_settable_worldspace_attribute_is_solvable() {
        let scene = fixtures::two_transforms();
        assert_eq!(classify(&scene, "top", "translateX"), plugs(&["top.translateX"]));
    }

    #[test]
    fn test_non_worldspace_and_disallowed_types_are_excluded() {
        let scene = fixtures::two_transforms();
        assert!(classify(&scene, "top", "visibility").is_empty());
        // rotateOrder affects world space but is an enum
        assert!(classify(&scene, "top", "rotateOrder").is_empty());
    }

    #[test]
    fn test_camera_allow_list() {
        let scene = fixtures::camera_rig();
        assert_eq!(classify(&scene, "camShape", "focalLength"), plugs(&["camShape.focalLength"]));
        assert!(classify(&scene, "camShape", "visibility").is_empty());
        assert!(classify(&scene, "camShape", "filmFit").is_empty());
    }

    #[test]
    fn test_lens_allow_list() {
        let scene = fixtures::camera_rig();
        assert_eq!(classify(&scene, "lens", "distortion"), plugs(&["lens.distortion"]));
        assert!(classify(&scene, "lens", "enable").is_empty());
    }

    #[test]
    fn test_locked_attribute_is_excluded() {
        let mut scene = fixtures::two_transforms();
        scene.set_locked(&Plug::new("top", "translateX"), true).unwrap();
        assert!(classify(&scene, "top", "translateX").is_empty());
    }

    #[test]
    fn test_direct_connection_resolves_to_source() {
        let mut scene = fixtures::two_transforms();
        scene
            .connect(Plug::new("top", "rotateY"), Plug::new("bottom", "translateX"))
            .unwrap();
        assert_eq!(classify(&scene, "bottom", "translateX"), plugs(&["top.rotateY"]));
    }

    #[test]
    fn test_blend_expands_array_elements() {
        let scene = fixtures::driven_bundle();
        assert_eq!(
            classify(&scene, "bnd1", "translateX"),
            plugs(&["blend.current", "blend.input[0]", "blend.input[1]", "blend.weight[0]", "blend.weight[1]"])
        );
    }

    #[test]
    fn test_chained_unsettable_sources_recurse() {
        let mut scene = fixtures::driven_bundle();
        scene.add_node("blend2", "blendWeighted").unwrap();
        scene
            .connect(Plug::new("blend2", "output"), Plug::new("blend", "input[1]"))
            .unwrap();
        let found = classify(&scene, "bnd1", "translateX");
        assert!(!found.contains(&Plug::new("blend", "input[1]")));
        assert!(found.contains(&Plug::new("blend", "input[0]")));
        assert!(found.contains(&Plug::new("blend2", "input[1]")));
    }

    #[test]
    fn test_connection_cycle_terminates() {
        let mut scene = fixtures::driven_bundle();
        scene
            .connect(Plug::new("blend", "output"), Plug::new("blend", "input[0]"))
            .unwrap();
        let found = classify(&scene, "bnd1", "translateX");
        assert!(!found.contains(&Plug::new("blend", "input[0]")));
        assert!(found.contains(&Plug::new("blend", "input[1]")));
    }

    #[test]
    fn test_source_of_disallowed_type_is_excluded() {
        let mut scene = fixtures::two_transforms();
        scene
            .add_attribute("top", Attribute::new("flag", matchmove_graph::ValueType::Bool))
            .unwrap();
        scene
            .connect(Plug::new("top", "flag"), Plug::new("bottom", "translateZ"))
            .unwrap();
        assert!(classify(&scene, "bottom", "translateZ").is_empty());
    }

    #[test]
    fn test_unknown_node_propagates() {
        let scene = fixtures::two_transforms();
        let config = ResolverConfig::default();
        let mut cache = ClassifierCache::new();
        let mut classifier = AttributeClassifier::new(&scene, &config, &mut cache);
        assert_eq!(
            classifier.classify("ghost", "translateX"),
            Err(RegistryError::NodeNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_cache_is_populated_and_cleared() {
        let scene = fixtures::two_transforms();
        let config = ResolverConfig::default();
        let mut cache = ClassifierCache::new();
        AttributeClassifier::new(&scene, &config, &mut cache)
            .classify_node("top")
            .unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
