// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory scenes shared by the unit tests.

use crate::enablement::{ENABLE_ATTR, WEIGHT_ATTR};
use matchmove_anim::{AnimCurve, InterpolationMode};
use matchmove_graph::library::{MARKER_BUNDLE_ATTR, MESSAGE_ATTR};
use matchmove_graph::{Plug, RegistryError, SceneGraph, SceneRegistry, ValueType};
use std::cell::RefCell;

/// `bottom` parented under `top`, nothing else
pub fn two_transforms() -> SceneGraph {
    let mut scene = SceneGraph::new("two_transforms");
    scene.add_node("top", "transform").unwrap();
    scene.add_node("bottom", "transform").unwrap();
    scene.set_parent("bottom", "top").unwrap();
    scene
}

/// Camera with a lens, a marker group holding two markers, and one bundle
/// per marker
///
/// ```text
/// camTfm
/// ├── camShape  <- lens.outLens
/// └── mkrGrp
///     ├── mkr1  <- bnd1.message
///     └── mkr2  <- bnd2.message
/// ```
pub fn camera_rig() -> SceneGraph {
    let mut scene = SceneGraph::new("camera_rig");
    scene.add_node("camTfm", "transform").unwrap();
    scene.add_node("camShape", "camera").unwrap();
    scene.add_node("lens", "lensModelClassic").unwrap();
    scene.add_node("mkrGrp", "mmMarkerGroupTransform").unwrap();
    scene.set_parent("camShape", "camTfm").unwrap();
    scene.set_parent("mkrGrp", "camTfm").unwrap();
    scene
        .connect(Plug::new("lens", "outLens"), Plug::new("camShape", "inLens"))
        .unwrap();

    for index in 1..=2 {
        let marker = format!("mkr{index}");
        let bundle = format!("bnd{index}");
        scene.add_node(marker.clone(), "mmMarker").unwrap();
        scene.add_node(bundle.clone(), "mmBundle").unwrap();
        scene.set_parent(&marker, "mkrGrp").unwrap();
        scene
            .connect(
                Plug::new(bundle, MESSAGE_ATTR),
                Plug::new(marker, MARKER_BUNDLE_ATTR),
            )
            .unwrap();
    }
    scene
}

/// Bundle whose `translateX` is driven by a weighted blend
pub fn driven_bundle() -> SceneGraph {
    let mut scene = SceneGraph::new("driven_bundle");
    scene.add_node("bnd1", "mmBundle").unwrap();
    scene.add_node("blend", "blendWeighted").unwrap();
    scene
        .connect(Plug::new("blend", "output"), Plug::new("bnd1", "translateX"))
        .unwrap();
    scene
}

/// `length` transforms where each `n{i+1}.translateX` drives `n{i}.translateX`
pub fn chain(length: usize) -> SceneGraph {
    let mut scene = SceneGraph::new("chain");
    for i in 0..length {
        scene.add_node(format!("n{i}"), "transform").unwrap();
    }
    for i in 0..length.saturating_sub(1) {
        scene
            .connect(
                Plug::new(format!("n{}", i + 1), "translateX"),
                Plug::new(format!("n{i}"), "translateX"),
            )
            .unwrap();
    }
    scene
}

/// Key `enable`/`weight` on `marker` with stepped keys at frames 1, 2, ...
pub fn key_marker(scene: &mut SceneGraph, marker: &str, enable: &[f64], weight: &[f64]) {
    let keys = |values: &[f64]| {
        let pairs: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| ((i + 1) as f64, *v))
            .collect();
        AnimCurve::from_pairs(&pairs, InterpolationMode::Constant)
    };
    scene
        .set_curve(&Plug::new(marker, ENABLE_ATTR), keys(enable))
        .unwrap();
    scene
        .set_curve(&Plug::new(marker, WEIGHT_ATTR), keys(weight))
        .unwrap();
}

/// A lone marker `M` with keyed enablement
pub fn keyed_marker(enable: &[f64], weight: &[f64]) -> SceneGraph {
    let mut scene = SceneGraph::new("keyed_marker");
    scene.add_node("M", "mmMarker").unwrap();
    key_marker(&mut scene, "M", enable, weight);
    scene
}

/// Scene that can be edited while a resolver session borrows it, the way a
/// host application's live scene can
pub struct SharedScene {
    scene: RefCell<SceneGraph>,
}

impl SharedScene {
    pub fn new(scene: SceneGraph) -> Self {
        Self {
            scene: RefCell::new(scene),
        }
    }

    pub fn edit(&self, edit: impl FnOnce(&mut SceneGraph)) {
        edit(&mut self.scene.borrow_mut());
    }
}

impl SceneRegistry for SharedScene {
    fn node_exists(&self, node: &str) -> bool {
        SceneRegistry::node_exists(&*self.scene.borrow(), node)
    }

    fn node_type(&self, node: &str) -> Result<String, RegistryError> {
        SceneRegistry::node_type(&*self.scene.borrow(), node)
    }

    fn list_attributes(&self, node: &str) -> Result<Vec<String>, RegistryError> {
        SceneRegistry::list_attributes(&*self.scene.borrow(), node)
    }

    fn has_attribute(&self, plug: &Plug) -> Result<bool, RegistryError> {
        SceneRegistry::has_attribute(&*self.scene.borrow(), plug)
    }

    fn list_parents(&self, node: &str) -> Result<Vec<String>, RegistryError> {
        SceneRegistry::list_parents(&*self.scene.borrow(), node)
    }

    fn list_children(&self, node: &str) -> Result<Vec<String>, RegistryError> {
        SceneRegistry::list_children(&*self.scene.borrow(), node)
    }

    fn list_upstream_nodes(&self, node: &str) -> Result<Vec<String>, RegistryError> {
        SceneRegistry::list_upstream_nodes(&*self.scene.borrow(), node)
    }

    fn list_upstream_plugs(&self, plug: &Plug) -> Result<Vec<Plug>, RegistryError> {
        SceneRegistry::list_upstream_plugs(&*self.scene.borrow(), plug)
    }

    fn list_child_plugs(&self, plug: &Plug) -> Result<Vec<Plug>, RegistryError> {
        SceneRegistry::list_child_plugs(&*self.scene.borrow(), plug)
    }

    fn is_settable(&self, plug: &Plug) -> Result<bool, RegistryError> {
        SceneRegistry::is_settable(&*self.scene.borrow(), plug)
    }

    fn value_type(&self, plug: &Plug) -> Result<ValueType, RegistryError> {
        SceneRegistry::value_type(&*self.scene.borrow(), plug)
    }

    fn affects_worldspace(&self, node_type: &str, attr: &str) -> Result<bool, RegistryError> {
        SceneRegistry::affects_worldspace(&*self.scene.borrow(), node_type, attr)
    }

    fn sample_at_frame(&self, plug: &Plug, frame: i32) -> Result<f64, RegistryError> {
        SceneRegistry::sample_at_frame(&*self.scene.borrow(), plug, frame)
    }

    fn revision(&self) -> u64 {
        SceneRegistry::revision(&*self.scene.borrow())
    }
}
