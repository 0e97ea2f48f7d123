// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node types for matchmove scenes.
//!
//! Covers the DAG transforms, camera shapes, markers, bundles and lens
//! distortion nodes a camera solve is built from, plus a generic weighted
//! blend utility used to drive attributes through connections.

use crate::attribute::{Attribute, ValueType};
use crate::node::{NodeType, NodeTypeRegistry};

/// Message attribute present on every node, used for relationship links
pub const MESSAGE_ATTR: &str = "message";

/// Attribute a marker uses to reference its bundle
pub const MARKER_BUNDLE_ATTR: &str = "bundle";

fn message() -> Attribute {
    Attribute::new(MESSAGE_ATTR, ValueType::Message)
}

/// Standard DAG transform attributes
pub fn transform_attributes() -> Vec<Attribute> {
    let mut attrs = vec![message()];
    for axis in ["X", "Y", "Z"] {
        attrs.push(Attribute::new(format!("translate{axis}"), ValueType::DoubleLinear).worldspace());
    }
    for axis in ["X", "Y", "Z"] {
        attrs.push(Attribute::new(format!("rotate{axis}"), ValueType::DoubleAngle).worldspace());
    }
    for axis in ["X", "Y", "Z"] {
        attrs.push(
            Attribute::new(format!("scale{axis}"), ValueType::Double)
                .worldspace()
                .with_default(1.0),
        );
    }
    for pair in ["XY", "XZ", "YZ"] {
        attrs.push(Attribute::new(format!("shear{pair}"), ValueType::Double).worldspace());
    }
    attrs.push(Attribute::new("rotateOrder", ValueType::Enum).worldspace());
    attrs.push(Attribute::new("visibility", ValueType::Bool).with_default(1.0));
    attrs
}

fn camera_attributes() -> Vec<Attribute> {
    let doubles = [
        ("focalLength", 35.0),
        ("horizontalFilmAperture", 1.417),
        ("verticalFilmAperture", 0.945),
        ("horizontalFilmOffset", 0.0),
        ("verticalFilmOffset", 0.0),
        ("lensSqueezeRatio", 1.0),
        ("cameraScale", 1.0),
        ("fStop", 5.6),
        ("focusDistance", 5.0),
    ];
    let mut attrs = vec![message()];
    attrs.extend(
        doubles
            .into_iter()
            .map(|(name, default)| Attribute::new(name, ValueType::Double).with_default(default)),
    );
    attrs.push(Attribute::new("nearClipPlane", ValueType::DoubleLinear).with_default(0.1));
    attrs.push(Attribute::new("farClipPlane", ValueType::DoubleLinear).with_default(10000.0));
    attrs.push(Attribute::new("filmFit", ValueType::Enum));
    attrs.push(Attribute::new("visibility", ValueType::Bool).with_default(1.0));
    attrs.push(Attribute::new("inLens", ValueType::Message));
    attrs
}

fn lens_attributes(distortion_attrs: &[&str]) -> Vec<Attribute> {
    let mut attrs = vec![
        message(),
        Attribute::new("enable", ValueType::Int).with_default(1.0),
        Attribute::new("inLens", ValueType::Message),
    ];
    attrs.extend(
        distortion_attrs
            .iter()
            .map(|name| Attribute::new(*name, ValueType::Double)),
    );
    attrs.push(Attribute::output(
        "outLens",
        ValueType::Message,
        ["enable", "inLens"]
            .iter()
            .chain(distortion_attrs.iter())
            .map(|name| name.to_string()),
    ));
    attrs
}

/// Create the registry of built-in matchmove node types
pub fn create_matchmove_registry() -> NodeTypeRegistry {
    let mut registry = NodeTypeRegistry::new();

    registry.register(NodeType {
        id: "transform".to_string(),
        description: "DAG transform".to_string(),
        attributes: transform_attributes(),
    });

    registry.register(NodeType {
        id: "camera".to_string(),
        description: "Camera shape holding the lens and film back".to_string(),
        attributes: camera_attributes(),
    });

    // Markers are transforms that live under a marker group
    let mut marker = transform_attributes();
    marker.push(Attribute::new("enable", ValueType::Int).with_default(1.0));
    marker.push(Attribute::new("weight", ValueType::Double).with_default(1.0));
    marker.push(Attribute::new(MARKER_BUNDLE_ATTR, ValueType::Message));
    registry.register(NodeType {
        id: "mmMarker".to_string(),
        description: "2D tracked point observed by a camera".to_string(),
        attributes: marker,
    });

    registry.register(NodeType {
        id: "mmBundle".to_string(),
        description: "3D point a marker corresponds to".to_string(),
        attributes: transform_attributes(),
    });

    let mut marker_group = transform_attributes();
    for axis in ["X", "Y"] {
        marker_group.push(
            Attribute::new(format!("overscan{axis}"), ValueType::Double)
                .worldspace()
                .with_default(1.0),
        );
    }
    registry.register(NodeType {
        id: "mmMarkerGroupTransform".to_string(),
        description: "Camera-space parent of markers".to_string(),
        attributes: marker_group,
    });

    registry.register(NodeType {
        id: "lensModelClassic".to_string(),
        description: "Classic radial/anamorphic lens distortion".to_string(),
        attributes: lens_attributes(&[
            "distortion",
            "anamorphicSqueeze",
            "curvatureX",
            "curvatureY",
            "quarticDistortion",
        ]),
    });

    let mut lens_3de = lens_attributes(&[
        "tdeClassic_distortion",
        "tdeClassic_anamorphicSqueeze",
        "tdeClassic_curvatureX",
        "tdeClassic_curvatureY",
        "tdeClassic_quarticDistortion",
    ]);
    lens_3de.push(Attribute::new("lensModel", ValueType::Enum));
    registry.register(NodeType {
        id: "mmLensModel3de".to_string(),
        description: "3DEqualizer-style lens distortion".to_string(),
        attributes: lens_3de,
    });

    registry.register(NodeType {
        id: "blendWeighted".to_string(),
        description: "Weighted sum of its inputs".to_string(),
        attributes: vec![
            message(),
            Attribute::compound("input", ["input[0]", "input[1]"]),
            Attribute::new("input[0]", ValueType::Double),
            Attribute::new("input[1]", ValueType::Double),
            Attribute::compound("weight", ["weight[0]", "weight[1]"]),
            Attribute::new("weight[0]", ValueType::Float).with_default(1.0),
            Attribute::new("weight[1]", ValueType::Float).with_default(1.0),
            Attribute::new("current", ValueType::Double),
            Attribute::output("output", ValueType::Double, ["input", "weight", "current"]),
        ],
    });

    registry
}
