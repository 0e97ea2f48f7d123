// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node kinds that carry their own solvable-attribute allow-lists.

use crate::config::ResolverConfig;

/// Category of a node as far as attribute classification is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Camera shape; only allow-listed camera attributes are solvable
    Camera,
    /// Lens distortion node; only allow-listed lens attributes are solvable
    LensModel,
    /// Anything else; solvable attributes must affect world space
    Generic,
}

impl NodeKind {
    /// Host type name of camera shapes
    pub const CAMERA_TYPE: &'static str = "camera";

    /// Translate a host type name
    pub fn from_type_name(type_name: &str, config: &ResolverConfig) -> Self {
        if type_name == Self::CAMERA_TYPE {
            Self::Camera
        } else if config
            .lens_type_prefixes
            .iter()
            .any(|prefix| type_name.starts_with(prefix.as_str()))
        {
            Self::LensModel
        } else {
            Self::Generic
        }
    }

    /// Whether the kind restricts attributes to an allow-list
    pub fn is_allow_listed(&self) -> bool {
        match self {
            Self::Camera | Self::LensModel => true,
            Self::Generic => false,
        }
    }
}
