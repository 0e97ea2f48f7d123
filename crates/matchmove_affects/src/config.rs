// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resolver configuration.
//!
//! Settings are plain data and can be stored next to a scene as RON.

use crate::error::{AffectsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cap on upstream traversal iterations
pub const DEFAULT_MAX_TRAVERSAL_ITERATIONS: usize = 9;

/// Default threshold above which `enable * weight` counts as active
pub const DEFAULT_WEIGHT_EPSILON: f64 = 1e-5;

const CAMERA_ATTRIBUTES: &[&str] = &[
    "focalLength",
    "horizontalFilmAperture",
    "verticalFilmAperture",
    "horizontalFilmOffset",
    "verticalFilmOffset",
    "lensSqueezeRatio",
    "nearClipPlane",
    "farClipPlane",
    "cameraScale",
];

const LENS_ATTRIBUTES: &[&str] = &[
    "distortion",
    "anamorphicSqueeze",
    "curvatureX",
    "curvatureY",
    "quarticDistortion",
    "tdeClassic_distortion",
    "tdeClassic_anamorphicSqueeze",
    "tdeClassic_curvatureX",
    "tdeClassic_curvatureY",
    "tdeClassic_quarticDistortion",
];

const LENS_TYPE_PREFIXES: &[&str] = &["lensModel", "mmLensModel"];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// Settings for one resolver session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of hops the upstream traversal expands
    pub max_traversal_iterations: usize,
    /// A node is active on a frame when `enable * weight` exceeds this
    pub weight_epsilon: f64,
    /// Camera shape attributes that may be solved
    pub camera_attributes: Vec<String>,
    /// Lens distortion attributes that may be solved
    pub lens_attributes: Vec<String>,
    /// Node type name prefixes identifying lens nodes
    pub lens_type_prefixes: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_traversal_iterations: DEFAULT_MAX_TRAVERSAL_ITERATIONS,
            weight_epsilon: DEFAULT_WEIGHT_EPSILON,
            camera_attributes: owned(CAMERA_ATTRIBUTES),
            lens_attributes: owned(LENS_ATTRIBUTES),
            lens_type_prefixes: owned(LENS_TYPE_PREFIXES),
        }
    }
}

impl ResolverConfig {
    /// Check values are usable
    pub fn validate(&self) -> Result<()> {
        if self.max_traversal_iterations == 0 {
            return Err(AffectsError::InvalidConfig(
                "max_traversal_iterations must be at least 1".to_string(),
            ));
        }
        if !self.weight_epsilon.is_finite() || self.weight_epsilon < 0.0 {
            return Err(AffectsError::InvalidConfig(format!(
                "weight_epsilon must be finite and non-negative, got {}",
                self.weight_epsilon
            )));
        }
        Ok(())
    }

    /// Whether a camera attribute is on the allow-list
    pub fn is_camera_attribute(&self, attr: &str) -> bool {
        self.camera_attributes.iter().any(|a| a == attr)
    }

    /// Whether a lens attribute is on the allow-list
    pub fn is_lens_attribute(&self, attr: &str) -> bool {
        self.lens_attributes.iter().any(|a| a == attr)
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format; missing fields take their defaults
    pub fn from_ron(s: &str) -> Result<Self> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&text)?;
        tracing::debug!("Loaded resolver config from {:?}", path);
        Ok(config)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_traversal_iterations, 9);
        assert_eq!(config.weight_epsilon, 1e-5);
        assert!(config.is_camera_attribute("focalLength"));
        assert!(!config.is_camera_attribute("visibility"));
        assert!(config.is_lens_attribute("tdeClassic_distortion"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = ResolverConfig::from_ron("(max_traversal_iterations: 20)").unwrap();
        assert_eq!(config.max_traversal_iterations, 20);
        assert_eq!(config.weight_epsilon, DEFAULT_WEIGHT_EPSILON);
        assert!(config.is_camera_attribute("focalLength"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ResolverConfig::from_ron("(max_traversal_iterations: 0)"),
            Err(AffectsError::InvalidConfig(_))
        ));
        assert!(matches!(
            ResolverConfig::from_ron("(weight_epsilon: -1.0)"),
            Err(AffectsError::InvalidConfig(_))
        ));
        assert!(matches!(ResolverConfig::from_ron("(("), Err(AffectsError::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolver.ron");
        let mut config = ResolverConfig::default();
        config.camera_attributes.push("fStop".to_string());
        config.save(&path).unwrap();
        let loaded = ResolverConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
