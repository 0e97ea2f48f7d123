// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-frame enablement of markers and other weighted nodes.

use crate::plug_set::FrameSet;
use matchmove_graph::{Plug, RegistryError, SceneRegistry};

/// Attribute switching a node on (1) or off (0)
pub const ENABLE_ATTR: &str = "enable";

/// Attribute scaling a node's contribution
pub const WEIGHT_ATTR: &str = "weight";

/// Frames from `frames` on which `node` is active
///
/// A node with neither a scalar `enable` nor a scalar `weight` is active
/// everywhere. Otherwise each frame is sampled once and kept when
/// `enable * weight > epsilon`, a missing attribute counting as 1.
pub fn active_frames<R: SceneRegistry + ?Sized>(
    registry: &R,
    node: &str,
    frames: &FrameSet,
    epsilon: f64,
) -> Result<FrameSet, RegistryError> {
    let enable = Plug::new(node, ENABLE_ATTR);
    let weight = Plug::new(node, WEIGHT_ATTR);
    let has_enable = is_scalar(registry, &enable)?;
    let has_weight = is_scalar(registry, &weight)?;
    if !has_enable && !has_weight {
        return Ok(frames.clone());
    }

    let mut active = FrameSet::new();
    for &frame in frames {
        let enable_value = if has_enable {
            registry.sample_at_frame(&enable, frame)?
        } else {
            1.0
        };
        let weight_value = if has_weight {
            registry.sample_at_frame(&weight, frame)?
        } else {
            1.0
        };
        if enable_value * weight_value > epsilon {
            active.insert(frame);
        }
    }

    if active.len() < frames.len() {
        tracing::debug!(
            "{} active on {} of {} requested frames",
            node,
            active.len(),
            frames.len()
        );
    }
    Ok(active)
}

// Array/compound attributes such as blend weights are not switches
fn is_scalar<R: SceneRegistry + ?Sized>(registry: &R, plug: &Plug) -> Result<bool, RegistryError> {
    Ok(registry.has_attribute(plug)? && registry.list_child_plugs(plug)?.is_empty())
}
