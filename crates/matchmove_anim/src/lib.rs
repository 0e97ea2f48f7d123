// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation curves for matchmove scenes.
//!
//! Scene attributes such as a marker's `enable` and `weight` change over
//! time. This crate stores those values as keyframed curves and evaluates
//! them at integer frames or sub-frame times.

pub mod keyframe;
pub mod curve;

pub use keyframe::{Keyframe, KeyframeId, InterpolationMode, Interpolation};
pub use curve::AnimCurve;
