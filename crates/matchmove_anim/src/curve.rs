// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation curve evaluation.

use crate::keyframe::{InterpolationMode, Interpolation, Keyframe, KeyframeId};
use serde::{Deserialize, Serialize};

/// Keys closer together than this are treated as coincident
const TIME_TOLERANCE: f64 = 1e-4;

/// A scalar curve of keyframes sorted by time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimCurve {
    keyframes: Vec<Keyframe>,
}

impl AnimCurve {
    /// Create an empty curve
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from `(time, value)` pairs sharing one interpolation mode
    pub fn from_pairs(pairs: &[(f64, f64)], mode: InterpolationMode) -> Self {
        let mut curve = Self::new();
        for &(time, value) in pairs {
            curve.add_keyframe(Keyframe::new(time, value).with_interpolation(mode));
        }
        curve
    }

    /// Add a keyframe, replacing any key already at the same time
    pub fn add_keyframe(&mut self, keyframe: Keyframe) {
        self.keyframes.retain(|k| (k.time - keyframe.time).abs() >= TIME_TOLERANCE);
        self.keyframes.push(keyframe);
        self.sort_keyframes();
    }

    /// Remove a keyframe
    pub fn remove_keyframe(&mut self, keyframe_id: KeyframeId) {
        self.keyframes.retain(|k| k.id != keyframe_id);
    }

    /// Move keyframe to a new time
    pub fn move_keyframe(&mut self, keyframe_id: KeyframeId, new_time: f64) {
        if let Some(kf) = self.keyframes.iter_mut().find(|k| k.id == keyframe_id) {
            kf.time = new_time;
        }
        self.sort_keyframes();
    }

    fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// All keyframes in time order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Whether the curve has no keys
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Get keyframe at time (if exists)
    pub fn keyframe_at(&self, time: f64) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| (k.time - time).abs() < TIME_TOLERANCE)
    }

    /// Get keyframes in an inclusive time range
    pub fn keyframes_in_range(&self, start: f64, end: f64) -> Vec<&Keyframe> {
        self.keyframes
            .iter()
            .filter(|k| k.time >= start && k.time <= end)
            .collect()
    }

    /// Time of the last keyframe
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// Evaluate the curve, holding the first/last value outside the keyed range
    pub fn evaluate(&self, time: f64) -> Option<f64> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }

        // First keyframe strictly after `time`; guaranteed to be in 1..len
        let next_idx = self.keyframes.iter().position(|k| k.time > time)?;
        let a = &self.keyframes[next_idx - 1];
        let b = &self.keyframes[next_idx];
        let span = b.time - a.time;
        if span.abs() < TIME_TOLERANCE {
            return Some(b.value);
        }
        let t = (time - a.time) / span;

        let value = match a.interpolation {
            InterpolationMode::Constant => a.value,
            InterpolationMode::Linear => Interpolation::lerp(a.value, b.value, t),
            InterpolationMode::Smooth => {
                let m0 = self.auto_slope(next_idx - 1) * span;
                let m1 = self.auto_slope(next_idx) * span;
                Interpolation::hermite(a.value, m0, b.value, m1, t)
            }
        };
        Some(value)
    }

    /// Catmull-Rom style slope at a key, one-sided at the curve ends
    fn auto_slope(&self, index: usize) -> f64 {
        let prev = index.checked_sub(1).map(|i| &self.keyframes[i]);
        let next = self.keyframes.get(index + 1);
        let current = &self.keyframes[index];
        let (lo, hi) = match (prev, next) {
            (Some(p), Some(n)) => (p, n),
            (None, Some(n)) => (current, n),
            (Some(p), None) => (p, current),
            (None, None) => return 0.0,
        };
        let dt = hi.time - lo.time;
        if dt.abs() < TIME_TOLERANCE {
            0.0
        } else {
            (hi.value - lo.value) / dt
        }
    }
}
