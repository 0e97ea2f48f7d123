// SPDX-License-Identifier: MIT OR Apache-2.0
//! Marker/plug sparsity map.
//!
//! Collects the affects result of every marker in a solve so the solver
//! setup can tell which parameter columns each residual row touches.

use crate::error::Result;
use crate::plug_set::{AffectsResult, FrameSet, PlugSetBuilder};
use crate::resolver::ResolverSession;
use matchmove_graph::{Plug, SceneRegistry};
use std::collections::{BTreeMap, BTreeSet};

/// Plugs affecting each marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparsityMap {
    by_marker: BTreeMap<String, AffectsResult>,
}

impl SparsityMap {
    /// Resolve every `(marker, camera)` pair
    ///
    /// A marker listed more than once has its results merged.
    pub fn build<R: SceneRegistry + ?Sized>(
        session: &mut ResolverSession<'_, R>,
        pairs: &[(&str, Option<&str>)],
        frames: Option<&FrameSet>,
    ) -> Result<Self> {
        let mut builders: BTreeMap<String, PlugSetBuilder> = BTreeMap::new();
        for &(marker, camera) in pairs {
            let result = session.find_plugs_affected_by_marker(marker, camera, frames)?;
            builders
                .entry(marker.to_string())
                .or_insert_with(|| PlugSetBuilder::new(frames.is_some()))
                .merge(&result);
        }
        let map = Self {
            by_marker: builders
                .into_iter()
                .map(|(marker, builder)| (marker, builder.build()))
                .collect(),
        };
        tracing::debug!(
            "Sparsity map: {} markers, {} plugs, density {:.3}",
            map.by_marker.len(),
            map.plugs().len(),
            map.density()
        );
        Ok(map)
    }

    /// Markers in sorted order
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.by_marker.keys().map(String::as_str)
    }

    /// Result for one marker
    pub fn affects(&self, marker: &str) -> Option<&AffectsResult> {
        self.by_marker.get(marker)
    }

    /// Markers with at least one affecting plug
    pub fn active_markers(&self) -> Vec<&str> {
        self.by_marker
            .iter()
            .filter(|(_, result)| !result.is_empty())
            .map(|(marker, _)| marker.as_str())
            .collect()
    }

    /// Union of all plugs
    pub fn plugs(&self) -> BTreeSet<Plug> {
        self.by_marker
            .values()
            .flat_map(|result| result.plugs().into_iter().cloned())
            .collect()
    }

    /// For each plug, the markers it affects
    pub fn plugs_to_markers(&self) -> BTreeMap<Plug, BTreeSet<String>> {
        let mut inverse: BTreeMap<Plug, BTreeSet<String>> = BTreeMap::new();
        for (marker, result) in &self.by_marker {
            for plug in result.plugs() {
                inverse
                    .entry(plug.clone())
                    .or_default()
                    .insert(marker.clone());
            }
        }
        inverse
    }

    /// Fraction of marker/plug pairs that are related; 0 when empty
    pub fn density(&self) -> f64 {
        let cells = self.by_marker.len() * self.plugs().len();
        if cells == 0 {
            return 0.0;
        }
        let filled: usize = self.by_marker.values().map(AffectsResult::len).sum();
        filled as f64 / cells as f64
    }
}
