// SPDX-License-Identifier: MIT OR Apache-2.0
//! Affects queries.
//!
//! A [`ResolverSession`] answers "which solvable plugs can influence this
//! output, on which frames?" for transforms, markers and bundles. The session
//! owns the structural memo caches; they are cleared by [`invalidate`] or
//! automatically when the registry reports a new topology revision.
//!
//! [`invalidate`]: ResolverSession::invalidate

use crate::classifier::{AttributeClassifier, ClassifierCache};
use crate::config::ResolverConfig;
use crate::enablement;
use crate::error::{ResolverWarning, Result};
use crate::kind::NodeKind;
use crate::plug_set::{AffectsResult, FrameSet, PlugSetBuilder};
use crate::traversal::{self, UpstreamClosure};
use matchmove_graph::library::MARKER_BUNDLE_ATTR;
use matchmove_graph::{Plug, SceneRegistry};
use std::collections::BTreeSet;

/// Memoizing resolver bound to one registry
pub struct ResolverSession<'a, R: SceneRegistry + ?Sized> {
    registry: &'a R,
    config: ResolverConfig,
    cache: ClassifierCache,
    seen_revision: u64,
    warnings: Vec<ResolverWarning>,
}

impl<'a, R: SceneRegistry + ?Sized> ResolverSession<'a, R> {
    /// Create a session with the default configuration
    pub fn new(registry: &'a R) -> Self {
        Self {
            registry,
            config: ResolverConfig::default(),
            cache: ClassifierCache::new(),
            seen_revision: registry.revision(),
            warnings: Vec::new(),
        }
    }

    /// Create a session with a validated configuration
    pub fn with_config(registry: &'a R, config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Self::new(registry);
        session.config = config;
        Ok(session)
    }

    /// Active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Underlying registry
    pub fn registry(&self) -> &'a R {
        self.registry
    }

    /// Memo cache, mostly useful for diagnostics
    pub fn cache(&self) -> &ClassifierCache {
        &self.cache
    }

    /// Drop memoized structural answers; call after changing the graph
    pub fn invalidate(&mut self) {
        tracing::debug!("Invalidating resolver caches ({} entries)", self.cache.len());
        self.cache.clear();
        self.seen_revision = self.registry.revision();
    }

    fn sync_revision(&mut self) {
        if self.registry.revision() != self.seen_revision {
            self.invalidate();
        }
    }

    /// Warnings collected so far
    pub fn warnings(&self) -> &[ResolverWarning] {
        &self.warnings
    }

    /// Take and clear collected warnings
    pub fn take_warnings(&mut self) -> Vec<ResolverWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn classifier(&mut self) -> AttributeClassifier<'_, R> {
        AttributeClassifier::new(self.registry, &self.config, &mut self.cache)
    }

    /// Upstream closure of a node, recording a warning when the cap is hit
    pub fn upstream_nodes(&mut self, node: &str) -> Result<UpstreamClosure> {
        let closure =
            traversal::upstream_closure(self.registry, node, self.config.max_traversal_iterations)?;
        if closure.bound_exceeded() {
            let warning = ResolverWarning::TraversalBoundExceeded {
                node: node.to_string(),
                iterations: closure.iterations,
                pending: closure.pending,
            };
            if !self.warnings.contains(&warning) {
                tracing::warn!("{}", warning);
                self.warnings.push(warning);
            }
        }
        Ok(closure)
    }

    /// Requested frames on which a node is enabled
    pub fn active_frames(&mut self, node: &str, frames: &FrameSet) -> Result<FrameSet> {
        Ok(enablement::active_frames(
            self.registry,
            node,
            frames,
            self.config.weight_epsilon,
        )?)
    }

    /// Bundle node referenced by a marker, if any
    pub fn marker_bundle(&mut self, marker: &str) -> Result<Option<String>> {
        let plug = Plug::new(marker, MARKER_BUNDLE_ATTR);
        if !self.registry.has_attribute(&plug)? {
            return Ok(None);
        }
        Ok(self
            .registry
            .list_upstream_plugs(&plug)?
            .into_iter()
            .next()
            .map(|source| source.node))
    }

    /// Plugs that can influence `node`'s world-space transform, optionally
    /// within a camera's context
    ///
    /// Without `frames` the result is a flat plug set. With `frames`, the
    /// target's own enablement restricts them first (nothing active gives an
    /// empty result), and each contributing node then only adds the frames
    /// it is enabled on.
    pub fn find_plugs_affecting_transform(
        &mut self,
        node: &str,
        camera: Option<&str>,
        frames: Option<&FrameSet>,
    ) -> Result<AffectsResult> {
        self.sync_revision();
        let mut builder = PlugSetBuilder::new(frames.is_some());
        self.collect_transform(&mut builder, node, camera, frames)?;
        Ok(builder.build())
    }

    /// Plugs that can influence a marker's residual: the marker's own
    /// hierarchy plus its bundle, within the camera's context
    ///
    /// Frames are first restricted to those the marker is enabled on; a
    /// marker enabled on none of them yields an empty result.
    pub fn find_plugs_affected_by_marker(
        &mut self,
        marker: &str,
        camera: Option<&str>,
        frames: Option<&FrameSet>,
    ) -> Result<AffectsResult> {
        self.sync_revision();
        self.registry.node_type(marker)?;

        let active = match frames {
            Some(frames) => {
                let active = self.active_frames(marker, frames)?;
                if active.is_empty() {
                    tracing::debug!("Marker {} is disabled on every requested frame", marker);
                    return Ok(AffectsResult::empty(true));
                }
                Some(active)
            }
            None => None,
        };

        let mut builder = PlugSetBuilder::new(active.is_some());
        self.collect_transform(&mut builder, marker, camera, active.as_ref())?;
        if let Some(bundle) = self.marker_bundle(marker)? {
            self.collect_transform(&mut builder, &bundle, camera, active.as_ref())?;
        }
        Ok(builder.build())
    }

    /// Plugs that can influence `bundle` as observed through `marker`
    ///
    /// Empty when the marker does not reference the bundle or is disabled on
    /// every requested frame. Each camera contributes its own context; with
    /// no cameras the bundle is resolved on its own.
    pub fn find_plugs_affecting_bundle(
        &mut self,
        bundle: &str,
        marker: &str,
        cameras: &[&str],
        frames: Option<&FrameSet>,
    ) -> Result<AffectsResult> {
        self.sync_revision();
        self.registry.node_type(bundle)?;
        self.registry.node_type(marker)?;

        if self.marker_bundle(marker)?.as_deref() != Some(bundle) {
            tracing::debug!("Marker {} does not reference bundle {}", marker, bundle);
            return Ok(AffectsResult::empty(frames.is_some()));
        }

        let active = match frames {
            Some(frames) => {
                let active = self.active_frames(marker, frames)?;
                if active.is_empty() {
                    return Ok(AffectsResult::empty(true));
                }
                Some(active)
            }
            None => None,
        };

        let mut builder = PlugSetBuilder::new(active.is_some());
        if cameras.is_empty() {
            self.collect_transform(&mut builder, bundle, None, active.as_ref())?;
        } else {
            for &camera in cameras {
                self.collect_transform(&mut builder, bundle, Some(camera), active.as_ref())?;
            }
        }
        Ok(builder.build())
    }

    fn collect_transform(
        &mut self,
        builder: &mut PlugSetBuilder,
        node: &str,
        camera: Option<&str>,
        frames: Option<&FrameSet>,
    ) -> Result<()> {
        let target_frames = match frames {
            Some(frames) => {
                let active = self.active_frames(node, frames)?;
                if active.is_empty() {
                    tracing::debug!("{} is disabled on every requested frame", node);
                    return Ok(());
                }
                Some(active)
            }
            None => None,
        };

        let nodes = self.gather_nodes(node, camera)?;
        let mut node_frames = Vec::with_capacity(nodes.len());
        for current in &nodes {
            let active = match &target_frames {
                Some(frames) => Some(self.active_frames(current, frames)?),
                None => None,
            };
            node_frames.push(active);
        }

        let mut classifier = self.classifier();
        let mut count = 0;
        for (current, active) in nodes.iter().zip(&node_frames) {
            if active.as_ref().is_some_and(BTreeSet::is_empty) {
                continue;
            }
            let plugs = classifier.classify_node(current)?;
            count += plugs.len();
            builder.add_all(plugs, active.as_ref());
        }
        tracing::debug!(
            "{} (camera {:?}): {} plugs across {} nodes",
            node,
            camera,
            count,
            nodes.len()
        );
        Ok(())
    }

    /// Target and camera roots with their DAG ancestors, each expanded to
    /// its upstream closure
    fn gather_nodes(&mut self, node: &str, camera: Option<&str>) -> Result<BTreeSet<String>> {
        let mut roots: BTreeSet<String> = BTreeSet::new();
        roots.insert(node.to_string());
        roots.extend(traversal::dag_ancestors(self.registry, node)?);

        if let Some(camera) = camera {
            roots.insert(camera.to_string());
            roots.extend(traversal::dag_ancestors(self.registry, camera)?);
            // A camera transform brings its camera shapes along
            for child in self.registry.list_children(camera)? {
                if self.classifier().node_kind(&child)? == NodeKind::Camera {
                    roots.insert(child);
                }
            }
        }

        let mut nodes = BTreeSet::new();
        for root in &roots {
            nodes.extend(self.upstream_nodes(root)?.nodes);
        }
        Ok(nodes)
    }
}
