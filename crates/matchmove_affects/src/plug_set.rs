// SPDX-License-Identifier: MIT OR Apache-2.0
//! Result shapes handed to solver setup.

use matchmove_graph::Plug;
use std::collections::{BTreeMap, BTreeSet};

/// Integer time sample
pub type Frame = i32;

/// Sorted, duplicate-free set of frames
pub type FrameSet = BTreeSet<Frame>;

/// Plugs affecting an output, with or without frame association
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffectsResult {
    /// Frames were not requested
    Plugs(BTreeSet<Plug>),
    /// Each plug with the non-empty set of frames it is relevant on
    Framed(BTreeMap<Plug, FrameSet>),
}

impl AffectsResult {
    /// An empty result of the requested shape
    pub fn empty(framed: bool) -> Self {
        if framed {
            Self::Framed(BTreeMap::new())
        } else {
            Self::Plugs(BTreeSet::new())
        }
    }

    /// Whether nothing affects the output
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of plugs
    pub fn len(&self) -> usize {
        match self {
            Self::Plugs(plugs) => plugs.len(),
            Self::Framed(map) => map.len(),
        }
    }

    /// Whether frames are attached
    pub fn is_framed(&self) -> bool {
        matches!(self, Self::Framed(_))
    }

    /// Whether a plug is present
    pub fn contains(&self, plug: &Plug) -> bool {
        match self {
            Self::Plugs(plugs) => plugs.contains(plug),
            Self::Framed(map) => map.contains_key(plug),
        }
    }

    /// Plugs in sorted order
    pub fn plugs(&self) -> Vec<&Plug> {
        match self {
            Self::Plugs(plugs) => plugs.iter().collect(),
            Self::Framed(map) => map.keys().collect(),
        }
    }

    /// Frames for a plug, when frames were requested
    pub fn frames(&self, plug: &Plug) -> Option<&FrameSet> {
        match self {
            Self::Plugs(_) => None,
            Self::Framed(map) => map.get(plug),
        }
    }

    /// Whether every plug (and, for framed results, every plug frame) of
    /// `other` is also in `self`
    pub fn is_superset(&self, other: &AffectsResult) -> bool {
        other.plugs().into_iter().all(|plug| {
            self.contains(plug)
                && match (self.frames(plug), other.frames(plug)) {
                    (Some(mine), Some(theirs)) => mine.is_superset(theirs),
                    _ => true,
                }
        })
    }

    /// Sorted unique `node.attr` names
    pub fn plug_names(&self) -> Vec<String> {
        self.plugs().into_iter().map(ToString::to_string).collect()
    }

    /// Composite keys: `node.attr` when unframed, `node.attr#f1,f2,...`
    /// (ascending) when framed
    pub fn keys(&self) -> Vec<String> {
        match self {
            Self::Plugs(_) => self.plug_names(),
            Self::Framed(map) => map
                .iter()
                .map(|(plug, frames)| format!("{plug}#{}", join_frames(frames)))
                .collect(),
        }
    }
}

fn join_frames(frames: &FrameSet) -> String {
    frames
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Accumulates plugs found across many nodes into an [`AffectsResult`]
#[derive(Debug, Clone)]
pub struct PlugSetBuilder {
    framed: bool,
    entries: BTreeMap<Plug, FrameSet>,
}

impl PlugSetBuilder {
    /// Create a builder; `framed` selects the output shape
    pub fn new(framed: bool) -> Self {
        Self {
            framed,
            entries: BTreeMap::new(),
        }
    }

    /// Record a plug on some frames (ignored when unframed)
    pub fn add(&mut self, plug: Plug, frames: Option<&FrameSet>) {
        let entry = self.entries.entry(plug).or_default();
        if let Some(frames) = frames {
            entry.extend(frames.iter().copied());
        }
    }

    /// Record several plugs on the same frames
    pub fn add_all(&mut self, plugs: impl IntoIterator<Item = Plug>, frames: Option<&FrameSet>) {
        for plug in plugs {
            self.add(plug, frames);
        }
    }

    /// Fold an existing result in
    pub fn merge(&mut self, result: &AffectsResult) {
        match result {
            AffectsResult::Plugs(plugs) => self.add_all(plugs.iter().cloned(), None),
            AffectsResult::Framed(map) => {
                for (plug, frames) in map {
                    self.add(plug.clone(), Some(frames));
                }
            }
        }
    }

    /// Finish; framed plugs with no frames are dropped
    pub fn build(self) -> AffectsResult {
        if self.framed {
            AffectsResult::Framed(
                self.entries
                    .into_iter()
                    .filter(|(_, frames)| !frames.is_empty())
                    .collect(),
            )
        } else {
            AffectsResult::Plugs(self.entries.into_keys().collect())
        }
    }
}
