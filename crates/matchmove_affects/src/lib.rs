// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute-affects resolver for matchmove solving.
//!
//! Given a scene dependency graph, markers (2D observations) and the
//! bundles, cameras and lenses they depend on, this crate works out which
//! solvable attributes can influence each output, per frame. The answer is
//! the sparsity structure a bundle-adjustment solve uses to skip zero
//! Jacobian entries.
//!
//! ## Architecture
//!
//! - [`traversal`]: bounded upstream closure over node connections
//! - [`classifier`]: decides which attributes are solvable plugs
//! - [`enablement`]: per-frame `enable`/`weight` filtering
//! - [`resolver`]: [`ResolverSession`] and the affects queries
//! - [`plug_set`]: result shapes handed to the solver setup
//! - [`sparsity`]: marker ↔ plug sparsity map

pub mod config;
pub mod error;
pub mod kind;
pub mod traversal;
pub mod classifier;
pub mod enablement;
pub mod plug_set;
pub mod resolver;
pub mod sparsity;

#[cfg(test)]
mod fixtures;

pub use config::ResolverConfig;
pub use error::{AffectsError, ResolverWarning};
pub use kind::NodeKind;
pub use traversal::UpstreamClosure;
pub use classifier::{AttributeClassifier, ClassifierCache};
pub use plug_set::{AffectsResult, Frame, FrameSet, PlugSetBuilder};
pub use resolver::ResolverSession;
pub use sparsity::SparsityMap;
