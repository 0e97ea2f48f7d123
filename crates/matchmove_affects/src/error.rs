// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors and warnings raised by the resolver.

use matchmove_graph::RegistryError;
use thiserror::Error;

/// Resolver errors
#[derive(Debug, Error)]
pub enum AffectsError {
    /// A queried node or attribute does not exist
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration values out of range
    #[error("Invalid resolver config: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON write error
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

impl AffectsError {
    /// Whether the error is a missing node or attribute
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Registry(RegistryError::NodeNotFound(_) | RegistryError::AttributeNotFound(_))
        )
    }
}

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, AffectsError>;

/// Non-fatal conditions surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverWarning {
    /// Upstream traversal hit its iteration cap and returned a partial closure
    #[error(
        "Upstream traversal from {node} stopped after {iterations} iterations; \
         {pending} upstream nodes were not visited"
    )]
    TraversalBoundExceeded {
        /// Traversal root
        node: String,
        /// Iterations performed
        iterations: usize,
        /// Nodes discovered but not added
        pending: usize,
    },
}
