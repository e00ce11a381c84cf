//! Error types for spline chain operations.

use thiserror::Error;

use crate::spline::NodeId;

/// Errors that can occur while restructuring a spline chain.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SplineError {
    /// The node handle does not belong to this chain.
    #[error("unknown spline node {0:?}")]
    UnknownNode(NodeId),

    /// A node cannot be linked to itself.
    #[error("spline node {0:?} cannot be linked to itself")]
    SelfLink(NodeId),

    /// Linking the nodes would close a cycle.
    #[error("linking {from:?} -> {to:?} would create a cycle")]
    CycleDetected {
        /// Node whose `next` was being assigned.
        from: NodeId,
        /// Requested successor.
        to: NodeId,
    },
}

/// Result type for spline chain operations.
pub type SplineResult<T> = std::result::Result<T, SplineError>;
