//! Error types for space construction, queries and movement.
//!
//! Every error is deterministic given its inputs: retrying the same call
//! on the same space fails the same way. Operations that fail leave the
//! space unchanged.

use crate::id::{AgentId, VertexId};
use crate::position::{Position, Topology};
use thiserror::Error;

/// Errors arising from space construction, spatial queries or movement.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SpaceError {
    /// A target position cannot be corrected into the space: a non-finite
    /// coordinate, an integer overflow, or a vertex/road the space lacks.
    #[error("position {position:?} is out of bounds: {reason}")]
    OutOfBounds {
        /// The offending position.
        position: Position,
        /// Why boundary correction was impossible.
        reason: String,
    },
    /// A position or vector has a different number of axes than the space.
    #[error("dimension mismatch: space has {expected} axes, got {got}")]
    DimensionMismatch {
        /// Dimensionality of the space.
        expected: usize,
        /// Dimensionality supplied by the caller.
        got: usize,
    },
    /// A neighbour query radius is zero, negative or not finite.
    #[error("radius {radius} must be positive and finite")]
    InvalidRadius {
        /// The rejected radius (hop counts are reported as floats).
        radius: f64,
    },
    /// The operation is not defined for this topology.
    #[error("{operation} is not supported on a {topology} space")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Topology of the space it was invoked on.
        topology: Topology,
    },
    /// Attempted to construct a space with no cells or vertices.
    #[error("space must have at least one cell")]
    EmptySpace,
    /// An axis extent is unusable (zero, non-finite, or too large).
    #[error("invalid extent on axis {axis}: {reason}")]
    InvalidExtent {
        /// Index of the offending axis.
        axis: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// A continuous cell-list cell size is zero, negative or not finite.
    #[error("cell size {value} must be positive and finite")]
    InvalidCellSize {
        /// The rejected cell size.
        value: f64,
    },
    /// The agent is not placed in this space.
    #[error("agent {agent} is not in this space")]
    UnknownAgent {
        /// The missing agent.
        agent: AgentId,
    },
    /// The agent is already placed in this space.
    #[error("agent {agent} is already in this space")]
    DuplicateAgent {
        /// The duplicated agent.
        agent: AgentId,
    },
    /// A vertex id is outside `0..vertex_count`.
    #[error("vertex {vertex} does not exist (space has {vertex_count} vertices)")]
    UnknownVertex {
        /// The offending vertex.
        vertex: VertexId,
        /// Number of vertices in the space.
        vertex_count: usize,
    },
    /// No road connects `from` to `to`.
    #[error("no road from {from} to {to}")]
    UnknownEdge {
        /// Start vertex.
        from: VertexId,
        /// End vertex.
        to: VertexId,
    },
    /// A road has a zero, negative or non-finite length.
    #[error("road {from} -> {to} has invalid length {length}")]
    InvalidRoadLength {
        /// Start vertex.
        from: VertexId,
        /// End vertex.
        to: VertexId,
        /// The rejected length.
        length: f64,
    },
    /// Every grid cell is occupied.
    #[error("no empty position left in the space")]
    NoEmptyPosition,
    /// A space configuration failed to parse or validate.
    #[error("invalid space configuration: {reason}")]
    Config {
        /// Description of the problem.
        reason: String,
    },
}
