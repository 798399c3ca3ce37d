//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an agent within a simulation.
///
/// Agent ids are allocated by the model container that owns the agents;
/// spaces only store and compare them. An id must be unique within one
/// space for as long as the agent is placed in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a vertex of a graph or road-network space.
///
/// Vertex ids are dense and 0-based: a space over a graph with `n`
/// vertices accepts exactly `VertexId(0)..VertexId(n)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

impl VertexId {
    /// The id as a `usize`, for indexing per-vertex storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for VertexId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(AgentId(7).to_string(), "7");
        assert_eq!(VertexId(3).to_string(), "v3");
    }

    #[test]
    fn vertex_index_is_dense() {
        assert_eq!(VertexId::from(12).index(), 12);
    }
}
