//! Position types for every space topology.
//!
//! Each topology has its own canonical position representation:
//!
//! | Topology | Position |
//! |---|---|
//! | grid | [`Coord`]: one `i32` per axis |
//! | continuous | [`Point`]: one `f64` per axis |
//! | graph | [`VertexId`] |
//! | road network | [`RoadPosition`]: a vertex, or a point part-way along a road |
//!
//! [`Position`] is the closed sum over all four, used where the topology
//! is only known at runtime.

use crate::id::VertexId;
use smallvec::SmallVec;
use std::fmt;

/// A cell coordinate in a discrete grid.
///
/// Uses `SmallVec<[i32; 4]>` to avoid heap allocation for grids of up to
/// four dimensions. Higher-dimensional grids spill to the heap
/// transparently.
pub type Coord = SmallVec<[i32; 4]>;

/// A point in a continuous space, one `f64` per axis.
pub type Point = SmallVec<[f64; 4]>;

/// The structural kind of a space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Discrete N-dimensional grid of cells.
    Grid,
    /// Continuous N-dimensional box.
    Continuous,
    /// Arbitrary graph; agents live on vertices.
    Graph,
    /// Road network; agents live on vertices or part-way along roads.
    Network,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grid => "grid",
            Self::Continuous => "continuous",
            Self::Graph => "graph",
            Self::Network => "network",
        };
        f.write_str(name)
    }
}

/// A location in a road network.
///
/// Roads are directed edges `from -> to` with a positive length. An agent
/// travelling along a road sits `offset` length units past `from`.
/// Positions at either end of a road are represented as
/// [`RoadPosition::Vertex`]; spaces normalize `Edge` positions with
/// `offset <= 0` or `offset >= length` into the corresponding vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoadPosition {
    /// Standing on an intersection.
    Vertex(VertexId),
    /// Part-way along the road `from -> to`.
    Edge {
        /// Start vertex of the road.
        from: VertexId,
        /// End vertex of the road.
        to: VertexId,
        /// Distance travelled from `from`, in road length units.
        offset: f64,
    },
}

impl RoadPosition {
    /// A position on the vertex `v`.
    pub fn at(v: impl Into<VertexId>) -> Self {
        Self::Vertex(v.into())
    }

    /// A position `offset` units along the road `from -> to`.
    pub fn on_road(from: impl Into<VertexId>, to: impl Into<VertexId>, offset: f64) -> Self {
        Self::Edge {
            from: from.into(),
            to: to.into(),
            offset,
        }
    }

    /// The vertex this position stands on, if it is not mid-road.
    pub fn vertex(&self) -> Option<VertexId> {
        match self {
            Self::Vertex(v) => Some(*v),
            Self::Edge { .. } => None,
        }
    }
}

/// A position in a space of any topology.
#[derive(Clone, Debug, PartialEq)]
pub enum Position {
    /// Grid cell.
    Grid(Coord),
    /// Continuous point.
    Continuous(Point),
    /// Graph vertex.
    Vertex(VertexId),
    /// Road-network location.
    Road(RoadPosition),
}

impl Position {
    /// The topology this position belongs to.
    pub fn topology(&self) -> Topology {
        match self {
            Self::Grid(_) => Topology::Grid,
            Self::Continuous(_) => Topology::Continuous,
            Self::Vertex(_) => Topology::Graph,
            Self::Road(_) => Topology::Network,
        }
    }
}

impl From<Coord> for Position {
    fn from(c: Coord) -> Self {
        Self::Grid(c)
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self::Continuous(p)
    }
}

impl From<VertexId> for Position {
    fn from(v: VertexId) -> Self {
        Self::Vertex(v)
    }
}

impl From<RoadPosition> for Position {
    fn from(r: RoadPosition) -> Self {
        Self::Road(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn position_reports_its_topology() {
        let c: Coord = smallvec![1, 2];
        let p: Point = smallvec![0.5];
        assert_eq!(Position::from(c).topology(), Topology::Grid);
        assert_eq!(Position::from(p).topology(), Topology::Continuous);
        assert_eq!(Position::from(VertexId(0)).topology(), Topology::Graph);
        assert_eq!(
            Position::from(RoadPosition::at(0u32)).topology(),
            Topology::Network
        );
    }

    #[test]
    fn road_position_vertex_accessor() {
        assert_eq!(RoadPosition::at(4u32).vertex(), Some(VertexId(4)));
        assert_eq!(RoadPosition::on_road(0u32, 1u32, 0.5).vertex(), None);
    }

    #[test]
    fn topology_display() {
        assert_eq!(Topology::Network.to_string(), "network");
    }
}
