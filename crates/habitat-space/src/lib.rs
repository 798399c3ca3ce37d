//! Spaces for Habitat agent-based simulations.
//!
//! This crate defines the [`Space`] trait, the spatial interaction layer
//! through which a simulation places agents, moves them and asks who is
//! nearby, along with four concrete topologies and the boundary and metric
//! machinery they share.
//!
//! # Backends
//!
//! - [`GridSpace`]: N-dimensional integer grid with a dense per-cell index
//! - [`ContinuousSpace`]: N-dimensional real box with a cell-list index
//! - [`GraphSpace`]: agents on the vertices of an arbitrary graph
//! - [`NetworkSpace`]: agents on intersections or part-way along roads
//!
//! Grid and continuous spaces implement [`MetricSpace`]; each of their
//! axes is independently [`Boundary::Periodic`] or [`Boundary::Bounded`].
//! [`AnySpace`] wraps any backend for topologies chosen at runtime, for
//! example from a [`SpaceConfig`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod any;
pub mod boundary;
pub mod config;
pub mod continuous;
pub mod graph;
pub mod grid;
pub mod metric;
pub mod network;
pub mod product;
pub mod space;

pub(crate) mod hops;
pub(crate) mod occupancy;

#[cfg(test)]
pub(crate) mod compliance;

pub use any::{AnySpace, Displacement, Radius};
pub use boundary::Boundary;
pub use config::{Periodicity, RoadConfig, SpaceConfig};
pub use continuous::ContinuousSpace;
pub use graph::{GraphSpace, NeighborMode};
pub use grid::{GridMetric, GridSpace};
pub use habitat_core::{
    AgentId, Coord, Point, Position, RoadPosition, SpaceError, Topology, VertexId,
};
pub use metric::PeriodicImages;
pub use network::{NetworkSpace, Road};
pub use space::{MetricSpace, Moved, Neighbors, Space, WalkOptions};
