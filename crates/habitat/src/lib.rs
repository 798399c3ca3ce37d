//! Habitat: the spatial interaction layer for agent-based simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Habitat sub-crates. For most users, adding `habitat` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use habitat::prelude::*;
//! use habitat::interaction::{move_agent, neighbor_agents_of};
//! use smallvec::smallvec;
//!
//! // A 10x10 grid that wraps on both axes.
//! let mut space = GridSpace::periodic(&[10, 10]).unwrap();
//! space.add_agent(AgentId(1), smallvec![0, 0]).unwrap();
//! space.add_agent(AgentId(2), smallvec![9, 9]).unwrap();
//!
//! // (9, 9) is one diagonal step from (0, 0) across the seam.
//! let near: Vec<AgentId> = neighbor_agents_of(&space, AgentId(1), 1.0).unwrap().collect();
//! assert_eq!(near, vec![AgentId(2)]);
//!
//! // Targets past the edge wrap around.
//! let at = move_agent(&mut space, AgentId(2), smallvec![12, 3]).unwrap();
//! assert_eq!(at.as_slice(), &[2, 3]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `habitat-core` | IDs, position types, `SpaceError` |
//! | [`space`] | `habitat-space` | Space traits, topologies, configuration |
//! | [`interaction`] | this crate | Free-function API over any space |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core identifiers, positions and errors (`habitat-core`).
pub use habitat_core as types;

/// Space topologies and the traits they implement (`habitat-space`).
///
/// Provides the [`space::Space`] and [`space::MetricSpace`] traits and
/// the concrete backends [`space::GridSpace`], [`space::ContinuousSpace`],
/// [`space::GraphSpace`] and [`space::NetworkSpace`].
pub use habitat_space as space;

pub mod interaction;

/// Common imports for typical Habitat usage.
///
/// ```rust
/// use habitat::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use habitat_core::{
        AgentId, Coord, Point, Position, RoadPosition, SpaceError, Topology, VertexId,
    };

    // Traits
    pub use habitat_space::{MetricSpace, Space};

    // Topologies
    pub use habitat_space::{
        AnySpace, Boundary, ContinuousSpace, GraphSpace, GridMetric, GridSpace, NeighborMode,
        NetworkSpace, Road,
    };

    // Queries and movement
    pub use habitat_space::{Displacement, Moved, Radius, SpaceConfig, WalkOptions};
}
