//! Core types for the Habitat spatial interaction layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every space topology: agent and vertex
//! identifiers, the per-topology position types, and the
//! [`SpaceError`] returned by every fallible spatial operation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod position;

pub use error::SpaceError;
pub use id::{AgentId, VertexId};
pub use position::{Coord, Point, Position, RoadPosition, Topology};
