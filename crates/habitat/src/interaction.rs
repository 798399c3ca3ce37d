//! Free-function interaction API.
//!
//! Each function forwards to the matching [`Space`] or [`MetricSpace`]
//! method, so model code can be written once against any topology:
//!
//! ```rust
//! use habitat::interaction::{add_agent_to_space, neighbor_positions};
//! use habitat::prelude::*;
//!
//! let mut graph = GraphSpace::from_edges(3, &[(0, 1), (1, 2)], false).unwrap();
//! add_agent_to_space(&mut graph, AgentId(7), VertexId(1)).unwrap();
//! assert_eq!(neighbor_positions(&graph, &VertexId(1), 1).unwrap().count(), 2);
//! ```

use habitat_core::{AgentId, SpaceError};
use habitat_space::{MetricSpace, Moved, Neighbors, Space, WalkOptions};
use rand::Rng;

/// Euclidean distance between two positions, minimum-imaged on periodic
/// axes.
pub fn distance<S: MetricSpace>(space: &S, a: &S::Pos, b: &S::Pos) -> Result<f64, SpaceError> {
    space.distance(a, b)
}

/// Shortest displacement from `from` to `to`.
pub fn direction<S: MetricSpace>(
    space: &S,
    from: &S::Pos,
    to: &S::Pos,
) -> Result<S::Vector, SpaceError> {
    space.direction(from, to)
}

/// Positions within `radius` of `pos`, excluding `pos`.
pub fn neighbor_positions<'a, S: Space>(
    space: &'a S,
    pos: &S::Pos,
    radius: S::Radius,
) -> Result<Neighbors<'a, S::Pos>, SpaceError> {
    space.neighbor_positions(pos, radius)
}

/// Agents within `radius` of `pos`, including any standing on it.
pub fn neighbor_agents<'a, S: Space>(
    space: &'a S,
    pos: &S::Pos,
    radius: S::Radius,
) -> Result<Neighbors<'a, AgentId>, SpaceError> {
    space.neighbor_agents(pos, radius)
}

/// Agents within `radius` of `agent`, excluding `agent`.
pub fn neighbor_agents_of<S: Space>(
    space: &S,
    agent: AgentId,
    radius: S::Radius,
) -> Result<Neighbors<'_, AgentId>, SpaceError> {
    space.neighbor_agents_of(agent, radius)
}

/// Move `agent` to the boundary-corrected `target`.
pub fn move_agent<S: Space>(
    space: &mut S,
    agent: AgentId,
    target: S::Pos,
) -> Result<S::Pos, SpaceError> {
    space.move_agent(agent, target)
}

/// Move `agent` by `delta`.
pub fn walk<S: MetricSpace>(
    space: &mut S,
    agent: AgentId,
    delta: &S::Vector,
    options: WalkOptions,
) -> Result<Moved<S::Pos>, SpaceError> {
    space.walk(agent, delta, options)
}

/// Move `agent` by a random unit-range step.
pub fn random_walk<S: MetricSpace, R: Rng + ?Sized>(
    space: &mut S,
    agent: AgentId,
    rng: &mut R,
    options: WalkOptions,
) -> Result<Moved<S::Pos>, SpaceError> {
    space.random_walk(agent, rng, options)
}

/// Place `agent` at the boundary-corrected `pos`.
pub fn add_agent_to_space<S: Space>(
    space: &mut S,
    agent: AgentId,
    pos: S::Pos,
) -> Result<S::Pos, SpaceError> {
    space.add_agent(agent, pos)
}

/// Take `agent` out of `space`, returning its last position.
pub fn remove_agent_from_space<S: Space>(
    space: &mut S,
    agent: AgentId,
) -> Result<S::Pos, SpaceError> {
    space.remove_agent(agent)
}
