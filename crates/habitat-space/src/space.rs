//! The `Space` and `MetricSpace` traits shared by every topology.

use habitat_core::{AgentId, SpaceError, Topology};
use rand::Rng;
use std::fmt;

/// Boxed lazy iterator returned by neighbour queries.
pub type Neighbors<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// A space agents can be placed in, moved through and queried.
///
/// Each space owns both the position record of every agent it holds and
/// the spatial index that files agents by position. Only the mutating
/// methods of this trait touch either, and they update both or neither:
/// a failed call leaves the space unchanged.
///
/// Neighbour queries return lazy iterators borrowing the space. Callers
/// may stop early; re-issuing the query starts a fresh traversal.
///
/// # Thread Safety
///
/// `Send + Sync` lets a simulation share `&Space` across worker threads
/// for read-only neighbour queries between steps. Mutation needs
/// `&mut self`, so it is exclusive by construction.
pub trait Space: Send + Sync {
    /// Canonical position type of this topology.
    type Pos: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Neighbour query radius: a length for metric spaces, a hop count
    /// for graphs.
    type Radius: Copy + fmt::Debug;

    /// The structural kind of this space.
    fn topology(&self) -> Topology;

    /// Boundary-correct `pos` into the space.
    ///
    /// Periodic axes wrap, bounded axes clamp. Returns
    /// [`SpaceError::OutOfBounds`] only when no correction exists (for
    /// example a non-finite coordinate or a vertex the space lacks), and
    /// [`SpaceError::DimensionMismatch`] for the wrong number of axes.
    fn normalize(&self, pos: &Self::Pos) -> Result<Self::Pos, SpaceError>;

    /// Current position of `agent`, or `None` if it is not in the space.
    fn position(&self, agent: AgentId) -> Option<Self::Pos>;

    /// Number of agents placed in the space.
    fn agent_count(&self) -> usize;

    /// All agents with their positions, in placement order.
    fn agents(&self) -> Box<dyn Iterator<Item = (AgentId, Self::Pos)> + '_>;

    /// Place `agent` at the boundary-corrected `pos`, returning the
    /// position actually taken.
    fn add_agent(&mut self, agent: AgentId, pos: Self::Pos) -> Result<Self::Pos, SpaceError>;

    /// Take `agent` out of the space, returning its last position.
    fn remove_agent(&mut self, agent: AgentId) -> Result<Self::Pos, SpaceError>;

    /// Move `agent` to the boundary-corrected `target`.
    ///
    /// Moving an agent onto its current position leaves the index
    /// untouched.
    fn move_agent(&mut self, agent: AgentId, target: Self::Pos) -> Result<Self::Pos, SpaceError>;

    /// Agents filed under exactly `pos`, in arrival order.
    ///
    /// Positions that are not valid in this space have no occupants.
    fn occupants_at<'a>(&'a self, pos: &Self::Pos) -> Neighbors<'a, AgentId>;

    /// Returns `true` if nobody stands at `pos`.
    fn is_empty_at(&self, pos: &Self::Pos) -> bool {
        self.occupants_at(pos).next().is_none()
    }

    /// Positions within `radius` of `pos`, excluding `pos` itself.
    ///
    /// Each position is yielded at most once, in a backend-defined
    /// deterministic order.
    fn neighbor_positions<'a>(
        &'a self,
        pos: &Self::Pos,
        radius: Self::Radius,
    ) -> Result<Neighbors<'a, Self::Pos>, SpaceError>;

    /// Agents within `radius` of `pos`, including any standing exactly
    /// at `pos`. Each agent is yielded at most once.
    fn neighbor_agents<'a>(
        &'a self,
        pos: &Self::Pos,
        radius: Self::Radius,
    ) -> Result<Neighbors<'a, AgentId>, SpaceError>;

    /// Agents within `radius` of `agent`, excluding `agent` itself.
    fn neighbor_agents_of<'a>(
        &'a self,
        agent: AgentId,
        radius: Self::Radius,
    ) -> Result<Neighbors<'a, AgentId>, SpaceError> {
        let pos = self
            .position(agent)
            .ok_or(SpaceError::UnknownAgent { agent })?;
        let inner = self.neighbor_agents(&pos, radius)?;
        Ok(Box::new(inner.filter(move |&a| a != agent)))
    }
}

/// A space with a metric: distances, direction vectors and walks.
///
/// Implemented by grid and continuous spaces. Graph topologies have no
/// embedding and do not implement it.
pub trait MetricSpace: Space {
    /// Displacement vector between two positions.
    type Vector: Clone + PartialEq + fmt::Debug;

    /// Euclidean distance, using the minimum image on periodic axes.
    ///
    /// Symmetric, non-negative and zero exactly on the diagonal of valid
    /// positions.
    fn distance(&self, a: &Self::Pos, b: &Self::Pos) -> Result<f64, SpaceError>;

    /// Shortest vector that, added to `from`, reaches `to`.
    fn direction(&self, from: &Self::Pos, to: &Self::Pos) -> Result<Self::Vector, SpaceError>;

    /// Move `agent` by `delta`, boundary-correcting the result.
    fn walk(
        &mut self,
        agent: AgentId,
        delta: &Self::Vector,
        options: WalkOptions,
    ) -> Result<Moved<Self::Pos>, SpaceError>;

    /// Walk `agent` by a uniformly random unit-range step on every axis.
    fn random_walk<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        rng: &mut R,
        options: WalkOptions,
    ) -> Result<Moved<Self::Pos>, SpaceError>;
}

/// Options for [`MetricSpace::walk`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Only step onto an unoccupied target. Honoured by grid spaces; an
    /// occupied target leaves the agent in place.
    pub if_empty: bool,
}

impl WalkOptions {
    /// Options that refuse to step onto occupied cells.
    pub fn if_empty() -> Self {
        Self { if_empty: true }
    }
}

/// Outcome of a walk.
#[derive(Clone, Debug, PartialEq)]
pub enum Moved<P> {
    /// The agent now stands at this position.
    To(P),
    /// The target was refused; the agent remains at this position.
    Stayed(P),
}

impl<P> Moved<P> {
    /// Position of the agent after the walk.
    pub fn position(&self) -> &P {
        match self {
            Self::To(p) | Self::Stayed(p) => p,
        }
    }

    /// Consume the outcome, keeping the final position.
    pub fn into_position(self) -> P {
        match self {
            Self::To(p) | Self::Stayed(p) => p,
        }
    }

    /// Returns `true` if the agent was refused and stayed put.
    pub fn stayed(&self) -> bool {
        matches!(self, Self::Stayed(_))
    }

    /// Convert the carried position, keeping the outcome.
    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Moved<Q> {
        match self {
            Self::To(p) => Moved::To(f(p)),
            Self::Stayed(p) => Moved::Stayed(f(p)),
        }
    }
}

/// Validate a metric neighbour radius.
pub(crate) fn check_radius(radius: f64) -> Result<f64, SpaceError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(SpaceError::InvalidRadius { radius })
    }
}

/// Validate a hop radius.
pub(crate) fn check_hops(hops: u32) -> Result<u32, SpaceError> {
    if hops == 0 {
        Err(SpaceError::InvalidRadius { radius: 0.0 })
    } else {
        Ok(hops)
    }
}

/// Reject positions or vectors whose axis count differs from the space.
pub(crate) fn check_ndim(expected: usize, got: usize) -> Result<(), SpaceError> {
    if expected == got {
        Ok(())
    } else {
        Err(SpaceError::DimensionMismatch { expected, got })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_must_be_positive_and_finite() {
        assert_eq!(check_radius(1.5), Ok(1.5));
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_radius(bad),
                Err(SpaceError::InvalidRadius { .. })
            ));
        }
        assert!(check_hops(0).is_err());
        assert_eq!(check_hops(3), Ok(3));
    }

    #[test]
    fn moved_reports_final_position() {
        let m = Moved::Stayed(4);
        assert!(m.stayed());
        assert_eq!(*m.position(), 4);
        assert_eq!(Moved::To(7).into_position(), 7);
    }

    #[test]
    fn walk_options_default_allows_crowding() {
        assert!(!WalkOptions::default().if_empty);
        assert!(WalkOptions::if_empty().if_empty);
    }
}
