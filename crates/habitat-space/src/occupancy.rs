//! Agent position records and the per-topology spatial index.
//!
//! [`Occupancy`] owns both halves of the layer's one consistency
//! invariant: the position recorded for each agent, and the spatial
//! index that files the agent under that position. Its mutators are
//! crate-private and always update both, so no code outside this crate
//! can make them diverge.

use habitat_core::{AgentId, SpaceError};
use indexmap::IndexMap;
use std::fmt;

/// Per-topology storage mapping positions to resident agents.
///
/// Implementations file each agent under its position in some
/// topology-specific layout (dense cell array, cell list, per-vertex
/// slots, road map). Callers guarantee that `remove` is only called with
/// the position the agent was inserted under.
pub(crate) trait SpatialIndex {
    /// The position type this index is keyed by.
    type Pos: Clone + PartialEq + fmt::Debug;

    /// File `agent` under `pos`.
    fn insert(&mut self, agent: AgentId, pos: &Self::Pos);

    /// Remove `agent` from the slot for `pos`.
    fn remove(&mut self, agent: AgentId, pos: &Self::Pos);
}

/// Agent positions plus the spatial index that mirrors them.
#[derive(Clone, Debug)]
pub(crate) struct Occupancy<I: SpatialIndex> {
    index: I,
    positions: IndexMap<AgentId, I::Pos>,
}

impl<I: SpatialIndex> Occupancy<I> {
    /// Wrap an empty index.
    pub(crate) fn new(index: I) -> Self {
        Self {
            index,
            positions: IndexMap::new(),
        }
    }

    pub(crate) fn index(&self) -> &I {
        &self.index
    }

    pub(crate) fn position(&self, agent: AgentId) -> Option<&I::Pos> {
        self.positions.get(&agent)
    }

    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    /// Agents and their positions, in placement order.
    pub(crate) fn iter(&self) -> indexmap::map::Iter<'_, AgentId, I::Pos> {
        self.positions.iter()
    }

    /// Place a new agent at an already boundary-corrected position.
    pub(crate) fn add(&mut self, agent: AgentId, pos: I::Pos) -> Result<(), SpaceError> {
        if self.positions.contains_key(&agent) {
            return Err(SpaceError::DuplicateAgent { agent });
        }
        tracing::trace!(%agent, ?pos, "add agent");
        self.index.insert(agent, &pos);
        self.positions.insert(agent, pos);
        Ok(())
    }

    /// Take an agent out of the space, returning its last position.
    pub(crate) fn remove(&mut self, agent: AgentId) -> Result<I::Pos, SpaceError> {
        let pos = self
            .positions
            .shift_remove(&agent)
            .ok_or(SpaceError::UnknownAgent { agent })?;
        tracing::trace!(%agent, ?pos, "remove agent");
        self.index.remove(agent, &pos);
        Ok(pos)
    }

    /// Move an agent to an already boundary-corrected position.
    ///
    /// Moving to the current position is a no-op, so the agent keeps its
    /// place in the occupant order of its slot.
    pub(crate) fn relocate(&mut self, agent: AgentId, target: I::Pos) -> Result<(), SpaceError> {
        let slot = self
            .positions
            .get_mut(&agent)
            .ok_or(SpaceError::UnknownAgent { agent })?;
        if *slot == target {
            return Ok(());
        }
        tracing::trace!(%agent, from = ?slot, to = ?target, "move agent");
        self.index.remove(agent, slot);
        self.index.insert(agent, &target);
        *slot = target;
        Ok(())
    }
}
