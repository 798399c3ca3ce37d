//! Graph spaces: agents live on the vertices of an arbitrary graph.

use crate::hops::{Adjacency, HopExpansion};
use crate::occupancy::{Occupancy, SpatialIndex};
use crate::space::{check_hops, Moved, Neighbors, Space};
use habitat_core::{AgentId, Position, SpaceError, Topology, VertexId};
use petgraph::graph::{DiGraph, Graph, IndexType, NodeIndex};
use petgraph::{Direction, EdgeType};
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Which edges of a directed graph count as adjacency.
///
/// Undirected graphs ignore the mode: every edge is followed both ways.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborMode {
    /// Follow edges from source to target.
    #[default]
    Outgoing,
    /// Follow edges from target back to source.
    Incoming,
    /// Follow edges either way.
    Both,
}

/// Per-vertex occupant lists.
#[derive(Clone, Debug)]
pub(crate) struct VertexIndex {
    slots: Vec<SmallVec<[AgentId; 4]>>,
}

impl VertexIndex {
    fn occupants(&self, v: VertexId) -> &[AgentId] {
        &self.slots[v.index()]
    }
}

impl SpatialIndex for VertexIndex {
    type Pos = VertexId;

    fn insert(&mut self, agent: AgentId, pos: &VertexId) {
        self.slots[pos.index()].push(agent);
    }

    fn remove(&mut self, agent: AgentId, pos: &VertexId) {
        let slot = &mut self.slots[pos.index()];
        if let Some(i) = slot.iter().position(|&a| a == agent) {
            slot.remove(i);
        }
    }
}

/// A space whose positions are the vertices of a graph.
///
/// Neighbourhoods are measured in hops: radius `r` reaches every vertex
/// at most `r` edges away. There is no metric distance.
#[derive(Clone, Debug)]
pub struct GraphSpace {
    graph: DiGraph<(), ()>,
    directed: bool,
    mode: NeighborMode,
    occupancy: Occupancy<VertexIndex>,
}

impl GraphSpace {
    /// Build a graph over vertices `0..vertex_count` with the given edges.
    ///
    /// # Errors
    ///
    /// `EmptySpace` for zero vertices, `InvalidExtent` for more vertices
    /// than `u32` can address, `UnknownVertex` for an edge endpoint
    /// outside the vertex range.
    pub fn from_edges(
        vertex_count: usize,
        edges: &[(u32, u32)],
        directed: bool,
    ) -> Result<Self, SpaceError> {
        if vertex_count == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if vertex_count >= u32::MAX as usize {
            return Err(SpaceError::InvalidExtent {
                axis: 0,
                reason: format!("{vertex_count} vertices exceed the u32 id range"),
            });
        }
        let mut graph = DiGraph::with_capacity(vertex_count, edges.len());
        for _ in 0..vertex_count {
            graph.add_node(());
        }
        for &(a, b) in edges {
            for v in [a, b] {
                if v as usize >= vertex_count {
                    return Err(SpaceError::UnknownVertex {
                        vertex: VertexId(v),
                        vertex_count,
                    });
                }
            }
            graph.add_edge(NodeIndex::new(a as usize), NodeIndex::new(b as usize), ());
        }
        tracing::debug!(
            vertices = vertex_count,
            edges = edges.len(),
            directed,
            "graph space created"
        );
        Ok(Self {
            graph,
            directed,
            mode: NeighborMode::default(),
            occupancy: Occupancy::new(VertexIndex {
                slots: vec![SmallVec::new(); vertex_count],
            }),
        })
    }

    /// Copy the structure of a petgraph `Graph`, dropping its weights.
    ///
    /// Vertex `i` of the space is node index `i` of `graph`.
    pub fn from_graph<N, E, Ty: EdgeType, Ix: IndexType>(
        graph: &Graph<N, E, Ty, Ix>,
    ) -> Result<Self, SpaceError> {
        let edges: Vec<(u32, u32)> = graph
            .raw_edges()
            .iter()
            .map(|e| (e.source().index() as u32, e.target().index() as u32))
            .collect();
        Self::from_edges(graph.node_count(), &edges, Ty::is_directed())
    }

    /// Choose which edge directions count as adjacency on a directed graph.
    pub fn with_neighbor_mode(mut self, mode: NeighborMode) -> Self {
        self.mode = mode;
        self
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if edges are one-way.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Adjacency mode used on directed graphs.
    pub fn neighbor_mode(&self) -> NeighborMode {
        self.mode
    }

    /// A uniformly random vertex.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> VertexId {
        VertexId(rng.gen_range(0..self.vertex_count() as u32))
    }

    /// Move `agent` to a uniformly chosen adjacent vertex.
    ///
    /// An agent on a vertex with no neighbours stays where it is.
    pub fn random_walk<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        rng: &mut R,
    ) -> Result<Moved<VertexId>, SpaceError> {
        let current = *self
            .occupancy
            .position(agent)
            .ok_or(SpaceError::UnknownAgent { agent })?;
        let Some(next) = HopExpansion::new(&*self, current, 1).choose(rng) else {
            return Ok(Moved::Stayed(current));
        };
        self.occupancy.relocate(agent, next)?;
        Ok(Moved::To(next))
    }

    fn effective_mode(&self) -> NeighborMode {
        if self.directed {
            self.mode
        } else {
            NeighborMode::Both
        }
    }
}

impl Adjacency for GraphSpace {
    fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    fn for_each_adjacent(&self, v: VertexId, mut visit: impl FnMut(VertexId)) {
        let n = NodeIndex::new(v.index());
        let adjacent = match self.effective_mode() {
            NeighborMode::Outgoing => self.graph.neighbors_directed(n, Direction::Outgoing),
            NeighborMode::Incoming => self.graph.neighbors_directed(n, Direction::Incoming),
            NeighborMode::Both => self.graph.neighbors_undirected(n),
        };
        for m in adjacent {
            visit(VertexId(m.index() as u32));
        }
    }
}

impl Space for GraphSpace {
    type Pos = VertexId;
    type Radius = u32;

    fn topology(&self) -> Topology {
        Topology::Graph
    }

    fn normalize(&self, pos: &VertexId) -> Result<VertexId, SpaceError> {
        if pos.index() < self.vertex_count() {
            Ok(*pos)
        } else {
            Err(SpaceError::OutOfBounds {
                position: Position::Vertex(*pos),
                reason: format!("graph has {} vertices", self.vertex_count()),
            })
        }
    }

    fn position(&self, agent: AgentId) -> Option<VertexId> {
        self.occupancy.position(agent).copied()
    }

    fn agent_count(&self) -> usize {
        self.occupancy.len()
    }

    fn agents(&self) -> Box<dyn Iterator<Item = (AgentId, VertexId)> + '_> {
        Box::new(self.occupancy.iter().map(|(&a, &v)| (a, v)))
    }

    fn add_agent(&mut self, agent: AgentId, pos: VertexId) -> Result<VertexId, SpaceError> {
        let pos = self.normalize(&pos)?;
        self.occupancy.add(agent, pos)?;
        Ok(pos)
    }

    fn remove_agent(&mut self, agent: AgentId) -> Result<VertexId, SpaceError> {
        self.occupancy.remove(agent)
    }

    fn move_agent(&mut self, agent: AgentId, target: VertexId) -> Result<VertexId, SpaceError> {
        let target = self.normalize(&target)?;
        self.occupancy.relocate(agent, target)?;
        Ok(target)
    }

    fn occupants_at<'a>(&'a self, pos: &VertexId) -> Neighbors<'a, AgentId> {
        if pos.index() >= self.vertex_count() {
            return Box::new(std::iter::empty());
        }
        Box::new(self.occupancy.index().occupants(*pos).iter().copied())
    }

    fn neighbor_positions<'a>(
        &'a self,
        pos: &VertexId,
        radius: u32,
    ) -> Result<Neighbors<'a, VertexId>, SpaceError> {
        let radius = check_hops(radius)?;
        let origin = self.normalize(pos)?;
        Ok(Box::new(HopExpansion::new(self, origin, radius)))
    }

    fn neighbor_agents<'a>(
        &'a self,
        pos: &VertexId,
        radius: u32,
    ) -> Result<Neighbors<'a, AgentId>, SpaceError> {
        let radius = check_hops(radius)?;
        let origin = self.normalize(pos)?;
        let index = self.occupancy.index();
        Ok(Box::new(
            std::iter::once(origin)
                .chain(HopExpansion::new(self, origin, radius))
                .flat_map(move |v| index.occupants(v).iter().copied()),
        ))
    }
}
