//! Road-network spaces: agents stand on intersections or part-way along
//! directed roads.

use crate::hops::{Adjacency, HopExpansion};
use crate::occupancy::{Occupancy, SpatialIndex};
use crate::space::{check_hops, Moved, Neighbors, Space};
use habitat_core::{AgentId, Position, RoadPosition, SpaceError, Topology, VertexId};
use indexmap::IndexMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rand::Rng;
use smallvec::SmallVec;

/// A directed road between two intersections.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Road {
    /// Start intersection.
    pub from: VertexId,
    /// End intersection.
    pub to: VertexId,
    /// Length in the same units as road offsets.
    pub length: f64,
}

impl Road {
    /// A road `from -> to` of the given length.
    pub fn new(from: impl Into<VertexId>, to: impl Into<VertexId>, length: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            length,
        }
    }
}

// ── Index ───────────────────────────────────────────────────────

/// Where an agent is filed: on an intersection, or somewhere along a road.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum RoadKey {
    Vertex(VertexId),
    Edge(VertexId, VertexId),
}

impl RoadKey {
    fn of(pos: &RoadPosition) -> Self {
        match *pos {
            RoadPosition::Vertex(v) => Self::Vertex(v),
            RoadPosition::Edge { from, to, .. } => Self::Edge(from, to),
        }
    }
}

/// Occupant lists keyed by intersection or road. Only occupied keys are
/// stored; mid-road offsets live in the position record.
#[derive(Clone, Debug, Default)]
pub(crate) struct RoadIndex {
    slots: IndexMap<RoadKey, SmallVec<[AgentId; 4]>>,
}

impl RoadIndex {
    fn occupants(&self, key: &RoadKey) -> &[AgentId] {
        self.slots.get(key).map(|s| s.as_slice()).unwrap_or(&[])
    }
}

impl SpatialIndex for RoadIndex {
    type Pos = RoadPosition;

    fn insert(&mut self, agent: AgentId, pos: &RoadPosition) {
        self.slots.entry(RoadKey::of(pos)).or_default().push(agent);
    }

    fn remove(&mut self, agent: AgentId, pos: &RoadPosition) {
        let key = RoadKey::of(pos);
        let Some(slot) = self.slots.get_mut(&key) else {
            return;
        };
        if let Some(i) = slot.iter().position(|&a| a == agent) {
            slot.remove(i);
        }
        if slot.is_empty() {
            self.slots.swap_remove(&key);
        }
    }
}

// ── Space ───────────────────────────────────────────────────────

/// A network of directed roads with lengths, joining numbered
/// intersections.
///
/// Agents stand on an intersection ([`RoadPosition::Vertex`]) or part-way
/// along a road ([`RoadPosition::Edge`]). Hop neighbourhoods ignore road
/// direction and start from the intersection nearest the query point.
#[derive(Clone, Debug)]
pub struct NetworkSpace {
    graph: DiGraph<(), f64>,
    occupancy: Occupancy<RoadIndex>,
}

impl NetworkSpace {
    /// Build a network of one-way `roads` over `vertex_count`
    /// intersections.
    ///
    /// A second road with the same endpoints as an earlier one is skipped
    /// with a warning.
    pub fn new(vertex_count: usize, roads: &[Road]) -> Result<Self, SpaceError> {
        if vertex_count == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if vertex_count >= u32::MAX as usize {
            return Err(SpaceError::InvalidExtent {
                axis: 0,
                reason: format!("{vertex_count} vertices exceed the u32 id range"),
            });
        }
        let mut graph = DiGraph::with_capacity(vertex_count, roads.len());
        for _ in 0..vertex_count {
            graph.add_node(());
        }
        for road in roads {
            for v in [road.from, road.to] {
                if v.index() >= vertex_count {
                    return Err(SpaceError::UnknownVertex {
                        vertex: v,
                        vertex_count,
                    });
                }
            }
            if !(road.length.is_finite() && road.length > 0.0) {
                return Err(SpaceError::InvalidRoadLength {
                    from: road.from,
                    to: road.to,
                    length: road.length,
                });
            }
            let (a, b) = (node(road.from), node(road.to));
            if graph.find_edge(a, b).is_some() {
                tracing::warn!(from = %road.from, to = %road.to, "duplicate road skipped");
                continue;
            }
            graph.add_edge(a, b, road.length);
        }
        tracing::debug!(
            vertices = vertex_count,
            roads = graph.edge_count(),
            "network space created"
        );
        Ok(Self {
            graph,
            occupancy: Occupancy::new(RoadIndex::default()),
        })
    }

    /// Build a network where every road can be travelled both ways.
    pub fn two_way(vertex_count: usize, roads: &[Road]) -> Result<Self, SpaceError> {
        let both: Vec<Road> = roads
            .iter()
            .flat_map(|r| [*r, Road::new(r.to, r.from, r.length)])
            .collect();
        Self::new(vertex_count, &both)
    }

    /// Number of intersections.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of one-way roads.
    pub fn road_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Length of the road `from -> to`.
    pub fn edge_length(&self, from: VertexId, to: VertexId) -> Result<f64, SpaceError> {
        self.road(from, to)
            .map(|e| self.graph[e])
            .ok_or(SpaceError::UnknownEdge { from, to })
    }

    /// The intersection closest to `pos` along its road.
    ///
    /// Mid-road positions resolve to the nearer end; the exact midpoint
    /// resolves to the start.
    pub fn nearest_vertex(&self, pos: &RoadPosition) -> Result<VertexId, SpaceError> {
        match self.normalize(pos)? {
            RoadPosition::Vertex(v) => Ok(v),
            RoadPosition::Edge { from, to, offset } => {
                let length = self.edge_length(from, to)?;
                Ok(if offset <= length / 2.0 { from } else { to })
            }
        }
    }

    /// Travel `distance` further along the agent's current road.
    ///
    /// Reaching either end of the road stops the agent on that
    /// intersection; negative distances travel backwards. An agent
    /// standing on an intersection has no road to follow and stays put.
    pub fn advance(
        &mut self,
        agent: AgentId,
        distance: f64,
    ) -> Result<Moved<RoadPosition>, SpaceError> {
        let current = *self
            .occupancy
            .position(agent)
            .ok_or(SpaceError::UnknownAgent { agent })?;
        let RoadPosition::Edge { from, to, offset } = current else {
            return Ok(Moved::Stayed(current));
        };
        let target = self.normalize(&RoadPosition::on_road(from, to, offset + distance))?;
        self.occupancy.relocate(agent, target)?;
        Ok(Moved::To(target))
    }

    /// A random position: a uniformly chosen road, then a uniform offset
    /// along it. Networks with no roads yield a random intersection.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> RoadPosition {
        if self.graph.edge_count() == 0 {
            return RoadPosition::Vertex(VertexId(rng.gen_range(0..self.vertex_count() as u32)));
        }
        let e = EdgeIndex::new(rng.gen_range(0..self.graph.edge_count()));
        let length = self.graph[e];
        let offset = rng.gen_range(0.0..length);
        match self.graph.edge_endpoints(e) {
            Some((a, b)) if offset > 0.0 => RoadPosition::on_road(vertex(a), vertex(b), offset),
            Some((a, _)) => RoadPosition::Vertex(vertex(a)),
            None => RoadPosition::Vertex(VertexId(0)),
        }
    }

    fn road(&self, from: VertexId, to: VertexId) -> Option<EdgeIndex> {
        if from.index() >= self.vertex_count() || to.index() >= self.vertex_count() {
            return None;
        }
        self.graph.find_edge(node(from), node(to))
    }

    fn out_of_bounds(pos: &RoadPosition, reason: String) -> SpaceError {
        SpaceError::OutOfBounds {
            position: Position::Road(*pos),
            reason,
        }
    }

    /// Intersections within `hops` of `start`, `start` first.
    fn reachable(&self, start: VertexId, hops: u32) -> Vec<VertexId> {
        std::iter::once(start)
            .chain(HopExpansion::new(self, start, hops))
            .collect()
    }
}

fn node(v: VertexId) -> NodeIndex {
    NodeIndex::new(v.index())
}

fn vertex(n: NodeIndex) -> VertexId {
    VertexId(n.index() as u32)
}

impl Adjacency for NetworkSpace {
    fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    fn for_each_adjacent(&self, v: VertexId, mut visit: impl FnMut(VertexId)) {
        for n in self.graph.neighbors_undirected(node(v)) {
            visit(vertex(n));
        }
    }
}

impl Space for NetworkSpace {
    type Pos = RoadPosition;
    type Radius = u32;

    fn topology(&self) -> Topology {
        Topology::Network
    }

    /// Resolve road ends: offsets at or before the start become the start
    /// intersection, offsets at or past the length become the end one.
    fn normalize(&self, pos: &RoadPosition) -> Result<RoadPosition, SpaceError> {
        match *pos {
            RoadPosition::Vertex(v) if v.index() < self.vertex_count() => Ok(*pos),
            RoadPosition::Vertex(_) => Err(Self::out_of_bounds(
                pos,
                format!("network has {} intersections", self.vertex_count()),
            )),
            RoadPosition::Edge { from, to, offset } => {
                let Some(e) = self.road(from, to) else {
                    return Err(Self::out_of_bounds(pos, format!("no road from {from} to {to}")));
                };
                if !offset.is_finite() {
                    return Err(Self::out_of_bounds(pos, "offset is not finite".into()));
                }
                let length = self.graph[e];
                Ok(if offset <= 0.0 {
                    RoadPosition::Vertex(from)
                } else if offset >= length {
                    RoadPosition::Vertex(to)
                } else {
                    *pos
                })
            }
        }
    }

    fn position(&self, agent: AgentId) -> Option<RoadPosition> {
        self.occupancy.position(agent).copied()
    }

    fn agent_count(&self) -> usize {
        self.occupancy.len()
    }

    fn agents(&self) -> Box<dyn Iterator<Item = (AgentId, RoadPosition)> + '_> {
        Box::new(self.occupancy.iter().map(|(&a, &p)| (a, p)))
    }

    fn add_agent(&mut self, agent: AgentId, pos: RoadPosition) -> Result<RoadPosition, SpaceError> {
        let pos = self.normalize(&pos)?;
        self.occupancy.add(agent, pos)?;
        Ok(pos)
    }

    fn remove_agent(&mut self, agent: AgentId) -> Result<RoadPosition, SpaceError> {
        self.occupancy.remove(agent)
    }

    fn move_agent(
        &mut self,
        agent: AgentId,
        target: RoadPosition,
    ) -> Result<RoadPosition, SpaceError> {
        let target = self.normalize(&target)?;
        self.occupancy.relocate(agent, target)?;
        Ok(target)
    }

    fn occupants_at<'a>(&'a self, pos: &RoadPosition) -> Neighbors<'a, AgentId> {
        let Ok(pos) = self.normalize(pos) else {
            return Box::new(std::iter::empty());
        };
        Box::new(
            self.occupancy
                .index()
                .occupants(&RoadKey::of(&pos))
                .iter()
                .copied()
                .filter(move |&a| self.occupancy.position(a) == Some(&pos)),
        )
    }

    /// Intersections within `radius` hops of the intersection nearest
    /// `pos`. A mid-road query point includes that nearest intersection.
    fn neighbor_positions<'a>(
        &'a self,
        pos: &RoadPosition,
        radius: u32,
    ) -> Result<Neighbors<'a, RoadPosition>, SpaceError> {
        let radius = check_hops(radius)?;
        let origin = self.normalize(pos)?;
        let start = self.nearest_vertex(&origin)?;
        let around = HopExpansion::new(self, start, radius);
        let vertices: Neighbors<'a, VertexId> = match origin {
            RoadPosition::Vertex(_) => Box::new(around),
            RoadPosition::Edge { .. } => Box::new(std::iter::once(start).chain(around)),
        };
        Ok(Box::new(vertices.map(RoadPosition::Vertex)))
    }

    /// Agents on intersections within `radius` hops of the intersection
    /// nearest `pos`, plus agents part-way along any road whose two ends
    /// are both within reach.
    fn neighbor_agents<'a>(
        &'a self,
        pos: &RoadPosition,
        radius: u32,
    ) -> Result<Neighbors<'a, AgentId>, SpaceError> {
        let radius = check_hops(radius)?;
        let start = self.nearest_vertex(pos)?;
        let reachable = self.reachable(start, radius);
        let mut within = vec![false; self.vertex_count()];
        for v in &reachable {
            within[v.index()] = true;
        }
        let mut keys: Vec<RoadKey> = Vec::with_capacity(reachable.len());
        for &v in &reachable {
            keys.push(RoadKey::Vertex(v));
            for e in self.graph.edges_directed(node(v), Direction::Outgoing) {
                let w = vertex(e.target());
                if within[w.index()] {
                    keys.push(RoadKey::Edge(v, w));
                }
            }
        }
        let index = self.occupancy.index();
        Ok(Box::new(
            keys.into_iter()
                .flat_map(move |k| index.occupants(&k).iter().copied()),
        ))
    }
}
