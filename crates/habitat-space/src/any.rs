//! Topology-erased spaces chosen at runtime.

use crate::continuous::ContinuousSpace;
use crate::graph::GraphSpace;
use crate::grid::GridSpace;
use crate::network::NetworkSpace;
use crate::space::{MetricSpace, Moved, Neighbors, Space, WalkOptions};
use habitat_core::{AgentId, Coord, Point, Position, SpaceError, Topology};
use rand::Rng;

/// A neighbour query radius for any topology.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Radius {
    /// A length, for grid and continuous spaces.
    Distance(f64),
    /// A hop count, for graph and network spaces. Metric spaces treat it
    /// as a length.
    Hops(u32),
}

impl From<f64> for Radius {
    fn from(r: f64) -> Self {
        Self::Distance(r)
    }
}

impl From<u32> for Radius {
    fn from(h: u32) -> Self {
        Self::Hops(h)
    }
}

impl Radius {
    fn distance(self) -> f64 {
        match self {
            Self::Distance(r) => r,
            Self::Hops(h) => h as f64,
        }
    }
}

/// A displacement vector for any metric topology.
#[derive(Clone, Debug, PartialEq)]
pub enum Displacement {
    /// Whole-cell steps on a grid.
    Cells(Coord),
    /// A real vector in a continuous space.
    Real(Point),
}

/// One of the four space topologies, dispatched by `match`.
///
/// Positions, radii and vectors are checked against the wrapped
/// topology; a mismatch fails with [`SpaceError::UnsupportedOperation`].
/// Graph and network spaces have no metric, so the [`MetricSpace`]
/// operations fail the same way on them (except `random_walk`, which
/// graph spaces support).
#[derive(Clone, Debug)]
pub enum AnySpace {
    /// Discrete grid.
    Grid(GridSpace),
    /// Continuous box.
    Continuous(ContinuousSpace),
    /// Arbitrary graph.
    Graph(GraphSpace),
    /// Road network.
    Network(NetworkSpace),
}

impl From<GridSpace> for AnySpace {
    fn from(s: GridSpace) -> Self {
        Self::Grid(s)
    }
}

impl From<ContinuousSpace> for AnySpace {
    fn from(s: ContinuousSpace) -> Self {
        Self::Continuous(s)
    }
}

impl From<GraphSpace> for AnySpace {
    fn from(s: GraphSpace) -> Self {
        Self::Graph(s)
    }
}

impl From<NetworkSpace> for AnySpace {
    fn from(s: NetworkSpace) -> Self {
        Self::Network(s)
    }
}

impl AnySpace {
    fn unsupported(&self, operation: &'static str) -> SpaceError {
        SpaceError::UnsupportedOperation {
            operation,
            topology: self.topology(),
        }
    }

    fn hops(&self, operation: &'static str, radius: Radius) -> Result<u32, SpaceError> {
        match radius {
            Radius::Hops(h) => Ok(h),
            Radius::Distance(_) => Err(self.unsupported(operation)),
        }
    }
}

impl Space for AnySpace {
    type Pos = Position;
    type Radius = Radius;

    fn topology(&self) -> Topology {
        match self {
            Self::Grid(s) => s.topology(),
            Self::Continuous(s) => s.topology(),
            Self::Graph(s) => s.topology(),
            Self::Network(s) => s.topology(),
        }
    }

    fn normalize(&self, pos: &Position) -> Result<Position, SpaceError> {
        match (self, pos) {
            (Self::Grid(s), Position::Grid(c)) => s.normalize(c).map(Position::Grid),
            (Self::Continuous(s), Position::Continuous(p)) => {
                s.normalize(p).map(Position::Continuous)
            }
            (Self::Graph(s), Position::Vertex(v)) => s.normalize(v).map(Position::Vertex),
            (Self::Network(s), Position::Road(r)) => s.normalize(r).map(Position::Road),
            _ => Err(self.unsupported("normalize")),
        }
    }

    fn position(&self, agent: AgentId) -> Option<Position> {
        match self {
            Self::Grid(s) => s.position(agent).map(Position::Grid),
            Self::Continuous(s) => s.position(agent).map(Position::Continuous),
            Self::Graph(s) => s.position(agent).map(Position::Vertex),
            Self::Network(s) => s.position(agent).map(Position::Road),
        }
    }

    fn agent_count(&self) -> usize {
        match self {
            Self::Grid(s) => s.agent_count(),
            Self::Continuous(s) => s.agent_count(),
            Self::Graph(s) => s.agent_count(),
            Self::Network(s) => s.agent_count(),
        }
    }

    fn agents(&self) -> Box<dyn Iterator<Item = (AgentId, Position)> + '_> {
        match self {
            Self::Grid(s) => Box::new(s.agents().map(|(a, p)| (a, Position::Grid(p)))),
            Self::Continuous(s) => Box::new(s.agents().map(|(a, p)| (a, Position::Continuous(p)))),
            Self::Graph(s) => Box::new(s.agents().map(|(a, p)| (a, Position::Vertex(p)))),
            Self::Network(s) => Box::new(s.agents().map(|(a, p)| (a, Position::Road(p)))),
        }
    }

    fn add_agent(&mut self, agent: AgentId, pos: Position) -> Result<Position, SpaceError> {
        match (self, pos) {
            (Self::Grid(s), Position::Grid(c)) => s.add_agent(agent, c).map(Position::Grid),
            (Self::Continuous(s), Position::Continuous(p)) => {
                s.add_agent(agent, p).map(Position::Continuous)
            }
            (Self::Graph(s), Position::Vertex(v)) => s.add_agent(agent, v).map(Position::Vertex),
            (Self::Network(s), Position::Road(r)) => s.add_agent(agent, r).map(Position::Road),
            (space, _) => Err(space.unsupported("add_agent")),
        }
    }

    fn remove_agent(&mut self, agent: AgentId) -> Result<Position, SpaceError> {
        match self {
            Self::Grid(s) => s.remove_agent(agent).map(Position::Grid),
            Self::Continuous(s) => s.remove_agent(agent).map(Position::Continuous),
            Self::Graph(s) => s.remove_agent(agent).map(Position::Vertex),
            Self::Network(s) => s.remove_agent(agent).map(Position::Road),
        }
    }

    fn move_agent(&mut self, agent: AgentId, target: Position) -> Result<Position, SpaceError> {
        match (self, target) {
            (Self::Grid(s), Position::Grid(c)) => s.move_agent(agent, c).map(Position::Grid),
            (Self::Continuous(s), Position::Continuous(p)) => {
                s.move_agent(agent, p).map(Position::Continuous)
            }
            (Self::Graph(s), Position::Vertex(v)) => s.move_agent(agent, v).map(Position::Vertex),
            (Self::Network(s), Position::Road(r)) => s.move_agent(agent, r).map(Position::Road),
            (space, _) => Err(space.unsupported("move_agent")),
        }
    }

    fn occupants_at<'a>(&'a self, pos: &Position) -> Neighbors<'a, AgentId> {
        match (self, pos) {
            (Self::Grid(s), Position::Grid(c)) => s.occupants_at(c),
            (Self::Continuous(s), Position::Continuous(p)) => s.occupants_at(p),
            (Self::Graph(s), Position::Vertex(v)) => s.occupants_at(v),
            (Self::Network(s), Position::Road(r)) => s.occupants_at(r),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn neighbor_positions<'a>(
        &'a self,
        pos: &Position,
        radius: Radius,
    ) -> Result<Neighbors<'a, Position>, SpaceError> {
        const OP: &str = "neighbor_positions";
        let found: Neighbors<'a, Position> = match (self, pos) {
            (Self::Grid(s), Position::Grid(c)) => {
                Box::new(s.neighbor_positions(c, radius.distance())?.map(Position::Grid))
            }
            (Self::Continuous(s), Position::Continuous(p)) => Box::new(
                s.neighbor_positions(p, radius.distance())?
                    .map(Position::Continuous),
            ),
            (Self::Graph(s), Position::Vertex(v)) => Box::new(
                s.neighbor_positions(v, self.hops(OP, radius)?)?
                    .map(Position::Vertex),
            ),
            (Self::Network(s), Position::Road(r)) => Box::new(
                s.neighbor_positions(r, self.hops(OP, radius)?)?
                    .map(Position::Road),
            ),
            _ => return Err(self.unsupported(OP)),
        };
        Ok(found)
    }

    fn neighbor_agents<'a>(
        &'a self,
        pos: &Position,
        radius: Radius,
    ) -> Result<Neighbors<'a, AgentId>, SpaceError> {
        const OP: &str = "neighbor_agents";
        match (self, pos) {
            (Self::Grid(s), Position::Grid(c)) => s.neighbor_agents(c, radius.distance()),
            (Self::Continuous(s), Position::Continuous(p)) => {
                s.neighbor_agents(p, radius.distance())
            }
            (Self::Graph(s), Position::Vertex(v)) => s.neighbor_agents(v, self.hops(OP, radius)?),
            (Self::Network(s), Position::Road(r)) => s.neighbor_agents(r, self.hops(OP, radius)?),
            _ => Err(self.unsupported(OP)),
        }
    }
}

impl MetricSpace for AnySpace {
    type Vector = Displacement;

    fn distance(&self, a: &Position, b: &Position) -> Result<f64, SpaceError> {
        match (self, a, b) {
            (Self::Grid(s), Position::Grid(a), Position::Grid(b)) => s.distance(a, b),
            (Self::Continuous(s), Position::Continuous(a), Position::Continuous(b)) => {
                s.distance(a, b)
            }
            _ => Err(self.unsupported("distance")),
        }
    }

    fn direction(&self, from: &Position, to: &Position) -> Result<Displacement, SpaceError> {
        match (self, from, to) {
            (Self::Grid(s), Position::Grid(a), Position::Grid(b)) => {
                s.direction(a, b).map(Displacement::Cells)
            }
            (Self::Continuous(s), Position::Continuous(a), Position::Continuous(b)) => {
                s.direction(a, b).map(Displacement::Real)
            }
            _ => Err(self.unsupported("direction")),
        }
    }

    fn walk(
        &mut self,
        agent: AgentId,
        delta: &Displacement,
        options: WalkOptions,
    ) -> Result<Moved<Position>, SpaceError> {
        match (self, delta) {
            (Self::Grid(s), Displacement::Cells(d)) => {
                Ok(s.walk(agent, d, options)?.map(Position::Grid))
            }
            (Self::Continuous(s), Displacement::Real(d)) => {
                Ok(s.walk(agent, d, options)?.map(Position::Continuous))
            }
            (space, _) => Err(space.unsupported("walk")),
        }
    }

    fn random_walk<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        rng: &mut R,
        options: WalkOptions,
    ) -> Result<Moved<Position>, SpaceError> {
        match self {
            Self::Grid(s) => Ok(s.random_walk(agent, rng, options)?.map(Position::Grid)),
            Self::Continuous(s) => {
                Ok(s.random_walk(agent, rng, options)?.map(Position::Continuous))
            }
            Self::Graph(s) => Ok(s.random_walk(agent, rng)?.map(Position::Vertex)),
            Self::Network(_) => Err(self.unsupported("random_walk")),
        }
    }
}
