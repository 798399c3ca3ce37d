//! Continuous N-dimensional spaces backed by a uniform cell list.

use crate::boundary::{self, Boundary};
use crate::metric::{self, PeriodicImages};
use crate::occupancy::{Occupancy, SpatialIndex};
use crate::product::AxisProduct;
use crate::space::{
    check_ndim, check_radius, MetricSpace, Moved, Neighbors, Space, WalkOptions,
};
use habitat_core::{AgentId, Point, Position, SpaceError, Topology};
use rand::Rng;
use smallvec::SmallVec;

/// Upper bound on the number of cells in a cell list.
const MAX_CELLS: usize = 1 << 24;

/// Default cells along the shortest axis.
const DEFAULT_CELLS_PER_AXIS: f64 = 10.0;

// ── Index ───────────────────────────────────────────────────────

/// Uniform grid of buckets over a continuous box.
///
/// Each agent is filed in the bucket containing its point. A radius
/// query only visits the buckets overlapping the query's bounding box.
#[derive(Clone, Debug)]
pub(crate) struct CellList {
    cell_size: f64,
    counts: SmallVec<[usize; 4]>,
    strides: SmallVec<[usize; 4]>,
    cells: Vec<SmallVec<[AgentId; 4]>>,
}

impl CellList {
    fn new(extent: &[f64], cell_size: f64) -> Result<Self, SpaceError> {
        let too_fine = SpaceError::InvalidCellSize { value: cell_size };
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(too_fine);
        }
        let mut counts: SmallVec<[usize; 4]> = SmallVec::with_capacity(extent.len());
        let mut total: usize = 1;
        for &e in extent {
            let n = (e / cell_size).ceil();
            if n > MAX_CELLS as f64 {
                return Err(too_fine);
            }
            let n = (n as usize).max(1);
            total = total
                .checked_mul(n)
                .filter(|&t| t <= MAX_CELLS)
                .ok_or_else(|| too_fine.clone())?;
            counts.push(n);
        }
        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, counts.len());
        for axis in (0..counts.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * counts[axis + 1];
        }
        Ok(Self {
            cell_size,
            counts,
            strides,
            cells: vec![SmallVec::new(); total],
        })
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Bucket index along `axis` for a coordinate, clamped into range.
    fn axis_cell(&self, axis: usize, x: f64) -> usize {
        // Negative inputs saturate to 0 under `as`.
        ((x / self.cell_size) as usize).min(self.counts[axis] - 1)
    }

    fn rank_of_point(&self, p: &[f64]) -> usize {
        (0..p.len())
            .map(|axis| self.axis_cell(axis, p[axis]) * self.strides[axis])
            .sum()
    }

    fn rank_of_cell(&self, cell: &[usize]) -> usize {
        cell.iter().zip(&self.strides).map(|(&c, &s)| c * s).sum()
    }

    fn occupants(&self, rank: usize) -> &[AgentId] {
        &self.cells[rank]
    }
}

impl SpatialIndex for CellList {
    type Pos = Point;

    fn insert(&mut self, agent: AgentId, pos: &Point) {
        let rank = self.rank_of_point(pos);
        self.cells[rank].push(agent);
    }

    fn remove(&mut self, agent: AgentId, pos: &Point) {
        let rank = self.rank_of_point(pos);
        let cell = &mut self.cells[rank];
        if let Some(i) = cell.iter().position(|&a| a == agent) {
            cell.remove(i);
        }
    }
}

// ── Space ───────────────────────────────────────────────────────

/// A continuous box `[0, e0) x [0, e1) x ...` holding agents at real
/// coordinates.
///
/// Each axis is independently periodic or bounded. Bounded axes clamp
/// into the half-open extent, so a clamped coordinate is the largest
/// `f64` below the extent, never the extent itself.
#[derive(Clone, Debug)]
pub struct ContinuousSpace {
    extent: Point,
    boundaries: SmallVec<[Boundary; 4]>,
    images: PeriodicImages,
    occupancy: Occupancy<CellList>,
}

impl ContinuousSpace {
    /// Create a space with the given per-axis extents and boundaries.
    ///
    /// The cell list defaults to a tenth of the shortest extent per cell,
    /// coarsened as needed to stay within the cell budget.
    pub fn new(extent: &[f64], boundaries: &[Boundary]) -> Result<Self, SpaceError> {
        if extent.is_empty() {
            return Err(SpaceError::EmptySpace);
        }
        check_ndim(extent.len(), boundaries.len())?;
        for (axis, &e) in extent.iter().enumerate() {
            if !(e.is_finite() && e > 0.0) {
                return Err(SpaceError::InvalidExtent {
                    axis,
                    reason: format!("extent {e} must be positive and finite"),
                });
            }
        }
        let shortest = extent.iter().copied().fold(f64::INFINITY, f64::min);
        let mut cell_size = shortest / DEFAULT_CELLS_PER_AXIS;
        let index = loop {
            match CellList::new(extent, cell_size) {
                Ok(index) => break index,
                Err(_) if cell_size.is_finite() && cell_size > 0.0 => cell_size *= 2.0,
                Err(e) => return Err(e),
            }
        };
        tracing::debug!(
            ?extent,
            ?boundaries,
            cell_size,
            cells = index.cell_count(),
            "continuous space created"
        );
        Ok(Self {
            extent: SmallVec::from_slice(extent),
            boundaries: SmallVec::from_slice(boundaries),
            images: PeriodicImages::new(boundaries),
            occupancy: Occupancy::new(index),
        })
    }

    /// A space that wraps on every axis.
    pub fn periodic(extent: &[f64]) -> Result<Self, SpaceError> {
        Self::new(extent, &vec![Boundary::Periodic; extent.len()])
    }

    /// A space that clamps on every axis.
    pub fn bounded(extent: &[f64]) -> Result<Self, SpaceError> {
        Self::new(extent, &vec![Boundary::Bounded; extent.len()])
    }

    /// Rebuild the cell list with buckets of side `cell_size`.
    ///
    /// Queries are fastest when `cell_size` is close to the typical
    /// query radius. Agents already placed are re-filed.
    pub fn with_cell_size(self, cell_size: f64) -> Result<Self, SpaceError> {
        let mut occupancy = Occupancy::new(CellList::new(&self.extent, cell_size)?);
        for (&agent, pos) in self.occupancy.iter() {
            occupancy.add(agent, pos.clone())?;
        }
        tracing::debug!(cell_size, cells = occupancy.index().cell_count(), "cell list rebuilt");
        Ok(Self { occupancy, ..self })
    }

    /// Per-axis extents.
    pub fn extent(&self) -> &[f64] {
        &self.extent
    }

    /// Per-axis boundaries.
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Side length of one cell-list bucket.
    pub fn cell_size(&self) -> f64 {
        self.occupancy.index().cell_size
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.extent.len()
    }

    /// A uniformly random point in the space.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        self.extent.iter().map(|&e| rng.gen_range(0.0..e)).collect()
    }

    /// The closest other agent within `radius` of `agent`, if any.
    ///
    /// Ties go to the agent the neighbour query yields first.
    pub fn nearest_neighbor(
        &self,
        agent: AgentId,
        radius: f64,
    ) -> Result<Option<AgentId>, SpaceError> {
        let origin = self
            .occupancy
            .position(agent)
            .ok_or(SpaceError::UnknownAgent { agent })?;
        let mut best: Option<(AgentId, f64)> = None;
        for other in self.neighbor_agents_of(agent, radius)? {
            let Some(p) = self.occupancy.position(other) else {
                continue;
            };
            let d = self.point_distance(origin, p);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((other, d));
            }
        }
        Ok(best.map(|(a, _)| a))
    }

    fn point_distance(&self, a: &[f64], b: &[f64]) -> f64 {
        metric::point_distance(a, b, &self.extent, &self.boundaries)
    }

    /// Buckets along one axis overlapping `[centre - r, centre + r]`,
    /// wrapped on periodic axes. Never repeats a bucket.
    fn axis_cells(&self, axis: usize, centre: f64, r: f64) -> Vec<usize> {
        let index = self.occupancy.index();
        let n = index.counts[axis];
        let e = self.extent[axis];
        let cell = |x: f64| index.axis_cell(axis, x);
        let (lo, hi) = (centre - r, centre + r);
        match self.boundaries[axis] {
            Boundary::Periodic if 2.0 * r >= e => (0..n).collect(),
            Boundary::Periodic => {
                let mut cells: Vec<usize> = if lo < 0.0 {
                    (cell(lo + e)..n).chain(0..=cell(hi)).collect()
                } else if hi >= e {
                    (cell(lo)..n).chain(0..=cell(hi - e)).collect()
                } else {
                    (cell(lo)..=cell(hi)).collect()
                };
                cells.sort_unstable();
                cells.dedup();
                cells
            }
            Boundary::Bounded => (cell(lo)..=cell(hi)).collect(),
        }
    }

    fn check_finite(&self, pos: &Point) -> Result<(), SpaceError> {
        match pos.iter().position(|x| !x.is_finite()) {
            Some(axis) => Err(SpaceError::OutOfBounds {
                position: Position::Continuous(pos.clone()),
                reason: format!("axis {axis} is not finite"),
            }),
            None => Ok(()),
        }
    }

    fn is_valid(&self, pos: &[f64]) -> bool {
        pos.len() == self.ndim()
            && pos
                .iter()
                .zip(&self.extent)
                .all(|(&x, &e)| x.is_finite() && (0.0..e).contains(&x))
    }
}

impl Space for ContinuousSpace {
    type Pos = Point;
    type Radius = f64;

    fn topology(&self) -> Topology {
        Topology::Continuous
    }

    fn normalize(&self, pos: &Point) -> Result<Point, SpaceError> {
        check_ndim(self.ndim(), pos.len())?;
        self.check_finite(pos)?;
        Ok(pos
            .iter()
            .zip(&self.extent)
            .zip(&self.boundaries)
            .map(|((&x, &e), &b)| boundary::resolve_real(x, e, b))
            .collect())
    }

    fn position(&self, agent: AgentId) -> Option<Point> {
        self.occupancy.position(agent).cloned()
    }

    fn agent_count(&self) -> usize {
        self.occupancy.len()
    }

    fn agents(&self) -> Box<dyn Iterator<Item = (AgentId, Point)> + '_> {
        Box::new(self.occupancy.iter().map(|(&a, p)| (a, p.clone())))
    }

    fn add_agent(&mut self, agent: AgentId, pos: Point) -> Result<Point, SpaceError> {
        let pos = self.normalize(&pos)?;
        self.occupancy.add(agent, pos.clone())?;
        Ok(pos)
    }

    fn remove_agent(&mut self, agent: AgentId) -> Result<Point, SpaceError> {
        self.occupancy.remove(agent)
    }

    fn move_agent(&mut self, agent: AgentId, target: Point) -> Result<Point, SpaceError> {
        let target = self.normalize(&target)?;
        self.occupancy.relocate(agent, target.clone())?;
        Ok(target)
    }

    fn occupants_at<'a>(&'a self, pos: &Point) -> Neighbors<'a, AgentId> {
        if !self.is_valid(pos) {
            return Box::new(std::iter::empty());
        }
        let target = pos.clone();
        let index = self.occupancy.index();
        Box::new(
            index
                .occupants(index.rank_of_point(pos))
                .iter()
                .copied()
                .filter(move |&a| self.occupancy.position(a) == Some(&target)),
        )
    }

    /// Continuous spaces have uncountably many positions within any
    /// radius, so this always fails with `UnsupportedOperation`.
    fn neighbor_positions<'a>(
        &'a self,
        _pos: &Point,
        _radius: f64,
    ) -> Result<Neighbors<'a, Point>, SpaceError> {
        Err(SpaceError::UnsupportedOperation {
            operation: "neighbor_positions",
            topology: Topology::Continuous,
        })
    }

    fn neighbor_agents<'a>(
        &'a self,
        pos: &Point,
        radius: f64,
    ) -> Result<Neighbors<'a, AgentId>, SpaceError> {
        let radius = check_radius(radius)?;
        let origin = self.normalize(pos)?;
        let axes: Vec<Vec<usize>> = (0..self.ndim())
            .map(|axis| self.axis_cells(axis, origin[axis], radius))
            .collect();
        let index = self.occupancy.index();
        Ok(Box::new(
            AxisProduct::new(axes)
                .flat_map(move |cell| index.occupants(index.rank_of_cell(&cell)).iter().copied())
                .filter(move |&a| {
                    self.occupancy
                        .position(a)
                        .is_some_and(|p| self.point_distance(&origin, p) <= radius)
                }),
        ))
    }
}

impl MetricSpace for ContinuousSpace {
    type Vector = Point;

    fn distance(&self, a: &Point, b: &Point) -> Result<f64, SpaceError> {
        let a = self.normalize(a)?;
        let b = self.normalize(b)?;
        Ok(self.point_distance(&a, &b))
    }

    fn direction(&self, from: &Point, to: &Point) -> Result<Point, SpaceError> {
        let from = self.normalize(from)?;
        let to = self.normalize(to)?;
        Ok(self.images.point_direction(&from, &to, &self.extent))
    }

    /// Move by `delta`. `options.if_empty` has no effect: two agents
    /// almost never share an exact point.
    fn walk(
        &mut self,
        agent: AgentId,
        delta: &Point,
        _options: WalkOptions,
    ) -> Result<Moved<Point>, SpaceError> {
        check_ndim(self.ndim(), delta.len())?;
        let current = self
            .occupancy
            .position(agent)
            .ok_or(SpaceError::UnknownAgent { agent })?;
        let raw: Point = current.iter().zip(delta).map(|(x, d)| x + d).collect();
        let target = self.normalize(&raw)?;
        self.occupancy.relocate(agent, target.clone())?;
        Ok(Moved::To(target))
    }

    fn random_walk<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        rng: &mut R,
        options: WalkOptions,
    ) -> Result<Moved<Point>, SpaceError> {
        let delta: Point = (0..self.ndim())
            .map(|_| rng.gen_range(-1.0..=1.0))
            .collect();
        self.walk(agent, &delta, options)
    }
}
