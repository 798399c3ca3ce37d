//! N-dimensional discrete grid spaces.

use crate::boundary::{self, Boundary};
use crate::metric::{self, PeriodicImages};
use crate::occupancy::{Occupancy, SpatialIndex};
use crate::product::AxisProduct;
use crate::space::{
    check_ndim, check_radius, MetricSpace, Moved, Neighbors, Space, WalkOptions,
};
use habitat_core::{AgentId, Coord, SpaceError, Topology};
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Random probes [`GridSpace::random_empty`] makes before falling back
/// to a full scan.
const RANDOM_EMPTY_PROBES: usize = 16;

/// Norm used to decide which cells lie within a neighbour radius.
///
/// Distances reported by [`MetricSpace::distance`] are always Euclidean;
/// the grid metric only shapes neighbourhoods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMetric {
    /// Largest per-axis step. Radius 1 is the Moore neighbourhood
    /// (8 cells in 2D).
    #[default]
    Chebyshev,
    /// Straight-line length. Radius 1 is the von Neumann neighbourhood.
    Euclidean,
    /// Sum of per-axis steps. Radius 1 is the von Neumann neighbourhood.
    Manhattan,
}

impl GridMetric {
    /// Length of a per-axis step vector under this metric.
    pub fn norm(self, deltas: &[i64]) -> f64 {
        match self {
            Self::Chebyshev => deltas.iter().map(|d| d.abs()).max().unwrap_or(0) as f64,
            Self::Manhattan => deltas.iter().map(|d| d.abs()).sum::<i64>() as f64,
            Self::Euclidean => deltas
                .iter()
                .map(|&d| (d as f64) * (d as f64))
                .sum::<f64>()
                .sqrt(),
        }
    }
}

// ── Index ───────────────────────────────────────────────────────

/// Dense row-major array of per-cell occupant lists.
#[derive(Clone, Debug)]
pub(crate) struct GridIndex {
    strides: SmallVec<[usize; 4]>,
    cells: Vec<SmallVec<[AgentId; 2]>>,
}

impl GridIndex {
    fn new(dims: &[u32], cell_count: usize) -> Self {
        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, dims.len());
        for axis in (0..dims.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * dims[axis + 1] as usize;
        }
        Self {
            strides,
            cells: vec![SmallVec::new(); cell_count],
        }
    }

    /// Row-major rank of an in-bounds coordinate (last axis fastest).
    fn rank(&self, coord: &[i32]) -> usize {
        coord
            .iter()
            .zip(&self.strides)
            .map(|(&c, &s)| c as usize * s)
            .sum()
    }

    fn occupants(&self, coord: &[i32]) -> &[AgentId] {
        &self.cells[self.rank(coord)]
    }
}

impl SpatialIndex for GridIndex {
    type Pos = Coord;

    fn insert(&mut self, agent: AgentId, pos: &Coord) {
        let rank = self.rank(pos);
        self.cells[rank].push(agent);
    }

    fn remove(&mut self, agent: AgentId, pos: &Coord) {
        let rank = self.rank(pos);
        let cell = &mut self.cells[rank];
        if let Some(i) = cell.iter().position(|&a| a == agent) {
            cell.remove(i);
        }
    }
}

// ── Space ───────────────────────────────────────────────────────

/// An N-dimensional grid of integer cells, each holding any number of
/// agents.
///
/// Cells are 0-based: an axis of length `n` holds coordinates `0..n`.
/// Each axis is independently periodic (wraps) or bounded (clamps).
///
/// Neighbour queries enumerate only the cells inside the radius'
/// bounding box, so their cost scales with the neighbourhood, not with
/// the grid.
#[derive(Clone, Debug)]
pub struct GridSpace {
    dims: SmallVec<[u32; 4]>,
    boundaries: SmallVec<[Boundary; 4]>,
    metric: GridMetric,
    images: PeriodicImages,
    cell_count: usize,
    occupancy: Occupancy<GridIndex>,
}

impl GridSpace {
    /// Create a grid with the given axis lengths and per-axis boundaries.
    ///
    /// # Errors
    ///
    /// Returns `EmptySpace` for zero axes, `InvalidExtent` for an axis
    /// of length 0 or above `i32::MAX` (or a cell count overflowing
    /// `usize`), and `DimensionMismatch` if `boundaries` does not have
    /// one entry per axis.
    pub fn new(dims: &[u32], boundaries: &[Boundary]) -> Result<Self, SpaceError> {
        if dims.is_empty() {
            return Err(SpaceError::EmptySpace);
        }
        check_ndim(dims.len(), boundaries.len())?;
        let mut cell_count: usize = 1;
        for (axis, &len) in dims.iter().enumerate() {
            if len == 0 {
                return Err(SpaceError::InvalidExtent {
                    axis,
                    reason: "axis length must be at least 1".into(),
                });
            }
            if len > i32::MAX as u32 {
                return Err(SpaceError::InvalidExtent {
                    axis,
                    reason: format!("axis length {len} exceeds i32::MAX"),
                });
            }
            cell_count =
                cell_count
                    .checked_mul(len as usize)
                    .ok_or_else(|| SpaceError::InvalidExtent {
                        axis,
                        reason: "total cell count overflows usize".into(),
                    })?;
        }
        tracing::debug!(?dims, ?boundaries, cells = cell_count, "grid space created");
        Ok(Self {
            dims: SmallVec::from_slice(dims),
            boundaries: SmallVec::from_slice(boundaries),
            metric: GridMetric::default(),
            images: PeriodicImages::new(boundaries),
            cell_count,
            occupancy: Occupancy::new(GridIndex::new(dims, cell_count)),
        })
    }

    /// A grid that wraps on every axis (a torus in 2D).
    pub fn periodic(dims: &[u32]) -> Result<Self, SpaceError> {
        Self::new(dims, &vec![Boundary::Periodic; dims.len()])
    }

    /// A grid that clamps on every axis.
    pub fn bounded(dims: &[u32]) -> Result<Self, SpaceError> {
        Self::new(dims, &vec![Boundary::Bounded; dims.len()])
    }

    /// Use `metric` to shape neighbourhoods.
    pub fn with_metric(mut self, metric: GridMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Axis lengths.
    pub fn dims(&self) -> &[u32] {
        &self.dims
    }

    /// Per-axis boundaries.
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Neighbourhood metric.
    pub fn metric(&self) -> GridMetric {
        self.metric
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Returns `true` if `coord` names a cell without correction.
    pub fn contains(&self, coord: &[i32]) -> bool {
        coord.len() == self.ndim()
            && coord
                .iter()
                .zip(&self.dims)
                .all(|(&c, &len)| c >= 0 && (c as u32) < len)
    }

    /// Every cell, in row-major order (last axis fastest).
    pub fn positions(&self) -> impl Iterator<Item = Coord> {
        AxisProduct::new(self.dims.iter().map(|&len| (0..len as i32).collect()).collect())
    }

    /// Every unoccupied cell, in row-major order.
    pub fn empty_positions(&self) -> impl Iterator<Item = Coord> + '_ {
        self.positions()
            .filter(|c| self.occupancy.index().occupants(c).is_empty())
    }

    /// A uniformly random cell.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Coord {
        self.dims
            .iter()
            .map(|&len| rng.gen_range(0..len as i32))
            .collect()
    }

    /// A random unoccupied cell.
    ///
    /// Probes a few random cells first, which is fast on sparse grids,
    /// then draws uniformly from the full list of empty cells.
    pub fn random_empty<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Coord, SpaceError> {
        if self.occupancy.len() < self.cell_count {
            for _ in 0..RANDOM_EMPTY_PROBES {
                let c = self.random_position(rng);
                if self.occupancy.index().occupants(&c).is_empty() {
                    return Ok(c);
                }
            }
        }
        self.empty_positions()
            .choose(rng)
            .ok_or(SpaceError::NoEmptyPosition)
    }

    /// Place `agent` on a random unoccupied cell.
    pub fn add_agent_single<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        rng: &mut R,
    ) -> Result<Coord, SpaceError> {
        if self.occupancy.position(agent).is_some() {
            return Err(SpaceError::DuplicateAgent { agent });
        }
        let pos = self.random_empty(rng)?;
        self.occupancy.add(agent, pos.clone())?;
        Ok(pos)
    }

    /// Move `agent` to a random unoccupied cell.
    pub fn move_agent_single<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        rng: &mut R,
    ) -> Result<Coord, SpaceError> {
        if self.occupancy.position(agent).is_none() {
            return Err(SpaceError::UnknownAgent { agent });
        }
        let pos = self.random_empty(rng)?;
        self.occupancy.relocate(agent, pos.clone())?;
        Ok(pos)
    }

    /// Number of unit steps between two cells, minimum-imaged on
    /// periodic axes.
    pub fn manhattan_distance(&self, a: &Coord, b: &Coord) -> Result<u64, SpaceError> {
        let a = self.normalize(a)?;
        let b = self.normalize(b)?;
        Ok(self
            .deltas(&a, &b)
            .iter()
            .map(|d| d.unsigned_abs())
            .sum())
    }

    /// Per-axis minimum-image steps from `a` to `b` (both normalized).
    fn deltas(&self, a: &[i32], b: &[i32]) -> SmallVec<[i64; 4]> {
        (0..self.ndim())
            .map(|axis| {
                boundary::index_delta(a[axis], b[axis], self.dims[axis], self.boundaries[axis])
            })
            .collect()
    }

    fn within(&self, origin: &[i32], cell: &[i32], radius: f64) -> bool {
        self.metric.norm(&self.deltas(origin, cell)) <= radius
    }

    /// Candidate coordinates along one axis for a query reaching `reach`
    /// cells either side of `centre`. Never repeats a coordinate.
    fn axis_candidates(&self, axis: usize, centre: i32, reach: i64) -> Vec<i32> {
        let len = self.dims[axis] as i64;
        let c = centre as i64;
        match self.boundaries[axis] {
            Boundary::Periodic => {
                if reach.saturating_mul(2).saturating_add(1) >= len {
                    (0..len as i32).collect()
                } else {
                    (c - reach..=c + reach)
                        .map(|v| v.rem_euclid(len) as i32)
                        .collect()
                }
            }
            Boundary::Bounded => {
                let lo = c.saturating_sub(reach).max(0) as i32;
                let hi = c.saturating_add(reach).min(len - 1) as i32;
                (lo..=hi).collect()
            }
        }
    }

    /// Cells in the bounding box of a radius query, origin included.
    fn candidate_cells(&self, origin: &[i32], radius: f64) -> AxisProduct<i32> {
        // Finite radii beyond i64 saturate, which still covers every axis.
        let reach = radius.floor() as i64;
        AxisProduct::new(
            (0..self.ndim())
                .map(|axis| self.axis_candidates(axis, origin[axis], reach))
                .collect(),
        )
    }
}

impl Space for GridSpace {
    type Pos = Coord;
    type Radius = f64;

    fn topology(&self) -> Topology {
        Topology::Grid
    }

    fn normalize(&self, pos: &Coord) -> Result<Coord, SpaceError> {
        check_ndim(self.ndim(), pos.len())?;
        Ok(pos
            .iter()
            .zip(&self.dims)
            .zip(&self.boundaries)
            .map(|((&c, &len), &b)| boundary::resolve_index(c, len, b))
            .collect())
    }

    fn position(&self, agent: AgentId) -> Option<Coord> {
        self.occupancy.position(agent).cloned()
    }

    fn agent_count(&self) -> usize {
        self.occupancy.len()
    }

    fn agents(&self) -> Box<dyn Iterator<Item = (AgentId, Coord)> + '_> {
        Box::new(self.occupancy.iter().map(|(&a, p)| (a, p.clone())))
    }

    fn add_agent(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        let pos = self.normalize(&pos)?;
        self.occupancy.add(agent, pos.clone())?;
        Ok(pos)
    }

    fn remove_agent(&mut self, agent: AgentId) -> Result<Coord, SpaceError> {
        self.occupancy.remove(agent)
    }

    fn move_agent(&mut self, agent: AgentId, target: Coord) -> Result<Coord, SpaceError> {
        let target = self.normalize(&target)?;
        self.occupancy.relocate(agent, target.clone())?;
        Ok(target)
    }

    fn occupants_at<'a>(&'a self, pos: &Coord) -> Neighbors<'a, AgentId> {
        if !self.contains(pos) {
            return Box::new(std::iter::empty());
        }
        Box::new(self.occupancy.index().occupants(pos).iter().copied())
    }

    fn neighbor_positions<'a>(
        &'a self,
        pos: &Coord,
        radius: f64,
    ) -> Result<Neighbors<'a, Coord>, SpaceError> {
        let radius = check_radius(radius)?;
        let origin = self.normalize(pos)?;
        let cells = self.candidate_cells(&origin, radius);
        Ok(Box::new(cells.filter(move |c| {
            *c != origin && self.within(&origin, c, radius)
        })))
    }

    fn neighbor_agents<'a>(
        &'a self,
        pos: &Coord,
        radius: f64,
    ) -> Result<Neighbors<'a, AgentId>, SpaceError> {
        let radius = check_radius(radius)?;
        let origin = self.normalize(pos)?;
        let cells = self.candidate_cells(&origin, radius);
        if cells.combinations() > self.occupancy.len() {
            // Fewer agents than candidate cells: scan the agents instead.
            return Ok(Box::new(
                self.occupancy
                    .iter()
                    .filter(move |(_, p)| self.within(&origin, p, radius))
                    .map(|(&a, _)| a),
            ));
        }
        Ok(Box::new(
            cells
                .filter(move |c| self.within(&origin, c, radius))
                .flat_map(move |c| self.occupancy.index().occupants(&c).iter().copied()),
        ))
    }
}

impl MetricSpace for GridSpace {
    type Vector = Coord;

    fn distance(&self, a: &Coord, b: &Coord) -> Result<f64, SpaceError> {
        let a = self.normalize(a)?;
        let b = self.normalize(b)?;
        Ok(metric::grid_distance(&a, &b, &self.dims, &self.boundaries))
    }

    fn direction(&self, from: &Coord, to: &Coord) -> Result<Coord, SpaceError> {
        let from = self.normalize(from)?;
        let to = self.normalize(to)?;
        Ok(self.images.grid_direction(&from, &to, &self.dims))
    }

    fn walk(
        &mut self,
        agent: AgentId,
        delta: &Coord,
        options: WalkOptions,
    ) -> Result<Moved<Coord>, SpaceError> {
        check_ndim(self.ndim(), delta.len())?;
        let current = self
            .occupancy
            .position(agent)
            .cloned()
            .ok_or(SpaceError::UnknownAgent { agent })?;
        let target: Coord = (0..self.ndim())
            .map(|axis| {
                let raw = current[axis] as i64 + delta[axis] as i64;
                boundary::resolve_wide(raw, self.dims[axis], self.boundaries[axis])
            })
            .collect();
        if options.if_empty && target != current && !self.is_empty_at(&target) {
            tracing::trace!(%agent, ?target, "walk refused: target occupied");
            return Ok(Moved::Stayed(current));
        }
        self.occupancy.relocate(agent, target.clone())?;
        Ok(Moved::To(target))
    }

    fn random_walk<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        rng: &mut R,
        options: WalkOptions,
    ) -> Result<Moved<Coord>, SpaceError> {
        let delta: Coord = (0..self.ndim()).map(|_| rng.gen_range(-1..=1)).collect();
        self.walk(agent, &delta, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use smallvec::smallvec;

    fn c(v: &[i32]) -> Coord {
        SmallVec::from_slice(v)
    }

    fn sorted(it: impl Iterator<Item = Coord>) -> Vec<Vec<i32>> {
        let mut v: Vec<Vec<i32>> = it.map(|c| c.to_vec()).collect();
        v.sort();
        v
    }

    // ── Construction ────────────────────────────────────────────

    #[test]
    fn construction_rejects_bad_extents() {
        assert_eq!(GridSpace::periodic(&[]).unwrap_err(), SpaceError::EmptySpace);
        assert!(matches!(
            GridSpace::bounded(&[4, 0]),
            Err(SpaceError::InvalidExtent { axis: 1, .. })
        ));
        assert!(matches!(
            GridSpace::bounded(&[u32::MAX]),
            Err(SpaceError::InvalidExtent { axis: 0, .. })
        ));
        assert_eq!(
            GridSpace::new(&[3, 3], &[Boundary::Bounded]).unwrap_err(),
            SpaceError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn positions_are_row_major_and_complete() {
        let g = GridSpace::bounded(&[2, 3]).unwrap();
        let all: Vec<Vec<i32>> = g.positions().map(|c| c.to_vec()).collect();
        assert_eq!(all.len(), g.cell_count());
        assert_eq!(all[0], vec![0, 0]);
        assert_eq!(all[1], vec![0, 1]);
        assert_eq!(all[5], vec![1, 2]);
        for (rank, coord) in all.iter().enumerate() {
            assert_eq!(g.occupancy.index().rank(coord), rank);
        }
    }

    // ── Boundary correction ─────────────────────────────────────

    #[test]
    fn bounded_axis_clamps_to_last_cell() {
        let mut g = GridSpace::bounded(&[10]).unwrap();
        g.add_agent(AgentId(1), c(&[0])).unwrap();
        assert_eq!(g.move_agent(AgentId(1), c(&[15])).unwrap(), c(&[9]));
        assert_eq!(g.position(AgentId(1)), Some(c(&[9])));
    }

    #[test]
    fn periodic_axis_wraps() {
        let mut g = GridSpace::periodic(&[10]).unwrap();
        g.add_agent(AgentId(1), c(&[0])).unwrap();
        assert_eq!(g.move_agent(AgentId(1), c(&[15])).unwrap(), c(&[5]));
        assert_eq!(g.move_agent(AgentId(1), c(&[-1])).unwrap(), c(&[9]));
    }

    #[test]
    fn mixed_boundaries_correct_each_axis() {
        let g = GridSpace::new(&[5, 5], &[Boundary::Periodic, Boundary::Bounded]).unwrap();
        assert_eq!(g.normalize(&c(&[-1, -1])).unwrap(), c(&[4, 0]));
        assert_eq!(g.normalize(&c(&[7, 7])).unwrap(), c(&[2, 4]));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let mut g = GridSpace::bounded(&[4, 4]).unwrap();
        assert!(matches!(
            g.add_agent(AgentId(1), c(&[1, 1, 1])),
            Err(SpaceError::DimensionMismatch { expected: 2, got: 3 })
        ));
        assert_eq!(g.agent_count(), 0);
    }

    // ── Distance and direction ──────────────────────────────────

    #[test]
    fn periodic_distance_takes_shorter_way() {
        let g = GridSpace::periodic(&[10]).unwrap();
        assert_eq!(g.distance(&c(&[1]), &c(&[9])).unwrap(), 2.0);
        assert_eq!(g.direction(&c(&[1]), &c(&[9])).unwrap(), c(&[-2]));
        let b = GridSpace::bounded(&[10]).unwrap();
        assert_eq!(b.distance(&c(&[1]), &c(&[9])).unwrap(), 8.0);
    }

    #[test]
    fn direction_to_self_is_zero() {
        let g = GridSpace::periodic(&[6, 6]).unwrap();
        for p in g.positions() {
            assert_eq!(g.direction(&p, &p).unwrap(), c(&[0, 0]));
        }
    }

    #[test]
    fn manhattan_distance_wraps() {
        let g = GridSpace::periodic(&[10, 10]).unwrap();
        assert_eq!(g.manhattan_distance(&c(&[0, 0]), &c(&[9, 8])).unwrap(), 3);
    }

    // ── Neighbours ──────────────────────────────────────────────

    #[test]
    fn periodic_3x3_corner_has_eight_wrapped_neighbors() {
        let g = GridSpace::periodic(&[3, 3]).unwrap();
        let n = sorted(g.neighbor_positions(&c(&[0, 0]), 1.0).unwrap());
        assert_eq!(
            n,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
                vec![2, 0],
                vec![2, 1],
                vec![2, 2],
            ]
        );
    }

    #[test]
    fn bounded_corner_has_three_neighbors() {
        let g = GridSpace::bounded(&[3, 3]).unwrap();
        assert_eq!(g.neighbor_positions(&c(&[0, 0]), 1.0).unwrap().count(), 3);
    }

    #[test]
    fn metric_shapes_neighbourhood() {
        let centre = c(&[5, 5]);
        let count = |m: GridMetric, r: f64| {
            GridSpace::bounded(&[11, 11])
                .unwrap()
                .with_metric(m)
                .neighbor_positions(&centre, r)
                .unwrap()
                .count()
        };
        assert_eq!(count(GridMetric::Chebyshev, 1.0), 8);
        assert_eq!(count(GridMetric::Manhattan, 1.0), 4);
        assert_eq!(count(GridMetric::Euclidean, 1.0), 4);
        assert_eq!(count(GridMetric::Euclidean, 1.5), 8);
        assert_eq!(count(GridMetric::Euclidean, 2.0), 12);
        assert_eq!(count(GridMetric::Manhattan, 2.0), 12);
        assert_eq!(count(GridMetric::Chebyshev, 2.0), 24);
    }

    #[test]
    fn radius_larger_than_grid_yields_each_cell_once() {
        let g = GridSpace::periodic(&[5, 5]).unwrap();
        let n = sorted(g.neighbor_positions(&c(&[2, 2]), 10.0).unwrap());
        assert_eq!(n.len(), 24);
        let mut dedup = n.clone();
        dedup.dedup();
        assert_eq!(dedup, n);
    }

    #[test]
    fn fractional_radius_below_one_is_empty() {
        let g = GridSpace::periodic(&[5, 5]).unwrap();
        assert_eq!(g.neighbor_positions(&c(&[2, 2]), 0.5).unwrap().count(), 0);
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let g = GridSpace::periodic(&[5]).unwrap();
        for r in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                g.neighbor_positions(&c(&[0]), r),
                Err(SpaceError::InvalidRadius { .. })
            ));
        }
    }

    #[test]
    fn neighbor_agents_include_cohabitants_but_not_self() {
        let mut g = GridSpace::periodic(&[5, 5]).unwrap();
        g.add_agent(AgentId(1), c(&[2, 2])).unwrap();
        g.add_agent(AgentId(2), c(&[2, 2])).unwrap();
        g.add_agent(AgentId(3), c(&[3, 3])).unwrap();
        g.add_agent(AgentId(4), c(&[0, 0])).unwrap();

        let mut at_pos: Vec<u64> = g
            .neighbor_agents(&c(&[2, 2]), 1.0)
            .unwrap()
            .map(|a| a.0)
            .collect();
        at_pos.sort();
        assert_eq!(at_pos, vec![1, 2, 3]);

        let mut of_agent: Vec<u64> = g
            .neighbor_agents_of(AgentId(1), 1.0)
            .unwrap()
            .map(|a| a.0)
            .collect();
        of_agent.sort();
        assert_eq!(of_agent, vec![2, 3]);
    }

    #[test]
    fn dense_and_sparse_agent_scans_agree() {
        let mut g = GridSpace::periodic(&[6, 6]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for id in 0..30 {
            g.add_agent(AgentId(id), g.random_position(&mut rng)).unwrap();
        }
        // Radii 1 and 2 cover 9 and 25 cells (dense scan); radius 3
        // covers all 36 cells, more than the 30 agents (sparse scan).
        for r in [1.0, 2.0, 3.0] {
            let mut got: Vec<u64> = g
                .neighbor_agents(&c(&[1, 4]), r)
                .unwrap()
                .map(|a| a.0)
                .collect();
            got.sort();
            let mut want: Vec<u64> = g
                .agents()
                .filter(|(_, p)| g.within(&[1, 4], p, r))
                .map(|(a, _)| a.0)
                .collect();
            want.sort();
            assert_eq!(got, want, "radius {r}");
        }
    }

    #[test]
    fn short_circuit_stops_early() {
        let g = GridSpace::periodic(&[1000, 1000]).unwrap();
        let first: Vec<Coord> = g
            .neighbor_positions(&c(&[0, 0]), 400.0)
            .unwrap()
            .take(3)
            .collect();
        assert_eq!(first.len(), 3);
    }

    // ── Movement ────────────────────────────────────────────────

    #[test]
    fn walk_if_empty_onto_occupied_cell_stays() {
        let mut g = GridSpace::bounded(&[5, 5]).unwrap();
        g.add_agent(AgentId(1), c(&[1, 1])).unwrap();
        g.add_agent(AgentId(2), c(&[2, 1])).unwrap();
        let moved = g
            .walk(AgentId(1), &c(&[1, 0]), WalkOptions::if_empty())
            .unwrap();
        assert_eq!(moved, Moved::Stayed(c(&[1, 1])));
        assert_eq!(g.position(AgentId(1)), Some(c(&[1, 1])));

        let moved = g
            .walk(AgentId(1), &c(&[1, 0]), WalkOptions::default())
            .unwrap();
        assert_eq!(moved, Moved::To(c(&[2, 1])));
        assert_eq!(g.occupants_at(&c(&[2, 1])).count(), 2);
    }

    #[test]
    fn walk_past_i32_range_is_corrected() {
        let mut g = GridSpace::bounded(&[10]).unwrap();
        g.add_agent(AgentId(1), c(&[5])).unwrap();
        let m = g
            .walk(AgentId(1), &c(&[i32::MAX]), WalkOptions::default())
            .unwrap();
        assert_eq!(m.into_position(), c(&[9]));
    }

    #[test]
    fn random_walk_moves_at_most_one_step_per_axis() {
        let mut g = GridSpace::bounded(&[20, 20]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        g.add_agent(AgentId(1), c(&[10, 10])).unwrap();
        for _ in 0..50 {
            let before = g.position(AgentId(1)).unwrap();
            let after = g
                .random_walk(AgentId(1), &mut rng, WalkOptions::default())
                .unwrap()
                .into_position();
            for axis in 0..2 {
                assert!((after[axis] - before[axis]).abs() <= 1);
            }
        }
    }

    #[test]
    fn move_to_current_position_keeps_index_order() {
        let mut g = GridSpace::bounded(&[3]).unwrap();
        g.add_agent(AgentId(1), c(&[1])).unwrap();
        g.add_agent(AgentId(2), c(&[1])).unwrap();
        compliance::assert_move_to_self_is_noop(&mut g, AgentId(1));
        let order: Vec<AgentId> = g.occupants_at(&c(&[1])).collect();
        assert_eq!(order, vec![AgentId(1), AgentId(2)]);
    }

    #[test]
    fn unknown_agent_errors_leave_space_unchanged() {
        let mut g = GridSpace::bounded(&[3]).unwrap();
        assert_eq!(
            g.move_agent(AgentId(5), c(&[1])).unwrap_err(),
            SpaceError::UnknownAgent { agent: AgentId(5) }
        );
        assert!(g.neighbor_agents_of(AgentId(5), 1.0).is_err());
        assert_eq!(g.agent_count(), 0);
    }

    // ── Empty-cell helpers ──────────────────────────────────────

    #[test]
    fn random_empty_fills_grid_then_errors() {
        let mut g = GridSpace::bounded(&[3, 3]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for id in 0..9 {
            g.add_agent_single(AgentId(id), &mut rng).unwrap();
        }
        assert_eq!(g.empty_positions().count(), 0);
        assert_eq!(
            g.random_empty(&mut rng).unwrap_err(),
            SpaceError::NoEmptyPosition
        );
        assert_eq!(
            g.add_agent_single(AgentId(99), &mut rng).unwrap_err(),
            SpaceError::NoEmptyPosition
        );
        compliance::assert_index_consistent(&g);
    }

    #[test]
    fn move_agent_single_lands_on_empty_cell() {
        let mut g = GridSpace::bounded(&[2, 2]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        g.add_agent(AgentId(1), c(&[0, 0])).unwrap();
        g.add_agent(AgentId(2), c(&[0, 1])).unwrap();
        g.add_agent(AgentId(3), c(&[1, 0])).unwrap();
        let pos = g.move_agent_single(AgentId(1), &mut rng).unwrap();
        assert_eq!(pos, c(&[1, 1]));
        assert!(g.is_empty_at(&c(&[0, 0])));
    }

    #[test]
    fn occupants_at_invalid_position_is_empty() {
        let g = GridSpace::bounded(&[3]).unwrap();
        assert_eq!(g.occupants_at(&c(&[7])).count(), 0);
        assert_eq!(g.occupants_at(&c(&[1, 1])).count(), 0);
    }

    // ── Compliance ──────────────────────────────────────────────

    #[test]
    fn compliance_periodic_and_bounded() {
        for g in [
            GridSpace::periodic(&[4, 5]).unwrap(),
            GridSpace::bounded(&[4, 5]).unwrap(),
            GridSpace::new(&[4, 5], &[Boundary::Periodic, Boundary::Bounded]).unwrap(),
        ] {
            let cells: Vec<Coord> = g.positions().collect();
            compliance::assert_distance_laws(&g, &cells);
            compliance::assert_neighbors_exclude_origin(&g, &cells, 1.0);
            compliance::assert_neighbors_exclude_origin(&g, &cells, 2.5);
        }
    }

    #[test]
    fn compliance_index_after_churn() {
        let mut g = GridSpace::periodic(&[5, 5]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for id in 0..20 {
            g.add_agent(AgentId(id), g.random_position(&mut rng)).unwrap();
        }
        for step in 0..200u64 {
            let id = AgentId(step % 20);
            g.random_walk(id, &mut rng, WalkOptions::default()).unwrap();
            if step % 37 == 0 {
                g.remove_agent(id).unwrap();
                g.add_agent(id, smallvec![0, 0]).unwrap();
            }
        }
        compliance::assert_index_consistent(&g);
    }
}
