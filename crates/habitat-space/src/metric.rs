//! Periodic-aware Euclidean distance and shortest direction vectors.
//!
//! Distances use the per-axis minimum image from [`crate::boundary`].
//! Directions are resolved by an explicit search over the periodic
//! translates of the target, precomputed once per space as a
//! [`PeriodicImages`] table.

use crate::boundary::{self, Boundary};
use habitat_core::{Coord, Point};
use smallvec::SmallVec;

/// Image tables above this many entries are logged as a scaling hazard.
const LARGE_IMAGE_TABLE: usize = 729;

/// Precomputed translate offsets for shortest-direction search.
///
/// For a space whose periodic axes number `P`, the table holds the `3^P`
/// offset vectors with entries in `{-1, 0, +1}` on periodic axes and `0`
/// on bounded axes. Entry 0 is always the zero offset, so the unwrapped
/// target wins ties.
///
/// The search cost is `3^P` per call. Spatial dimensionality is small in
/// practice (`P <= 3` gives at most 27 candidates); higher `P` works but
/// grows exponentially.
#[derive(Clone, Debug)]
pub struct PeriodicImages {
    offsets: Vec<SmallVec<[i8; 4]>>,
}

impl PeriodicImages {
    /// Build the image table for the given per-axis boundaries.
    pub fn new(boundaries: &[Boundary]) -> Self {
        let ndim = boundaries.len();
        let mut offsets: Vec<SmallVec<[i8; 4]>> = vec![SmallVec::from_elem(0, ndim)];
        for (axis, b) in boundaries.iter().enumerate() {
            if !b.is_periodic() {
                continue;
            }
            let existing = offsets.len();
            for shift in [-1i8, 1] {
                for i in 0..existing {
                    let mut o = offsets[i].clone();
                    o[axis] = shift;
                    offsets.push(o);
                }
            }
        }
        if offsets.len() > LARGE_IMAGE_TABLE {
            tracing::warn!(
                images = offsets.len(),
                ndim,
                "periodic image table is large; direction queries scale as 3^P"
            );
        }
        Self { offsets }
    }

    /// Number of candidate translates examined per direction query.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always `false`: the zero offset is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Shortest integer vector from `from` to `to` on a grid with axis
    /// lengths `dims`. All slices must share one length.
    pub fn grid_direction(&self, from: &[i32], to: &[i32], dims: &[u32]) -> Coord {
        let best = self.best_image(|offset| {
            let mut sq = 0i64;
            for axis in 0..from.len() {
                let target = to[axis] as i64 + offset[axis] as i64 * dims[axis] as i64;
                let d = target - from[axis] as i64;
                sq += d * d;
            }
            sq as f64
        });
        let offset = &self.offsets[best];
        (0..from.len())
            .map(|axis| {
                let target = to[axis] as i64 + offset[axis] as i64 * dims[axis] as i64;
                (target - from[axis] as i64) as i32
            })
            .collect()
    }

    /// Shortest real vector from `from` to `to` in a continuous space with
    /// axis extents `extent`. All slices must share one length.
    pub fn point_direction(&self, from: &[f64], to: &[f64], extent: &[f64]) -> Point {
        let best = self.best_image(|offset| {
            let mut sq = 0.0;
            for axis in 0..from.len() {
                let d = to[axis] + offset[axis] as f64 * extent[axis] - from[axis];
                sq += d * d;
            }
            sq
        });
        let offset = &self.offsets[best];
        (0..from.len())
            .map(|axis| to[axis] + offset[axis] as f64 * extent[axis] - from[axis])
            .collect()
    }

    /// Index of the offset minimizing `squared_distance`; first wins ties.
    fn best_image(&self, squared_distance: impl Fn(&[i8]) -> f64) -> usize {
        let mut best = 0;
        let mut best_sq = f64::INFINITY;
        for (i, offset) in self.offsets.iter().enumerate() {
            let sq = squared_distance(offset);
            if sq < best_sq {
                best = i;
                best_sq = sq;
            }
        }
        best
    }
}

/// Euclidean distance between two grid cells, minimum-imaged per axis.
pub fn grid_distance(a: &[i32], b: &[i32], dims: &[u32], boundaries: &[Boundary]) -> f64 {
    let mut sq = 0.0;
    for axis in 0..a.len() {
        let d = boundary::index_delta(a[axis], b[axis], dims[axis], boundaries[axis]) as f64;
        sq += d * d;
    }
    sq.sqrt()
}

/// Euclidean distance between two points, minimum-imaged per axis.
pub fn point_distance(a: &[f64], b: &[f64], extent: &[f64], boundaries: &[Boundary]) -> f64 {
    let mut sq = 0.0;
    for axis in 0..a.len() {
        let d = boundary::real_delta(a[axis], b[axis], extent[axis], boundaries[axis]);
        sq += d * d;
    }
    sq.sqrt()
}
