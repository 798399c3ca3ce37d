//! Cartesian product of per-axis candidate coordinates.
//!
//! Neighbour queries on grids and cell lists first reduce each axis to a
//! short list of candidate indices (the bounding box of the query,
//! wrapped or clamped per axis), then walk every combination. This module
//! provides that walk as a lazy iterator.

use smallvec::SmallVec;

/// Lazy row-major walk over the Cartesian product of per-axis value lists.
///
/// Yields `axes[0][i0], axes[1][i1], ...` for every index tuple, with the
/// last axis varying fastest. If every axis list is free of duplicates,
/// so is the output. An empty axis list makes the product empty.
#[derive(Clone, Debug)]
pub struct AxisProduct<T> {
    axes: Vec<Vec<T>>,
    cursor: SmallVec<[usize; 4]>,
    done: bool,
}

impl<T: Copy> AxisProduct<T> {
    /// Create the product of `axes`.
    pub fn new(axes: Vec<Vec<T>>) -> Self {
        let done = axes.is_empty() || axes.iter().any(|a| a.is_empty());
        let cursor = SmallVec::from_elem(0, axes.len());
        Self { axes, cursor, done }
    }

    /// Total number of combinations.
    pub fn combinations(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().map(Vec::len).product()
    }

    fn advance(&mut self) {
        for axis in (0..self.axes.len()).rev() {
            self.cursor[axis] += 1;
            if self.cursor[axis] < self.axes[axis].len() {
                return;
            }
            self.cursor[axis] = 0;
        }
        self.done = true;
    }
}

impl<T: Copy> Iterator for AxisProduct<T> {
    type Item = SmallVec<[T; 4]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .cursor
            .iter()
            .zip(&self.axes)
            .map(|(&i, axis)| axis[i])
            .collect();
        self.advance();
        Some(item)
    }
}
