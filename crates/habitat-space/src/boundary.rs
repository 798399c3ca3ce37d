//! Per-axis boundary handling for grid and continuous spaces.
//!
//! Every axis of a grid or continuous space is either [`Boundary::Periodic`]
//! (the far edge meets the near edge) or [`Boundary::Bounded`] (positions
//! past the edge are clamped back inside). Axes are corrected
//! independently, so mixed spaces such as a cylinder are legal.
//!
//! Coordinates are 0-based: a grid axis of length `n` holds `0..n`, a
//! continuous axis of extent `e` holds `[0, e)`.

/// How one axis of a space treats positions beyond its edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Coordinates wrap around (torus topology along this axis).
    Periodic,
    /// Coordinates are clamped into the extent.
    Bounded,
}

impl Boundary {
    /// `Periodic` if `periodic` is true, else `Bounded`.
    pub fn from_periodic(periodic: bool) -> Self {
        if periodic {
            Self::Periodic
        } else {
            Self::Bounded
        }
    }

    /// Returns `true` for [`Boundary::Periodic`].
    pub fn is_periodic(self) -> bool {
        self == Self::Periodic
    }
}

// ── Integer (grid) axes ─────────────────────────────────────────

/// Resolve a grid coordinate into `0..len` under the given boundary.
///
/// `len` must be in `1..=i32::MAX`; grid construction guarantees this.
pub fn resolve_index(val: i32, len: u32, boundary: Boundary) -> i32 {
    let n = len as i32;
    if (0..n).contains(&val) {
        return val;
    }
    match boundary {
        Boundary::Periodic => val.rem_euclid(n),
        Boundary::Bounded => val.clamp(0, n - 1),
    }
}

/// [`resolve_index`] for a coordinate computed in `i64`, so that a
/// coordinate plus a step never overflows before correction.
pub fn resolve_wide(val: i64, len: u32, boundary: Boundary) -> i32 {
    let n = len as i64;
    let r = match boundary {
        Boundary::Periodic => val.rem_euclid(n),
        Boundary::Bounded => val.clamp(0, n - 1),
    };
    r as i32
}

/// Signed delta from `from` to `to` along one grid axis.
///
/// On a periodic axis this is the minimum image: the member of
/// `{d, d - len, d + len}` with the smallest magnitude, preferring the
/// unwrapped `d` on ties.
pub fn index_delta(from: i32, to: i32, len: u32, boundary: Boundary) -> i64 {
    let d = to as i64 - from as i64;
    match boundary {
        Boundary::Bounded => d,
        Boundary::Periodic => {
            let n = len as i64;
            let mut best = d;
            for candidate in [d - n, d + n] {
                if candidate.abs() < best.abs() {
                    best = candidate;
                }
            }
            best
        }
    }
}

// ── Real (continuous) axes ──────────────────────────────────────

/// Largest coordinate a bounded continuous axis of this extent accepts.
///
/// Continuous extents are half-open, so a bounded axis clamps to one ULP
/// below `extent`. The gap scales with the extent's magnitude.
pub fn upper_limit(extent: f64) -> f64 {
    extent.next_down()
}

/// Resolve a continuous coordinate into `[0, extent)` under the given
/// boundary. `x` must be finite.
pub fn resolve_real(x: f64, extent: f64, boundary: Boundary) -> f64 {
    match boundary {
        Boundary::Periodic => {
            let w = x.rem_euclid(extent);
            // Tiny negative inputs can round up to exactly `extent`.
            if w >= extent {
                0.0
            } else {
                w
            }
        }
        Boundary::Bounded => x.clamp(0.0, upper_limit(extent)),
    }
}

/// Signed delta from `from` to `to` along one continuous axis, using the
/// minimum image on periodic axes (ties keep the unwrapped delta).
pub fn real_delta(from: f64, to: f64, extent: f64, boundary: Boundary) -> f64 {
    let d = to - from;
    match boundary {
        Boundary::Bounded => d,
        Boundary::Periodic => {
            let mut best = d;
            for candidate in [d - extent, d + extent] {
                if candidate.abs() < best.abs() {
                    best = candidate;
                }
            }
            best
        }
    }
}
