//! Benchmark profiles for the Habitat spatial layer.
//!
//! Provides pre-populated spaces for benchmarking neighbour queries and
//! movement:
//!
//! - [`reference_grid`]: 100x100 periodic grid, one agent per ten cells
//! - [`reference_continuous`]: 100x100 periodic box with 10K agents
//! - [`query_points`]: deterministic query origins via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use habitat_core::{AgentId, Point, SpaceError};
use habitat_space::{ContinuousSpace, GridSpace, Space};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Side length of the reference grid and box.
pub const SIDE: u32 = 100;

/// Build the reference grid: 100x100 periodic cells holding 1K agents,
/// at most one per cell.
pub fn reference_grid(seed: u64) -> Result<GridSpace, SpaceError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut space = GridSpace::periodic(&[SIDE, SIDE])?;
    let agents = (SIDE * SIDE / 10) as u64;
    for id in 0..agents {
        space.add_agent_single(AgentId(id), &mut rng)?;
    }
    Ok(space)
}

/// Build the reference continuous space: a 100x100 periodic box with
/// 10K uniformly placed agents.
pub fn reference_continuous(seed: u64) -> Result<ContinuousSpace, SpaceError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let side = SIDE as f64;
    let mut space = ContinuousSpace::periodic(&[side, side])?;
    for id in 0..(SIDE * SIDE) as u64 {
        let p = space.random_position(&mut rng);
        space.add_agent(AgentId(id), p)?;
    }
    Ok(space)
}

/// `n` deterministic query origins inside the reference box.
pub fn query_points(n: usize, seed: u64) -> Result<Vec<Point>, SpaceError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let side = SIDE as f64;
    let space = ContinuousSpace::periodic(&[side, side])?;
    Ok((0..n).map(|_| space.random_position(&mut rng)).collect())
}
