//! Test fixtures and helpers for Habitat development.
//!
//! Provides seeded randomness, a tracing subscriber for test output,
//! ready-made graph and road-network spaces, and proptest strategies
//! for in-range grid coordinates and continuous points.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use habitat_core::{AgentId, Coord, Point};
use habitat_space::{GraphSpace, NetworkSpace, Road};
use proptest::prelude::*;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Deterministic RNG for reproducible walks and placements.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Install a test-friendly tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Agent ids `0..n`.
pub fn agent_ids(n: u64) -> impl Iterator<Item = AgentId> {
    (0..n).map(AgentId)
}

/// Undirected path graph `0 - 1 - ... - (n-1)`.
pub fn path_graph_space(n: u32) -> GraphSpace {
    let edges: Vec<(u32, u32)> = (1..n).map(|v| (v - 1, v)).collect();
    GraphSpace::from_edges(n as usize, &edges, false).expect("path graph is valid")
}

/// Two-way ring of `n` intersections joined by roads of `length`.
pub fn ring_road(n: u32, length: f64) -> NetworkSpace {
    let roads: Vec<Road> = (0..n).map(|v| Road::new(v, (v + 1) % n, length)).collect();
    NetworkSpace::two_way(n as usize, &roads).expect("ring road is valid")
}

/// Collect a query result into sorted order for set comparisons.
pub fn sorted<T: Ord>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut v: Vec<T> = items.into_iter().collect();
    v.sort();
    v
}

/// Coordinates inside a grid of the given axis lengths.
pub fn coord_in(dims: &[u32]) -> impl Strategy<Value = Coord> {
    let axes: Vec<_> = dims.iter().map(|&len| 0..len as i32).collect();
    axes.prop_map(Coord::from_vec)
}

/// Points inside a box of the given extents.
pub fn point_in(extent: &[f64]) -> impl Strategy<Value = Point> {
    let axes: Vec<_> = extent.iter().map(|&e| 0.0..e).collect();
    axes.prop_map(Point::from_vec)
}
