//! Space trait compliance test helpers.
//!
//! These functions check the invariants every backend must uphold:
//! metric laws, neighbour query hygiene and index consistency. Reused
//! across the grid, continuous, graph and network test modules.

use crate::space::{MetricSpace, Space};
use habitat_core::AgentId;

/// Assert reflexivity, symmetry and non-negativity of `distance` over
/// every pair of `samples`.
pub(crate) fn assert_distance_laws<S: MetricSpace>(space: &S, samples: &[S::Pos]) {
    for a in samples {
        let d = space.distance(a, a).expect("distance(a, a)");
        assert!(d.abs() < 1e-12, "distance({a:?}, {a:?}) = {d}, expected 0.0");
        for b in samples {
            let dab = space.distance(a, b).expect("distance(a, b)");
            let dba = space.distance(b, a).expect("distance(b, a)");
            assert!(dab >= 0.0, "distance({a:?}, {b:?}) = {dab} is negative");
            assert!(
                (dab - dba).abs() < 1e-9,
                "distance({a:?}, {b:?}) = {dab} != distance({b:?}, {a:?}) = {dba}"
            );
        }
    }
}

/// Assert that neighbour position queries around each origin never
/// yield the origin and never yield a position twice.
pub(crate) fn assert_neighbors_exclude_origin<S: Space>(
    space: &S,
    origins: &[S::Pos],
    radius: S::Radius,
) {
    for origin in origins {
        let origin = space.normalize(origin).expect("normalize origin");
        let found: Vec<S::Pos> = space
            .neighbor_positions(&origin, radius)
            .expect("neighbor_positions")
            .collect();
        assert!(
            !found.contains(&origin),
            "neighbours of {origin:?} at radius {radius:?} include the origin"
        );
        for (i, p) in found.iter().enumerate() {
            assert!(
                !found[i + 1..].contains(p),
                "neighbours of {origin:?} at radius {radius:?} repeat {p:?}"
            );
        }
    }
}

/// Assert that every agent is filed exactly once, under exactly its
/// recorded position, and that nothing else is filed.
pub(crate) fn assert_index_consistent<S: Space>(space: &S) {
    let agents: Vec<(AgentId, S::Pos)> = space.agents().collect();
    assert_eq!(agents.len(), space.agent_count());

    let mut distinct: Vec<S::Pos> = Vec::new();
    for (agent, pos) in &agents {
        let here: Vec<AgentId> = space.occupants_at(pos).collect();
        let hits = here.iter().filter(|&&a| a == *agent).count();
        assert_eq!(hits, 1, "{agent} filed {hits} times under {pos:?}");
        if !distinct.contains(pos) {
            distinct.push(pos.clone());
        }
    }
    let filed: usize = distinct.iter().map(|p| space.occupants_at(p).count()).sum();
    assert_eq!(filed, agents.len(), "index holds entries with no position record");
}

/// Assert that moving `agent` onto its own position changes nothing.
pub(crate) fn assert_move_to_self_is_noop<S: Space>(space: &mut S, agent: AgentId) {
    let pos = space.position(agent).expect("agent is placed");
    let before: Vec<AgentId> = space.occupants_at(&pos).collect();
    let after_pos = space.move_agent(agent, pos.clone()).expect("move to self");
    assert_eq!(after_pos, pos);
    let after: Vec<AgentId> = space.occupants_at(&pos).collect();
    assert_eq!(before, after, "moving {agent} onto itself reordered the index");
    assert_index_consistent(space);
}
