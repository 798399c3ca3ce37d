use habitat_space::{
    AgentId, ContinuousSpace, Coord, GridSpace, MetricSpace, Point, Space, WalkOptions,
};
use habitat_test_utils::{coord_in, init_tracing, point_in, sorted};
use proptest::prelude::*;
use smallvec::smallvec;
use std::collections::HashSet;

// ── Distance ────────────────────────────────────────────────────

#[test]
fn periodic_line_distance_is_shorter_way_round() {
    let s = GridSpace::periodic(&[10]).unwrap();
    for a in 0..10i32 {
        for b in 0..10i32 {
            let d = (a - b).abs();
            let expected = d.min(10 - d) as f64;
            assert_eq!(s.distance(&smallvec![a], &smallvec![b]).unwrap(), expected);
        }
    }
}

#[test]
fn periodic_continuous_line_distance_is_shorter_way_round() {
    let s = ContinuousSpace::periodic(&[10.0]).unwrap();
    let d = s.distance(&smallvec![1.0], &smallvec![8.5]).unwrap();
    assert!((d - 2.5).abs() < 1e-12);
    let d = s.distance(&smallvec![2.0], &smallvec![6.0]).unwrap();
    assert!((d - 4.0).abs() < 1e-12);
}

#[test]
fn bounded_line_distance_does_not_wrap() {
    let s = GridSpace::bounded(&[10]).unwrap();
    assert_eq!(s.distance(&smallvec![0], &smallvec![9]).unwrap(), 9.0);
}

// ── Direction ───────────────────────────────────────────────────

#[test]
fn continuous_direction_crosses_the_seam() {
    let s = ContinuousSpace::periodic(&[10.0, 10.0]).unwrap();
    let dir = s
        .direction(&smallvec![0.5, 0.5], &smallvec![9.5, 9.5])
        .unwrap();
    assert_eq!(dir.as_slice(), &[-1.0, -1.0]);
}

#[test]
fn grid_direction_crosses_the_seam() {
    let s = GridSpace::periodic(&[10, 10]).unwrap();
    let dir = s.direction(&smallvec![0, 5], &smallvec![9, 5]).unwrap();
    assert_eq!(dir.as_slice(), &[-1, 0]);
}

// ── Boundary correction ─────────────────────────────────────────

#[test]
fn move_past_the_end_clamps_or_wraps() {
    let mut bounded = GridSpace::bounded(&[10]).unwrap();
    bounded.add_agent(AgentId(1), smallvec![0]).unwrap();
    let at = bounded.move_agent(AgentId(1), smallvec![15]).unwrap();
    assert_eq!(at.as_slice(), &[9]);

    let mut periodic = GridSpace::periodic(&[10]).unwrap();
    periodic.add_agent(AgentId(1), smallvec![0]).unwrap();
    let at = periodic.move_agent(AgentId(1), smallvec![15]).unwrap();
    assert_eq!(at.as_slice(), &[5]);
    assert_eq!(periodic.position(AgentId(1)).unwrap().as_slice(), &[5]);
}

// ── Neighbour queries ───────────────────────────────────────────

#[test]
fn periodic_3x3_corner_has_eight_wrapped_neighbours() {
    let s = GridSpace::periodic(&[3, 3]).unwrap();
    let found: Vec<Vec<i32>> = sorted(
        s.neighbor_positions(&smallvec![0, 0], 1.0)
            .unwrap()
            .map(|c| c.to_vec()),
    );
    let expected = vec![
        vec![0, 1],
        vec![0, 2],
        vec![1, 0],
        vec![1, 1],
        vec![1, 2],
        vec![2, 0],
        vec![2, 1],
        vec![2, 2],
    ];
    assert_eq!(found, expected);
}

#[test]
fn grid_neighbours_never_repeat_or_include_origin() {
    for space in [
        GridSpace::periodic(&[5, 4]).unwrap(),
        GridSpace::bounded(&[5, 4]).unwrap(),
    ] {
        for origin in space.positions() {
            for radius in [1.0, 1.5, 2.0, 3.0] {
                let found: Vec<Coord> =
                    space.neighbor_positions(&origin, radius).unwrap().collect();
                let unique: HashSet<&Coord> = found.iter().collect();
                assert_eq!(unique.len(), found.len(), "{origin:?} r={radius}");
                assert!(!found.contains(&origin));
            }
        }
    }
}

#[test]
fn continuous_neighbour_agents_match_distance() {
    init_tracing();
    let mut s = ContinuousSpace::periodic(&[10.0, 10.0]).unwrap();
    let spots: [[f64; 2]; 5] = [[0.2, 0.2], [9.9, 9.9], [5.0, 5.0], [0.2, 2.5], [3.0, 0.2]];
    for (i, p) in spots.iter().enumerate() {
        s.add_agent(AgentId(i as u64), Point::from_slice(p)).unwrap();
    }
    let found = sorted(s.neighbor_agents_of(AgentId(0), 2.5).unwrap());
    assert_eq!(found, vec![AgentId(1), AgentId(3)]);
}

// ── Movement ────────────────────────────────────────────────────

#[test]
fn moving_onto_own_cell_keeps_arrival_order() {
    let mut s = GridSpace::bounded(&[4, 4]).unwrap();
    for id in 0..3 {
        s.add_agent(AgentId(id), smallvec![1, 1]).unwrap();
    }
    s.move_agent(AgentId(0), smallvec![1, 1]).unwrap();
    let here: Vec<AgentId> = s.occupants_at(&smallvec![1, 1]).collect();
    assert_eq!(here, vec![AgentId(0), AgentId(1), AgentId(2)]);
    assert_eq!(s.agent_count(), 3);
}

#[test]
fn walk_if_empty_refuses_occupied_cell() {
    let mut s = GridSpace::bounded(&[5, 5]).unwrap();
    s.add_agent(AgentId(1), smallvec![2, 2]).unwrap();
    s.add_agent(AgentId(2), smallvec![3, 2]).unwrap();

    let moved = s
        .walk(AgentId(1), &smallvec![1, 0], WalkOptions::if_empty())
        .unwrap();
    assert!(moved.stayed());
    assert_eq!(s.position(AgentId(1)).unwrap().as_slice(), &[2, 2]);

    let moved = s
        .walk(AgentId(1), &smallvec![1, 0], WalkOptions::default())
        .unwrap();
    assert!(!moved.stayed());
    assert_eq!(moved.position().as_slice(), &[3, 2]);
}

// ── Metric laws ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn grid_distance_is_symmetric_and_reflexive(
        a in coord_in(&[7, 5]),
        b in coord_in(&[7, 5]),
    ) {
        for s in [GridSpace::periodic(&[7, 5]).unwrap(), GridSpace::bounded(&[7, 5]).unwrap()] {
            prop_assert_eq!(s.distance(&a, &a).unwrap(), 0.0);
            prop_assert_eq!(s.distance(&a, &b).unwrap(), s.distance(&b, &a).unwrap());
            let zero: Coord = smallvec![0, 0];
            prop_assert_eq!(s.direction(&a, &a).unwrap(), zero);
        }
    }

    #[test]
    fn continuous_distance_is_symmetric_and_reflexive(
        a in point_in(&[8.0, 3.0]),
        b in point_in(&[8.0, 3.0]),
    ) {
        let s = ContinuousSpace::periodic(&[8.0, 3.0]).unwrap();
        prop_assert_eq!(s.distance(&a, &a).unwrap(), 0.0);
        let ab = s.distance(&a, &b).unwrap();
        let ba = s.distance(&b, &a).unwrap();
        prop_assert!((ab - ba).abs() < 1e-12);
        prop_assert!(ab <= (4.0f64.powi(2) + 1.5f64.powi(2)).sqrt() + 1e-12);
    }
}
