//! Lazy breadth-first hop expansion over graph-shaped spaces.

use habitat_core::VertexId;
use std::collections::VecDeque;

/// Adjacency view of a graph-shaped space.
pub(crate) trait Adjacency {
    /// Number of vertices; ids are `0..vertex_count()`.
    fn vertex_count(&self) -> usize;

    /// Call `visit` for each vertex one hop from `v`. Repeats are allowed.
    fn for_each_adjacent(&self, v: VertexId, visit: impl FnMut(VertexId));
}

/// Vertices within `radius` hops of an origin, in breadth-first order.
///
/// Expansion is lazy: each frontier vertex is expanded only when it is
/// yielded, so a caller that stops early never pays for the rest of the
/// neighbourhood. A visited set guarantees each vertex is yielded at
/// most once. The origin is never yielded, even on graphs with
/// self-loops or cycles leading back to it.
pub(crate) struct HopExpansion<'a, A> {
    graph: &'a A,
    origin: VertexId,
    radius: u32,
    visited: Vec<bool>,
    queue: VecDeque<(VertexId, u32)>,
}

impl<'a, A: Adjacency> HopExpansion<'a, A> {
    /// Start an expansion. `origin` must be a valid vertex of `graph`.
    pub(crate) fn new(graph: &'a A, origin: VertexId, radius: u32) -> Self {
        let mut visited = vec![false; graph.vertex_count()];
        visited[origin.index()] = true;
        let mut queue = VecDeque::new();
        queue.push_back((origin, 0));
        Self {
            graph,
            origin,
            radius,
            visited,
            queue,
        }
    }
}

impl<A: Adjacency> Iterator for HopExpansion<'_, A> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        while let Some((v, depth)) = self.queue.pop_front() {
            if depth < self.radius {
                let visited = &mut self.visited;
                let queue = &mut self.queue;
                self.graph.for_each_adjacent(v, |n| {
                    if !visited[n.index()] {
                        visited[n.index()] = true;
                        queue.push_back((n, depth + 1));
                    }
                });
            }
            if v != self.origin {
                return Some(v);
            }
        }
        None
    }
}
