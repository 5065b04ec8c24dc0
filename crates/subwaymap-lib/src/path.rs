use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::pq::IndexMinPQ;

/// Sentinel distance for vertices not yet reached. Half the integer range,
/// so adding any real edge weight can neither wrap around nor look like an
/// improvement over an actual distance.
const UNREACHED: u64 = u64::MAX / 2;

/// A resolved shortest path from start to goal, inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath<V> {
    pub distance: u64,
    /// Vertices in start -> goal order.
    pub steps: Vec<V>,
}

impl<V> ShortestPath<V> {
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// The scratch state of a completed Dijkstra run: a stable snapshot of the
/// vertex set, with per-position distance and predecessor arrays.
///
/// The tree owns all per-run state; vertices themselves stay untouched, so
/// repeated queries on the same graph never interfere.
#[derive(Debug)]
pub struct ShortestPathTree<V> {
    order: Vec<V>,
    positions: HashMap<V, usize>,
    dist: Vec<u64>,
    prev: Vec<Option<usize>>,
}

impl<V> ShortestPathTree<V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    /// Distance from the run's start to `v`, or `None` when `v` was not
    /// reached (or is not in the graph).
    pub fn distance_to(&self, v: &V) -> Option<u64> {
        let &position = self.positions.get(v)?;
        let d = self.dist[position];
        (d != UNREACHED).then_some(d)
    }

    /// The path from the run's start to `v`, reconstructed by following
    /// predecessor links backwards and reversing into start -> goal order.
    pub fn path_to(&self, v: &V) -> Option<Vec<V>> {
        let &position = self.positions.get(v)?;
        if self.dist[position] == UNREACHED {
            return None;
        }
        let mut path = Vec::new();
        let mut current = Some(position);
        while let Some(i) = current {
            path.push(self.order[i].clone());
            current = self.prev[i];
        }
        path.reverse();
        Some(path)
    }
}

/// Compute the shortest path between `start` and `goal`.
///
/// `PathNotFound` is a normal terminal outcome meaning the goal is
/// unreachable; `InvalidVertex` means an endpoint is not in the graph.
pub fn shortest_path<V>(graph: &Graph<V>, start: &V, goal: &V) -> Result<ShortestPath<V>>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    let tree = run(graph, start, Some(goal), None)?;
    resolve(&tree, start, goal)
}

/// Same as [`shortest_path`], but observes `cancel` between relaxation
/// iterations and aborts with `Error::Cancelled` once it is set.
pub fn shortest_path_cancellable<V>(
    graph: &Graph<V>,
    start: &V,
    goal: &V,
    cancel: &AtomicBool,
) -> Result<ShortestPath<V>>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    let tree = run(graph, start, Some(goal), Some(cancel))?;
    resolve(&tree, start, goal)
}

/// Run Dijkstra to completion from `start` and return the full
/// shortest-path tree, with final distances for every reachable vertex.
pub fn shortest_path_tree<V>(graph: &Graph<V>, start: &V) -> Result<ShortestPathTree<V>>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    run(graph, start, None, None)
}

fn resolve<V>(tree: &ShortestPathTree<V>, start: &V, goal: &V) -> Result<ShortestPath<V>>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    match (tree.distance_to(goal), tree.path_to(goal)) {
        (Some(distance), Some(steps)) => {
            debug!(distance, hops = steps.len().saturating_sub(1), "found path");
            Ok(ShortestPath { distance, steps })
        }
        _ => Err(Error::PathNotFound {
            start: format!("{start:?}"),
            goal: format!("{goal:?}"),
        }),
    }
}

fn run<V>(
    graph: &Graph<V>,
    start: &V,
    goal: Option<&V>,
    cancel: Option<&AtomicBool>,
) -> Result<ShortestPathTree<V>>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    // Snapshot the vertex set once: positions in this list double as the
    // priority-queue index space for the whole run. The graph's own
    // iteration order is not stable across calls.
    let order: Vec<V> = graph.vertices().cloned().collect();
    let positions: HashMap<V, usize> = order
        .iter()
        .enumerate()
        .map(|(i, v)| (v.clone(), i))
        .collect();

    let start_pos = *positions.get(start).ok_or_else(|| not_a_vertex(start))?;
    let goal_pos = match goal {
        Some(g) => Some(*positions.get(g).ok_or_else(|| not_a_vertex(g))?),
        None => None,
    };

    let mut dist = vec![UNREACHED; order.len()];
    let mut prev: Vec<Option<usize>> = vec![None; order.len()];
    dist[start_pos] = 0;

    let mut pq = IndexMinPQ::new(order.len());
    for (i, d) in dist.iter().enumerate() {
        pq.insert(i, *d)?;
    }

    while !pq.is_empty() {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
        }

        let u = pq.del_min()?;
        if dist[u] == UNREACHED {
            // Everything still queued is unreachable from the start.
            break;
        }
        if goal_pos == Some(u) {
            break;
        }

        for neighbour in graph.neighbors(&order[u])? {
            let v = positions[neighbour];
            // Saturate so an edge-length function returning weights above
            // the sentinel cannot wrap into a false improvement.
            let candidate = dist[u].saturating_add(graph.edge_length(&order[u], neighbour));
            if candidate < dist[v] {
                dist[v] = candidate;
                prev[v] = Some(u);
                // A settled vertex can never present an improvement under
                // non-negative weights, so v is still queued here.
                pq.decrease_key(v, candidate)?;
            }
        }
    }

    Ok(ShortestPathTree {
        order,
        positions,
        dist,
        prev,
    })
}

fn not_a_vertex<V: fmt::Debug>(v: &V) -> Error {
    Error::InvalidVertex {
        vertex: format!("{v:?}"),
    }
}
