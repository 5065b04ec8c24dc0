use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Pluggable weight assignment for an ordered vertex pair. The default,
/// when none is attached, is the constant hop cost of 1.
pub type EdgeLengthFn<V> = Box<dyn Fn(&V, &V) -> u64 + Send + Sync>;

/// A sparse undirected graph over an arbitrary hashable vertex type.
///
/// Adjacency is stored as vertex -> set-of-neighbours. The structure is
/// unweighted; an edge-length function may be attached and is consulted by
/// the path algorithms, not by the graph itself. Vertex iteration order is
/// unspecified: algorithms that need a stable index mapping must snapshot
/// the vertex set once per run.
pub struct Graph<V> {
    adjacency: HashMap<V, HashSet<V>>,
    edges: usize,
    edge_length: Option<EdgeLengthFn<V>>,
}

impl<V> Graph<V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            adjacency: HashMap::new(),
            edges: 0,
            edge_length: None,
        }
    }

    /// Number of vertices. O(1).
    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of distinct unordered vertex pairs ever inserted. O(1).
    pub fn num_edges(&self) -> usize {
        self.edges
    }

    /// Add a vertex with an empty neighbour set. Idempotent.
    pub fn add_vertex(&mut self, v: V) {
        self.adjacency.entry(v).or_default();
    }

    /// Add the undirected edge `{v, w}`, creating either endpoint if absent.
    ///
    /// Both directions are always inserted, so `has_edge(v, w)` and
    /// `has_edge(w, v)` agree afterwards. Re-inserting the same unordered
    /// pair leaves the edge count unchanged.
    pub fn add_edge(&mut self, v: V, w: V) {
        let already_present = self
            .adjacency
            .get(&v)
            .is_some_and(|neighbours| neighbours.contains(&w));
        if !already_present {
            self.edges += 1;
        }
        self.adjacency.entry(v.clone()).or_default().insert(w.clone());
        self.adjacency.entry(w).or_default().insert(v);
    }

    pub fn has_vertex(&self, v: &V) -> bool {
        self.adjacency.contains_key(v)
    }

    /// Whether the edge `{v, w}` exists. Both endpoints must be members.
    pub fn has_edge(&self, v: &V, w: &V) -> Result<bool> {
        self.validate(v)?;
        self.validate(w)?;
        Ok(self.adjacency[v].contains(w))
    }

    /// The neighbour set of `v`, which must be a member.
    pub fn neighbors(&self, v: &V) -> Result<&HashSet<V>> {
        self.validate(v)?;
        Ok(&self.adjacency[v])
    }

    /// Number of neighbours of `v`, which must be a member.
    pub fn degree(&self, v: &V) -> Result<usize> {
        self.neighbors(v).map(HashSet::len)
    }

    /// Iterate over all vertices in unspecified order.
    pub fn vertices(&self) -> impl Iterator<Item = &V> {
        self.adjacency.keys()
    }

    /// Attach an edge-length function consulted by path algorithms.
    pub fn set_edge_length<F>(&mut self, f: F)
    where
        F: Fn(&V, &V) -> u64 + Send + Sync + 'static,
    {
        self.edge_length = Some(Box::new(f));
    }

    /// Weight of the ordered pair `(v, w)`; constant 1 when no edge-length
    /// function is attached.
    pub fn edge_length(&self, v: &V, w: &V) -> u64 {
        match &self.edge_length {
            Some(f) => f(v, w),
            None => 1,
        }
    }

    fn validate(&self, v: &V) -> Result<()> {
        if self.has_vertex(v) {
            Ok(())
        } else {
            Err(Error::InvalidVertex {
                vertex: format!("{v:?}"),
            })
        }
    }
}

impl<V> Default for Graph<V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for Graph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("adjacency", &self.adjacency)
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}
