//! Subway network library entry points.
//!
//! This crate models a transit network as an undirected graph of stops,
//! fetches route and stop data from an MBTA-style transit API, and answers
//! shortest-path queries with Dijkstra's algorithm backed by an indexed
//! min-priority queue. Higher-level consumers (the CLI) should depend on
//! the items exported here instead of reimplementing behaviour.
//!

#![deny(warnings)]

pub mod api;
pub mod error;
pub mod graph;
pub mod network;
pub mod path;
pub mod pq;

pub use api::{ApiClient, RouteRecord, StopRecord, DEFAULT_API_URL};
pub use error::{Error, Result};
pub use graph::Graph;
pub use network::{PathStep, Route, Stop, StopPath, SubwayNetwork};
pub use path::{
    shortest_path, shortest_path_cancellable, shortest_path_tree, ShortestPath, ShortestPathTree,
};
pub use pq::IndexMinPQ;
